//! 画面ごとの描画関数。
//!
//! すべて現在のコンテキストを読むだけの純粋な描画で、状態変更も
//! I/Oも行わない。データレコードが無い状態で呼ばれた場合は
//! 落とさず、エラー表示を描いてログに残す。

use ratatui::{
    Frame,
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
};

use crate::{
    state::{StyleEditorData, UiState},
    theme, widgets,
};

use super::App;

/// 現在の状態に対応する画面を描画する。
pub fn draw(f: &mut Frame, app: &App) {
    match app.ctx.state {
        UiState::StyleSelection => draw_style_selection(f, app),
        UiState::Settings => draw_settings(f, app),
        UiState::NumberInput => draw_number_input(f, app),
        UiState::StyleManager => draw_style_manager(f, app),
        UiState::StyleEditor => draw_style_editor(f, app),
        UiState::Confirmation => draw_confirmation(f, app),
        UiState::TextInput => draw_text_input(f, app),
        // 終端状態はループが抜けるため描画しない。
        UiState::Confirmed | UiState::Cancelled => {}
    }
}

/// データレコード不在時の防御表示。
fn draw_missing(f: &mut Frame, message: &str) {
    tracing::warn!("defensive render: {message}");
    let p = Paragraph::new(message.to_string()).style(theme::ERROR);
    f.render_widget(p, f.area());
}

/// 本体＋ナビヒントの縦レイアウトを作る。
fn body_and_hint(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// スタイル選択画面。
fn draw_style_selection(f: &mut Frame, app: &App) {
    let Some(data) = app.ctx.selection.as_ref() else {
        return draw_missing(f, "No styles available");
    };

    let (body, hint) = body_and_hint(f.area());
    widgets::render_menu_list(f, body, &data.items, data.selected_index, &data.title);

    let nav = Paragraph::new(theme::NAV_STYLE_SELECTION).style(theme::DIM);
    f.render_widget(nav, hint);
}

/// 設定画面。
fn draw_settings(f: &mut Frame, app: &App) {
    let Some(data) = app.ctx.settings.as_ref() else {
        return draw_missing(f, "No settings available");
    };

    let (body, hint) = body_and_hint(f.area());
    widgets::render_settings_list(f, body, data, app.config);

    let nav = Paragraph::new(theme::NAV_SETTINGS).style(theme::DIM);
    f.render_widget(nav, hint);
}

/// 数値入力モーダル。
fn draw_number_input(f: &mut Frame, app: &App) {
    let Some(data) = app.ctx.number_input.as_ref() else {
        return draw_missing(f, "No input data");
    };
    widgets::render_number_modal(f, data);
}

/// スタイル管理画面。
fn draw_style_manager(f: &mut Frame, app: &App) {
    let Some(data) = app.ctx.style_manager.as_ref() else {
        return draw_missing(f, "No style manager data");
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Style Manager ({})", data.sort_mode.label()))
        .title_style(theme::TITLE);
    let inner = block.inner(f.area());
    f.render_widget(block, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // スタイル一覧
            Constraint::Length(1), // 操作ヒント
            Constraint::Length(1), // 操作結果メッセージ
        ])
        .split(inner);

    // 一覧行を組み立てる。お気に入りと利用上位は記号で示す。
    let rows = data.style_names.iter().enumerate().map(|(idx, name)| {
        let marker = if idx == data.selected_index {
            "► "
        } else {
            "  "
        };
        let star = if data.favorites.contains(name) {
            "⭐ "
        } else {
            ""
        };
        let fire = if data.top_names.contains(name) {
            "🔥 "
        } else {
            ""
        };
        let count = data
            .usage_counts
            .get(name)
            .filter(|c| **c > 0)
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();

        let display = format!("{marker}{fire}{star}{name}{count}");
        let style = if idx == data.selected_index {
            theme::PROMPT
        } else {
            Style::new()
        };
        Row::new(vec![format!("{}", idx + 1), display]).style(style)
    });

    let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(20)])
        .header(Row::new(vec!["#", "Style Name"]).style(theme::HEADER));
    f.render_widget(table, chunks[0]);

    let nav = Paragraph::new(theme::NAV_STYLE_MANAGER).style(theme::DIM);
    f.render_widget(nav, chunks[1]);

    if !data.message.is_empty() {
        // 成功系メッセージは緑、それ以外は黄で表示する。
        let style = if data.message.to_lowercase().contains("success") {
            theme::SUCCESS
        } else {
            theme::WARNING
        };
        f.render_widget(Paragraph::new(data.message.clone()).style(style), chunks[2]);
    }
}

/// 本文中のフラットなカーソル位置を(行, 桁)へ変換する。文字単位。
fn content_cursor(data: &StyleEditorData) -> (usize, usize) {
    let lines: Vec<&str> = data.content.split('\n').collect();
    let mut chars_so_far = 0usize;
    for (idx, line) in lines.iter().enumerate() {
        // 行長+1は行末の改行分。
        let line_len = line.chars().count() + 1;
        if chars_so_far + line_len > data.cursor_position {
            return (idx, data.cursor_position - chars_so_far);
        }
        chars_so_far += line_len;
    }
    let last = lines.len().saturating_sub(1);
    (last, lines.last().map(|l| l.chars().count()).unwrap_or(0))
}

/// 文字列をカーソル位置で前後に分ける。文字単位。
fn split_at_cursor(text: &str, cursor: usize) -> (String, String) {
    let chars: Vec<char> = text.chars().collect();
    let pos = cursor.min(chars.len());
    (
        chars[..pos].iter().collect(),
        chars[pos..].iter().collect(),
    )
}

/// スタイル編集画面。
fn draw_style_editor(f: &mut Frame, app: &App) {
    let Some(data) = app.ctx.style_editor.as_ref() else {
        return draw_missing(f, "No style editor data");
    };

    let mut lines: Vec<Line> = Vec::new();

    // タイトル行。
    let title = if data.is_new {
        "Add New Style".to_string()
    } else {
        format!("Edit Style: {}", data.original_name)
    };
    lines.push(Line::styled(title, theme::TITLE));
    lines.push(Line::raw(""));

    // 名前フィールド。編集中はカーソルを差し込む。
    if data.is_editing_name {
        let (before, after) = split_at_cursor(&data.style_name, data.cursor_position);
        lines.push(Line::from(vec![
            Span::styled("Name: ", theme::HEADER),
            Span::styled(before, theme::WARNING),
            Span::styled("|", theme::CURSOR),
            Span::styled(after, theme::WARNING),
        ]));
    } else {
        let shown = if data.style_name.is_empty() {
            "_".to_string()
        } else {
            data.style_name.clone()
        };
        lines.push(Line::from(vec![
            Span::styled("Name: ", theme::HEADER),
            Span::raw(shown),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Content (multiline):", theme::HEADER));

    let content_lines: Vec<&str> = data.content.split('\n').collect();
    if data.is_editing_name {
        // 本文は行番号付きのプレビューとして薄く見せる。
        for (idx, line) in content_lines.iter().take(15).enumerate() {
            lines.push(Line::styled(
                format!("{:3} │ {}", idx + 1, line),
                theme::DIM,
            ));
        }
        if content_lines.len() > 15 {
            lines.push(Line::styled(
                format!("... ({} more lines)", content_lines.len() - 15),
                theme::DIM,
            ));
        }
    } else {
        // 本文編集中はカーソルのある行だけ分割して描く。
        let (cursor_line, cursor_col) = content_cursor(data);
        for (idx, line) in content_lines.iter().enumerate() {
            let number = Span::styled(format!("{:3} │ ", idx + 1), theme::INPUT_VALUE);
            if idx == cursor_line {
                let (before, after) = split_at_cursor(line, cursor_col);
                lines.push(Line::from(vec![
                    number,
                    Span::raw(before),
                    Span::styled("|", theme::CURSOR),
                    Span::raw(after),
                ]));
            } else {
                lines.push(Line::from(vec![number, Span::raw((*line).to_string())]));
            }
        }
    }

    lines.push(Line::raw(""));
    let nav = if data.is_editing_name {
        theme::NAV_EDITOR_NAME
    } else {
        theme::NAV_EDITOR_CONTENT
    };
    lines.push(Line::styled(nav, theme::DIM));

    if !data.error_message.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("⚠ {}", data.error_message),
            theme::ERROR,
        ));
    }

    // エラー時は枠の色で異常を示す。
    let border_style = if data.error_message.is_empty() {
        theme::SUCCESS
    } else {
        theme::ERROR
    };
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, f.area());
}

/// 確認ダイアログ。中央のモーダルとして描く。
fn draw_confirmation(f: &mut Frame, app: &App) {
    let Some(data) = app.ctx.confirmation.as_ref() else {
        return draw_missing(f, "No confirmation data");
    };

    let popup = widgets::centered_popup(f.area(), 50, 9);
    f.render_widget(ratatui::widgets::Clear, popup);

    let lines = vec![
        Line::styled(data.prompt.clone(), theme::PROMPT),
        Line::raw(""),
        Line::styled("  [Y] Yes", theme::SUCCESS),
        Line::styled("  [N] No", theme::ERROR),
        Line::raw(""),
        Line::styled(theme::NAV_CONFIRMATION, theme::DIM),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Confirmation")
            .title_style(theme::TITLE)
            .border_style(theme::WARNING),
    );
    f.render_widget(paragraph, popup);
}

/// 自由入力（チャット）画面。
fn draw_text_input(f: &mut Frame, app: &App) {
    let Some(data) = app.ctx.text_input.as_ref() else {
        return draw_missing(f, "No text input data");
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("AI Chat")
        .title_style(theme::TITLE);
    let inner = block.inner(f.area());
    f.render_widget(block, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // 履歴
            Constraint::Length(1), // プロンプト
            Constraint::Length(3), // 入力欄
            Constraint::Length(1), // ヒント
        ])
        .split(inner);

    // 直近の履歴を文脈として表示する。
    if !data.history.is_empty() {
        let history_lines: Vec<Line> = data
            .history
            .iter()
            .map(|entry| Line::styled(entry.clone(), theme::DIM))
            .collect();
        f.render_widget(Paragraph::new(history_lines).wrap(Wrap { trim: true }), chunks[0]);
    }

    f.render_widget(
        Paragraph::new(data.prompt.clone()).style(theme::WARNING),
        chunks[1],
    );

    // 入力値とカーソル。末尾ではブロック、途中では反転表示。
    let chars: Vec<char> = data.current_value.chars().collect();
    let mut input_spans = vec![Span::styled("> ", theme::DIM)];
    if data.cursor_position >= chars.len() {
        input_spans.push(Span::raw(data.current_value.clone()));
        input_spans.push(Span::styled("█", theme::CURSOR));
    } else {
        let before: String = chars[..data.cursor_position].iter().collect();
        let at: String = chars[data.cursor_position].to_string();
        let after: String = chars[data.cursor_position + 1..].iter().collect();
        input_spans.push(Span::raw(before));
        input_spans.push(Span::styled(at, theme::SELECTED));
        input_spans.push(Span::raw(after));
    }
    let input = Paragraph::new(Line::from(input_spans))
        .block(Block::default().borders(Borders::ALL).border_style(theme::INPUT_VALUE));
    f.render_widget(input, chunks[2]);

    let hint = Paragraph::new(theme::NAV_TEXT_INPUT)
        .style(theme::DIM)
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[3]);
}
