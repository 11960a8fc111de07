//! 複数の画面から使い回す部品レンダラ。
//!
//! ここにあるのは描画だけを行う関数で、状態の変更やI/Oは一切
//! 行わない。データを受け取りフレームへ書くのみ。

use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
};

use crate::{
    config::Config,
    state::{NumberInputData, SettingKind, SettingsData},
    theme,
};

/// メニュー一覧を表として描画する。
pub fn render_menu_list(
    f: &mut Frame,
    area: Rect,
    items: &[(String, String)],
    selected_index: usize,
    title: &str,
) {
    // 各行に選択マーカー付きのキーと表示名を並べる。
    let rows = items.iter().enumerate().map(|(i, (key, name))| {
        let arrow = if i == selected_index {
            theme::ARROW_SELECTED
        } else {
            theme::ARROW_EMPTY
        };
        Row::new(vec![format!("{arrow}{key}"), name.clone()])
            .style(theme::item_style(i == selected_index))
    });

    let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(20)])
        .header(Row::new(vec!["#", "Item"]).style(theme::HEADER))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .title_style(theme::TITLE),
        );

    f.render_widget(table, area);
}

/// 設定一覧を表として描画する。値はConfigから属性名で引く。
pub fn render_settings_list(f: &mut Frame, area: Rect, data: &SettingsData, config: &Config) {
    let rows = data.settings.iter().enumerate().map(|(i, row)| {
        // 属性が未知の場合もN/A表示で描画は続ける。
        let value = match row.kind {
            SettingKind::Bool => config
                .bool_value(&row.attr)
                .map(|v| if v { "ON".to_string() } else { "OFF".to_string() }),
            SettingKind::Int => config.int_value(&row.attr).map(|v| v.to_string()),
        }
        .unwrap_or_else(|| "N/A".to_string());

        let arrow = if i == data.selected_index {
            theme::ARROW_SELECTED
        } else {
            theme::ARROW_EMPTY
        };
        Row::new(vec![format!("{arrow}{}", row.key), row.name.clone(), value])
            .style(theme::item_style(i == data.selected_index))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(12),
        ],
    )
    .header(Row::new(vec!["Key", "Setting", "Value"]).style(theme::HEADER))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Settings")
            .title_style(theme::TITLE),
    );

    f.render_widget(table, area);
}

/// 数値入力をコンパクトな中央モーダルとして描画する。
pub fn render_number_modal(f: &mut Frame, data: &NumberInputData) {
    let popup_area = centered_popup(f.area(), 60, 7);

    // 下の画面を消してモーダルの背景にする。
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Input")
        .title_style(theme::TITLE);
    f.render_widget(block, popup_area);

    // プロンプト + 値 + 空行 + ヒントの構成。
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(popup_area);

    let prompt = Paragraph::new(data.prompt.clone()).style(theme::PROMPT);
    f.render_widget(prompt, layout[0]);

    // 未入力時はデフォルト値を薄く見せる。
    let value_style = if data.current_value.is_empty() {
        theme::DIM
    } else {
        theme::INPUT_VALUE
    };
    let value_line = Line::from(vec![
        Span::raw("Value: "),
        Span::styled(data.display_value(), value_style),
    ]);
    f.render_widget(Paragraph::new(value_line), layout[1]);

    let hint = Paragraph::new(theme::NAV_NUMBER_INPUT)
        .style(theme::DIM)
        .alignment(Alignment::Center);
    f.render_widget(hint, layout[3]);
}

/// 中央配置のポップアップ領域を計算する。
pub fn centered_popup(area: Rect, width_percent: u16, height: u16) -> Rect {
    // 縦方向の余白を作り、中央の行を取り出す。
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    // 横方向も中央へ寄せる。
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(vertical[1])[1]
}
