//! UIエンジンの中核。状態遷移ループと外部向けエントリポイント。

mod handlers;
mod render;

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::{
    config::Config,
    events::{Event, EventDispatcher},
    state::{
        SelectionData, SettingKind, SettingRow, SettingsData, TextInputData, UiContext, UiState,
    },
    styles::StylePersistence,
    ui::Tui,
};

/// 1フレームの時間予算（約30Hz）。
const FRAME_BUDGET: Duration = Duration::from_millis(33);

/// チャット画面に文脈として出す履歴の最大件数。
const CHAT_HISTORY_LINES: usize = 5;

/// 過去のコメント1件。チャット画面の文脈表示に使う。
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub comment: String,
}

/// エンジン実行に必要なものの集約。ConfigとStylePersistenceは
/// 呼び出し側が所有し、ここでは借用だけする。
pub struct App<'a> {
    pub ctx: UiContext,
    pub config: &'a mut Config,
    pub store: &'a StylePersistence,
}

/// スタイル選択から始めるセッションを実行する。
/// 確定時は(Some((表示名, 内部名)), 間隔秒)、キャンセル時は
/// (None, 最後に確定していた間隔秒)を返す。
pub fn run_selection(
    terminal: &mut Tui,
    styles: &[(String, (String, String))],
    config: &mut Config,
    store: &StylePersistence,
) -> Result<(Option<(String, String)>, i64)> {
    let ctx = selection_context(styles, config.general.interval_seconds);
    let mut app = App { ctx, config, store };
    run_loop(terminal, &mut app)?;

    let ctx = app.ctx;
    if ctx.state == UiState::Confirmed
        && let Some((key, display)) = ctx.selected_style
    {
        // メニューキーを内部名へ解決する。対応が無ければキーをそのまま使う。
        let internal = ctx
            .style_key_mapping
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.clone());
        return Ok((Some((display, internal)), ctx.selected_interval));
    }
    Ok((None, ctx.selected_interval))
}

/// チャット入力から直接始めるセッションを実行する。
/// 確定時は入力されたメッセージ、キャンセル時はNoneを返す。
pub fn run_chat(
    terminal: &mut Tui,
    history: &[HistoryEntry],
    config: &mut Config,
    store: &StylePersistence,
) -> Result<Option<String>> {
    // 直近の履歴だけを文脈として添える。
    let display_history: Vec<String> = history
        .iter()
        .rev()
        .take(CHAT_HISTORY_LINES)
        .rev()
        .map(|e| format!("[{}] AI: {}", e.timestamp, e.comment))
        .collect();

    let ctx = UiContext {
        text_input: Some(TextInputData {
            prompt: "Type your message...".into(),
            history: display_history,
            ..TextInputData::default()
        }),
        state: UiState::TextInput,
        ..UiContext::default()
    };

    let mut app = App { ctx, config, store };
    run_loop(terminal, &mut app)?;

    if app.ctx.state == UiState::Confirmed {
        Ok(app.ctx.user_message.take())
    } else {
        Ok(None)
    }
}

/// スタイル選択セッションの初期コンテキストを組み立てる。
pub(crate) fn selection_context(
    styles: &[(String, (String, String))],
    interval: i64,
) -> UiContext {
    UiContext {
        selection: Some(SelectionData {
            items: styles
                .iter()
                .map(|(key, (display, _))| (key.clone(), display.clone()))
                .collect(),
            selected_index: 0,
            title: "Available Styles".into(),
        }),
        // 数字キー → 内部スタイル名の対応表。
        style_key_mapping: styles
            .iter()
            .map(|(key, (_, internal))| (key.clone(), internal.clone()))
            .collect(),
        settings: Some(default_settings()),
        selected_interval: interval,
        ..UiContext::default()
    }
}

/// 設定画面の項目表。キー・表示名・Config属性名・値種別の順。
fn default_settings() -> SettingsData {
    let rows = [
        ("1", "Silent Mode", "silent_mode", SettingKind::Bool),
        ("2", "Disable Cache", "disable_cache", SettingKind::Bool),
        ("3", "Strict Interval", "strict_interval", SettingKind::Bool),
        ("4", "Screenshot Width", "screenshot_width", SettingKind::Int),
        ("5", "Screenshot Height", "screenshot_height", SettingKind::Int),
        ("6", "Monitor Index", "screenshot_monitor_index", SettingKind::Int),
    ];
    SettingsData {
        settings: rows
            .into_iter()
            .map(|(key, name, attr, kind)| SettingRow {
                key: key.into(),
                name: name.into(),
                attr: attr.into(),
                kind,
            })
            .collect(),
        selected_index: 0,
    }
}

/// 終端状態に達するまでイベントループを回す。
/// 描画は状態が動いたフレームだけ行い、ループ自体はフレーム
/// レートを維持して入力遅延を抑える。
fn run_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut dispatcher = EventDispatcher::new();
    let mut needs_redraw = true;

    while !matches!(app.ctx.state, UiState::Confirmed | UiState::Cancelled) {
        let frame_start = Instant::now();

        if needs_redraw {
            terminal.draw(|f| render::draw(f, app))?;
            needs_redraw = false;
        }

        // timeout=0の純粋ポーリング。ここでループが止まることはない。
        if let Some(event) = dispatcher.poll(Duration::ZERO) {
            match event {
                Event::Keyboard(key) => {
                    // rawモード中でもCtrl+Cで必ず抜けられるようにする。
                    if handlers::is_ctrl_c(&key) {
                        app.ctx.state = UiState::Cancelled;
                    } else {
                        handlers::handle_key(app, &key);
                    }
                }
                // マウスは予約のみ。
                Event::Mouse(_) => {}
            }
            needs_redraw = true;
        }

        if matches!(app.ctx.state, UiState::Confirmed | UiState::Cancelled) {
            break;
        }

        std::thread::sleep(FRAME_BUDGET.saturating_sub(frame_start.elapsed()));
    }

    tracing::info!("ui loop finished in state {:?}", app.ctx.state);
    Ok(())
}
