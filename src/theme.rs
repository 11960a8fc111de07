//! 配色とナビゲーションヒントの定義。

use ratatui::style::{Color, Modifier, Style};

/// 画面タイトル。
pub const TITLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
/// テーブルヘッダ。
pub const HEADER: Style = Style::new()
    .fg(Color::Magenta)
    .add_modifier(Modifier::BOLD);
/// 選択中の行。
pub const SELECTED: Style = Style::new().add_modifier(Modifier::REVERSED);
/// 補助情報・ヒント行。
pub const DIM: Style = Style::new().fg(Color::DarkGray);
/// エラー表示。
pub const ERROR: Style = Style::new().fg(Color::Red);
/// 成功メッセージ。
pub const SUCCESS: Style = Style::new().fg(Color::Green);
/// 注意メッセージ。
pub const WARNING: Style = Style::new().fg(Color::Yellow);
/// 入力プロンプト。
pub const PROMPT: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);
/// カーソル表示。
pub const CURSOR: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);
/// 入力中の値。
pub const INPUT_VALUE: Style = Style::new().fg(Color::Cyan);

/// 選択マーカー。
pub const ARROW_SELECTED: &str = ">";
pub const ARROW_EMPTY: &str = " ";

/// 画面ごとの操作ヒント。
pub const NAV_STYLE_SELECTION: &str =
    "↑↓: select | Enter: confirm | E: edit styles | 9: settings | q: quit";
pub const NAV_SETTINGS: &str = "↑↓: select | Enter: toggle/edit | q/Esc: back";
pub const NAV_NUMBER_INPUT: &str = "digits: type | Backspace: delete | Enter: confirm | Esc: cancel";
pub const NAV_STYLE_MANAGER: &str =
    "↑↓ | A: add | E: edit | C: copy | F: star | S: sort | D: delete | X: export | I: import | Esc: back";
pub const NAV_CONFIRMATION: &str = "y: confirm | n/Esc: cancel";
pub const NAV_TEXT_INPUT: &str = "Enter: send | Esc: cancel";
/// エディタのESCは破棄ではなく保存して戻る。ヒントにも明示する。
pub const NAV_EDITOR_NAME: &str = "type name | Tab: edit content | Enter: save | Esc: save & back";
pub const NAV_EDITOR_CONTENT: &str =
    "type | Enter: new line | Tab: edit name | Esc: save & back";

/// 行の選択状態に応じたスタイルを返す。
pub fn item_style(selected: bool) -> Style {
    if selected { SELECTED } else { Style::new() }
}
