//! キー入力の分類を行う純粋な述語関数群。
//!
//! 各ニーモニックはラテン文字とЙЦУКЕН配列での同位置キリル文字の
//! 両方を受け付ける。どちらの配列でも同じショートカットが効くことは
//! 製品要件であり、セットは明示的なリテラルとして管理する。

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// 終了コマンド（Q / ЙЦУКЕН配列のЙ）。ESCも終了扱いに含める。
const QUIT_KEYS: [char; 4] = ['q', 'Q', 'й', 'Й'];
/// 設定画面を開くキー。
const SETTINGS_KEYS: [char; 1] = ['9'];
/// 編集コマンド（E / У）。
const EDIT_KEYS: [char; 4] = ['e', 'E', 'у', 'У'];
/// 追加コマンド（A / Ф）。
const ADD_KEYS: [char; 4] = ['a', 'A', 'ф', 'Ф'];
/// 削除コマンド（D / В）。
const DELETE_KEYS: [char; 4] = ['d', 'D', 'в', 'В'];
/// 複製コマンド（C / С）。
const COPY_KEYS: [char; 4] = ['c', 'C', 'с', 'С'];
/// エクスポートコマンド（X / Ч）。
const EXPORT_KEYS: [char; 4] = ['x', 'X', 'ч', 'Ч'];
/// インポートコマンド（I / Ш）。
const IMPORT_KEYS: [char; 4] = ['i', 'I', 'ш', 'Ш'];
/// お気に入り切り替え（F / А）。
const FAVORITE_KEYS: [char; 4] = ['f', 'F', 'а', 'А'];
/// ソート切り替え（S / Ы）。
const SORT_KEYS: [char; 4] = ['s', 'S', 'ы', 'Ы'];
/// 確認ダイアログの「はい」。
const YES_KEYS: [char; 2] = ['y', 'Y'];
/// 確認ダイアログの「いいえ」。
const NO_KEYS: [char; 2] = ['n', 'N'];

/// Ctrl/Alt修飾の無い文字キーならその文字を返す。
fn char_of(key: &KeyEvent) -> Option<char> {
    // 修飾キー付きの入力はニーモニックとして扱わない（Shiftは大文字入力なので許容）。
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

/// 文字キーがセットのいずれかに一致するか判定する。
fn in_set(key: &KeyEvent, set: &[char]) -> bool {
    char_of(key).is_some_and(|c| set.contains(&c))
}

pub fn is_up(key: &KeyEvent) -> bool {
    key.code == KeyCode::Up
}

pub fn is_down(key: &KeyEvent) -> bool {
    key.code == KeyCode::Down
}

pub fn is_left(key: &KeyEvent) -> bool {
    key.code == KeyCode::Left
}

pub fn is_right(key: &KeyEvent) -> bool {
    key.code == KeyCode::Right
}

/// Enter判定。CR・LF・CRLF由来のどの形でも同値に扱う。
pub fn is_enter(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Enter | KeyCode::Char('\r') | KeyCode::Char('\n')
    )
}

/// ESC単体の判定。is_quitより狭く、「戻る/キャンセル」専用。
pub fn is_esc(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
}

pub fn is_tab(key: &KeyEvent) -> bool {
    key.code == KeyCode::Tab
}

pub fn is_backspace(key: &KeyEvent) -> bool {
    key.code == KeyCode::Backspace
}

/// スペースキーの判定。名前フィールドでは拒否、本文では挿入される。
pub fn is_space(key: &KeyEvent) -> bool {
    char_of(key) == Some(' ')
}

/// 数字キーならその文字を返す。
pub fn digit(key: &KeyEvent) -> Option<char> {
    char_of(key).filter(char::is_ascii_digit)
}

#[allow(dead_code)]
pub fn is_digit(key: &KeyEvent) -> bool {
    digit(key).is_some()
}

/// 印字可能な単一文字ならその文字を返す。空白類と制御文字は除く。
pub fn printable(key: &KeyEvent) -> Option<char> {
    char_of(key).filter(|c| !c.is_whitespace() && !c.is_control())
}

#[allow(dead_code)]
pub fn is_printable(key: &KeyEvent) -> bool {
    printable(key).is_some()
}

/// 終了判定。qとその配列対応文字、およびESCを受け付ける。
pub fn is_quit(key: &KeyEvent) -> bool {
    in_set(key, &QUIT_KEYS) || is_esc(key)
}

pub fn is_settings(key: &KeyEvent) -> bool {
    in_set(key, &SETTINGS_KEYS)
}

pub fn is_edit(key: &KeyEvent) -> bool {
    in_set(key, &EDIT_KEYS)
}

pub fn is_add(key: &KeyEvent) -> bool {
    in_set(key, &ADD_KEYS)
}

pub fn is_delete(key: &KeyEvent) -> bool {
    in_set(key, &DELETE_KEYS)
}

pub fn is_copy(key: &KeyEvent) -> bool {
    in_set(key, &COPY_KEYS)
}

pub fn is_export(key: &KeyEvent) -> bool {
    in_set(key, &EXPORT_KEYS)
}

pub fn is_import(key: &KeyEvent) -> bool {
    in_set(key, &IMPORT_KEYS)
}

pub fn is_favorite(key: &KeyEvent) -> bool {
    in_set(key, &FAVORITE_KEYS)
}

pub fn is_sort(key: &KeyEvent) -> bool {
    in_set(key, &SORT_KEYS)
}

pub fn is_yes(key: &KeyEvent) -> bool {
    in_set(key, &YES_KEYS)
}

pub fn is_no(key: &KeyEvent) -> bool {
    in_set(key, &NO_KEYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    #[test]
    fn test_mnemonics_accept_both_layouts() {
        // ラテン文字とキリル文字の両方で同じコマンドに一致することを検証する。
        assert!(is_edit(&ch('e')));
        assert!(is_edit(&ch('У')));
        assert!(is_add(&ch('A')));
        assert!(is_add(&ch('ф')));
        assert!(is_delete(&ch('d')));
        assert!(is_delete(&ch('в')));
        assert!(is_copy(&ch('с')));
        assert!(is_export(&ch('ч')));
        assert!(is_import(&ch('ш')));
        assert!(is_favorite(&ch('а')));
        assert!(is_sort(&ch('ы')));
        assert!(is_quit(&ch('й')));
    }

    #[test]
    fn test_esc_is_narrower_than_quit() {
        // ESCはis_quitにも含まれるが、is_escは文字キーに反応しない。
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::empty());
        assert!(is_esc(&esc));
        assert!(is_quit(&esc));
        assert!(is_quit(&ch('q')));
        assert!(!is_esc(&ch('q')));
    }

    #[test]
    fn test_enter_variants() {
        // Enterキー本体とCR/LF文字のどれでもEnter扱いになることを検証する。
        assert!(is_enter(&KeyEvent::new(KeyCode::Enter, KeyModifiers::empty())));
        assert!(is_enter(&ch('\r')));
        assert!(is_enter(&ch('\n')));
        assert!(!is_enter(&ch('a')));
    }

    #[test]
    fn test_digit_classification() {
        assert_eq!(digit(&ch('0')), Some('0'));
        assert_eq!(digit(&ch('9')), Some('9'));
        assert_eq!(digit(&ch('a')), None);
        assert!(is_digit(&ch('5')));
        // '9'は設定キーでもある。
        assert!(is_settings(&ch('9')));
        assert!(!is_settings(&ch('8')));
    }

    #[test]
    fn test_printable_excludes_whitespace_and_control() {
        assert_eq!(printable(&ch('z')), Some('z'));
        assert_eq!(printable(&ch('Я')), Some('Я'));
        assert_eq!(printable(&ch(' ')), None);
        assert!(is_space(&ch(' ')));
        assert!(!is_printable(&KeyEvent::new(KeyCode::Tab, KeyModifiers::empty())));
    }

    #[test]
    fn test_modifiers_suppress_mnemonics() {
        // Ctrl+Eのような修飾付き入力はコマンドとして解釈しない。
        let ctrl_e = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert!(!is_edit(&ctrl_e));
        // Shiftは大文字入力に付随するため許容する。
        let shift_e = KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT);
        assert!(is_edit(&shift_e));
    }
}
