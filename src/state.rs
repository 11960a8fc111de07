//! 画面遷移用のUI状態と、各画面が所有するデータレコード。
//!
//! レコードは対応する画面へ最初に遷移した時点で生成され、画面を
//! 離れても破棄しない。設定→数値入力→設定のように戻ってきたとき、
//! 前回の編集内容が残っているのはこのため。

use std::collections::{BTreeMap, HashMap};

use crate::styles::StyleEntry;

/// 状態機械のタグ。ConfirmedとCancelledだけが終端。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiState {
    /// スタイル選択画面（初期状態）。
    StyleSelection,
    /// 設定一覧画面。
    Settings,
    /// 数値入力モーダル。
    NumberInput,
    /// スタイル管理画面。
    StyleManager,
    /// スタイル編集画面。
    StyleEditor,
    /// 破壊的操作の確認ダイアログ。
    Confirmation,
    /// 自由入力（チャット）画面。
    TextInput,
    /// 確定して終了。
    Confirmed,
    /// 中断して終了。
    Cancelled,
}

/// スタイル一覧のソート方向。お気に入りは常に先頭へ固定される。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Asc,
    Desc,
}

impl SortMode {
    /// 表示用ラベル。
    pub fn label(self) -> &'static str {
        match self {
            SortMode::Asc => "A-Z",
            SortMode::Desc => "Z-A",
        }
    }

    /// 反対方向を返す。
    pub fn toggled(self) -> Self {
        match self {
            SortMode::Asc => SortMode::Desc,
            SortMode::Desc => SortMode::Asc,
        }
    }
}

/// 設定項目の値種別。bool項目はその場でトグル、int項目は数値入力へ。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKind {
    Bool,
    Int,
}

/// 設定一覧の1行。attrはConfigの属性名。
#[derive(Clone, Debug)]
pub struct SettingRow {
    pub key: String,
    pub name: String,
    pub attr: String,
    pub kind: SettingKind,
}

/// カーソル位置に文字を挿し込む。位置は文字単位。
fn splice_char(value: &str, cursor: usize, c: char) -> String {
    // 文字列を一旦Vec<char>へ展開してから挿入する。
    let mut chars: Vec<char> = value.chars().collect();
    let pos = cursor.min(chars.len());
    chars.insert(pos, c);
    chars.iter().collect()
}

/// カーソル直前の1文字を取り除く。先頭では何もしない。
fn remove_char_before(value: &str, cursor: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if cursor == 0 || cursor > chars.len() {
        return value.to_string();
    }
    chars
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != cursor - 1)
        .map(|(_, c)| c)
        .collect()
}

/// メニュー選択画面のデータ。itemsは(キー, 表示名)の列。
#[derive(Clone, Debug, Default)]
pub struct SelectionData {
    pub items: Vec<(String, String)>,
    pub selected_index: usize,
    pub title: String,
}

impl SelectionData {
    /// 選択中の項目を返す。範囲外ならNone。
    pub fn selected_item(&self) -> Option<&(String, String)> {
        self.items.get(self.selected_index)
    }

    /// 1つ上へ。先頭で飽和する。
    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// 1つ下へ。末尾で飽和する。
    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.items.len() {
            self.selected_index += 1;
        }
    }
}

/// 設定画面のデータ。Config本体はAppが借用で保持する。
#[derive(Clone, Debug, Default)]
pub struct SettingsData {
    pub settings: Vec<SettingRow>,
    pub selected_index: usize,
}

impl SettingsData {
    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.settings.len() {
            self.selected_index += 1;
        }
    }
}

/// 数値入力モーダルのデータ。current_valueは数字のみで構成される。
#[derive(Clone, Debug)]
pub struct NumberInputData {
    pub prompt: String,
    pub current_value: String,
    pub default_value: i64,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    /// 確定に成功したときだけ設定される。
    pub result: Option<i64>,
    /// キャンセル時に戻る画面。
    pub return_state: UiState,
    /// Someなら結果をConfigの該当属性へ書き込み設定画面へ戻る。
    pub target_attr: Option<String>,
}

impl NumberInputData {
    pub fn new(prompt: impl Into<String>, default_value: i64, return_state: UiState) -> Self {
        Self {
            prompt: prompt.into(),
            current_value: String::new(),
            default_value,
            min_value: None,
            max_value: None,
            result: None,
            return_state,
            target_attr: None,
        }
    }

    /// 表示する値。未入力ならデフォルト値を見せる。
    pub fn display_value(&self) -> String {
        if self.current_value.is_empty() {
            self.default_value.to_string()
        } else {
            self.current_value.clone()
        }
    }

    /// 数字のみ末尾へ追加する。数字以外は黙って捨てる。
    pub fn push_digit(&mut self, digit: char) {
        if digit.is_ascii_digit() {
            self.current_value.push(digit);
        }
    }

    /// 末尾の1桁を削除する。
    pub fn backspace(&mut self) {
        self.current_value.pop();
    }

    /// 入力を検証して確定する。空入力はデフォルト値として扱う。
    /// 範囲外やパース不能の場合はresultを変更せずfalseを返す。
    pub fn confirm(&mut self) -> bool {
        let value = if self.current_value.is_empty() {
            self.default_value
        } else {
            match self.current_value.parse::<i64>() {
                Ok(v) => v,
                Err(_) => return false,
            }
        };
        if self.min_value.is_some_and(|min| value < min) {
            return false;
        }
        if self.max_value.is_some_and(|max| value > max) {
            return false;
        }
        self.result = Some(value);
        true
    }
}

/// スタイル管理画面のデータ。画面へ入るたびにディスクから再構築する。
#[derive(Clone, Debug, Default)]
pub struct StyleManagerData {
    pub styles: BTreeMap<String, StyleEntry>,
    /// 表示順に並んだスタイル名。お気に入り先頭、以降はsort_mode順。
    pub style_names: Vec<String>,
    pub selected_index: usize,
    pub favorites: Vec<String>,
    /// 直前の操作結果を表示するメッセージ。
    pub message: String,
    pub sort_mode: SortMode,
    /// 描画を純粋に保つため、統計は操作時にスナップショットしておく。
    pub usage_counts: HashMap<String, u64>,
    pub top_names: Vec<String>,
}

impl StyleManagerData {
    /// お気に入りを先頭に固定したまま、sort_mode方向で並べ直す。
    /// 選択インデックスは新しい長さに収まるよう丸める。
    pub fn resort(&mut self) {
        let mut all: Vec<String> = self.styles.keys().cloned().collect();
        if self.sort_mode == SortMode::Desc {
            all.reverse();
        }
        let favs: Vec<String> = all
            .iter()
            .filter(|n| self.favorites.contains(n))
            .cloned()
            .collect();
        let others: Vec<String> = all
            .iter()
            .filter(|n| !self.favorites.contains(n))
            .cloned()
            .collect();
        self.style_names = favs.into_iter().chain(others).collect();

        if self.selected_index >= self.style_names.len() {
            self.selected_index = self.style_names.len().saturating_sub(1);
        }
    }

    /// 並びが変わっても同じスタイルを選択し続ける。見つからなければ先頭。
    pub fn select_style(&mut self, name: &str) {
        self.selected_index = self
            .style_names
            .iter()
            .position(|n| n == name)
            .unwrap_or(0);
    }

    /// 選択中のスタイル名。
    pub fn selected_name(&self) -> Option<&str> {
        self.style_names.get(self.selected_index).map(String::as_str)
    }

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.style_names.len() {
            self.selected_index += 1;
        }
    }
}

/// スタイル編集画面のデータ。名前と本文の2フィールドを1つの
/// カーソルで編集する。is_editing_nameがどちらに効くかを決める。
#[derive(Clone, Debug, Default)]
pub struct StyleEditorData {
    pub style_name: String,
    /// 既存スタイル編集時の元の名前。新規作成時は空。
    pub original_name: String,
    pub content: String,
    /// アクティブなフィールド内の文字単位オフセット。
    pub cursor_position: usize,
    pub is_editing_name: bool,
    pub is_new: bool,
    pub error_message: String,
}

impl StyleEditorData {
    /// 新規作成用。名前フィールドから編集を始める。
    pub fn new_style() -> Self {
        Self {
            is_editing_name: true,
            is_new: true,
            ..Self::default()
        }
    }

    /// 既存スタイルの編集用。カーソルは名前の末尾に置く。
    pub fn existing(name: &str, content: &str) -> Self {
        Self {
            style_name: name.to_string(),
            original_name: name.to_string(),
            content: content.to_string(),
            cursor_position: name.chars().count(),
            is_editing_name: true,
            is_new: false,
            error_message: String::new(),
        }
    }

    /// アクティブなフィールドの文字数。
    pub fn active_len(&self) -> usize {
        if self.is_editing_name {
            self.style_name.chars().count()
        } else {
            self.content.chars().count()
        }
    }

    /// Tabでフィールドを切り替える。カーソルは新フィールドの末尾へ。
    pub fn switch_field(&mut self) {
        self.is_editing_name = !self.is_editing_name;
        self.cursor_position = self.active_len();
        self.error_message.clear();
    }

    /// アクティブなフィールドのカーソル位置へ文字を挿入する。
    pub fn insert_char(&mut self, c: char) {
        if self.is_editing_name {
            self.style_name = splice_char(&self.style_name, self.cursor_position, c);
        } else {
            self.content = splice_char(&self.content, self.cursor_position, c);
        }
        self.cursor_position += 1;
    }

    /// カーソル直前の文字を削除する。先頭では何もしない。
    pub fn backspace(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        if self.is_editing_name {
            self.style_name = remove_char_before(&self.style_name, self.cursor_position);
        } else {
            self.content = remove_char_before(&self.content, self.cursor_position);
        }
        self.cursor_position -= 1;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_position = (self.cursor_position + 1).min(self.active_len());
    }
}

/// 自由入力（チャット）画面のデータ。
#[derive(Clone, Debug, Default)]
pub struct TextInputData {
    pub prompt: String,
    pub current_value: String,
    /// 文字単位のカーソル位置。
    pub cursor_position: usize,
    /// 画面上部に出す直近の履歴表示行。
    pub history: Vec<String>,
}

impl TextInputData {
    pub fn insert_char(&mut self, c: char) {
        self.current_value = splice_char(&self.current_value, self.cursor_position, c);
        self.cursor_position += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.current_value = remove_char_before(&self.current_value, self.cursor_position);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = self.current_value.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(len);
    }
}

/// 確認ダイアログのデータ。対象と戻り先を持ち回る。
#[derive(Clone, Debug)]
pub struct ConfirmationData {
    pub prompt: String,
    /// 確定時に実行される操作の対象（削除するスタイル名）。
    pub action_name: String,
    pub confirmed: Option<bool>,
    pub previous_state: UiState,
}

/// 状態機械の全体。stateタグが「生きている」レコードを決めるが、
/// 遷移で他のレコードを破棄することはない。
#[derive(Clone, Debug)]
pub struct UiContext {
    pub state: UiState,
    pub selection: Option<SelectionData>,
    pub settings: Option<SettingsData>,
    pub number_input: Option<NumberInputData>,
    pub style_manager: Option<StyleManagerData>,
    pub style_editor: Option<StyleEditorData>,
    pub confirmation: Option<ConfirmationData>,
    pub text_input: Option<TextInputData>,

    /// メニューの数字キー → 内部スタイル名。再読込のたびに作り直す。
    pub style_key_mapping: HashMap<String, String>,

    /// 確定結果：選択されたスタイル（メニューキー, 表示名）。
    pub selected_style: Option<(String, String)>,
    /// 確定結果：ポーリング間隔（秒）。
    pub selected_interval: i64,
    /// 確定結果：チャットで入力されたメッセージ。
    pub user_message: Option<String>,
}

impl Default for UiContext {
    fn default() -> Self {
        Self {
            state: UiState::StyleSelection,
            selection: None,
            settings: None,
            number_input: None,
            style_manager: None,
            style_editor: None,
            confirmation: None,
            text_input: None,
            style_key_mapping: HashMap::new(),
            selected_style: None,
            selected_interval: 15,
            user_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_index_saturates() {
        // 上下移動を繰り返してもインデックスが範囲内に収まることを検証する。
        let mut data = SelectionData {
            items: vec![
                ("1".into(), "Sarcastic".into()),
                ("2".into(), "Poetic".into()),
            ],
            selected_index: 0,
            title: "Menu".into(),
        };
        data.select_prev();
        data.select_prev();
        assert_eq!(data.selected_index, 0);
        data.select_next();
        data.select_next();
        data.select_next();
        assert_eq!(data.selected_index, 1);
        assert_eq!(data.selected_item().unwrap().1, "Poetic");
    }

    #[test]
    fn test_text_input_cursor_invariant() {
        // どの編集操作後もカーソルが[0, len]に収まることを検証する。
        let mut data = TextInputData::default();
        data.backspace();
        assert_eq!(data.cursor_position, 0);
        data.insert_char('a');
        data.insert_char('b');
        data.insert_char('c');
        assert_eq!(data.current_value, "abc");
        assert_eq!(data.cursor_position, 3);
        data.move_cursor_right();
        assert_eq!(data.cursor_position, 3);
        data.move_cursor_left();
        data.move_cursor_left();
        data.insert_char('X');
        assert_eq!(data.current_value, "aXbc");
        assert_eq!(data.cursor_position, 2);
        data.backspace();
        assert_eq!(data.current_value, "abc");
        assert_eq!(data.cursor_position, 1);
    }

    #[test]
    fn test_text_input_multibyte() {
        // 文字単位で編集するため、マルチバイト文字でも壊れないことを検証する。
        let mut data = TextInputData::default();
        for c in "привет".chars() {
            data.insert_char(c);
        }
        assert_eq!(data.cursor_position, 6);
        data.backspace();
        assert_eq!(data.current_value, "приве");
    }

    #[test]
    fn test_number_input_empty_confirms_default() {
        // 空入力はデフォルト値として確定されることを検証する。
        let mut data = NumberInputData::new("Enter interval", 15, UiState::StyleSelection);
        assert!(data.confirm());
        assert_eq!(data.result, Some(15));
    }

    #[test]
    fn test_number_input_range_rejection() {
        // 範囲外の値は拒否され、resultが変化しないことを検証する。
        let mut data = NumberInputData::new("Enter width", 1000, UiState::Settings);
        data.min_value = Some(10);
        data.max_value = Some(5000);
        data.push_digit('7');
        assert!(!data.confirm());
        assert_eq!(data.result, None);
        data.push_digit('0');
        assert!(data.confirm());
        assert_eq!(data.result, Some(70));
    }

    #[test]
    fn test_number_input_rejects_non_digits() {
        // 数字以外のpushは無視され、不変条件が保たれることを検証する。
        let mut data = NumberInputData::new("Enter number", 0, UiState::Settings);
        data.push_digit('1');
        data.push_digit('x');
        data.push_digit('2');
        assert_eq!(data.current_value, "12");
        assert!(data.current_value.chars().all(|c| c.is_ascii_digit()));
        data.backspace();
        assert_eq!(data.current_value, "1");
        assert_eq!(data.display_value(), "1");
        data.backspace();
        assert_eq!(data.display_value(), "0");
    }

    #[test]
    fn test_editor_field_switching() {
        // Tabでフィールドを切り替えるとカーソルが新フィールド末尾へ移ることを検証する。
        let mut data = StyleEditorData::existing("pirate", "Arr matey");
        assert!(data.is_editing_name);
        assert_eq!(data.cursor_position, 6);
        data.switch_field();
        assert!(!data.is_editing_name);
        assert_eq!(data.cursor_position, 9);
        data.insert_char('!');
        assert_eq!(data.content, "Arr matey!");
        assert_eq!(data.style_name, "pirate");
    }

    #[test]
    fn test_editor_cursor_stays_in_bounds() {
        // 編集列のどの並びでもカーソルがアクティブ長を超えないことを検証する。
        let mut data = StyleEditorData::new_style();
        data.move_cursor_right();
        assert_eq!(data.cursor_position, 0);
        data.insert_char('a');
        data.insert_char('b');
        data.move_cursor_right();
        assert_eq!(data.cursor_position, 2);
        data.move_cursor_left();
        data.backspace();
        assert_eq!(data.style_name, "b");
        assert_eq!(data.cursor_position, 0);
        data.backspace();
        assert_eq!(data.style_name, "b");
    }

    #[test]
    fn test_manager_resort_pins_favorites() {
        // ソート方向に関わらずお気に入りが先頭に来ることを検証する。
        let mut data = StyleManagerData {
            styles: BTreeMap::from([
                ("alpha".to_string(), StyleEntry::system("a")),
                ("beta".to_string(), StyleEntry::system("b")),
                ("gamma".to_string(), StyleEntry::system("c")),
            ]),
            favorites: vec!["beta".into()],
            ..StyleManagerData::default()
        };
        data.resort();
        assert_eq!(data.style_names, vec!["beta", "alpha", "gamma"]);
        data.sort_mode = data.sort_mode.toggled();
        data.resort();
        assert_eq!(data.style_names, vec!["beta", "gamma", "alpha"]);
    }

    #[test]
    fn test_manager_resort_clamps_selection() {
        // スタイルが減った後も選択が範囲内に丸められることを検証する。
        let mut data = StyleManagerData {
            styles: BTreeMap::from([("only".to_string(), StyleEntry::system("x"))]),
            selected_index: 5,
            ..StyleManagerData::default()
        };
        data.resort();
        assert_eq!(data.selected_index, 0);
        assert_eq!(data.selected_name(), Some("only"));
    }

    #[test]
    fn test_sort_mode_labels() {
        assert_eq!(SortMode::Asc.label(), "A-Z");
        assert_eq!(SortMode::Asc.toggled().label(), "Z-A");
    }
}
