//! 画面ごとのキー入力ハンドラと状態遷移。
//!
//! ハンドラは現在の状態に対応するデータレコードだけを変更する。
//! 永続化の失敗はここで受け止め、画面メッセージへ変換する。
//! ループへエラーを伝播させる失敗は存在しない。

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    keymap,
    state::{
        ConfirmationData, NumberInputData, SettingKind, StyleEditorData, StyleManagerData, UiState,
    },
    styles::{self, StyleEntry},
};

use super::App;

/// キー入力を1件、現在の状態のハンドラへ振り分ける。
pub fn handle_key(app: &mut App, key: &KeyEvent) {
    match app.ctx.state {
        UiState::StyleSelection => handle_style_selection_key(app, key),
        UiState::Settings => handle_settings_key(app, key),
        UiState::NumberInput => handle_number_input_key(app, key),
        UiState::StyleManager => handle_style_manager_key(app, key),
        UiState::StyleEditor => handle_style_editor_key(app, key),
        UiState::Confirmation => handle_confirmation_key(app, key),
        UiState::TextInput => handle_text_input_key(app, key),
        // 終端状態では入力を処理しない。
        UiState::Confirmed | UiState::Cancelled => {}
    }
}

/// Ctrl+Cかどうかを判定する。
pub fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// スタイル選択画面のキー処理。
fn handle_style_selection_key(app: &mut App, key: &KeyEvent) {
    let Some(data) = app.ctx.selection.as_mut() else {
        tracing::warn!("style selection keyed without data");
        return;
    };

    if keymap::is_up(key) {
        data.select_prev();
    } else if keymap::is_down(key) {
        data.select_next();
    } else if keymap::is_enter(key) {
        // 選択を記録して間隔の数値入力へ進む。
        if let Some((item_key, name)) = data.selected_item().cloned() {
            app.ctx.selected_style = Some((item_key, name));
            let default = app.ctx.selected_interval;
            transition_to_number_input(app, "Enter interval (seconds)".into(), default, None);
        }
    } else if keymap::is_quit(key) {
        app.ctx.state = UiState::Cancelled;
    } else if keymap::is_settings(key) {
        app.ctx.state = UiState::Settings;
    } else if keymap::is_edit(key) {
        enter_style_manager(app);
    } else if let Some(digit) = keymap::digit(key) {
        // 数字キーで対応する項目へ直接ジャンプする。
        let key_str = digit.to_string();
        if let Some(idx) = data.items.iter().position(|(k, _)| *k == key_str) {
            data.selected_index = idx;
        }
    }
}

/// 設定画面のキー処理。
fn handle_settings_key(app: &mut App, key: &KeyEvent) {
    let Some(data) = app.ctx.settings.as_mut() else {
        tracing::warn!("settings keyed without data");
        return;
    };

    if keymap::is_up(key) {
        data.select_prev();
    } else if keymap::is_down(key) {
        data.select_next();
    } else if keymap::is_enter(key) {
        let Some(row) = data.settings.get(data.selected_index).cloned() else {
            return;
        };
        match row.kind {
            SettingKind::Bool => {
                // boolはその場でトグルする。
                let current = app.config.bool_value(&row.attr).unwrap_or(false);
                app.config.set_bool(&row.attr, !current);
            }
            SettingKind::Int => {
                // intは対象属性を覚えて数値入力へ。
                let current = app.config.int_value(&row.attr).unwrap_or(0);
                transition_to_number_input(
                    app,
                    format!("Enter {}", row.name),
                    current,
                    Some(row.attr),
                );
            }
        }
    } else if keymap::is_quit(key) {
        app.ctx.state = UiState::StyleSelection;
    }
}

/// 数値入力モーダルのキー処理。
fn handle_number_input_key(app: &mut App, key: &KeyEvent) {
    let Some(data) = app.ctx.number_input.as_mut() else {
        tracing::warn!("number input keyed without data");
        return;
    };

    if let Some(digit) = keymap::digit(key) {
        data.push_digit(digit);
    } else if keymap::is_backspace(key) {
        data.backspace();
    } else if keymap::is_enter(key) {
        // 検証に失敗した場合は状態を変えず、入力し直しを待つ。
        if data.confirm() {
            apply_number_input_result(app);
        }
    } else if keymap::is_esc(key) {
        cancel_number_input(app);
    }
}

/// 数値入力モーダルへ遷移する。戻り先は現在の状態。
fn transition_to_number_input(
    app: &mut App,
    prompt: String,
    default: i64,
    target_attr: Option<String>,
) {
    let mut data = NumberInputData::new(prompt, default, app.ctx.state);
    data.target_attr = target_attr;
    app.ctx.number_input = Some(data);
    app.ctx.state = UiState::NumberInput;
}

/// 確定した数値を反映する。対象属性があればConfigへ書いて設定画面へ
/// 戻り、無ければ間隔として確定し全体をConfirmedにする。
fn apply_number_input_result(app: &mut App) {
    let Some(data) = app.ctx.number_input.as_ref() else {
        return;
    };
    let Some(result) = data.result else {
        return;
    };

    match data.target_attr.clone() {
        Some(attr) => {
            if !app.config.set_int(&attr, result) {
                tracing::warn!("unknown config attribute '{attr}'");
            }
            app.ctx.state = UiState::Settings;
        }
        None => {
            app.ctx.selected_interval = result;
            app.ctx.state = UiState::Confirmed;
        }
    }
}

/// 数値入力を取りやめて元の画面へ戻る。
fn cancel_number_input(app: &mut App) {
    let return_state = app
        .ctx
        .number_input
        .as_ref()
        .map(|d| d.return_state)
        .unwrap_or(UiState::StyleSelection);
    app.ctx.state = return_state;
}

/// 統計スナップショットを読み直す。描画を純粋に保つため、統計は
/// 操作のタイミングでだけ取得する。
fn refresh_usage_snapshot(app: &mut App) {
    let stats = app.store.load_stats();
    let top = app
        .store
        .top_styles(5)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    if let Some(data) = app.ctx.style_manager.as_mut() {
        data.usage_counts = stats
            .styles
            .iter()
            .map(|(name, usage)| (name.clone(), usage.count))
            .collect();
        data.top_names = top;
    }
}

/// スタイル管理画面へ入る。一覧はその都度ディスクから作り直す。
fn enter_style_manager(app: &mut App) {
    let mut data = StyleManagerData {
        styles: app.store.load_styles(),
        favorites: app.store.load_favorites(),
        ..StyleManagerData::default()
    };
    data.resort();
    app.ctx.style_manager = Some(data);
    refresh_usage_snapshot(app);
    app.ctx.state = UiState::StyleManager;
}

/// スタイル管理画面のキー処理。
fn handle_style_manager_key(app: &mut App, key: &KeyEvent) {
    let Some(data) = app.ctx.style_manager.as_mut() else {
        tracing::warn!("style manager keyed without data");
        return;
    };

    if keymap::is_up(key) {
        data.select_prev();
        data.message.clear();
    } else if keymap::is_down(key) {
        data.select_next();
        data.message.clear();
    } else if keymap::is_add(key) {
        enter_style_editor(app, None);
    } else if keymap::is_edit(key) {
        if let Some(name) = data.selected_name().map(str::to_string) {
            enter_style_editor(app, Some(&name));
        }
    } else if keymap::is_copy(key) {
        if let Some(name) = data.selected_name().map(str::to_string) {
            copy_style(app, &name);
        }
    } else if keymap::is_favorite(key) {
        if let Some(name) = data.selected_name().map(str::to_string) {
            toggle_favorite(app, &name);
        }
    } else if keymap::is_sort(key) {
        data.sort_mode = data.sort_mode.toggled();
        data.resort();
        data.message = format!("Sorted {}", data.sort_mode.label());
    } else if keymap::is_delete(key) {
        if let Some(name) = data.selected_name().map(str::to_string) {
            show_delete_confirmation(app, &name);
        }
    } else if keymap::is_export(key) {
        export_styles(app);
    } else if keymap::is_import(key) {
        import_styles(app);
    } else if keymap::is_esc(key) {
        // 選択画面の一覧を最新状態へ作り直してから戻る。
        reload_style_selection(app);
        app.ctx.state = UiState::StyleSelection;
    }
}

/// スタイル編集画面へ入る。Noneなら新規、Someなら既存の読み込み。
fn enter_style_editor(app: &mut App, style_name: Option<&str>) {
    let editor = match style_name {
        None => StyleEditorData::new_style(),
        Some(name) => {
            let Some(manager) = app.ctx.style_manager.as_ref() else {
                return;
            };
            let Some(entry) = manager.styles.get(name) else {
                return;
            };
            StyleEditorData::existing(name, &entry.content)
        }
    };
    app.ctx.style_editor = Some(editor);
    app.ctx.state = UiState::StyleEditor;
}

/// スタイル編集画面のキー処理。
fn handle_style_editor_key(app: &mut App, key: &KeyEvent) {
    let Some(data) = app.ctx.style_editor.as_mut() else {
        tracing::warn!("style editor keyed without data");
        return;
    };

    if keymap::is_tab(key) {
        data.switch_field();
    } else if keymap::is_enter(key) {
        if data.is_editing_name {
            // 名前フィールドのEnterは保存。
            save_style_from_editor(app);
        } else {
            // 本文フィールドのEnterは改行挿入。
            data.insert_char('\n');
            data.error_message.clear();
        }
    } else if keymap::is_esc(key) {
        // エディタのESCは破棄ではなく保存して戻る。
        save_style_from_editor(app);
    } else if keymap::is_backspace(key) {
        data.backspace();
        data.error_message.clear();
    } else if keymap::is_space(key) {
        if data.is_editing_name {
            // 名前にスペースは許可しない。
            data.error_message = "Style names cannot contain spaces".into();
        } else {
            data.insert_char(' ');
            data.error_message.clear();
        }
    } else if keymap::is_left(key) {
        data.move_cursor_left();
    } else if keymap::is_right(key) {
        data.move_cursor_right();
    } else if let Some(c) = keymap::printable(key) {
        data.insert_char(c);
        data.error_message.clear();
    }
}

/// 編集内容を検証して保存する。検証エラーは画面に残して編集を
/// 続行させ、成功時は管理画面へ戻って保存した項目を選択する。
fn save_style_from_editor(app: &mut App) {
    let Some(editor) = app.ctx.style_editor.as_mut() else {
        return;
    };

    if let Some(error) = app
        .store
        .validate_style(&editor.style_name, &editor.content)
    {
        editor.error_message = error;
        return;
    }

    let name = editor.style_name.clone();
    let original = editor.original_name.clone();
    let is_new = editor.is_new;
    let content = editor.content.clone();

    let Some(manager) = app.ctx.style_manager.as_mut() else {
        tracing::warn!("style editor saved without manager data");
        return;
    };

    let mut styles = manager.styles.clone();
    // 改名の場合は旧名を取り除いてから登録する。
    if !is_new && original != name {
        styles.remove(&original);
    }
    styles.insert(name.clone(), StyleEntry::system(content));

    match app.store.save_styles(&styles) {
        Ok(()) => {
            manager.styles = styles;
            manager.resort();
            manager.select_style(&name);
            manager.message = format!("Successfully saved '{name}'");
            reload_style_selection(app);
            app.ctx.state = UiState::StyleManager;
        }
        Err(e) => {
            tracing::error!("failed to save style '{name}': {e}");
            if let Some(editor) = app.ctx.style_editor.as_mut() {
                editor.error_message = "Failed to save style to file".into();
            }
        }
    }
}

/// 削除前の確認ダイアログを出す。
fn show_delete_confirmation(app: &mut App, style_name: &str) {
    app.ctx.confirmation = Some(ConfirmationData {
        prompt: format!("Delete style '{style_name}'?"),
        action_name: style_name.to_string(),
        confirmed: None,
        previous_state: UiState::StyleManager,
    });
    app.ctx.state = UiState::Confirmation;
}

/// 確認ダイアログのキー処理。yだけが破壊的操作を実行する。
fn handle_confirmation_key(app: &mut App, key: &KeyEvent) {
    let Some(data) = app.ctx.confirmation.as_mut() else {
        tracing::warn!("confirmation keyed without data");
        return;
    };

    if keymap::is_yes(key) {
        data.confirmed = Some(true);
        let target = data.action_name.clone();
        let previous = data.previous_state;
        execute_delete_style(app, &target);
        app.ctx.state = previous;
    } else if keymap::is_no(key) || keymap::is_esc(key) {
        data.confirmed = Some(false);
        app.ctx.state = data.previous_state;
    }
}

/// 確認済みの削除を実行して永続化する。
fn execute_delete_style(app: &mut App, style_name: &str) {
    let Some(data) = app.ctx.style_manager.as_mut() else {
        return;
    };
    if !data.styles.contains_key(style_name) {
        return;
    }

    let mut styles = data.styles.clone();
    styles.remove(style_name);

    match app.store.save_styles(&styles) {
        Ok(()) => {
            // ディスクと同期し直してから並べ替える。
            data.styles = app.store.load_styles();
            data.resort();
            data.message = format!("Deleted '{style_name}'");
        }
        Err(e) => {
            tracing::error!("failed to delete style '{style_name}': {e}");
            data.message = format!("Failed to delete '{style_name}'");
        }
    }
}

/// スタイルを複製する。名前は_copy、_copy_2…の順で空きを探す。
fn copy_style(app: &mut App, style_name: &str) {
    let Some(data) = app.ctx.style_manager.as_mut() else {
        return;
    };
    let Some(entry) = data.styles.get(style_name).cloned() else {
        return;
    };

    let mut copy_num = 1;
    let mut new_name = format!("{style_name}_copy");
    while data.styles.contains_key(&new_name) {
        copy_num += 1;
        new_name = format!("{style_name}_copy_{copy_num}");
    }

    let mut styles = data.styles.clone();
    styles.insert(new_name.clone(), entry);

    match app.store.save_styles(&styles) {
        Ok(()) => {
            data.styles = app.store.load_styles();
            data.resort();
            data.select_style(&new_name);
            data.message = format!("Copied to '{new_name}'");
            reload_style_selection(app);
        }
        Err(e) => {
            tracing::error!("failed to copy style '{style_name}': {e}");
            data.message = format!("Failed to copy '{style_name}'");
        }
    }
}

/// お気に入りを反転して保存し、同じスタイルを選択し続ける。
fn toggle_favorite(app: &mut App, style_name: &str) {
    let Some(data) = app.ctx.style_manager.as_mut() else {
        return;
    };

    let updated = app.store.toggle_favorite(style_name, &data.favorites);
    match app.store.save_favorites(&updated) {
        Ok(()) => {
            data.favorites = updated;
            data.resort();
            data.select_style(style_name);
            let status = if data.favorites.iter().any(|n| n == style_name) {
                "★ Starred"
            } else {
                "☆ Unstarred"
            };
            data.message = format!("{status}: '{style_name}'");
        }
        Err(e) => {
            tracing::error!("failed to save favorites: {e}");
            data.message = "Failed to save favorites".into();
        }
    }
}

/// 全スタイルをスナップショットへ書き出す。
fn export_styles(app: &mut App) {
    let Some(data) = app.ctx.style_manager.as_mut() else {
        return;
    };

    match app.store.export_styles(&data.styles, None) {
        Ok(path) => {
            let file = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("export")
                .to_string();
            data.message = format!("Exported to {file}");
        }
        Err(e) => {
            tracing::error!("export failed: {e}");
            data.message = "Export failed".into();
        }
    }
}

/// 最新のスナップショットから取り込む。同名は既存側を優先する。
fn import_styles(app: &mut App) {
    let Some(latest) = app.store.latest_export() else {
        if let Some(data) = app.ctx.style_manager.as_mut() {
            data.message = "No export files found".into();
        }
        return;
    };

    let file = latest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("export")
        .to_string();

    let merged = match app.store.import_styles(&latest, true) {
        Ok(styles) => styles,
        Err(e) => {
            tracing::error!("import failed: {e}");
            if let Some(data) = app.ctx.style_manager.as_mut() {
                data.message = "Import failed".into();
            }
            return;
        }
    };

    let Some(data) = app.ctx.style_manager.as_mut() else {
        return;
    };
    match app.store.save_styles(&merged) {
        Ok(()) => {
            data.styles = app.store.load_styles();
            data.resort();
            data.message = format!("Imported from {file}");
            reload_style_selection(app);
        }
        Err(e) => {
            tracing::error!("failed to save imported styles: {e}");
            data.message = "Failed to save imported styles".into();
        }
    }
}

/// 選択画面の一覧と数字キー対応表をディスクの内容から作り直す。
fn reload_style_selection(app: &mut App) {
    let styles = app.store.load_styles();
    let Some(selection) = app.ctx.selection.as_mut() else {
        // チャット起動などで選択画面が無いまま管理画面を使った場合。
        return;
    };

    let mut items = Vec::new();
    let mut mapping = std::collections::HashMap::new();
    for (i, name) in styles.keys().enumerate() {
        let key = (i + 1).to_string();
        items.push((key.clone(), styles::display_name(name)));
        mapping.insert(key, name.clone());
    }

    selection.items = items;
    app.ctx.style_key_mapping = mapping;

    // 一覧が縮んでも選択位置が範囲内に収まるようにする。
    if selection.selected_index >= selection.items.len() {
        selection.selected_index = selection.items.len().saturating_sub(1);
    }
}

/// 自由入力（チャット）画面のキー処理。
fn handle_text_input_key(app: &mut App, key: &KeyEvent) {
    let Some(data) = app.ctx.text_input.as_mut() else {
        tracing::warn!("text input keyed without data");
        return;
    };

    if keymap::is_enter(key) {
        // 入力を確定してセッションを終える。
        app.ctx.user_message = Some(data.current_value.clone());
        app.ctx.state = UiState::Confirmed;
    } else if keymap::is_esc(key) {
        app.ctx.state = UiState::Cancelled;
    } else if keymap::is_backspace(key) {
        data.backspace();
    } else if keymap::is_left(key) {
        data.move_cursor_left();
    } else if keymap::is_right(key) {
        data.move_cursor_right();
    } else if keymap::is_space(key) {
        data.insert_char(' ');
    } else if let Some(c) = keymap::printable(key) {
        data.insert_char(c);
    }
}
