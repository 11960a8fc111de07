//! スタイル定義の永続化レイヤ。
//!
//! styles.jsonを正とし、お気に入り・利用統計・エクスポートを
//! 同じディレクトリの隠しファイル/サブディレクトリで管理する。
//! UI側は失敗を画面メッセージへ変換するため、ここでは
//! anyhow::Resultで素直にエラーを返す。

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// スタイル1件。roleは現状systemのみだが形式として保持する。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleEntry {
    pub role: String,
    pub content: String,
}

impl StyleEntry {
    /// system roleのスタイルを作る。
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }
}

/// 名前→スタイルの順序付きマップ。BTreeMapで常にキー順。
pub type StyleMap = BTreeMap<String, StyleEntry>;

/// .favorites.jsonのファイル形式。
#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesFile {
    #[serde(default)]
    favorites: Vec<String>,
}

/// スタイル1件の利用統計。
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StyleUsage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub last_used: Option<String>,
}

/// .stats.jsonのファイル形式。
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default)]
    pub styles: HashMap<String, StyleUsage>,
}

/// エクスポートスナップショットのファイル形式。
#[derive(Debug, Serialize, Deserialize)]
struct ExportFile {
    version: String,
    export_date: String,
    styles: StyleMap,
}

/// スタイルストアへのアクセスをまとめた永続化コラボレータ。
/// グローバルは持たず、利用側が生成して注入する。
#[derive(Clone, Debug)]
pub struct StylePersistence {
    styles_file: PathBuf,
}

impl StylePersistence {
    pub fn new(styles_file: PathBuf) -> Self {
        Self { styles_file }
    }

    fn parent_dir(&self) -> PathBuf {
        self.styles_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn favorites_file(&self) -> PathBuf {
        self.parent_dir().join(".favorites.json")
    }

    fn stats_file(&self) -> PathBuf {
        self.parent_dir().join(".stats.json")
    }

    /// エクスポート先ディレクトリ。
    pub fn exports_dir(&self) -> PathBuf {
        self.parent_dir().join("exports")
    }

    /// スタイル一覧を読み込む。ファイルが無い・壊れている場合は
    /// 空のマップへ縮退する（UIは空一覧として動き続ける）。
    pub fn load_styles(&self) -> StyleMap {
        if !self.styles_file.exists() {
            return StyleMap::new();
        }
        match fs::read_to_string(&self.styles_file)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str::<StyleMap>(&s).map_err(Into::into))
        {
            Ok(styles) => styles,
            Err(e) => {
                tracing::error!("failed to load styles: {e}");
                StyleMap::new()
            }
        }
    }

    /// スタイル一覧を書き戻す。本文が空のエントリは削除済みとして
    /// 除外する。
    pub fn save_styles(&self, styles: &StyleMap) -> Result<()> {
        let filtered: StyleMap = styles
            .iter()
            .filter(|(_, entry)| !entry.content.trim().is_empty())
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();
        let json = serde_json::to_string_pretty(&filtered)?;
        fs::write(&self.styles_file, json)
            .with_context(|| format!("writing {}", self.styles_file.display()))?;
        Ok(())
    }

    /// 名前と本文を検証する。問題があればエラーメッセージを返す。
    pub fn validate_style(&self, name: &str, content: &str) -> Option<String> {
        if name.trim().is_empty() {
            return Some("Style name cannot be empty".into());
        }
        // 英数字とアンダースコア・ハイフンのみ許可。記号だけの名前も弾く。
        let stripped: String = name.chars().filter(|c| *c != '_' && *c != '-').collect();
        if stripped.is_empty() || !stripped.chars().all(char::is_alphanumeric) {
            return Some("Style name must be alphanumeric (underscores and hyphens allowed)".into());
        }
        if content.trim().is_empty() {
            return Some("Style content cannot be empty".into());
        }
        None
    }

    /// お気に入り一覧を読み込む。失敗時は空。
    pub fn load_favorites(&self) -> Vec<String> {
        let path = self.favorites_file();
        if !path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str::<FavoritesFile>(&s).map_err(Into::into))
        {
            Ok(file) => file.favorites,
            Err(e) => {
                tracing::error!("failed to load favorites: {e}");
                Vec::new()
            }
        }
    }

    /// お気に入り一覧を保存する。
    pub fn save_favorites(&self, favorites: &[String]) -> Result<()> {
        let file = FavoritesFile {
            favorites: favorites.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(self.favorites_file(), json).context("writing favorites")?;
        Ok(())
    }

    /// お気に入り状態を反転した新しい一覧を返す。保存はしない。
    pub fn toggle_favorite(&self, style_name: &str, favorites: &[String]) -> Vec<String> {
        let mut updated = favorites.to_vec();
        if let Some(pos) = updated.iter().position(|n| n == style_name) {
            updated.remove(pos);
        } else {
            updated.push(style_name.to_string());
        }
        updated
    }

    /// 利用統計を読み込む。失敗時は空の統計。
    pub fn load_stats(&self) -> UsageStats {
        let path = self.stats_file();
        if !path.exists() {
            return UsageStats::default();
        }
        match fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str::<UsageStats>(&s).map_err(Into::into))
        {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!("failed to load stats: {e}");
                UsageStats::default()
            }
        }
    }

    /// 利用統計を保存する。
    pub fn save_stats(&self, stats: &UsageStats) -> Result<()> {
        let json = serde_json::to_string_pretty(stats)?;
        fs::write(self.stats_file(), json).context("writing stats")?;
        Ok(())
    }

    /// スタイルの利用を1回分記録する。統計は補助情報なので、
    /// 保存失敗はログに残すだけで呼び出し側へは伝播しない。
    pub fn record_usage(&self, style_name: &str) {
        let mut stats = self.load_stats();
        let usage = stats.styles.entry(style_name.to_string()).or_default();
        usage.count += 1;
        usage.last_used = Some(chrono::Local::now().to_rfc3339());
        if let Err(e) = self.save_stats(&stats) {
            tracing::warn!("failed to record usage for '{style_name}': {e}");
        }
    }

    /// 利用回数の多い順に上位n件の(名前, 回数)を返す。
    pub fn top_styles(&self, n: usize) -> Vec<(String, u64)> {
        let stats = self.load_stats();
        let mut items: Vec<(String, u64)> = stats
            .styles
            .into_iter()
            .map(|(name, usage)| (name, usage.count))
            .collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        items.truncate(n);
        items
    }

    /// スタイル一覧をタイムスタンプ付きスナップショットへ書き出す。
    /// 出力先を省略するとexports/以下に日時名で作る。
    pub fn export_styles(&self, styles: &StyleMap, export_path: Option<PathBuf>) -> Result<PathBuf> {
        let path = match export_path {
            Some(p) => p,
            None => {
                let dir = self.exports_dir();
                fs::create_dir_all(&dir).context("creating exports dir")?;
                let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
                dir.join(format!("styles_export_{stamp}.json"))
            }
        };
        let file = ExportFile {
            version: "1.0".into(),
            export_date: chrono::Local::now().to_rfc3339(),
            styles: styles.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// exports/内で最も新しいスナップショットを返す。無ければNone。
    pub fn latest_export(&self) -> Option<PathBuf> {
        let dir = self.exports_dir();
        let entries = fs::read_dir(&dir).ok()?;
        entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("styles_export_") && n.ends_with(".json"))
            })
            .max_by_key(|p| {
                p.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
            })
    }

    /// スナップショットからスタイルを取り込む。mergeの場合は既存を
    /// 優先し、同名の取り込み分は捨てる。
    pub fn import_styles(&self, import_path: &Path, merge: bool) -> Result<StyleMap> {
        let raw = fs::read_to_string(import_path)
            .with_context(|| format!("reading {}", import_path.display()))?;
        let file: ExportFile = serde_json::from_str(&raw).context("parsing export file")?;

        if !merge {
            return Ok(file.styles);
        }

        let mut merged = self.load_styles();
        for (name, entry) in file.styles {
            merged.entry(name).or_insert(entry);
        }
        Ok(merged)
    }
}

/// 内部名をメニュー表示用に変換する（snake_case → Title Case）。
pub fn display_name(style_key: &str) -> String {
    style_key
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, StylePersistence) {
        let dir = TempDir::new().unwrap();
        let persistence = StylePersistence::new(dir.path().join("styles.json"));
        (dir, persistence)
    }

    fn sample_styles() -> StyleMap {
        StyleMap::from([
            ("pirate".to_string(), StyleEntry::system("Talk like a pirate.")),
            ("poet".to_string(), StyleEntry::system("Answer in verse.")),
        ])
    }

    #[test]
    fn test_save_load_round_trip() {
        // 保存直後の読み込みが同じマップを返すことを検証する。
        let (_dir, store) = store();
        let styles = sample_styles();
        store.save_styles(&styles).unwrap();
        assert_eq!(store.load_styles(), styles);
        // もう一往復しても変化しない。
        store.save_styles(&store.load_styles()).unwrap();
        assert_eq!(store.load_styles(), styles);
    }

    #[test]
    fn test_save_filters_empty_content() {
        // 本文が空のスタイルは保存時に除外されることを検証する。
        let (_dir, store) = store();
        let mut styles = sample_styles();
        styles.insert("ghost".to_string(), StyleEntry::system("   "));
        store.save_styles(&styles).unwrap();
        let reloaded = store.load_styles();
        assert!(!reloaded.contains_key("ghost"));
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.load_styles().is_empty());
        assert!(store.load_favorites().is_empty());
        assert_eq!(store.load_stats().styles.len(), 0);
    }

    #[test]
    fn test_toggle_favorite_is_self_inverse() {
        // 2回トグルすると元の一覧へ戻ることを検証する。
        let (_dir, store) = store();
        let favorites = vec!["pirate".to_string()];
        let once = store.toggle_favorite("poet", &favorites);
        assert_eq!(once, vec!["pirate".to_string(), "poet".to_string()]);
        let twice = store.toggle_favorite("poet", &once);
        assert_eq!(twice, favorites);
    }

    #[test]
    fn test_favorites_round_trip() {
        let (_dir, store) = store();
        let favorites = vec!["poet".to_string(), "pirate".to_string()];
        store.save_favorites(&favorites).unwrap();
        assert_eq!(store.load_favorites(), favorites);
    }

    #[test]
    fn test_validate_style() {
        let (_dir, store) = store();
        assert!(store.validate_style("pirate", "content").is_none());
        assert!(store.validate_style("pirate_v2-b", "content").is_none());
        // 空の名前。
        assert!(store.validate_style("", "content").is_some());
        assert!(store.validate_style("   ", "content").is_some());
        // 使用不可の文字。
        assert!(store.validate_style("pi rate", "content").is_some());
        assert!(store.validate_style("pirate!", "content").is_some());
        // 記号のみの名前。
        assert!(store.validate_style("___", "content").is_some());
        // 空の本文。
        assert!(store.validate_style("pirate", "").is_some());
        assert!(store.validate_style("pirate", "  \n ").is_some());
    }

    #[test]
    fn test_record_usage_and_top_styles() {
        let (_dir, store) = store();
        store.record_usage("pirate");
        store.record_usage("pirate");
        store.record_usage("poet");
        let top = store.top_styles(5);
        assert_eq!(top[0], ("pirate".to_string(), 2));
        assert_eq!(top[1], ("poet".to_string(), 1));
        // last_usedも更新されている。
        let stats = store.load_stats();
        assert!(stats.styles["pirate"].last_used.is_some());
        // nで打ち切られる。
        assert_eq!(store.top_styles(1).len(), 1);
    }

    #[test]
    fn test_export_import_merge_prefers_existing() {
        // インポート時の同名衝突で既存側が勝つことを検証する。
        let (_dir, store) = store();
        let exported = StyleMap::from([
            ("pirate".to_string(), StyleEntry::system("Old pirate text.")),
            ("newcomer".to_string(), StyleEntry::system("Fresh style.")),
        ]);
        let path = store.export_styles(&exported, None).unwrap();
        assert!(path.exists());

        // 既存側のpirateは書き換えられた状態にしておく。
        let current = StyleMap::from([(
            "pirate".to_string(),
            StyleEntry::system("Current pirate text."),
        )]);
        store.save_styles(&current).unwrap();

        let merged = store.import_styles(&path, true).unwrap();
        assert_eq!(merged["pirate"].content, "Current pirate text.");
        assert_eq!(merged["newcomer"].content, "Fresh style.");
    }

    #[test]
    fn test_latest_export_found() {
        let (_dir, store) = store();
        assert!(store.latest_export().is_none());
        store.export_styles(&sample_styles(), None).unwrap();
        let latest = store.latest_export().unwrap();
        assert!(
            latest
                .file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("styles_export_")
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("sarcastic"), "Sarcastic");
        assert_eq!(display_name("old_sea_dog"), "Old Sea Dog");
    }
}
