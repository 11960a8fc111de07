//! アプリケーションのエントリポイントとランタイム初期化。

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

mod app;
mod config;
mod events;
mod keymap;
mod state;
mod styles;
mod theme;
mod ui;
mod widgets;

use config::Config;
use styles::StylePersistence;

/// コマンドライン引数。
#[derive(Parser)]
#[command(name = "commentator_tui", about = "Style selection TUI for the screen commentator")]
struct Cli {
    /// スタイル選択を飛ばしてチャット入力から始める。
    #[arg(long)]
    chat: bool,

    /// 設定ファイルのパス。
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

/// 実行結果。セッションの種類ごとに確定値を持つ。
enum Outcome {
    Selection {
        style: Option<(String, String)>,
        interval: i64,
    },
    Chat(Option<String>),
}

/// ファイルロギングを初期化し、非同期ガードを生存させる。
fn init_logging(log_file: &str) -> Result<WorkerGuard> {
    // TUIの標準出力を汚さないよう、ファイルへ直接書き込む。
    let file_appender = tracing_appender::rolling::never(".", log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    tracing::info!("logging to {}", log_file);
    Ok(guard)
}

/// エントリポイント：ログ初期化→UI開始→端末復元。
fn main() -> Result<()> {
    let cli = Cli::parse();

    // 設定を読み込む（初回はデフォルトを生成）。
    let mut cfg = Config::load_or_default(&cli.config)?;

    // ロガーを初期化し、ガードを保持して書き込みを継続させる。
    let _log_guard = init_logging(&cfg.paths.log_file)?;
    tracing::info!("app starting");

    // スタイルストアは設定のパスから作り、エンジンへ注入する。
    let store = StylePersistence::new(PathBuf::from(&cfg.paths.styles_file));

    // TUI用の端末状態へ切り替えてエンジンを実行する。
    let mut terminal = ui::init_terminal()?;
    let res = run_session(&mut terminal, &cli, &mut cfg, &store);
    // 端末の状態を必ず元に戻す。
    ui::restore_terminal()?;

    match &res {
        Ok(Outcome::Selection {
            style: Some((display, internal)),
            interval,
        }) => {
            // 確定した選択を記録し、次回デフォルトへ反映する。
            store.record_usage(internal);
            cfg.general.interval_seconds = *interval;
            cfg.save(&cli.config)?;
            println!("Style: {display} ({internal})");
            println!("Interval: {interval}s");
        }
        Ok(Outcome::Selection {
            style: None,
            interval,
        }) => {
            println!("Selection cancelled (interval {interval}s)");
        }
        Ok(Outcome::Chat(Some(message))) => {
            println!("Message: {message}");
        }
        Ok(Outcome::Chat(None)) => {
            println!("Chat cancelled");
        }
        Err(e) => {
            tracing::error!("app error: {e}");
        }
    }

    tracing::info!("app exiting");
    res.map(|_| ())
}

/// CLIフラグに応じて選択セッションかチャットセッションを実行する。
fn run_session(
    terminal: &mut ui::Tui,
    cli: &Cli,
    cfg: &mut Config,
    store: &StylePersistence,
) -> Result<Outcome> {
    if cli.chat {
        // 単体起動のチャットには事前履歴が無い。
        let message = app::run_chat(terminal, &[], cfg, store)?;
        return Ok(Outcome::Chat(message));
    }

    let menu = build_style_menu(store);
    let (style, interval) = app::run_selection(terminal, &menu, cfg, store)?;
    Ok(Outcome::Selection { style, interval })
}

/// ストアの内容から数字キー付きメニューを組み立てる。
fn build_style_menu(store: &StylePersistence) -> Vec<(String, (String, String))> {
    store
        .load_styles()
        .keys()
        .enumerate()
        .map(|(i, name)| {
            (
                (i + 1).to_string(),
                (styles::display_name(name), name.clone()),
            )
        })
        .collect()
}
