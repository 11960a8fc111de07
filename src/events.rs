//! 非ブロッキングの入力イベント供給源。
//!
//! 描画ループを止めないことが唯一の契約。入力チャネルが使えない
//! 環境（パイプ実行など）では「イベント無し」に縮退し、エラーに
//! しない。ループの終了は常に状態遷移側で決まる。

use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyEvent, KeyEventKind, MouseEvent};

/// UIループへ渡されるイベント。
#[derive(Debug, Clone)]
pub enum Event {
    /// キーボード入力。分類はkeymap側で行う。
    Keyboard(KeyEvent),
    /// マウス入力。将来拡張用に予約しているだけで、現状は未処理。
    #[allow(dead_code)]
    Mouse(MouseEvent),
}

/// crosstermの入力ストリームをポーリングで読むディスパッチャ。
#[derive(Debug, Default)]
pub struct EventDispatcher;

impl EventDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// timeout以内に入力が無ければNoneを返す。timeout=0は純粋な確認のみ。
    pub fn poll(&mut self, timeout: Duration) -> Option<Event> {
        // ポーリング自体の失敗は「入力ソース無し」として扱う。
        match event::poll(timeout) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                tracing::warn!("input poll failed, treating as no input: {e}");
                return None;
            }
        }

        // 読み出しエラーも同様に握りつぶしてループを継続させる。
        match event::read() {
            // キーリリースは無視し、押下とリピートのみ通す。
            Ok(TermEvent::Key(k)) if k.kind != KeyEventKind::Release => Some(Event::Keyboard(k)),
            Ok(TermEvent::Mouse(m)) => Some(Event::Mouse(m)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("input read failed: {e}");
                None
            }
        }
    }
}
