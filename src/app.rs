use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;

use rescramble::config::Config;
use rescramble::{FrameQueue, RenderedFrame, ScrambleText, TextProps};

use crate::keys::{Command, KeyMap};
use crate::theme::Theme;

/// Slowest frame rate the host will run at.
const MAX_FRAME_INTERVAL_MS: u64 = 60_000;

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Terminal host for one [`ScrambleText`]: owns the frame queue and decides
/// which phrase is targeted.
pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub autoplay: bool,
    pub should_quit: bool,
    keymap: KeyMap,
    text: ScrambleText,
    queue: FrameQueue,
    index: usize,
    settled_at: Option<Instant>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let text = ScrambleText::new(config.animation.scramble_settings());
        Self {
            theme: Theme::new(&config.colors, &config.border),
            keymap: KeyMap::from_config(&config.keys),
            autoplay: config.animation.autoplay,
            should_quit: false,
            text,
            queue: FrameQueue::new(),
            index: 0,
            settled_at: None,
            config,
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.config.phrases
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frame_interval(&self) -> Duration {
        let ms = self.config.animation.frame_interval_ms;
        Duration::from_millis(ms.clamp(1, MAX_FRAME_INTERVAL_MS))
    }

    pub fn current_frame(&self) -> Option<&RenderedFrame> {
        self.text.last_frame()
    }

    pub fn displayed(&self) -> &str {
        self.text.displayed()
    }

    pub fn is_animating(&self) -> bool {
        self.text.is_animating()
    }

    /// Widest phrase, in chars, for sizing the box.
    pub fn widest_phrase(&self) -> usize {
        self.phrases()
            .iter()
            .map(|p| p.chars().count())
            .max()
            .unwrap_or(0)
    }

    pub fn start(&mut self) {
        let props = self.props();
        self.text.mount(props, &mut self.queue);
    }

    pub fn next(&mut self) {
        if !self.phrases().is_empty() {
            self.index = (self.index + 1) % self.phrases().len();
            self.retarget();
        }
    }

    pub fn previous(&mut self) {
        if !self.phrases().is_empty() {
            self.index = self
                .index
                .checked_sub(1)
                .unwrap_or(self.phrases().len() - 1);
            self.retarget();
        }
    }

    pub fn toggle_autoplay(&mut self) {
        self.autoplay = !self.autoplay;
        self.settled_at = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn handle_key(&mut self, event: &KeyEvent) {
        match self.keymap.lookup(event) {
            Some(Command::Next) => self.next(),
            Some(Command::Previous) => self.previous(),
            Some(Command::ToggleAutoplay) => self.toggle_autoplay(),
            Some(Command::Quit) => self.quit(),
            None => {}
        }
    }

    /// Fire every frame request issued before this call. Returns how many
    /// frames were rendered.
    pub fn fire_frames(&mut self) -> usize {
        let mut rendered = 0;
        for request in self.queue.take_pending() {
            if self.text.on_frame(&request, &mut self.queue).is_some() {
                rendered += 1;
            }
        }
        rendered
    }

    /// Move to the next phrase once the current one has been still for
    /// `hold_ms`.
    pub fn advance_if_held(&mut self, now: Instant) {
        if !self.autoplay || self.text.is_animating() || self.phrases().len() < 2 {
            return;
        }
        let settled_at = *self.settled_at.get_or_insert(now);
        if now.duration_since(settled_at) >= Duration::from_millis(self.config.animation.hold_ms) {
            self.next();
        }
    }

    pub fn shutdown(&mut self) {
        self.text.unmount();
    }

    fn retarget(&mut self) {
        self.settled_at = None;
        let props = self.props();
        self.text.update(props, &mut self.queue);
    }

    fn props(&self) -> TextProps {
        let phrase = self.phrases().get(self.index).cloned().unwrap_or_default();
        TextProps::new(phrase).with_speed(self.config.animation.speed)
    }
}
