use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use rescramble::config::KeyConfig;

// ============================================================================
// KEY PARSING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    code: KeyCode,
    ctrl: bool,
    alt: bool,
    shift: bool,
}

impl KeyBinding {
    /// Parse names like `"q"`, `"Space"`, `"Ctrl-c"` or `"Shift-Left"`.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut binding = KeyBinding {
            code: KeyCode::Null,
            ctrl: false,
            alt: false,
            shift: false,
        };

        let mut rest = spec;
        while let Some((modifier, tail)) = rest.split_once('-') {
            if tail.is_empty() {
                break;
            }
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => binding.ctrl = true,
                "alt" => binding.alt = true,
                "shift" => binding.shift = true,
                _ => return None,
            }
            rest = tail;
        }

        binding.code = parse_code(rest)?;
        Some(binding)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.code == event.code
            && self.ctrl == event.modifiers.contains(KeyModifiers::CONTROL)
            && self.alt == event.modifiers.contains(KeyModifiers::ALT)
            && self.shift == event.modifiers.contains(KeyModifiers::SHIFT)
    }
}

fn parse_code(name: &str) -> Option<KeyCode> {
    let code = match name {
        "Esc" | "esc" | "Escape" => KeyCode::Esc,
        "Enter" | "enter" | "Return" => KeyCode::Enter,
        "Space" | "space" => KeyCode::Char(' '),
        "Tab" => KeyCode::Tab,
        "Backspace" => KeyCode::Backspace,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        f if f.len() > 1 && f.starts_with('F') => KeyCode::F(f[1..].parse().ok()?),
        c => {
            let mut chars = c.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyCode::Char(ch),
                _ => return None,
            }
        }
    };
    Some(code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    ToggleAutoplay,
    Quit,
}

/// Parsed bindings for every [`Command`].
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: Vec<(KeyBinding, Command)>,
}

impl KeyMap {
    pub fn from_config(keys: &KeyConfig) -> Self {
        let mut map = KeyMap::default();
        // Quit first so it wins over any overlapping binding.
        map.add(&keys.quit, Command::Quit);
        map.add(&keys.next, Command::Next);
        map.add(&keys.previous, Command::Previous);
        map.add(&keys.toggle_autoplay, Command::ToggleAutoplay);
        map
    }

    fn add(&mut self, names: &[String], command: Command) {
        for name in names {
            match KeyBinding::parse(name) {
                Some(binding) => self.bindings.push((binding, command)),
                None => tracing::warn!(key = %name, ?command, "ignoring unknown key binding"),
            }
        }
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<Command> {
        self.bindings
            .iter()
            .find(|(binding, _)| binding.matches(event))
            .map(|(_, command)| *command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn parses_plain_and_named_keys() {
        assert!(KeyBinding::parse("q").unwrap().matches(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(KeyBinding::parse("Space").unwrap().matches(&press(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert!(KeyBinding::parse("F5").unwrap().matches(&press(KeyCode::F(5), KeyModifiers::NONE)));
        assert!(KeyBinding::parse("-").unwrap().matches(&press(KeyCode::Char('-'), KeyModifiers::NONE)));
    }

    #[test]
    fn modifiers_must_match_exactly() {
        let binding = KeyBinding::parse("Ctrl-c").unwrap();
        assert!(binding.matches(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!binding.matches(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(KeyBinding::parse("Hyper-x").is_none());
        assert!(KeyBinding::parse("Banana").is_none());
    }

    #[test]
    fn default_keymap_routes_commands() {
        let map = KeyMap::from_config(&KeyConfig::default());
        assert_eq!(map.lookup(&press(KeyCode::Right, KeyModifiers::NONE)), Some(Command::Next));
        assert_eq!(map.lookup(&press(KeyCode::Char('h'), KeyModifiers::NONE)), Some(Command::Previous));
        assert_eq!(map.lookup(&press(KeyCode::Char(' '), KeyModifiers::NONE)), Some(Command::ToggleAutoplay));
        assert_eq!(map.lookup(&press(KeyCode::Esc, KeyModifiers::NONE)), Some(Command::Quit));
        assert_eq!(map.lookup(&press(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }
}
