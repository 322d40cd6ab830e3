use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::actions::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        kb.add(Send, KeyCombo::new(KeyCode::Enter, KeyModifiers::NONE));
        // Most terminals cannot report Shift+Enter, so Alt+Enter is the
        // reliable newline chord.
        kb.add(Newline, KeyCombo::new(KeyCode::Enter, KeyModifiers::ALT));
        kb.add(Newline, KeyCombo::new(KeyCode::Enter, KeyModifiers::SHIFT));
        kb.add(
            ToggleOpen,
            KeyCombo::new(KeyCode::Char('o'), KeyModifiers::CONTROL),
        );
        kb.add(Minimize, KeyCombo::new(KeyCode::Esc, KeyModifiers::NONE));
        kb.add(
            Reset,
            KeyCombo::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
        );
        for n in 0..3u8 {
            kb.add(
                Sample(usize::from(n)),
                KeyCombo::new(KeyCode::F(n + 1), KeyModifiers::NONE),
            );
        }
        kb.add(ScrollUp, KeyCombo::new(KeyCode::Up, KeyModifiers::NONE));
        kb.add(ScrollUp, KeyCombo::new(KeyCode::PageUp, KeyModifiers::NONE));
        kb.add(ScrollDown, KeyCombo::new(KeyCode::Down, KeyModifiers::NONE));
        kb.add(
            ScrollDown,
            KeyCombo::new(KeyCode::PageDown, KeyModifiers::NONE),
        );
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        for (act, list) in &self.map {
            if list.iter().any(|c| c.matches(key)) {
                return Some(*act);
            }
        }
        None
    }

    /// Return the first `KeyCombo` mapped to `action`, if any.
    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action).and_then(|list| list.first().cloned())
    }
}
