use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Send,
    Newline,
    ToggleOpen,
    Minimize,
    Reset,
    Sample(usize),
    ScrollUp,
    ScrollDown,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Quit => write!(f, "Quit"),
            Action::Send => write!(f, "Send message"),
            Action::Newline => write!(f, "New line"),
            Action::ToggleOpen => write!(f, "Open / close assistant"),
            Action::Minimize => write!(f, "Minimize to bubble"),
            Action::Reset => write!(f, "Reset conversation"),
            Action::Sample(n) => write!(f, "Use sample question {}", n + 1),
            Action::ScrollUp => write!(f, "Scroll up"),
            Action::ScrollDown => write!(f, "Scroll down"),
        }
    }
}
