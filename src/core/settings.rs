use ratatui::style::Color;

/// Colors used for the selection marks in the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub name: &'static str,
    pub selected: Color,
    pub partial: Color,
    pub unselected: Color,
    pub directory: Color,
}

pub const SCHEMES: [ColorScheme; 3] = [
    ColorScheme {
        name: "default",
        selected: Color::Green,
        partial: Color::Yellow,
        unselected: Color::Reset,
        directory: Color::Blue,
    },
    ColorScheme {
        name: "ocean",
        selected: Color::Cyan,
        partial: Color::LightBlue,
        unselected: Color::Gray,
        directory: Color::LightCyan,
    },
    ColorScheme {
        name: "mono",
        selected: Color::White,
        partial: Color::Gray,
        unselected: Color::DarkGray,
        directory: Color::White,
    },
];

/// Presentation configuration of the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub emoji: bool,
    scheme: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            emoji: false,
            scheme: 0,
        }
    }
}

impl Settings {
    /// Settings using the scheme called `name`, if there is one.
    pub fn with_scheme(emoji: bool, name: &str) -> Option<Self> {
        let scheme = SCHEMES
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))?;
        Some(Self { emoji, scheme })
    }

    pub fn scheme(&self) -> &'static ColorScheme {
        &SCHEMES[self.scheme % SCHEMES.len()]
    }

    pub fn toggle_emoji(&mut self) {
        self.emoji = !self.emoji;
    }

    pub fn next_scheme(&mut self) {
        self.scheme = (self.scheme + 1) % SCHEMES.len();
    }

    pub fn prev_scheme(&mut self) {
        self.scheme = (self.scheme + SCHEMES.len() - 1) % SCHEMES.len();
    }
}

pub fn scheme_names() -> Vec<&'static str> {
    SCHEMES.iter().map(|s| s.name).collect()
}
