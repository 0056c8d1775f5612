//! CRT-style themes for Platter

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    /// Primary foreground color (text, borders)
    pub fg: Color,
    /// Dimmed foreground (secondary text)
    pub fg_dim: Color,
    /// Background color
    pub bg: Color,
    /// Highlight color (selected items, active elements)
    pub highlight: Color,
    /// Accent color (meters, gauges)
    pub accent: Color,
    /// Warning color
    pub warning: Color,
    /// Error/danger color
    pub danger: Color,
    /// Disc grooves
    pub vinyl: Color,
    /// Center label and its marker
    pub label: Color,
}

impl Theme {
    /// Get style for normal text
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for dimmed text
    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for highlighted/selected items
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for borders
    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Get style for active borders
    pub fn border_active(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    /// Get style for meters/bars based on level (0.0 - 1.0)
    pub fn meter_style(&self, level: f32) -> Style {
        let color = if level > 0.9 {
            self.danger
        } else if level > 0.75 {
            self.warning
        } else {
            self.accent
        };
        Style::default().fg(color)
    }

    /// Get title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Look a theme up by name or alias
    pub fn by_name(name: &str) -> Option<Theme> {
        match name.to_lowercase().as_str() {
            "green" | "phosphor" | "phosphor-green" => Some(CRT_GREEN),
            "amber" | "orange" => Some(CRT_AMBER),
            "cyber" | "cyberpunk" | "neon" => Some(CYBERPUNK),
            _ => None,
        }
    }

    /// Theme after this one in the cycle order
    pub fn next(&self) -> Theme {
        let idx = THEMES.iter().position(|t| t.name == self.name).unwrap_or(0);
        THEMES[(idx + 1) % THEMES.len()].clone()
    }
}

/// Classic phosphor green CRT theme
pub const CRT_GREEN: Theme = Theme {
    name: "phosphor-green",
    fg: Color::Rgb(51, 255, 51),          // #33ff33 - phosphor green
    fg_dim: Color::Rgb(25, 128, 25),      // dimmed green
    bg: Color::Rgb(0, 10, 0),             // near black with green tint
    highlight: Color::Rgb(180, 255, 180), // bright green
    accent: Color::Rgb(100, 255, 100),    // medium green
    warning: Color::Rgb(255, 255, 100),   // yellow-green
    danger: Color::Rgb(255, 100, 100),    // red warning
    vinyl: Color::Rgb(40, 160, 40),
    label: Color::Rgb(150, 255, 200),
};

/// Amber CRT theme (1980s monochrome)
pub const CRT_AMBER: Theme = Theme {
    name: "amber",
    fg: Color::Rgb(255, 176, 0),          // #ffb000 - amber
    fg_dim: Color::Rgb(128, 88, 0),       // dimmed amber
    bg: Color::Rgb(10, 5, 0),             // near black with amber tint
    highlight: Color::Rgb(255, 220, 128), // bright amber
    accent: Color::Rgb(255, 200, 64),     // medium amber
    warning: Color::Rgb(255, 255, 100),   // yellow
    danger: Color::Rgb(255, 100, 100),    // red warning
    vinyl: Color::Rgb(170, 110, 0),
    label: Color::Rgb(255, 230, 150),
};

/// Cyberpunk neon theme
pub const CYBERPUNK: Theme = Theme {
    name: "cyberpunk",
    fg: Color::Rgb(0, 255, 255),        // cyan
    fg_dim: Color::Rgb(0, 128, 128),    // dim cyan
    bg: Color::Rgb(5, 0, 10),           // dark purple-black
    highlight: Color::Rgb(255, 0, 255), // magenta
    accent: Color::Rgb(0, 255, 128),    // neon green
    warning: Color::Rgb(255, 255, 0),   // yellow
    danger: Color::Rgb(255, 50, 50),    // red
    vinyl: Color::Rgb(100, 60, 160),
    label: Color::Rgb(255, 100, 255),
};

/// All themes in cycle order
pub const THEMES: [Theme; 3] = [CRT_GREEN, CRT_AMBER, CYBERPUNK];

impl Default for Theme {
    fn default() -> Self {
        CRT_GREEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(Theme::by_name("Amber"), Some(CRT_AMBER));
        assert_eq!(Theme::by_name("neon"), Some(CYBERPUNK));
        assert_eq!(Theme::by_name("phosphor-green"), Some(CRT_GREEN));
        assert_eq!(Theme::by_name("plaid"), None);
    }

    #[test]
    fn test_cycle_wraps() {
        let theme = CRT_GREEN.next();
        assert_eq!(theme.name, "amber");
        let theme = theme.next().next();
        assert_eq!(theme.name, "phosphor-green");
    }
}
