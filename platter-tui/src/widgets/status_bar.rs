//! Status bar widget - mode indicator, messages and the open prompt

use crate::app::MessageType;
use crate::theme::Theme;
use platter_input::Mode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget for displaying the status bar with mode and path prompt
pub struct StatusBarWidget<'a> {
    mode: Mode,
    path_buffer: &'a str,
    message: Option<&'a str>,
    message_type: MessageType,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, path_buffer: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            path_buffer,
            message: None,
            message_type: MessageType::Info,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: MessageType) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    fn mode_style(&self) -> Style {
        match self.mode {
            Mode::Normal | Mode::Help => self.theme.highlight(),
            Mode::Open => Style::from(self.theme.accent),
        }
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(10), // Mode indicator
            Constraint::Min(20),    // Prompt/message area
            Constraint::Length(24), // Help hint
        ])
        .split(area);

        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(self.mode.display_name(), self.mode_style()),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        let content = if self.mode == Mode::Open {
            Line::from(vec![
                Span::styled("open: ", Style::from(self.theme.accent)),
                Span::styled(self.path_buffer, self.theme.normal()),
                Span::styled("█", self.theme.highlight()), // Cursor
            ])
        } else if let Some(msg) = self.message {
            let msg_style = match self.message_type {
                MessageType::Info => self.theme.dim(),
                MessageType::Success => Style::from(self.theme.accent),
                MessageType::Warning => Style::default().fg(self.theme.warning),
                MessageType::Error => Style::default().fg(self.theme.danger),
            };
            Line::from(Span::styled(msg, msg_style))
        } else {
            Line::from(Span::styled(
                "Drag the platter to scratch. Press ? for help",
                self.theme.dim(),
            ))
        };
        Paragraph::new(content).render(chunks[1], buf);

        let help = match self.mode {
            Mode::Normal => "spc:play  o:open  ?:help",
            Mode::Open => "Enter:load  Esc:cancel",
            Mode::Help => "Esc:close help",
        };
        let help_line = Line::from(Span::styled(help, self.theme.dim()));
        Paragraph::new(help_line).render(chunks[2], buf);
    }
}

/// Help overlay widget with scrolling support
pub struct HelpWidget<'a> {
    theme: &'a Theme,
    scroll: u16,
}

impl<'a> HelpWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme, scroll: 0 }
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn help_lines() -> [&'static str; 25] {
        [
            "╔══════════════════════════════════════════════════╗",
            "║             PLATTER - vinyl scratch deck         ║",
            "║                 ↑/↓ or j/k to scroll             ║",
            "╠══════════════════════════════════════════════════╣",
            "║ SCRATCHING                                       ║",
            "║   Drag clockwise        Play forward, faster     ║",
            "║   Drag anticlockwise    Step back in chunks      ║",
            "║   Release               Platter coasts to rest   ║",
            "║   Longer, faster drags build more momentum       ║",
            "╠──────────────────────────────────────────────────╣",
            "║ TRANSPORT                                        ║",
            "║   Space         Play / pause                     ║",
            "║   p             Play                             ║",
            "║   s             Pause                            ║",
            "║   r             Reset platter and rate           ║",
            "╠──────────────────────────────────────────────────╣",
            "║ TRACKS & DISPLAY                                 ║",
            "║   o             Open a file (type path, Enter)   ║",
            "║   t             Cycle theme                      ║",
            "║   ?             Toggle this help                 ║",
            "╠──────────────────────────────────────────────────╣",
            "║   q / Ctrl-c    Quit                             ║",
            "╠══════════════════════════════════════════════════╣",
            "║             Press Esc or ? to close help         ║",
            "╚══════════════════════════════════════════════════╝",
        ]
    }

    fn is_frame(ch: char) -> bool {
        matches!(ch, '║' | '╔' | '╗' | '╚' | '╝' | '═' | '╠' | '╣' | '─' | '│')
    }
}

impl Widget for HelpWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear background
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                buf[(x, y)].set_char(' ').set_style(self.theme.normal());
            }
        }

        let help_text = Self::help_lines();
        let total_lines = help_text.len() as u16;
        let visible_lines = area.height.min(total_lines);

        let max_scroll = total_lines.saturating_sub(visible_lines);
        let scroll = self.scroll.min(max_scroll);

        let line_width = help_text[0].chars().count() as u16;
        let start_x = area.x + area.width.saturating_sub(line_width) / 2;

        for (i, line) in help_text
            .iter()
            .skip(scroll as usize)
            .take(visible_lines as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            for (j, ch) in line.chars().enumerate() {
                let x = start_x + j as u16;
                if x >= area.x + area.width {
                    break;
                }
                let style = if Self::is_frame(ch) {
                    self.theme.border()
                } else {
                    self.theme.normal()
                };
                buf[(x, y)].set_char(ch).set_style(style);
            }
        }

        // Show scroll indicator if content is scrollable
        if total_lines > visible_lines {
            let indicator = format!(" [{}/{}] ", scroll + 1, max_scroll + 1);
            let indicator_x = area.x + area.width.saturating_sub(indicator.len() as u16 + 2);
            let indicator_y = area.y + area.height - 1;

            for (i, ch) in indicator.chars().enumerate() {
                let x = indicator_x + i as u16;
                if x < area.x + area.width {
                    buf[(x, indicator_y)].set_char(ch).set_style(self.theme.dim());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_open_prompt_shows_path() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new(Mode::Open, "/tmp/talk.mp3", &theme)
            .message(Some("hidden"), MessageType::Info)
            .render(area, &mut buf);
        let line = row(&buf, 0);
        assert!(line.contains("[OPEN]"));
        assert!(line.contains("open: /tmp/talk.mp3"));
        assert!(!line.contains("hidden"));
    }

    #[test]
    fn test_message_shown_in_normal_mode() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new(Mode::Normal, "", &theme)
            .message(Some("Loaded talk.mp3"), MessageType::Success)
            .render(area, &mut buf);
        let line = row(&buf, 0);
        assert!(line.contains("[NORMAL]"));
        assert!(line.contains("Loaded talk.mp3"));
    }

    #[test]
    fn test_help_lines_share_width() {
        let lines = HelpWidget::help_lines();
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_help_scroll_indicator() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        HelpWidget::new(&theme).scroll(100).render(area, &mut buf);
        assert!(row(&buf, 9).contains("[16/16]"));
    }
}
