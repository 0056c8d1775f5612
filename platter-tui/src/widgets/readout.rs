//! Readout widget - rate, direction, momentum and position

use crate::theme::Theme;
use platter_core::{DeckState, PlaybackState, ScratchState};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

/// Format seconds as `m:ss`
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format a playback rate as `1.0x`
pub fn format_rate(rate: f32) -> String {
    format!("{:.1}x", rate)
}

/// Horizontal bar filled to `level` (0.0 - 1.0)
pub fn meter_bar(level: f32, width: usize) -> String {
    let filled = ((level.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

/// Widget for displaying the scratch readouts
pub struct ReadoutWidget<'a> {
    deck: &'a DeckState,
    scratch: &'a ScratchState,
    theme: &'a Theme,
    loading: Option<&'a str>,
}

impl<'a> ReadoutWidget<'a> {
    pub fn new(deck: &'a DeckState, scratch: &'a ScratchState, theme: &'a Theme) -> Self {
        Self {
            deck,
            scratch,
            theme,
            loading: None,
        }
    }

    /// Show a track that is still decoding
    pub fn loading(mut self, name: Option<&'a str>) -> Self {
        self.loading = name;
        self
    }

    fn render_transport(&self) -> Span<'a> {
        let symbol = match self.deck.playback {
            PlaybackState::Playing => "▶",
            PlaybackState::Paused => "⏸",
            PlaybackState::Stopped => "⏹",
        };
        Span::styled(
            format!(" {} ", symbol),
            if self.deck.playback == PlaybackState::Playing {
                self.theme.highlight()
            } else {
                self.theme.dim()
            },
        )
    }

    fn label(&self, text: &'static str) -> Span<'a> {
        Span::styled(format!("{:<10}", text), self.theme.dim())
    }
}

impl Widget for ReadoutWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" DECK ")
            .title_style(self.theme.title())
            .borders(Borders::ALL)
            .border_style(self.theme.border());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let rows = Layout::vertical([
            Constraint::Length(1), // Track
            Constraint::Length(1), // Transport + time
            Constraint::Length(1), // Rate
            Constraint::Length(1), // Direction
            Constraint::Length(1), // Momentum
            Constraint::Length(1), // Progress
            Constraint::Min(0),
        ])
        .split(inner);

        let track = match (self.loading, self.deck.track_name.as_deref()) {
            (Some(name), _) => Line::from(Span::styled(
                format!("Loading {name}..."),
                Style::default().fg(self.theme.warning),
            )),
            (None, Some(name)) => Line::from(Span::styled(name.to_string(), self.theme.normal())),
            (None, None) => Line::from(Span::styled("No track loaded", self.theme.dim())),
        };
        Paragraph::new(track).render(rows[0], buf);

        let time = Line::from(vec![
            self.render_transport(),
            Span::styled(
                format!(
                    "{} / {}",
                    format_time(self.deck.position),
                    format_time(self.deck.duration)
                ),
                self.theme.normal(),
            ),
        ]);
        Paragraph::new(time).render(rows[1], buf);

        let rate = Line::from(vec![
            self.label("Rate"),
            Span::styled(format_rate(self.deck.rate), self.theme.normal()),
        ]);
        Paragraph::new(rate).render(rows[2], buf);

        let direction = self.scratch.rotation.direction;
        let direction = Line::from(vec![
            self.label("Direction"),
            Span::styled(
                direction.display_name(),
                if direction.sign() < 0.0 {
                    Style::default().fg(self.theme.warning)
                } else {
                    self.theme.normal()
                },
            ),
        ]);
        Paragraph::new(direction).render(rows[3], buf);

        let level = self.scratch.momentum_level;
        let meter_width = (rows[4].width as usize).saturating_sub(16).min(30);
        let momentum = Line::from(vec![
            self.label("Momentum"),
            Span::styled(meter_bar(level, meter_width), self.theme.meter_style(level)),
            Span::styled(format!(" {:>3.0}", self.scratch.momentum), self.theme.dim()),
        ]);
        Paragraph::new(momentum).render(rows[4], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(self.theme.accent).bg(self.theme.bg))
            .ratio(self.deck.progress())
            .label(format!("{:.0}%", self.deck.progress() * 100.0))
            .use_unicode(true)
            .render(rows[5], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platter_core::Direction;

    fn render_to_string(widget: ReadoutWidget<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(61.0), "1:01");
        assert_eq!(format_time(3725.0), "62:05");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1.0), "1.0x");
        assert_eq!(format_rate(2.96), "3.0x");
        assert_eq!(format_rate(0.5), "0.5x");
    }

    #[test]
    fn test_meter_bar() {
        assert_eq!(meter_bar(0.0, 4), "░░░░");
        assert_eq!(meter_bar(0.5, 4), "██░░");
        assert_eq!(meter_bar(3.0, 4), "████");
    }

    #[test]
    fn test_renders_reverse_readout() {
        let deck = DeckState {
            playback: PlaybackState::Paused,
            position: 75.0,
            duration: 300.0,
            rate: 1.5,
            track_name: Some("Chapter 3".to_string()),
        };
        let mut scratch = ScratchState::default();
        scratch.rotation.direction = Direction::Reverse;
        scratch.momentum = 40.0;
        scratch.momentum_level = 0.4;
        let theme = Theme::default();

        let text = render_to_string(ReadoutWidget::new(&deck, &scratch, &theme), 50, 9);
        assert!(text.contains("Chapter 3"));
        assert!(text.contains("1:15 / 5:00"));
        assert!(text.contains("1.5x"));
        assert!(text.contains("Reverse (Chunked)"));
        assert!(text.contains("25%"));
    }

    #[test]
    fn test_renders_empty_deck() {
        let deck = DeckState::default();
        let scratch = ScratchState::default();
        let theme = Theme::default();
        let text = render_to_string(
            ReadoutWidget::new(&deck, &scratch, &theme).loading(Some("talk.mp3")),
            50,
            9,
        );
        assert!(text.contains("Loading talk.mp3..."));
        assert!(text.contains("Forward"));
        assert!(text.contains("0:00 / 0:00"));
    }
}
