//! Platter widget - the record drawn on a braille canvas

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Line},
        Block, Borders, Widget,
    },
};

/// Groove rings between the rim and the label
const GROOVES: [f64; 4] = [0.92, 0.8, 0.68, 0.56];
const LABEL_RADIUS: f64 = 0.35;

/// End of the label marker for a clockwise angle measured from twelve o'clock
///
/// Canvas coordinates have y pointing up.
pub fn marker_end(angle_degrees: f32, radius: f64) -> (f64, f64) {
    let theta = (angle_degrees as f64).to_radians();
    (radius * theta.sin(), radius * theta.cos())
}

/// Widget for displaying the turntable platter
pub struct PlatterWidget<'a> {
    theme: &'a Theme,
    angle: f32,
    active: bool,
}

impl<'a> PlatterWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            angle: 0.0,
            active: false,
        }
    }

    /// Rotation in degrees, clockwise
    pub fn angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    /// Highlight while the platter is held
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

impl Widget for PlatterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.active {
            self.theme.border_active()
        } else {
            self.theme.border()
        };
        let block = Block::default()
            .title(" PLATTER ")
            .title_style(self.theme.title())
            .borders(Borders::ALL)
            .border_style(border);

        let vinyl = self.theme.vinyl;
        let label = self.theme.label;
        let (mx, my) = marker_end(self.angle, GROOVES[0]);
        let (lx, ly) = marker_end(self.angle, LABEL_RADIUS);

        Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .background_color(self.theme.bg)
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .paint(move |ctx| {
                for radius in GROOVES {
                    ctx.draw(&Circle {
                        x: 0.0,
                        y: 0.0,
                        radius,
                        color: vinyl,
                    });
                }
                ctx.layer();
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: LABEL_RADIUS,
                    color: label,
                });
                // label marker, plus a groove tick so fast spins read at the rim
                ctx.draw(&Line {
                    x1: 0.0,
                    y1: 0.0,
                    x2: lx,
                    y2: ly,
                    color: label,
                });
                ctx.draw(&Line {
                    x1: lx,
                    y1: ly,
                    x2: mx,
                    y2: my,
                    color: vinyl,
                });
            })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_end_quadrants() {
        let (x, y) = marker_end(0.0, 1.0);
        assert!(x.abs() < 1e-9 && (y - 1.0).abs() < 1e-9);

        // clockwise quarter turn points right
        let (x, y) = marker_end(90.0, 1.0);
        assert!((x - 1.0).abs() < 1e-6 && y.abs() < 1e-6);

        let (x, y) = marker_end(-90.0, 0.5);
        assert!((x + 0.5).abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn test_renders_title_and_dots() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 24, 12);
        let mut buf = Buffer::empty(area);
        PlatterWidget::new(&theme).angle(30.0).render(area, &mut buf);

        let top: String = (0..area.width).map(|x| buf[(x, 0)].symbol()).collect();
        assert!(top.contains("PLATTER"));

        let braille = (1..area.height - 1)
            .flat_map(|y| (1..area.width - 1).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                buf[(x, y)]
                    .symbol()
                    .chars()
                    .any(|c| ('\u{2801}'..='\u{28FF}').contains(&c))
            })
            .count();
        assert!(braille > 10, "only {braille} braille cells drawn");
    }
}
