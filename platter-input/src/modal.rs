//! Modal state machine for keyboard and mouse input

use crate::commands::{Command, Mode};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use platter_core::{Bounds, ControlEvent, Point};
use std::path::PathBuf;

/// Height of a terminal cell relative to its width
///
/// Rows are scaled by this so a drag around the platter traces a circle
/// rather than an ellipse.
pub const CELL_ASPECT: f32 = 2.0;

/// Screen-space point at the middle of a terminal cell
pub fn cell_center(column: u16, row: u16) -> Point {
    Point::new(column as f32 + 0.5, (row as f32 + 0.5) * CELL_ASPECT)
}

/// Handles keyboard and mouse input and converts it to commands
pub struct InputHandler {
    mode: Mode,
    path_buffer: String,
    /// Platter area in screen space, set by the UI after each layout
    platter: Option<Bounds>,
    dragging: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            path_buffer: String::new(),
            platter: None,
            dragging: false,
        }
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Path typed so far in open mode (for display)
    pub fn path_buffer(&self) -> &str {
        &self.path_buffer
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Record where the platter was drawn, in terminal cells
    pub fn set_platter_area(&mut self, column: u16, row: u16, width: u16, height: u16) {
        self.platter = if width == 0 || height == 0 {
            None
        } else {
            Some(Bounds::new(
                column as f32,
                row as f32 * CELL_ASPECT,
                width as f32,
                height as f32 * CELL_ASPECT,
            ))
        };
    }

    pub fn platter_bounds(&self) -> Option<Bounds> {
        self.platter
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Command::Quit);
        }

        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Help => self.handle_help_mode(key),
            Mode::Open => self.handle_open_mode(key),
        }
    }

    /// Handle a mouse event and return a command if applicable
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Command> {
        let point = cell_center(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let bounds = self.platter?;
                if !bounds.contains(point) {
                    return None;
                }
                self.dragging = true;
                Some(ControlEvent::DragStart { bounds, point }.into())
            }
            MouseEventKind::Drag(MouseButton::Left) if self.dragging => {
                Some(ControlEvent::DragMove(point).into())
            }
            MouseEventKind::Up(MouseButton::Left) if self.dragging => {
                self.dragging = false;
                Some(ControlEvent::DragEnd.into())
            }
            _ => None,
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            // Transport
            KeyCode::Char(' ') => Some(ControlEvent::Toggle.into()),
            KeyCode::Char('p') => Some(ControlEvent::Play.into()),
            KeyCode::Char('s') => Some(ControlEvent::Pause.into()),
            KeyCode::Char('r') => Some(ControlEvent::Reset.into()),

            // Mode switching
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
                Some(Command::ToggleHelp)
            }
            KeyCode::Char('o') => {
                self.mode = Mode::Open;
                self.path_buffer.clear();
                None
            }

            KeyCode::Char('t') => Some(Command::CycleTheme),
            KeyCode::Char('q') => Some(Command::Quit),

            _ => None,
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.mode = Mode::Normal;
                Some(Command::ToggleHelp)
            }
            KeyCode::Char('k') | KeyCode::Up => Some(Command::HelpScrollUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Command::HelpScrollDown),
            _ => None,
        }
    }

    fn handle_open_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                let path = std::mem::take(&mut self.path_buffer);
                let path = path.trim();
                if path.is_empty() {
                    None
                } else {
                    Some(Command::Load(PathBuf::from(path)))
                }
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.path_buffer.clear();
                None
            }
            KeyCode::Backspace => {
                self.path_buffer.pop();
                None
            }
            KeyCode::Char(c) => {
                self.path_buffer.push(c);
                None
            }
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn handler_with_platter() -> InputHandler {
        let mut handler = InputHandler::new();
        handler.set_platter_area(10, 5, 20, 10);
        handler
    }

    #[test]
    fn test_transport_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(key(KeyCode::Char(' '))),
            Some(Command::Control(ControlEvent::Toggle))
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('p'))),
            Some(Command::Control(ControlEvent::Play))
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('s'))),
            Some(Command::Control(ControlEvent::Pause))
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('r'))),
            Some(Command::Control(ControlEvent::Reset))
        );
    }

    #[test]
    fn test_quit_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Char('q'))), Some(Command::Quit));

        handler.handle_key(key(KeyCode::Char('o')));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key(ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn test_help_mode_swallows_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Char('?'))), Some(Command::ToggleHelp));
        assert_eq!(handler.mode(), Mode::Help);
        assert_eq!(handler.handle_key(key(KeyCode::Char(' '))), None);
        assert_eq!(handler.handle_key(key(KeyCode::Down)), Some(Command::HelpScrollDown));
        assert_eq!(handler.handle_key(key(KeyCode::Char('k'))), Some(Command::HelpScrollUp));
        assert_eq!(handler.handle_key(key(KeyCode::Esc)), Some(Command::ToggleHelp));
        assert_eq!(handler.mode(), Mode::Normal);
    }

    #[test]
    fn test_open_prompt() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Char('o'))), None);
        assert_eq!(handler.mode(), Mode::Open);
        for c in "/tmp/bookx".chars() {
            handler.handle_key(key(KeyCode::Char(c)));
        }
        handler.handle_key(key(KeyCode::Backspace));
        // 'q' is text here, not quit
        handler.handle_key(key(KeyCode::Char('q')));
        assert_eq!(handler.path_buffer(), "/tmp/bookq");

        assert_eq!(
            handler.handle_key(key(KeyCode::Enter)),
            Some(Command::Load(PathBuf::from("/tmp/bookq")))
        );
        assert_eq!(handler.mode(), Mode::Normal);
        assert!(handler.path_buffer().is_empty());
    }

    #[test]
    fn test_open_prompt_cancel_and_empty() {
        let mut handler = InputHandler::new();
        handler.handle_key(key(KeyCode::Char('o')));
        handler.handle_key(key(KeyCode::Char('x')));
        assert_eq!(handler.handle_key(key(KeyCode::Esc)), None);
        assert_eq!(handler.mode(), Mode::Normal);

        handler.handle_key(key(KeyCode::Char('o')));
        handler.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(handler.handle_key(key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut handler = InputHandler::new();
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(handler.handle_key(release), None);
    }

    #[test]
    fn test_drag_sequence() {
        let mut handler = handler_with_platter();
        let bounds = handler.platter_bounds().unwrap();
        assert_eq!(bounds, Bounds::new(10.0, 10.0, 20.0, 20.0));

        let down = handler.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 25, 8));
        assert_eq!(
            down,
            Some(Command::Control(ControlEvent::DragStart {
                bounds,
                point: Point::new(25.5, 17.0),
            }))
        );
        assert!(handler.is_dragging());

        // drags keep reporting even when they leave the platter
        let drag = handler.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 40, 1));
        assert_eq!(
            drag,
            Some(Command::Control(ControlEvent::DragMove(Point::new(40.5, 3.0))))
        );

        let up = handler.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 40, 1));
        assert_eq!(up, Some(Command::Control(ControlEvent::DragEnd)));
        assert!(!handler.is_dragging());
    }

    #[test]
    fn test_mouse_outside_platter_ignored() {
        let mut handler = handler_with_platter();
        assert_eq!(
            handler.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 2, 2)),
            None
        );
        assert_eq!(
            handler.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 15, 8)),
            None
        );
        assert_eq!(
            handler.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 15, 8)),
            None
        );
    }

    #[test]
    fn test_no_platter_no_drag() {
        let mut handler = InputHandler::new();
        assert_eq!(
            handler.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 15, 8)),
            None
        );
        handler.set_platter_area(0, 0, 0, 10);
        assert!(handler.platter_bounds().is_none());
    }
}
