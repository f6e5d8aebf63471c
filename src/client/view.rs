//! Rendering seam for the chat client

use super::session::ConnectionState;
use crate::chat::Role;
use std::io::Write;

/// Everything the session needs from a UI
pub trait ChatView {
    fn append_message(&mut self, role: Role, text: &str);
    fn set_typing(&mut self, visible: bool);
    fn set_input_enabled(&mut self, enabled: bool);
    fn clear_input(&mut self);
    fn connection_changed(&mut self, _state: ConnectionState) {}
}

/// Line-oriented terminal view.
///
/// The user's own lines are already on screen, so only assistant bubbles,
/// the typing indicator and connection changes are printed.
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn line(&mut self, text: &str) {
        // Write errors are ignored
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn append_message(&mut self, role: Role, text: &str) {
        if role == Role::Assistant {
            self.line(&format!("assistant> {}", text));
        }
    }

    fn set_typing(&mut self, visible: bool) {
        if visible {
            self.line("assistant is typing...");
        }
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if enabled {
            let _ = write!(self.out, "> ");
            let _ = self.out.flush();
        }
    }

    fn clear_input(&mut self) {}

    fn connection_changed(&mut self, state: ConnectionState) {
        match state {
            ConnectionState::Connecting => self.line("[connecting]"),
            ConnectionState::Connected => self.line("[connected]"),
            ConnectionState::Disconnected => self.line("[disconnected, retrying in 2s]"),
        }
    }
}
