//! ANSI control sequences written back to the terminal.

pub const CRLF: &str = "\r\n";
pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const CURSOR_HOME: &str = "\x1b[0;0H";
/// Device status report 6, answered with `ESC [ row ; col R`.
pub const REQUEST_CURSOR_POSITION: &str = "\x1b[6n";

pub const CURSOR_LEFT: &str = "\x1b[D";
pub const CURSOR_UP: &str = "\x1b[A";
