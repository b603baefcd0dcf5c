//! Key bytes as they arrive from a terminal in raw mode.

/// Carriage return. Raw mode turns off the CR to NL translation, so the Enter
/// key shows up as this byte.
pub const ENTER: u8 = 13;
pub const ESCAPE: u8 = 27;
pub const SPACE: u8 = 32;
/// DEL, which is what most terminals send for the backspace key.
pub const BACKSPACE: u8 = 127;
