use std::num::ParseIntError;

/// The cursor report is taken from a single read of at most this many bytes.
pub const MAX_REPORT_LEN: usize = 32;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CursorReportError {
    #[error("Unexpected cursor position report: {0:?}")]
    Malformed(String),
    #[error("Invalid number in cursor position report: {0}")]
    InvalidNumber(#[from] ParseIntError),
}

/// A 1-based cursor position, as reported by the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorPosition {
    pub row: u16,
    pub col: u16,
}

impl CursorPosition {
    /// Parse a `ESC [ row ; col R` response.
    pub fn parse(response: &[u8]) -> Result<Self, CursorReportError> {
        let malformed =
            || CursorReportError::Malformed(String::from_utf8_lossy(response).into_owned());

        let payload = response
            .strip_prefix(b"\x1b[")
            .and_then(|s| s.strip_suffix(b"R"))
            .ok_or_else(malformed)?;
        let payload = std::str::from_utf8(payload).map_err(|_| malformed())?;

        let mut fields = payload.split(';');
        let (Some(row), Some(col), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed());
        };

        Ok(Self {
            row: row.parse()?,
            col: col.parse()?,
        })
    }

    /// The cursor sits in the first column of a line that has a line above it.
    pub fn is_line_start(&self) -> bool {
        self.col == 1 && self.row > 1
    }
}
