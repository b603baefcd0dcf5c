use std::io::{ErrorKind, Read, Write};

pub mod ansi;
pub mod cursor;
pub mod exit;
pub mod keys;

pub use cursor::{CursorPosition, CursorReportError};
pub use exit::ExitSequence;

#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("Cursor position query failed")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Report(#[from] CursorReportError),
}

/// A terminal that answers with bytes and accepts control sequences.
pub trait Term: Write + Read {
    /// Read a single byte, `None` once the input is closed.
    fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        let mut buf = [0; 1];
        loop {
            match self.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn send(&mut self, seq: &str) -> std::io::Result<()> {
        self.write_all(seq.as_bytes())?;
        self.flush()
    }

    /// Echo a byte as the character with the same code point.
    fn echo(&mut self, byte: u8) -> std::io::Result<()> {
        let mut buf = [0; 4];
        self.send(char::from(byte).encode_utf8(&mut buf))
    }

    /// Ask the terminal where the cursor is and wait for its answer.
    ///
    /// The answer has to arrive in one read. Keys typed while the request is
    /// in flight end up in the same buffer and make the report unparseable.
    fn query_cursor_position(&mut self) -> Result<CursorPosition, QueryError> {
        self.send(ansi::REQUEST_CURSOR_POSITION)?;

        let mut buf = [0; cursor::MAX_REPORT_LEN];
        let size = loop {
            match self.read(&mut buf) {
                Ok(size) => break size,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        };
        if size == 0 {
            return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
        }

        let position = CursorPosition::parse(&buf[0..size])?;
        log::debug!("cursor at row {} col {}", position.row, position.col);
        Ok(position)
    }
}
