use rawecho_common::{ansi, keys, ExitSequence, QueryError, Term};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Reading from stdin failed")]
    Read(#[source] std::io::Error),
    #[error("Writing to the terminal failed")]
    Write(#[source] std::io::Error),
    #[error("Backspace could not locate the cursor")]
    CursorQuery(#[from] QueryError),
}

/// What the loop does after a byte has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ExitSequence,
    InputClosed,
}

/// Echoes keystrokes back to a raw terminal until the exit sequence.
pub struct EchoSession<T: Term> {
    term: T,
    exit: ExitSequence,
}

impl<T: Term> EchoSession<T> {
    pub fn new(term: T) -> Self {
        Self {
            term,
            exit: ExitSequence::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> T {
        self.term
    }

    /// Clear the screen and home the cursor.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.send(ansi::CLEAR_SCREEN)?;
        self.send(ansi::CURSOR_HOME)
    }

    /// Handle one byte read from the terminal.
    pub fn step(&mut self, byte: u8) -> Result<Flow, SessionError> {
        self.exit.insert(byte);
        if self.exit.should_exit() {
            log::debug!("exit sequence typed");
            return Ok(Flow::Exit);
        }

        match byte {
            keys::ENTER => self.send(ansi::CRLF)?,
            keys::BACKSPACE => self.backspace()?,
            _ => self.echo(byte)?,
        }
        Ok(Flow::Continue)
    }

    /// Read and handle bytes until the exit sequence or the end of input.
    /// The first error ends the session.
    pub fn run(&mut self) -> Result<Outcome, SessionError> {
        self.start()?;
        log::info!("echo session started");

        loop {
            let Some(byte) = self.term.read_byte().map_err(SessionError::Read)? else {
                log::info!("input closed");
                return Ok(Outcome::InputClosed);
            };

            if self.step(byte)? == Flow::Exit {
                log::info!("echo session ended");
                return Ok(Outcome::ExitSequence);
            }
        }
    }

    fn backspace(&mut self) -> Result<(), SessionError> {
        let position = self.term.query_cursor_position()?;
        if position.is_line_start() {
            // Only the row moves: the length of the line above is unknown.
            log::debug!("backspace wraps to row {}", position.row - 1);
            self.send(ansi::CURSOR_UP)?;
        }

        self.send(ansi::CURSOR_LEFT)?;
        self.echo(keys::SPACE)?;
        self.send(ansi::CURSOR_LEFT)
    }

    fn send(&mut self, seq: &str) -> Result<(), SessionError> {
        self.term.send(seq).map_err(SessionError::Write)
    }

    fn echo(&mut self, byte: u8) -> Result<(), SessionError> {
        self.term.echo(byte).map_err(SessionError::Write)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        io::{ErrorKind, Read, Write},
    };

    use rawecho_common::CursorReportError;

    use super::*;

    /// A terminal fed from scripted chunks. Each read takes from one chunk
    /// only, like a tty handing over what arrived in one go.
    #[derive(Default)]
    struct ScriptedTerm {
        input: VecDeque<Vec<u8>>,
        output: Vec<u8>,
        fail_reads: bool,
    }

    impl ScriptedTerm {
        fn keys(mut self, keys: &[u8]) -> Self {
            self.input.extend(keys.iter().map(|&key| vec![key]));
            self
        }

        fn reply(mut self, reply: &[u8]) -> Self {
            self.input.push_back(reply.to_vec());
            self
        }

        fn output(&self) -> String {
            String::from_utf8_lossy(&self.output).into_owned()
        }
    }

    impl Read for ScriptedTerm {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.fail_reads {
                return Err(ErrorKind::BrokenPipe.into());
            }
            let Some(mut chunk) = self.input.pop_front() else {
                return Ok(0);
            };

            let size = chunk.len().min(buf.len());
            buf[..size].copy_from_slice(&chunk[..size]);
            if size < chunk.len() {
                self.input.push_front(chunk.split_off(size));
            }
            Ok(size)
        }
    }

    impl Write for ScriptedTerm {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Term for ScriptedTerm {}

    const PREAMBLE: &str = "\x1b[2J\x1b[0;0H";
    const ERASE: &str = "\x1b[D \x1b[D";

    fn run(term: ScriptedTerm) -> (Result<Outcome, SessionError>, String) {
        let mut session = EchoSession::new(term);
        let outcome = session.run();
        (outcome, session.into_inner().output())
    }

    #[test]
    fn echoes_keys_until_exit_sequence() {
        let (outcome, output) = run(ScriptedTerm::default().keys(b"hi\x1b:q"));

        assert!(matches!(outcome, Ok(Outcome::ExitSequence)));
        // the final q is swallowed, the escape and colon were echoed already
        assert_eq!(output, format!("{PREAMBLE}hi\x1b:"));
    }

    #[test]
    fn keys_after_exit_sequence_are_not_read() {
        let mut session = EchoSession::new(ScriptedTerm::default().keys(b"\x1b:qzz"));
        assert!(matches!(session.run(), Ok(Outcome::ExitSequence)));
        assert_eq!(session.into_inner().input.len(), 2);
    }

    #[test]
    fn enter_writes_crlf() {
        let (outcome, output) = run(ScriptedTerm::default().keys(b"a\rb"));

        assert!(matches!(outcome, Ok(Outcome::InputClosed)));
        assert_eq!(output, format!("{PREAMBLE}a\r\nb"));
    }

    #[test]
    fn closed_input_ends_the_session_quietly() {
        let (outcome, output) = run(ScriptedTerm::default());

        assert!(matches!(outcome, Ok(Outcome::InputClosed)));
        assert_eq!(output, PREAMBLE);
    }

    #[test]
    fn backspace_mid_line_erases_one_cell() {
        let term = ScriptedTerm::default()
            .keys(b"ab\x7f")
            .reply(b"\x1b[1;3R")
            .keys(b"c");
        let (outcome, output) = run(term);

        assert!(matches!(outcome, Ok(Outcome::InputClosed)));
        assert_eq!(output, format!("{PREAMBLE}ab\x1b[6n{ERASE}c"));
    }

    #[test]
    fn backspace_at_line_start_moves_up_first() {
        let term = ScriptedTerm::default()
            .keys(b"a\r\x7f")
            .reply(b"\x1b[2;1R");
        let (_, output) = run(term);

        assert_eq!(output, format!("{PREAMBLE}a\r\n\x1b[6n\x1b[A{ERASE}"));
    }

    #[test]
    fn backspace_on_first_row_stays_on_first_row() {
        let term = ScriptedTerm::default().keys(b"\x7f").reply(b"\x1b[1;1R");
        let (_, output) = run(term);

        assert_eq!(output, format!("{PREAMBLE}\x1b[6n{ERASE}"));
    }

    #[test]
    fn garbled_cursor_report_stops_the_session() {
        let term = ScriptedTerm::default()
            .keys(b"\x7f")
            .reply(b"\x1b[1;2Rx")
            .keys(b"never");
        let (outcome, output) = run(term);

        assert!(matches!(
            outcome,
            Err(SessionError::CursorQuery(QueryError::Report(
                CursorReportError::Malformed(_)
            )))
        ));
        assert_eq!(output, format!("{PREAMBLE}\x1b[6n"));
    }

    #[test]
    fn missing_cursor_report_is_an_error() {
        let (outcome, _) = run(ScriptedTerm::default().keys(b"\x7f"));

        assert!(matches!(
            outcome,
            Err(SessionError::CursorQuery(QueryError::Io(_)))
        ));
    }

    #[test]
    fn read_errors_are_propagated() {
        let term = ScriptedTerm {
            fail_reads: true,
            ..ScriptedTerm::default()
        };
        let (outcome, _) = run(term);

        match outcome {
            Err(SessionError::Read(err)) => assert_eq!(err.kind(), ErrorKind::BrokenPipe),
            other => panic!("expected a read error, got {other:?}"),
        }
    }

    #[test]
    fn step_reports_flow() -> Result<(), SessionError> {
        let mut session = EchoSession::new(ScriptedTerm::default());

        assert_eq!(session.step(0x1b)?, Flow::Continue);
        assert_eq!(session.step(b':')?, Flow::Continue);
        assert_eq!(session.step(b'q')?, Flow::Exit);
        Ok(())
    }

    #[test]
    fn high_bytes_are_echoed_as_latin1_characters() -> Result<(), SessionError> {
        let mut session = EchoSession::new(ScriptedTerm::default());
        session.step(0xfc)?;

        assert_eq!(session.into_inner().output(), "\u{fc}");
        Ok(())
    }
}
