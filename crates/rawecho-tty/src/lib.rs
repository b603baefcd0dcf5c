use std::{
    fs::File,
    io::{Read, StdinLock, StdoutLock, Write},
    mem::ManuallyDrop,
    os::fd::{AsRawFd, FromRawFd, RawFd},
};

use nix::{sys::termios, unistd::isatty};

use rawecho_common::Term;

#[derive(thiserror::Error, Debug)]
pub enum TtyError {
    #[error("stdin is not a terminal")]
    NotATerminal,
    #[error("An io error arised while configuring the terminal: {0}")]
    Io(#[from] std::io::Error),
}

/// The controlling terminal in raw mode, restored when dropped.
pub struct RawTerminal<'a> {
    stdin: StdinRaw<'a>,
    stdout: StdoutRaw<'a>,
}

impl<'a> RawTerminal<'a> {
    pub fn new() -> Result<Self, TtyError> {
        Ok(Self {
            stdin: StdinRaw::new()?,
            stdout: StdoutRaw::new(),
        })
    }
}

impl<'a> Read for RawTerminal<'a> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stdin.read(buf)
    }
}

impl<'a> Write for RawTerminal<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stdout.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stdout.flush()
    }
}

impl<'a> Term for RawTerminal<'a> {}

/// An unbuffered, raw, blocking reader from stdin
struct StdinRaw<'a> {
    stdin: StdinLock<'a>,
    file: ManuallyDrop<File>,
    termios: termios::Termios,
}

/// An unbuffered writer to stdout
struct StdoutRaw<'a> {
    stdout: StdoutLock<'a>,
    file: ManuallyDrop<File>,
}

fn ensure_terminal(fd: RawFd) -> Result<(), TtyError> {
    if isatty(fd).map_err(std::io::Error::from)? {
        Ok(())
    } else {
        Err(TtyError::NotATerminal)
    }
}

/// Switch `fd` to raw mode and hand back the settings it had before.
fn enter_raw_mode(fd: RawFd) -> std::io::Result<termios::Termios> {
    let termios = termios::tcgetattr(fd)?;

    let mut termios_new = termios.clone();
    termios::cfmakeraw(&mut termios_new);
    termios::tcsetattr(fd, termios::SetArg::TCSANOW, &termios_new)?;

    Ok(termios)
}

fn restore_mode(fd: RawFd, termios: &termios::Termios) -> std::io::Result<()> {
    termios::tcsetattr(fd, termios::SetArg::TCSANOW, termios)?;
    Ok(())
}

/// Borrow a standard stream's descriptor as a `File` that never closes it.
///
/// # Safety
///
/// `fd` must stay open for as long as the returned file is used.
unsafe fn borrow_fd(fd: RawFd) -> ManuallyDrop<File> {
    ManuallyDrop::new(File::from_raw_fd(fd))
}

impl<'a> StdinRaw<'a> {
    fn new() -> Result<Self, TtyError> {
        let stdin = std::io::stdin().lock();
        let fd = stdin.as_raw_fd();

        ensure_terminal(fd)?;
        let termios = enter_raw_mode(fd)?;
        log::debug!("stdin switched to raw mode");

        // SAFETY: the lock keeps stdin, and thus fd 0, alive alongside the file.
        let file = unsafe { borrow_fd(fd) };

        Ok(Self {
            termios,
            file,
            stdin,
        })
    }

    fn fd(&self) -> RawFd {
        self.stdin.as_raw_fd()
    }
}

impl<'a> Drop for StdinRaw<'a> {
    fn drop(&mut self) {
        let fd = self.fd();
        match restore_mode(fd, &self.termios) {
            Ok(()) => log::debug!("terminal mode restored"),
            Err(err) => log::warn!("failed to restore terminal mode: {err}"),
        }
    }
}

impl<'a> Read for StdinRaw<'a> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl<'a> StdoutRaw<'a> {
    fn new() -> Self {
        let stdout = std::io::stdout().lock();
        let fd = stdout.as_raw_fd();

        // SAFETY: the lock keeps stdout, and thus fd 1, alive alongside the file.
        let file = unsafe { borrow_fd(fd) };

        Self { file, stdout }
    }
}

impl<'a> Write for StdoutRaw<'a> {
    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }
}
