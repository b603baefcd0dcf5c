use anyhow::{Context, Result};

use config::Config;
use rawecho_tty::RawTerminal;
use session::{EchoSession, Outcome};

pub mod config;
pub mod session;

fn main() -> Result<()> {
    let config = Config::from_env();
    config.init_logging()?;
    log::debug!("{config:?}");

    // The terminal goes back to its old mode when `term` drops, before any
    // error below is printed.
    let outcome = {
        let term = RawTerminal::new().context("Entering raw mode")?;
        EchoSession::new(term).run()
    };

    match outcome.context("Echo session failed")? {
        Outcome::ExitSequence => log::info!("exit sequence received, bye"),
        Outcome::InputClosed => log::info!("stdin closed, bye"),
    }
    Ok(())
}
