use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::PathBuf,
};

use anyhow::{Context, Result};

/// env_logger filter directives, e.g. `debug` or `rawecho_tty=debug`.
pub const LOG_FILTER_VAR: &str = "RAWECHO_LOG";
/// Append log records to this file instead of stderr.
pub const LOG_FILE_VAR: &str = "RAWECHO_LOG_FILE";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Everything rawecho reads from its environment. Only logging is
/// configurable, the echo loop itself has no knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key| lookup(key).filter(|value: &String| !value.trim().is_empty());

        Self {
            log_filter: set(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            log_file: set(LOG_FILE_VAR).map(PathBuf::from),
        }
    }

    fn open_log_file(&self) -> Result<Option<File>> {
        let Some(path) = &self.log_file else {
            return Ok(None);
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Opening log file {}", path.display()))?;
        Ok(Some(file))
    }

    /// Install the global logger.
    pub fn init_logging(&self) -> Result<()> {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&self.log_filter);
        // stderr shares the raw terminal, which no longer turns \n into \r\n
        builder.format(|buf, record| {
            write!(
                buf,
                "[{} {}] {}\r\n",
                record.level(),
                record.target(),
                record.args()
            )
        });

        if let Some(file) = self.open_log_file()? {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        builder.try_init().context("Installing the logger")?;
        Ok(())
    }
}
