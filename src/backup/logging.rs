//! Log sink selection.
//!
//! Instead of installing a global subscriber, a [`Logger`] owns its own
//! `tracing` dispatch and is handed to whoever needs to log. Worker threads
//! enter it explicitly with [`Logger::in_scope`].

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use chrono::{Local, NaiveDate};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

static LOG_FILE_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogSink {
    Stdout,
    /// Appended to, created if missing
    File(PathBuf),
}

impl LogSink {
    /// `{log_dir}/YYYYMMDD.log` for today when file logging is enabled, stdout otherwise.
    pub fn from_config<P: AsRef<Path>>(enable_logging: bool, log_dir: P) -> Self {
        if enable_logging {
            LogSink::File(
                log_dir
                    .as_ref()
                    .join(dated_log_file_name(Local::now().date_naive())),
            )
        } else {
            LogSink::Stdout
        }
    }
}

pub fn dated_log_file_name(date: NaiveDate) -> String {
    format!("{}.log", date.format(LOG_FILE_DATE_FORMAT))
}

#[derive(Clone, Debug)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    pub fn new(sink: &LogSink) -> Result<Self> {
        match sink {
            LogSink::Stdout => Ok(Self::stdout()),
            LogSink::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(Error::from)
                    .with_msg(format!("Failed to open log file {:?}", path))?;
                Ok(Self::build(BoxMakeWriter::new(Mutex::new(file)), false))
            }
        }
    }

    pub fn stdout() -> Self {
        Self::build(BoxMakeWriter::new(std::io::stdout), true)
    }

    fn build(writer: BoxMakeWriter, ansi: bool) -> Self {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(ansi)
            .with_writer(writer)
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Runs `f` with this logger as the current thread's subscriber.
    pub fn in_scope<T, F: FnOnce() -> T>(&self, f: F) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}
