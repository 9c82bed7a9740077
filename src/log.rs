use std::{fmt::Display, fs::OpenOptions, io::{self, BufWriter, Write}, process::id, sync::{RwLock, RwLockReadGuard, RwLockWriteGuard}};
use chrono::Local;
use once_cell::sync::Lazy;

#[derive(Clone, Copy, PartialEq)]
pub enum LogLevel {
    Debug,
    Verbose,
    Notice,
    Warning,
}

impl LogLevel {
    fn less(&self, rhs: &Self) -> bool {
        self.rank() < rhs.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Verbose => 1,
            Self::Notice => 2,
            Self::Warning => 3,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ch = match self {
            Self::Debug => '.',
            Self::Verbose => '-',
            Self::Notice => '*',
            Self::Warning => '#',
        };
        write!(f, "{ch}")
    }
}

pub struct Logger {
    verbosity: LogLevel,
    log_file: String,           // "" = log on standard output
}

static LOGGER: Lazy<RwLock<Logger>> = Lazy::new(|| {
    RwLock::new(Logger { verbosity: LogLevel::Verbose, log_file: String::new() })
});
fn logger_read() -> RwLockReadGuard<'static, Logger> {
    LOGGER.read().unwrap()
}
fn logger_write() -> RwLockWriteGuard<'static, Logger> {
    LOGGER.write().unwrap()
}

pub fn configure_logger(verbosity: LogLevel, log_file: &str) {
    let mut logger = logger_write();
    logger.verbosity = verbosity;
    logger.log_file = log_file.to_string();
}

pub fn log(level: LogLevel, body: &str) {
    let logger = logger_read();
    if level.less(&logger.verbosity) {
        return;
    }

    let mut writer: Box<dyn Write> = if logger.log_file.is_empty() {
        Box::new(io::stdout())
    } else {
        match OpenOptions::new().append(true).create(true).open(&logger.log_file) {
            Ok(f) => Box::new(f),
            Err(e) => {
                eprintln!("Can't open log file '{}': {}", logger.log_file, e);
                return;
            },
        }
    };

    let now = Local::now().format("%d %b %H:%M:%S%.3f");
    let line = format!("[{}] {} {} {}\n", id(), now, level, body);
    let mut buf_writer = BufWriter::new(writer.as_mut());
    match buf_writer.write_all(line.as_bytes()) {
        Ok(_) => {},
        Err(e) => { eprintln!("Can't write log: {}", e); },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_test() {
        assert_eq!(format!("{}", LogLevel::Debug), ".");
        assert_eq!(format!("{}", LogLevel::Warning), "#");
        assert!(LogLevel::Debug.less(&LogLevel::Notice));
        assert!(!LogLevel::Warning.less(&LogLevel::Verbose));
    }

    #[test]
    fn log_print_test() {
        log(LogLevel::Notice, &format!("hello {}", "rmedis"));
        log(LogLevel::Debug, "suppressed at default verbosity");
    }
}
