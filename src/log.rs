use ::log::{Record, Level, Metadata, LevelFilter, SetLoggerError};

/// Target used by every log line of the crate
pub const TARGET: &str = "groupoverview";

#[macro_use]
pub mod macros {
    #[doc(alias = "log::error")]
    #[macro_export]
    macro_rules! log_error {
        ($($arg:tt)*) => {
            ::log::error!(target: $crate::log::TARGET, $($arg)*)
        };
    }
    #[doc(alias = "log::warn")]
    #[macro_export]
    macro_rules! log_warn {
        ($($arg:tt)*) => {
            ::log::warn!(target: $crate::log::TARGET, $($arg)*)
        };
    }
    #[doc(alias = "log::info")]
    #[macro_export]
    macro_rules! log_info {
        ($($arg:tt)*) => {
            ::log::info!(target: $crate::log::TARGET, $($arg)*)
        };
    }
}

struct SimpleLogger;

impl ::log::Log for SimpleLogger {
    #[inline]
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= ::log::max_level() && metadata.target() == TARGET
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            match record.level() {
                Level::Error | Level::Warn => eprintln!("[{}] {}", record.level(), record.args()),
                _ => println!("[{}] {}", record.level(), record.args()),
            }
        }
    }
    #[inline]
    fn flush(&self) {}
}


static LOGGER: SimpleLogger = SimpleLogger;

/// Level used when the configuration does not set one
pub fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {LevelFilter::Trace} else {LevelFilter::Warn}
}

pub fn init(level: Option<LevelFilter>) -> Result<(), SetLoggerError> {
    ::log::set_logger(&LOGGER)
        .map(|_| ::log::set_max_level(level.unwrap_or_else(default_level)))
}
