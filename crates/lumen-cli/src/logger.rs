//! Logging setup. Records are forwarded to env_logger and simultaneously
//! recorded into an in-memory history, which ends up embedded in the output
//! EXR as its `log` attribute.

use std::fmt::Write as _;
use std::sync::{Mutex, OnceLock};

struct HistoryLogger {
    inner: env_logger::Logger,
    history: Mutex<String>,
}

impl log::Log for HistoryLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.matches(record) {
            let mut history = self.history.lock().unwrap();
            let _ = writeln!(history, "[{:5}] {}", record.level(), record.args());
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush()
    }
}

static LOGGER: OnceLock<HistoryLogger> = OnceLock::new();

/// Install the logger. Filtering follows `RUST_LOG`, defaulting to info.
pub fn init() {
    let inner =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .build();
    let max_level = inner.filter();

    let logger = LOGGER.get_or_init(|| HistoryLogger {
        inner,
        history: Mutex::new(String::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(max_level);
    }
}

/// Everything logged so far, one line per record.
pub fn history() -> String {
    LOGGER
        .get()
        .map(|logger| logger.history.lock().unwrap().clone())
        .unwrap_or_default()
}
