//! Console logging shared by all of the inspection programs.
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config, Handle,
};

/// Log lines go to stderr; stdout is reserved for the printed summaries.
const LOG_PATTERN: &str = "{h({d(%Y-%m-%d %H:%M:%S)} [{l}] {M})} - {m}{n}";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to configure logger: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),
    #[error("Failed to install logger: {0}")]
    Install(#[from] log::SetLoggerError),
}

/// Set up the stderr logger at `level`, returning the handle so that the
/// level can be changed later.
pub fn try_init_logging(level: log::LevelFilter) -> Result<Handle, LoggingError> {
    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .target(Target::Stderr)
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;

    let handle = log4rs::init_config(config)?;
    Ok(handle)
}

/// Like [`try_init_logging`], but a failure only prints a warning; none of the
/// programs need logging to do their job.
pub fn init_logging(level: log::LevelFilter) {
    if let Err(e) = try_init_logging(level) {
        eprintln!("Warning: {e}");
    }
}
