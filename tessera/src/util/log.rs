use log::{LevelFilter, SetLoggerError};
use simplelog::{Color, ColorChoice, ConfigBuilder, Level, TermLogger, TerminalMode};

/// Installs a terminal logger that prints the level and the message only.
pub fn init_simple_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_level_color(Level::Debug, Some(Color::Cyan))
        .set_level_color(Level::Trace, Some(Color::Green))
        .build();

    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}

/// The level named by `TESSERA_LOG`, or `default` if it is unset or unknown.
pub fn level_from_env(default: LevelFilter) -> LevelFilter {
    std::env::var("TESSERA_LOG").ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_once() {
        let first = init_simple_logger(LevelFilter::Warn);
        let second = init_simple_logger(LevelFilter::Warn);
        assert!(first.is_ok());
        assert!(second.is_err());
    }

    #[test]
    fn env_level() {
        std::env::set_var("TESSERA_LOG", "debug");
        assert_eq!(level_from_env(LevelFilter::Info), LevelFilter::Debug);

        std::env::set_var("TESSERA_LOG", "loud");
        assert_eq!(level_from_env(LevelFilter::Info), LevelFilter::Info);

        std::env::remove_var("TESSERA_LOG");
        assert_eq!(level_from_env(LevelFilter::Warn), LevelFilter::Warn);
    }
}
