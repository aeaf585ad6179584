use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;

/// Terminal logger at `level`, plus a file logger at Info when `log_file` is given.
/// Fails if a global logger is already installed or the file cannot be created.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<(), String> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| format!("cannot create log file '{}': {}", path, e))?;
        loggers.push(WriteLogger::new(LevelFilter::Info, Config::default(), file));
    }
    CombinedLogger::init(loggers).map_err(|e| format!("logger already initialised: {}", e))
}

/// "error", "warn", "info", "debug", "trace" or "off"; anything else maps to Info
pub fn level_from_name(name: &str) -> LevelFilter {
    match name.trim().to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}
