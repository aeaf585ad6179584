use KiSludge::Utils::logger::{init_logger, level_from_name};
use KiSludge::cli::cli_main::run_interactive_menu;

/// KISLUDGE_LOG sets the terminal log level, KISLUDGE_LOG_FILE adds a file log
fn main() {
    let level = std::env::var("KISLUDGE_LOG")
        .map(|name| level_from_name(&name))
        .unwrap_or(simplelog::LevelFilter::Info);
    let log_file = std::env::var("KISLUDGE_LOG_FILE").ok();
    if let Err(e) = init_logger(level, log_file.as_deref()) {
        eprintln!("{}", e);
    }
    run_interactive_menu();
}
