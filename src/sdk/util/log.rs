use env_logger::{Builder, Env};
use log::LevelFilter;

/// Sets up `env_logger` for the CLI. `RUST_LOG`, when set, replaces the default level.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default));
    builder
        .format_timestamp_secs()
        .format_module_path(false)
        // connection chatter drowns out per-pair progress
        .filter_module("hyper_util", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}
