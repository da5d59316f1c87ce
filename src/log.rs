use log::LevelFilter;

/// Environment variable that turns on debug logging for the CLI.
pub const DEBUG_ENV_VAR: &str = "CRYPTARITH_DEBUG";

/// Initialize logging for the solver.
///
/// Uses `Debug` level if `debug_enabled` is true, otherwise `Info`;
/// `RUST_LOG` overrides both when set.
///
/// Calling it twice is harmless; the second logger is ignored.
pub fn init_logger(debug_enabled: bool) {
    use std::env;
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    // Let RUST_LOG override our defaults if explicitly set
    if let Ok(spec) = env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if builder.try_init().is_ok() {
        log::debug!("logger initialized at {level:?} level");
    }
}

/// Whether [`DEBUG_ENV_VAR`] is set in the environment.
#[must_use]
pub fn debug_requested() -> bool {
    std::env::var_os(DEBUG_ENV_VAR).is_some()
}
