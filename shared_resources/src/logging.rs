use env_logger::Env;

/// Installs the process-wide logger. `RUST_LOG` overrides the `info` default.
pub fn init() {
    let env = Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("logger already initialised");
    }
}
