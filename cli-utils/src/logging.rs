/// Initialize `env_logger`, logging at `info` unless `RUST_LOG` says
/// otherwise.
///
/// Logs go to stderr, stdout is reserved for tool output.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}
