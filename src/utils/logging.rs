use tracing::Level;

/// Installs the `newt-ws` log subscriber.
///
/// Logs go to stderr; stdout is left to command output. A level name that
/// does not parse means `info`. Only the first call in a process installs
/// anything.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Accepts `trace`..`error` in any case, or `1`..`5`.
pub(crate) fn parse_level(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}
