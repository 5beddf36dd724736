use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "NIMBUS_LOG";

/// Workspace crates whose events pass the default filter.
const CRATE_TARGETS: &[&str] = &[
    "nimbus",
    "nimbus_advect",
    "nimbus_engine",
    "nimbus_field",
    "nimbus_io",
    "nimbus_motion",
    "nimbus_spectral",
    "nimbus_stats",
];

/// `-v` count to level: none warns, `-v` info, `-vv` debug, more traces.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Directives enabling `level` on the workspace crates only; third-party
/// crates (arrow, parquet) stay at `warn`.
pub fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_ascii_lowercase();
    std::iter::once("warn".to_string())
        .chain(CRATE_TARGETS.iter().map(|t| format!("{t}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(verbosity: u8) -> EnvFilter {
    for var in [LOG_ENV, EnvFilter::DEFAULT_ENV] {
        if let Ok(filter) = EnvFilter::try_from_env(var) {
            return filter;
        }
    }
    EnvFilter::new(default_directives(level_for(verbosity)))
}

/// Install the global subscriber on stderr. `NIMBUS_LOG`, then `RUST_LOG`,
/// override the verbosity flag. Targets are shown from `-vv` upward.
pub fn init(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .init();
}
