use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn build_dispatch(verbose: u8, log_time: bool, color: bool) -> Dispatch {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(color)
        .with_target(false);
    if log_time {
        Dispatch::new(builder.finish())
    } else {
        Dispatch::new(builder.without_time().finish())
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/logging.rs"]
mod tests;
