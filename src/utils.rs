use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn default_directive(debug: u8) -> &'static str {
    match debug {
        0 => "kasset=warn",
        1 => "kasset=info",
        2 => "kasset=debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Keep the returned guard alive until exit so
/// buffered log lines get flushed.
pub fn init_tracing(debug: u8) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .ok();

    guard
}

pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}
