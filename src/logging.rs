use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` wins over `verbosity`; output
/// goes to stderr so SVG written to stdout stays clean.
pub fn init(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "schemabox=info",
        1 => "schemabox=debug",
        _ => "schemabox=trace",
    };

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
