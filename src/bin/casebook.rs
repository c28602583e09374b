// casebook: runs the built-in calculation suites and any YAML case tables.
// Usage: casebook run [--tables DIR] [--filter TEXT] [--format human|json]

fn main() {
    // Structured logging with an env-based filter, defaulting to warn
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    std::process::exit(casebook::cli::run());
}
