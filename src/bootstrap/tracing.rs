pub async fn init_tracing() {
    // Log level comes from RUST_LOG, "info" when unset
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_level)),
    );

    if subscriber.try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
