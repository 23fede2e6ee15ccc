/// Install the JSON tracing subscriber. Filter comes from `HOMEDASH_LOG`
/// (default: store at info, sqlx at warn). Safe to call more than once;
/// later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("HOMEDASH_LOG").unwrap_or_else(|_| "homedash=info,sqlx=warn".into()),
        )
        .json()
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init();
}
