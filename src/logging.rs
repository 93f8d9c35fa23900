use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Инициализирует логирование в stderr. Уровень берётся из `RUST_LOG`, по умолчанию `info`.
///
/// stdout остаётся под JSON результат.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Не удалось инициализировать логирование: {}", e))
}
