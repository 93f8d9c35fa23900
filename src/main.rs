use anyhow::Result;
use tokio::time::Duration;
use tracing::error;

use fadc_sensors::config::{self, AppConfig};
use fadc_sensors::formatter::JsonFormatter;
use fadc_sensors::snmp::SnmpTableFetcher;
use fadc_sensors::{Device, Discovery, RecordingSink, StateRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    fadc_sensors::logging::init()?;

    let config = load_config()?;
    config.log_summary();

    let target = config.get_target();
    let device = Device::new(target.clone(), target);

    let mut fetcher = SnmpTableFetcher::new(
        config.get_community(),
        Duration::from_secs(config.get_timeout()),
        config.settings.connection.retries,
        config.settings.connection.max_repetitions,
    );
    let mut sink = RecordingSink::new();
    let mut registry = StateRegistry::new();

    Discovery::register_state_indexes(&mut registry, &mut sink, &config.profile);
    let report =
        Discovery::run(&mut fetcher, &mut sink, &mut registry, &device, &config.profile).await;

    // Выводим результат в JSON
    match JsonFormatter::to_json_string(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => error!(error = %e, "ошибка JSON сериализации"),
    }

    Ok(())
}

/// Профиль из `FADC_PROFILE`, иначе файл по умолчанию, иначе встроенный
fn load_config() -> Result<AppConfig> {
    if let Some(path) = AppConfig::profile_path_from_env() {
        return AppConfig::load(path);
    }

    if std::path::Path::new(config::DEFAULT_PROFILE_PATH).exists() {
        AppConfig::load(config::DEFAULT_PROFILE_PATH)
    } else {
        AppConfig::builtin()
    }
}
