use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::info;

pub mod profile;
pub mod settings;

pub use profile::{Profile, RuleConfig, TableSchema};
pub use settings::Settings;

/// Профиль по умолчанию, если `FADC_PROFILE` не задан
pub const DEFAULT_PROFILE_PATH: &str = "./profiles/fortiadc-vs.yaml";

/// Главная конфигурация приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Профиль таблицы и правил
    pub profile: Profile,
    /// Базовые настройки
    pub settings: Settings,
}

impl AppConfig {
    /// Загружает конфигурацию из YAML файла
    pub fn load(profile_path: impl AsRef<Path>) -> Result<Self> {
        let path = profile_path.as_ref().to_string_lossy();
        let profile = Profile::load(&path)?;
        let settings = Settings::default();

        Ok(Self { profile, settings })
    }

    /// Конфигурация со встроенным профилем FortiADC
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            profile: Profile::builtin()?,
            settings: Settings::default(),
        })
    }

    /// Путь профиля из `FADC_PROFILE`, если задан
    pub fn profile_path_from_env() -> Option<String> {
        env::var("FADC_PROFILE").ok().filter(|p| !p.trim().is_empty())
    }

    /// Получает target из переменной окружения или использует по умолчанию
    pub fn get_target(&self) -> String {
        env::var("SNMP_TARGET").unwrap_or_else(|_| "127.0.0.1:161".to_string())
    }

    /// Получает timeout из переменной окружения или из настроек
    pub fn get_timeout(&self) -> u64 {
        env::var("SNMP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.settings.connection.timeout)
    }

    /// Получает community для SNMPv2c
    pub fn get_community(&self) -> Vec<u8> {
        env::var("SNMP_COMMUNITY")
            .unwrap_or_else(|_| self.settings.auth.community.clone())
            .into_bytes()
    }

    pub fn log_summary(&self) {
        info!(
            profile = %self.profile.name,
            table = %self.profile.table.name,
            snmp_target = %self.get_target(),
            timeout_secs = self.get_timeout(),
            rules = self.profile.mapping_rules().len(),
            state_indexes = self.profile.state_indexes.len(),
            "конфигурация загружена"
        );
    }
}
