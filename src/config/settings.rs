use serde::{Deserialize, Serialize};

/// Базовые настройки приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Настройки подключения
    pub connection: ConnectionSettings,
    /// Настройки аутентификации
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Таймаут для SNMP операций (секунды)
    pub timeout: u64,
    /// Количество повторов при ошибках
    pub retries: u32,
    /// max-repetitions для GETBULK
    pub max_repetitions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Community string SNMPv2c
    pub community: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings {
                timeout: 10,
                retries: 2,
                max_repetitions: 10,
            },
            auth: AuthSettings {
                community: "public".to_string(),
            },
        }
    }
}
