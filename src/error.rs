use thiserror::Error;

/// Ошибки получения таблицы с устройства.
///
/// Ни одна из них не фатальна: discovery подставляет пустую таблицу и продолжает.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("не удалось создать SNMP сессию с {target}: {reason}")]
    Session { target: String, reason: String },

    #[error("SNMP запрос {oid} не удался: {reason}")]
    Request { oid: String, reason: String },

    #[error("таймаут SNMP запроса {oid} ({seconds}с)")]
    Timeout { oid: String, seconds: u64 },

    #[error("невалидный OID '{oid}': {reason}")]
    InvalidOid { oid: String, reason: String },

    #[error("некорректный ответ SNMP: {reason}")]
    Malformed { reason: String },
}
