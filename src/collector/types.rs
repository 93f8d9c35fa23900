use serde::Serialize;

use crate::mapper::{MetricRecord, StateTaxonomy};

/// Устройство, с которого снимается таблица
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Идентификатор устройства в хосте
    pub id: String,
    /// `host:port` SNMP агента
    pub target: String,
}

impl Device {
    pub fn new(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
        }
    }
}

/// Результат одного прогона discovery
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub device: Device,
    pub profile: String,
    pub table: String,
    /// Строк в полученной таблице
    pub rows_total: usize,
    /// Строк без имени
    pub rows_skipped: usize,
    /// Наборы состояний, на которые ссылаются записи
    pub state_indexes: Vec<StateTaxonomy>,
    pub records: Vec<MetricRecord>,
    /// Ошибка получения таблицы; discovery в этом случае работает с пустой таблицей
    pub fetch_error: Option<String>,
}
