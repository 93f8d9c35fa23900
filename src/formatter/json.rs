use serde::{Deserialize, Serialize};

use crate::collector::DiscoveryReport;
use crate::mapper::{MetricKind, MetricRecord, StateDef, StateTaxonomy};

/// JSON структура для отдачи хосту
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResultJson {
    pub device: String,
    pub target: String,
    pub profile: String,
    pub table: String,
    pub timestamp: String,
    pub summary: ResultSummary,
    pub state_indexes: Vec<StateIndexJson>,
    pub sensors: Vec<SensorJson>,
    pub fetch_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub count_sensors: usize,
    pub state_sensors: usize,
    pub status: String, // "success" | "empty" | "error"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateIndexJson {
    pub name: String,
    pub states: Vec<StateDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorJson {
    pub class: String, // "count" | "state"
    pub oid: String,
    pub index: String,
    pub sensor_type: String,
    pub group: String,
    pub descr: String,
    pub divisor: i64,
    pub multiplier: i64,
    pub current: i64,
    pub poller: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_index: Option<String>,
    /// Описание текущего состояния, только для state-сенсоров
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_descr: Option<String>,
}

/// JSON форматтер для результатов discovery
pub struct JsonFormatter;

impl JsonFormatter {
    /// Конвертирует результат discovery в JSON структуру
    pub fn format_report(report: &DiscoveryReport) -> DiscoveryResultJson {
        let timestamp = chrono::Utc::now().to_rfc3339();

        let count_sensors = report
            .records
            .iter()
            .filter(|r| r.kind == MetricKind::Counter)
            .count();

        let status = match (&report.fetch_error, report.records.is_empty()) {
            (Some(_), _) => "error",
            (None, true) => "empty",
            (None, false) => "success",
        };

        let summary = ResultSummary {
            total_rows: report.rows_total,
            skipped_rows: report.rows_skipped,
            count_sensors,
            state_sensors: report.records.len() - count_sensors,
            status: status.to_string(),
        };

        DiscoveryResultJson {
            device: report.device.id.clone(),
            target: report.device.target.clone(),
            profile: report.profile.clone(),
            table: report.table.clone(),
            timestamp,
            summary,
            state_indexes: report.state_indexes.iter().map(Self::format_state_index).collect(),
            sensors: report.records.iter().map(Self::format_sensor).collect(),
            fetch_error: report.fetch_error.clone(),
        }
    }

    fn format_state_index(taxonomy: &StateTaxonomy) -> StateIndexJson {
        StateIndexJson {
            name: taxonomy.name.clone(),
            states: taxonomy.states.clone(),
        }
    }

    /// Форматирует сенсор для JSON
    fn format_sensor(record: &MetricRecord) -> SensorJson {
        let state_descr = record.states.as_ref().and_then(|states| {
            states
                .iter()
                .find(|s| s.value == record.value)
                .map(|s| s.descr.clone())
        });

        SensorJson {
            class: record.kind.sensor_class().to_string(),
            oid: record.oid.clone(),
            index: record.unique_id.clone(),
            sensor_type: record.sensor_type.clone(),
            group: record.group.clone(),
            descr: record.label.clone(),
            divisor: record.divisor,
            multiplier: record.multiplier,
            current: record.value,
            poller: record.poller.clone(),
            state_index: record.state_index.clone(),
            state_descr,
        }
    }

    /// Сериализует результат в JSON строку
    pub fn to_json_string(report: &DiscoveryReport) -> anyhow::Result<String> {
        let json_result = Self::format_report(report);
        serde_json::to_string_pretty(&json_result)
            .map_err(|e| anyhow::anyhow!("Ошибка сериализации в JSON: {}", e))
    }

    /// Сериализует результат в компактный JSON
    pub fn to_json_compact(report: &DiscoveryReport) -> anyhow::Result<String> {
        let json_result = Self::format_report(report);
        serde_json::to_string(&json_result)
            .map_err(|e| anyhow::anyhow!("Ошибка сериализации в JSON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Device;

    fn record(kind: MetricKind, value: i64) -> MetricRecord {
        let states = match kind {
            MetricKind::State => Some(vec![
                StateDef { value: 0, generic: 0, graph: true, descr: "Enable".to_string() },
                StateDef { value: 1, generic: 2, graph: false, descr: "Disable".to_string() },
            ]),
            MetricKind::Counter => None,
        };

        MetricRecord {
            kind,
            oid: ".1.3.6.1.4.1.12356.112.3.2.1.3.1".to_string(),
            unique_id: "fadcVSStatus.1".to_string(),
            sensor_type: "fadcVSStatus".to_string(),
            group: "Virtual Server Status".to_string(),
            label: "VS-Web - Status".to_string(),
            value,
            divisor: 1,
            multiplier: 1,
            poller: "snmp".to_string(),
            state_index: states.as_ref().map(|_| "fadcVSStatus".to_string()),
            states,
        }
    }

    fn report(records: Vec<MetricRecord>, fetch_error: Option<String>) -> DiscoveryReport {
        DiscoveryReport {
            device: Device::new("adc-1", "192.0.2.10:161"),
            profile: "fortiadc-vs".to_string(),
            table: "fadcVSTable".to_string(),
            rows_total: 1,
            rows_skipped: 0,
            state_indexes: Vec::new(),
            records,
            fetch_error,
        }
    }

    #[test]
    fn summary_counts_sensor_classes() {
        let json = JsonFormatter::format_report(&report(
            vec![record(MetricKind::Counter, 42), record(MetricKind::State, 1)],
            None,
        ));

        assert_eq!(json.summary.count_sensors, 1);
        assert_eq!(json.summary.state_sensors, 1);
        assert_eq!(json.summary.status, "success");
        assert_eq!(json.sensors[0].class, "count");
        assert_eq!(json.sensors[1].class, "state");
        assert_eq!(json.sensors[1].state_descr.as_deref(), Some("Disable"));
        assert!(json.sensors[0].state_descr.is_none());
    }

    #[test]
    fn fetch_error_marks_status() {
        let json = JsonFormatter::format_report(&report(Vec::new(), Some("таймаут".to_string())));
        assert_eq!(json.summary.status, "error");

        let json = JsonFormatter::format_report(&report(Vec::new(), None));
        assert_eq!(json.summary.status, "empty");
    }

    #[test]
    fn compact_json_is_parseable() {
        let out =
            JsonFormatter::to_json_compact(&report(vec![record(MetricKind::Counter, 5)], None))
                .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["sensors"][0]["current"], 5);
        assert_eq!(value["sensors"][0]["poller"], "snmp");
        assert!(value["sensors"][0].get("state_index").is_none());
        assert!(value["timestamp"].as_str().is_some());
    }
}
