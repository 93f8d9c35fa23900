use serde::Serialize;

use super::SensorSink;
use crate::collector::Device;
use crate::mapper::{MetricRecord, StateDef, StateTaxonomy};

/// Сенсор, привязанный к устройству
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredSensor {
    pub device: String,
    #[serde(flatten)]
    pub record: MetricRecord,
}

/// Sink в памяти: запоминает всё в порядке регистрации
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub state_indexes: Vec<StateTaxonomy>,
    pub sensors: Vec<RegisteredSensor>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorSink for RecordingSink {
    fn register_state_index(&mut self, name: &str, states: &[StateDef]) {
        self.state_indexes.push(StateTaxonomy {
            name: name.to_string(),
            states: states.to_vec(),
            unknown_value: None,
        });
    }

    fn register_sensor(&mut self, device: &Device, record: &MetricRecord) {
        self.sensors.push(RegisteredSensor {
            device: device.id.clone(),
            record: record.clone(),
        });
    }
}
