use std::collections::HashSet;

use tracing::debug;

use crate::collector::Device;
use crate::mapper::{MetricRecord, StateDef, StateTaxonomy};

pub mod sink;

pub use sink::{RecordingSink, RegisteredSensor};

/// Куда уходят результаты discovery: модель сенсоров хоста
pub trait SensorSink {
    /// Регистрирует набор состояний (state index)
    fn register_state_index(&mut self, name: &str, states: &[StateDef]);

    /// Регистрирует или обновляет сенсор устройства
    fn register_sensor(&mut self, device: &Device, record: &MetricRecord);
}

/// Явный реестр наборов состояний.
///
/// Каждый набор уходит в sink один раз, повторные вызовы ничего не делают.
#[derive(Debug, Default)]
pub struct StateRegistry {
    registered: HashSet<String>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Регистрирует набор, если он ещё не зарегистрирован. Возвращает `true` при первой регистрации.
    pub fn ensure(&mut self, sink: &mut impl SensorSink, taxonomy: &StateTaxonomy) -> bool {
        if self.registered.contains(&taxonomy.name) {
            return false;
        }

        debug!(name = %taxonomy.name, states = taxonomy.states.len(), "регистрация state index");
        sink.register_state_index(&taxonomy.name, &taxonomy.states);
        self.registered.insert(taxonomy.name.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health() -> StateTaxonomy {
        StateTaxonomy {
            name: "fadcVSHealth".to_string(),
            states: vec![
                StateDef { value: 0, generic: 0, graph: true, descr: "HEALTHY".to_string() },
                StateDef { value: 1, generic: 2, graph: false, descr: "DEAD".to_string() },
            ],
            unknown_value: None,
        }
    }

    #[test]
    fn registers_each_taxonomy_once() {
        let mut registry = StateRegistry::new();
        let mut sink = RecordingSink::default();

        assert!(registry.ensure(&mut sink, &health()));
        assert!(!registry.ensure(&mut sink, &health()));

        assert_eq!(sink.state_indexes.len(), 1);
        assert_eq!(sink.state_indexes[0].name, "fadcVSHealth");
    }

    #[test]
    fn distinct_taxonomies_are_registered_separately() {
        let mut registry = StateRegistry::new();
        let mut sink = RecordingSink::default();
        let status = StateTaxonomy { name: "fadcVSStatus".to_string(), ..health() };

        assert!(registry.ensure(&mut sink, &health()));
        assert!(registry.ensure(&mut sink, &status));
        assert!(!registry.ensure(&mut sink, &status));

        let names: Vec<&str> = sink.state_indexes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["fadcVSHealth", "fadcVSStatus"]);
    }

    #[test]
    fn registry_survives_several_sinks() {
        let mut registry = StateRegistry::new();
        let mut first = RecordingSink::default();
        let mut second = RecordingSink::default();

        registry.ensure(&mut first, &health());
        registry.ensure(&mut second, &health());

        assert_eq!(first.state_indexes.len(), 1);
        assert!(second.state_indexes.is_empty());
    }
}
