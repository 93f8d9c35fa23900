use std::collections::HashMap;

use tracing::trace;

pub mod types;

pub use types::{
    MappingRule, MetricKind, MetricRecord, RawRow, RawTable, RawValue, StateDef, StateTaxonomy,
};

/// Подставляется в `{index}`
const INDEX_PLACEHOLDER: &str = "{index}";
/// Подставляется в `{name}`
const NAME_PLACEHOLDER: &str = "{name}";

const POLLER: &str = "snmp";

/// Превращает SNMP таблицу в записи для регистрации сенсоров
pub struct TableMapper;

impl TableMapper {
    /// Применяет правила к каждой строке таблицы.
    ///
    /// Строки без ключевой колонки (или с пустым значением после trim) пропускаются целиком.
    /// Порядок: строки в порядке таблицы, внутри строки правила в порядке объявления.
    pub fn map_table(
        table: &RawTable,
        key_column: &str,
        rules: &[MappingRule],
    ) -> Vec<MetricRecord> {
        let enum_tables: Vec<Option<HashMap<String, i64>>> =
            rules.iter().map(Self::lookup_table).collect();

        let mut records = Vec::new();

        for (index, row) in table.iter() {
            let Some(name) = Self::key_value(row, key_column) else {
                trace!(index, key_column, "строка без имени, пропускаем");
                continue;
            };

            for (rule, enum_table) in rules.iter().zip(&enum_tables) {
                let Some(raw) = row.get(&rule.column) else {
                    trace!(index, column = %rule.column, "колонка отсутствует");
                    continue;
                };

                records.push(Self::map_cell(index, &name, raw, rule, enum_table.as_ref()));
            }
        }

        records
    }

    /// Значение ключевой колонки после trim, `None` если пусто
    pub fn key_value(row: &RawRow, key_column: &str) -> Option<String> {
        let name = row.get(key_column)?.as_text().trim().to_string();
        if name.is_empty() { None } else { Some(name) }
    }

    /// Нормализует строковое состояние: trim + верхний регистр, поиск в таблице, иначе fallback
    pub fn normalize_state(
        raw: &RawValue,
        enum_table: &HashMap<String, i64>,
        taxonomy: Option<&StateTaxonomy>,
    ) -> i64 {
        let key = raw.as_text().trim().to_uppercase();
        match enum_table.get(&key) {
            Some(&value) => value,
            None => taxonomy.map(StateTaxonomy::fallback_value).unwrap_or(0),
        }
    }

    /// Подставляет индекс строки и имя в шаблон
    pub fn render(template: &str, index: &str, name: &str) -> String {
        template
            .replace(INDEX_PLACEHOLDER, index)
            .replace(NAME_PLACEHOLDER, name)
    }

    fn map_cell(
        index: &str,
        name: &str,
        raw: &RawValue,
        rule: &MappingRule,
        enum_table: Option<&HashMap<String, i64>>,
    ) -> MetricRecord {
        let (value, states) = match rule.kind {
            MetricKind::Counter => (raw.to_integer(), None),
            MetricKind::State => {
                let value = match enum_table {
                    Some(table) => Self::normalize_state(raw, table, rule.taxonomy.as_ref()),
                    None => 0,
                };
                let states = rule.taxonomy.as_ref().map(|t| t.states.clone()).unwrap_or_default();
                (value, Some(states))
            }
        };

        MetricRecord {
            kind: rule.kind,
            oid: Self::render(&rule.oid_template, index, name),
            unique_id: Self::render(&rule.id_template, index, name),
            sensor_type: rule.sensor_type.clone(),
            group: rule.group.clone(),
            label: Self::render(&rule.label_template, index, name),
            value,
            divisor: 1,
            multiplier: 1,
            poller: POLLER.to_string(),
            state_index: match rule.kind {
                MetricKind::State => rule.taxonomy.as_ref().map(|t| t.name.clone()),
                MetricKind::Counter => None,
            },
            states,
        }
    }

    /// Таблица поиска в верхнем регистре, только для state-правил
    fn lookup_table(rule: &MappingRule) -> Option<HashMap<String, i64>> {
        if rule.kind != MetricKind::State {
            return None;
        }

        let table = match (&rule.enum_table, &rule.taxonomy) {
            (Some(explicit), _) => explicit
                .iter()
                .map(|(raw, value)| (raw.trim().to_uppercase(), *value))
                .collect(),
            (None, Some(taxonomy)) => taxonomy.derived_enum_table(),
            (None, None) => HashMap::new(),
        };

        Some(table)
    }
}
