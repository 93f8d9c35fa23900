use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::mapper::{MappingRule, MetricKind, StateTaxonomy};
use crate::snmp::parse_oid;

/// Встроенный профиль: виртуальные серверы FortiADC
const BUILTIN_FORTIADC: &str = include_str!("../../profiles/fortiadc-vs.yaml");

/// Описание SNMP таблицы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String, // Имя таблицы в MIB, например "fadcVSTable"
    pub mib: String,
    pub entry_oid: String, // OID записи таблицы (`...Entry`), к нему добавляются колонка и индекс
    pub key_column: String, // Колонка с именем строки; строки без имени пропускаются
    pub columns: BTreeMap<u32, String>, // Номер колонки -> имя
}

/// Правило в том виде, как оно записано в YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub column: String,
    pub kind: MetricKind,
    pub oid: String,
    pub unique_id: String,
    #[serde(default)]
    pub sensor_type: Option<String>,
    pub group: String,
    pub label: String,
    /// Имя state index, только для `kind: state`
    #[serde(default)]
    pub state_index: Option<String>,
    #[serde(default, rename = "enum")]
    pub enum_table: Option<HashMap<String, i64>>,
}

/// Профиль как он лежит в YAML, до проверки и разрешения правил
#[derive(Deserialize)]
struct RawProfile {
    name: String,
    table: TableSchema,
    #[serde(default)]
    state_indexes: Vec<StateTaxonomy>,
    rules: Vec<RuleConfig>,
}

/// Профиль таблицы. Любая десериализация проходит через проверку и разрешение правил.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct Profile {
    pub name: String, // Название профиля, например "fortiadc-vs"
    pub table: TableSchema,
    pub state_indexes: Vec<StateTaxonomy>,
    pub rules: Vec<RuleConfig>,
    #[serde(skip)]
    resolved: Vec<MappingRule>,
}

impl TryFrom<RawProfile> for Profile {
    type Error = String;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        let mut profile = Profile {
            name: raw.name,
            table: raw.table,
            state_indexes: raw.state_indexes,
            rules: raw.rules,
            resolved: Vec::new(),
        };

        profile.resolved = profile.resolve().map_err(|e| format!("{:#}", e))?;
        Ok(profile)
    }
}

impl Profile {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Не удалось прочитать файл: {}", path))?;

        Self::from_yaml(&content).context(format!("Профиль {} невалиден", path))
    }

    /// Профиль FortiADC, зашитый в бинарник
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_FORTIADC).context("Встроенный профиль невалиден")
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content).context("Не удалось разобрать профиль")
    }

    /// Правила с подставленными наборами состояний
    pub fn mapping_rules(&self) -> &[MappingRule] {
        &self.resolved
    }

    pub fn taxonomy(&self, name: &str) -> Option<&StateTaxonomy> {
        self.state_indexes.iter().find(|t| t.name == name)
    }

    fn resolve(&self) -> Result<Vec<MappingRule>> {
        if self.rules.is_empty() {
            anyhow::bail!("Профиль '{}' пустой", self.name);
        }

        parse_oid(&self.table.entry_oid)
            .with_context(|| format!("Таблица '{}'", self.table.name))?;

        let known_column = |column: &str| self.table.columns.values().any(|c| c == column);

        if !known_column(self.table.key_column.as_str()) {
            anyhow::bail!(
                "Ключевая колонка '{}' не описана в таблице '{}'",
                self.table.key_column,
                self.table.name
            );
        }

        for taxonomy in &self.state_indexes {
            if taxonomy.states.is_empty() {
                anyhow::bail!("State index '{}' без состояний", taxonomy.name);
            }
            if let Some(unknown) = taxonomy.unknown_value
                && !taxonomy.states.iter().any(|s| s.value == unknown)
            {
                anyhow::bail!(
                    "State index '{}': unknown_value {} не входит в список состояний",
                    taxonomy.name,
                    unknown
                );
            }
        }

        self.rules
            .iter()
            .map(|rule| -> Result<MappingRule> {
                if !known_column(rule.column.as_str()) {
                    anyhow::bail!("Правило ссылается на неизвестную колонку '{}'", rule.column);
                }

                let taxonomy = match (rule.kind, &rule.state_index) {
                    (MetricKind::State, Some(name)) => Some(
                        self.taxonomy(name)
                            .cloned()
                            .with_context(|| format!("Неизвестный state index '{}'", name))?,
                    ),
                    (MetricKind::State, None) => {
                        anyhow::bail!("State правило для '{}' без state_index", rule.column)
                    }
                    (MetricKind::Counter, _) => None,
                };

                let sensor_type = rule
                    .sensor_type
                    .clone()
                    .or_else(|| taxonomy.as_ref().map(|t| t.name.clone()))
                    .with_context(|| format!("Правило для '{}' без sensor_type", rule.column))?;

                Ok(MappingRule {
                    column: rule.column.clone(),
                    kind: rule.kind,
                    oid_template: rule.oid.clone(),
                    id_template: rule.unique_id.clone(),
                    sensor_type,
                    group: rule.group.clone(),
                    label_template: rule.label.clone(),
                    enum_table: rule.enum_table.clone(),
                    taxonomy,
                })
            })
            .collect()
    }
}
