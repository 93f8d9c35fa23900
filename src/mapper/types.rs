use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// Скалярное значение ячейки SNMP таблицы
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Integer(i64),
    String(String),
}

impl RawValue {
    /// Текстовое представление значения
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawValue::Integer(i) => Cow::Owned(i.to_string()),
            RawValue::String(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Приводит значение к целому числу.
    ///
    /// Строки дают ведущие десятичные цифры (со знаком) после trim, всё остальное даёт 0:
    /// `"42"` -> 42, `" 17 conn"` -> 17, `"-3"` -> -3, `"n/a"` -> 0.
    pub fn to_integer(&self) -> i64 {
        match self {
            RawValue::Integer(i) => *i,
            RawValue::String(s) => leading_integer(s.trim()),
        }
    }
}

fn leading_integer(s: &str) -> i64 {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    // Переполнение насыщаем, как это делает целочисленное приведение в хосте
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });

    if negative { -magnitude } else { magnitude }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

/// Строка таблицы: имя колонки -> значение. Отсутствующая колонка просто не хранится.
pub type RawRow = HashMap<String, RawValue>;

/// SNMP таблица, сгруппированная по индексу строки.
///
/// Индекс непрозрачен (суффикс OID после номера колонки), строки хранятся в порядке добавления.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<(String, RawRow)>,
    positions: HashMap<String, usize>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: &str) -> Option<&RawRow> {
        self.positions.get(index).map(|&pos| &self.rows[pos].1)
    }

    /// Возвращает строку по индексу, создавая её при первом обращении
    pub fn row_mut(&mut self, index: &str) -> &mut RawRow {
        let pos = match self.positions.get(index) {
            Some(&pos) => pos,
            None => {
                self.rows.push((index.to_string(), RawRow::new()));
                self.positions.insert(index.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        &mut self.rows[pos].1
    }

    /// Записывает значение колонки в строку `index`
    pub fn insert(&mut self, index: &str, column: impl Into<String>, value: impl Into<RawValue>) {
        self.row_mut(index).insert(column.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawRow)> {
        self.rows.iter().map(|(index, row)| (index.as_str(), row))
    }
}

impl FromIterator<(String, RawRow)> for RawTable {
    fn from_iter<I: IntoIterator<Item = (String, RawRow)>>(iter: I) -> Self {
        let mut table = RawTable::new();
        for (index, row) in iter {
            table.row_mut(&index).extend(row);
        }
        table
    }
}

/// Одно состояние state-сенсора
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDef {
    pub value: i64,
    /// Обобщённая важность: 0 ok, 1 warning, 2 critical, 3 unknown
    pub generic: i64,
    /// Строить ли график для этого состояния
    pub graph: bool,
    pub descr: String,
}

/// Именованный набор состояний (state index), регистрируется один раз
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxonomy {
    pub name: String,
    pub states: Vec<StateDef>,
    /// Значение для нераспознанных строк. Если не задано, берётся первое (здоровое) состояние.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_value: Option<i64>,
}

impl StateTaxonomy {
    /// Значение при отсутствии совпадения в таблице перечисления
    pub fn fallback_value(&self) -> i64 {
        self.unknown_value
            .or_else(|| self.states.first().map(|s| s.value))
            .unwrap_or(0)
    }

    /// Таблица перечисления по описаниям состояний: `ENABLE -> 0`, `DISABLE -> 1`
    pub fn derived_enum_table(&self) -> HashMap<String, i64> {
        self.states
            .iter()
            .map(|s| (s.descr.trim().to_uppercase(), s.value))
            .collect()
    }
}

/// Вид метрики
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    State,
}

impl MetricKind {
    /// Класс сенсора в модели хоста
    pub fn sensor_class(&self) -> &'static str {
        match self {
            MetricKind::Counter => "count",
            MetricKind::State => "state",
        }
    }
}

/// Правило: колонка таблицы -> метрика.
///
/// Шаблоны поддерживают `{index}` (индекс строки) и `{name}` (значение ключевой колонки).
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRule {
    pub column: String,
    pub kind: MetricKind,
    pub oid_template: String,
    pub id_template: String,
    pub sensor_type: String,
    pub group: String,
    pub label_template: String,
    /// Сырая строка -> значение. Для state-правил без таблицы она выводится из `taxonomy`.
    pub enum_table: Option<HashMap<String, i64>>,
    /// Набор состояний; обязателен для `MetricKind::State`
    pub taxonomy: Option<StateTaxonomy>,
}

/// Готовая к регистрации метрика
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRecord {
    pub kind: MetricKind,
    pub oid: String,
    pub unique_id: String,
    pub sensor_type: String,
    pub group: String,
    pub label: String,
    pub value: i64,
    pub divisor: i64,
    pub multiplier: i64,
    pub poller: String,
    /// Имя набора состояний, только для state-сенсоров
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<StateDef>>,
}
