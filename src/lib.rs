//! Discovery сенсоров по SNMP таблицам.
//!
//! Таблица снимается walk'ом, строки группируются по индексу, а декларативные правила
//! превращают колонки в count и state сенсоры для модели хоста.

pub mod collector;
pub mod config;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod mapper;
pub mod registry;
pub mod snmp;

pub use collector::{Device, Discovery, DiscoveryReport};
pub use error::FetchError;
pub use mapper::{MappingRule, MetricKind, MetricRecord, RawTable, RawValue, TableMapper};
pub use registry::{RecordingSink, SensorSink, StateRegistry};
