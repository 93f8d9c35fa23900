use tracing::{Instrument, debug, info, info_span, warn};

pub mod types;

pub use types::{Device, DiscoveryReport};

use crate::config::Profile;
use crate::error::FetchError;
use crate::mapper::{RawTable, StateTaxonomy, TableMapper};
use crate::registry::{SensorSink, StateRegistry};
use crate::snmp::TableFetcher;

/// Прогон discovery: забрать таблицу, разложить по правилам, зарегистрировать сенсоры
pub struct Discovery;

impl Discovery {
    /// Регистрирует все наборы состояний профиля. Вызывается до первого прогона.
    pub fn register_state_indexes(
        registry: &mut StateRegistry,
        sink: &mut impl SensorSink,
        profile: &Profile,
    ) -> usize {
        profile
            .state_indexes
            .iter()
            .filter(|taxonomy| registry.ensure(sink, taxonomy))
            .count()
    }

    /// Ошибка получения таблицы превращается в пустую таблицу
    pub fn table_or_empty(fetched: Result<RawTable, FetchError>) -> (RawTable, Option<FetchError>) {
        match fetched {
            Ok(table) => (table, None),
            Err(e) => (RawTable::new(), Some(e)),
        }
    }

    /// Полный прогон по одному устройству. Ошибок не возвращает: при сбое SNMP сенсоров просто нет.
    pub async fn run<F, S>(
        fetcher: &mut F,
        sink: &mut S,
        registry: &mut StateRegistry,
        device: &Device,
        profile: &Profile,
    ) -> DiscoveryReport
    where
        F: TableFetcher,
        S: SensorSink,
    {
        let span = info_span!("discovery", device = %device.id, profile = %profile.name);

        async {
            let fetched = fetcher.fetch_table(device, &profile.table).await;
            let (table, fetch_error) = Self::table_or_empty(fetched);

            if let Some(e) = &fetch_error {
                warn!(table = %profile.table.name, error = %e, "таблица недоступна, сенсоры не обнаружены");
            }

            let report = Self::register(sink, registry, device, profile, &table, fetch_error);

            info!(
                rows = report.rows_total,
                skipped = report.rows_skipped,
                sensors = report.records.len(),
                "discovery завершён"
            );

            report
        }
        .instrument(span)
        .await
    }

    /// Синхронная часть прогона по уже полученной таблице
    pub fn register<S: SensorSink>(
        sink: &mut S,
        registry: &mut StateRegistry,
        device: &Device,
        profile: &Profile,
        table: &RawTable,
        fetch_error: Option<FetchError>,
    ) -> DiscoveryReport {
        let key_column = &profile.table.key_column;
        let records = TableMapper::map_table(table, key_column, profile.mapping_rules());

        let rows_skipped = table
            .iter()
            .filter(|(_, row)| TableMapper::key_value(row, key_column).is_none())
            .count();

        let mut state_indexes: Vec<StateTaxonomy> = Vec::new();

        for record in &records {
            // Набор состояний должен быть у хоста раньше первого сенсора, который на него ссылается
            if let Some(taxonomy) = record.state_index.as_deref().and_then(|n| profile.taxonomy(n)) {
                registry.ensure(sink, taxonomy);
                if !state_indexes.iter().any(|t| t.name == taxonomy.name) {
                    state_indexes.push(taxonomy.clone());
                }
            }

            debug!(oid = %record.oid, label = %record.label, value = record.value, "сенсор");
            sink.register_sensor(device, record);
        }

        DiscoveryReport {
            device: device.clone(),
            profile: profile.name.clone(),
            table: profile.table.name.clone(),
            rows_total: table.len(),
            rows_skipped,
            state_indexes,
            records,
            fetch_error: fetch_error.map(|e| e.to_string()),
        }
    }
}
