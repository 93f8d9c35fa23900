use std::future::Future;

use tokio::time::Duration;
use tracing::{debug, trace, warn};

use super::oid::{normalize_oid, parse_oid};
use super::v2c::{SnmpClientV2c, Varbind};
use crate::collector::Device;
use crate::config::TableSchema;
use crate::error::FetchError;
use crate::mapper::RawTable;

/// Источник SNMP таблиц для discovery
pub trait TableFetcher {
    /// Забирает таблицу целиком, сгруппированную по индексу строки
    fn fetch_table(
        &mut self,
        device: &Device,
        schema: &TableSchema,
    ) -> impl Future<Output = Result<RawTable, FetchError>>;
}

/// Группирует результат walk'а по индексам строк.
///
/// OID раскладывается как `<entry>.<column>.<index>`. Чужие OID и неизвестные колонки
/// пропускаются, OID без индекса считается ошибкой.
pub fn group_varbinds(
    schema: &TableSchema,
    varbinds: impl IntoIterator<Item = Varbind>,
) -> Result<RawTable, FetchError> {
    let prefix = format!("{}.", normalize_oid(&schema.entry_oid));
    let mut table = RawTable::new();

    for (oid, value) in varbinds {
        let Some(rest) = normalize_oid(&oid).strip_prefix(&prefix) else {
            trace!(%oid, "OID вне таблицы");
            continue;
        };

        let (column, index) = match rest.split_once('.') {
            Some((column, index)) if !index.is_empty() => (column, index),
            _ => {
                return Err(FetchError::Malformed {
                    reason: format!("OID {} без индекса строки", oid),
                });
            }
        };

        let column_name = column
            .parse::<u32>()
            .ok()
            .and_then(|c| schema.columns.get(&c));

        let Some(column_name) = column_name else {
            trace!(%oid, column, "колонка не описана в профиле");
            continue;
        };

        match value {
            Some(value) => table.insert(index, column_name.clone(), value),
            // Ячейка без значения: строку заводим, колонку нет
            None => {
                table.row_mut(index);
            }
        }
    }

    Ok(table)
}

/// Забирает таблицы по SNMPv2c, новая сессия на каждую попытку
pub struct SnmpTableFetcher {
    community: Vec<u8>,
    timeout: Duration,
    retries: u32,
    max_repetitions: u32,
}

impl SnmpTableFetcher {
    pub fn new(community: Vec<u8>, timeout: Duration, retries: u32, max_repetitions: u32) -> Self {
        Self {
            community,
            timeout,
            retries,
            max_repetitions,
        }
    }

    async fn walk_once(
        &self,
        device: &Device,
        schema: &TableSchema,
    ) -> Result<Vec<Varbind>, FetchError> {
        let entry_oid = parse_oid(&schema.entry_oid)?;
        let mut client = SnmpClientV2c::new(&device.target, &self.community, self.timeout).await?;

        debug!(
            device = client.target(),
            table = %schema.name,
            mib = %schema.mib,
            "walk таблицы"
        );

        client.walk_bulk(&entry_oid, self.max_repetitions).await
    }
}

/// Имеет ли смысл повторять запрос после этой ошибки
fn is_transient(err: &FetchError) -> bool {
    matches!(
        err,
        FetchError::Session { .. } | FetchError::Request { .. } | FetchError::Timeout { .. }
    )
}

impl TableFetcher for SnmpTableFetcher {
    async fn fetch_table(
        &mut self,
        device: &Device,
        schema: &TableSchema,
    ) -> Result<RawTable, FetchError> {
        let mut attempt = 0;
        loop {
            match self.walk_once(device, schema).await {
                Ok(varbinds) => return group_varbinds(schema, varbinds),
                Err(e) if is_transient(&e) && attempt < self.retries => {
                    attempt += 1;
                    warn!(device = %device.id, attempt, error = %e, "повтор walk'а");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::RawValue;
    use std::collections::BTreeMap;

    fn schema() -> TableSchema {
        TableSchema {
            name: "fadcVSTable".to_string(),
            mib: "FORTINET-FORTIADC-MIB".to_string(),
            entry_oid: ".1.3.6.1.4.1.12356.112.3.2.1".to_string(),
            key_column: "fadcVSName".to_string(),
            columns: BTreeMap::from([
                (2, "fadcVSName".to_string()),
                (3, "fadcVSStatus".to_string()),
                (5, "fadcVSNewConnections".to_string()),
            ]),
        }
    }

    fn vb(oid: &str, value: Option<RawValue>) -> Varbind {
        (oid.to_string(), value)
    }

    #[test]
    fn groups_columns_by_index() {
        let varbinds = vec![
            vb("1.3.6.1.4.1.12356.112.3.2.1.2.1", Some(RawValue::from("VS-Web"))),
            vb("1.3.6.1.4.1.12356.112.3.2.1.2.10", Some(RawValue::from("VS-Api"))),
            vb("1.3.6.1.4.1.12356.112.3.2.1.3.1", Some(RawValue::from("Enable"))),
            vb("1.3.6.1.4.1.12356.112.3.2.1.5.10", Some(RawValue::from(7i64))),
        ];

        let table = group_varbinds(&schema(), varbinds).unwrap();
        assert_eq!(table.len(), 2);

        let indexes: Vec<&str> = table.iter().map(|(i, _)| i).collect();
        assert_eq!(indexes, vec!["1", "10"]);

        let row = table.get("10").unwrap();
        assert_eq!(row.get("fadcVSName"), Some(&RawValue::from("VS-Api")));
        assert_eq!(row.get("fadcVSNewConnections"), Some(&RawValue::from(7i64)));
        assert!(row.get("fadcVSStatus").is_none());
    }

    #[test]
    fn multi_arc_index_is_kept_whole() {
        let varbinds = vec![vb(
            ".1.3.6.1.4.1.12356.112.3.2.1.2.3.118.115.49",
            Some(RawValue::from("vs1")),
        )];

        let table = group_varbinds(&schema(), varbinds).unwrap();
        assert!(table.get("3.118.115.49").is_some());
    }

    #[test]
    fn skips_foreign_oids_and_unknown_columns() {
        let varbinds = vec![
            vb("1.3.6.1.2.1.1.5.0", Some(RawValue::from("host"))),
            vb("1.3.6.1.4.1.12356.112.3.2.1.9.1", Some(RawValue::from(3i64))),
            vb("1.3.6.1.4.1.12356.112.3.2.10.2.1", Some(RawValue::from("x"))),
        ];

        let table = group_varbinds(&schema(), varbinds).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn null_cell_does_not_create_column() {
        let varbinds = vec![vb("1.3.6.1.4.1.12356.112.3.2.1.2.4", None)];

        let table = group_varbinds(&schema(), varbinds).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("4").unwrap().is_empty());
    }

    #[test]
    fn only_transport_errors_are_retried() {
        assert!(is_transient(&FetchError::Timeout {
            oid: "1.3".to_string(),
            seconds: 1
        }));
        assert!(!is_transient(&FetchError::Malformed {
            reason: "x".to_string()
        }));
    }

    #[tokio::test]
    async fn invalid_entry_oid_fails_without_network() {
        let mut fetcher = SnmpTableFetcher::new(b"public".to_vec(), Duration::from_secs(1), 2, 10);
        let device = Device::new("adc-1", "127.0.0.1:161");
        let bad = TableSchema {
            entry_oid: "1.3.bad".to_string(),
            ..schema()
        };

        let result = fetcher.fetch_table(&device, &bad).await;
        assert!(matches!(result, Err(FetchError::InvalidOid { .. })));
    }

    #[test]
    fn oid_without_index_is_malformed() {
        let varbinds = vec![vb("1.3.6.1.4.1.12356.112.3.2.1.2", Some(RawValue::from("x")))];

        assert!(matches!(
            group_varbinds(&schema(), varbinds),
            Err(FetchError::Malformed { .. })
        ));
    }
}
