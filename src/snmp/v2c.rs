use std::net::Ipv4Addr;

use snmp2::{AsyncSession, Oid, Value};
use tokio::time::{Duration, timeout};
use tracing::debug;

use super::oid::normalize_oid;
use crate::error::FetchError;
use crate::mapper::RawValue;

/// Строка walk'а: OID без ведущей точки и значение (`None` для Null/NoSuch*)
pub type Varbind = (String, Option<RawValue>);

/// Что делать walk'у с очередным varbind'ом
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    Accept,
    Stop,
}

fn oid_arcs(oid: &str) -> Option<Vec<u64>> {
    normalize_oid(oid)
        .split('.')
        .map(|arc| arc.parse().ok())
        .collect()
}

/// Решает судьбу varbind'а по OID.
///
/// Выход из поддерева `start` или EndOfMibView завершает walk. OID, который не больше
/// предыдущего (или `start`, если предыдущего нет), означает зацикливание агента.
pub fn walk_step(
    start: &str,
    last: Option<&str>,
    oid: &str,
    end_of_view: bool,
) -> Result<WalkStep, FetchError> {
    let parse = |s: &str| {
        oid_arcs(s).ok_or_else(|| FetchError::Malformed {
            reason: format!("Некорректный OID в ответе: {}", s),
        })
    };

    let start_arcs = parse(start)?;
    let arcs = parse(oid)?;

    if end_of_view || arcs.len() <= start_arcs.len() || !arcs.starts_with(&start_arcs) {
        return Ok(WalkStep::Stop);
    }

    let previous = match last {
        Some(last) => parse(last)?,
        None => start_arcs,
    };

    if arcs <= previous {
        return Err(FetchError::Malformed {
            reason: format!(
                "Агент вернул OID {} не после {}",
                normalize_oid(oid),
                last.map(normalize_oid).unwrap_or(normalize_oid(start))
            ),
        });
    }

    Ok(WalkStep::Accept)
}

pub struct SnmpClientV2c {
    pub(crate) session: AsyncSession,
    target: String,
    timeout: Duration,
}

impl SnmpClientV2c {
    pub async fn new(target: &str, community: &[u8], timeout: Duration) -> Result<Self, FetchError> {
        let session = AsyncSession::new_v2c(target, community, 2)
            .await
            .map_err(|e| FetchError::Session {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            session,
            target: target.to_string(),
            timeout,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// GETBULK walk по поддереву `start_oid`
    pub async fn walk_bulk(
        &mut self,
        start_oid: &Oid<'_>,
        max_repetitions: u32,
    ) -> Result<Vec<Varbind>, FetchError> {
        let mut results: Vec<Varbind> = Vec::new();
        let mut current_oid = start_oid.to_owned();
        let start = start_oid.to_string();
        let mut last: Option<String> = None;
        let seconds = self.timeout.as_secs();

        loop {
            // Выполняем SNMP GETBULK запрос
            let resp = match timeout(
                self.timeout,
                self.session.getbulk(&[&current_oid], 0, max_repetitions),
            )
            .await
            {
                Ok(Ok(resp)) => resp,
                Ok(Err(e)) => {
                    return Err(FetchError::Request {
                        oid: current_oid.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    return Err(FetchError::Timeout {
                        oid: current_oid.to_string(),
                        seconds,
                    });
                }
            };

            let mut advanced = false;

            for (oid, value) in resp.varbinds {
                let oid_str = oid.to_string();
                let end_of_view = matches!(value, Value::EndOfMibView);

                match walk_step(&start, last.as_deref(), &oid_str, end_of_view)? {
                    WalkStep::Stop => {
                        debug!(rows = results.len(), "walk завершён");
                        return Ok(results);
                    }
                    WalkStep::Accept => {
                        results.push((normalize_oid(&oid_str).to_string(), convert_value(&value)));
                        current_oid = oid.to_owned();
                        last = Some(oid_str);
                        advanced = true;
                    }
                }
            }

            // Пустой ответ
            if !advanced {
                debug!(rows = results.len(), "walk завершён");
                return Ok(results);
            }
        }
    }
}

/// Конвертирует SNMP значение в скаляр таблицы
pub fn convert_value(value: &Value<'_>) -> Option<RawValue> {
    match value {
        Value::Integer(i) => Some(RawValue::Integer(*i)),
        Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => {
            Some(RawValue::Integer(i64::from(*v)))
        }
        Value::Counter64(v) => Some(RawValue::Integer(i64::try_from(*v).unwrap_or(i64::MAX))),
        Value::Boolean(b) => Some(RawValue::Integer(i64::from(*b))),
        Value::OctetString(bytes) => Some(RawValue::String(
            String::from_utf8_lossy(bytes).into_owned(),
        )),
        Value::ObjectIdentifier(oid) => Some(RawValue::String(oid.to_string())),
        Value::IpAddress(octets) => Some(RawValue::String(Ipv4Addr::from(*octets).to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_numeric_types_to_integers() {
        assert_eq!(convert_value(&Value::Integer(-5)), Some(RawValue::Integer(-5)));
        assert_eq!(convert_value(&Value::Counter32(42)), Some(RawValue::Integer(42)));
        assert_eq!(convert_value(&Value::Timeticks(100)), Some(RawValue::Integer(100)));
        assert_eq!(
            convert_value(&Value::Counter64(u64::MAX)),
            Some(RawValue::Integer(i64::MAX))
        );
    }

    #[test]
    fn converts_strings_and_addresses() {
        assert_eq!(
            convert_value(&Value::OctetString(b"VS-Web")),
            Some(RawValue::from("VS-Web"))
        );
        assert_eq!(
            convert_value(&Value::IpAddress([10, 0, 0, 1])),
            Some(RawValue::from("10.0.0.1"))
        );
    }

    const VS_ENTRY: &str = "1.3.6.1.4.1.12356.112.3.2.1";

    #[test]
    fn walk_accepts_increasing_oids_inside_subtree() {
        assert_eq!(
            walk_step(VS_ENTRY, None, "1.3.6.1.4.1.12356.112.3.2.1.2.1", false).unwrap(),
            WalkStep::Accept
        );
        // 2.10 идёт после 2.9 по аркам, а не по строке
        assert_eq!(
            walk_step(
                VS_ENTRY,
                Some("1.3.6.1.4.1.12356.112.3.2.1.2.9"),
                ".1.3.6.1.4.1.12356.112.3.2.1.2.10",
                false
            )
            .unwrap(),
            WalkStep::Accept
        );
    }

    #[test]
    fn walk_stops_outside_subtree_and_at_end_of_view() {
        assert_eq!(
            walk_step(VS_ENTRY, None, "1.3.6.1.4.1.12356.112.3.3.1.1", false).unwrap(),
            WalkStep::Stop
        );
        // Соседняя ветка с общим строковым префиксом
        assert_eq!(
            walk_step(VS_ENTRY, None, "1.3.6.1.4.1.12356.112.3.2.10.1", false).unwrap(),
            WalkStep::Stop
        );
        assert_eq!(
            walk_step(VS_ENTRY, Some("1.3.6.1.4.1.12356.112.3.2.1.2.1"), VS_ENTRY, true)
                .unwrap(),
            WalkStep::Stop
        );
    }

    #[test]
    fn walk_rejects_repeated_oid() {
        let last = "1.3.6.1.4.1.12356.112.3.2.1.2.3";
        let err = walk_step(VS_ENTRY, Some(last), last, false).unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn walk_rejects_decreasing_oid() {
        let err = walk_step(
            VS_ENTRY,
            Some("1.3.6.1.4.1.12356.112.3.2.1.3.1"),
            "1.3.6.1.4.1.12356.112.3.2.1.2.1",
            false,
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn null_values_are_absent() {
        assert_eq!(convert_value(&Value::Null), None);
        assert_eq!(convert_value(&Value::NoSuchInstance), None);
        assert_eq!(convert_value(&Value::EndOfMibView), None);
    }
}
