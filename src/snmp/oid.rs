use snmp2::Oid;

use crate::error::FetchError;

/// Парсит строку OID (`.1.3.6.1` или `1.3.6.1`) в объект Oid
pub fn parse_oid(s: &str) -> Result<Oid<'static>, FetchError> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.map_err(|e| FetchError::InvalidOid {
        oid: s.to_string(),
        reason: e.to_string(),
    })?;

    if parts.is_empty() {
        return Err(FetchError::InvalidOid {
            oid: s.to_string(),
            reason: "пустой OID".to_string(),
        });
    }

    Oid::from(&parts).map_err(|e| FetchError::InvalidOid {
        oid: s.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Приводит OID к виду без ведущей точки, для сравнения строк
pub fn normalize_oid(s: &str) -> &str {
    s.trim().trim_start_matches('.')
}
