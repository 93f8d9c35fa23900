pub mod oid;
pub mod table;
pub mod v2c;

pub use oid::{normalize_oid, parse_oid};
pub use table::{SnmpTableFetcher, TableFetcher, group_varbinds};
pub use v2c::{SnmpClientV2c, Varbind, WalkStep, convert_value, walk_step};
