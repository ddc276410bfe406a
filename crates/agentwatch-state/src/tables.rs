//! redb table definitions for the counter store.

use redb::TableDefinition;

/// Consecutive disconnect counts keyed by EC2 instance id.
pub const FAILURES: TableDefinition<&str, u64> = TableDefinition::new("failures");
