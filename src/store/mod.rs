pub mod supabase;

pub use supabase::SupabaseStore;

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

/// One backing-store row: a team's season statistics.
///
/// Treated as an immutable flat stat-name → value mapping for the lifetime
/// of one request. Only numeric columns are retained; the identity columns
/// (team, year) are kept separately.
#[derive(Debug, Clone)]
pub struct TeamSeasonRecord {
    pub team: String,
    pub year: i32,
    stats: HashMap<String, f64>,
}

impl TeamSeasonRecord {
    /// Parse a raw PostgREST JSON row into a record.
    pub fn from_row(row: &Value) -> Result<Self> {
        let obj = row.as_object().context("store row is not a JSON object")?;

        let team = obj
            .get("TEAM")
            .and_then(Value::as_str)
            .context("store row missing TEAM column")?
            .to_string();
        let year = obj
            .get("YEAR")
            .and_then(Value::as_i64)
            .context("store row missing YEAR column")? as i32;

        let stats = obj
            .iter()
            .filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f)))
            .collect();

        Ok(TeamSeasonRecord { team, year, stats })
    }

    /// Look up a statistic by its store column name.
    pub fn stat(&self, column: &str) -> Result<f64, ApiError> {
        self.stats.get(column).copied().ok_or_else(|| ApiError::MissingStat {
            column: column.to_string(),
        })
    }
}

/// Trait every statistics-store backend must implement.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Fetch the unique row for (team, year), or `None` if no such row exists.
    async fn fetch_team_season(&self, team: &str, year: i32) -> Result<Option<TeamSeasonRecord>>;

    /// Return up to `limit` arbitrary raw rows, for diagnostics.
    async fn preview(&self, limit: usize) -> Result<Vec<Value>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn row() -> Value {
        json!({
            "TEAM": "Duke",
            "YEAR": 2023,
            "EFG_O": 54.1,
            "EFG_D": 47.3,
            "dbpr_Player 1": 3.2,
            "CONF": "ACC"
        })
    }

    #[test]
    fn parses_identity_and_numeric_columns() {
        let rec = TeamSeasonRecord::from_row(&row()).unwrap();
        assert_eq!(rec.team, "Duke");
        assert_eq!(rec.year, 2023);
        assert_relative_eq!(rec.stat("EFG_O").unwrap(), 54.1);
        assert_relative_eq!(rec.stat("dbpr_Player 1").unwrap(), 3.2);
    }

    #[test]
    fn non_numeric_columns_are_not_stats() {
        let rec = TeamSeasonRecord::from_row(&row()).unwrap();
        assert!(matches!(
            rec.stat("CONF"),
            Err(ApiError::MissingStat { ref column }) if column == "CONF"
        ));
    }

    #[test]
    fn missing_stat_names_the_column() {
        let rec = TeamSeasonRecord::from_row(&row()).unwrap();
        let err = rec.stat("TOR").unwrap_err();
        assert!(err.to_string().contains("TOR"));
    }

    #[test]
    fn rejects_rows_without_identity_columns() {
        assert!(TeamSeasonRecord::from_row(&json!({"YEAR": 2023})).is_err());
        assert!(TeamSeasonRecord::from_row(&json!({"TEAM": "Duke"})).is_err());
        assert!(TeamSeasonRecord::from_row(&json!("not an object")).is_err());
    }
}
