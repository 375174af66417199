#![forbid(unsafe_code)]

use super::*;
use cr_core::ids::WorkspaceName;
use rusqlite::params_from_iter;
use serde_json::Value;
use sha2::{Digest, Sha256};

impl SqliteStore {
    /// Finds every node in `workspace` whose identifier disagrees with a
    /// node at the same path and dimension hash in one of the live
    /// workspaces. The root path is excluded: it has no cross-workspace
    /// identifier contract. Ordering is deterministic (path, storage id).
    pub fn find_inconsistent_identifiers(
        &self,
        workspace: &WorkspaceName,
        live_workspaces: &[WorkspaceName],
    ) -> Result<Vec<InconsistentNodeRow>, StoreError> {
        // No live candidates means the join can never match.
        if live_workspaces.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; live_workspaces.len()].join(", ");
        let sql = format!(
            "SELECT nonlive.storage_id, nonlive.path, nonlive.identifier, live.identifier \
             FROM nodes AS nonlive \
             JOIN nodes AS live \
               ON live.path = nonlive.path \
              AND live.dimensions_hash = nonlive.dimensions_hash \
              AND live.identifier <> nonlive.identifier \
             WHERE nonlive.workspace = ? \
               AND nonlive.path <> '/' \
               AND live.workspace IN ({placeholders}) \
             ORDER BY nonlive.path ASC, nonlive.storage_id ASC"
        );

        let mut bindings = Vec::with_capacity(1 + live_workspaces.len());
        bindings.push(workspace.as_str());
        for live in live_workspaces {
            bindings.push(live.as_str());
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings), |row| {
            Ok(InconsistentNodeRow {
                storage_id: row.get::<_, String>(0)?,
                path: row.get::<_, String>(1)?,
                identifier: row.get::<_, String>(2)?,
                live_identifier: row.get::<_, String>(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Hash of a node's dimension context (e.g. `{"language": ["en"]}`).
/// serde_json's default map keeps keys sorted, so the encoding and the
/// resulting hash are independent of insertion order.
pub fn dimensions_hash(dimension_values: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(dimension_values.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
