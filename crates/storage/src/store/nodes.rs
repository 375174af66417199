#![forbid(unsafe_code)]

use super::*;
use cr_core::paths::NodePath;
use rusqlite::params;

impl SqliteStore {
    pub fn insert_node(&mut self, request: InsertNodeRequest) -> Result<NodeRow, StoreError> {
        let workspace = canonicalize_workspace(&request.workspace)?;
        let path = NodePath::parse(&request.path)
            .map_err(|_| StoreError::InvalidInput("invalid node path"))?;
        if request.identifier.trim().is_empty() {
            return Err(StoreError::InvalidInput("identifier must not be empty"));
        }
        if request.node_type.trim().is_empty() {
            return Err(StoreError::InvalidInput("node type must not be empty"));
        }

        let dimensions_hash = dimensions_hash(&request.dimension_values);
        let dimension_values = request.dimension_values.to_string();
        let properties = request.properties.to_string();
        let storage_id = new_storage_id();
        let now_ms = now_ms();

        let tx = self.conn.transaction()?;
        if !workspace_exists_tx(&tx, workspace.as_str())? {
            return Err(StoreError::UnknownWorkspace);
        }

        let insert = tx.execute(
            "INSERT INTO nodes(storage_id, identifier, workspace, path, node_type, \
             dimensions_hash, dimension_values, properties, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                storage_id,
                request.identifier,
                workspace.as_str(),
                path.as_str(),
                request.node_type,
                dimensions_hash,
                dimension_values,
                properties,
                now_ms,
            ],
        );

        if let Err(err) = insert {
            if is_constraint_violation(&err) {
                return Err(StoreError::NodeAlreadyExists);
            }
            return Err(StoreError::Sql(err));
        }

        tx.commit()?;
        Ok(NodeRow {
            storage_id,
            identifier: request.identifier,
            workspace: workspace.as_str().to_string(),
            path: path.as_str().to_string(),
            node_type: request.node_type,
            dimensions_hash,
            dimension_values,
            properties,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    pub fn get_node(&self, storage_id: &str) -> Result<Option<NodeRow>, StoreError> {
        if storage_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("storage id must not be empty"));
        }

        let row = self
            .conn
            .query_row(
                "SELECT storage_id, identifier, workspace, path, node_type, dimensions_hash, \
                 dimension_values, properties, created_at_ms, updated_at_ms \
                 FROM nodes WHERE storage_id=?1",
                params![storage_id],
                |row| {
                    Ok(NodeRow {
                        storage_id: row.get::<_, String>(0)?,
                        identifier: row.get::<_, String>(1)?,
                        workspace: row.get::<_, String>(2)?,
                        path: row.get::<_, String>(3)?,
                        node_type: row.get::<_, String>(4)?,
                        dimensions_hash: row.get::<_, String>(5)?,
                        dimension_values: row.get::<_, String>(6)?,
                        properties: row.get::<_, String>(7)?,
                        created_at_ms: row.get::<_, i64>(8)?,
                        updated_at_ms: row.get::<_, i64>(9)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Targeted identifier rewrite. Returns the affected-row count so the
    /// caller can assert the exactly-one-row contract; the store itself
    /// does not treat 0 as an error.
    pub fn update_node_identifier(
        &mut self,
        storage_id: &str,
        identifier: &str,
    ) -> Result<usize, StoreError> {
        if storage_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("storage id must not be empty"));
        }
        if identifier.trim().is_empty() {
            return Err(StoreError::InvalidInput("identifier must not be empty"));
        }

        let affected = self.conn.execute(
            "UPDATE nodes SET identifier=?1, updated_at_ms=?2 WHERE storage_id=?3",
            params![identifier, now_ms(), storage_id],
        )?;
        Ok(affected)
    }
}
