#![forbid(unsafe_code)]

use super::*;
use cr_core::ids::WorkspaceName;
use cr_core::model::Workspace;
use rusqlite::params;

impl SqliteStore {
    pub fn create_workspace(
        &mut self,
        request: CreateWorkspaceRequest,
    ) -> Result<WorkspaceRow, StoreError> {
        let name = canonicalize_workspace(&request.name)?;
        let base_workspace = request
            .base_workspace
            .as_deref()
            .map(canonicalize_workspace)
            .transpose()?;

        if base_workspace
            .as_ref()
            .is_some_and(|base| base == &name)
        {
            return Err(StoreError::InvalidInput(
                "workspace cannot be based on itself",
            ));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if let Some(base) = base_workspace.as_ref() {
            if !workspace_exists_tx(&tx, base.as_str())? {
                return Err(StoreError::UnknownWorkspace);
            }
        }

        let insert = tx.execute(
            "INSERT INTO workspaces(name, base_workspace, created_at_ms) VALUES (?1, ?2, ?3)",
            params![
                name.as_str(),
                base_workspace.as_ref().map(|base| base.as_str()),
                now_ms
            ],
        );

        if let Err(err) = insert {
            if is_constraint_violation(&err) {
                return Err(StoreError::WorkspaceAlreadyExists);
            }
            return Err(StoreError::Sql(err));
        }

        tx.commit()?;
        Ok(WorkspaceRow {
            name: name.as_str().to_string(),
            base_workspace: base_workspace.map(|base| base.as_str().to_string()),
            created_at_ms: now_ms,
        })
    }

    pub fn list_workspaces(&self) -> Result<Vec<WorkspaceRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, base_workspace, created_at_ms FROM workspaces ORDER BY name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(WorkspaceRow {
                name: row.get::<_, String>(0)?,
                base_workspace: row.get::<_, Option<String>>(1)?,
                created_at_ms: row.get::<_, i64>(2)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Workspace listing as domain values, for the classifier.
    pub fn list_workspace_models(&self) -> Result<Vec<Workspace>, StoreError> {
        let mut out = Vec::new();
        for row in self.list_workspaces()? {
            let name = WorkspaceName::try_new(row.name)
                .map_err(|_| StoreError::InvalidInput("stored workspace name is invalid"))?;
            let base_workspace = row
                .base_workspace
                .map(WorkspaceName::try_new)
                .transpose()
                .map_err(|_| StoreError::InvalidInput("stored base workspace name is invalid"))?;
            out.push(Workspace {
                name,
                base_workspace,
            });
        }
        Ok(out)
    }
}
