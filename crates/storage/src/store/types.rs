#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceRow {
    pub name: String,
    pub base_workspace: Option<String>,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRow {
    pub storage_id: String,
    pub identifier: String,
    pub workspace: String,
    pub path: String,
    pub node_type: String,
    pub dimensions_hash: String,
    pub dimension_values: String,
    pub properties: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// One row of the consistency scan: a non-live node whose identifier
/// disagrees with the live node at the same path and dimension hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InconsistentNodeRow {
    pub storage_id: String,
    pub path: String,
    pub identifier: String,
    pub live_identifier: String,
}
