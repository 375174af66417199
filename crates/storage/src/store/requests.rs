#![forbid(unsafe_code)]

use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub base_workspace: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InsertNodeRequest {
    pub workspace: String,
    pub path: String,
    pub identifier: String,
    pub node_type: String,
    pub dimension_values: Value,
    pub properties: Value,
}

impl InsertNodeRequest {
    /// Node with no content dimensions and no properties; enough for the
    /// consistency contract, which only reads path, workspace, identifier
    /// and the dimension hash.
    pub fn bare(workspace: &str, path: &str, identifier: &str) -> Self {
        Self {
            workspace: workspace.to_string(),
            path: path.to_string(),
            identifier: identifier.to_string(),
            node_type: "unstructured".to_string(),
            dimension_values: Value::Object(serde_json::Map::new()),
            properties: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_dimensions(mut self, dimension_values: Value) -> Self {
        self.dimension_values = dimension_values;
        self
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }
}
