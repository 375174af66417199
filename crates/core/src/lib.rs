#![forbid(unsafe_code)]

pub mod ids {
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct WorkspaceName(String);

    impl WorkspaceName {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, WorkspaceNameError> {
            let value = value.into();
            validate_workspace_name(&value)?;
            Ok(Self(value))
        }
    }

    impl std::fmt::Display for WorkspaceName {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum WorkspaceNameError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    fn validate_workspace_name(value: &str) -> Result<(), WorkspaceNameError> {
        if value.is_empty() {
            return Err(WorkspaceNameError::Empty);
        }
        if value.len() > 128 {
            return Err(WorkspaceNameError::TooLong);
        }
        let Some(first) = value.chars().next() else {
            return Err(WorkspaceNameError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(WorkspaceNameError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate() {
            if index == 0 {
                continue;
            }
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                continue;
            }
            return Err(WorkspaceNameError::InvalidChar { ch, index });
        }
        Ok(())
    }
}

pub mod paths {
    /// Absolute node path inside the content tree, e.g. `/sites/foo/bar`.
    /// `/` is the tree root; it carries no cross-workspace identifier
    /// contract and is excluded from consistency checks.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct NodePath(String);

    impl NodePath {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn root() -> Self {
            Self("/".to_string())
        }

        pub fn is_root(&self) -> bool {
            self.0 == "/"
        }

        pub fn parse(value: &str) -> Result<Self, NodePathError> {
            if value.is_empty() {
                return Err(NodePathError::Empty);
            }
            if !value.starts_with('/') {
                return Err(NodePathError::NotAbsolute);
            }
            if value == "/" {
                return Ok(Self(value.to_string()));
            }
            if value.ends_with('/') {
                return Err(NodePathError::TrailingSlash);
            }
            for segment in value[1..].split('/') {
                if segment.is_empty() {
                    return Err(NodePathError::EmptySegment);
                }
            }
            Ok(Self(value.to_string()))
        }
    }

    impl std::fmt::Display for NodePath {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum NodePathError {
        Empty,
        NotAbsolute,
        TrailingSlash,
        EmptySegment,
    }
}

pub mod model {
    use crate::ids::WorkspaceName;

    /// One workspace as known to the store. A workspace without a base
    /// workspace is "live" (authoritative); one with a base workspace is a
    /// draft-style branch of it.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Workspace {
        pub name: WorkspaceName,
        pub base_workspace: Option<WorkspaceName>,
    }

    impl Workspace {
        pub fn is_live(&self) -> bool {
            self.base_workspace.is_none()
        }
    }

    /// Live/non-live split of the full workspace listing. Together the two
    /// sides cover every input workspace exactly once, in listing order.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct WorkspacePartition {
        pub live: Vec<WorkspaceName>,
        pub non_live: Vec<WorkspaceName>,
    }

    pub fn classify_workspaces(workspaces: &[Workspace]) -> WorkspacePartition {
        let mut partition = WorkspacePartition::default();
        for workspace in workspaces {
            if workspace.is_live() {
                partition.live.push(workspace.name.clone());
            } else {
                partition.non_live.push(workspace.name.clone());
            }
        }
        partition
    }

    /// One detected identifier inconsistency: a non-live node whose domain
    /// identifier disagrees with the live node at the same path and
    /// dimension context. Produced by the scan, consumed by the repair
    /// step, never persisted.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Finding {
        pub storage_id: String,
        pub path: String,
        pub workspace: WorkspaceName,
        pub current_identifier: String,
        pub live_identifier: String,
    }
}

#[cfg(test)]
mod tests {
    use super::ids::{WorkspaceName, WorkspaceNameError};
    use super::model::{Workspace, classify_workspaces};
    use super::paths::{NodePath, NodePathError};

    fn workspace(name: &str, base: Option<&str>) -> Workspace {
        Workspace {
            name: WorkspaceName::try_new(name).expect("workspace name"),
            base_workspace: base.map(|b| WorkspaceName::try_new(b).expect("base name")),
        }
    }

    #[test]
    fn classify_partitions_by_base_workspace() {
        let workspaces = vec![
            workspace("live", None),
            workspace("user-jane", Some("live")),
            workspace("live-other", None),
            workspace("review", Some("live")),
        ];

        let partition = classify_workspaces(&workspaces);
        let live: Vec<&str> = partition.live.iter().map(|w| w.as_str()).collect();
        let non_live: Vec<&str> = partition.non_live.iter().map(|w| w.as_str()).collect();
        assert_eq!(live, vec!["live", "live-other"]);
        assert_eq!(non_live, vec!["user-jane", "review"]);
    }

    #[test]
    fn classify_covers_input_with_no_overlap() {
        let workspaces = vec![
            workspace("a", None),
            workspace("b", Some("a")),
            workspace("c", Some("b")),
        ];

        let partition = classify_workspaces(&workspaces);
        assert_eq!(
            partition.live.len() + partition.non_live.len(),
            workspaces.len()
        );
        for name in &partition.live {
            assert!(!partition.non_live.contains(name));
        }
    }

    #[test]
    fn classify_empty_input_yields_empty_partition() {
        let partition = classify_workspaces(&[]);
        assert!(partition.live.is_empty());
        assert!(partition.non_live.is_empty());
    }

    #[test]
    fn workspace_name_rejects_invalid_values() {
        assert_eq!(WorkspaceName::try_new(""), Err(WorkspaceNameError::Empty));
        assert_eq!(
            WorkspaceName::try_new("-leading"),
            Err(WorkspaceNameError::InvalidFirstChar)
        );
        assert!(matches!(
            WorkspaceName::try_new("user jane"),
            Err(WorkspaceNameError::InvalidChar { ch: ' ', .. })
        ));
        assert_eq!(
            WorkspaceName::try_new("x".repeat(129)),
            Err(WorkspaceNameError::TooLong)
        );
        assert!(WorkspaceName::try_new("user-jane.draft_1").is_ok());
    }

    #[test]
    fn node_path_accepts_root_and_absolute_paths() {
        assert!(NodePath::parse("/").expect("root").is_root());
        let path = NodePath::parse("/sites/foo/bar").expect("path");
        assert!(!path.is_root());
        assert_eq!(path.as_str(), "/sites/foo/bar");
    }

    #[test]
    fn node_path_rejects_malformed_values() {
        assert_eq!(NodePath::parse(""), Err(NodePathError::Empty));
        assert_eq!(NodePath::parse("sites/foo"), Err(NodePathError::NotAbsolute));
        assert_eq!(NodePath::parse("/sites/"), Err(NodePathError::TrailingSlash));
        assert_eq!(
            NodePath::parse("/sites//foo"),
            Err(NodePathError::EmptySegment)
        );
    }
}
