#![forbid(unsafe_code)]

mod inconsistent_identifiers;

pub use inconsistent_identifiers::fix_nodes_with_inconsistent_identifier;

use crate::console::Console;
use cr_core::ids::WorkspaceName;
use cr_core::model::Workspace;
use cr_storage::{InconsistentNodeRow, SqliteStore, StoreError};
use tracing::debug;

/// Narrow repository interface the checks run against. Keeps the storage
/// technology out of the check contract and lets tests substitute a
/// scripted store.
pub trait NodeStore {
    fn list_workspaces(&self) -> Result<Vec<Workspace>, StoreError>;

    fn find_inconsistent_identifiers(
        &self,
        workspace: &WorkspaceName,
        live_workspaces: &[WorkspaceName],
    ) -> Result<Vec<InconsistentNodeRow>, StoreError>;

    fn update_node_identifier(
        &mut self,
        storage_id: &str,
        identifier: &str,
    ) -> Result<usize, StoreError>;
}

impl NodeStore for SqliteStore {
    fn list_workspaces(&self) -> Result<Vec<Workspace>, StoreError> {
        self.list_workspace_models()
    }

    fn find_inconsistent_identifiers(
        &self,
        workspace: &WorkspaceName,
        live_workspaces: &[WorkspaceName],
    ) -> Result<Vec<InconsistentNodeRow>, StoreError> {
        SqliteStore::find_inconsistent_identifiers(self, workspace, live_workspaces)
    }

    fn update_node_identifier(
        &mut self,
        storage_id: &str,
        identifier: &str,
    ) -> Result<usize, StoreError> {
        SqliteStore::update_node_identifier(self, storage_id, identifier)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepairOptions {
    /// Accepted for parity with the repair surface; the identifier check is
    /// always global and ignores it.
    pub workspace: Option<String>,
    /// Accepted for parity with the repair surface; unused by the
    /// identifier check.
    pub node_type: Option<String>,
    pub dry_run: bool,
    pub cleanup: bool,
    pub skip: Vec<String>,
    pub only: Vec<String>,
}

impl RepairOptions {
    pub fn new() -> Self {
        Self {
            cleanup: true,
            ..Self::default()
        }
    }
}

/// Splits a comma-separated check list, trimming whitespace and dropping
/// empty entries.
pub fn parse_check_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckKind {
    InconsistentIdentifiers,
}

pub struct CheckDefinition {
    pub name: &'static str,
    /// Cleanup-tagged checks are skipped when cleanup is disabled.
    pub cleanup: bool,
    pub short_description: &'static str,
    pub long_description: &'static str,
    pub kind: CheckKind,
}

/// The repair checks, in execution order.
pub const CHECKS: &[CheckDefinition] = &[CheckDefinition {
    name: "fixNodesWithInconsistentIdentifier",
    cleanup: true,
    short_description: "Run checks for basic node integrity in the content repository",
    long_description: "Repair inconsistent node identifiers\n\
        \n\
        Will check for and optionally repair node identifiers which are out of sync\n\
        with their corresponding nodes in a live workspace.",
    kind: CheckKind::InconsistentIdentifiers,
}];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepairOutcome {
    NoFindings,
    DryRun { findings: usize },
    Skipped { findings: usize },
    Fixed { fixed: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckReport {
    pub name: &'static str,
    pub outcome: RepairOutcome,
}

#[derive(Debug)]
pub enum CheckError {
    Store(StoreError),
    Console(std::io::Error),
    /// A targeted identifier update touched something other than exactly
    /// one row. The store no longer matches the tool's assumptions
    /// (concurrent writer, duplicate storage ids); the caller must stop
    /// the whole run.
    UnexpectedUpdateResult {
        storage_id: String,
        new_identifier: String,
        affected: usize,
    },
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "store: {err}"),
            Self::Console(err) => write!(f, "console: {err}"),
            Self::UnexpectedUpdateResult {
                storage_id,
                new_identifier,
                affected,
            } => write!(
                f,
                "identifier update affected {affected} rows (storage_id={storage_id}, new_identifier={new_identifier})"
            ),
        }
    }
}

impl std::error::Error for CheckError {}

impl From<StoreError> for CheckError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Runs every registered check that survives the skip/only/cleanup
/// filters, in registry order.
pub fn run_repair<S: NodeStore>(
    store: &mut S,
    console: &mut dyn Console,
    options: &RepairOptions,
) -> Result<Vec<CheckReport>, CheckError> {
    let mut reports = Vec::new();
    for check in CHECKS {
        if options.skip.iter().any(|name| name == check.name) {
            continue;
        }
        if !options.only.is_empty() && !options.only.iter().any(|name| name == check.name) {
            continue;
        }
        if !options.cleanup && check.cleanup {
            continue;
        }

        let outcome = match check.kind {
            CheckKind::InconsistentIdentifiers => {
                fix_nodes_with_inconsistent_identifier(store, console, options)?
            }
        };
        debug!("check {} finished: {:?}", check.name, outcome);
        reports.push(CheckReport {
            name: check.name,
            outcome,
        });
    }
    Ok(reports)
}

pub(crate) fn plural_suffix(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Blocking yes/no question. Anything but a case-insensitive `y` or `n`
/// re-prompts; a blank line is printed once a valid answer arrives.
pub(crate) fn ask_yes_no(console: &mut dyn Console, question: &str) -> Result<bool, CheckError> {
    loop {
        let answer = console
            .ask(&format!("{question} (y/n) "))
            .map_err(CheckError::Console)?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" => {
                console.output_line("");
                return Ok(true);
            }
            "n" => {
                console.output_line("");
                return Ok(false);
            }
            _ => {}
        }
    }
}
