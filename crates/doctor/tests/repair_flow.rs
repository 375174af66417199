#![forbid(unsafe_code)]

use cr_doctor::checks::{RepairOptions, RepairOutcome, run_repair};
use cr_doctor::console::Console;
use cr_storage::{CreateWorkspaceRequest, InsertNodeRequest, SqliteStore};
use std::collections::VecDeque;

struct ScriptedConsole {
    answers: VecDeque<&'static str>,
    lines: Vec<String>,
}

impl ScriptedConsole {
    fn answering(answers: &[&'static str]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            lines: Vec::new(),
        }
    }
}

impl Console for ScriptedConsole {
    fn output_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn ask(&mut self, _question: &str) -> std::io::Result<String> {
        Ok(self.answers.pop_front().unwrap_or("n").to_string())
    }
}

fn seed_drifted_store(dir: &tempfile::TempDir) -> (SqliteStore, String) {
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    store
        .create_workspace(CreateWorkspaceRequest {
            name: "live".to_string(),
            base_workspace: None,
        })
        .expect("create live workspace");
    store
        .create_workspace(CreateWorkspaceRequest {
            name: "draft".to_string(),
            base_workspace: Some("live".to_string()),
        })
        .expect("create draft workspace");

    store
        .insert_node(InsertNodeRequest::bare("live", "/sites/a", "X"))
        .expect("insert live node");
    let draft = store
        .insert_node(InsertNodeRequest::bare("draft", "/sites/a", "Y"))
        .expect("insert draft node");

    (store, draft.storage_id)
}

#[test]
fn confirmed_repair_rewrites_the_drifted_identifier() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (mut store, draft_id) = seed_drifted_store(&dir);
    let mut console = ScriptedConsole::answering(&["y"]);

    let reports = run_repair(&mut store, &mut console, &RepairOptions::new()).expect("run repair");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, RepairOutcome::Fixed { fixed: 1 });

    let node = store
        .get_node(&draft_id)
        .expect("get node")
        .expect("node exists");
    assert_eq!(node.identifier, "X");

    // A second run over the repaired store finds nothing.
    let mut console = ScriptedConsole::answering(&[]);
    let reports = run_repair(&mut store, &mut console, &RepairOptions::new()).expect("rerun");
    assert_eq!(reports[0].outcome, RepairOutcome::NoFindings);
}

#[test]
fn dry_run_leaves_the_store_untouched() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (mut store, draft_id) = seed_drifted_store(&dir);
    let mut console = ScriptedConsole::answering(&[]);
    let mut options = RepairOptions::new();
    options.dry_run = true;

    let reports = run_repair(&mut store, &mut console, &options).expect("run repair");
    assert_eq!(reports[0].outcome, RepairOutcome::DryRun { findings: 1 });
    assert!(
        console
            .lines
            .contains(&"Found 1 node with inconsistent identifiers which need to be fixed.".to_string())
    );

    let node = store
        .get_node(&draft_id)
        .expect("get node")
        .expect("node exists");
    assert_eq!(node.identifier, "Y");
}

#[test]
fn declined_repair_leaves_the_store_untouched() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (mut store, draft_id) = seed_drifted_store(&dir);
    let mut console = ScriptedConsole::answering(&["n"]);

    let reports = run_repair(&mut store, &mut console, &RepairOptions::new()).expect("run repair");
    assert_eq!(reports[0].outcome, RepairOutcome::Skipped { findings: 1 });
    assert!(console.lines.contains(&"Skipping.".to_string()));

    let node = store
        .get_node(&draft_id)
        .expect("get node")
        .expect("node exists");
    assert_eq!(node.identifier, "Y");
}
