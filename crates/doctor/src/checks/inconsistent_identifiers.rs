#![forbid(unsafe_code)]

use super::{CheckError, NodeStore, RepairOptions, RepairOutcome, ask_yes_no, plural_suffix};
use crate::console::Console;
use cr_core::model::{Finding, classify_workspaces};
use tracing::debug;

/// Detects nodes in non-live workspaces whose identifier has drifted away
/// from the node at the same path and dimension context in a live
/// workspace, and optionally rewrites the non-live identifier to the live
/// one. The scan is read-only; writes only happen after an interactive
/// confirmation and are skipped entirely on a dry run.
pub fn fix_nodes_with_inconsistent_identifier<S: NodeStore>(
    store: &mut S,
    console: &mut dyn Console,
    options: &RepairOptions,
) -> Result<RepairOutcome, CheckError> {
    console.output_line("Checking for nodes with inconsistent identifier ...");

    // The workspace and node-type filters are deliberately not applied
    // here: identifier drift is only meaningful against the full set of
    // live workspaces, so this check always scans globally.
    let workspaces = store.list_workspaces()?;
    let partition = classify_workspaces(&workspaces);

    let mut findings: Vec<Finding> = Vec::new();
    for workspace in &partition.non_live {
        let rows = store.find_inconsistent_identifiers(workspace, &partition.live)?;
        for row in rows {
            console.output_line(&format!(
                "Node {} in workspace {} has identifier {} but live node has identifier {}.",
                row.path, workspace, row.identifier, row.live_identifier
            ));
            findings.push(Finding {
                storage_id: row.storage_id,
                path: row.path,
                workspace: workspace.clone(),
                current_identifier: row.identifier,
                live_identifier: row.live_identifier,
            });
        }
    }

    if findings.is_empty() {
        return Ok(RepairOutcome::NoFindings);
    }

    if options.dry_run {
        console.output_line(&format!(
            "Found {} node{} with inconsistent identifiers which need to be fixed.",
            findings.len(),
            plural_suffix(findings.len())
        ));
        console.output_line("");
        return Ok(RepairOutcome::DryRun {
            findings: findings.len(),
        });
    }

    console.output_line("");
    console.output_line("Nodes with inconsistent identifiers found.");
    let question = format!(
        "Do you want to fix the identifiers of {} node{} now?",
        findings.len(),
        plural_suffix(findings.len())
    );
    if !ask_yes_no(console, &question)? {
        console.output_line("Skipping.");
        console.output_line("");
        return Ok(RepairOutcome::Skipped {
            findings: findings.len(),
        });
    }

    let total = findings.len();
    for finding in findings {
        debug!(
            "rewriting identifier of node {} ({}) in workspace {} from {} to {}",
            finding.path,
            finding.storage_id,
            finding.workspace,
            finding.current_identifier,
            finding.live_identifier
        );
        let affected =
            store.update_node_identifier(&finding.storage_id, &finding.live_identifier)?;
        if affected != 1 {
            return Err(CheckError::UnexpectedUpdateResult {
                storage_id: finding.storage_id,
                new_identifier: finding.live_identifier,
                affected,
            });
        }
    }

    console.output_line("Fixed inconsistent identifiers.");
    console.output_line("");
    Ok(RepairOutcome::Fixed { fixed: total })
}
