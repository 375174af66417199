#![forbid(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use cr_doctor::checks::{self, CHECKS, CheckError, RepairOptions, parse_check_list};
use cr_doctor::console::{Console, TerminalConsole};
use cr_storage::SqliteStore;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "crdoctor")]
#[command(version, about = "Maintenance checks for the content repository node store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the repair checks against the node store
    Repair {
        /// Directory holding the content repository database
        #[arg(long, env = "CRDOCTOR_STORAGE_DIR", default_value = ".")]
        storage_dir: PathBuf,

        /// Only handle this workspace (the identifier check always scans
        /// all workspaces and ignores this filter)
        #[arg(long)]
        workspace: Option<String>,

        /// Only handle this node type (unused by the identifier check)
        #[arg(long)]
        node_type: Option<String>,

        /// Don't change anything, just report what would be fixed
        #[arg(long)]
        dry_run: bool,

        /// Skip cleanup-tagged checks
        #[arg(long)]
        no_cleanup: bool,

        /// Skip the given check or checks (comma separated)
        #[arg(long)]
        skip: Option<String>,

        /// Only execute the given check or checks (comma separated)
        #[arg(long)]
        only: Option<String>,
    },

    /// List the registered checks and their descriptions
    Checks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Repair {
            storage_dir,
            workspace,
            node_type,
            dry_run,
            no_cleanup,
            skip,
            only,
        } => {
            let options = RepairOptions {
                workspace,
                node_type,
                dry_run,
                cleanup: !no_cleanup,
                skip: parse_check_list(skip.as_deref()),
                only: parse_check_list(only.as_deref()),
            };
            debug!("opening node store at {}", storage_dir.display());
            let mut store = SqliteStore::open(&storage_dir)?;
            let mut console = TerminalConsole::stdout();
            run_repair(&mut store, &mut console, &options)
        }
        Commands::Checks => {
            let mut console = TerminalConsole::stdout();
            list_checks(&mut console);
            Ok(())
        }
    }
}

fn run_repair(
    store: &mut SqliteStore,
    console: &mut TerminalConsole,
    options: &RepairOptions,
) -> Result<()> {
    match checks::run_repair(store, console, options) {
        Ok(reports) => {
            for report in &reports {
                debug!("check {} finished: {:?}", report.name, report.outcome);
            }
            Ok(())
        }
        Err(CheckError::UnexpectedUpdateResult {
            storage_id,
            new_identifier,
            affected,
        }) => {
            // The store violated the exactly-one-row contract; whatever
            // caused it (concurrent writer, duplicate storage ids) is not
            // something this tool can reason past. Stop the whole process.
            console.output_line("Error: the identifier update returned an unexpected result!");
            console.output_line(&format!(
                "Update: set identifier of node {storage_id} to {new_identifier}"
            ));
            console.output_line(&format!("Result: {affected} row(s) affected"));
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

fn list_checks(console: &mut TerminalConsole) {
    for check in CHECKS {
        let tag = if check.cleanup { " [cleanup]" } else { "" };
        console.output_line(&format!("{}{tag}", check.name));
        console.output_line(&format!("  {}", check.short_description));
        console.output_line("");
        for line in check.long_description.lines() {
            console.output_line(&format!("  {line}"));
        }
        console.output_line("");
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
