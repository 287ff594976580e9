//! `heal`: diagnose a failing e2e test and apply approved fixes

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use heal_core::prelude::*;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heal", version, about = "Self-healing diagnosis and patch apply for e2e tests")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Repository root (overrides the configuration)
    #[arg(long, global = true, value_name = "PATH")]
    repo_root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a failure and emit a proposal set
    Diagnose {
        /// FailureContext JSON
        #[arg(long, value_name = "PATH")]
        failure: PathBuf,
        /// EvidencePacket JSON
        #[arg(long, value_name = "PATH")]
        evidence: PathBuf,
        /// Write the proposal set here instead of stdout
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Apply the selected items of a proposal set
    Apply {
        /// ProposalSet JSON
        #[arg(long, value_name = "PATH")]
        proposal: PathBuf,
        /// SelectionManifest JSON
        #[arg(long, value_name = "PATH")]
        selection: PathBuf,
        /// EvidencePacket JSON, for the work item context in the report
        #[arg(long, value_name = "PATH")]
        evidence: Option<PathBuf>,
        /// Validate and report without writing
        #[arg(long)]
        preview: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HealConfig::load(path)?,
        None => HealConfig::default(),
    };
    if let Some(root) = cli.repo_root {
        config = config.with_repo_root(root);
    }
    let core = HealCore::local(config);

    match cli.command {
        Commands::Diagnose {
            failure,
            evidence,
            out,
        } => {
            let failure: FailureContext = read_json(&failure).await?;
            let evidence: EvidencePacket = read_json(&evidence).await?;
            let proposals = core.diagnose(&failure, &evidence).await?;
            let json = serde_json::to_string_pretty(&proposals)?;

            match out {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("{}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Apply {
            proposal,
            selection,
            evidence,
            preview,
        } => {
            let proposals: ProposalSet = read_json(&proposal).await?;
            let manifest: SelectionManifest = read_json(&selection).await?;
            let ado = match evidence {
                Some(path) => read_json::<EvidencePacket>(&path).await?.ado_context,
                None => None,
            };

            let outcome = core
                .apply_selection(&proposals, &manifest, preview, ado.as_ref())
                .await?;
            print_summary(&outcome.summary);
            if let Some(path) = &outcome.report_path {
                println!("report: {}", path.display());
            }
            if outcome.summary.total_failed > 0 {
                bail!("{} selected item(s) failed to apply", outcome.summary.total_failed);
            }
        }
    }

    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_summary(summary: &ApplySummary) {
    let mode = if summary.preview { "preview" } else { "apply" };
    println!("{mode} {}:", summary.proposal_set_id);
    for result in &summary.results {
        let status = serde_json::to_value(result.status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        match &result.reason {
            Some(reason) => println!("  {:<12} {status:<8} {reason}", result.item_id),
            None => println!("  {:<12} {status}", result.item_id),
        }
    }
    println!(
        "  selected {} / applied {} / failed {} / skipped {}",
        summary.total_selected, summary.total_applied, summary.total_failed, summary.total_skipped
    );
}
