// wcf/src/cli.rs

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wcf", about = "Waivern Compliance Framework orchestration CLI", version)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). Overridden by `--log-level` and `WCF_LOG`.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Explicit tracing-style filter directive (e.g. "wcf_core=debug").
    #[arg(long, global = true, env = "WCF_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Runs a runbook end to end: parse, flatten, plan, execute, export.
    Run {
        runbook_path: PathBuf,
        /// Directory the export document is written into (default: cwd or config).
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Explicit output file path; overrides `--output-dir`.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output serialisation: "json" or "yaml".
        #[arg(long)]
        exporter: Option<String>,
    },
    /// Parses, flattens, and plans a runbook without executing it.
    ValidateRunbook { path: PathBuf },
    /// Lists registered connector component types.
    LsConnectors,
    /// Lists registered processor component types.
    LsProcessors,
    /// Lists registered exporter component types.
    LsExporters,
    /// Lists registered ruleset names.
    LsRulesets,
}
