// wcf/src/main.rs

mod cli;
mod commands;
mod logging;
mod registration;

use clap::Parser;
use cli::{Cli, Command};
use wcf_core::domain::registry::ComponentRegistry;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_level.as_deref());

    let mut registry = ComponentRegistry::new();
    registration::register_all(&mut registry);

    let exit_code = match cli.command {
        Command::Run { runbook_path, output_dir, output, exporter } => {
            match commands::run::execute(&runbook_path, output_dir, output, exporter, &registry).await {
                Ok(code) => code,
                Err(e) => {
                    report_failure(&e, cli.verbose);
                    1
                }
            }
        }
        Command::ValidateRunbook { path } => match commands::validate::execute(&path, &registry) {
            Ok(code) => code,
            Err(e) => {
                report_failure(&e, cli.verbose);
                1
            }
        },
        Command::LsConnectors => {
            commands::ls::connectors(&registry);
            0
        }
        Command::LsProcessors => {
            commands::ls::processors(&registry);
            0
        }
        Command::LsExporters => {
            commands::ls::exporters(&registry);
            0
        }
        Command::LsRulesets => {
            commands::ls::rulesets(&registry);
            0
        }
    };

    std::process::exit(exit_code);
}

fn report_failure(error: &anyhow::Error, verbose: u8) {
    eprintln!("error: {error}");
    if verbose > 0 {
        eprintln!("{error:?}");
    }
}
