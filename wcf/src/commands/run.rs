// wcf/src/commands/run.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use wcf_core::application::{CancellationToken, ChildRunbookFlattener, CoreExport, Executor, Planner};
use wcf_core::domain::registry::ComponentRegistry;
use wcf_core::domain::runbook::{Runbook, RunbookConfig, RunbookOutput};
use wcf_core::infrastructure::fs::atomic_write;
use wcf_core::infrastructure::parser::parse_runbook_file;
use wcf_core::infrastructure::WcfConfig;
use wcf_core::ports::service::ServiceContainer;

pub async fn execute(
    runbook_path: &Path,
    output_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    exporter: Option<String>,
    registry: &ComponentRegistry,
) -> Result<i32> {
    let config = WcfConfig::load(&std::env::current_dir()?).context("loading wcf.yaml")?;
    let format = exporter.unwrap_or(config.default_exporter.clone());

    let parsed = parse_runbook_file(runbook_path).context("parsing runbook")?;
    let name = parsed.name.clone();
    let description = parsed.description.clone();
    let contact = parsed.contact.clone();
    let inputs = parsed.inputs.clone();
    let declared_outputs = parsed.outputs.clone();

    let (flat_artifacts, aliases) = ChildRunbookFlattener::new(registry)
        .flatten(parsed, Some(runbook_path))
        .context("flattening child runbooks")?;

    let resolved_outputs: HashMap<String, RunbookOutput> = declared_outputs
        .into_iter()
        .map(|(alias, out)| {
            let artifact = aliases.get(&out.artifact).cloned().unwrap_or(out.artifact);
            (alias, RunbookOutput { artifact })
        })
        .collect();

    let flattened = Runbook {
        name,
        description,
        contact,
        inputs,
        outputs: resolved_outputs,
        artifacts: flat_artifacts,
        config: RunbookConfig::default(),
    }
    .finalize()
    .context("validating flattened runbook")?;

    let plan = Planner::new(registry).plan(flattened).context("planning runbook")?;

    let services = ServiceContainer::new();
    let mut executor = Executor::new(registry, &services);
    if let Some(worker_pool_size) = config.worker_pool_size {
        executor = executor.with_concurrency(worker_pool_size);
    }
    let result = executor.execute(&plan, CancellationToken::new()).await.context("executing runbook")?;

    let export = CoreExport::build(&result, &plan).context("building export")?;

    let serialised = match format.as_str() {
        "yaml" => serde_yaml::to_string(&export).context("serialising export as yaml")?,
        _ => serde_json::to_string_pretty(&export).context("serialising export as json")?,
    };

    let destination = output.or_else(|| {
        output_dir.map(|dir| {
            let extension = if format == "yaml" { "yaml" } else { "json" };
            dir.join(format!("{}.{extension}", export.run.id))
        })
    });

    match destination {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            atomic_write(&path, serialised).with_context(|| format!("writing export to {}", path.display()))?;
            info!(path = %path.display(), "wrote export");
        }
        None => println!("{serialised}"),
    }

    Ok(match export.run.status {
        wcf_core::domain::RunStatus::Completed | wcf_core::domain::RunStatus::Partial => 0,
        wcf_core::domain::RunStatus::Failed => 1,
    })
}
