// wcf/src/commands/validate.rs

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use wcf_core::application::{ChildRunbookFlattener, Planner};
use wcf_core::domain::registry::ComponentRegistry;
use wcf_core::domain::runbook::{Runbook, RunbookConfig, RunbookOutput};
use wcf_core::infrastructure::parser::parse_runbook_file;

/// Parses, flattens, and plans `path` without executing it. Returns the exit
/// code (0 valid, 1 invalid); validation failures are reported to the caller as
/// an `Err` carrying the human-readable cause.
pub fn execute(path: &Path, registry: &ComponentRegistry) -> Result<i32> {
    let parsed = parse_runbook_file(path).context("parsing runbook")?;
    let name = parsed.name.clone();
    let description = parsed.description.clone();
    let contact = parsed.contact.clone();
    let inputs = parsed.inputs.clone();
    let declared_outputs = parsed.outputs.clone();

    let (flat_artifacts, aliases) = match ChildRunbookFlattener::new(registry).flatten(parsed, Some(path)) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("runbook invalid: {e}");
            return Ok(1);
        }
    };

    let resolved_outputs: HashMap<String, RunbookOutput> = declared_outputs
        .into_iter()
        .map(|(alias, out)| {
            let artifact = aliases.get(&out.artifact).cloned().unwrap_or(out.artifact);
            (alias, RunbookOutput { artifact })
        })
        .collect();

    let flattened = match (Runbook {
        name,
        description,
        contact,
        inputs,
        outputs: resolved_outputs,
        artifacts: flat_artifacts,
        config: RunbookConfig::default(),
    })
    .finalize()
    {
        Ok(rb) => rb,
        Err(e) => {
            eprintln!("runbook invalid: {e}");
            return Ok(1);
        }
    };

    match Planner::new(registry).plan(flattened) {
        Ok(_) => {
            println!("runbook valid: {}", path.display());
            Ok(0)
        }
        Err(e) => {
            eprintln!("runbook invalid: {e}");
            Ok(1)
        }
    }
}
