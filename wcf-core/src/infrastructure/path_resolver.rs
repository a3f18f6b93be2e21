// wcf-core/src/infrastructure/path_resolver.rs

use std::path::{Path, PathBuf};

use crate::infrastructure::error::InfrastructureError;

/// Resolves a `child_runbook.path` reference against, in order: the parent
/// runbook's own directory, then each `config.template_paths` entry (relative to
/// the current working directory). An absolute path is used as-is and only
/// checked for existence.
pub fn resolve_child_path(
    child_path: &str,
    parent_dir: &Path,
    template_paths: &[String],
) -> Result<PathBuf, InfrastructureError> {
    let candidate = Path::new(child_path);
    if candidate.is_absolute() {
        return if candidate.exists() {
            Ok(candidate.to_path_buf())
        } else {
            Err(InfrastructureError::RunbookLoadError(format!(
                "child runbook not found at absolute path '{}'",
                candidate.display()
            )))
        };
    }

    let mut tried = Vec::new();
    let in_parent_dir = parent_dir.join(candidate);
    tried.push(in_parent_dir.clone());
    if in_parent_dir.exists() {
        return Ok(in_parent_dir);
    }

    for root in template_paths {
        let candidate_in_root = Path::new(root).join(candidate);
        tried.push(candidate_in_root.clone());
        if candidate_in_root.exists() {
            return Ok(candidate_in_root);
        }
    }

    Err(InfrastructureError::RunbookLoadError(format!(
        "child runbook '{child_path}' not found; tried: {}",
        tried.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )))
}
