// wcf-core/src/infrastructure/parser.rs

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::domain::runbook::Runbook;
use crate::error::WcfError;
use crate::infrastructure::error::InfrastructureError;

/// Reads a runbook document from disk and constructs the typed model,
/// collecting all structural validation violations in one pass rather than
/// stopping at the first.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn parse_runbook_file(path: &Path) -> Result<Runbook, WcfError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        WcfError::Infrastructure(InfrastructureError::RunbookLoadError(format!(
            "could not read runbook at {}: {e}",
            path.display()
        )))
    })?;
    let runbook = parse_runbook_str(&content)?;
    debug!(artifacts = runbook.artifacts.len(), "parsed runbook");
    Ok(runbook)
}

/// Parses a runbook document already loaded into memory (used by the flattener,
/// which resolves child-runbook paths itself before reading them).
pub fn parse_runbook_str(content: &str) -> Result<Runbook, WcfError> {
    let raw: Runbook = serde_yaml::from_str(content)
        .map_err(|e| WcfError::Infrastructure(InfrastructureError::YamlError(e)))?;
    Ok(raw.finalize()?)
}

/// The directory a relative `child_runbook.path` is resolved against: the
/// parent runbook file's own containing directory.
pub fn parent_directory_of(runbook_path: &Path) -> PathBuf {
    runbook_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_runbook() {
        let yaml = r#"
name: demo
description: a demo runbook
artifacts:
  src:
    source: { type: fs }
    output: true
"#;
        let runbook = parse_runbook_str(yaml).unwrap();
        assert_eq!(runbook.name, "demo");
        assert_eq!(runbook.artifacts["src"].id, "src");
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = parse_runbook_str("not: [valid, yaml: structure").unwrap_err();
        assert!(matches!(err, WcfError::Infrastructure(InfrastructureError::YamlError(_))));
    }

    #[test]
    fn rejects_artifact_with_conflicting_variants() {
        let yaml = r#"
name: demo
description: a demo runbook
artifacts:
  bad:
    source: { type: fs }
    process: { type: noop }
"#;
        let err = parse_runbook_str(yaml).unwrap_err();
        assert!(matches!(err, WcfError::Domain(crate::domain::error::DomainError::RunbookValidationError(_))));
    }

    #[test]
    fn parent_directory_defaults_to_dot_for_bare_filename() {
        assert_eq!(parent_directory_of(Path::new("runbook.yaml")), PathBuf::from("."));
    }
}
