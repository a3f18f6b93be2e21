// wcf-core/src/domain/schema/registry.rs

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};

use serde_json::Value;
use tracing::{debug, trace};

use crate::domain::error::DomainError;
use crate::domain::schema::schema::Schema;

const DEFAULT_SEARCH_PATH: &str = "schemas";

type CacheKey = (PathBuf, String, String);

struct RegistryState {
    search_paths: Vec<PathBuf>,
    cache: HashMap<CacheKey, Arc<Value>>,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from(DEFAULT_SEARCH_PATH)],
            cache: HashMap::new(),
        }
    }
}

fn state() -> &'static RwLock<RegistryState> {
    static STATE: OnceLock<RwLock<RegistryState>> = OnceLock::new();
    STATE.get_or_init(|| RwLock::new(RegistryState::default()))
}

/// Process-wide registry resolving `(name, version)` schema handles to JSON-Schema
/// documents. Search roots are added explicitly by each component's
/// `register_schemas()` hook at startup (see `domain::registry::ComponentRegistry`);
/// there are no import-time side effects.
pub struct SchemaRegistry;

impl SchemaRegistry {
    /// Adds a search root. Idempotent — a duplicate path is a no-op and insertion
    /// order of the remaining paths is preserved.
    pub fn register_search_path(path: impl Into<PathBuf>) {
        let path = path.into();
        let mut st = state().write().expect("schema registry lock poisoned");
        if !st.search_paths.contains(&path) {
            debug!(?path, "registering schema search path");
            st.search_paths.push(path);
        }
    }

    /// Returns a defensive copy of the current search roots, in insertion order.
    pub fn get_search_paths() -> Vec<PathBuf> {
        state()
            .read()
            .expect("schema registry lock poisoned")
            .search_paths
            .clone()
    }

    /// Resets the registry to just the built-in default search path and clears
    /// the load cache. Used by tests.
    pub fn clear_and_reinit() {
        let mut st = state().write().expect("schema registry lock poisoned");
        *st = RegistryState::default();
    }

    /// Resolves `schema` to its backing JSON-Schema document, walking search roots
    /// in order and returning the first match. Successful loads are cached per
    /// `(root, name, version)`.
    pub fn load_document(schema: &Schema) -> Result<Arc<Value>, DomainError> {
        let roots = Self::get_search_paths();

        {
            let st = state().read().expect("schema registry lock poisoned");
            for root in &roots {
                let key = (root.clone(), schema.name.clone(), schema.version.clone());
                if let Some(doc) = st.cache.get(&key) {
                    trace!(%schema, ?root, "schema cache hit");
                    return Ok(doc.clone());
                }
            }
        }

        for root in &roots {
            let candidate = root.join(&schema.name).join(format!("{}.json", schema.version));
            if !candidate.exists() {
                continue;
            }

            let content = std::fs::read_to_string(&candidate).map_err(|e| {
                DomainError::SchemaLoadError(format!(
                    "could not read schema document at {}: {e}",
                    candidate.display()
                ))
            })?;
            let document: Value = serde_json::from_str(&content).map_err(|e| {
                DomainError::SchemaLoadError(format!(
                    "invalid JSON in schema document at {}: {e}",
                    candidate.display()
                ))
            })?;

            let declared_version = document.get("version").and_then(Value::as_str);
            match declared_version {
                Some(v) if v == schema.version => {}
                Some(v) => {
                    return Err(DomainError::SchemaLoadError(format!(
                        "schema '{}' at {} declares version '{v}' but '{}' was requested",
                        schema.name,
                        candidate.display(),
                        schema.version
                    )));
                }
                None => {
                    return Err(DomainError::SchemaLoadError(format!(
                        "schema document at {} has no declared 'version' field",
                        candidate.display()
                    )));
                }
            }

            debug!(%schema, root = %root.display(), "loaded schema document");
            let arc = Arc::new(document);
            let mut st = state().write().expect("schema registry lock poisoned");
            st.cache.insert(
                (root.clone(), schema.name.clone(), schema.version.clone()),
                arc.clone(),
            );
            return Ok(arc);
        }

        Err(DomainError::SchemaNotFoundError(schema.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The registry is process-wide global state; serialise tests that touch it.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn write_schema(dir: &std::path::Path, name: &str, version: &str, body: &Value) {
        let folder = dir.join(name);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(
            folder.join(format!("{version}.json")),
            serde_json::to_string(body).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn register_search_path_is_idempotent_and_ordered() {
        let _guard = TEST_LOCK.lock().unwrap();
        SchemaRegistry::clear_and_reinit();

        SchemaRegistry::register_search_path("/a");
        SchemaRegistry::register_search_path("/b");
        SchemaRegistry::register_search_path("/a");

        let paths = SchemaRegistry::get_search_paths();
        assert_eq!(
            paths,
            vec![
                PathBuf::from(DEFAULT_SEARCH_PATH),
                PathBuf::from("/a"),
                PathBuf::from("/b")
            ]
        );
        SchemaRegistry::clear_and_reinit();
    }

    #[test]
    fn loads_matching_schema_and_caches() {
        let _guard = TEST_LOCK.lock().unwrap();
        SchemaRegistry::clear_and_reinit();
        let dir = tempfile::tempdir().unwrap();
        write_schema(
            dir.path(),
            "standard_input",
            "1.0.0",
            &serde_json::json!({"version": "1.0.0", "type": "object"}),
        );
        SchemaRegistry::register_search_path(dir.path());

        let schema = Schema::new("standard_input", "1.0.0");
        let doc = SchemaRegistry::load_document(&schema).expect("loads");
        assert_eq!(doc.get("type").unwrap(), "object");

        // Second load should hit the cache and return the same content.
        let doc2 = SchemaRegistry::load_document(&schema).expect("loads from cache");
        assert_eq!(doc, doc2);
        SchemaRegistry::clear_and_reinit();
    }

    #[test]
    fn version_mismatch_fails() {
        let _guard = TEST_LOCK.lock().unwrap();
        SchemaRegistry::clear_and_reinit();
        let dir = tempfile::tempdir().unwrap();
        write_schema(
            dir.path(),
            "standard_input",
            "1.0.0",
            &serde_json::json!({"version": "9.9.9", "type": "object"}),
        );
        SchemaRegistry::register_search_path(dir.path());

        let schema = Schema::new("standard_input", "1.0.0");
        let err = SchemaRegistry::load_document(&schema).unwrap_err();
        assert!(matches!(err, DomainError::SchemaLoadError(_)));
        SchemaRegistry::clear_and_reinit();
    }

    #[test]
    fn missing_schema_reports_not_found() {
        let _guard = TEST_LOCK.lock().unwrap();
        SchemaRegistry::clear_and_reinit();
        let schema = Schema::new("does_not_exist", "1.0.0");
        let err = SchemaRegistry::load_document(&schema).unwrap_err();
        assert!(matches!(err, DomainError::SchemaNotFoundError(_)));
        SchemaRegistry::clear_and_reinit();
    }

    #[test]
    fn first_matching_root_wins() {
        let _guard = TEST_LOCK.lock().unwrap();
        SchemaRegistry::clear_and_reinit();
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_schema(
            first.path(),
            "a",
            "1.0.0",
            &serde_json::json!({"version": "1.0.0", "marker": "first"}),
        );
        write_schema(
            second.path(),
            "a",
            "1.0.0",
            &serde_json::json!({"version": "1.0.0", "marker": "second"}),
        );
        SchemaRegistry::register_search_path(first.path());
        SchemaRegistry::register_search_path(second.path());

        let doc = SchemaRegistry::load_document(&Schema::new("a", "1.0.0")).unwrap();
        assert_eq!(doc.get("marker").unwrap(), "first");
        SchemaRegistry::clear_and_reinit();
    }
}
