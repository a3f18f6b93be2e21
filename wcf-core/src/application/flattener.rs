// wcf-core/src/application/flattener.rs

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::domain::error::DomainError;
use crate::domain::registry::ComponentRegistry;
use crate::domain::runbook::{Artifact, InputRef, Runbook};
use crate::domain::schema::Schema;
use crate::infrastructure::parser::{parent_directory_of, parse_runbook_file};
use crate::infrastructure::path_resolver::resolve_child_path;

type QueueItem = (
    String,
    Artifact,
    Option<PathBuf>,
    HashSet<PathBuf>,
    HashMap<String, String>,
);

/// Expands `child_runbook` directives into a single flat artifact namespace.
/// Plan-time only; never invoked during execution. Iterative and queue-based —
/// recursion is avoided so nesting depth is not bounded by stack size.
pub struct ChildRunbookFlattener<'a> {
    registry: &'a ComponentRegistry,
    queue: VecDeque<QueueItem>,
    flattened: HashMap<String, Artifact>,
    aliases: HashMap<String, String>,
    root_artifacts: HashMap<String, Artifact>,
    template_paths: Vec<String>,
    namespace_counter: u64,
}

impl<'a> ChildRunbookFlattener<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self {
            registry,
            queue: VecDeque::new(),
            flattened: HashMap::new(),
            aliases: HashMap::new(),
            root_artifacts: HashMap::new(),
            template_paths: Vec::new(),
            namespace_counter: 0,
        }
    }

    /// Flattens `runbook` (whose file lives at `runbook_path`, needed to resolve
    /// relative child paths) into `(flat_artifacts, alias_map)`.
    #[instrument(skip_all, fields(runbook = %runbook.name))]
    pub fn flatten(
        mut self,
        runbook: Runbook,
        runbook_path: Option<&Path>,
    ) -> Result<(HashMap<String, Artifact>, HashMap<String, String>), DomainError> {
        self.root_artifacts = runbook.artifacts.clone();
        self.template_paths = runbook.config.template_paths.clone();

        let mut initial_ancestors = HashSet::new();
        if let Some(path) = runbook_path {
            initial_ancestors.insert(canonicalize_lenient(path));
        }

        // Seeded in sorted-by-id order, not `HashMap` iteration order: the
        // collision guard in `expand_child_runbook` reasons about "has this
        // sibling been emitted yet", and an unordered seed would make that
        // answer (and therefore error vs. success) vary run to run for the
        // exact same runbook.
        let mut root_artifact_ids: Vec<String> = runbook.artifacts.keys().cloned().collect();
        root_artifact_ids.sort();
        let mut pending_artifacts = runbook.artifacts;
        for artifact_id in root_artifact_ids {
            let definition = pending_artifacts.remove(&artifact_id).expect("id taken from this map's own keys");
            self.queue.push_back((
                artifact_id,
                definition,
                runbook_path.map(Path::to_path_buf),
                initial_ancestors.clone(),
                HashMap::new(),
            ));
        }

        while let Some((artifact_id, definition, parent_path, ancestors, context_remap)) =
            self.queue.pop_front()
        {
            if definition.child_runbook.is_none() {
                let resolved = self.resolve_aliases_in_definition(definition);
                self.flattened.insert(artifact_id, resolved);
            } else {
                self.expand_child_runbook(artifact_id, definition, parent_path, ancestors, context_remap)?;
            }
        }

        Ok((self.flattened, self.aliases))
    }

    fn expand_child_runbook(
        &mut self,
        artifact_id: String,
        definition: Artifact,
        parent_path: Option<PathBuf>,
        ancestors: HashSet<PathBuf>,
        context_remap: HashMap<String, String>,
    ) -> Result<(), DomainError> {
        let child_config = definition.child_runbook.as_ref().expect("checked by caller");

        let parent_path = parent_path.ok_or_else(|| {
            DomainError::RunbookValidationError(format!(
                "artifact '{artifact_id}': cannot resolve child runbook path '{}' without a parent runbook path",
                child_config.path
            ))
        })?;
        let parent_dir = parent_directory_of(&parent_path);

        let child_path = resolve_child_path(&child_config.path, &parent_dir, &self.template_paths)
            .map_err(|e| DomainError::RunbookValidationError(e.to_string()))?;

        let resolved_child = canonicalize_lenient(&child_path);
        if ancestors.contains(&resolved_child) {
            return Err(DomainError::CircularRunbookError(format!(
                "artifact '{artifact_id}' forms a cycle through '{}'",
                child_path.display()
            )));
        }

        let child_runbook = parse_runbook_file(&child_path).map_err(|e| {
            DomainError::RunbookValidationError(format!(
                "failed to parse child runbook '{}': {e}",
                child_path.display()
            ))
        })?;

        let resolved_input_mapping = self.resolve_input_mapping(&child_config.input_mapping, &context_remap);

        self.validate_input_mapping(&artifact_id, &resolved_input_mapping, &child_runbook)?;

        let output_names = self.get_output_names(&artifact_id, child_config, &child_runbook)?;

        let namespace = self.generate_namespace(&child_runbook.name);

        let mut child_ancestors = ancestors;
        child_ancestors.insert(resolved_child);

        self.queue_child_artifacts(&child_runbook, &namespace, &resolved_input_mapping, &child_path, &child_ancestors);

        for (output_name, parent_alias) in &output_names {
            let child_artifact = &child_runbook.outputs[output_name].artifact;
            let namespaced = namespaced_id(&namespace, child_artifact);

            // A sibling id "already present in flat_artifacts" can't be answered
            // by `self.flattened` alone — whether a given sibling has been
            // dequeued into it yet depends on processing order, not on the
            // runbook's content. A plain (non-`child_runbook`) sibling's future
            // key is known up front, though: it's just its own declared id. So
            // check that fixed, order-independent snapshot (`root_artifacts`)
            // in addition to what has concretely landed in `flattened` so far.
            // The directive's own artifact id is excluded: single-output
            // shorthand aliases to `parent_artifact_id` itself, which is not a
            // collision.
            let collides_with_concrete_sibling = parent_alias != &artifact_id
                && (self.flattened.contains_key(parent_alias)
                    || self.root_artifacts.get(parent_alias).is_some_and(|a| !a.is_child_runbook()));
            if collides_with_concrete_sibling {
                return Err(DomainError::InvalidOutputMappingError(format!(
                    "output alias '{parent_alias}' collides with an existing sibling artifact id '{parent_alias}'"
                )));
            }

            if let Some(existing) = self.aliases.get(parent_alias) {
                if existing != &namespaced {
                    return Err(DomainError::InvalidOutputMappingError(format!(
                        "output alias '{parent_alias}' collides with an existing alias already mapped to '{existing}'"
                    )));
                }
            } else {
                self.aliases.insert(parent_alias.clone(), namespaced);
            }
        }

        Ok(())
    }

    fn resolve_input_mapping(
        &self,
        input_mapping: &HashMap<String, String>,
        context_remap: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        input_mapping
            .iter()
            .map(|(k, v)| {
                let via_context = context_remap.get(v).cloned().unwrap_or_else(|| v.clone());
                let via_alias = self.aliases.get(&via_context).cloned().unwrap_or(via_context);
                (k.clone(), via_alias)
            })
            .collect()
    }

    fn queue_child_artifacts(
        &mut self,
        child_runbook: &Runbook,
        namespace: &str,
        child_input_remapping: &HashMap<String, String>,
        child_path: &Path,
        child_ancestors: &HashSet<PathBuf>,
    ) {
        let child_artifact_ids: HashSet<&str> = child_runbook.artifacts.keys().map(String::as_str).collect();
        let declared_input_names: HashSet<&str> = child_runbook.inputs.keys().map(String::as_str).collect();

        let mut ordered_ids: Vec<&String> = child_runbook.artifacts.keys().collect();
        ordered_ids.sort();

        for child_artifact_id in ordered_ids {
            let child_def = &child_runbook.artifacts[child_artifact_id];
            let namespaced = namespaced_id(namespace, child_artifact_id);

            let remapped_inputs = child_def.inputs.as_ref().map(|inputs| {
                remap_child_inputs(inputs, child_input_remapping, namespace, &child_artifact_ids, &declared_input_names)
            });

            let mut new_def = child_def.clone();
            new_def.inputs = remapped_inputs;

            self.queue.push_back((
                namespaced,
                new_def,
                Some(child_path.to_path_buf()),
                child_ancestors.clone(),
                child_input_remapping.clone(),
            ));
        }
    }

    fn resolve_aliases_in_definition(&self, mut definition: Artifact) -> Artifact {
        let Some(inputs) = &definition.inputs else {
            return definition;
        };
        let remapped = match inputs {
            InputRef::One(id) => InputRef::One(self.aliases.get(id).cloned().unwrap_or_else(|| id.clone())),
            InputRef::Many(ids) => InputRef::Many(
                ids.iter().map(|id| self.aliases.get(id).cloned().unwrap_or_else(|| id.clone())).collect(),
            ),
        };
        definition.inputs = Some(remapped);
        definition
    }

    fn validate_input_mapping(
        &self,
        artifact_id: &str,
        input_mapping: &HashMap<String, String>,
        child_runbook: &Runbook,
    ) -> Result<(), DomainError> {
        for (input_name, input_decl) in &child_runbook.inputs {
            let Some(parent_artifact_id) = input_mapping.get(input_name) else {
                if !input_decl.optional {
                    return Err(DomainError::MissingInputMappingError(format!(
                        "artifact '{artifact_id}': child runbook requires input '{input_name}' but it is not mapped"
                    )));
                }
                continue;
            };

            let parent_def = self
                .flattened
                .get(parent_artifact_id)
                .or_else(|| self.root_artifacts.get(parent_artifact_id));

            let Some(parent_def) = parent_def else { continue };
            let Some(parent_schema) = self.resolve_output_schema(parent_def) else { continue };

            let child_schema = Schema::parse(&input_decl.input_schema).ok_or_else(|| {
                DomainError::RunbookValidationError(format!(
                    "child runbook input '{input_name}' has an invalid schema reference '{}'",
                    input_decl.input_schema
                ))
            })?;

            if parent_schema != child_schema {
                return Err(DomainError::SchemaCompatibilityError(format!(
                    "artifact '{artifact_id}': parent artifact '{parent_artifact_id}' produces schema '{parent_schema}', but child input '{input_name}' expects '{child_schema}'"
                )));
            }
        }
        Ok(())
    }

    fn resolve_output_schema(&self, definition: &Artifact) -> Option<Schema> {
        if let Some(schema_ref) = &definition.output_schema {
            return schema_ref.resolve().ok();
        }
        if let Some(source) = &definition.source {
            let factory = self.registry.connector_factory(&source.component_type).ok()?;
            return factory.get_output_schemas().into_iter().next();
        }
        if let Some(process) = &definition.process {
            let factory = self.registry.processor_factory(&process.component_type).ok()?;
            return factory.get_output_schemas().into_iter().next();
        }
        None
    }

    fn get_output_names(
        &self,
        parent_artifact_id: &str,
        child_config: &crate::domain::runbook::ChildRunbookConfig,
        child_runbook: &Runbook,
    ) -> Result<HashMap<String, String>, DomainError> {
        let names = child_config.output_names(parent_artifact_id);
        for output_name in names.keys() {
            if !child_runbook.outputs.contains_key(output_name) {
                return Err(DomainError::InvalidOutputMappingError(format!(
                    "output '{output_name}' not found in child runbook outputs"
                )));
            }
        }
        Ok(names)
    }

    fn generate_namespace(&mut self, child_name: &str) -> String {
        let n = self.namespace_counter;
        self.namespace_counter += 1;
        let slug: String = child_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        format!("{slug}_{n}")
    }
}

fn namespaced_id(namespace: &str, id: &str) -> String {
    format!("{namespace}__{id}")
}

fn remap_child_inputs(
    inputs: &InputRef,
    input_remapping: &HashMap<String, String>,
    namespace: &str,
    child_artifact_ids: &HashSet<&str>,
    declared_input_names: &HashSet<&str>,
) -> InputRef {
    let remap_single = |id: &str| -> String {
        if declared_input_names.contains(id) {
            return input_remapping.get(id).cloned().unwrap_or_else(|| id.to_string());
        }
        if child_artifact_ids.contains(id) {
            return namespaced_id(namespace, id);
        }
        id.to_string()
    };

    match inputs {
        InputRef::One(id) => InputRef::One(remap_single(id)),
        InputRef::Many(ids) => InputRef::Many(ids.iter().map(|id| remap_single(id)).collect()),
    }
}

fn canonicalize_lenient(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::runbook::{ChildRunbookConfig, ProcessConfig, RunbookInput, RunbookOutput, SourceConfig};
    use std::collections::HashMap;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn flattens_artifact_without_child_runbook_unchanged() {
        let registry = ComponentRegistry::new();
        let rb = Runbook {
            name: "parent".into(),
            description: "d".into(),
            contact: None,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            artifacts: HashMap::from([(
                "src".to_string(),
                Artifact {
                    id: "src".into(),
                    source: Some(SourceConfig { component_type: "fs".into(), config: HashMap::new() }),
                    process: None,
                    child_runbook: None,
                    inputs: None,
                    merge: None,
                    output_schema: None,
                    output: true,
                    optional: false,
                    execute: true,
                    name: None,
                    description: None,
                    contact: None,
                },
            )]),
            config: Default::default(),
        };
        let flattener = ChildRunbookFlattener::new(&registry);
        let (flat, aliases) = flattener.flatten(rb, None).unwrap();
        assert!(flat.contains_key("src"));
        assert!(aliases.is_empty());
    }

    #[test]
    fn expands_child_runbook_with_namespacing_and_alias() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "child.yaml",
            r#"
name: child
description: a child runbook
inputs:
  in0:
    input_schema: "A/1.0.0"
artifacts:
  c_ana:
    process: { type: noop }
    inputs: in0
    output_schema: "B/1.0.0"
outputs:
  result:
    artifact: c_ana
"#,
        );
        let parent_path = write(
            dir.path(),
            "parent.yaml",
            r#"
name: parent
description: a parent runbook
artifacts:
  parent_src:
    source: { type: fs }
    output_schema: "A/1.0.0"
  child_call:
    child_runbook:
      path: "./child.yaml"
      input_mapping:
        in0: parent_src
      output: result
"#,
        );

        let registry = ComponentRegistry::new();
        let runbook = parse_runbook_file_for_test(&parent_path);
        let flattener = ChildRunbookFlattener::new(&registry);
        let (flat, aliases) = flattener.flatten(runbook, Some(&parent_path)).unwrap();

        assert!(flat.contains_key("parent_src"));
        let namespaced_key = flat.keys().find(|k| k.ends_with("__c_ana")).expect("namespaced artifact present");
        assert_eq!(flat[namespaced_key].input_ids(), vec!["parent_src"]);
        assert_eq!(aliases.get("child_call"), Some(namespaced_key));
    }

    #[test]
    fn missing_required_child_input_mapping_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "child.yaml",
            r#"
name: child
description: a child runbook
inputs:
  in0:
    input_schema: "A/1.0.0"
artifacts:
  c_ana:
    process: { type: noop }
    inputs: in0
    output_schema: "B/1.0.0"
outputs:
  result:
    artifact: c_ana
"#,
        );
        let parent_path = write(
            dir.path(),
            "parent.yaml",
            r#"
name: parent
description: a parent runbook
artifacts:
  child_call:
    child_runbook:
      path: "./child.yaml"
      output: result
"#,
        );

        let registry = ComponentRegistry::new();
        let runbook = parse_runbook_file_for_test(&parent_path);
        let flattener = ChildRunbookFlattener::new(&registry);
        let err = flattener.flatten(runbook, Some(&parent_path)).unwrap_err();
        assert!(matches!(err, DomainError::MissingInputMappingError(_)));
    }

    #[test]
    fn circular_child_runbook_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a_path = dir.path().join("a.yaml");
        let b_path = dir.path().join("b.yaml");
        std::fs::write(
            &a_path,
            r#"
name: a
description: runbook a
artifacts:
  call_b:
    child_runbook:
      path: "./b.yaml"
      output: out
"#,
        )
        .unwrap();
        std::fs::write(
            &b_path,
            r#"
name: b
description: runbook b
artifacts:
  call_a:
    child_runbook:
      path: "./a.yaml"
      output: out
"#,
        )
        .unwrap();

        let registry = ComponentRegistry::new();
        let runbook = parse_runbook_file_for_test(&a_path);
        let flattener = ChildRunbookFlattener::new(&registry);
        let err = flattener.flatten(runbook, Some(&a_path)).unwrap_err();
        assert!(matches!(err, DomainError::CircularRunbookError(_)));
    }

    #[test]
    fn output_alias_colliding_with_sibling_artifact_id_fails_even_when_the_sibling_is_not_yet_flattened() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "child.yaml",
            r#"
name: child
description: a child runbook
artifacts:
  c_ana:
    source: { type: fs }
    output_schema: "B/1.0.0"
outputs:
  result:
    artifact: c_ana
"#,
        );
        // "aaa_child_call" sorts before "zzz_sibling", so it is always dequeued
        // (and its output alias recorded) before "zzz_sibling" ever lands in
        // `flattened`. The collision must still be caught.
        let parent_path = write(
            dir.path(),
            "parent.yaml",
            r#"
name: parent
description: a parent runbook
artifacts:
  aaa_child_call:
    child_runbook:
      path: "./child.yaml"
      output_mapping:
        zzz_sibling: result
  zzz_sibling:
    source: { type: fs }
    output_schema: "A/1.0.0"
"#,
        );

        let registry = ComponentRegistry::new();
        let runbook = parse_runbook_file_for_test(&parent_path);
        let flattener = ChildRunbookFlattener::new(&registry);
        let err = flattener.flatten(runbook, Some(&parent_path)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidOutputMappingError(_)));
    }

    fn parse_runbook_file_for_test(path: &Path) -> Runbook {
        crate::infrastructure::parser::parse_runbook_file(path).unwrap()
    }
}
