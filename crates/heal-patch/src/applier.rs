//! Transactional patch application
//!
//! Operations run strictly in order. The first failure stops the plan and
//! every earlier operation is undone in reverse order by writing back the
//! exact content captured when that operation read its file.

use crate::error::PatchError;
use crate::resolver::{ResolvedTarget, TargetFileResolver};
use heal_fs::{write_atomic, FileSystem};
use heal_model::{ApplyResult, PatchOperation, PatchOperationResult, PatchPlan, PREVIEW_PREFIX};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Content a completed operation replaced
#[derive(Debug)]
struct Undo {
    resolved_path: String,
    absolute: PathBuf,
    original: String,
}

/// Outcome of one successful operation
#[derive(Debug)]
struct Step {
    target: ResolvedTarget,
    original: String,
    updated: String,
    verb: &'static str,
}

/// Executes approved patch plans against the repository
#[derive(Debug, Clone)]
pub struct PatchApplier {
    fs: Arc<dyn FileSystem>,
    resolver: TargetFileResolver,
}

impl PatchApplier {
    /// Create applier rooted at `repo_root`
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            resolver: TargetFileResolver::new(Arc::clone(&fs), repo_root),
            fs,
        }
    }

    /// With tests directory used by the resolver
    #[inline]
    #[must_use]
    pub fn with_tests_dir(mut self, tests_dir: impl Into<String>) -> Self {
        self.resolver = self.resolver.with_tests_dir(tests_dir);
        self
    }

    /// Resolver used for every operation
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &TargetFileResolver {
        &self.resolver
    }

    /// Apply `plan` as one all-or-nothing transaction
    ///
    /// # Arguments
    /// * `plan` - Operations to run, in order
    /// * `preview` - Validate and report without writing anything
    ///
    /// # Returns
    /// One result per attempted operation. `rollback_results` is present only
    /// when a failure forced earlier writes to be undone. Failures never
    /// surface as `Err`.
    pub async fn apply_patch_plan(&self, plan: &PatchPlan, preview: bool) -> ApplyResult {
        tracing::info!(
            operations = plan.operations.len(),
            preview,
            "applying patch plan: {}",
            plan.description
        );

        let mut results = Vec::with_capacity(plan.operations.len());
        let mut undo_log: Vec<Undo> = Vec::new();
        let mut overlay: HashMap<PathBuf, String> = HashMap::new();

        for (index, operation) in plan.operations.iter().enumerate() {
            let step = match self.execute(operation, preview, &overlay).await {
                Ok(step) => step,
                Err((path, err)) => {
                    tracing::warn!(
                        index,
                        kind = operation.kind(),
                        path = %path,
                        error = %err,
                        "patch operation failed"
                    );
                    results.push(PatchOperationResult::failed(path, err.to_string()));
                    let rollback_results = if undo_log.is_empty() {
                        None
                    } else {
                        Some(self.rollback(undo_log).await)
                    };
                    return ApplyResult {
                        success: false,
                        results,
                        rollback_results,
                    };
                }
            };

            let path = step.target.resolved_path.clone();
            let message = if preview {
                format!("{PREVIEW_PREFIX} Would {} {path}", step.verb)
            } else {
                format!("{} {path}", capitalized(step.verb))
            };
            tracing::debug!(index, kind = operation.kind(), path = %path, "patch operation ok");
            results.push(PatchOperationResult::ok(path, message));

            if preview {
                overlay.insert(step.target.absolute, step.updated);
            } else {
                undo_log.push(Undo {
                    resolved_path: step.target.resolved_path,
                    absolute: step.target.absolute,
                    original: step.original,
                });
            }
        }

        ApplyResult {
            success: true,
            results,
            rollback_results: None,
        }
    }

    /// Validate and run one operation
    ///
    /// On failure returns the path to report (resolved if resolution
    /// succeeded, else as given) with the error.
    async fn execute(
        &self,
        operation: &PatchOperation,
        preview: bool,
        overlay: &HashMap<PathBuf, String>,
    ) -> Result<Step, (String, PatchError)> {
        let logical = operation.file_path();
        let target = self
            .resolver
            .resolve(logical)
            .await
            .map_err(|e| (logical.to_string(), PatchError::from(e)))?;
        let path = target.resolved_path.clone();

        let original = match overlay.get(&target.absolute) {
            Some(content) => content.clone(),
            None => self
                .fs
                .read_to_string(&target.absolute)
                .await
                .map_err(|e| (path.clone(), PatchError::read(&path, e)))?,
        };

        let (updated, verb) = edit(operation, &original, &path).map_err(|e| (path.clone(), e))?;

        if !preview {
            write_atomic(self.fs.as_ref(), &target.absolute, &updated)
                .await
                .map_err(|e| (path.clone(), PatchError::write(&path, e)))?;
        }

        Ok(Step {
            target,
            original,
            updated,
            verb,
        })
    }

    /// Undo completed operations, newest first
    async fn rollback(&self, undo_log: Vec<Undo>) -> Vec<PatchOperationResult> {
        tracing::warn!(operations = undo_log.len(), "rolling back patch plan");

        let mut results = Vec::with_capacity(undo_log.len());
        for undo in undo_log.into_iter().rev() {
            match write_atomic(self.fs.as_ref(), &undo.absolute, &undo.original).await {
                Ok(()) => results.push(PatchOperationResult::ok(
                    undo.resolved_path,
                    "Restored original content",
                )),
                Err(err) => {
                    tracing::error!(path = %undo.resolved_path, error = %err, "rollback failed");
                    results.push(PatchOperationResult::failed(
                        undo.resolved_path,
                        format!("Rollback failed: {err}"),
                    ));
                }
            }
        }
        results
    }
}

/// Apply one operation to `content`
fn edit(
    operation: &PatchOperation,
    content: &str,
    path: &str,
) -> Result<(String, &'static str), PatchError> {
    match operation {
        PatchOperation::ReplaceText {
            search, replace, ..
        } => {
            if search.is_empty() {
                return Err(PatchError::EmptyPattern {
                    what: "search text",
                    path: path.to_string(),
                });
            }
            if !content.contains(search.as_str()) {
                return Err(PatchError::SearchNotFound {
                    path: path.to_string(),
                });
            }
            Ok((content.replacen(search.as_str(), replace, 1), "replace text in"))
        }

        PatchOperation::InsertAfter { anchor, insert, .. } => {
            if anchor.is_empty() {
                return Err(PatchError::EmptyPattern {
                    what: "anchor",
                    path: path.to_string(),
                });
            }
            let mut positions = content.match_indices(anchor.as_str()).map(|(i, _)| i);
            let Some(first) = positions.next() else {
                return Err(PatchError::AnchorNotFound {
                    path: path.to_string(),
                });
            };
            let extra = positions.count();
            if extra > 0 {
                return Err(PatchError::AnchorAmbiguous {
                    path: path.to_string(),
                    count: extra + 1,
                });
            }
            let at = first + anchor.len();
            let mut updated = String::with_capacity(content.len() + insert.len());
            updated.push_str(&content[..at]);
            updated.push_str(insert);
            updated.push_str(&content[at..]);
            Ok((updated, "insert text in"))
        }
    }
}

fn capitalized(verb: &str) -> String {
    let mut chars = verb.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
