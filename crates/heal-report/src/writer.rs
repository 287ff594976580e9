//! Apply report writer

use crate::error::ReportError;
use chrono::{DateTime, Local, Utc};
use heal_fs::{write_atomic, FileSystem};
use heal_model::{AdoContext, ApplySummary, ProposalSet, SelectionManifest};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default reports directory, relative to the repository root
pub const DEFAULT_REPORTS_DIR: &str = ".heal/apply-reports";

/// Filename timestamp, local time
const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Upper bound on `-N` suffixes tried when a filename is taken
const MAX_COLLISION_SUFFIX: u32 = 100;

/// Persisted audit record of one apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Proposal set id, shared by all three parts
    pub proposal_id: String,
    /// When the report was written
    pub written_at: DateTime<Utc>,
    /// Full proposal set
    pub proposal_set: ProposalSet,
    /// Approved selection
    pub selection_manifest: SelectionManifest,
    /// Work item context, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ado_context: Option<AdoContext>,
    /// Apply outcome
    pub apply_summary: ApplySummary,
}

/// Inputs to [`ApplyReportWriter::write_apply_report`]
#[derive(Debug, Clone, Copy)]
pub struct ApplyReportInput<'a> {
    /// Proposal set the selection was drawn from
    pub proposal_set: &'a ProposalSet,
    /// Approved selection
    pub selection_manifest: &'a SelectionManifest,
    /// Apply outcome
    pub apply_summary: &'a ApplySummary,
    /// Optional work item context
    pub ado_context: Option<&'a AdoContext>,
}

impl ApplyReportInput<'_> {
    /// Check that all three structures name the same proposal set
    ///
    /// # Errors
    /// The first [`ReportError`] consistency variant that applies.
    pub fn validate(&self) -> Result<(), ReportError> {
        let expected = self.proposal_set.id.as_str();
        if expected.trim().is_empty() {
            return Err(ReportError::MissingProposalId);
        }
        if self.selection_manifest.proposal_id != expected {
            return Err(ReportError::ManifestMismatch {
                expected: expected.to_string(),
                found: self.selection_manifest.proposal_id.clone(),
            });
        }
        if self.apply_summary.proposal_set_id != expected {
            return Err(ReportError::SummaryMismatch {
                expected: expected.to_string(),
                found: self.apply_summary.proposal_set_id.clone(),
            });
        }
        Ok(())
    }
}

/// Writes one immutable JSON report per apply
#[derive(Debug, Clone)]
pub struct ApplyReportWriter {
    fs: Arc<dyn FileSystem>,
    reports_dir: PathBuf,
}

impl ApplyReportWriter {
    /// Create writer for `reports_dir`
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            reports_dir: reports_dir.into(),
        }
    }

    /// Reports directory
    #[inline]
    #[must_use]
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// `<reports_dir>/YYYYMMDD-HHmmss-<proposalId>.json`, local time
    ///
    /// `date` defaults to now. Characters outside `[A-Za-z0-9._-]` in the
    /// id are replaced with `_`.
    #[must_use]
    pub fn report_path(&self, proposal_id: &str, date: Option<DateTime<Local>>) -> PathBuf {
        let date = date.unwrap_or_else(Local::now);
        self.reports_dir.join(format!(
            "{}-{}.json",
            date.format(STAMP_FORMAT),
            sanitize_id(proposal_id)
        ))
    }

    /// Validate, serialize and atomically write a report
    ///
    /// # Returns
    /// Path of the written report.
    ///
    /// # Errors
    /// - Consistency errors, before any file I/O
    /// - `ReportError::Io` if the directory or file cannot be written
    pub async fn write_apply_report(
        &self,
        input: ApplyReportInput<'_>,
    ) -> Result<PathBuf, ReportError> {
        input.validate()?;

        let report = ApplyReport {
            proposal_id: input.proposal_set.id.clone(),
            written_at: Utc::now(),
            proposal_set: input.proposal_set.clone(),
            selection_manifest: input.selection_manifest.clone(),
            ado_context: input.ado_context.cloned(),
            apply_summary: input.apply_summary.clone(),
        };
        let json = serde_json::to_string_pretty(&report)?;

        self.fs.create_dir_all(&self.reports_dir).await?;
        let path = self
            .claim_path(&report.proposal_id, report.written_at.with_timezone(&Local))
            .await?;
        if let Err(err) = write_atomic(self.fs.as_ref(), &path, &json).await {
            if let Err(cleanup) = self.fs.remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %cleanup, "failed to release report name");
            }
            return Err(err.into());
        }

        tracing::info!(
            proposal_id = %report.proposal_id,
            path = %path.display(),
            applied = report.apply_summary.total_applied,
            failed = report.apply_summary.total_failed,
            "apply report written"
        );
        Ok(path)
    }

    /// Read a report back
    ///
    /// # Errors
    /// `ReportError::Io` or `ReportError::Serialize`.
    pub async fn read_apply_report(&self, path: &Path) -> Result<ApplyReport, ReportError> {
        let json = self.fs.read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Claim the report path for `date`, suffixed `-N` if another report took it
    ///
    /// The name is reserved with an exclusive create, so concurrent writers
    /// never share a name or its temporary file.
    async fn claim_path(
        &self,
        proposal_id: &str,
        date: DateTime<Local>,
    ) -> Result<PathBuf, ReportError> {
        let base = self.report_path(proposal_id, Some(date));
        if self.fs.create_new(&base).await? {
            return Ok(base);
        }
        let stem = format!("{}-{}", date.format(STAMP_FORMAT), sanitize_id(proposal_id));
        for n in 2..=MAX_COLLISION_SUFFIX {
            let candidate = self.reports_dir.join(format!("{stem}-{n}.json"));
            if self.fs.create_new(&candidate).await? {
                return Ok(candidate);
            }
        }
        tracing::warn!(path = %base.display(), "report name collisions exhausted");
        let fallback = self
            .reports_dir
            .join(format!("{stem}-{}.json", Utc::now().timestamp_nanos_opt().unwrap_or_default()));
        if self.fs.create_new(&fallback).await? {
            Ok(fallback)
        } else {
            Err(ReportError::NameTaken(fallback))
        }
    }
}

fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
