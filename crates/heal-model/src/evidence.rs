//! Failure context and evidence packets
//!
//! Produced once per failing test by the external collector and consumed
//! once by the rule engine. Nothing in this workspace mutates them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity and raw error output of one failing test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FailureContext {
    /// Runner-assigned test id
    pub test_id: String,
    /// Spec file, relative to the tests root
    pub test_file: String,
    /// Full test title
    pub test_title: String,
    /// Primary error message
    pub error_message: String,
    /// Stack trace as printed by the runner
    pub stack_trace: String,
    /// Trace archive path
    pub trace_path: String,
    /// Feature key the test belongs to
    pub feature_key: String,
}

impl FailureContext {
    /// Create a context for a test file and title
    #[must_use]
    pub fn new(test_file: impl Into<String>, test_title: impl Into<String>) -> Self {
        Self {
            test_file: test_file.into(),
            test_title: test_title.into(),
            ..Self::default()
        }
    }

    /// With error message
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// With stack trace
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack_trace = stack.into();
        self
    }
}

/// Everything the collector gathered around a failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePacket {
    /// Trace archive paths
    #[serde(default)]
    pub traces: Vec<String>,
    /// Screenshot paths
    #[serde(default)]
    pub screenshots: Vec<String>,
    /// Reproduction steps, in order
    #[serde(default)]
    pub repro_steps: Vec<String>,
    /// Expected behavior, free text
    #[serde(default)]
    pub expected: String,
    /// Actual behavior, free text
    #[serde(default)]
    pub actual: String,
    /// Error message as seen by the collector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Captured browser console lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<Vec<String>>,
    /// Runner attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_references: Option<Vec<AttachmentReference>>,
    /// How and where the evidence was collected
    #[serde(default)]
    pub collection_metadata: CollectionMetadata,
    /// Azure DevOps work item context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ado_context: Option<AdoContext>,
}

/// Azure DevOps work item context
///
/// The typed fields are a read-only view used by diagnosis. When the context
/// was deserialized, the source document is kept in `raw` and serialized back
/// unchanged, so reports carry it exactly as supplied: unknown fields at any
/// depth and explicit `null`s included. A context built in code has no `raw`
/// and serializes from its typed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct AdoContext {
    /// Linked test id
    pub test_id: String,
    /// Test case work item
    pub test_case: Option<AdoTestCase>,
    /// Parent work item (story/bug) carrying acceptance criteria
    pub parent: Option<AdoParent>,
    /// Document this context was read from
    pub raw: Option<serde_json::Value>,
}

impl AdoContext {
    /// Field from the source document that the typed view does not name
    #[must_use]
    pub fn raw_field(&self, name: &str) -> Option<&serde_json::Value> {
        self.raw.as_ref()?.get(name)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdoFields {
    #[serde(default)]
    test_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    test_case: Option<AdoTestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<AdoParent>,
}

impl TryFrom<serde_json::Value> for AdoContext {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let fields = AdoFields::deserialize(&value)?;
        Ok(Self {
            test_id: fields.test_id,
            test_case: fields.test_case,
            parent: fields.parent,
            raw: Some(value),
        })
    }
}

impl From<AdoContext> for serde_json::Value {
    fn from(ctx: AdoContext) -> Self {
        if let Some(raw) = ctx.raw {
            return raw;
        }
        serde_json::to_value(AdoFields {
            test_id: ctx.test_id,
            test_case: ctx.test_case,
            parent: ctx.parent,
        })
        .unwrap_or_default()
    }
}

/// Test case work item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdoTestCase {
    /// Work item id
    pub id: u64,
    /// Web URL
    pub url: String,
    /// Title
    pub title: String,
    /// Work item type
    #[serde(rename = "type")]
    pub kind: String,
}

/// Parent work item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdoParent {
    /// Work item id
    pub id: u64,
    /// Work item type
    #[serde(rename = "type")]
    pub kind: String,
    /// Title
    pub title: String,
    /// Web URL
    pub url: String,
    /// Acceptance criteria, often HTML
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    /// Description, often HTML
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn evidence_parses_collector_json() {
        let json = r#"{
            "traces": ["test-results/login/trace.zip"],
            "screenshots": [],
            "reproSteps": ["open /login"],
            "expected": "dashboard",
            "actual": "spinner",
            "console": ["[error] boom"],
            "collectionMetadata": {
                "collectedAt": "2026-01-02T03:04:05Z",
                "sourcePaths": ["test-results/login"],
                "indexingNotes": [],
                "traceExtracted": true,
                "extractedTraceDir": "test-results/login/evidence/trace-extracted",
                "attachmentCounts": {"trace": 1}
            },
            "adoContext": {
                "testId": "T-1",
                "parent": {"id": 42, "type": "User Story", "title": "Login",
                           "url": "https://dev.azure.com/x/42",
                           "acceptanceCriteria": "<p>Shows <b>Welcome</b></p>"},
                "sprint": "S12"
            }
        }"#;

        let packet: EvidencePacket = serde_json::from_str(json).unwrap();
        assert!(packet.collection_metadata.trace_extracted);
        assert_eq!(packet.console_lines().len(), 1);
        assert_eq!(
            packet.acceptance_criteria(),
            Some("<p>Shows <b>Welcome</b></p>")
        );

        let ado = packet.ado_context.as_ref().unwrap();
        assert_eq!(ado.raw_field("sprint"), Some(&serde_json::json!("S12")));
        assert_eq!(ado.parent.as_ref().unwrap().id, 42);
    }

    #[test]
    fn ado_context_serializes_as_supplied() {
        let source = serde_json::json!({
            "testId": "T-7",
            "testCase": {"id": 7, "title": "Login", "state": "Design"},
            "parent": {"id": 42, "acceptanceCriteria": null, "state": "Active"},
            "sprint": "S12"
        });

        let ado: AdoContext = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(ado.test_case.as_ref().unwrap().id, 7);
        assert_eq!(ado.parent.as_ref().unwrap().acceptance_criteria, None);
        assert_eq!(serde_json::to_value(&ado).unwrap(), source);
    }

    #[test]
    fn ado_context_built_in_code_serializes_typed_fields() {
        let ado = AdoContext {
            test_id: "T-1".to_string(),
            ..AdoContext::default()
        };
        assert_eq!(
            serde_json::to_value(&ado).unwrap(),
            serde_json::json!({"testId": "T-1"})
        );
    }

    #[test]
    fn blank_acceptance_criteria_is_absent() {
        let packet = EvidencePacket {
            ado_context: Some(AdoContext {
                parent: Some(AdoParent {
                    acceptance_criteria: Some("   ".to_string()),
                    ..AdoParent::default()
                }),
                ..AdoContext::default()
            }),
            ..EvidencePacket::default()
        };
        assert_eq!(packet.acceptance_criteria(), None);
    }

    #[test]
    fn failure_context_defaults_missing_fields() {
        let ctx: FailureContext =
            serde_json::from_str(r#"{"testFile": "login/a.spec.ts", "errorMessage": "x"}"#)
                .unwrap();
        assert_eq!(ctx.test_file, "login/a.spec.ts");
        assert!(ctx.stack_trace.is_empty());
    }
}
