//! Rule engine errors

use heal_dom::DomError;

/// Errors that abort a diagnosis run
///
/// Matchers decline or return analysis items for anything they cannot
/// handle; only integrity problems surface here.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// DOM inspection failed (e.g. extracted trace with no readable snapshot)
    #[error("dom inspection failed in rule '{rule_id}': {source}")]
    Dom {
        rule_id: String,
        #[source]
        source: DomError,
    },

    /// Matcher-specific failure
    #[error("rule '{rule_id}' failed: {message}")]
    Matcher { rule_id: String, message: String },
}

impl RuleError {
    /// Wrap a DOM error for a rule
    pub fn dom(rule_id: impl Into<String>, source: DomError) -> Self {
        Self::Dom {
            rule_id: rule_id.into(),
            source,
        }
    }

    /// Rule that raised the error
    #[must_use]
    pub fn rule_id(&self) -> &str {
        match self {
            Self::Dom { rule_id, .. } | Self::Matcher { rule_id, .. } => rule_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn dom_error_keeps_rule_id() {
        let err = RuleError::dom(
            "locator-not-found",
            DomError::NoReadableSnapshots {
                dir: PathBuf::from("ev"),
                scanned: 0,
            },
        );
        assert_eq!(err.rule_id(), "locator-not-found");
        assert!(err.to_string().contains("no HTML snapshot"));
    }
}
