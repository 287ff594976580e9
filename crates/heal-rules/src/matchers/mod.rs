//! Built-in matchers
//!
//! | rule id | fires on | can heal |
//! |---|---|---|
//! | `locator-not-found` | locator timeouts | yes, renamed test ids |
//! | `navigation-timeout` | `page.goto` timeouts | no |
//! | `strict-mode-violation` | locator matched several elements | yes, `.first()` |
//! | `text-assertion-mismatch` | `toHaveText` / `toContainText` | yes, expected literal |
//! | `test-timeout` | whole-test timeout | no |
//! | `application-error` | uncaught errors, HTTP 5xx | no |

mod app_error;
mod locator;
mod navigation;
mod strict_mode;
mod test_timeout;
mod text_assertion;

pub use app_error::ApplicationErrorMatcher;
pub use locator::{closest_test_id, LocatorNotFoundMatcher};
pub use navigation::{NavigationTimeoutMatcher, APP_READY_SELECTOR};
pub use strict_mode::StrictModeMatcher;
pub use test_timeout::TestTimeoutMatcher;
pub use text_assertion::TextAssertionMatcher;

use crate::matcher::RuleMatcher;

/// All built-in matchers, in evaluation order
#[must_use]
pub fn default_matchers() -> Vec<Box<dyn RuleMatcher>> {
    vec![
        Box::new(LocatorNotFoundMatcher),
        Box::new(NavigationTimeoutMatcher),
        Box::new(StrictModeMatcher),
        Box::new(TextAssertionMatcher),
        Box::new(TestTimeoutMatcher),
        Box::new(ApplicationErrorMatcher),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::matcher::MatchContext;
    use heal_dom::DomInspector;
    use heal_model::{EvidencePacket, FailureContext};
    use heal_test_utils::MemoryFs;
    use std::path::Path;
    use std::sync::Arc;

    pub(crate) const ROOT: &str = "/repo";

    pub(crate) fn inspector(fs: MemoryFs) -> DomInspector {
        DomInspector::new(Arc::new(fs), ROOT)
    }

    pub(crate) fn context<'a>(
        failure: &'a FailureContext,
        evidence: &'a EvidencePacket,
        dom: &'a DomInspector,
    ) -> MatchContext<'a> {
        MatchContext::new(failure, evidence, dom, Path::new(ROOT))
    }
}
