//! Diagnose → select → apply → report against a real directory

use heal_core::prelude::*;
use heal_core::heal_report::ApplyReport;
use heal_model::{AdoContext, AdoParent, CollectionMetadata, REQUIREMENT_MISMATCH};
use std::fs;
use std::path::Path;

const SPEC: &str = "await expect(page.getByTestId('banner')).toHaveText('Welcome back');\n";

fn text_failure() -> FailureContext {
    FailureContext::new("dashboard/banner.spec.ts", "shows the banner")
        .with_error(
            "Error: Timed out 5000ms waiting for expect(locator).toHaveText(expected)\n\n\
Expected string: \"Welcome back\"\nReceived string: \"Welcome back, Ada\"\n\n\
> 3 |   await expect(page.getByTestId('banner')).toHaveText('Welcome back');\n",
        )
        .with_stack("    at tests/dashboard/banner.spec.ts:3:44")
}

fn seed(root: &Path) {
    fs::create_dir_all(root.join("tests/dashboard")).unwrap();
    fs::write(root.join("tests/dashboard/banner.spec.ts"), SPEC).unwrap();
}

fn core(root: &Path) -> HealCore {
    HealCore::local(HealConfig::default().with_repo_root(root))
}

#[tokio::test]
async fn text_mismatch_heals_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let core = core(dir.path());

    let proposals = core
        .diagnose(&text_failure(), &EvidencePacket::default())
        .await
        .unwrap();
    let heal = proposals.item("heal-1").expect("heal item");
    assert_eq!(heal.finding.rule_id, "text-assertion-mismatch");

    let manifest = SelectionManifest::new(proposals.id.clone(), vec!["heal-1".to_string()]);
    let outcome = core
        .apply_selection(&proposals, &manifest, false, None)
        .await
        .unwrap();

    assert_eq!(outcome.summary.total_applied, 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("tests/dashboard/banner.spec.ts")).unwrap(),
        "await expect(page.getByTestId('banner')).toHaveText('Welcome back, Ada');\n"
    );

    let path = outcome.report_path.expect("report written");
    assert!(path.exists());
    assert!(!heal_core::heal_fs::temp_path_for(&path).exists());
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with(&format!("-{}.json", proposals.id)));

    let report: ApplyReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report.proposal_id, proposals.id);
    assert_eq!(report.selection_manifest.proposal_id, proposals.id);
    assert_eq!(report.apply_summary.proposal_set_id, proposals.id);
    assert!(report.ado_context.is_none());
}

#[tokio::test]
async fn acceptance_criteria_veto_the_text_heal() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let evidence = EvidencePacket {
        ado_context: Some(AdoContext {
            test_id: "T-9".to_string(),
            parent: Some(AdoParent {
                id: 9,
                acceptance_criteria: Some(
                    "<div>Returning users see the banner <b>Welcome back</b>.</div>".to_string(),
                ),
                ..AdoParent::default()
            }),
            ..AdoContext::default()
        }),
        ..EvidencePacket::default()
    };

    let proposals = core(dir.path())
        .diagnose(&text_failure(), &evidence)
        .await
        .unwrap();

    assert_eq!(proposals.heal_count(), 0);
    let item = proposals.item("analysis-1").unwrap();
    assert_eq!(item.finding.rule_id, "text-assertion-mismatch");
    assert_eq!(item.finding.subtype.as_deref(), Some(REQUIREMENT_MISMATCH));
}

#[tokio::test]
async fn extracted_trace_without_snapshots_aborts_diagnosis() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let extracted = dir.path().join("results/evidence/trace-extracted");
    fs::create_dir_all(&extracted).unwrap();
    fs::write(extracted.join("trace.network"), "{}").unwrap();

    let failure = FailureContext::new("dashboard/banner.spec.ts", "loads").with_error(
        "Error: locator.click: Timeout 30000ms exceeded.\n  - waiting for locator('[data-testid=\"go\"]')",
    );
    let evidence = EvidencePacket {
        collection_metadata: CollectionMetadata {
            trace_extracted: true,
            source_paths: vec!["results".to_string()],
            ..CollectionMetadata::default()
        },
        ..EvidencePacket::default()
    };

    let err = core(dir.path())
        .diagnose(&failure, &evidence)
        .await
        .unwrap_err();
    assert!(matches!(err, HealError::Diagnosis(_)));
}

#[tokio::test]
async fn preview_apply_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let core = core(dir.path());

    let proposals = core
        .diagnose(&text_failure(), &EvidencePacket::default())
        .await
        .unwrap();
    let manifest = SelectionManifest::new(proposals.id.clone(), vec!["heal-1".to_string()]);
    let outcome = core
        .apply_selection(&proposals, &manifest, true, None)
        .await
        .unwrap();

    assert!(outcome.report_path.is_none());
    assert_eq!(
        fs::read_to_string(dir.path().join("tests/dashboard/banner.spec.ts")).unwrap(),
        SPEC
    );
    assert!(!dir.path().join(".heal").exists());
}
