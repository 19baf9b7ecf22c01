use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use statebook_document::StateDocument;
use statebook_guard::{
    Evidence, EvidenceVerifier, MetricSnapshot, PatchApplier, PatchEngine, PatchError,
    PatchOperation, PatchProposal, PathPattern, Policy, RejectionKind,
};

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..4).prop_map(|segs| format!("/{}", segs.join("/")))
}

fn wordle_document() -> StateDocument {
    StateDocument::new(json!({
        "kernel": {"policy": {
            "allowed_paths": ["/state/*", "/logs/decisions/*"],
            "proof_required": []
        }},
        "project": {"id": "wordle"},
        "state": {"history": []}
    }))
    .unwrap()
}

proptest! {
    #[test]
    fn prop_prefix_pattern_matches_iff_prefix(base in path(), candidate in path()) {
        let pattern = PathPattern::new(format!("{base}/*"));
        let expected = candidate.starts_with(&format!("{base}/"));
        prop_assert_eq!(pattern.matches(&candidate), expected);
    }

    #[test]
    fn prop_exact_pattern_matches_only_equal(pattern in path(), candidate in path()) {
        let p = PathPattern::new(pattern.clone());
        prop_assert_eq!(p.matches(&candidate), pattern == candidate);
    }

    #[test]
    fn prop_allowed_ops_leave_input_untouched(
        ops in prop::collection::vec((path(), any::<i64>(), any::<bool>()), 0..8)
    ) {
        let original = wordle_document();
        let snapshot = original.clone();
        let policy = Policy::deny_all().allow("/state/*");
        let ops: Vec<PatchOperation> = ops
            .into_iter()
            .map(|(p, v, add)| {
                let target = format!("/state{p}");
                if add {
                    PatchOperation::add(target, json!(v))
                } else {
                    PatchOperation::replace(target, json!(v))
                }
            })
            .collect();

        let result = PatchApplier.apply(&original, &ops, &policy, None);
        prop_assert!(result.is_ok());
        prop_assert_eq!(&original, &snapshot);
        prop_assert_eq!(original.hash(), snapshot.hash());
    }

    #[test]
    fn prop_same_sign_claims_verify(before in 0u32..1000, after in 0u32..1000, scale in 1u32..100) {
        let b = MetricSnapshot::new().with("m", f64::from(before));
        let a = MetricSnapshot::new().with("m", f64::from(after));
        let observed = f64::from(after) - f64::from(before);
        let claim = Evidence::default().claim("m", observed.signum() * f64::from(scale));
        prop_assert!(EvidenceVerifier.verify(&b, &a, &claim.checker_deltas).is_ok());
    }
}

#[test]
fn evidence_scenario_forty_to_twelve() {
    let before = MetricSnapshot::new().with("candidates", 40.0);
    let after = MetricSnapshot::new().with("candidates", 12.0);

    let honest = Evidence::default().claim("candidates", -5.0);
    assert!(EvidenceVerifier
        .verify(&before, &after, &honest.checker_deltas)
        .is_ok());

    let inflated = Evidence::default().claim("candidates", 5.0);
    let err = EvidenceVerifier
        .verify(&before, &after, &inflated.checker_deltas)
        .unwrap_err();
    assert_eq!(err.kind(), RejectionKind::EvidenceMismatch);
}

#[test]
fn patching_kernel_policy_is_a_violation() {
    let document = wordle_document();
    let text_before = document.to_json_pretty().unwrap();

    let proposal = PatchProposal::new(vec![PatchOperation::replace(
        "/kernel/policy",
        json!({"allowed_paths": ["/*"]}),
    )]);
    let measure = |_: &StateDocument| MetricSnapshot::new();
    let err = PatchEngine::new()
        .run_governed(&document, &proposal, &measure)
        .unwrap_err();

    assert!(matches!(err, PatchError::PolicyViolation { ref path } if path == "/kernel/policy"));
    assert_eq!(document.to_json_pretty().unwrap(), text_before);
}

#[test]
fn decision_log_append_is_allowed() {
    let document = wordle_document();
    let proposal = PatchProposal::new(vec![PatchOperation::add(
        "/logs/decisions/-",
        json!({"turn": 1, "guess": "crane"}),
    )]);
    let outcome = PatchEngine::new()
        .run_governed(&document, &proposal, &|_: &StateDocument| MetricSnapshot::new())
        .unwrap();
    assert_eq!(
        outcome.document.get_pointer("/logs/decisions"),
        Some(&json!([{"turn": 1, "guess": "crane"}]))
    );
    assert!(outcome.notes.is_empty());
}
