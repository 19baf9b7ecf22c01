use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use statebook_solver::{
    ConstraintMutation, Constraints, Dictionary, DictionaryCache, Rule, Ruleset, SolverSession,
    Weights,
};

const WORDS: &[&str] = &[
    "crane", "slate", "crisp", "crust", "adieu", "audio", "geese", "eerie", "tarot", "abbey",
    "mound", "pique", "lymph", "fjord", "shard", "stare", "tears", "rates", "aster", "crate",
];

fn dictionary() -> Dictionary {
    Dictionary::from_words(WORDS)
}

fn letter() -> impl Strategy<Value = char> {
    prop::char::range('a', 'z')
}

fn mutation() -> impl Strategy<Value = ConstraintMutation> {
    prop_oneof![
        (0usize..5, letter()).prop_map(|(position, letter)| ConstraintMutation::Green { position, letter }),
        (0usize..5, letter()).prop_map(|(position, letter)| ConstraintMutation::BanAt { position, letter }),
        letter().prop_map(|letter| ConstraintMutation::Require { letter }),
        letter().prop_map(|letter| ConstraintMutation::Exclude { letter }),
        (letter(), 0usize..3).prop_map(|(letter, count)| ConstraintMutation::MinCount { letter, count }),
        (letter(), 0usize..3).prop_map(|(letter, count)| ConstraintMutation::MaxCount { letter, count }),
    ]
}

fn session_from(mutations: &[ConstraintMutation]) -> SolverSession {
    let mut session = SolverSession::new();
    session.apply_all(mutations);
    session
}

proptest! {
    #[test]
    fn prop_exclude_never_grows_candidates(ms in prop::collection::vec(mutation(), 0..6), l in letter()) {
        let dict = dictionary();
        let mut session = session_from(&ms);
        let before = session.candidates(&dict).len();
        session.constraints_mut().exclude(l);
        prop_assert!(session.candidates(&dict).len() <= before);
    }

    #[test]
    fn prop_green_never_grows_candidates(
        ms in prop::collection::vec(mutation(), 0..6),
        pos in 0usize..5,
        l in letter(),
    ) {
        let dict = dictionary();
        let mut session = session_from(&ms);
        let fresh_slot = session.constraints().greens()[pos].is_none();
        let lifts_exclusion = session.constraints().must_exclude().contains(&l);
        let before = session.candidates(&dict).len();

        session.constraints_mut().set_green(pos, l);
        let after = session.candidates(&dict);
        prop_assert!(after.iter().all(|w| w.chars().nth(pos) == Some(l)));
        if fresh_slot && !lifts_exclusion {
            prop_assert!(after.len() <= before);
        }
    }

    #[test]
    fn prop_reset_is_idempotent(ms in prop::collection::vec(mutation(), 0..8)) {
        let mut once = session_from(&ms);
        once.reset();
        let mut twice = once.clone();
        prop_assert!(!twice.reset());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_repeated_mutation_is_a_no_op(
        ms in prop::collection::vec(mutation(), 0..6),
        m in mutation(),
    ) {
        let mut session = session_from(&ms);
        session.apply(&m);
        let settled = session.clone();
        prop_assert!(!session.apply(&m));
        prop_assert_eq!(session, settled);
    }

    #[test]
    fn prop_suggestion_is_a_candidate(ms in prop::collection::vec(mutation(), 0..6)) {
        let dict = dictionary();
        let session = session_from(&ms);
        let candidates = session.candidates(&dict);
        let suggestion = session.suggest(&dict, &Ruleset::default());
        prop_assert_eq!(suggestion.candidates, candidates.len());
        match suggestion.guess {
            Some(word) => prop_assert!(candidates.contains(&word.as_str())),
            None => prop_assert!(candidates.is_empty()),
        }
    }
}

#[test]
fn greens_and_exclusion_scenario() {
    let dict = Dictionary::from_words(["crisp", "crust", "crane"]);
    let constraints: Constraints = serde_json::from_value(json!({
        "greens": ["c", "r", "", "", ""],
        "must_exclude": ["a"]
    }))
    .unwrap();
    let session = SolverSession::with_constraints(constraints);
    assert_eq!(session.candidates(&dict), vec!["crisp", "crust"]);

    let suggestion = session.suggest(&dict, &Ruleset::default());
    // both score alike on info gain; tie goes to the smaller word
    assert_eq!(suggestion.guess.as_deref(), Some("crisp"));
    assert_eq!(suggestion.dictionary, 3);
}

#[test]
fn contradictory_constraints_yield_no_solution() {
    let mut session = SolverSession::new();
    session.constraints_mut().set_min_count('e', 2);
    session.constraints_mut().set_max_count('e', 1);
    let suggestion = session.suggest(&dictionary(), &Ruleset::default());
    assert!(!suggestion.is_solution());
    assert_eq!(suggestion.candidates, 0);
}

#[test]
fn heuristics_shift_the_pick_early() {
    let dict = Dictionary::from_words(["geese", "eerie", "adieu"]);
    let info_only = Ruleset::default().with_weights(Weights {
        info_gain: 1.0,
        heuristics: 0.0,
    });
    let heavy = Ruleset::default()
        .with_weights(Weights {
            info_gain: 0.0,
            heuristics: 1.0,
        })
        .with_rule(Rule::new("prefer_two_vowels_early", 1.0))
        .with_rule(Rule::new("avoid_duplicates_early", 1.0));

    let session = SolverSession::new();
    assert_eq!(
        session.suggest(&dict, &heavy).guess.as_deref(),
        Some("adieu")
    );
    assert!(session.suggest(&dict, &info_only).is_solution());
}

#[test]
fn cache_reload_feeds_suggestions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dictionary.txt");
    std::fs::write(&path, "CRISP\ncrust\nnope\n").unwrap();

    let cache = DictionaryCache::new(&path);
    let dict = cache.snapshot();
    assert_eq!(dict.len(), 2);
    assert!(dict.contains("crisp"));

    let suggestion = SolverSession::new().suggest(&dict, &Ruleset::default());
    assert_eq!(suggestion.candidates, 2);
}
