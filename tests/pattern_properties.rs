//! Property tests for import path matching.

use go_imports_rename::{MatchMode, MatchOptions, MatchResult, MatchSpec};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

fn import_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|parts| parts.join("/"))
}

fn literal_prefix(prefix: &str, replacement: &str) -> MatchSpec {
    MatchSpec::with_options(
        prefix,
        replacement,
        MatchOptions {
            mode: MatchMode::Prefix,
            literal: true,
        },
    )
    .unwrap()
}

proptest! {
    #[test]
    fn prefix_match_keeps_the_tail(prefix in import_path(), tail in prop::option::of(import_path())) {
        let spec = literal_prefix(&prefix, "x.org/new");
        let input = match &tail {
            Some(tail) => format!("{prefix}/{tail}"),
            None => prefix.clone(),
        };
        let expected = match &tail {
            Some(tail) => format!("x.org/new/{tail}"),
            None => "x.org/new".to_string(),
        };
        prop_assert_eq!(spec.apply(&input), MatchResult::Replaced(expected));
    }

    #[test]
    fn partial_segments_never_match(prefix in import_path(), extra in "[a-z0-9]{1,4}") {
        let spec = literal_prefix(&prefix, "x.org/new");
        let input = format!("{prefix}{extra}");
        prop_assert_eq!(spec.apply(&input), MatchResult::Unchanged);
    }

    #[test]
    fn matches_are_anchored_at_the_start(lead in "[0-9][a-z0-9]{0,4}", path in import_path()) {
        let spec = literal_prefix(&path, "x.org/new");
        let input = format!("{lead}/{path}");
        prop_assert_eq!(spec.apply(&input), MatchResult::Unchanged);
    }

    #[test]
    fn disjoint_replacement_is_idempotent(path in import_path()) {
        // Replacement lives under a host the generated prefix can never match.
        let spec = literal_prefix(&path, "x.org/moved");
        let once = spec.apply(&path).into_replacement().unwrap();
        prop_assert_eq!(spec.apply(&once), MatchResult::Unchanged);
    }

    #[test]
    fn exact_mode_rejects_subpackages(path in import_path(), tail in segment()) {
        let spec = MatchSpec::with_options(
            &path,
            "x.org/new",
            MatchOptions { mode: MatchMode::Exact, literal: true },
        )
        .unwrap();
        prop_assert!(spec.apply(&path).is_replaced());
        let subpackage = format!("{path}/{tail}");
        prop_assert_eq!(spec.apply(&subpackage), MatchResult::Unchanged);
    }
}
