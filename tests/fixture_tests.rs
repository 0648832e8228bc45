mod support;

use sqlnorm::Normalizer;

#[test]
fn every_fixture_normalizes_to_its_expected_text() {
    let names = support::fixture_names();
    assert!(!names.is_empty(), "no fixtures found");
    for name in names {
        let normalizer = Normalizer::new(support::load_fixture_options(&name));
        let actual = normalizer
            .normalize(&support::read_fixture_sql(&name))
            .unwrap_or_else(|e| panic!("fixture {name} failed to normalize: {e}"));
        assert_eq!(
            actual,
            support::read_fixture_expected(&name),
            "fixture {name} produced unexpected output"
        );
    }
}

#[test]
fn fixture_outputs_are_fixed_points() {
    for name in support::fixture_names() {
        let normalizer = Normalizer::new(support::load_fixture_options(&name));
        let expected = support::read_fixture_expected(&name);
        let again = normalizer
            .normalize(&expected)
            .unwrap_or_else(|e| panic!("fixture {name} expectation failed to normalize: {e}"));
        assert_eq!(again, expected, "fixture {name} is not stable under renormalization");
    }
}

#[test]
fn script_fixture_reports_one_entry_per_statement() {
    let normalizer = Normalizer::new(support::load_fixture_options("routine_script"));
    let report = normalizer
        .normalize_detailed(&support::read_fixture_sql("routine_script"))
        .expect("fixture should normalize");
    let kinds: Vec<&str> = report.statements.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec!["select", "create_routine", "do", "call", "fetch"]);
    assert_eq!(report.substitution_count(), 7);

    let preserved: Vec<&str> = report
        .statements
        .iter()
        .flat_map(|s| s.preserved.iter().map(|p| p.text.as_str()))
        .collect();
    assert_eq!(preserved, vec!["50"]);
}
