#![expect(clippy::unwrap_used)]

use super::*;
use crate::dataset::{CellValue, Column, ColumnType};

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn sales() -> Dataset {
    Dataset::new(vec![
        Column::texts(
            "region",
            [Some(" North"), Some("south "), Some(" North"), None, Some("East!")],
        ),
        Column::integers("units", [Some(10), Some(20), Some(10), None, Some(5)]),
        Column::floats("price", [Some(2.5), Some(4.0), Some(2.5), Some(1.0), None]),
        Column::texts("code", [Some("3"), Some("x"), Some("3"), Some("5"), Some("7")]),
    ])
    .unwrap()
}

fn column<'a>(ds: &'a Dataset, name: &str) -> &'a Column {
    ds.column(name).unwrap()
}

#[test]
fn test_unknown_action_is_rejected_unchanged() {
    let ds = sales();
    let outcome = apply(&ds, "teleport", &Params::new());
    assert_eq!(outcome.dataset, ds);
    assert_eq!(
        outcome.report.status,
        ActionStatus::Rejected(ActionError::UnknownAction("teleport".into()))
    );
}

#[test]
fn test_missing_parameter_is_a_noop() {
    let ds = sales();
    for action in ["fill_value", "fill_forward", "drop_column", "cast_type", "derive_column"] {
        let outcome = apply(&ds, action, &Params::new());
        assert_eq!(outcome.dataset, ds, "{action} changed the dataset");
        assert!(
            matches!(
                outcome.error(),
                Some(ActionError::MissingParameter { .. })
            ),
            "{action}: {:?}",
            outcome.report.status
        );
    }
}

#[test]
fn test_inapplicable_column_is_a_noop() {
    let ds = sales();
    let cases = [
        ("fill_median", params(&[("column", "region")])),
        ("fill_mean", params(&[("column", "missing")])),
        ("filter_outliers_iqr", params(&[("column", "code")])),
        ("add_column", params(&[("name", "units")])),
        (
            "derive_column",
            params(&[("operator", "add"), ("source_a", "units"), ("source_b", "region")]),
        ),
    ];
    for (action, p) in cases {
        let outcome = apply(&ds, action, &p);
        assert_eq!(outcome.dataset, ds, "{action} changed the dataset");
        assert!(
            matches!(outcome.error(), Some(ActionError::InapplicableColumn { .. })),
            "{action}: {:?}",
            outcome.report.status
        );
    }
}

#[test]
fn test_input_snapshot_is_untouched() {
    let ds = sales();
    let before = ds.clone();
    let outcome = apply(&ds, "drop_missing_rows", &Params::new());
    assert!(outcome.report.is_applied());
    assert_eq!(outcome.dataset.height(), 3);
    assert_eq!(ds, before);
}

#[test]
fn test_fill_median_on_integers() {
    let ds = Dataset::new(vec![Column::integers(
        "n",
        [Some(1), None, Some(3), None, Some(5)],
    )])
    .unwrap();
    let outcome = apply(&ds, "fill_median", &params(&[("column", "n")]));
    assert_eq!(
        column(&outcome.dataset, "n"),
        &Column::integers("n", [Some(1), Some(3), Some(3), Some(3), Some(5)])
    );
    assert!(outcome.report.notes.is_empty());
}

#[test]
fn test_fill_mode_all_null_is_empty_result() {
    let ds = Dataset::new(vec![Column::texts("t", [None::<&str>, None])]).unwrap();
    let outcome = apply(&ds, "mode", &params(&[("column", "t")]));
    assert_eq!(outcome.dataset, ds);
    assert!(matches!(outcome.error(), Some(ActionError::EmptyResult(_))));
}

#[test]
fn test_fill_value_retypes_on_foreign_literal() {
    let ds = sales();
    let outcome = apply(&ds, "fill_value", &params(&[("column", "units"), ("value", "n/a")]));
    assert_eq!(column(&outcome.dataset, "units").kind(), ColumnType::Mixed);
    assert!(outcome.report.notes.contains(&Note::Retyped {
        column: "units".into(),
        from: ColumnType::Integer,
        to: ColumnType::Mixed,
    }));
}

#[test]
fn test_drop_duplicates_is_idempotent() {
    let ds = sales();
    let once = apply(&ds, "drop_duplicate_rows", &Params::new()).dataset;
    let twice = apply(&once, "drop_duplicate_rows", &Params::new()).dataset;
    assert_eq!(once.height(), 4);
    assert_eq!(once, twice);
}

#[test]
fn test_drop_duplicates_with_unknown_subset_uses_whole_row() {
    let ds = sales();
    let subset = apply(&ds, "drop_duplicates", &params(&[("subset", "units,nope")])).dataset;
    let whole = apply(&ds, "drop_duplicates", &Params::new()).dataset;
    assert_eq!(subset, whole);
}

#[test]
fn test_normalize_trim_is_idempotent() {
    let ds = sales();
    let p = params(&[("column", "region")]);
    let once = apply(&ds, "normalize_trim", &p).dataset;
    let twice = apply(&once, "normalize_trim", &p).dataset;
    assert_eq!(once, twice);
    assert_eq!(column(&once, "region").get(0), Some(&CellValue::from("North")));
    assert_eq!(column(&once, "region").get(3), Some(&CellValue::Null));
}

#[test]
fn test_normalize_numeric_column_reports_retype() {
    let ds = sales();
    let outcome = apply(&ds, "normalize_lower", &params(&[("column", "price")]));
    let price = column(&outcome.dataset, "price");
    assert_eq!(price.kind(), ColumnType::Text);
    assert_eq!(price.get(0), Some(&CellValue::from("2.5")));
    assert_eq!(price.get(4), Some(&CellValue::Null));
}

#[test]
fn test_filter_outliers_removes_only_the_outlier() {
    let values = [1, 2, 2, 3, 3, 3, 4, 4, 100];
    let ds = Dataset::new(vec![
        Column::integers("v", values.into_iter().map(Some)),
        Column::integers("id", (0..9).map(Some)),
    ])
    .unwrap();
    let outcome = apply(&ds, "filter_outliers_iqr", &params(&[("column", "v")]));
    assert_eq!(outcome.dataset.height(), 8);
    assert!(!column(&outcome.dataset, "v").cells().contains(&CellValue::Integer(100)));
    assert_eq!(outcome.report.notes, vec![Note::RowsRemoved(1)]);
}

#[test]
fn test_filter_outliers_with_too_few_values() {
    let ds = Dataset::new(vec![Column::floats("v", [Some(1.0), Some(50.0), None])]).unwrap();
    let outcome = apply(&ds, "outlier_iqr", &params(&[("column", "v")]));
    assert_eq!(outcome.dataset, ds);
    assert!(matches!(outcome.error(), Some(ActionError::EmptyResult(_))));
}

#[test]
fn test_derive_divide() {
    let ds = Dataset::new(vec![
        Column::integers("a", [Some(10), Some(20), Some(0)]),
        Column::integers("b", [Some(2), Some(0), Some(5)]),
    ])
    .unwrap();
    let p = params(&[
        ("operator", "divide"),
        ("source_a", "a"),
        ("source_b", "b"),
        ("target_name", "ratio"),
    ]);
    let outcome = apply(&ds, "derive_column", &p);
    assert_eq!(outcome.dataset.column_names(), vec!["a", "b", "ratio"]);
    assert_eq!(
        column(&outcome.dataset, "ratio"),
        &Column::floats("ratio", [Some(5.0), None, Some(0.0)])
    );
}

#[test]
fn test_derive_custom_expression() {
    let ds = Dataset::new(vec![Column::integers("x", [Some(1), Some(2), Some(3)])]).unwrap();
    let outcome = apply(
        &ds,
        "calc_column",
        &params(&[("operator", "custom"), ("source_a", "x"), ("expression", "x*x+1")]),
    );
    assert_eq!(
        column(&outcome.dataset, DEFAULT_TARGET),
        &Column::floats(DEFAULT_TARGET, [Some(2.0), Some(5.0), Some(10.0)])
    );
}

#[test]
fn test_derive_custom_rejects_code() {
    let ds = Dataset::new(vec![Column::integers("x", [Some(1), Some(2), Some(3)])]).unwrap();
    let outcome = apply(
        &ds,
        "derive_column",
        &params(&[
            ("operator", "custom"),
            ("source_a", "x"),
            ("expression", "__import__('os')"),
            ("target_name", "y"),
        ]),
    );
    assert!(outcome.report.is_applied());
    let y = column(&outcome.dataset, "y");
    assert_eq!(y.len(), 3);
    assert_eq!(y.null_count(), 3);
    assert!(matches!(
        outcome.report.notes.first(),
        Some(Note::ExpressionRejected { .. })
    ));
}

#[test]
fn test_derive_overwrites_existing_target_in_place() {
    let ds = sales();
    let outcome = apply(
        &ds,
        "derive_column",
        &params(&[("operator", "neg"), ("source_a", "units"), ("target_name", "price")]),
    );
    assert_eq!(outcome.dataset.column_names(), ds.column_names());
    assert_eq!(column(&outcome.dataset, "price").kind(), ColumnType::Integer);
}

#[test]
fn test_cast_type_reports_failures() {
    let ds = sales();
    let outcome = apply(&ds, "cast_type", &params(&[("column", "code"), ("target_type", "int")]));
    assert_eq!(
        column(&outcome.dataset, "code"),
        &Column::integers("code", [Some(3), None, Some(3), Some(5), Some(7)])
    );
    assert!(outcome.report.notes.contains(&Note::CellsNulled {
        column: "code".into(),
        count: 1,
    }));
}

#[test]
fn test_fix_typo_and_replace_are_exact() {
    let ds = sales();
    let outcome = apply(
        &ds,
        "fix_typo",
        &params(&[("column", "region"), ("old", " North"), ("new", "North")]),
    );
    let region = column(&outcome.dataset, "region");
    assert_eq!(region.get(0), Some(&CellValue::from("North")));
    assert_eq!(region.get(1), Some(&CellValue::from("south ")));

    let outcome = apply(
        &ds,
        "replace",
        &params(&[("column", "region"), ("old", "North"), ("new", "N")]),
    );
    assert_eq!(outcome.dataset, ds);
    assert!(outcome.report.is_applied());
}

#[test]
fn test_add_and_drop_column() {
    let ds = sales();
    let added = apply(&ds, "add_column", &params(&[("name", "notes")])).dataset;
    assert_eq!(added.width(), 5);
    let notes = column(&added, "notes");
    assert_eq!(notes.kind(), ColumnType::Text);
    assert!(notes.cells().iter().all(|c| *c == CellValue::from("")));

    let dropped = apply(&added, "drop_column", &params(&[("column", "units")])).dataset;
    assert_eq!(dropped.column_names(), vec!["region", "price", "code", "notes"]);
}

#[test]
fn test_sequence_of_actions_keeps_dataset_well_formed() {
    let steps: [(&str, Params); 5] = [
        ("normalize_trim", params(&[("column", "region")])),
        ("ffill", params(&[("column", "units")])),
        ("drop_duplicates", Params::new()),
        ("astype", params(&[("column", "code"), ("target_type", "float")])),
        (
            "derive_column",
            params(&[
                ("operator", "multiply"),
                ("source_a", "units"),
                ("source_b", "price"),
                ("target_name", "revenue"),
            ]),
        ),
    ];

    let mut ds = sales();
    for (action, p) in &steps {
        let outcome = apply(&ds, action, p);
        assert!(outcome.report.is_applied(), "{}", outcome.report.summary());
        ds = outcome.dataset;
    }

    assert_eq!(ds.width(), 5);
    assert!(ds.columns().iter().all(|c| c.len() == ds.height()));
    assert_eq!(
        column(&ds, "revenue").get(0),
        Some(&CellValue::Float(25.0))
    );
}
