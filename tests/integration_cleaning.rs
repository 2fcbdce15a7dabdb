//! Integration tests for the full cleaning workflow
//!
//! These tests load fixture files, run actions and pipelines through the
//! public API and verify what lands on disk.

use anyhow::{Context as _, Result};
use datawash::dataset::{CellValue, Column, ColumnType, Dataset};
use datawash::engine;
use datawash::io::{ImportOptions, load_dataset, save_dataset};
use datawash::pipeline::{PipelineSpec, run_pipeline};
use datawash::profile::{distinct_values, summarize};
use std::collections::HashMap;
use std::path::Path;

fn orders() -> Result<Dataset> {
    load_dataset(Path::new("testdata/orders.csv"), &ImportOptions::default())
}

fn kinds(ds: &Dataset) -> Vec<(String, ColumnType)> {
    ds.columns()
        .iter()
        .map(|c| (c.name().to_owned(), c.kind()))
        .collect()
}

#[test]
fn test_load_orders_csv() -> Result<()> {
    let ds = orders()?;
    assert_eq!(ds.height(), 7, "Should have 7 rows");
    assert_eq!(
        kinds(&ds),
        vec![
            ("order_id".to_owned(), ColumnType::Integer),
            ("customer".to_owned(), ColumnType::Text),
            ("region".to_owned(), ColumnType::Text),
            ("qty".to_owned(), ColumnType::Integer),
            ("price".to_owned(), ColumnType::Float),
            ("ordered_at".to_owned(), ColumnType::Datetime),
        ]
    );

    let summary = summarize(&ds);
    assert_eq!(summary.duplicate_rows, 1);
    assert_eq!(summary.total_missing(), 4);
    Ok(())
}

#[test]
fn test_round_trip_through_every_format() -> Result<()> {
    let ds = orders()?;
    let dir = tempfile::tempdir()?;

    for name in ["orders.parquet", "orders.xlsx"] {
        let path = dir.path().join(name);
        save_dataset(&ds, &path)?;
        let back = load_dataset(&path, &ImportOptions::default())?;
        assert_eq!(back, ds, "{name} should round-trip unchanged");
    }

    let path = dir.path().join("nested").join("orders.csv");
    save_dataset(&ds, &path)?;
    let back = load_dataset(&path, &ImportOptions::default())?;
    assert_eq!(back, ds, "csv should round-trip unchanged");
    Ok(())
}

#[test]
fn test_csv_nan_is_missing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("readings.csv");
    std::fs::write(&path, "id,v\n1,1.0\n2,NaN\n3,\n4,3.0\n")?;

    let ds = load_dataset(&path, &ImportOptions::default())?;
    let v = ds.column("v").context("v column")?;
    assert_eq!(v.kind(), ColumnType::Float);
    assert_eq!(v.null_count(), 2);
    assert_eq!(summarize(&ds).total_missing(), 2);

    let params = HashMap::from([("column".to_owned(), "v".to_owned())]);
    let step = engine::apply(&ds, "fill_mean", &params);
    assert!(step.report.is_applied());
    assert_eq!(
        step.dataset.column("v"),
        Some(&Column::floats("v", [Some(1.0), Some(2.0), Some(2.0), Some(3.0)]))
    );

    let step = engine::apply(&ds, "drop_missing_rows", &HashMap::new());
    assert!(step.report.is_applied());
    assert_eq!(step.dataset.height(), 2);
    assert_eq!(
        step.dataset.column("id"),
        Some(&Column::integers("id", [Some(1), Some(4)]))
    );
    Ok(())
}

#[test]
fn test_unsupported_output_is_rejected() -> Result<()> {
    let ds = orders()?;
    let dir = tempfile::tempdir()?;
    assert!(save_dataset(&ds, &dir.path().join("orders.json")).is_err());
    assert!(save_dataset(&ds, &dir.path().join("orders.xls")).is_err());
    Ok(())
}

#[test]
fn test_action_sequence_on_loaded_file() -> Result<()> {
    let ds = orders()?;
    let params = |pairs: &[(&str, &str)]| -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    };

    let step = engine::apply(&ds, "drop_missing_rows", &HashMap::new());
    assert!(step.report.is_applied());
    assert_eq!(step.dataset.height(), 3);

    let step = engine::apply(
        &step.dataset,
        "fix_typo",
        &params(&[("column", "region"), ("old", "north"), ("new", "North")]),
    );
    assert!(step.report.is_applied());
    let region = step.dataset.column("region").context("region column")?;
    assert_eq!(distinct_values(region), vec!["North", "West"]);

    // The original snapshot is untouched.
    assert_eq!(ds.height(), 7);
    Ok(())
}

#[test]
fn test_pipeline_run_end_to_end() -> Result<()> {
    let spec = PipelineSpec::from_file("testdata/orders_pipeline.json")?;
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("clean.csv");

    let report = run_pipeline(
        &spec,
        Path::new("testdata/orders.csv"),
        Some(&output),
        &ImportOptions::default(),
    )?;

    assert_eq!(report.rows_before, 7);
    assert_eq!(report.rows_after, 6);
    assert_eq!(report.columns_before, 6);
    assert_eq!(report.columns_after, 7);
    assert_eq!(report.steps_applied, 6);
    assert_eq!(report.warnings.len(), 1, "{:?}", report.warnings);
    assert_eq!(report.output_path, output);

    let cleaned = load_dataset(&output, &ImportOptions::default())?;
    let customer = cleaned.column("customer").context("customer column")?;
    assert_eq!(customer.get(0), Some(&CellValue::from("Alice")));

    let region = cleaned.column("region").context("region column")?;
    assert_eq!(
        distinct_values(region),
        vec!["north", "south", "east", "west"]
    );

    let qty = cleaned.column("qty").context("qty column")?;
    assert_eq!(qty.kind(), ColumnType::Integer);
    assert_eq!(qty.get(1), Some(&CellValue::Integer(4)));

    let total = cleaned.column("total").context("total column")?;
    assert_eq!(total.kind(), ColumnType::Float);
    assert_eq!(total.null_count(), 0);
    assert_eq!(total.get(1), Some(&CellValue::Float(48.0)));
    Ok(())
}

#[test]
fn test_pipeline_refuses_to_overwrite() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("existing.csv");
    std::fs::write(&output, "a\n1\n")?;

    let mut spec = PipelineSpec::new("no overwrite")
        .with_step("drop_missing_rows", Vec::<(String, String)>::new());
    spec.output.overwrite = false;

    let err = run_pipeline(
        &spec,
        Path::new("testdata/orders.csv"),
        Some(&output),
        &ImportOptions::default(),
    )
    .err()
    .context("existing output should be refused")?;
    assert!(err.to_string().contains("overwrite is false"));
    Ok(())
}

#[test]
fn test_pipeline_validation_stops_the_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("never.csv");
    let spec = PipelineSpec::new("bad column").with_step("fill_mean", [("column", "discount")]);

    let err = run_pipeline(
        &spec,
        Path::new("testdata/orders.csv"),
        Some(&output),
        &ImportOptions::default(),
    )
    .err()
    .context("validation should fail")?;
    assert!(err.to_string().contains("validation failed"), "{err:#}");
    assert!(!output.exists());
    Ok(())
}
