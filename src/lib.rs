//! # datawash
//!
//! Iterative cleaning of tabular datasets. A dataset is loaded from CSV,
//! Excel or Parquet into a typed in-memory model, changed one action at a
//! time through a single dispatcher, and written back out.
//!
//! ## Quick Start
//!
//! ```no_run
//! use datawash::engine;
//! use datawash::io::{ImportOptions, load_dataset, save_dataset};
//! use std::collections::HashMap;
//! use std::path::Path;
//!
//! let ds = load_dataset(Path::new("orders.csv"), &ImportOptions::default())?;
//!
//! let params = HashMap::from([("column".to_owned(), "qty".to_owned())]);
//! let outcome = engine::apply(&ds, "fill_median", &params);
//! println!("{}", outcome.report.summary());
//!
//! save_dataset(&outcome.dataset, Path::new("orders_clean.csv"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`dataset`]: columns with a declared type and typed cells
//! - [`engine`]: action parsing, dispatch and reporting
//! - [`ops`]: the column and row operations behind each action
//! - [`expr`]: the arithmetic expression language of `derive_column`
//! - [`session`]: per-user dataset snapshots behind a store trait
//! - [`io`]: CSV, spreadsheet and Parquet import and export
//! - [`pipeline`]: JSON pipelines of actions, validated and run headlessly
//! - [`profile`]: dataset summaries, distinct values and previews
//! - [`config`], [`logging`], [`error`]: settings, tracing setup, error types
//!
//! Every action takes the current snapshot by reference and returns a new
//! one, so a caller can always keep the previous state.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod expr;
pub mod io;
pub mod logging;
pub mod ops;
pub mod pipeline;
pub mod profile;
pub mod session;
