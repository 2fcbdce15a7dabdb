//! Versioned JSON pipelines of dispatcher actions.
//!
//! A pipeline replays a recorded cleaning session headlessly: each step is an
//! action id plus its parameters, exactly as they would be passed to
//! [`crate::engine::apply`].
//!
//! ```no_run
//! use datawash::io::ImportOptions;
//! use datawash::pipeline::{PipelineSpec, run_pipeline};
//! use std::path::Path;
//!
//! let spec = PipelineSpec::new("orders")
//!     .with_step("normalize_trim", [("column", "customer")])
//!     .with_step("fill_median", [("column", "qty")])
//!     .with_step("drop_duplicate_rows", [("subset", "order_id")]);
//!
//! let report = run_pipeline(
//!     &spec,
//!     Path::new("orders.csv"),
//!     Some(Path::new("orders_clean.parquet")),
//!     &ImportOptions::default(),
//! )?;
//! println!("{}", report.summary());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod executor;
pub mod spec;
pub mod validation;

pub use executor::{RunReport, StepsOutcome, execute_steps, run_pipeline};
pub use spec::{OutputConfig, PipelineSpec, SPEC_VERSION, Step};
pub use validation::{ValidationError, validate_pipeline};
