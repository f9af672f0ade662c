//! `cc-measure` — per-period measure matrices and their aggregation.
//!
//! # Crate layout
//!
//! | Module              | Contents                                                     |
//! |---------------------|--------------------------------------------------------------|
//! | [`matrix`]          | `MeasureMatrix`, `RecordMatrix` traits; `SumMatrix`          |
//! | [`integral`]        | `IntegralMeasureMatrix` — records by differencing a total    |
//! | [`non_stationary`]  | `NonStationaryMeasureMatrix` — one record per period         |
//! | [`batch`]           | `BatchMeansMatrices`, `BatchConfig`, `time_normalize`        |
//! | [`replication`]     | `ReplicationMatrices`, `ReplicationLayout`, value extraction |
//! | [`export`]          | CSV output of extracted values                               |
//! | [`error`]           | `MeasureError`, `MeasureResult<T>`                           |
//!
//! # Typical wiring
//!
//! ```text
//! model ──add──▶ SumMatrix (1 column, cumulative)
//!                   │ wrapped by
//!                   ▼
//!          NonStationaryMeasureMatrix ◀── period changes ── PeriodChangeEvent
//!                   │ registered in
//!                   ▼
//!          ReplicationMatrices ──▶ Array2 (measures × main periods [+ all])
//! ```
//!
//! Matrices shared between the model and an aggregator are registered as
//! `Rc<RefCell<M>>` or `Rc<NonStationaryMeasureMatrix<M>>`, both of which
//! implement the matrix traits.

pub mod batch;
pub mod error;
pub mod export;
pub mod integral;
pub mod matrix;
pub mod non_stationary;
pub mod replication;


pub use batch::{BatchConfig, BatchMeansMatrices};
pub use error::{MeasureError, MeasureResult};
pub use export::{replication_column_names, write_matrix_csv, write_matrix_csv_file};
pub use integral::IntegralMeasureMatrix;
pub use matrix::{MeasureMatrix, RecordMatrix, SumMatrix};
pub use non_stationary::NonStationaryMeasureMatrix;
pub use replication::{ReplicationLayout, ReplicationMatrices, replication_values, replication_values_into};
