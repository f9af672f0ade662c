//! `cc-value` — period-aware value generators.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                       |
//! |-------------------|----------------------------------------------------------------|
//! | [`generator`]     | `ValueGenerator` trait, `Contact` trait                        |
//! | [`variate`]       | `VariateGen` trait; `DistGen`, `ShiftedGen`, `ConstantGen`     |
//! | [`constant`]      | `ConstantValueGenerator` — `[period][type]` table of values    |
//! | [`random`]        | `RandomValueGenerator` — `[period][type]` table of generators  |
//! | [`multi_period`]  | `MultiPeriodGen` — one generator per period, cached, converted |
//! | [`params`]        | `GenParams`, `MultiPeriodGenParams` (serde-configurable)       |
//! | [`error`]         | `ValueError`, `ValueResult<T>`                                 |
//!
//! Every generator reads the current period from its `PeriodChangeEvent`
//! at draw time; none of them is a listener.  Contact types outside the
//! table are an indexing panic, not a validated error.

pub mod constant;
pub mod error;
pub mod generator;
pub mod multi_period;
pub mod params;
pub mod random;
pub mod variate;


pub use constant::ConstantValueGenerator;
pub use error::{ValueError, ValueResult};
pub use generator::{Contact, ValueGenerator};
pub use multi_period::MultiPeriodGen;
pub use params::{DistParams, GenParams, MultiPeriodGenParams};
pub use random::RandomValueGenerator;
pub use variate::{ConstantGen, DistGen, ShiftedGen, VariateGen};
