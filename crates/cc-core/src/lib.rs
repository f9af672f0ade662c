//! `cc-core` — foundational types for the `rust_cc` contact-center simulation core.
//!
//! This crate is a dependency of every other `cc-*` crate.  It has no `cc-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `ContactTypeId`                                            |
//! | [`time`]   | `TimeUnit`, unit conversion                                |
//! | [`rng`]    | `RandomStream` (seeded, resettable, with substreams)       |
//! | [`error`]  | `CcError`, `CcResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CcError, CcResult};
pub use ids::ContactTypeId;
pub use rng::RandomStream;
pub use time::TimeUnit;
