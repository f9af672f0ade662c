//! `cc-period` — the period-change clock for the rust_cc framework.
//!
//! # Periods
//!
//! ```text
//! 0        preliminary — before the center opens
//! 1..=P    main periods — the center is open
//! P+1      wrap-up — no new arrivals, in-progress work finishes
//! ```
//!
//! # Protocol (summary)
//!
//! ```text
//! pce.init(&mut sim)     current = period(now); cancel pending; unlock
//! pce.start(&mut sim)    schedule one transition per remaining boundary
//!   … boundary t_i …     current += 1; notify listeners in order
//! pce.stop(&mut sim)     cancel pending; record stop time; notify stop
//! ```
//!
//! [`PeriodChangeEvent::set_current_period`] forces a period and locks the
//! clock until the next `init`; listeners are still notified.
//!
//! # Cargo features
//!
//! | Feature | Effect                                   |
//! |---------|------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on `PeriodConfig` |

pub mod config;
pub mod error;
pub mod event;
pub mod listener;

#[cfg(test)]
mod tests;

pub use config::PeriodConfig;
pub use error::{PeriodError, PeriodResult};
pub use event::PeriodChangeEvent;
pub use listener::PeriodChangeListener;
