//! `cc-kernel` — minimal discrete-event kernel for the rust_cc framework.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`event_list`] | `EventList` (`BTreeMap<EventKey, Action>`), `EventHandle`, `Priority` |
//! | [`sim`]        | `Simulator` (virtual clock + dispatch loop), `Event` trait |
//! | [`toggle`]     | `ToggleElement`, `ToggleEvent`, `SwitchEvent`            |
//! | [`error`]      | `KernelError`, `KernelResult<T>`                         |
//!
//! # Ordering model (summary)
//!
//! Events are dispatched in ascending `(time, priority, seq)` order:
//!
//! ```text
//! time      — virtual time, f64, compared with total ordering
//! priority  — lower runs first among equal times
//! seq       — insertion order among equal (time, priority)
//! ```
//!
//! `Priority::PERIOD_CHANGE` is the reserved minimum: period transitions
//! scheduled at an instant always run before any ordinary event at that
//! instant.  User priorities are clamped out of the reserved band.

pub mod error;
pub mod event_list;
pub mod sim;
pub mod toggle;


pub use error::{KernelError, KernelResult};
pub use event_list::{EventHandle, EventList, Priority};
pub use sim::{Event, Simulator};
pub use toggle::{SwitchEvent, ToggleElement, ToggleEvent};
