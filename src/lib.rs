//! Resource-activity planning board.
//!
//! Lays out bookable activities for a set of resources against a
//! two-level time axis and finds free slots for new bookings. UI-agnostic:
//! rendering, menus and localized labels are supplied by the host.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Interval`, `MultiInterval`, `ActivityCell`,
//!   `CellKey`, `BoardConfig`
//! - **`axis`**: Two-level time axis, its builder and label formatting
//! - **`board`**: `Board`, the activity index, batching and events
//! - **`planning`**: Free-slot search and scoring
//! - **`validation`**: Configuration checks
//! - **`error`**: `PlannerError`
//!
//! # Architecture
//!
//! Single-threaded and synchronous. The board owns all state; callers
//! refer to cells by key and observe changes through listeners.

pub mod axis;
pub mod board;
pub mod error;
pub mod models;
pub mod planning;
pub mod validation;

pub use error::{PlannerError, PlannerResult};
