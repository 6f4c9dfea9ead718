//! Planning board domain models.
//!
//! Plain data types shared by the axis, the board and the planner.
//!
//! # Domain Mappings
//!
//! | u-planner | Staff planning | Room booking | Workshop |
//! |-----------|----------------|--------------|----------|
//! | Resource | Employee | Room | Machine |
//! | ActivityCell | Shift / Appointment | Reservation | Job slot |
//! | MultiInterval | Availability | Free slots | Idle time |

mod cell;
mod config;
mod interval;

pub use cell::{ActivityCell, BoardId, CellField, CellKey};
pub use config::{BoardConfig, PlanningMode, MAX_INTRADAY_INTERVAL_MS, MIN_INTRADAY_INTERVAL_MS};
pub use interval::{Interval, MultiInterval};
