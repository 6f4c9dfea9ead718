//! Two-level time axis.
//!
//! Major columns group minor columns; minor columns are the units the
//! board lays cells out on.
//!
//! # Planning Modes
//!
//! | Mode | Major | Minor |
//! |------|-------|-------|
//! | Intraday | day | fixed interval between first and last hour |
//! | Day | month | day |
//! | Week | month | week (7 days or work days) |
//!
//! Normalized coordinates split `[0, 1]` into one equal segment per
//! minor column, independent of how long each column is.

mod builder;
mod column;
mod label;
mod time_axis;

pub use builder::TimeAxisBuilder;
pub use column::{ColumnLabels, MajorColumn, MajorColumnId, MinorColumn};
pub use label::{DefaultLabelFormatter, LabelFormatter};
pub use time_axis::{ColumnBoundary, TimeAxis};
