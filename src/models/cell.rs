//! Activity cell model.
//!
//! An activity cell is one booking on the planning board: an activity
//! assigned to a resource for a span of time, plus display attributes.
//!
//! # Identity
//!
//! A cell is identified by its [`CellKey`], the pair
//! `(resource_id, activity_id)`. The key is unique within a board.
//! Cells are plain data; the board owns the live instances and callers
//! refer to them by key.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use super::Interval;

/// Identifier requirements for resources and activities.
pub trait BoardId: Clone + Eq + Ord + Hash + Debug {}

impl<T: Clone + Eq + Ord + Hash + Debug> BoardId for T {}

/// Unique key of an activity cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey<RI, AI> {
    /// Owning resource.
    pub resource_id: RI,
    /// Activity on that resource.
    pub activity_id: AI,
}

impl<RI, AI> CellKey<RI, AI> {
    /// Creates a new key.
    pub fn new(resource_id: RI, activity_id: AI) -> Self {
        Self {
            resource_id,
            activity_id,
        }
    }
}

impl<RI: Debug, AI: Debug> Display for CellKey<RI, AI> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.resource_id, self.activity_id)
    }
}

/// A booking of an activity on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCell<RI, AI> {
    /// Resource the activity is booked on.
    pub resource_id: RI,
    /// Activity identifier (unique per resource).
    pub activity_id: AI,
    /// Booking start.
    pub begin_time: Option<NaiveDateTime>,
    /// Booking end (exclusive).
    pub end_time: Option<NaiveDateTime>,
    /// Display text.
    pub text: String,
    /// Tooltip text (set by decoration).
    pub tooltip_text: String,
    /// Icon reference.
    pub icon_id: Option<String>,
    /// Background color (e.g. `"FFCC00"`).
    pub background_color: Option<String>,
    /// Foreground color.
    pub foreground_color: Option<String>,
    /// Primary bar value (0.0..1.0).
    pub major_value: f32,
    /// Secondary bar value (0.0..1.0).
    pub minor_value: f32,
    /// Primary bar color.
    pub major_color: Option<String>,
    /// Secondary bar color.
    pub minor_color: Option<String>,
    /// Domain-specific metadata.
    pub custom_data: HashMap<String, String>,
}

impl<RI, AI> ActivityCell<RI, AI> {
    /// Creates an empty cell for the given resource and activity.
    pub fn new(resource_id: RI, activity_id: AI) -> Self {
        Self {
            resource_id,
            activity_id,
            begin_time: None,
            end_time: None,
            text: String::new(),
            tooltip_text: String::new(),
            icon_id: None,
            background_color: None,
            foreground_color: None,
            major_value: 0.0,
            minor_value: 0.0,
            major_color: None,
            minor_color: None,
            custom_data: HashMap::new(),
        }
    }

    /// Sets the booked time span.
    pub fn with_time(mut self, begin: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.begin_time = Some(begin);
        self.end_time = Some(end);
        self
    }

    /// Sets the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets background and foreground colors.
    pub fn with_colors(mut self, background: impl Into<String>, foreground: impl Into<String>) -> Self {
        self.background_color = Some(background.into());
        self.foreground_color = Some(foreground.into());
        self
    }

    /// Sets major and minor bar values.
    pub fn with_values(mut self, major: f32, minor: f32) -> Self {
        self.major_value = major;
        self.minor_value = minor;
        self
    }

    /// Adds a custom data entry.
    pub fn with_custom_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_data.insert(key.into(), value.into());
        self
    }

    /// Booked span as an interval, if both ends are set and ordered.
    pub fn interval(&self) -> Option<Interval> {
        Interval::new(self.begin_time?, self.end_time?)
    }

    /// Applies a field change.
    ///
    /// Returns `true` if the stored value differs afterwards.
    pub fn apply(&mut self, field: CellField) -> bool {
        fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        }

        match field {
            CellField::BeginTime(v) => replace(&mut self.begin_time, v),
            CellField::EndTime(v) => replace(&mut self.end_time, v),
            CellField::Text(v) => replace(&mut self.text, v),
            CellField::TooltipText(v) => replace(&mut self.tooltip_text, v),
            CellField::IconId(v) => replace(&mut self.icon_id, v),
            CellField::BackgroundColor(v) => replace(&mut self.background_color, v),
            CellField::ForegroundColor(v) => replace(&mut self.foreground_color, v),
            CellField::MajorValue(v) => replace(&mut self.major_value, v),
            CellField::MinorValue(v) => replace(&mut self.minor_value, v),
            CellField::MajorColor(v) => replace(&mut self.major_color, v),
            CellField::MinorColor(v) => replace(&mut self.minor_color, v),
            CellField::CustomData(key, Some(value)) => {
                if self.custom_data.get(&key) == Some(&value) {
                    false
                } else {
                    self.custom_data.insert(key, value);
                    true
                }
            }
            CellField::CustomData(key, None) => self.custom_data.remove(&key).is_some(),
        }
    }
}

impl<RI: Clone, AI: Clone> ActivityCell<RI, AI> {
    /// Key of this cell.
    pub fn key(&self) -> CellKey<RI, AI> {
        CellKey::new(self.resource_id.clone(), self.activity_id.clone())
    }
}

/// A single mutable field of an [`ActivityCell`] with its new value.
///
/// Identity fields (resource and activity id) are not mutable.
#[derive(Debug, Clone, PartialEq)]
pub enum CellField {
    BeginTime(Option<NaiveDateTime>),
    EndTime(Option<NaiveDateTime>),
    Text(String),
    TooltipText(String),
    IconId(Option<String>),
    BackgroundColor(Option<String>),
    ForegroundColor(Option<String>),
    MajorValue(f32),
    MinorValue(f32),
    MajorColor(Option<String>),
    MinorColor(Option<String>),
    /// Sets (`Some`) or removes (`None`) a custom data entry.
    CustomData(String, Option<String>),
}
