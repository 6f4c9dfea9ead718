//! Major and minor time columns.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Interval;

/// Identifier of a major column within its axis (insertion index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MajorColumnId(pub usize);

/// Header texts in three widths, chosen by the renderer to fit the space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLabels {
    pub small: String,
    pub medium: String,
    pub large: String,
}

impl ColumnLabels {
    /// Creates labels from the three widths.
    pub fn new(
        small: impl Into<String>,
        medium: impl Into<String>,
        large: impl Into<String>,
    ) -> Self {
        Self {
            small: small.into(),
            medium: medium.into(),
            large: large.into(),
        }
    }

    /// Same text for every width.
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text.clone(), text)
    }
}

/// Fine-grained column (e.g. an hour or a day).
///
/// Immutable once constructed. Covers `[begin_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinorColumn {
    begin_time: NaiveDateTime,
    end_time: NaiveDateTime,
    labels: ColumnLabels,
    tooltip: String,
    major: MajorColumnId,
}

impl MinorColumn {
    pub(crate) fn new(
        interval: Interval,
        labels: ColumnLabels,
        tooltip: String,
        major: MajorColumnId,
    ) -> Self {
        Self {
            begin_time: interval.from(),
            end_time: interval.to(),
            labels,
            tooltip,
            major,
        }
    }

    #[inline]
    pub fn begin_time(&self) -> NaiveDateTime {
        self.begin_time
    }

    #[inline]
    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn labels(&self) -> &ColumnLabels {
        &self.labels
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Parent major column.
    pub fn major(&self) -> MajorColumnId {
        self.major
    }

    /// Whether an instant lies inside this column.
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        time >= self.begin_time && time < self.end_time
    }
}

/// Coarse column (e.g. a day or a month) grouping minor columns.
///
/// Children are only ever appended, through the owning axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorColumn {
    id: MajorColumnId,
    labels: ColumnLabels,
    tooltip: String,
    children: Vec<MinorColumn>,
}

impl MajorColumn {
    pub(crate) fn new(id: MajorColumnId, labels: ColumnLabels, tooltip: String) -> Self {
        Self {
            id,
            labels,
            tooltip,
            children: Vec::new(),
        }
    }

    pub(crate) fn push_child(&mut self, child: MinorColumn) {
        self.children.push(child);
    }

    pub fn id(&self) -> MajorColumnId {
        self.id
    }

    pub fn labels(&self) -> &ColumnLabels {
        &self.labels
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Minor columns in insertion order.
    pub fn children(&self) -> &[MinorColumn] {
        &self.children
    }

    /// Start of the first child, if any.
    pub fn begin_time(&self) -> Option<NaiveDateTime> {
        self.children.first().map(MinorColumn::begin_time)
    }

    /// End of the last child, if any.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.children.last().map(MinorColumn::end_time)
    }
}
