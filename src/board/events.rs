//! Board events and batch coalescing.
//!
//! # Modes
//!
//! Outside a batch every change is delivered immediately. Inside a batch
//! (depth > 0) changes are buffered; when the outermost batch closes the
//! buffer is coalesced into at most one event per kind and delivered in
//! a fixed order:
//!
//! | Order | Kind | Coalescing |
//! |-------|------|------------|
//! | 1 | all activities deleted | last wins |
//! | 2 | activities inserted | union of cells |
//! | 3 | activities deleted | union of cells |
//! | 4 | activities updated | union of cells, minus inserted cells |
//! | 5 | cell action | last wins |
//! | 6 | edit / new popup | last wins |
//! | - | anything else | last wins, sorted before all of the above by negative code |
//!
//! A cell inserted and then updated in the same batch is reported by the
//! insert event alone.

use std::collections::{BTreeMap, HashSet};

use crate::axis::MinorColumn;
use crate::models::{ActivityCell, BoardId, CellKey};

/// Type of a board event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AllActivitiesDeleted,
    ActivitiesInserted,
    ActivitiesDeleted,
    ActivitiesUpdated,
    CellAction,
    EditActivityPopup,
    NewActivityPopup,
    TimeAxisChanged,
    SelectionChanged,
    /// Host-defined event type.
    Custom(i32),
}

impl EventKind {
    /// Numeric type code.
    pub fn code(&self) -> i32 {
        match self {
            EventKind::ActivitiesInserted => 100,
            EventKind::ActivitiesUpdated => 101,
            EventKind::ActivitiesDeleted => 102,
            EventKind::AllActivitiesDeleted => 103,
            EventKind::CellAction => 104,
            EventKind::EditActivityPopup => 105,
            EventKind::NewActivityPopup => 106,
            EventKind::TimeAxisChanged => 200,
            EventKind::SelectionChanged => 201,
            EventKind::Custom(code) => *code,
        }
    }

    /// Position in a flushed batch (ascending).
    fn flush_rank(&self) -> i64 {
        match self {
            EventKind::AllActivitiesDeleted => 10,
            EventKind::ActivitiesInserted => 20,
            EventKind::ActivitiesDeleted => 30,
            EventKind::ActivitiesUpdated => 40,
            EventKind::CellAction => 50,
            EventKind::EditActivityPopup => 70,
            EventKind::NewActivityPopup => 80,
            other => -i64::from(other.code()),
        }
    }

    /// Whether buffered events of this kind merge their cells.
    fn merges_cells(&self) -> bool {
        matches!(
            self,
            EventKind::ActivitiesInserted
                | EventKind::ActivitiesDeleted
                | EventKind::ActivitiesUpdated
        )
    }
}

/// A change notification.
///
/// Payload cells are snapshots; listeners must go through the board to
/// change anything.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardEvent<RI, AI> {
    /// Event type.
    pub kind: EventKind,
    /// Affected cells (insert/update/delete, popups, cell actions).
    pub cells: Vec<ActivityCell<RI, AI>>,
    /// Resource of a cell action.
    pub resource_id: Option<RI>,
    /// Column of a cell action.
    pub column: Option<MinorColumn>,
}

impl<RI, AI> BoardEvent<RI, AI> {
    /// Creates an event without payload.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            cells: Vec::new(),
            resource_id: None,
            column: None,
        }
    }

    /// Creates an event carrying cells.
    pub fn with_cells(kind: EventKind, cells: Vec<ActivityCell<RI, AI>>) -> Self {
        Self {
            cells,
            ..Self::new(kind)
        }
    }

    /// Creates a cell-action event.
    pub fn cell_action(
        resource_id: RI,
        column: Option<MinorColumn>,
        cell: Option<ActivityCell<RI, AI>>,
    ) -> Self {
        Self {
            kind: EventKind::CellAction,
            cells: cell.into_iter().collect(),
            resource_id: Some(resource_id),
            column,
        }
    }

    /// Number of payload cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl<RI: BoardId, AI: BoardId> BoardEvent<RI, AI> {
    /// Keys of the payload cells.
    pub fn keys(&self) -> Vec<CellKey<RI, AI>> {
        self.cells.iter().map(ActivityCell::key).collect()
    }
}

/// Reentrant batch buffer.
///
/// `begin`/`end` calls nest; only the outermost `end` releases events.
#[derive(Debug, Clone)]
pub struct ChangeCoalescer<RI, AI> {
    depth: usize,
    buffer: Vec<BoardEvent<RI, AI>>,
}

impl<RI, AI> Default for ChangeCoalescer<RI, AI> {
    fn default() -> Self {
        Self {
            depth: 0,
            buffer: Vec::new(),
        }
    }
}

impl<RI: BoardId, AI: BoardId> ChangeCoalescer<RI, AI> {
    /// Creates an idle coalescer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current batch depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether a batch is open.
    pub fn is_changing(&self) -> bool {
        self.depth > 0
    }

    /// Number of buffered events.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Opens a (possibly nested) batch.
    pub fn begin(&mut self) {
        self.depth += 1;
    }

    /// Closes a batch.
    ///
    /// Returns the coalesced events when the outermost batch closes,
    /// `None` otherwise. An unbalanced call is logged and ignored.
    pub fn end(&mut self) -> Option<Vec<BoardEvent<RI, AI>>> {
        match self.depth {
            0 => {
                log::warn!("batch end without matching begin ignored");
                None
            }
            1 => {
                self.depth = 0;
                let buffered = std::mem::take(&mut self.buffer);
                log::debug!("flushing {} buffered board events", buffered.len());
                Some(coalesce(buffered))
            }
            _ => {
                self.depth -= 1;
                None
            }
        }
    }

    /// Routes a change.
    ///
    /// Outside a batch the event is handed back for immediate delivery;
    /// inside a batch it is buffered and `None` is returned.
    pub fn submit(&mut self, event: BoardEvent<RI, AI>) -> Option<BoardEvent<RI, AI>> {
        if self.is_changing() {
            self.buffer.push(event);
            None
        } else {
            Some(event)
        }
    }
}

/// Coalesces buffered events into delivery order.
pub fn coalesce<RI: BoardId, AI: BoardId>(
    events: Vec<BoardEvent<RI, AI>>,
) -> Vec<BoardEvent<RI, AI>> {
    let mut sorted: BTreeMap<(i64, i32), BoardEvent<RI, AI>> = BTreeMap::new();
    for event in events {
        let slot = (event.kind.flush_rank(), event.kind.code());
        match sorted.get_mut(&slot) {
            Some(existing) if event.kind.merges_cells() => merge_cells(&mut existing.cells, event.cells),
            _ => {
                // last wins
                sorted.insert(slot, event);
            }
        }
    }

    let inserted: HashSet<CellKey<RI, AI>> = sorted
        .values()
        .find(|e| e.kind == EventKind::ActivitiesInserted)
        .map(|e| e.keys().into_iter().collect())
        .unwrap_or_default();

    sorted
        .into_values()
        .filter_map(|mut event| {
            if event.kind == EventKind::ActivitiesUpdated && !inserted.is_empty() {
                event.cells.retain(|c| !inserted.contains(&c.key()));
                if event.cells.is_empty() {
                    return None;
                }
            }
            Some(event)
        })
        .collect()
}

/// Unions `more` into `cells` by key; later snapshots replace earlier ones in place.
fn merge_cells<RI: BoardId, AI: BoardId>(
    cells: &mut Vec<ActivityCell<RI, AI>>,
    more: Vec<ActivityCell<RI, AI>>,
) {
    for cell in more {
        let key = cell.key();
        match cells.iter_mut().find(|c| c.key() == key) {
            Some(existing) => *existing = cell,
            None => cells.push(cell),
        }
    }
}
