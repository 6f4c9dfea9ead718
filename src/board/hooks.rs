//! Pluggable collaborators of a board.

use crate::axis::{MinorColumn, TimeAxis};
use crate::error::{HookError, PlannerError};
use crate::models::ActivityCell;

use super::events::BoardEvent;

/// Derives display fields of a cell after insert or update.
pub trait CellDecorator<RI, AI> {
    /// Decorates `cell`. Errors are reported to the board's [`ErrorSink`]
    /// and never interrupt the mutation.
    fn decorate(&self, cell: &mut ActivityCell<RI, AI>, axis: &TimeAxis) -> Result<(), HookError>;
}

impl<RI, AI, F> CellDecorator<RI, AI> for F
where
    F: Fn(&mut ActivityCell<RI, AI>, &TimeAxis) -> Result<(), HookError>,
{
    fn decorate(&self, cell: &mut ActivityCell<RI, AI>, axis: &TimeAxis) -> Result<(), HookError> {
        self(cell, axis)
    }
}

/// Receives hook failures.
pub trait ErrorSink {
    fn report(&self, error: PlannerError);
}

/// Logs every reported error at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, error: PlannerError) {
        log::error!("{error}");
    }
}

/// Host callbacks for user interaction.
pub trait BoardHooks<RI, AI> {
    /// A cell was selected. Clearing the selection does not call this.
    fn cell_selected(&mut self, _cell: &ActivityCell<RI, AI>) -> Result<(), HookError> {
        Ok(())
    }

    /// The user triggered an action on a board position.
    fn cell_action(
        &mut self,
        _resource_id: &RI,
        _column: Option<&MinorColumn>,
        _cell: Option<&ActivityCell<RI, AI>>,
    ) -> Result<(), HookError> {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<RI, AI> BoardHooks<RI, AI> for NoHooks {}

/// Consumer of board events.
pub trait BoardListener<RI, AI> {
    fn on_event(&mut self, event: &BoardEvent<RI, AI>);
}

impl<RI, AI, F> BoardListener<RI, AI> for F
where
    F: FnMut(&BoardEvent<RI, AI>),
{
    fn on_event(&mut self, event: &BoardEvent<RI, AI>) {
        self(event)
    }
}

/// Handle of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);
