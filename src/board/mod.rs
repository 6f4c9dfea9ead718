//! The planning board and its event protocol.
//!
//! # Components
//!
//! - **`Board`**: composition root owning axis, cells and selection
//! - **`ActivityIndex`**: `(resource, activity)` keyed cell store
//! - **`ChangeCoalescer`**: reentrant batch buffer with ordered flush
//! - **Hooks**: decorator, error sink, interaction callbacks, listeners
//!
//! Everything is single-threaded and synchronous. Listeners see events
//! only after the outermost batch closes.

mod activity_board;
mod events;
mod hooks;
mod index;

pub use activity_board::Board;
pub use events::{coalesce, BoardEvent, ChangeCoalescer, EventKind};
pub use hooks::{
    BoardHooks, BoardListener, CellDecorator, ErrorSink, ListenerId, LogErrorSink, NoHooks,
};
pub use index::ActivityIndex;
