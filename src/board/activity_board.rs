//! The planning board.
//!
//! [`Board`] owns the time axis, the activity index and the selection, and
//! routes every change through a [`ChangeCoalescer`] to its listeners.
//!
//! # Batches
//!
//! ```text
//! set_changing(true)            depth 0 -> 1   events start buffering
//!   set_days / add cells / ...  axis marked dirty, events buffered
//! set_changing(false)           depth 1 -> 0   axis rebuilt once, batch flushed
//! ```
//!
//! Mutations outside a batch rebuild the axis and deliver their event
//! immediately.

use std::collections::BTreeSet;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;

use super::events::{BoardEvent, ChangeCoalescer, EventKind};
use super::hooks::{
    BoardHooks, BoardListener, CellDecorator, ErrorSink, ListenerId, LogErrorSink, NoHooks,
};
use super::index::ActivityIndex;
use crate::axis::{DefaultLabelFormatter, LabelFormatter, TimeAxis, TimeAxisBuilder};
use crate::error::{PlannerError, PlannerResult};
use crate::models::{
    ActivityCell, BoardConfig, BoardId, CellField, CellKey, Interval, MultiInterval, PlanningMode,
    MAX_INTRADAY_INTERVAL_MS, MIN_INTRADAY_INTERVAL_MS,
};
use crate::planning::{candidate_window, PlanRequest, PlannedSlot, SlotFinder};
use crate::validation::validate_config;

/// Resource × time planning board.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_planner::board::Board;
/// use u_planner::models::{ActivityCell, BoardConfig};
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// let mut board: Board<&str, u32> = Board::new(BoardConfig::new().with_days([day])).unwrap();
/// board.set_resource_ids(["R1"]);
/// board.add_activity_cells([ActivityCell::new("R1", 1)
///     .with_time(day.and_hms_opt(9, 0, 0).unwrap(), day.and_hms_opt(10, 0, 0).unwrap())]);
///
/// assert_eq!(board.activity_cells_for(&"R1").len(), 1);
/// assert_eq!(board.time_axis().column_count(), 18);
/// ```
pub struct Board<RI, AI> {
    config: BoardConfig,
    axis: TimeAxis,
    axis_dirty: bool,
    index: ActivityIndex<RI, AI>,
    resource_ids: Vec<RI>,
    selected_resource_ids: Vec<RI>,
    selected_cell: Option<CellKey<RI, AI>>,
    selected_begin: Option<NaiveDateTime>,
    selected_end: Option<NaiveDateTime>,
    coalescer: ChangeCoalescer<RI, AI>,
    listeners: Vec<(ListenerId, Box<dyn BoardListener<RI, AI>>)>,
    next_listener: u64,
    decorator: Option<Box<dyn CellDecorator<RI, AI>>>,
    formatter: Box<dyn LabelFormatter>,
    error_sink: Box<dyn ErrorSink>,
    hooks: Box<dyn BoardHooks<RI, AI>>,
}

impl<RI: BoardId, AI: BoardId> Board<RI, AI> {
    /// Creates a board from a validated configuration.
    ///
    /// # Errors
    /// [`PlannerError::InvalidConfig`] listing every problem found.
    pub fn new(config: BoardConfig) -> PlannerResult<Self> {
        validate_config(&config).map_err(PlannerError::InvalidConfig)?;
        let axis = TimeAxisBuilder::from_config(&config, &DefaultLabelFormatter).build()?;
        Ok(Self {
            config,
            axis,
            axis_dirty: false,
            index: ActivityIndex::new(),
            resource_ids: Vec::new(),
            selected_resource_ids: Vec::new(),
            selected_cell: None,
            selected_begin: None,
            selected_end: None,
            coalescer: ChangeCoalescer::new(),
            listeners: Vec::new(),
            next_listener: 0,
            decorator: None,
            formatter: Box::new(DefaultLabelFormatter),
            error_sink: Box::new(LogErrorSink),
            hooks: Box::new(NoHooks),
        })
    }

    /// Sets the cell decorator run after every insert and update.
    pub fn with_decorator(mut self, decorator: impl CellDecorator<RI, AI> + 'static) -> Self {
        self.decorator = Some(Box::new(decorator));
        self
    }

    /// Sets the receiver of hook failures.
    pub fn with_error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.error_sink = Box::new(sink);
        self
    }

    /// Sets the label formatter and rebuilds the axis with it.
    pub fn with_label_formatter(mut self, formatter: impl LabelFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self.invalidate_time_axis();
        self
    }

    /// Sets the interaction callbacks.
    pub fn with_hooks(mut self, hooks: impl BoardHooks<RI, AI> + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    // ---- listeners ----

    /// Registers a listener.
    pub fn add_listener(&mut self, listener: impl BoardListener<RI, AI> + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregisters a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    // ---- batching ----

    /// Whether a batch is open.
    pub fn is_changing(&self) -> bool {
        self.coalescer.is_changing()
    }

    /// Opens (`true`) or closes (`false`) a batch. Calls nest.
    ///
    /// Closing the outermost batch rebuilds a dirty axis and flushes the
    /// coalesced events.
    pub fn set_changing(&mut self, changing: bool) {
        if changing {
            self.coalescer.begin();
            return;
        }
        if self.coalescer.depth() == 1 {
            self.validate_time_axis();
        }
        if let Some(events) = self.coalescer.end() {
            self.fire_batch(events);
        }
    }

    /// Runs `f` inside a batch.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.set_changing(true);
        let result = f(self);
        self.set_changing(false);
        result
    }

    /// Emits a host-defined event.
    pub fn fire_custom_event(&mut self, code: i32) {
        self.emit(BoardEvent::new(EventKind::Custom(code)));
    }

    // ---- configuration ----

    /// Current configuration.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// The time axis.
    ///
    /// Inside a batch this is the axis as of the last rebuild.
    pub fn time_axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn planning_mode(&self) -> PlanningMode {
        self.config.planning_mode
    }

    pub fn set_planning_mode(&mut self, mode: PlanningMode) {
        if self.config.planning_mode != mode {
            self.config.planning_mode = mode;
            self.invalidate_time_axis();
        }
    }

    /// Sets the first visible hour (0..=23, not after the last hour).
    pub fn set_first_hour_of_day(&mut self, hour: u32) -> PlannerResult<()> {
        self.set_hours(hour, self.config.last_hour_of_day)
    }

    /// Sets the last visible hour (0..=23, inclusive, not before the first hour).
    pub fn set_last_hour_of_day(&mut self, hour: u32) -> PlannerResult<()> {
        self.set_hours(self.config.first_hour_of_day, hour)
    }

    /// Sets both visible hours at once.
    ///
    /// # Errors
    /// [`PlannerError::InvalidHourOfDay`] outside 0..=23,
    /// [`PlannerError::HourOrder`] when `first > last`. The config is left
    /// unchanged on error.
    pub fn set_hours(&mut self, first: u32, last: u32) -> PlannerResult<()> {
        check_hour(first)?;
        check_hour(last)?;
        if first > last {
            return Err(PlannerError::HourOrder { first, last });
        }
        if self.config.first_hour_of_day != first || self.config.last_hour_of_day != last {
            self.config.first_hour_of_day = first;
            self.config.last_hour_of_day = last;
            self.invalidate_time_axis();
        }
        Ok(())
    }

    /// Sets the intraday column width.
    ///
    /// # Errors
    /// [`PlannerError::InvalidIntradayInterval`] outside 15 minutes ..= 24 hours.
    pub fn set_intraday_interval(&mut self, interval_ms: i64) -> PlannerResult<()> {
        if !(MIN_INTRADAY_INTERVAL_MS..=MAX_INTRADAY_INTERVAL_MS).contains(&interval_ms) {
            return Err(PlannerError::InvalidIntradayInterval(interval_ms));
        }
        if self.config.intraday_interval_ms != interval_ms {
            self.config.intraday_interval_ms = interval_ms;
            self.invalidate_time_axis();
        }
        Ok(())
    }

    /// Sets the intraday column width in minutes.
    pub fn set_intraday_interval_minutes(&mut self, minutes: i64) -> PlannerResult<()> {
        self.set_intraday_interval(minutes.saturating_mul(60_000))
    }

    /// Sets the number of days per week column in work-days mode (1..=6).
    pub fn set_work_day_count(&mut self, count: u32) -> PlannerResult<()> {
        if !(1..=6).contains(&count) {
            return Err(PlannerError::InvalidWorkDayCount(count));
        }
        if self.config.work_day_count != count {
            self.config.work_day_count = count;
            self.invalidate_time_axis();
        }
        Ok(())
    }

    pub fn set_work_days_only(&mut self, only: bool) {
        if self.config.work_days_only != only {
            self.config.work_days_only = only;
            self.invalidate_time_axis();
        }
    }

    // ---- days ----

    /// Selected days, ascending.
    pub fn days(&self) -> &BTreeSet<NaiveDate> {
        &self.config.days
    }

    /// Replaces the selected days.
    pub fn set_days(&mut self, days: impl IntoIterator<Item = NaiveDate>) {
        self.set_days_internal(days.into_iter().collect());
    }

    /// Selects a single day.
    pub fn set_day(&mut self, day: NaiveDate) {
        self.set_days_internal(BTreeSet::from([day]));
    }

    pub fn add_day(&mut self, day: NaiveDate) {
        let mut days = self.config.days.clone();
        days.insert(day);
        self.set_days_internal(days);
    }

    pub fn remove_day(&mut self, day: NaiveDate) {
        let mut days = self.config.days.clone();
        days.remove(&day);
        self.set_days_internal(days);
    }

    fn set_days_internal(&mut self, days: BTreeSet<NaiveDate>) {
        if self.config.days != days {
            self.config.days = days;
            self.invalidate_time_axis();
        }
    }

    /// Start of the visible range.
    ///
    /// First selected day (today if none) at the first hour in intraday
    /// mode, at midnight otherwise.
    pub fn begin_time(&self) -> NaiveDateTime {
        let day = self
            .config
            .days
            .first()
            .copied()
            .unwrap_or_else(|| Local::now().date_naive());
        match self.config.planning_mode {
            PlanningMode::Intraday => at_hour(day, self.config.first_hour_of_day),
            PlanningMode::Day | PlanningMode::Week => day.and_time(NaiveTime::MIN),
        }
    }

    /// End of the visible range.
    ///
    /// Last selected day (today if none) at the last hour in intraday
    /// mode, plus one day in day mode, plus seven days in week mode.
    pub fn end_time(&self) -> NaiveDateTime {
        let day = self
            .config
            .days
            .last()
            .copied()
            .unwrap_or_else(|| Local::now().date_naive());
        let midnight = day.and_time(NaiveTime::MIN);
        match self.config.planning_mode {
            PlanningMode::Intraday => at_hour(day, self.config.last_hour_of_day),
            PlanningMode::Day => saturating_add(midnight, Duration::days(1)),
            PlanningMode::Week => saturating_add(midnight, Duration::days(7)),
        }
    }

    // ---- resources ----

    /// Resource rows, in display order.
    pub fn resource_ids(&self) -> &[RI] {
        &self.resource_ids
    }

    /// Replaces the resource rows.
    ///
    /// Cells of resources that are no longer present are removed and all
    /// remaining cells are re-decorated, in one batch.
    pub fn set_resource_ids(&mut self, ids: impl IntoIterator<Item = RI>) {
        let ids = dedup(ids);
        let eliminated: Vec<RI> = self
            .resource_ids
            .iter()
            .filter(|r| !ids.contains(r))
            .cloned()
            .collect();
        self.batch(|board| {
            board.resource_ids = ids;
            board.remove_activity_cells_for(&eliminated);
            let all = board.index.keys();
            board.update_resolved(all);
        });
    }

    // ---- cells ----

    /// The cell store.
    pub fn index(&self) -> &ActivityIndex<RI, AI> {
        &self.index
    }

    pub fn activity_cell(&self, key: &CellKey<RI, AI>) -> Option<&ActivityCell<RI, AI>> {
        self.index.get(key)
    }

    /// Live cell with the same key as a possibly stale copy.
    pub fn resolve_activity_cell(&self, cell: &ActivityCell<RI, AI>) -> Option<&ActivityCell<RI, AI>> {
        self.index.resolve(cell)
    }

    /// Cells of one resource, in insertion order.
    pub fn activity_cells_for(&self, resource_id: &RI) -> Vec<&ActivityCell<RI, AI>> {
        self.index.cells_for(resource_id).collect()
    }

    /// All cells, by resource.
    pub fn all_activity_cells(&self) -> Vec<&ActivityCell<RI, AI>> {
        self.index.cells().collect()
    }

    /// Adds cells whose key is not taken yet; others are skipped.
    ///
    /// Returns the keys of the added cells.
    pub fn add_activity_cells(
        &mut self,
        cells: impl IntoIterator<Item = ActivityCell<RI, AI>>,
    ) -> Vec<CellKey<RI, AI>> {
        let mut added = Vec::new();
        for cell in cells {
            if let Some(key) = self.index.insert(cell) {
                self.decorate(&key);
                added.push(key);
            }
        }
        debug_assert!(self.index.check_consistency());
        if !added.is_empty() {
            let snapshot = self.snapshot(&added);
            self.emit(BoardEvent::with_cells(EventKind::ActivitiesInserted, snapshot));
        }
        added
    }

    /// Re-decorates cells and reports them as updated. Unknown keys are dropped.
    pub fn update_activity_cells(&mut self, keys: impl IntoIterator<Item = CellKey<RI, AI>>) {
        let resolved = self.index.resolve_many(keys);
        self.update_resolved(resolved);
    }

    /// Re-decorates and reports all cells of the given resources.
    pub fn update_activity_cells_for(&mut self, resource_ids: &[RI]) {
        let keys = self.index.keys_for_all(resource_ids);
        self.update_resolved(keys);
    }

    fn update_resolved(&mut self, keys: Vec<CellKey<RI, AI>>) {
        if keys.is_empty() {
            return;
        }
        for key in &keys {
            self.decorate(key);
        }
        let snapshot = self.snapshot(&keys);
        self.emit(BoardEvent::with_cells(EventKind::ActivitiesUpdated, snapshot));
    }

    /// Removes cells. Unknown keys are dropped.
    pub fn remove_activity_cells(&mut self, keys: impl IntoIterator<Item = CellKey<RI, AI>>) {
        let resolved = self.index.resolve_many(keys);
        self.remove_resolved(resolved);
    }

    /// Removes all cells of the given resources.
    pub fn remove_activity_cells_for(&mut self, resource_ids: &[RI]) {
        let keys = self.index.keys_for_all(resource_ids);
        self.remove_resolved(keys);
    }

    fn remove_resolved(&mut self, keys: Vec<CellKey<RI, AI>>) {
        let removed: Vec<ActivityCell<RI, AI>> =
            keys.iter().filter_map(|k| self.index.remove(k)).collect();
        debug_assert!(self.index.check_consistency());
        if removed.is_empty() {
            return;
        }
        if self
            .selected_cell
            .as_ref()
            .is_some_and(|sel| keys.contains(sel))
        {
            self.clear_selected_cell();
        }
        self.emit(BoardEvent::with_cells(EventKind::ActivitiesDeleted, removed));
    }

    /// Removes every cell with a single "all deleted" event.
    pub fn remove_all_activity_cells(&mut self) {
        if self.index.is_empty() {
            return;
        }
        let removed = self.index.clear();
        if self.selected_cell.is_some() {
            self.clear_selected_cell();
        }
        self.emit(BoardEvent::with_cells(EventKind::AllActivitiesDeleted, removed));
    }

    /// Changes one field of a live cell.
    ///
    /// Emits an update only if the value changed. Returns whether it did.
    pub fn set_cell_field(&mut self, key: &CellKey<RI, AI>, field: CellField) -> bool {
        match self.index.set_field(key, field) {
            Some(true) => {
                let snapshot = self.snapshot(std::slice::from_ref(key));
                self.emit(BoardEvent::with_cells(EventKind::ActivitiesUpdated, snapshot));
                true
            }
            Some(false) => false,
            None => {
                log::warn!("could not resolve activity cell {key}");
                false
            }
        }
    }

    // ---- selection ----

    pub fn selected_resource_ids(&self) -> &[RI] {
        &self.selected_resource_ids
    }

    pub fn is_selected_resource_id(&self, resource_id: &RI) -> bool {
        self.selected_resource_ids.contains(resource_id)
    }

    /// Sets the selected resources.
    ///
    /// The selected cell is kept only if exactly one resource is selected
    /// and it owns the cell.
    pub fn set_selected_resource_ids(&mut self, ids: impl IntoIterator<Item = RI>) {
        let ids = dedup(ids);
        self.batch(|board| {
            if board.selected_resource_ids != ids {
                board.selected_resource_ids = ids;
                board.emit(BoardEvent::new(EventKind::SelectionChanged));
            }
            let owned = match (&board.selected_cell, board.selected_resource_ids.as_slice()) {
                (Some(key), [only]) => key.resource_id == *only,
                _ => false,
            };
            if board.selected_cell.is_some() && !owned {
                board.clear_selected_cell();
            }
        });
    }

    /// The selected cell, always live.
    pub fn selected_activity_cell(&self) -> Option<&ActivityCell<RI, AI>> {
        self.selected_cell.as_ref().and_then(|k| self.index.get(k))
    }

    /// Selects a cell by key. An unknown key clears the selection.
    pub fn set_selected_activity_cell(&mut self, key: Option<CellKey<RI, AI>>) {
        let resolved = match key {
            Some(key) if self.index.contains(&key) => Some(key),
            Some(key) => {
                log::warn!("could not resolve activity cell {key}");
                None
            }
            None => None,
        };
        if self.selected_cell == resolved {
            return;
        }
        self.selected_cell = resolved;
        if let Some(cell) = self.selected_activity_cell().cloned() {
            if let Err(source) = self.hooks.cell_selected(&cell) {
                self.error_sink.report(PlannerError::Hook {
                    hook: "cell_selected",
                    source,
                });
            }
        }
        self.emit(BoardEvent::new(EventKind::SelectionChanged));
    }

    fn clear_selected_cell(&mut self) {
        self.set_selected_activity_cell(None);
    }

    pub fn selected_begin_time(&self) -> Option<NaiveDateTime> {
        self.selected_begin
    }

    pub fn selected_end_time(&self) -> Option<NaiveDateTime> {
        self.selected_end
    }

    /// Sets the selected time range.
    ///
    /// When exactly one resource is selected, its cell spanning exactly
    /// `[begin, end)` becomes the selected cell. Any other change clears
    /// the selected cell.
    pub fn set_selected_time(&mut self, begin: Option<NaiveDateTime>, end: Option<NaiveDateTime>) {
        self.batch(|board| {
            if board.selected_begin == begin && board.selected_end == end {
                return;
            }
            board.selected_begin = begin;
            board.selected_end = end;
            board.emit(BoardEvent::new(EventKind::SelectionChanged));
            let matching = match (board.selected_resource_ids.as_slice(), begin, end) {
                ([only], Some(_), Some(_)) => board
                    .index
                    .cells_for(only)
                    .find(|c| c.begin_time == begin && c.end_time == end)
                    .map(ActivityCell::key),
                _ => None,
            };
            board.set_selected_activity_cell(matching);
        });
    }

    /// Selects resources and the columns under a normalized range.
    ///
    /// The range ends are moved half a column inwards before lookup, so
    /// a range `[i/n, (j+1)/n]` selects exactly columns `i..=j`.
    pub fn set_selection_from_range(
        &mut self,
        resource_ids: impl IntoIterator<Item = RI>,
        range: Option<[f64; 2]>,
    ) {
        self.batch(|board| {
            board.set_selected_resource_ids(resource_ids);
            let (begin, end) = match range {
                Some([r0, r1]) if !board.axis.is_empty() => {
                    let cell_center = 1.0 / board.axis.column_count() as f64 / 2.0;
                    (
                        board.axis.location_to_column(r0 + cell_center).map(|c| c.begin_time()),
                        board.axis.location_to_column(r1 - cell_center).map(|c| c.end_time()),
                    )
                }
                _ => (None, None),
            };
            board.set_selected_time(begin, end);
        });
    }

    // ---- interaction ----

    /// Triggers a cell action at a board position.
    pub fn fire_cell_action(
        &mut self,
        resource_id: RI,
        range: [f64; 2],
        cell: Option<CellKey<RI, AI>>,
    ) {
        if cell.is_some() {
            self.set_selected_activity_cell(cell.clone());
        }
        let column = self
            .axis
            .location_to_column((range[0] + range[1]) / 2.0)
            .cloned();
        let cell = cell.and_then(|k| self.index.get(&k).cloned());
        if let Err(source) = self
            .hooks
            .cell_action(&resource_id, column.as_ref(), cell.as_ref())
        {
            self.error_sink.report(PlannerError::Hook {
                hook: "cell_action",
                source,
            });
        }
        self.emit(BoardEvent::cell_action(resource_id, column, cell));
    }

    /// Requests the edit popup for the selected cell.
    pub fn request_edit_popup(&mut self) {
        let cells = self.selected_activity_cell().cloned().into_iter().collect();
        self.emit(BoardEvent::with_cells(EventKind::EditActivityPopup, cells));
    }

    /// Requests the popup for creating a new activity.
    pub fn request_new_popup(&mut self) {
        self.emit(BoardEvent::new(EventKind::NewActivityPopup));
    }

    // ---- planning ----

    /// Visible hours of all selected days, clipped to `[earliest, latest)`.
    pub fn calculate_selected_time_ranges(
        &self,
        earliest: NaiveDateTime,
        latest: NaiveDateTime,
    ) -> MultiInterval {
        candidate_window(
            &self.config.days,
            self.config.first_hour_of_day,
            self.config.last_hour_of_day,
            earliest,
            latest,
        )
    }

    /// Plans a slot for the selected resources and selects it.
    pub fn plan_activity(&mut self, request: &PlanRequest) -> Option<PlannedSlot<RI>> {
        self.plan_activity_with_rng(request, &mut rand::rng())
    }

    /// [`plan_activity`](Self::plan_activity) with a caller-supplied random source.
    ///
    /// Without any candidate time the selection is left as is. Otherwise
    /// the selected time is cleared before the search. In single-match mode
    /// the resource selection is narrowed to the chosen resource.
    pub fn plan_activity_with_rng<R: Rng>(
        &mut self,
        request: &PlanRequest,
        rng: &mut R,
    ) -> Option<PlannedSlot<RI>> {
        let (earliest, latest, preferred_ms) = request.resolve(Local::now().naive_local());
        self.batch(|board| {
            let window = board.calculate_selected_time_ranges(earliest, latest);
            if window.is_empty() {
                log::debug!("no candidate time between {earliest} and {latest}");
                return None;
            }
            board.set_selected_time(None, None);
            let finder = SlotFinder::new(window, preferred_ms);

            let slot = if request.single_match {
                let resources: Vec<(RI, Vec<Interval>)> = board
                    .selected_resource_ids
                    .iter()
                    .map(|r| (r.clone(), board.bookings_of(r)))
                    .collect();
                finder.find_single(&resources, request.tie_break, rng)?
            } else {
                let bookings: Vec<Interval> = board
                    .selected_resource_ids
                    .iter()
                    .flat_map(|r| board.bookings_of(r))
                    .collect();
                finder.find_multi(bookings)?
            };

            if let Some(resource_id) = &slot.resource_id {
                board.set_selected_resource_ids([resource_id.clone()]);
            }
            board.set_selected_time(Some(slot.range.from()), Some(slot.range.to()));
            Some(slot)
        })
    }

    fn bookings_of(&self, resource_id: &RI) -> Vec<Interval> {
        self.index
            .cells_for(resource_id)
            .filter_map(ActivityCell::interval)
            .collect()
    }

    // ---- internals ----

    fn snapshot(&self, keys: &[CellKey<RI, AI>]) -> Vec<ActivityCell<RI, AI>> {
        keys.iter().filter_map(|k| self.index.get(k).cloned()).collect()
    }

    /// Built-in tooltip, then the pluggable decorator.
    fn decorate(&mut self, key: &CellKey<RI, AI>) {
        let mode = self.config.planning_mode;
        let Some(cell) = self.index.get_mut(key) else {
            return;
        };
        if let Some(begin) = cell.begin_time {
            let from = self.formatter.format_time(mode, begin);
            let to = cell
                .end_time
                .map(|end| self.formatter.format_time(mode, end))
                .unwrap_or_else(|| from.clone());
            cell.tooltip_text = if from == to { from } else { format!("{from} - {to}") };
        }
        if let Some(decorator) = &self.decorator {
            if let Err(source) = decorator.decorate(cell, &self.axis) {
                self.error_sink.report(PlannerError::Decoration {
                    cell: key.to_string(),
                    source,
                });
            }
        }
    }

    fn invalidate_time_axis(&mut self) {
        self.axis_dirty = true;
        if !self.is_changing() {
            self.validate_time_axis();
        }
    }

    /// Rebuilds a dirty axis and re-decorates every cell against it.
    fn validate_time_axis(&mut self) {
        if !self.axis_dirty {
            return;
        }
        self.axis_dirty = false;
        let built = TimeAxisBuilder::from_config(&self.config, self.formatter.as_ref()).build();
        match built {
            Ok(axis) => {
                self.axis = axis;
                for key in self.index.keys() {
                    self.decorate(&key);
                }
                self.emit(BoardEvent::new(EventKind::TimeAxisChanged));
            }
            Err(e) => self.error_sink.report(e),
        }
    }

    fn emit(&mut self, event: BoardEvent<RI, AI>) {
        if let Some(event) = self.coalescer.submit(event) {
            log::trace!("dispatching {:?} immediately", event.kind);
            let event = self.refresh(event);
            self.dispatch(&event);
        }
    }

    fn fire_batch(&mut self, events: Vec<BoardEvent<RI, AI>>) {
        if self.coalescer.is_changing() {
            log::error!(
                "illegal state: firing a batch of {} events while the board is changing",
                events.len()
            );
            return;
        }
        for event in events {
            let event = self.refresh(event);
            self.dispatch(&event);
        }
    }

    /// Replaces inserted/updated payloads with the live cells.
    fn refresh(&self, mut event: BoardEvent<RI, AI>) -> BoardEvent<RI, AI> {
        if matches!(
            event.kind,
            EventKind::ActivitiesInserted | EventKind::ActivitiesUpdated
        ) {
            for cell in &mut event.cells {
                if let Some(live) = self.index.resolve(cell) {
                    *cell = live.clone();
                }
            }
        }
        event
    }

    fn dispatch(&mut self, event: &BoardEvent<RI, AI>) {
        for (_, listener) in &mut self.listeners {
            listener.on_event(event);
        }
    }
}

fn check_hour(hour: u32) -> PlannerResult<()> {
    if hour > 23 {
        return Err(PlannerError::InvalidHourOfDay(hour));
    }
    Ok(())
}

fn at_hour(day: NaiveDate, hour: u32) -> NaiveDateTime {
    saturating_add(day.and_time(NaiveTime::MIN), Duration::hours(i64::from(hour)))
}

fn saturating_add(time: NaiveDateTime, delta: Duration) -> NaiveDateTime {
    time.checked_add_signed(delta).unwrap_or(NaiveDateTime::MAX)
}

/// Collects ids, dropping repeats but keeping first-seen order.
fn dedup<RI: PartialEq>(ids: impl IntoIterator<Item = RI>) -> Vec<RI> {
    let mut out: Vec<RI> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
