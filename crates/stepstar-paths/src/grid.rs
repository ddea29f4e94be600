//! Owned, resizable 2D collection of [`Cell`]s.
//!
//! The grid exclusively owns its cells in a row-major buffer. Start, target,
//! open-list entries and predecessor links are stored as coordinates, never
//! as references, so removing cells on a shrink cannot leave a dangling
//! handle behind.

use std::fmt;

use stepstar_core::{Area, AreaGroup, Emitter, ListenerId, Point};

use crate::cell::{Cell, CellEvent, CellEventKind, CellKind};
use crate::config::{GridConfig, check_dimension, check_stepping_cost};
use crate::error::{Error, Result};
use crate::events::{GridEvent, GridEventKind};
use crate::neighbors::Neighbors;

/// A rectangular board of cells with an incremental A* search attached.
///
/// All setters validate their input before touching any state and only
/// act (and notify) when the value actually changes.
pub struct Grid {
    width: i32,
    height: i32,
    /// Row-major, `width * height` long.
    pub(crate) cells: Vec<Cell>,
    pub(crate) start: Option<Point>,
    pub(crate) target: Option<Point>,
    can_walk_diagonal: bool,
    stepping_cost: f64,
    pub(crate) open_list: Vec<Point>,
    pub(crate) found: bool,
    // scratch buffer for neighbor queries
    pub(crate) nbuf: Neighbors,
    listeners: Emitter<GridEvent>,
}

impl Grid {
    /// Create a grid of the given size with default search settings.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        Self::with_config(GridConfig {
            width,
            height,
            ..GridConfig::default()
        })
    }

    /// Create a grid from a full configuration.
    pub fn with_config(config: GridConfig) -> Result<Self> {
        config.validate()?;
        let mut grid = Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
            start: None,
            target: None,
            can_walk_diagonal: config.can_walk_diagonal,
            stepping_cost: config.stepping_cost,
            open_list: Vec::new(),
            found: false,
            nbuf: Neighbors::new(),
            listeners: Emitter::new(),
        };
        grid.resize(config.width, config.height)?;
        Ok(grid)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn start(&self) -> Option<Point> {
        self.start
    }

    #[inline]
    pub fn target(&self) -> Option<Point> {
        self.target
    }

    #[inline]
    pub fn can_walk_diagonal(&self) -> bool {
        self.can_walk_diagonal
    }

    #[inline]
    pub fn stepping_cost(&self) -> f64 {
        self.stepping_cost
    }

    /// Cells awaiting expansion, best candidate first.
    #[inline]
    pub fn open_list(&self) -> &[Point] {
        &self.open_list
    }

    /// Whether the target has been dequeued.
    #[inline]
    pub fn is_found(&self) -> bool {
        self.found
    }

    /// Current settings as a [`GridConfig`].
    pub fn config(&self) -> GridConfig {
        GridConfig {
            width: self.width,
            height: self.height,
            can_walk_diagonal: self.can_walk_diagonal,
            stepping_cost: self.stepping_cost,
        }
    }

    /// The occupied rectangle, or `None` while the grid holds no cells.
    pub fn area(&self) -> Option<Area> {
        Area::from_half_open(0, self.width, 0, self.height)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `p` lies in `[0, width) × [0, height)`.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        index_of(p, self.width, self.height).is_some()
    }

    /// The cell at `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn get_cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cell(Point::new(x, y))
    }

    /// The cell at `p`, or `None` outside the grid.
    #[inline]
    pub fn cell(&self, p: Point) -> Option<&Cell> {
        index_of(p, self.width, self.height).map(|i| &self.cells[i])
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, p: Point) -> Option<&mut Cell> {
        index_of(p, self.width, self.height).map(|i| &mut self.cells[i])
    }

    /// Row-major iterator over every cell.
    pub fn cells(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// In-bounds neighbors of `p`: 8 directions when diagonal movement is
    /// allowed, 4 otherwise, always in the same order.
    pub fn surrounding(&self, p: Point) -> Vec<Point> {
        let mut nb = Neighbors::new();
        nb.around(p, self.can_walk_diagonal, |n| self.contains(n))
            .to_vec()
    }

    /// The cells around `(x, y)`; see [`surrounding`](Self::surrounding).
    pub fn surrounding_cells(&self, x: i32, y: i32) -> Vec<&Cell> {
        self.surrounding(Point::new(x, y))
            .into_iter()
            .filter_map(|p| self.cell(p))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Dimensions
    // -----------------------------------------------------------------------

    pub fn set_width(&mut self, width: i32) -> Result<()> {
        self.resize(width, self.height)
    }

    pub fn set_height(&mut self, height: i32) -> Result<()> {
        self.resize(self.width, height)
    }

    /// Change both dimensions at once.
    ///
    /// Removed and added coordinates are each computed as an [`AreaGroup`],
    /// so a corner covered by both the column delta and the row delta is
    /// handled once. Cells only exist while both dimensions are positive.
    ///
    /// Notification order: one `CellRemoved` per removed coordinate, one
    /// `CellAdded` per new coordinate, the reset and start/target changes
    /// caused by the shrink (if any), then `WidthChanged` / `HeightChanged`.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        let (old_w, old_h) = (self.width, self.height);
        if (old_w, old_h) == (width, height) {
            return Ok(());
        }

        let removed = outside(old_w, old_h, width, height);
        let added = outside(width, height, old_w, old_h);

        let old_start = self.start;
        let old_target = self.target;
        let start_lost = old_start.is_some_and(|p| removed.contains(p.x, p.y));
        let target_lost = old_target.is_some_and(|p| removed.contains(p.x, p.y));
        let search_lost = start_lost
            || target_lost
            || removed
                .iter()
                .any(|p| self.cell(p).is_some_and(|c| c.g().is_some()));

        log::debug!(
            "resize {}x{} -> {}x{}: {} removed, {} added",
            old_w,
            old_h,
            width,
            height,
            removed.iter().count(),
            added.iter().count()
        );

        // Carry surviving cells over to their new slots.
        let mut old: Vec<Option<Cell>> = std::mem::take(&mut self.cells)
            .into_iter()
            .map(Some)
            .collect();
        let mut slots: Vec<Option<Cell>> = (0..area_len(width, height)).map(|_| None).collect();
        for (i, slot) in old.iter_mut().enumerate() {
            let p = point_at(i, old_w);
            if let Some(ni) = index_of(p, width, height) {
                slots[ni] = slot.take();
            }
        }

        for p in removed.iter() {
            let cell = index_of(p, old_w, old_h).and_then(|i| old[i].take());
            if let Some(cell) = cell {
                self.listeners.emit(&GridEvent::CellRemoved {
                    pos: p,
                    cell: cell.state(),
                });
            }
        }
        drop(old);

        self.width = width;
        self.height = height;
        if start_lost {
            self.start = None;
        }
        if target_lost {
            self.target = None;
        }
        // Removed cells may have been listed; the reset below rebuilds it.
        self.open_list.retain(|&p| index_of(p, width, height).is_some());

        for p in added.iter() {
            let Some(i) = index_of(p, width, height) else {
                continue;
            };
            let mut cell = Cell::new(p.x, p.y);
            cell.set_h(self.calc_h(p));
            let state = cell.state();
            slots[i] = Some(cell);
            self.listeners
                .emit(&GridEvent::CellAdded { pos: p, cell: state });
        }

        self.cells = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    let p = point_at(i, width);
                    Cell::new(p.x, p.y)
                })
            })
            .collect();

        if search_lost {
            self.reset_pathfinding(target_lost);
        }
        if start_lost {
            self.listeners.emit(&GridEvent::StartChanged {
                old: old_start,
                new: None,
            });
        }
        if target_lost {
            self.listeners.emit(&GridEvent::TargetChanged {
                old: old_target,
                new: None,
            });
        }
        if old_w != width {
            self.listeners.emit(&GridEvent::WidthChanged {
                old: old_w,
                new: width,
            });
        }
        if old_h != height {
            self.listeners.emit(&GridEvent::HeightChanged {
                old: old_h,
                new: height,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Start / target
    // -----------------------------------------------------------------------

    /// Move the start marker to `start`, or clear it with `None`.
    ///
    /// The previous start cell becomes traversable again and the search is
    /// restarted from the new start.
    pub fn set_start(&mut self, start: Option<Point>) -> Result<()> {
        if let Some(p) = start {
            self.check_member(p, "start")?;
            if Some(p) == self.target {
                return Err(Error::invalid(format!(
                    "{p} is the target and cannot also be the start"
                )));
            }
        }
        if start == self.start {
            return Ok(());
        }
        let old = self.start;
        self.swap_marker(old, start, CellKind::Start);
        self.start = start;
        log::debug!("start {:?} -> {:?}", old, start);

        self.reset_pathfinding(false);
        self.listeners
            .emit(&GridEvent::StartChanged { old, new: start });
        Ok(())
    }

    /// Move the target marker to `target`, or clear it with `None`.
    ///
    /// Every heuristic depends on the target, so all of them are recomputed
    /// before the search is restarted.
    pub fn set_target(&mut self, target: Option<Point>) -> Result<()> {
        if let Some(p) = target {
            self.check_member(p, "target")?;
            if Some(p) == self.start {
                return Err(Error::invalid(format!(
                    "{p} is the start and cannot also be the target"
                )));
            }
        }
        if target == self.target {
            return Ok(());
        }
        let old = self.target;
        self.swap_marker(old, target, CellKind::Target);
        self.target = target;
        log::debug!("target {:?} -> {:?}", old, target);

        self.reset_pathfinding(true);
        self.listeners
            .emit(&GridEvent::TargetChanged { old, new: target });
        Ok(())
    }

    fn check_member(&self, p: Point, role: &str) -> Result<()> {
        if self.contains(p) {
            Ok(())
        } else {
            Err(Error::invalid(format!(
                "{role} {p} is not a cell of this {}x{} grid",
                self.width, self.height
            )))
        }
    }

    fn swap_marker(&mut self, old: Option<Point>, new: Option<Point>, kind: CellKind) {
        if let Some(cell) = old.and_then(|p| self.cell_mut(p)) {
            cell.set_kind(CellKind::Traversable);
        }
        if let Some(cell) = new.and_then(|p| self.cell_mut(p)) {
            cell.set_kind(kind);
        }
    }

    // -----------------------------------------------------------------------
    // Search settings
    // -----------------------------------------------------------------------

    /// Switch between 8- and 4-connected movement.
    pub fn set_can_walk_diagonal(&mut self, can_walk_diagonal: bool) {
        if self.can_walk_diagonal == can_walk_diagonal {
            return;
        }
        let old = std::mem::replace(&mut self.can_walk_diagonal, can_walk_diagonal);
        self.reset_pathfinding(true);
        self.listeners.emit(&GridEvent::DiagonalChanged {
            old,
            new: can_walk_diagonal,
        });
    }

    /// Set the cost of a straight step. Must be finite and positive.
    pub fn set_stepping_cost(&mut self, stepping_cost: f64) -> Result<()> {
        let stepping_cost = check_stepping_cost(stepping_cost)?;
        if self.stepping_cost == stepping_cost {
            return Ok(());
        }
        let old = std::mem::replace(&mut self.stepping_cost, stepping_cost);
        self.reset_pathfinding(true);
        self.listeners.emit(&GridEvent::SteppingCostChanged {
            old,
            new: stepping_cost,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Obstacles
    // -----------------------------------------------------------------------

    /// Switch the cell at `p` between traversable and blocked.
    ///
    /// Only those two kinds are editable; start, target and checked cells
    /// are owned by the endpoints and the search. An edit that touches
    /// explored ground (the cell has a cost, or borders a cell that was
    /// already expanded) restarts the search, so no predecessor link can
    /// cross a new wall and no opened cell is left unexplored. Returns
    /// whether the kind changed.
    pub fn set_cell_kind(&mut self, p: Point, kind: CellKind) -> Result<bool> {
        let Some(current) = self.cell(p).map(Cell::kind) else {
            return Err(Error::invalid(format!("{p} is outside the grid")));
        };
        if !is_editable(kind) {
            return Err(Error::invalid(format!(
                "cells can only be made traversable or blocked, not {kind}"
            )));
        }
        if !is_editable(current) {
            return Err(Error::invalid(format!(
                "{p} is {current}; only traversable and blocked cells can be edited"
            )));
        }
        if current == kind {
            return Ok(false);
        }

        let explored = self.cell(p).is_some_and(|c| c.g().is_some())
            || self.surrounding(p).into_iter().any(|n| self.is_expanded(n));
        if let Some(cell) = self.cell_mut(p) {
            cell.set_kind(kind);
        }
        log::debug!("{} -> {} (explored: {})", p, kind, explored);
        if explored {
            self.reset_pathfinding(false);
        }
        Ok(true)
    }

    /// Whether the search has already taken `p` off the open list.
    fn is_expanded(&self, p: Point) -> bool {
        match self.cell(p).map(Cell::kind) {
            Some(CellKind::Checked) => true,
            Some(CellKind::Start) => !self.open_list.contains(&p),
            _ => false,
        }
    }

    /// Flip a cell between traversable and blocked. Returns the new kind.
    pub fn toggle_blocked(&mut self, p: Point) -> Result<CellKind> {
        let next = match self.cell(p).map(Cell::kind) {
            Some(CellKind::Blocked) => CellKind::Traversable,
            _ => CellKind::Blocked,
        };
        self.set_cell_kind(p, next)?;
        Ok(next)
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn observe(
        &mut self,
        kind: GridEventKind,
        f: impl FnMut(&GridEvent) + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(kind, f)
    }

    pub fn observe_all(&mut self, f: impl FnMut(&GridEvent) + 'static) -> ListenerId {
        self.listeners.subscribe_all(f)
    }

    pub fn unobserve(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Subscribe to the cell at `p`; `kind == None` receives every event.
    /// The subscription ends when the cell is removed.
    pub fn observe_cell(
        &mut self,
        p: Point,
        kind: Option<CellEventKind>,
        f: impl FnMut(&CellEvent) + 'static,
    ) -> Result<ListenerId> {
        let cell = self
            .cell_mut(p)
            .ok_or_else(|| Error::invalid(format!("{p} is outside the grid")))?;
        Ok(match kind {
            Some(kind) => cell.subscribe(kind, f),
            None => cell.subscribe_all(f),
        })
    }

    pub fn unobserve_cell(&mut self, p: Point, id: ListenerId) -> bool {
        self.cell_mut(p).is_some_and(|c| c.unsubscribe(id))
    }

    pub(crate) fn emit(&mut self, event: GridEvent) {
        self.listeners.emit(&event);
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("start", &self.start)
            .field("target", &self.target)
            .field("can_walk_diagonal", &self.can_walk_diagonal)
            .field("stepping_cost", &self.stepping_cost)
            .field("open_list", &self.open_list)
            .field("found", &self.found)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Coordinate helpers
// ---------------------------------------------------------------------------

fn is_editable(kind: CellKind) -> bool {
    matches!(kind, CellKind::Traversable | CellKind::Blocked)
}

#[inline]
fn index_of(p: Point, width: i32, height: i32) -> Option<usize> {
    if p.x >= 0 && p.y >= 0 && p.x < width && p.y < height {
        Some(p.y as usize * width as usize + p.x as usize)
    } else {
        None
    }
}

#[inline]
fn point_at(idx: usize, width: i32) -> Point {
    let w = width.max(1) as usize;
    Point::new((idx % w) as i32, (idx / w) as i32)
}

#[inline]
fn area_len(width: i32, height: i32) -> usize {
    width.max(0) as usize * height.max(0) as usize
}

/// Coordinates of `[0, aw) × [0, ah)` that fall outside `[0, bw) × [0, bh)`:
/// the columns right of the other rectangle plus the full-width rows below
/// it. The two members share the corner, which the group yields once.
fn outside(aw: i32, ah: i32, bw: i32, bh: i32) -> AreaGroup {
    let mut group = AreaGroup::default();
    if let Some(cols) = Area::from_half_open(bw, aw, 0, ah) {
        group.push(cols);
    }
    if let Some(rows) = Area::from_half_open(0, aw, bh, ah) {
        group.push(rows);
    }
    group
}
