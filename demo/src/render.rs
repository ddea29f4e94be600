//! ASCII rendering of a grid and its search state.

use std::collections::HashSet;
use std::fmt::Write;

use stepstar_core::Point;
use stepstar_paths::{CellKind, Grid, GridEvent};

pub const TRAVERSABLE: char = '.';
pub const BLOCKED: char = '#';
pub const START: char = 'S';
pub const TARGET: char = 'T';
pub const OPEN: char = 'o';
pub const CHECKED: char = 'x';
pub const PATH: char = '*';

/// Draw the board, one text row per grid row.
///
/// Cells on `path` are drawn as [`PATH`] unless they are an endpoint.
pub fn board(grid: &Grid, path: &[Point]) -> String {
    let open: HashSet<Point> = grid.open_list().iter().copied().collect();
    let path: HashSet<Point> = path.iter().copied().collect();
    let mut out = String::with_capacity(grid.len() + grid.height().max(0) as usize);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let Some(cell) = grid.get_cell(x, y) else {
                continue;
            };
            let p = cell.pos();
            let ch = match cell.kind() {
                CellKind::Start => START,
                CellKind::Target => TARGET,
                CellKind::Blocked => BLOCKED,
                _ if path.contains(&p) => PATH,
                _ if open.contains(&p) => OPEN,
                CellKind::Checked => CHECKED,
                CellKind::Traversable => TRAVERSABLE,
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

/// Running tally of grid notifications, fed from a grid observer.
#[derive(Debug, Default, Clone)]
pub struct Activity {
    pub cells_added: usize,
    pub cells_removed: usize,
    pub resets: usize,
    pub endpoint_moves: usize,
    pub setting_changes: usize,
    /// Set by a reset; the next frame must redraw the whole board.
    pub full_redraw: bool,
}

impl Activity {
    pub fn record(&mut self, event: &GridEvent) {
        match event {
            GridEvent::CellAdded { .. } => self.cells_added += 1,
            GridEvent::CellRemoved { .. } => self.cells_removed += 1,
            GridEvent::PathfindingReset => {
                self.resets += 1;
                self.full_redraw = true;
            }
            GridEvent::StartChanged { .. } | GridEvent::TargetChanged { .. } => {
                self.endpoint_moves += 1
            }
            GridEvent::WidthChanged { .. }
            | GridEvent::HeightChanged { .. }
            | GridEvent::DiagonalChanged { .. }
            | GridEvent::SteppingCostChanged { .. } => self.setting_changes += 1,
        }
    }

    /// Clear the redraw flag, returning whether it was set.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.full_redraw)
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        let _ = write!(
            s,
            "{} cells added, {} removed, {} resets, {} endpoint moves, {} setting changes",
            self.cells_added,
            self.cells_removed,
            self.resets,
            self.endpoint_moves,
            self.setting_changes
        );
        s
    }
}
