//! Random board generation.
//!
//! Obstacles are grown in a single row-major sweep: the more blocked cells
//! already surround a position, the likelier it is to be blocked too, which
//! produces clustered walls rather than uniform noise.

use rand::Rng;
use stepstar_core::Point;

use crate::cell::{Cell, CellKind};
use crate::error::Result;
use crate::grid::Grid;

/// Blocking probability as a function of the blocked-neighbor ratio `r`:
/// `base + spread * sqrt(r)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRule {
    pub base: f64,
    pub spread: f64,
}

impl Default for BlockRule {
    fn default() -> Self {
        Self {
            base: 0.15,
            spread: 0.65,
        }
    }
}

impl BlockRule {
    /// Probability of blocking a cell with `blocked` of `neighbors`
    /// surrounding cells already blocked.
    pub fn probability(&self, blocked: usize, neighbors: usize) -> f64 {
        let ratio = if neighbors == 0 {
            0.0
        } else {
            blocked as f64 / neighbors as f64
        };
        self.base + self.spread * ratio.sqrt()
    }
}

/// Randomizes obstacles and endpoints of a [`Grid`].
pub struct BoardGen<R: Rng> {
    pub rng: R,
    pub rule: BlockRule,
}

impl<R: Rng> BoardGen<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            rule: BlockRule::default(),
        }
    }

    /// Clear all obstacles and scatter new ones.
    ///
    /// Start and target are never blocked. The search is restarted first,
    /// which leaves no checked cells and nothing for the edits to disturb.
    /// Returns the number of blocked cells.
    pub fn randomize_blocked(&mut self, grid: &mut Grid) -> Result<usize> {
        grid.reset_pathfinding(false);
        let points: Vec<Point> = grid.cells().map(Cell::pos).collect();
        for &p in &points {
            if grid.cell(p).map(Cell::kind) == Some(CellKind::Blocked) {
                grid.set_cell_kind(p, CellKind::Traversable)?;
            }
        }

        let mut blocked = 0;
        for &p in &points {
            if Some(p) == grid.start() || Some(p) == grid.target() {
                continue;
            }
            let around = grid.surrounding(p);
            let walls = around
                .iter()
                .filter(|&&n| grid.cell(n).map(Cell::kind) == Some(CellKind::Blocked))
                .count();
            let chance = self.rule.probability(walls, around.len());
            if self.rng.random::<f64>() < chance {
                grid.set_cell_kind(p, CellKind::Blocked)?;
                blocked += 1;
            }
        }

        log::debug!("randomized obstacles: {} of {} blocked", blocked, points.len());
        Ok(blocked)
    }

    /// Move start and target to two distinct random non-blocked cells.
    ///
    /// Returns `(start, target)`, or `None` (leaving the grid untouched)
    /// when fewer than two cells are free.
    pub fn randomize_start_target(&mut self, grid: &mut Grid) -> Result<Option<(Point, Point)>> {
        let free: Vec<Point> = grid
            .cells()
            .filter(|c| c.kind() != CellKind::Blocked)
            .map(Cell::pos)
            .collect();
        if free.len() < 2 {
            return Ok(None);
        }

        let t = self.rng.random_range(0..free.len());
        let mut s = self.rng.random_range(0..free.len() - 1);
        if s >= t {
            s += 1;
        }
        let (start, target) = (free[s], free[t]);

        // Clear the start first so the new target may take its cell.
        grid.set_start(None)?;
        grid.set_target(Some(target))?;
        grid.set_start(Some(start))?;
        log::debug!("randomized endpoints: start {}, target {}", start, target);
        Ok(Some((start, target)))
    }
}
