//! Property-based invariant tests for the stepping A* grid.
//!
//! 1. Growing then shrinking back restores the exact coordinate set.
//! 2. A cell is visible exactly when it has a cost.
//! 3. After a reset every h equals the heuristic, the start alone has a cost
//!    (g = 0) and is the only open cell.
//! 4. The open list never holds duplicates and stays ordered by (f, h).
//! 5. Once found, further steps change nothing.
//! 6. A found path is connected, starts at the start and ends at the target.
//! 7. Obstacle edits during a search never leave a broken predecessor chain.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use stepstar_paths::{BoardGen, Cell, CellKind, Grid, GridConfig, Point, StepStatus};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Board {
    width: i32,
    height: i32,
    diagonal: bool,
    blocked: Vec<bool>,
    seed: u64,
}

fn boards() -> impl Strategy<Value = Board> {
    (2i32..=9, 2i32..=9, any::<bool>(), any::<u64>()).prop_flat_map(|(w, h, diagonal, seed)| {
        proptest::collection::vec(prop::bool::weighted(0.3), (w * h) as usize).prop_map(
            move |blocked| Board {
                width: w,
                height: h,
                diagonal,
                blocked,
                seed,
            },
        )
    })
}

/// Build the board with obstacles and random endpoints on free cells.
/// `None` if fewer than two cells are free.
fn build(board: &Board) -> Option<Grid> {
    let mut grid = Grid::with_config(GridConfig {
        width: board.width,
        height: board.height,
        can_walk_diagonal: board.diagonal,
        stepping_cost: 1.0,
    })
    .ok()?;
    for (i, &b) in board.blocked.iter().enumerate() {
        if b {
            let p = Point::new(i as i32 % board.width, i as i32 / board.width);
            grid.set_cell_kind(p, CellKind::Blocked).ok()?;
        }
    }
    let mut bg = BoardGen::with_rng(StdRng::seed_from_u64(board.seed));
    bg.randomize_start_target(&mut grid).ok()??;
    Some(grid)
}

fn coords(grid: &Grid) -> HashSet<Point> {
    grid.cells().map(Cell::pos).collect()
}

fn check_open_list(grid: &Grid) -> Result<(), TestCaseError> {
    let open = grid.open_list();
    let unique: HashSet<_> = open.iter().collect();
    prop_assert_eq!(unique.len(), open.len(), "duplicate open entries: {:?}", open);
    for pair in open.windows(2) {
        let a = grid.cell(pair[0]).map(Cell::state);
        let b = grid.cell(pair[1]).map(Cell::state);
        prop_assert!(a.is_some() && b.is_some(), "open entry outside grid");
        let (a, b) = (a.unwrap(), b.unwrap());
        let ordered = match (a.f(), b.f()) {
            (Some(fa), Some(fb)) => fa < fb || (fa == fb && a.h <= b.h),
            (Some(_), None) | (None, None) => true,
            (None, Some(_)) => false,
        };
        prop_assert!(ordered, "{:?} listed before {:?}", a, b);
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Resize round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resize_round_trip(w in 0i32..8, h in 0i32..8, dw in 0i32..5, dh in 0i32..5) {
        let mut grid = Grid::new(w, h).unwrap();
        let before = coords(&grid);
        grid.resize(w + dw, h + dh).unwrap();
        prop_assert_eq!(grid.len(), ((w + dw) * (h + dh)) as usize);
        prop_assert_eq!(coords(&grid).len(), grid.len());
        grid.resize(w, h).unwrap();
        prop_assert_eq!(coords(&grid), before);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. visible <=> g
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn visible_iff_cost(board in boards(), steps in 0usize..40) {
        let Some(mut grid) = build(&board) else { return Ok(()); };
        for _ in 0..steps {
            if grid.step().is_terminal() {
                break;
            }
            for c in grid.cells() {
                prop_assert_eq!(c.visible(), c.g().is_some(), "at {}", c.pos());
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Post-reset heuristics and costs
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reset_restores_invariants(board in boards(), steps in 0usize..20) {
        let Some(mut grid) = build(&board) else { return Ok(()); };
        grid.run(steps);
        grid.reset_pathfinding(true);

        let start = grid.start().unwrap();
        prop_assert!(!grid.is_found());
        prop_assert_eq!(grid.open_list(), &[start][..]);
        for c in grid.cells() {
            prop_assert_eq!(c.h(), grid.calc_h(c.pos()));
            prop_assert_ne!(c.kind(), CellKind::Checked);
            prop_assert_eq!(c.came_from(), None);
            let expected = (c.pos() == start).then_some(0.0);
            prop_assert_eq!(c.g(), expected, "cost at {}", c.pos());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Open list shape
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn open_list_unique_and_ordered(board in boards()) {
        let Some(mut grid) = build(&board) else { return Ok(()); };
        check_open_list(&grid)?;
        for _ in 0..200 {
            let status = grid.step();
            check_open_list(&grid)?;
            if status.is_terminal() {
                break;
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Found is idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn found_is_stable(board in boards(), extra in 1usize..5) {
        let Some(mut grid) = build(&board) else { return Ok(()); };
        if grid.run(500) != StepStatus::Found {
            return Ok(());
        }
        let snapshot: Vec<_> = grid.cells().map(Cell::state).collect();
        let open = grid.open_list().to_vec();
        for _ in 0..extra {
            prop_assert_eq!(grid.step(), StepStatus::Found);
        }
        prop_assert_eq!(grid.cells().map(Cell::state).collect::<Vec<_>>(), snapshot);
        prop_assert_eq!(grid.open_list(), &open[..]);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Found paths are walkable
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn found_path_is_connected(board in boards()) {
        let Some(mut grid) = build(&board) else { return Ok(()); };
        let status = grid.run(500);
        prop_assert!(status.is_terminal());
        let path = grid.path().unwrap();
        if status != StepStatus::Found {
            prop_assert!(path.is_none());
            return Ok(());
        }
        let path = path.unwrap();
        prop_assert_eq!(path.first().copied(), grid.start());
        prop_assert_eq!(path.last().copied(), grid.target());
        for pair in path.windows(2) {
            let (dx, dy) = pair[0].delta(pair[1]);
            prop_assert!(dx <= 1 && dy <= 1 && dx + dy > 0);
            if !board.diagonal {
                prop_assert_eq!(dx + dy, 1);
            }
            let kind = grid.cell(pair[1]).map(Cell::kind);
            prop_assert_ne!(kind, Some(CellKind::Blocked));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Obstacle edits keep predecessor chains intact
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edits_mid_search_keep_chains(
        board in boards(),
        edits in proptest::collection::vec((0usize..81, 0usize..6), 1..12),
    ) {
        let Some(mut grid) = build(&board) else { return Ok(()); };
        for (cell, steps) in edits {
            grid.run(steps);
            let p = Point::new(
                (cell % board.width as usize) as i32,
                (cell / board.width as usize % board.height as usize) as i32,
            );
            // Endpoints and checked cells refuse the edit; that is fine.
            let _ = grid.toggle_blocked(p);
            for c in grid.cells().filter(|c| c.kind() == CellKind::Checked) {
                prop_assert!(grid.path_of(c.pos()).is_ok(), "chain of {}", c.pos());
            }
        }
        let status = grid.run(500);
        prop_assert!(status.is_terminal());
        if status == StepStatus::Found {
            let path = grid.path();
            prop_assert!(matches!(path, Ok(Some(_))), "{:?}", path);
            for p in path.unwrap().unwrap() {
                prop_assert_ne!(grid.cell(p).map(Cell::kind), Some(CellKind::Blocked));
            }
        }
    }
}
