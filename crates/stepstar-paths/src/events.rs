//! Notifications published by a [`Grid`](crate::Grid).

use stepstar_core::{Event, Point};

use crate::cell::CellState;

/// A structural or attribute change on a grid.
///
/// Attribute changes carry the old and the new value. Structural events
/// carry the position and a snapshot of the cell that was added or removed.
#[derive(Clone, Debug, PartialEq)]
pub enum GridEvent {
    CellAdded { pos: Point, cell: CellState },
    CellRemoved { pos: Point, cell: CellState },
    TargetChanged { old: Option<Point>, new: Option<Point> },
    StartChanged { old: Option<Point>, new: Option<Point> },
    WidthChanged { old: i32, new: i32 },
    HeightChanged { old: i32, new: i32 },
    DiagonalChanged { old: bool, new: bool },
    SteppingCostChanged { old: f64, new: f64 },
    /// Search state was rebuilt; renderers should redraw the whole board.
    PathfindingReset,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GridEventKind {
    CellAdded,
    CellRemoved,
    TargetChanged,
    StartChanged,
    WidthChanged,
    HeightChanged,
    DiagonalChanged,
    SteppingCostChanged,
    PathfindingReset,
}

impl Event for GridEvent {
    type Kind = GridEventKind;

    fn kind(&self) -> GridEventKind {
        match self {
            GridEvent::CellAdded { .. } => GridEventKind::CellAdded,
            GridEvent::CellRemoved { .. } => GridEventKind::CellRemoved,
            GridEvent::TargetChanged { .. } => GridEventKind::TargetChanged,
            GridEvent::StartChanged { .. } => GridEventKind::StartChanged,
            GridEvent::WidthChanged { .. } => GridEventKind::WidthChanged,
            GridEvent::HeightChanged { .. } => GridEventKind::HeightChanged,
            GridEvent::DiagonalChanged { .. } => GridEventKind::DiagonalChanged,
            GridEvent::SteppingCostChanged { .. } => GridEventKind::SteppingCostChanged,
            GridEvent::PathfindingReset => GridEventKind::PathfindingReset,
        }
    }
}
