//! Step-wise A* on a mutable, observable grid.
//!
//! A [`Grid`] owns a rectangle of [`Cell`]s plus the state of one A* search
//! between its start and target cells. The search advances one dequeue per
//! [`Grid::step`], so a caller can render every intermediate state. Every
//! mutation that invalidates the search (moving an endpoint, changing the
//! movement rules, shrinking away visited cells) restarts it.
//!
//! Cells and the grid publish every attribute change through synchronous
//! observers:
//!
//! | Source | Events | Subscribe with |
//! |---|---|---|
//! | [`Cell`] | [`CellEvent`] | [`Grid::observe_cell`], [`Cell::subscribe`] |
//! | [`Grid`] | [`GridEvent`] | [`Grid::observe`], [`Grid::observe_all`] |
//!
//! [`BoardGen`] fills a grid with random obstacles and endpoints.

mod astar;
mod cell;
mod config;
mod distance;
mod error;
mod events;
mod grid;
mod mapgen;
mod neighbors;

pub use astar::StepStatus;
pub use cell::{Cell, CellEvent, CellEventKind, CellKind, CellState};
pub use config::GridConfig;
pub use distance::{manhattan, octile};
pub use error::{Error, Result};
pub use events::{GridEvent, GridEventKind};
pub use grid::Grid;
pub use mapgen::{BlockRule, BoardGen};
pub use neighbors::Neighbors;

pub use stepstar_core::{Area, AreaGroup, Event, ListenerId, Point};
