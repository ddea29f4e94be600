//! One grid position with its search bookkeeping: [`Cell`], its kinds and events.

use std::fmt;
use std::str::FromStr;

use stepstar_core::{Emitter, Event, ListenerId, Point};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// CellKind
// ---------------------------------------------------------------------------

/// What a cell currently is, as far as the search is concerned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CellKind {
    #[default]
    Traversable,
    Blocked,
    Start,
    Target,
    /// Dequeued from the open list and expanded.
    Checked,
}

impl CellKind {
    pub const ALL: [CellKind; 5] = [
        CellKind::Traversable,
        CellKind::Blocked,
        CellKind::Start,
        CellKind::Target,
        CellKind::Checked,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CellKind::Traversable => "traversable",
            CellKind::Blocked => "blocked",
            CellKind::Start => "start",
            CellKind::Target => "target",
            CellKind::Checked => "checked",
        }
    }

    /// Whether the search may enqueue a cell of this kind.
    #[inline]
    pub const fn is_enqueueable(self) -> bool {
        matches!(self, CellKind::Traversable | CellKind::Target)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CellKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                Error::invalid(format!(
                    "cell kind must be one of traversable, blocked, start, target, checked; got {s:?}"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A change to one attribute of a [`Cell`], carrying the old and new value.
#[derive(Clone, Debug, PartialEq)]
pub enum CellEvent {
    KindChanged { old: CellKind, new: CellKind },
    XChanged { old: i32, new: i32 },
    YChanged { old: i32, new: i32 },
    HChanged { old: Option<f64>, new: Option<f64> },
    GChanged { old: Option<f64>, new: Option<f64> },
    DisplayChanged { old: bool, new: bool },
    CameFromChanged { old: Option<Point>, new: Option<Point> },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellEventKind {
    KindChanged,
    XChanged,
    YChanged,
    HChanged,
    GChanged,
    DisplayChanged,
    CameFromChanged,
}

impl Event for CellEvent {
    type Kind = CellEventKind;

    fn kind(&self) -> CellEventKind {
        match self {
            CellEvent::KindChanged { .. } => CellEventKind::KindChanged,
            CellEvent::XChanged { .. } => CellEventKind::XChanged,
            CellEvent::YChanged { .. } => CellEventKind::YChanged,
            CellEvent::HChanged { .. } => CellEventKind::HChanged,
            CellEvent::GChanged { .. } => CellEventKind::GChanged,
            CellEvent::DisplayChanged { .. } => CellEventKind::DisplayChanged,
            CellEvent::CameFromChanged { .. } => CellEventKind::CameFromChanged,
        }
    }
}

// ---------------------------------------------------------------------------
// CellState
// ---------------------------------------------------------------------------

/// Plain-data copy of a cell's attributes, without its listeners.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellState {
    pub kind: CellKind,
    pub pos: Point,
    pub h: Option<f64>,
    pub g: Option<f64>,
    pub visible: bool,
    pub came_from: Option<Point>,
}

impl CellState {
    /// `g + h`, or `None` while either is unknown.
    pub fn f(&self) -> Option<f64> {
        sum(self.g, self.h)
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single grid position.
///
/// Every setter compares against the stored value first: assigning the
/// current value is a no-op and emits nothing. `h` and `g` treat any
/// non-finite input as "no value".
pub struct Cell {
    kind: CellKind,
    pos: Point,
    h: Option<f64>,
    g: Option<f64>,
    visible: bool,
    came_from: Option<Point>,
    listeners: Emitter<CellEvent>,
}

impl Cell {
    /// A traversable, invisible cell at `(x, y)` with no search data.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            kind: CellKind::default(),
            pos: Point::new(x, y),
            h: None,
            g: None,
            visible: false,
            came_from: None,
            listeners: Emitter::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.pos.y
    }

    /// Heuristic estimate of the remaining cost to the target.
    #[inline]
    pub fn h(&self) -> Option<f64> {
        self.h
    }

    /// Best known cost from the start.
    #[inline]
    pub fn g(&self) -> Option<f64> {
        self.g
    }

    /// `g + h`; `None` while either is unknown.
    #[inline]
    pub fn f(&self) -> Option<f64> {
        sum(self.g, self.h)
    }

    /// Display flag, always equal to "g is known".
    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Predecessor on the best known path.
    #[inline]
    pub fn came_from(&self) -> Option<Point> {
        self.came_from
    }

    pub fn set_kind(&mut self, kind: CellKind) -> bool {
        if self.kind == kind {
            return false;
        }
        let old = std::mem::replace(&mut self.kind, kind);
        self.listeners
            .emit(&CellEvent::KindChanged { old, new: kind });
        true
    }

    pub fn set_x(&mut self, x: i32) -> bool {
        if self.pos.x == x {
            return false;
        }
        let old = std::mem::replace(&mut self.pos.x, x);
        self.listeners.emit(&CellEvent::XChanged { old, new: x });
        true
    }

    pub fn set_y(&mut self, y: i32) -> bool {
        if self.pos.y == y {
            return false;
        }
        let old = std::mem::replace(&mut self.pos.y, y);
        self.listeners.emit(&CellEvent::YChanged { old, new: y });
        true
    }

    pub fn set_h(&mut self, h: Option<f64>) -> bool {
        let h = h.filter(|v| v.is_finite());
        if self.h == h {
            return false;
        }
        let old = std::mem::replace(&mut self.h, h);
        self.listeners.emit(&CellEvent::HChanged { old, new: h });
        true
    }

    /// Set `g` and re-derive the display flag from it.
    pub fn set_g(&mut self, g: Option<f64>) -> bool {
        let g = g.filter(|v| v.is_finite());
        if self.g == g {
            return false;
        }
        let old = std::mem::replace(&mut self.g, g);
        self.set_visible(g.is_some());
        self.listeners.emit(&CellEvent::GChanged { old, new: g });
        true
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        let old = std::mem::replace(&mut self.visible, visible);
        self.listeners
            .emit(&CellEvent::DisplayChanged { old, new: visible });
    }

    /// Set the predecessor link. A cell cannot come from itself.
    ///
    /// A free cell knows nothing about its surroundings, so this is the only
    /// check; use [`Grid::set_came_from`](crate::Grid::set_came_from) to
    /// also require a neighbor within the grid.
    pub fn set_came_from(&mut self, from: Option<Point>) -> Result<bool> {
        if from == Some(self.pos) {
            return Err(Error::invalid(format!(
                "cell {} cannot come from itself",
                self.pos
            )));
        }
        Ok(self.replace_came_from(from))
    }

    /// Unchecked link update; the grid only links distinct neighbors.
    pub(crate) fn replace_came_from(&mut self, from: Option<Point>) -> bool {
        if self.came_from == from {
            return false;
        }
        let old = std::mem::replace(&mut self.came_from, from);
        self.listeners
            .emit(&CellEvent::CameFromChanged { old, new: from });
        true
    }

    /// Snapshot of the current attributes.
    pub fn state(&self) -> CellState {
        CellState {
            kind: self.kind,
            pos: self.pos,
            h: self.h,
            g: self.g,
            visible: self.visible,
            came_from: self.came_from,
        }
    }

    pub fn subscribe(
        &mut self,
        kind: CellEventKind,
        f: impl FnMut(&CellEvent) + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(kind, f)
    }

    pub fn subscribe_all(&mut self, f: impl FnMut(&CellEvent) + 'static) -> ListenerId {
        self.listeners.subscribe_all(f)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("kind", &self.kind)
            .field("pos", &self.pos)
            .field("h", &self.h)
            .field("g", &self.g)
            .field("visible", &self.visible)
            .field("came_from", &self.came_from)
            .finish()
    }
}

#[inline]
fn sum(g: Option<f64>, h: Option<f64>) -> Option<f64> {
    Some(g? + h?)
}
