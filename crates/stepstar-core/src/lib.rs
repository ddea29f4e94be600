//! **stepstar-core**: building blocks shared by the stepstar crates.
//!
//! This crate provides grid geometry ([`Point`], the inclusive [`Area`] and
//! the deduplicating [`AreaGroup`] used to compute resize deltas) and the
//! synchronous observer ([`Emitter`]) every stateful entity publishes its
//! changes through.

pub mod geom;
pub mod observer;

pub use geom::{Area, AreaGroup, AreaGroupIter, AreaIter, Point};
pub use observer::{Emitter, Event, ListenerId};
