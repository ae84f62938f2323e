//! Calendar-grid synthesis and duty aggregation.
//!
//! # Responsibility
//! - Expand a month into whole display weeks (`grid`).
//! - Index a duty snapshot by date and month (`index`).
//! - Group a cell's duties by rubric and map rubrics to colors
//!   (`group`, `palette`).
//!
//! # Invariants
//! - Everything here is pure and synchronous over borrowed snapshots.
//! - "Today" is always injected, never read from the host clock.

pub mod clock;
pub mod grid;
pub mod group;
pub mod index;
pub mod palette;
