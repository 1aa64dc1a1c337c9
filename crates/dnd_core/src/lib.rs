//! Reorder-state computation for dragging an item within a vertical list.
//!
//! The host feeds pointer samples and live item boxes into a
//! [`GestureTracker`]; the tracker answers how far each idle item must shift
//! and, on release, the committed order of the list.

mod error;
mod geometry;
mod gesture;
mod pointer;
mod resolver;

pub use crate::error::*;
pub use crate::geometry::*;
pub use crate::gesture::*;
pub use crate::pointer::*;
pub use crate::resolver::*;
