//! Spatial index: boards, cells, locations, and adjacency.
//!
//! ## Key Types
//!
//! - [`Location`]: value-typed (column, row) pair
//! - [`Direction`]: the four grid directions
//! - [`Board`]: fixed map from locations to cells, built with [`BoardBuilder`]
//! - [`CellRef`]: `Copy` handle naming a cell by board and location, used as
//!   a container and in events
//!
//! Boards have no locking of their own beyond cell properties. What sits on
//! a cell is answered by the containment index.

mod board;
mod location;

pub use board::{Board, BoardBuilder, BoardId, Cell, CellRef};
pub use location::{Direction, Location};
