//! Containment: every registered object is held by exactly one container.
//!
//! ## Key Types
//!
//! - [`Container`]: the game root, a board cell, a player, or another object
//! - [`ContainmentIndex`]: the two synchronized views of the relation
//! - [`ContentsSnapshot`]: copy-on-read result of a contents query
//!
//! There is no "remove from container" operation. An object leaves a
//! container by being placed somewhere else, usually [`Container::Root`].

mod container;
mod index;

pub use container::Container;
pub use index::{ContainmentIndex, ContentsSnapshot};
