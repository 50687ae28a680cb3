//! Entity registry: identity allocation and id <-> object lookup.
//!
//! The registry does not know where objects are. Placement lives in the
//! [`containment`](crate::containment) module; the
//! [`Game`](crate::game::Game) facade keeps the two in step.

mod entities;

pub use entities::EntityRegistry;
