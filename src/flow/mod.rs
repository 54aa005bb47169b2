//! The transient flow model: transitions and the transition map.
//!
//! A [`Transition`] is one possible move out of a question under one answer
//! condition. A [`TransitionMap`] aggregates transitions into a lookup table
//! keyed by source question and choice, and answers the central question of
//! the whole crate: "where do I go from here, given this answer?"
//!
//! Nothing in this module is persisted as such. Maps are generated on demand
//! from a template's implicit position order plus its stored explicit
//! branches, used, and thrown away.

mod map;
mod transition;

pub use map::TransitionMap;
pub use transition::{PathNode, Transition, TransitionCategory};
