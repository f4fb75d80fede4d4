//! Task dashboard view-model
//!
//! Session guard, task loader, mutations and view filters behind one
//! explicit state object.

mod model;
mod view_model;

pub use model::*;
pub use view_model::{Dashboard, DELETE_PROMPT};
