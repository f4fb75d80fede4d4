//! Task module
//!
//! Task types as exchanged with the remote task API.

mod model;

pub use model::*;
