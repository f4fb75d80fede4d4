//! Core library for the task dashboard
//!
//! This crate contains the client-side logic of the dashboard, including:
//! - Task model and the remote task/auth API boundary
//! - Session and preference persistence in a client-side store
//! - View filters and derived metrics
//! - The dashboard view-model that ties them together

pub mod api;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
