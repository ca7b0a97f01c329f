//! Async search controller for PlantGrid.
//!
//! Wraps the synchronous policies of `plantgrid-logic` so a host with a
//! single interaction thread can run density or best-of searches without
//! blocking: each attempt runs on tokio's blocking pool, the controller
//! yields between attempts, and the attempt counter, loading flag and
//! adopted layout are published on `watch` channels.

pub mod controller;
pub mod error;

pub use controller::SearchController;
pub use error::{Result, SearchError};
