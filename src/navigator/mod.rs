//! Screen navigation core.
//!
//! This module provides:
//! - The screen graph and its JSON catalog
//! - Transition actions
//! - BFS path planning
//! - The path executor and the navigator that owns the current-screen belief

pub mod action;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod executor;
pub mod graph;
pub mod planner;

pub use action::{Action, ActionContext};
pub use catalog::{default_catalog, load_or_default, Catalog};
pub use controller::{Navigator, NavigatorSettings};
pub use error::{ActionError, ConfigError, NavigationError};
pub use executor::{Executor, FollowReport, VerifyPolicy};
pub use graph::{GraphBuilder, ScreenGraph, ScreenId, Transition};
pub use planner::find_path;
