//! Group overview activity
//!
//! Teachers define named categories in an overview and map the groups of the
//! course into them; students see the groups sorted by category.

#[macro_use]
pub mod log;
pub mod config;
pub mod util;
pub mod db;
pub mod directory;
pub mod form;
pub mod backup;
pub mod view;
