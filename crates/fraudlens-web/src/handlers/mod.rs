//! HTTP handlers for all web routes.

pub mod analyze;
pub mod api;
pub mod assistant;
pub mod dashboard;
pub mod system;
