//! Shared helpers for backend tests: one-time log setup and problem details
//! assertions that do not depend on backend types.

pub mod logging;
pub mod problem_details;
