//! Clinic Desk: a terminal console for a healthcare-clinic platform
//!
//! Talks to the platform's REST API, keeps a local query cache that
//! mutations invalidate, and persists the login session between runs.

pub mod api;
pub mod cli;
pub mod core;
pub mod entities;
