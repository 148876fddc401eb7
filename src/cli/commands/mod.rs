//! CLI command implementations

pub mod appointment;
pub mod auth;
pub mod clinic;
pub mod company;
pub mod completions;
pub mod config;
pub mod dashboard;
pub mod doctor;
pub mod lab;
pub mod patient;
pub mod role;
pub mod rx;
pub mod schedule;
pub mod settings;
pub mod specialty;
pub mod user;
pub mod visit;
