//! Library exports for the contact directory application
//!
//! This module exposes internal components for testing and potential library usage.

pub mod cancel;
pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod logging;
pub mod model;
pub mod query;
pub mod route;
pub mod service;
pub mod store;
pub mod validation;
