//! Middleware components for the upload service

pub mod logging;
