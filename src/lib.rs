//! ticky - a command-line client for TickTick
//!
//! This library provides OAuth authentication with transparent token refresh,
//! a typed client for the TickTick Open API, inbox discovery, and the
//! human-friendly date and priority parsers used by the `ticky` binary.
//!
//! # Modules
//!
//! * [`auth`] - OAuth login flow, callback listener, and token persistence
//! * [`backend`] - API client and inbox discovery
//! * [`cli`] - Command definitions and output formatting
//! * [`config`] - Application configuration management
//! * [`ticktick`] - TickTick wire models
//! * [`utils`] - Date and priority parsing

/// OAuth login, token storage, and access-token resolution
pub mod auth;

/// Remote operations and the TickTick HTTP client
pub mod backend;

/// Command-line interface
pub mod cli;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Library error type
pub mod error;

/// Logging setup
pub mod logger;

/// TickTick API data models
pub mod ticktick;

/// Utility functions for dates and priorities
pub mod utils;

pub use error::{Error, Result};
