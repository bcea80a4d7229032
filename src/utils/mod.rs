//! Utility functions and helpers.

pub mod env;

pub use env::{first_env_with_prefix, get_env_with_prefix};
