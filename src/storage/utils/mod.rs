// Utilities for storage module
pub mod cursor;
pub mod error;
pub mod path;
