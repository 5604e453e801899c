//! Storage roots and repository path resolution.

pub mod locator;

pub use locator::{LocatedRepository, Locator, LocatorError};
