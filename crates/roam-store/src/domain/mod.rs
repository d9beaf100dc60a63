//! Domain Layer - Pure settings logic
//!
//! This layer contains:
//! - Scope and setting path types
//! - Store limits and their builder
//! - Container resolution over the store port
//! - Typed property access
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod limits;
pub mod path;
pub mod property;
pub mod resolver;
pub mod scope;

pub use limits::{StoreLimits, StoreLimitsBuilder};
pub use path::{SettingPath, MAX_SEGMENT_LEN, PATH_SEPARATOR};
pub use property::PropertyStore;
pub use resolver::{ResolveMode, ResolvedSetting, ScopedContainerResolver};
pub use scope::Scope;
