//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;
pub mod query;
pub mod reference;

pub use id::*;
pub use pagination::{PageRequest, PageResponse};
pub use query::{QuerySpec, SortDirection};
pub use reference::{Reference, ReferenceKind};
