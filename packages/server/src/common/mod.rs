// Common types and utilities shared across the application

pub mod content_hash;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod pagination;
pub mod response;

pub use content_hash::generate_content_hash;
pub use entity_ids::*;
pub use error::ApiError;
pub use id::Id;
pub use pagination::{Cursor, Page};
pub use response::{ok, ApiResponse, ApiResult};
