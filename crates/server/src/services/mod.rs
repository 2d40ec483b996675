//! Services used by the route handlers.
//!
//! # Services
//!
//! - `images` - Profile image storage (local filesystem adapter)

pub mod images;

#[cfg(test)]
pub use images::MockImageStore;
pub use images::{ImageStore, ImageStoreError, LocalImageStore};
