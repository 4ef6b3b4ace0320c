//! tintype-export: Pure output serializers (sans-IO)
//!
//! Turns filtered images into bytes: single PNGs, gzip-compressed tar
//! archives of a whole filter catalog, and side-by-side previews.
//! Nothing here touches the filesystem; callers decide where bytes go.

pub mod archive;
pub mod png;
pub mod preview;

pub use archive::{archive_name, bundle_catalog};
pub use png::encode_png;
pub use preview::side_by_side;

/// Errors that can occur while serializing output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// PNG encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// Writing the archive stream failed.
    #[error("failed to build archive: {0}")]
    Archive(#[from] std::io::Error),
}
