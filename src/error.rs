use std::path::PathBuf;

use crate::math::{Rect, Size};

/// All errors that `twirl` can return.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error decoding or encoding an image.
    #[error("error reading image: {0}")]
    Image(#[from] image::ImageError),
    /// An error reading a file from disk.
    #[error("error reading {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The bytes given were not a TrueType or OpenType font.
    #[error("invalid font data")]
    InvalidFont,
    /// A sub-texture region does not fit within its texture.
    #[error("region {region:?} does not fit within a texture of size {texture:?}")]
    RegionOutOfBounds {
        /// The requested region.
        region: Rect<u32>,
        /// The size of the texture the region was taken from.
        texture: Size<u32>,
    },
    /// A node id did not refer to a node in the scene.
    #[error("node is not part of this scene")]
    UnknownNode,
}
