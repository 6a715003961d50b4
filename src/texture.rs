use std::{
    convert::TryFrom,
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use lazy_static::lazy_static;

use crate::{
    math::{Point, Rect, Size},
    Error,
};

lazy_static! {
    static ref GLOBAL_ID_CELL: AtomicU64 = AtomicU64::new(0);
}

/// An image that can be drawn by sprites. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Texture {
    id: u64,
    image: Arc<RgbaImage>,
}

impl Texture {
    /// The unique ID of this texture. This depends on load order and is not
    /// related to the image data in any way.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Creates a new texture from an image.
    #[must_use]
    pub fn new(image: &DynamicImage) -> Self {
        Self::from_rgba(image.to_rgba8())
    }

    /// Creates a new texture taking ownership of RGBA pixel data.
    #[must_use]
    pub fn from_rgba(image: RgbaImage) -> Self {
        let id = GLOBAL_ID_CELL.fetch_add(1, Ordering::SeqCst);
        Self {
            id,
            image: Arc::new(image),
        }
    }

    /// Loads a texture from an image at `path`. The format is guessed from
    /// the file's contents.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let texture = Self::try_from(bytes.as_slice())?;
        tracing::debug!(
            path = %path.display(),
            id = texture.id,
            width = texture.image.width(),
            height = texture.image.height(),
            "loaded texture"
        );
        Ok(texture)
    }

    /// Returns the size of the image.
    #[must_use]
    pub fn size(&self) -> Size<u32> {
        let (w, h) = self.image.dimensions();
        Size::new(w, h)
    }

    /// Returns the pixel data behind the texture.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl<'a> TryFrom<&'a [u8]> for Texture {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> crate::Result<Self> {
        let img = image::load_from_memory(bytes)?;

        Ok(Self::new(&img))
    }
}

/// A rectangular region of a [`Texture`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SubTexture {
    texture: Texture,
    region: Rect<u32>,
}

impl SubTexture {
    /// Creates a sub-texture covering `region` of `texture`.
    ///
    /// The region must be non-empty and lie entirely within the texture.
    pub fn new(texture: Texture, region: Rect<u32>) -> crate::Result<Self> {
        let size = texture.size();
        let fits = region.size.width > 0
            && region.size.height > 0
            && region
                .origin
                .x
                .checked_add(region.size.width)
                .map_or(false, |right| right <= size.width)
            && region
                .origin
                .y
                .checked_add(region.size.height)
                .map_or(false, |bottom| bottom <= size.height);
        if fits {
            Ok(Self { texture, region })
        } else {
            Err(Error::RegionOutOfBounds {
                region,
                texture: size,
            })
        }
    }

    /// Creates a sub-texture for an entire texture.
    pub fn entire(texture: Texture) -> crate::Result<Self> {
        let region = Rect::new(Point::origin(), texture.size());
        Self::new(texture, region)
    }

    /// The texture the region is taken from.
    #[must_use]
    pub const fn texture(&self) -> &Texture {
        &self.texture
    }

    /// The region of the texture.
    #[must_use]
    pub const fn region(&self) -> Rect<u32> {
        self.region
    }

    /// Samples the nearest pixel at `(u, v)`, where `(0, 0)` is the region's
    /// top-left corner and `(1, 1)` its bottom-right. Returns `None` outside
    /// the region.
    #[must_use]
    pub fn sample(&self, u: f32, v: f32) -> Option<Rgba<u8>> {
        if !(0. ..1.).contains(&u) || !(0. ..1.).contains(&v) {
            return None;
        }
        let x = ((u * self.region.size.width as f32) as u32).min(self.region.size.width - 1);
        let y = ((v * self.region.size.height as f32) as u32).min(self.region.size.height - 1);
        Some(*self.texture.image.get_pixel(
            self.region.origin.x + x,
            self.region.origin.y + y,
        ))
    }

    /// Copies the region out into its own image.
    #[must_use]
    pub fn to_image(&self) -> RgbaImage {
        self.texture
            .image
            .view(
                self.region.origin.x,
                self.region.origin.y,
                self.region.size.width,
                self.region.size.height,
            )
            .to_image()
    }
}
