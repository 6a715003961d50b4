use crate::{
    math::{Angle, Point, Size},
    texture::SubTexture,
    transform::{compute_transform, Affine},
};

/// Where and how large a sprite is drawn, and which texture region it shows.
///
/// Fixed once the scene is built. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SpriteDescriptor {
    position: Point<f32>,
    size: Size<f32>,
    source: SubTexture,
}

impl SpriteDescriptor {
    /// Returns a descriptor drawing `source` stretched to `size`, anchored at
    /// `position`.
    #[must_use]
    pub const fn new(position: Point<f32>, size: Size<f32>, source: SubTexture) -> Self {
        Self {
            position,
            size,
            source,
        }
    }

    /// Returns a descriptor drawing `source` at its natural pixel size.
    #[must_use]
    pub fn natural(position: Point<f32>, source: SubTexture) -> Self {
        let size = source.region().size.to_f32();
        Self::new(position, size, source)
    }

    /// The anchor position in screen pixels.
    #[must_use]
    pub const fn position(&self) -> Point<f32> {
        self.position
    }

    /// The drawn size in screen pixels.
    #[must_use]
    pub const fn size(&self) -> Size<f32> {
        self.size
    }

    /// The texture region drawn.
    #[must_use]
    pub const fn source(&self) -> &SubTexture {
        &self.source
    }

    /// Returns the transform drawing this sprite rotated by `angle` about its
    /// center.
    pub fn transform(&self, angle: Angle) -> Affine {
        compute_transform(
            angle.radians,
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use image::RgbaImage;

    use super::*;
    use crate::{math::Rect, texture::Texture};

    #[test]
    fn natural_size_comes_from_the_region() {
        let texture = Texture::from_rgba(RgbaImage::new(64, 64));
        let source =
            SubTexture::new(texture, Rect::new(Point::new(8, 8), Size::new(32, 16))).unwrap();
        let sprite = SpriteDescriptor::natural(Point::new(5., 6.), source);
        assert_eq!(sprite.size(), Size::new(32., 16.));
        assert_abs_diff_eq!(
            sprite.transform(Angle::zero()),
            compute_transform(0., 5., 6., 32., 16.)
        );
    }
}
