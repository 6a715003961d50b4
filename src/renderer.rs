use image::{Rgba, RgbaImage};

use crate::{
    color::blend_over,
    math::{Pixels, Point, Size, UNIT_QUAD},
    scene::Scene,
    texture::{SubTexture, Texture},
    transform::Affine,
    Color,
};

/// Draws scenes. Implemented by whatever owns the pixels being presented.
pub trait Engine {
    /// Makes `image` available for drawing and returns its handle.
    fn load_texture(&mut self, image: RgbaImage) -> Texture;

    /// Draws `scene` into a frame of `size` pixels and returns the frame.
    fn render(&mut self, scene: &Scene, size: Size<u32>) -> &RgbaImage;

    /// Frees everything the engine holds. The engine may not be used
    /// afterwards.
    fn release(&mut self);
}

/// An [`Engine`] that composites on the CPU into an [`RgbaImage`].
///
/// Each node with a sub-texture is drawn as its unit quad mapped through the
/// node's world transform, sampling the texture region with nearest-neighbour
/// filtering and alpha blending over what is already drawn.
#[derive(Debug)]
pub struct SoftwareEngine {
    clear_color: Color,
    frame: RgbaImage,
    loaded_textures: usize,
}

impl SoftwareEngine {
    /// Returns an engine that clears every frame to `clear_color`.
    #[must_use]
    pub fn new(clear_color: Color) -> Self {
        Self {
            clear_color,
            frame: RgbaImage::new(0, 0),
            loaded_textures: 0,
        }
    }

    /// The most recently rendered frame.
    #[must_use]
    pub const fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// The number of textures loaded through this engine.
    #[must_use]
    pub const fn loaded_textures(&self) -> usize {
        self.loaded_textures
    }

    fn draw_quad(&mut self, source: &SubTexture, world: &Affine) {
        let inverse = match world.inverse() {
            Some(inverse) => inverse,
            None => return,
        };

        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for corner in &UNIT_QUAD {
            let corner = world.transform_point(*corner);
            min_x = min_x.min(corner.x);
            min_y = min_y.min(corner.y);
            max_x = max_x.max(corner.x);
            max_y = max_y.max(corner.y);
        }
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            return;
        }

        let (width, height) = self.frame.dimensions();
        let left = min_x.floor().max(0.) as u32;
        let top = min_y.floor().max(0.) as u32;
        let right = max_x.ceil().min(width as f32).max(0.) as u32;
        let bottom = max_y.ceil().min(height as f32).max(0.) as u32;

        for y in top..bottom {
            for x in left..right {
                let center = Point::<f32, Pixels>::new(x as f32 + 0.5, y as f32 + 0.5);
                let uv = inverse.transform_point(center);
                if let Some(texel) = source.sample(uv.x, uv.y) {
                    let pixel = self.frame.get_pixel_mut(x, y);
                    *pixel = blend_over(*pixel, texel, 1.);
                }
            }
        }
    }
}

impl Default for SoftwareEngine {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

impl Engine for SoftwareEngine {
    fn load_texture(&mut self, image: RgbaImage) -> Texture {
        self.loaded_textures += 1;
        let texture = Texture::from_rgba(image);
        tracing::debug!(id = texture.id(), size = ?texture.size(), "texture loaded");
        texture
    }

    fn render(&mut self, scene: &Scene, size: Size<u32>) -> &RgbaImage {
        let clear: Rgba<u8> = self.clear_color.into();
        if self.frame.dimensions() == (size.width, size.height) {
            for pixel in self.frame.pixels_mut() {
                *pixel = clear;
            }
        } else {
            self.frame = RgbaImage::from_pixel(size.width, size.height, clear);
        }

        let mut draws = Vec::new();
        scene.walk(|_, node, world| {
            if let Some(source) = node.sub_texture() {
                draws.push((source.clone(), world));
            }
        });
        for (source, world) in &draws {
            self.draw_quad(source, world);
        }
        tracing::trace!(quads = draws.len(), ?size, "rendered frame");

        &self.frame
    }

    fn release(&mut self) {
        tracing::debug!(textures = self.loaded_textures, "releasing software engine");
        self.frame = RgbaImage::new(0, 0);
        self.loaded_textures = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::Spin,
        math::Rect,
        scene::Scene,
        sprite::SpriteDescriptor,
        transform::compute_transform,
    };

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn red_sprite(engine: &mut SoftwareEngine) -> SpriteDescriptor {
        let texture = engine.load_texture(RgbaImage::from_pixel(4, 2, RED));
        SpriteDescriptor::new(
            Point::new(10., 10.),
            Size::new(20., 10.),
            SubTexture::entire(texture).unwrap(),
        )
    }

    #[test]
    fn clears_to_the_requested_size() {
        let mut engine = SoftwareEngine::new(Color::BLACK);
        let frame = engine.render(&Scene::new(), Size::new(8, 4));
        assert_eq!(frame.dimensions(), (8, 4));
        assert!(frame.pixels().all(|pixel| *pixel == Rgba([0, 0, 0, 255])));

        let frame = engine.render(&Scene::new(), Size::new(3, 3));
        assert_eq!(frame.dimensions(), (3, 3));
    }

    #[test]
    fn draws_an_unrotated_sprite() {
        let mut engine = SoftwareEngine::default();
        let mut scene = Scene::new();
        let sprite = red_sprite(&mut engine);
        scene
            .append_sprite(scene.root(), sprite, Spin::default())
            .unwrap();

        let frame = engine.render(&scene, Size::new(40, 30));
        assert_eq!(frame.get_pixel(10, 10), &RED);
        assert_eq!(frame.get_pixel(29, 19), &RED);
        assert_eq!(frame.get_pixel(30, 19), &WHITE);
        assert_eq!(frame.get_pixel(29, 20), &WHITE);
        assert_eq!(frame.get_pixel(9, 10), &WHITE);
        assert_eq!(engine.loaded_textures(), 1);
    }

    #[test]
    fn draws_a_quarter_turn() {
        let mut engine = SoftwareEngine::default();
        let mut scene = Scene::new();
        let sprite = red_sprite(&mut engine);
        let node = scene
            .append_sprite(scene.root(), sprite, Spin::default())
            .unwrap();
        scene
            .set_transform(
                node,
                compute_transform(std::f32::consts::FRAC_PI_2, 10., 10., 20., 10.),
            )
            .unwrap();
        scene
            .set_arrangement(node, crate::scene::Arrangement::Static)
            .unwrap();

        let frame = engine.render(&scene, Size::new(40, 30));
        // The 20x10 quad centered on (20, 15) now stands 10 wide and 20 tall.
        assert_eq!(frame.get_pixel(20, 6), &RED);
        assert_eq!(frame.get_pixel(20, 24), &RED);
        assert_eq!(frame.get_pixel(12, 15), &WHITE);
        assert_eq!(frame.get_pixel(27, 15), &WHITE);
    }

    #[test]
    fn draws_only_the_region() {
        let mut engine = SoftwareEngine::default();
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        image.put_pixel(1, 1, RED);
        let texture = engine.load_texture(image);
        let source = SubTexture::new(texture, Rect::new(Point::new(1, 1), Size::new(1, 1))).unwrap();

        let mut scene = Scene::new();
        let node = scene.append_child(scene.root()).unwrap();
        scene.set_sub_texture(node, Some(source)).unwrap();
        scene
            .set_transform(node, compute_transform(0., 0., 0., 4., 4.))
            .unwrap();

        let frame = engine.render(&scene, Size::new(4, 4));
        assert!(frame.pixels().all(|pixel| *pixel == RED));
    }

    #[test]
    fn degenerate_quads_draw_nothing() {
        let mut engine = SoftwareEngine::default();
        let mut scene = Scene::new();
        let sprite = red_sprite(&mut engine);
        let node = scene
            .append_sprite(scene.root(), sprite, Spin::default())
            .unwrap();
        scene
            .set_transform(node, compute_transform(0.3, 10., 10., 0., 10.))
            .unwrap();
        scene
            .set_arrangement(node, crate::scene::Arrangement::Static)
            .unwrap();

        let frame = engine.render(&scene, Size::new(40, 30));
        assert!(frame.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn offscreen_quads_are_clipped() {
        let mut engine = SoftwareEngine::default();
        let mut scene = Scene::new();
        let sprite = red_sprite(&mut engine);
        let node = scene
            .append_sprite(scene.root(), sprite, Spin::default())
            .unwrap();
        scene
            .set_transform(node, compute_transform(0., -15., -5., 20., 10.))
            .unwrap();
        scene
            .set_arrangement(node, crate::scene::Arrangement::Static)
            .unwrap();

        let frame = engine.render(&scene, Size::new(10, 10));
        assert_eq!(frame.get_pixel(0, 0), &RED);
        assert_eq!(frame.get_pixel(4, 4), &RED);
        assert_eq!(frame.get_pixel(5, 5), &WHITE);
    }

    #[test]
    fn release_resets() {
        let mut engine = SoftwareEngine::default();
        red_sprite(&mut engine);
        engine.render(&Scene::new(), Size::new(2, 2));
        engine.release();
        assert_eq!(engine.frame().dimensions(), (0, 0));
        assert_eq!(engine.loaded_textures(), 0);
    }
}
