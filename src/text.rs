use std::{
    fmt,
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use image::{Rgba, RgbaImage};
use lazy_static::lazy_static;
use rusttype::{point, Scale};

use crate::{
    color::blend_over,
    math::{Point, Size},
    texture::Texture,
    Color, Error,
};

lazy_static! {
    static ref GLOBAL_ID_CELL: AtomicU64 = AtomicU64::new(0);
}

/// Embeds a font file in the binary and parses it into a [`Font`].
///
/// The path is resolved like [`include_bytes!`], relative to the file the
/// macro is invoked from.
#[macro_export]
macro_rules! include_font {
    ($path:expr) => {{
        let bytes = std::include_bytes!($path);
        $crate::text::Font::from_static(bytes as &'static [u8])
    }};
}

/// Fonts compiled into the crate.
#[cfg(feature = "bundled-fonts")]
pub mod bundled_fonts {
    use lazy_static::lazy_static;

    use super::Font;
    use crate::Error;

    lazy_static! {
        static ref DEJAVU_SANS: Option<Font> =
            include_font!("../fonts/dejavu/DejaVuSans.ttf").ok();
    }

    /// DejaVu Sans, under the Bitstream Vera license.
    pub fn dejavu_sans() -> crate::Result<Font> {
        DEJAVU_SANS.clone().ok_or(Error::InvalidFont)
    }
}

/// A TrueType or OpenType font. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Font {
    handle: Arc<FontData>,
}

struct FontData {
    id: u64,
    font: rusttype::Font<'static>,
}

impl fmt::Debug for FontData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontData")
            .field("id", &self.id)
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl Font {
    /// Parses font data.
    pub fn try_from_bytes(bytes: Vec<u8>) -> crate::Result<Self> {
        rusttype::Font::try_from_vec(bytes)
            .map(Self::from_rusttype)
            .ok_or(Error::InvalidFont)
    }

    /// Parses font data that lives for the whole program, such as the output
    /// of [`include_bytes!`].
    pub fn from_static(bytes: &'static [u8]) -> crate::Result<Self> {
        rusttype::Font::try_from_bytes(bytes)
            .map(Self::from_rusttype)
            .ok_or(Error::InvalidFont)
    }

    fn from_rusttype(font: rusttype::Font<'static>) -> Self {
        let id = GLOBAL_ID_CELL.fetch_add(1, Ordering::SeqCst);
        Self {
            handle: Arc::new(FontData { id, font }),
        }
    }

    /// Reads and parses the font file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Self::try_from_bytes(bytes)?;
        tracing::debug!(path = %path.display(), id = font.id(), "loaded font");
        Ok(font)
    }

    /// The unique ID of this font, in load order.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.handle.id
    }

    /// Returns the horizontal advance of `text` laid out on one line at
    /// `pixel_size`, kerning included.
    #[must_use]
    pub fn measure(&self, text: &str, pixel_size: f32) -> f32 {
        self.handle
            .font
            .layout(text, Scale::uniform(pixel_size), point(0., 0.))
            .last()
            .map_or(0., |glyph| {
                glyph.position().x + glyph.unpositioned().h_metrics().advance_width
            })
    }
}

/// A single line of text rendered centered into a fixed-size image.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Label {
    text: String,
    size: Size<u32>,
    font_size: f32,
    dpi: f32,
    foreground: Color,
    background: Color,
}

impl Label {
    /// Returns a label for `text` drawn into an image of `size` pixels, 30pt
    /// at 72 dpi, red on black.
    pub fn new(text: impl Into<String>, size: Size<u32>) -> Self {
        Self {
            text: text.into(),
            size,
            font_size: 30.,
            dpi: 72.,
            foreground: Color::RED,
            background: Color::BLACK,
        }
    }

    /// Sets the font size in points.
    pub const fn with_font_size(mut self, points: f32) -> Self {
        self.font_size = points;
        self
    }

    /// Sets the resolution used to convert points to pixels.
    pub const fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Sets the text color.
    pub const fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = color;
        self
    }

    /// Sets the color the image is filled with before drawing the text.
    pub const fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// The text drawn.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The size of the rendered image.
    #[must_use]
    pub const fn size(&self) -> Size<u32> {
        self.size
    }

    /// The font size converted to pixels.
    #[must_use]
    pub fn pixel_size(&self) -> f32 {
        self.font_size * self.dpi / 72.
    }

    /// Returns where the pen starts for text `text_width` pixels wide: centered
    /// horizontally, with the baseline one pixel size below the top edge.
    #[must_use]
    pub fn pen_origin(&self, text_width: f32) -> Point<f32> {
        let center = (self.size.width / 2) as f32;
        Point::new(center - text_width / 2., self.pixel_size().trunc())
    }

    /// Rasterizes the label with `font`. Glyphs falling outside the image are
    /// clipped.
    #[must_use]
    pub fn render(&self, font: &Font) -> RgbaImage {
        let mut image =
            RgbaImage::from_pixel(self.size.width, self.size.height, self.background.into());
        let foreground: Rgba<u8> = self.foreground.into();
        let pixel_size = self.pixel_size();
        let origin = self.pen_origin(font.measure(&self.text, pixel_size));
        let (width, height) = (self.size.width as i32, self.size.height as i32);

        let glyphs = font.handle.font.layout(
            &self.text,
            Scale::uniform(pixel_size),
            point(origin.x, origin.y),
        );
        for glyph in glyphs {
            if let Some(bounds) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    let x = bounds.min.x + gx as i32;
                    let y = bounds.min.y + gy as i32;
                    if (0..width).contains(&x) && (0..height).contains(&y) {
                        let pixel = image.get_pixel_mut(x as u32, y as u32);
                        *pixel = blend_over(*pixel, foreground, coverage);
                    }
                });
            }
        }
        tracing::trace!(text = %self.text, width = origin.x, "rendered label");

        image
    }

    /// Rasterizes the label into a new texture.
    pub fn to_texture(&self, font: &Font) -> Texture {
        Texture::from_rgba(self.render(font))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_fonts() {
        assert!(matches!(
            Font::try_from_bytes(b"definitely not a font".to_vec()),
            Err(Error::InvalidFont)
        ));
        assert!(matches!(
            Font::load("no/such/font.ttf"),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn pen_is_centered_on_the_baseline() {
        let label = Label::new("Hello", Size::new(250, 40));
        assert!((label.pixel_size() - 30.).abs() < f32::EPSILON);
        assert_eq!(label.pen_origin(100.), Point::new(75., 30.));

        let odd = Label::new("Hello", Size::new(251, 40))
            .with_font_size(12.)
            .with_dpi(100.);
        assert_eq!(odd.pen_origin(0.), Point::new(125., 16.));
    }

    #[test]
    fn builder() {
        let label = Label::new("x", Size::new(1, 1))
            .with_foreground(Color::WHITE)
            .with_background(Color::CLEAR);
        assert_eq!(label.text(), "x");
        assert_eq!(label.size(), Size::new(1, 1));
        assert_eq!(label.foreground, Color::WHITE);
        assert_eq!(label.background, Color::CLEAR);
    }

    #[cfg(feature = "bundled-fonts")]
    fn is_red(pixel: &Rgba<u8>) -> bool {
        pixel[0] > 128 && pixel[1] < 64 && pixel[2] < 64
    }

    #[test]
    #[cfg(feature = "bundled-fonts")]
    fn renders_centered_glyphs() {
        let font = bundled_fonts::dejavu_sans().unwrap();
        let width = font.measure("Hello, Gopher!", 30.);
        assert!(width > 150. && width < 230., "advance was {}", width);

        let image = Label::new("Hello, Gopher!", Size::new(250, 40)).render(&font);
        assert_eq!(image.dimensions(), (250, 40));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(249, 39), &Rgba([0, 0, 0, 255]));

        let red: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, pixel)| is_red(pixel))
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(red.len() > 200, "only {} red pixels", red.len());
        let left = red.iter().map(|(x, _)| *x).min().unwrap();
        let right = red.iter().map(|(x, _)| *x).max().unwrap();
        let middle = (left + right) / 2;
        assert!((115..=135).contains(&middle), "text spans {}..{}", left, right);
    }

    #[test]
    #[cfg(feature = "bundled-fonts")]
    fn oversized_labels_are_clipped() {
        let font = bundled_fonts::dejavu_sans().unwrap();
        let image = Label::new("Hello, Gopher! Hello, Gopher! Hello, Gopher!", Size::new(40, 20))
            .render(&font);
        assert_eq!(image.dimensions(), (40, 20));
        assert!(image.pixels().any(is_red));
    }

    #[test]
    #[cfg(feature = "bundled-fonts")]
    fn bundled_fonts_share_one_parse() {
        let first = bundled_fonts::dejavu_sans().unwrap();
        let second = bundled_fonts::dejavu_sans().unwrap();
        assert_eq!(first.id(), second.id());
        assert!(include_font!("../fonts/dejavu/DejaVuSans.ttf").is_ok());
    }
}
