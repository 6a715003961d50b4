use approx::relative_eq;
use image::Rgba;

/// A RGBA color with f32 components in the range `0.0..=1.0`.
#[derive(Default, Clone, Debug, Copy, PartialEq)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0., 0., 0., 1.);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1., 1., 1., 1.);
    /// Opaque red.
    pub const RED: Self = Self::new(1., 0., 0., 1.);
    /// Fully transparent black.
    pub const CLEAR: Self = Self::new(0., 0., 0., 0.);

    /// Creates a color from its components.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> f32 {
        self.r
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> f32 {
        self.g
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> f32 {
        self.b
    }

    /// Returns the alpha component.
    #[must_use]
    pub const fn alpha(&self) -> f32 {
        self.a
    }

    /// Returns if the color has a non-zero alpha value.
    #[must_use]
    pub fn visible(&self) -> bool {
        !relative_eq!(self.a, 0.)
    }

    /// Returns a new color using red, green, and blue from `self` and the
    /// parameter `alpha`.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0., 1.) * 255.).round() as u8
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Self([
            to_channel(color.r),
            to_channel(color.g),
            to_channel(color.b),
            to_channel(color.a),
        ])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(Rgba([r, g, b, a]): Rgba<u8>) -> Self {
        Self::new(
            f32::from(r) / 255.,
            f32::from(g) / 255.,
            f32::from(b) / 255.,
            f32::from(a) / 255.,
        )
    }
}

/// Blends `source` over `destination` with an extra `coverage` factor applied
/// to the source alpha.
pub(crate) fn blend_over(destination: Rgba<u8>, source: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let alpha = f32::from(source[3]) / 255. * coverage.clamp(0., 1.);
    if alpha <= 0. {
        return destination;
    }
    let dst_alpha = f32::from(destination[3]) / 255.;
    let out_alpha = alpha + dst_alpha * (1. - alpha);
    let mut out = [0_u8; 4];
    for channel in 0..3 {
        let src = f32::from(source[channel]) / 255.;
        let dst = f32::from(destination[channel]) / 255.;
        let value = if out_alpha > 0. {
            (src * alpha + dst * dst_alpha * (1. - alpha)) / out_alpha
        } else {
            0.
        };
        out[channel] = to_channel(value);
    }
    out[3] = to_channel(out_alpha);
    Rgba(out)
}
