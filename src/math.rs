/// A unit representing physical pixels on the render target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pixels;

/// A unit representing the space of the unit quad a sprite is drawn into.
///
/// The quad spans `(0, 0)` to `(1, 1)`; a node's transform maps it into
/// [`Pixels`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitQuad;

/// A type representing an x and y coordinate.
pub type Point<T = f32, Unit = Pixels> = euclid::Point2D<T, Unit>;
/// A type representing a width and height.
pub type Size<T = f32, Unit = Pixels> = euclid::Size2D<T, Unit>;
/// A type representing a [`Point`] and [`Size`].
pub type Rect<T = f32, Unit = Pixels> = euclid::Rect<T, Unit>;
/// A type representing a vector with magnitudes x and y.
pub type Vector<T = f32, Unit = Pixels> = euclid::Vector2D<T, Unit>;
/// A type representing an angle of measurement.
pub type Angle = euclid::Angle<f32>;

/// The corners of the unit quad in drawing order: top-left, top-right,
/// bottom-right, bottom-left.
pub const UNIT_QUAD: [Point<f32, UnitQuad>; 4] = [
    Point::new(0., 0.),
    Point::new(1., 0.),
    Point::new(1., 1.),
    Point::new(0., 1.),
];
