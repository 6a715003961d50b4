use std::ops::Mul;

use approx::AbsDiffEq;
use euclid::Transform2D;

use crate::math::{Angle, Pixels, Point, UnitQuad};

/// A 2x3 affine matrix `{{a, b, c}, {d, e, f}}` mapping the unit quad into
/// screen space.
///
/// A point `(x, y)` maps to `(a*x + b*y + c, d*x + e*y + f)`. The builder
/// methods post-multiply: `m.translate(x, y)` yields `m * T(x, y)`, so the
/// operation appended last is the first one applied to a point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub struct Affine(Transform2D<f32, UnitQuad, Pixels>);

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    /// Returns the identity transform.
    pub fn identity() -> Self {
        Self(Transform2D::identity())
    }

    /// Returns a transform from its two rows.
    pub fn from_rows([[a, b, c], [d, e, f]]: [[f32; 3]; 2]) -> Self {
        Self(Transform2D::new(a, d, b, e, c, f))
    }

    /// Returns the two rows of the matrix.
    #[must_use]
    pub const fn rows(&self) -> [[f32; 3]; 2] {
        let m = &self.0;
        [[m.m11, m.m21, m.m31], [m.m12, m.m22, m.m32]]
    }

    /// Post-multiplies a translation by `(x, y)`.
    pub fn translate(self, x: f32, y: f32) -> Self {
        self.compose(Transform2D::translation(x, y))
    }

    /// Post-multiplies a counter-clockwise rotation by `angle`.
    pub fn rotate(self, angle: Angle) -> Self {
        self.compose(Transform2D::rotation(angle))
    }

    /// Post-multiplies a scale by `(x, y)`.
    pub fn scale(self, x: f32, y: f32) -> Self {
        self.compose(Transform2D::scale(x, y))
    }

    fn compose(self, op: Transform2D<f32, UnitQuad, UnitQuad>) -> Self {
        Self(op.then(&self.0))
    }

    /// Maps `point` from unit-quad space into screen space.
    #[must_use]
    pub fn transform_point(&self, point: Point<f32, UnitQuad>) -> Point<f32, Pixels> {
        self.0.transform_point(point)
    }

    /// Returns the determinant of the linear part. Zero when the quad
    /// collapses onto a line or a point.
    #[must_use]
    pub fn determinant(&self) -> f32 {
        self.0.determinant()
    }

    /// Returns the transform mapping screen space back into unit-quad space,
    /// or `None` when the transform is degenerate.
    #[must_use]
    pub fn inverse(&self) -> Option<Transform2D<f32, Pixels, UnitQuad>> {
        self.0.inverse()
    }
}

impl Mul for Affine {
    type Output = Self;

    /// `self * rhs`: `rhs` is applied to a point first.
    fn mul(self, rhs: Self) -> Self {
        let [[a, b, c], [d, e, f]] = rhs.rows();
        self.compose(Transform2D::new(a, d, b, e, c, f))
    }
}

impl AbsDiffEq for Affine {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.0
            .to_array()
            .iter()
            .zip(other.0.to_array().iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

/// Returns the transform that draws the unit quad as a `width` x `height`
/// sprite anchored at `(position_x, position_y)`, rotated by `angle_radians`
/// about its own center.
///
/// At an angle of zero the quad's `(0, 0)` corner lands on the position and
/// `(1, 1)` on the position plus the size. The angle is not normalized and
/// the size is not validated: zero or negative sizes produce a degenerate
/// transform rather than an error.
pub fn compute_transform(
    angle_radians: f32,
    position_x: f32,
    position_y: f32,
    width: f32,
    height: f32,
) -> Affine {
    let (half_width, half_height) = (width / 2., height / 2.);
    Affine::identity()
        .translate(position_x, position_y)
        .translate(half_width, half_height)
        .rotate(Angle::radians(angle_radians))
        .translate(-half_width, -half_height)
        .scale(width, height)
}

/// Returns the transform built with the pivot shift expressed in unit-quad
/// units around the scale: translate by the position, translate by
/// `(0.5, 0.5)`, rotate, scale, translate by `(-0.5, -0.5)`.
///
/// The sprite still rotates about its own center, but that center sits at
/// `position + (0.5, 0.5)` rather than `position + size / 2`.
pub fn compute_unit_pivot_transform(
    angle_radians: f32,
    position_x: f32,
    position_y: f32,
    width: f32,
    height: f32,
) -> Affine {
    Affine::identity()
        .translate(position_x, position_y)
        .translate(0.5, 0.5)
        .rotate(Angle::radians(angle_radians))
        .scale(width, height)
        .translate(-0.5, -0.5)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{PI, TAU};

    use approx::assert_abs_diff_eq;

    use super::*;

    fn assert_maps(transform: &Affine, from: (f32, f32), to: (f32, f32)) {
        let mapped = transform.transform_point(Point::new(from.0, from.1));
        assert_abs_diff_eq!(mapped.x, to.0, epsilon = 1e-3);
        assert_abs_diff_eq!(mapped.y, to.1, epsilon = 1e-3);
    }

    #[test]
    fn zero_angle_is_translate_then_scale() {
        let transform = compute_transform(0., 200., 200., 250., 40.);
        assert_abs_diff_eq!(
            transform,
            Affine::from_rows([[250., 0., 200.], [0., 40., 200.]]),
            epsilon = 1e-4
        );
        assert_maps(&transform, (0., 0.), (200., 200.));
        assert_maps(&transform, (1., 1.), (450., 240.));
    }

    #[test]
    fn half_turn_reflects_about_center() {
        let transform = compute_transform(PI, 200., 200., 250., 40.);
        assert_maps(&transform, (0., 0.), (450., 240.));
        assert_maps(&transform, (1., 1.), (200., 200.));
        assert_maps(&transform, (0.5, 0.5), (325., 220.));
    }

    #[test]
    fn quarter_turn_keeps_center() {
        let transform = compute_transform(PI / 2., 10., 20., 100., 50.);
        assert_maps(&transform, (0.5, 0.5), (60., 45.));
        assert_maps(&transform, (0., 0.), (85., -5.));
    }

    #[test]
    fn periodic_in_full_turns() {
        for &angle in &[0., 0.3, 1., 2.5, -4.] {
            assert_abs_diff_eq!(
                compute_transform(angle, 12., -7., 64., 32.),
                compute_transform(angle + TAU, 12., -7., 64., 32.),
                epsilon = 1e-3
            );
        }
    }

    #[test]
    fn rotation_round_trip() {
        let theta = 0.7;
        let spun = compute_transform(theta, 0., 0., 80., 80.);
        let unspun = spun
            * Affine::identity()
                .translate(0.5, 0.5)
                .rotate(Angle::radians(-theta))
                .translate(-0.5, -0.5);
        assert_abs_diff_eq!(unspun, compute_transform(0., 0., 0., 80., 80.), epsilon = 1e-3);
        assert_abs_diff_eq!(
            Affine::identity()
                .rotate(Angle::radians(theta))
                .rotate(Angle::radians(-theta)),
            Affine::identity(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn pure() {
        let first = compute_transform(1.25, 3., 4., 5., 6.);
        let second = compute_transform(1.25, 3., 4., 5., 6.);
        assert_eq!(first.rows(), second.rows());
    }

    #[test]
    fn unbounded_angles() {
        let many_turns = 360. * 1000. * PI / 180.;
        assert_abs_diff_eq!(
            compute_transform(many_turns, 1., 2., 30., 40.),
            compute_transform(0., 1., 2., 30., 40.),
            epsilon = 0.05
        );
    }

    #[test]
    fn degenerate_sizes_still_produce_a_transform() {
        let flat = compute_transform(0.4, 5., 5., 0., 40.);
        assert_abs_diff_eq!(flat.determinant(), 0.);
        assert!(flat.inverse().is_none());

        let mirrored = compute_transform(0., 5., 5., -10., 10.);
        assert_maps(&mirrored, (0., 0.), (5., 5.));
        assert_maps(&mirrored, (1., 1.), (-5., 15.));
    }

    #[test]
    fn unit_pivot_order() {
        let transform = compute_unit_pivot_transform(0., 200., 200., 250., 40.);
        assert_maps(&transform, (0., 0.), (75.5, 180.5));
        assert_maps(&transform, (1., 1.), (325.5, 220.5));
        assert_maps(&transform, (0.5, 0.5), (200.5, 200.5));

        let spun = compute_unit_pivot_transform(PI, 200., 200., 250., 40.);
        assert_maps(&spun, (0.5, 0.5), (200.5, 200.5));
        assert_maps(&spun, (0., 0.), (325.5, 220.5));
    }

    #[test]
    fn post_multiplication_order() {
        // Translate then scale: the scale applies to the point first.
        let transform = Affine::identity().translate(10., 0.).scale(2., 3.);
        assert_maps(&transform, (1., 1.), (12., 3.));
        assert_eq!(transform.rows(), [[2., 0., 10.], [0., 3., 0.]]);
    }

    #[test]
    fn multiplication_matches_builder() {
        let left = Affine::identity().translate(4., 5.);
        let right = Affine::identity().scale(2., 2.);
        assert_abs_diff_eq!(left * right, left.scale(2., 2.));
        assert_abs_diff_eq!(Affine::identity() * left, left);
    }
}
