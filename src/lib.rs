//! Sprite scene graph with rotating textured quads.
//!
//! A [`Scene`](scene::Scene) holds nodes that draw a region of a
//! [`Texture`](texture::Texture) through a 2x3 [`Affine`](transform::Affine)
//! transform applied to the unit quad. Nodes arranged with
//! [`Arrangement::Spin`](scene::Arrangement::Spin) get their transform
//! recomputed every frame by [`compute_transform`](transform::compute_transform).
//!
//! The [`app`] module provides a headless host: an event queue delivering
//! lifecycle, size, paint and touch events, and a [`Runtime`](app::Runtime)
//! that drives a [`Sketch`](app::Sketch) through a
//! [`SoftwareEngine`](renderer::SoftwareEngine).

#![forbid(unsafe_code)]
#![warn(
    clippy::cargo,
    missing_docs,
    clippy::nursery,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::multiple_crate_versions,
)]

/// The host event model and headless runtime.
pub mod app;
/// Frame counting and the frame-to-angle driving policy.
pub mod clock;
mod color;
mod error;
/// Unit-tagged geometry types.
pub mod math;
/// The [`Engine`](renderer::Engine) seam and the software compositor.
pub mod renderer;
/// The node graph that gets arranged and rendered each frame.
pub mod scene;
/// Sprite descriptors.
pub mod sprite;
/// Rasterizing text into textures.
pub mod text;
/// Frame pacing and frame rate measurement.
pub mod timing;
/// Textures and sub-textures.
pub mod texture;
/// The rotation transform calculator.
pub mod transform;

// Re-exports
pub use euclid;
pub use image;
pub use rusttype;

pub use self::{color::Color, error::Error};

/// A collection of commonly used exports provided by this crate.
pub mod prelude {
    pub use super::{
        app::{
            Cross, Discard, Event, FrameSink, LifecycleEvent, PaintEvent, RunSummary, Runtime,
            RuntimeConfig, SizeEvent, Sketch, Stage, TouchEvent, TouchType,
        },
        clock::{FrameCounter, Spin, Tick, Time},
        math::{Angle, Pixels, Point, Rect, Size, UnitQuad, Vector},
        renderer::{Engine, SoftwareEngine},
        scene::{Arrangement, Node, NodeId, Scene},
        sprite::SpriteDescriptor,
        text::{Font, Label},
        texture::{SubTexture, Texture},
        transform::{compute_transform, compute_unit_pivot_transform, Affine},
        Color, Error,
    };
    #[cfg(feature = "png")]
    pub use super::app::PngSequence;
}

/// Alias for [`std::result::Result`] where the error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
