#[cfg(feature = "png")]
use std::path::{Path, PathBuf};

use crossbeam::channel::{unbounded, Receiver, Sender};
use image::RgbaImage;
use instant::Instant;

use crate::{
    clock::{FrameCounter, Tick},
    math::Size,
    renderer::{Engine, SoftwareEngine},
    scene::Scene,
    timing::{FpsMeter, FrequencyLimiter},
    Color,
};

/// The stages an app moves through between launch and exit, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Not running, or shut down.
    Dead,
    /// Running but not drawing.
    Alive,
    /// Drawing to the screen.
    Visible,
    /// Drawing and receiving input focus.
    Focused,
}

/// Whether a lifecycle change moves across a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    /// The stage was entered.
    On,
    /// The stage was left.
    Off,
    /// Neither.
    None,
}

/// The app moved from one [`Stage`] to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// The stage before the change.
    pub from: Stage,
    /// The stage after the change.
    pub to: Stage,
}

impl LifecycleEvent {
    /// Returns whether this change enters or leaves `stage`.
    #[must_use]
    pub fn crosses(&self, stage: Stage) -> Cross {
        if self.from < stage && self.to >= stage {
            Cross::On
        } else if self.from >= stage && self.to < stage {
            Cross::Off
        } else {
            Cross::None
        }
    }
}

/// The drawable area changed size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeEvent {
    /// Width in pixels.
    pub width_px: u32,
    /// Height in pixels.
    pub height_px: u32,
    /// Pixels per typographic point.
    pub pixels_per_pt: f32,
}

impl Default for SizeEvent {
    fn default() -> Self {
        Self {
            width_px: 0,
            height_px: 0,
            pixels_per_pt: 1.,
        }
    }
}

impl SizeEvent {
    /// The size in pixels.
    #[must_use]
    pub const fn size(&self) -> Size<u32> {
        Size::new(self.width_px, self.height_px)
    }
}

/// A request to draw a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintEvent {
    /// Set when the request came from outside the app, such as the OS
    /// asking for a redraw. Those are ignored: the app keeps its own
    /// animation loop going.
    pub external: bool,
}

/// The phase of a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchType {
    /// A finger went down.
    Begin,
    /// A finger moved.
    Move,
    /// A finger lifted.
    End,
}

/// A touch on the drawable area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
    /// Identifies the finger across begin, move and end.
    pub sequence: u64,
    /// The phase of the touch.
    pub kind: TouchType,
}

/// An event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The app changed [`Stage`].
    Lifecycle(LifecycleEvent),
    /// The drawable area changed size.
    Size(SizeEvent),
    /// A frame should be drawn.
    Paint(PaintEvent),
    /// A touch happened.
    Touch(TouchEvent),
}

/// The program driven by a [`Runtime`].
pub trait Sketch {
    /// Builds the scene once the app becomes visible. Textures are loaded
    /// through `engine`.
    fn load_scene(&mut self, engine: &mut dyn Engine) -> crate::Result<Scene>;

    /// Called every frame after the scene has been arranged and before it is
    /// rendered.
    fn on_frame(&mut self, _tick: Tick, _scene: &Scene) {}

    /// Called for every touch event.
    fn on_touch(&mut self, _touch: &TouchEvent) {}
}

/// Receives each rendered frame.
pub trait FrameSink {
    /// Presents frame number `frame`.
    fn present(&mut self, frame: u64, image: &RgbaImage) -> crate::Result<()>;
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn present(&mut self, frame: u64, image: &RgbaImage) -> crate::Result<()> {
        T::present(self, frame, image)
    }
}

/// A [`FrameSink`] that drops every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl FrameSink for Discard {
    fn present(&mut self, _frame: u64, _image: &RgbaImage) -> crate::Result<()> {
        Ok(())
    }
}

/// A [`FrameSink`] writing frames as `frame_00001.png`, `frame_00002.png`,
/// ... into a directory.
#[cfg(feature = "png")]
#[derive(Debug, Clone)]
pub struct PngSequence {
    directory: PathBuf,
    every: u64,
}

#[cfg(feature = "png")]
impl PngSequence {
    /// Writes into `directory`, creating it if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> crate::Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory).map_err(|source| crate::Error::Io {
            path: directory.clone(),
            source,
        })?;
        Ok(Self {
            directory,
            every: 1,
        })
    }

    /// Only writes the first frame and every `every`-th one after it.
    #[must_use]
    pub fn with_every(mut self, every: u64) -> Self {
        self.every = every.max(1);
        self
    }

    /// The path frame number `frame` is written to.
    #[must_use]
    pub fn path_for(&self, frame: u64) -> PathBuf {
        self.directory.join(format!("frame_{:05}.png", frame))
    }
}

#[cfg(feature = "png")]
impl FrameSink for PngSequence {
    fn present(&mut self, frame: u64, image: &RgbaImage) -> crate::Result<()> {
        if frame.saturating_sub(1) % self.every == 0 {
            let path = self.path_for(frame);
            image.save(&path)?;
            tracing::trace!(path = %path.display(), "wrote frame");
        }
        Ok(())
    }
}

/// Settings for a [`Runtime`].
#[derive(Debug, Clone)]
#[must_use]
pub struct RuntimeConfig {
    size: Size<u32>,
    frame_limit: Option<u64>,
    frames_per_second: Option<f32>,
    clear_color: Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            size: Size::new(800, 600),
            frame_limit: None,
            frames_per_second: None,
            clear_color: Color::WHITE,
        }
    }
}

impl RuntimeConfig {
    /// Returns the default settings: 800x600, unlimited frames, unpaced,
    /// cleared to white.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the size of the drawable area.
    pub const fn with_size(mut self, size: Size<u32>) -> Self {
        self.size = size;
        self
    }

    /// Stops after `frames` frames have been rendered.
    pub const fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Paces rendering to at most `frames_per_second`.
    pub const fn with_frames_per_second(mut self, frames_per_second: f32) -> Self {
        self.frames_per_second = Some(frames_per_second);
        self
    }

    /// Sets the color every frame is cleared to.
    pub const fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    fn limit_reached(&self, frames: u64) -> bool {
        self.frame_limit.map_or(false, |limit| frames >= limit)
    }
}

/// What happened during [`Runtime::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// The number of frames rendered.
    pub frames: u64,
    /// The frame rate of the last completed one-second window.
    pub frames_per_second: Option<f32>,
}

/// A headless host: delivers events one at a time to a [`Sketch`] and draws
/// with a [`SoftwareEngine`].
#[derive(Debug)]
pub struct Runtime<S> {
    config: RuntimeConfig,
    sink: S,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
}

impl<S: FrameSink> Runtime<S> {
    /// Returns a runtime presenting frames to `sink`.
    pub fn new(config: RuntimeConfig, sink: S) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            config,
            sink,
            sender,
            receiver,
        }
    }

    /// Returns a handle for posting events into the queue.
    #[must_use]
    pub fn sender(&self) -> Sender<Event> {
        self.sender.clone()
    }

    /// The sink frames are presented to.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    fn post(&self, event: Event) {
        let _ = self.sender.send(event);
    }

    /// Runs `sketch` until the app leaves the visible stage and the queue is
    /// empty.
    ///
    /// The app is brought to [`Stage::Visible`], which loads the scene and
    /// starts the paint loop. Every paint advances the frame counter by one,
    /// arranges the scene, renders it and presents it to the sink. When the
    /// frame limit is reached the app drops back to [`Stage::Dead`] and the
    /// engine is released. Errors from loading the scene or presenting a
    /// frame stop the run.
    pub fn run<K: Sketch>(&mut self, sketch: &mut K) -> crate::Result<RunSummary> {
        let start = Instant::now();
        let mut engine: Option<SoftwareEngine> = None;
        let mut scene: Option<Scene> = None;
        let mut size = SizeEvent::default();
        let mut counter = FrameCounter::new();
        let mut fps = FpsMeter::new();
        let mut limiter = self.config.frames_per_second.map(FrequencyLimiter::per_second);
        let mut started = false;
        let mut stopping = false;

        self.post(Event::Lifecycle(LifecycleEvent {
            from: Stage::Dead,
            to: Stage::Alive,
        }));
        self.post(Event::Lifecycle(LifecycleEvent {
            from: Stage::Alive,
            to: Stage::Visible,
        }));
        self.post(Event::Size(SizeEvent {
            width_px: self.config.size.width,
            height_px: self.config.size.height,
            ..SizeEvent::default()
        }));

        loop {
            let event = if engine.is_some() || !started {
                match self.receiver.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                }
            } else {
                match self.receiver.try_recv() {
                    Ok(event) => event,
                    Err(_) => break,
                }
            };

            match event {
                Event::Lifecycle(lifecycle) => {
                    tracing::debug!(from = ?lifecycle.from, to = ?lifecycle.to, "lifecycle");
                    match lifecycle.crosses(Stage::Visible) {
                        Cross::On => {
                            started = true;
                            let mut new_engine = SoftwareEngine::new(self.config.clear_color);
                            scene = Some(sketch.load_scene(&mut new_engine)?);
                            engine = Some(new_engine);
                            self.post(Event::Paint(PaintEvent::default()));
                        }
                        Cross::Off => {
                            if let Some(mut engine) = engine.take() {
                                engine.release();
                            }
                            scene = None;
                        }
                        Cross::None => {}
                    }
                }
                Event::Size(new_size) => {
                    tracing::debug!(width = new_size.width_px, height = new_size.height_px, "resized");
                    size = new_size;
                }
                Event::Paint(paint) => {
                    let (engine, scene) = match (engine.as_mut(), scene.as_mut()) {
                        (Some(engine), Some(scene)) if !paint.external => (engine, scene),
                        _ => continue,
                    };
                    if self.config.limit_reached(counter.frames()) {
                        if !stopping {
                            stopping = true;
                            self.post(Event::Lifecycle(LifecycleEvent {
                                from: Stage::Visible,
                                to: Stage::Dead,
                            }));
                        }
                        continue;
                    }

                    let frame = counter.advance();
                    let tick = Tick::new(frame, start.elapsed());
                    scene.arrange(tick);
                    sketch.on_frame(tick, scene);
                    let image = engine.render(scene, size.size());
                    self.sink.present(frame, image)?;
                    tracing::trace!(frame, "painted");
                    if let Some(rate) = fps.frame() {
                        tracing::info!(fps = rate, frame, "frame rate");
                    }

                    if let Some(limiter) = limiter.as_mut() {
                        limiter.wait();
                        limiter.advance_frame();
                    }
                    self.post(Event::Paint(PaintEvent::default()));
                }
                Event::Touch(touch) => sketch.on_touch(&touch),
            }
        }

        Ok(RunSummary {
            frames: counter.frames(),
            frames_per_second: fps.last_rate(),
        })
    }
}
