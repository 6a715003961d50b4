use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::Level;
use twirl::prelude::*;

/// A region of an image, written as `x,y,width,height`.
#[derive(Debug, Clone, Copy)]
struct Region(Rect<u32>);

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("invalid region {:?}", s))?;
        match parts.as_slice() {
            &[x, y, width, height] => Ok(Self(Rect::new(
                Point::new(x, y),
                Size::new(width, height),
            ))),
            _ => bail!("expected x,y,width,height, got {:?}", s),
        }
    }
}

/// Loads a JPEG, crops a region out of it and spins it one degree per frame.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The image to load.
    #[arg(long, value_name = "PATH")]
    image: PathBuf,

    /// The region of the image to draw.
    #[arg(long, value_name = "X,Y,W,H", default_value = "0,0,250,40")]
    region: Region,

    /// Number of frames to render.
    #[arg(long, default_value_t = 360)]
    frames: u64,

    /// Directory to write PNG frames into. Frames are discarded when omitted.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Only write every n-th frame.
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Pace rendering to this many frames per second.
    #[arg(long)]
    fps: Option<f32>,

    /// Log every frame.
    #[arg(long)]
    verbose: bool,
}

struct ImageSprite {
    image: PathBuf,
    region: Rect<u32>,
}

impl Sketch for ImageSprite {
    fn load_scene(&mut self, engine: &mut dyn Engine) -> twirl::Result<Scene> {
        let decoded = Texture::load(&self.image)?;
        let texture = engine.load_texture(decoded.image().clone());
        let sprite = SpriteDescriptor::natural(
            Point::new(200., 200.),
            SubTexture::new(texture, self.region)?,
        );

        let mut scene = Scene::new();
        scene.append_sprite(scene.root(), sprite, Spin::default())?;
        Ok(scene)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::TRACE } else { Level::INFO })
        .init();

    let mut sketch = ImageSprite {
        image: cli.image,
        region: cli.region.0,
    };

    let mut config = RuntimeConfig::new().with_frame_limit(cli.frames);
    if let Some(fps) = cli.fps {
        config = config.with_frames_per_second(fps);
    }
    let sink: Box<dyn FrameSink> = match cli.out {
        Some(out) => Box::new(PngSequence::new(out)?.with_every(cli.every)),
        None => Box::new(Discard),
    };

    let summary = Runtime::new(config, sink)
        .run(&mut sketch)
        .with_context(|| format!("running with {}", sketch.image.display()))?;
    tracing::info!(frames = summary.frames, fps = ?summary.frames_per_second, "done");
    Ok(())
}
