use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use twirl::{prelude::*, text::bundled_fonts};

const SPRITE_WIDTH: u32 = 250;
const SPRITE_HEIGHT: u32 = 40;

/// Renders a line of text into a texture and spins it one degree per frame.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Number of frames to render.
    #[arg(long, default_value_t = 360)]
    frames: u64,

    /// TrueType font to render with. The bundled DejaVu Sans is used when
    /// omitted.
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// The text on the sprite.
    #[arg(long, default_value = "Hello, Gopher!")]
    text: String,

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

struct TextSprite {
    font: Font,
    text: String,
}

impl Sketch for TextSprite {
    fn load_scene(&mut self, engine: &mut dyn Engine) -> twirl::Result<Scene> {
        let label = Label::new(self.text.clone(), Size::new(SPRITE_WIDTH, SPRITE_HEIGHT));
        let texture = engine.load_texture(label.render(&self.font));
        let sprite = SpriteDescriptor::new(
            Point::new(200., 200.),
            Size::new(SPRITE_WIDTH as f32, SPRITE_HEIGHT as f32),
            SubTexture::entire(texture)?,
        );

        let mut scene = Scene::new();
        scene.append_sprite(scene.root(), sprite, Spin::default())?;
        Ok(scene)
    }
}

fn load_font(path: Option<PathBuf>) -> anyhow::Result<Font> {
    match path {
        Some(path) => Font::load(&path).with_context(|| format!("loading {}", path.display())),
        None => Ok(bundled_fonts::dejavu_sans()?),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::TRACE } else { Level::INFO })
        .init();

    let mut sketch = TextSprite {
        font: load_font(cli.font)?,
        text: cli.text,
    };

    let mut config = RuntimeConfig::new().with_frame_limit(cli.frames);
    if let Some(fps) = cli.fps {
        config = config.with_frames_per_second(fps);
    }
    let sink: Box<dyn FrameSink> = match cli.out {
        Some(out) => Box::new(PngSequence::new(out)?.with_every(cli.every)),
        None => Box::new(Discard),
    };

    let summary = Runtime::new(config, sink).run(&mut sketch)?;
    tracing::info!(frames = summary.frames, fps = ?summary.frames_per_second, "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_the_bundled_font() {
        let cli = Cli::try_parse_from(["text_sprite"]).unwrap();
        assert!(cli.font.is_none());
        let font = load_font(cli.font).unwrap();
        assert_eq!(font.id(), bundled_fonts::dejavu_sans().unwrap().id());

        assert!(load_font(Some(PathBuf::from("no/such/font.ttf"))).is_err());
    }
}
