//! Lumen viewer: loads a scene and drives the progressive ray tracer.
//!
//! Usage: lumen_viewer <scene.json> [--size WxH] [--out file.png]
//!        [--samples N] [--jitter] [--depth D] [--scale S] [--inspect X Y]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use lumen_core::{load_scene, SceneData};
use lumen_renderer::{
    DisplaySink, ImagePlane, ProgressiveImage, ProgressiveRenderer, RenderState, Scene,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Command line options.
struct Options {
    scene: PathBuf,
    width: u32,
    height: u32,
    out: Option<PathBuf>,
    samples: Option<u32>,
    jitter: bool,
    depth: Option<u32>,
    scale: Option<u32>,
    inspect: Option<(u32, u32)>,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut scene = None;
        let mut options = Options {
            scene: PathBuf::new(),
            width: 800,
            height: 600,
            out: None,
            samples: None,
            jitter: false,
            depth: None,
            scale: None,
            inspect: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--size" => {
                    let size = next_value(&mut args, "--size")?;
                    let (w, h) = size
                        .split_once('x')
                        .with_context(|| format!("--size expects WxH, got '{}'", size))?;
                    options.width = w.parse().context("invalid width")?;
                    options.height = h.parse().context("invalid height")?;
                }
                "--out" => options.out = Some(next_value(&mut args, "--out")?.into()),
                "--samples" => {
                    options.samples = Some(next_value(&mut args, "--samples")?.parse()?)
                }
                "--jitter" => options.jitter = true,
                "--depth" => options.depth = Some(next_value(&mut args, "--depth")?.parse()?),
                "--scale" => options.scale = Some(next_value(&mut args, "--scale")?.parse()?),
                "--inspect" => {
                    let x = next_value(&mut args, "--inspect")?.parse()?;
                    let y = next_value(&mut args, "--inspect")?.parse()?;
                    options.inspect = Some((x, y));
                }
                flag if flag.starts_with("--") => bail!("unknown option {}", flag),
                path => {
                    if scene.replace(PathBuf::from(path)).is_some() {
                        bail!("more than one scene file given");
                    }
                }
            }
        }

        options.scene = scene.context(
            "usage: lumen_viewer <scene.json> [--size WxH] [--out file.png] \
             [--samples N] [--jitter] [--depth D] [--scale S] [--inspect X Y]",
        )?;

        if options.width == 0 || options.height == 0 {
            bail!("image size must be non-zero");
        }

        Ok(options)
    }

    /// Apply command line overrides to the scene's render settings.
    ///
    /// Fails when the pixel scale leaves no pixels to trace.
    fn apply(&self, data: &mut SceneData) -> Result<()> {
        let render = &mut data.render;
        if let Some(samples) = self.samples {
            render.pixel_samples = samples;
        }
        if self.jitter {
            render.jitter = true;
        }
        if let Some(depth) = self.depth {
            render.max_depth = depth;
        }
        if let Some(scale) = self.scale {
            render.pixel_scale = scale;
        }
        data.render = data.render.clone().sanitized();

        let scale = data.render.pixel_scale.max(1);
        if self.width / scale == 0 || self.height / scale == 0 {
            bail!(
                "pixel scale {} is larger than the {}x{} image",
                scale,
                self.width,
                self.height
            );
        }

        Ok(())
    }

    fn out_path(&self) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| self.scene.with_extension("png"))
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("{} needs a value", flag))
}

/// Display sink that writes every presented frame to a PNG file.
struct PngSink {
    path: PathBuf,
    frames: usize,
    error: Option<anyhow::Error>,
}

impl PngSink {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            frames: 0,
            error: None,
        }
    }
}

impl DisplaySink for PngSink {
    fn present(&mut self, image: &ProgressiveImage, status: &str) {
        self.frames += 1;

        let done = image.rendered_count() as f32 / image.pixels().len().max(1) as f32;
        log::info!("{} ({:.0}% traced)", status, 100.0 * done);

        if let Err(err) = image.save(&self.path) {
            self.error = Some(anyhow::Error::new(err).context(format!(
                "failed to write {}",
                self.path.display()
            )));
        }
    }
}

fn inspect(scene: &Scene, data: &SceneData, options: &Options, x: u32, y: u32) -> Result<()> {
    if x >= options.width || y >= options.height {
        bail!(
            "pixel ({}, {}) is outside the {}x{} image",
            x,
            y,
            options.width,
            options.height
        );
    }

    let plane = ImagePlane::new(&data.eye, options.width, options.height);
    let mut rng = StdRng::seed_from_u64(scene.config().seed);
    let inspection = scene.inspect_pixel(x, y, &plane, &mut rng);
    let colour = inspection.colour / scene.config().samples_per_pixel() as f32;

    println!("pixel ({}, {}): colour {}", x, y, colour);
    println!(
        "  {} rays, {} shadow rays, deepest level {}",
        inspection.rays, inspection.shadow_rays, inspection.deepest
    );
    for segment in &inspection.segments {
        println!(
            "  {:indent$}{:?} {} -> {}",
            "",
            segment.kind,
            segment.start,
            segment.end,
            indent = 2 * segment.depth.saturating_sub(1) as usize
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = Options::parse(std::env::args().skip(1))?;

    let mut data = load_scene(&options.scene)
        .with_context(|| format!("failed to load scene {}", options.scene.display()))?;
    options.apply(&mut data)?;

    let scene = Scene::from_data(&data)?;
    log::info!("{}", scene.status_message());

    if let Some((x, y)) = options.inspect {
        return inspect(&scene, &data, &options, x, y);
    }

    let out = options.out_path();
    let mut sink = PngSink::new(&out);
    let mut renderer = ProgressiveRenderer::new(options.width, options.height, data.eye);

    // Host event loop: one pixel per iteration
    let start = Instant::now();
    let mut last_report = Instant::now();
    let mut state = renderer.render_rt(&scene, true, &mut sink);
    while state == RenderState::Rendering {
        state = renderer.render_rt(&scene, false, &mut sink);

        if let Some(err) = sink.error.take() {
            return Err(err);
        }

        if last_report.elapsed() > Duration::from_secs(5) {
            log::debug!("{:.1}% done", 100.0 * renderer.progress());
            last_report = Instant::now();
        }
    }

    if let Some(err) = sink.error.take() {
        return Err(err);
    }

    log::info!(
        "Rendered {}x{} in {:.2?} ({} snapshots), saved to {}",
        renderer.image().width(),
        renderer.image().height(),
        start.elapsed(),
        sink.frames,
        out.display()
    );

    Ok(())
}
