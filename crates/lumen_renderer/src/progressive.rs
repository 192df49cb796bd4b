//! Progressive, one-pixel-per-tick frame scheduler.
//!
//! The host event loop calls [`ProgressiveRenderer::render_rt`] once per
//! iteration. Each call traces a single (possibly supersampled) pixel so the
//! loop stays responsive, and the partial image is handed to a
//! [`DisplaySink`] at most once per display interval.

use std::time::{Duration, Instant};

use lumen_core::Eye;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::buffer::ProgressiveImage;
use crate::sampler::ImagePlane;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// No frame has been started
    Idle,
    Rendering,
    /// Every pixel has been traced; nothing happens until the next restart
    Done,
}

/// Receives the partial image for display.
pub trait DisplaySink {
    fn present(&mut self, image: &ProgressiveImage, status: &str);
}

/// Drives the ray tracer across frames.
pub struct ProgressiveRenderer {
    width: u32,
    height: u32,
    eye: Eye,
    plane: ImagePlane,
    image: ProgressiveImage,
    pixel_scale: u32,
    next_x: u32,
    next_y: u32,
    state: RenderState,
    rng: StdRng,
    last_display: Option<Instant>,
    started: Option<Instant>,
}

impl ProgressiveRenderer {
    /// Create a renderer for a `width` × `height` window.
    pub fn new(width: u32, height: u32, eye: Eye) -> Self {
        Self {
            width,
            height,
            eye,
            plane: ImagePlane::new(&eye, width, height),
            image: ProgressiveImage::new(0, 0),
            pixel_scale: 1,
            next_x: 0,
            next_y: 0,
            state: RenderState::Idle,
            rng: StdRng::seed_from_u64(0),
            last_display: None,
            started: None,
        }
    }

    /// Change the viewpoint. Takes effect at the next restart.
    pub fn set_eye(&mut self, eye: Eye) {
        self.eye = eye;
    }

    /// Change the window size. Takes effect at the next restart.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn eye(&self) -> &Eye {
        &self.eye
    }

    pub fn image_plane(&self) -> &ImagePlane {
        &self.plane
    }

    pub fn image(&self) -> &ProgressiveImage {
        &self.image
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Fraction of the frame traced so far.
    pub fn progress(&self) -> f32 {
        let total = self.image.width() * self.image.height();
        match self.state {
            RenderState::Idle => 0.0,
            RenderState::Done => 1.0,
            RenderState::Rendering => {
                (self.next_x * self.image.height() + self.next_y) as f32 / total as f32
            }
        }
    }

    /// Abandon the current frame and start a new one from the first pixel.
    pub fn restart(&mut self, scene: &Scene) {
        let config = scene.config();

        self.rng = StdRng::seed_from_u64(config.seed);
        self.plane = ImagePlane::new(&self.eye, self.width, self.height);
        self.pixel_scale = config.pixel_scale.max(1);
        self.image = ProgressiveImage::new(
            self.width / self.pixel_scale,
            self.height / self.pixel_scale,
        );
        self.next_x = 0;
        self.next_y = 0;
        self.last_display = None;
        self.started = Some(Instant::now());

        self.state = if self.image.pixels().is_empty() {
            RenderState::Done
        } else {
            RenderState::Rendering
        };

        log::info!(
            "Restarting ray trace: {}x{} pixels ({})",
            self.image.width(),
            self.image.height(),
            scene.status_message()
        );
    }

    /// Advance by one pixel, optionally restarting first.
    ///
    /// Pixels are traced column by column: `y` runs to the top of the image
    /// before `x` advances.
    pub fn render_rt(&mut self, scene: &Scene, restart: bool, sink: &mut dyn DisplaySink) -> RenderState {
        if restart {
            self.restart(scene);
        }

        if self.state != RenderState::Rendering {
            return self.state;
        }

        let config = scene.config();
        let scale = self.pixel_scale as f32;
        let x = ((self.next_x as f32 + 0.5) * scale) as u32;
        let y = ((self.next_y as f32 + 0.5) * scale) as u32;

        let colour = scene.pixel_colour(x, y, &self.plane, &mut self.rng)
            / config.samples_per_pixel() as f32;
        self.image.set(self.next_x, self.next_y, colour);

        self.next_y += 1;
        if self.next_y >= self.image.height() {
            self.next_y = 0;
            self.next_x += 1;
        }

        if self.next_x >= self.image.width() {
            self.next_x = 0;
            self.state = RenderState::Done;
            self.present(scene, sink);

            if let Some(started) = self.started {
                log::info!("Ray trace finished in {:.2?}", started.elapsed());
            }
        } else {
            let interval = Duration::from_secs_f32(config.display_interval_secs);
            let due = self
                .last_display
                .map_or(true, |last| last.elapsed() > interval);
            if due {
                self.present(scene, sink);
            }
        }

        self.state
    }

    fn present(&mut self, scene: &Scene, sink: &mut dyn DisplaySink) {
        sink.present(&self.image, &scene.status_message());
        self.last_display = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::RenderConfig;
    use lumen_math::{Color, Vec3, Vec4};

    #[derive(Default)]
    struct CountingSink {
        presented: usize,
        rendered: Vec<usize>,
    }

    impl DisplaySink for CountingSink {
        fn present(&mut self, image: &ProgressiveImage, _status: &str) {
            self.presented += 1;
            self.rendered.push(image.rendered_count());
        }
    }

    fn scene(display_interval_secs: f32) -> Scene {
        Scene::new(RenderConfig {
            background: Color::new(0.2, 0.4, 0.6),
            display_interval_secs,
            ..Default::default()
        })
    }

    fn eye() -> Eye {
        Eye::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y, 45.0)
    }

    #[test]
    fn test_idle_until_restart() {
        let scene = scene(0.0);
        let mut renderer = ProgressiveRenderer::new(4, 3, eye());
        let mut sink = CountingSink::default();

        assert_eq!(renderer.render_rt(&scene, false, &mut sink), RenderState::Idle);
        assert_eq!(sink.presented, 0);
        assert_eq!(renderer.progress(), 0.0);
    }

    #[test]
    fn test_column_major_order() {
        let scene = scene(1000.0);
        let mut renderer = ProgressiveRenderer::new(3, 2, eye());
        let mut sink = CountingSink::default();

        renderer.render_rt(&scene, true, &mut sink);
        assert!(renderer.image().is_rendered(0, 0));

        renderer.render_rt(&scene, false, &mut sink);
        assert!(renderer.image().is_rendered(0, 1));
        assert!(!renderer.image().is_rendered(1, 0));

        renderer.render_rt(&scene, false, &mut sink);
        assert!(renderer.image().is_rendered(1, 0));
        assert!(!renderer.image().is_rendered(2, 0));
    }

    #[test]
    fn test_runs_to_done_and_presents_final_frame() {
        let scene = scene(1000.0);
        let mut renderer = ProgressiveRenderer::new(3, 2, eye());
        let mut sink = CountingSink::default();

        let mut ticks = 0;
        let mut state = renderer.render_rt(&scene, true, &mut sink);
        ticks += 1;
        while state == RenderState::Rendering {
            state = renderer.render_rt(&scene, false, &mut sink);
            ticks += 1;
        }

        assert_eq!(state, RenderState::Done);
        assert_eq!(ticks, 6);
        assert_eq!(renderer.progress(), 1.0);

        // First tick and the final frame
        assert_eq!(sink.rendered, vec![1, 6]);
        assert_eq!(renderer.image().get(2, 1), Vec4::new(0.2, 0.4, 0.6, 1.0));

        // Done is terminal
        assert_eq!(renderer.render_rt(&scene, false, &mut sink), RenderState::Done);
        assert_eq!(sink.presented, 2);
    }

    #[test]
    fn test_restart_clears_image() {
        let scene = scene(0.0);
        let mut renderer = ProgressiveRenderer::new(2, 2, eye());
        let mut sink = CountingSink::default();

        renderer.render_rt(&scene, true, &mut sink);
        renderer.render_rt(&scene, false, &mut sink);
        assert_eq!(renderer.image().rendered_count(), 2);

        renderer.render_rt(&scene, true, &mut sink);
        assert_eq!(renderer.image().rendered_count(), 1);
        assert_eq!(renderer.state(), RenderState::Rendering);
    }

    #[test]
    fn test_new_eye_applies_on_restart() {
        let scene = scene(1000.0);
        let mut renderer = ProgressiveRenderer::new(3, 2, eye());
        let mut sink = CountingSink::default();

        for restart in [true, false, false] {
            renderer.render_rt(&scene, restart, &mut sink);
        }
        let old_plane = *renderer.image_plane();

        let moved = Eye::new(Vec3::new(4.0, 1.0, 0.0), Vec3::ZERO, Vec3::Y, 60.0);
        renderer.set_eye(moved);
        assert_eq!(renderer.eye().position, moved.position);
        assert_eq!(*renderer.image_plane(), old_plane);
        assert_eq!(renderer.image().rendered_count(), 3);

        renderer.render_rt(&scene, true, &mut sink);
        assert_eq!(*renderer.image_plane(), ImagePlane::new(&moved, 3, 2));
        assert_ne!(*renderer.image_plane(), old_plane);

        // Only the first pixel of the new frame has been traced
        assert_eq!(renderer.image().rendered_count(), 1);
        assert!(renderer.image().is_rendered(0, 0));
        assert_eq!(renderer.progress(), 1.0 / 6.0);
    }

    #[test]
    fn test_resize_applies_on_restart() {
        let scene = scene(1000.0);
        let mut renderer = ProgressiveRenderer::new(2, 2, eye());
        let mut sink = CountingSink::default();

        renderer.render_rt(&scene, true, &mut sink);
        renderer.render_rt(&scene, false, &mut sink);

        renderer.resize(5, 3);
        assert_eq!(renderer.image().width(), 2);

        renderer.render_rt(&scene, true, &mut sink);
        assert_eq!(renderer.image().width(), 5);
        assert_eq!(renderer.image().height(), 3);
        assert_eq!(renderer.image().rendered_count(), 1);
        assert!(renderer.image().is_rendered(0, 0));
        assert_eq!(*renderer.image_plane(), ImagePlane::new(&eye(), 5, 3));
    }

    #[test]
    fn test_display_is_throttled() {
        let scene = scene(0.2);
        let mut renderer = ProgressiveRenderer::new(1, 4, eye());
        let mut sink = CountingSink::default();

        renderer.render_rt(&scene, true, &mut sink);
        renderer.render_rt(&scene, false, &mut sink);
        assert_eq!(sink.rendered, vec![1]);

        std::thread::sleep(Duration::from_millis(250));
        renderer.render_rt(&scene, false, &mut sink);
        assert_eq!(sink.rendered, vec![1, 3]);

        // The last pixel always presents, however soon it comes
        assert_eq!(renderer.render_rt(&scene, false, &mut sink), RenderState::Done);
        assert_eq!(sink.rendered, vec![1, 3, 4]);
    }

    #[test]
    fn test_pixel_scale_shrinks_buffer() {
        let scene = Scene::new(RenderConfig {
            pixel_scale: 2,
            ..Default::default()
        });
        let mut renderer = ProgressiveRenderer::new(8, 6, eye());
        renderer.restart(&scene);

        assert_eq!(renderer.image().width(), 4);
        assert_eq!(renderer.image().height(), 3);
    }

    #[test]
    fn test_empty_window_is_done_immediately() {
        let scene = scene(0.0);
        let mut renderer = ProgressiveRenderer::new(0, 0, eye());
        let mut sink = CountingSink::default();

        assert_eq!(renderer.render_rt(&scene, true, &mut sink), RenderState::Done);
    }
}
