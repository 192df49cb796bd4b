use lumen_math::Vec3;
use serde::Deserialize;

/// Viewpoint supplied by the viewer whenever the ray tracer restarts.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Eye {
    pub position: Vec3,
    #[serde(alias = "lookAt")]
    pub look_at: Vec3,
    #[serde(default = "default_up", alias = "upDir")]
    pub up: Vec3,
    /// Vertical field of view in degrees
    #[serde(default = "default_fovy")]
    pub fovy: f32,
}

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_fovy() -> f32 {
    45.0
}

impl Eye {
    pub fn new(position: Vec3, look_at: Vec3, up: Vec3, fovy: f32) -> Self {
        Self {
            position,
            look_at,
            up,
            fovy,
        }
    }

    /// Unit vector from the eye towards the look-at point.
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize()
    }
}

impl Default for Eye {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, default_up(), default_fovy())
    }
}
