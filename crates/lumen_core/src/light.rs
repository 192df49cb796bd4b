use lumen_math::{Color, Vec3};
use serde::Deserialize;

/// A point light.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Light {
    pub position: Vec3,
    #[serde(alias = "color")]
    pub colour: Color,
}

impl Light {
    pub fn new(position: Vec3, colour: Color) -> Self {
        Self { position, colour }
    }
}
