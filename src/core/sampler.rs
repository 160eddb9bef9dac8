//! Samplers decide how many samples each pixel receives and seed the
//! random streams the integrators draw from.

// rs_scene
use crate::core::object::SceneObject;
use crate::core::rng::Rng;

pub trait Sampler: SceneObject {
    fn sample_count(&self) -> u32;
    /// Generator for one image row of a pass rendered with `seed`.
    fn row_generator(&self, seed: u64, row: u32) -> Rng;
}
