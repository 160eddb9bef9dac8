//! Reconstruction filters weight the samples that contribute to a
//! pixel. The reference integrators jitter samples over the filter
//! support and normalize by the summed weights.

// rs_scene
use crate::core::base::Float;
use crate::core::geometry::{Point2f, Vector2f};
use crate::core::object::SceneObject;

pub trait ReconstructionFilter: SceneObject {
    /// Weight of a sample at offset `p` from the pixel center.
    fn evaluate(&self, p: Point2f) -> Float;
    fn get_radius(&self) -> Vector2f;
}
