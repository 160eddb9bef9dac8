//! Textures provide the values of material and emitter attributes.
//! Plain floats and colors given for a texture attribute are turned
//! into constant textures by the plugin manager.

// rs_scene
use crate::core::base::Spectrum;
use crate::core::geometry::Point2f;
use crate::core::object::SceneObject;

pub trait Texture: SceneObject {
    fn evaluate(&self, uv: &Point2f) -> Spectrum;
    /// Average over the texture domain.
    fn mean(&self) -> Spectrum;
    fn is_spatially_varying(&self) -> bool {
        false
    }
}
