//! Surface scattering models.

// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::geometry::Point2f;
use crate::core::object::SceneObject;

pub trait Bsdf: SceneObject {
    /// BSDF value times the cosine foreshortening of the light
    /// direction. Both cosines are taken against the surface normal,
    /// which faces the viewer (`cos_view > 0`).
    fn eval(&self, uv: &Point2f, cos_view: Float, cos_light: Float) -> Spectrum;
}
