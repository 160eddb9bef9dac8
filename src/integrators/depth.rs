// rs_scene
use crate::core::base::Spectrum;
use crate::core::bitmap::Bitmap;
use crate::core::error::SceneError;
use crate::core::geometry::Ray;
use crate::core::integrator::{render_rows, Integrator};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::rng::Rng;
use crate::core::scene::Scene;

#[derive(Default)]
pub struct DepthIntegrator {
    base: ObjectBase,
}

impl SceneObject for DepthIntegrator {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Integrator
    }
}

impl Integrator for DepthIntegrator {
    fn render(&self, scene: &Scene, sensor: usize, seed: u64) -> Result<Bitmap, SceneError> {
        render_rows(scene, sensor, seed, |ray: &Ray, _rng: &mut Rng| {
            match scene.ray_intersect(ray) {
                Some((_, si)) => Spectrum::new(si.t),
                None => Spectrum::default(),
            }
        })
    }
}

pub fn create(
    props: &mut Properties,
    _manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    Ok(PluginObject::Integrator(Box::new(DepthIntegrator {
        base: ObjectBase::new(props),
    })))
}
