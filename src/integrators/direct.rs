// rs_scene
use crate::core::base::{Float, Spectrum, RAY_EPSILON, SHADOW_EPSILON};
use crate::core::bitmap::Bitmap;
use crate::core::emitter::Emitter;
use crate::core::error::SceneError;
use crate::core::geometry::{nrm_dot_vec3f, nrm_faceforward_vec3, Point2f, Ray, Vector3f};
use crate::core::integrator::{render_rows, Integrator};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::core::shape::{Shape, SurfaceInteraction};

pub struct DirectIntegrator {
    /// Samples per emitter and shading point.
    pub emitter_samples: i64,
    base: ObjectBase,
}

impl DirectIntegrator {
    pub fn new(emitter_samples: i64) -> Self {
        DirectIntegrator {
            emitter_samples,
            base: ObjectBase::default(),
        }
    }
    fn estimate(
        &self,
        scene: &Scene,
        si: &SurfaceInteraction,
        bsdf_shape: &dyn Shape,
        wo: &Vector3f,
        source: (&dyn Emitter, Option<&dyn Shape>),
        rng: &mut Rng,
    ) -> Spectrum {
        let (emitter, emitter_shape) = source;
        let n = nrm_faceforward_vec3(&si.n, wo);
        let cos_view = nrm_dot_vec3f(&n, wo);
        let mut l = Spectrum::default();
        for _ in 0..self.emitter_samples {
            let u = Point2f {
                x: rng.uniform_float(),
                y: rng.uniform_float(),
            };
            let ds = match emitter.sample_direct(&si.p, &u, emitter_shape) {
                Some(ds) => ds,
                None => continue,
            };
            if ds.weight.is_black() {
                continue;
            }
            let f = bsdf_shape
                .bsdf()
                .eval(&si.uv, cos_view, nrm_dot_vec3f(&n, &ds.wi));
            if f.is_black() {
                continue;
            }
            let mut shadow = Ray::new(si.p + ds.wi * RAY_EPSILON, ds.wi);
            shadow.t_max = ds.dist * (1.0 - SHADOW_EPSILON) - RAY_EPSILON;
            if scene.ray_test(&shadow) {
                continue;
            }
            l += f * ds.weight;
        }
        l / self.emitter_samples as Float
    }
    /// Radiance arriving along `ray`.
    pub fn li(&self, scene: &Scene, ray: &Ray, rng: &mut Rng) -> Spectrum {
        let (index, si) = match scene.ray_intersect(ray) {
            Some(hit) => hit,
            None => return Spectrum::default(),
        };
        let shape = scene.shapes()[index].as_ref();
        let wo = -ray.d;
        let mut l = Spectrum::default();
        if let Some(emitter) = shape.emitter() {
            l += emitter.eval(&si.p, &si.n, &si.uv, &wo);
        }
        for emitter in scene.emitters() {
            l += self.estimate(scene, &si, shape, &wo, (emitter.as_ref(), None), rng);
        }
        for (emitter_shape, emitter) in scene.area_emitters() {
            l += self.estimate(scene, &si, shape, &wo, (emitter, Some(emitter_shape)), rng);
        }
        l
    }
}

impl SceneObject for DirectIntegrator {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Integrator
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_parameter(
            "emitter_samples",
            ParameterRef::Long(&mut self.emitter_samples),
            ParamFlags::NonDifferentiable as u8,
        );
    }
    fn parameters_changed(&mut self, _keys: &[String]) -> Result<(), SceneError> {
        if self.emitter_samples < 1 {
            return Err(SceneError::InvalidArgument(format!(
                "emitter_samples must be at least 1, found {}",
                self.emitter_samples
            )));
        }
        Ok(())
    }
}

impl Integrator for DirectIntegrator {
    fn render(&self, scene: &Scene, sensor: usize, seed: u64) -> Result<Bitmap, SceneError> {
        render_rows(scene, sensor, seed, |ray: &Ray, rng: &mut Rng| {
            self.li(scene, ray, rng)
        })
    }
}

pub fn create(
    props: &mut Properties,
    _manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let emitter_samples: i64 = props.get_or("emitter_samples", 1)?;
    if emitter_samples < 1 {
        return Err(SceneError::construction(
            "direct",
            format!("emitter_samples must be at least 1, found {}", emitter_samples),
        ));
    }
    let mut integrator = DirectIntegrator::new(emitter_samples);
    integrator.base = ObjectBase::new(props);
    Ok(PluginObject::Integrator(Box::new(integrator)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::api::register_builtin_plugins;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::core::registry::Registry;
    use crate::core::transform::Transform;

    /// A unit sphere at the origin lit by a point light above it.
    fn scene() -> Scene {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        let mut manager = PluginManager::new(registry);
        let mut sphere = Properties::new("sphere");
        sphere.set("radius", 1.0 as Float).unwrap();
        let mut light = Properties::new("point");
        light.set("position", Point3f::new(0.0, 0.0, 3.0)).unwrap();
        light.set("intensity", 4.0 as Float).unwrap();
        let mut film = Properties::new("hdrfilm");
        film.set("width", 4_i64).unwrap();
        film.set("height", 4_i64).unwrap();
        let mut sensor = Properties::new("perspective");
        sensor
            .set(
                "to_world",
                Transform::look_at(
                    &Point3f::new(0.0, 0.0, 5.0),
                    &Point3f::default(),
                    &Vector3f::new(0.0, 1.0, 0.0),
                ),
            )
            .unwrap();
        sensor.set("film", film).unwrap();
        let mut props = Properties::new("scene");
        props.set("shape", sphere).unwrap();
        props.set("emitter", light).unwrap();
        props.set("sensor", sensor).unwrap();
        props.set("integrator", Properties::new("direct")).unwrap();
        manager
            .create_object(props, Category::Scene)
            .unwrap()
            .into_scene()
            .unwrap()
    }

    #[test]
    fn lit_top_of_sphere() {
        let scene = scene();
        let integrator = DirectIntegrator::new(1);
        let mut rng = Rng::new(0, 0);
        let ray = Ray::new(Point3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let l = integrator.li(&scene, &ray, &mut rng);
        // 0.5 / pi * 4 / 2^2
        let expected = 0.5 * crate::core::base::INV_PI;
        assert!((l.c[0] - expected).abs() < 1.0e-4);
        let miss = Ray::new(Point3f::new(0.0, 3.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(integrator.li(&scene, &miss, &mut rng).is_black());
    }

    #[test]
    fn unlit_from_below() {
        let scene = scene();
        let integrator = DirectIntegrator::new(1);
        let mut rng = Rng::new(0, 0);
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(integrator.li(&scene, &ray, &mut rng).is_black());
    }
}
