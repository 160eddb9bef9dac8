// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::emitter::{DirectSample, Emitter, EmitterFlags};
use crate::core::error::SceneError;
use crate::core::geometry::{nrm_dot_vec3f, Normal3f, Point2f, Point3f, Vector3f};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::shape::{PositionSample, Shape, ShapeSummary};
use crate::core::texture::Texture;

/// A point on an emitting surface as seen from a reference point.
pub struct SurfaceSample {
    pub ps: PositionSample,
    pub wi: Vector3f,
    pub dist: Float,
    /// Cosine between the surface normal and the direction back to the
    /// reference point.
    pub cos_light: Float,
    /// Converts radiance into the weight of a `DirectSample`.
    pub factor: Float,
}

/// Samples `shape` uniformly by area. Points facing away from the
/// reference point are rejected.
pub fn sample_surface(
    reference: &Point3f,
    u: &Point2f,
    shape: Option<&dyn Shape>,
) -> Option<SurfaceSample> {
    let ps = shape?.sample_position(u);
    if ps.pdf <= 0.0 {
        return None;
    }
    let d: Vector3f = ps.p - *reference;
    let dist2 = d.length_squared();
    if dist2 == 0.0 {
        return None;
    }
    let dist = dist2.sqrt();
    let wi: Vector3f = d / dist;
    let cos_light = -nrm_dot_vec3f(&ps.n, &wi);
    if cos_light <= 0.0 {
        return None;
    }
    Some(SurfaceSample {
        ps,
        wi,
        dist,
        cos_light,
        factor: cos_light / (ps.pdf * dist2),
    })
}

pub struct AreaLight {
    pub radiance: Box<dyn Texture>,
    /// Surface area of the shape, zero until attached.
    pub area: Float,
    attached: bool,
    base: ObjectBase,
}

impl AreaLight {
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl SceneObject for AreaLight {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Emitter
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_object(
            "radiance",
            self.radiance.as_object_mut(),
            ParamFlags::Differentiable as u8,
        );
    }
}

impl Emitter for AreaLight {
    fn flags(&self) -> u8 {
        EmitterFlags::Surface as u8
    }
    fn sample_direct(
        &self,
        reference: &Point3f,
        u: &Point2f,
        shape: Option<&dyn Shape>,
    ) -> Option<DirectSample> {
        let s = sample_surface(reference, u, shape)?;
        Some(DirectSample {
            p: s.ps.p,
            wi: s.wi,
            dist: s.dist,
            weight: self.radiance.evaluate(&s.ps.uv) * s.factor,
        })
    }
    fn eval(&self, _p: &Point3f, n: &Normal3f, uv: &Point2f, wo: &Vector3f) -> Spectrum {
        if nrm_dot_vec3f(n, wo) <= 0.0 {
            return Spectrum::default();
        }
        self.radiance.evaluate(uv)
    }
    fn set_shape(&mut self, summary: &ShapeSummary) -> Result<(), SceneError> {
        if self.attached {
            return Err(SceneError::construction(
                &self.base.plugin_name,
                "an area emitter can only be attached to a single shape",
            ));
        }
        self.attached = true;
        self.area = summary.area;
        Ok(())
    }
    fn shape_changed(&mut self, summary: &ShapeSummary) {
        self.area = summary.area;
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let radiance = manager.emitter_texture(props, "radiance", 1.0)?;
    Ok(PluginObject::Emitter(Box::new(AreaLight {
        radiance,
        area: 0.0,
        attached: false,
        base: ObjectBase::new(props),
    })))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::Bounds3f;
    use crate::core::transform::Transform;
    use crate::textures::d65::D65Texture;

    fn light(value: Float) -> AreaLight {
        AreaLight {
            radiance: Box::new(D65Texture::new(Spectrum::new(value))),
            area: 0.0,
            attached: false,
            base: ObjectBase::default(),
        }
    }

    fn summary(area: Float) -> ShapeSummary {
        ShapeSummary {
            area,
            bbox: Bounds3f::default(),
            to_world: Transform::default(),
        }
    }

    #[test]
    fn attaches_once() {
        let mut emitter = light(1.0);
        emitter.set_shape(&summary(4.0)).unwrap();
        assert_eq!(emitter.area, 4.0);
        assert!(emitter.set_shape(&summary(4.0)).is_err());
        emitter.shape_changed(&summary(2.0));
        assert_eq!(emitter.area, 2.0);
    }

    #[test]
    fn emits_on_the_normal_side() {
        let emitter = light(3.0);
        let n = Normal3f {
            x: 0.0,
            y: 0.0,
            z: 1.0,
        };
        let p = Point3f::default();
        let uv = Point2f::default();
        assert_eq!(
            emitter.eval(&p, &n, &uv, &Vector3f::new(0.0, 0.0, 1.0)),
            Spectrum::new(3.0)
        );
        assert!(emitter
            .eval(&p, &n, &uv, &Vector3f::new(0.0, 0.0, -1.0))
            .is_black());
    }

    #[test]
    fn no_sample_without_shape() {
        let emitter = light(1.0);
        assert!(emitter
            .sample_direct(&Point3f::default(), &Point2f::default(), None)
            .is_none());
    }
}
