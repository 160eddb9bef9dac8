// rs_scene
use crate::core::emitter::{DirectSample, Emitter, EmitterFlags};
use crate::core::error::SceneError;
use crate::core::geometry::{pnt3_distance_squaredf, Point2f, Point3f, Vector3f};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::shape::Shape;
use crate::core::texture::Texture;
use crate::core::transform::Transform;

pub struct PointLight {
    pub position: Point3f,
    pub intensity: Box<dyn Texture>,
    base: ObjectBase,
}

impl SceneObject for PointLight {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Emitter
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_parameter(
            "position",
            ParameterRef::Point3f(&mut self.position),
            ParamFlags::Differentiable as u8,
        );
        callback.put_object(
            "intensity",
            self.intensity.as_object_mut(),
            ParamFlags::Differentiable as u8,
        );
    }
}

impl Emitter for PointLight {
    fn flags(&self) -> u8 {
        EmitterFlags::DeltaPosition as u8
    }
    fn sample_direct(
        &self,
        reference: &Point3f,
        _u: &Point2f,
        _shape: Option<&dyn Shape>,
    ) -> Option<DirectSample> {
        let dist2 = pnt3_distance_squaredf(&self.position, reference);
        if dist2 == 0.0 {
            return None;
        }
        let dist = dist2.sqrt();
        let wi: Vector3f = (self.position - *reference) / dist;
        Some(DirectSample {
            p: self.position,
            wi,
            dist,
            weight: self.intensity.evaluate(&Point2f::default()) / dist2,
        })
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let intensity = manager.emitter_texture(props, "intensity", 1.0)?;
    if intensity.is_spatially_varying() {
        return Err(SceneError::construction(
            "point",
            "intensity cannot be spatially varying",
        ));
    }
    let position: Point3f = if props.has_property("position") {
        if props.has_property("to_world") {
            return Err(SceneError::construction(
                "point",
                "only one of \"position\" and \"to_world\" can be specified",
            ));
        }
        props.get("position")?
    } else {
        let to_world: Transform = props.get_or("to_world", Transform::default())?;
        to_world.transform_point(&Point3f::default())
    };
    Ok(PluginObject::Emitter(Box::new(PointLight {
        position,
        intensity,
        base: ObjectBase::new(props),
    })))
}

#[cfg(test)]
mod test {
    use crate::core::api::register_builtin_plugins;
    use crate::core::base::{Float, Spectrum};
    use crate::core::geometry::{Point2f, Point3f, Vector3f};
    use crate::core::object::Category;
    use crate::core::plugin::PluginManager;
    use crate::core::properties::Properties;
    use crate::core::registry::Registry;
    use crate::core::transform::Transform;

    fn manager() -> PluginManager {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        PluginManager::new(registry)
    }

    #[test]
    fn placed_by_to_world() {
        let mut manager = manager();
        let mut props = Properties::new("point");
        props
            .set("to_world", Transform::translate(&Vector3f::new(2.0, -6.0, 4.5)))
            .unwrap();
        props.set("intensity", 10.0 as Float).unwrap();
        let emitter = manager
            .create_object(props, Category::Emitter)
            .unwrap()
            .into_emitter()
            .unwrap();
        let reference = Point3f::new(2.0, -6.0, 2.5);
        let ds = emitter
            .sample_direct(&reference, &Point2f::default(), None)
            .unwrap();
        assert!((ds.p.z - 4.5).abs() < 1.0e-5);
        assert!((ds.dist - 2.0).abs() < 1.0e-5);
        assert!((ds.wi.z - 1.0).abs() < 1.0e-5);
        // 10 / 2^2
        assert_eq!(ds.weight, Spectrum::new(2.5));
    }

    #[test]
    fn position_and_to_world_conflict() {
        let mut manager = manager();
        let mut props = Properties::new("point");
        props.set("position", Point3f::new(0.0, 1.0, 0.0)).unwrap();
        props.set("to_world", Transform::default()).unwrap();
        assert!(manager.create_object(props, Category::Emitter).is_err());
    }
}
