// rs_scene
use crate::core::base::{degrees, radians, Float};
use crate::core::error::SceneError;
use crate::core::geometry::{Point2f, Point3f, Ray, Vector3f};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::sensor::{Sensor, SensorBase};
use crate::core::transform::Transform;

pub struct PerspectiveSensor {
    pub base: SensorBase,
    /// Horizontal field of view in degrees.
    pub x_fov: Float,
    pub near_clip: Float,
    pub far_clip: Float,
    // derived
    aspect: Float,
    sample_to_camera: Transform,
}

impl PerspectiveSensor {
    pub fn new(base: SensorBase, x_fov: Float, near_clip: Float, far_clip: Float) -> Self {
        let mut sensor = PerspectiveSensor {
            base,
            x_fov,
            near_clip,
            far_clip,
            aspect: 1.0,
            sample_to_camera: Transform::default(),
        };
        sensor.update_camera_transforms();
        sensor
    }
    fn update_camera_transforms(&mut self) {
        let size = self.base.film.size();
        self.aspect = size.x as Float / size.y as Float;
        let camera_to_screen = Transform::perspective(self.x_fov, self.near_clip, self.far_clip);
        self.sample_to_camera = Transform::inverse(&camera_to_screen);
    }
}

/// Converts a field of view measured along `axis` into a horizontal
/// one.
pub fn fov_to_x_fov(fov: Float, axis: &str, aspect: Float) -> Option<Float> {
    let to_x = |scale: Float| degrees(2.0 * ((radians(fov) * 0.5).tan() * scale).atan());
    match axis {
        "x" => Some(fov),
        "y" => Some(to_x(aspect)),
        "diagonal" => Some(to_x(aspect / (1.0 + aspect * aspect).sqrt())),
        "smaller" => Some(if aspect > 1.0 { to_x(aspect) } else { fov }),
        "larger" => Some(if aspect > 1.0 { fov } else { to_x(aspect) }),
        _ => None,
    }
}

impl SceneObject for PerspectiveSensor {
    fn base(&self) -> &ObjectBase {
        &self.base.object
    }
    fn category(&self) -> Category {
        Category::Sensor
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_parameter(
            "to_world",
            ParameterRef::Transform(&mut self.base.to_world),
            ParamFlags::Discontinuous as u8,
        );
        callback.put_parameter(
            "x_fov",
            ParameterRef::Float(&mut self.x_fov),
            ParamFlags::Discontinuous as u8,
        );
        self.base.traverse_children(callback);
    }
    fn parameters_changed(&mut self, _keys: &[String]) -> Result<(), SceneError> {
        if self.x_fov <= 0.0 || self.x_fov >= 180.0 {
            return Err(SceneError::InvalidArgument(format!(
                "x_fov must lie in (0, 180), found {}",
                self.x_fov
            )));
        }
        self.update_camera_transforms();
        Ok(())
    }
}

impl Sensor for PerspectiveSensor {
    fn sensor_base(&self) -> &SensorBase {
        &self.base
    }
    fn sensor_base_mut(&mut self) -> &mut SensorBase {
        &mut self.base
    }
    fn generate_ray(&self, p_film: &Point2f) -> Ray {
        let size = self.base.film.size();
        let screen = Point3f {
            x: 1.0 - 2.0 * p_film.x / size.x as Float,
            y: (1.0 - 2.0 * p_film.y / size.y as Float) / self.aspect,
            z: 0.0,
        };
        let p_near: Point3f = self.sample_to_camera.transform_point(&screen);
        let d: Vector3f = Vector3f::from(p_near).normalize();
        let inv_z: Float = 1.0 / d.z;
        let o_local = Point3f::default() + d * (self.near_clip * inv_z);
        let mut ray = Ray::new(
            self.base.to_world.transform_point(&o_local),
            self.base.to_world.transform_vector(&d),
        );
        ray.t_max = (self.far_clip - self.near_clip) * inv_z;
        ray
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let base = SensorBase::new(props, manager)?;
    let name = base.object.plugin_name.clone();
    let fov: Float = props.get_or("fov", 39.3077)?;
    let fov_axis: String = props.get_or("fov_axis", "x".to_string())?;
    let near_clip: Float = props.get_or("near_clip", 1.0e-2)?;
    let far_clip: Float = props.get_or("far_clip", 1.0e4)?;
    if fov <= 0.0 || fov >= 180.0 {
        return Err(SceneError::construction(
            &name,
            format!("fov must lie in (0, 180), found {}", fov),
        ));
    }
    if near_clip <= 0.0 || far_clip <= near_clip {
        return Err(SceneError::construction(
            &name,
            "the near clip plane must lie between zero and the far clip plane",
        ));
    }
    let size = base.film.size();
    let aspect = size.x as Float / size.y as Float;
    let x_fov = match fov_to_x_fov(fov, &fov_axis.to_lowercase(), aspect) {
        Some(x_fov) => x_fov,
        None => {
            return Err(SceneError::construction(
                &name,
                format!(
                    "unknown fov_axis \"{}\", expected x, y, diagonal, smaller or larger",
                    fov_axis
                ),
            ))
        }
    };
    Ok(PluginObject::Sensor(Box::new(PerspectiveSensor::new(
        base, x_fov, near_clip, far_clip,
    ))))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_of_view_axes() {
        assert_eq!(fov_to_x_fov(45.0, "x", 2.0), Some(45.0));
        let x_fov = fov_to_x_fov(90.0, "y", 2.0).unwrap();
        // tan(x_fov / 2) = 2 * tan(45)
        assert!((radians(x_fov * 0.5).tan() - 2.0).abs() < 1.0e-4);
        assert_eq!(fov_to_x_fov(45.0, "larger", 2.0), Some(45.0));
        assert!(fov_to_x_fov(45.0, "z", 2.0).is_none());
    }
}
