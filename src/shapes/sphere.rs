// std
use std::f32::consts::PI;
// rs_scene
use crate::core::base::{Float, INV_4_PI};
use crate::core::error::SceneError;
use crate::core::geometry::{
    vec3_dot_vec3f, Bounds3f, Normal3f, Point2f, Point3f, Ray, Vector3f,
};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::shape::{PositionSample, Shape, ShapeBase, SurfaceInteraction};

pub struct Sphere {
    pub base: ShapeBase,
    /// World space center.
    pub center: Point3f,
    pub radius: Float,
}

impl Sphere {
    fn uv(&self, n: &Vector3f) -> Point2f {
        let mut phi: Float = n.y.atan2(n.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let theta: Float = n.z.max(-1.0).min(1.0).acos();
        Point2f {
            x: phi / (2.0 * PI),
            y: theta / PI,
        }
    }
}

impl SceneObject for Sphere {
    fn base(&self) -> &ObjectBase {
        &self.base.object
    }
    fn category(&self) -> Category {
        Category::Shape
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_parameter(
            "center",
            ParameterRef::Point3f(&mut self.center),
            ParamFlags::Discontinuous as u8,
        );
        callback.put_parameter(
            "radius",
            ParameterRef::Float(&mut self.radius),
            ParamFlags::Discontinuous as u8,
        );
        self.base.traverse_children(callback);
    }
    fn parameters_changed(&mut self, keys: &[String]) -> Result<(), SceneError> {
        if self.radius <= 0.0 {
            return Err(SceneError::InvalidArgument(format!(
                "sphere radius must be positive, found {}",
                self.radius
            )));
        }
        if keys.iter().any(|k| k == "center" || k == "radius") {
            let summary = self.summary();
            self.base.notify_emitter(&summary);
        }
        Ok(())
    }
}

impl Shape for Sphere {
    fn bbox(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }
    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }
    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let o: Vector3f = ray.o - self.center;
        let a: Float = ray.d.length_squared();
        let b: Float = 2.0 * vec3_dot_vec3f(&o, &ray.d);
        let c: Float = o.length_squared() - self.radius * self.radius;
        let discrim: Float = b * b - 4.0 * a * c;
        if discrim < 0.0 || a == 0.0 {
            return None;
        }
        let root: Float = discrim.sqrt();
        let q: Float = if b < 0.0 {
            -0.5 * (b - root)
        } else {
            -0.5 * (b + root)
        };
        let mut t0: Float = q / a;
        let mut t1: Float = if q != 0.0 { c / q } else { t0 };
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        let t = if t0 > 0.0 && t0 < ray.t_max {
            t0
        } else if t1 > 0.0 && t1 < ray.t_max {
            t1
        } else {
            return None;
        };
        let p: Point3f = ray.position(t);
        let n: Vector3f = (p - self.center) / self.radius;
        Some(SurfaceInteraction {
            t,
            p,
            n: Normal3f::from(n),
            uv: self.uv(&n),
        })
    }
    fn sample_position(&self, u: &Point2f) -> PositionSample {
        let z: Float = 1.0 - 2.0 * u.x;
        let r: Float = (1.0 - z * z).max(0.0).sqrt();
        let phi: Float = 2.0 * PI * u.y;
        let n = Vector3f::new(r * phi.cos(), r * phi.sin(), z);
        PositionSample {
            p: self.center + n * self.radius,
            n: Normal3f::from(n),
            uv: self.uv(&n),
            pdf: INV_4_PI / (self.radius * self.radius),
        }
    }
    fn shape_base(&self) -> &ShapeBase {
        &self.base
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let base = ShapeBase::new(props, manager)?;
    let center: Point3f = props.get_or("center", Point3f::default())?;
    let radius: Float = props.get_or("radius", 1.0)?;
    if radius <= 0.0 {
        return Err(SceneError::construction(
            "sphere",
            format!("radius must be positive, found {}", radius),
        ));
    }
    // to_world moves and scales the sphere uniformly
    let center = base.to_world.transform_point(&center);
    let radius = base
        .to_world
        .transform_vector(&Vector3f::new(radius, 0.0, 0.0))
        .length();
    let mut sphere = Sphere {
        base,
        center,
        radius,
    };
    let summary = sphere.summary();
    sphere.base.attach_emitter(&summary)?;
    Ok(PluginObject::Shape(Box::new(sphere)))
}
