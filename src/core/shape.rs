//! All geometric primitives implement a common interface, and the rest
//! of the renderer can use this interface without needing any details
//! about the underlying shape.
//!
//! A shape owns its **Bsdf** and optionally an area **Emitter**. The
//! emitter is attached once, after the shape knows its surface area,
//! and is refreshed whenever the shape's geometry changes.

// rs_scene
use crate::core::base::Float;
use crate::core::bsdf::Bsdf;
use crate::core::emitter::Emitter;
use crate::core::error::SceneError;
use crate::core::geometry::{Bounds3f, Normal3f, Point2f, Point3f, Ray};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::transform::Transform;

#[derive(Debug, Default, Copy, Clone)]
pub struct SurfaceInteraction {
    pub t: Float,
    pub p: Point3f,
    pub n: Normal3f,
    pub uv: Point2f,
}

#[derive(Debug, Default, Copy, Clone)]
pub struct PositionSample {
    pub p: Point3f,
    pub n: Normal3f,
    pub uv: Point2f,
    /// Density with respect to surface area.
    pub pdf: Float,
}

/// What an attached emitter needs to know about its shape.
#[derive(Debug, Copy, Clone)]
pub struct ShapeSummary {
    pub area: Float,
    pub bbox: Bounds3f,
    pub to_world: Transform,
}

pub trait Shape: SceneObject {
    fn bbox(&self) -> Bounds3f;
    fn surface_area(&self) -> Float;
    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction>;
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }
    /// Uniformly samples a point on the surface.
    fn sample_position(&self, u: &Point2f) -> PositionSample;
    fn shape_base(&self) -> &ShapeBase;
    fn bsdf(&self) -> &dyn Bsdf {
        self.shape_base().bsdf.as_ref()
    }
    fn emitter(&self) -> Option<&dyn Emitter> {
        self.shape_base().emitter.as_deref()
    }
    fn summary(&self) -> ShapeSummary {
        ShapeSummary {
            area: self.surface_area(),
            bbox: self.bbox(),
            to_world: self.shape_base().to_world,
        }
    }
}

/// State shared by the shape plugins.
pub struct ShapeBase {
    pub object: ObjectBase,
    pub to_world: Transform,
    pub bsdf: Box<dyn Bsdf>,
    pub emitter: Option<Box<dyn Emitter>>,
}

impl ShapeBase {
    /// Reads `to_world` and takes the bsdf and emitter objects out of
    /// the bag. Without a bsdf a default `diffuse` one is created.
    pub fn new(props: &mut Properties, manager: &mut PluginManager) -> Result<Self, SceneError> {
        let object = ObjectBase::new(props);
        let name = object.plugin_name.clone();
        let to_world: Transform = props.get_or("to_world", Transform::default())?;
        let mut bsdf: Option<Box<dyn Bsdf>> = None;
        let mut emitter: Option<Box<dyn Emitter>> = None;
        for (key, child) in props.objects() {
            match child {
                PluginObject::Bsdf(b) if bsdf.is_none() => bsdf = Some(b),
                PluginObject::Emitter(e) if emitter.is_none() => emitter = Some(e),
                PluginObject::Bsdf(_) | PluginObject::Emitter(_) => {
                    return Err(SceneError::construction(
                        &name,
                        format!("only a single {} can be attached to a shape", key),
                    ))
                }
                other => {
                    return Err(SceneError::construction(
                        &name,
                        format!("unsupported child object \"{}\" ({})", key, other.category()),
                    ))
                }
            }
        }
        let bsdf = match bsdf {
            Some(bsdf) => bsdf,
            None => manager
                .create_default(Category::Bsdf, "diffuse")?
                .into_bsdf()?,
        };
        Ok(ShapeBase {
            object,
            to_world,
            bsdf,
            emitter,
        })
    }
    /// Attaches the area emitter once the shape is complete.
    pub fn attach_emitter(&mut self, summary: &ShapeSummary) -> Result<(), SceneError> {
        if let Some(emitter) = self.emitter.as_mut() {
            emitter.set_shape(summary)?;
        }
        Ok(())
    }
    pub fn notify_emitter(&mut self, summary: &ShapeSummary) {
        if let Some(emitter) = self.emitter.as_mut() {
            emitter.shape_changed(summary);
        }
    }
    pub fn traverse_children(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_object(
            "bsdf",
            self.bsdf.as_object_mut(),
            ParamFlags::Differentiable as u8,
        );
        if let Some(emitter) = self.emitter.as_mut() {
            callback.put_object(
                "emitter",
                emitter.as_object_mut(),
                ParamFlags::Differentiable as u8,
            );
        }
    }
}
