//! In order for objects in a scene to be visible, there must be a
//! source of illumination.
//!
//! Stand-alone emitters (e.g. `point`) live directly in the scene.
//! Area emitters are declared inside a shape, which attaches itself
//! through `set_shape` once it is complete.

// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::error::SceneError;
use crate::core::geometry::{Normal3f, Point2f, Point3f, Vector3f};
use crate::core::object::SceneObject;
use crate::core::shape::{Shape, ShapeSummary};

#[repr(u8)]
pub enum EmitterFlags {
    DeltaPosition = 1,
    Surface = 2,
    SpatiallyVarying = 4,
}

pub fn is_delta_emitter(flags: u8) -> bool {
    (flags & EmitterFlags::DeltaPosition as u8) > 0
}

/// An emitter position seen from a reference point, weighted for
/// direct illumination.
#[derive(Debug, Default, Copy, Clone)]
pub struct DirectSample {
    pub p: Point3f,
    /// Unit direction from the reference point towards `p`.
    pub wi: Vector3f,
    pub dist: Float,
    /// Incident radiance divided by the sampling density.
    pub weight: Spectrum,
}

pub trait Emitter: SceneObject {
    fn flags(&self) -> u8;
    /// Samples illumination arriving at `reference`. Area emitters
    /// sample the surface of `shape`.
    fn sample_direct(
        &self,
        reference: &Point3f,
        u: &Point2f,
        shape: Option<&dyn Shape>,
    ) -> Option<DirectSample>;
    /// Radiance leaving surface point `p` towards `wo`.
    fn eval(&self, _p: &Point3f, _n: &Normal3f, _uv: &Point2f, _wo: &Vector3f) -> Spectrum {
        Spectrum::default()
    }
    /// Binds an area emitter to its shape; may only happen once.
    fn set_shape(&mut self, _summary: &ShapeSummary) -> Result<(), SceneError> {
        Err(SceneError::construction(
            self.plugin_name(),
            "emitter cannot be attached to a shape",
        ))
    }
    /// The geometry of the owning shape changed.
    fn shape_changed(&mut self, _summary: &ShapeSummary) {}
}
