// rs_scene
use crate::core::base::{radians, Float, Spectrum};
use crate::core::emitter::{DirectSample, Emitter, EmitterFlags};
use crate::core::error::SceneError;
use crate::core::geometry::{nrm_dot_vec3f, Normal3f, Point2f, Point3f, Vector3f};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::shape::{Shape, ShapeSummary};
use crate::core::texture::Texture;
use crate::emitters::area::sample_surface;

pub struct SpatialVaryingAreaLight {
    pub radiance: Box<dyn Texture>,
    /// Projected onto the surface when given.
    pub texture: Option<Box<dyn Texture>>,
    pub area: Float,
    cutoff_angle: Float,
    cos_cutoff_angle: Float,
    cos_beam_width: Float,
    inv_transition_width: Float,
    blur_size: Float,
    quad_factor: Float,
    attached: bool,
    base: ObjectBase,
}

impl SpatialVaryingAreaLight {
    /// Angles are given in degrees.
    pub fn new(
        radiance: Box<dyn Texture>,
        texture: Option<Box<dyn Texture>>,
        cutoff_angle: Float,
        beam_width: Float,
        blur_size: Float,
        quad_factor: Float,
    ) -> Result<Self, SceneError> {
        if beam_width > cutoff_angle {
            return Err(SceneError::construction(
                "spatialvaryingarea",
                format!(
                    "beam_width ({}) must not exceed cutoff_angle ({})",
                    beam_width, cutoff_angle
                ),
            ));
        }
        let cutoff = radians(cutoff_angle);
        let beam = radians(beam_width);
        let inv_transition_width = if cutoff > beam {
            1.0 / (cutoff - beam)
        } else {
            0.0
        };
        Ok(SpatialVaryingAreaLight {
            radiance,
            texture,
            area: 0.0,
            cutoff_angle: cutoff,
            cos_cutoff_angle: cutoff.cos(),
            cos_beam_width: beam.cos(),
            inv_transition_width,
            blur_size,
            quad_factor,
            attached: false,
            base: ObjectBase::default(),
        })
    }
    pub fn quad_factor(&self) -> Float {
        self.quad_factor
    }
    /// One inside the beam, zero beyond the cutoff and linear in the
    /// angle in between.
    pub fn falloff_curve(&self, cos_theta: Float) -> Float {
        if cos_theta < self.cos_cutoff_angle {
            0.0
        } else if cos_theta > self.cos_beam_width {
            1.0
        } else {
            (self.cutoff_angle - cos_theta.min(1.0).acos()) * self.inv_transition_width
        }
    }
    /// Ramps from zero at the border of `[0, 1]` to one at `blur_size`
    /// inside it.
    pub fn smooth_profile(&self, x: Float) -> Float {
        if x >= self.blur_size && x <= 1.0 - self.blur_size {
            1.0
        } else if x > 0.0 && x < self.blur_size {
            x / self.blur_size
        } else if x > 1.0 - self.blur_size && x < 1.0 {
            (1.0 - x) / self.blur_size
        } else {
            0.0
        }
    }
    fn emitted(&self, uv: &Point2f) -> Spectrum {
        match self.texture.as_ref() {
            Some(texture) => self.radiance.evaluate(uv) * texture.evaluate(uv),
            None => self.radiance.evaluate(uv),
        }
    }
}

impl SceneObject for SpatialVaryingAreaLight {
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
        if let Some(texture) = self.texture.as_mut() {
            callback.put_object(
                "texture",
                texture.as_object_mut(),
                ParamFlags::Differentiable as u8,
            );
        }
    }
}

impl Emitter for SpatialVaryingAreaLight {
    fn flags(&self) -> u8 {
        match self.texture {
            Some(_) => EmitterFlags::Surface as u8 | EmitterFlags::SpatiallyVarying as u8,
            None => EmitterFlags::Surface as u8,
        }
    }
    fn sample_direct(
        &self,
        reference: &Point3f,
        u: &Point2f,
        shape: Option<&dyn Shape>,
    ) -> Option<DirectSample> {
        let s = sample_surface(reference, u, shape)?;
        let uv = s.ps.uv;
        let scale = s.factor
            * self.falloff_curve(s.cos_light)
            * self.smooth_profile(uv.x)
            * self.smooth_profile(uv.y);
        Some(DirectSample {
            p: s.ps.p,
            wi: s.wi,
            dist: s.dist,
            weight: self.emitted(&uv) * scale,
        })
    }
    fn eval(&self, _p: &Point3f, n: &Normal3f, uv: &Point2f, wo: &Vector3f) -> Spectrum {
        let cos_theta = nrm_dot_vec3f(n, wo);
        if cos_theta <= 0.0 {
            return Spectrum::default();
        }
        self.emitted(uv) * self.falloff_curve(cos_theta)
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
    if radiance.is_spatially_varying() {
        return Err(SceneError::construction(
            "spatialvaryingarea",
            "the parameter \"radiance\" cannot be spatially varying",
        ));
    }
    let texture = if props.has_property("texture") {
        let texture = manager.emitter_texture(props, "texture", 1.0)?;
        if !texture.is_spatially_varying() {
            return Err(SceneError::construction(
                "spatialvaryingarea",
                "the parameter \"texture\" must be spatially varying",
            ));
        }
        Some(texture)
    } else {
        None
    };
    let cutoff_angle: Float = props.get_or("cutoff_angle", 20.0)?;
    let beam_width: Float = props.get_or("beam_width", cutoff_angle * 0.75)?;
    let blur_size: Float = props.get_or("blur_size", 0.1)?;
    let quad_factor: Float = props.get_or("quad_factor", 0.001)?;
    let mut emitter = SpatialVaryingAreaLight::new(
        radiance,
        texture,
        cutoff_angle,
        beam_width,
        blur_size,
        quad_factor,
    )?;
    emitter.base = ObjectBase::new(props);
    Ok(PluginObject::Emitter(Box::new(emitter)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::api::register_builtin_plugins;
    use crate::core::registry::Registry;
    use crate::textures::d65::D65Texture;

    fn light() -> SpatialVaryingAreaLight {
        SpatialVaryingAreaLight::new(
            Box::new(D65Texture::new(Spectrum::new(2.0))),
            None,
            20.0,
            15.0,
            0.1,
            0.001,
        )
        .unwrap()
    }

    #[test]
    fn falloff() {
        let emitter = light();
        assert_eq!(emitter.falloff_curve(1.0), 1.0);
        assert_eq!(emitter.falloff_curve(radians(30.0).cos()), 0.0);
        let halfway = emitter.falloff_curve(radians(17.5).cos());
        assert!((halfway - 0.5).abs() < 1.0e-3);
    }

    #[test]
    fn profile_is_blurred_at_the_border() {
        let emitter = light();
        assert_eq!(emitter.smooth_profile(0.5), 1.0);
        assert!((emitter.smooth_profile(0.05) - 0.5).abs() < 1.0e-5);
        assert!((emitter.smooth_profile(0.95) - 0.5).abs() < 1.0e-4);
        assert_eq!(emitter.smooth_profile(0.0), 0.0);
        assert_eq!(emitter.smooth_profile(1.0), 0.0);
    }

    #[test]
    fn eval_inside_the_beam() {
        let emitter = light();
        let n = Normal3f {
            x: 0.0,
            y: 0.0,
            z: 1.0,
        };
        let value = emitter.eval(
            &Point3f::default(),
            &n,
            &Point2f::default(),
            &Vector3f::new(0.0, 0.0, 1.0),
        );
        assert_eq!(value, Spectrum::new(2.0));
        assert_eq!(emitter.flags(), EmitterFlags::Surface as u8);
    }

    #[test]
    fn texture_must_vary() {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        let mut manager = PluginManager::new(registry);
        let mut props = Properties::new("spatialvaryingarea");
        props.set("texture", 0.5 as Float).unwrap();
        assert!(manager.create_object(props, Category::Emitter).is_err());

        let mut props = Properties::new("spatialvaryingarea");
        props.set("texture", Properties::new("checkerboard")).unwrap();
        let emitter = manager
            .create_object(props, Category::Emitter)
            .unwrap()
            .into_emitter()
            .unwrap();
        assert_ne!(emitter.flags() & EmitterFlags::SpatiallyVarying as u8, 0);
    }
}
