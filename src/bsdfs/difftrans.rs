// rs_scene
use crate::core::base::{Float, Spectrum, INV_PI};
use crate::core::bsdf::Bsdf;
use crate::core::error::SceneError;
use crate::core::geometry::Point2f;
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::texture::Texture;

pub struct DiffuseTransmitterBsdf {
    pub transmittance: Box<dyn Texture>,
    base: ObjectBase,
}

impl SceneObject for DiffuseTransmitterBsdf {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Bsdf
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_object(
            "transmittance",
            self.transmittance.as_object_mut(),
            ParamFlags::Differentiable as u8,
        );
    }
}

impl Bsdf for DiffuseTransmitterBsdf {
    fn eval(&self, uv: &Point2f, cos_view: Float, cos_light: Float) -> Spectrum {
        // light and viewer on opposite sides
        if cos_view * cos_light >= 0.0 {
            return Spectrum::default();
        }
        self.transmittance.evaluate(uv) * (INV_PI * cos_light.abs())
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let transmittance = manager.texture(props, "transmittance", 0.5)?;
    Ok(PluginObject::Bsdf(Box::new(DiffuseTransmitterBsdf {
        transmittance,
        base: ObjectBase::new(props),
    })))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::textures::uniform::UniformTexture;

    #[test]
    fn transmits_through_the_surface() {
        let bsdf = DiffuseTransmitterBsdf {
            transmittance: Box::new(UniformTexture::new(0.5)),
            base: ObjectBase::default(),
        };
        let uv = Point2f::default();
        assert!(bsdf.eval(&uv, 1.0, 1.0).is_black());
        let f = bsdf.eval(&uv, 1.0, -1.0);
        assert!((f.c[1] - 0.5 * INV_PI).abs() < 1.0e-6);
    }
}
