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

pub struct DiffuseBsdf {
    pub reflectance: Box<dyn Texture>,
    base: ObjectBase,
}

impl SceneObject for DiffuseBsdf {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Bsdf
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_object(
            "reflectance",
            self.reflectance.as_object_mut(),
            ParamFlags::Differentiable as u8,
        );
    }
}

impl Bsdf for DiffuseBsdf {
    fn eval(&self, uv: &Point2f, cos_view: Float, cos_light: Float) -> Spectrum {
        if cos_view <= 0.0 || cos_light <= 0.0 {
            return Spectrum::default();
        }
        self.reflectance.evaluate(uv) * (INV_PI * cos_light)
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let reflectance = manager.texture(props, "reflectance", 0.5)?;
    Ok(PluginObject::Bsdf(Box::new(DiffuseBsdf {
        reflectance,
        base: ObjectBase::new(props),
    })))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::textures::uniform::UniformTexture;

    #[test]
    fn reflects_on_the_viewer_side_only() {
        let bsdf = DiffuseBsdf {
            reflectance: Box::new(UniformTexture::new(1.0)),
            base: ObjectBase::default(),
        };
        let uv = Point2f::default();
        let f = bsdf.eval(&uv, 1.0, 1.0);
        assert!((f.c[0] - INV_PI).abs() < 1.0e-6);
        assert!(bsdf.eval(&uv, 1.0, -0.5).is_black());
    }
}
