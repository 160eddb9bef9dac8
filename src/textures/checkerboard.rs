// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::error::SceneError;
use crate::core::geometry::Point2f;
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::texture::Texture;

/// Alternates between two textures on a 2x2 grid over the unit
/// square of texture space.
pub struct CheckerboardTexture {
    pub color0: Box<dyn Texture>,
    pub color1: Box<dyn Texture>,
    base: ObjectBase,
}

impl SceneObject for CheckerboardTexture {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Texture
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        let flags = ParamFlags::Differentiable as u8;
        callback.put_object("color0", self.color0.as_object_mut(), flags);
        callback.put_object("color1", self.color1.as_object_mut(), flags);
    }
}

impl Texture for CheckerboardTexture {
    fn evaluate(&self, uv: &Point2f) -> Spectrum {
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();
        if (u > 0.5 as Float) == (v > 0.5 as Float) {
            self.color0.evaluate(uv)
        } else {
            self.color1.evaluate(uv)
        }
    }
    fn mean(&self) -> Spectrum {
        (self.color0.mean() + self.color1.mean()) * 0.5 as Float
    }
    fn is_spatially_varying(&self) -> bool {
        true
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let color0 = manager.texture(props, "color0", 0.4)?;
    let color1 = manager.texture(props, "color1", 0.2)?;
    Ok(PluginObject::Texture(Box::new(CheckerboardTexture {
        color0,
        color1,
        base: ObjectBase::new(props),
    })))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::textures::uniform::UniformTexture;

    #[test]
    fn alternates_between_quadrants() {
        let texture = CheckerboardTexture {
            color0: Box::new(UniformTexture::new(1.0)),
            color1: Box::new(UniformTexture::new(0.0)),
            base: ObjectBase::default(),
        };
        assert_eq!(texture.evaluate(&Point2f { x: 0.25, y: 0.25 }), Spectrum::new(1.0));
        assert_eq!(texture.evaluate(&Point2f { x: 0.75, y: 0.25 }), Spectrum::new(0.0));
        assert_eq!(texture.evaluate(&Point2f { x: 0.75, y: 0.75 }), Spectrum::new(1.0));
        assert_eq!(texture.mean(), Spectrum::new(0.5));
    }
}
