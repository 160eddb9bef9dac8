// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::error::SceneError;
use crate::core::geometry::Point2f;
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::texture::Texture;

/// A constant grey value.
pub struct UniformTexture {
    pub value: Float,
    base: ObjectBase,
}

impl UniformTexture {
    pub fn new(value: Float) -> Self {
        UniformTexture {
            value,
            base: ObjectBase::default(),
        }
    }
}

impl SceneObject for UniformTexture {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Texture
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_parameter(
            "value",
            ParameterRef::Float(&mut self.value),
            ParamFlags::Differentiable as u8,
        );
    }
}

impl Texture for UniformTexture {
    fn evaluate(&self, _uv: &Point2f) -> Spectrum {
        Spectrum::new(self.value)
    }
    fn mean(&self) -> Spectrum {
        Spectrum::new(self.value)
    }
}

pub fn create(
    props: &mut Properties,
    _manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let value: Float = props.get_or("value", 1.0)?;
    let mut texture = UniformTexture::new(value);
    texture.base = ObjectBase::new(props);
    Ok(PluginObject::Texture(Box::new(texture)))
}
