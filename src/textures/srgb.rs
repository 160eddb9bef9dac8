// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::error::SceneError;
use crate::core::geometry::Point2f;
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::texture::Texture;

/// A constant reflectance given as a linear RGB color. Monochrome
/// variants keep only its luminance.
pub struct SrgbTexture {
    pub value: Spectrum,
    base: ObjectBase,
}

impl SrgbTexture {
    pub fn new(value: Spectrum) -> Self {
        SrgbTexture {
            value,
            base: ObjectBase::default(),
        }
    }
}

impl SceneObject for SrgbTexture {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Texture
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_parameter(
            "value",
            ParameterRef::Color(&mut self.value),
            ParamFlags::Differentiable as u8,
        );
    }
}

impl Texture for SrgbTexture {
    fn evaluate(&self, _uv: &Point2f) -> Spectrum {
        self.value
    }
    fn mean(&self) -> Spectrum {
        self.value
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let mut value: Spectrum = props.get_or("color", Spectrum::new(0.5 as Float))?;
    if value.c.iter().any(|c| *c < 0.0) {
        return Err(SceneError::construction(
            "srgb",
            "color components must not be negative",
        ));
    }
    if manager.variant().is_monochromatic() {
        value = Spectrum::new(value.y());
    }
    let mut texture = SrgbTexture::new(value);
    texture.base = ObjectBase::new(props);
    Ok(PluginObject::Texture(Box::new(texture)))
}
