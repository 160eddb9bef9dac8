// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::error::SceneError;
use crate::core::geometry::Point2f;
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::texture::Texture;

/// Emission with the white point of the D65 illuminant, scaled by a
/// float or tinted by a color. Colors are stored relative to white,
/// so the value of a plain float is the float on every channel.
pub struct D65Texture {
    pub value: Spectrum,
    base: ObjectBase,
}

impl D65Texture {
    pub fn new(value: Spectrum) -> Self {
        D65Texture {
            value,
            base: ObjectBase::default(),
        }
    }
}

impl SceneObject for D65Texture {
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

impl Texture for D65Texture {
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
    let scale: Float = props.get_or("scale", 1.0)?;
    let value: Spectrum = if props.has_property("color") {
        props.get("color")?
    } else {
        Spectrum::new(props.get_or::<Float>("value", 1.0)?)
    };
    let mut value = value * scale;
    if manager.variant().is_monochromatic() {
        value = Spectrum::new(value.y());
    }
    let mut texture = D65Texture::new(value);
    texture.base = ObjectBase::new(props);
    Ok(PluginObject::Texture(Box::new(texture)))
}

#[cfg(test)]
mod test {
    use crate::core::api::register_builtin_plugins;
    use crate::core::base::{Float, Spectrum};
    use crate::core::geometry::Point2f;
    use crate::core::object::Category;
    use crate::core::plugin::PluginManager;
    use crate::core::properties::Properties;
    use crate::core::registry::Registry;

    #[test]
    fn scaled_value() {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        let mut manager = PluginManager::new(registry);
        let mut props = Properties::new("d65");
        props.set("value", 10.0 as Float).unwrap();
        props.set("scale", 0.5 as Float).unwrap();
        let texture = manager
            .create_object(props, Category::Texture)
            .unwrap()
            .into_texture()
            .unwrap();
        assert_eq!(texture.evaluate(&Point2f::default()), Spectrum::new(5.0));
        assert!(!texture.is_spatially_varying());
    }
}
