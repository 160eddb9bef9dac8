//! Every object the plugin manager constructs implements
//! **SceneObject**. It carries the identity of the declaration (`id`
//! and type name), remembers the plain attributes it was declared
//! with and takes part in parameter traversal.
//!
//! Category specific behaviour lives in separate traits (**Sensor**,
//! **Film**, **Shape**, ...). The closed enum **PluginObject** carries
//! a constructed object of any category through property bags and
//! factories.

// std
use std::fmt;
// others
use strum_macros::{Display, EnumIter, EnumString};
// rs_scene
use crate::core::bsdf::Bsdf;
use crate::core::emitter::Emitter;
use crate::core::error::SceneError;
use crate::core::film::Film;
use crate::core::filter::ReconstructionFilter;
use crate::core::integrator::Integrator;
use crate::core::parameters::TraversalCallback;
use crate::core::properties::{Properties, PropertyValue};
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::core::texture::Texture;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Scene,
    Sensor,
    Film,
    Sampler,
    #[strum(serialize = "rfilter")]
    ReconstructionFilter,
    Shape,
    Emitter,
    Bsdf,
    Texture,
    Integrator,
}

impl Category {
    /// Infers the category from the key of a nested declaration:
    /// `film`, `rfilter`, `shape_1`, `emitters2`, ...
    pub fn from_key(key: &str) -> Option<Category> {
        let stem = key.trim_end_matches(|c: char| c.is_ascii_digit() || c == '_');
        if let Ok(category) = stem.parse::<Category>() {
            return Some(category);
        }
        stem.strip_suffix('s')
            .and_then(|singular| singular.parse::<Category>().ok())
    }
}

/// State shared by all objects.
#[derive(Debug, Default, Clone)]
pub struct ObjectBase {
    pub id: String,
    pub plugin_name: String,
    pub declared: Vec<(String, PropertyValue)>,
}

impl ObjectBase {
    pub fn new(props: &Properties) -> Self {
        ObjectBase {
            id: props.id().unwrap_or_default().to_string(),
            plugin_name: props.plugin_name().unwrap_or_default().to_string(),
            declared: props.declared_values(),
        }
    }
}

pub trait SceneObject: AsSceneObject + Send + Sync {
    fn base(&self) -> &ObjectBase;
    fn category(&self) -> Category;
    fn id(&self) -> &str {
        &self.base().id
    }
    fn plugin_name(&self) -> &str {
        &self.base().plugin_name
    }
    /// The plain value an attribute was declared with.
    fn declared(&self, name: &str) -> Option<&PropertyValue> {
        self.base()
            .declared
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
    /// Reports parameters and child objects, in a fixed order.
    fn traverse(&mut self, _callback: &mut dyn TraversalCallback) {}
    /// Called after `keys` were overwritten; recomputes derived state.
    fn parameters_changed(&mut self, _keys: &[String]) -> Result<(), SceneError> {
        Ok(())
    }
}

pub trait AsSceneObject {
    fn as_object(&self) -> &dyn SceneObject;
    fn as_object_mut(&mut self) -> &mut dyn SceneObject;
}

impl<T: SceneObject> AsSceneObject for T {
    fn as_object(&self) -> &dyn SceneObject {
        self
    }
    fn as_object_mut(&mut self) -> &mut dyn SceneObject {
        self
    }
}

pub enum PluginObject {
    Scene(Box<Scene>),
    Sensor(Box<dyn Sensor>),
    Film(Box<dyn Film>),
    Sampler(Box<dyn Sampler>),
    ReconstructionFilter(Box<dyn ReconstructionFilter>),
    Shape(Box<dyn Shape>),
    Emitter(Box<dyn Emitter>),
    Bsdf(Box<dyn Bsdf>),
    Texture(Box<dyn Texture>),
    Integrator(Box<dyn Integrator>),
}

macro_rules! into_category {
    ($fn_name:ident, $variant:ident, $t:ty) => {
        pub fn $fn_name(self) -> Result<$t, SceneError> {
            match self {
                PluginObject::$variant(object) => Ok(object),
                other => Err(SceneError::UnexpectedCategory {
                    expected: Category::$variant,
                    found: other.category(),
                }),
            }
        }
    };
}

impl PluginObject {
    pub fn category(&self) -> Category {
        match self {
            PluginObject::Scene(_) => Category::Scene,
            PluginObject::Sensor(_) => Category::Sensor,
            PluginObject::Film(_) => Category::Film,
            PluginObject::Sampler(_) => Category::Sampler,
            PluginObject::ReconstructionFilter(_) => Category::ReconstructionFilter,
            PluginObject::Shape(_) => Category::Shape,
            PluginObject::Emitter(_) => Category::Emitter,
            PluginObject::Bsdf(_) => Category::Bsdf,
            PluginObject::Texture(_) => Category::Texture,
            PluginObject::Integrator(_) => Category::Integrator,
        }
    }
    pub fn as_object(&self) -> &dyn SceneObject {
        match self {
            PluginObject::Scene(o) => o.as_object(),
            PluginObject::Sensor(o) => o.as_object(),
            PluginObject::Film(o) => o.as_object(),
            PluginObject::Sampler(o) => o.as_object(),
            PluginObject::ReconstructionFilter(o) => o.as_object(),
            PluginObject::Shape(o) => o.as_object(),
            PluginObject::Emitter(o) => o.as_object(),
            PluginObject::Bsdf(o) => o.as_object(),
            PluginObject::Texture(o) => o.as_object(),
            PluginObject::Integrator(o) => o.as_object(),
        }
    }
    pub fn as_object_mut(&mut self) -> &mut dyn SceneObject {
        match self {
            PluginObject::Scene(o) => o.as_object_mut(),
            PluginObject::Sensor(o) => o.as_object_mut(),
            PluginObject::Film(o) => o.as_object_mut(),
            PluginObject::Sampler(o) => o.as_object_mut(),
            PluginObject::ReconstructionFilter(o) => o.as_object_mut(),
            PluginObject::Shape(o) => o.as_object_mut(),
            PluginObject::Emitter(o) => o.as_object_mut(),
            PluginObject::Bsdf(o) => o.as_object_mut(),
            PluginObject::Texture(o) => o.as_object_mut(),
            PluginObject::Integrator(o) => o.as_object_mut(),
        }
    }
    pub fn plugin_name(&self) -> &str {
        self.as_object().plugin_name()
    }
    pub fn id(&self) -> &str {
        self.as_object().id()
    }
    pub fn into_scene(self) -> Result<Scene, SceneError> {
        match self {
            PluginObject::Scene(scene) => Ok(*scene),
            other => Err(SceneError::UnexpectedCategory {
                expected: Category::Scene,
                found: other.category(),
            }),
        }
    }
    into_category!(into_sensor, Sensor, Box<dyn Sensor>);
    into_category!(into_film, Film, Box<dyn Film>);
    into_category!(into_sampler, Sampler, Box<dyn Sampler>);
    into_category!(
        into_filter,
        ReconstructionFilter,
        Box<dyn ReconstructionFilter>
    );
    into_category!(into_shape, Shape, Box<dyn Shape>);
    into_category!(into_emitter, Emitter, Box<dyn Emitter>);
    into_category!(into_bsdf, Bsdf, Box<dyn Bsdf>);
    into_category!(into_texture, Texture, Box<dyn Texture>);
    into_category!(into_integrator, Integrator, Box<dyn Integrator>);
}

impl fmt::Debug for PluginObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category(), self.plugin_name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn categories_from_keys() {
        assert_eq!(Category::from_key("film"), Some(Category::Film));
        assert_eq!(
            Category::from_key("rfilter"),
            Some(Category::ReconstructionFilter)
        );
        assert_eq!(Category::from_key("shape_1"), Some(Category::Shape));
        assert_eq!(Category::from_key("emitters2"), Some(Category::Emitter));
        assert_eq!(Category::from_key("bsdfs"), Some(Category::Bsdf));
        assert_eq!(Category::from_key("light_shape"), None);
        assert_eq!(Category::ReconstructionFilter.to_string(), "rfilter");
    }
}
