//! The **PluginManager** turns property bags into objects.
//!
//! Creating an object resolves nested declarations first, depth-first
//! and in declaration order. The category of a nested declaration is
//! taken from its hint, else from its key (`film`, `rfilter`,
//! `shape_2`, `emitters`), else from the only category registering its
//! type name. The factory for `(category, type, variant)` then builds
//! the object from the bag.
//!
//! The first lookup locks the variant. Successful constructions are
//! recorded in an insertion ordered ledger which `loaded_plugins()`
//! reports. A failed construction records none of the objects it
//! built on the way:
//!
//! ```rust
//! use rs_scene::core::api::register_builtin_plugins;
//! use rs_scene::core::object::Category;
//! use rs_scene::core::plugin::PluginManager;
//! use rs_scene::core::properties::Properties;
//! use rs_scene::core::registry::Registry;
//!
//! let mut registry = Registry::new();
//! register_builtin_plugins(&mut registry).unwrap();
//! let mut manager = PluginManager::new(registry);
//! let sphere = manager
//!     .create_object(Properties::new("sphere"), Category::Shape)
//!     .unwrap();
//! assert_eq!(sphere.plugin_name(), "sphere");
//! assert_eq!(manager.loaded_plugins().len(), 3);
//! ```

// rs_scene
use crate::core::base::Float;
use crate::core::error::SceneError;
use crate::core::object::{Category, PluginObject};
use crate::core::properties::{Properties, PropertyType, PropertyValue};
use crate::core::registry::Registry;
use crate::core::texture::Texture;
use crate::core::variant::{Variant, VariantSelector};

pub struct PluginManager {
    registry: Registry,
    variant: VariantSelector,
    loaded: Vec<(Category, String)>,
    /// Ledger entries of the construction in progress.
    staged: Vec<(Category, String)>,
    depth: usize,
    strict: bool,
}

impl PluginManager {
    pub fn new(registry: Registry) -> Self {
        PluginManager {
            registry,
            variant: VariantSelector::default(),
            loaded: Vec::new(),
            staged: Vec::new(),
            depth: 0,
            strict: false,
        }
    }
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }
    /// The active variant; does not lock it.
    pub fn variant(&self) -> Variant {
        self.variant.current()
    }
    pub fn set_variant(&mut self, variant: Variant) -> Result<(), SceneError> {
        self.variant.set(variant)?;
        log::debug!("variant set to {}", variant);
        Ok(())
    }
    /// In strict mode attributes no factory asked for fail the
    /// construction instead of being reported as a warning.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }
    pub fn is_strict(&self) -> bool {
        self.strict
    }
    /// `(category, type name)` of every plugin constructed so far, in
    /// the order they were first loaded.
    pub fn loaded_plugins(&self) -> &[(Category, String)] {
        &self.loaded
    }
    /// Category of a top-level declaration: its hint, else the only
    /// category registering its type name.
    pub fn infer_category(&mut self, props: &Properties) -> Result<Category, SceneError> {
        if let Some(category) = props.category() {
            return Ok(category);
        }
        let name = props.plugin_name().unwrap_or_default();
        let variant = self.variant.lock();
        match self.registry.categories_for(name, variant).as_slice() {
            [category] => Ok(*category),
            _ => Err(SceneError::UnknownCategory(name.to_string())),
        }
    }
    pub fn create_object(
        &mut self,
        props: Properties,
        category: Category,
    ) -> Result<PluginObject, SceneError> {
        let mark = self.staged.len();
        self.depth += 1;
        let result = self.construct(props, category);
        self.depth -= 1;
        if result.is_err() {
            self.staged.truncate(mark);
        }
        if self.depth == 0 {
            for (category, name) in std::mem::take(&mut self.staged) {
                if !self.loaded.iter().any(|(c, n)| *c == category && *n == name) {
                    log::info!("Loaded {} plugin \"{}\"", category, name);
                    self.loaded.push((category, name));
                }
            }
        }
        result
    }
    fn construct(
        &mut self,
        mut props: Properties,
        category: Category,
    ) -> Result<PluginObject, SceneError> {
        let name: String = match props.plugin_name() {
            Some(name) => name.to_string(),
            None => return Err(SceneError::MissingTypeName(category)),
        };
        let variant = self.variant.lock();
        props.resolve_nested(|key, nested| self.create_nested(key, nested))?;
        let factory = self.registry.resolve(category, &name, variant)?;
        let object = factory(&mut props, self)?;
        if object.category() != category {
            return Err(SceneError::UnexpectedCategory {
                expected: category,
                found: object.category(),
            });
        }
        let unqueried = props.unqueried();
        if !unqueried.is_empty() {
            let reason = format!("unreferenced attribute(s) {:?}", unqueried);
            if self.strict {
                return Err(SceneError::construction(&name, reason));
            }
            log::warn!("{} plugin \"{}\": {}", category, name, reason);
        }
        self.staged.push((category, name));
        Ok(object)
    }
    fn create_nested(&mut self, key: &str, nested: Properties) -> Result<PluginObject, SceneError> {
        let category = match nested.category().or_else(|| Category::from_key(key)) {
            Some(category) => category,
            None => {
                let variant = self.variant.lock();
                let name = nested.plugin_name().unwrap_or_default();
                match self.registry.categories_for(name, variant).as_slice() {
                    [category] => *category,
                    _ => return Err(SceneError::UnknownCategory(key.to_string())),
                }
            }
        };
        self.create_object(nested, category)
    }
    /// Object built from an empty declaration of `name`.
    pub fn create_default(
        &mut self,
        category: Category,
        name: &str,
    ) -> Result<PluginObject, SceneError> {
        self.create_object(Properties::new(name), category)
    }
    /// Texture attribute `name` of `props`: a texture object is used as
    /// is, a float becomes a `uniform` texture, a color an `srgb` one.
    /// Absent attributes give a uniform texture of value `default`.
    pub fn texture(
        &mut self,
        props: &mut Properties,
        name: &str,
        default: Float,
    ) -> Result<Box<dyn Texture>, SceneError> {
        self.texture_impl(props, name, default, false)
    }
    /// Like `texture`, but plain values become `d65` textures.
    pub fn emitter_texture(
        &mut self,
        props: &mut Properties,
        name: &str,
        default: Float,
    ) -> Result<Box<dyn Texture>, SceneError> {
        self.texture_impl(props, name, default, true)
    }
    fn texture_impl(
        &mut self,
        props: &mut Properties,
        name: &str,
        default: Float,
        within_emitter: bool,
    ) -> Result<Box<dyn Texture>, SceneError> {
        if let Some(object) = props.take_object(name) {
            return object.into_texture();
        }
        let value: PropertyValue = match props.property_type(name) {
            None => PropertyValue::Float(default),
            Some(PropertyType::Float) | Some(PropertyType::Long) => {
                PropertyValue::Float(props.get::<Float>(name)?)
            }
            Some(PropertyType::Color) => PropertyValue::Color(props.get(name)?),
            Some(found) => {
                return Err(SceneError::TypeMismatch {
                    name: name.to_string(),
                    expected: PropertyType::Object,
                    found,
                })
            }
        };
        let mut texture = match (&value, within_emitter) {
            (_, true) => Properties::new("d65"),
            (PropertyValue::Color(_), false) => Properties::new("srgb"),
            _ => Properties::new("uniform"),
        };
        match value {
            PropertyValue::Color(color) => texture.set("color", color)?,
            other => texture.set("value", other)?,
        }
        self.create_object(texture, Category::Texture)?.into_texture()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::api::register_builtin_plugins;
    use crate::core::object::SceneObject;
    use crate::core::variant::Variant;

    fn manager() -> PluginManager {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        PluginManager::new(registry)
    }

    #[test]
    fn type_names_are_required_and_resolved() {
        let mut manager = manager();
        match manager.create_object(Properties::default(), Category::Shape) {
            Err(SceneError::MissingTypeName(Category::Shape)) => {}
            other => panic!("unexpected {:?}", other),
        }
        match manager.create_object(Properties::new("teapot"), Category::Shape) {
            Err(SceneError::UnknownType { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(manager.loaded_plugins().is_empty());
    }

    #[test]
    fn declared_attributes_rebuild_the_object() {
        let mut manager = manager();
        let mut props = Properties::new("sphere");
        props.set("radius", 2.5 as Float).unwrap();
        let sphere = manager
            .create_object(props, Category::Shape)
            .unwrap()
            .into_shape()
            .unwrap();
        assert_eq!(sphere.declared("radius"), Some(&PropertyValue::Float(2.5)));
        assert_eq!(sphere.declared("center"), None);
        let mut copy = Properties::new(sphere.plugin_name());
        for (name, value) in sphere.base().declared.iter() {
            copy.set(name, value.clone()).unwrap();
        }
        let again = manager
            .create_object(copy, Category::Shape)
            .unwrap()
            .into_shape()
            .unwrap();
        assert_eq!(again.bbox(), sphere.bbox());
    }

    #[test]
    fn prebuilt_objects_are_taken_from_the_bag() {
        let mut manager = manager();
        let mut film = Properties::new("hdrfilm");
        film.set("width", 16_i64).unwrap();
        film.set("height", 8_i64).unwrap();
        let film = manager.create_object(film, Category::Film).unwrap();
        let mut props = Properties::new("perspective");
        props.set("film", film).unwrap();
        let sensor = manager
            .create_object(props, Category::Sensor)
            .unwrap()
            .into_sensor()
            .unwrap();
        assert_eq!(sensor.film().size().x, 16);
        assert_eq!(sensor.film().size().y, 8);
    }

    #[test]
    fn strict_mode_rejects_unreferenced_attributes() {
        let mut manager = manager();
        let mut props = Properties::new("sphere");
        props.set("radiuss", 2.0 as Float).unwrap();
        assert!(manager.create_object(props, Category::Shape).is_ok());
        manager.set_strict(true);
        let mut props = Properties::new("sphere");
        props.set("radiuss", 2.0 as Float).unwrap();
        match manager.create_object(props, Category::Shape) {
            Err(SceneError::ConstructionFailed { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn variant_is_locked_by_the_first_construction() {
        let mut manager = manager();
        manager.set_variant(Variant::ScalarRgb).unwrap();
        manager.set_variant(Variant::GpuAutodiffRgb).unwrap();
        manager
            .create_object(Properties::new("sphere"), Category::Shape)
            .unwrap();
        match manager.set_variant(Variant::ScalarRgb) {
            Err(SceneError::VariantLocked { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(manager.set_variant(Variant::GpuAutodiffRgb).is_ok());
        assert_eq!(manager.variant(), Variant::GpuAutodiffRgb);
    }

    #[test]
    fn ledger_lists_each_plugin_once() {
        let mut manager = manager();
        for _ in 0..2 {
            manager
                .create_object(Properties::new("sphere"), Category::Shape)
                .unwrap();
        }
        let loaded = manager.loaded_plugins();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[2], (Category::Shape, "sphere".to_string()));
        assert_eq!(
            loaded.iter().filter(|(_, n)| n == "sphere").count(),
            1
        );
    }

    #[test]
    fn failed_construction_leaves_the_ledger_alone() {
        let mut manager = manager();
        let mut props = Properties::new("scene");
        props.set("shape_1", Properties::new("sphere")).unwrap();
        props.set("integrator", Properties::new("nope")).unwrap();
        assert!(manager.create_object(props, Category::Scene).is_err());
        assert!(manager.loaded_plugins().is_empty());
        manager
            .create_object(Properties::new("sphere"), Category::Shape)
            .unwrap();
        assert_eq!(manager.loaded_plugins().len(), 3);
    }
}
