//! Maps `(category, type name, variant)` to the factory building the
//! object.

// std
use std::collections::HashMap;
// others
use strum::IntoEnumIterator;
// rs_scene
use crate::core::error::SceneError;
use crate::core::object::{Category, PluginObject};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::variant::Variant;

/// Builds an object from a bag whose nested declarations are already
/// resolved. Factories may use the manager to create default children.
pub type PluginFactory =
    fn(&mut Properties, &mut PluginManager) -> Result<PluginObject, SceneError>;

#[derive(Default, Clone)]
pub struct Registry {
    entries: HashMap<(Category, String, Variant), PluginFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }
    pub fn register(
        &mut self,
        category: Category,
        name: &str,
        variant: Variant,
        factory: PluginFactory,
    ) -> Result<(), SceneError> {
        let key = (category, name.to_string(), variant);
        if self.entries.contains_key(&key) {
            return Err(SceneError::DuplicateRegistration {
                category,
                name: name.to_string(),
                variant,
            });
        }
        self.entries.insert(key, factory);
        Ok(())
    }
    pub fn register_all_variants(
        &mut self,
        category: Category,
        name: &str,
        factory: PluginFactory,
    ) -> Result<(), SceneError> {
        for variant in Variant::iter() {
            self.register(category, name, variant, factory)?;
        }
        Ok(())
    }
    pub fn resolve(
        &self,
        category: Category,
        name: &str,
        variant: Variant,
    ) -> Result<PluginFactory, SceneError> {
        self.entries
            .get(&(category, name.to_string(), variant))
            .copied()
            .ok_or_else(|| SceneError::UnknownType {
                category,
                name: name.to_string(),
                variant,
            })
    }
    /// Categories registering `name` for `variant`, in declaration
    /// order of `Category`.
    pub fn categories_for(&self, name: &str, variant: Variant) -> Vec<Category> {
        Category::iter()
            .filter(|c| {
                self.entries
                    .contains_key(&(*c, name.to_string(), variant))
            })
            .collect()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::textures::uniform;

    #[test]
    fn one_factory_per_key() {
        let mut registry = Registry::new();
        registry
            .register(Category::Texture, "uniform", Variant::ScalarRgb, uniform::create)
            .unwrap();
        assert!(matches!(
            registry.register(Category::Texture, "uniform", Variant::ScalarRgb, uniform::create),
            Err(SceneError::DuplicateRegistration { .. })
        ));
        assert!(registry
            .resolve(Category::Texture, "uniform", Variant::ScalarRgb)
            .is_ok());
        assert!(matches!(
            registry.resolve(Category::Texture, "uniform", Variant::ScalarMono),
            Err(SceneError::UnknownType { .. })
        ));
        assert!(matches!(
            registry.resolve(Category::Bsdf, "uniform", Variant::ScalarRgb),
            Err(SceneError::UnknownType { .. })
        ));
    }

    #[test]
    fn categories_by_type_name() {
        let mut registry = Registry::new();
        registry
            .register_all_variants(Category::Texture, "uniform", uniform::create)
            .unwrap();
        assert_eq!(registry.len(), 8);
        assert_eq!(
            registry.categories_for("uniform", Variant::PacketRgb),
            vec![Category::Texture]
        );
        assert!(registry.categories_for("sphere", Variant::PacketRgb).is_empty());
    }
}
