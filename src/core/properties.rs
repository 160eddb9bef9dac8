//! Bundle up named attributes of a declaration in a generic way.
//!
//! A **Properties** bag is the input of every plugin factory. It keeps
//! its entries in declaration order, knows the optional `id` and type
//! name of the declaration and can hold three kinds of entries:
//!
//! - plain values (`PropertyValue`), e.g. a float or a transform,
//! - nested declarations, which the plugin manager turns into objects
//!   before the owning factory runs,
//! - already constructed objects.
//!
//! Every getter marks the entry as queried, so attributes nobody looked
//! at can be reported once the object is built.
//!
//! ```rust
//! use rs_scene::core::properties::Properties;
//!
//! let mut props = Properties::new("sphere");
//! props.set("radius", 2.0_f32).unwrap();
//! assert_eq!(props.get::<f32>("radius").unwrap(), 2.0);
//! assert_eq!(props.get_or::<f32>("eta", 1.5).unwrap(), 1.5);
//! assert!(props.set("radius", 3.0_f32).is_err());
//! ```

// std
use std::cell::Cell;
use std::fmt;
// others
use strum_macros::Display;
// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::error::SceneError;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::object::{Category, PluginObject};
use crate::core::transform::Transform;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum PropertyType {
    Bool,
    Long,
    Float,
    String,
    Point3f,
    Vector3f,
    Color,
    Transform,
    Floats,
    Longs,
    Points,
    Nested,
    Object,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Long(i64),
    Float(Float),
    String(String),
    Point3f(Point3f),
    Vector3f(Vector3f),
    Color(Spectrum),
    Transform(Transform),
    Floats(Vec<Float>),
    Longs(Vec<i64>),
    Points(Vec<Point3f>),
}

impl PropertyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Bool(_) => PropertyType::Bool,
            PropertyValue::Long(_) => PropertyType::Long,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Point3f(_) => PropertyType::Point3f,
            PropertyValue::Vector3f(_) => PropertyType::Vector3f,
            PropertyValue::Color(_) => PropertyType::Color,
            PropertyValue::Transform(_) => PropertyType::Transform,
            PropertyValue::Floats(_) => PropertyType::Floats,
            PropertyValue::Longs(_) => PropertyType::Longs,
            PropertyValue::Points(_) => PropertyType::Points,
        }
    }
}

/// One entry of a bag.
pub enum Property {
    Value(PropertyValue),
    Nested(Properties),
    Object(PluginObject),
}

impl Property {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Property::Value(v) => v.property_type(),
            Property::Nested(_) => PropertyType::Nested,
            Property::Object(_) => PropertyType::Object,
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Value(v) => write!(f, "{:?}", v),
            Property::Nested(p) => write!(f, "{:?}", p),
            Property::Object(o) => write!(f, "Object({}:{})", o.category(), o.plugin_name()),
        }
    }
}

macro_rules! property_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for PropertyValue {
            fn from(v: $t) -> Self {
                PropertyValue::$variant(v)
            }
        }
        impl From<$t> for Property {
            fn from(v: $t) -> Self {
                Property::Value(PropertyValue::$variant(v))
            }
        }
    };
}

property_from!(bool, Bool);
property_from!(i64, Long);
property_from!(Float, Float);
property_from!(String, String);
property_from!(Point3f, Point3f);
property_from!(Vector3f, Vector3f);
property_from!(Spectrum, Color);
property_from!(Transform, Transform);
property_from!(Vec<Float>, Floats);
property_from!(Vec<i64>, Longs);
property_from!(Vec<Point3f>, Points);

impl From<&str> for Property {
    fn from(v: &str) -> Self {
        Property::Value(PropertyValue::String(v.to_string()))
    }
}

impl From<PropertyValue> for Property {
    fn from(v: PropertyValue) -> Self {
        Property::Value(v)
    }
}

impl From<Properties> for Property {
    fn from(v: Properties) -> Self {
        Property::Nested(v)
    }
}

impl From<PluginObject> for Property {
    fn from(v: PluginObject) -> Self {
        Property::Object(v)
    }
}

/// Conversion used by the typed getters.
pub trait FromProperty: Sized {
    const TYPE: PropertyType;
    fn from_value(value: &PropertyValue) -> Option<Self>;
}

macro_rules! from_property {
    ($t:ty, $variant:ident) => {
        impl FromProperty for $t {
            const TYPE: PropertyType = PropertyType::$variant;
            fn from_value(value: &PropertyValue) -> Option<Self> {
                match value {
                    PropertyValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

from_property!(bool, Bool);
from_property!(i64, Long);
from_property!(String, String);
from_property!(Point3f, Point3f);
from_property!(Vector3f, Vector3f);
from_property!(Spectrum, Color);
from_property!(Transform, Transform);
from_property!(Vec<i64>, Longs);
from_property!(Vec<Point3f>, Points);

impl FromProperty for Float {
    const TYPE: PropertyType = PropertyType::Float;
    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Long(v) => Some(*v as Float),
            _ => None,
        }
    }
}

impl FromProperty for Vec<Float> {
    const TYPE: PropertyType = PropertyType::Floats;
    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Floats(v) => Some(v.clone()),
            PropertyValue::Longs(v) => Some(v.iter().map(|l| *l as Float).collect()),
            _ => None,
        }
    }
}

pub struct PropertyItem {
    pub name: String,
    pub value: Property,
    queried: Cell<bool>,
}

impl fmt::Debug for PropertyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:?}", self.name, self.value)
    }
}

#[derive(Debug, Default)]
pub struct Properties {
    id: Option<String>,
    plugin_name: Option<String>,
    category: Option<Category>,
    items: Vec<PropertyItem>,
}

impl Properties {
    pub fn new(plugin_name: &str) -> Self {
        Properties {
            plugin_name: Some(plugin_name.to_string()),
            ..Default::default()
        }
    }
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    pub fn set_id(&mut self, id: &str) {
        self.id = Some(id.to_string());
    }
    pub fn plugin_name(&self) -> Option<&str> {
        self.plugin_name.as_deref()
    }
    pub fn set_plugin_name(&mut self, name: &str) {
        self.plugin_name = Some(name.to_string());
    }
    /// Category hint, set by front-ends which know it.
    pub fn category(&self) -> Option<Category> {
        self.category
    }
    pub fn set_category(&mut self, category: Category) {
        self.category = Some(category);
    }
    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name == name)
    }
    /// Adds a new entry; names are unique within a bag.
    pub fn set<V: Into<Property>>(&mut self, name: &str, value: V) -> Result<(), SceneError> {
        if self.has_property(name) {
            return Err(SceneError::DuplicateAttribute(name.to_string()));
        }
        self.items.push(PropertyItem {
            name: name.to_string(),
            value: value.into(),
            queried: Cell::new(false),
        });
        Ok(())
    }
    /// Like `set`, but overwrites an existing entry in place.
    pub fn replace<V: Into<Property>>(&mut self, name: &str, value: V) {
        match self.position(name) {
            Some(i) => {
                self.items[i].value = value.into();
                self.items[i].queried.set(false);
            }
            None => self.items.push(PropertyItem {
                name: name.to_string(),
                value: value.into(),
                queried: Cell::new(false),
            }),
        }
    }
    pub fn has_property(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
    pub fn remove(&mut self, name: &str) -> Option<Property> {
        self.position(name).map(|i| self.items.remove(i).value)
    }
    /// Names in declaration order.
    pub fn property_names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name.as_str()).collect()
    }
    pub fn property_type(&self, name: &str) -> Option<PropertyType> {
        self.position(name)
            .map(|i| self.items[i].value.property_type())
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    /// Plain value without marking the entry as queried.
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        match self.position(name).map(|i| &self.items[i].value) {
            Some(Property::Value(v)) => Some(v),
            _ => None,
        }
    }
    pub fn mark_queried(&self, name: &str) {
        if let Some(i) = self.position(name) {
            self.items[i].queried.set(true);
        }
    }
    pub fn get<T: FromProperty>(&self, name: &str) -> Result<T, SceneError> {
        let item = match self.position(name) {
            Some(i) => &self.items[i],
            None => return Err(SceneError::MissingAttribute(name.to_string())),
        };
        item.queried.set(true);
        let mismatch = |found: PropertyType| SceneError::TypeMismatch {
            name: name.to_string(),
            expected: T::TYPE,
            found,
        };
        match &item.value {
            Property::Value(v) => T::from_value(v).ok_or_else(|| mismatch(v.property_type())),
            other => Err(mismatch(other.property_type())),
        }
    }
    /// The default is only used when the entry is absent.
    pub fn get_or<T: FromProperty>(&self, name: &str, default: T) -> Result<T, SceneError> {
        if self.has_property(name) {
            self.get(name)
        } else {
            Ok(default)
        }
    }
    /// Removes and returns a constructed object.
    pub fn take_object(&mut self, name: &str) -> Option<PluginObject> {
        let i = self.position(name)?;
        if let Property::Object(_) = self.items[i].value {
            match self.items.remove(i).value {
                Property::Object(object) => Some(object),
                _ => None,
            }
        } else {
            None
        }
    }
    /// Drains every constructed object, in declaration order.
    pub fn objects(&mut self) -> Vec<(String, PluginObject)> {
        let mut objects: Vec<(String, PluginObject)> = Vec::new();
        let mut rest: Vec<PropertyItem> = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            match item.value {
                Property::Object(object) => objects.push((item.name, object)),
                value => rest.push(PropertyItem {
                    name: item.name,
                    value,
                    queried: item.queried,
                }),
            }
        }
        self.items = rest;
        objects
    }
    /// Replaces every nested declaration by the object `build` returns
    /// for it, depth-first and in declaration order.
    pub fn resolve_nested<F>(&mut self, mut build: F) -> Result<(), SceneError>
    where
        F: FnMut(&str, Properties) -> Result<PluginObject, SceneError>,
    {
        for item in self.items.iter_mut() {
            if let Property::Nested(_) = item.value {
                let placeholder = Property::Value(PropertyValue::Bool(false));
                if let Property::Nested(nested) = std::mem::replace(&mut item.value, placeholder) {
                    item.value = Property::Object(build(&item.name, nested)?);
                }
            }
        }
        Ok(())
    }
    /// Entries nobody asked for, objects included.
    pub fn unqueried(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| !item.queried.get())
            .map(|item| item.name.clone())
            .collect()
    }
    /// Snapshot of all plain values, in declaration order.
    pub fn declared_values(&self) -> Vec<(String, PropertyValue)> {
        self.items
            .iter()
            .filter_map(|item| match &item.value {
                Property::Value(v) => Some((item.name.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn set_never_overwrites() {
        let mut props = Properties::new("point");
        props.set("intensity", 10.0 as Float).unwrap();
        match props.set("intensity", 1.0 as Float) {
            Err(SceneError::DuplicateAttribute(name)) => assert_eq!(name, "intensity"),
            other => panic!("unexpected {:?}", other),
        }
        props.replace("intensity", 2.0 as Float);
        assert_eq!(props.get::<Float>("intensity").unwrap(), 2.0);
    }

    #[test]
    fn getters_check_types() {
        let mut props = Properties::new("sphere");
        props.set("radius", 2_i64).unwrap();
        props.set("filename", "mesh.ply").unwrap();
        assert_eq!(props.get::<Float>("radius").unwrap(), 2.0);
        assert!(matches!(
            props.get::<Float>("filename"),
            Err(SceneError::TypeMismatch {
                expected: PropertyType::Float,
                found: PropertyType::String,
                ..
            })
        ));
        assert!(matches!(
            props.get_or::<bool>("filename", true),
            Err(SceneError::TypeMismatch { .. })
        ));
        assert!(matches!(
            props.get::<Float>("center"),
            Err(SceneError::MissingAttribute(_))
        ));
    }

    #[test]
    fn names_keep_declaration_order() {
        let mut props = Properties::new("scene");
        props.set("b", true).unwrap();
        props.set("a", Properties::new("sphere")).unwrap();
        props.set("c", vec![1.0 as Float, 2.0]).unwrap();
        assert_eq!(props.property_names(), vec!["b", "a", "c"]);
        assert_eq!(props.property_type("a"), Some(PropertyType::Nested));
        assert_eq!(props.declared_values().len(), 2);
    }

    #[test]
    fn unqueried_entries_are_reported() {
        let mut props = Properties::new("box");
        props.set("radius", 0.5 as Float).unwrap();
        props.set("typo", 1_i64).unwrap();
        let _ = props.get::<Float>("radius");
        assert_eq!(props.unqueried(), vec!["typo".to_string()]);
    }
}
