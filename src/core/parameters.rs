//! Scene parameters under stable dotted names.
//!
//! `traverse()` walks the scene graph and collects every parameter an
//! object reports through `SceneObject::traverse`. The name of a
//! parameter is the prefix of its owner followed by the parameter's
//! own name (`light_shape.vertex_positions`). An object's prefix is its
//! `id` if it has one, else its parent's prefix joined with the slot it
//! occupies in the parent (`light_shape.bsdf`), else the slot name
//! alone. Colliding prefixes get `_1`, `_2`, ... suffixes in traversal
//! order; a derived prefix is never given a name some object carries
//! as its explicit id.
//!
//! The resulting **ParameterMap** holds snapshots only. Overwriting a
//! value marks it dirty; `update()` walks the scene again, writes the
//! dirty values back and calls `parameters_changed` on each affected
//! object, deepest first, then on its ancestors with the name of the
//! changed child slot.
//! If any of them rejects its new state, all written values are
//! restored.
//!
//! A map remembers the scene it was built from and the scene's
//! structural epoch; traversing again or editing the scene makes it
//! stale.

// std
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::error::SceneError;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::object::SceneObject;
use crate::core::properties::{PropertyType, PropertyValue};
use crate::core::scene::Scene;
use crate::core::transform::Transform;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParamFlags {
    Differentiable = 0,
    NonDifferentiable = 1,
    Discontinuous = 2,
}

pub fn is_differentiable(flags: u8) -> bool {
    (flags & ParamFlags::NonDifferentiable as u8) == 0
}

/// Mutable view of one parameter inside its owner.
pub enum ParameterRef<'a> {
    Bool(&'a mut bool),
    Long(&'a mut i64),
    Float(&'a mut Float),
    Color(&'a mut Spectrum),
    Point3f(&'a mut Point3f),
    Vector3f(&'a mut Vector3f),
    Transform(&'a mut Transform),
    Floats(&'a mut Vec<Float>),
    Points(&'a mut Vec<Point3f>),
}

impl<'a> ParameterRef<'a> {
    pub fn property_type(&self) -> PropertyType {
        match self {
            ParameterRef::Bool(_) => PropertyType::Bool,
            ParameterRef::Long(_) => PropertyType::Long,
            ParameterRef::Float(_) => PropertyType::Float,
            ParameterRef::Color(_) => PropertyType::Color,
            ParameterRef::Point3f(_) => PropertyType::Point3f,
            ParameterRef::Vector3f(_) => PropertyType::Vector3f,
            ParameterRef::Transform(_) => PropertyType::Transform,
            ParameterRef::Floats(_) => PropertyType::Floats,
            ParameterRef::Points(_) => PropertyType::Points,
        }
    }
    pub fn value(&self) -> PropertyValue {
        match self {
            ParameterRef::Bool(v) => PropertyValue::Bool(**v),
            ParameterRef::Long(v) => PropertyValue::Long(**v),
            ParameterRef::Float(v) => PropertyValue::Float(**v),
            ParameterRef::Color(v) => PropertyValue::Color(**v),
            ParameterRef::Point3f(v) => PropertyValue::Point3f(**v),
            ParameterRef::Vector3f(v) => PropertyValue::Vector3f(**v),
            ParameterRef::Transform(v) => PropertyValue::Transform(**v),
            ParameterRef::Floats(v) => PropertyValue::Floats(v.to_vec()),
            ParameterRef::Points(v) => PropertyValue::Points(v.to_vec()),
        }
    }
    /// Writes `value` into the owner. Array parameters keep their
    /// length.
    pub fn assign(self, name: &str, value: &PropertyValue) -> Result<(), SceneError> {
        let expected = self.property_type();
        let mismatch = || SceneError::TypeMismatch {
            name: name.to_string(),
            expected,
            found: value.property_type(),
        };
        let length = |current: usize, new: usize| {
            if current == new {
                Ok(())
            } else {
                Err(SceneError::InvalidArgument(format!(
                    "parameter \"{}\" holds {} element(s), got {}",
                    name, current, new
                )))
            }
        };
        match (self, value) {
            (ParameterRef::Bool(v), PropertyValue::Bool(n)) => *v = *n,
            (ParameterRef::Long(v), PropertyValue::Long(n)) => *v = *n,
            (ParameterRef::Float(v), PropertyValue::Float(n)) => *v = *n,
            (ParameterRef::Float(v), PropertyValue::Long(n)) => *v = *n as Float,
            (ParameterRef::Color(v), PropertyValue::Color(n)) => *v = *n,
            (ParameterRef::Point3f(v), PropertyValue::Point3f(n)) => *v = *n,
            (ParameterRef::Vector3f(v), PropertyValue::Vector3f(n)) => *v = *n,
            (ParameterRef::Transform(v), PropertyValue::Transform(n)) => *v = *n,
            (ParameterRef::Floats(v), PropertyValue::Floats(n)) => {
                length(v.len(), n.len())?;
                v.copy_from_slice(n);
            }
            (ParameterRef::Points(v), PropertyValue::Points(n)) => {
                length(v.len(), n.len())?;
                v.copy_from_slice(n);
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

/// Receives the parameters and children an object reports.
pub trait TraversalCallback {
    fn put_parameter(&mut self, name: &str, value: ParameterRef<'_>, flags: u8);
    fn put_object(&mut self, name: &str, object: &mut dyn SceneObject, flags: u8);
}

/// Prefix bookkeeping shared by the collecting and the writing walk,
/// so both produce the same names.
struct PathBuilder {
    stack: Vec<String>,
    used: HashSet<String>,
    /// Explicit ids of the scene; derived prefixes never take them.
    reserved: HashSet<String>,
}

impl PathBuilder {
    fn new(scene: &mut Scene) -> Self {
        let mut ids = IdCollector::default();
        scene.traverse(&mut ids);
        PathBuilder {
            stack: Vec::new(),
            used: HashSet::new(),
            reserved: ids.ids,
        }
    }
    fn current(&self) -> Option<&str> {
        self.stack.last().map(|s| s.as_str())
    }
    fn key(&self, name: &str) -> String {
        match self.current() {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.to_string(),
        }
    }
    fn enter(&mut self, slot: &str, id: &str) -> String {
        let explicit = !id.is_empty();
        let base: String = if explicit {
            id.to_string()
        } else {
            self.key(slot)
        };
        let mut prefix = base.clone();
        let mut suffix: usize = 1;
        while self.used.contains(&prefix)
            || (self.reserved.contains(&prefix) && !(explicit && prefix == base))
        {
            prefix = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.used.insert(prefix.clone());
        self.stack.push(prefix.clone());
        prefix
    }
    fn leave(&mut self) {
        self.stack.pop();
    }
}

#[derive(Default)]
struct IdCollector {
    ids: HashSet<String>,
}

impl TraversalCallback for IdCollector {
    fn put_parameter(&mut self, _name: &str, _value: ParameterRef<'_>, _flags: u8) {}
    fn put_object(&mut self, _name: &str, object: &mut dyn SceneObject, _flags: u8) {
        if !object.id().is_empty() {
            self.ids.insert(object.id().to_string());
        }
        object.traverse(self);
    }
}

#[derive(Debug, Clone)]
pub struct ParameterEntry {
    pub value: PropertyValue,
    pub flags: u8,
    /// Prefix of the owning object.
    pub owner: String,
    pub requires_gradient: bool,
    pub dirty: bool,
}

struct Collector {
    paths: PathBuilder,
    entries: Vec<(String, ParameterEntry)>,
}

impl TraversalCallback for Collector {
    fn put_parameter(&mut self, name: &str, value: ParameterRef<'_>, flags: u8) {
        let key = self.paths.key(name);
        let owner = self.paths.current().unwrap_or_default().to_string();
        self.entries.push((
            key,
            ParameterEntry {
                value: value.value(),
                flags,
                owner,
                requires_gradient: false,
                dirty: false,
            },
        ));
    }
    fn put_object(&mut self, name: &str, object: &mut dyn SceneObject, _flags: u8) {
        self.paths.enter(name, object.id());
        object.traverse(self);
        self.paths.leave();
    }
}

struct Writer<'m> {
    paths: PathBuilder,
    values: &'m HashMap<String, PropertyValue>,
    written: Vec<String>,
    /// Values the written parameters held before.
    previous: HashMap<String, PropertyValue>,
    /// Changed parameter or child slot names of the object being walked.
    changed: Vec<Vec<String>>,
    error: Option<SceneError>,
}

impl<'m> Writer<'m> {
    fn new(scene: &mut Scene, values: &'m HashMap<String, PropertyValue>) -> Self {
        Writer {
            paths: PathBuilder::new(scene),
            values,
            written: Vec::new(),
            previous: HashMap::new(),
            changed: vec![Vec::new()],
            error: None,
        }
    }
    /// Writes `values` into `scene` and runs `parameters_changed` on
    /// every affected object, the scene last.
    fn run(mut self, scene: &mut Scene) -> (Result<(), SceneError>, Self) {
        scene.traverse(&mut self);
        if let Some(e) = self.error.take() {
            return (Err(e), self);
        }
        let missing: Option<String> = self
            .values
            .keys()
            .find(|k| !self.written.iter().any(|w| w == *k))
            .cloned();
        if let Some(missing) = missing {
            return (Err(SceneError::UnknownParameter(missing)), self);
        }
        let top_level = self.changed.pop().unwrap_or_default();
        (scene.parameters_changed(&top_level), self)
    }
}

impl<'m> TraversalCallback for Writer<'m> {
    fn put_parameter(&mut self, name: &str, value: ParameterRef<'_>, _flags: u8) {
        if self.error.is_some() {
            return;
        }
        let key = self.paths.key(name);
        if let Some(new_value) = self.values.get(&key) {
            let old_value = value.value();
            match value.assign(&key, new_value) {
                Ok(()) => {
                    log::debug!("updated parameter {}", key);
                    self.previous.insert(key.clone(), old_value);
                    self.written.push(key);
                    if let Some(changed) = self.changed.last_mut() {
                        changed.push(name.to_string());
                    }
                }
                Err(e) => self.error = Some(e),
            }
        }
    }
    fn put_object(&mut self, name: &str, object: &mut dyn SceneObject, _flags: u8) {
        if self.error.is_some() {
            return;
        }
        self.paths.enter(name, object.id());
        self.changed.push(Vec::new());
        object.traverse(self);
        let keys = self.changed.pop().unwrap_or_default();
        self.paths.leave();
        if self.error.is_some() || keys.is_empty() {
            return;
        }
        if let Err(e) = object.parameters_changed(&keys) {
            self.error = Some(e);
            return;
        }
        if let Some(parent) = self.changed.last_mut() {
            parent.push(name.to_string());
        }
    }
}

/// Snapshot of all scene parameters.
#[derive(Debug)]
pub struct ParameterMap {
    scene_uid: u64,
    epoch: u64,
    pending: Arc<AtomicUsize>,
    entries: Vec<(String, ParameterEntry)>,
    index: HashMap<String, usize>,
}

impl ParameterMap {
    fn entry(&self, name: &str) -> Result<&ParameterEntry, SceneError> {
        self.index
            .get(name)
            .map(|i| &self.entries[*i].1)
            .ok_or_else(|| SceneError::UnknownParameter(name.to_string()))
    }
    fn entry_mut(&mut self, name: &str) -> Result<&mut ParameterEntry, SceneError> {
        match self.index.get(name) {
            Some(i) => Ok(&mut self.entries[*i].1),
            None => Err(SceneError::UnknownParameter(name.to_string())),
        }
    }
    pub fn get(&self, name: &str) -> Result<&PropertyValue, SceneError> {
        self.entry(name).map(|e| &e.value)
    }
    pub fn entry_of(&self, name: &str) -> Option<&ParameterEntry> {
        self.entry(name).ok()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
    /// Overwrites a parameter; takes effect with the next `update()`.
    pub fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        let pending = self.pending.clone();
        let entry = self.entry_mut(name)?;
        let expected = entry.value.property_type();
        let found = value.property_type();
        let compatible = expected == found
            || (expected == PropertyType::Float && found == PropertyType::Long);
        if !compatible {
            return Err(SceneError::TypeMismatch {
                name: name.to_string(),
                expected,
                found,
            });
        }
        entry.value = match value {
            PropertyValue::Long(l) if expected == PropertyType::Float => {
                PropertyValue::Float(l as Float)
            }
            other => other,
        };
        if !entry.dirty {
            entry.dirty = true;
            pending.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
    /// Names in traversal order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Drops every parameter not listed in `keys`.
    pub fn keep(&mut self, keys: &[&str]) {
        let mut dropped_dirty: usize = 0;
        self.entries.retain(|(k, e)| {
            let keep = keys.contains(&k.as_str());
            if !keep && e.dirty {
                dropped_dirty += 1;
            }
            keep
        });
        if dropped_dirty > 0 {
            self.pending.fetch_sub(dropped_dirty, Ordering::SeqCst);
        }
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
    }
    pub fn set_requires_gradient(&mut self, name: &str, requires: bool) -> Result<(), SceneError> {
        let entry = self.entry_mut(name)?;
        if requires && !is_differentiable(entry.flags) {
            return Err(SceneError::InvalidArgument(format!(
                "parameter \"{}\" is not differentiable",
                name
            )));
        }
        entry.requires_gradient = requires;
        Ok(())
    }
    pub fn requires_gradient(&self, name: &str) -> Result<bool, SceneError> {
        self.entry(name).map(|e| e.requires_gradient)
    }
    /// Names of the dirty parameters, in traversal order.
    pub fn dirty_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.dirty)
            .map(|(k, _)| k.as_str())
            .collect()
    }
    pub fn is_stale(&self, scene: &Scene) -> bool {
        scene.uid() != self.scene_uid || scene.epoch() != self.epoch
    }
    /// Writes the dirty values into `scene` and lets the affected
    /// objects recompute derived state. Returns the updated names.
    ///
    /// Either every value is applied or none: when an owner rejects a
    /// value, the parameters written so far get their previous values
    /// back and the map keeps its dirty entries.
    pub fn update(&mut self, scene: &mut Scene) -> Result<Vec<String>, SceneError> {
        if self.is_stale(scene) {
            return Err(SceneError::StaleParameterMap);
        }
        let values: HashMap<String, PropertyValue> = self
            .entries
            .iter()
            .filter(|(_, e)| e.dirty)
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect();
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let writer = Writer::new(scene, &values);
        let (result, writer) = writer.run(scene);
        if let Err(e) = result {
            restore(scene, &writer.previous);
            return Err(e);
        }
        for (_, entry) in self.entries.iter_mut() {
            entry.dirty = false;
        }
        self.pending.store(0, Ordering::SeqCst);
        log::debug!("updated {} parameter(s)", writer.written.len());
        Ok(writer.written)
    }
}

fn restore(scene: &mut Scene, previous: &HashMap<String, PropertyValue>) {
    if previous.is_empty() {
        return;
    }
    let (result, _) = Writer::new(scene, previous).run(scene);
    match result {
        Ok(()) => log::debug!("restored {} parameter(s)", previous.len()),
        Err(e) => log::error!("could not restore parameters after a failed update: {}", e),
    }
}

/// Collects the parameters of `scene`. Maps built earlier become
/// stale.
pub fn traverse(scene: &mut Scene) -> ParameterMap {
    let (scene_uid, epoch, pending) = scene.begin_traversal();
    let mut collector = Collector {
        paths: PathBuilder::new(scene),
        entries: Vec::new(),
    };
    scene.traverse(&mut collector);
    let index = collector
        .entries
        .iter()
        .enumerate()
        .map(|(i, (k, _))| (k.clone(), i))
        .collect();
    log::debug!("traversed {} parameter(s)", collector.entries.len());
    ParameterMap {
        scene_uid,
        epoch,
        pending,
        entries: collector.entries,
        index,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::api::register_builtin_plugins;
    use crate::core::object::Category;
    use crate::core::plugin::PluginManager;
    use crate::core::properties::Properties;
    use crate::core::registry::Registry;

    fn scene() -> Scene {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        let mut manager = PluginManager::new(registry);
        let mut light = Properties::new("rectangle");
        light.set_id("light_shape");
        light.set("emitter", Properties::new("area")).unwrap();
        let mut props = Properties::new("scene");
        props.set("shape_1", Properties::new("sphere")).unwrap();
        props.set("shape_2", Properties::new("sphere")).unwrap();
        props.set("shape_3", light).unwrap();
        manager
            .create_object(props, Category::Scene)
            .unwrap()
            .into_scene()
            .unwrap()
    }

    #[test]
    fn names_follow_ids_and_slots() {
        let mut scene = scene();
        let params = traverse(&mut scene);
        let keys = params.keys();
        assert_eq!(keys[0], "sphere.center");
        assert!(keys.contains(&"sphere.radius"));
        assert!(keys.contains(&"sphere_1.radius"));
        assert!(keys.contains(&"sphere.bsdf.reflectance.value"));
        assert!(keys.contains(&"light_shape.vertex_positions"));
        assert!(keys.contains(&"light_shape.emitter.radiance.value"));
        assert_eq!(
            params.entry_of("sphere.radius").unwrap().owner,
            "sphere".to_string()
        );
        let flags = params.entry_of("sphere.radius").unwrap().flags;
        assert_eq!(flags, ParamFlags::Discontinuous as u8);
        assert!(is_differentiable(flags));
    }

    #[test]
    fn traversal_is_deterministic() {
        let mut scene = scene();
        let first: Vec<String> = traverse(&mut scene)
            .keys()
            .iter()
            .map(|k| k.to_string())
            .collect();
        let second: Vec<String> = traverse(&mut scene)
            .keys()
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn set_checks_the_parameter() {
        let mut scene = scene();
        let mut params = traverse(&mut scene);
        match params.set("sphere.radius", PropertyValue::Bool(true)) {
            Err(SceneError::TypeMismatch { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        match params.set("sphere.nothing", PropertyValue::Float(1.0)) {
            Err(SceneError::UnknownParameter(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        // integers widen to floats
        params.set("sphere.radius", PropertyValue::Long(2)).unwrap();
        assert_eq!(
            params.get("sphere.radius").unwrap(),
            &PropertyValue::Float(2.0)
        );
        assert_eq!(params.dirty_keys(), vec!["sphere.radius"]);
        assert_eq!(scene.pending_updates(), 1);
    }

    #[test]
    fn update_writes_back_and_recomputes() {
        let mut scene = scene();
        let mut params = traverse(&mut scene);
        params.set("sphere.radius", PropertyValue::Float(2.0)).unwrap();
        let updated = params.update(&mut scene).unwrap();
        assert_eq!(updated, vec!["sphere.radius".to_string()]);
        assert_eq!(scene.pending_updates(), 0);
        assert!((scene.shapes()[0].bbox().p_max.x - 2.0).abs() < 1.0e-6);
        assert!((scene.bbox().p_max.x - 2.0).abs() < 1.0e-6);
        // invalid values are rejected by the owner
        params.set("sphere.radius", PropertyValue::Float(-1.0)).unwrap();
        assert!(params.update(&mut scene).is_err());
    }

    #[test]
    fn structural_edits_make_maps_stale() {
        let mut scene = scene();
        let mut params = traverse(&mut scene);
        assert!(!params.is_stale(&scene));
        scene.remove_shape(1).unwrap();
        assert!(params.is_stale(&scene));
        params.set("sphere.radius", PropertyValue::Float(2.0)).unwrap();
        match params.update(&mut scene) {
            Err(SceneError::StaleParameterMap) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(scene.pending_updates(), 0);
    }

    #[test]
    fn keep_filters_and_releases_pending_updates() {
        let mut scene = scene();
        let mut params = traverse(&mut scene);
        params.set("sphere_1.radius", PropertyValue::Float(2.0)).unwrap();
        params.keep(&["sphere.radius", "light_shape.vertex_positions"]);
        assert_eq!(params.len(), 2);
        assert!(params.contains("sphere.radius"));
        assert!(!params.contains("sphere_1.radius"));
        assert_eq!(scene.pending_updates(), 0);
        params.set_requires_gradient("light_shape.vertex_positions", true).unwrap();
        assert!(params.requires_gradient("light_shape.vertex_positions").unwrap());
        assert!(params.set_requires_gradient("sphere.radius", true).is_ok());
    }

    #[test]
    fn failed_update_restores_every_value() {
        let mut scene = scene();
        let mut params = traverse(&mut scene);
        params.set("sphere.radius", PropertyValue::Float(3.0)).unwrap();
        params.set("sphere_1.radius", PropertyValue::Float(-1.0)).unwrap();
        assert!(params.update(&mut scene).is_err());
        assert!((scene.shapes()[0].bbox().p_max.x - 1.0).abs() < 1.0e-6);
        assert!((scene.shapes()[1].bbox().p_max.x - 1.0).abs() < 1.0e-6);
        assert!((scene.bbox().p_max.x - 1.0).abs() < 1.0e-6);
        // the rejected values stay pending on the map
        assert_eq!(params.dirty_keys().len(), 2);
        assert_eq!(scene.pending_updates(), 2);
        let params = traverse(&mut scene);
        assert_eq!(
            params.get("sphere.radius").unwrap(),
            &PropertyValue::Float(1.0)
        );
        assert_eq!(
            params.get("sphere_1.radius").unwrap(),
            &PropertyValue::Float(1.0)
        );
    }

    #[test]
    fn explicit_ids_win_over_derived_names() {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        let mut manager = PluginManager::new(registry);
        let mut named = Properties::new("sphere");
        named.set_id("sphere_1");
        named.set("radius", 2.0 as Float).unwrap();
        let mut props = Properties::new("scene");
        props.set("shape_1", Properties::new("sphere")).unwrap();
        props.set("shape_2", Properties::new("sphere")).unwrap();
        props.set("shape_3", named).unwrap();
        let mut scene = manager
            .create_object(props, Category::Scene)
            .unwrap()
            .into_scene()
            .unwrap();
        let mut params = traverse(&mut scene);
        assert!(params.contains("sphere.radius"));
        assert!(params.contains("sphere_2.radius"));
        assert_eq!(
            params.get("sphere_1.radius").unwrap(),
            &PropertyValue::Float(2.0)
        );
        // writing back resolves the same names
        params.set("sphere_1.radius", PropertyValue::Float(4.0)).unwrap();
        params.update(&mut scene).unwrap();
        assert!((scene.shapes()[2].bbox().p_max.x - 4.0).abs() < 1.0e-6);
    }
}
