//! The **Scene** is the root of the object graph. It owns the sensors,
//! the shapes (together with their bsdfs and area emitters), the
//! stand-alone emitters, stand-alone films and the integrator.
//!
//! Every scene gets a process unique id. Structural edits and new
//! traversals advance the scene's epoch, which is how parameter maps
//! detect that they are stale. The counter of pending parameter
//! updates is shared with the map of the latest traversal; rendering
//! refuses to run while it is non-zero.

// std
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
// rs_scene
use crate::core::emitter::Emitter;
use crate::core::error::SceneError;
use crate::core::film::Film;
use crate::core::geometry::{bnd3_union_bnd3f, Bounds3f, Ray};
use crate::core::integrator::Integrator;
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::sensor::Sensor;
use crate::core::shape::{Shape, SurfaceInteraction};
use crate::core::variant::Variant;

static NEXT_SCENE_UID: AtomicU64 = AtomicU64::new(1);

pub struct Scene {
    base: ObjectBase,
    uid: u64,
    epoch: u64,
    pending: Arc<AtomicUsize>,
    variant: Variant,
    sensors: Vec<Box<dyn Sensor>>,
    shapes: Vec<Box<dyn Shape>>,
    emitters: Vec<Box<dyn Emitter>>,
    films: Vec<Box<dyn Film>>,
    integrator: Option<Box<dyn Integrator>>,
    bbox: Bounds3f,
}

impl Scene {
    /// An empty scene for `variant`.
    pub fn new(variant: Variant) -> Self {
        let mut base = ObjectBase::default();
        base.plugin_name = String::from("scene");
        Scene {
            base,
            uid: NEXT_SCENE_UID.fetch_add(1, Ordering::SeqCst),
            epoch: 0,
            pending: Arc::new(AtomicUsize::new(0)),
            variant,
            sensors: Vec::new(),
            shapes: Vec::new(),
            emitters: Vec::new(),
            films: Vec::new(),
            integrator: None,
            bbox: Bounds3f::default(),
        }
    }
    pub fn variant(&self) -> Variant {
        self.variant
    }
    pub fn sensors(&self) -> &[Box<dyn Sensor>] {
        &self.sensors
    }
    pub fn sensor(&self, index: usize) -> Result<&dyn Sensor, SceneError> {
        self.sensors
            .get(index)
            .map(|s| s.as_ref())
            .ok_or_else(|| self.no_sensor(index))
    }
    pub fn sensor_mut(&mut self, index: usize) -> Result<&mut dyn Sensor, SceneError> {
        let count = self.sensors.len();
        match self.sensors.get_mut(index) {
            Some(sensor) => Ok(sensor.as_mut()),
            None => Err(SceneError::InvalidArgument(format!(
                "sensor index {} out of range, scene has {}",
                index, count
            ))),
        }
    }
    fn no_sensor(&self, index: usize) -> SceneError {
        SceneError::InvalidArgument(format!(
            "sensor index {} out of range, scene has {}",
            index,
            self.sensors.len()
        ))
    }
    pub fn shapes(&self) -> &[Box<dyn Shape>] {
        &self.shapes
    }
    /// Stand-alone emitters.
    pub fn emitters(&self) -> &[Box<dyn Emitter>] {
        &self.emitters
    }
    /// Emitters attached to shapes, with their shape.
    pub fn area_emitters(&self) -> Vec<(&dyn Shape, &dyn Emitter)> {
        self.shapes
            .iter()
            .filter_map(|shape| shape.emitter().map(|emitter| (shape.as_ref(), emitter)))
            .collect()
    }
    pub fn films(&self) -> &[Box<dyn Film>] {
        &self.films
    }
    pub fn integrator(&self) -> Option<&dyn Integrator> {
        self.integrator.as_deref()
    }
    pub fn bbox(&self) -> Bounds3f {
        self.bbox
    }
    pub fn add_sensor(&mut self, sensor: Box<dyn Sensor>) {
        self.sensors.push(sensor);
        self.structure_changed();
    }
    pub fn add_shape(&mut self, shape: Box<dyn Shape>) {
        self.bbox = bnd3_union_bnd3f(&self.bbox, &shape.bbox());
        self.shapes.push(shape);
        self.structure_changed();
    }
    pub fn add_emitter(&mut self, emitter: Box<dyn Emitter>) {
        self.emitters.push(emitter);
        self.structure_changed();
    }
    pub fn add_film(&mut self, film: Box<dyn Film>) {
        self.films.push(film);
        self.structure_changed();
    }
    /// Replaces the integrator and returns the previous one.
    pub fn set_integrator(
        &mut self,
        integrator: Box<dyn Integrator>,
    ) -> Option<Box<dyn Integrator>> {
        let previous = self.integrator.replace(integrator);
        self.structure_changed();
        previous
    }
    pub fn remove_shape(&mut self, index: usize) -> Result<Box<dyn Shape>, SceneError> {
        if index >= self.shapes.len() {
            return Err(SceneError::InvalidArgument(format!(
                "shape index {} out of range, scene has {}",
                index,
                self.shapes.len()
            )));
        }
        let shape = self.shapes.remove(index);
        self.update_bbox();
        self.structure_changed();
        Ok(shape)
    }
    fn structure_changed(&mut self) {
        self.epoch += 1;
        self.pending = Arc::new(AtomicUsize::new(0));
    }
    fn update_bbox(&mut self) {
        self.bbox = self
            .shapes
            .iter()
            .fold(Bounds3f::default(), |b, s| bnd3_union_bnd3f(&b, &s.bbox()));
    }
    /// A scene can be rendered once it has a sensor and an integrator.
    pub fn check_complete(&self) -> Result<(), SceneError> {
        if self.sensors.is_empty() {
            return Err(SceneError::IncompleteScene(
                "scene has no sensor".to_string(),
            ));
        }
        if self.integrator.is_none() {
            return Err(SceneError::IncompleteScene(
                "scene has no integrator".to_string(),
            ));
        }
        Ok(())
    }
    /// Closest intersection with any shape, with the shape's index.
    pub fn ray_intersect(&self, ray: &Ray) -> Option<(usize, SurfaceInteraction)> {
        let mut r: Ray = *ray;
        let mut hit: Option<(usize, SurfaceInteraction)> = None;
        for (i, shape) in self.shapes.iter().enumerate() {
            if let Some(si) = shape.intersect(&r) {
                r.t_max = si.t;
                hit = Some((i, si));
            }
        }
        hit
    }
    pub fn ray_test(&self, ray: &Ray) -> bool {
        self.shapes.iter().any(|shape| shape.intersect_p(ray))
    }
    pub fn uid(&self) -> u64 {
        self.uid
    }
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
    /// Starts a new traversal; maps of earlier traversals go stale.
    pub fn begin_traversal(&mut self) -> (u64, u64, Arc<AtomicUsize>) {
        self.structure_changed();
        (self.uid, self.epoch, self.pending.clone())
    }
    /// Parameters set on the latest map but not yet written back.
    pub fn pending_updates(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl SceneObject for Scene {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Scene
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        let flags = ParamFlags::Differentiable as u8;
        for sensor in self.sensors.iter_mut() {
            let slot = sensor.plugin_name().to_string();
            callback.put_object(&slot, sensor.as_object_mut(), flags);
        }
        for shape in self.shapes.iter_mut() {
            let slot = shape.plugin_name().to_string();
            callback.put_object(&slot, shape.as_object_mut(), flags);
        }
        for emitter in self.emitters.iter_mut() {
            let slot = emitter.plugin_name().to_string();
            callback.put_object(&slot, emitter.as_object_mut(), flags);
        }
        for film in self.films.iter_mut() {
            let slot = film.plugin_name().to_string();
            callback.put_object(&slot, film.as_object_mut(), flags);
        }
        if let Some(integrator) = self.integrator.as_mut() {
            let slot = integrator.plugin_name().to_string();
            callback.put_object(&slot, integrator.as_object_mut(), flags);
        }
    }
    fn parameters_changed(&mut self, keys: &[String]) -> Result<(), SceneError> {
        if !keys.is_empty() {
            self.update_bbox();
        }
        Ok(())
    }
}

/// Aggregates every sensor, shape, emitter, film and integrator of the
/// bag, in declaration order.
pub fn create(props: &mut Properties, manager: &mut PluginManager) -> Result<PluginObject, SceneError> {
    let mut scene = Scene::new(manager.variant());
    scene.base = ObjectBase::new(props);
    for (key, child) in props.objects() {
        match child {
            PluginObject::Sensor(sensor) => scene.sensors.push(sensor),
            PluginObject::Shape(shape) => scene.shapes.push(shape),
            PluginObject::Emitter(emitter) => scene.emitters.push(emitter),
            PluginObject::Film(film) => scene.films.push(film),
            PluginObject::Integrator(integrator) => {
                if scene.integrator.is_some() {
                    return Err(SceneError::construction(
                        "scene",
                        "only one integrator can be specified per scene",
                    ));
                }
                scene.integrator = Some(integrator);
            }
            other => {
                return Err(SceneError::construction(
                    "scene",
                    format!("unsupported child object \"{}\" ({})", key, other.category()),
                ))
            }
        }
    }
    scene.update_bbox();
    log::debug!(
        "scene with {} sensor(s), {} shape(s), {} emitter(s)",
        scene.sensors.len(),
        scene.shapes.len(),
        scene.emitters.len()
    );
    Ok(PluginObject::Scene(Box::new(scene)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::api::register_builtin_plugins;
    use crate::core::base::Float;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::core::registry::Registry;

    fn manager() -> PluginManager {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        PluginManager::new(registry)
    }

    #[test]
    fn children_keep_declaration_order() {
        let mut manager = manager();
        let mut props = Properties::new("scene");
        let mut sphere = Properties::new("sphere");
        sphere.set("center", Point3f::new(0.0, 0.0, 5.0)).unwrap();
        props.set("shape_1", sphere).unwrap();
        props.set("shape_2", Properties::new("rectangle")).unwrap();
        props.set("emitter", Properties::new("point")).unwrap();
        props.set("sensor", Properties::new("perspective")).unwrap();
        props.set("integrator", Properties::new("depth")).unwrap();
        let scene = manager
            .create_object(props, Category::Scene)
            .unwrap()
            .into_scene()
            .unwrap();
        assert_eq!(scene.shapes().len(), 2);
        assert_eq!(scene.shapes()[0].plugin_name(), "sphere");
        assert_eq!(scene.shapes()[1].plugin_name(), "rectangle");
        assert_eq!(scene.emitters().len(), 1);
        assert!(scene.area_emitters().is_empty());
        assert!(scene.check_complete().is_ok());
        assert!((scene.bbox().p_max.z - 6.0).abs() < 1.0e-5);
        let ray = Ray::new(Point3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        let (index, si) = scene.ray_intersect(&ray).unwrap();
        assert_eq!(index, 0);
        assert!((si.t - 4.0 as Float).abs() < 1.0e-4);
        assert!(scene.ray_test(&ray));
    }

    #[test]
    fn one_integrator_per_scene() {
        let mut manager = manager();
        let mut props = Properties::new("scene");
        props.set("integrator_1", Properties::new("depth")).unwrap();
        props.set("integrator_2", Properties::new("direct")).unwrap();
        match manager.create_object(props, Category::Scene) {
            Err(SceneError::ConstructionFailed { .. }) => {}
            Err(e) => panic!("unexpected {}", e),
            Ok(_) => panic!("second integrator accepted"),
        }
    }

    #[test]
    fn every_scene_has_its_own_uid() {
        let mut a = Scene::new(Variant::ScalarRgb);
        let b = Scene::new(Variant::ScalarRgb);
        assert_ne!(a.uid(), b.uid());
        let epoch = a.epoch();
        a.begin_traversal();
        assert_eq!(a.epoch(), epoch + 1);
        assert!(a.remove_shape(0).is_err());
        match a.check_complete() {
            Err(SceneError::IncompleteScene(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
