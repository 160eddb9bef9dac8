//! Sensors generate the primary rays. A sensor owns the **Film** its
//! image ends up in and the **Sampler** driving its random streams.

// rs_scene
use crate::core::error::SceneError;
use crate::core::film::Film;
use crate::core::geometry::{Point2f, Ray};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::sampler::Sampler;
use crate::core::transform::Transform;

pub trait Sensor: SceneObject {
    fn sensor_base(&self) -> &SensorBase;
    fn sensor_base_mut(&mut self) -> &mut SensorBase;
    /// Ray through the film position `p_film`, given in raster
    /// coordinates of the full film.
    fn generate_ray(&self, p_film: &Point2f) -> Ray;
    fn film(&self) -> &dyn Film {
        self.sensor_base().film.as_ref()
    }
    fn film_mut(&mut self) -> &mut dyn Film {
        self.sensor_base_mut().film.as_mut()
    }
    fn sampler(&self) -> &dyn Sampler {
        self.sensor_base().sampler.as_ref()
    }
    fn to_world(&self) -> Transform {
        self.sensor_base().to_world
    }
}

/// State shared by the sensor plugins.
pub struct SensorBase {
    pub object: ObjectBase,
    pub to_world: Transform,
    pub film: Box<dyn Film>,
    pub sampler: Box<dyn Sampler>,
}

impl SensorBase {
    /// Reads `to_world` and takes the film and sampler out of the bag;
    /// missing ones default to `hdrfilm` and `independent`.
    pub fn new(props: &mut Properties, manager: &mut PluginManager) -> Result<Self, SceneError> {
        let object = ObjectBase::new(props);
        let name = object.plugin_name.clone();
        let to_world: Transform = props.get_or("to_world", Transform::default())?;
        let mut film: Option<Box<dyn Film>> = None;
        let mut sampler: Option<Box<dyn Sampler>> = None;
        for (key, child) in props.objects() {
            match child {
                PluginObject::Film(f) if film.is_none() => film = Some(f),
                PluginObject::Sampler(s) if sampler.is_none() => sampler = Some(s),
                PluginObject::Film(_) | PluginObject::Sampler(_) => {
                    return Err(SceneError::construction(
                        &name,
                        format!("only a single {} can be specified per sensor", key),
                    ))
                }
                other => {
                    return Err(SceneError::construction(
                        &name,
                        format!("unsupported child object \"{}\" ({})", key, other.category()),
                    ))
                }
            }
        }
        let film = match film {
            Some(film) => film,
            None => manager.create_default(Category::Film, "hdrfilm")?.into_film()?,
        };
        let sampler = match sampler {
            Some(sampler) => sampler,
            None => manager
                .create_default(Category::Sampler, "independent")?
                .into_sampler()?,
        };
        Ok(SensorBase {
            object,
            to_world,
            film,
            sampler,
        })
    }
    pub fn traverse_children(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_object(
            "film",
            self.film.as_object_mut(),
            ParamFlags::NonDifferentiable as u8,
        );
        callback.put_object(
            "sampler",
            self.sampler.as_object_mut(),
            ParamFlags::NonDifferentiable as u8,
        );
    }
}
