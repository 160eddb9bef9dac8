//! Emitters are the sources of illumination.
//!
//! - PointLight
//! - AreaLight
//! - SpatialVaryingAreaLight
//!
//! ## Point Lights
//!
//! An isotropic point source at `position` (or at the origin of
//! `to_world`) with radiant `intensity`.
//!
//! ## Area Lights
//!
//! Declared inside a shape, whose surface then emits `radiance`
//! towards the side its normal points to:
//!
//! ```rust
//! use rs_scene::core::api::register_builtin_plugins;
//! use rs_scene::core::base::Float;
//! use rs_scene::core::object::Category;
//! use rs_scene::core::plugin::PluginManager;
//! use rs_scene::core::properties::Properties;
//! use rs_scene::core::registry::Registry;
//!
//! let mut registry = Registry::new();
//! register_builtin_plugins(&mut registry).unwrap();
//! let mut manager = PluginManager::new(registry);
//! let mut emitter = Properties::new("area");
//! emitter.set("radiance", 4.0_f32 as Float).unwrap();
//! let mut shape = Properties::new("rectangle");
//! shape.set("emitter", emitter).unwrap();
//! let shape = manager
//!     .create_object(shape, Category::Shape)
//!     .unwrap()
//!     .into_shape()
//!     .unwrap();
//! assert!(shape.emitter().is_some());
//! ```
//!
//! ## Spatially Varying Area Lights
//!
//! An area light whose emission falls off with the angle to the
//! surface normal, from full `radiance` inside `beam_width` to zero at
//! `cutoff_angle`. Sampled emission is additionally blurred towards the
//! border of the uv domain over `blur_size`.

pub mod area;
pub mod point;
pub mod spatialvaryingarea;
