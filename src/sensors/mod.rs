//! Sensors turn film positions into primary rays.
//!
//! - PerspectiveSensor
//!
//! ## Perspective Sensor
//!
//! An idealized pinhole camera. The field of view is given in degrees
//! by `fov` and measured along `fov_axis`, one of `x`, `y`,
//! `diagonal`, `smaller` or `larger`. Internally the sensor keeps the
//! horizontal field of view, which is exposed for traversal as
//! `x_fov`. Rays start on the `near_clip` plane and end on the
//! `far_clip` plane. The sensor looks down its local `+z` axis,
//! `to_world` places it in the scene.
//!
//! ```rust
//! use rs_scene::core::api::register_builtin_plugins;
//! use rs_scene::core::base::Float;
//! use rs_scene::core::geometry::Point2f;
//! use rs_scene::core::object::Category;
//! use rs_scene::core::plugin::PluginManager;
//! use rs_scene::core::properties::Properties;
//! use rs_scene::core::registry::Registry;
//!
//! let mut registry = Registry::new();
//! register_builtin_plugins(&mut registry).unwrap();
//! let mut manager = PluginManager::new(registry);
//! let mut film = Properties::new("hdrfilm");
//! film.set("width", 64_i64).unwrap();
//! film.set("height", 64_i64).unwrap();
//! let mut props = Properties::new("perspective");
//! props.set("fov", 90.0 as Float).unwrap();
//! props.set("film", film).unwrap();
//! let sensor = manager
//!     .create_object(props, Category::Sensor)
//!     .unwrap()
//!     .into_sensor()
//!     .unwrap();
//! let ray = sensor.generate_ray(&Point2f { x: 32.0, y: 32.0 });
//! assert!((ray.d.z - 1.0).abs() < 1.0e-5);
//! ```

pub mod perspective;
