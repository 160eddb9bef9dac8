//! Reconstruction filters weight the samples around a pixel center.
//!
//! - BoxFilter
//! - GaussianFilter
//!
//! ## Box Filter
//!
//! The box filter equally weights all samples within a square region
//! of the image. Although computationally efficient, it's just about
//! the worst filter possible.
//!
//! ```rust
//! use rs_scene::core::api::register_builtin_plugins;
//! use rs_scene::core::geometry::Point2f;
//! use rs_scene::core::object::Category;
//! use rs_scene::core::plugin::PluginManager;
//! use rs_scene::core::properties::Properties;
//! use rs_scene::core::registry::Registry;
//!
//! let mut registry = Registry::new();
//! register_builtin_plugins(&mut registry).unwrap();
//! let mut manager = PluginManager::new(registry);
//! let mut props = Properties::new("box");
//! props.set("radius", 1.0_f32).unwrap();
//! let filter = manager
//!     .create_object(props, Category::ReconstructionFilter)
//!     .unwrap()
//!     .into_filter()
//!     .unwrap();
//! assert_eq!(filter.get_radius().x, 1.0);
//! assert_eq!(filter.evaluate(Point2f { x: 0.9, y: -0.9 }), 1.0);
//! ```
//!
//! ## Gaussian Filter
//!
//! The Gaussian filter applies a Gaussian bump centered at the pixel
//! and radially symmetric around it. Its value at the end of the
//! support (four standard deviations) is subtracted, so the filter
//! goes to zero at its radius. It is the default filter of all films.

pub mod boxfilter;
pub mod gaussian;
