//! Textures provide the values of bsdf and emitter attributes.
//!
//! - CheckerboardTexture
//! - D65Texture
//! - SrgbTexture
//! - UniformTexture
//!
//! Plain values given for a texture attribute are wrapped by the
//! plugin manager: floats become **UniformTexture**, colors become
//! **SrgbTexture**, and inside emitters both become **D65Texture**.
//! All constant textures report their value under the parameter name
//! `value`, so the reflectance of a diffuse bsdf is reached as
//! `<bsdf>.reflectance.value`.
//!
//! ```rust
//! use rs_scene::core::api::register_builtin_plugins;
//! use rs_scene::core::base::{Float, Spectrum};
//! use rs_scene::core::geometry::Point2f;
//! use rs_scene::core::object::Category;
//! use rs_scene::core::plugin::PluginManager;
//! use rs_scene::core::properties::Properties;
//! use rs_scene::core::registry::Registry;
//!
//! let mut registry = Registry::new();
//! register_builtin_plugins(&mut registry).unwrap();
//! let mut manager = PluginManager::new(registry);
//! let mut props = Properties::new("diffuse");
//! props.set("reflectance", 0.25 as Float).unwrap();
//! let bsdf = manager.create_object(props, Category::Bsdf).unwrap();
//! assert_eq!(bsdf.plugin_name(), "diffuse");
//! let uniform = manager
//!     .create_object(Properties::new("uniform"), Category::Texture)
//!     .unwrap()
//!     .into_texture()
//!     .unwrap();
//! assert_eq!(uniform.evaluate(&Point2f::default()), Spectrum::new(1.0));
//! ```

pub mod checkerboard;
pub mod d65;
pub mod srgb;
pub mod uniform;
