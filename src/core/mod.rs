//! The core of the crate: the declarative construction machinery,
//! the scene graph with its parameter protocol, and the render loop.
//!
//! Construction goes from a **Properties** bag through the
//! **PluginManager**, which looks up the factory in the **Registry**
//! for the active **Variant**. The result is a **PluginObject**; a
//! `scene` declaration yields the root **Scene**.
//!
//! - api
//! - autodiff
//! - base
//! - bitmap
//! - bsdf
//! - emitter
//! - error
//! - film
//! - filter
//! - geometry
//! - integrator
//! - object
//! - parameters
//! - plugin
//! - properties
//! - registry
//! - render
//! - rng
//! - sampler
//! - scene
//! - sensor
//! - shape
//! - spectrum
//! - texture
//! - transform
//! - variant

pub mod api;
pub mod autodiff;
pub mod base;
pub mod bitmap;
pub mod bsdf;
pub mod emitter;
pub mod error;
pub mod film;
pub mod filter;
pub mod geometry;
pub mod integrator;
pub mod object;
pub mod parameters;
pub mod plugin;
pub mod properties;
pub mod registry;
pub mod render;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod sensor;
pub mod shape;
pub mod spectrum;
pub mod texture;
pub mod transform;
pub mod variant;
