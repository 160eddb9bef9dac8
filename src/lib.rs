//! # rs_scene
//!
//! [Rust][rust] crate for declarative scene construction in a
//! plugin based renderer. Scenes are described by nested property
//! bags, built by per-variant plugin factories and exposed as a flat
//! map of named parameters which can be edited, written back and
//! differentiated.
//!
//! The entry points are:
//!
//! 1. [plugin manager][api] to select a variant and load declarations
//! 2. [parameter traversal][traverse] and `ParameterMap::update`
//! 3. [render loop][render] for a single pass
//! 4. [gradient loop][render_with_gradient] averaging image and
//!    derivative over several passes
//!
//! [rust]: https://www.rust-lang.org
//! [api]: core/api/index.html
//! [traverse]: core/parameters/fn.traverse.html
//! [render]: core/render/fn.render.html
//! [render_with_gradient]: core/render/fn.render_with_gradient.html

#[macro_use]
extern crate impl_ops;
#[macro_use]
extern crate lazy_static;

pub mod bsdfs;
pub mod core;
pub mod emitters;
pub mod films;
pub mod filters;
pub mod integrators;
pub mod samplers;
pub mod sensors;
pub mod shapes;
pub mod textures;
