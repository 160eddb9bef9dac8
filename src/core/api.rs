//! Process wide entry points.
//!
//! The global **PluginManager** is created on first use with every
//! built-in plugin registered for every variant. Code that needs
//! isolation (tests, embedding) builds its own manager instead:
//!
//! ```rust
//! use rs_scene::core::api;
//! use rs_scene::core::object::Category;
//! use rs_scene::core::properties::Properties;
//!
//! let mut props = Properties::new("box");
//! props.set_category(Category::ReconstructionFilter);
//! let filter = api::load(props).unwrap();
//! assert_eq!(filter.category(), Category::ReconstructionFilter);
//! ```

// std
use std::sync::{Mutex, MutexGuard};
// rs_scene
use crate::bsdfs::{diffuse, difftrans};
use crate::core::error::SceneError;
use crate::core::object::{Category, PluginObject};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::registry::Registry;
use crate::core::scene;
use crate::core::variant::Variant;
use crate::emitters::{area, point, spatialvaryingarea};
use crate::films::{hdrfilm, tiledhdrfilm};
use crate::filters::{boxfilter, gaussian};
use crate::integrators::{depth, direct};
use crate::samplers::independent;
use crate::sensors::perspective;
use crate::shapes::{mesh, plymesh, sphere};
use crate::textures::{checkerboard, d65, srgb, uniform};

lazy_static! {
    static ref MANAGER: Mutex<PluginManager> = Mutex::new(builtin_manager());
}

fn builtin_manager() -> PluginManager {
    let mut registry = Registry::new();
    if let Err(e) = register_builtin_plugins(&mut registry) {
        log::error!("registering built-in plugins failed: {}", e);
    }
    PluginManager::new(registry)
}

/// Registers the plugins shipped with the crate for all variants.
pub fn register_builtin_plugins(registry: &mut Registry) -> Result<(), SceneError> {
    registry.register_all_variants(Category::Scene, "scene", scene::create)?;
    registry.register_all_variants(Category::Sensor, "perspective", perspective::create)?;
    registry.register_all_variants(Category::Film, "hdrfilm", hdrfilm::create)?;
    registry.register_all_variants(Category::Film, "tiledhdrfilm", tiledhdrfilm::create)?;
    registry.register_all_variants(Category::ReconstructionFilter, "box", boxfilter::create)?;
    registry.register_all_variants(
        Category::ReconstructionFilter,
        "gaussian",
        gaussian::create,
    )?;
    registry.register_all_variants(Category::Sampler, "independent", independent::create)?;
    registry.register_all_variants(Category::Shape, "sphere", sphere::create)?;
    registry.register_all_variants(Category::Shape, "rectangle", mesh::create_rectangle)?;
    registry.register_all_variants(Category::Shape, "mesh", mesh::create)?;
    registry.register_all_variants(Category::Shape, "ply", plymesh::create)?;
    registry.register_all_variants(Category::Emitter, "point", point::create)?;
    registry.register_all_variants(Category::Emitter, "area", area::create)?;
    registry.register_all_variants(
        Category::Emitter,
        "spatialvaryingarea",
        spatialvaryingarea::create,
    )?;
    registry.register_all_variants(Category::Bsdf, "diffuse", diffuse::create)?;
    registry.register_all_variants(Category::Bsdf, "difftrans", difftrans::create)?;
    registry.register_all_variants(Category::Texture, "uniform", uniform::create)?;
    registry.register_all_variants(Category::Texture, "srgb", srgb::create)?;
    registry.register_all_variants(Category::Texture, "d65", d65::create)?;
    registry.register_all_variants(Category::Texture, "checkerboard", checkerboard::create)?;
    registry.register_all_variants(Category::Integrator, "direct", direct::create)?;
    registry.register_all_variants(Category::Integrator, "depth", depth::create)?;
    Ok(())
}

/// The global manager. A panic while it was held does not make it
/// unusable.
pub fn instance() -> MutexGuard<'static, PluginManager> {
    match MANAGER.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Selects the variant by name (`scalar_rgb`, `gpu_autodiff_rgb`, ...).
pub fn set_variant(name: &str) -> Result<(), SceneError> {
    let variant = Variant::parse(name)?;
    instance().set_variant(variant)
}

pub fn variant() -> Variant {
    instance().variant()
}

pub fn loaded_plugins() -> Vec<(Category, String)> {
    instance().loaded_plugins().to_vec()
}

/// Builds a top-level declaration with the global manager. The
/// category is the bag's hint or inferred from its type name.
pub fn load(props: Properties) -> Result<PluginObject, SceneError> {
    let mut manager = instance();
    let category = manager.infer_category(&props)?;
    manager.create_object(props, category)
}
