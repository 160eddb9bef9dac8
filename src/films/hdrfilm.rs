// rs_scene
use crate::core::error::SceneError;
use crate::core::film::{Film, FilmBase};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;

pub struct HdrFilm {
    pub base: FilmBase,
}

impl SceneObject for HdrFilm {
    fn base(&self) -> &ObjectBase {
        &self.base.object
    }
    fn category(&self) -> Category {
        Category::Film
    }
}

impl Film for HdrFilm {
    fn film_base(&self) -> &FilmBase {
        &self.base
    }
    fn film_base_mut(&mut self) -> &mut FilmBase {
        &mut self.base
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let base = FilmBase::new(props, manager, "float16")?;
    Ok(PluginObject::Film(Box::new(HdrFilm { base })))
}

#[cfg(test)]
mod test {
    use crate::core::api::register_builtin_plugins;
    use crate::core::bitmap::Bitmap;
    use crate::core::film::{ComponentFormat, PixelFormat};
    use crate::core::object::Category;
    use crate::core::plugin::PluginManager;
    use crate::core::properties::Properties;
    use crate::core::registry::Registry;
    use crate::core::variant::Variant;

    fn manager() -> PluginManager {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        PluginManager::new(registry)
    }

    #[test]
    fn defaults_and_crop_window() {
        let mut manager = manager();
        let mut props = Properties::new("hdrfilm");
        props.set("width", 16_i64).unwrap();
        props.set("height", 8_i64).unwrap();
        props.set("crop_offset_x", 4_i64).unwrap();
        props.set("crop_width", 4_i64).unwrap();
        let mut film = manager
            .create_object(props, Category::Film)
            .unwrap()
            .into_film()
            .unwrap();
        assert_eq!(film.size().x, 16);
        assert_eq!(film.crop_size().x, 4);
        assert_eq!(film.crop_size().y, 8);
        assert_eq!(film.pixel_format(), PixelFormat::Rgba);
        assert_eq!(film.film_base().component_format, ComponentFormat::Float16);
        assert_eq!(film.filter().plugin_name(), "gaussian");
        assert!(film.put(Bitmap::new(16, 8, 3)).is_err());
        film.put(Bitmap::new(4, 8, 3)).unwrap();
        assert_eq!(film.develop().unwrap().channels(), 4);
    }

    #[test]
    fn crop_window_must_fit() {
        let mut manager = manager();
        let mut props = Properties::new("hdrfilm");
        props.set("width", 16_i64).unwrap();
        props.set("crop_offset_x", 10_i64).unwrap();
        props.set("crop_width", 10_i64).unwrap();
        assert!(manager.create_object(props, Category::Film).is_err());
    }

    #[test]
    fn monochrome_forces_luminance() {
        let mut manager = manager();
        manager.set_variant(Variant::ScalarMono).unwrap();
        let mut props = Properties::new("hdrfilm");
        props.set("pixel_format", "rgb").unwrap();
        let film = manager
            .create_object(props, Category::Film)
            .unwrap()
            .into_film()
            .unwrap();
        assert_eq!(film.pixel_format(), PixelFormat::Luminance);
    }
}
