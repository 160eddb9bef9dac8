// std
use std::path::Path;
// rs_scene
use crate::core::bitmap::Bitmap;
use crate::core::error::SceneError;
use crate::core::film::{develop_rgb, Film, FilmBase};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;

pub struct TiledHdrFilm {
    pub base: FilmBase,
    pub block_size: u32,
}

impl TiledHdrFilm {
    /// `(x, y, width, height)` of every block covering the crop
    /// window, row by row. Blocks on the right and bottom border are
    /// clipped.
    pub fn blocks(&self) -> Vec<(usize, usize, usize, usize)> {
        let size = self.block_size as usize;
        let crop = self.crop_size();
        let (width, height) = (crop.x as usize, crop.y as usize);
        let mut blocks = Vec::new();
        for y in (0..height).step_by(size) {
            for x in (0..width).step_by(size) {
                blocks.push((x, y, size.min(width - x), size.min(height - y)));
            }
        }
        blocks
    }
}

impl SceneObject for TiledHdrFilm {
    fn base(&self) -> &ObjectBase {
        &self.base.object
    }
    fn category(&self) -> Category {
        Category::Film
    }
}

impl Film for TiledHdrFilm {
    fn film_base(&self) -> &FilmBase {
        &self.base
    }
    fn film_base_mut(&mut self) -> &mut FilmBase {
        &mut self.base
    }
    fn develop(&self) -> Result<Bitmap, SceneError> {
        let image = match self.base.image.as_ref() {
            Some(image) => image,
            None => {
                return Err(SceneError::InvalidArgument(format!(
                    "film \"{}\" holds no image yet",
                    self.plugin_name()
                )))
            }
        };
        let format = self.pixel_format();
        let mut developed = Bitmap::new(image.width(), image.height(), format.channel_count());
        let blocks = self.blocks();
        for (x, y, width, height) in blocks.iter() {
            let block = develop_rgb(&image.block(*x, *y, *width, *height), format)?;
            developed.paste(&block, *x, *y)?;
        }
        log::debug!(
            "developed {} block(s) of {} pixels",
            blocks.len(),
            self.block_size
        );
        Ok(developed)
    }
    fn set_destination_file(&mut self, path: &Path) {
        self.base.dest_file = Some(path.with_extension("exr"));
    }
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let mut base = FilmBase::new(props, manager, "float16")?;
    let block_size: i64 = props.get_or("block_size", 32)?;
    if block_size <= 0 || block_size > u32::MAX as i64 {
        return Err(SceneError::construction(
            "tiledhdrfilm",
            format!("block_size out of range, found {}", block_size),
        ));
    }
    if let Some(path) = base.dest_file.take() {
        base.dest_file = Some(path.with_extension("exr"));
    }
    Ok(PluginObject::Film(Box::new(TiledHdrFilm {
        base,
        block_size: block_size as u32,
    })))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::api::register_builtin_plugins;
    use crate::core::base::Float;
    use crate::core::registry::Registry;

    fn manager() -> PluginManager {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        PluginManager::new(registry)
    }

    #[test]
    fn always_writes_openexr() {
        let mut manager = manager();
        let mut props = Properties::new("tiledhdrfilm");
        props.set("filename", "render.png").unwrap();
        let mut film = manager
            .create_object(props, Category::Film)
            .unwrap()
            .into_film()
            .unwrap();
        assert_eq!(film.destination_file(), Some(Path::new("render.exr")));
        film.set_destination_file(Path::new("other.jpg"));
        assert_eq!(film.destination_file(), Some(Path::new("other.exr")));
    }

    #[test]
    fn develops_block_by_block() {
        let mut props = Properties::new("tiledhdrfilm");
        props.set("width", 5_i64).unwrap();
        props.set("height", 3_i64).unwrap();
        props.set("block_size", 2_i64).unwrap();
        props.set("pixel_format", "rgba").unwrap();
        let mut manager = manager();
        let base = FilmBase::new(&mut props, &mut manager, "float16").unwrap();
        let mut film = TiledHdrFilm {
            base,
            block_size: 2,
        };
        let blocks = film.blocks();
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[2], (4, 0, 1, 2));
        assert_eq!(blocks[5], (4, 2, 1, 1));
        let data: Vec<Float> = (0..15 * 3).map(|i| i as Float).collect();
        let image = Bitmap::from_data(5, 3, 3, data).unwrap();
        film.put(image.clone()).unwrap();
        let developed = film.develop().unwrap();
        assert_eq!(developed.channels(), 4);
        assert_eq!(developed, develop_rgb(&image, film.pixel_format()).unwrap());
    }

    #[test]
    fn block_size_must_be_in_range() {
        let mut manager = manager();
        for size in [0_i64, 1_i64 << 40].iter() {
            let mut props = Properties::new("tiledhdrfilm");
            props.set("block_size", *size).unwrap();
            match manager.create_object(props, Category::Film) {
                Err(SceneError::ConstructionFailed { .. }) => {}
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
