//! The film stores the image a sensor captured and develops it into
//! the requested pixel format.
//!
//! Integrators deliver linear RGB bitmaps covering the crop window.
//! Developing converts them to one of the pixel formats below; in
//! monochrome variants films always develop to `luminance`.

// std
use std::path::{Path, PathBuf};
// others
use strum_macros::{Display, EnumString};
// rs_scene
use crate::core::base::Float;
use crate::core::bitmap::Bitmap;
use crate::core::error::SceneError;
use crate::core::filter::ReconstructionFilter;
use crate::core::geometry::Point2i;
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::spectrum::rgb_to_xyz;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PixelFormat {
    Luminance,
    LuminanceAlpha,
    Rgb,
    Rgba,
    Xyz,
    Xyza,
}

impl PixelFormat {
    pub fn channel_count(&self) -> usize {
        match self {
            PixelFormat::Luminance => 1,
            PixelFormat::LuminanceAlpha => 2,
            PixelFormat::Rgb | PixelFormat::Xyz => 3,
            PixelFormat::Rgba | PixelFormat::Xyza => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ComponentFormat {
    Float16,
    Float32,
    #[strum(serialize = "uint32")]
    UInt32,
}

pub trait Film: SceneObject {
    fn film_base(&self) -> &FilmBase;
    fn film_base_mut(&mut self) -> &mut FilmBase;
    /// Full resolution.
    fn size(&self) -> Point2i {
        self.film_base().size
    }
    fn crop_size(&self) -> Point2i {
        self.film_base().crop_size
    }
    fn crop_offset(&self) -> Point2i {
        self.film_base().crop_offset
    }
    fn filter(&self) -> &dyn ReconstructionFilter {
        self.film_base().filter.as_ref()
    }
    fn pixel_format(&self) -> PixelFormat {
        self.film_base().pixel_format
    }
    /// Stores the linear RGB result of a render.
    fn put(&mut self, image: Bitmap) -> Result<(), SceneError> {
        let crop = self.crop_size();
        if image.width() != crop.x as usize || image.height() != crop.y as usize {
            return Err(SceneError::InvalidArgument(format!(
                "image of {}x{} does not match the crop window {}x{}",
                image.width(),
                image.height(),
                crop.x,
                crop.y
            )));
        }
        self.film_base_mut().image = Some(image);
        Ok(())
    }
    fn bitmap(&self) -> Option<&Bitmap> {
        self.film_base().image.as_ref()
    }
    /// Converts the stored image to the output pixel format.
    fn develop(&self) -> Result<Bitmap, SceneError> {
        let base = self.film_base();
        match base.image.as_ref() {
            Some(image) => develop_rgb(image, base.pixel_format),
            None => Err(SceneError::InvalidArgument(format!(
                "film \"{}\" holds no image yet",
                self.plugin_name()
            ))),
        }
    }
    fn set_destination_file(&mut self, path: &Path) {
        self.film_base_mut().dest_file = Some(path.to_path_buf());
    }
    fn destination_file(&self) -> Option<&Path> {
        self.film_base().dest_file.as_deref()
    }
    /// Develops and writes the image to the destination file.
    fn write(&self) -> Result<(), SceneError> {
        match self.destination_file() {
            Some(path) => self.develop()?.write(path),
            None => Err(SceneError::InvalidArgument(
                "film has no destination file".to_string(),
            )),
        }
    }
}

/// State shared by the film plugins.
pub struct FilmBase {
    pub object: ObjectBase,
    pub size: Point2i,
    pub crop_size: Point2i,
    pub crop_offset: Point2i,
    pub pixel_format: PixelFormat,
    pub component_format: ComponentFormat,
    pub filter: Box<dyn ReconstructionFilter>,
    pub dest_file: Option<PathBuf>,
    pub image: Option<Bitmap>,
}

impl FilmBase {
    /// Reads size, crop window, formats and the reconstruction filter
    /// (a `gaussian` one when none is given).
    pub fn new(
        props: &mut Properties,
        manager: &mut PluginManager,
        default_component_format: &str,
    ) -> Result<Self, SceneError> {
        let object = ObjectBase::new(props);
        let name = object.plugin_name.clone();
        let width = props.get_or::<i64>("width", 768)?;
        let height = props.get_or::<i64>("height", 576)?;
        let limit = i32::MAX as i64;
        if width <= 0 || height <= 0 || width > limit || height > limit {
            return Err(SceneError::construction(
                &name,
                format!("invalid film size {}x{}", width, height),
            ));
        }
        let crop_width = props.get_or::<i64>("crop_width", width)?;
        let crop_height = props.get_or::<i64>("crop_height", height)?;
        let crop_offset_x = props.get_or::<i64>("crop_offset_x", 0)?;
        let crop_offset_y = props.get_or::<i64>("crop_offset_y", 0)?;
        if crop_width <= 0
            || crop_height <= 0
            || crop_offset_x > limit
            || crop_offset_y > limit
            || crop_offset_x < 0
            || crop_offset_y < 0
            || crop_offset_x + crop_width > width
            || crop_offset_y + crop_height > height
        {
            return Err(SceneError::construction(
                &name,
                "invalid crop window specification",
            ));
        }
        let requested: String = props.get_or("pixel_format", "rgba".to_string())?;
        let requested = requested.to_lowercase();
        let mut pixel_format: PixelFormat = requested.parse().map_err(|_| {
            SceneError::construction(
                &name,
                format!(
                    "\"pixel_format\" must be one of luminance, luminance_alpha, rgb, rgba, \
                     xyz, xyza, found \"{}\"",
                    requested
                ),
            )
        })?;
        if manager.variant().is_monochromatic() && pixel_format != PixelFormat::Luminance {
            log::warn!(
                "Monochrome mode enabled, setting film output pixel format to 'luminance' (was {}).",
                pixel_format
            );
            pixel_format = PixelFormat::Luminance;
        }
        let requested: String =
            props.get_or("component_format", default_component_format.to_string())?;
        let requested = requested.to_lowercase();
        let component_format: ComponentFormat = requested.parse().map_err(|_| {
            SceneError::construction(
                &name,
                format!(
                    "\"component_format\" must be one of float16, float32, uint32, found \"{}\"",
                    requested
                ),
            )
        })?;
        let dest_file: Option<PathBuf> = if props.has_property("filename") {
            Some(PathBuf::from(props.get::<String>("filename")?))
        } else {
            None
        };
        let mut filter: Option<Box<dyn ReconstructionFilter>> = None;
        for (key, child) in props.objects() {
            match child {
                PluginObject::ReconstructionFilter(f) if filter.is_none() => filter = Some(f),
                other => {
                    return Err(SceneError::construction(
                        &name,
                        format!("unsupported child object \"{}\" ({})", key, other.category()),
                    ))
                }
            }
        }
        let filter = match filter {
            Some(filter) => filter,
            None => manager
                .create_default(Category::ReconstructionFilter, "gaussian")?
                .into_filter()?,
        };
        Ok(FilmBase {
            object,
            size: Point2i {
                x: width as i32,
                y: height as i32,
            },
            crop_size: Point2i {
                x: crop_width as i32,
                y: crop_height as i32,
            },
            crop_offset: Point2i {
                x: crop_offset_x as i32,
                y: crop_offset_y as i32,
            },
            pixel_format,
            component_format,
            filter,
            dest_file,
            image: None,
        })
    }
}

/// Converts a linear RGB bitmap to `format`.
pub fn develop_rgb(image: &Bitmap, format: PixelFormat) -> Result<Bitmap, SceneError> {
    let channels = format.channel_count();
    let mut data: Vec<Float> = Vec::with_capacity(image.width() * image.height() * channels);
    for pixel in image.data().chunks(image.channels()) {
        let rgb: [Float; 3] = if pixel.len() >= 3 {
            [pixel[0], pixel[1], pixel[2]]
        } else {
            [pixel[0], pixel[0], pixel[0]]
        };
        match format {
            PixelFormat::Luminance | PixelFormat::LuminanceAlpha => {
                let mut xyz: [Float; 3] = [0.0; 3];
                rgb_to_xyz(&rgb, &mut xyz);
                data.push(xyz[1]);
            }
            PixelFormat::Rgb | PixelFormat::Rgba => data.extend_from_slice(&rgb),
            PixelFormat::Xyz | PixelFormat::Xyza => {
                let mut xyz: [Float; 3] = [0.0; 3];
                rgb_to_xyz(&rgb, &mut xyz);
                data.extend_from_slice(&xyz);
            }
        }
        if matches!(
            format,
            PixelFormat::LuminanceAlpha | PixelFormat::Rgba | PixelFormat::Xyza
        ) {
            data.push(1.0 as Float);
        }
    }
    Bitmap::from_data(image.width(), image.height(), channels, data)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn develop_to_every_format() {
        let image = Bitmap::from_data(1, 1, 3, vec![1.0, 1.0, 1.0]).unwrap();
        let y = develop_rgb(&image, PixelFormat::Luminance).unwrap();
        assert!((y.data()[0] - 1.0).abs() < 1.0e-3);
        let rgba = develop_rgb(&image, PixelFormat::Rgba).unwrap();
        assert_eq!(rgba.data(), &[1.0, 1.0, 1.0, 1.0]);
        let xyza = develop_rgb(&image, PixelFormat::Xyza).unwrap();
        assert_eq!(xyza.channels(), 4);
        assert_eq!("luminance_alpha".parse::<PixelFormat>().unwrap(), PixelFormat::LuminanceAlpha);
        assert_eq!("uint32".parse::<ComponentFormat>().unwrap(), ComponentFormat::UInt32);
    }

    #[test]
    fn sizes_must_fit_the_pixel_grid() {
        use crate::core::api::register_builtin_plugins;
        use crate::core::registry::Registry;

        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        let mut manager = PluginManager::new(registry);
        let mut props = Properties::new("hdrfilm");
        props.set("width", 1_i64 << 32).unwrap();
        match FilmBase::new(&mut props, &mut manager, "float16") {
            Err(SceneError::ConstructionFailed { .. }) => {}
            Err(e) => panic!("unexpected {:?}", e),
            Ok(_) => panic!("film of width 2^32 accepted"),
        }
        let mut props = Properties::new("hdrfilm");
        props.set("width", 64_i64).unwrap();
        props.set("crop_offset_x", i64::MAX).unwrap();
        props.set("crop_width", 1_i64).unwrap();
        assert!(FilmBase::new(&mut props, &mut manager, "float16").is_err());
    }
}
