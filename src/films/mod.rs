//! Films store the image a sensor captured.
//!
//! - HdrFilm
//! - TiledHdrFilm
//!
//! Both films share their attributes through **FilmBase**: `width`
//! and `height` (768x576), an optional crop window (`crop_offset_x`,
//! `crop_offset_y`, `crop_width`, `crop_height`), the `pixel_format`
//! (`rgba`), the `component_format` (`float16`), an optional
//! `filename` and a nested reconstruction filter (`gaussian`).
//!
//! ## HDR Film
//!
//! Develops into any pixel format and writes whatever format the file
//! extension names.
//!
//! ## Tiled HDR Film
//!
//! Meant for very large renders. Developing converts the image one
//! block at a time, `block_size` (32) pixels on a side. It always writes
//! OpenEXR; the extension of the destination file is replaced by
//! `.exr`.

pub mod hdrfilm;
pub mod tiledhdrfilm;
