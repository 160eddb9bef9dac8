//! Linear floating point images.
//!
//! Integrators return a **Bitmap**, films develop into one and the
//! render loop accumulates them across passes. Writing picks the
//! format from the file extension: `.exr` keeps linear values, every
//! other format is tonemapped with the sRGB curve to 8 bits.

// std
use std::path::Path;
// others
use image::{ColorType, Rgb32FImage, Rgba32FImage};
// rs_scene
use crate::core::base::{clamp_t, gamma_correct, Float, Spectrum};
use crate::core::error::SceneError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<Float>,
}

impl Bitmap {
    /// A black image.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Bitmap {
            width,
            height,
            channels,
            data: vec![0.0 as Float; width * height * channels],
        }
    }
    pub fn from_data(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<Float>,
    ) -> Result<Self, SceneError> {
        if data.len() != width * height * channels {
            return Err(SceneError::InvalidArgument(format!(
                "{} values do not fill a {}x{} bitmap with {} channel(s)",
                data.len(),
                width,
                height,
                channels
            )));
        }
        Ok(Bitmap {
            width,
            height,
            channels,
            data,
        })
    }
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn channels(&self) -> usize {
        self.channels
    }
    pub fn data(&self) -> &[Float] {
        &self.data
    }
    pub fn data_mut(&mut self) -> &mut [Float] {
        &mut self.data
    }
    pub fn pixel(&self, x: usize, y: usize) -> &[Float] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [Float] {
        let start = (y * self.width + x) * self.channels;
        &mut self.data[start..start + self.channels]
    }
    /// Copy of the `width` x `height` region at `(x, y)`, clipped to the
    /// bitmap.
    pub fn block(&self, x: usize, y: usize, width: usize, height: usize) -> Bitmap {
        let width = width.min(self.width.saturating_sub(x));
        let height = height.min(self.height.saturating_sub(y));
        let mut data: Vec<Float> = Vec::with_capacity(width * height * self.channels);
        for row in y..y + height {
            let start = (row * self.width + x) * self.channels;
            data.extend_from_slice(&self.data[start..start + width * self.channels]);
        }
        Bitmap {
            width,
            height,
            channels: self.channels,
            data,
        }
    }
    /// Copies `block` into this bitmap with its corner at `(x, y)`.
    pub fn paste(&mut self, block: &Bitmap, x: usize, y: usize) -> Result<(), SceneError> {
        if block.channels != self.channels
            || x + block.width > self.width
            || y + block.height > self.height
        {
            return Err(SceneError::InvalidArgument(format!(
                "block of {}x{} at ({}, {}) does not fit a {}x{} bitmap",
                block.width, block.height, x, y, self.width, self.height
            )));
        }
        let row_len = block.width * self.channels;
        for row in 0..block.height {
            let src = row * row_len;
            let dst = ((y + row) * self.width + x) * self.channels;
            self.data[dst..dst + row_len].copy_from_slice(&block.data[src..src + row_len]);
        }
        Ok(())
    }
    /// Stores an RGB value, reduced to luminance for one and two
    /// channel bitmaps.
    pub fn put_spectrum(&mut self, x: usize, y: usize, value: &Spectrum) {
        let channels = self.channels;
        let pixel = self.pixel_mut(x, y);
        match channels {
            1 | 2 => pixel[0] = value.y(),
            _ => {
                pixel[0] = value[0];
                pixel[1] = value[1];
                pixel[2] = value[2];
            }
        }
        if channels == 2 || channels == 4 {
            pixel[channels - 1] = 1.0 as Float;
        }
    }
    /// New bitmap made of the listed channels only.
    pub fn select_channels(&self, selection: &[usize]) -> Result<Bitmap, SceneError> {
        if let Some(c) = selection.iter().find(|c| **c >= self.channels) {
            return Err(SceneError::InvalidArgument(format!(
                "channel {} out of range, bitmap has {}",
                c, self.channels
            )));
        }
        let mut data: Vec<Float> = Vec::with_capacity(self.width * self.height * selection.len());
        for pixel in self.data.chunks(self.channels) {
            for c in selection {
                data.push(pixel[*c]);
            }
        }
        Bitmap::from_data(self.width, self.height, selection.len(), data)
    }
    /// Sets NaN values to zero and returns how many there were.
    pub fn remove_nans(&mut self) -> usize {
        let mut count: usize = 0;
        for v in self.data.iter_mut() {
            if v.is_nan() {
                *v = 0.0 as Float;
                count += 1;
            }
        }
        count
    }
    pub fn has_nans(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }
    pub fn add_assign(&mut self, other: &Bitmap) -> Result<(), SceneError> {
        if (self.width, self.height, self.channels) != (other.width, other.height, other.channels)
        {
            return Err(SceneError::InvalidArgument(format!(
                "cannot add a {}x{}x{} bitmap to a {}x{}x{} bitmap",
                other.width, other.height, other.channels, self.width, self.height, self.channels
            )));
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += *b;
        }
        Ok(())
    }
    pub fn scale(&mut self, factor: Float) {
        for v in self.data.iter_mut() {
            *v *= factor;
        }
    }
    /// Three channel copy, grey for luminance bitmaps.
    fn to_rgb(&self) -> Vec<Float> {
        let mut rgb: Vec<Float> = Vec::with_capacity(self.width * self.height * 3);
        for pixel in self.data.chunks(self.channels) {
            match self.channels {
                1 | 2 => rgb.extend_from_slice(&[pixel[0], pixel[0], pixel[0]]),
                _ => rgb.extend_from_slice(&pixel[0..3]),
            }
        }
        rgb
    }
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let path = path.as_ref();
        let width = self.width as u32;
        let height = self.height as u32;
        let is_exr = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("exr"))
            .unwrap_or(false);
        log::info!("Writing image {:?} ({}x{})", path, width, height);
        if is_exr {
            if self.channels == 4 {
                let img = Rgba32FImage::from_raw(width, height, self.data.clone()).ok_or_else(
                    || SceneError::InvalidArgument("bitmap does not match its size".to_string()),
                )?;
                img.save(path)?;
            } else {
                let img = Rgb32FImage::from_raw(width, height, self.to_rgb()).ok_or_else(|| {
                    SceneError::InvalidArgument("bitmap does not match its size".to_string())
                })?;
                img.save(path)?;
            }
            return Ok(());
        }
        // 8-bit format; apply gamma
        let buffer: Vec<u8> = self
            .to_rgb()
            .iter()
            .map(|v| clamp_t(255.0 as Float * gamma_correct(*v) + 0.5, 0.0, 255.0) as u8)
            .collect();
        image::save_buffer(path, &buffer, width, height, ColorType::Rgb8)?;
        Ok(())
    }
    /// Writes the first channel as signed values: positive red,
    /// negative blue, zero black.
    pub fn write_gradient<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let mut rgb: Vec<Float> = Vec::with_capacity(self.width * self.height * 3);
        for pixel in self.data.chunks(self.channels) {
            let g = pixel[0];
            rgb.extend_from_slice(&[g.max(0.0), 0.0, (-g).max(0.0)]);
        }
        let signed = Bitmap::from_data(self.width, self.height, 3, rgb)?;
        signed.write(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nans_are_zeroed_and_counted() {
        let mut bitmap =
            Bitmap::from_data(2, 1, 1, vec![1.0, std::f32::NAN]).unwrap();
        assert!(bitmap.has_nans());
        assert_eq!(bitmap.remove_nans(), 1);
        assert_eq!(bitmap.data(), &[1.0, 0.0]);
    }

    #[test]
    fn channel_selection() {
        let bitmap = Bitmap::from_data(1, 2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let red = bitmap.select_channels(&[0]).unwrap();
        assert_eq!(red.channels(), 1);
        assert_eq!(red.data(), &[1.0, 4.0]);
        assert!(bitmap.select_channels(&[3]).is_err());
        assert!(Bitmap::from_data(2, 2, 3, vec![0.0; 5]).is_err());
    }

    #[test]
    fn luminance_bitmaps_store_y() {
        let mut bitmap = Bitmap::new(1, 1, 1);
        bitmap.put_spectrum(0, 0, &Spectrum::new(2.0));
        assert!((bitmap.pixel(0, 0)[0] - 2.0).abs() < 1.0e-5);
    }
}
