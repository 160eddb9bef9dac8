//! An integrator turns the scene as seen by one sensor into an image.
//!
//! A single pass is one call to `Integrator::render`. The reference
//! integrators share `render_rows`, which evaluates the crop window
//! row by row in parallel. Each row draws from its own generator,
//! seeded from the pass seed and the row index, so the image does not
//! depend on how rows are scheduled.

// others
use rayon::prelude::*;
// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::bitmap::Bitmap;
use crate::core::error::SceneError;
use crate::core::geometry::{Point2f, Ray};
use crate::core::object::SceneObject;
use crate::core::rng::Rng;
use crate::core::scene::Scene;

pub trait Integrator: SceneObject {
    /// Renders the crop window of sensor `sensor` into a linear RGB
    /// bitmap.
    fn render(&self, scene: &Scene, sensor: usize, seed: u64) -> Result<Bitmap, SceneError>;
}

/// Evaluates `li` for every sample of every pixel of the crop window.
/// Samples are jittered over the reconstruction filter's support and
/// weighted by it.
pub fn render_rows<F>(scene: &Scene, sensor: usize, seed: u64, li: F) -> Result<Bitmap, SceneError>
where
    F: Fn(&Ray, &mut Rng) -> Spectrum + Sync,
{
    let sensor = scene.sensor(sensor)?;
    let film = sensor.film();
    let crop = film.crop_size();
    let offset = film.crop_offset();
    let radius = film.filter().get_radius();
    let spp = sensor.sampler().sample_count().max(1);
    let width = crop.x as usize;
    let rows: Vec<Vec<Float>> = (0..crop.y)
        .into_par_iter()
        .map(|y| {
            let mut rng = sensor.sampler().row_generator(seed, y as u32);
            let mut row: Vec<Float> = vec![0.0 as Float; width * 3];
            for x in 0..width {
                let mut sum = Spectrum::default();
                let mut weight_sum: Float = 0.0;
                for _ in 0..spp {
                    let offset_x = (2.0 * rng.uniform_float() - 1.0) * radius.x;
                    let offset_y = (2.0 * rng.uniform_float() - 1.0) * radius.y;
                    let weight = film.filter().evaluate(Point2f {
                        x: offset_x,
                        y: offset_y,
                    });
                    if weight == 0.0 as Float {
                        continue;
                    }
                    let p_film = Point2f {
                        x: (offset.x as usize + x) as Float + 0.5 + offset_x,
                        y: (offset.y + y) as Float + 0.5 + offset_y,
                    };
                    let ray = sensor.generate_ray(&p_film);
                    sum += li(&ray, &mut rng) * weight;
                    weight_sum += weight;
                }
                if weight_sum != 0.0 as Float {
                    sum = sum / weight_sum;
                }
                row[x * 3..x * 3 + 3].copy_from_slice(&sum.c);
            }
            row
        })
        .collect();
    Bitmap::from_data(width, crop.y as usize, 3, rows.concat())
}
