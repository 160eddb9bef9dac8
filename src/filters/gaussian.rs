// rs_scene
use crate::core::base::Float;
use crate::core::error::SceneError;
use crate::core::filter::ReconstructionFilter;
use crate::core::geometry::{Point2f, Vector2f};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;

#[derive(Debug, Default, Clone)]
pub struct GaussianFilter {
    pub alpha: Float,
    pub exp_r: Float,
    pub radius: Vector2f,
    base: ObjectBase,
}

impl GaussianFilter {
    pub fn new(stddev: Float) -> Self {
        let alpha: Float = 1.0 / (2.0 * stddev * stddev);
        let radius: Float = 4.0 * stddev;
        GaussianFilter {
            alpha,
            exp_r: (-alpha * radius * radius).exp(),
            radius: Vector2f {
                x: radius,
                y: radius,
            },
            base: ObjectBase::default(),
        }
    }
    pub fn gaussian(&self, d: Float) -> Float {
        (0.0 as Float).max((-self.alpha * d * d).exp() - self.exp_r)
    }
}

impl SceneObject for GaussianFilter {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::ReconstructionFilter
    }
}

impl ReconstructionFilter for GaussianFilter {
    fn evaluate(&self, p: Point2f) -> Float {
        self.gaussian(p.x) * self.gaussian(p.y)
    }
    fn get_radius(&self) -> Vector2f {
        Vector2f {
            x: self.radius.x,
            y: self.radius.y,
        }
    }
}

pub fn create(
    props: &mut Properties,
    _manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let stddev: Float = props.get_or("stddev", 0.5)?;
    if stddev <= 0.0 {
        return Err(SceneError::construction(
            "gaussian",
            format!("stddev must be positive, found {}", stddev),
        ));
    }
    let mut filter = GaussianFilter::new(stddev);
    filter.base = ObjectBase::new(props);
    Ok(PluginObject::ReconstructionFilter(Box::new(filter)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vanishes_at_the_radius() {
        let filter = GaussianFilter::new(0.5);
        assert_eq!(filter.get_radius().x, 2.0);
        assert!(filter.evaluate(Point2f { x: 0.0, y: 0.0 }) > 0.99);
        assert_eq!(filter.evaluate(Point2f { x: 2.0, y: 0.0 }), 0.0);
    }
}
