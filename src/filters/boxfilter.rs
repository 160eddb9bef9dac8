// rs_scene
use crate::core::base::Float;
use crate::core::error::SceneError;
use crate::core::filter::ReconstructionFilter;
use crate::core::geometry::{Point2f, Vector2f};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;

#[derive(Debug, Default, Clone)]
pub struct BoxFilter {
    pub radius: Vector2f,
    base: ObjectBase,
}

impl BoxFilter {
    pub fn new(radius: Float) -> Self {
        BoxFilter {
            radius: Vector2f {
                x: radius,
                y: radius,
            },
            base: ObjectBase::default(),
        }
    }
}

impl SceneObject for BoxFilter {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::ReconstructionFilter
    }
}

impl ReconstructionFilter for BoxFilter {
    fn evaluate(&self, p: Point2f) -> Float {
        if p.x.abs() <= self.radius.x && p.y.abs() <= self.radius.y {
            1.0
        } else {
            0.0
        }
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
    let radius: Float = props.get_or("radius", 0.5)?;
    if radius <= 0.0 {
        return Err(SceneError::construction(
            "box",
            format!("radius must be positive, found {}", radius),
        ));
    }
    let mut filter = BoxFilter::new(radius);
    filter.base = ObjectBase::new(props);
    Ok(PluginObject::ReconstructionFilter(Box::new(filter)))
}
