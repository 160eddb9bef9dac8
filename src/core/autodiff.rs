//! Differentiation is delegated to a **Differentiator**. The render
//! loop only marks a parameter, asks for a forward sweep after each
//! pass and collects the resulting gradient image.
//!
//! **FiniteDifferences** is the built-in differentiator. It shifts the
//! parameter, renders the pass again with the same seed and returns
//! the difference quotient. An external tape can be plugged in by
//! implementing the trait.

// std
use std::fmt;
// rs_scene
use crate::core::base::{Float, Spectrum};
use crate::core::bitmap::Bitmap;
use crate::core::error::SceneError;
use crate::core::geometry::Vector3f;
use crate::core::parameters::ParameterMap;
use crate::core::properties::PropertyValue;
use crate::core::render::render;
use crate::core::scene::Scene;

/// What a differentiator may touch while a pass is differentiated.
pub struct DiffContext<'a> {
    pub scene: &'a mut Scene,
    pub params: &'a mut ParameterMap,
    pub sensor: usize,
    /// Seed of the pass.
    pub seed: u64,
    /// Image of the pass.
    pub image: &'a Bitmap,
}

pub trait Differentiator {
    /// Propagates derivatives of `param` through the pass. `flush` is
    /// set for the last pass.
    fn forward(
        &mut self,
        ctx: &mut DiffContext<'_>,
        param: &DiffParameter,
        flush: bool,
    ) -> Result<(), SceneError>;
    /// Derivative of the pass image, same size and channels as the
    /// image.
    fn gradient(&mut self) -> Result<Bitmap, SceneError>;
}

type Binding = Box<dyn Fn(Float, &mut ParameterMap) -> Result<(), SceneError> + Send + Sync>;

/// A scalar the render is differentiated against, bound to a scene
/// parameter.
pub struct DiffParameter {
    name: String,
    key: String,
    value: Float,
    requires_gradient: bool,
    binding: Binding,
}

impl DiffParameter {
    /// Binds to a float parameter.
    pub fn float(name: &str, key: &str, value: Float) -> Self {
        let target = key.to_string();
        DiffParameter::with_binding(
            name,
            key,
            value,
            Box::new(move |v: Float, params: &mut ParameterMap| {
                params.set(&target, PropertyValue::Float(v))
            }),
        )
    }
    /// Binds to a color parameter, setting all channels to the value.
    pub fn color(name: &str, key: &str, value: Float) -> Self {
        let target = key.to_string();
        DiffParameter::with_binding(
            name,
            key,
            value,
            Box::new(move |v: Float, params: &mut ParameterMap| {
                params.set(&target, PropertyValue::Color(Spectrum::new(v)))
            }),
        )
    }
    /// Binds to a flat array of positions, which are moved by the
    /// value along `direction`.
    pub fn translation(name: &str, key: &str, base: Vec<Float>, direction: Vector3f) -> Self {
        let target = key.to_string();
        DiffParameter::with_binding(
            name,
            key,
            0.0,
            Box::new(move |v: Float, params: &mut ParameterMap| {
                let moved: Vec<Float> = base
                    .iter()
                    .enumerate()
                    .map(|(i, p)| p + direction[i % 3] * v)
                    .collect();
                params.set(&target, PropertyValue::Floats(moved))
            }),
        )
    }
    pub fn with_binding(name: &str, key: &str, value: Float, binding: Binding) -> Self {
        DiffParameter {
            name: name.to_string(),
            key: key.to_string(),
            value,
            requires_gradient: false,
            binding,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Key of the bound scene parameter.
    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn value(&self) -> Float {
        self.value
    }
    pub fn set_value(&mut self, value: Float) {
        self.value = value;
    }
    pub fn requires_gradient(&self) -> bool {
        self.requires_gradient
    }
    /// Also marks the bound parameter in `params`.
    pub fn set_requires_gradient(
        &mut self,
        params: &mut ParameterMap,
        requires: bool,
    ) -> Result<(), SceneError> {
        params.set_requires_gradient(&self.key, requires)?;
        self.requires_gradient = requires;
        Ok(())
    }
    /// Writes the current value into `params`.
    pub fn apply(&self, params: &mut ParameterMap) -> Result<(), SceneError> {
        (self.binding)(self.value, params)
    }
    /// Writes `value` without changing the current one.
    pub fn write(&self, params: &mut ParameterMap, value: Float) -> Result<(), SceneError> {
        (self.binding)(value, params)
    }
}

impl fmt::Debug for DiffParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffParameter")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("value", &self.value)
            .field("requires_gradient", &self.requires_gradient)
            .finish()
    }
}

#[derive(Debug)]
pub struct FiniteDifferences {
    pub epsilon: Float,
    /// Central instead of forward differences.
    pub central: bool,
    gradient: Option<Bitmap>,
}

impl Default for FiniteDifferences {
    fn default() -> Self {
        FiniteDifferences::new(1.0e-2, false)
    }
}

impl FiniteDifferences {
    pub fn new(epsilon: Float, central: bool) -> Self {
        FiniteDifferences {
            epsilon,
            central,
            gradient: None,
        }
    }
    fn render_at(
        ctx: &mut DiffContext<'_>,
        param: &DiffParameter,
        value: Float,
    ) -> Result<Bitmap, SceneError> {
        param.write(ctx.params, value)?;
        ctx.params.update(ctx.scene)?;
        render(ctx.scene, ctx.sensor, ctx.seed)
    }
}

fn difference_quotient(a: &Bitmap, b: &Bitmap, h: Float) -> Result<Bitmap, SceneError> {
    let mut quotient = a.clone();
    let mut negative_b = b.clone();
    negative_b.scale(-1.0);
    quotient.add_assign(&negative_b)?;
    quotient.scale(1.0 as Float / h);
    Ok(quotient)
}

impl Differentiator for FiniteDifferences {
    fn forward(
        &mut self,
        ctx: &mut DiffContext<'_>,
        param: &DiffParameter,
        _flush: bool,
    ) -> Result<(), SceneError> {
        if self.epsilon == 0.0 as Float {
            return Err(SceneError::InvalidArgument(
                "finite difference step must not be zero".to_string(),
            ));
        }
        let value = param.value();
        let plus = FiniteDifferences::render_at(ctx, param, value + self.epsilon)?;
        let result = if self.central {
            let minus = FiniteDifferences::render_at(ctx, param, value - self.epsilon)?;
            difference_quotient(&plus, &minus, 2.0 * self.epsilon)
        } else {
            difference_quotient(&plus, ctx.image, self.epsilon)
        };
        // restore the scene and the film of the pass
        param.write(ctx.params, value)?;
        ctx.params.update(ctx.scene)?;
        ctx.scene
            .sensor_mut(ctx.sensor)?
            .film_mut()
            .put(ctx.image.clone())?;
        self.gradient = Some(result?);
        Ok(())
    }
    fn gradient(&mut self) -> Result<Bitmap, SceneError> {
        self.gradient.take().ok_or_else(|| {
            SceneError::InvalidArgument("no forward sweep since the last gradient".to_string())
        })
    }
}
