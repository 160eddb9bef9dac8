//! Single pass rendering and the multi-pass loop producing an image
//! together with its derivative with respect to one scene parameter.
//!
//! Every pass renders with seed `options.seed + pass`. NaN samples of
//! the image and of the gradient are replaced by zero and counted
//! before they enter the running sums; both sums are divided by the
//! number of passes once all passes are done.

// others
use pbr::ProgressBar;
use smallvec::{smallvec, SmallVec};
// rs_scene
use crate::core::autodiff::{DiffContext, DiffParameter, Differentiator};
use crate::core::base::Float;
use crate::core::bitmap::Bitmap;
use crate::core::error::SceneError;
use crate::core::parameters::ParameterMap;
use crate::core::scene::Scene;

/// Renders one pass through sensor `sensor` and stores it in the
/// sensor's film. Returns the linear RGB image.
pub fn render(scene: &mut Scene, sensor: usize, seed: u64) -> Result<Bitmap, SceneError> {
    scene.check_complete()?;
    let pending = scene.pending_updates();
    if pending > 0 {
        return Err(SceneError::PendingUpdate(pending));
    }
    let image = match scene.integrator() {
        Some(integrator) => {
            scene.sensor(sensor)?;
            integrator.render(scene, sensor, seed)?
        }
        None => {
            return Err(SceneError::IncompleteScene(
                "scene has no integrator".to_string(),
            ))
        }
    };
    scene.sensor_mut(sensor)?.film_mut().put(image.clone())?;
    Ok(image)
}

/// Running sum over passes.
#[derive(Debug, Default)]
pub struct PassAccumulator {
    sum: Option<Bitmap>,
    passes: usize,
    nan_count: usize,
}

impl PassAccumulator {
    pub fn new() -> Self {
        PassAccumulator::default()
    }
    /// Adds one pass after zeroing its NaN values.
    pub fn add(&mut self, mut pass: Bitmap) -> Result<(), SceneError> {
        self.nan_count += pass.remove_nans();
        match self.sum.as_mut() {
            Some(sum) => sum.add_assign(&pass)?,
            None => self.sum = Some(pass),
        }
        self.passes += 1;
        Ok(())
    }
    pub fn passes(&self) -> usize {
        self.passes
    }
    pub fn nan_count(&self) -> usize {
        self.nan_count
    }
    /// Mean over the accumulated passes.
    pub fn finish(self) -> Result<Bitmap, SceneError> {
        match self.sum {
            Some(mut sum) => {
                sum.scale(1.0 as Float / self.passes as Float);
                Ok(sum)
            }
            None => Err(SceneError::InvalidArgument(
                "no pass was accumulated".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GradientOptions {
    pub passes: usize,
    /// Seed of the first pass.
    pub seed: u64,
    /// Gradient channels to keep.
    pub channels: SmallVec<[usize; 3]>,
    pub sensor: usize,
    pub progress: bool,
}

impl Default for GradientOptions {
    fn default() -> Self {
        GradientOptions {
            passes: 1,
            seed: 0,
            channels: smallvec![0],
            sensor: 0,
            progress: false,
        }
    }
}

#[derive(Debug)]
pub struct GradientRender {
    pub image: Bitmap,
    pub gradient: Bitmap,
    /// NaN samples replaced in image and gradient.
    pub nan_count: usize,
    pub passes: usize,
}

/// Averages `options.passes` renders of `scene` and, when `param`
/// requires a gradient, the derivative of each render with respect to
/// it. Without gradient the returned gradient is zero.
pub fn render_with_gradient(
    scene: &mut Scene,
    params: &mut ParameterMap,
    param: &DiffParameter,
    differentiator: &mut dyn Differentiator,
    options: &GradientOptions,
) -> Result<GradientRender, SceneError> {
    if options.passes == 0 {
        return Err(SceneError::InvalidArgument(
            "at least one pass is required".to_string(),
        ));
    }
    if param.requires_gradient() && !scene.variant().is_differentiable() {
        return Err(SceneError::NotDifferentiable(scene.variant()));
    }
    param.apply(params)?;
    params.update(scene)?;
    let mut images = PassAccumulator::new();
    let mut gradients = PassAccumulator::new();
    let mut progress = if options.progress {
        let mut pb = ProgressBar::new(options.passes as u64);
        pb.message("Pass ");
        Some(pb)
    } else {
        None
    };
    for pass in 0..options.passes {
        let seed = options.seed.wrapping_add(pass as u64);
        let image = render(scene, options.sensor, seed)?;
        let gradient = if param.requires_gradient() {
            let mut ctx = DiffContext {
                scene: &mut *scene,
                params: &mut *params,
                sensor: options.sensor,
                seed,
                image: &image,
            };
            differentiator.forward(&mut ctx, param, pass + 1 == options.passes)?;
            differentiator.gradient()?.select_channels(&options.channels)?
        } else {
            Bitmap::new(image.width(), image.height(), options.channels.len())
        };
        images.add(image)?;
        gradients.add(gradient)?;
        if let Some(pb) = progress.as_mut() {
            pb.inc();
        }
    }
    if let Some(mut pb) = progress {
        pb.finish();
    }
    let nan_count = images.nan_count() + gradients.nan_count();
    if nan_count > 0 {
        log::warn!("replaced {} NaN sample(s) by zero", nan_count);
    }
    Ok(GradientRender {
        image: images.finish()?,
        gradient: gradients.finish()?,
        nan_count,
        passes: options.passes,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::api::register_builtin_plugins;
    use crate::core::autodiff::FiniteDifferences;
    use crate::core::integrator::Integrator;
    use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
    use crate::core::parameters::{traverse, ParamFlags, ParameterRef, TraversalCallback};
    use crate::core::plugin::PluginManager;
    use crate::core::properties::{Properties, PropertyValue};
    use crate::core::registry::Registry;
    use crate::core::variant::Variant;

    /// Repeats `pattern * gain` over the pixels, plus the seed when
    /// `seeded` is set.
    struct PatternIntegrator {
        gain: Float,
        pattern: Vec<Float>,
        seeded: bool,
        base: ObjectBase,
    }

    impl PatternIntegrator {
        fn new(pattern: Vec<Float>, seeded: bool) -> Box<Self> {
            let mut base = ObjectBase::default();
            base.plugin_name = String::from("pattern");
            Box::new(PatternIntegrator {
                gain: 1.0,
                pattern,
                seeded,
                base,
            })
        }
    }

    impl SceneObject for PatternIntegrator {
        fn base(&self) -> &ObjectBase {
            &self.base
        }
        fn category(&self) -> Category {
            Category::Integrator
        }
        fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
            callback.put_parameter(
                "gain",
                ParameterRef::Float(&mut self.gain),
                ParamFlags::Differentiable as u8,
            );
        }
    }

    impl Integrator for PatternIntegrator {
        fn render(&self, scene: &Scene, sensor: usize, seed: u64) -> Result<Bitmap, SceneError> {
            let crop = scene.sensor(sensor)?.film().crop_size();
            let pixels = (crop.x * crop.y) as usize;
            let offset = if self.seeded { seed as Float } else { 0.0 };
            let mut data: Vec<Float> = Vec::with_capacity(pixels * 3);
            for i in 0..pixels {
                let v = self.pattern[i % self.pattern.len()] * self.gain + offset;
                data.extend_from_slice(&[v, v, v]);
            }
            Bitmap::from_data(crop.x as usize, crop.y as usize, 3, data)
        }
    }

    fn scene(variant: Variant, width: i64, integrator: Box<dyn Integrator>) -> Scene {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        let mut manager = PluginManager::new(registry);
        manager.set_variant(variant).unwrap();
        let mut film = Properties::new("hdrfilm");
        film.set("width", width).unwrap();
        film.set("height", 1_i64).unwrap();
        let mut sensor = Properties::new("perspective");
        sensor.set("film", film).unwrap();
        let sensor = manager
            .create_object(sensor, Category::Sensor)
            .unwrap()
            .into_sensor()
            .unwrap();
        let mut scene = Scene::new(variant);
        scene.add_sensor(sensor);
        scene.set_integrator(integrator);
        scene
    }

    fn create_pattern(
        props: &mut Properties,
        _manager: &mut PluginManager,
    ) -> Result<PluginObject, SceneError> {
        let value: Float = props.get_or("value", 0.5)?;
        Ok(PluginObject::Integrator(PatternIntegrator::new(
            vec![value],
            false,
        )))
    }

    fn gain() -> DiffParameter {
        DiffParameter::float("gain", "pattern.gain", 1.0)
    }

    #[test]
    fn scene_without_sensor_is_incomplete() {
        let mut scene = Scene::new(Variant::ScalarRgb);
        match render(&mut scene, 0, 0) {
            Err(SceneError::IncompleteScene(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nans_are_zeroed_before_averaging() {
        let mut scene = scene(
            Variant::ScalarRgb,
            2,
            PatternIntegrator::new(vec![1.0, std::f32::NAN], false),
        );
        let mut params = traverse(&mut scene);
        let options = GradientOptions {
            passes: 2,
            ..GradientOptions::default()
        };
        let result = render_with_gradient(
            &mut scene,
            &mut params,
            &gain(),
            &mut FiniteDifferences::default(),
            &options,
        )
        .unwrap();
        assert_eq!(result.image.pixel(0, 0), &[1.0, 1.0, 1.0]);
        assert_eq!(result.image.pixel(1, 0), &[0.0, 0.0, 0.0]);
        assert_eq!(result.nan_count, 6);
        assert!(result.gradient.data().iter().all(|g| *g == 0.0));
        assert_eq!(result.gradient.channels(), 1);
    }

    #[test]
    fn passes_use_consecutive_seeds() {
        let mut scene = scene(
            Variant::ScalarRgb,
            3,
            PatternIntegrator::new(vec![0.25], true),
        );
        let mut params = traverse(&mut scene);
        let options = GradientOptions {
            passes: 3,
            seed: 10,
            ..GradientOptions::default()
        };
        let result = render_with_gradient(
            &mut scene,
            &mut params,
            &gain(),
            &mut FiniteDifferences::default(),
            &options,
        )
        .unwrap();
        assert_eq!(result.passes, 3);
        for v in result.image.data() {
            assert!((v - 11.25).abs() < 1.0e-4);
        }
    }

    #[test]
    fn pass_seeds_wrap_around() {
        let mut scene = scene(
            Variant::ScalarRgb,
            2,
            PatternIntegrator::new(vec![0.25], false),
        );
        let mut params = traverse(&mut scene);
        let options = GradientOptions {
            passes: 2,
            seed: u64::MAX,
            ..GradientOptions::default()
        };
        let result = render_with_gradient(
            &mut scene,
            &mut params,
            &gain(),
            &mut FiniteDifferences::default(),
            &options,
        )
        .unwrap();
        assert_eq!(result.passes, 2);
        assert_eq!(result.image.pixel(1, 0), &[0.25, 0.25, 0.25]);
    }

    #[test]
    fn gradient_of_a_linear_parameter() {
        let mut scene = scene(
            Variant::GpuAutodiffRgb,
            2,
            PatternIntegrator::new(vec![2.0, -1.0], false),
        );
        let mut params = traverse(&mut scene);
        let mut param = gain();
        param.set_requires_gradient(&mut params, true).unwrap();
        let options = GradientOptions {
            passes: 2,
            ..GradientOptions::default()
        };
        let result = render_with_gradient(
            &mut scene,
            &mut params,
            &param,
            &mut FiniteDifferences::new(1.0e-2, true),
            &options,
        )
        .unwrap();
        assert!((result.gradient.pixel(0, 0)[0] - 2.0).abs() < 1.0e-2);
        assert!((result.gradient.pixel(1, 0)[0] + 1.0).abs() < 1.0e-2);
        // the film holds the unshifted pass
        let film = scene.sensor(0).unwrap().film();
        assert_eq!(film.bitmap().unwrap().pixel(0, 0)[0], 2.0);
    }

    #[test]
    fn invalid_gradient_requests() {
        let mut scene = scene(
            Variant::ScalarRgb,
            1,
            PatternIntegrator::new(vec![1.0], false),
        );
        let mut params = traverse(&mut scene);
        let options = GradientOptions {
            passes: 0,
            ..GradientOptions::default()
        };
        let mut param = gain();
        match render_with_gradient(
            &mut scene,
            &mut params,
            &param,
            &mut FiniteDifferences::default(),
            &options,
        ) {
            Err(SceneError::InvalidArgument(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        param.set_requires_gradient(&mut params, true).unwrap();
        match render_with_gradient(
            &mut scene,
            &mut params,
            &param,
            &mut FiniteDifferences::default(),
            &GradientOptions::default(),
        ) {
            Err(SceneError::NotDifferentiable(Variant::ScalarRgb)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pending_updates_block_rendering() {
        let mut scene = scene(
            Variant::ScalarRgb,
            1,
            PatternIntegrator::new(vec![1.0], false),
        );
        let mut params = traverse(&mut scene);
        params.set("pattern.gain", PropertyValue::Float(3.0)).unwrap();
        match render(&mut scene, 0, 0) {
            Err(SceneError::PendingUpdate(1)) => {}
            other => panic!("unexpected {:?}", other),
        }
        params.update(&mut scene).unwrap();
        let image = render(&mut scene, 0, 0).unwrap();
        assert_eq!(image.pixel(0, 0)[0], 3.0);
    }

    #[test]
    fn stale_map_does_not_block_rendering() {
        let mut scene = scene(
            Variant::ScalarRgb,
            1,
            PatternIntegrator::new(vec![1.0], false),
        );
        let mut old = traverse(&mut scene);
        let fresh = traverse(&mut scene);
        assert_eq!(old.keys(), fresh.keys());
        old.set("pattern.gain", PropertyValue::Float(3.0)).unwrap();
        match old.update(&mut scene) {
            Err(SceneError::StaleParameterMap) => {}
            other => panic!("unexpected {:?}", other),
        }
        let image = render(&mut scene, 0, 0).unwrap();
        assert_eq!(image.pixel(0, 0)[0], 1.0);
    }

    #[test]
    fn registered_test_plugin_renders() {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        registry
            .register(
                Category::Integrator,
                "pattern",
                Variant::ScalarRgb,
                create_pattern,
            )
            .unwrap();
        let mut manager = PluginManager::new(registry);
        let mut film = Properties::new("hdrfilm");
        film.set("width", 2_i64).unwrap();
        film.set("height", 2_i64).unwrap();
        let mut sensor = Properties::new("perspective");
        sensor.set("film", film).unwrap();
        let mut integrator = Properties::new("pattern");
        integrator.set("value", 0.75 as Float).unwrap();
        let mut props = Properties::new("scene");
        props.set("sensor", sensor).unwrap();
        props.set("integrator", integrator).unwrap();
        let mut scene = manager
            .create_object(props, Category::Scene)
            .unwrap()
            .into_scene()
            .unwrap();
        let image = render(&mut scene, 0, 0).unwrap();
        assert!(image.data().iter().all(|v| *v == 0.75));
        assert_eq!(
            manager.loaded_plugins().last(),
            Some(&(Category::Scene, "scene".to_string()))
        );
        assert!(manager
            .loaded_plugins()
            .contains(&(Category::Integrator, "pattern".to_string())));
    }
}
