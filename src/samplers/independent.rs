// rs_scene
use crate::core::error::SceneError;
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::rng::Rng;
use crate::core::sampler::Sampler;

pub struct IndependentSampler {
    pub sample_count: i64,
    pub seed: i64,
    base: ObjectBase,
}

impl IndependentSampler {
    pub fn new(sample_count: i64, seed: i64) -> Self {
        IndependentSampler {
            sample_count,
            seed,
            base: ObjectBase::default(),
        }
    }
}

impl SceneObject for IndependentSampler {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn category(&self) -> Category {
        Category::Sampler
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_parameter(
            "sample_count",
            ParameterRef::Long(&mut self.sample_count),
            ParamFlags::NonDifferentiable as u8,
        );
    }
    fn parameters_changed(&mut self, _keys: &[String]) -> Result<(), SceneError> {
        if self.sample_count <= 0 || self.sample_count > u32::MAX as i64 {
            return Err(SceneError::InvalidArgument(format!(
                "sample_count out of range, found {}",
                self.sample_count
            )));
        }
        Ok(())
    }
}

impl Sampler for IndependentSampler {
    fn sample_count(&self) -> u32 {
        self.sample_count as u32
    }
    fn row_generator(&self, seed: u64, row: u32) -> Rng {
        Rng::new(seed.wrapping_add(self.seed as u64), row as u64)
    }
}

pub fn create(
    props: &mut Properties,
    _manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let sample_count: i64 = props.get_or("sample_count", 4)?;
    let seed: i64 = props.get_or("seed", 0)?;
    if sample_count <= 0 || sample_count > u32::MAX as i64 {
        return Err(SceneError::construction(
            "independent",
            format!("sample_count out of range, found {}", sample_count),
        ));
    }
    let mut sampler = IndependentSampler::new(sample_count, seed);
    sampler.base = ObjectBase::new(props);
    Ok(PluginObject::Sampler(Box::new(sampler)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rows_are_reproducible() {
        let sampler = IndependentSampler::new(4, 0);
        let mut a = sampler.row_generator(7, 3);
        let mut b = sampler.row_generator(7, 3);
        let mut c = sampler.row_generator(7, 4);
        let x = a.uniform_float();
        assert_eq!(x, b.uniform_float());
        assert_ne!(x, c.uniform_float());
    }

    #[test]
    fn sample_count_must_fit_u32() {
        let mut props = Properties::new("independent");
        props.set("sample_count", 1_i64 << 32).unwrap();
        let mut manager = PluginManager::new(crate::core::registry::Registry::new());
        match create(&mut props, &mut manager) {
            Err(SceneError::ConstructionFailed { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        let mut sampler = IndependentSampler::new(4, 0);
        sampler.sample_count = 1_i64 << 32;
        assert!(sampler.parameters_changed(&["sample_count".to_string()]).is_err());
    }
}
