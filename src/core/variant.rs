//! Numeric configurations a scene can be built for.
//!
//! A variant is chosen once per plugin manager. The first plugin
//! lookup locks the selection: switching to another variant afterwards
//! fails, re-selecting the active one is accepted.

// others
use strum_macros::{Display, EnumIter, EnumString};
// rs_scene
use crate::core::error::SceneError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Variant {
    ScalarMono,
    ScalarRgb,
    ScalarSpectral,
    PacketRgb,
    PacketSpectral,
    GpuRgb,
    GpuAutodiffRgb,
    GpuAutodiffSpectral,
}

impl Default for Variant {
    fn default() -> Self {
        Variant::ScalarRgb
    }
}

impl Variant {
    pub fn is_monochromatic(&self) -> bool {
        matches!(self, Variant::ScalarMono)
    }
    pub fn is_spectral(&self) -> bool {
        matches!(
            self,
            Variant::ScalarSpectral | Variant::PacketSpectral | Variant::GpuAutodiffSpectral
        )
    }
    pub fn is_vectorized(&self) -> bool {
        !matches!(
            self,
            Variant::ScalarMono | Variant::ScalarRgb | Variant::ScalarSpectral
        )
    }
    pub fn is_differentiable(&self) -> bool {
        matches!(
            self,
            Variant::GpuAutodiffRgb | Variant::GpuAutodiffSpectral
        )
    }
    pub fn parse(name: &str) -> Result<Variant, SceneError> {
        name.parse::<Variant>()
            .map_err(|_| SceneError::UnknownVariant(name.to_string()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct VariantSelector {
    current: Variant,
    locked: bool,
}

impl VariantSelector {
    pub fn new(variant: Variant) -> Self {
        VariantSelector {
            current: variant,
            locked: false,
        }
    }
    pub fn current(&self) -> Variant {
        self.current
    }
    pub fn is_locked(&self) -> bool {
        self.locked
    }
    /// Returns the active variant and locks it.
    pub fn lock(&mut self) -> Variant {
        self.locked = true;
        self.current
    }
    pub fn set(&mut self, variant: Variant) -> Result<(), SceneError> {
        if self.locked && variant != self.current {
            return Err(SceneError::VariantLocked {
                current: self.current,
                requested: variant,
            });
        }
        self.current = variant;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn names_parse_back() {
        for variant in Variant::iter() {
            assert_eq!(Variant::parse(&variant.to_string()).unwrap(), variant);
        }
        assert_eq!(Variant::GpuAutodiffRgb.to_string(), "gpu_autodiff_rgb");
        assert!(matches!(
            Variant::parse("scalar_cmyk"),
            Err(SceneError::UnknownVariant(_))
        ));
    }

    #[test]
    fn first_lookup_locks_the_selection() {
        let mut selector = VariantSelector::default();
        selector.set(Variant::ScalarMono).unwrap();
        assert_eq!(selector.lock(), Variant::ScalarMono);
        assert!(selector.set(Variant::ScalarMono).is_ok());
        assert!(matches!(
            selector.set(Variant::ScalarRgb),
            Err(SceneError::VariantLocked { .. })
        ));
        assert_eq!(selector.current(), Variant::ScalarMono);
    }
}
