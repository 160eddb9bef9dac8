//! PCG32 random number generator.
//!
//! Integrators create one generator per image row, seeded from the
//! pass seed and the row index, so a pass yields the same samples no
//! matter how rows are scheduled.

use hexf::*;

// rs_scene
use crate::core::base::Float;

pub const FLOAT_ONE_MINUS_EPSILON: Float = hexf32!("0x1.fffffep-1");
pub const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
pub const PCG32_DEFAULT_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
pub const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

/// Random number generator
#[derive(Debug, Copy, Clone)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Default for Rng {
    fn default() -> Self {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl Rng {
    /// Generator for `stream`, started from `seed`.
    pub fn new(seed: u64, stream: u64) -> Self {
        let mut rng = Rng { state: 0, inc: 0 };
        rng.seed(seed, stream);
        rng
    }
    pub fn seed(&mut self, initstate: u64, initseq: u64) {
        self.state = 0_u64;
        self.inc = initseq.wrapping_shl(1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(initstate);
        self.uniform_uint32();
    }
    pub fn uniform_uint32(&mut self) -> u32 {
        let oldstate: u64 = self.state;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted: u32 = (oldstate.wrapping_shr(18) ^ oldstate).wrapping_shr(27) as u32;
        let rot: u32 = oldstate.wrapping_shr(59) as u32;
        xorshifted.rotate_right(rot)
    }
    pub fn uniform_uint32_bounded(&mut self, b: u32) -> u32 {
        let threshold = b.wrapping_neg() % b;
        loop {
            let r = self.uniform_uint32();
            if r >= threshold {
                return r % b;
            }
        }
    }
    /// Uniform sample in `[0, 1)`.
    pub fn uniform_float(&mut self) -> Float {
        (self.uniform_uint32() as Float * hexf32!("0x1.0p-32") as Float)
            .min(FLOAT_ONE_MINUS_EPSILON)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::new(7, 3);
        let mut b = Rng::new(7, 3);
        for _ in 0..16 {
            assert_eq!(a.uniform_uint32(), b.uniform_uint32());
        }
        let mut c = Rng::new(7, 4);
        let first: Vec<u32> = (0..4).map(|_| a.uniform_uint32()).collect();
        let other: Vec<u32> = (0..4).map(|_| c.uniform_uint32()).collect();
        assert_ne!(first, other);
    }

    #[test]
    fn floats_stay_below_one() {
        let mut rng = Rng::default();
        for _ in 0..1000 {
            let f = rng.uniform_float();
            assert!(f >= 0.0 && f < 1.0);
        }
        assert!(rng.uniform_uint32_bounded(5) < 5);
    }
}
