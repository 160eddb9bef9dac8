//! Samplers decide how many samples a pixel receives and provide the
//! random streams of a pass.
//!
//! - IndependentSampler
//!
//! ## Independent Sampler
//!
//! The independent sampler draws uniformly distributed, uncorrelated
//! samples. Every image row of a pass gets its own PCG stream, seeded
//! from the pass seed plus the sampler's `seed` attribute, so that
//! rows can be rendered in any order and still give the same image.

pub mod independent;
