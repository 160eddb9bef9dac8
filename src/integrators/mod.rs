//! Integrators compute the image of a sensor. Both reference
//! integrators render one pass through `render_rows`.
//!
//! - DirectIntegrator
//! - DepthIntegrator
//!
//! ## Direct Lighting
//!
//! The **DirectIntegrator** accounts only for direct lighting: light
//! that has traveled directly from an emitter to the point being
//! shaded, plus the emission of directly visible area emitters.
//! Shadows are tested with one shadow ray per emitter sample.
//!
//! ## Depth
//!
//! The **DepthIntegrator** writes the distance along the primary ray
//! to the first intersection into all channels, or zero where nothing
//! is hit.

pub mod depth;
pub mod direct;
