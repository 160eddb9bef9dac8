//! Surface scattering models.
//!
//! - DiffuseBsdf
//! - DiffuseTransmitterBsdf
//!
//! ## Diffuse
//!
//! The ideal Lambertian reflector scatters incident light equally into
//! all directions of the hemisphere the normal points into. Its
//! `reflectance` (default 0.5) may be a float, a color or a texture.
//!
//! ## Diffuse Transmitter
//!
//! An ideal diffuse transmitter lets light pass from one side of the
//! surface to the other and scatters it uniformly over the opposite
//! hemisphere. Its `transmittance` defaults to 0.5.

pub mod diffuse;
pub mod difftrans;
