//! All geometric shapes implement the **Shape** trait. A shape owns a
//! bsdf (a grey `diffuse` one unless declared) and optionally an area
//! emitter.
//!
//! - Sphere
//! - TriangleMesh
//!
//! ## Sphere
//!
//! Given by `center` and `radius`; `to_world` may move and uniformly
//! scale it. Both `center` and `radius` can be changed through
//! parameter traversal.
//!
//! ## Triangle Meshes
//!
//! Three plugins produce a **TriangleMesh**:
//!
//! - `mesh` reads inline `vertex_positions` (flat floats), `faces`
//!   (flat integers) and optional `vertex_texcoords`,
//! - `rectangle` is the square `[-1, 1]^2` in the `z = 0` plane,
//! - `ply` loads the PLY file named by `filename`.
//!
//! Vertices are stored in world space. Writing `vertex_positions`
//! through a parameter map recomputes the surface area and bounds and
//! tells the attached emitter about the new geometry.

pub mod mesh;
pub mod plymesh;
pub mod sphere;
