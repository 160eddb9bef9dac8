//! Transformations place sensors, shapes and emitters in the world.
//!
//! ## 4 x 4 Matrices
//!
//! The **Matrix4x4** structure provides a low-level representation of
//! 4 x 4 matrices. It is an integral part of the **Transform** class.
//!
//! ## Transformations
//!
//! A **Transform** stores a matrix together with its inverse. When a
//! new **Transform** is created, it defaults to the *identity
//! transformation*. Objects keep their placement as a `to_world`
//! transform, which is also the value exposed for traversal.
//!
//! ### The Look-At Transformation
//!
//! The caller specifies the desired position of the sensor, a point
//! it is looking at, and an "up" vector. The result maps sensor space
//! to world space.

// std
use std::ops::Mul;
// rs_scene
use crate::core::base::{radians, Float};
use crate::core::geometry::{vec3_cross_vec3, Point3f, Vector3f};

#[derive(Debug, Copy, Clone)]
pub struct Matrix4x4 {
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Matrix4x4 {
    pub fn transpose(m: &Matrix4x4) -> Matrix4x4 {
        Matrix4x4 {
            m: [
                [m.m[0][0], m.m[1][0], m.m[2][0], m.m[3][0]],
                [m.m[0][1], m.m[1][1], m.m[2][1], m.m[3][1]],
                [m.m[0][2], m.m[1][2], m.m[2][2], m.m[3][2]],
                [m.m[0][3], m.m[1][3], m.m[2][3], m.m[3][3]],
            ],
        }
    }
    /// Gauss-Jordan elimination with full pivoting. Returns `None` for
    /// singular matrices.
    pub fn inverse(m: &Matrix4x4) -> Option<Matrix4x4> {
        let mut indxc = [0_usize; 4];
        let mut indxr = [0_usize; 4];
        let mut ipiv = [0_u8; 4];
        let mut minv: Matrix4x4 = *m;
        for i in 0..4 {
            let mut irow = 0;
            let mut icol = 0;
            let mut big: Float = 0.0;
            // choose pivot
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for (k, item) in ipiv.iter().enumerate() {
                        if *item == 0 {
                            let abs: Float = (minv.m[j][k]).abs();
                            if abs >= big {
                                big = abs;
                                irow = j;
                                icol = k;
                            }
                        } else if *item > 1 {
                            return None;
                        }
                    }
                }
            }
            ipiv[icol] += 1;
            // swap rows _irow_ and _icol_ for pivot
            if irow != icol {
                minv.m.swap(irow, icol);
            }
            indxr[i] = irow;
            indxc[i] = icol;
            if minv.m[icol][icol] == 0.0 {
                return None;
            }
            // set $m[icol][icol]$ to one by scaling row _icol_ appropriately
            let pivinv: Float = 1.0 / minv.m[icol][icol];
            minv.m[icol][icol] = 1.0;
            for j in 0..4 {
                minv.m[icol][j] *= pivinv;
            }
            // subtract this row from others to zero out their columns
            for j in 0..4 {
                if j != icol {
                    let save: Float = minv.m[j][icol];
                    minv.m[j][icol] = 0.0;
                    for k in 0..4 {
                        minv.m[j][k] -= minv.m[icol][k] * save;
                    }
                }
            }
        }
        // swap columns to reflect permutation
        for i in 0..4 {
            let j = 3 - i;
            if indxr[j] != indxc[j] {
                for k in 0..4 {
                    minv.m[k].swap(indxr[j], indxc[j])
                }
            }
        }
        Some(minv)
    }
}

impl PartialEq for Matrix4x4 {
    fn eq(&self, rhs: &Matrix4x4) -> bool {
        self.m == rhs.m
    }
}

/// The product of two matrices.
pub fn mtx_mul(m1: &Matrix4x4, m2: &Matrix4x4) -> Matrix4x4 {
    let mut r: Matrix4x4 = Matrix4x4::default();
    for i in 0..4 {
        for j in 0..4 {
            r.m[i][j] = m1.m[i][0] * m2.m[0][j]
                + m1.m[i][1] * m2.m[1][j]
                + m1.m[i][2] * m2.m[2][j]
                + m1.m[i][3] * m2.m[3][j];
        }
    }
    r
}

#[derive(Debug, Default, Copy, Clone)]
pub struct Transform {
    pub m: Matrix4x4,
    pub m_inv: Matrix4x4,
}

impl Transform {
    /// Wraps an invertible matrix, `None` if it is singular.
    pub fn from_matrix(m: Matrix4x4) -> Option<Transform> {
        Matrix4x4::inverse(&m).map(|m_inv| Transform { m, m_inv })
    }
    pub fn inverse(t: &Transform) -> Transform {
        Transform {
            m: t.m_inv,
            m_inv: t.m,
        }
    }
    pub fn is_identity(&self) -> bool {
        self.m == Matrix4x4::default()
    }
    pub fn translate(delta: &Vector3f) -> Transform {
        let mut m = Matrix4x4::default();
        let mut m_inv = Matrix4x4::default();
        for i in 0..3 {
            m.m[i][3] = delta[i];
            m_inv.m[i][3] = -delta[i];
        }
        Transform { m, m_inv }
    }
    pub fn scale(x: Float, y: Float, z: Float) -> Transform {
        let mut m = Matrix4x4::default();
        let mut m_inv = Matrix4x4::default();
        m.m[0][0] = x;
        m.m[1][1] = y;
        m.m[2][2] = z;
        m_inv.m[0][0] = 1.0 / x;
        m_inv.m[1][1] = 1.0 / y;
        m_inv.m[2][2] = 1.0 / z;
        Transform { m, m_inv }
    }
    pub fn rotate(theta: Float, axis: &Vector3f) -> Transform {
        let a: Vector3f = axis.normalize();
        let sin_theta: Float = radians(theta).sin();
        let cos_theta: Float = radians(theta).cos();
        let mut m = Matrix4x4::default();
        // compute rotation of first basis vector
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;
        // compute rotations of second basis vectors
        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;
        // compute rotations of third basis vectors
        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;
        Transform {
            m,
            m_inv: Matrix4x4::transpose(&m),
        }
    }
    /// Sensor-to-world placement. Returns the identity when `up` is
    /// parallel to the viewing direction.
    pub fn look_at(pos: &Point3f, look: &Point3f, up: &Vector3f) -> Transform {
        let mut to_world = Matrix4x4::default();
        // initialize fourth column of viewing matrix
        to_world.m[0][3] = pos.x;
        to_world.m[1][3] = pos.y;
        to_world.m[2][3] = pos.z;
        let dir: Vector3f = (*look - *pos).normalize();
        if vec3_cross_vec3(&up.normalize(), &dir).length() == 0.0 {
            log::warn!(
                "\"up\" vector ({}, {}, {}) and viewing direction ({}, {}, {}) are pointing in \
                 the same direction, using the identity transformation",
                up.x,
                up.y,
                up.z,
                dir.x,
                dir.y,
                dir.z
            );
            return Transform::default();
        }
        let left: Vector3f = vec3_cross_vec3(&up.normalize(), &dir).normalize();
        let new_up: Vector3f = vec3_cross_vec3(&dir, &left);
        for i in 0..3 {
            to_world.m[i][0] = left[i];
            to_world.m[i][1] = new_up[i];
            to_world.m[i][2] = dir[i];
        }
        Transform::from_matrix(to_world).unwrap_or_default()
    }
    /// Projective transform mapping sensor space to a screen window
    /// where the field of view spans `[-1, 1]`.
    pub fn perspective(fov: Float, n: Float, f: Float) -> Transform {
        let mut persp = Matrix4x4::default();
        persp.m[2][2] = f / (f - n);
        persp.m[2][3] = -f * n / (f - n);
        persp.m[3][2] = 1.0;
        persp.m[3][3] = 0.0;
        // scale canonical perspective view to specified field of view
        let inv_tan_ang: Float = 1.0 / (radians(fov) / 2.0).tan();
        let scale: Transform = Transform::scale(inv_tan_ang, inv_tan_ang, 1.0);
        let persp_trans: Transform = Transform {
            m: persp,
            m_inv: Matrix4x4::inverse(&persp).unwrap_or_default(),
        };
        scale * persp_trans
    }
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let x: Float = p.x;
        let y: Float = p.y;
        let z: Float = p.z;
        let xp: Float =
            self.m.m[0][0] * x + self.m.m[0][1] * y + self.m.m[0][2] * z + self.m.m[0][3];
        let yp: Float =
            self.m.m[1][0] * x + self.m.m[1][1] * y + self.m.m[1][2] * z + self.m.m[1][3];
        let zp: Float =
            self.m.m[2][0] * x + self.m.m[2][1] * y + self.m.m[2][2] * z + self.m.m[2][3];
        let wp: Float =
            self.m.m[3][0] * x + self.m.m[3][1] * y + self.m.m[3][2] * z + self.m.m[3][3];
        if wp == 1.0 as Float {
            Point3f {
                x: xp,
                y: yp,
                z: zp,
            }
        } else {
            let inv: Float = 1.0 as Float / wp;
            Point3f {
                x: inv * xp,
                y: inv * yp,
                z: inv * zp,
            }
        }
    }
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let x: Float = v.x;
        let y: Float = v.y;
        let z: Float = v.z;
        Vector3f {
            x: self.m.m[0][0] * x + self.m.m[0][1] * y + self.m.m[0][2] * z,
            y: self.m.m[1][0] * x + self.m.m[1][1] * y + self.m.m[1][2] * z,
            z: self.m.m[2][0] * x + self.m.m[2][1] * y + self.m.m[2][2] * z,
        }
    }
}

impl PartialEq for Transform {
    fn eq(&self, rhs: &Transform) -> bool {
        rhs.m == self.m && rhs.m_inv == self.m_inv
    }
}

impl Mul for Transform {
    type Output = Transform;
    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            m: mtx_mul(&self.m, &rhs.m),
            m_inv: mtx_mul(&rhs.m_inv, &self.m_inv),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn translation_moves_points_not_vectors() {
        let t = Transform::translate(&Vector3f::new(2.0, -6.0, 4.5));
        let p = t.transform_point(&Point3f::default());
        assert_eq!(p, Point3f::new(2.0, -6.0, 4.5));
        let v = t.transform_vector(&Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(v, Vector3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn inverse_of_scale_round_trips() {
        let t = Transform::scale(2.0, 4.0, 8.0);
        let m_inv = Matrix4x4::inverse(&t.m).unwrap();
        assert_eq!(m_inv, t.m_inv);
        let singular = Matrix4x4 { m: [[0.0; 4]; 4] };
        assert!(Matrix4x4::inverse(&singular).is_none());
    }

    #[test]
    fn look_at_places_the_origin() {
        let t = Transform::look_at(
            &Point3f::new(0.0, 0.0, 4.0),
            &Point3f::new(0.0, 0.0, 0.0),
            &Vector3f::new(0.0, 1.0, 0.0),
        );
        let o = t.transform_point(&Point3f::default());
        assert_eq!(o, Point3f::new(0.0, 0.0, 4.0));
        let d = t.transform_vector(&Vector3f::new(0.0, 0.0, 1.0));
        assert!((d.z + 1.0).abs() < 1.0e-6);
    }
}
