// rs_scene
use crate::core::base::Float;
use crate::core::error::SceneError;
use crate::core::geometry::{
    bnd3_union_pnt3f, vec3_cross_vec3, vec3_dot_vec3f, Bounds3f, Normal3f, Point2f, Point3f,
    Ray, Vector3f,
};
use crate::core::object::{Category, ObjectBase, PluginObject, SceneObject};
use crate::core::parameters::{ParamFlags, ParameterRef, TraversalCallback};
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::shape::{PositionSample, Shape, ShapeBase, SurfaceInteraction};

/// Triangles sharing one vertex buffer. Positions are kept in world
/// space as a flat `x, y, z, x, y, z, ...` array, which is what
/// traversal exposes as `vertex_positions`.
pub struct TriangleMesh {
    pub base: ShapeBase,
    pub vertex_positions: Vec<Float>,
    pub faces: Vec<u32>,
    /// Two values per vertex, may be empty.
    pub vertex_texcoords: Vec<Float>,
    // derived
    area: Float,
    area_cdf: Vec<Float>,
    bbox: Bounds3f,
}

impl TriangleMesh {
    /// Validates the buffers and moves the vertices to world space.
    pub fn new(
        base: ShapeBase,
        mut vertex_positions: Vec<Float>,
        faces: Vec<u32>,
        vertex_texcoords: Vec<Float>,
    ) -> Result<Self, SceneError> {
        let name = base.object.plugin_name.clone();
        if vertex_positions.len() % 3 != 0 || faces.len() % 3 != 0 {
            return Err(SceneError::construction(
                &name,
                "vertex positions and faces must come in triples",
            ));
        }
        let vertex_count = vertex_positions.len() / 3;
        if faces.is_empty() {
            return Err(SceneError::construction(&name, "mesh has no faces"));
        }
        if let Some(index) = faces.iter().find(|i| **i as usize >= vertex_count) {
            return Err(SceneError::construction(
                &name,
                format!(
                    "face references vertex {} of a mesh with {} vertices",
                    index, vertex_count
                ),
            ));
        }
        if !vertex_texcoords.is_empty() && vertex_texcoords.len() != 2 * vertex_count {
            return Err(SceneError::construction(
                &name,
                "texture coordinates must be given for every vertex",
            ));
        }
        if !base.to_world.is_identity() {
            for p in vertex_positions.chunks_mut(3) {
                let q = base.to_world.transform_point(&Point3f::new(p[0], p[1], p[2]));
                p.copy_from_slice(&[q.x, q.y, q.z]);
            }
        }
        let mut mesh = TriangleMesh {
            base,
            vertex_positions,
            faces,
            vertex_texcoords,
            area: 0.0,
            area_cdf: Vec::new(),
            bbox: Bounds3f::default(),
        };
        mesh.recompute();
        Ok(mesh)
    }
    pub fn vertex_count(&self) -> usize {
        self.vertex_positions.len() / 3
    }
    pub fn face_count(&self) -> usize {
        self.faces.len() / 3
    }
    pub fn vertex(&self, index: u32) -> Point3f {
        let i = index as usize * 3;
        Point3f::new(
            self.vertex_positions[i],
            self.vertex_positions[i + 1],
            self.vertex_positions[i + 2],
        )
    }
    fn face_vertices(&self, face: usize) -> (Point3f, Point3f, Point3f) {
        (
            self.vertex(self.faces[3 * face]),
            self.vertex(self.faces[3 * face + 1]),
            self.vertex(self.faces[3 * face + 2]),
        )
    }
    fn face_uv(&self, face: usize, b1: Float, b2: Float) -> Point2f {
        if self.vertex_texcoords.is_empty() {
            return Point2f { x: b1, y: b2 };
        }
        let b0: Float = 1.0 - b1 - b2;
        let mut uv = Point2f::default();
        for (k, b) in [b0, b1, b2].iter().enumerate() {
            let i = self.faces[3 * face + k] as usize * 2;
            uv.x += b * self.vertex_texcoords[i];
            uv.y += b * self.vertex_texcoords[i + 1];
        }
        uv
    }
    fn face_normal(&self, face: usize) -> Vector3f {
        let (p0, p1, p2) = self.face_vertices(face);
        vec3_cross_vec3(&(p1 - p0), &(p2 - p0))
    }
    /// Area table and bounds from the current vertex positions.
    fn recompute(&mut self) {
        self.area_cdf.clear();
        let mut sum: Float = 0.0;
        for face in 0..self.face_count() {
            sum += 0.5 * self.face_normal(face).length();
            self.area_cdf.push(sum);
        }
        self.area = sum;
        self.bbox = (0..self.vertex_count())
            .fold(Bounds3f::default(), |b, i| bnd3_union_pnt3f(&b, &self.vertex(i as u32)));
    }
}

impl SceneObject for TriangleMesh {
    fn base(&self) -> &ObjectBase {
        &self.base.object
    }
    fn category(&self) -> Category {
        Category::Shape
    }
    fn traverse(&mut self, callback: &mut dyn TraversalCallback) {
        callback.put_parameter(
            "vertex_positions",
            ParameterRef::Floats(&mut self.vertex_positions),
            ParamFlags::Discontinuous as u8,
        );
        if !self.vertex_texcoords.is_empty() {
            callback.put_parameter(
                "vertex_texcoords",
                ParameterRef::Floats(&mut self.vertex_texcoords),
                ParamFlags::Differentiable as u8,
            );
        }
        self.base.traverse_children(callback);
    }
    fn parameters_changed(&mut self, keys: &[String]) -> Result<(), SceneError> {
        if keys.iter().any(|k| k == "vertex_positions") {
            self.recompute();
            let summary = self.summary();
            self.base.notify_emitter(&summary);
        }
        Ok(())
    }
}

impl Shape for TriangleMesh {
    fn bbox(&self) -> Bounds3f {
        self.bbox
    }
    fn surface_area(&self) -> Float {
        self.area
    }
    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let mut t_max: Float = ray.t_max;
        let mut hit: Option<(usize, Float, Float, Float)> = None;
        for face in 0..self.face_count() {
            // Moller-Trumbore
            let (p0, p1, p2) = self.face_vertices(face);
            let e1: Vector3f = p1 - p0;
            let e2: Vector3f = p2 - p0;
            let pvec: Vector3f = vec3_cross_vec3(&ray.d, &e2);
            let det: Float = vec3_dot_vec3f(&e1, &pvec);
            if det.abs() < 1.0e-12 {
                continue;
            }
            let inv_det: Float = 1.0 / det;
            let tvec: Vector3f = ray.o - p0;
            let b1: Float = vec3_dot_vec3f(&tvec, &pvec) * inv_det;
            if b1 < 0.0 || b1 > 1.0 {
                continue;
            }
            let qvec: Vector3f = vec3_cross_vec3(&tvec, &e1);
            let b2: Float = vec3_dot_vec3f(&ray.d, &qvec) * inv_det;
            if b2 < 0.0 || b1 + b2 > 1.0 {
                continue;
            }
            let t: Float = vec3_dot_vec3f(&e2, &qvec) * inv_det;
            if t > 0.0 && t < t_max {
                t_max = t;
                hit = Some((face, t, b1, b2));
            }
        }
        hit.map(|(face, t, b1, b2)| SurfaceInteraction {
            t,
            p: ray.position(t),
            n: Normal3f::from(self.face_normal(face).normalize()),
            uv: self.face_uv(face, b1, b2),
        })
    }
    fn sample_position(&self, u: &Point2f) -> PositionSample {
        let target: Float = u.x * self.area;
        let face = self
            .area_cdf
            .iter()
            .position(|c| *c >= target)
            .unwrap_or(self.area_cdf.len() - 1);
        let lower: Float = if face == 0 { 0.0 } else { self.area_cdf[face - 1] };
        let width: Float = self.area_cdf[face] - lower;
        // reuse the first dimension inside the chosen triangle
        let ux: Float = if width > 0.0 {
            ((target - lower) / width).max(0.0).min(1.0)
        } else {
            0.5
        };
        let su0: Float = ux.sqrt();
        let b1: Float = 1.0 - su0;
        let b2: Float = u.y * su0;
        let (p0, p1, p2) = self.face_vertices(face);
        PositionSample {
            p: p0 + (p1 - p0) * b1 + (p2 - p0) * b2,
            n: Normal3f::from(self.face_normal(face).normalize()),
            uv: self.face_uv(face, b1, b2),
            pdf: if self.area > 0.0 { 1.0 / self.area } else { 0.0 },
        }
    }
    fn shape_base(&self) -> &ShapeBase {
        &self.base
    }
}

/// Finishes a mesh factory: attaches the area emitter.
pub fn publish(mut mesh: TriangleMesh) -> Result<PluginObject, SceneError> {
    let summary = mesh.summary();
    mesh.base.attach_emitter(&summary)?;
    Ok(PluginObject::Shape(Box::new(mesh)))
}

/// Mesh given inline by `vertex_positions`, `faces` and optional
/// `vertex_texcoords`.
pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let base = ShapeBase::new(props, manager)?;
    let vertex_positions: Vec<Float> = props.get("vertex_positions")?;
    let faces: Vec<i64> = props.get("faces")?;
    let vertex_texcoords: Vec<Float> = props.get_or("vertex_texcoords", Vec::new())?;
    if faces.iter().any(|i| *i < 0 || *i > u32::MAX as i64) {
        return Err(SceneError::construction(
            "mesh",
            "face indices must be non-negative 32 bit values",
        ));
    }
    let faces: Vec<u32> = faces.iter().map(|i| *i as u32).collect();
    publish(TriangleMesh::new(
        base,
        vertex_positions,
        faces,
        vertex_texcoords,
    )?)
}

/// The square `[-1, 1] x [-1, 1]` in the `z = 0` plane, facing `+z`.
pub fn create_rectangle(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let base = ShapeBase::new(props, manager)?;
    let positions: Vec<Float> = vec![
        -1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0, 1.0, 0.0, -1.0, 1.0, 0.0,
    ];
    let texcoords: Vec<Float> = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    publish(TriangleMesh::new(
        base,
        positions,
        vec![0, 1, 2, 2, 3, 0],
        texcoords,
    )?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::api::register_builtin_plugins;
    use crate::core::parameters::traverse;
    use crate::core::properties::PropertyValue;
    use crate::core::registry::Registry;
    use crate::core::scene::Scene;
    use crate::core::transform::Transform;

    fn manager() -> PluginManager {
        let mut registry = Registry::new();
        register_builtin_plugins(&mut registry).unwrap();
        PluginManager::new(registry)
    }

    #[test]
    fn rectangle_is_hit_inside_only() {
        let mut manager = manager();
        let mut props = Properties::new("rectangle");
        props
            .set("to_world", Transform::translate(&Vector3f::new(0.0, 0.0, 2.0)))
            .unwrap();
        let shape = manager
            .create_object(props, Category::Shape)
            .unwrap()
            .into_shape()
            .unwrap();
        assert!((shape.surface_area() - 4.0).abs() < 1.0e-5);
        let ray = Ray::new(Point3f::new(0.5, 0.25, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let si = shape.intersect(&ray).unwrap();
        assert!((si.t - 2.0).abs() < 1.0e-5);
        assert!((si.uv.x - 0.75).abs() < 1.0e-5);
        assert!((si.n.z - 1.0).abs() < 1.0e-5);
        let outside = Ray::new(Point3f::new(1.5, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(shape.intersect(&outside).is_none());
    }

    #[test]
    fn inline_mesh_validation() {
        let mut manager = manager();
        let mut props = Properties::new("mesh");
        props
            .set("vertex_positions", vec![0.0 as Float, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
            .unwrap();
        props.set("faces", vec![0_i64, 1, 3]).unwrap();
        assert!(manager.create_object(props, Category::Shape).is_err());
    }

    #[test]
    fn moving_vertices_updates_derived_state() {
        let mut manager = manager();
        let mut props = Properties::new("rectangle");
        props.set_id("light_shape");
        let shape = manager
            .create_object(props, Category::Shape)
            .unwrap()
            .into_shape()
            .unwrap();
        let mut scene = Scene::new(manager.variant());
        scene.add_shape(shape);
        let mut params = traverse(&mut scene);
        let moved: Vec<Float> = match params.get("light_shape.vertex_positions").unwrap() {
            PropertyValue::Floats(v) => v
                .iter()
                .enumerate()
                .map(|(i, x)| if i % 3 == 2 { x + 1.0 } else { *x })
                .collect(),
            other => panic!("unexpected {:?}", other),
        };
        params
            .set("light_shape.vertex_positions", PropertyValue::Floats(moved.clone()))
            .unwrap();
        params.update(&mut scene).unwrap();
        assert!((scene.shapes()[0].bbox().p_min.z - 1.0).abs() < 1.0e-6);
        assert!((scene.bbox().p_max.z - 1.0).abs() < 1.0e-6);
        let params = traverse(&mut scene);
        assert_eq!(
            params.get("light_shape.vertex_positions").unwrap(),
            &PropertyValue::Floats(moved)
        );
    }
}
