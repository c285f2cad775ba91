//! Custom mesh builders for shells, bands, rings, guides and point clouds.

use std::f32::consts::TAU;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, Mesh, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;

/// Segments used for every orbit guide.
pub const ORBIT_SEGMENTS: usize = 512;

/// Sphere seen from the inside: winding and normals flipped.
pub fn inverted_sphere(radius: f32, sectors: u32, stacks: u32) -> Result<Mesh, String> {
    let mut mesh = Sphere::new(radius).mesh().uv(sectors, stacks);
    mesh.invert_winding().map_err(|e| e.to_string())?;
    if let Some(VertexAttributeValues::Float32x3(normals)) = mesh.attribute_mut(Mesh::ATTRIBUTE_NORMAL) {
        for n in normals.iter_mut() {
            *n = [-n[0], -n[1], -n[2]];
        }
    }
    Ok(mesh)
}

/// Open band between two horizontal circles centered on the Y axis.
///
/// `u` runs around the band, `v` from bottom to top edge.
pub fn open_band(bottom_radius: f32, top_radius: f32, height: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = (bottom_radius - top_radius) / height.max(f32::EPSILON);

    let mut positions = Vec::with_capacity(((segments + 1) * 2) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut uvs = Vec::with_capacity(positions.capacity());

    for i in 0..=segments {
        let u = i as f32 / segments as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        let normal = Vec3::new(cos, slope, sin).normalize().to_array();
        for (radius, y, v) in [(bottom_radius, -half, 0.0), (top_radius, half, 1.0)] {
            positions.push([cos * radius, y, sin * radius]);
            normals.push(normal);
            uvs.push([u, v]);
        }
    }

    let mut indices = Vec::with_capacity((segments * 6) as usize);
    for i in 0..segments {
        let b0 = i * 2;
        let t0 = b0 + 1;
        let b1 = b0 + 2;
        let t1 = b0 + 3;
        indices.extend_from_slice(&[b0, t0, b1, b1, t0, t1]);
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

/// Flat ring in the XZ plane with radial `u` (0 inner, 1 outer) so banded
/// textures form concentric gaps.
pub fn ring_disc(inner: f32, outer: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let mut positions = Vec::new();
    let mut uvs = Vec::new();

    for i in 0..=segments {
        let v = i as f32 / segments as f32;
        let (sin, cos) = (v * TAU).sin_cos();
        positions.push([cos * inner, 0.0, sin * inner]);
        uvs.push([0.0, v]);
        positions.push([cos * outer, 0.0, sin * outer]);
        uvs.push([1.0, v]);
    }
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    let mut indices = Vec::with_capacity((segments * 6) as usize);
    for i in 0..segments {
        let i0 = i * 2;
        let o0 = i0 + 1;
        let i1 = i0 + 2;
        let o1 = i0 + 3;
        indices.extend_from_slice(&[i0, i1, o0, o0, i1, o1]);
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

/// Points sampled on a closed ellipse in the XZ plane; the last point
/// repeats the first.
pub fn ellipse_points(semi_major: f32, semi_minor: f32, segments: usize) -> Vec<[f32; 3]> {
    (0..=segments)
        .map(|i| {
            let angle = (i % segments.max(1)) as f32 / segments.max(1) as f32 * TAU;
            [angle.cos() * semi_major, 0.0, angle.sin() * semi_minor]
        })
        .collect()
}

/// Closed line strip through `points`.
pub fn line_loop(points: Vec<[f32; 3]>) -> Mesh {
    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, points)
}

/// Point cloud whose positions and colors are rewritten every frame.
pub fn point_cloud(positions: Vec<[f32; 3]>, colors: Vec<[f32; 4]>) -> Mesh {
    Mesh::new(
        PrimitiveTopology::PointList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
}

/// Overwrite a point cloud's positions and colors in place.
pub fn write_point_cloud(mesh: &mut Mesh, positions: Vec<[f32; 3]>, colors: Vec<[f32; 4]>) {
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_sphere_normals_point_inward() {
        let mesh = inverted_sphere(10.0, 16, 8).expect("triangle list");
        let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION) else {
            panic!("positions");
        };
        let Some(VertexAttributeValues::Float32x3(normals)) = mesh.attribute(Mesh::ATTRIBUTE_NORMAL) else {
            panic!("normals");
        };
        for (p, n) in positions.iter().zip(normals) {
            assert!(Vec3::from(*p).dot(Vec3::from(*n)) <= 1e-3);
        }
    }

    #[test]
    fn orbit_guide_is_closed() {
        let points = ellipse_points(85.0, 85.0, ORBIT_SEGMENTS);
        assert_eq!(points.len(), ORBIT_SEGMENTS + 1);
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn ring_disc_spans_inner_to_outer() {
        let mesh = ring_disc(35.0, 80.0, 64);
        let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION) else {
            panic!("positions");
        };
        for p in positions {
            let r = Vec2::new(p[0], p[2]).length();
            assert!((34.99..=80.01).contains(&r));
            assert_eq!(p[1], 0.0);
        }
        assert_eq!(mesh.indices().map(|i| i.len()), Some(64 * 6));
    }

    #[test]
    fn band_has_two_rings_of_vertices() {
        let mesh = open_band(11.0, 8.0, 4.0, 32);
        assert_eq!(mesh.count_vertices(), 33 * 2);
    }

    #[test]
    fn point_cloud_rewrite_keeps_count() {
        let mut mesh = point_cloud(vec![[0.0; 3]; 10], vec![[1.0; 4]; 10]);
        write_point_cloud(&mut mesh, vec![[1.0; 3]; 10], vec![[0.5; 4]; 10]);
        assert_eq!(mesh.count_vertices(), 10);
    }
}
