//! Triangle meshes for the model preview.
//!
//! TripoSR writes Wavefront OBJ with per-vertex colours and Z pointing up.
//! The preview only needs positions, colours and normals, so the parser
//! reads `v` and `f` records and skips everything else.

use std::path::Path;

use glam::{Mat3, Vec3};
use shared::{Result, StudioError};

/// Colour used when the file carries no vertex colours.
const DEFAULT_COLOR: Vec3 = Vec3::new(0.72, 0.72, 0.75);
/// Largest side of the fitted model, in world units.
pub const FIT_SIZE: f32 = 1.5;
/// Height of the ground the fitted model stands on.
pub const FLOOR_Y: f32 = -0.6;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices
            .chunks_exact(9)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.positions().fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
    }

    /// Stand the model up (Z-up to Y-up), scale its largest side to
    /// `FIT_SIZE`, centre it horizontally and put its lowest point on the
    /// floor.
    pub fn fit_to_view(&mut self) {
        let rotation = Mat3::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        for v in self.vertices.chunks_exact_mut(9) {
            let p = rotation * Vec3::new(v[0], v[1], v[2]);
            let n = rotation * Vec3::new(v[3], v[4], v[5]);
            v[..3].copy_from_slice(&p.to_array());
            v[3..6].copy_from_slice(&n.to_array());
        }

        let Some((lo, hi)) = self.bounds() else {
            return;
        };
        let size = hi - lo;
        let max_dim = size.max_element();
        let scale = if max_dim > 0.0 { FIT_SIZE / max_dim } else { 1.0 };
        let centre = (lo + hi) * 0.5;
        let offset = Vec3::new(-centre.x * scale, FLOOR_Y - lo.y * scale, -centre.z * scale);

        for v in self.vertices.chunks_exact_mut(9) {
            let p = Vec3::new(v[0], v[1], v[2]) * scale + offset;
            v[..3].copy_from_slice(&p.to_array());
        }
    }
}

fn parse_floats<'a>(fields: impl Iterator<Item = &'a str>, line: usize) -> Result<Vec<f32>> {
    fields
        .map(|f| {
            f.parse::<f32>()
                .map_err(|_| StudioError::Decode(format!("line {line}: bad number `{f}`")))
        })
        .collect()
}

/// Resolve a 1-based (or negative, relative) OBJ index.
fn vertex_index(token: &str, count: usize, line: usize) -> Result<usize> {
    let raw = token.split('/').next().unwrap_or_default();
    let idx: i64 = raw
        .parse()
        .map_err(|_| StudioError::Decode(format!("line {line}: bad index `{token}`")))?;
    let resolved = if idx < 0 { count as i64 + idx } else { idx - 1 };
    if resolved < 0 || resolved >= count as i64 {
        return Err(StudioError::Decode(format!(
            "line {line}: index {idx} out of range"
        )));
    }
    Ok(resolved as usize)
}

/// Parse OBJ text into a flat-shaded triangle mesh.
pub fn parse_obj(text: &str) -> Result<MeshData> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut colors: Vec<Vec3> = Vec::new();
    let mut mesh = MeshData {
        vertices: Vec::new(),
        indices: Vec::new(),
    };

    for (n, line) in text.lines().enumerate() {
        let line_no = n + 1;
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") => {
                let values = parse_floats(fields, line_no)?;
                if values.len() < 3 {
                    return Err(StudioError::Decode(format!(
                        "line {line_no}: vertex needs 3 coordinates"
                    )));
                }
                positions.push(Vec3::new(values[0], values[1], values[2]));
                colors.push(if values.len() >= 6 {
                    Vec3::new(values[3], values[4], values[5])
                } else {
                    DEFAULT_COLOR
                });
            }
            Some("f") => {
                let corners = fields
                    .map(|t| vertex_index(t, positions.len(), line_no))
                    .collect::<Result<Vec<_>>>()?;
                // fan triangulation for quads and larger polygons
                for i in 1..corners.len().saturating_sub(1) {
                    push_triangle(
                        &mut mesh,
                        [corners[0], corners[i], corners[i + 1]],
                        &positions,
                        &colors,
                    );
                }
            }
            _ => {}
        }
    }

    if mesh.indices.is_empty() {
        return Err(StudioError::Decode("mesh has no faces".into()));
    }
    Ok(mesh)
}

fn push_triangle(mesh: &mut MeshData, tri: [usize; 3], positions: &[Vec3], colors: &[Vec3]) {
    let [a, b, c] = tri.map(|i| positions[i]);
    let normal = (b - a).cross(c - a).normalize_or_zero();
    for i in tri {
        let base = mesh.vertex_count() as u32;
        let p = positions[i];
        let col = colors[i];
        mesh.vertices.extend_from_slice(&[
            p.x, p.y, p.z, normal.x, normal.y, normal.z, col.x, col.y, col.z,
        ]);
        mesh.indices.push(base);
    }
}

/// Load a reconstruction for the preview, already fitted to the view.
pub fn load_preview(path: &Path) -> Result<MeshData> {
    let is_obj = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
    if !is_obj {
        return Err(StudioError::UnsupportedFormat(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| StudioError::io(path, e))?;
    let mut mesh = parse_obj(&text)?;
    mesh.fit_to_view();
    tracing::info!(
        "preview mesh {}: {} triangles",
        path.display(),
        mesh.triangle_count()
    );
    Ok(mesh)
}
