//! Mesh collision geometry
//!
//! Builds a flat local-space triangle list from the mesh collaborator's
//! interleaved vertex/index buffers. The cache is built once per source
//! mesh and replaced atomically on refresh; it is never mutated while a
//! query is in flight.

use log::warn;

use crate::foundation::math::Vec3;
use super::primitives::{Aabb, Triangle, GEOM_EPSILON};

/// Errors from triangle-cache construction
#[derive(thiserror::Error, Debug)]
pub enum MeshError {
    /// Vertex stride too small to hold a position at the given offset
    #[error("vertex stride {stride} cannot hold a position at offset {offset}")]
    BadStride {
        /// Stride between vertices, in floats
        stride: usize,
        /// Offset of the position attribute, in floats
        offset: usize,
    },

    /// Vertex buffer length is not a multiple of the stride
    #[error("vertex buffer length {len} is not a multiple of stride {stride}")]
    TruncatedVertexData {
        /// Buffer length in floats
        len: usize,
        /// Stride between vertices, in floats
        stride: usize,
    },

    /// An index referenced a vertex past the end of the buffer
    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        /// The offending index value
        index: u32,
        /// Number of vertices in the submesh
        vertex_count: usize,
    },
}

/// Read-only view of one submesh's interleaved vertex and index data
///
/// Positions are extracted by `stride`/`position_offset` (both counted in
/// floats), so the same buffer that feeds the renderer can feed collision
/// without repacking.
#[derive(Debug, Clone, Copy)]
pub struct MeshData<'a> {
    /// Interleaved per-vertex attributes
    pub vertices: &'a [f32],
    /// Floats between the start of consecutive vertices
    pub stride: usize,
    /// Float offset of the position attribute within a vertex
    pub position_offset: usize,
    /// Triangle list indices into this submesh's vertices
    pub indices: &'a [u32],
}

/// A collision mesh cache stored in local (model) space
///
/// Triangles are never modified after construction; `rebuild` installs a
/// freshly built list, discarding the old one in one move.
#[derive(Debug, Clone)]
pub struct TriangleCache {
    triangles: Vec<Triangle>,
    local_bounds: Aabb,
}

impl TriangleCache {
    /// Build a cache from one or more submesh views
    ///
    /// Degenerate (zero-area) triangles are skipped. A mesh that yields
    /// no triangles at all is accepted with a warning; raycasts against
    /// it simply never hit.
    pub fn from_submeshes(submeshes: &[MeshData<'_>]) -> Result<Self, MeshError> {
        let mut triangles = Vec::new();

        for submesh in submeshes {
            if submesh.stride == 0 || submesh.position_offset + 3 > submesh.stride {
                return Err(MeshError::BadStride {
                    stride: submesh.stride,
                    offset: submesh.position_offset,
                });
            }
            if submesh.vertices.len() % submesh.stride != 0 {
                return Err(MeshError::TruncatedVertexData {
                    len: submesh.vertices.len(),
                    stride: submesh.stride,
                });
            }
            let vertex_count = submesh.vertices.len() / submesh.stride;

            let position = |index: u32| -> Result<Vec3, MeshError> {
                let i = index as usize;
                if i >= vertex_count {
                    return Err(MeshError::IndexOutOfBounds { index, vertex_count });
                }
                let base = i * submesh.stride + submesh.position_offset;
                Ok(Vec3::new(
                    submesh.vertices[base],
                    submesh.vertices[base + 1],
                    submesh.vertices[base + 2],
                ))
            };

            for chunk in submesh.indices.chunks(3) {
                if chunk.len() != 3 {
                    continue; // Trailing partial triangle
                }
                let triangle = Triangle::new(
                    position(chunk[0])?,
                    position(chunk[1])?,
                    position(chunk[2])?,
                );
                if triangle.normal().magnitude_squared() < GEOM_EPSILON {
                    continue; // Zero-area
                }
                triangles.push(triangle);
            }
        }

        if triangles.is_empty() {
            warn!("collision mesh built with zero triangles; raycasts against it will never hit");
        }

        let local_bounds = bounds_of(&triangles);
        Ok(Self { triangles, local_bounds })
    }

    /// The cached local-space triangles
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Local-space bounds of all cached triangles
    ///
    /// An empty cache reports a degenerate bound at the origin.
    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    /// Number of cached triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when the cache holds no usable geometry
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

fn bounds_of(triangles: &[Triangle]) -> Aabb {
    let mut min = Vec3::from_element(f32::MAX);
    let mut max = Vec3::from_element(f32::MIN);
    for triangle in triangles {
        for vertex in [triangle.v0, triangle.v1, triangle.v2] {
            min = min.inf(&vertex);
            max = max.sup(&vertex);
        }
    }
    if triangles.is_empty() {
        return Aabb::new(Vec3::zeros(), Vec3::zeros());
    }
    Aabb::new(min, max)
}
