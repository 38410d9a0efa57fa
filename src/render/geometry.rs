// SPDX-License-Identifier: GPL-3.0-only

//! Orientation geometry tables
//!
//! One data table per [`Orientation`], generated from a single corner cycle
//! rather than five hand-authored arrays. The quad is drawn as a 4-vertex
//! triangle strip; texcoords are assigned per screen corner.

use crate::controls::Orientation;

/// One quad vertex: clip-space position plus texture coordinate
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Clip-space position
    pub position: [f32; 2],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

/// Screen-corner positions in triangle-strip order:
/// bottom-left, bottom-right, top-left, top-right.
const STRIP_POSITIONS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

/// Identity texcoord assignment, clockwise from the bottom-left corner:
/// bottom-left, top-left, top-right, bottom-right.
const IDENTITY_CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

/// Texcoords at the four screen corners for an orientation, clockwise from
/// bottom-left.
fn corner_texcoords(orientation: Orientation) -> [[f32; 2]; 4] {
    match orientation {
        Orientation::Normal => IDENTITY_CORNERS,
        Orientation::FlippedVertical => IDENTITY_CORNERS.map(|[u, v]| [u, 1.0 - v]),
        Orientation::Rotated90 => cycled(1),
        Orientation::Rotated180 => cycled(2),
        Orientation::Rotated270 => cycled(3),
    }
}

/// Cycle the identity corner assignment clockwise by `steps`
fn cycled(steps: usize) -> [[f32; 2]; 4] {
    let mut out = IDENTITY_CORNERS;
    out.rotate_right(steps);
    out
}

/// The vertex/texcoord table for an orientation, in triangle-strip order
///
/// Pure lookup: identical input yields an identical table.
pub fn vertices_for(orientation: Orientation) -> [Vertex; 4] {
    let [bl, tl, tr, br] = corner_texcoords(orientation);
    // Reorder clockwise corners into strip order
    let strip_texcoords = [bl, br, tl, tr];
    let mut vertices = [Vertex {
        position: [0.0; 2],
        tex_coord: [0.0; 2],
    }; 4];
    for (i, vertex) in vertices.iter_mut().enumerate() {
        vertex.position = STRIP_POSITIONS[i];
        vertex.tex_coord = strip_texcoords[i];
    }
    vertices
}
