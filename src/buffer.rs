use std::{ops::Range, path::Path};

use glium::{vertex::VertexBufferSlice, Display, VertexBuffer};
use glutin::surface::WindowSurface;
use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    load::{load_geometry, MeshId, SceneManifest, SceneVertex},
    texture::Material,
};

/// Position-only vertex for the grid, the axes and the skybox cube
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineVertex {
    pub position: [f32; 3],
}

glium::implement_vertex!(LineVertex, position);

pub fn line_vertices(points: &[[f32; 3]]) -> Vec<LineVertex> {
    points.iter().map(|&position| LineVertex { position }).collect()
}

/// Where each animation frame of a mesh starts and how many vertices it has, for frames packed
/// back to back into one buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameTable {
    offsets: Vec<usize>,
    counts: Vec<usize>,
}

impl FrameTable {
    pub fn from_counts(counts: impl IntoIterator<Item = usize>) -> Self {
        let counts: Vec<usize> = counts.into_iter().collect();
        let offsets = counts
            .iter()
            .scan(0, |start, count| {
                let offset = *start;
                *start += count;
                Some(offset)
            })
            .collect();
        Self { offsets, counts }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[cfg(test)]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Vertex range of frame `cursor`, wrapping past the last frame.
    pub fn range(&self, cursor: usize) -> Range<usize> {
        if self.counts.is_empty() {
            return 0..0;
        }
        let frame = cursor % self.counts.len();
        self.offsets[frame]..self.offsets[frame] + self.counts[frame]
    }
}

/// All frames of one mesh in a single vertex buffer.
pub struct MeshBuffer {
    vertices: VertexBuffer<SceneVertex>,
    frames: FrameTable,
}

impl MeshBuffer {
    pub fn new(display: &Display<WindowSurface>, frames: &[Vec<SceneVertex>]) -> Result<Self> {
        let table = FrameTable::from_counts(frames.iter().map(Vec::len));
        let packed: Vec<SceneVertex> = frames.concat();
        Ok(Self {
            vertices: VertexBuffer::new(display, &packed)?,
            frames: table,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, cursor: usize) -> Option<VertexBufferSlice<'_, SceneVertex>> {
        self.vertices.slice(self.frames.range(cursor))
    }
}

/// The meshes indexed by [`MeshId`].
pub struct MeshSet {
    meshes: Vec<MeshBuffer>,
}

impl MeshSet {
    pub fn new(meshes: Vec<MeshBuffer>) -> Result<Self> {
        if meshes.len() != MeshId::ALL.len() {
            return Err(Error::Unsupported(format!(
                "expected {} meshes, got {}",
                MeshId::ALL.len(),
                meshes.len()
            )));
        }
        Ok(Self { meshes })
    }

    pub fn get(&self, mesh: MeshId) -> &MeshBuffer {
        &self.meshes[mesh.index()]
    }
}

/// One material chunk of the exterior environment.
pub struct ExteriorChunk {
    pub vertices: VertexBuffer<SceneVertex>,
    pub material: Material,
}

pub fn load_exterior(
    display: &Display<WindowSurface>,
    manifest: &SceneManifest,
    root: &Path,
) -> Result<Vec<ExteriorChunk>> {
    let geometry = manifest
        .materials
        .par_iter()
        .map(|entry| load_geometry(&root.join(&entry.geometry)))
        .collect::<Result<Vec<_>>>()?;

    manifest
        .materials
        .iter()
        .zip(geometry)
        .map(|(entry, vertices)| {
            Ok(ExteriorChunk {
                vertices: VertexBuffer::new(display, &vertices)?,
                material: entry.material,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_pack_back_to_back() {
        let table = FrameTable::from_counts([30, 27, 33]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.total(), 90);
        assert_eq!(table.range(0), 0..30);
        assert_eq!(table.range(1), 30..57);
        assert_eq!(table.range(2), 57..90);
    }

    #[test]
    fn cursor_wraps_around() {
        let table = FrameTable::from_counts([3, 6]);
        assert_eq!(table.range(2), table.range(0));
        assert_eq!(table.range(5), 3..9);
    }

    #[test]
    fn empty_frames_select_nothing() {
        assert_eq!(FrameTable::default().range(4), 0..0);
        let table = FrameTable::from_counts([0, 6]);
        assert!(table.range(0).is_empty());
    }

    #[test]
    fn line_vertices_keep_order() {
        let vertices = line_vertices(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(vertices[1].position, [4.0, 5.0, 6.0]);
    }
}
