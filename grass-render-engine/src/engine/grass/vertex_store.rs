use bevy::prelude::*;
use std::collections::BTreeSet;

/// One authored grass root: where a blade grows and which way is "up" for it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl SourceVertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// Insertion-ordered point cloud the blades are expanded from.
/// Duplicates are allowed; an empty store is a valid steady state.
#[derive(Debug, Clone, Default)]
pub struct VertexStore {
    vertices: Vec<SourceVertex>,
}

impl VertexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn as_slice(&self) -> &[SourceVertex] {
        &self.vertices
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn push(&mut self, vertex: SourceVertex) {
        self.vertices.push(vertex);
    }

    pub fn extend(&mut self, vertices: impl IntoIterator<Item = SourceVertex>) {
        self.vertices.extend(vertices);
    }

    /// Removes the entries at `indices`. Order of the supplied indices does not
    /// matter, repeats are collapsed and out-of-range indices are ignored.
    /// Retained entries keep their relative order. Returns the number removed.
    pub fn remove_at(&mut self, indices: &[usize]) -> usize {
        let targets: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.vertices.len())
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let mut index = 0;
        self.vertices.retain(|_| {
            let keep = !targets.contains(&index);
            index += 1;
            keep
        });
        targets.len()
    }

    /// Removes every entry matching `predicate`. Returns the number removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&SourceVertex) -> bool) -> usize {
        let before = self.vertices.len();
        self.vertices.retain(|v| !predicate(v));
        before - self.vertices.len()
    }

    /// Removes every entry equal to any of `vertices` (set difference by value).
    pub fn remove_matching(&mut self, vertices: &[SourceVertex]) -> usize {
        self.remove_where(|v| vertices.contains(v))
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

impl FromIterator<SourceVertex> for VertexStore {
    fn from_iter<T: IntoIterator<Item = SourceVertex>>(iter: T) -> Self {
        Self {
            vertices: iter.into_iter().collect(),
        }
    }
}
