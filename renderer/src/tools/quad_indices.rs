use std::ops::Range;

use anyhow::{Result, bail};

pub type Index = u16;

/// CPU side indices for a list of quads.
///
/// Index values depend on the quad slot only, so indices that were generated once stay valid
/// for every later vertex content. `filled_quads` is the high-water mark and never decreases.
#[derive(Debug, Default)]
pub struct QuadIndices {
    indices: Vec<Index>,
    filled_quads: usize,
}

impl QuadIndices {
    /// Two triangles per quad, relative to the first vertex of the quad.
    ///
    /// The vertices are emitted bottom-left, bottom-right, top-right, top-left.
    pub const QUAD_INDICES: &'static [Index] = &[0, 2, 1, 2, 0, 3];
    pub const INDICES_PER_QUAD: usize = Self::QUAD_INDICES.len();
    pub const VERTICES_PER_QUAD: usize = 4;
    /// The number of quads a 16 bit index can address.
    pub const MAX_QUADS: usize = (Index::MAX as usize + 1) / Self::VERTICES_PER_QUAD;

    pub fn new() -> Self {
        Self::default()
    }

    /// The number of quads indices were generated for.
    pub fn filled_quads(&self) -> usize {
        self.filled_quads
    }

    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    /// The indices of the quads in `range`.
    pub fn quads(&self, range: Range<usize>) -> &[Index] {
        &self.indices[range.start * Self::INDICES_PER_QUAD..range.end * Self::INDICES_PER_QUAD]
    }

    /// Makes sure that indices for `required_quad_count` quads are generated.
    ///
    /// Returns the range of quad slots that were generated by this call. The range is empty if
    /// the high-water mark already covers `required_quad_count`.
    pub fn ensure_quads(&mut self, required_quad_count: usize) -> Result<Range<usize>> {
        let current = self.filled_quads;
        if required_quad_count <= current {
            return Ok(current..current);
        }

        if required_quad_count > Self::MAX_QUADS {
            bail!(
                "Can't index {required_quad_count} quads with 16 bit indices, the maximum is {}",
                Self::MAX_QUADS
            );
        }

        self.indices
            .reserve((required_quad_count - current) * Self::INDICES_PER_QUAD);

        for quad in current..required_quad_count {
            let offset = (quad * Self::VERTICES_PER_QUAD) as Index;
            self.indices
                .extend(Self::QUAD_INDICES.iter().map(|i| *i + offset));
        }

        self.filled_quads = required_quad_count;
        Ok(current..required_quad_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_slots_follow_the_quad_pattern() {
        let mut indices = QuadIndices::new();
        indices.ensure_quads(3).unwrap();

        assert_eq!(
            indices.indices(),
            &[0, 2, 1, 2, 0, 3, 4, 6, 5, 6, 4, 7, 8, 10, 9, 10, 8, 11]
        );
    }

    #[test]
    fn every_slot_references_its_own_vertices() {
        let mut indices = QuadIndices::new();
        indices.ensure_quads(5).unwrap();
        indices.ensure_quads(300).unwrap();

        for slot in 0..300 {
            let v = (slot * 4) as Index;
            assert_eq!(
                indices.quads(slot..slot + 1),
                &[v, v + 2, v + 1, v + 2, v, v + 3],
                "slot {slot}"
            );
        }
    }

    #[test]
    fn only_new_slots_are_generated() {
        let mut indices = QuadIndices::new();

        assert_eq!(indices.ensure_quads(4).unwrap(), 0..4);
        assert_eq!(indices.ensure_quads(10).unwrap(), 4..10);
        assert_eq!(indices.filled_quads(), 10);
        assert_eq!(indices.indices().len(), 60);
    }

    #[test]
    fn smaller_requests_keep_the_high_water_mark() {
        let mut indices = QuadIndices::new();
        indices.ensure_quads(10).unwrap();
        let before = indices.indices().to_vec();

        assert!(indices.ensure_quads(3).unwrap().is_empty());
        assert!(indices.ensure_quads(0).unwrap().is_empty());
        assert!(indices.ensure_quads(10).unwrap().is_empty());

        assert_eq!(indices.filled_quads(), 10);
        assert_eq!(indices.indices(), before.as_slice());
    }

    #[test]
    fn generation_count_is_the_maximum_not_the_sum() {
        let mut indices = QuadIndices::new();
        let requests = [3, 7, 2, 7, 12, 1, 12, 5];

        let generated: usize = requests
            .iter()
            .map(|n| indices.ensure_quads(*n).unwrap().len())
            .sum();

        assert_eq!(generated, 12);
    }

    #[test]
    fn last_addressable_slot_uses_the_full_index_range() {
        let mut indices = QuadIndices::new();
        indices.ensure_quads(QuadIndices::MAX_QUADS).unwrap();

        let last = QuadIndices::MAX_QUADS - 1;
        assert_eq!(
            indices.quads(last..last + 1),
            &[65532, 65534, 65533, 65534, 65532, 65535]
        );
    }

    #[test]
    fn too_many_quads_are_rejected_without_changes() {
        let mut indices = QuadIndices::new();
        indices.ensure_quads(8).unwrap();

        assert!(indices.ensure_quads(QuadIndices::MAX_QUADS + 1).is_err());
        assert_eq!(indices.filled_quads(), 8);
        assert_eq!(indices.indices().len(), 48);
    }
}
