//! Batching error types.

use crate::accessor::AccessorId;

/// Which half of an accessor ran out of room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferKind::Vertex => f.write_str("vertices"),
            BufferKind::Index => f.write_str("indices"),
        }
    }
}

/// Errors raised while writing batched geometry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// The accessor would have to grow past its hard limit.
    #[error("accessor {accessor:?} cannot hold {requested} {kind}; limit is {limit}")]
    CapacityExceeded {
        accessor: AccessorId,
        kind: BufferKind,
        requested: u64,
        limit: u32,
    },

    /// A region was used after its accessor grew or was reset.
    #[error("region is stale: issued at generation {region}/frame {region_frame}, accessor is at {current}/frame {current_frame}")]
    StaleRegion {
        region: u32,
        region_frame: u32,
        current: u32,
        current_frame: u32,
    },

    /// A region was written with geometry of a different size.
    #[error(
        "region holds {expected_vertices} vertices and {expected_indices} indices, geometry has {vertices} and {indices}"
    )]
    RegionMismatch {
        expected_vertices: u32,
        expected_indices: u32,
        vertices: usize,
        indices: usize,
    },

    /// A region issued by one accessor was written into another.
    #[error("region from accessor {region:?} written into accessor {accessor:?}")]
    ForeignRegion {
        region: AccessorId,
        accessor: AccessorId,
    },

    /// An index refers past the end of its geometry's vertices.
    #[error("index {index} out of bounds for geometry with {vertex_count} vertices")]
    IndexOutOfBounds { index: u16, vertex_count: usize },

    /// No accessor with this id exists.
    #[error("unknown buffer accessor {0:?}")]
    UnknownAccessor(AccessorId),
}
