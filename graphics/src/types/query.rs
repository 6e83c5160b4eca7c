//! Query heap descriptors.

/// Kind of query stored in a heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryType {
    /// Number of samples passing depth and stencil tests.
    #[default]
    Occlusion,
    /// Whether any sample passed depth and stencil tests.
    BinaryOcclusion,
    /// GPU timestamp, in ticks of the device timestamp frequency.
    Timestamp,
    /// Pipeline statistics counters.
    PipelineStatistics,
}

/// Descriptor for creating a query heap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryHeapDescriptor {
    /// Debug label for the heap.
    pub label: Option<String>,
    /// Query kind.
    pub query_type: QueryType,
    /// Number of queries in the heap.
    pub count: u32,
}

impl QueryHeapDescriptor {
    /// Create a query heap descriptor.
    pub fn new(query_type: QueryType, count: u32) -> Self {
        Self {
            label: None,
            query_type,
            count,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
