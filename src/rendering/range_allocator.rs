//! Memory management for chunk meshes using a coalescing range allocator.
//!
//! Every chunk mesh lives in one shared vertex buffer, so the allocator has
//! to hand out variably sized contiguous ranges and take them back as chunks
//! are remeshed. It keeps a sorted free list of non-adjacent ranges:
//! - Allocation is first-fit, scanning the list from the lowest offset
//! - Freeing re-inserts the range in sorted position and merges it with
//!   adjacent free neighbors, so fragmentation heals as meshes churn
//!
//! List nodes come from a fixed arena and link to each other by arena index,
//! keeping the whole allocator in two flat allocations with no per-node
//! boxing.

use thiserror::Error;

/// Number of nodes in the free-list arena. The free list holds one node per
/// maximal free gap; coalescing keeps that well below the number of live
/// allocations in practice.
pub const NODE_POOL_SIZE: usize = 512;

/// A contiguous range of allocation units, `[start, start + size)`.
///
/// Unitless: the caller decides whether a unit is a vertex, a byte, or
/// anything else.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Range {
    /// First unit of the range.
    pub start: u32,
    /// Number of units in the range. Zero marks the absence of an
    /// allocation (the `Default` value); the allocator itself never hands
    /// out or accepts an empty range.
    pub size: u32,
}

/// Errors the allocator can report instead of handing out a range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeAllocError {
    /// No free range is large enough for the request. The caller can retry
    /// after freeing, or treat it as a capacity planning failure.
    #[error("no free range of {requested} units available")]
    OutOfCapacity {
        /// The allocation size that could not be satisfied.
        requested: u32,
    },

    /// The node arena is full, so the free list cannot grow. Only reachable
    /// with pathological fragmentation: more than [`NODE_POOL_SIZE`]
    /// disjoint free gaps.
    #[error("free-list node pool exhausted ({NODE_POOL_SIZE} nodes)")]
    PoolExhausted,
}

struct Node {
    range: Range,
    /// Arena index of the next node in whichever list this node is on.
    next: Option<usize>,
}

/// A first-fit, coalescing allocator over `[0, capacity)`.
pub struct RangeAllocator {
    nodes: Vec<Node>,
    /// Head of the sorted free-range list.
    free_head: Option<usize>,
    /// Head of the list of unused arena nodes.
    pool_head: Option<usize>,
    capacity: u32,
    used: u32,
}

impl RangeAllocator {
    /// Creates an allocator managing `capacity` units, all initially free.
    pub fn new(capacity: u32) -> Self {
        assert!(capacity > 0, "cannot manage an empty buffer");

        let mut nodes = Vec::with_capacity(NODE_POOL_SIZE);
        nodes.push(Node {
            range: Range {
                start: 0,
                size: capacity,
            },
            next: None,
        });
        for i in 1..NODE_POOL_SIZE {
            nodes.push(Node {
                range: Range::default(),
                next: if i + 1 < NODE_POOL_SIZE {
                    Some(i + 1)
                } else {
                    None
                },
            });
        }

        Self {
            nodes,
            free_head: Some(0),
            pool_head: Some(1),
            capacity,
            used: 0,
        }
    }

    /// Total number of units under management.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of units currently allocated.
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Allocates `size` units from the lowest-offset free range that fits.
    ///
    /// # Panics
    /// `size` must be nonzero; a zero-sized mesh should simply not allocate.
    pub fn alloc(&mut self, size: u32) -> Result<Range, RangeAllocError> {
        assert!(size > 0, "zero-sized allocation");

        let mut prev: Option<usize> = None;
        let mut current = self.free_head;

        while let Some(index) = current {
            if self.nodes[index].range.size >= size {
                let allocated = Range {
                    start: self.nodes[index].range.start,
                    size,
                };

                if self.nodes[index].range.size == size {
                    // Exact fit, the node goes back to the arena.
                    let next = self.nodes[index].next;
                    match prev {
                        Some(prev) => self.nodes[prev].next = next,
                        None => self.free_head = next,
                    }
                    self.release_node(index);
                } else {
                    self.nodes[index].range.start += size;
                    self.nodes[index].range.size -= size;
                }

                self.used += size;
                return Ok(allocated);
            }

            prev = current;
            current = self.nodes[index].next;
        }

        Err(RangeAllocError::OutOfCapacity { requested: size })
    }

    /// Returns a previously allocated range to the free list, merging it
    /// with adjacent free ranges.
    ///
    /// The range must have come from [`alloc`](Self::alloc) on this
    /// allocator and must not have been freed already; the allocator does
    /// not track live allocations and cannot detect a double free.
    pub fn free(&mut self, range: Range) -> Result<(), RangeAllocError> {
        assert!(range.size > 0, "zero-sized free");
        debug_assert!(
            range.start.checked_add(range.size).is_some_and(|end| end <= self.capacity),
            "range {:?} does not fit the managed buffer",
            range
        );

        // Find the insertion point: prev ends at or before the range, next
        // starts at or after its end.
        let mut prev: Option<usize> = None;
        let mut next = self.free_head;
        while let Some(index) = next {
            if self.nodes[index].range.start >= range.start {
                break;
            }
            prev = next;
            next = self.nodes[index].next;
        }

        let merges_prev = prev.is_some_and(|prev| {
            self.nodes[prev].range.start + self.nodes[prev].range.size == range.start
        });
        let merges_next =
            next.is_some_and(|next| range.start + range.size == self.nodes[next].range.start);

        match (merges_prev, merges_next) {
            (true, true) => {
                // The freed range bridges two free neighbors; they collapse
                // into prev and next's node returns to the arena.
                let (prev, next) = (prev.unwrap(), next.unwrap());
                self.nodes[prev].range.size += range.size + self.nodes[next].range.size;
                self.nodes[prev].next = self.nodes[next].next;
                self.release_node(next);
            }
            (true, false) => {
                self.nodes[prev.unwrap()].range.size += range.size;
            }
            (false, true) => {
                let next = next.unwrap();
                self.nodes[next].range.start = range.start;
                self.nodes[next].range.size += range.size;
            }
            (false, false) => {
                let node = self.acquire_node()?;
                self.nodes[node].range = range;
                self.nodes[node].next = next;
                match prev {
                    Some(prev) => self.nodes[prev].next = Some(node),
                    None => self.free_head = Some(node),
                }
            }
        }

        self.used -= range.size;
        Ok(())
    }

    /// Snapshot of the free list in ascending offset order, for tests and
    /// diagnostics.
    pub fn free_ranges(&self) -> Vec<Range> {
        let mut ranges = Vec::new();
        let mut current = self.free_head;
        while let Some(index) = current {
            ranges.push(self.nodes[index].range);
            current = self.nodes[index].next;
        }
        ranges
    }

    fn acquire_node(&mut self) -> Result<usize, RangeAllocError> {
        let index = self.pool_head.ok_or(RangeAllocError::PoolExhausted)?;
        self.pool_head = self.nodes[index].next;
        Ok(index)
    }

    fn release_node(&mut self, index: usize) {
        self.nodes[index].next = self.pool_head;
        self.pool_head = Some(index);
    }
}
