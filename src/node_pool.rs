use alloc::vec::Vec;

/// Index of a chain node inside a [`NodePool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone)]
enum Node<V> {
    Occupied { value: V, next: Option<NodeId> },
    Vacant { next_free: Option<NodeId> },
}

/// A contiguous arena of singly linked chain nodes.
///
/// Freed nodes are threaded onto a free list and handed out again by the next
/// allocation, so a set that churns through insertions and removals keeps
/// reusing the same backing storage.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use string_set::NodePool;
/// use string_set::StringSet;
///
/// let pool = NodePool::with_capacity(64);
/// let mut set: StringSet = StringSet::with_hasher_and_pool(Default::default(), pool);
/// assert!(set.insert("a"));
/// # }
/// ```
#[derive(Clone)]
pub struct NodePool<V> {
    nodes: Vec<Node<V>>,
    free_head: Option<NodeId>,
    len: usize,
}

impl<V> Default for NodePool<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> NodePool<V> {
    /// Creates an empty pool without allocating.
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Creates an empty pool with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no node is live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of nodes the pool can hold without reallocating,
    /// counting recycled slots.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn alloc(&mut self, value: V, next: Option<NodeId>) -> NodeId {
        self.len += 1;
        match self.free_head {
            Some(id) => {
                let node = &mut self.nodes[id.index()];
                match *node {
                    Node::Vacant { next_free } => self.free_head = next_free,
                    Node::Occupied { .. } => unreachable!("occupied node on the free list"),
                }
                *node = Node::Occupied { value, next };
                id
            }
            None => {
                let id = NodeId(u32::try_from(self.nodes.len()).expect("node pool index overflow"));
                self.nodes.push(Node::Occupied { value, next });
                id
            }
        }
    }

    /// Releases a node, returning its value and its successor.
    pub(crate) fn free(&mut self, id: NodeId) -> (V, Option<NodeId>) {
        let vacant = Node::Vacant {
            next_free: self.free_head,
        };
        match core::mem::replace(&mut self.nodes[id.index()], vacant) {
            Node::Occupied { value, next } => {
                self.free_head = Some(id);
                self.len -= 1;
                (value, next)
            }
            Node::Vacant { .. } => unreachable!("double free of chain node"),
        }
    }

    #[inline]
    pub(crate) fn value(&self, id: NodeId) -> &V {
        match &self.nodes[id.index()] {
            Node::Occupied { value, .. } => value,
            Node::Vacant { .. } => unreachable!("vacant chain node"),
        }
    }

    #[inline]
    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        match &self.nodes[id.index()] {
            Node::Occupied { next, .. } => *next,
            Node::Vacant { .. } => unreachable!("vacant chain node"),
        }
    }

    #[inline]
    pub(crate) fn set_next(&mut self, id: NodeId, link: Option<NodeId>) {
        match &mut self.nodes[id.index()] {
            Node::Occupied { next, .. } => *next = link,
            Node::Vacant { .. } => unreachable!("vacant chain node"),
        }
    }

    pub(crate) fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            nodes: self.nodes.iter_mut(),
        }
    }
}

/// Mutable iterator over the live node values, in storage order.
pub(crate) struct ValuesMut<'a, V> {
    nodes: core::slice::IterMut<'a, Node<V>>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        for node in self.nodes.by_ref() {
            if let Node::Occupied { value, .. } = node {
                return Some(value);
            }
        }
        None
    }
}
