//! An unordered set of strings with neighbor displacement and overflow
//! chains.
//!
//! Values are placed by the top `capacity_log` bits of their hash. A value is
//! stored inline in its home slot or, when that slot is taken, inline in the
//! slot immediately to its right or left. Only when all three slots are taken
//! does it spill into a singly linked chain anchored at its home slot. Keeping
//! most entries flat avoids a pointer hop on lookup while the probe window
//! stays three slots wide.
//!
//! Because the home bucket is a prefix of the hash, doubling the table splits
//! every bucket `b` into exactly `2b` and `2b + 1`. [`StringSet::scan`] relies
//! on that to offer a cursor that survives growth between calls.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::BuildHasher;

use crate::DefaultHashBuilder;
use crate::node_pool::NodeId;
use crate::node_pool::NodePool;

const MIN_SIZE_SHIFT: u32 = 2;
const MIN_SIZE: usize = 1 << MIN_SIZE_SHIFT;

/// Scan cursors carry the bucket id in a `u32`.
const MAX_CAPACITY_LOG: u32 = 32;

#[derive(Clone)]
struct Slot<V> {
    value: Option<V>,
    chain: Option<NodeId>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            value: None,
            chain: None,
        }
    }
}

impl<V> Slot<V> {
    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// Where a match sits relative to the probed home bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Neighbor {
    Left,
    Home,
    Right,
}

/// The location of a value inside a [`StringSet`], as produced by
/// [`StringSet::positions`] and consumed by [`StringSet::erase`].
///
/// A position stays valid until the set is mutated. Erasing one value may
/// move another value of the same bucket, so positions collected before an
/// erase should not be reused afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    bucket: usize,
    node: Option<NodeId>,
}

impl Position {
    #[inline(always)]
    fn inline(bucket: usize) -> Self {
        Self { bucket, node: None }
    }

    #[inline(always)]
    fn chained(bucket: usize, node: NodeId) -> Self {
        Self {
            bucket,
            node: Some(node),
        }
    }

    /// Returns the slot index this position belongs to.
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Returns `true` if the value lives in an overflow chain rather than
    /// inline in the slot.
    pub fn is_chained(&self) -> bool {
        self.node.is_some()
    }
}

/// Debug statistics for table analysis.
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the set
    pub populated: usize,
    /// Number of slots in the bucket array
    pub bucket_count: usize,
    /// Number of slots holding an inline value
    pub occupied_slots: usize,
    /// Inline values stored next to, rather than in, their home slot
    pub displaced_entries: usize,
    /// Values stored in overflow chains
    pub chain_entries: usize,
    /// Largest `bucket_depth` over all slots
    pub max_bucket_depth: usize,
    /// Slot utilization (occupied_slots / bucket_count)
    pub slot_utilization: f64,
    /// Share of values stored in chains (chain_entries / populated)
    pub chain_ratio: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== String Set Debug Statistics ===");
        println!(
            "Population: {} in {} buckets",
            self.populated, self.bucket_count
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization)",
            self.occupied_slots,
            self.bucket_count,
            self.slot_utilization * 100.0
        );
        println!("Displaced: {} entries", self.displaced_entries);
        println!(
            "Chained: {} entries ({:.2}%), max bucket depth {}",
            self.chain_entries,
            self.chain_ratio * 100.0,
            self.max_bucket_depth
        );
    }
}

/// An unordered set of unique strings.
///
/// `StringSet<V, S>` stores values of type `V` (anything that can be built
/// from and viewed as a `&str`) and hashes their string form with the hasher
/// builder `S`. Membership tests, insertions and removals take `&str`.
///
/// ## Performance Characteristics
///
/// - **Lookup**: the home slot, its chain, and the two neighbor slots.
/// - **Memory**: one `Option<V>` and one chain link per slot, plus one pool
///   node per chained value.
///
/// ## Example
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use string_set::StringSet;
///
/// let mut set: StringSet = StringSet::new();
/// assert!(set.insert("foo"));
/// assert!(set.insert("bar"));
/// assert!(!set.insert("foo"));
/// assert_eq!(set.len(), 2);
///
/// let mut seen = Vec::new();
/// let mut cursor = 0;
/// loop {
///     cursor = set.scan(cursor, |v| seen.push(v.to_string()));
///     if cursor == 0 {
///         break;
///     }
/// }
/// seen.sort();
/// assert_eq!(seen, ["bar", "foo"]);
/// # }
/// ```
#[derive(Clone)]
pub struct StringSet<V = Box<str>, S = DefaultHashBuilder> {
    slots: Vec<Slot<V>>,
    pool: NodePool<V>,
    hash_builder: S,
    size: usize,
    capacity_log: u32,
}

impl<V, S> Debug for StringSet<V, S>
where
    V: AsRef<str>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter().map(AsRef::as_ref)).finish()
    }
}

impl<V, S> PartialEq for StringSet<V, S>
where
    V: AsRef<str>,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v.as_ref()))
    }
}

impl<V, S> Eq for StringSet<V, S>
where
    V: AsRef<str>,
    S: BuildHasher,
{
}

impl<V, S> StringSet<V, S> {
    /// Creates an empty set that hashes with `hash_builder`.
    ///
    /// No slots are allocated until the first insertion or
    /// [`reserve`](Self::reserve).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use string_set::StringSet;
    ///
    /// let set: StringSet<String, _> = StringSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// assert_eq!(set.bucket_count(), 0);
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_hasher_and_pool(hash_builder, NodePool::new())
    }

    /// Creates an empty set that hashes with `hash_builder` and allocates its
    /// chain nodes from `pool`.
    pub fn with_hasher_and_pool(hash_builder: S, pool: NodePool<V>) -> Self {
        debug_assert!(pool.is_empty());
        Self {
            slots: Vec::new(),
            pool,
            hash_builder,
            size: 0,
            capacity_log: 0,
        }
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots in the bucket array.
    pub fn bucket_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of values stored in overflow chains rather than
    /// inline in a slot.
    pub fn chain_count(&self) -> usize {
        self.pool.len()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns an iterator over all values.
    ///
    /// Values are yielded slot by slot; a slot's inline value comes first,
    /// followed by its overflow chain. The order carries no meaning beyond
    /// that.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.positions(),
        }
    }

    /// Returns an iterator over mutable references to all values.
    ///
    /// It is a logic error to change a value's string through this iterator.
    /// The behavior resulting from such a change is not specified, but will
    /// not be undefined behavior.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inline: self.slots.iter_mut(),
            chained: self.pool.values_mut(),
            remaining: self.size,
        }
    }

    /// Returns an iterator over every value together with its [`Position`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use string_set::StringSet;
    ///
    /// let mut set: StringSet = ["a", "b", "c"].into_iter().collect();
    /// let pos = set
    ///     .positions()
    ///     .find(|&(_, v)| &**v == "b")
    ///     .map(|(pos, _)| pos)
    ///     .unwrap();
    ///
    /// assert_eq!(set.erase(pos).as_deref(), Some("b"));
    /// assert!(!set.contains("b"));
    /// # }
    /// ```
    pub fn positions(&self) -> Positions<'_, V> {
        Positions {
            slots: &self.slots,
            pool: &self.pool,
            bucket: 0,
            chain: None,
            remaining: self.size,
        }
    }

    /// Returns the value stored at `pos`, if it is still there.
    pub fn get_at(&self, pos: Position) -> Option<&V> {
        let slot = self.slots.get(pos.bucket)?;
        match pos.node {
            None => slot.value.as_ref(),
            Some(id) => self
                .chain_of(slot.chain)
                .find(|&node| node == id)
                .map(|id| self.pool.value(id)),
        }
    }

    /// Removes the value at `pos` and returns it.
    ///
    /// This performs the same structural update as
    /// [`remove`](StringSet::remove) without searching for the value again.
    /// Returns `None` if nothing is stored at `pos` any more.
    pub fn erase(&mut self, pos: Position) -> Option<V> {
        let Some(id) = pos.node else {
            return self.erase_inline(pos.bucket);
        };

        let mut prev = None;
        let mut next = self.slots.get(pos.bucket)?.chain;
        while let Some(node) = next {
            if node == id {
                return Some(self.remove_chained(pos.bucket, prev, id));
            }
            prev = Some(node);
            next = self.pool.next(node);
        }
        None
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use string_set::StringSet;
    ///
    /// let mut set: StringSet = ["apple", "avocado", "banana"].into_iter().collect();
    /// set.retain(|v| v.starts_with('a'));
    /// assert_eq!(set.len(), 2);
    /// assert!(!set.contains("banana"));
    /// # }
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&V) -> bool) {
        for bid in 0..self.slots.len() {
            while let Some(value) = &self.slots[bid].value {
                if f(value) {
                    break;
                }
                self.erase_inline(bid);
            }

            let mut prev = None;
            let mut next = self.slots[bid].chain;
            while let Some(id) = next {
                next = self.pool.next(id);
                if f(self.pool.value(id)) {
                    prev = Some(id);
                } else {
                    self.remove_chained(bid, prev, id);
                }
            }
        }
    }

    /// Removes all values, freeing every chain node.
    ///
    /// The bucket array keeps its size.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            debug_assert!(slot.chain.is_none() || slot.value.is_some());

            slot.value = None;
            let mut next = slot.chain.take();
            while let Some(id) = next {
                let (_, after) = self.pool.free(id);
                next = after;
            }
        }

        debug_assert!(self.pool.is_empty());
        self.size = 0;
    }

    /// Returns the number of values anchored at slot `bid`: `1 +` the chain
    /// length if the slot holds an inline value, `0` otherwise.
    pub fn bucket_depth(&self, bid: usize) -> usize {
        let Some(slot) = self.slots.get(bid) else {
            return 0;
        };
        if slot.is_empty() {
            debug_assert!(slot.chain.is_none());
            return 0;
        }
        1 + self.chain_of(slot.chain).count()
    }

    /// Calls `f` with the inline value of slot `bid`, then with each value of
    /// its overflow chain.
    pub fn iterate_over_bucket(&self, bid: usize, mut f: impl FnMut(&V)) {
        let Some(slot) = self.slots.get(bid) else {
            return;
        };
        let Some(value) = &slot.value else {
            debug_assert!(slot.chain.is_none());
            return;
        };

        f(value);
        for id in self.chain_of(slot.chain) {
            f(self.pool.value(id));
        }
    }

    fn chain_of(&self, head: Option<NodeId>) -> impl Iterator<Item = NodeId> + '_ {
        core::iter::successors(head, |&id| self.pool.next(id))
    }

    /// Returns the index of an empty slot in the neighborhood of `bid`,
    /// trying the home slot, then the right neighbor, then the left one.
    fn find_empty_around(&self, bid: usize) -> Option<usize> {
        if self.slots[bid].is_empty() {
            return Some(bid);
        }

        if bid + 1 < self.slots.len() && self.slots[bid + 1].is_empty() {
            return Some(bid + 1);
        }

        if bid > 0 && self.slots[bid - 1].is_empty() {
            return Some(bid - 1);
        }

        None
    }

    /// Pushes `value` onto the chain anchored at `bid`.
    ///
    /// The slot may hold a value from a neighboring bucket, so the new node is
    /// linked right after the slot rather than appended further down.
    fn link(&mut self, value: V, bid: usize) {
        let slot = &mut self.slots[bid];
        debug_assert!(!slot.is_empty(), "chain anchored on an empty slot");
        slot.chain = Some(self.pool.alloc(value, slot.chain));
    }

    /// Re-homes a detached chain node at `bid`.
    fn move_entry(&mut self, id: NodeId, bid: usize) {
        let slot = &mut self.slots[bid];
        if slot.is_empty() {
            debug_assert!(slot.chain.is_none());
            let (value, _) = self.pool.free(id);
            slot.value = Some(value);
        } else {
            self.pool.set_next(id, slot.chain);
            slot.chain = Some(id);
        }
    }

    /// Moves the head of the chain at `bid` into the slot's inline value.
    fn promote_chain_head(&mut self, bid: usize) {
        let slot = &mut self.slots[bid];
        debug_assert!(slot.is_empty());
        if let Some(head) = slot.chain {
            let (value, next) = self.pool.free(head);
            slot.value = Some(value);
            slot.chain = next;
        }
    }

    fn erase_inline(&mut self, bid: usize) -> Option<V> {
        let value = self.slots.get_mut(bid)?.value.take()?;
        self.promote_chain_head(bid);
        self.size -= 1;
        Some(value)
    }

    fn remove_chained(&mut self, bid: usize, prev: Option<NodeId>, id: NodeId) -> V {
        let (value, next) = self.pool.free(id);
        match prev {
            Some(prev) => self.pool.set_next(prev, next),
            None => self.slots[bid].chain = next,
        }
        self.size -= 1;
        value
    }

    fn init(&mut self, size: usize) {
        debug_assert!(self.slots.is_empty() && size.is_power_of_two());
        let capacity_log = size.trailing_zeros();
        assert!(
            capacity_log <= MAX_CAPACITY_LOG,
            "string set capacity overflow"
        );

        self.slots.resize_with(size, Slot::default);
        self.capacity_log = capacity_log;
    }
}

impl<V, S> StringSet<V, S>
where
    V: AsRef<str>,
    S: BuildHasher,
{
    /// Creates an empty set with room for at least `capacity` values without
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use string_set::StringSet;
    ///
    /// let set: StringSet = StringSet::with_capacity_and_hasher(100, Default::default());
    /// assert_eq!(set.bucket_count(), 128);
    /// # }
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let mut set = Self::with_hasher(hash_builder);
        if capacity > 0 {
            set.reserve(capacity);
        }
        set
    }

    /// Grows the bucket array to at least `size_hint` slots, rounded up to a
    /// power of two and to the minimum table size. Never shrinks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use string_set::StringSet;
    ///
    /// let mut set: StringSet = StringSet::new();
    /// set.reserve(0);
    /// assert_eq!(set.bucket_count(), 4);
    ///
    /// set.insert("x");
    /// set.reserve(33);
    /// assert_eq!(set.bucket_count(), 64);
    /// assert!(set.contains("x"));
    ///
    /// set.reserve(8);
    /// assert_eq!(set.bucket_count(), 64);
    /// # }
    /// ```
    pub fn reserve(&mut self, size_hint: usize) {
        let target = size_hint.max(MIN_SIZE).next_power_of_two();
        if self.slots.is_empty() {
            self.init(target);
            return;
        }

        while self.slots.len() < target {
            self.grow();
        }
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains(&self, value: &str) -> bool {
        !self.slots.is_empty() && self.find_around(value, self.bucket_of(value)).is_some()
    }

    /// Returns a reference to the stored value equal to `value`.
    pub fn get(&self, value: &str) -> Option<&V> {
        let pos = self.find(value)?;
        self.get_at(pos)
    }

    /// Removes `value` from the set. Returns whether it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use string_set::StringSet;
    ///
    /// let mut set: StringSet = StringSet::new();
    /// set.insert("a");
    /// assert!(set.remove("a"));
    /// assert!(!set.remove("a"));
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn remove(&mut self, value: &str) -> bool {
        self.take(value).is_some()
    }

    /// Removes `value` from the set and returns the stored value.
    pub fn take(&mut self, value: &str) -> Option<V> {
        let pos = self.find(value)?;
        self.erase(pos)
    }

    /// Performs one step of an incremental scan.
    ///
    /// Pass `0` to start a scan and feed the returned cursor into the next
    /// call; a returned `0` means the scan is complete. Each step visits every
    /// value whose home bucket is the first non-empty bucket at or after the
    /// cursor.
    ///
    /// A value present for the whole duration of a scan is visited exactly
    /// once, even if the set grows between steps: bucket ids are prefixes of
    /// the hash, so every bucket at or before the cursor maps to buckets at or
    /// before the rescaled cursor after a doubling.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use string_set::StringSet;
    ///
    /// let mut set: StringSet = StringSet::new();
    /// for i in 0..100 {
    ///     set.insert(&format!("k{i}"));
    /// }
    ///
    /// let mut visited = 0;
    /// let mut cursor = set.scan(0, |_| visited += 1);
    /// // Growing mid-scan does not cause values to be visited twice.
    /// set.reserve(1024);
    /// while cursor != 0 {
    ///     cursor = set.scan(cursor, |_| visited += 1);
    /// }
    /// assert_eq!(visited, 100);
    /// # }
    /// ```
    pub fn scan(&self, cursor: u32, mut f: impl FnMut(&V)) -> u32 {
        if self.capacity_log == 0 {
            return 0;
        }

        let shift = MAX_CAPACITY_LOG - self.capacity_log;
        let mut bid = (cursor >> shift) as usize;
        while bid < self.slots.len() {
            if self.visit_home_bucket(bid, &mut f) {
                let next = bid + 1;
                return if next < self.slots.len() {
                    (next as u32) << shift
                } else {
                    0
                };
            }
            bid += 1;
        }

        0
    }

    /// Visits every value whose home bucket is `bid`. Returns whether any
    /// value was visited.
    fn visit_home_bucket(&self, bid: usize, f: &mut impl FnMut(&V)) -> bool {
        let mut visited = false;
        let mut visit = |value: &V| {
            f(value);
            visited = true;
        };
        let homed_at = |idx: usize| {
            self.slots
                .get(idx)
                .and_then(|slot| slot.value.as_ref())
                .filter(|v| self.home_of(v) == bid)
        };

        if let Some(value) = homed_at(bid) {
            visit(value);
        }

        for id in self.chain_of(self.slots[bid].chain) {
            visit(self.pool.value(id));
        }

        // Neighbors displaced out of `bid` belong to this step.
        if let Some(value) = homed_at(bid + 1) {
            visit(value);
        }
        if let Some(value) = bid.checked_sub(1).and_then(homed_at) {
            visit(value);
        }

        visited
    }

    #[inline]
    fn hash_str(&self, value: &str) -> u64 {
        self.hash_builder.hash_one(value)
    }

    #[inline(always)]
    fn bucket_id(&self, hash: u64) -> usize {
        debug_assert!(self.capacity_log > 0);
        (hash >> (64 - self.capacity_log)) as usize
    }

    #[inline]
    fn bucket_of(&self, value: &str) -> usize {
        self.bucket_id(self.hash_str(value))
    }

    #[inline]
    fn home_of(&self, value: &V) -> usize {
        self.bucket_of(value.as_ref())
    }

    fn find(&self, value: &str) -> Option<Position> {
        if self.slots.is_empty() {
            return None;
        }
        self.locate(value, self.bucket_of(value))
    }

    /// Searches the home slot and its whole chain, then the inline values of
    /// the two neighbors. Chains are never searched at neighbors.
    fn locate(&self, value: &str, bid: usize) -> Option<Position> {
        let holds = |idx: usize| {
            self.slots[idx]
                .value
                .as_ref()
                .is_some_and(|v| v.as_ref() == value)
        };

        if holds(bid) {
            return Some(Position::inline(bid));
        }

        if let Some(id) = self
            .chain_of(self.slots[bid].chain)
            .find(|&id| self.pool.value(id).as_ref() == value)
        {
            return Some(Position::chained(bid, id));
        }

        if bid > 0 && holds(bid - 1) {
            return Some(Position::inline(bid - 1));
        }

        if bid + 1 < self.slots.len() && holds(bid + 1) {
            return Some(Position::inline(bid + 1));
        }

        None
    }

    fn find_around(&self, value: &str, bid: usize) -> Option<Neighbor> {
        self.locate(value, bid).map(|pos| match pos.bucket.cmp(&bid) {
            Ordering::Less => Neighbor::Left,
            Ordering::Equal => Neighbor::Home,
            Ordering::Greater => Neighbor::Right,
        })
    }

    /// Doubles the bucket array and re-homes every value.
    ///
    /// Doubling maps index `i` to `2i` or `2i + 1`, both `>= i`, so original
    /// slots are processed from the highest index down: a slot is never
    /// written by the relocation before its own content has been moved out.
    #[cold]
    fn grow(&mut self) {
        assert!(
            self.capacity_log < MAX_CAPACITY_LOG,
            "string set capacity overflow"
        );

        let prev_len = self.slots.len();
        self.slots.resize_with(prev_len * 2, Slot::default);
        self.capacity_log += 1;

        for i in (0..prev_len).rev() {
            let bid = match &self.slots[i].value {
                Some(value) => self.home_of(value),
                None => {
                    debug_assert!(self.slots[i].chain.is_none());
                    continue;
                }
            };

            if bid != i {
                let target = self.find_empty_around(bid);
                if let Some(value) = self.slots[i].value.take() {
                    match target {
                        Some(idx) => {
                            debug_assert!(self.slots[idx].chain.is_none());
                            self.slots[idx].value = Some(value);
                        }
                        None => self.link(value, bid),
                    }
                }
            }

            let mut prev: Option<NodeId> = None;
            let mut next = self.slots[i].chain;
            while let Some(id) = next {
                next = self.pool.next(id);
                let node_bid = self.home_of(self.pool.value(id));
                if node_bid == i {
                    prev = Some(id);
                    continue;
                }

                match prev {
                    Some(prev) => self.pool.set_next(prev, next),
                    None => self.slots[i].chain = next,
                }
                self.move_entry(id, node_bid);
            }

            if self.slots[i].is_empty() {
                self.promote_chain_head(i);
            }
        }
    }

    /// Returns detailed utilization statistics.
    ///
    /// Available with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let mut occupied_slots = 0;
        let mut displaced_entries = 0;
        let mut max_bucket_depth = 0;

        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(value) = &slot.value {
                occupied_slots += 1;
                if self.home_of(value) != idx {
                    displaced_entries += 1;
                }
            }
            max_bucket_depth = max_bucket_depth.max(self.bucket_depth(idx));
        }

        DebugStats {
            populated: self.size,
            bucket_count: self.slots.len(),
            occupied_slots,
            displaced_entries,
            chain_entries: self.chain_count(),
            max_bucket_depth,
            slot_utilization: if self.slots.is_empty() {
                0.0
            } else {
                occupied_slots as f64 / self.slots.len() as f64
            },
            chain_ratio: if self.size == 0 {
                0.0
            } else {
                self.chain_count() as f64 / self.size as f64
            },
        }
    }

    /// Computes how many slots have each bucket depth.
    ///
    /// Index `d` of the returned vector holds the number of slots whose
    /// [`bucket_depth`](Self::bucket_depth) is `d`.
    ///
    /// Available with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn depth_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; 1];
        for bid in 0..self.slots.len() {
            let depth = self.bucket_depth(bid);
            if depth >= hist.len() {
                hist.resize(depth + 1, 0);
            }
            hist[depth] += 1;
        }
        hist
    }

    /// Pretty-prints the bucket depth histogram horizontally using stdout.
    ///
    /// Requires the `stats` and `std` features.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_depth_histogram(&self) {
        let hist = self.depth_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("depth histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!(
            "depth histogram ({} entries, {} buckets):",
            self.size,
            self.slots.len()
        );
        for (depth, &count) in hist.iter().enumerate() {
            let bar = "█".repeat((count * max_bar).div_ceil(max));
            println!("{:>2} | {} ({})", depth, bar, count);
        }
    }

    /// Asserts every structural invariant of the table.
    #[cfg(test)]
    fn assert_invariants(&self) {
        let mut inline = 0;
        let mut chained = 0;
        let mut seen = hashbrown::HashSet::new();

        for (idx, slot) in self.slots.iter().enumerate() {
            let Some(value) = &slot.value else {
                assert!(slot.chain.is_none(), "empty slot {idx} anchors a chain");
                continue;
            };

            inline += 1;
            assert!(seen.insert(value.as_ref()), "duplicate {:?}", value.as_ref());
            assert!(
                self.home_of(value).abs_diff(idx) <= 1,
                "{:?} stored at {idx}, home {}",
                value.as_ref(),
                self.home_of(value)
            );

            for id in self.chain_of(slot.chain) {
                chained += 1;
                let value = self.pool.value(id);
                assert!(seen.insert(value.as_ref()), "duplicate {:?}", value.as_ref());
                assert_eq!(self.home_of(value), idx, "{:?} chained off-home", value.as_ref());
            }
        }

        assert_eq!(inline + chained, self.size);
        assert_eq!(chained, self.chain_count());
        assert_eq!(self.iter().count(), self.size);
        if !self.slots.is_empty() {
            assert_eq!(1 << self.capacity_log, self.slots.len());
        }
    }
}

impl<V, S> StringSet<V, S>
where
    V: for<'a> From<&'a str> + AsRef<str>,
    S: BuildHasher,
{
    /// Adds `value` to the set. Returns `true` if it was inserted and `false`
    /// if it was already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use string_set::StringSet;
    ///
    /// let mut set: StringSet = StringSet::new();
    /// assert!(set.insert("foo"));
    /// assert!(!set.insert("foo"));
    /// assert!(set.contains("foo"));
    /// # }
    /// ```
    pub fn insert(&mut self, value: &str) -> bool {
        let hash = self.hash_str(value);

        if self.slots.is_empty() {
            self.init(MIN_SIZE);
            let bid = self.bucket_id(hash);
            self.slots[bid].value = Some(V::from(value));
            self.size += 1;
            return true;
        }

        let mut bid = self.bucket_id(hash);
        if self.find_around(value, bid).is_some() {
            return false;
        }

        self.size += 1;

        // Prefer the flat neighborhood; grow when it is full and the table
        // holds at least one value per slot.
        for _ in 0..2 {
            if let Some(idx) = self.find_empty_around(bid) {
                self.slots[idx].value = Some(V::from(value));
                return true;
            }

            if self.size < self.slots.len() {
                break;
            }

            self.grow();
            bid = self.bucket_id(hash);
        }

        if self.slots[bid].is_empty() {
            self.slots[bid].value = Some(V::from(value));
            return true;
        }

        let resident_bid = self.slots[bid]
            .value
            .as_ref()
            .map_or(bid, |resident| self.home_of(resident));
        if resident_bid != bid {
            // The home slot holds a value displaced from a neighbor: send it
            // to its own chain and take the slot back.
            let evicted = self.slots[bid].value.replace(V::from(value));
            if let Some(evicted) = evicted {
                self.link(evicted, resident_bid);
            }
        } else {
            self.link(V::from(value), bid);
        }
        true
    }
}

impl<V, S> StringSet<V, S>
where
    V: AsRef<str>,
    S: BuildHasher + Default,
{
    /// Creates an empty set using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use string_set::StringSet;
    ///
    /// let set: StringSet = StringSet::new();
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty set with room for at least `capacity` values, using
    /// the default hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<V, S> Default for StringSet<V, S>
where
    V: AsRef<str>,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V, S> Extend<&'a str> for StringSet<V, S>
where
    V: for<'b> From<&'b str> + AsRef<str>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, V, S> FromIterator<&'a str> for StringSet<V, S>
where
    V: for<'b> From<&'b str> + AsRef<str>,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, V, S> IntoIterator for &'a StringSet<V, S> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the values of a [`StringSet`] and their [`Position`]s.
///
/// This struct is created by [`StringSet::positions`].
pub struct Positions<'a, V> {
    slots: &'a [Slot<V>],
    pool: &'a NodePool<V>,
    bucket: usize,
    chain: Option<NodeId>,
    remaining: usize,
}

impl<'a, V> Iterator for Positions<'a, V> {
    type Item = (Position, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // `bucket` is one past the slot that owns `chain`.
        if let Some(id) = self.chain {
            self.chain = self.pool.next(id);
            self.remaining -= 1;
            return Some((Position::chained(self.bucket - 1, id), self.pool.value(id)));
        }

        while let Some(slot) = self.slots.get(self.bucket) {
            self.bucket += 1;
            if let Some(value) = &slot.value {
                self.chain = slot.chain;
                self.remaining -= 1;
                return Some((Position::inline(self.bucket - 1), value));
            }
            debug_assert!(slot.chain.is_none());
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Positions<'_, V> {}

/// An iterator over the values of a [`StringSet`].
///
/// This struct is created by [`StringSet::iter`].
pub struct Iter<'a, V> {
    inner: Positions<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a [`StringSet`].
///
/// This struct is created by [`StringSet::iter_mut`]. Inline values are
/// yielded first, then chained values.
pub struct IterMut<'a, V> {
    inline: core::slice::IterMut<'a, Slot<V>>,
    chained: crate::node_pool::ValuesMut<'a, V>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self
            .inline
            .by_ref()
            .find_map(|slot| slot.value.as_mut())
            .or_else(|| self.chained.next())?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
