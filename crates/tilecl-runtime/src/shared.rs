use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::ops::{Deref, DerefMut};

use hashbrown::HashMap;

use crate::{Element, ExecutionPolicy, Tile};

/// Buffers kept per element type once released by a kernel.
const MAX_RECYCLED_BUFFERS: usize = 8;

/// Larger buffers are freed on release instead of staying pinned to the worker.
const MAX_RECYCLED_CAPACITY: usize = ExecutionPolicy::DEFAULT_SHARED_MEMORY_ELEMS;

thread_local! {
    // Tile-local storage of the tiles executed by this worker, reused across launches.
    static SHARED_ARENA: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

fn take_buffer<T: Element>(capacity: usize) -> Vec<T> {
    let recycled = SHARED_ARENA
        .try_with(|arena| {
            let mut arena = arena.borrow_mut();
            arena
                .get_mut(&TypeId::of::<T>())
                .and_then(|pool| pool.downcast_mut::<Vec<Vec<T>>>())
                .and_then(|pool| pool.pop())
        })
        .ok()
        .flatten();

    let mut buffer = recycled.unwrap_or_default();
    buffer.clear();
    buffer.reserve(capacity);
    buffer
}

fn recycle_buffer<T: Element>(mut buffer: Vec<T>) {
    if buffer.capacity() == 0 || buffer.capacity() > MAX_RECYCLED_CAPACITY {
        return;
    }
    buffer.clear();

    // The arena may already be gone when a worker thread shuts down.
    let _ = SHARED_ARENA.try_with(|arena| {
        let mut arena = arena.borrow_mut();
        let pool = arena
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Vec::<Vec<T>>::new()));

        if let Some(pool) = pool.downcast_mut::<Vec<Vec<T>>>() {
            if pool.len() < MAX_RECYCLED_BUFFERS {
                pool.push(buffer);
            }
        }
    });
}

/// Scalar tile-local storage, initialized once per tile by the origin lane.
#[derive(Debug, Clone, Copy)]
pub struct Shared<T: Element> {
    value: T,
}

impl<T: Element> Shared<T> {
    /// Runs `init` on the origin lane; every lane observes the value after the barrier.
    pub fn new<F: FnOnce() -> T>(tile: &Tile, init: F) -> Self {
        let value = tile.uniform(init);
        tile.sync_units();

        Self { value }
    }

    /// The shared value.
    pub fn get(&self) -> T {
        self.value
    }
}

/// Array tile-local storage shared by the lanes of one tile for one kernel invocation.
///
/// The backing buffer comes from a per-worker arena and goes back to it on drop, so repeated
/// launches don't allocate once the arena is warm.
#[derive(Debug)]
pub struct SharedMemory<T: Element> {
    data: Vec<T>,
}

impl<T: Element> SharedMemory<T> {
    /// Creates `len` slots, each lane initializing the slots it owns with `init(index)`.
    pub fn from_fn<F: FnMut(usize) -> T>(tile: &Tile, len: usize, init: F) -> Self {
        let mut data = take_buffer(len);
        data.extend((0..len).map(init));
        tile.sync_units();

        Self { data }
    }

    /// Creates `len` slots all holding `value`.
    pub fn filled(tile: &Tile, len: usize, value: T) -> Self {
        let mut data = take_buffer(len);
        data.resize(len, value);
        tile.sync_units();

        Self { data }
    }

    /// Reduces the first `active` slots in place with a tree-halving reduction.
    ///
    /// Slots are combined left to right, so `op` only needs to be associative. Slots past
    /// `active` don't participate. Returns `None` when no slot is active.
    pub fn reduce<F: Fn(T, T) -> T>(&mut self, tile: &Tile, active: usize, op: F) -> Option<T> {
        let active = active.min(self.data.len());
        if active == 0 {
            return None;
        }

        let width = tile.width() as usize;
        let data = &mut self.data;
        let mut jump = 1;

        while jump < active {
            tile.for_each_lane(|lane| {
                let mut destination = 2 * jump * lane.pos() as usize;
                while destination + jump < active {
                    let origin = destination + jump;
                    data[destination] = op(data[destination], data[origin]);
                    destination += 2 * jump * width;
                }
            });
            jump *= 2;
            tile.sync_units();
        }

        Some(data[0])
    }
}

impl<T: Element> Deref for SharedMemory<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T: Element> DerefMut for SharedMemory<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T: Element> Drop for SharedMemory<T> {
    fn drop(&mut self) {
        recycle_buffer(core::mem::take(&mut self.data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileDim;

    fn tile(width: u32) -> Tile {
        Tile::with_range(0, 1, TileDim::new(width), 0..width as usize)
    }

    #[test_log::test]
    fn reduce_supports_non_commutative_operators() {
        for width in [1, 2, 3, 4, 8] {
            let tile = tile(width);
            for len in 1..40usize {
                // Matrix product of 2x2 matrices is associative but not commutative.
                let matrices = (0..len)
                    .map(|i| [1u64, i as u64 % 3, (i as u64 * 7) % 5, 1])
                    .collect::<Vec<_>>();
                let product = |a: [u64; 4], b: [u64; 4]| {
                    [
                        (a[0] * b[0] + a[1] * b[2]) % 1_000_003,
                        (a[0] * b[1] + a[1] * b[3]) % 1_000_003,
                        (a[2] * b[0] + a[3] * b[2]) % 1_000_003,
                        (a[2] * b[1] + a[3] * b[3]) % 1_000_003,
                    ]
                };
                let expected = matrices.iter().copied().reduce(product);

                let mut memory = SharedMemory::from_fn(&tile, len, |i| matrices[i]);
                let actual = memory.reduce(&tile, len, product);

                assert_eq!(actual, expected, "width {width}, len {len}");
            }
        }
    }

    #[test_log::test]
    fn reduce_ignores_inactive_slots() {
        let tile = tile(4);
        let mut memory = SharedMemory::from_fn(&tile, 8, |i| i as u32 + 1);

        assert_eq!(memory.reduce(&tile, 5, |a, b| a + b), Some(15));
        assert_eq!(memory.reduce(&tile, 0, |a, b| a + b), None);
    }

    #[test_log::test]
    fn shared_value_is_initialized_once() {
        let tile = tile(16);
        let mut calls = 0;
        let shared = Shared::new(&tile, || {
            calls += 1;
            7u32
        });

        assert_eq!(shared.get(), 7);
        assert_eq!(calls, 1);
    }

    #[test_log::test]
    fn buffers_are_recycled_by_the_arena() {
        let tile = tile(4);
        let memory = SharedMemory::filled(&tile, 1024, 0u8);
        let pointer = memory.as_ptr();
        drop(memory);

        let memory = SharedMemory::filled(&tile, 512, 1u8);
        assert_eq!(memory.as_ptr(), pointer);
        assert!(memory.iter().all(|value| *value == 1));
    }

    #[test_log::test]
    fn large_buffers_are_freed_on_release() {
        let tile = tile(4);
        drop(SharedMemory::filled(&tile, 1 << 20, 0u8));

        let memory = SharedMemory::filled(&tile, 1, 1u8);
        assert!(memory.data.capacity() <= MAX_RECYCLED_CAPACITY);
        assert_eq!(&memory[..], &[1]);

        // Buffers within the bound still come back from the arena.
        let small = SharedMemory::filled(&tile, MAX_RECYCLED_CAPACITY, 0u16);
        let pointer = small.as_ptr();
        drop(small);
        assert_eq!(SharedMemory::filled(&tile, 8, 2u16).as_ptr(), pointer);
    }
}
