use core::fmt::Debug;
use core::sync::atomic::{AtomicI32, AtomicI64, AtomicU32, AtomicU64, AtomicUsize, Ordering};

/// Primitive types with a native atomic counterpart.
pub trait AtomicPrimitive: Copy + Debug + Send + Sync + 'static {
    /// The atomic storage of the primitive.
    type Atomic: Send + Sync;

    /// Wraps a value into its atomic storage.
    fn atomic(value: Self) -> Self::Atomic;
    /// Atomically loads the value.
    fn load(atomic: &Self::Atomic, order: Ordering) -> Self;
    /// Atomically stores the value.
    fn store(atomic: &Self::Atomic, value: Self, order: Ordering);
    /// Atomically replaces the value, returning the previous one.
    fn swap(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self;
    /// Stores `new` if the current value is `current`.
    fn compare_exchange(atomic: &Self::Atomic, current: Self, new: Self) -> Result<Self, Self>;
    /// Atomically adds, returning the previous value.
    fn fetch_add(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self;
    /// Atomically subtracts, returning the previous value.
    fn fetch_sub(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self;
    /// Atomically keeps the minimum, returning the previous value.
    fn fetch_min(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self;
    /// Atomically keeps the maximum, returning the previous value.
    fn fetch_max(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self;
}

macro_rules! impl_atomic_primitive {
    ($($primitive:ty => $atomic:ty),* $(,)?) => {
        $(
            impl AtomicPrimitive for $primitive {
                type Atomic = $atomic;

                fn atomic(value: Self) -> Self::Atomic {
                    <$atomic>::new(value)
                }

                fn load(atomic: &Self::Atomic, order: Ordering) -> Self {
                    atomic.load(order)
                }

                fn store(atomic: &Self::Atomic, value: Self, order: Ordering) {
                    atomic.store(value, order)
                }

                fn swap(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self {
                    atomic.swap(value, order)
                }

                fn compare_exchange(
                    atomic: &Self::Atomic,
                    current: Self,
                    new: Self,
                ) -> Result<Self, Self> {
                    atomic.compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire)
                }

                fn fetch_add(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self {
                    atomic.fetch_add(value, order)
                }

                fn fetch_sub(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self {
                    atomic.fetch_sub(value, order)
                }

                fn fetch_min(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self {
                    atomic.fetch_min(value, order)
                }

                fn fetch_max(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self {
                    atomic.fetch_max(value, order)
                }
            }
        )*
    };
}

impl_atomic_primitive!(
    u32 => AtomicU32,
    i32 => AtomicI32,
    u64 => AtomicU64,
    i64 => AtomicI64,
    usize => AtomicUsize,
);

/// Atomic cell used to coordinate the lanes of a tile, or tiles through global memory.
///
/// Stores use release ordering and loads acquire ordering: a value published with
/// [AtomicCell::store] by one tile makes every write that tile did before it visible to the tile
/// that observes the value.
pub struct AtomicCell<T: AtomicPrimitive> {
    inner: T::Atomic,
}

impl<T: AtomicPrimitive> AtomicCell<T> {
    /// Creates a new cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: T::atomic(value),
        }
    }

    /// Loads the current value.
    pub fn load(&self) -> T {
        T::load(&self.inner, Ordering::Acquire)
    }

    /// Publishes a new value.
    pub fn store(&self, value: T) {
        T::store(&self.inner, value, Ordering::Release)
    }

    /// Replaces the value, returning the previous one.
    pub fn exchange(&self, value: T) -> T {
        T::swap(&self.inner, value, Ordering::AcqRel)
    }

    /// Replaces the value with `new` if it equals `current`.
    ///
    /// Returns the previous value, as `Ok` on success and `Err` on failure.
    pub fn compare_exchange(&self, current: T, new: T) -> Result<T, T> {
        T::compare_exchange(&self.inner, current, new)
    }

    /// Adds `value`, returning the previous value.
    pub fn fetch_add(&self, value: T) -> T {
        T::fetch_add(&self.inner, value, Ordering::AcqRel)
    }

    /// Subtracts `value`, returning the previous value.
    pub fn fetch_sub(&self, value: T) -> T {
        T::fetch_sub(&self.inner, value, Ordering::AcqRel)
    }

    /// Keeps the minimum of the current value and `value`, returning the previous value.
    pub fn fetch_min(&self, value: T) -> T {
        T::fetch_min(&self.inner, value, Ordering::AcqRel)
    }

    /// Keeps the maximum of the current value and `value`, returning the previous value.
    pub fn fetch_max(&self, value: T) -> T {
        T::fetch_max(&self.inner, value, Ordering::AcqRel)
    }
}

impl<T: AtomicPrimitive + Default> Default for AtomicCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: AtomicPrimitive> Debug for AtomicCell<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicCell").field(&self.load()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test_log::test]
    fn cursors_claim_distinct_slots() {
        let front = AtomicCell::<usize>::new(0);
        let back = AtomicCell::<usize>::new(1000);

        let mut slots = (0..1000usize)
            .into_par_iter()
            .map(|i| match i % 3 == 0 {
                true => front.fetch_add(1),
                false => back.fetch_sub(1) - 1,
            })
            .collect::<Vec<_>>();
        slots.sort_unstable();

        assert_eq!(slots, (0..1000).collect::<Vec<_>>());
        assert_eq!(front.load(), back.load());
    }

    #[test_log::test]
    fn fetch_min_keeps_the_first_match() {
        let best = AtomicCell::<u64>::new(u64::MAX);
        (0..512u32).into_par_iter().rev().map(u64::from).for_each(|i| {
            if i % 7 == 5 {
                best.fetch_min(i);
            }
        });

        assert_eq!(best.load(), 5);
    }

    #[test_log::test]
    fn exchange_and_compare_exchange() {
        let cell = AtomicCell::<i32>::new(-3);

        assert_eq!(cell.exchange(4), -3);
        assert_eq!(cell.compare_exchange(4, 9), Ok(4));
        assert_eq!(cell.compare_exchange(4, 11), Err(9));
        assert_eq!(cell.fetch_max(2), 9);
        assert_eq!(cell.fetch_max(12), 9);
        assert_eq!(cell.load(), 12);
        cell.store(1);
        assert_eq!(format!("{cell:?}"), "AtomicCell(1)");
    }
}
