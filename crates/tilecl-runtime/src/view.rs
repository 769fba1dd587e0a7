use core::marker::PhantomData;

use crate::Element;

/// Read-only random access to global memory.
///
/// Algorithms read their inputs through a view, so an input can be a slice or computed on the
/// fly from its index.
pub trait View: Sync {
    /// The element type of the view.
    type Item: Element;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Reads the element at `index`, which must be in bounds.
    fn read(&self, index: usize) -> Self::Item;

    /// Whether the view has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Element> View for [T] {
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn read(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Element> View for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn read(&self, index: usize) -> T {
        self[index]
    }
}

/// A view whose elements are computed from their index.
#[derive(Debug, Clone, Copy)]
pub struct FnView<T, F> {
    len: usize,
    func: F,
    _item: PhantomData<fn() -> T>,
}

impl<T: Element, F: Fn(usize) -> T + Sync> FnView<T, F> {
    /// Creates a view of `len` elements, element `i` being `func(i)`.
    pub fn new(len: usize, func: F) -> Self {
        Self {
            len,
            func,
            _item: PhantomData,
        }
    }
}

impl<T: Element, F: Fn(usize) -> T + Sync> View for FnView<T, F> {
    type Item = T;

    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, index: usize) -> T {
        (self.func)(index)
    }
}

/// Shared mutable access to a global buffer, used by kernels that scatter.
///
/// Tiles of a launch run concurrently, so two tiles must never access the same index through
/// the same view while one of them writes it. Kernels writing contiguous tile ranges should use
/// [ComputeClient::launch_mut](crate::ComputeClient::launch_mut) instead.
#[derive(Debug)]
pub struct GlobalMut<'a, T> {
    ptr: *mut T,
    len: usize,
    _buffer: PhantomData<&'a mut [T]>,
}

impl<T> Clone for GlobalMut<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for GlobalMut<'_, T> {}

// SAFETY: the view only moves `T` values between threads, callers guarantee the accesses are
// disjoint.
unsafe impl<T: Send> Send for GlobalMut<'_, T> {}
// SAFETY: see above.
unsafe impl<T: Send> Sync for GlobalMut<'_, T> {}

impl<'a, T: Copy> GlobalMut<'a, T> {
    /// Borrows `buffer` for the duration of a launch.
    pub fn new(buffer: &'a mut [T]) -> Self {
        Self {
            ptr: buffer.as_mut_ptr(),
            len: buffer.len(),
            _buffer: PhantomData,
        }
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writes `value` at `index`.
    ///
    /// # Safety
    ///
    /// No other access to `index` may happen concurrently with this write.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub unsafe fn write(&self, index: usize, value: T) {
        assert!(
            index < self.len,
            "Write out of bounds: the index is {index} but the len is {}",
            self.len
        );
        // SAFETY: in bounds, and exclusive by the caller's contract.
        unsafe { self.ptr.add(index).write(value) }
    }

    /// Reads the value at `index`.
    ///
    /// # Safety
    ///
    /// No write to `index` may happen concurrently with this read.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub unsafe fn read(&self, index: usize) -> T {
        assert!(
            index < self.len,
            "Read out of bounds: the index is {index} but the len is {}",
            self.len
        );
        // SAFETY: in bounds, and not racing with a write by the caller's contract.
        unsafe { self.ptr.add(index).read() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test_log::test]
    fn fn_view_computes_elements_from_their_index() {
        let view = FnView::new(5, |i| (i * i) as u32);

        assert_eq!(view.len(), 5);
        assert_eq!(view.read(3), 9);
        assert!(FnView::new(0, |i| i).is_empty());
    }

    #[test_log::test]
    fn slices_and_vecs_are_views() {
        let values = vec![3u8, 1, 4];

        assert_eq!(View::len(&values), 3);
        assert_eq!(View::read(values.as_slice(), 2), 4);
    }

    #[test_log::test]
    fn scatter_through_a_permutation() {
        let input = (0..1000u32).collect::<Vec<_>>();
        let mut output = vec![0u32; 1000];
        let view = GlobalMut::new(&mut output);

        input.par_iter().for_each(|value| {
            // SAFETY: `999 - value` is a permutation of the indices.
            unsafe { view.write(999 - *value as usize, *value) };
        });

        assert!(output.iter().rev().copied().eq(0..1000));
    }

    #[test_log::test]
    #[should_panic]
    fn write_out_of_bounds_panics() {
        let mut output = vec![0u32; 4];
        let view = GlobalMut::new(&mut output);

        // SAFETY: single threaded.
        unsafe { view.write(4, 1) };
    }
}
