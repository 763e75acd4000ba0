//! # **SlicePool** - *Reference-counted arena of Slices*
//!
//! Purely a reference-counted handle: the pool's structure (which Slices it
//! holds) is immutable once the builder returns. The Slices themselves are
//! mutated in place only by the reindex engine (`kernels::reindex`), under
//! the single-column-reader invariant enforced here via `ColumnAccess`.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::enums::error::SliceError;
use crate::structs::slice::{ConfigState, Slice};

struct PoolInner {
    slices: Vec<Slice>,
    /// Identity of the view currently holding the single column-access guard, if any.
    active_reader: Option<ConfigState>,
}

/// Shared handle to an arena of `Slice`s. Cloning is O(1) (reference-count bump).
///
/// Single-threaded cooperative use only — the arena is an `Rc<RefCell<…>>`
/// rather than a thread-safe `Arc<Mutex<…>>`: nothing in this engine's
/// view/iteration layer suspends or crosses threads, and the builder's
/// internal parallelism is confined to construction, before any pool handle
/// exists.
#[derive(Clone)]
pub struct SlicePool(Rc<RefCell<PoolInner>>);

impl SlicePool {
    pub(crate) fn from_slices(slices: Vec<Slice>) -> Self {
        Self(Rc::new(RefCell::new(PoolInner { slices, active_reader: None })))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn with_slice<R>(&self, index: usize, f: impl FnOnce(&Slice) -> R) -> R {
        f(&self.0.borrow().slices[index])
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn with_slice_mut<R>(&self, index: usize, f: impl FnOnce(&mut Slice) -> R) -> R {
        f(&mut self.0.borrow_mut().slices[index])
    }

    pub(crate) fn with_slices_mut<R>(&self, f: impl FnOnce(&mut [Slice]) -> R) -> R {
        f(&mut self.0.borrow_mut().slices)
    }

    /// A read guard over the whole slice arena, for iterators that need to
    /// hand out borrowed `&[Entry]`/`&[ColEntry]` slices across several calls
    /// without re-borrowing each time.
    pub(crate) fn borrow_slices(&self) -> Ref<'_, Vec<Slice>> {
        Ref::map(self.0.borrow(), |inner| &inner.slices)
    }

    /// Acquires the single column-access guard for `desired_state`. Succeeds
    /// immediately if no other view currently holds it, or if the current
    /// holder is the same view (re-entrant). Fails if a *different* view's
    /// guard is still alive.
    pub(crate) fn acquire_column_access(&self, desired_state: ConfigState) -> Result<ColumnAccess, SliceError> {
        let mut inner = self.0.borrow_mut();
        match inner.active_reader {
            Some(holder) if holder != desired_state => Err(SliceError::ConcurrentColumnAccess),
            _ => {
                inner.active_reader = Some(desired_state);
                Ok(ColumnAccess { pool: self.clone(), token: desired_state })
            }
        }
    }

    fn release_column_access(&self, token: ConfigState) {
        let mut inner = self.0.borrow_mut();
        if inner.active_reader == Some(token) {
            inner.active_reader = None;
        }
    }
}

/// RAII proof that its holder is the sole column-iterating view over a pool.
///
/// Dropping the guard releases the invariant; it is re-acquired by the next
/// `View::column_iterator` call (possibly by the same view, cheaply).
pub struct ColumnAccess {
    pool: SlicePool,
    token: ConfigState,
}

impl Drop for ColumnAccess {
    fn drop(&mut self) {
        self.pool.release_column_access(self.token);
    }
}
