use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

/// A forward-only cursor over ledger results.
///
/// A cursor holds an external resource until [`close`](Self::close) is
/// called. Callers should not hold a bare cursor; wrap it in a
/// [`ScopedCursor`] instead.
pub trait RecordCursor<T>: Send {
    /// Fetch the next record, or `Ok(None)` once exhausted.
    fn next_record(&mut self) -> StoreResult<Option<T>>;

    /// Release the underlying resource. Closing twice is a no-op.
    fn close(&mut self) -> StoreResult<()>;
}

/// Boxed cursor as returned by [`QueryStore`](crate::QueryStore) and
/// [`HistoryStore`](crate::HistoryStore).
pub type BoxCursor<T> = Box<dyn RecordCursor<T>>;

/// Owns a cursor and closes it exactly once, on every exit path.
///
/// Iterating yields `StoreResult<T>`; an `Err` item means the cursor failed
/// mid-iteration. The cursor is closed by [`close`](Self::close) or, if the
/// caller returns early, on drop.
pub struct ScopedCursor<T> {
    inner: Option<BoxCursor<T>>,
}

impl<T> ScopedCursor<T> {
    pub fn new(cursor: BoxCursor<T>) -> Self {
        Self {
            inner: Some(cursor),
        }
    }

    /// Close the cursor now and report any close failure.
    pub fn close(mut self) -> StoreResult<()> {
        self.release()
    }

    fn release(&mut self) -> StoreResult<()> {
        match self.inner.take() {
            Some(mut cursor) => cursor.close(),
            None => Ok(()),
        }
    }
}

impl<T> Iterator for ScopedCursor<T> {
    type Item = StoreResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.inner.as_mut()?;
        match cursor.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<T> Drop for ScopedCursor<T> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "failed to close ledger cursor");
        }
    }
}

/// Cursor over an already materialized result set.
///
/// When built with [`tracked`](Self::tracked), the shared counter is
/// incremented while the cursor is open so a backend can report leaks.
pub struct VecCursor<T> {
    items: std::vec::IntoIter<T>,
    open: Option<Arc<AtomicUsize>>,
    closed: bool,
}

impl<T> VecCursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter(),
            open: None,
            closed: false,
        }
    }

    pub fn tracked(items: Vec<T>, open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self {
            items: items.into_iter(),
            open: Some(open),
            closed: false,
        }
    }
}

impl<T: Send> RecordCursor<T> for VecCursor<T> {
    fn next_record(&mut self) -> StoreResult<Option<T>> {
        if self.closed {
            return Err(StoreError::CursorClosed);
        }
        Ok(self.items.next())
    }

    fn close(&mut self) -> StoreResult<()> {
        if !self.closed {
            self.closed = true;
            if let Some(open) = &self.open {
                open.fetch_sub(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cursor that fails on a chosen call and records whether it was closed.
    struct FailingCursor {
        remaining: Vec<u32>,
        fail_at: usize,
        calls: usize,
        closed: Arc<AtomicUsize>,
    }

    impl RecordCursor<u32> for FailingCursor {
        fn next_record(&mut self) -> StoreResult<Option<u32>> {
            self.calls += 1;
            if self.calls == self.fail_at {
                return Err(StoreError::Unavailable("peer went away".into()));
            }
            Ok(if self.remaining.is_empty() {
                None
            } else {
                Some(self.remaining.remove(0))
            })
        }

        fn close(&mut self) -> StoreResult<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn vec_cursor_yields_in_order() {
        let scoped = ScopedCursor::new(Box::new(VecCursor::new(vec![1, 2, 3])));
        let items: Vec<u32> = scoped.map(|r| r.unwrap()).collect();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn tracked_cursor_counts_open_and_close() {
        let open = Arc::new(AtomicUsize::new(0));
        let cursor = VecCursor::tracked(vec![1u32], Arc::clone(&open));
        assert_eq!(open.load(Ordering::SeqCst), 1);

        let scoped = ScopedCursor::new(Box::new(cursor));
        scoped.close().unwrap();
        assert_eq!(open.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_closes_cursor() {
        let open = Arc::new(AtomicUsize::new(0));
        {
            let mut scoped =
                ScopedCursor::new(Box::new(VecCursor::tracked(vec![1u32, 2], Arc::clone(&open))));
            assert!(scoped.next().is_some());
            assert_eq!(open.load(Ordering::SeqCst), 1);
        }
        assert_eq!(open.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn closing_twice_is_harmless() {
        let open = Arc::new(AtomicUsize::new(0));
        let mut cursor = VecCursor::tracked(vec![1u32], Arc::clone(&open));
        cursor.close().unwrap();
        cursor.close().unwrap();
        assert_eq!(open.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn read_after_close_fails() {
        let mut cursor = VecCursor::new(vec![1u32]);
        cursor.close().unwrap();
        assert!(matches!(cursor.next_record(), Err(StoreError::CursorClosed)));
    }

    #[test]
    fn error_mid_iteration_still_closes() {
        let closed = Arc::new(AtomicUsize::new(0));
        let cursor = FailingCursor {
            remaining: vec![10, 20, 30],
            fail_at: 2,
            calls: 0,
            closed: Arc::clone(&closed),
        };

        let collected: StoreResult<Vec<u32>> = ScopedCursor::new(Box::new(cursor)).collect();
        assert!(matches!(collected, Err(StoreError::Unavailable(_))));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }
}
