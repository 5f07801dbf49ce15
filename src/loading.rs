//! Loading indicators for in-flight requests
//!
//! Every operation accepts an optional [`Loading`] observer. It is told `true`
//! right before the request is sent and `false` once the request settles,
//! whether it succeeded, failed, or the future was dropped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives loading state changes for a single request
pub trait LoadingObserver: Send + Sync {
    fn set_loading(&self, loading: bool);
}

impl<F> LoadingObserver for F
where
    F: Fn(bool) + Send + Sync,
{
    fn set_loading(&self, loading: bool) {
        self(loading)
    }
}

/// A shared boolean that can be polled while a request is in flight
#[derive(Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a request using this flag is currently in flight
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl LoadingObserver for LoadingFlag {
    fn set_loading(&self, loading: bool) {
        self.0.store(loading, Ordering::SeqCst);
    }
}

impl fmt::Debug for LoadingFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LoadingFlag").field(&self.is_loading()).finish()
    }
}

/// Cloneable handle to a [`LoadingObserver`], accepted by every operation
#[derive(Clone)]
pub struct Loading(Arc<dyn LoadingObserver>);

impl Loading {
    pub fn new(observer: impl LoadingObserver + 'static) -> Self {
        Self(Arc::new(observer))
    }

    /// Notify `true` now and `false` when the returned guard is dropped
    pub(crate) fn start(&self) -> LoadingGuard<'_> {
        self.0.set_loading(true);
        LoadingGuard(self)
    }
}

impl<O> From<O> for Loading
where
    O: LoadingObserver + 'static,
{
    fn from(observer: O) -> Self {
        Self::new(observer)
    }
}

impl fmt::Debug for Loading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Loading(..)")
    }
}

pub(crate) struct LoadingGuard<'a>(&'a Loading);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_flag_follows_guard() {
        let flag = LoadingFlag::new();
        let loading = Loading::from(flag.clone());
        assert!(!flag.is_loading());

        {
            let _guard = loading.start();
            assert!(flag.is_loading());
        }

        assert!(!flag.is_loading());
    }

    #[test]
    fn test_closure_observer_sees_true_then_false() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let loading = Loading::new(move |state: bool| sink.lock().unwrap().push(state));

        drop(loading.start());

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_cloned_handles_share_observer() {
        let flag = LoadingFlag::new();
        let loading = Loading::from(flag.clone());
        let other = loading.clone();

        let guard = other.start();
        assert!(flag.is_loading());
        drop(guard);
        assert!(!flag.is_loading());
    }
}
