//! Pending values for the async wrapper.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture, Shared as SharedFuture};

use super::Value;

/// How a promise settled: `Ok` is fulfillment, `Err` is rejection.
pub type Settled = Result<Value, Value>;

/// A single-threaded pending value that settles once and can be awaited
/// any number of times.
#[derive(Clone)]
pub struct Promise {
    inner: SharedFuture<LocalBoxFuture<'static, Settled>>,
    identity: Rc<()>,
}

impl Promise {
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Settled> + 'static,
    {
        Self {
            inner: fut.boxed_local().shared(),
            identity: Rc::new(()),
        }
    }

    pub fn resolve(value: impl Into<Value>) -> Self {
        Self::new(future::ready(Ok(value.into())))
    }

    pub fn reject(reason: impl Into<Value>) -> Self {
        Self::new(future::ready(Err(reason.into())))
    }

    /// Wait for settlement.
    pub async fn settle(&self) -> Settled {
        self.inner.clone().await
    }

    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.identity, &other.identity)
    }

    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.identity) as usize
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Promise {}")
    }
}
