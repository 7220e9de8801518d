//! The `resolves` / `rejects` wrapper.
//!
//! An [`AsyncAssertion`] exposes the same matcher surface as
//! [`Assertion`](crate::Assertion), but every call first awaits the wrapped
//! promise and runs the matcher on the fulfillment value (`resolves`) or
//! the rejection reason (`rejects`). Settling the other way fails with
//! [`ExpectError::Async`].
//!
//! ```
//! use layered_expect::{expect, Promise};
//!
//! # futures::executor::block_on(async {
//! expect(Promise::resolve(3)).resolves().to_be(3).await.unwrap();
//! expect(Promise::reject("nope")).rejects().not().to_be("yes").await.unwrap();
//! # });
//! ```

use std::panic::Location;

use tracing::debug;

use crate::assertion::{dispatch, nth_args, predicate_value, AsyncMode, Invocation};
use crate::errors::{AsyncAssertionError, ExpectError, ExpectResult};
use crate::format::stringify;
use crate::registry::lookup;
use crate::value::{Promise, Value};

/// An assertion over a pending value.
#[derive(Debug, Clone)]
pub struct AsyncAssertion {
    value: Value,
    mode: AsyncMode,
    is_not: bool,
    message: Option<String>,
    location: &'static Location<'static>,
}

impl AsyncAssertion {
    pub(crate) fn new(
        value: Value,
        mode: AsyncMode,
        is_not: bool,
        message: Option<String>,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            value,
            mode,
            is_not,
            message,
            location,
        }
    }

    /// Negate the verdict of the matcher that runs after unwrapping.
    pub fn not(&self) -> AsyncAssertion {
        AsyncAssertion {
            is_not: !self.is_not,
            ..self.clone()
        }
    }

    pub fn mode(&self) -> AsyncMode {
        self.mode
    }

    /// Await settlement, then run the matcher registered as `name`.
    pub async fn call(&self, name: &str, args: Vec<Value>) -> ExpectResult<()> {
        if lookup(name).is_none() {
            return Err(ExpectError::MatcherNotFound {
                name: name.to_string(),
            });
        }
        let promise = self.promise(name)?;

        let received = match (self.mode, promise.settle().await) {
            (AsyncMode::Rejects, Err(reason)) => reason,
            (AsyncMode::Rejects, Ok(value)) => {
                debug!("Expected rejection for {}, promise resolved", name);
                return Err(ExpectError::Async(AsyncAssertionError::Fulfilled {
                    matcher: name.to_string(),
                    is_not: self.is_not,
                    value: stringify(&value),
                }));
            }
            (_, Ok(value)) => value,
            (_, Err(reason)) => {
                debug!("Expected resolution for {}, promise rejected", name);
                return Err(ExpectError::Async(AsyncAssertionError::Rejected {
                    matcher: name.to_string(),
                    is_not: self.is_not,
                    reason: stringify(&reason),
                }));
            }
        };

        let invocation = Invocation {
            name,
            is_not: self.is_not,
            mode: self.mode,
            message: self.message.as_deref(),
            location: self.location,
        };
        dispatch(&invocation, &received, &args)
    }

    /// The wrapped promise; a function is called first to obtain it.
    fn promise(&self, name: &str) -> ExpectResult<Promise> {
        let value = match &self.value {
            Value::Function(f) => f.call(&[]).map_err(|thrown| {
                ExpectError::invalid_argument(
                    name,
                    format!(
                        "received function threw instead of returning a promise\n\nThrown: {}",
                        stringify(&thrown)
                    ),
                )
            })?,
            other => other.clone(),
        };
        match value {
            Value::Promise(promise) => Ok(promise),
            other => Err(ExpectError::invalid_argument(
                name,
                format!(
                    "received value must be a promise or a function returning a promise\n\nReceived: {}",
                    stringify(&other)
                ),
            )),
        }
    }

    builtin_matchers!(async_matcher_methods);

    pub async fn to_satisfy(&self, predicate: impl Fn(&Value) -> bool + 'static) -> ExpectResult<()> {
        self.call("toSatisfy", vec![predicate_value(predicate)]).await
    }

    pub async fn to_have_been_called_with(&self, args: Vec<Value>) -> ExpectResult<()> {
        self.call("toHaveBeenCalledWith", args).await
    }

    pub async fn to_have_been_last_called_with(&self, args: Vec<Value>) -> ExpectResult<()> {
        self.call("toHaveBeenLastCalledWith", args).await
    }

    pub async fn to_have_been_nth_called_with(&self, n: usize, args: Vec<Value>) -> ExpectResult<()> {
        self.call("toHaveBeenNthCalledWith", nth_args(n, args)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{expect, ExpectError, Promise, Value};
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[tokio::test]
    async fn test_resolves_unwraps_value() {
        expect(Promise::resolve(5)).resolves().to_be(5).await.unwrap();
        expect(Promise::resolve(5)).resolves().not().to_be(6).await.unwrap();
        assert!(expect(Promise::resolve(5)).resolves().to_be(6).await.is_err());
    }

    #[tokio::test]
    async fn test_resolves_fails_on_rejection() {
        let error = expect(Promise::reject(Value::error("nope")))
            .resolves()
            .to_be(5)
            .await
            .unwrap_err();
        assert!(matches!(error, ExpectError::Async(_)));
        assert!(error.to_string().contains("Rejected to value: [Error: nope]"));
    }

    #[tokio::test]
    async fn test_rejects_unwraps_reason() {
        let reason = Value::from(json!({"code": 42}));
        expect(Promise::reject(reason))
            .rejects()
            .to_equal(json!({"code": 42}))
            .await
            .unwrap();
        let error = expect(Promise::resolve(1)).rejects().to_be(1).await.unwrap_err();
        assert!(matches!(error, ExpectError::Async(_)));
    }

    #[tokio::test]
    async fn test_not_composes_after_unwrapping() {
        // A rejected promise still fails `.resolves.not`.
        let result = expect(Promise::reject(1)).resolves().not().to_be(2).await;
        assert!(matches!(result, Err(ExpectError::Async(_))));
        // The negation applies to the matcher verdict.
        expect(Promise::resolve(1)).resolves().not().to_be(2).await.unwrap();
    }

    #[tokio::test]
    async fn test_settlement_failure_shows_negation() {
        let error = expect(Promise::reject(1)).resolves().not().to_be(2).await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "expect(received).resolves.not.toBe()\n\nReceived promise rejected instead of resolved\nRejected to value: 1"
        );

        let error = expect(Promise::resolve("ok")).rejects().not().to_equal(1).await.unwrap_err();
        match error {
            ExpectError::Async(async_error) => {
                assert!(async_error.is_not());
                assert_eq!(async_error.matcher(), "toEqual");
                assert_eq!(async_error.hint(), "expect(received).rejects.not.toEqual()");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_function_returning_promise() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let make = Value::function("make", move |_| {
            counter.set(counter.get() + 1);
            Ok(Value::Promise(Promise::resolve("done")))
        });
        expect(make).resolves().to_be("done").await.unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_non_promise_is_invalid() {
        let error = expect(5).resolves().to_be(5).await.unwrap_err();
        assert!(matches!(error, ExpectError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_unknown_matcher_checked_before_awaiting() {
        let error = expect(5).resolves().call("toBeShiny", vec![]).await.unwrap_err();
        assert!(matches!(error, ExpectError::MatcherNotFound { .. }));
    }

    #[tokio::test]
    async fn test_pending_future_settles() {
        let (sender, receiver) = futures::channel::oneshot::channel::<i32>();
        let promise = Promise::new(async move {
            match receiver.await {
                Ok(n) => Ok(Value::from(n)),
                Err(_) => Err(Value::error("cancelled")),
            }
        });
        let assertion = expect(promise);
        sender.send(7).unwrap();
        assertion.resolves().to_be_greater_than(6).await.unwrap();
    }
}
