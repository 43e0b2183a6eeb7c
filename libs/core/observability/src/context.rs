//! Request-scoped correlation context.
//!
//! A [`CorrelationScope`] is bound to a task with [`run`] and is visible to everything
//! that executes inside that future, across every `.await`, without passing it
//! through function arguments. Concurrent requests on the same worker threads each
//! see their own scope.
//!
//! The scope is also mirrored into a `request` tracing span carrying a
//! `correlation_id` field, so every log line emitted while handling the request is
//! annotated with the identifier.
//!
//! ```ignore
//! observability::context::run(async {
//!     let id = observability::context::current_correlation_id();
//!     tracing::info!("handling request"); // tagged with correlation_id
//! })
//! .await;
//! ```

use rand::Rng;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span};

/// Upper bound (exclusive) of generated identifiers; fits exactly in an IEEE-754 double.
const MAX_CORRELATION_ID: u64 = (1 << 53) - 1;

tokio::task_local! {
    static CORRELATION: CorrelationScope;
}

/// Ambient data of one logical request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationScope {
    correlation_id: String,
}

impl CorrelationScope {
    /// Scope with a freshly generated identifier.
    pub fn generate() -> Self {
        let id = rand::rng().random_range(0..MAX_CORRELATION_ID);
        Self {
            correlation_id: id.to_string(),
        }
    }

    /// Scope with a known identifier.
    pub fn with_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    fn span(&self) -> Span {
        tracing::info_span!("request", correlation_id = %self.correlation_id)
    }
}

/// Run `future` inside a new scope with a freshly generated correlation identifier.
///
/// Whatever `future` returns is returned unchanged.
pub async fn run<F>(future: F) -> F::Output
where
    F: Future,
{
    run_with(CorrelationScope::generate(), future).await
}

/// Run `future` inside the given scope. An enclosing scope is shadowed for the duration.
pub async fn run_with<F>(scope: CorrelationScope, future: F) -> F::Output
where
    F: Future,
{
    let span = scope.span();
    CORRELATION.scope(scope, future.instrument(span)).await
}

/// The current scope, if the caller runs inside one.
pub fn current_scope() -> Option<CorrelationScope> {
    CORRELATION.try_with(Clone::clone).ok()
}

/// Correlation identifier of the innermost active scope, or `None` outside any scope.
pub fn current_correlation_id() -> Option<String> {
    CORRELATION
        .try_with(|scope| scope.correlation_id.clone())
        .ok()
}

/// Spawn a detached task that stays in the caller's scope and span.
///
/// Task-local values do not cross `tokio::spawn` on their own; use this for any
/// continuation that may outlive the request but must still be attributed to it.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let span = Span::current();
    match current_scope() {
        Some(scope) => tokio::spawn(CORRELATION.scope(scope, future.instrument(span))),
        None => tokio::spawn(future.instrument(span)),
    }
}
