//! Operators and Pipeline Composition
//!
//! An operator is a pure `Stream -> Stream` transform. Operators create no
//! shared state between invocations: applying one builds a new stream
//! whose subscribe procedure interposes a relay consumer between the
//! downstream safety wrapper and the upstream stream, so the safety
//! guarantees never need re-deriving per operator.
//!
//! Two equivalent composition styles are supported:
//!
//! - Direct chaining: `stream.map(f).map(g)`
//! - Pipeline: `pipe!(stream, map(f), map(g))` — a left fold, applying
//!   operators in order.
//!
//! Both must produce identical delivery sequences for any input.

use std::sync::Arc;

use super::engine::Stream;

/// Build a `map` operator from a projection function.
///
/// The returned operator transforms a `Stream<T, E>` into a
/// `Stream<U, E>` that emits `project(value)` for every upstream value,
/// forwarding `error` and `complete` unchanged. One upstream emission
/// causes exactly one downstream emission, preserving order.
///
/// # Example
///
/// ```rust,ignore
/// let doubled = pipe!(source, map(|x| x + x));
/// ```
pub fn map<T, U, E, F>(project: F) -> impl Fn(Stream<T, E>) -> Stream<U, E>
where
    T: Send + 'static,
    U: 'static,
    E: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let project = Arc::new(project);
    move |source: Stream<T, E>| {
        let project = Arc::clone(&project);
        source.map(move |value| project(value))
    }
}

/// Left-fold a source stream through an ordered sequence of operators.
///
/// `pipe!(source, op1, op2)` is exactly `op2(op1(source))`, and is
/// behaviorally identical to applying the operators by direct chaining.
#[macro_export]
macro_rules! pipe {
    ($source:expr $(, $op:expr)* $(,)?) => {{
        let stream = $source;
        $(let stream = ($op)(stream);)*
        stream
    }};
}
