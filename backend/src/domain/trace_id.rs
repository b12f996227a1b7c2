//! Per-request correlation identifier.
//!
//! The [`crate::Trace`] middleware puts a [`TraceId`] in task-local scope for
//! the lifetime of each request. Errors built inside that scope record it, so
//! a client reporting a failure can quote the id that appears in the logs.
//! Task-locals do not follow `tokio::spawn` or `spawn_blocking`; wrap such work
//! in [`TraceId::scope`] when the id matters there.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

/// Header used both to accept a caller-supplied id and to echo the id back.
pub const TRACE_ID_HEADER: &str = "trace-id";

tokio::task_local! {
    static CURRENT: TraceId;
}

/// UUID naming one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Accept an id forwarded by a proxy or client. Anything that is not a
    /// UUID, or is the nil UUID, is ignored.
    pub(crate) fn from_header(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<Self>()
            .ok()
            .filter(|id| !id.0.is_nil())
    }

    /// The id of the request being served on this task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    ///
    /// ```
    /// use resource_library::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let id: TraceId = "3f1c2a8e-9b7d-4e55-a1d0-6c2f4b8e9a10".parse().unwrap();
    /// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    /// # });
    /// ```
    pub async fn scope<F: Future>(trace_id: Self, fut: F) -> F::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn scope_sets_and_clears_the_current_id() {
        let id = TraceId::random();
        assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
        assert_eq!(TraceId::current(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn spawned_tasks_do_not_inherit_the_id() {
        let id = TraceId::random();
        let seen = TraceId::scope(id, async {
            tokio::spawn(async { TraceId::current() })
                .await
                .expect("task joins")
        })
        .await;
        assert_eq!(seen, None);
    }

    #[rstest]
    #[case("3f1c2a8e-9b7d-4e55-a1d0-6c2f4b8e9a10", true)]
    #[case("  3f1c2a8e-9b7d-4e55-a1d0-6c2f4b8e9a10 ", true)]
    #[case("00000000-0000-0000-0000-000000000000", false)]
    #[case("req-42", false)]
    #[case("", false)]
    fn header_values_must_be_real_uuids(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(TraceId::from_header(raw).is_some(), accepted);
    }

    #[rstest]
    fn displays_as_hyphenated_lowercase() {
        let id: TraceId = "3F1C2A8E-9B7D-4E55-A1D0-6C2F4B8E9A10".parse().expect("uuid");
        assert_eq!(id.to_string(), "3f1c2a8e-9b7d-4e55-a1d0-6c2f4b8e9a10");
    }
}
