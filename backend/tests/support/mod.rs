//! Shared helpers for the PostgreSQL integration suites.

pub mod pg_embed;

/// Whether `SKIP_TEST_CLUSTER` asks for database suites to be skipped.
///
/// Accepts `1`, `true` or `yes`, case-insensitively.
pub fn skip_requested() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .is_ok_and(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Report a database that could not be provisioned.
///
/// Skips with a `SKIP-TEST-CLUSTER` marker when [`skip_requested`], and
/// panics otherwise so a broken environment never passes silently.
pub fn cluster_unavailable<T>(reason: impl std::fmt::Display) -> Option<T> {
    if skip_requested() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("test database setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
