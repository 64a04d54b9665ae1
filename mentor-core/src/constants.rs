//! Client constants: endpoint timeouts, cache lifetimes, configuration keys.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// BACKEND
// ═══════════════════════════════════════════════════════════════════════════════

/// Backend base URL when none is configured (the FastAPI dev server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Prefix of the tutoring endpoints.
pub const TUTOR_PREFIX: &str = "/api";

/// Prefix of the teacher portal endpoints.
pub const TEACHER_PREFIX: &str = "/api/teacher";

/// Prefix of the student portal endpoints.
pub const STUDENT_PREFIX: &str = "/api/student";

// ═══════════════════════════════════════════════════════════════════════════════
// TIMEOUT TIERS
// ═══════════════════════════════════════════════════════════════════════════════
// Generation endpoints run LLM calls on the backend and routinely take tens of
// seconds; ordinary reads should fail fast.

/// Budget for ordinary reads and writes.
pub const STANDARD_TIMEOUT: Duration = Duration::from_secs(15);

/// Budget for polling-style reads (generation status).
pub const POLLING_TIMEOUT: Duration = Duration::from_secs(45);

/// Budget for AI generation calls.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(180);

/// Budget for fetching a token from the session provider.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(5);

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE LIFETIMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifetime of classroom, document and activity listings.
pub const LIST_TTL: Duration = Duration::from_secs(30);

/// Lifetime of progress, recommendations and analytics.
pub const PROGRESS_TTL: Duration = Duration::from_secs(60);

/// Lifetime of concept catalog reads.
pub const CONCEPT_TTL: Duration = Duration::from_secs(600);

/// Lifetime of the persisted teaching-examples list.
pub const TEACHING_EXAMPLES_TTL: Duration = Duration::from_secs(600);

/// Interval between background sweeps of the response cache.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Maximum number of entries held by the response cache.
pub const MAX_CACHE_ENTRIES: usize = 1000;

/// Storage key of the persisted teaching-examples list.
pub const TEACHING_EXAMPLES_KEY: &str = "teaching_examples";

/// File name of the persistent store inside the cache directory.
pub const STORE_FILE_NAME: &str = "mentor-store.json";

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Backend base URL.
pub const ENV_API_URL: &str = "MENTOR_API_URL";

/// Standard timeout override, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "MENTOR_TIMEOUT_SECS";

/// Polling timeout override, in seconds.
pub const ENV_POLLING_TIMEOUT_SECS: &str = "MENTOR_POLLING_TIMEOUT_SECS";

/// Generation timeout override, in seconds.
pub const ENV_GENERATION_TIMEOUT_SECS: &str = "MENTOR_GENERATION_TIMEOUT_SECS";

/// Set to `false` or `0` to disable response caching.
pub const ENV_ENABLE_CACHE: &str = "MENTOR_ENABLE_CACHE";

/// Sweep interval override, in seconds.
pub const ENV_SWEEP_INTERVAL_SECS: &str = "MENTOR_SWEEP_INTERVAL_SECS";

/// Directory holding the persistent store.
pub const ENV_CACHE_DIR: &str = "MENTOR_CACHE_DIR";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_tiers_are_ordered() {
        assert!(STANDARD_TIMEOUT < POLLING_TIMEOUT);
        assert!(POLLING_TIMEOUT < GENERATION_TIMEOUT);
        assert!(SESSION_TIMEOUT < STANDARD_TIMEOUT);
    }

    #[test]
    fn test_prefixes_nest() {
        assert!(TEACHER_PREFIX.starts_with(TUTOR_PREFIX));
        assert!(STUDENT_PREFIX.starts_with(TUTOR_PREFIX));
    }
}
