//! Structured logging field name constants for casenote.
//!
//! All crates use these constants for consistent structured logging fields,
//! so aggregation tooling can query by standardized names across the fetch
//! pipeline and the API surface.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, best-effort fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-item iteration (per-note enrichment outcomes) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → fetch sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "client", "api", "timeline"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "fetch_summaries", "fetch_detail", "aggregate"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Source (EHR) identifier being aggregated.
pub const EHR_ID: &str = "ehr_id";

/// Composition identifier of the note being enriched.
pub const COMPOSITION_ID: &str = "composition_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of notes in a fetched or aggregated batch.
pub const NOTE_COUNT: &str = "note_count";

/// HTTP status returned by an upstream view.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
