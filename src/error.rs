use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `nutrilens`.
///
/// Only the edges of the system fail: inbound requests, the generator call
/// and the HTTP gateway. The directive pipeline itself is total and never
/// produces one of these. Config loading reports [`ConfigError`] through
/// `anyhow` context instead.
#[derive(Debug, Error)]
pub enum LensError {
    // ── Inbound request ─────────────────────────────────────────────────
    #[error("request: {0}")]
    Request(#[from] RequestError),

    // ── Generator ───────────────────────────────────────────────────────
    #[error("generator: {0}")]
    Generator(#[from] GeneratorError),

    // ── Gateway ─────────────────────────────────────────────────────────
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Request errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("request body is not valid JSON: {0}")]
    Body(String),

    #[error("image payload must be at least {min} characters")]
    ImageTooShort { min: usize },

    #[error("either an image or a user context is required")]
    NothingToAnalyze,
}

// ─── Generator errors ────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("generator {generator} request failed: {message}")]
    Request { generator: String, message: String },

    #[error("generator {generator} returned no result")]
    Empty { generator: String },

    #[error("generator timed out after {secs}s")]
    Timeout { secs: u64 },
}

// ─── Gateway errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("refusing to bind to public address {host} (set gateway.allow_public_bind to override)")]
    PublicBind { host: String },

    #[error("bind {addr} failed: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, LensError>;
