//! Telemetry helpers for hosts embedding `sales-lens`.
//!
//! Tracing setup stays explicit and opt-in. The dashboard only emits events
//! through the `tracing` macros: dispatch summaries at `debug`, per-event
//! routing at `trace`, rejected frames and cascade overflows at `warn`.

/// Environment variable read by `init_default_tracing` before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "SALES_LENS_LOG";

/// Filter used when neither environment variable is set.
pub const DEFAULT_DIRECTIVES: &str = "sales_lens=info";

/// Installs a compact fmt subscriber filtered by `SALES_LENS_LOG`, then
/// `RUST_LOG`, then `DEFAULT_DIRECTIVES`.
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    let directives = std::env::var(LOG_ENV_VAR)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_DIRECTIVES.to_owned());
    init_tracing_with_directives(&directives)
}

/// Installs a compact fmt subscriber for explicit filter directives such as
/// `"sales_lens::api=trace"`. Unparseable directives fall back to
/// `DEFAULT_DIRECTIVES`.
#[must_use]
pub fn init_tracing_with_directives(directives: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_new(directives)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}
