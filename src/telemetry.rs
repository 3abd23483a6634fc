use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging for the service.
///
/// JSON output with span context, filtered through `RUST_LOG` with an INFO
/// default. Embedding applications that bring their own subscriber should
/// skip this and install theirs instead.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("careflow telemetry initialized with structured logging");
    Ok(())
}

/// Create a span carrying the common attributes of a service operation.
pub fn create_service_span(operation: &str, program_name: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "program_workflow",
        operation = operation,
        program.name = program_name,
    )
}
