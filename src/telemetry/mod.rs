//! Telemetry Module
//!
//! Carries the causal trace context across service calls and sets up logging.
//!
//! - **`context`**: `TraceContext`, the opaque key/value carrier every operation receives and
//!   hands to its collaborators after injecting a child span.
//! - **`logging`**: Initialisation of the `tracing` fmt subscriber.

pub mod context;
pub mod logging;
