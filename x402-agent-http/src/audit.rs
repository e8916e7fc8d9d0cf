//! Audit trail for payment activity.
//!
//! One record is emitted per endpoint call, success or failure, under the
//! `x402_agent::audit` tracing target. Operators route this target to a
//! durable sink; it is the system's only record of payment activity.

use x402_agent::AgentError;

/// Tracing target audit records are emitted under.
pub const AUDIT_TARGET: &str = "x402_agent::audit";

/// Records a successful call.
pub fn success(endpoint_id: &str, tx_hash: Option<&str>, amount: Option<&str>) {
    tracing::info!(
        target: "x402_agent::audit",
        endpoint = endpoint_id,
        tx_hash,
        amount,
        status = "success",
        "Transaction success"
    );
}

/// Records a failed call.
pub fn failure(endpoint_id: &str, error: &AgentError) {
    tracing::error!(
        target: "x402_agent::audit",
        endpoint = endpoint_id,
        error = %error,
        status = "failed",
        "Transaction failed"
    );
}
