use crate::util::parse_bool_str;
use serde_json::Value;

const DEBUG_PAYLOAD_ENV: &str = "DELEGERING_DEBUG_PAYLOAD";

pub fn debug_payload_enabled() -> bool {
    std::env::var(DEBUG_PAYLOAD_ENV)
        .ok()
        .and_then(|v| parse_bool_str(&v))
        .unwrap_or(false)
}

pub fn emit_debug_request(request_url: &str, payload: &Value) {
    tracing::debug!(
        target: "delegering::payload",
        url = request_url,
        payload = %pretty(payload),
        "chat request"
    );
}

pub fn emit_debug_reply(request_url: &str, status: u16, body: &Value) {
    tracing::debug!(
        target: "delegering::payload",
        url = request_url,
        status,
        body = %pretty(body),
        "chat reply"
    );
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| "<payload serialization error>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_payload_enabled_accepts_true_variants() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::set_var(DEBUG_PAYLOAD_ENV, "1");
        assert!(debug_payload_enabled());
        std::env::set_var(DEBUG_PAYLOAD_ENV, "TRUE");
        assert!(debug_payload_enabled());
        std::env::set_var(DEBUG_PAYLOAD_ENV, "nej");
        assert!(!debug_payload_enabled());
        std::env::remove_var(DEBUG_PAYLOAD_ENV);
        assert!(!debug_payload_enabled());
    }
}
