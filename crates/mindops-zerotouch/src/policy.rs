//! Bridges a serialized sampling-policy decision (from
//! [`mindops_telemetry::SamplingAdvisor`] or a hand-authored file) into a
//! collector sampling rate.

use serde_json::Value;

fn action_to_rate(action: &str) -> Option<f64> {
    match action {
        "decrease_sampling" => Some(0.2),
        "maintain_sampling" => Some(0.5),
        "increase_sampling" => Some(1.0),
        _ => None,
    }
}

/// Accepts either `{"sampling_rate": 0.4}` or `{"sampling_action": "..."}`
/// (also tolerating the `action` key).
pub fn load_sampling_policy(raw: &Value) -> Option<f64> {
    let obj = raw.as_object()?;
    if let Some(rate) = obj.get("sampling_rate").and_then(Value::as_f64) {
        return Some(rate);
    }
    let action = obj
        .get("sampling_action")
        .or_else(|| obj.get("action"))
        .and_then(Value::as_str)?;
    action_to_rate(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_rate_takes_precedence() {
        let raw = json!({"sampling_rate": 0.4, "sampling_action": "increase_sampling"});
        assert_eq!(load_sampling_policy(&raw), Some(0.4));
    }

    #[test]
    fn action_maps_to_known_rate() {
        let raw = json!({"sampling_action": "decrease_sampling"});
        assert_eq!(load_sampling_policy(&raw), Some(0.2));
    }

    #[test]
    fn unknown_shape_yields_none() {
        assert_eq!(load_sampling_policy(&json!({"foo": "bar"})), None);
    }
}
