use serde_json::json;

/// Centralized error rendering for shell commands.
///
/// Every failure becomes one JSON line so a front end reading stdout never
/// has to tell prose from snapshots.
pub fn error_line(err: &anyhow::Error) -> String {
    json!({ "error": format!("{err:#}") }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn error_line_includes_the_context_chain() {
        let err = Err::<(), _>(anyhow::anyhow!("boom"))
            .context("Failed to submit")
            .unwrap_err();
        let value: serde_json::Value = serde_json::from_str(&error_line(&err)).unwrap();
        assert_eq!(value["error"], "Failed to submit: boom");
    }
}
