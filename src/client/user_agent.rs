//! User agent handling for catalog requests.

pub const USER_AGENT: &str = concat!(
    "anidex/",
    env!("CARGO_PKG_VERSION"),
    " (catalog browser; rate-limit aware)"
);

/// Resolve user agent from config value.
/// - None or empty => default anidex user agent
/// - custom => custom user agent string
pub fn resolve_user_agent(config_value: Option<&str>) -> String {
    match config_value {
        Some(ua) if !ua.trim().is_empty() => ua.to_string(),
        _ => USER_AGENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent() {
        assert_eq!(resolve_user_agent(None), USER_AGENT);
        assert_eq!(resolve_user_agent(Some("  ")), USER_AGENT);
        assert_eq!(resolve_user_agent(Some("custom/1.0")), "custom/1.0");
    }
}
