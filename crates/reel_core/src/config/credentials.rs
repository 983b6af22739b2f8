//! Provider credentials.
//!
//! Keys never live in the settings file; they are read once at startup
//! and shared read-only with every session.

use std::fmt;

/// Environment variable holding the text generation API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable holding the stock footage API key.
pub const PEXELS_API_KEY_VAR: &str = "PEXELS_API_KEY";

/// API keys for the outbound providers.
#[derive(Clone, Default)]
pub struct Credentials {
    pub gemini_api_key: Option<String>,
    pub pexels_api_key: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through a lookup function (testable env access).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            gemini_api_key: read(GEMINI_API_KEY_VAR),
            pexels_api_key: read(PEXELS_API_KEY_VAR),
        }
    }

    /// Names of the variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.gemini_api_key.is_none() {
            missing.push(GEMINI_API_KEY_VAR);
        }
        if self.pexels_api_key.is_none() {
            missing.push(PEXELS_API_KEY_VAR);
        }
        missing
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("gemini_api_key", &mask(&self.gemini_api_key))
            .field("pexels_api_key", &mask(&self.pexels_api_key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_count_as_missing() {
        let creds = Credentials::from_lookup(|name| match name {
            GEMINI_API_KEY_VAR => Some("abc".to_string()),
            PEXELS_API_KEY_VAR => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(creds.gemini_api_key.as_deref(), Some("abc"));
        assert_eq!(creds.missing(), vec![PEXELS_API_KEY_VAR]);
    }

    #[test]
    fn debug_masks_keys() {
        let creds = Credentials {
            gemini_api_key: Some("secret".to_string()),
            pexels_api_key: None,
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("<unset>"));
    }
}
