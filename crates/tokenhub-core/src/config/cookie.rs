//! Refresh cookie attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `SameSite` policy for the refresh cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Sent on top-level navigations and same-site requests.
    #[default]
    Lax,
    /// Sent on same-site requests only.
    Strict,
    /// Sent on all requests; browsers require `Secure` with it.
    None,
}

impl SameSite {
    /// Attribute value as it appears in a `Set-Cookie` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of the cookie that carries the refresh secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Cookie path.
    #[serde(default = "default_path")]
    pub path: String,
    /// Cookie domain; host-only when unset.
    #[serde(default)]
    pub domain: Option<String>,
    /// Whether to set the `Secure` attribute.
    #[serde(default)]
    pub secure: bool,
    /// `SameSite` policy.
    #[serde(default)]
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            path: default_path(),
            domain: None,
            secure: false,
            same_site: SameSite::default(),
        }
    }
}

fn default_name() -> String {
    "refresh_token".to_string()
}

fn default_path() -> String {
    "/".to_string()
}
