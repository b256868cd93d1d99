//! `Set-Cookie` descriptor for the refresh secret.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tokenhub_core::config::{CookieConfig, SameSite};

/// The refresh cookie a transport should set.
///
/// Always `HttpOnly`. A clearing cookie carries an empty value and
/// `Max-Age=0`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RefreshCookie {
    /// Cookie name.
    pub name: String,
    /// Refresh secret, or empty when clearing.
    #[serde(skip_serializing)]
    pub value: String,
    /// `Path` attribute.
    pub path: String,
    /// `Domain` attribute.
    pub domain: Option<String>,
    /// Whether `Secure` is set.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// `Max-Age` in seconds.
    pub max_age: i64,
}

impl RefreshCookie {
    /// Cookie carrying `value` until `expires_at`.
    pub fn issue(
        config: &CookieConfig,
        value: impl Into<String>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            value: value.into(),
            path: config.path.clone(),
            domain: config.domain.clone(),
            secure: config.secure,
            same_site: config.same_site,
            max_age: (expires_at - now).num_seconds().max(0),
        }
    }

    /// Cookie that makes the browser drop any stored refresh secret.
    pub fn clear(config: &CookieConfig) -> Self {
        Self {
            name: config.name.clone(),
            value: String::new(),
            path: config.path.clone(),
            domain: config.domain.clone(),
            secure: config.secure,
            same_site: config.same_site,
            max_age: 0,
        }
    }

    /// Whether this cookie deletes rather than sets.
    pub fn is_clearing(&self) -> bool {
        self.value.is_empty() && self.max_age == 0
    }

    /// Renders the `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Path={}; HttpOnly; SameSite={}; Max-Age={}",
            self.name, self.value, self.path, self.same_site, self.max_age
        );
        if let Some(domain) = &self.domain {
            header.push_str("; Domain=");
            header.push_str(domain);
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

impl std::fmt::Debug for RefreshCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCookie")
            .field("name", &self.name)
            .field("value", &if self.value.is_empty() { "" } else { "<redacted>" })
            .field("path", &self.path)
            .field("domain", &self.domain)
            .field("secure", &self.secure)
            .field("same_site", &self.same_site)
            .field("max_age", &self.max_age)
            .finish()
    }
}
