//! Refresh token lifetime policy.

use chrono::{DateTime, Duration, TimeDelta, Utc};

/// How long refresh tokens live.
///
/// Rotation carries the predecessor's remaining lifetime over to the
/// successor, so repeated refreshes never extend a session beyond what
/// was granted at login. The default TTL is only used when nothing
/// remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTtlPolicy {
    /// Lifetime for "remember me" logins and the rotation fallback.
    pub default_ttl: Duration,
    /// Lifetime for logins without "remember me".
    pub short_ttl: Duration,
}

impl RefreshTtlPolicy {
    /// Build a policy from whole-day lifetimes.
    ///
    /// Returns `None` when either lifetime does not fit in a [`TimeDelta`].
    pub fn from_days(default_days: u64, short_days: u64) -> Option<Self> {
        let days = |d: u64| i64::try_from(d).ok().and_then(TimeDelta::try_days);
        Some(Self {
            default_ttl: days(default_days)?,
            short_ttl: days(short_days)?,
        })
    }

    /// Lifetime granted at login.
    pub fn login_ttl(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.default_ttl
        } else {
            self.short_ttl
        }
    }

    /// Expiry of the record that replaces one expiring at `previous_expiry`.
    pub fn successor_expiry(
        &self,
        previous_expiry: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        if previous_expiry > now {
            previous_expiry
        } else {
            now.checked_add_signed(self.default_ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_ttl_follows_remember_me() {
        let policy = RefreshTtlPolicy::from_days(30, 7).unwrap();
        assert_eq!(policy.login_ttl(true), Duration::days(30));
        assert_eq!(policy.login_ttl(false), Duration::days(7));
    }

    #[test]
    fn test_successor_preserves_remaining_lifetime() {
        let policy = RefreshTtlPolicy::from_days(30, 7).unwrap();
        let now = Utc::now();
        let previous = now + Duration::days(2);
        assert_eq!(policy.successor_expiry(previous, now), previous);
    }

    #[test]
    fn test_successor_falls_back_to_default_when_nothing_remains() {
        let policy = RefreshTtlPolicy::from_days(30, 7).unwrap();
        let now = Utc::now();
        assert_eq!(policy.successor_expiry(now, now), now + Duration::days(30));
        assert_eq!(
            policy.successor_expiry(now - Duration::hours(1), now),
            now + Duration::days(30)
        );
    }

    #[test]
    fn test_from_days_rejects_unrepresentable_lifetimes() {
        assert!(RefreshTtlPolicy::from_days(200_000_000, 7).is_none());
        assert!(RefreshTtlPolicy::from_days(30, u64::MAX).is_none());
        assert!(RefreshTtlPolicy::from_days(3650, 3650).is_some());
    }

    #[test]
    fn test_successor_expiry_saturates() {
        let policy = RefreshTtlPolicy {
            default_ttl: TimeDelta::MAX,
            short_ttl: Duration::days(7),
        };
        let now = Utc::now();
        assert_eq!(policy.successor_expiry(now, now), DateTime::<Utc>::MAX_UTC);
    }
}
