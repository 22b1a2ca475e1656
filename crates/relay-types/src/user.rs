use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A relay user. The `uuid` is the credential presented to the proxy engine
/// (VLESS uuid / hysteria2 password); it is generated once at creation and
/// only changes on an explicit reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub uuid: Uuid,
    pub enabled: bool,
    /// Data quota in bytes, 0 = unlimited
    pub data_limit: i64,
    /// Cumulative bytes used
    pub data_used: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: u64, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            uuid: Uuid::new_v4(),
            enabled: true,
            data_limit: 0,
            data_used: 0,
            expires_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|t| t < Utc::now()).unwrap_or(false)
    }

    pub fn is_over_quota(&self) -> bool {
        self.data_limit > 0 && self.data_used >= self.data_limit
    }

    /// Enabled, not expired, not soft-deleted
    pub fn is_active(&self) -> bool {
        self.enabled && !self.is_expired() && self.deleted_at.is_none()
    }
}

/// Merge-semantics update: only provided fields overwrite existing values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub data_limit: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub inbound_ids: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_user_has_credential() {
        let user = User::new(1, "alice".to_string());
        assert!(!user.uuid.is_nil());
        assert!(user.enabled);
        assert_eq!(user.data_limit, 0);
    }

    #[test]
    fn test_expiry() {
        let mut user = User::new(1, "bob".to_string());
        assert!(!user.is_expired());
        user.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(user.is_expired());
        assert!(!user.is_active());
    }

    #[test]
    fn test_quota() {
        let mut user = User::new(1, "carol".to_string());
        user.data_used = 10_000;
        assert!(!user.is_over_quota(), "zero limit means unlimited");
        user.data_limit = 5_000;
        assert!(user.is_over_quota());
    }
}
