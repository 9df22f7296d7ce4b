//! Signed-in user state shared by the screens

use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::{AuthSession, AuthUser, Profile};
use crate::subscription::{effective_state, SubscriptionState};

/// Who is signed in. Owned by the app and only changed through its setters.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    session: Option<AuthSession>,
    profile: Option<Profile>,
    is_admin: bool,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, session: AuthSession) {
        info!(user = %session.user.id, "signed in");
        self.session = Some(session);
        self.profile = None;
        self.is_admin = false;
    }

    pub fn set_profile(&mut self, profile: Profile, is_admin: bool) {
        self.profile = Some(profile);
        self.is_admin = is_admin;
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.user() {
            info!(user = %user.id, "signed out");
        }
        *self = Self::default();
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Without a loaded profile the viewer is treated as pending
    pub fn subscription_state(&self, now: DateTime<Utc>) -> SubscriptionState {
        self.profile
            .as_ref()
            .map(|p| effective_state(p, now))
            .unwrap_or(SubscriptionState::Pending)
    }

    pub fn is_subscription_active(&self, now: DateTime<Utc>) -> bool {
        self.subscription_state(now) == SubscriptionState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session() -> AuthSession {
        AuthSession {
            access_token: "jwt".to_string(),
            refresh_token: None,
            expires_in: Some(3600),
            user: AuthUser {
                id: "u1".to_string(),
                email: Some("viewer@example.com".to_string()),
            },
        }
    }

    fn profile(status: SubscriptionState, expires: Option<DateTime<Utc>>) -> Profile {
        Profile {
            id: "u1".to_string(),
            email: "viewer@example.com".to_string(),
            full_name: Some("Asha".to_string()),
            phone: None,
            status,
            subscription_expires_at: expires,
            created_at: Utc::now(),
            language: None,
        }
    }

    #[test]
    fn test_signed_out_is_pending() {
        let auth = AuthContext::new();
        assert!(!auth.is_signed_in());
        assert_eq!(auth.subscription_state(Utc::now()), SubscriptionState::Pending);
    }

    #[test]
    fn test_profile_drives_subscription() {
        let now = Utc::now();
        let mut auth = AuthContext::new();
        auth.sign_in(session());
        assert_eq!(auth.access_token(), Some("jwt"));

        auth.set_profile(profile(SubscriptionState::Active, Some(now + Duration::days(3))), false);
        assert!(auth.is_subscription_active(now));

        auth.set_profile(profile(SubscriptionState::Active, Some(now - Duration::days(1))), true);
        assert_eq!(auth.subscription_state(now), SubscriptionState::Expired);
        assert!(auth.is_admin());
    }

    #[test]
    fn test_sign_out_clears_everything() {
        let mut auth = AuthContext::new();
        auth.sign_in(session());
        auth.set_profile(profile(SubscriptionState::Active, None), true);
        auth.sign_out();
        assert!(auth.user().is_none());
        assert!(auth.profile().is_none());
        assert!(!auth.is_admin());
    }
}
