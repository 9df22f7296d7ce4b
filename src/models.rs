//! Data models for PRINCE TV

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::i18n::Language;
use crate::subscription::SubscriptionState;

/// Channel categories offered in the filters, in display order
pub const CHANNEL_CATEGORIES: &[&str] = &["football", "sports", "movies", "entertainment"];

/// Top level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Home,
    Channels,
    Matches,
    Watch,
    Profile,
    Admin,
    Console,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Dashboard,
    Payments,
    Users,
    Channels,
    Matches,
    Slideshows,
}

/// Signed-in user as returned by the auth endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Auth session (access token plus user)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: SubscriptionState,
    #[serde(default)]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub language: Option<Language>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub stream_url: String,
    pub category: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

impl Channel {
    /// Case-insensitive match on name, description and category
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.category.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
    }
}

/// Match scheduled by the admins (not the football API)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: String,
    pub title: String,
    pub team_home: String,
    pub team_away: String,
    pub match_time: DateTime<Utc>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideLink {
    Channel,
    Match,
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slideshow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub link_type: Option<SlideLink>,
    #[serde(default)]
    pub link_id: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    pub id: String,
    pub user_id: String,
    pub amount: u32,
    pub phone_number: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRole {
    pub id: String,
    pub user_id: String,
    pub role: AppRole,
}

// ============================================================================
// Insert / update payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPaymentRequest {
    pub user_id: String,
    pub amount: u32,
    pub phone_number: String,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelDraft {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub stream_url: String,
    pub category: String,
    pub is_active: bool,
    pub order_index: i32,
}

impl Default for ChannelDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            image_url: None,
            stream_url: String::new(),
            category: CHANNEL_CATEGORIES[0].to_string(),
            is_active: true,
            order_index: 0,
        }
    }
}

impl From<&Channel> for ChannelDraft {
    fn from(c: &Channel) -> Self {
        Self {
            name: c.name.clone(),
            description: c.description.clone(),
            image_url: c.image_url.clone(),
            stream_url: c.stream_url.clone(),
            category: c.category.clone(),
            is_active: c.is_active,
            order_index: c.order_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchDraft {
    pub title: String,
    pub team_home: String,
    pub team_away: String,
    pub match_time: DateTime<Utc>,
    pub poster_url: Option<String>,
    pub channel_id: Option<String>,
    pub is_live: bool,
    pub is_featured: bool,
}

impl From<&Match> for MatchDraft {
    fn from(m: &Match) -> Self {
        Self {
            title: m.title.clone(),
            team_home: m.team_home.clone(),
            team_away: m.team_away.clone(),
            match_time: m.match_time,
            poster_url: m.poster_url.clone(),
            channel_id: m.channel_id.clone(),
            is_live: m.is_live,
            is_featured: m.is_featured,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlideshowDraft {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_type: Option<SlideLink>,
    pub link_id: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
}

impl From<&Slideshow> for SlideshowDraft {
    fn from(s: &Slideshow) -> Self {
        Self {
            title: s.title.clone(),
            description: s.description.clone(),
            image_url: s.image_url.clone(),
            link_type: s.link_type,
            link_id: s.link_id.clone(),
            order_index: s.order_index,
            is_active: s.is_active,
        }
    }
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub channels: u64,
    pub matches: u64,
    pub users: u64,
    pub pending_payments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_backend_row() {
        let json = r#"{
            "id": "7f0c",
            "email": "juma@example.com",
            "full_name": null,
            "phone": "0712345678",
            "status": "active",
            "subscription_expires_at": "2024-06-30T10:00:00.123456+00:00",
            "created_at": "2024-05-31T10:00:00+00:00",
            "language": "sw"
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.status, SubscriptionState::Active);
        assert_eq!(profile.language, Some(Language::Sw));
        assert!(profile.subscription_expires_at.is_some());
        assert_eq!(profile.display_name(), "juma@example.com");
    }

    #[test]
    fn test_slideshow_link_types() {
        let json = r#"{
            "id": "s1",
            "title": "Derby",
            "image_url": "https://img/derby.jpg",
            "link_type": "channel",
            "link_id": "c1",
            "order_index": 2,
            "is_active": true,
            "created_at": "2024-05-31T10:00:00Z"
        }"#;
        let slide: Slideshow = serde_json::from_str(json).unwrap();
        assert_eq!(slide.link_type, Some(SlideLink::Channel));
        assert_eq!(slide.description, None);
    }

    #[test]
    fn test_channel_search() {
        let channel = Channel {
            id: "c1".to_string(),
            name: "Azam Sports 1".to_string(),
            description: Some("Ligi Kuu live".to_string()),
            image_url: None,
            stream_url: "http://x/index.m3u8".to_string(),
            category: "football".to_string(),
            is_active: true,
            order_index: 0,
            created_at: Utc::now(),
        };
        assert!(channel.matches_search(""));
        assert!(channel.matches_search("azam"));
        assert!(channel.matches_search("LIGI"));
        assert!(channel.matches_search("foot"));
        assert!(!channel.matches_search("movies"));
    }

    #[test]
    fn test_payment_request_serializes_lowercase_status() {
        let request = NewPaymentRequest {
            user_id: "u1".to_string(),
            amount: 5000,
            phone_number: "0712345678".to_string(),
            transaction_id: None,
            status: PaymentStatus::Pending,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["amount"], 5000);
        assert!(value["transaction_id"].is_null());
    }
}
