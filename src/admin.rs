//! Back-office editors
//!
//! The admin screens edit plain text fields; these forms validate them and
//! build the payloads the backend accepts.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::error::FormError;
use crate::models::{
    Channel, ChannelDraft, Match, MatchDraft, SlideLink, Slideshow, SlideshowDraft,
    CHANNEL_CATEGORIES,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    optional(value).ok_or(FormError::Required(field))
}

fn parse_order(value: &str) -> Result<i32, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| FormError::InvalidNumber("order"))
}

/// Local `YYYY-MM-DD HH:MM`, or RFC 3339 as stored by the backend
pub fn parse_match_time(value: &str) -> Result<DateTime<Utc>, FormError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| FormError::InvalidTime(value.to_string()))
}

pub fn format_match_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelForm {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub stream_url: String,
    pub category: String,
    pub is_active: bool,
    pub order_index: String,
}

impl Default for ChannelForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            image_url: String::new(),
            stream_url: String::new(),
            category: CHANNEL_CATEGORIES[0].to_string(),
            is_active: true,
            order_index: "0".to_string(),
        }
    }
}

impl From<&Channel> for ChannelForm {
    fn from(c: &Channel) -> Self {
        Self {
            name: c.name.clone(),
            description: c.description.clone().unwrap_or_default(),
            image_url: c.image_url.clone().unwrap_or_default(),
            stream_url: c.stream_url.clone(),
            category: c.category.clone(),
            is_active: c.is_active,
            order_index: c.order_index.to_string(),
        }
    }
}

impl ChannelForm {
    pub fn to_draft(&self) -> Result<ChannelDraft, FormError> {
        Ok(ChannelDraft {
            name: required(&self.name, "name")?,
            description: optional(&self.description),
            image_url: optional(&self.image_url),
            stream_url: required(&self.stream_url, "stream URL")?,
            category: required(&self.category, "category")?,
            is_active: self.is_active,
            order_index: parse_order(&self.order_index)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchForm {
    pub title: String,
    pub team_home: String,
    pub team_away: String,
    pub match_time: String,
    pub poster_url: String,
    pub channel_id: Option<String>,
    pub is_live: bool,
    pub is_featured: bool,
}

impl Default for MatchForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            team_home: String::new(),
            team_away: String::new(),
            match_time: format_match_time(Utc::now()),
            poster_url: String::new(),
            channel_id: None,
            is_live: false,
            is_featured: false,
        }
    }
}

impl From<&Match> for MatchForm {
    fn from(m: &Match) -> Self {
        Self {
            title: m.title.clone(),
            team_home: m.team_home.clone(),
            team_away: m.team_away.clone(),
            match_time: format_match_time(m.match_time),
            poster_url: m.poster_url.clone().unwrap_or_default(),
            channel_id: m.channel_id.clone(),
            is_live: m.is_live,
            is_featured: m.is_featured,
        }
    }
}

impl MatchForm {
    /// A blank title becomes "Home vs Away"
    pub fn to_draft(&self) -> Result<MatchDraft, FormError> {
        let team_home = required(&self.team_home, "home team")?;
        let team_away = required(&self.team_away, "away team")?;
        let title = optional(&self.title)
            .unwrap_or_else(|| format!("{} vs {}", team_home, team_away));

        Ok(MatchDraft {
            title,
            team_home,
            team_away,
            match_time: parse_match_time(&self.match_time)?,
            poster_url: optional(&self.poster_url),
            channel_id: self.channel_id.clone(),
            is_live: self.is_live,
            is_featured: self.is_featured,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowForm {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link_type: Option<SlideLink>,
    pub link_id: String,
    pub order_index: String,
    pub is_active: bool,
}

impl Default for SlideshowForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            image_url: String::new(),
            link_type: None,
            link_id: String::new(),
            order_index: "0".to_string(),
            is_active: true,
        }
    }
}

impl From<&Slideshow> for SlideshowForm {
    fn from(s: &Slideshow) -> Self {
        Self {
            title: s.title.clone(),
            description: s.description.clone().unwrap_or_default(),
            image_url: s.image_url.clone(),
            link_type: s.link_type,
            link_id: s.link_id.clone().unwrap_or_default(),
            order_index: s.order_index.to_string(),
            is_active: s.is_active,
        }
    }
}

impl SlideshowForm {
    /// The link target is dropped when there is no link type
    pub fn to_draft(&self) -> Result<SlideshowDraft, FormError> {
        let link_id = match self.link_type {
            Some(_) => Some(required(&self.link_id, "link")?),
            None => None,
        };
        Ok(SlideshowDraft {
            title: required(&self.title, "title")?,
            description: optional(&self.description),
            image_url: required(&self.image_url, "image URL")?,
            link_type: self.link_type,
            link_id,
            order_index: parse_order(&self.order_index)?,
            is_active: self.is_active,
        })
    }
}

/// A form plus the id of the row being edited, `None` when adding
#[derive(Debug, Clone, Default)]
pub struct Editor<F> {
    pub form: F,
    pub editing: Option<String>,
    pub open: bool,
}

impl<F: Default> Editor<F> {
    pub fn create(&mut self) {
        self.form = F::default();
        self.editing = None;
        self.open = true;
    }

    pub fn edit(&mut self, id: &str, form: F) {
        self.form = form;
        self.editing = Some(id.to_string());
        self.open = true;
    }

    pub fn close(&mut self) {
        self.form = F::default();
        self.editing = None;
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> Channel {
        Channel {
            id: "c1".to_string(),
            name: "Azam Sports 1".to_string(),
            description: None,
            image_url: Some("https://img/azam.png".to_string()),
            stream_url: "https://cdn/azam/index.m3u8".to_string(),
            category: "sports".to_string(),
            is_active: true,
            order_index: 3,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_channel_form_roundtrips_through_draft() {
        let c = channel();
        let draft = ChannelForm::from(&c).to_draft().unwrap();
        assert_eq!(draft, ChannelDraft::from(&c));
    }

    #[test]
    fn test_channel_form_validation() {
        let mut form = ChannelForm::default();
        form.name = "  ".to_string();
        assert_eq!(form.to_draft(), Err(FormError::Required("name")));

        form.name = "Clouds".to_string();
        assert_eq!(form.to_draft(), Err(FormError::Required("stream URL")));

        form.stream_url = "https://cdn/clouds.mp4".to_string();
        form.order_index = "first".to_string();
        assert_eq!(form.to_draft(), Err(FormError::InvalidNumber("order")));

        form.order_index = String::new();
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.order_index, 0);
        assert_eq!(draft.description, None);
        assert_eq!(draft.category, "football");
    }

    #[test]
    fn test_match_form_default_title() {
        let form = MatchForm {
            team_home: "Simba SC".to_string(),
            team_away: "Young Africans".to_string(),
            match_time: "2024-08-17T16:00:00Z".to_string(),
            ..MatchForm::default()
        };
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.title, "Simba SC vs Young Africans");
        assert_eq!(draft.match_time, Utc.with_ymd_and_hms(2024, 8, 17, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_match_time_local_format() {
        let expected = Local
            .with_ymd_and_hms(2024, 8, 17, 14, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_match_time(" 2024-08-17 14:30 ").unwrap(), expected);
        assert_eq!(format_match_time(expected), "2024-08-17 14:30");
        assert_eq!(
            parse_match_time("tomorrow"),
            Err(FormError::InvalidTime("tomorrow".to_string()))
        );
    }

    #[test]
    fn test_slideshow_link_requires_target() {
        let mut form = SlideshowForm {
            title: "Derby".to_string(),
            image_url: "https://img/derby.jpg".to_string(),
            link_id: "stale".to_string(),
            ..SlideshowForm::default()
        };
        assert_eq!(form.to_draft().unwrap().link_id, None);

        form.link_type = Some(SlideLink::Channel);
        form.link_id = String::new();
        assert_eq!(form.to_draft(), Err(FormError::Required("link")));

        form.link_id = "c1".to_string();
        assert_eq!(form.to_draft().unwrap().link_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_editor_modes() {
        let mut editor: Editor<ChannelForm> = Editor::default();
        editor.edit("c1", ChannelForm::from(&channel()));
        assert_eq!(editor.editing.as_deref(), Some("c1"));
        assert!(editor.open);

        editor.create();
        assert_eq!(editor.editing, None);
        assert_eq!(editor.form, ChannelForm::default());

        editor.close();
        assert!(!editor.open);
    }
}
