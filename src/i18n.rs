//! Swahili and English UI strings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Sw,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Sw => "sw",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "sw" => Some(Language::Sw),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

// (key, Swahili, English)
const TRANSLATIONS: &[(&str, &str, &str)] = &[
    // Navigation
    ("home", "Nyumbani", "Home"),
    ("channels", "Vituo", "Channels"),
    ("matches", "Mechi", "Matches"),
    ("profile", "Wasifu", "Profile"),
    ("console", "Kumbukumbu", "Console"),
    ("back", "Rudi", "Back"),
    // Auth
    ("login", "Ingia", "Login"),
    ("register", "Jisajili", "Register"),
    ("logout", "Toka", "Logout"),
    ("email", "Barua pepe", "Email"),
    ("password", "Neno la siri", "Password"),
    ("full_name", "Jina kamili", "Full Name"),
    ("phone", "Nambari ya simu", "Phone Number"),
    ("remember_me", "Nikumbuke", "Remember me"),
    ("no_account", "Huna akaunti?", "No account?"),
    ("have_account", "Una akaunti tayari?", "Already have an account?"),
    ("check_email", "Angalia barua pepe yako ili kuthibitisha akaunti", "Check your email to confirm your account"),
    // Subscription
    ("subscription", "Usajili", "Subscription"),
    ("subscription_status", "Hali ya usajili", "Subscription Status"),
    ("pending", "Inasubiri", "Pending"),
    ("active", "Hai", "Active"),
    ("expired", "Imeisha", "Expired"),
    ("expires_on", "Inaisha tarehe", "Expires on"),
    ("subscribe", "Jisajili", "Subscribe"),
    ("subscription_price", "TSh 5,000 kwa siku 30", "TSh 5,000 for 30 days"),
    // Payment
    ("pay_now", "Lipa Sasa", "Pay Now"),
    ("payment_instructions", "Maelekezo ya malipo", "Payment Instructions"),
    (
        "mpesa_instructions",
        "1. Nenda M-Pesa\n2. Chagua Lipa kwa Namba\n3. Ingiza namba: 0123456789\n4. Kiasi: 5,000 TSh\n5. Thibitisha malipo\n6. Subiri uthibitisho",
        "1. Go to M-Pesa\n2. Select Pay by Number\n3. Enter number: 0123456789\n4. Amount: 5,000 TSh\n5. Confirm payment\n6. Wait for approval",
    ),
    ("request_payment", "Omba Malipo", "Request Payment"),
    ("payment_pending", "Malipo yanasubiriwa", "Payment Pending"),
    ("transaction_id", "Namba ya muamala", "Transaction ID"),
    ("payment_sent", "Ombi la malipo limetumwa", "Payment request sent"),
    // Content
    ("live_now", "Sasa Moja kwa Moja", "Live Now"),
    ("live", "MUBASHARA", "LIVE"),
    ("upcoming", "Zinazokuja", "Upcoming"),
    ("finished", "Imemalizika", "Finished"),
    ("featured", "Zilizoangaziwa", "Featured"),
    ("all_channels", "Vituo Vyote", "All Channels"),
    ("categories", "Makundi", "Categories"),
    ("all", "Zote", "All"),
    ("football", "Mpira wa Miguu", "Football"),
    ("sports", "Michezo", "Sports"),
    ("movies", "Filamu", "Movies"),
    ("entertainment", "Burudani", "Entertainment"),
    ("watch_now", "Tazama Sasa", "Watch Now"),
    ("starts_in", "Inaanza baada ya", "Starts in"),
    ("football_schedule", "Ratiba ya Mpira", "Football Schedule"),
    // Trial
    (
        "free_trial_ended",
        "Dakika zako za bure zimeisha. Tafadhali lipia ili kuendelea kutazama.",
        "Your free trial has ended. Please pay to continue watching.",
    ),
    ("trial_time_remaining", "Muda uliobaki", "Time remaining"),
    ("upgrade_now", "Boresha Sasa", "Upgrade Now"),
    // Settings
    ("settings", "Mipangilio", "Settings"),
    ("language", "Lugha", "Language"),
    ("swahili", "Kiswahili", "Swahili"),
    ("english", "Kiingereza", "English"),
    // Admin
    ("admin", "Msimamizi", "Admin"),
    ("dashboard", "Dashibodi", "Dashboard"),
    ("users", "Watumiaji", "Users"),
    ("payments", "Malipo", "Payments"),
    ("slideshows", "Slideshow", "Slideshows"),
    ("manage_channels", "Simamia Vituo", "Manage Channels"),
    ("manage_matches", "Simamia Mechi", "Manage Matches"),
    ("manage_slideshow", "Simamia Slideshow", "Manage Slideshow"),
    ("approve_payment", "Thibitisha Malipo", "Approve Payment"),
    ("reject_payment", "Kataa Malipo", "Reject Payment"),
    ("activate", "Washa", "Activate"),
    ("deactivate", "Zima", "Deactivate"),
    ("total_users", "Watumiaji Wote", "Total Users"),
    ("total_channels", "Vituo Vyote", "Total Channels"),
    ("total_matches", "Mechi Zote", "Total Matches"),
    ("active_subscriptions", "Usajili Hai", "Active Subscriptions"),
    ("pending_payments", "Malipo Yanasubiri", "Pending Payments"),
    // Common
    ("loading", "Inapakia...", "Loading..."),
    ("error", "Kosa limetokea", "An error occurred"),
    ("success", "Imefanikiwa", "Success"),
    ("cancel", "Ghairi", "Cancel"),
    ("save", "Hifadhi", "Save"),
    ("delete", "Futa", "Delete"),
    ("edit", "Hariri", "Edit"),
    ("add", "Ongeza", "Add"),
    ("refresh", "Onyesha upya", "Refresh"),
    ("search", "Tafuta", "Search"),
    ("no_results", "Hakuna matokeo", "No results"),
    ("welcome_back", "Karibu tena", "Welcome back"),
    ("get_started", "Anza", "Get Started"),
    // Forms
    ("name", "Jina", "Name"),
    ("title", "Kichwa", "Title"),
    ("description", "Maelezo", "Description"),
    ("image_url", "Kiungo cha picha", "Image URL"),
    ("stream_url", "Kiungo cha mtiririko", "Stream URL"),
    ("category", "Kundi", "Category"),
    ("order", "Mpangilio", "Order"),
    ("team_home", "Timu ya nyumbani", "Home team"),
    ("team_away", "Timu ya ugenini", "Away team"),
    ("match_time", "Muda wa mechi", "Match time"),
    ("is_active", "Inatumika", "Active"),
    ("is_featured", "Maalum", "Featured"),
    ("payment_history", "Historia ya malipo", "Payment history"),
    ("amount", "Kiasi", "Amount"),
    ("status", "Hali", "Status"),
];

/// Looks up UI strings in the current language
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Translation for `key`, or the key itself when there is none
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        TRANSLATIONS
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, sw, en)| match self.language {
                Language::Sw => *sw,
                Language::En => *en,
            })
            .unwrap_or(key)
    }
}
