//! PRINCE TV - Desktop Edition
//! Live TV and football streaming with a free preview and M-Pesa subscriptions

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use chrono::{DateTime, Local, Utc};
use eframe::egui;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

mod admin;
mod api;
mod auth;
mod config;
mod error;
mod ffmpeg_player;
mod football;
mod i18n;
mod logging;
mod models;
mod player;
mod subscription;

use admin::{ChannelForm, Editor, MatchForm, SlideshowForm};
use api::{BackendClient, Query};
use auth::AuthContext;
use config::AppConfig;
use error::{ApiError, PlayerError};
use ffmpeg_player::{InternalPlayer, PlayerAction, PlayerView};
use football::{classify, format_time_left, refresh_interval, FixtureMatch, FootballClient, MatchFilter, ScheduleStatus};
use i18n::{Language, Translator};
use logging::ConsoleBuffer;
use models::*;
use player::{NoAdaptiveEngine, Navigator, PlaybackSession, PlaybackSource, Route, SystemClock, Viewport};
use subscription::{format_price, PaymentForm, SubscriptionState, PLAN_DURATION_DAYS, PLAN_PRICE_TSH};

const USER_AGENT: &str = concat!("PrinceTV/", env!("CARGO_PKG_VERSION"));
const SLIDE_INTERVAL: Duration = Duration::from_secs(5);
const FEATURED_LIMIT: usize = 5;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);
const GOLD: egui::Color32 = egui::Color32::from_rgb(245, 158, 11);
const LIVE_RED: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const OK_GREEN: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);

/// Application icon: red rounded square with a white play triangle
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let nx = x as f32 / size as f32;
            let ny = y as f32 / size as f32;

            let radius = 0.15;
            let cx = nx.clamp(radius, 1.0 - radius);
            let cy = ny.clamp(radius, 1.0 - radius);
            if (nx - cx).powi(2) + (ny - cy).powi(2) > radius * radius {
                continue;
            }

            // Triangle pointing right, centred slightly left of middle
            let px = nx - 0.38;
            let py = ny - 0.5;
            let in_play = (0.0..=0.32).contains(&px) && py.abs() <= (0.32 - px) * 0.6;

            let (r, g, b) = if in_play {
                (255, 255, 255)
            } else {
                let t = nx * 0.5 + ny * 0.5;
                (
                    (220.0 - 90.0 * t) as u8,
                    (38.0 - 20.0 * t) as u8,
                    (38.0 - 10.0 * t) as u8,
                )
            };
            rgba[idx] = r;
            rgba[idx + 1] = g;
            rgba[idx + 2] = b;
            rgba[idx + 3] = 255;
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

/// Add a system emoji font when one is installed
fn setup_fonts(ctx: &egui::Context) {
    #[cfg(target_os = "windows")]
    let candidates: &[&str] = &["C:\\Windows\\Fonts\\seguiemj.ttf"];
    #[cfg(target_os = "macos")]
    let candidates: &[&str] = &["/System/Library/Fonts/Apple Color Emoji.ttc"];
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let candidates: &[&str] = &[
        "/usr/share/fonts/truetype/noto/NotoColorEmoji.ttf",
        "/usr/share/fonts/noto-emoji/NotoColorEmoji.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    ];

    let mut fonts = egui::FontDefinitions::default();
    if let Some(data) = candidates.iter().find_map(|path| std::fs::read(path).ok()) {
        fonts
            .font_data
            .insert("emoji".to_owned(), egui::FontData::from_owned(data).into());
        fonts
            .families
            .entry(egui::FontFamily::Proportional)
            .or_default()
            .push("emoji".to_owned());
    }
    ctx.set_fonts(fonts);
}

fn apply_theme(ctx: &egui::Context, dark: bool) {
    ctx.set_visuals(if dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });
}

fn local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%d %b %H:%M").to_string()
}

fn status_color(state: SubscriptionState) -> egui::Color32 {
    match state {
        SubscriptionState::Active => OK_GREEN,
        SubscriptionState::Pending => GOLD,
        SubscriptionState::Expired => LIVE_RED,
    }
}

fn main() -> Result<(), eframe::Error> {
    let config = AppConfig::load();
    let console = logging::init(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "starting PRINCE TV");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_min_inner_size([960.0, 560.0])
            .with_icon(load_icon()),
        vsync: true,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        ..Default::default()
    };

    eframe::run_native(
        "PRINCE TV",
        options,
        Box::new(move |cc| {
            setup_fonts(&cc.egui_ctx);
            apply_theme(&cc.egui_ctx, config.dark_mode);
            Ok(Box::new(PrinceTvApp::new(config, console)))
        }),
    )
}

/// Background task messages
enum TaskResult {
    SignedIn(AuthSession),
    Registered(Option<AuthSession>),
    ProfileLoaded { profile: Profile, is_admin: bool },
    SlideshowsLoaded(Vec<Slideshow>),
    FeaturedLoaded(Vec<Match>),
    ChannelsLoaded(Vec<Channel>),
    MatchesLoaded(Vec<Match>),
    FixturesLoaded(Vec<FixtureMatch>),
    FixturesFailed(String),
    ChannelResolved(Channel),
    PaymentSubmitted(PaymentRequest),
    PaymentsLoaded(Vec<PaymentRequest>),
    Admin(AdminData),
    AdminSaved(AdminTab),
    Error(String),
}

enum AdminData {
    Stats(DashboardStats),
    Payments(Vec<PaymentRequest>),
    Users(Vec<Profile>),
    Channels(Vec<Channel>),
    Matches(Vec<Match>),
    Slideshows(Vec<Slideshow>),
}

#[derive(Default)]
struct AdminState {
    tab: Option<AdminTab>,
    stats: DashboardStats,
    payments: Vec<PaymentRequest>,
    users: Vec<Profile>,
    channels: Vec<Channel>,
    matches: Vec<Match>,
    slideshows: Vec<Slideshow>,
    channel_editor: Editor<ChannelForm>,
    match_editor: Editor<MatchForm>,
    slideshow_editor: Editor<SlideshowForm>,
}

/// Fullscreen requests from the player, applied to the native window on the next frame
struct EguiViewport {
    pending: Rc<RefCell<Option<bool>>>,
}

impl Viewport for EguiViewport {
    fn request_fullscreen(&mut self) -> Result<(), PlayerError> {
        let mut pending = self.pending.borrow_mut();
        if *pending == Some(true) {
            return Err(PlayerError::FullscreenDenied("request already in flight".to_string()));
        }
        *pending = Some(true);
        Ok(())
    }

    fn exit_fullscreen(&mut self) {
        *self.pending.borrow_mut() = Some(false);
    }
}

/// Routes asked for by the player, consumed by the app after drawing
struct RouteQueue {
    routes: Rc<RefCell<Vec<Route>>>,
}

impl Navigator for RouteQueue {
    fn navigate(&mut self, route: Route) {
        self.routes.borrow_mut().push(route);
    }
}

struct PrinceTvApp {
    config: AppConfig,
    tr: Translator,
    auth: AuthContext,
    console: ConsoleBuffer,
    backend: Option<BackendClient>,
    football: Option<Arc<FootballClient>>,

    // Navigation
    screen: Screen,
    back_screen: Screen,
    status_message: String,

    // Background task channel
    task_sender: Sender<TaskResult>,
    task_receiver: Receiver<TaskResult>,
    pending_tasks: usize,

    // Login / register fields
    email: String,
    password: String,
    full_name: String,
    phone: String,

    // Catalogue
    channels: Vec<Channel>,
    category_filter: Option<String>,
    search_query: String,
    featured: Vec<Match>,
    matches: Vec<Match>,
    match_filter: MatchFilter,
    slideshows: Vec<Slideshow>,
    slide_index: usize,
    slide_changed: Instant,

    // Football schedule
    fixtures: Vec<FixtureMatch>,
    fixtures_error: Option<String>,
    fixtures_loading: bool,
    next_fixture_refresh: Option<Instant>,

    // Subscription
    payment_form: PaymentForm,
    my_payments: Vec<PaymentRequest>,

    admin: AdminState,

    // Player
    session: PlaybackSession,
    player_view: PlayerView,
    routes: Rc<RefCell<Vec<Route>>>,
    fullscreen_request: Rc<RefCell<Option<bool>>>,
    reported_fullscreen: bool,
}

impl PrinceTvApp {
    fn new(config: AppConfig, console: ConsoleBuffer) -> Self {
        let (task_sender, task_receiver) = channel();

        let backend = match BackendClient::from_config(&config) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Backend unavailable: {} (set PRINCE_TV_BACKEND_URL and PRINCE_TV_BACKEND_KEY)", e);
                None
            }
        };
        let football = match FootballClient::from_config(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(_) => {
                info!("Football schedule disabled, no API key configured");
                None
            }
        };

        let media = InternalPlayer::new(USER_AGENT);
        let player_view = PlayerView::new(media.frame_slot());
        let routes = Rc::new(RefCell::new(Vec::new()));
        let fullscreen_request = Rc::new(RefCell::new(None));
        let session = PlaybackSession::new(
            config.player.clone(),
            Box::new(SystemClock),
            Box::new(media),
            Box::new(EguiViewport {
                pending: Rc::clone(&fullscreen_request),
            }),
            Box::new(NoAdaptiveEngine),
            Box::new(RouteQueue {
                routes: Rc::clone(&routes),
            }),
        );

        let email = if config.remember_email {
            config.saved_email.clone()
        } else {
            String::new()
        };

        Self {
            tr: Translator::new(config.language),
            auth: AuthContext::new(),
            console,
            backend,
            football,
            screen: Screen::Login,
            back_screen: Screen::Home,
            status_message: String::new(),
            task_sender,
            task_receiver,
            pending_tasks: 0,
            email,
            password: String::new(),
            full_name: String::new(),
            phone: String::new(),
            channels: Vec::new(),
            category_filter: None,
            search_query: String::new(),
            featured: Vec::new(),
            matches: Vec::new(),
            match_filter: MatchFilter::default(),
            slideshows: Vec::new(),
            slide_index: 0,
            slide_changed: Instant::now(),
            fixtures: Vec::new(),
            fixtures_error: None,
            fixtures_loading: false,
            next_fixture_refresh: None,
            payment_form: PaymentForm::default(),
            my_payments: Vec::new(),
            admin: AdminState::default(),
            session,
            player_view,
            routes,
            fullscreen_request,
            reported_fullscreen: false,
            config,
        }
    }

    fn busy(&self) -> bool {
        self.pending_tasks > 0
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config.save() {
            error!("Failed to save config: {}", e);
            self.status_message = e.to_string();
        }
    }

    // ------------------------------------------------------------------
    // Background work
    // ------------------------------------------------------------------

    fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce() -> Result<TaskResult, ApiError> + Send + 'static,
    {
        let sender = self.task_sender.clone();
        self.pending_tasks += 1;
        thread::spawn(move || {
            let result = job().unwrap_or_else(|e| TaskResult::Error(e.to_string()));
            let _ = sender.send(result);
        });
    }

    /// Run `job` with a backend client carrying the viewer's token
    fn with_backend<F>(&mut self, job: F)
    where
        F: FnOnce(BackendClient) -> Result<TaskResult, ApiError> + Send + 'static,
    {
        let Some(client) = self.backend.clone() else {
            self.status_message = ApiError::NotConfigured.to_string();
            return;
        };
        let client = match self.auth.access_token() {
            Some(token) => client.with_token(token),
            None => client,
        };
        self.spawn(move || job(client));
    }

    fn handle_task(&mut self, result: TaskResult) {
        self.pending_tasks = self.pending_tasks.saturating_sub(1);
        match result {
            TaskResult::SignedIn(session) => self.on_signed_in(session),
            TaskResult::Registered(Some(session)) => self.on_signed_in(session),
            TaskResult::Registered(None) => {
                info!(email = %self.email, "registration awaiting email confirmation");
                self.status_message = self.tr.t("check_email").to_string();
                self.screen = Screen::Login;
            }
            TaskResult::ProfileLoaded { profile, is_admin } => {
                info!(
                    status = ?profile.status,
                    admin = is_admin,
                    "profile loaded for {}",
                    profile.display_name()
                );
                self.auth.set_profile(profile, is_admin);
            }
            TaskResult::SlideshowsLoaded(slides) => {
                self.slideshows = slides;
                self.slide_index = 0;
                self.slide_changed = Instant::now();
            }
            TaskResult::FeaturedLoaded(matches) => self.featured = matches,
            TaskResult::ChannelsLoaded(channels) => {
                info!("Loaded {} channels", channels.len());
                self.channels = channels;
            }
            TaskResult::MatchesLoaded(matches) => self.matches = matches,
            TaskResult::FixturesLoaded(fixtures) => {
                let interval = refresh_interval(&fixtures);
                self.fixtures = fixtures;
                self.fixtures_error = None;
                self.fixtures_loading = false;
                self.next_fixture_refresh = Some(Instant::now() + interval);
            }
            TaskResult::FixturesFailed(e) => {
                warn!("Football schedule refresh failed: {}", e);
                self.fixtures_error = Some(e);
                self.fixtures_loading = false;
                self.next_fixture_refresh = Some(Instant::now() + refresh_interval(&self.fixtures));
            }
            TaskResult::ChannelResolved(channel) => self.watch(&channel),
            TaskResult::PaymentSubmitted(request) => {
                info!(payment = %request.id, "payment request submitted");
                self.payment_form.clear();
                self.status_message = self.tr.t("payment_sent").to_string();
                self.my_payments.insert(0, request);
            }
            TaskResult::PaymentsLoaded(payments) => self.my_payments = payments,
            TaskResult::Admin(data) => match data {
                AdminData::Stats(stats) => self.admin.stats = stats,
                AdminData::Payments(payments) => self.admin.payments = payments,
                AdminData::Users(users) => self.admin.users = users,
                AdminData::Channels(channels) => self.admin.channels = channels,
                AdminData::Matches(matches) => self.admin.matches = matches,
                AdminData::Slideshows(slides) => self.admin.slideshows = slides,
            },
            TaskResult::AdminSaved(tab) => {
                self.status_message = self.tr.t("success").to_string();
                self.load_admin_tab(tab);
            }
            TaskResult::Error(e) => {
                error!("{}", e);
                self.status_message = format!("{}: {}", self.tr.t("error"), e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    fn sign_in(&mut self) {
        let email = self.email.trim().to_string();
        let password = self.password.clone();
        if email.is_empty() || password.is_empty() {
            self.status_message = format!("{} / {}", self.tr.t("email"), self.tr.t("password"));
            return;
        }
        self.with_backend(move |client| client.sign_in(&email, &password).map(TaskResult::SignedIn));
    }

    fn register(&mut self) {
        let email = self.email.trim().to_string();
        let password = self.password.clone();
        let full_name = self.full_name.trim().to_string();
        let phone = self.phone.trim().to_string();
        if email.is_empty() || password.is_empty() || full_name.is_empty() {
            self.status_message = format!("{} / {} / {}", self.tr.t("full_name"), self.tr.t("email"), self.tr.t("password"));
            return;
        }
        self.with_backend(move |client| {
            client
                .sign_up(&email, &password, &full_name, &phone)
                .map(TaskResult::Registered)
        });
    }

    fn on_signed_in(&mut self, session: AuthSession) {
        self.auth.sign_in(session);
        self.password.clear();
        if self.config.remember_email {
            self.config.saved_email = self.email.trim().to_string();
        } else {
            self.config.saved_email.clear();
        }
        self.save_config();
        self.status_message.clear();
        self.load_profile();
        self.navigate_to(Screen::Home);
    }

    fn load_profile(&mut self) {
        let Some(user_id) = self.auth.user().map(|u| u.id.clone()) else {
            return;
        };
        self.with_backend(move |client| {
            let profile = client.get_profile(&user_id)?;
            let is_admin = client.is_admin(&user_id)?;
            Ok(TaskResult::ProfileLoaded { profile, is_admin })
        });
    }

    fn sign_out(&mut self) {
        self.session.close();
        self.player_view.reset();
        self.auth.sign_out();
        self.my_payments.clear();
        self.admin = AdminState::default();
        self.screen = Screen::Login;
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn navigate_to(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        if self.screen == Screen::Watch {
            self.session.close();
            self.player_view.reset();
            if self.reported_fullscreen {
                *self.fullscreen_request.borrow_mut() = Some(false);
            }
        } else {
            self.back_screen = self.screen;
        }
        self.screen = screen;

        match screen {
            Screen::Home => self.load_home(),
            Screen::Channels if self.channels.is_empty() => self.load_channels(),
            Screen::Matches => {
                self.load_matches();
                self.next_fixture_refresh = None;
            }
            Screen::Profile => {
                self.load_profile();
                self.load_my_payments();
            }
            Screen::Admin => {
                let tab = self.admin.tab.unwrap_or(AdminTab::Dashboard);
                self.admin.tab = Some(tab);
                self.load_admin_tab(tab);
            }
            _ => {}
        }
    }

    fn load_home(&mut self) {
        self.with_backend(|client| client.list_slideshows(true).map(TaskResult::SlideshowsLoaded));
        self.with_backend(|client| {
            client
                .list_matches(true, Some(FEATURED_LIMIT))
                .map(TaskResult::FeaturedLoaded)
        });
        self.load_channels();
    }

    fn load_channels(&mut self) {
        self.with_backend(|client| client.list_channels(None, None).map(TaskResult::ChannelsLoaded));
    }

    fn load_matches(&mut self) {
        self.with_backend(|client| client.list_matches(false, None).map(TaskResult::MatchesLoaded));
    }

    fn load_my_payments(&mut self) {
        let Some(user_id) = self.auth.user().map(|u| u.id.clone()) else {
            return;
        };
        self.with_backend(move |client| {
            client
                .my_payment_requests(&user_id)
                .map(TaskResult::PaymentsLoaded)
        });
    }

    fn refresh_fixtures(&mut self) {
        let Some(client) = self.football.clone() else {
            return;
        };
        self.fixtures_loading = true;
        self.spawn(move || {
            Ok(match client.fetch_matches(None) {
                Ok(fixtures) => TaskResult::FixturesLoaded(fixtures),
                Err(e) => TaskResult::FixturesFailed(e.to_string()),
            })
        });
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    fn watch(&mut self, channel: &Channel) {
        info!(channel = %channel.id, "watching {}", channel.name);
        self.navigate_to(Screen::Watch);
        self.player_view.reset();
        self.session.set_subscription(self.auth.subscription_state(Utc::now()));
        self.session
            .open(PlaybackSource::new(&channel.stream_url, &channel.name, &channel.id));
    }

    fn watch_channel_id(&mut self, channel_id: &str) {
        if let Some(channel) = self.channels.iter().find(|c| c.id == channel_id).cloned() {
            self.watch(&channel);
            return;
        }
        let id = channel_id.to_string();
        self.with_backend(move |client| client.get_channel(&id).map(TaskResult::ChannelResolved));
    }

    fn apply_player_action(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::Interact => self.session.interact(),
            PlayerAction::TogglePlay => self.session.toggle_play(),
            PlayerAction::ToggleMute => self.session.toggle_mute(),
            PlayerAction::ToggleFullscreen => self.session.toggle_fullscreen(),
            PlayerAction::Upgrade => self.session.upgrade(),
            PlayerAction::Exit => self.session.exit(),
        }
    }

    /// Subscription sync, queued events, timers and window state for the player
    fn drive_player(&mut self, ctx: &egui::Context) {
        self.session
            .set_subscription(self.auth.subscription_state(Utc::now()));
        self.session.poll();

        if let Some(fullscreen) = self.fullscreen_request.borrow_mut().take() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(fullscreen));
        }
        let fullscreen = ctx.input(|i| i.viewport().fullscreen).unwrap_or(false);
        if fullscreen != self.reported_fullscreen {
            self.reported_fullscreen = fullscreen;
            self.session.on_fullscreen_change(fullscreen);
        }

        let routes: Vec<Route> = self.routes.borrow_mut().drain(..).collect();
        for route in routes {
            match route {
                Route::Upgrade => self.navigate_to(Screen::Profile),
                Route::Back => {
                    let back = self.back_screen;
                    self.navigate_to(back);
                }
            }
        }

        if self.session.render().playing {
            ctx.request_repaint_after(Duration::from_millis(33));
        } else if let Some(deadline) = self.session.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }

    // ------------------------------------------------------------------
    // Subscription
    // ------------------------------------------------------------------

    fn request_payment(&mut self) {
        let Some(user_id) = self.auth.user().map(|u| u.id.clone()) else {
            return;
        };
        let state = self.auth.subscription_state(Utc::now());
        match self.payment_form.to_request(&user_id, state) {
            Ok(request) => {
                info!(amount = request.amount, "requesting payment");
                self.with_backend(move |client| {
                    client
                        .create_payment_request(&request)
                        .map(TaskResult::PaymentSubmitted)
                });
            }
            Err(e) => {
                warn!("Payment form rejected: {}", e);
                self.status_message = e.to_string();
            }
        }
    }

    fn set_language(&mut self, language: Language) {
        if self.tr.language() == language {
            return;
        }
        info!(language = language.code(), "language changed");
        self.tr.set_language(language);
        self.config.language = language;
        self.save_config();
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    fn load_admin_tab(&mut self, tab: AdminTab) {
        if !self.auth.is_admin() {
            return;
        }
        match tab {
            AdminTab::Dashboard => self.with_backend(|c| {
                c.dashboard_stats().map(|s| TaskResult::Admin(AdminData::Stats(s)))
            }),
            AdminTab::Payments => self.with_backend(|c| {
                c.list_payment_requests()
                    .map(|p| TaskResult::Admin(AdminData::Payments(p)))
            }),
            AdminTab::Users => self.with_backend(|c| {
                c.list_profiles().map(|u| TaskResult::Admin(AdminData::Users(u)))
            }),
            AdminTab::Channels => self.with_backend(|c| {
                c.list_all_channels()
                    .map(|ch| TaskResult::Admin(AdminData::Channels(ch)))
            }),
            AdminTab::Matches => self.with_backend(|c| {
                c.list_all_matches()
                    .map(|m| TaskResult::Admin(AdminData::Matches(m)))
            }),
            AdminTab::Slideshows => self.with_backend(|c| {
                c.list_slideshows(false)
                    .map(|s| TaskResult::Admin(AdminData::Slideshows(s)))
            }),
        }
    }

    fn approve_payment(&mut self, payment: PaymentRequest) {
        let Some(admin_id) = self.auth.user().map(|u| u.id.clone()) else {
            return;
        };
        info!(payment = %payment.id, user = %payment.user_id, "approving payment");
        self.with_backend(move |c| {
            c.approve_payment(&payment, &admin_id, Utc::now())?;
            Ok(TaskResult::AdminSaved(AdminTab::Payments))
        });
    }

    fn reject_payment(&mut self, payment_id: String) {
        info!(payment = %payment_id, "rejecting payment");
        self.with_backend(move |c| {
            c.reject_payment(&payment_id)?;
            Ok(TaskResult::AdminSaved(AdminTab::Payments))
        });
    }

    fn set_user_status(&mut self, user_id: String, status: SubscriptionState) {
        info!(user = %user_id, ?status, "updating subscription");
        self.with_backend(move |c| {
            c.set_user_status(&user_id, status, Utc::now())?;
            Ok(TaskResult::AdminSaved(AdminTab::Users))
        });
    }

    fn delete_row(&mut self, table: &'static str, id: String, tab: AdminTab) {
        info!(%table, %id, "deleting row");
        self.with_backend(move |c| {
            c.delete(table, &Query::filter().eq("id", &id))?;
            Ok(TaskResult::AdminSaved(tab))
        });
    }

    fn save_channel(&mut self) {
        let draft = match self.admin.channel_editor.form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.status_message = e.to_string();
                return;
            }
        };
        let editing = self.admin.channel_editor.editing.clone();
        self.admin.channel_editor.close();
        self.with_backend(move |c| {
            match editing {
                Some(id) => c.update("channels", &Query::filter().eq("id", &id), &draft)?,
                None => {
                    let _: Channel = c.insert("channels", &draft)?;
                }
            }
            Ok(TaskResult::AdminSaved(AdminTab::Channels))
        });
    }

    fn save_match(&mut self) {
        let draft = match self.admin.match_editor.form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.status_message = e.to_string();
                return;
            }
        };
        let editing = self.admin.match_editor.editing.clone();
        self.admin.match_editor.close();
        self.with_backend(move |c| {
            match editing {
                Some(id) => c.update("matches", &Query::filter().eq("id", &id), &draft)?,
                None => {
                    let _: Match = c.insert("matches", &draft)?;
                }
            }
            Ok(TaskResult::AdminSaved(AdminTab::Matches))
        });
    }

    fn save_slideshow(&mut self) {
        let draft = match self.admin.slideshow_editor.form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.status_message = e.to_string();
                return;
            }
        };
        let editing = self.admin.slideshow_editor.editing.clone();
        self.admin.slideshow_editor.close();
        self.with_backend(move |c| {
            match editing {
                Some(id) => c.update("slideshows", &Query::filter().eq("id", &id), &draft)?,
                None => {
                    let _: Slideshow = c.insert("slideshows", &draft)?;
                }
            }
            Ok(TaskResult::AdminSaved(AdminTab::Slideshows))
        });
    }
}

impl eframe::App for PrinceTvApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process background task results (non-blocking)
        while let Ok(result) = self.task_receiver.try_recv() {
            self.handle_task(result);
        }

        self.drive_player(ctx);

        if self.screen == Screen::Home
            && self.slideshows.len() > 1
            && self.slide_changed.elapsed() >= SLIDE_INTERVAL
        {
            self.slide_index = (self.slide_index + 1) % self.slideshows.len();
            self.slide_changed = Instant::now();
        }

        if self.screen == Screen::Matches
            && self.football.is_some()
            && !self.fixtures_loading
            && self
                .next_fixture_refresh
                .is_none_or(|at| Instant::now() >= at)
        {
            self.refresh_fixtures();
        }

        if self.busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        match self.screen {
            Screen::Home => ctx.request_repaint_after(SLIDE_INTERVAL),
            Screen::Matches => ctx.request_repaint_after(Duration::from_secs(1)),
            _ => {}
        }

        let immersive = self.screen == Screen::Watch && self.reported_fullscreen;
        let signed_in = self.auth.is_signed_in();

        if signed_in && !immersive {
            self.show_top_panel(ctx);
        }

        if !immersive {
            egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if self.busy() {
                        ui.spinner();
                    }
                    ui.label(&self.status_message);
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Login => self.show_login(ui),
            Screen::Register => self.show_register(ui),
            Screen::Home => self.show_home(ui),
            Screen::Channels => self.show_channels(ui),
            Screen::Matches => self.show_matches(ui),
            Screen::Watch => self.show_watch(ctx, ui),
            Screen::Profile => self.show_profile(ui),
            Screen::Admin => self.show_admin(ui),
            Screen::Console => self.show_console(ui),
        });

        self.show_admin_editors(ctx);
    }
}

// ----------------------------------------------------------------------
// Screens
// ----------------------------------------------------------------------

impl PrinceTvApp {
    fn show_top_panel(&mut self, ctx: &egui::Context) {
        let t = self.tr;
        let state = self.auth.subscription_state(Utc::now());
        let mut target = None;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("PRINCE TV").strong().size(18.0).color(ACCENT));
                ui.separator();

                let mut tabs = vec![
                    (Screen::Home, t.t("home")),
                    (Screen::Channels, t.t("channels")),
                    (Screen::Matches, t.t("matches")),
                    (Screen::Profile, t.t("profile")),
                ];
                if self.auth.is_admin() {
                    tabs.push((Screen::Admin, t.t("admin")));
                }
                tabs.push((Screen::Console, t.t("console")));

                for (screen, label) in tabs {
                    if ui.selectable_label(self.screen == screen, label).clicked() {
                        target = Some(screen);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(format!("🚪 {}", t.t("logout"))).clicked() {
                        target = Some(Screen::Login);
                    }
                    ui.label(egui::RichText::new(t.t(state.label_key())).color(status_color(state)));
                    if let Some(profile) = self.auth.profile() {
                        ui.label(egui::RichText::new(profile.display_name()).strong());
                    }
                });
            });
            ui.add_space(5.0);
        });

        match target {
            Some(Screen::Login) => self.sign_out(),
            Some(screen) => self.navigate_to(screen),
            None => {}
        }
    }

    fn show_login(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let busy = self.busy();
        let mut submit = false;

        ui.vertical_centered(|ui| {
            ui.add_space(90.0);
            ui.label(egui::RichText::new("PRINCE TV").size(36.0).strong().color(ACCENT));
            ui.label(egui::RichText::new(t.t("welcome_back")).size(16.0));
            ui.add_space(24.0);

            ui.add(egui::TextEdit::singleline(&mut self.email).hint_text(t.t("email")).desired_width(300.0));
            let password = ui.add(
                egui::TextEdit::singleline(&mut self.password)
                    .password(true)
                    .hint_text(t.t("password"))
                    .desired_width(300.0),
            );
            if password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            ui.checkbox(&mut self.config.remember_email, t.t("remember_me"));
            ui.add_space(10.0);

            if ui.add_enabled(!busy, egui::Button::new(t.t("login")).min_size(egui::vec2(300.0, 32.0))).clicked() {
                submit = true;
            }
            ui.add_space(8.0);
            if ui.link(t.t("no_account")).clicked() {
                self.screen = Screen::Register;
            }

            ui.add_space(16.0);
            ui.horizontal(|ui| {
                ui.add_space(ui.available_width() / 2.0 - 80.0);
                if ui.selectable_label(t.language() == Language::Sw, t.t("swahili")).clicked() {
                    self.set_language(Language::Sw);
                }
                if ui.selectable_label(t.language() == Language::En, t.t("english")).clicked() {
                    self.set_language(Language::En);
                }
            });
        });

        if submit {
            self.sign_in();
        }
    }

    fn show_register(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let busy = self.busy();
        let mut submit = false;

        ui.vertical_centered(|ui| {
            ui.add_space(70.0);
            ui.label(egui::RichText::new("PRINCE TV").size(36.0).strong().color(ACCENT));
            ui.label(egui::RichText::new(t.t("get_started")).size(16.0));
            ui.add_space(24.0);

            ui.add(egui::TextEdit::singleline(&mut self.full_name).hint_text(t.t("full_name")).desired_width(300.0));
            ui.add(egui::TextEdit::singleline(&mut self.phone).hint_text(t.t("phone")).desired_width(300.0));
            ui.add(egui::TextEdit::singleline(&mut self.email).hint_text(t.t("email")).desired_width(300.0));
            ui.add(
                egui::TextEdit::singleline(&mut self.password)
                    .password(true)
                    .hint_text(t.t("password"))
                    .desired_width(300.0),
            );
            ui.add_space(10.0);

            if ui.add_enabled(!busy, egui::Button::new(t.t("register")).min_size(egui::vec2(300.0, 32.0))).clicked() {
                submit = true;
            }
            ui.add_space(8.0);
            if ui.link(t.t("have_account")).clicked() {
                self.screen = Screen::Login;
            }
        });

        if submit {
            self.register();
        }
    }

    fn show_home(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let mut open_channel: Option<Channel> = None;
        let mut open_channel_id: Option<String> = None;
        let mut goto: Option<Screen> = None;

        egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            // Slideshow
            if let Some(slide) = self.slideshows.get(self.slide_index) {
                egui::Frame::group(ui.style())
                    .fill(ui.visuals().extreme_bg_color)
                    .inner_margin(egui::Margin::same(20))
                    .show(ui, |ui| {
                        ui.set_min_size(egui::vec2(ui.available_width(), 140.0));
                        ui.label(egui::RichText::new(&slide.title).size(26.0).strong());
                        if let Some(ref description) = slide.description {
                            ui.label(description);
                        }
                        ui.add_space(10.0);
                        ui.horizontal(|ui| {
                            match (slide.link_type, slide.link_id.as_deref()) {
                                (Some(SlideLink::Channel), Some(id)) => {
                                    if ui.button(format!("▶ {}", t.t("watch_now"))).clicked() {
                                        open_channel_id = Some(id.to_string());
                                    }
                                }
                                (Some(SlideLink::Match), Some(_)) => {
                                    if ui.button(t.t("matches")).clicked() {
                                        goto = Some(Screen::Matches);
                                    }
                                }
                                (Some(SlideLink::External), Some(url)) => {
                                    ui.hyperlink_to(t.t("get_started"), url);
                                }
                                _ => {}
                            }
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.small_button("▶").clicked() {
                                    self.slide_index = (self.slide_index + 1) % self.slideshows.len();
                                    self.slide_changed = Instant::now();
                                }
                                ui.label(format!("{}/{}", self.slide_index + 1, self.slideshows.len()));
                            });
                        });
                    });
                ui.add_space(16.0);
            }

            // Featured matches
            ui.heading(format!("⚽ {}", t.t("featured")));
            if self.featured.is_empty() {
                ui.label(egui::RichText::new(t.t("no_results")).weak());
            }
            ui.horizontal_wrapped(|ui| {
                for m in &self.featured {
                    if let Some(id) = match_card(ui, m, t) {
                        open_channel_id = Some(id);
                    }
                }
            });
            ui.add_space(16.0);

            // Categories
            ui.heading(t.t("categories"));
            ui.horizontal(|ui| {
                for category in CHANNEL_CATEGORIES {
                    if ui.button(t.t(category)).clicked() {
                        self.category_filter = Some(category.to_string());
                        goto = Some(Screen::Channels);
                    }
                }
            });
            ui.add_space(16.0);

            ui.heading(t.t("all_channels"));
            if let Some(channel) = channel_grid(ui, self.channels.iter(), t) {
                open_channel = Some(channel.clone());
            }
        });

        if let Some(channel) = open_channel {
            self.watch(&channel);
        } else if let Some(id) = open_channel_id {
            self.watch_channel_id(&id);
        } else if let Some(screen) = goto {
            self.navigate_to(screen);
        }
    }

    fn show_channels(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let mut open_channel: Option<Channel> = None;
        let mut reload = false;

        ui.horizontal(|ui| {
            ui.heading(t.t("channels"));
            ui.add_space(20.0);
            ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text(format!("🔍 {}", t.t("search")))
                    .desired_width(240.0),
            );
            if ui.button("✖").clicked() {
                self.search_query.clear();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(format!("🔄 {}", t.t("refresh"))).clicked() {
                    reload = true;
                }
            });
        });

        ui.horizontal(|ui| {
            if ui.selectable_label(self.category_filter.is_none(), t.t("all")).clicked() {
                self.category_filter = None;
            }
            for category in CHANNEL_CATEGORIES {
                let selected = self.category_filter.as_deref() == Some(*category);
                if ui.selectable_label(selected, t.t(category)).clicked() {
                    self.category_filter = Some(category.to_string());
                }
            }
        });
        ui.separator();

        let category = self.category_filter.clone();
        let query = self.search_query.clone();
        let visible = self.channels.iter().filter(|c| {
            category.as_deref().is_none_or(|cat| c.category == cat) && c.matches_search(&query)
        });

        egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            if let Some(channel) = channel_grid(ui, visible, t) {
                open_channel = Some(channel.clone());
            }
        });

        if reload {
            self.load_channels();
        }
        if let Some(channel) = open_channel {
            self.watch(&channel);
        }
    }

    fn show_matches(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let now = Utc::now();
        let mut open_channel_id: Option<String> = None;
        let mut refresh = false;

        ui.horizontal(|ui| {
            ui.heading(t.t("matches"));
            ui.add_space(20.0);
            for (filter, key) in [
                (MatchFilter::All, "all"),
                (MatchFilter::Live, "live_now"),
                (MatchFilter::Upcoming, "upcoming"),
            ] {
                if ui.selectable_label(self.match_filter == filter, t.t(key)).clicked() {
                    self.match_filter = filter;
                }
            }
        });
        ui.separator();

        egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            let filter = self.match_filter;
            let mut shown = 0;
            for m in self.matches.iter().filter(|m| filter.accepts(m)) {
                shown += 1;
                ui.horizontal(|ui| {
                    if m.is_live {
                        ui.label(egui::RichText::new(format!("● {}", t.t("live"))).color(LIVE_RED).strong());
                    } else {
                        ui.label(egui::RichText::new(local_time(m.match_time)).weak());
                    }
                    ui.label(egui::RichText::new(format!("{} vs {}", m.team_home, m.team_away)).strong());
                    ui.label(egui::RichText::new(&m.title).weak());
                    if !m.is_live && m.match_time > now {
                        ui.label(format!("{} {}", t.t("starts_in"), format_time_left(m.match_time - now)));
                    }
                    if let Some(ref channel_id) = m.channel_id {
                        if ui.button(format!("▶ {}", t.t("watch_now"))).clicked() {
                            open_channel_id = Some(channel_id.clone());
                        }
                    }
                });
                ui.separator();
            }
            if shown == 0 {
                ui.label(egui::RichText::new(t.t("no_results")).weak());
            }

            ui.add_space(16.0);
            ui.horizontal(|ui| {
                ui.heading(format!("⚽ {}", t.t("football_schedule")));
                if self.football.is_some() && ui.button("🔄").clicked() {
                    refresh = true;
                }
                if self.fixtures_loading {
                    ui.spinner();
                }
            });

            if self.football.is_none() {
                ui.label(egui::RichText::new("Set PRINCE_TV_FOOTBALL_API_KEY to enable the schedule").weak());
            }
            if let Some(ref e) = self.fixtures_error {
                ui.label(egui::RichText::new(e).color(LIVE_RED));
            }

            egui::Grid::new("fixtures")
                .num_columns(4)
                .striped(true)
                .spacing([16.0, 6.0])
                .show(ui, |ui| {
                    for fixture in &self.fixtures {
                        let status = classify(
                            &fixture.status,
                            fixture.utc_date,
                            now,
                            self.config.match_duration_minutes,
                        );
                        let color = match status {
                            ScheduleStatus::Live => LIVE_RED,
                            ScheduleStatus::Upcoming => GOLD,
                            ScheduleStatus::Finished => egui::Color32::GRAY,
                        };
                        ui.label(
                            fixture
                                .competition
                                .as_ref()
                                .map(|c| c.label())
                                .unwrap_or_default(),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "{} vs {}",
                                fixture.home_team.name, fixture.away_team.name
                            ))
                            .strong(),
                        );
                        ui.label(egui::RichText::new(t.t(status.label_key())).color(color));
                        let detail = match (status, fixture.score_line()) {
                            (ScheduleStatus::Upcoming, _) => format_time_left(fixture.utc_date - now),
                            (_, Some(score)) => score,
                            _ => local_time(fixture.utc_date),
                        };
                        ui.label(detail);
                        ui.end_row();
                    }
                });
        });

        if refresh {
            self.refresh_fixtures();
        }
        if let Some(id) = open_channel_id {
            self.watch_channel_id(&id);
        }
    }

    fn show_watch(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let t = self.tr;
        let state = self.session.render();
        let mut actions = self.player_view.show(ctx, ui, &state, &t);

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Space) {
                actions.push(PlayerAction::TogglePlay);
            }
            if i.key_pressed(egui::Key::F) {
                actions.push(PlayerAction::ToggleFullscreen);
            }
            if i.key_pressed(egui::Key::M) {
                actions.push(PlayerAction::ToggleMute);
            }
            if i.key_pressed(egui::Key::Escape) && state.fullscreen {
                actions.push(PlayerAction::ToggleFullscreen);
            }
        });

        let mut switch_to: Option<Channel> = None;
        if !state.fullscreen {
            ui.add_space(10.0);
            let current = self.session.source().map(|s| s.channel_id.clone());
            let category = current
                .as_deref()
                .and_then(|id| self.channels.iter().find(|c| c.id == id))
                .map(|c| c.category.clone());
            if let Some(category) = category {
                ui.label(egui::RichText::new(t.t(&category)).strong());
                egui::ScrollArea::horizontal().show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for channel in self.channels.iter().filter(|c| c.category == category) {
                            let selected = current.as_deref() == Some(channel.id.as_str());
                            if ui.selectable_label(selected, &channel.name).clicked() && !selected {
                                switch_to = Some(channel.clone());
                            }
                        }
                    });
                });
            }
        }

        if !actions.is_empty() {
            ctx.request_repaint();
        }
        for action in actions {
            self.apply_player_action(action);
        }
        if let Some(channel) = switch_to {
            self.watch(&channel);
        }
    }

    fn show_profile(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let now = Utc::now();
        let state = self.auth.subscription_state(now);
        let busy = self.busy();
        let mut submit = false;
        let mut language = None;
        let mut dark_changed = false;

        egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            ui.heading(t.t("profile"));
            ui.add_space(8.0);

            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                match self.auth.profile() {
                    Some(profile) => {
                        ui.label(egui::RichText::new(profile.display_name()).size(20.0).strong());
                        ui.label(&profile.email);
                        if let Some(ref phone) = profile.phone {
                            ui.label(phone);
                        }
                    }
                    None => {
                        ui.spinner();
                    }
                }
            });
            ui.add_space(12.0);

            // Subscription card
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(egui::RichText::new(t.t("subscription")).size(18.0).strong());
                ui.horizontal(|ui| {
                    ui.label(format!("{}:", t.t("subscription_status")));
                    ui.label(egui::RichText::new(t.t(state.label_key())).color(status_color(state)).strong());
                });
                if let Some(expires) = self.auth.profile().and_then(|p| p.subscription_expires_at) {
                    ui.label(format!("{}: {}", t.t("expires_on"), local_time(expires)));
                }
                ui.label(format!(
                    "{}: {} / {} days",
                    t.t("subscription_price"),
                    format_price(PLAN_PRICE_TSH),
                    PLAN_DURATION_DAYS
                ));

                if state != SubscriptionState::Active {
                    ui.add_space(10.0);
                    ui.label(egui::RichText::new(t.t("payment_instructions")).strong());
                    ui.label(format!(
                        "1. M-Pesa → Lipa kwa M-Pesa\n2. {} {}\n3. {}",
                        t.t("amount"),
                        format_price(PLAN_PRICE_TSH),
                        t.t("request_payment")
                    ));
                    ui.add_space(6.0);
                    ui.add(
                        egui::TextEdit::singleline(&mut self.payment_form.phone)
                            .hint_text(format!("{} (+255...)", t.t("phone")))
                            .desired_width(260.0),
                    );
                    ui.add(
                        egui::TextEdit::singleline(&mut self.payment_form.transaction_id)
                            .hint_text(t.t("transaction_id"))
                            .desired_width(260.0),
                    );
                    if ui.add_enabled(!busy, egui::Button::new(t.t("request_payment"))).clicked() {
                        submit = true;
                    }
                }
            });
            ui.add_space(12.0);

            if !self.my_payments.is_empty() {
                ui.label(egui::RichText::new(t.t("payment_history")).strong());
                egui::Grid::new("my_payments").num_columns(4).striped(true).show(ui, |ui| {
                    for p in &self.my_payments {
                        ui.label(local_time(p.created_at));
                        ui.label(format_price(p.amount));
                        ui.label(&p.phone_number);
                        ui.label(format!("{:?}", p.status));
                        ui.end_row();
                    }
                });
                ui.add_space(12.0);
            }

            // Settings
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(egui::RichText::new(t.t("settings")).size(18.0).strong());
                ui.horizontal(|ui| {
                    ui.label(format!("{}:", t.t("language")));
                    if ui.selectable_label(t.language() == Language::Sw, t.t("swahili")).clicked() {
                        language = Some(Language::Sw);
                    }
                    if ui.selectable_label(t.language() == Language::En, t.t("english")).clicked() {
                        language = Some(Language::En);
                    }
                });
                if ui.checkbox(&mut self.config.dark_mode, "🌙 Dark").changed() {
                    dark_changed = true;
                }
            });
        });

        if let Some(language) = language {
            self.set_language(language);
        }
        if dark_changed {
            apply_theme(ui.ctx(), self.config.dark_mode);
            self.save_config();
        }
        if submit {
            self.request_payment();
        }
    }

    fn show_admin(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        if !self.auth.is_admin() {
            ui.label(egui::RichText::new(t.t("error")).color(LIVE_RED));
            return;
        }

        let current = self.admin.tab.unwrap_or(AdminTab::Dashboard);
        let mut switch = None;
        ui.horizontal(|ui| {
            for (tab, key) in [
                (AdminTab::Dashboard, "dashboard"),
                (AdminTab::Payments, "payments"),
                (AdminTab::Users, "users"),
                (AdminTab::Channels, "manage_channels"),
                (AdminTab::Matches, "manage_matches"),
                (AdminTab::Slideshows, "manage_slideshow"),
            ] {
                if ui.selectable_label(current == tab, t.t(key)).clicked() && current != tab {
                    switch = Some(tab);
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(format!("🔄 {}", t.t("refresh"))).clicked() {
                    switch = Some(current);
                }
            });
        });
        ui.separator();

        if let Some(tab) = switch {
            self.admin.tab = Some(tab);
            self.load_admin_tab(tab);
            return;
        }

        egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| match current {
            AdminTab::Dashboard => self.show_admin_dashboard(ui),
            AdminTab::Payments => self.show_admin_payments(ui),
            AdminTab::Users => self.show_admin_users(ui),
            AdminTab::Channels => self.show_admin_channels(ui),
            AdminTab::Matches => self.show_admin_matches(ui),
            AdminTab::Slideshows => self.show_admin_slideshows(ui),
        });
    }

    fn show_admin_dashboard(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let stats = self.admin.stats;
        ui.horizontal_wrapped(|ui| {
            for (key, value) in [
                ("total_users", stats.users),
                ("total_channels", stats.channels),
                ("total_matches", stats.matches),
                ("pending_payments", stats.pending_payments),
            ] {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_min_size(egui::vec2(180.0, 70.0));
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(t.t(key)).weak());
                        ui.label(egui::RichText::new(value.to_string()).size(28.0).strong());
                    });
                });
            }
        });
    }

    fn show_admin_payments(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let mut approve = None;
        let mut reject = None;

        egui::Grid::new("admin_payments").num_columns(6).striped(true).spacing([14.0, 6.0]).show(ui, |ui| {
            ui.label("");
            for key in ["phone", "transaction_id", "amount", "status"] {
                ui.label(egui::RichText::new(t.t(key)).strong());
            }
            ui.label("");
            ui.end_row();

            for p in &self.admin.payments {
                ui.label(local_time(p.created_at));
                ui.label(&p.phone_number);
                ui.label(p.transaction_id.as_deref().unwrap_or("-"));
                ui.label(format_price(p.amount));
                let color = match p.status {
                    PaymentStatus::Pending => GOLD,
                    PaymentStatus::Approved => OK_GREEN,
                    PaymentStatus::Rejected => LIVE_RED,
                };
                ui.label(egui::RichText::new(format!("{:?}", p.status)).color(color));
                ui.horizontal(|ui| {
                    if p.status == PaymentStatus::Pending {
                        if ui.button(format!("✔ {}", t.t("approve_payment"))).clicked() {
                            approve = Some(p.clone());
                        }
                        if ui.button(format!("✖ {}", t.t("reject_payment"))).clicked() {
                            reject = Some(p.id.clone());
                        }
                    }
                });
                ui.end_row();
            }
        });

        if let Some(payment) = approve {
            self.approve_payment(payment);
        }
        if let Some(id) = reject {
            self.reject_payment(id);
        }
    }

    fn show_admin_users(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let now = Utc::now();
        let mut change = None;

        egui::Grid::new("admin_users").num_columns(5).striped(true).spacing([14.0, 6.0]).show(ui, |ui| {
            for user in &self.admin.users {
                let state = subscription::effective_state(user, now);
                ui.label(egui::RichText::new(user.display_name()).strong());
                ui.label(&user.email);
                ui.label(user.phone.as_deref().unwrap_or("-"));
                ui.label(egui::RichText::new(t.t(state.label_key())).color(status_color(state)));
                ui.horizontal(|ui| {
                    if state != SubscriptionState::Active && ui.button(t.t("activate")).clicked() {
                        change = Some((user.id.clone(), SubscriptionState::Active));
                    }
                    if state == SubscriptionState::Active && ui.button(t.t("deactivate")).clicked() {
                        change = Some((user.id.clone(), SubscriptionState::Expired));
                    }
                });
                ui.end_row();
            }
        });

        if let Some((user_id, status)) = change {
            self.set_user_status(user_id, status);
        }
    }

    fn show_admin_channels(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let mut delete = None;

        if ui.button(format!("➕ {}", t.t("add"))).clicked() {
            self.admin.channel_editor.create();
        }
        ui.add_space(6.0);

        let mut edit = None;
        egui::Grid::new("admin_channels").num_columns(5).striped(true).spacing([14.0, 6.0]).show(ui, |ui| {
            for c in &self.admin.channels {
                ui.label(c.order_index.to_string());
                ui.label(egui::RichText::new(&c.name).strong());
                ui.label(t.t(&c.category));
                ui.label(if c.is_active { "✔" } else { "✖" });
                ui.horizontal(|ui| {
                    if ui.button(t.t("edit")).clicked() {
                        edit = Some(c.clone());
                    }
                    if ui.button(t.t("delete")).clicked() {
                        delete = Some(c.id.clone());
                    }
                });
                ui.end_row();
            }
        });

        if let Some(c) = edit {
            self.admin.channel_editor.edit(&c.id, ChannelForm::from(&c));
        }
        if let Some(id) = delete {
            self.delete_row("channels", id, AdminTab::Channels);
        }
    }

    fn show_admin_matches(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let mut delete = None;
        let mut edit = None;

        if ui.button(format!("➕ {}", t.t("add"))).clicked() {
            self.admin.match_editor.create();
        }
        ui.add_space(6.0);

        egui::Grid::new("admin_matches").num_columns(5).striped(true).spacing([14.0, 6.0]).show(ui, |ui| {
            for m in &self.admin.matches {
                ui.label(local_time(m.match_time));
                ui.label(egui::RichText::new(format!("{} vs {}", m.team_home, m.team_away)).strong());
                ui.label(&m.title);
                ui.horizontal(|ui| {
                    if m.is_live {
                        ui.label(egui::RichText::new(t.t("live")).color(LIVE_RED));
                    }
                    if m.is_featured {
                        ui.label(egui::RichText::new("★").color(GOLD));
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button(t.t("edit")).clicked() {
                        edit = Some(m.clone());
                    }
                    if ui.button(t.t("delete")).clicked() {
                        delete = Some(m.id.clone());
                    }
                });
                ui.end_row();
            }
        });

        if let Some(m) = edit {
            self.admin.match_editor.edit(&m.id, MatchForm::from(&m));
        }
        if let Some(id) = delete {
            self.delete_row("matches", id, AdminTab::Matches);
        }
    }

    fn show_admin_slideshows(&mut self, ui: &mut egui::Ui) {
        let t = self.tr;
        let mut delete = None;
        let mut edit = None;

        if ui.button(format!("➕ {}", t.t("add"))).clicked() {
            self.admin.slideshow_editor.create();
        }
        ui.add_space(6.0);

        egui::Grid::new("admin_slideshows").num_columns(4).striped(true).spacing([14.0, 6.0]).show(ui, |ui| {
            for s in &self.admin.slideshows {
                ui.label(s.order_index.to_string());
                ui.label(egui::RichText::new(&s.title).strong());
                ui.label(if s.is_active { "✔" } else { "✖" });
                ui.horizontal(|ui| {
                    if ui.button(t.t("edit")).clicked() {
                        edit = Some(s.clone());
                    }
                    if ui.button(t.t("delete")).clicked() {
                        delete = Some(s.id.clone());
                    }
                });
                ui.end_row();
            }
        });

        if let Some(s) = edit {
            self.admin.slideshow_editor.edit(&s.id, SlideshowForm::from(&s));
        }
        if let Some(id) = delete {
            self.delete_row("slideshows", id, AdminTab::Slideshows);
        }
    }

    /// Editor windows for the admin CRUD tabs
    fn show_admin_editors(&mut self, ctx: &egui::Context) {
        let t = self.tr;
        let mut save = None;
        let mut cancel = None;

        if self.admin.channel_editor.open {
            let form = &mut self.admin.channel_editor.form;
            egui::Window::new(t.t("manage_channels"))
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    egui::Grid::new("channel_form").num_columns(2).show(ui, |ui| {
                        ui.label(t.t("name"));
                        ui.text_edit_singleline(&mut form.name);
                        ui.end_row();
                        ui.label(t.t("description"));
                        ui.text_edit_singleline(&mut form.description);
                        ui.end_row();
                        ui.label(t.t("image_url"));
                        ui.text_edit_singleline(&mut form.image_url);
                        ui.end_row();
                        ui.label(t.t("stream_url"));
                        ui.text_edit_singleline(&mut form.stream_url);
                        ui.end_row();
                        ui.label(t.t("category"));
                        egui::ComboBox::from_id_salt("channel_category")
                            .selected_text(t.t(&form.category))
                            .show_ui(ui, |ui| {
                                for category in CHANNEL_CATEGORIES {
                                    ui.selectable_value(&mut form.category, category.to_string(), t.t(category));
                                }
                            });
                        ui.end_row();
                        ui.label(t.t("order"));
                        ui.text_edit_singleline(&mut form.order_index);
                        ui.end_row();
                        ui.label(t.t("is_active"));
                        ui.checkbox(&mut form.is_active, "");
                        ui.end_row();
                    });
                    ui.horizontal(|ui| {
                        if ui.button(t.t("save")).clicked() {
                            save = Some(AdminTab::Channels);
                        }
                        if ui.button(t.t("cancel")).clicked() {
                            cancel = Some(AdminTab::Channels);
                        }
                    });
                });
        }

        if self.admin.match_editor.open {
            let channels = &self.admin.channels;
            let form = &mut self.admin.match_editor.form;
            egui::Window::new(t.t("manage_matches"))
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    egui::Grid::new("match_form").num_columns(2).show(ui, |ui| {
                        ui.label(t.t("team_home"));
                        ui.text_edit_singleline(&mut form.team_home);
                        ui.end_row();
                        ui.label(t.t("team_away"));
                        ui.text_edit_singleline(&mut form.team_away);
                        ui.end_row();
                        ui.label(t.t("title"));
                        ui.text_edit_singleline(&mut form.title);
                        ui.end_row();
                        ui.label(t.t("match_time"));
                        ui.add(egui::TextEdit::singleline(&mut form.match_time).hint_text("YYYY-MM-DD HH:MM"));
                        ui.end_row();
                        ui.label(t.t("image_url"));
                        ui.text_edit_singleline(&mut form.poster_url);
                        ui.end_row();
                        ui.label(t.t("channels"));
                        let selected = form
                            .channel_id
                            .as_deref()
                            .and_then(|id| channels.iter().find(|c| c.id == id))
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| "-".to_string());
                        egui::ComboBox::from_id_salt("match_channel")
                            .selected_text(selected)
                            .show_ui(ui, |ui| {
                                ui.selectable_value(&mut form.channel_id, None, "-");
                                for c in channels {
                                    ui.selectable_value(&mut form.channel_id, Some(c.id.clone()), &c.name);
                                }
                            });
                        ui.end_row();
                        ui.label(t.t("live"));
                        ui.checkbox(&mut form.is_live, "");
                        ui.end_row();
                        ui.label(t.t("is_featured"));
                        ui.checkbox(&mut form.is_featured, "");
                        ui.end_row();
                    });
                    ui.horizontal(|ui| {
                        if ui.button(t.t("save")).clicked() {
                            save = Some(AdminTab::Matches);
                        }
                        if ui.button(t.t("cancel")).clicked() {
                            cancel = Some(AdminTab::Matches);
                        }
                    });
                });
        }

        if self.admin.slideshow_editor.open {
            let form = &mut self.admin.slideshow_editor.form;
            egui::Window::new(t.t("manage_slideshow"))
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    egui::Grid::new("slideshow_form").num_columns(2).show(ui, |ui| {
                        ui.label(t.t("title"));
                        ui.text_edit_singleline(&mut form.title);
                        ui.end_row();
                        ui.label(t.t("description"));
                        ui.text_edit_singleline(&mut form.description);
                        ui.end_row();
                        ui.label(t.t("image_url"));
                        ui.text_edit_singleline(&mut form.image_url);
                        ui.end_row();
                        ui.label("Link");
                        ui.horizontal(|ui| {
                            ui.selectable_value(&mut form.link_type, None, "-");
                            ui.selectable_value(&mut form.link_type, Some(SlideLink::Channel), t.t("channels"));
                            ui.selectable_value(&mut form.link_type, Some(SlideLink::Match), t.t("matches"));
                            ui.selectable_value(&mut form.link_type, Some(SlideLink::External), "URL");
                        });
                        ui.end_row();
                        ui.label("");
                        ui.add_enabled(form.link_type.is_some(), egui::TextEdit::singleline(&mut form.link_id));
                        ui.end_row();
                        ui.label(t.t("order"));
                        ui.text_edit_singleline(&mut form.order_index);
                        ui.end_row();
                        ui.label(t.t("is_active"));
                        ui.checkbox(&mut form.is_active, "");
                        ui.end_row();
                    });
                    ui.horizontal(|ui| {
                        if ui.button(t.t("save")).clicked() {
                            save = Some(AdminTab::Slideshows);
                        }
                        if ui.button(t.t("cancel")).clicked() {
                            cancel = Some(AdminTab::Slideshows);
                        }
                    });
                });
        }

        match save {
            Some(AdminTab::Channels) => self.save_channel(),
            Some(AdminTab::Matches) => self.save_match(),
            Some(AdminTab::Slideshows) => self.save_slideshow(),
            _ => {}
        }
        match cancel {
            Some(AdminTab::Channels) => self.admin.channel_editor.close(),
            Some(AdminTab::Matches) => self.admin.match_editor.close(),
            Some(AdminTab::Slideshows) => self.admin.slideshow_editor.close(),
            _ => {}
        }
    }

    fn show_console(&mut self, ui: &mut egui::Ui) {
        let lines = self.console.lines();
        ui.horizontal(|ui| {
            ui.heading(format!("📋 {}", self.tr.t("console")));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear").clicked() {
                    self.console.clear();
                }
                ui.label(egui::RichText::new(format!("{} lines", lines.len())).weak());
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &lines {
                    let color = if line.contains("ERROR") {
                        egui::Color32::from_rgb(255, 100, 100)
                    } else if line.contains("WARN") {
                        egui::Color32::from_rgb(255, 200, 100)
                    } else if line.contains("INFO") {
                        egui::Color32::from_rgb(150, 200, 255)
                    } else {
                        egui::Color32::GRAY
                    };
                    ui.label(egui::RichText::new(line).monospace().color(color));
                }
            });
    }
}

/// Card for a backend match; returns the channel to watch when clicked
fn match_card(ui: &mut egui::Ui, m: &Match, t: Translator) -> Option<String> {
    let mut clicked = None;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_size(egui::vec2(220.0, 90.0));
        ui.vertical(|ui| {
            if m.is_live {
                ui.label(egui::RichText::new(format!("● {}", t.t("live"))).color(LIVE_RED).strong());
            } else {
                ui.label(egui::RichText::new(local_time(m.match_time)).weak());
            }
            ui.label(egui::RichText::new(&m.team_home).strong());
            ui.label(egui::RichText::new(&m.team_away).strong());
            if let Some(ref channel_id) = m.channel_id {
                if ui.small_button(format!("▶ {}", t.t("watch_now"))).clicked() {
                    clicked = Some(channel_id.clone());
                }
            }
        });
    });
    clicked
}

/// Wrapped grid of channel tiles; returns the clicked channel
fn channel_grid<'a>(
    ui: &mut egui::Ui,
    channels: impl Iterator<Item = &'a Channel>,
    t: Translator,
) -> Option<&'a Channel> {
    let mut clicked = None;
    let mut any = false;
    ui.horizontal_wrapped(|ui| {
        for channel in channels {
            any = true;
            let text = format!("📺 {}\n{}", channel.name, t.t(&channel.category));
            let button = egui::Button::new(egui::RichText::new(text).size(14.0)).min_size(egui::vec2(190.0, 64.0));
            let response = ui.add(button);
            let response = match channel.description {
                Some(ref d) => response.on_hover_text(d),
                None => response,
            };
            if response.clicked() {
                clicked = Some(channel);
            }
        }
    });
    if !any {
        ui.label(egui::RichText::new(t.t("no_results")).weak());
    }
    clicked
}
