// Internal video player using ffmpeg-next
// Requires FFmpeg libraries: libavcodec, libavformat, libavutil, libswscale
//
// To install FFmpeg development libraries:
// - Ubuntu/Debian: sudo apt install libavcodec-dev libavformat-dev libavutil-dev libswscale-dev libavdevice-dev
// - Fedora: sudo dnf install ffmpeg-devel
// - macOS: brew install ffmpeg
// - Windows: Download from https://ffmpeg.org and set FFMPEG_DIR environment variable

use std::sync::{Arc, Mutex};

use crate::i18n::Translator;
use crate::player::controller::LOAD_ERROR_HINT;
use crate::player::RenderState;

/// Decoded video frame for rendering
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB24 data
}

/// Latest frame, written by the decode thread and taken by the view
pub type FrameSlot = Arc<Mutex<Option<DecodedFrame>>>;

#[cfg(feature = "internal-player")]
mod player_impl {
    use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    extern crate ffmpeg_next as ffmpeg;
    use ffmpeg::format::Pixel;
    use ffmpeg::media::Type;
    use ffmpeg::software::scaling::{context::Context as ScalingContext, flag::Flags};
    use ffmpeg::util::frame::video::Video as VideoFrame;
    use tracing::{debug, info, warn};

    use super::{DecodedFrame, FrameSlot};
    use crate::player::{EventSink, MediaElement, MediaEvent};

    /// Commands to send to player thread
    enum PlayerCommand {
        Stop,
        Pause,
        Resume,
    }

    /// FFmpeg-backed media element. Plays HLS through FFmpeg's own demuxer.
    pub struct InternalPlayer {
        sink: Option<EventSink>,
        command_sender: Option<Sender<PlayerCommand>>,
        frames: FrameSlot,
        user_agent: String,
        muted: bool,
    }

    impl InternalPlayer {
        pub fn new(user_agent: &str) -> Self {
            if let Err(e) = ffmpeg::init() {
                warn!("FFmpeg init failed: {}", e);
            }

            Self {
                sink: None,
                command_sender: None,
                frames: FrameSlot::default(),
                user_agent: user_agent.to_string(),
                muted: false,
            }
        }

        pub fn frame_slot(&self) -> FrameSlot {
            Arc::clone(&self.frames)
        }

        pub fn is_muted(&self) -> bool {
            self.muted
        }

        fn send(&self, command: PlayerCommand) {
            if let Some(ref sender) = self.command_sender {
                let _ = sender.send(command);
            }
        }

        fn stop(&mut self) {
            self.send(PlayerCommand::Stop);
            self.command_sender = None;
            if let Ok(mut frame) = self.frames.lock() {
                *frame = None;
            }
        }

        fn decode_thread(
            url: String,
            user_agent: String,
            frames: FrameSlot,
            cmd_rx: Receiver<PlayerCommand>,
            sink: Option<EventSink>,
        ) {
            let report = |event: MediaEvent| {
                if let Some(ref sink) = sink {
                    sink.media(event);
                }
            };

            // Set options for network streams
            let mut options = ffmpeg::Dictionary::new();
            options.set("user_agent", &user_agent);
            options.set("reconnect", "1");
            options.set("reconnect_streamed", "1");
            options.set("reconnect_delay_max", "5");
            options.set("timeout", "5000000"); // 5 second timeout

            let mut ictx = match ffmpeg::format::input_with_dictionary(&url, options) {
                Ok(ctx) => ctx,
                Err(e) => {
                    report(MediaEvent::Error(format!("Failed to open stream: {}", e)));
                    return;
                }
            };

            let (video_stream_index, parameters) = match ictx.streams().best(Type::Video) {
                Some(stream) => (stream.index(), stream.parameters()),
                None => {
                    report(MediaEvent::Error("No video stream found".to_string()));
                    return;
                }
            };

            let decoder = ffmpeg::codec::context::Context::from_parameters(parameters)
                .and_then(|ctx| ctx.decoder().video());
            let mut decoder = match decoder {
                Ok(d) => d,
                Err(e) => {
                    report(MediaEvent::Error(format!("Failed to create decoder: {}", e)));
                    return;
                }
            };

            let width = decoder.width();
            let height = decoder.height();

            // Scale down anything above 720p
            let (target_width, target_height) = if width > 1280 || height > 720 {
                let scale = f64::min(1280.0 / width as f64, 720.0 / height as f64);
                ((width as f64 * scale) as u32, (height as f64 * scale) as u32)
            } else {
                (width, height)
            };

            let mut scaler = match ScalingContext::get(
                decoder.format(),
                width,
                height,
                Pixel::RGB24,
                target_width,
                target_height,
                Flags::BILINEAR,
            ) {
                Ok(s) => s,
                Err(e) => {
                    report(MediaEvent::Error(format!("Failed to create scaler: {}", e)));
                    return;
                }
            };

            info!(%url, width, height, "stream opened");

            // Starts paused; the session decides when to play
            let mut paused = true;
            let mut ready = false;
            let frame_duration = Duration::from_secs_f64(1.0 / 30.0);
            let mut last_frame_time = Instant::now();

            let mut packets = ictx.packets();
            loop {
                // Waiting for play: block on commands instead of decoding
                let command = if ready && paused {
                    match cmd_rx.recv_timeout(Duration::from_millis(100)) {
                        Ok(cmd) => Some(cmd),
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                } else {
                    match cmd_rx.try_recv() {
                        Ok(cmd) => Some(cmd),
                        Err(TryRecvError::Empty) => None,
                        Err(TryRecvError::Disconnected) => break,
                    }
                };

                match command {
                    Some(PlayerCommand::Stop) => break,
                    Some(PlayerCommand::Pause) => {
                        if !paused {
                            paused = true;
                            report(MediaEvent::Paused);
                        }
                        continue;
                    }
                    Some(PlayerCommand::Resume) => {
                        if paused {
                            paused = false;
                            report(MediaEvent::Playing);
                        }
                    }
                    None => {}
                }

                let Some((stream, packet)) = packets.next() else {
                    report(MediaEvent::Ended);
                    break;
                };

                if stream.index() != video_stream_index {
                    continue;
                }
                if decoder.send_packet(&packet).is_err() {
                    continue;
                }

                let mut decoded = VideoFrame::empty();
                while decoder.receive_frame(&mut decoded).is_ok() {
                    let mut rgb_frame = VideoFrame::empty();
                    if scaler.run(&decoded, &mut rgb_frame).is_err() {
                        continue;
                    }

                    let data = rgb_frame.data(0);
                    let stride = rgb_frame.stride(0);
                    let row_len = target_width as usize * 3;
                    let mut frame_data = Vec::with_capacity(row_len * target_height as usize);
                    for y in 0..target_height as usize {
                        let row_start = y * stride;
                        frame_data.extend_from_slice(&data[row_start..row_start + row_len]);
                    }

                    if let Ok(mut slot) = frames.lock() {
                        *slot = Some(DecodedFrame {
                            width: target_width,
                            height: target_height,
                            data: frame_data,
                        });
                    }

                    if !ready {
                        ready = true;
                        debug!("first frame decoded");
                        report(MediaEvent::CanPlay);
                    }

                    // Rate limiting to avoid overwhelming the UI
                    let elapsed = last_frame_time.elapsed();
                    if elapsed < frame_duration {
                        thread::sleep(frame_duration - elapsed);
                    }
                    last_frame_time = Instant::now();
                }
            }

            debug!(%url, "decode thread finished");
        }
    }

    impl MediaElement for InternalPlayer {
        fn bind(&mut self, sink: EventSink) {
            self.sink = Some(sink);
        }

        fn unbind(&mut self) {
            self.sink = None;
        }

        fn set_source(&mut self, url: &str) {
            self.stop();

            let (cmd_tx, cmd_rx) = channel();
            self.command_sender = Some(cmd_tx);

            let url = url.to_string();
            let user_agent = self.user_agent.clone();
            let frames = Arc::clone(&self.frames);
            let sink = self.sink.clone();

            thread::spawn(move || {
                Self::decode_thread(url, user_agent, frames, cmd_rx, sink);
            });
        }

        fn clear_source(&mut self) {
            self.stop();
        }

        fn play(&mut self) {
            self.send(PlayerCommand::Resume);
        }

        fn pause(&mut self) {
            self.send(PlayerCommand::Pause);
        }

        fn set_muted(&mut self, muted: bool) {
            // Video only, nothing is decoded for audio yet
            self.muted = muted;
        }

        fn can_play_native_hls(&self) -> bool {
            true
        }
    }

    impl Drop for InternalPlayer {
        fn drop(&mut self) {
            self.stop();
        }
    }
}

// Stub implementation when internal-player feature is disabled
#[cfg(not(feature = "internal-player"))]
mod player_impl {
    use super::FrameSlot;
    use crate::player::{EventSink, MediaElement, MediaEvent};

    pub const DISABLED_MESSAGE: &str =
        "Internal player not enabled. Build with --features internal-player";

    pub struct InternalPlayer {
        sink: Option<EventSink>,
        frames: FrameSlot,
        muted: bool,
    }

    impl InternalPlayer {
        pub fn new(_user_agent: &str) -> Self {
            Self {
                sink: None,
                frames: FrameSlot::default(),
                muted: false,
            }
        }

        pub fn frame_slot(&self) -> FrameSlot {
            std::sync::Arc::clone(&self.frames)
        }

        pub fn is_muted(&self) -> bool {
            self.muted
        }
    }

    impl MediaElement for InternalPlayer {
        fn bind(&mut self, sink: EventSink) {
            self.sink = Some(sink);
        }

        fn unbind(&mut self) {
            self.sink = None;
        }

        fn set_source(&mut self, _url: &str) {
            if let Some(ref sink) = self.sink {
                sink.media(MediaEvent::Error(DISABLED_MESSAGE.to_string()));
            }
        }

        fn clear_source(&mut self) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn set_muted(&mut self, muted: bool) { self.muted = muted; }
        fn can_play_native_hls(&self) -> bool { false }
    }
}

// Re-export
pub use player_impl::*;

/// What the viewer did on the player this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Interact,
    TogglePlay,
    ToggleMute,
    ToggleFullscreen,
    Upgrade,
    Exit,
}

/// Draws frames and the session overlays
pub struct PlayerView {
    frames: FrameSlot,
    texture: Option<egui::TextureHandle>,
}

impl PlayerView {
    pub fn new(frames: FrameSlot) -> Self {
        Self {
            frames,
            texture: None,
        }
    }

    /// Forget the last frame, e.g. after switching channels
    pub fn reset(&mut self) {
        self.texture = None;
        if let Ok(mut slot) = self.frames.lock() {
            *slot = None;
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let frame = match self.frames.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(frame) = frame {
            let image = egui::ColorImage::from_rgb(
                [frame.width as usize, frame.height as usize],
                &frame.data,
            );
            self.texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
        }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        state: &RenderState,
        t: &Translator,
    ) -> Vec<PlayerAction> {
        let mut actions = Vec::new();
        self.upload_frame(ctx);

        // 16:9 box, or the whole area when fullscreen
        let available = ui.available_size();
        let size = if state.fullscreen {
            available
        } else {
            let width = available.x;
            let height = (width * 9.0 / 16.0).min(available.y);
            egui::vec2(height * 16.0 / 9.0, height)
        };
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 8.0, egui::Color32::BLACK);

        if response.clicked() || (response.hovered() && ctx.input(|i| i.pointer.is_moving())) {
            actions.push(PlayerAction::Interact);
        }

        if let Some(ref texture) = self.texture {
            let tex_size = texture.size_vec2();
            let scale = f32::min(rect.width() / tex_size.x, rect.height() / tex_size.y);
            let image_rect = egui::Rect::from_center_size(rect.center(), tex_size * scale);
            egui::Image::new((texture.id(), image_rect.size())).paint_at(ui, image_rect);
        }

        if state.loading {
            ui.put(
                egui::Rect::from_center_size(rect.center(), egui::vec2(48.0, 48.0)),
                egui::Spinner::new().size(48.0),
            );
        }

        if let Some(message) = state.error {
            painter.rect_filled(rect, 8.0, egui::Color32::BLACK);
            painter.text(
                rect.center() - egui::vec2(0.0, 12.0),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(18.0),
                egui::Color32::from_rgb(239, 68, 68),
            );
            painter.text(
                rect.center() + egui::vec2(0.0, 14.0),
                egui::Align2::CENTER_CENTER,
                LOAD_ERROR_HINT,
                egui::FontId::proportional(13.0),
                egui::Color32::GRAY,
            );
        }

        if let Some(ref remaining) = state.trial_banner {
            painter.text(
                rect.right_top() + egui::vec2(-16.0, 16.0),
                egui::Align2::RIGHT_TOP,
                format!("{}: {}", t.t("trial_time_remaining"), remaining),
                egui::FontId::proportional(14.0),
                egui::Color32::from_rgb(245, 158, 11),
            );
        }

        if state.locked {
            painter.rect_filled(rect, 8.0, egui::Color32::from_black_alpha(240));
            painter.text(
                rect.center() - egui::vec2(0.0, 60.0),
                egui::Align2::CENTER_CENTER,
                "🔒",
                egui::FontId::proportional(40.0),
                egui::Color32::WHITE,
            );
            painter.text(
                rect.center() - egui::vec2(0.0, 16.0),
                egui::Align2::CENTER_CENTER,
                t.t("free_trial_ended"),
                egui::FontId::proportional(16.0),
                egui::Color32::WHITE,
            );
            painter.text(
                rect.center() + egui::vec2(0.0, 10.0),
                egui::Align2::CENTER_CENTER,
                t.t("subscription_price"),
                egui::FontId::proportional(13.0),
                egui::Color32::GRAY,
            );
            let button = egui::Rect::from_center_size(
                rect.center() + egui::vec2(0.0, 50.0),
                egui::vec2(160.0, 36.0),
            );
            if ui.put(button, egui::Button::new(t.t("upgrade_now"))).clicked() {
                actions.push(PlayerAction::Upgrade);
            }
        }

        if state.controls_visible {
            let top = egui::Rect::from_min_size(rect.left_top() + egui::vec2(12.0, 12.0), egui::vec2(36.0, 28.0));
            if ui.put(top, egui::Button::new("⬅")).clicked() {
                actions.push(PlayerAction::Exit);
            }
            painter.text(
                top.right_center() + egui::vec2(10.0, 0.0),
                egui::Align2::LEFT_CENTER,
                &state.title,
                egui::FontId::proportional(16.0),
                egui::Color32::WHITE,
            );

            if state.show_center_play {
                let center = egui::Rect::from_center_size(rect.center(), egui::vec2(64.0, 64.0));
                let play = egui::Button::new(egui::RichText::new("▶").size(28.0));
                if ui.put(center, play).clicked() {
                    actions.push(PlayerAction::TogglePlay);
                }
            }

            let bar_y = rect.bottom() - 44.0;
            let slot = |x: f32| egui::Rect::from_min_size(egui::pos2(x, bar_y), egui::vec2(36.0, 30.0));

            let play_label = if state.playing { "⏸" } else { "▶" };
            let play_enabled = !state.locked;
            if ui
                .put(slot(rect.left() + 12.0), egui::Button::new(play_label))
                .clicked()
                && play_enabled
            {
                actions.push(PlayerAction::TogglePlay);
            }

            let mute_label = if state.muted { "🔇" } else { "🔊" };
            if ui.put(slot(rect.right() - 96.0), egui::Button::new(mute_label)).clicked() {
                actions.push(PlayerAction::ToggleMute);
            }
            if ui.put(slot(rect.right() - 48.0), egui::Button::new("⛶")).clicked() {
                actions.push(PlayerAction::ToggleFullscreen);
            }
        }

        actions
    }
}
