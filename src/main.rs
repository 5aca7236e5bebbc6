#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::error::Error;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eframe::egui::text::LayoutJob;
use eframe::egui::{self, Color32, FontId, Galley, Sense, TextFormat};
use eframe::{App, NativeOptions};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use clicktrans_rust_gui::config::{load_config_from_file, Config};
use clicktrans_rust_gui::document::{CaptionDocument, CaptionSurface};
use clicktrans_rust_gui::interaction::{ClickGate, OverlaySession, Tooltip, TooltipBody};
use clicktrans_rust_gui::markup::{self, SENTENCE_MARKER, WORD_MARKER};
use clicktrans_rust_gui::parsing::{load_srt_file, parse_srt_text, SAMPLE_TRACK};
use clicktrans_rust_gui::player::{SimulatedPlayer, VideoPlayer};
use clicktrans_rust_gui::sequencing::{TokioDispatcher, TranslationReply};
use clicktrans_rust_gui::translation::{DeepLTranslator, Translator};
use clicktrans_rust_gui::types::caption_data::{CaptionSegment, CaretPosition, Point, SegmentId, SubtitleCue};

const CAPTION_FONT_SIZE: f32 = 26.0;
/// Seconds a press waits for a second one before it counts as a single click.
const DOUBLE_CLICK_WINDOW: f64 = 0.3;
const WORD_BACKGROUND: Color32 = Color32::from_rgb(255, 214, 10);
const SENTENCE_BACKGROUND: Color32 = Color32::from_rgb(120, 180, 255);

#[derive(Parser, Debug)]
#[command(version, about = "Click a caption word to translate it")]
struct Args {
    /// Settings file (language pair, DeepL key, timeout).
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// SubRip file to play; a short built-in track is used otherwise.
    #[arg(long)]
    subtitles: Option<PathBuf>,
}

/// Where one caption line was painted last frame.
struct LineLayout {
    segment: SegmentId,
    rect: egui::Rect,
    galley: Arc<Galley>,
}

/// The caption document as laid out on screen: hit testing goes through the
/// painted galleys, everything else through the document.
struct OverlaySurface {
    doc: CaptionDocument,
    layouts: Vec<LineLayout>,
}

impl OverlaySurface {
    fn hit(&self, point: Point) -> Option<(SegmentId, usize)> {
        let pos = egui::pos2(point.x, point.y);
        let line = self.layouts.iter().find(|l| l.rect.contains(pos))?;
        let local = pos - line.rect.min;
        let cursor = line.galley.cursor_from_pos(local);
        let mut index = cursor.ccursor.index;
        // The cursor is the nearest boundary; step back onto the glyph under the pointer.
        if index > 0 && local.x < line.galley.pos_from_cursor(&cursor).min.x {
            index -= 1;
        }
        let len = self.doc.segment_text(line.segment)?.chars().count();
        (index < len).then_some((line.segment, index))
    }
}

impl CaptionSurface for OverlaySurface {
    fn segments(&self) -> Vec<CaptionSegment> {
        self.doc.snapshot()
    }

    fn segment_at(&self, point: Point) -> Option<SegmentId> {
        self.hit(point).map(|(id, _)| id)
    }

    fn caret_from_point(&self, point: Point) -> Option<CaretPosition> {
        let (id, index) = self.hit(point)?;
        self.doc.caret_at(id, index)
    }

    fn text_content(&self, segment: SegmentId) -> Option<String> {
        self.doc.segment_text(segment)
    }

    fn markup(&self, segment: SegmentId) -> Option<String> {
        self.doc.segment_markup(segment)
    }

    fn set_markup(&mut self, segment: SegmentId, markup: &str) -> bool {
        self.doc.write_markup(segment, markup)
    }
}

/// What the tooltip asked for this frame; applied after the UI closure.
enum TooltipAction {
    TranslateSentence,
    Retry,
    Reverse(String),
}

struct ClickTransApp {
    _runtime: Runtime,
    config: Config,
    session: OverlaySession<TokioDispatcher>,
    replies: Receiver<TranslationReply>,
    surface: OverlaySurface,
    player: SimulatedPlayer,
    track_name: String,
    tooltip_rect: Option<egui::Rect>,
    clicks: ClickGate,
    status: Option<String>,
}

impl ClickTransApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Runtime,
        config: Config,
        translator: Arc<dyn Translator>,
        cues: Vec<SubtitleCue>,
        track_name: String,
    ) -> Self {
        let (dispatcher, replies) = TokioDispatcher::new(runtime.handle().clone(), translator, config.request_timeout());
        let ctx = cc.egui_ctx.clone();
        let dispatcher = dispatcher.with_notify(Arc::new(move || ctx.request_repaint()));

        let status = config
            .deepl_api_key
            .is_none()
            .then(|| "No DeepL API key configured; translations will fail.".to_string());

        Self {
            _runtime: runtime,
            session: OverlaySession::new(dispatcher, config.sentence_policy),
            config,
            replies,
            surface: OverlaySurface { doc: CaptionDocument::new(), layouts: Vec::new() },
            player: SimulatedPlayer::new(cues),
            track_name,
            tooltip_rect: None,
            clicks: ClickGate::new(DOUBLE_CLICK_WINDOW),
            status,
        }
    }

    fn play_pause(&mut self) {
        if self.player.toggle() {
            self.session.video_played(&mut self.surface, &mut self.player);
        }
    }

    fn drain_replies(&mut self) {
        let pending: Vec<TranslationReply> = self.replies.try_iter().collect();
        for reply in pending {
            self.session.deliver(&mut self.surface, &mut self.player, reply);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (escape, space) = ctx.input(|i| (i.key_pressed(egui::Key::Escape), i.key_pressed(egui::Key::Space)));
        if escape {
            self.session.dismiss(&mut self.surface, &mut self.player);
        }
        if space {
            self.play_pause();
        }
    }

    /// Pointer input against last frame's layout, which is what the viewer saw.
    /// Single presses wait out the double-click window first.
    fn handle_pointer(&mut self, ctx: &egui::Context) {
        let (pressed, double, pos, now) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.button_double_clicked(egui::PointerButton::Primary),
                i.pointer.interact_pos(),
                i.time,
            )
        });

        if let Some(pos) = pos.filter(|p| !self.tooltip_rect.map_or(false, |r| r.contains(*p))) {
            let point = Point::new(pos.x, pos.y);
            if pressed {
                self.clicks.press(point, now);
            }
            if double {
                self.clicks.double_click();
                self.session.double_click(&mut self.surface, &mut self.player, point);
            }
        }

        if let Some(point) = self.clicks.poll(now) {
            self.session.pointer_down(&mut self.surface, &mut self.player, point);
        }
        if let Some(wait) = self.clicks.remaining(now) {
            ctx.request_repaint_after(Duration::from_secs_f64(wait));
        }
    }

    fn caption_galley(&self, ui: &egui::Ui, segment: SegmentId) -> Option<Arc<Galley>> {
        let markup = self.surface.doc.segment_markup(segment)?;
        let mut job = LayoutJob::default();
        for fragment in markup::fragments(&markup) {
            let background = match fragment.marker.as_deref() {
                Some(WORD_MARKER) => WORD_BACKGROUND,
                Some(SENTENCE_MARKER) => SENTENCE_BACKGROUND,
                _ => Color32::TRANSPARENT,
            };
            let color = if background == Color32::TRANSPARENT { Color32::WHITE } else { Color32::BLACK };
            job.append(
                &fragment.text,
                0.0,
                TextFormat {
                    font_id: FontId::proportional(CAPTION_FONT_SIZE),
                    color,
                    background,
                    ..Default::default()
                },
            );
        }
        Some(ui.fonts(|f| f.layout_job(job)))
    }

    fn draw_captions(&mut self, ui: &mut egui::Ui) {
        let mut layouts = Vec::new();
        ui.vertical_centered(|ui| {
            for segment in self.surface.doc.ids() {
                let Some(galley) = self.caption_galley(ui, segment) else {
                    continue;
                };
                let (rect, _) = ui.allocate_exact_size(galley.size(), Sense::click());
                ui.painter().rect_filled(rect.expand(4.0), 4.0, Color32::from_black_alpha(180));
                ui.painter().galley(rect.min, galley.clone(), Color32::WHITE);
                layouts.push(LineLayout { segment, rect, galley });
            }
        });
        self.surface.layouts = layouts;
    }

    fn draw_tooltip(&mut self, ctx: &egui::Context) -> Option<TooltipAction> {
        let Some(tooltip) = self.session.tooltip().cloned() else {
            self.tooltip_rect = None;
            return None;
        };
        let mut action = None;
        let response = egui::Area::new(egui::Id::new("clicktrans_tooltip"))
            .order(egui::Order::Foreground)
            .fixed_pos(egui::pos2(tooltip.anchor.x + 12.0, tooltip.anchor.y + 16.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(360.0);
                    action = tooltip_contents(ui, &tooltip);
                });
            })
            .response;
        self.tooltip_rect = Some(response.rect);
        action
    }
}

fn tooltip_contents(ui: &mut egui::Ui, tooltip: &Tooltip) -> Option<TooltipAction> {
    let mut action = None;
    match &tooltip.body {
        TooltipBody::Loading { source } => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Translating \"{}\"…", source));
            });
        }
        TooltipBody::Word { word, translation } => {
            ui.label(egui::RichText::new(word).strong());
            ui.label(translation);
            ui.separator();
            if ui.button("Translate sentence").clicked() {
                action = Some(TooltipAction::TranslateSentence);
            }
        }
        TooltipBody::Sentence { sentence, words, reverse, .. } => {
            ui.label(egui::RichText::new(sentence).italics());
            ui.horizontal_wrapped(|ui| {
                for word in words {
                    if ui.link(word).clicked() {
                        action = Some(TooltipAction::Reverse(word.clone()));
                    }
                }
            });
            if let Some(lookup) = reverse {
                ui.separator();
                let text = match &lookup.result {
                    None => format!("{} → …", lookup.word),
                    Some(outcome) if outcome.is_failure() => format!("{}: {}", lookup.word, outcome.text()),
                    Some(outcome) => format!("{} → {}", lookup.word, outcome.text()),
                };
                ui.label(text);
            }
        }
        TooltipBody::Failed { source, message } => {
            ui.label(egui::RichText::new(source).strong());
            ui.colored_label(Color32::LIGHT_RED, message);
            if ui.button("Retry").clicked() {
                action = Some(TooltipAction::Retry);
            }
        }
    }
    action
}

impl App for ClickTransApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt).clamp(0.0, 0.25);
        self.player.advance(Duration::from_secs_f32(dt));
        if self.surface.doc.sync_lines(&self.player.active_lines()) {
            // Old layouts point at segments that no longer exist.
            self.surface.layouts.clear();
        }
        self.drain_replies();
        self.handle_keys(ctx);
        self.handle_pointer(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.separator();
                ui.label(format!("{} → {}", self.config.source_lang, self.config.target_lang));
                ui.separator();
                ui.label(&self.track_name);
            });
        });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let label = if self.player.is_playing() { "Pause" } else { "Play" };
                if ui.button(label).clicked() {
                    self.play_pause();
                }
                let position = self.player.position().as_secs_f32();
                let total = self.player.duration().as_secs_f32();
                let mut seek_to = position;
                if ui.add(egui::Slider::new(&mut seek_to, 0.0..=total.max(0.1)).suffix(" s")).changed() {
                    self.player.seek(Duration::from_secs_f32(seek_to));
                }
                ui.label(format!("generation {}", self.session.controller().generation()));
                if let Some(status) = &self.status {
                    ui.colored_label(Color32::YELLOW, status);
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::from_gray(18)))
            .show(ctx, |ui| {
                let height = ui.available_height();
                ui.add_space((height * 0.6).max(0.0));
                self.draw_captions(ui);
            });

        match self.draw_tooltip(ctx) {
            Some(TooltipAction::TranslateSentence) => self.session.request_sentence(&mut self.surface, &mut self.player),
            Some(TooltipAction::Retry) => self.session.retry(&mut self.surface, &mut self.player),
            Some(TooltipAction::Reverse(word)) => {
                self.session.reverse_lookup(&mut self.surface, &mut self.player, &word)
            }
            None => {}
        }

        if self.player.is_playing() {
            ctx.request_repaint();
        }
    }
}

fn load_cues(path: Option<&PathBuf>) -> (Vec<SubtitleCue>, String) {
    if let Some(path) = path {
        match load_srt_file(path) {
            Ok(cues) => {
                info!("loaded {} cues from {}", cues.len(), path.display());
                return (cues, path.display().to_string());
            }
            Err(e) => error!("{}; falling back to the sample track", e),
        }
    }
    match parse_srt_text(SAMPLE_TRACK) {
        Ok(cues) => (cues, "sample track".to_string()),
        Err(e) => {
            error!("sample track: {}", e);
            (Vec::new(), "no subtitles".to_string())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("clicktrans_rust_gui=info".parse()?))
        .init();

    let args = Args::parse();
    let config = match load_config_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; using default settings", e);
            Config::default()
        }
    };
    let translator: Arc<dyn Translator> = Arc::new(DeepLTranslator::new(&config)?);
    let (cues, track_name) = load_cues(args.subtitles.as_ref());
    let runtime = Runtime::new()?;

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "ClickTrans - caption translator",
        options,
        Box::new(move |cc| Box::new(ClickTransApp::new(cc, runtime, config, translator, cues, track_name))),
    )?;
    Ok(())
}
