use analysis_host::{Action, OperationKind, SearchMode, SessionState, Store};
use eframe::egui;
use providers::GeminiAnalysisProvider;
use shared::settings::AppSettings;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

mod animation;
mod cards;
mod onboarding;
mod palette;
mod simple_md;
mod state;

use palette::Palette;
use state::{Page, UiState};

const HEADER_DELAY: Duration = Duration::from_millis(100);
const SUBTITLE_DELAY: Duration = Duration::from_millis(300);
const FADE: Duration = Duration::from_millis(700);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("intellipatent-worker")
        .build()?;
    let settings = AppSettings::load_or_default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([900.0, 600.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "IntelliPatent AI",
        options,
        Box::new(move |cc| {
            Box::new(IntelliPatentApp::new(
                cc.egui_ctx.clone(),
                runtime,
                settings,
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("UI failed: {e}"))
}

struct IntelliPatentApp {
    runtime: tokio::runtime::Runtime,
    ctx: egui::Context,
    /// `None` until a provider could be built from the settings.
    store: Option<Store>,
    ui: UiState,
}

impl IntelliPatentApp {
    fn new(ctx: egui::Context, runtime: tokio::runtime::Runtime, settings: AppSettings) -> Self {
        let mut app = Self {
            runtime,
            ctx,
            store: None,
            ui: UiState::new(settings),
        };
        app.connect();
        app
    }

    fn connect(&mut self) {
        let provider = match GeminiAnalysisProvider::from_settings(&self.ui.settings) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!("Analysis provider unavailable: {:#}", e);
                return;
            }
        };
        let store = Store::new(Arc::new(provider), self.runtime.handle().clone());
        let ctx = self.ctx.clone();
        store.set_notifier(move || ctx.request_repaint());
        self.resolve_location(&store);
        tracing::info!("Connected to Gemini");
        self.store = Some(store);
    }

    /// Location is best effort; geo insights simply run unbiased without it.
    fn resolve_location(&self, store: &Store) {
        let settings = self.ui.settings.clone();
        let store = store.clone();
        self.runtime.spawn(async move {
            match settings.location() {
                Some(location) => {
                    tracing::info!(
                        latitude = location.latitude,
                        longitude = location.longitude,
                        "Using location for geo insights"
                    );
                    store.dispatch(Action::SetLocation(Some(location)));
                }
                None => tracing::debug!("No location configured"),
            }
        });
    }

    fn save_api_key(&mut self, key: String) {
        self.ui.settings.gemini.api_key = Some(key);
        if let Err(e) = self.ui.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
        self.connect();
        if self.store.is_some() {
            self.ui.api_key_draft.clear();
            self.ui.setup_error = None;
        } else {
            self.ui.setup_error = Some("That key could not be used. Please check it and try again.".into());
        }
    }

    fn animate(&mut self, ctx: &egui::Context, session: &SessionState) {
        let now = Instant::now();
        if now.duration_since(self.ui.launched_at) < SUBTITLE_DELAY + FADE {
            ctx.request_repaint();
        }
        if session.search_mode == SearchMode::Analyze && session.input_text.is_empty() {
            self.ui.placeholder.advance(now);
            ctx.request_repaint_after(self.ui.placeholder.until_next(now));
        }
    }
}

impl eframe::App for IntelliPatentApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let palette = Palette::new(self.ui.dark());
        palette::apply_style(ctx, &palette);

        let mut toggle_theme = false;
        let elapsed = self.ui.launched_at.elapsed();
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(palette.panel_fill).inner_margin(egui::Margin::symmetric(16.0, 12.0)))
            .show(ctx, |ui| {
                toggle_theme = render_header(ui, &palette, elapsed);
            });
        if toggle_theme {
            self.ui.toggle_theme();
        }

        let Some(store) = self.store.clone() else {
            let mut submitted = None;
            egui::CentralPanel::default().show(ctx, |ui| {
                submitted = onboarding::render_setup_screen(
                    ui,
                    &palette,
                    &mut self.ui.api_key_draft,
                    self.ui.setup_error.as_deref(),
                );
            });
            if let Some(key) = submitted {
                self.save_api_key(key);
            }
            return;
        };

        let session = store.snapshot();
        self.animate(ctx, &session);
        let placeholder = self.ui.placeholder.text();
        let mut actions = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_source("main")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add_space(8.0);
                    render_input_panel(ui, &palette, &placeholder, &session, &mut actions);

                    if let Some(error) = &session.last_error {
                        if cards::error_banner(ui, &palette, error) {
                            actions.push(Action::DismissError);
                        }
                    }

                    cards::search_results_card(
                        ui,
                        &palette,
                        &session.search,
                        session.is_pending(OperationKind::PriorArtSearch),
                    );

                    if session.is_pending(OperationKind::InitialAnalysis) {
                        for height in [180.0, 240.0, 210.0] {
                            cards::skeleton(ui, &palette, height);
                        }
                    } else if session.analysis_result.is_some() {
                        render_dashboard(ui, &palette, &mut self.ui, &session, &mut actions);
                    }
                });
        });

        for action in actions {
            if action == Action::StartAnalysis {
                self.ui.page = Page::Dashboard;
            }
            store.dispatch(action);
        }
    }
}

/// Title, subtitle and theme switch. Returns true when the theme was toggled.
fn render_header(ui: &mut egui::Ui, palette: &Palette, elapsed: Duration) -> bool {
    let title_alpha = animation::fade_in(elapsed, HEADER_DELAY, FADE);
    let subtitle_alpha = animation::fade_in(elapsed, SUBTITLE_DELAY, FADE);
    let mut toggled = false;

    ui.horizontal(|ui| {
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = if palette.dark { "☀ Light" } else { "🌙 Dark" };
            let hint = if palette.dark {
                "Switch to light mode"
            } else {
                "Switch to dark mode"
            };
            toggled = ui.button(label).on_hover_text(hint).clicked();

            ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
                ui.add_space((1.0 - title_alpha) * 20.0);
                ui.label(
                    egui::RichText::new("IntelliPatent AI")
                        .size(32.0)
                        .strong()
                        .color(palette.heading.gamma_multiply(title_alpha)),
                );
                ui.add_space((1.0 - subtitle_alpha) * 10.0);
                ui.label(
                    egui::RichText::new("Your AI-Powered Patent Analytics Assistant")
                        .size(16.0)
                        .color(palette.muted.gamma_multiply(subtitle_alpha)),
                );
            });
        });
    });
    toggled
}

fn mode_tab(
    ui: &mut egui::Ui,
    palette: &Palette,
    label: &str,
    mode: SearchMode,
    current: SearchMode,
    width: f32,
) -> bool {
    let selected = mode == current;
    let color = if selected { palette.heading } else { palette.muted };
    let button = egui::Button::new(egui::RichText::new(label).size(15.0).strong().color(color))
        .fill(if selected {
            palette.inset_fill
        } else {
            egui::Color32::TRANSPARENT
        })
        .rounding(egui::Rounding::same(8.0));
    ui.add_sized([width, 38.0], button).clicked() && !selected
}

fn render_input_panel(
    ui: &mut egui::Ui,
    palette: &Palette,
    placeholder: &str,
    session: &SessionState,
    actions: &mut Vec<Action>,
) {
    egui::Frame::none()
        .fill(palette.card_fill)
        .stroke(egui::Stroke::new(1.0, palette.card_stroke))
        .rounding(egui::Rounding::same(14.0))
        .inner_margin(egui::Margin::same(16.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                let width = (ui.available_width() - 8.0) / 2.0;
                for (label, mode) in [
                    ("💡 Analyze Patent", SearchMode::Analyze),
                    ("🔍 Prior Art Search", SearchMode::Search),
                ] {
                    if mode_tab(ui, palette, label, mode, session.search_mode, width) {
                        actions.push(Action::SetSearchMode(mode));
                    }
                }
            });
            ui.separator();
            ui.add_space(6.0);

            match session.search_mode {
                SearchMode::Analyze => render_analyze_input(ui, palette, placeholder, session, actions),
                SearchMode::Search => render_search_input(ui, palette, session, actions),
            }
        });
    ui.add_space(16.0);
}

fn render_analyze_input(
    ui: &mut egui::Ui,
    palette: &Palette,
    placeholder: &str,
    session: &SessionState,
    actions: &mut Vec<Action>,
) {
    let pending = session.is_pending(OperationKind::InitialAnalysis);
    let mut text = session.input_text.clone();
    let edit = ui.add_enabled(
        !pending,
        egui::TextEdit::multiline(&mut text)
            .hint_text(placeholder)
            .desired_rows(8)
            .desired_width(f32::INFINITY),
    );
    if edit.changed() {
        actions.push(Action::SetInputText(text));
    }

    ui.add_space(8.0);
    let label = if pending { "Analyzing..." } else { "Analyze Patent" };
    let button = egui::Button::new(egui::RichText::new(label).strong().color(egui::Color32::WHITE))
        .fill(palette.accent)
        .rounding(egui::Rounding::same(8.0))
        .min_size(egui::vec2(ui.available_width(), 40.0));
    if ui.add_enabled(session.can_analyze(), button).clicked() {
        actions.push(Action::StartAnalysis);
    }
}

fn render_search_input(
    ui: &mut egui::Ui,
    palette: &Palette,
    session: &SessionState,
    actions: &mut Vec<Action>,
) {
    let pending = session.is_pending(OperationKind::PriorArtSearch);
    ui.label(
        egui::RichText::new(
            "Perform a targeted search for prior art. Enter keywords or a specific patent ID.",
        )
        .size(13.0)
        .color(palette.muted),
    );
    ui.horizontal(|ui| {
        let mut query = session.search.query.clone();
        let edit = ui.add_enabled(
            !pending,
            egui::TextEdit::singleline(&mut query)
                .hint_text("e.g., 'machine learning for image recognition' or 'US9634960B2'")
                .desired_width(ui.available_width() - 110.0),
        );
        let entered = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if edit.changed() {
            actions.push(Action::SetSearchQuery(query));
        }

        let label = if pending { "Searching..." } else { "Search" };
        let button = egui::Button::new(egui::RichText::new(label).strong().color(egui::Color32::WHITE))
            .fill(palette.accent)
            .rounding(egui::Rounding::same(8.0))
            .min_size(egui::vec2(100.0, 32.0));
        let clicked = ui.add_enabled(session.can_search(), button).clicked();
        if (clicked || entered) && session.can_search() {
            actions.push(Action::StartSearch);
        }
    });
}

fn render_sidebar(ui: &mut egui::Ui, palette: &Palette, page: &mut Page) {
    egui::Frame::none()
        .fill(palette.card_fill)
        .stroke(egui::Stroke::new(1.0, palette.card_stroke))
        .rounding(egui::Rounding::same(14.0))
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            for candidate in Page::all() {
                let selected = *page == *candidate;
                let button = egui::Button::new(egui::RichText::new(candidate.label()).size(14.0).color(
                    if selected {
                        egui::Color32::WHITE
                    } else {
                        palette.muted
                    },
                ))
                .fill(if selected {
                    palette.accent
                } else {
                    egui::Color32::TRANSPARENT
                })
                .rounding(egui::Rounding::same(8.0));
                let width = ui.available_width();
                if ui
                    .add_sized([width, 34.0], button)
                    .on_hover_text(candidate.tooltip())
                    .clicked()
                {
                    *page = *candidate;
                }
            }
        });
}

fn render_dashboard(
    ui: &mut egui::Ui,
    palette: &Palette,
    view: &mut UiState,
    session: &SessionState,
    actions: &mut Vec<Action>,
) {
    let spacing = ui.spacing().item_spacing.x;
    let total = ui.available_width();
    let sidebar_width = 180.0;
    let chat_width = (total * 0.28).clamp(260.0, 380.0);
    let content_width = (total - sidebar_width - chat_width - 2.0 * spacing).max(240.0);
    let column = egui::Layout::top_down(egui::Align::Min);

    ui.horizontal_top(|ui| {
        ui.allocate_ui_with_layout(egui::vec2(sidebar_width, 0.0), column, |ui| {
            ui.set_width(sidebar_width);
            render_sidebar(ui, palette, &mut view.page);
        });
        ui.allocate_ui_with_layout(egui::vec2(content_width, 0.0), column, |ui| {
            ui.set_width(content_width);
            render_page(ui, palette, view.page, session, actions);
        });
        ui.allocate_ui_with_layout(egui::vec2(chat_width, 0.0), column, |ui| {
            ui.set_width(chat_width);
            cards::chat_card(
                ui,
                palette,
                &session.chat_history,
                session.is_pending(OperationKind::Chat),
                &mut view.chat_draft,
                actions,
            );
        });
    });
}

fn render_page(
    ui: &mut egui::Ui,
    palette: &Palette,
    page: Page,
    session: &SessionState,
    actions: &mut Vec<Action>,
) {
    if page == Page::ClaimAnalysis {
        cards::claim_mapping_card(
            ui,
            palette,
            &session.claim_mapping,
            session.is_pending(OperationKind::ClaimMapping),
            session.can_map_claims(),
            actions,
        );
        return;
    }

    let Some(result) = &session.analysis_result else {
        return;
    };
    if let Some(summary) = result.summary.as_ref().filter(|_| page.shows(Page::Summary)) {
        cards::summary_card(ui, palette, summary);
    }
    if let Some(similar) = result.similar_patents.as_ref().filter(|_| page.shows(Page::Similar)) {
        cards::similar_card(ui, palette, similar);
    }
    if let Some(geo) = result.geo_insights.as_ref().filter(|_| page.shows(Page::Geo)) {
        cards::geo_card(ui, palette, geo);
    }
    if page.shows(Page::Trends) {
        cards::trends_card(
            ui,
            palette,
            result.deep_trends.as_deref(),
            session.is_pending(OperationKind::DeepInsights),
            actions,
        );
    }
}
