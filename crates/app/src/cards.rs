//! Result cards and the small widgets they are built from.
//!
//! Renderers never touch the store. Anything the user asks for is pushed onto
//! `actions` and dispatched by the caller after the frame is laid out.

use crate::palette::Palette;
use crate::simple_md::render_markdown;
use analysis_host::{Action, ClaimMappingState, SearchState, SearchView};
use eframe::egui;
use shared::agent_api::{ChatMessage, ChatRole};
use shared::patent::{
    GeoInsights, GroundingSource, PriorArtSearchResult, SimilarPatents, Summary,
};

pub fn card(ui: &mut egui::Ui, palette: &Palette, title: &str, body: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(palette.card_fill)
        .stroke(egui::Stroke::new(1.0, palette.card_stroke))
        .rounding(egui::Rounding::same(14.0))
        .inner_margin(egui::Margin::same(16.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(title)
                    .size(17.0)
                    .strong()
                    .color(palette.heading),
            );
            ui.separator();
            ui.add_space(4.0);
            body(ui);
        });
    ui.add_space(16.0);
}

fn inset(ui: &mut egui::Ui, palette: &Palette, body: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(palette.inset_fill)
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            body(ui);
        });
}

pub fn spinner(ui: &mut egui::Ui, label: &str) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(egui::RichText::new(label).weak());
    });
}

/// Pulsing grey block standing in for a card that is still loading.
pub fn skeleton(ui: &mut egui::Ui, palette: &Palette, height: f32) {
    let time = ui.ctx().input(|i| i.time);
    let pulse = ((time * 2.5).sin() + 1.0) / 2.0;
    let alpha = (40.0 + pulse * 50.0) as u8;
    let base = palette.card_stroke;
    let fill = egui::Color32::from_rgba_unmultiplied(base.r(), base.g(), base.b(), alpha);

    let (rect, _) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), height), egui::Sense::hover());
    ui.painter().rect_filled(rect, egui::Rounding::same(10.0), fill);
    ui.add_space(16.0);
    ui.ctx().request_repaint();
}

/// Red banner for the session error. Returns true when dismissed.
pub fn error_banner(ui: &mut egui::Ui, palette: &Palette, message: &str) -> bool {
    let mut dismissed = false;
    egui::Frame::none()
        .fill(palette.error_fill)
        .stroke(egui::Stroke::new(1.0, palette.error_text))
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(message).color(palette.error_text));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    dismissed = ui.small_button("Dismiss").clicked();
                });
            });
        });
    ui.add_space(16.0);
    dismissed
}

pub fn sources(ui: &mut egui::Ui, palette: &Palette, sources: &[GroundingSource]) {
    if sources.is_empty() {
        return;
    }
    ui.add_space(8.0);
    ui.separator();
    ui.label(egui::RichText::new("Sources:").strong().color(palette.muted));
    for source in sources {
        ui.horizontal(|ui| {
            ui.label("•");
            ui.hyperlink_to(
                egui::RichText::new(source.label()).color(palette.heading),
                &source.uri,
            )
            .on_hover_text(&source.title);
        });
    }
}

pub fn summary_card(ui: &mut egui::Ui, palette: &Palette, summary: &Summary) {
    card(ui, palette, "Instant Summary", |ui| {
        for (heading, body) in [
            ("Problem:", &summary.problem),
            ("Novelty:", &summary.novelty),
            ("Solution:", &summary.solution),
        ] {
            ui.label(egui::RichText::new(heading).strong().color(palette.text));
            ui.label(egui::RichText::new(body).color(palette.muted));
            ui.add_space(6.0);
        }
    });
}

pub fn similar_card(ui: &mut egui::Ui, palette: &Palette, similar: &SimilarPatents) {
    card(ui, palette, "Similar Patents & Technologies", |ui| {
        if similar.patents.is_empty() {
            ui.label(egui::RichText::new("No similar patents were identified.").weak());
        }
        for patent in &similar.patents {
            inset(ui, palette, |ui| {
                ui.label(egui::RichText::new(&patent.title).strong().color(palette.text));
                ui.label(egui::RichText::new(&patent.description).size(13.0).color(palette.muted));
            });
            ui.add_space(6.0);
        }
        sources(ui, palette, &similar.sources);
    });
}

pub fn geo_card(ui: &mut egui::Ui, palette: &Palette, geo: &GeoInsights) {
    card(ui, palette, "Geographic Innovation Hotspots", |ui| {
        if geo.data.is_empty() {
            ui.label(egui::RichText::new("No geographic data available.").weak());
        } else {
            bar_chart(ui, palette, geo);
        }
        sources(ui, palette, &geo.sources);
    });
}

/// Horizontal bars, one per region, scaled against a 0-100 score axis.
fn bar_chart(ui: &mut egui::Ui, palette: &Palette, geo: &GeoInsights) {
    const ROW: f32 = 26.0;
    const LABEL_WIDTH: f32 = 130.0;
    const VALUE_WIDTH: f32 = 44.0;

    let width = ui.available_width();
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(width, ROW * geo.data.len() as f32),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let track = (width - LABEL_WIDTH - VALUE_WIDTH).max(10.0);
    let font = egui::FontId::proportional(13.0);

    for (i, point) in geo.data.iter().enumerate() {
        let top = rect.top() + i as f32 * ROW;
        let mid = top + ROW / 2.0;

        painter.text(
            egui::pos2(rect.left() + LABEL_WIDTH - 8.0, mid),
            egui::Align2::RIGHT_CENTER,
            &point.country,
            font.clone(),
            palette.text,
        );

        let bar_left = rect.left() + LABEL_WIDTH;
        let track_rect = egui::Rect::from_min_size(
            egui::pos2(bar_left, top + 5.0),
            egui::vec2(track, ROW - 10.0),
        );
        painter.rect_filled(track_rect, egui::Rounding::same(3.0), palette.inset_fill);
        let mut bar_rect = track_rect;
        bar_rect.set_width(track * point.bar_fraction());
        painter.rect_filled(bar_rect, egui::Rounding::same(3.0), palette.bar);

        painter.text(
            egui::pos2(bar_left + track + 6.0, mid),
            egui::Align2::LEFT_CENTER,
            format!("{:.0}", point.score),
            font.clone(),
            palette.muted,
        );
    }

    if let Some(pos) = response.hover_pos() {
        let row = ((pos.y - rect.top()) / ROW) as usize;
        if let Some(point) = geo.data.get(row) {
            response.on_hover_text(format!("{}: {:.1}", point.country, point.score));
        }
    }
}

pub fn trends_card(
    ui: &mut egui::Ui,
    palette: &Palette,
    deep_trends: Option<&str>,
    pending: bool,
    actions: &mut Vec<Action>,
) {
    card(ui, palette, "Deep Innovation Trends", |ui| {
        if pending {
            spinner(ui, "Thinking...");
            return;
        }
        match deep_trends {
            Some(markdown) => render_markdown(ui, markdown, palette),
            None => {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(
                            "Get a deeper analysis of innovation trends, market opportunities, \
                             and future developments.",
                        )
                        .color(palette.muted),
                    );
                    ui.add_space(6.0);
                    let button = egui::Button::new(
                        egui::RichText::new("Think More").strong().color(egui::Color32::WHITE),
                    )
                    .fill(palette.accent)
                    .rounding(egui::Rounding::same(8.0));
                    if ui.add(button).clicked() {
                        actions.push(Action::RequestDeepInsights);
                    }
                });
            }
        }
    });
}

fn chat_bubble(ui: &mut egui::Ui, palette: &Palette, message: &ChatMessage) {
    match message.role {
        ChatRole::User => {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                egui::Frame::none()
                    .fill(palette.user_bubble)
                    .rounding(egui::Rounding::same(12.0))
                    .inner_margin(egui::Margin::same(10.0))
                    .show(ui, |ui| {
                        ui.set_max_width(260.0);
                        ui.label(egui::RichText::new(&message.content).color(egui::Color32::WHITE));
                    });
            });
        }
        ChatRole::Model => {
            egui::Frame::none()
                .fill(palette.model_bubble)
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::same(10.0))
                .show(ui, |ui| {
                    ui.set_max_width(260.0);
                    render_markdown(ui, &message.content, palette);
                });
        }
    }
}

pub fn chat_card(
    ui: &mut egui::Ui,
    palette: &Palette,
    history: &[ChatMessage],
    pending: bool,
    draft: &mut String,
    actions: &mut Vec<Action>,
) {
    card(ui, palette, "Chat Assistant", |ui| {
        let height = (ui.ctx().screen_rect().height() * 0.55).max(240.0);
        egui::ScrollArea::vertical()
            .id_source("chat_history")
            .max_height(height)
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for message in history {
                    chat_bubble(ui, palette, message);
                    ui.add_space(6.0);
                }
                if pending {
                    spinner(ui, "");
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let input = ui.add(
                egui::TextEdit::singleline(draft)
                    .hint_text("Ask a follow-up...")
                    .desired_width(ui.available_width() - 64.0),
            );
            let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let send = ui.add_enabled(!pending, egui::Button::new("Send")).clicked();
            if (submitted || send) && !pending && !draft.trim().is_empty() {
                actions.push(Action::SendChat(std::mem::take(draft)));
                input.request_focus();
            }
        });
    });
}

fn search_hit(ui: &mut egui::Ui, palette: &Palette, hit: &PriorArtSearchResult) {
    inset(ui, palette, |ui| match hit {
        PriorArtSearchResult::PatentDetails(details) => {
            ui.label(
                egui::RichText::new(&details.title)
                    .size(16.0)
                    .strong()
                    .color(palette.text),
            );
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new("Patent ID:").strong().size(13.0));
                ui.label(egui::RichText::new(&details.patent_id).size(13.0).color(palette.muted));
                ui.add_space(12.0);
                ui.label(egui::RichText::new("Filing Date:").strong().size(13.0));
                ui.label(egui::RichText::new(&details.filing_date).size(13.0).color(palette.muted));
            });
            ui.label(egui::RichText::new("Abstract").strong().color(palette.text));
            ui.label(egui::RichText::new(&details.abstract_text).size(13.0).color(palette.muted));
        }
        PriorArtSearchResult::PriorArtDocument(document) => {
            ui.label(egui::RichText::new(&document.title).strong().color(palette.text));
            ui.label(egui::RichText::new(&document.description).size(13.0).color(palette.muted));
        }
    });
}

pub fn search_results_card(ui: &mut egui::Ui, palette: &Palette, search: &SearchState, pending: bool) {
    if pending {
        card(ui, palette, "Searching for Prior Art...", |ui| spinner(ui, ""));
        return;
    }
    let view = search.view();
    if view == SearchView::Hidden {
        return;
    }
    card(ui, palette, "Prior Art Search Results", |ui| match view {
        SearchView::Failed(error) => {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("Search Failed")
                        .strong()
                        .color(palette.error_text),
                );
                ui.label(egui::RichText::new(error).size(13.0).color(palette.error_text));
            });
        }
        SearchView::NoResults => {
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("No results found for your query.").weak());
            });
        }
        SearchView::Results { results, sources: found } => {
            for hit in results {
                search_hit(ui, palette, hit);
                ui.add_space(6.0);
            }
            sources(ui, palette, found);
        }
        SearchView::Hidden => {}
    });
}

fn claims_editor(ui: &mut egui::Ui, palette: &Palette, label: &str, id: &str, text: &str, enabled: bool) -> Option<String> {
    let mut value = text.to_string();
    ui.label(egui::RichText::new(label).strong().color(palette.text));
    egui::ScrollArea::vertical()
        .id_source(id)
        .max_height(240.0)
        .show(ui, |ui| {
            ui.add_enabled(
                enabled,
                egui::TextEdit::multiline(&mut value)
                    .code_editor()
                    .hint_text("Paste text here...")
                    .desired_rows(12)
                    .desired_width(f32::INFINITY),
            );
        });
    (value != text).then_some(value)
}

pub fn claim_mapping_card(
    ui: &mut egui::Ui,
    palette: &Palette,
    claims: &ClaimMappingState,
    pending: bool,
    ready: bool,
    actions: &mut Vec<Action>,
) {
    card(ui, palette, "Claim Analysis", |ui| {
        ui.label(
            egui::RichText::new(
                "Compare the claims of your subject patent against the disclosure of a reference \
                 (prior art) patent. The subject claims are pre-filled from your initial analysis.",
            )
            .size(13.0)
            .color(palette.muted),
        );
        ui.add_space(8.0);

        ui.columns(2, |columns| {
            if let Some(text) = claims_editor(
                &mut columns[0],
                palette,
                "Subject Patent Claims",
                "subject_claims",
                &claims.subject_claims,
                !pending,
            ) {
                actions.push(Action::SetSubjectClaims(text));
            }
            if let Some(text) = claims_editor(
                &mut columns[1],
                palette,
                "Reference Patent (Prior Art)",
                "reference_claims",
                &claims.reference_claims,
                !pending,
            ) {
                actions.push(Action::SetReferenceClaims(text));
            }
        });

        ui.add_space(8.0);
        let label = if pending { "Analyzing..." } else { "Map Claims & Analyze" };
        let button = egui::Button::new(egui::RichText::new(label).strong().color(egui::Color32::WHITE))
            .fill(palette.accent)
            .rounding(egui::Rounding::same(8.0))
            .min_size(egui::vec2(ui.available_width(), 36.0));
        if ui.add_enabled(ready, button).clicked() {
            actions.push(Action::StartClaimMapping);
        }

        if pending {
            spinner(ui, "");
            return;
        }
        if let Some(error) = &claims.error {
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(error).color(palette.error_text));
            });
        }
        if let Some(result) = &claims.result {
            ui.add_space(8.0);
            ui.separator();
            ui.label(
                egui::RichText::new("Analysis Result")
                    .size(16.0)
                    .strong()
                    .color(palette.text),
            );
            egui::Frame::none()
                .fill(palette.inset_fill)
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::symmetric(10.0, 4.0))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&result.category).strong().color(palette.heading));
                });
            ui.add_space(6.0);
            ui.label(egui::RichText::new("Rationale:").strong().color(palette.text));
            ui.label(egui::RichText::new(&result.rationale).color(palette.muted));
            ui.add_space(6.0);
            ui.label(egui::RichText::new("Detailed Mapping:").strong().color(palette.text));

            egui::Grid::new("claim_mapping_table")
                .num_columns(3)
                .striped(true)
                .spacing([16.0, 8.0])
                .show(ui, |ui| {
                    for header in ["SUBJECT CLAIM", "REFERENCE DISCLOSURE", "DESCRIPTION"] {
                        ui.label(egui::RichText::new(header).size(12.0).strong());
                    }
                    ui.end_row();
                    for mapping in &result.mappings {
                        ui.label(egui::RichText::new(&mapping.subject_claim).strong().color(palette.text));
                        ui.label(egui::RichText::new(&mapping.reference_disclosure).color(palette.muted));
                        ui.label(egui::RichText::new(&mapping.description).color(palette.muted));
                        ui.end_row();
                    }
                });
        }
    });
}
