//! First-run screen shown while no Gemini API key is configured.

use crate::palette::Palette;
use eframe::egui;
use shared::settings::API_KEY_VARS;

/// Render the key prompt. Returns the key once the user submits one.
pub fn render_setup_screen(
    ui: &mut egui::Ui,
    palette: &Palette,
    draft: &mut String,
    error: Option<&str>,
) -> Option<String> {
    let mut submitted = None;
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.label(
            egui::RichText::new("Connect to Gemini")
                .size(24.0)
                .strong()
                .color(palette.heading),
        );
        ui.add_space(8.0);
        ui.label(
            egui::RichText::new(format!(
                "IntelliPatent needs a Gemini API key. Paste one below, or set {} before launching.",
                API_KEY_VARS.join(" or ")
            ))
            .color(palette.muted),
        );
        ui.add_space(16.0);

        let input = ui.add(
            egui::TextEdit::singleline(draft)
                .password(true)
                .hint_text("API key")
                .desired_width(360.0),
        );
        let entered = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        ui.add_space(8.0);
        let save = ui
            .add_enabled(!draft.trim().is_empty(), egui::Button::new("Save and continue"))
            .clicked();

        if (entered || save) && !draft.trim().is_empty() {
            submitted = Some(draft.trim().to_string());
        }

        if let Some(error) = error {
            ui.add_space(12.0);
            ui.label(egui::RichText::new(error).color(palette.error_text));
        }
    });
    submitted
}
