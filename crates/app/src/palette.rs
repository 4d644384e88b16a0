//! Colors for the two themes and the global egui style built from them.

use eframe::egui;
use egui::Color32;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub dark: bool,
    pub text: Color32,
    pub muted: Color32,
    pub heading: Color32,
    pub accent: Color32,
    pub panel_fill: Color32,
    pub card_fill: Color32,
    pub card_stroke: Color32,
    pub inset_fill: Color32,
    pub user_bubble: Color32,
    pub model_bubble: Color32,
    pub error_fill: Color32,
    pub error_text: Color32,
    pub bar: Color32,
}

impl Palette {
    pub fn new(dark: bool) -> Self {
        if dark {
            Self {
                dark,
                text: Color32::from_rgb(220, 220, 230),
                muted: Color32::from_rgb(150, 155, 170),
                heading: Color32::from_rgb(103, 232, 249),
                accent: Color32::from_rgb(8, 145, 178),
                panel_fill: Color32::from_rgb(17, 24, 39),
                card_fill: Color32::from_rgb(30, 34, 46),
                card_stroke: Color32::from_rgb(55, 60, 75),
                inset_fill: Color32::from_rgb(40, 44, 58),
                user_bubble: Color32::from_rgb(37, 99, 235),
                model_bubble: Color32::from_rgb(45, 48, 60),
                error_fill: Color32::from_rgb(69, 26, 30),
                error_text: Color32::from_rgb(252, 165, 165),
                bar: Color32::from_rgb(0, 188, 212),
            }
        } else {
            Self {
                dark,
                text: Color32::from_rgb(40, 40, 50),
                muted: Color32::from_rgb(100, 110, 125),
                heading: Color32::from_rgb(14, 116, 144),
                accent: Color32::from_rgb(8, 145, 178),
                panel_fill: Color32::from_rgb(248, 250, 252),
                card_fill: Color32::WHITE,
                card_stroke: Color32::from_rgb(210, 215, 225),
                inset_fill: Color32::from_rgb(241, 245, 249),
                user_bubble: Color32::from_rgb(37, 99, 235),
                model_bubble: Color32::from_rgb(235, 238, 243),
                error_fill: Color32::from_rgb(254, 226, 226),
                error_text: Color32::from_rgb(185, 28, 28),
                bar: Color32::from_rgb(0, 151, 167),
            }
        }
    }
}

pub fn apply_style(ctx: &egui::Context, palette: &Palette) {
    let mut style = (*ctx.style()).clone();
    style.visuals = if palette.dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    style.visuals.window_rounding = egui::Rounding::same(12.0);
    style.visuals.panel_fill = palette.panel_fill;
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(2.0, palette.accent);
    style.visuals.selection.stroke = egui::Stroke::new(2.0, palette.accent);
    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    ctx.set_style(style);
}
