//! Small markdown renderer for model output (deep trends, chat replies).
//!
//! Covers headings, bullet and numbered lists, `**bold**`, `` `code` `` and
//! `[text](url)` links. Anything else renders as plain text.

use crate::palette::Palette;
use eframe::egui;

const BASE_SIZE: f32 = 14.0;

#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    Blank,
    Heading { level: usize, text: &'a str },
    Bullet(&'a str),
    Numbered { marker: &'a str, text: &'a str },
    Paragraph(&'a str),
}

fn classify(line: &str) -> Block<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Blank;
    }

    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=4).contains(&hashes) {
        if let Some(text) = trimmed[hashes..].strip_prefix(' ') {
            return Block::Heading {
                level: hashes,
                text: text.trim(),
            };
        }
    }

    if let Some(text) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Block::Bullet(text);
    }

    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(text) = trimmed[digits..].strip_prefix(". ") {
            return Block::Numbered {
                marker: &trimmed[..=digits],
                text,
            };
        }
    }

    Block::Paragraph(trimmed)
}

pub fn render_markdown(ui: &mut egui::Ui, text: &str, palette: &Palette) {
    for line in text.lines() {
        match classify(line) {
            Block::Blank => ui.add_space(6.0),
            Block::Heading { level, text } => {
                let size = match level {
                    1 => 18.0,
                    2 => 16.0,
                    3 => 15.0,
                    _ => 14.0,
                };
                ui.add_space(10.0 - level as f32 * 1.5);
                ui.label(
                    egui::RichText::new(text)
                        .strong()
                        .size(size)
                        .color(palette.text),
                );
            }
            Block::Bullet(text) => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new("  •  ").size(BASE_SIZE).color(palette.text));
                    render_inline(ui, text, palette);
                });
            }
            Block::Numbered { marker, text } => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(format!("  {marker} "))
                            .size(BASE_SIZE)
                            .color(palette.text),
                    );
                    render_inline(ui, text, palette);
                });
            }
            Block::Paragraph(text) => {
                ui.horizontal_wrapped(|ui| render_inline(ui, text, palette));
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Span<'a> {
    Plain(&'a str),
    Bold(&'a str),
    Code(&'a str),
    Link { text: &'a str, url: &'a str },
}

/// Split one line into inline spans. Unterminated markers stay plain text.
fn spans(mut rest: &str) -> Vec<Span<'_>> {
    let mut out = Vec::new();
    while !rest.is_empty() {
        let Some(pos) = rest.find(['*', '`', '[']) else {
            out.push(Span::Plain(rest));
            break;
        };
        let (before, tail) = rest.split_at(pos);

        let parsed = if let Some(body) = tail.strip_prefix("**") {
            body.find("**")
                .map(|end| (Span::Bold(&body[..end]), &body[end + 2..]))
        } else if let Some(body) = tail.strip_prefix('`') {
            body.find('`')
                .map(|end| (Span::Code(&body[..end]), &body[end + 1..]))
        } else if let Some(body) = tail.strip_prefix('[') {
            body.find("](").and_then(|close| {
                let after = &body[close + 2..];
                after.find(')').map(|paren| {
                    (
                        Span::Link {
                            text: &body[..close],
                            url: &after[..paren],
                        },
                        &after[paren + 1..],
                    )
                })
            })
        } else {
            None
        };

        match parsed {
            Some((span, remaining)) => {
                if !before.is_empty() {
                    out.push(Span::Plain(before));
                }
                out.push(span);
                rest = remaining;
            }
            None => {
                // Not a marker; emit through it and keep scanning.
                let (plain, remaining) = rest.split_at(pos + 1);
                out.push(Span::Plain(plain));
                rest = remaining;
            }
        }
    }
    out
}

fn render_inline(ui: &mut egui::Ui, text: &str, palette: &Palette) {
    ui.spacing_mut().item_spacing.x = 0.0;
    for span in spans(text) {
        match span {
            Span::Plain(text) => {
                ui.label(egui::RichText::new(text).size(BASE_SIZE).color(palette.text));
            }
            Span::Bold(text) => {
                ui.label(
                    egui::RichText::new(text)
                        .size(BASE_SIZE)
                        .strong()
                        .color(palette.text),
                );
            }
            Span::Code(text) => {
                egui::Frame::none()
                    .fill(palette.inset_fill)
                    .rounding(egui::Rounding::same(3.0))
                    .inner_margin(egui::Margin::symmetric(4.0, 1.0))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(text)
                                .size(BASE_SIZE)
                                .monospace()
                                .color(palette.text),
                        );
                    });
            }
            Span::Link { text, url } => {
                ui.add(egui::Hyperlink::from_label_and_url(
                    egui::RichText::new(text)
                        .size(BASE_SIZE)
                        .color(palette.heading)
                        .underline(),
                    url,
                ))
                .on_hover_text(url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_blocks() {
        assert_eq!(classify("   "), Block::Blank);
        assert_eq!(
            classify("## Market outlook"),
            Block::Heading {
                level: 2,
                text: "Market outlook"
            }
        );
        assert_eq!(classify("#hashtag"), Block::Paragraph("#hashtag"));
        assert_eq!(classify("- first"), Block::Bullet("first"));
        assert_eq!(classify("* second"), Block::Bullet("second"));
        assert_eq!(
            classify("12. twelfth"),
            Block::Numbered {
                marker: "12.",
                text: "twelfth"
            }
        );
        assert_eq!(classify("2024 was busy"), Block::Paragraph("2024 was busy"));
    }

    #[test]
    fn test_inline_spans() {
        assert_eq!(
            spans("Use **solid-state** cells via `BMS` [docs](https://x.test)."),
            vec![
                Span::Plain("Use "),
                Span::Bold("solid-state"),
                Span::Plain(" cells via "),
                Span::Code("BMS"),
                Span::Plain(" "),
                Span::Link {
                    text: "docs",
                    url: "https://x.test"
                },
                Span::Plain("."),
            ]
        );
    }

    #[test]
    fn test_unterminated_markers_stay_plain() {
        let joined: String = spans("a * b **c [d] `e")
            .into_iter()
            .map(|span| match span {
                Span::Plain(text) => text,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(joined, "a * b **c [d] `e");
    }
}
