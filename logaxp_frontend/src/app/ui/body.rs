use eframe::egui::{self, Align, Layout, RichText};

use crate::editor::Alignment;
use crate::render::{BodyBlock, BodyBlockKind, ListMarker, Span, SpanStyle};

use super::super::BlogApp;

const HEADING_SIZES: [f32; 6] = [28.0, 24.0, 20.0, 18.0, 16.0, 15.0];

fn styled_text(text: &str, style: SpanStyle, size: Option<f32>) -> RichText {
    let mut rich = RichText::new(text);
    if let Some(size) = size {
        rich = rich.size(size).strong();
    }
    if style.strong {
        rich = rich.strong();
    }
    if style.emphasis {
        rich = rich.italics();
    }
    if style.underline {
        rich = rich.underline();
    }
    if style.code {
        rich = rich.code();
    }
    rich
}

fn block_layout(align: Alignment) -> Layout {
    let main = match align {
        Alignment::Left => Align::Min,
        Alignment::Center => Align::Center,
        Alignment::Right => Align::Max,
    };
    Layout::left_to_right(Align::TOP)
        .with_main_wrap(true)
        .with_main_align(main)
}

impl BlogApp {
    /// Lays out a sanitized post body. Span text is shown as-is.
    pub(crate) fn render_body(&mut self, ui: &mut egui::Ui, blocks: &[BodyBlock]) {
        for block in blocks {
            if block.quote_depth == 0 {
                self.render_body_block(ui, block);
            } else {
                ui.horizontal_top(|ui| {
                    for _ in 0..block.quote_depth {
                        ui.add_space(4.0);
                        ui.separator();
                    }
                    ui.vertical(|ui| self.render_body_block(ui, block));
                });
            }
            ui.add_space(6.0);
        }
    }

    fn render_body_block(&mut self, ui: &mut egui::Ui, block: &BodyBlock) {
        if block.spans.is_empty() {
            ui.add_space(ui.text_style_height(&egui::TextStyle::Body));
            return;
        }
        let layout = block_layout(block.align);
        match block.kind {
            BodyBlockKind::Paragraph => {
                ui.with_layout(layout, |ui| self.render_spans(ui, &block.spans, None));
            }
            BodyBlockKind::Heading(level) => {
                let size = HEADING_SIZES[usize::from(level.clamp(1, 6)) - 1];
                ui.with_layout(layout, |ui| {
                    self.render_spans(ui, &block.spans, Some(size))
                });
            }
            BodyBlockKind::ListItem { marker, depth } => {
                ui.horizontal_top(|ui| {
                    ui.add_space(16.0 * depth.saturating_sub(1) as f32);
                    match marker {
                        ListMarker::Bullet => ui.label("•"),
                        ListMarker::Number(n) => ui.label(format!("{n}.")),
                    };
                    ui.with_layout(layout, |ui| self.render_spans(ui, &block.spans, None));
                });
            }
            BodyBlockKind::Preformatted => {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    self.render_spans(ui, &block.spans, None);
                });
            }
        }
    }

    fn render_spans(&mut self, ui: &mut egui::Ui, spans: &[Span], size: Option<f32>) {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            match span {
                Span::Text { text, style, link } => {
                    let rich = styled_text(text, *style, size);
                    match link {
                        Some(url) => {
                            ui.hyperlink_to(rich, url);
                        }
                        None => {
                            ui.label(rich);
                        }
                    }
                }
                Span::Image { src, alt } => self.render_content_image(ui, src, alt),
                Span::LineBreak => ui.end_row(),
            }
        }
    }
}
