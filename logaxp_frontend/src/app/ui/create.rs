use eframe::egui::{self, Color32, RichText};
use log::info;

use crate::editor::{Alignment, BlockKind, Document};
use crate::forms::SubmitPhase;
use crate::render::post_body;

use super::super::tasks;
use super::super::BlogApp;

/// What the toolbar asked for this frame.
enum ToolbarAction {
    Block(BlockKind),
    Bold,
    Italic,
    Underline,
    Align(Alignment),
    Link,
    ImageUrl,
    ImageFile,
}

fn block_marker(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Paragraph => "¶",
        BlockKind::Heading(1) => "H1",
        BlockKind::Heading(2) => "H2",
        BlockKind::Heading(_) => "H",
        BlockKind::BulletItem => "•",
        BlockKind::NumberedItem => "1.",
        BlockKind::Quote => "❝",
    }
}

impl BlogApp {
    pub(crate) fn render_create(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.label(RichText::new("Create New Blog Post").strong().size(18.0));
                ui.add_space(6.0);

                if let Some(message) = self.create.form.message() {
                    let color = if self.create.form.phase() == SubmitPhase::Success {
                        Color32::LIGHT_GREEN
                    } else {
                        Color32::LIGHT_RED
                    };
                    let mut dismiss = false;
                    ui.horizontal(|ui| {
                        ui.colored_label(color, message);
                        dismiss = ui.small_button("Dismiss").clicked();
                    });
                    if dismiss {
                        self.create.form.dismiss_message();
                    }
                }

                egui::Grid::new("create_fields")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Title *");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.create.form.title)
                                .desired_width(420.0)
                                .hint_text("Enter post title"),
                        );
                        ui.end_row();
                        ui.label("Author name *");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.create.form.name)
                                .desired_width(420.0),
                        );
                        ui.end_row();
                        ui.label("Author email *");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.create.form.email)
                                .desired_width(420.0),
                        );
                        ui.end_row();
                    });

                ui.add_space(8.0);
                ui.label("Content *");
                if let Some(action) = self.render_toolbar(ui) {
                    self.apply_toolbar(action);
                }
                ui.add_space(4.0);
                self.render_blocks(ui);

                ui.add_space(6.0);
                ui.checkbox(&mut self.create.show_preview, "Preview");
                if self.create.show_preview {
                    let blocks = post_body(&self.create.form.document.to_html());
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        self.render_body(ui, &blocks);
                    });
                }

                ui.add_space(10.0);
                let submitting = self.create.form.is_submitting();
                let label = if submitting { "Publishing..." } else { "Publish Post" };
                if ui
                    .add_enabled(!submitting, egui::Button::new(label))
                    .clicked()
                {
                    if let Err(err) = self.create.form.submit(&mut self.sync) {
                        info!("create form blocked: {err}");
                    }
                }
            });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) -> Option<ToolbarAction> {
        let mut action = None;
        let focused = self
            .create
            .form
            .document
            .block(self.create.focused_block)
            .map(|block| (block.kind, block.align));
        ui.horizontal_wrapped(|ui| {
            let kinds = [
                (BlockKind::Heading(1), "H1"),
                (BlockKind::Heading(2), "H2"),
                (BlockKind::Paragraph, "¶"),
                (BlockKind::BulletItem, "• List"),
                (BlockKind::NumberedItem, "1. List"),
                (BlockKind::Quote, "❝ Quote"),
            ];
            for (kind, label) in kinds {
                let active = focused.is_some_and(|(current, _)| current == kind);
                if ui.selectable_label(active, label).clicked() {
                    action = Some(ToolbarAction::Block(kind));
                }
            }
            ui.separator();
            if ui.button(RichText::new("B").strong()).clicked() {
                action = Some(ToolbarAction::Bold);
            }
            if ui.button(RichText::new("I").italics()).clicked() {
                action = Some(ToolbarAction::Italic);
            }
            if ui.button(RichText::new("U").underline()).clicked() {
                action = Some(ToolbarAction::Underline);
            }
            ui.separator();
            for (align, label) in [
                (Alignment::Left, "⬅"),
                (Alignment::Center, "↔"),
                (Alignment::Right, "➡"),
            ] {
                let active = focused.is_some_and(|(_, current)| current == align);
                if ui.selectable_label(active, label).clicked() {
                    action = Some(ToolbarAction::Align(align));
                }
            }
        });
        ui.horizontal_wrapped(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.create.link_url)
                    .desired_width(220.0)
                    .hint_text("https://link"),
            );
            if ui.button("Insert link").clicked() {
                action = Some(ToolbarAction::Link);
            }
            ui.separator();
            ui.add(
                egui::TextEdit::singleline(&mut self.create.image_url)
                    .desired_width(220.0)
                    .hint_text("https://image"),
            );
            if ui.button("Insert image").clicked() {
                action = Some(ToolbarAction::ImageUrl);
            }
            let picking = self.create.picking_image;
            if ui
                .add_enabled(!picking, egui::Button::new("Upload image…"))
                .clicked()
            {
                action = Some(ToolbarAction::ImageFile);
            }
        });
        action
    }

    fn apply_toolbar(&mut self, action: ToolbarAction) {
        let index = self.create.focused_block;
        let range = self.create.selection.clone();
        let doc = &self.create.form.document;
        let next = match action {
            ToolbarAction::Block(kind) => doc.set_block_type(index, kind),
            ToolbarAction::Bold => doc.toggle_bold(index, range),
            ToolbarAction::Italic => doc.toggle_italic(index, range),
            ToolbarAction::Underline => doc.toggle_underline(index, range),
            ToolbarAction::Align(align) => doc.set_alignment(index, align),
            ToolbarAction::Link => {
                let next = doc.insert_link(index, range, &self.create.link_url);
                self.create.link_url.clear();
                next
            }
            ToolbarAction::ImageUrl => {
                let next = doc.insert_image(index, range.end, &self.create.image_url, "");
                self.create.image_url.clear();
                next
            }
            ToolbarAction::ImageFile => {
                self.create.picking_image = true;
                tasks::pick_image(self.tx.clone(), self.ctx.clone());
                return;
            }
        };
        self.create.form.document = next;
    }

    pub(crate) fn insert_image_at_cursor(&mut self, src: &str) {
        let index = self.create.focused_block;
        let at = self.create.selection.end;
        self.create.form.document = self.create.form.document.insert_image(index, at, src, "");
    }

    fn render_blocks(&mut self, ui: &mut egui::Ui) {
        let mut next: Option<Document> = None;
        let blocks = self.create.form.document.blocks().to_vec();
        for (index, block) in blocks.iter().enumerate() {
            let images: Vec<(String, String)> = block
                .images()
                .map(|(src, alt)| (src.to_string(), alt.to_string()))
                .collect();
            ui.horizontal(|ui| {
                ui.label(RichText::new(block_marker(block.kind)).weak().monospace());
                let mut text = block.text();
                let font = match block.kind {
                    BlockKind::Heading(_) => egui::TextStyle::Heading,
                    _ => egui::TextStyle::Body,
                };
                let output = egui::TextEdit::multiline(&mut text)
                    .id(egui::Id::new(("editor_block", index)))
                    .font(font)
                    .desired_rows(1)
                    .desired_width(ui.available_width() - 32.0)
                    .hint_text(if index == 0 { "Write your post..." } else { "" })
                    .show(ui);
                if output.response.has_focus() {
                    self.create.focused_block = index;
                    if let Some(cursor) = output.cursor_range {
                        self.create.selection = cursor.as_sorted_char_range();
                    }
                }
                if output.response.changed() {
                    let doc = next
                        .take()
                        .unwrap_or_else(|| self.create.form.document.clone());
                    // Enter splits the block at the newline.
                    next = Some(match text.find('\n') {
                        Some(byte) => {
                            let at = text[..byte].chars().count();
                            let joined = text.replacen('\n', "", 1);
                            self.create.focused_block = index + 1;
                            self.create.selection = 0..0;
                            doc.replace_text(index, &joined).split_block(index, at)
                        }
                        None => doc.replace_text(index, &text),
                    });
                }
                if blocks.len() > 1 && ui.small_button("✕").on_hover_text("Remove block").clicked() {
                    let doc = next
                        .take()
                        .unwrap_or_else(|| self.create.form.document.clone());
                    next = Some(doc.remove_block(index));
                    self.create.focused_block = 0;
                }
            });
            for (src, alt) in &images {
                ui.indent(("editor_image", index, src.len()), |ui| {
                    self.render_content_image(ui, src, alt);
                });
            }
        }
        if ui.small_button("+ Paragraph").clicked() {
            let doc = next
                .take()
                .unwrap_or_else(|| self.create.form.document.clone());
            next = Some(doc.push_block(BlockKind::Paragraph));
        }
        if let Some(doc) = next {
            self.create.form.document = doc;
        }
    }
}
