use std::path::PathBuf;

use client_core::{FormController, FormEvent, SubmitError};
use eframe::egui;
use shared::domain::{Attachment, FieldName, STATUS_READY};
use tokio::runtime::Runtime;

use super::theme::{human_readable_bytes, severity_color};

pub struct ContactFormApp {
    controller: FormController,
    /// File picker state; cleared whenever the controller resets the draft.
    picked_path: Option<PathBuf>,
    picker_error: Option<String>,
    _runtime: Runtime,
}

impl ContactFormApp {
    pub fn new(controller: FormController, runtime: Runtime) -> Self {
        Self {
            controller,
            picked_path: None,
            picker_error: None,
            _runtime: runtime,
        }
    }

    fn process_form_events(&mut self) {
        for event in self.controller.poll_events() {
            match event {
                FormEvent::DraftReset => {
                    self.picked_path = None;
                    self.picker_error = None;
                }
                FormEvent::Sent { attempt, .. } => {
                    tracing::debug!(%attempt, "ui observed delivered message");
                }
                FormEvent::Failed { attempt, reason } => {
                    tracing::debug!(%attempt, %reason, "ui observed failed delivery");
                }
            }
        }
    }

    fn show_text_fields(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("contact_form_fields")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                for name in FieldName::ALL {
                    ui.label(name.label());
                    let mut value = self.controller.draft().field(name).to_string();
                    let edit = if name == FieldName::Message {
                        egui::TextEdit::multiline(&mut value).desired_rows(6)
                    } else {
                        egui::TextEdit::singleline(&mut value)
                    };
                    let response = ui.add(
                        edit.id_salt(name.wire_name())
                            .hint_text(name.label())
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        self.controller.update_field(name, value);
                    }
                    ui.end_row();
                }
            });
    }

    fn show_attachment_picker(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Choose file...").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_file() {
                    self.pick_attachment(path);
                }
            }

            let picked = match (&self.picked_path, &self.controller.draft().attachment) {
                (Some(path), Some(attachment)) => Some(format!(
                    "{} ({})",
                    path.display(),
                    human_readable_bytes(attachment.size_bytes())
                )),
                _ => None,
            };
            match picked {
                Some(label) => {
                    ui.label(label);
                    if ui.small_button("Remove").clicked() {
                        self.controller.select_attachment(None);
                        self.picked_path = None;
                    }
                }
                None => {
                    ui.weak("No file chosen");
                }
            }
        });

        if let Some(err) = &self.picker_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }
    }

    fn pick_attachment(&mut self, path: PathBuf) {
        match Attachment::from_path(&path) {
            Ok(attachment) => {
                tracing::debug!(
                    filename = %attachment.filename,
                    size_bytes = attachment.size_bytes(),
                    "attachment selected"
                );
                self.controller.select_attachment(Some(attachment));
                self.picked_path = Some(path);
                self.picker_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not read picked attachment");
                self.picker_error = Some(err.to_string());
            }
        }
    }

    fn show_submit_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let pending = self.controller.is_pending();
            let clicked = ui
                .add_enabled(!pending, egui::Button::new("Send message"))
                .clicked();
            if clicked {
                match self.controller.submit() {
                    Ok(attempt) => tracing::debug!(%attempt, "submission started"),
                    Err(SubmitError::Validation(err)) => tracing::debug!(%err, "submission blocked"),
                    Err(SubmitError::InFlight { attempt }) => {
                        tracing::debug!(%attempt, "submission already in flight")
                    }
                }
            }
            if pending {
                ui.spinner();
            }
        });
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        let outcome = self.controller.outcome();
        if self.controller.is_pending() {
            ui.weak("Sending...");
        } else if outcome.is_none() {
            ui.weak(STATUS_READY);
        } else {
            ui.colored_label(
                severity_color(outcome.severity, ui.visuals()),
                &outcome.status_text,
            );
        }
    }
}

impl eframe::App for ContactFormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_form_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Send us a message");
            ui.add_space(8.0);
            self.show_text_fields(ui);
            ui.add_space(8.0);
            self.show_attachment_picker(ui);
            ui.add_space(12.0);
            self.show_submit_row(ui);
            ui.add_space(8.0);
            self.show_status(ui);
        });
    }
}
