use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use audioconvert::download::{start_download, DownloadError};
use audioconvert::models::{OutputFormat, SelectedFile};
use audioconvert::orchestrator::Orchestrator;

use crate::localizations::Localizations;
use crate::theme::*;
use crate::ui::{self, DropZoneAction};

const REPAINT_WHILE_BUSY: Duration = Duration::from_millis(100);

enum DownloadNotice {
    Saved(PathBuf),
    Failed(DownloadError),
}

pub struct AudioConvertApp {
    orchestrator: Orchestrator,
    localizer: Localizations,
    url: String,
    download_dir: String,
    is_saving: bool,
    notice: Option<DownloadNotice>,
    download_sender: Sender<Result<PathBuf, DownloadError>>,
    download_receiver: Receiver<Result<PathBuf, DownloadError>>,
}

impl AudioConvertApp {
    pub fn new(orchestrator: Orchestrator, download_dir: String) -> Self {
        let (tx, rx) = mpsc::channel();

        Self {
            orchestrator,
            localizer: Localizations::new(),
            url: String::new(),
            download_dir,
            is_saving: false,
            notice: None,
            download_sender: tx,
            download_receiver: rx,
        }
    }

    fn select_file(&mut self, file: SelectedFile) {
        self.url.clear();
        self.notice = None;
        self.orchestrator.select_file(file);
    }

    fn start_conversion(&mut self, ctx: &egui::Context) {
        self.notice = None;
        if self.orchestrator.start_conversion().is_ok() {
            ctx.request_repaint();
        }
    }

    fn start_download(&mut self) {
        if self.is_saving {
            return;
        }

        self.notice = None;
        let Ok(request) = self.orchestrator.request_download() else {
            return;
        };

        self.is_saving = true;
        start_download(
            self.orchestrator.backend(),
            request,
            PathBuf::from(&self.download_dir),
            self.download_sender.clone(),
        );
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(path) = dropped.into_iter().find_map(|file| file.path) else {
            return;
        };
        if self.orchestrator.is_converting() {
            return;
        }

        match SelectedFile::from_path(&path) {
            Ok(file) => self.select_file(file),
            Err(e) => log::error!("Could not read dropped file {}: {}", path.display(), e),
        }
    }

    fn process_download_updates(&mut self) {
        while let Ok(result) = self.download_receiver.try_recv() {
            self.is_saving = false;
            self.notice = Some(match result {
                Ok(path) => DownloadNotice::Saved(path),
                Err(err) => DownloadNotice::Failed(err),
            });
        }
    }

    pub fn update_ui(&mut self, ctx: &egui::Context) {
        self.orchestrator.poll();
        self.process_download_updates();
        self.handle_dropped_files(ctx);

        if self.orchestrator.is_converting() || self.is_saving {
            ctx.request_repaint_after(REPAINT_WHILE_BUSY);
        }

        let is_hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading(self.localizer.text("app-title"));
                ui.label(egui::RichText::new(self.localizer.text("app-subtitle")).color(SECONDARY_TEXT));
                ui.add_space(16.0);

                let busy = self.orchestrator.is_converting();
                ui.add_enabled_ui(!busy, |ui| self.render_inputs(ui, is_hovering, ctx));
                ui.add_space(16.0);

                self.render_convert_button(ui, ctx);
                ui.add_space(12.0);

                ui::render_status(
                    ui,
                    self.orchestrator.phase(),
                    self.orchestrator.progress(),
                    &self.localizer,
                );

                if let Some(error) = self.orchestrator.error() {
                    ui.add_space(8.0);
                    ui::render_error(ui, error, &self.localizer);
                }

                if let Some(artifact) = self.orchestrator.artifact() {
                    ui.add_space(8.0);
                    if ui::render_artifact(ui, artifact, self.is_saving, &self.localizer) {
                        self.start_download();
                    }
                }

                self.render_notice(ui);
                ui.add_space(16.0);
                ui::render_history(ui, self.orchestrator.history(), &self.localizer);
            });
        });
    }

    fn render_inputs(&mut self, ui: &mut egui::Ui, is_hovering: bool, ctx: &egui::Context) {
        let selected = self.orchestrator.selector().file();
        match ui::render_drop_zone(ui, selected, is_hovering, &self.localizer) {
            Some(DropZoneAction::Picked(file)) => self.select_file(file),
            Some(DropZoneAction::Cleared) => {
                self.notice = None;
                self.orchestrator.clear_input();
            }
            None => {}
        }
        ui.add_space(12.0);

        let url_response = ui::render_url_input(ui, &mut self.url, &self.localizer);
        if url_response.changed() {
            self.notice = None;
            self.orchestrator.set_url(self.url.clone());
        }
        if url_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.start_conversion(ctx);
        }
        ui.add_space(12.0);

        let mut format: OutputFormat = self.orchestrator.format();
        ui::render_format_selector(ui, &mut format, &self.localizer);
        if format != self.orchestrator.format() {
            self.orchestrator.set_format(format);
        }
        ui.add_space(12.0);

        ui::render_download_dir_selector(ui, &mut self.download_dir, &self.localizer);
    }

    fn render_convert_button(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let busy = self.orchestrator.is_converting();
        let label = if busy { "converting-button" } else { "convert-button" };
        let enabled = !busy && !self.orchestrator.selector().is_empty();

        ui.vertical_centered(|ui| {
            let button = ui::primary_button(self.localizer.text(label));
            if ui.add_enabled(enabled, button).clicked() {
                self.start_conversion(ctx);
            }
        });
    }

    fn render_notice(&self, ui: &mut egui::Ui) {
        let Some(notice) = &self.notice else {
            return;
        };

        ui.add_space(8.0);
        match notice {
            DownloadNotice::Saved(path) => ui.label(
                egui::RichText::new(format!("{} {}", self.localizer.text("saved-to"), path.display()))
                    .color(TEXT_SUCCESS),
            ),
            DownloadNotice::Failed(err) => ui.label(
                egui::RichText::new(self.localizer.download_error(err)).color(TEXT_ERROR),
            ),
        };
    }
}

impl eframe::App for AudioConvertApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_ui(ctx);
    }
}
