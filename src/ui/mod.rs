use eframe::egui::{self, RichText, Stroke};
use rfd::FileDialog;
use std::path::Path;

use audioconvert::history::ConversionHistory;
use audioconvert::models::{ConvertedArtifact, ErrorState, OutputFormat, SelectedFile};
use audioconvert::orchestrator::ConversionPhase;

use crate::localizations::Localizations;
use crate::theme::*;

const MEDIA_EXTENSIONS: [&str; 14] = [
    "mp3", "wav", "aac", "flac", "ogg", "m4a", "wma", "opus", "mp4", "mov", "mkv", "webm", "avi",
    "m4v",
];

fn format_key(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Mp3 => "format-mp3",
        OutputFormat::Wav => "format-wav",
        OutputFormat::Aac => "format-aac",
        OutputFormat::Flac => "format-flac",
    }
}

fn action_button(text: String, fill: egui::Color32, color: egui::Color32) -> impl egui::Widget {
    egui::Button::new(RichText::new(text).size(BUTTON_FONT_SIZE).color(color))
        .min_size(MIN_SIZE_BUTTON)
        .fill(fill)
        .rounding(ROUNDING_BUTTON)
        .stroke(Stroke::new(1.0, BORDER_COLOR))
}

pub fn primary_button(text: String) -> impl egui::Widget {
    action_button(text, PRIMARY_BUTTON_BG, BUTTON_MAIN_TEXT)
}

pub fn secondary_button(text: String) -> impl egui::Widget {
    action_button(text, SECONDARY_BUTTON_BG, SECONDARY_BUTTON_TEXT)
}

pub enum DropZoneAction {
    Picked(SelectedFile),
    Cleared,
}

/// Drop target plus browse button. Dropped files are handled by the app.
pub fn render_drop_zone(
    ui: &mut egui::Ui,
    selected: Option<&SelectedFile>,
    is_hovering: bool,
    localizer: &Localizations,
) -> Option<DropZoneAction> {
    let mut action = None;

    egui::Frame::none()
        .fill(if is_hovering { DROP_ZONE_HOVER_BG } else { DROP_ZONE_BG })
        .stroke(Stroke::new(1.5, DROP_ZONE_BORDER))
        .rounding(ROUNDING_FRAME)
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_min_size(egui::vec2(ui.available_width(), DROP_ZONE_HEIGHT));
            ui.vertical_centered(|ui| {
                let title = if is_hovering { "drop-hover" } else { "drop-title" };
                ui.label(RichText::new(localizer.text(title)).size(18.0).strong());
                ui.add_space(8.0);

                if let Some(file) = selected {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format!(
                                "{} {} ({})",
                                localizer.text("selected-file"),
                                file.name,
                                file.size_in_mb()
                            ))
                            .color(SECONDARY_TEXT),
                        );
                        if ui.small_button(localizer.text("clear-file")).clicked() {
                            action = Some(DropZoneAction::Cleared);
                        }
                    });
                    ui.add_space(6.0);
                }

                if ui.button(localizer.text("browse-file")).clicked() {
                    if let Some(path) = FileDialog::new()
                        .add_filter("Audio / Video", &MEDIA_EXTENSIONS)
                        .pick_file()
                    {
                        match SelectedFile::from_path(&path) {
                            Ok(file) => action = Some(DropZoneAction::Picked(file)),
                            Err(e) => log::error!("Could not read {}: {}", path.display(), e),
                        }
                    }
                }
            });
        });

    action
}

pub fn render_url_input(ui: &mut egui::Ui, url: &mut String, localizer: &Localizations) -> egui::Response {
    ui.label(localizer.text("url-label"));

    egui::Frame::group(ui.style())
        .fill(egui::Color32::from_rgb(250, 250, 250))
        .stroke(egui::Stroke::new(1.0, egui::Color32::LIGHT_GRAY))
        .rounding(4.0)
        .show(ui, |ui| {
            ui.add_sized(
                [ui.available_width(), 32.0],
                egui::TextEdit::singleline(url)
                    .hint_text(localizer.text("url-placeholder"))
                    .font(egui::FontId::proportional(16.0)),
            )
        })
        .inner
}

pub fn render_format_selector(ui: &mut egui::Ui, format: &mut OutputFormat, localizer: &Localizations) {
    ui.horizontal(|ui| {
        ui.label(localizer.text("format-label"));

        egui::ComboBox::from_id_source("output-format")
            .width(320.0)
            .selected_text(localizer.text(format_key(*format)))
            .show_ui(ui, |ui| {
                for option in OutputFormat::ALL {
                    ui.selectable_value(format, option, localizer.text(format_key(option)));
                }
            });
    });
}

pub fn render_download_dir_selector(ui: &mut egui::Ui, download_dir: &mut String, localizer: &Localizations) {
    ui.vertical(|ui| {
        ui.label(localizer.text("download-to"));

        ui.horizontal(|ui| {
            egui::Frame::none()
                .fill(ui.visuals().extreme_bg_color)
                .rounding(4.0)
                .stroke(ui.visuals().widgets.noninteractive.bg_stroke)
                .show(ui, |ui| {
                    ui.set_min_height(36.0);
                    ui.add_sized(
                        [ui.available_width() - 110.0, 36.0],
                        egui::TextEdit::singleline(download_dir)
                            .frame(false)
                            .margin(egui::vec2(8.0, 8.0)),
                    );
                });

            let button = egui::Button::new(RichText::new(localizer.text("browse-button")).size(14.0))
                .min_size(egui::vec2(100.0, 36.0))
                .fill(ui.visuals().widgets.inactive.bg_fill)
                .rounding(4.0);

            if ui.add(button).clicked() {
                let start = Path::new(download_dir.as_str());
                if let Some(path) = FileDialog::new().set_directory(start).pick_folder() {
                    *download_dir = path.to_string_lossy().to_string();
                }
            }
        });
    });
}

fn phase_key(phase: ConversionPhase) -> &'static str {
    match phase {
        ConversionPhase::Idle => "status-ready",
        ConversionPhase::Validating => "status-validating",
        ConversionPhase::Submitting => "status-uploading",
        ConversionPhase::AwaitingResponse => "status-converting",
        ConversionPhase::Succeeded => "status-complete",
        ConversionPhase::Failed => "status-failed",
    }
}

pub fn render_status(ui: &mut egui::Ui, phase: ConversionPhase, progress: f32, localizer: &Localizations) {
    egui::Frame::group(ui.style())
        .fill(PANEL_BG)
        .rounding(ROUNDING_FRAME)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new(localizer.text(phase_key(phase))).color(SECONDARY_TEXT));

            if matches!(
                phase,
                ConversionPhase::Submitting | ConversionPhase::AwaitingResponse
            ) {
                ui.add_space(6.0);
                ui.add(egui::ProgressBar::new(progress / 100.0).show_percentage());
            }
        });
}

pub fn render_error(ui: &mut egui::Ui, error: &ErrorState, localizer: &Localizations) {
    egui::Frame::group(ui.style())
        .fill(ERROR_BG)
        .rounding(ROUNDING_FRAME)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(
                RichText::new(format!(
                    "{} {}",
                    localizer.text("error-title"),
                    localizer.message(&error.message)
                ))
                    .color(TEXT_ERROR),
            );
            if error.is_source_platform_block {
                ui.add_space(4.0);
                ui.label(RichText::new(localizer.text("error-block-hint")).color(SECONDARY_TEXT));
            }
        });
}

/// Returns `true` when the download button was clicked.
pub fn render_artifact(
    ui: &mut egui::Ui,
    artifact: &ConvertedArtifact,
    is_saving: bool,
    localizer: &Localizations,
) -> bool {
    let mut clicked = false;

    egui::Frame::group(ui.style())
        .fill(SUCCESS_BG)
        .rounding(ROUNDING_FRAME)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(
                RichText::new(localizer.text("artifact-title"))
                    .strong()
                    .color(TEXT_SUCCESS),
            );
            ui.label(&artifact.name);
            ui.label(
                RichText::new(format!(
                    "{} {}   {} {}",
                    localizer.text("artifact-size"),
                    artifact.size,
                    localizer.text("artifact-bitrate"),
                    artifact.bitrate
                ))
                .color(SECONDARY_TEXT),
            );
            ui.add_space(6.0);

            let label = if is_saving { "downloading-button" } else { "download-button" };
            clicked = ui
                .add_enabled(!is_saving, secondary_button(localizer.text(label)))
                .clicked();
        });

    clicked
}

pub fn render_history(ui: &mut egui::Ui, history: &ConversionHistory, localizer: &Localizations) {
    if history.is_empty() {
        return;
    }

    ui.label(RichText::new(localizer.text("history-title")).strong());
    egui::Grid::new("conversion-history")
        .striped(true)
        .num_columns(4)
        .show(ui, |ui| {
            for key in ["history-name", "history-from", "history-to", "history-size"] {
                ui.label(RichText::new(localizer.text(key)).color(SECONDARY_TEXT));
            }
            ui.end_row();

            for entry in history.entries() {
                ui.label(&entry.name);
                ui.label(&entry.original_format);
                ui.label(&entry.converted_format);
                ui.label(&entry.size);
                ui.end_row();
            }
        });
}
