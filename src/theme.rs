use eframe::egui::{self, Color32};

// Primary Colors
pub const PRIMARY_BUTTON_BG: Color32 = Color32::from_rgb(13, 148, 136); // Teal for the main actions
pub const SECONDARY_BUTTON_BG: Color32 = Color32::from_rgb(240, 253, 250);

// Surfaces
pub const DROP_ZONE_BG: Color32 = Color32::from_rgb(248, 250, 252);
pub const DROP_ZONE_HOVER_BG: Color32 = Color32::from_rgb(204, 251, 241);
pub const PANEL_BG: Color32 = Color32::from_rgb(248, 248, 248);
pub const ERROR_BG: Color32 = Color32::from_rgb(254, 242, 242);
pub const SUCCESS_BG: Color32 = Color32::from_rgb(240, 253, 244);

// Text Colors
pub const BUTTON_MAIN_TEXT: Color32 = Color32::from_rgb(255, 255, 255);
pub const SECONDARY_BUTTON_TEXT: Color32 = Color32::from_rgb(15, 118, 110);
pub const SECONDARY_TEXT: Color32 = Color32::from_rgb(100, 116, 139);
pub const TEXT_ERROR: Color32 = Color32::from_rgb(185, 28, 28);
pub const TEXT_SUCCESS: Color32 = Color32::from_rgb(21, 128, 61);

// UI Elements
pub const BORDER_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 60, 67, 15); // Subtle border
pub const DROP_ZONE_BORDER: Color32 = Color32::from_rgb(148, 163, 184);

// Sizing & Spacing
pub const ROUNDING_FRAME: f32 = 8.0;
pub const ROUNDING_BUTTON: f32 = 6.0;
pub const MIN_SIZE_BUTTON: egui::Vec2 = egui::Vec2::new(160.0, 40.0);
pub const DROP_ZONE_HEIGHT: f32 = 110.0;

pub const BUTTON_FONT_SIZE: f32 = 16.0;
