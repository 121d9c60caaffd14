use egui::{Color32, Visuals};
use shared::domain::Severity;

const SUCCESS_GREEN: Color32 = Color32::from_rgb(67, 160, 71);

pub fn severity_color(severity: Severity, visuals: &Visuals) -> Color32 {
    match severity {
        Severity::Success => SUCCESS_GREEN,
        Severity::Error => visuals.error_fg_color,
        Severity::None => visuals.weak_text_color(),
    }
}

pub fn human_readable_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
