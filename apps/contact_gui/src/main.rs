use std::sync::Arc;

use anyhow::anyhow;
use client_core::{load_settings, FormController, HttpMessageTransport, MessageTransport};
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod ui;

use ui::ContactFormApp;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings(None)?;
    let transport = HttpMessageTransport::from_settings(&settings)?;
    tracing::info!(endpoint = %transport.endpoint(), "contact endpoint configured");
    let transport: Arc<dyn MessageTransport> = Arc::new(transport);
    let runtime = backend_bridge::runtime::launch()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Contact")
            .with_inner_size([560.0, 560.0])
            .with_min_inner_size([420.0, 440.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Contact",
        options,
        Box::new(move |cc| {
            let repaint_ctx = cc.egui_ctx.clone();
            let controller = FormController::new(transport, runtime.handle().clone())
                .with_settle_waker(move || repaint_ctx.request_repaint());
            Ok(Box::new(ContactFormApp::new(controller, runtime)))
        }),
    )
    .map_err(|err| anyhow!("contact form window failed: {err}"))
}
