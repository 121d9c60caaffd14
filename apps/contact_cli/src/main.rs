use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, FormController, FormEvent, HttpMessageTransport, MessageTransport, SubmitError,
};
use shared::domain::{Attachment, FieldName, Severity};
use tracing_subscriber::EnvFilter;

/// Submit one contact form message.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
    /// File to attach; its file name is sent as-is.
    #[arg(long)]
    attachment: Option<PathBuf>,
    /// Settings file, defaults to ./contact.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// How long to wait for the endpoint before giving up.
    #[arg(long, default_value_t = 60)]
    wait_secs: u64,
}

impl Args {
    fn field_values(&self) -> [(FieldName, &str); 5] {
        [
            (FieldName::FirstName, self.first_name.as_str()),
            (FieldName::LastName, self.last_name.as_str()),
            (FieldName::Email, self.email.as_str()),
            (FieldName::Subject, self.subject.as_str()),
            (FieldName::Message, self.message.as_str()),
        ]
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;
    let transport = HttpMessageTransport::from_settings(&settings)?;
    tracing::info!(endpoint = %transport.endpoint(), "contact endpoint configured");
    let transport: Arc<dyn MessageTransport> = Arc::new(transport);

    let mut controller = FormController::new(transport, runtime.handle().clone());
    for (name, value) in args.field_values() {
        controller.update_field(name, value);
    }
    if let Some(path) = &args.attachment {
        controller.select_attachment(Some(Attachment::from_path(path)?));
    }

    match controller.submit() {
        Ok(_) => {}
        Err(SubmitError::Validation(err)) => tracing::debug!(%err, "draft rejected"),
        Err(err) => return Err(err.into()),
    }

    for event in controller.wait_for_settlement(Duration::from_secs(args.wait_secs)) {
        match event {
            FormEvent::Sent { response, .. } => tracing::debug!(%response, "endpoint acknowledged"),
            FormEvent::Failed { reason, .. } => tracing::debug!(%reason, "endpoint failed"),
            FormEvent::DraftReset => {}
        }
    }

    if controller.is_pending() {
        eprintln!("No response from contact endpoint within {}s.", args.wait_secs);
        return Ok(ExitCode::FAILURE);
    }

    let outcome = controller.outcome();
    match outcome.severity {
        Severity::Success => {
            println!("{}", outcome.status_text);
            Ok(ExitCode::SUCCESS)
        }
        Severity::Error | Severity::None => {
            eprintln!("{}", outcome.status_text);
            Ok(ExitCode::FAILURE)
        }
    }
}
