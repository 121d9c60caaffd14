use anyhow::Context;
use tokio::runtime::{Builder, Runtime};

/// Worker threads stay alive for as long as the returned runtime is held by the app.
pub fn launch() -> anyhow::Result<Runtime> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("contact-backend")
        .enable_all()
        .build()
        .context("failed to build backend runtime")?;
    tracing::debug!("backend runtime started");
    Ok(runtime)
}
