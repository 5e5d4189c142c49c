use std::sync::Arc;

use james_core::{config::Config, model::ChatModel};
use james_gemini::GeminiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    james_core::logging::init();

    let cfg = Arc::new(Config::load()?);

    let model: Arc<dyn ChatModel> = Arc::new(GeminiClient::new(
        cfg.gemini_api_key.clone(),
        cfg.gemini_model.clone(),
        cfg.request_timeout,
    )?);

    james_telegram::router::run_polling(cfg, model).await
}
