//! Send one call through the gateway using credentials from the environment.
//!
//! ```text
//! GROQ_API=... cargo run --example invoke -- groq llama-3.1-8b-instant "What is Rust?"
//! ```

use anyhow::Context;
use switchboard_core::protocol::{CallRequest, ChatInput, ModelSpec, Origin, ResponseMode};
use switchboard_core::Gateway;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let provider = args.next().unwrap_or_else(|| "groq".to_string());
    let model = args
        .next()
        .unwrap_or_else(|| "llama-3.1-8b-instant".to_string());
    let prompt = args
        .next()
        .unwrap_or_else(|| "Say hello in one short sentence.".to_string());
    let json = std::env::var("SWITCHBOARD_JSON").is_ok();

    let gateway = Gateway::from_env().context("no usable provider configuration")?;
    println!("Configured providers: {:?}", gateway.providers());

    let mode = if json {
        ResponseMode::Json
    } else {
        ResponseMode::Text
    };
    let system = if json {
        "Reply with a single JSON object."
    } else {
        "You are a concise assistant."
    };

    let request = CallRequest::new(
        ModelSpec::new(provider, model).with_response_mode(mode),
        ChatInput::new(system, prompt),
        Origin {
            billing_id: "demo".to_string(),
            ..Default::default()
        },
    );

    let result = gateway.invoke(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.is_error() {
        anyhow::bail!("call failed");
    }
    Ok(())
}
