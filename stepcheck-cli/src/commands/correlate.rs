use std::time::Duration;

use color_eyre::Result;

use clap::Args;

use stepcheck_core::{correlation_key_name, CorrelationManager, StepcheckConfig, TestContext};

use crate::output;

/// Demonstrate a send/receive correlation handoff
#[derive(Args, Debug)]
pub struct CorrelateArgs {
    /// Correlation key linking the two steps
    #[arg(long)]
    pub key: String,

    /// Value the send step produces
    #[arg(long)]
    pub payload: String,

    /// Delay before the send step stores its value
    #[arg(long, default_value_t = 100, value_name = "MS")]
    pub delay_ms: u64,

    /// How long the receive step waits (default: config defaultTimeoutMs)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

pub async fn execute(args: CorrelateArgs, config: &StepcheckConfig) -> Result<()> {
    let manager: CorrelationManager<String> = CorrelationManager::from_config(&config.correlation);
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| manager.default_timeout());

    let mut scope = TestContext::new();
    let alias = correlation_key_name("cli");
    manager.save_correlation_key(&alias, &args.key, &mut scope);

    let sender = manager.clone();
    let key = args.key.clone();
    let payload = args.payload.clone();
    let delay = Duration::from_millis(args.delay_ms);
    let send = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        sender.store(&key, payload).await;
    });

    let key = manager.get_correlation_key(&alias, &scope)?;
    output::status(
        "Waiting",
        &format!("for '{}' (timeout {}ms)", key, timeout.as_millis()),
    );

    let received = manager.find(&key, timeout).await;
    send.await?;

    match received {
        Ok(value) => {
            output::verdict(true, &format!("received '{}'", value));
            Ok(())
        }
        Err(e) => {
            output::verdict(false, &e.to_string());
            std::process::exit(1);
        }
    }
}
