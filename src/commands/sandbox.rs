//! `nexus sandbox init`

use crate::config::Config;
use crate::error::Result;
use crate::tools::Sandbox;
use colored::Colorize;

/// Handle `nexus sandbox init`
pub async fn handle_sandbox_init(config: &Config) -> Result<()> {
    let sandbox = Sandbox::new(config.sandbox.root.clone());
    let ack = sandbox.init().await?;
    println!(
        "{} at {}",
        ack.message.green(),
        sandbox.root().display().to_string().cyan()
    );
    Ok(())
}
