use anyhow::Result;
use clap::Args;

use crate::api::AssistantClient;
use crate::config::Config;

#[derive(Args)]
pub struct SendCommand {
    /// Message to send as the user
    message: String,
}

impl SendCommand {
    pub async fn execute(&self, config: Config) -> Result<()> {
        let client = AssistantClient::new(&config)?;

        println!("Sending request: {}", self.message);
        println!("URL: {}", client.url());

        let (status, body) = client.send_raw(&self.message).await?;

        println!("Status Code: {}", status.as_u16());
        println!();
        println!("{}", serde_json::to_string_pretty(&body)?);

        Ok(())
    }
}
