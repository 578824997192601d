//! Response saving example for the EVE API library.
//!
//! Shows a call's fingerprint, makes the call with a save path configured
//! and reports where the raw XML was written.
//!
//! Usage:
//! ```
//! EVE_SAVE_PATH=/tmp/eveapi cargo run --example save_xml
//! ```

use eveapi_xml::client::EveApiClientConfig;
use eveapi_xml::{Credentials, EveApiClient, RequestParams};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let save_path = PathBuf::from(env::var("EVE_SAVE_PATH").unwrap_or_else(|_| "xml".to_string()));

    let config = EveApiClientConfig {
        save_path: Some(save_path.clone()),
        ..Default::default()
    };
    let client = EveApiClient::with_config(Credentials::anonymous(), config)?;

    // Fingerprint first: no request is made
    let output = client.alliances(RequestParams::new().just_hash()).await?;
    println!("Fingerprint: {}", output.fingerprint().unwrap_or_default());

    let Some(result) = client.alliances(RequestParams::new()).await?.into_data() else {
        return Ok(());
    };
    println!("{} alliances", result.value.len());

    let dir = save_path.join("alliances");
    for entry in std::fs::read_dir(&dir)? {
        println!("Saved: {}", entry?.path().display());
    }

    let last = client.last_call().await;
    println!("Raw size: {} bytes", last.raw_xml.map(|x| x.len()).unwrap_or(0));

    Ok(())
}
