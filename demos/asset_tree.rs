//! Asset tree example for the EVE API library.
//!
//! Prints a character's assets with container contents indented, then dumps
//! the first top-level item as JSON.
//!
//! Usage:
//! ```
//! EVE_KEY_ID=123 EVE_VCODE=abc EVE_CHARACTER_ID=456 cargo run --example asset_tree
//! ```

use eveapi_xml::{Asset, Credentials, EveApiClient, EveApiError, RequestParams};
use std::env;

fn print_asset(asset: &Asset, depth: usize) {
    println!(
        "{}{} x{} (type {}, item {})",
        "  ".repeat(depth),
        if asset.is_container() { "+" } else { "-" },
        asset.quantity,
        asset.type_id,
        asset.item_id
    );
    for child in &asset.contents {
        print_asset(child, depth + 1);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    // Get credentials from environment variables
    let key_id = env::var("EVE_KEY_ID").expect("EVE_KEY_ID environment variable must be set");
    let vcode = env::var("EVE_VCODE").expect("EVE_VCODE environment variable must be set");
    let character_id =
        env::var("EVE_CHARACTER_ID").expect("EVE_CHARACTER_ID environment variable must be set");

    let client = EveApiClient::new(Credentials::key(key_id, vcode).with_character(character_id))?;

    let assets = match client.asset_list(RequestParams::new()).await {
        Ok(output) => output.into_value().unwrap_or_default(),
        Err(EveApiError::Api(err)) => {
            eprintln!("The API refused the call: {}", err);
            eprintln!("Category: {:?}", err.category());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    for asset in &assets {
        print_asset(asset, 0);
    }

    let total: usize = assets.iter().map(|a| 1 + a.nested_count()).sum();
    println!("\n{} items in total", total);

    if let Some(first) = assets.first() {
        println!("\n{}", serde_json::to_string_pretty(first)?);
    }

    Ok(())
}
