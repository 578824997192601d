//! Error list example for the EVE API library.
//!
//! Fetches the API's own list of error codes and shows how each one is
//! translated by the client.
//!
//! Usage:
//! ```
//! cargo run --example error_list
//! cargo run --example error_list -- tests/fixtures/errors.xml
//! ```

use eveapi_xml::{ApiErrorKind, Credentials, EveApiClient, RequestParams};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    // The error list is public, no key needed
    let client = EveApiClient::new(Credentials::anonymous())?;

    // An optional argument reads a local file instead
    let mut params = RequestParams::new();
    if let Some(path) = env::args().nth(1) {
        params.insert("url", path);
    }

    let output = client.error_list(params).await?;
    let Some(result) = output.into_data() else {
        return Ok(());
    };

    println!("{} error codes (cached until {:?})", result.value.len(), result.cached_until);
    for error in &result.value {
        let kind = ApiErrorKind::from_code(error.code);
        println!("{:>4}  {:<40} {:?}", error.code, kind.to_string(), kind.category());
    }

    Ok(())
}
