//! Barcode lookup command.
//!
//! Queries the lookup API with the configured credentials and prints the
//! normalized product as JSON. Nothing is persisted.

use barcode_catalog_api::config::BarcodeLookupConfig;
use barcode_catalog_api::lookup::{BarcodeLookupClient, ProductLookup};

/// Look up a barcode and print the result.
///
/// # Errors
///
/// Returns an error if configuration is missing, the upstream call fails, or
/// no product matches the barcode.
pub async fn run(barcode: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = BarcodeLookupConfig::from_env()?;
    let client = BarcodeLookupClient::new(&config)?;

    let barcode = barcode.trim();
    tracing::info!(barcode, "Looking up barcode");

    let Some(product) = client.lookup(barcode).await? else {
        return Err(format!("no product found for barcode {barcode}").into());
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&product)?);
    }
    Ok(())
}
