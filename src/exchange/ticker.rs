use tracing::instrument;

use super::client::{ExchangeClient, Ticker};
use crate::error::ExchangeError;
use crate::types::Product;

/// Format the price line shown above the chart.
pub fn price_sentence(product: &Product, ticker: &Ticker) -> String {
    format!(
        "The price of {} is {} {}.",
        product,
        ticker.price,
        product.denomination()
    )
}

/// Fetch the latest trade for `product` and format it.
#[instrument(skip(client), fields(product = %product))]
pub async fn fetch_price_sentence(
    client: &ExchangeClient,
    product: &Product,
) -> Result<String, ExchangeError> {
    let ticker = client.get_ticker(product).await?;
    Ok(price_sentence(product, &ticker))
}
