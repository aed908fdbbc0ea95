pub mod figure;
pub mod render;

pub use figure::Figure;
pub use render::render_chart;

use crate::error::ExchangeError;
use crate::exchange::ExchangeClient;
use crate::market_data::build_table;
use crate::types::Selection;

/// Fetch candles for `selection` and render them.
pub async fn fetch_chart(
    client: &ExchangeClient,
    selection: &Selection,
) -> Result<Figure, ExchangeError> {
    let raw = client
        .get_candles(&selection.product, selection.granularity)
        .await?;
    let table = build_table(&raw);
    let macd = table.macd();
    Ok(render_chart(&table, &macd))
}
