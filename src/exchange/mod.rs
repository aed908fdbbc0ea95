pub mod client;
pub mod ticker;

#[cfg(test)]
pub mod testing;

pub use client::ExchangeClient;
pub use ticker::fetch_price_sentence;
