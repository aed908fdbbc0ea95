pub mod candle;
pub mod table;

pub use candle::RawCandle;
pub use table::{build_table, CandleTable};
