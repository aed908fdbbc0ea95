// =============================================================================
// Application Context — built once at startup, shared via Arc
// =============================================================================
//
// Everything a request handler needs: the exchange client, the callback
// registry and the static page layout. Nothing here is mutated after
// construction, so handlers share it without locks.
// =============================================================================

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::DashConfig;
use crate::exchange::ExchangeClient;
use crate::types::Selection;
use crate::ui::{register_dashboard_callbacks, CallbackRegistry, PageLayout};

pub struct AppContext {
    pub config: DashConfig,
    pub exchange: ExchangeClient,
    pub callbacks: CallbackRegistry,
    pub layout: PageLayout,
    /// Used for uptime reporting.
    pub start_time: Instant,
}

impl AppContext {
    pub fn new(config: DashConfig) -> Result<Self> {
        let exchange = ExchangeClient::new(
            config.exchange_url.as_str(),
            &config.user_agent,
            config.request_timeout_secs.map(Duration::from_secs),
        )
        .context("failed to build exchange HTTP client")?;

        let mut callbacks = CallbackRegistry::new();
        register_dashboard_callbacks(&mut callbacks).context("failed to register callbacks")?;

        let layout = PageLayout::new(config.title.clone(), &Selection::default(), &callbacks);

        info!(
            exchange_url = %exchange.base_url(),
            callbacks = callbacks.callbacks().len(),
            "application context ready"
        );

        Ok(Self {
            config,
            exchange,
            callbacks,
            layout,
            start_time: Instant::now(),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{InputId, OutputId};

    #[test]
    fn context_wires_both_callbacks() {
        let ctx = AppContext::new(DashConfig::default()).unwrap();
        assert_eq!(ctx.callbacks.callbacks().len(), 2);
        assert_eq!(ctx.callbacks.inputs_for(OutputId::Price), &[InputId::Product]);
        assert_eq!(ctx.layout.title, "Crypto Candles");
        assert_eq!(ctx.exchange.base_url(), "https://api.exchange.coinbase.com");
    }

    #[test]
    fn trailing_slash_is_dropped_from_exchange_url() {
        let config = DashConfig {
            exchange_url: "http://localhost:9000/".into(),
            request_timeout_secs: Some(3),
            ..DashConfig::default()
        };
        let ctx = AppContext::new(config).unwrap();
        assert_eq!(ctx.exchange.base_url(), "http://localhost:9000");
    }
}
