// =============================================================================
// Callback Registry — reactive re-render on dropdown changes
// =============================================================================
//
// Each callback is registered against the input ids it watches and the single
// output it fills. A dispatch names the inputs whose values changed; every
// callback watching at least one of them runs exactly once, all of them
// concurrently and in no particular order. Callbacks share nothing but the
// (immutable) exchange client and the selection they are handed.
//
// A failing callback does not affect the others: its output becomes an error
// payload that the page shows in place of the stale content.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};

use crate::chart::{fetch_chart, Figure};
use crate::error::{ExchangeError, RegistryError};
use crate::exchange::{fetch_price_sentence, ExchangeClient};
use crate::types::Selection;

/// Dropdowns whose changes can trigger callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputId {
    Product,
    Granularity,
}

impl InputId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Granularity => "granularity",
        }
    }
}

/// Placeholders a callback can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputId {
    Chart,
    Price,
}

impl OutputId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Price => "price",
        }
    }
}

impl std::fmt::Display for OutputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New content for a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    Figure(Figure),
    Text(String),
}

/// What a placeholder receives after a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Output {
    Ok { value: OutputValue },
    Error { message: String },
}

pub type Handler = Arc<
    dyn Fn(ExchangeClient, Selection) -> BoxFuture<'static, Result<OutputValue, ExchangeError>>
        + Send
        + Sync,
>;

pub struct Callback {
    pub name: &'static str,
    pub inputs: Vec<InputId>,
    pub output: OutputId,
    handler: Handler,
}

impl Callback {
    pub fn watches_any(&self, changed: &[InputId]) -> bool {
        self.inputs.iter().any(|i| changed.contains(i))
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct CallbackRegistry {
    callbacks: Vec<Callback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` to refill `output` whenever any of `inputs` changes.
    ///
    /// Each output may have only one callback.
    pub fn register<F, Fut>(
        &mut self,
        name: &'static str,
        inputs: &[InputId],
        output: OutputId,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(ExchangeClient, Selection) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<OutputValue, ExchangeError>> + Send + 'static,
    {
        if inputs.is_empty() {
            return Err(RegistryError::NoInputs(name.to_string()));
        }
        if self.callbacks.iter().any(|c| c.output == output) {
            return Err(RegistryError::DuplicateOutput(output.to_string()));
        }

        let handler: Handler = Arc::new(move |client, selection| handler(client, selection).boxed());
        self.callbacks.push(Callback {
            name,
            inputs: inputs.to_vec(),
            output,
            handler,
        });
        Ok(())
    }

    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// Inputs watched by the callback that fills `output`.
    pub fn inputs_for(&self, output: OutputId) -> &[InputId] {
        self.callbacks
            .iter()
            .find(|c| c.output == output)
            .map(|c| c.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Callbacks a change to `changed` fires, in registration order.
    pub fn triggered_by<'a>(&'a self, changed: &'a [InputId]) -> impl Iterator<Item = &'a Callback> {
        self.callbacks.iter().filter(move |c| c.watches_any(changed))
    }

    /// Run every callback watching one of `changed` against `selection`.
    pub async fn dispatch(
        &self,
        client: &ExchangeClient,
        changed: &[InputId],
        selection: &Selection,
    ) -> BTreeMap<OutputId, Output> {
        let dispatch_id = uuid::Uuid::new_v4();
        let span = info_span!(
            "dispatch",
            %dispatch_id,
            product = %selection.product,
            granularity = selection.granularity.seconds()
        );

        async move {
            let runs = self.triggered_by(changed).map(|cb| {
                let fut = (cb.handler)(client.clone(), selection.clone());
                let span = info_span!("callback", callback = cb.name, output = %cb.output);
                async move {
                    let output = match fut.await {
                        Ok(value) => Output::Ok { value },
                        Err(e) => {
                            warn!(error = %e, "callback failed");
                            Output::Error {
                                message: e.to_string(),
                            }
                        }
                    };
                    (cb.output, output)
                }
                .instrument(span)
            });

            let outputs: BTreeMap<OutputId, Output> = join_all(runs).await.into_iter().collect();
            info!(
                changed = ?changed,
                outputs = ?outputs.keys().collect::<Vec<_>>(),
                "dispatch complete"
            );
            outputs
        }
        .instrument(span)
        .await
    }
}

/// Wire the dashboard's two callbacks: the chart follows both dropdowns, the
/// price line follows the product only.
pub fn register_dashboard_callbacks(registry: &mut CallbackRegistry) -> Result<(), RegistryError> {
    registry.register(
        "update_chart",
        &[InputId::Product, InputId::Granularity],
        OutputId::Chart,
        |client, selection| async move {
            fetch_chart(&client, &selection).await.map(OutputValue::Figure)
        },
    )?;
    registry.register(
        "update_price",
        &[InputId::Product],
        OutputId::Price,
        |client, selection| async move {
            fetch_price_sentence(&client, &selection.product)
                .await
                .map(OutputValue::Text)
        },
    )?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::testing::FakeExchange;
    use crate::types::{Granularity, Product};

    fn dashboard() -> CallbackRegistry {
        let mut registry = CallbackRegistry::new();
        register_dashboard_callbacks(&mut registry).unwrap();
        registry
    }

    fn names(registry: &CallbackRegistry, changed: &[InputId]) -> Vec<&'static str> {
        registry.triggered_by(changed).map(|c| c.name).collect()
    }

    #[test]
    fn product_change_triggers_both_callbacks() {
        let registry = dashboard();
        assert_eq!(
            names(&registry, &[InputId::Product]),
            vec!["update_chart", "update_price"]
        );
    }

    #[test]
    fn granularity_change_triggers_chart_only() {
        let registry = dashboard();
        assert_eq!(names(&registry, &[InputId::Granularity]), vec!["update_chart"]);
        assert!(names(&registry, &[]).is_empty());
    }

    #[test]
    fn inputs_for_reports_watch_lists() {
        let registry = dashboard();
        assert_eq!(
            registry.inputs_for(OutputId::Chart),
            &[InputId::Product, InputId::Granularity]
        );
        assert_eq!(registry.inputs_for(OutputId::Price), &[InputId::Product]);
    }

    #[test]
    fn duplicate_output_is_rejected() {
        let mut registry = dashboard();
        let err = registry
            .register("again", &[InputId::Product], OutputId::Price, |_, _| async {
                Ok(OutputValue::Text(String::new()))
            })
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateOutput("price".into()));
    }

    #[test]
    fn callback_without_inputs_is_rejected() {
        let mut registry = CallbackRegistry::new();
        let err = registry
            .register("orphan", &[], OutputId::Chart, |_, _| async {
                Ok(OutputValue::Text(String::new()))
            })
            .unwrap_err();
        assert_eq!(err, RegistryError::NoInputs("orphan".into()));
    }

    #[tokio::test]
    async fn product_change_fetches_candles_and_ticker_once_each() {
        let fake = FakeExchange::start().await;
        let registry = dashboard();
        let selection = Selection {
            product: Product::parse("BTC-USD").unwrap(),
            granularity: Granularity::OneHour,
        };

        let outputs = registry
            .dispatch(&fake.client(), &[InputId::Product], &selection)
            .await;

        assert_eq!(fake.candle_hits(), 1);
        assert_eq!(fake.ticker_hits(), 1);
        assert_eq!(fake.last_candle_request().as_deref(), Some("BTC-USD@3600"));
        assert!(matches!(
            outputs.get(&OutputId::Chart),
            Some(Output::Ok { value: OutputValue::Figure(_) })
        ));
        assert_eq!(
            outputs.get(&OutputId::Price),
            Some(&Output::Ok {
                value: OutputValue::Text("The price of BTC-USD is 3120.50 USD.".into())
            })
        );
    }

    #[tokio::test]
    async fn granularity_change_fetches_candles_only() {
        let fake = FakeExchange::start().await;
        let registry = dashboard();
        let selection = Selection {
            product: Product::default(),
            granularity: Granularity::OneDay,
        };

        let outputs = registry
            .dispatch(&fake.client(), &[InputId::Granularity], &selection)
            .await;

        assert_eq!(fake.candle_hits(), 1);
        assert_eq!(fake.ticker_hits(), 0);
        assert_eq!(outputs.len(), 1);
        assert!(outputs.contains_key(&OutputId::Chart));
    }

    #[tokio::test]
    async fn both_changed_still_runs_each_callback_once() {
        let fake = FakeExchange::start().await;
        let registry = dashboard();

        let outputs = registry
            .dispatch(
                &fake.client(),
                &[InputId::Product, InputId::Granularity],
                &Selection::default(),
            )
            .await;

        assert_eq!(fake.candle_hits(), 1);
        assert_eq!(fake.ticker_hits(), 1);
        assert_eq!(outputs.len(), 2);
    }

    #[tokio::test]
    async fn upstream_failure_becomes_error_output() {
        let fake = FakeExchange::start().await;
        fake.fail_with(502);
        let registry = dashboard();

        let outputs = registry
            .dispatch(&fake.client(), &[InputId::Product], &Selection::default())
            .await;

        for id in [OutputId::Chart, OutputId::Price] {
            match outputs.get(&id) {
                Some(Output::Error { message }) => assert!(message.contains("502"), "{message}"),
                other => panic!("expected error for {id}, got {other:?}"),
            }
        }
    }

    #[test]
    fn output_serialises_with_status_tag() {
        let ok = Output::Ok {
            value: OutputValue::Text("hi".into()),
        };
        let err = Output::Error {
            message: "boom".into(),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"status": "ok", "value": "hi"})
        );
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"status": "error", "message": "boom"})
        );
    }
}
