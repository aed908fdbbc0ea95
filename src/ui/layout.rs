// =============================================================================
// Page Layout — static controls and placeholders
// =============================================================================
//
// The layout is plain data: it is served as JSON and rendered into the HTML
// page through an askama template. Each placeholder carries the ids of the
// inputs its callback watches so the page knows which placeholders go stale
// when a dropdown changes.
// =============================================================================

use askama::Template;
use serde::Serialize;

use super::callbacks::{CallbackRegistry, InputId, OutputId};
use crate::types::{Granularity, Product, Selection, PRODUCTS};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dropdown {
    pub id: &'static str,
    pub options: Vec<DropdownOption>,
    pub value: String,
    pub clearable: bool,
}

impl Dropdown {
    pub fn product(default: &Product) -> Self {
        Self {
            id: InputId::Product.as_str(),
            options: PRODUCTS
                .iter()
                .map(|p| DropdownOption {
                    label: p.to_string(),
                    value: p.to_string(),
                })
                .collect(),
            value: default.to_string(),
            clearable: false,
        }
    }

    pub fn granularity(default: Granularity) -> Self {
        Self {
            id: InputId::Granularity.as_str(),
            options: Granularity::ALL
                .iter()
                .map(|g| DropdownOption {
                    label: g.label().to_string(),
                    value: g.seconds().to_string(),
                })
                .collect(),
            value: default.seconds().to_string(),
            clearable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placeholder {
    pub id: &'static str,
    /// Space-separated input ids whose changes refresh this placeholder.
    pub watches: String,
}

impl Placeholder {
    fn for_output(output: OutputId, registry: &CallbackRegistry) -> Self {
        Self {
            id: output.as_str(),
            watches: registry
                .inputs_for(output)
                .iter()
                .map(|i| i.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub title: String,
    pub price: Placeholder,
    pub product: Dropdown,
    pub granularity: Dropdown,
    pub chart: Placeholder,
}

impl PageLayout {
    pub fn new(title: impl Into<String>, initial: &Selection, registry: &CallbackRegistry) -> Self {
        Self {
            title: title.into(),
            price: Placeholder::for_output(OutputId::Price, registry),
            product: Dropdown::product(&initial.product),
            granularity: Dropdown::granularity(initial.granularity),
            chart: Placeholder::for_output(OutputId::Chart, registry),
        }
    }

    pub fn render_html(&self) -> askama::Result<String> {
        PageTemplate { layout: self }.render()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct PageTemplate<'a> {
    layout: &'a PageLayout,
}
