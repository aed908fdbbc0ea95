pub mod callbacks;
pub mod layout;

pub use callbacks::{register_dashboard_callbacks, CallbackRegistry, InputId, Output, OutputId};
pub use layout::PageLayout;
