use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::banner::{BannerInjector, PageHost};

/// Tab query pattern covering every Experience Cloud Builder page.
pub const BUILDER_TAB_PATTERN: &str = "*://*.builder.salesforce-experience.com/*";

/// Host tab identifier (browser tab ids are signed 32-bit).
pub type TabId = i32;

/// Popup → page wire message, tagged by `action` so unknown actions fail to
/// parse and are dropped by the listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RuntimeMessage {
    UpdateBanner {
        settings: crate::settings::Settings,
    },
}

/// Lenient decode for the page-side listener: anything that is not a known
/// message is `None`, never an error.
pub fn parse_message(raw: &serde_json::Value) -> Option<RuntimeMessage> {
    serde_json::from_value(raw.clone()).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

/// Per-tab outcome of a broadcast. Failed deliveries are expected (a tab may
/// have no content script yet) and callers are free to ignore every report.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub tab: TabId,
    pub outcome: Result<(), DeliveryError>,
}

/// Capability seam for fire-and-forget delivery to every open Builder tab.
/// A failure for one tab never aborts delivery to the rest.
pub trait TabBroadcaster {
    fn broadcast(&self, message: &RuntimeMessage) -> Vec<DeliveryReport>;
}

/// Page-side dispatch: only `updateBanner` means anything here, and it fully
/// supersedes whatever banner was showing before.
pub fn handle_page_message<H: PageHost>(message: &RuntimeMessage, injector: &BannerInjector<H>) {
    match message {
        RuntimeMessage::UpdateBanner { settings } => {
            injector.replace(settings);
        }
    }
}
