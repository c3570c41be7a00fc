use js_sys::{Object, Reflect, JSON};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

use super::host::HostApi;
use crate::messaging::{DeliveryReport, RuntimeMessage, TabBroadcaster, BUILDER_TAB_PATTERN};

/// Fire-and-forget delivery to every open Builder tab through the host tabs
/// API. Deliveries settle after `broadcast` returns, so per-tab reports are
/// logged to the console rather than returned; the contract allows callers
/// to ignore them either way.
pub(crate) struct WebTabBroadcaster {
    api: HostApi,
}

impl WebTabBroadcaster {
    pub(crate) fn new(api: HostApi) -> Self {
        Self { api }
    }
}

impl TabBroadcaster for WebTabBroadcaster {
    fn broadcast(&self, message: &RuntimeMessage) -> Vec<DeliveryReport> {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(err) => {
                web_sys::console::error_1(&JsValue::from_str(&format!(
                    "[sf-env-banner] failed to encode broadcast: {err}"
                )));
                return Vec::new();
            }
        };

        let api = self.api.clone();
        spawn_local(async move {
            if let Err(err) = deliver(&api, &payload).await {
                web_sys::console::warn_2(
                    &JsValue::from_str("[sf-env-banner] banner update broadcast failed"),
                    &err,
                );
            }
        });
        Vec::new()
    }
}

async fn deliver(api: &HostApi, payload: &str) -> Result<(), JsValue> {
    let message = JSON::parse(payload)?;

    let query = Object::new();
    Reflect::set(
        &query,
        &JsValue::from_str("url"),
        &JsValue::from_str(BUILDER_TAB_PATTERN),
    )?;
    let tabs = api.tabs_query(&query.into()).await?;

    for tab in js_sys::Array::from(&tabs).iter() {
        let Some(id) = Reflect::get(&tab, &JsValue::from_str("id"))
            .ok()
            .and_then(|id| id.as_f64())
        else {
            continue;
        };
        // A tab without a content script rejects the send; expected, and it
        // must not stop delivery to the remaining tabs.
        let _ = api.tabs_send_message(id, &message).await;
    }
    Ok(())
}
