use std::cell::RefCell;

use js_sys::{Array, JSON};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

use super::host::HostApi;
use crate::settings::{RawSettings, Settings, SettingsBackend, StoreError, StoreResult};

const STORED_KEYS: [&str; 3] = ["sandboxColor", "productionColor", "showOrgName"];

/// Settings backend over the host storage area. The stored record is
/// fetched once on connect; writes update the snapshot immediately (so the
/// popup reads its own writes) and flush to the host asynchronously.
pub(crate) struct WebSettingsBackend {
    api: HostApi,
    snapshot: RefCell<StoreResult<RawSettings>>,
}

impl WebSettingsBackend {
    pub(crate) async fn connect(api: HostApi) -> Self {
        let snapshot = fetch(&api).await;
        if let Err(err) = &snapshot {
            web_sys::console::warn_1(&JsValue::from_str(&format!("[sf-env-banner] {err}")));
        }
        Self {
            api,
            snapshot: RefCell::new(snapshot),
        }
    }
}

async fn fetch(api: &HostApi) -> StoreResult<RawSettings> {
    let keys = Array::new();
    for key in STORED_KEYS {
        keys.push(&JsValue::from_str(key));
    }
    let stored = api.storage_get(&keys).await.map_err(|err| StoreError::Read {
        reason: format!("{err:?}"),
    })?;
    let json = JSON::stringify(&stored).map_err(|err| StoreError::Read {
        reason: format!("{err:?}"),
    })?;
    serde_json::from_str(&String::from(json)).map_err(|err| StoreError::Read {
        reason: err.to_string(),
    })
}

impl SettingsBackend for WebSettingsBackend {
    fn read_all(&self) -> StoreResult<RawSettings> {
        self.snapshot.borrow().clone()
    }

    fn write_all(&self, settings: &Settings) -> StoreResult<()> {
        let payload = serde_json::to_string(settings).map_err(|err| StoreError::Write {
            reason: err.to_string(),
        })?;
        *self.snapshot.borrow_mut() = Ok(RawSettings::from(settings));

        // The host write settles after this call returns; a failure is
        // logged and the user keeps their displayed values until next load.
        let api = self.api.clone();
        spawn_local(async move {
            let result: Result<JsValue, JsValue> = async {
                let items = JSON::parse(&payload)?;
                api.storage_set(&items).await
            }
            .await;
            if let Err(err) = result {
                web_sys::console::error_2(
                    &JsValue::from_str("[sf-env-banner] failed to persist settings"),
                    &err,
                );
            }
        });
        Ok(())
    }
}
