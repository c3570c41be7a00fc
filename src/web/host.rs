use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Root of the extension host API: `browser` on Firefox, `chrome` elsewhere.
/// Detected exactly once at startup; every component receives a handle to
/// the same selection instead of re-probing at each call site.
#[derive(Clone)]
pub(crate) struct HostApi {
    root: JsValue,
}

impl HostApi {
    pub(crate) fn detect() -> Result<Self, JsValue> {
        let global = js_sys::global();
        for namespace in ["browser", "chrome"] {
            let candidate = Reflect::get(&global, &JsValue::from_str(namespace))?;
            if candidate.is_object() {
                return Ok(Self { root: candidate });
            }
        }
        Err(JsValue::from_str(
            "no extension host API found (neither browser nor chrome)",
        ))
    }

    fn api_value(&self, path: &[&str]) -> Result<JsValue, JsValue> {
        let mut current = self.root.clone();
        for segment in path {
            current = Reflect::get(&current, &JsValue::from_str(segment))?;
            if current.is_undefined() {
                return Err(JsValue::from_str(&format!(
                    "host API missing {}",
                    path.join(".")
                )));
            }
        }
        Ok(current)
    }

    /// Invokes a host method by path, awaiting the result when the host
    /// hands back a promise.
    async fn call(&self, path: &[&str], args: Array) -> Result<JsValue, JsValue> {
        let method: Function = self.api_value(path)?.dyn_into()?;
        let receiver = self.api_value(&path[..path.len() - 1])?;
        let result = method.apply(&receiver, &args)?;
        match result.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await,
            Err(value) => Ok(value),
        }
    }

    pub(crate) async fn storage_get(&self, keys: &Array) -> Result<JsValue, JsValue> {
        self.call(&["storage", "local", "get"], Array::of1(keys))
            .await
    }

    pub(crate) async fn storage_set(&self, items: &JsValue) -> Result<JsValue, JsValue> {
        self.call(&["storage", "local", "set"], Array::of1(items))
            .await
    }

    pub(crate) async fn tabs_query(&self, query: &JsValue) -> Result<JsValue, JsValue> {
        self.call(&["tabs", "query"], Array::of1(query)).await
    }

    pub(crate) async fn tabs_send_message(
        &self,
        tab_id: f64,
        message: &JsValue,
    ) -> Result<JsValue, JsValue> {
        self.call(
            &["tabs", "sendMessage"],
            Array::of2(&JsValue::from_f64(tab_id), message),
        )
        .await
    }

    pub(crate) fn add_runtime_listener(&self, listener: &Function) -> Result<(), JsValue> {
        let method: Function = self
            .api_value(&["runtime", "onMessage", "addListener"])?
            .dyn_into()?;
        let receiver = self.api_value(&["runtime", "onMessage"])?;
        method.call1(&receiver, listener)?;
        Ok(())
    }
}
