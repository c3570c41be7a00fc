//! Browser bindings. Everything in here is host-specific glue over the
//! extension APIs and the page DOM; the decision logic lives in the
//! host-agnostic modules and is driven synchronously from these shims.

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::error::AppError;

mod broadcast;
mod content;
mod host;
mod page;
mod popup;
mod storage;

pub(crate) fn host_error(err: JsValue) -> AppError {
    AppError::Host(format!("{err:?}"))
}

fn report(err: &AppError) {
    web_sys::console::error_1(&JsValue::from_str(&format!("[sf-env-banner] {err}")));
}

/// Content-script entry: renders the banner on the current Builder page and
/// keeps it in sync with popup updates.
#[wasm_bindgen]
pub fn content_main() {
    crate::logging::init();
    spawn_local(async {
        if let Err(err) = content::run().await {
            report(&err);
        }
    });
}

/// Popup entry: binds the settings form.
#[wasm_bindgen]
pub fn popup_main() {
    crate::logging::init();
    spawn_local(async {
        if let Err(err) = popup::run().await {
            report(&err);
        }
    });
}
