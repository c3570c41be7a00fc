use std::rc::Rc;

use super::host::HostApi;
use super::host_error;
use super::page::{await_document_ready, listen_for_updates, watch_for_anchor, DomPageHost};
use super::storage::WebSettingsBackend;
use crate::banner::BannerInjector;
use crate::error::{AppError, AppResult};
use crate::settings::SettingsStore;
use crate::watcher::AnchorWatcher;

/// Content-script startup: load settings, render the banner once the
/// document is ready, then keep watching for a late anchor and for popup
/// updates.
pub(crate) async fn run() -> AppResult<()> {
    let api = HostApi::detect().map_err(host_error)?;
    let backend = WebSettingsBackend::connect(api.clone()).await;
    let store = SettingsStore::new(backend);
    let settings = store.load();

    let window = web_sys::window().ok_or_else(|| AppError::Host("no window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| AppError::Host("no document".to_string()))?;
    await_document_ready(&document).await.map_err(host_error)?;

    let injector = Rc::new(BannerInjector::new(DomPageHost::new(document.clone())));
    injector.insert(&settings);

    if let Some(watcher) = AnchorWatcher::begin(injector.host()) {
        watch_for_anchor(&document, Rc::clone(&injector), settings, watcher)
            .map_err(host_error)?;
    }

    listen_for_updates(&api, injector).map_err(host_error)?;
    Ok(())
}
