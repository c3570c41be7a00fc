use std::cell::RefCell;
use std::rc::Rc;

use js_sys::JSON;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, MutationObserver, MutationObserverInit};

use super::host::HostApi;
use crate::banner::{
    BannerInjector, BannerSpec, PageHost, ANCHOR_SELECTOR, BANNER_CONTENT_CLASS,
    BANNER_ELEMENT_ID, BANNER_TEXT_CLASS,
};
use crate::messaging::{handle_page_message, parse_message};
use crate::settings::Settings;
use crate::watcher::{AnchorWatcher, WatcherState, ANCHOR_WAIT_TIMEOUT};

/// Page capability over the live DOM.
pub(crate) struct DomPageHost {
    document: Document,
}

impl DomPageHost {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    fn build_banner(&self, banner: &BannerSpec) -> Result<(), JsValue> {
        let anchor = self
            .document
            .query_selector(ANCHOR_SELECTOR)?
            .ok_or_else(|| JsValue::from_str("anchor element disappeared"))?;
        let parent = anchor
            .parent_node()
            .ok_or_else(|| JsValue::from_str("anchor element has no parent"))?;

        let element = self.document.create_element("div")?;
        element.set_id(banner.element_id);
        element.set_class_name(&banner.class_name);
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            element
                .style()
                .set_property("background-color", &banner.background)?;
        }

        let content = self.document.create_element("div")?;
        content.set_class_name(BANNER_CONTENT_CLASS);
        let text = self.document.create_element("span")?;
        text.set_class_name(BANNER_TEXT_CLASS);
        text.set_text_content(Some(&banner.text));

        content.append_child(&text)?;
        element.append_child(&content)?;
        parent.insert_before(element.as_ref(), Some(anchor.as_ref()))?;
        Ok(())
    }
}

impl PageHost for DomPageHost {
    fn hostname(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.hostname().ok())
            .unwrap_or_default()
    }

    fn banner_present(&self) -> bool {
        self.document.get_element_by_id(BANNER_ELEMENT_ID).is_some()
    }

    fn anchor_present(&self) -> bool {
        matches!(self.document.query_selector(ANCHOR_SELECTOR), Ok(Some(_)))
    }

    fn insert_before_anchor(&self, banner: &BannerSpec) {
        if let Err(err) = self.build_banner(banner) {
            web_sys::console::warn_2(
                &JsValue::from_str("[sf-env-banner] failed to insert banner"),
                &err,
            );
        }
    }

    fn remove_banner(&self) {
        if let Some(existing) = self.document.get_element_by_id(BANNER_ELEMENT_ID) {
            existing.remove();
        }
    }
}

/// Resolves once the document has finished parsing; immediate when the
/// script runs after `DOMContentLoaded`.
pub(crate) async fn await_document_ready(document: &Document) -> Result<(), JsValue> {
    if document.ready_state() != "loading" {
        return Ok(());
    }
    let target = document.clone();
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let listener = Closure::once_into_js(move || {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let _ = target.add_event_listener_with_callback("DOMContentLoaded", listener.unchecked_ref());
    });
    JsFuture::from(promise).await.map(|_| ())
}

/// Wires the anchor watcher to a `MutationObserver` on `document.body` plus
/// one timeout. The closures are leaked on purpose: there is exactly one
/// watcher per page load and it lives until the page goes away.
pub(crate) fn watch_for_anchor(
    document: &Document,
    injector: Rc<BannerInjector<DomPageHost>>,
    settings: Settings,
    watcher: AnchorWatcher,
) -> Result<(), JsValue> {
    let Some(body) = document.body() else {
        return Ok(());
    };

    let watcher = Rc::new(RefCell::new(watcher));
    let observer_slot: Rc<RefCell<Option<MutationObserver>>> = Rc::new(RefCell::new(None));

    let on_mutation = {
        let watcher = Rc::clone(&watcher);
        let observer_slot = Rc::clone(&observer_slot);
        Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |_records: js_sys::Array, _observer: MutationObserver| {
                if watcher.borrow_mut().on_mutation(&injector, &settings)
                    == WatcherState::Stopped
                {
                    if let Some(observer) = observer_slot.borrow().as_ref() {
                        observer.disconnect();
                    }
                }
            },
        )
    };

    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&body, &options)?;
    *observer_slot.borrow_mut() = Some(observer);
    on_mutation.forget();

    let on_timeout = {
        let watcher = Rc::clone(&watcher);
        let observer_slot = Rc::clone(&observer_slot);
        Closure::<dyn FnMut()>::new(move || {
            watcher.borrow_mut().on_timeout();
            if let Some(observer) = observer_slot.borrow().as_ref() {
                observer.disconnect();
            }
        })
    };
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        on_timeout.as_ref().unchecked_ref(),
        ANCHOR_WAIT_TIMEOUT.as_millis() as i32,
    )?;
    on_timeout.forget();

    Ok(())
}

/// Subscribes the page to popup broadcasts; anything that is not an
/// `updateBanner` message is dropped.
pub(crate) fn listen_for_updates(
    api: &HostApi,
    injector: Rc<BannerInjector<DomPageHost>>,
) -> Result<(), JsValue> {
    let on_message = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
        let Ok(json) = JSON::stringify(&raw) else {
            return;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&String::from(json)) else {
            return;
        };
        if let Some(message) = parse_message(&value) {
            handle_page_message(&message, &*injector);
        }
    });
    api.add_runtime_listener(on_message.as_ref().unchecked_ref())?;
    on_message.forget();
    Ok(())
}
