use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use super::broadcast::WebTabBroadcaster;
use super::host::HostApi;
use super::host_error;
use super::page::await_document_ready;
use super::storage::WebSettingsBackend;
use crate::error::{AppError, AppResult};
use crate::popup::{
    ColorField, PreviewStyle, SettingsForm, SettingsUiController, ORG_NAME_FIELD_ID,
    PLACEHOLDER_BORDER_COLOR, PLACEHOLDER_SWATCH_COLOR, RESET_BUTTON_ID,
};
use crate::settings::SettingsStore;

const INVALID_INPUT_CLASS: &str = "invalid";

type PopupController = SettingsUiController<DomSettingsForm, WebSettingsBackend, WebTabBroadcaster>;

/// Settings form capability over the popup DOM.
pub(crate) struct DomSettingsForm {
    document: Document,
}

impl DomSettingsForm {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    fn input(&self, id: &str) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    }

    fn set_preview_style(&self, field: ColorField, background: &str, border: &str) {
        let Some(preview) = self
            .document
            .get_element_by_id(field.preview_id())
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let style = preview.style();
        let _ = style.set_property("background-color", background);
        let _ = style.set_property("border", border);
    }
}

impl SettingsForm for DomSettingsForm {
    fn color_value(&self, field: ColorField) -> String {
        self.input(field.input_id())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn set_color_value(&self, field: ColorField, value: &str) {
        if let Some(input) = self.input(field.input_id()) {
            input.set_value(value);
        }
    }

    fn org_name_checked(&self) -> bool {
        self.input(ORG_NAME_FIELD_ID)
            .map(|input| input.checked())
            .unwrap_or(false)
    }

    fn set_org_name_checked(&self, checked: bool) {
        if let Some(input) = self.input(ORG_NAME_FIELD_ID) {
            input.set_checked(checked);
        }
    }

    fn render_preview(&self, field: ColorField, style: PreviewStyle) {
        match style {
            PreviewStyle::Swatch { color } => {
                self.set_preview_style(field, &color, &format!("2px solid {color}"));
                if let Some(input) = self.input(field.input_id()) {
                    let _ = input.class_list().remove_1(INVALID_INPUT_CLASS);
                }
            }
            PreviewStyle::Placeholder => {
                self.set_preview_style(
                    field,
                    PLACEHOLDER_SWATCH_COLOR,
                    &format!("1px solid {PLACEHOLDER_BORDER_COLOR}"),
                );
                if let Some(input) = self.input(field.input_id()) {
                    let _ = input.class_list().add_1(INVALID_INPUT_CLASS);
                }
            }
        }
    }
}

/// Popup startup: populate the form from the store, then wire DOM events to
/// the controller.
pub(crate) async fn run() -> AppResult<()> {
    let api = HostApi::detect().map_err(host_error)?;
    let window = web_sys::window().ok_or_else(|| AppError::Host("no window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| AppError::Host("no document".to_string()))?;
    await_document_ready(&document).await.map_err(host_error)?;

    let backend = WebSettingsBackend::connect(api.clone()).await;
    let controller = Rc::new(SettingsUiController::new(
        DomSettingsForm::new(document.clone()),
        SettingsStore::new(backend),
        WebTabBroadcaster::new(api),
    ));
    controller.open();

    wire_events(&document, controller).map_err(host_error)
}

fn wire_events(document: &Document, controller: Rc<PopupController>) -> Result<(), JsValue> {
    for field in ColorField::ALL {
        if let Some(input) = element(document, field.input_id()) {
            attach(&input, "input", {
                let controller = Rc::clone(&controller);
                Closure::new(move || controller.color_input())
            })?;
            attach(&input, "blur", {
                let controller = Rc::clone(&controller);
                Closure::new(move || controller.color_blur())
            })?;
        }
    }

    if let Some(checkbox) = element(document, ORG_NAME_FIELD_ID) {
        attach(&checkbox, "change", {
            let controller = Rc::clone(&controller);
            Closure::new(move || controller.toggle_org_name())
        })?;
    }

    if let Some(button) = element(document, RESET_BUTTON_ID) {
        attach(&button, "click", {
            let controller = Rc::clone(&controller);
            Closure::new(move || controller.reset())
        })?;
    }

    Ok(())
}

fn element(document: &Document, id: &str) -> Option<Element> {
    document.get_element_by_id(id)
}

/// Handlers live for the whole popup session; leaking them is deliberate.
fn attach(target: &Element, event: &str, handler: Closure<dyn FnMut()>) -> Result<(), JsValue> {
    target.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())?;
    handler.forget();
    Ok(())
}
