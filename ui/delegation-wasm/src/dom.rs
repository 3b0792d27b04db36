//! DOM element bindings.
//!
//! All fields are resolved once at startup. The page must provide
//! `#status`, `#walletButtons` and `#delegateContainer`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, Window};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn required(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id} element")))
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn clear(el: &Element) {
    el.set_inner_html("");
}

/// A `<button>` carrying `data-{attr}="{value}"`, for delegated click handling.
pub fn create_button(attr: &str, value: &str, label: &str) -> Result<HtmlButtonElement, JsValue> {
    let button: HtmlButtonElement = document()?.create_element("button")?.dyn_into()?;
    button.set_attribute(&format!("data-{attr}"), value)?;
    button.set_type("button");
    button.set_text_content(Some(label));
    Ok(button)
}

/// Value of `data-{attr}` on the closest ancestor-or-self of the event target.
pub fn data_from_event(event: &web_sys::Event, attr: &str) -> Option<String> {
    let target: Element = event.target()?.dyn_into().ok()?;
    let name = format!("data-{attr}");
    target
        .closest(&format!("[{name}]"))
        .ok()
        .flatten()?
        .get_attribute(&name)
}

/// Text of the optional `<script id="bridgeConfig" type="application/json">`.
pub fn config_script() -> Option<String> {
    let doc = document().ok()?;
    let text = doc.get_element_by_id("bridgeConfig")?.text_content()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// DOM element references used by the delegation page.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    pub status: Element,
    pub wallet_buttons: Element,
    pub delegate_container: Element,
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        let doc = document()?;
        Ok(Self {
            status: required(&doc, "status")?,
            wallet_buttons: required(&doc, "walletButtons")?,
            delegate_container: required(&doc, "delegateContainer")?,
        })
    }
}
