//! [`PageHost`] over the live mail-client DOM.

use glint_core::config::PageConfig;
use glint_platform::{ElementRect, MutationKind, MutationRecord, PageHost, StyleProperty, Viewport};
use tracing::trace;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::error::WebError;

pub struct WebPage {
    window: Window,
    document: Document,
    body: Element,
    config: PageConfig,
}

impl WebPage {
    pub fn new(window: Window, document: Document, config: PageConfig) -> Result<Self, WebError> {
        let body: Element = document.body().ok_or(WebError::NoBody)?.into();
        Ok(Self {
            window,
            document,
            body,
            config,
        })
    }

    pub fn document_element(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn checkbox_checked(&self, row: &Element) -> bool {
        row.query_selector(&self.config.checkbox_selector)
            .ok()
            .flatten()
            .and_then(|checkbox| checkbox.get_attribute(&self.config.selection_attribute))
            .is_some_and(|value| value == "true")
    }

    fn fallback_cell_selected(&self, row: &Element) -> bool {
        let Ok(cells) = row.query_selector_all("td") else {
            return false;
        };
        cells
            .get(self.config.fallback_cell_index)
            .and_then(|cell| cell.dyn_into::<Element>().ok())
            .and_then(|cell| cell.query_selector("div").ok().flatten())
            .and_then(|div| div.text_content())
            .is_some_and(|text| text.starts_with(&self.config.fallback_text_prefix))
    }
}

impl PageHost for WebPage {
    type Element = Element;

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<wasm_bindgen::JsValue, _>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
        };
        Viewport {
            width: dimension(self.window.inner_width()),
            height: dimension(self.window.inner_height()),
            pixel_ratio: self.window.device_pixel_ratio() as f32,
        }
    }

    fn root(&self) -> Element {
        self.body.clone()
    }

    fn enclosing_row(&self, node: &Element) -> Option<Element> {
        node.closest(&self.config.row_selector).ok().flatten()
    }

    fn is_list_row(&self, row: &Element) -> bool {
        row.query_selector(&self.config.select_cell_selector)
            .ok()
            .flatten()
            .is_some()
    }

    fn is_row_selected(&self, row: &Element) -> bool {
        self.checkbox_checked(row) || self.fallback_cell_selected(row)
    }

    fn selected_rows(&self) -> Vec<Element> {
        let Ok(rows) = self.document.query_selector_all(&self.config.row_selector) else {
            return Vec::new();
        };
        (0..rows.length())
            .filter_map(|i| rows.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter(|row| self.is_list_row(row) && self.is_row_selected(row))
            .collect()
    }

    fn bounding_rect(&self, element: &Element) -> Option<ElementRect> {
        if !element.is_connected() {
            return None;
        }
        let rect = element.get_bounding_client_rect();
        Some(ElementRect {
            x: rect.x() as f32,
            y: rect.y() as f32,
            width: rect.width() as f32,
            height: rect.height() as f32,
        })
    }

    fn style(&self, element: &Element, property: StyleProperty) -> Option<String> {
        element
            .dyn_ref::<HtmlElement>()?
            .style()
            .get_property_value(property.css_name())
            .ok()
    }

    fn set_style(&mut self, element: &Element, property: StyleProperty, value: &str) -> bool {
        if !element.is_connected() {
            return false;
        }
        let Some(html) = element.dyn_ref::<HtmlElement>() else {
            return false;
        };
        html.style().set_property(property.css_name(), value).is_ok()
    }
}

/// Converts one observer callback batch, skipping records without an element.
pub fn mutation_records(records: &js_sys::Array) -> Vec<MutationRecord<Element>> {
    records
        .iter()
        .filter_map(|value| {
            let record = value.dyn_into::<web_sys::MutationRecord>().ok()?;
            let kind = MutationKind::from_dom(&record.type_())?;
            let node = record.target()?;
            let target = match node.dyn_ref::<Element>() {
                Some(element) => element.clone(),
                None => node.parent_element()?,
            };
            Some(MutationRecord {
                target,
                kind,
                attribute: record.attribute_name(),
            })
        })
        .inspect(|record| trace!(kind = ?record.kind, attribute = ?record.attribute, "mutation"))
        .collect()
}
