//! Canvas 2D overlay surface and `requestAnimationFrame` scheduling.

use std::f64::consts::TAU;

use glint_core::config::PageConfig;
use glint_platform::{OverlayBackend, Rgba, Surface};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use crate::error::WebError;
use crate::overlay;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
    pixel_ratio: f32,
}

impl CanvasSurface {
    fn circle_path(&self, x: f32, y: f32, radius: f32) {
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(x as f64, y as f64, radius.max(0.0) as f64, 0.0, TAU);
    }
}

impl Surface for CanvasSurface {
    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.circle_path(x, y, radius);
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, line_width: f32, color: Rgba) {
        self.circle_path(x, y, radius);
        self.ctx.set_line_width(line_width as f64);
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.stroke();
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), line_width: f32, color: Rgba) {
        self.ctx.begin_path();
        self.ctx.move_to(from.0 as f64, from.1 as f64);
        self.ctx.line_to(to.0 as f64, to.1 as f64);
        self.ctx.set_line_width(line_width as f64);
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.stroke();
    }

    fn is_connected(&self) -> bool {
        self.canvas.is_connected()
    }

    fn remove(self: Box<Self>) {
        self.canvas.remove();
    }
}

pub struct WebOverlayBackend {
    window: Window,
    document: Document,
    canvas_id: String,
    z_index: i32,
}

impl WebOverlayBackend {
    pub fn new(window: Window, document: Document, page: &PageConfig) -> Self {
        Self {
            window,
            document,
            canvas_id: page.canvas_id.clone(),
            z_index: page.canvas_z_index,
        }
    }

    fn try_create(&self) -> glint_platform::Result<CanvasSurface> {
        let body = self.document.body().ok_or(WebError::NoBody)?;
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(WebError::from)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| WebError::NodeType("canvas"))?;
        let width = self.window.inner_width().map_err(WebError::from)?.as_f64().unwrap_or(0.0);
        let height = self.window.inner_height().map_err(WebError::from)?.as_f64().unwrap_or(0.0);
        canvas.set_id(&self.canvas_id);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        canvas.style().set_css_text(&overlay::canvas_css(self.z_index));

        let ctx = canvas
            .get_context("2d")
            .map_err(WebError::from)?
            .ok_or(WebError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| WebError::NoContext)?;
        body.append_child(&canvas).map_err(WebError::from)?;

        Ok(CanvasSurface {
            canvas,
            ctx,
            width: width as f32,
            height: height as f32,
            pixel_ratio: self.window.device_pixel_ratio() as f32,
        })
    }
}

impl OverlayBackend for WebOverlayBackend {
    fn create_surface(&mut self) -> Option<Box<dyn Surface>> {
        match self.try_create() {
            Ok(surface) => {
                debug!(width = surface.width, height = surface.height, "canvas attached");
                Some(Box::new(surface))
            }
            Err(err) => {
                warn!(%err, "overlay canvas unavailable");
                None
            }
        }
    }

    fn request_frame(&mut self) {
        crate::runtime::request_frame(&self.window);
    }
}
