//! The single coordinator instance of this page and the hooks that drive it.

use std::cell::RefCell;

use glint_core::EffectCoordinator;
use tracing::{trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::error::WebError;
use crate::page::WebPage;
use crate::timers::WebTimers;

pub type WebCoordinator = EffectCoordinator<WebPage, WebTimers>;

thread_local! {
    static RUNTIME: RefCell<Option<WebCoordinator>> = const { RefCell::new(None) };
}

pub fn install(coordinator: WebCoordinator) {
    RUNTIME.with(|cell| *cell.borrow_mut() = Some(coordinator));
}

/// Drains queued inputs. Safe to call from any callback; if the runtime is
/// already borrowed further up the stack, the inputs wait for that drain.
pub fn wake() {
    RUNTIME.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(coordinator) = slot.as_mut() {
                coordinator.pump();
            }
        }
        Err(_) => trace!("runtime busy; inputs stay queued"),
    });
}

/// `requestAnimationFrame` callback.
pub fn frame() {
    RUNTIME.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(coordinator) = slot.as_mut() {
                coordinator.frame();
            }
        }
        Err(_) => {
            // The coordinator still counts this frame as pending; ask again.
            warn!("runtime busy; animation frame deferred");
            if let Some(window) = web_sys::window() {
                request_frame(&window);
            }
        }
    });
}

/// Schedules [`frame`] on the next animation frame.
pub fn request_frame(window: &Window) {
    let callback = Closure::once_into_js(frame);
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        warn!(err = %WebError::from(err), "requestAnimationFrame failed");
    }
}
