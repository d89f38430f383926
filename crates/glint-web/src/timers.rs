//! `setTimeout`-backed [`TimerHost`]. A fired timer only enqueues its task
//! and wakes the runtime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::Sender;
use glint_core::{EffectInput, TimerTask};
use glint_platform::{TimerHost, TimerId};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Window};

use crate::error::WebError;

pub struct WebTimers {
    window: Window,
    sender: Sender<EffectInput<Element>>,
    next_id: u64,
    live: HashMap<TimerId, (i32, Closure<dyn FnMut()>)>,
    /// Ids whose callback already ran; their closures are dropped on the next call.
    fired: Rc<RefCell<Vec<TimerId>>>,
}

impl WebTimers {
    pub fn new(window: Window, sender: Sender<EffectInput<Element>>) -> Self {
        Self {
            window,
            sender,
            next_id: 0,
            live: HashMap::new(),
            fired: Rc::default(),
        }
    }

    fn reap(&mut self) {
        for id in self.fired.borrow_mut().drain(..) {
            self.live.remove(&id);
        }
    }
}

impl TimerHost<TimerTask<Element>> for WebTimers {
    fn set_timeout(&mut self, delay: Duration, task: TimerTask<Element>) -> TimerId {
        self.reap();
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let sender = self.sender.clone();
        let fired = Rc::clone(&self.fired);
        let callback: Closure<dyn FnMut()> = Closure::once(move || {
            fired.borrow_mut().push(id);
            let _ = sender.send(EffectInput::Timer(task));
            crate::runtime::wake();
        });
        let millis = delay.as_millis().min(i32::MAX as u128) as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), millis)
        {
            Ok(handle) => {
                self.live.insert(id, (handle, callback));
            }
            Err(err) => warn!(err = %WebError::from(err), "setTimeout failed"),
        }
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.reap();
        if let Some((handle, _callback)) = self.live.remove(&id) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
