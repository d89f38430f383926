//! Glint content script. Compiles to wasm32 and attaches the overlay to the
//! mail client's page; on other targets only the host-independent helpers
//! are built.

pub mod error;
pub mod overlay;

pub use error::WebError;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub mod canvas;
        pub mod logging;
        pub mod page;
        pub mod runtime;
        pub mod storage;
        pub mod timers;

        use crossbeam_channel::Sender;
        use glint_core::config::PageConfig;
        use glint_core::{EffectCoordinator, EffectInput, Inbox};
        use glint_platform::{PageHost, StyleProperty};
        use tracing::{info, warn};
        use wasm_bindgen::prelude::*;
        use wasm_bindgen::JsCast;
        use web_sys::{Document, Element, KeyboardEvent, MutationObserver, MutationObserverInit};

        use crate::canvas::WebOverlayBackend;
        use crate::page::WebPage;
        use crate::timers::WebTimers;

        #[wasm_bindgen(start)]
        pub fn start() -> Result<(), JsValue> {
            logging::init("glint_core=info,glint_web=info");
            let config = overlay::embedded_config()?;
            let window = web_sys::window().ok_or(WebError::NoWindow)?;
            let document = window.document().ok_or(WebError::NoDocument)?;

            let inbox = Inbox::new();
            let sender = inbox.sender();
            let mut page = WebPage::new(window.clone(), document.clone(), config.page.clone())?;
            if let (Some(background), Some(root)) = (&config.page.background, page.document_element()) {
                page.set_style(&root, StyleProperty::BackgroundColor, background);
            }
            let timers = WebTimers::new(window.clone(), sender.clone());
            let backend = WebOverlayBackend::new(window, document.clone(), &config.page);
            let seed = overlay::rng_seed(js_sys::Math::random(), js_sys::Date::now());
            let coordinator = EffectCoordinator::with_parts(
                &config,
                page,
                timers,
                Box::new(backend),
                inbox,
                fastrand::Rng::with_seed(seed),
            );
            runtime::install(coordinator);

            wire_keys(&document, sender.clone())?;
            wire_mutations(&document, &config.page, sender.clone())?;
            storage::listen_messages(sender.clone());
            storage::watch_effects(config.storage.effects_key.clone(), sender.clone());

            let key = config.storage.effects_key;
            let default = config.storage.effects_default;
            wasm_bindgen_futures::spawn_local(async move {
                match storage::load_effects_enabled(&key, default).await {
                    Ok(enabled) => {
                        let _ = sender.send(EffectInput::EffectsEnabled(enabled));
                        runtime::wake();
                    }
                    Err(err) => warn!(%err, "effects toggle unavailable; keeping default"),
                }
            });

            info!("glint content script initialized");
            Ok(())
        }

        fn wire_keys(document: &Document, sender: Sender<EffectInput<Element>>) -> Result<(), WebError> {
            let callback = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                let _ = sender.send(EffectInput::Key(event.key()));
                runtime::wake();
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref())?;
            callback.forget();
            Ok(())
        }

        fn wire_mutations(
            document: &Document,
            config: &PageConfig,
            sender: Sender<EffectInput<Element>>,
        ) -> Result<(), WebError> {
            let body = document.body().ok_or(WebError::NoBody)?;
            let callback = Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
                let batch = page::mutation_records(&records);
                if batch.is_empty() {
                    return;
                }
                let _ = sender.send(EffectInput::Mutations(batch));
                runtime::wake();
            }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);
            let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

            let filter: js_sys::Array = config
                .observed_attributes
                .iter()
                .map(|name| JsValue::from_str(name))
                .collect();
            let options = MutationObserverInit::new();
            options.set_child_list(true);
            options.set_subtree(true);
            options.set_character_data(true);
            options.set_attributes(true);
            options.set_attribute_filter(&filter);
            observer.observe_with_options(&body, &options)?;
            callback.forget();
            info!("page observer attached");
            Ok(())
        }
    }
}
