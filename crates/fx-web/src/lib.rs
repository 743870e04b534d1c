#![cfg(target_arch = "wasm32")]
//! Browser host for the folio-fx effects.
//!
//! The page creates one [`FxRuntime`] and mounts effects onto its own
//! elements by id. Every mount returns a handle that can later be unmounted.

mod capability;
mod constants;
mod dom;
mod events;
mod fallback;
mod frame;
mod render;
mod runtime;
mod tooltip;
mod visibility;

use std::cell::RefCell;
use std::rc::Rc;

use fx_core::orbit::select_labels;
use fx_core::{EffectSpec, FxConfig, SkillGroups, Theme, TimelineItem};
use wasm_bindgen::prelude::*;

use crate::dom::js_err;
use crate::frame::FrameLoop;
use crate::runtime::{notify_hover, Handle, Host, SharedHost};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("fx-web starting");
    Ok(())
}

fn init(config_json: Option<&str>) -> anyhow::Result<FxRuntime> {
    let config = match config_json {
        Some(json) => FxConfig::from_json(json)?,
        None => FxConfig::default(),
    };
    let window = dom::window()?;
    let document = dom::document()?;
    let host: SharedHost = Rc::new(RefCell::new(Host::new(window, document, config)));

    let weak = Rc::downgrade(&host);
    let frames = Rc::new(FrameLoop::new(move || {
        let Some(host) = weak.upgrade() else {
            return false;
        };
        let (again, pending) = match host.try_borrow_mut() {
            Ok(mut host) => (host.frame(), host.take_pending_hover()),
            // retry on the next frame
            Err(_) => (true, Vec::new()),
        };
        for (callbacks, events) in &pending {
            notify_hover(callbacks, events);
        }
        again
    }));
    {
        let mut h = host.borrow_mut();
        h.frames = Rc::downgrade(&frames);
        h.listen_environment(&Rc::downgrade(&host))?;
    }
    Ok(FxRuntime { host, frames })
}

#[wasm_bindgen]
pub struct FxRuntime {
    host: SharedHost,
    frames: Rc<FrameLoop>,
}

#[wasm_bindgen]
impl FxRuntime {
    /// Probe the environment once and get ready to mount effects.
    /// `config_json` may override any tuning value; see `FxConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<FxRuntime, JsValue> {
        init(config_json.as_deref()).map_err(|e| {
            log::error!("[runtime] init failed: {:#}", e);
            js_err(e)
        })
    }

    /// Ambient particle field behind `container_id`.
    #[wasm_bindgen(js_name = mountParticles)]
    pub fn mount_particles(&self, container_id: &str, theme: &str) -> Result<Handle, JsValue> {
        let weak = Rc::downgrade(&self.host);
        let mut host = self.host.borrow_mut();
        let container = dom::html_element_by_id(&host.document, container_id).map_err(js_err)?;
        let seed = host.next_seed();
        let spec = EffectSpec::Particles {
            theme: Theme::from_token(theme),
            seed,
        };
        host.mount_canvas(&weak, container, spec).map_err(js_err)
    }

    /// Skill constellation built from `skills_json`, a map of category to
    /// skill names. Chips matching `chips_selector` are dimmed and
    /// highlighted together with the orbit.
    #[wasm_bindgen(js_name = mountConstellation)]
    pub fn mount_constellation(
        &self,
        container_id: &str,
        skills_json: &str,
        theme: &str,
        chips_selector: Option<String>,
    ) -> Result<Handle, JsValue> {
        let groups = SkillGroups::from_json(skills_json).map_err(|e| js_err(e.into()))?;
        let weak = Rc::downgrade(&self.host);
        let mut host = self.host.borrow_mut();
        let container = dom::html_element_by_id(&host.document, container_id).map_err(js_err)?;
        let spec = EffectSpec::Orbit {
            labels: select_labels(&groups),
            radius: host.config.orbit_radius,
            theme: Theme::from_token(theme),
        };
        let handle = host
            .mount_canvas(&weak, container.clone(), spec)
            .map_err(js_err)?;

        let mut listeners = events::constellation(&weak, handle, &container).map_err(js_err)?;
        let chips = match chips_selector.as_deref() {
            Some(selector) => {
                let (chips, chip_listeners) =
                    events::chips(&weak, handle, &host.document, selector).map_err(js_err)?;
                listeners.extend(chip_listeners);
                chips
            }
            None => Vec::new(),
        };
        if let Some(m) = host.canvas_mut(handle) {
            m.listeners.extend(listeners);
            m.chips = chips;
        }
        Ok(handle)
    }

    /// Drive a constellation's highlight from the page, e.g. from its own
    /// chip list. `null` clears it.
    #[wasm_bindgen(js_name = setHighlighted)]
    pub fn set_highlighted(&self, handle: Handle, label: Option<String>) -> Result<(), JsValue> {
        self.host.borrow_mut().highlight(handle, label).map_err(js_err)
    }

    /// Call `callback(label | null)` whenever the orbit hover changes.
    #[wasm_bindgen(js_name = onHover)]
    pub fn on_hover(&self, handle: Handle, callback: js_sys::Function) -> Result<(), JsValue> {
        let mut host = self.host.borrow_mut();
        let m = host
            .canvas_mut(handle)
            .ok_or_else(|| JsValue::from_str("handle is not a constellation"))?;
        m.hover_callbacks.push(callback);
        Ok(())
    }

    /// Experience or education timeline from `items_json`.
    #[wasm_bindgen(js_name = mountTimeline)]
    pub fn mount_timeline(&self, container_id: &str, items_json: &str, theme: &str) -> Result<Handle, JsValue> {
        let items = TimelineItem::list_from_json(items_json).map_err(|e| js_err(e.into()))?;
        let weak = Rc::downgrade(&self.host);
        let mut host = self.host.borrow_mut();
        let container = dom::html_element_by_id(&host.document, container_id).map_err(js_err)?;
        let spec = EffectSpec::Timeline {
            items,
            theme: Theme::from_token(theme),
        };
        let handle = host
            .mount_canvas(&weak, container.clone(), spec)
            .map_err(js_err)?;
        let listeners = events::timeline(&weak, handle, &container).map_err(js_err)?;
        if let Some(m) = host.canvas_mut(handle) {
            m.listeners.extend(listeners);
        }
        Ok(handle)
    }

    #[wasm_bindgen(js_name = mountTilt)]
    pub fn mount_tilt(&self, element_id: &str, intensity: Option<f32>) -> Result<Handle, JsValue> {
        let weak = Rc::downgrade(&self.host);
        let mut host = self.host.borrow_mut();
        let element = dom::html_element_by_id(&host.document, element_id).map_err(js_err)?;
        let handle = host.mount_tilt(element.clone(), intensity).map_err(js_err)?;
        let listeners = events::tilt(&weak, handle, &element).map_err(js_err)?;
        if let Some(runtime::Mount::Tilt(t)) = host.mount_mut(handle) {
            t.listeners = listeners;
        }
        Ok(handle)
    }

    #[wasm_bindgen(js_name = mountParallax)]
    pub fn mount_parallax(&self, element_id: &str, strength: Option<f32>) -> Result<Handle, JsValue> {
        let weak = Rc::downgrade(&self.host);
        let mut host = self.host.borrow_mut();
        let element = dom::html_element_by_id(&host.document, element_id).map_err(js_err)?;
        let handle = host.mount_parallax(element, strength).map_err(js_err)?;
        let listeners = events::parallax(&weak, handle, &host.window).map_err(js_err)?;
        if let Some(runtime::Mount::Parallax(p)) = host.mount_mut(handle) {
            p.listeners = listeners;
        }
        Ok(handle)
    }

    pub fn unmount(&self, handle: Handle) -> Result<(), JsValue> {
        self.host.borrow_mut().unmount(handle).map_err(js_err)
    }

    /// Tear everything down. The runtime is inert afterwards.
    pub fn dispose(&self) {
        self.frames.cancel();
        self.host.borrow_mut().dispose();
    }

    /// Whether an animation frame is currently scheduled.
    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.frames.is_scheduled()
    }
}
