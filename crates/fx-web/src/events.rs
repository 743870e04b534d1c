//! Page input wiring. Each listener borrows the host for one event only.

use std::cell::RefCell;
use std::rc::Weak;

use anyhow::{anyhow, Result};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::{CHIP_LABEL_ATTR, CHIP_OPACITY_TRANSITION};
use crate::dom::{self, EventListener};
use crate::runtime::{notify_hover, with_host, Chip, Handle, Host, TiltPointer};

type WeakHost = Weak<RefCell<Host>>;

fn pointer_event(ev: &web::Event) -> Option<&web::MouseEvent> {
    ev.dyn_ref::<web::MouseEvent>()
}

/// Hover picking over a constellation canvas.
pub fn constellation(weak: &WeakHost, handle: Handle, container: &web::HtmlElement) -> Result<Vec<EventListener>> {
    let on_move = {
        let weak = weak.clone();
        EventListener::new(container, "pointermove", move |ev| {
            let pending = with_host(&weak, |h| h.orbit_pointer(handle, pointer_event(&ev))).flatten();
            if let Some((callbacks, events)) = pending {
                notify_hover(&callbacks, &events);
            }
        })?
    };
    let on_leave = {
        let weak = weak.clone();
        EventListener::new(container, "pointerleave", move |_| {
            let pending = with_host(&weak, |h| h.orbit_pointer(handle, None)).flatten();
            if let Some((callbacks, events)) = pending {
                notify_hover(&callbacks, &events);
            }
        })?
    };
    Ok(vec![on_move, on_leave])
}

pub fn timeline(weak: &WeakHost, handle: Handle, container: &web::HtmlElement) -> Result<Vec<EventListener>> {
    let on_move = {
        let weak = weak.clone();
        EventListener::new(container, "pointermove", move |ev| {
            with_host(&weak, |h| h.timeline_pointer(handle, pointer_event(&ev)));
        })?
    };
    let on_leave = {
        let weak = weak.clone();
        EventListener::new(container, "pointerleave", move |_| {
            with_host(&weak, |h| h.timeline_pointer(handle, None));
        })?
    };
    Ok(vec![on_move, on_leave])
}

fn chip_label(el: &web::HtmlElement) -> Option<String> {
    let label = el
        .get_attribute(CHIP_LABEL_ATTR)
        .or_else(|| el.text_content())?
        .trim()
        .to_string();
    (!label.is_empty()).then_some(label)
}

/// Collect the chips matching `selector` and highlight on hover.
pub fn chips(
    weak: &WeakHost,
    handle: Handle,
    document: &web::Document,
    selector: &str,
) -> Result<(Vec<Chip>, Vec<EventListener>)> {
    let nodes = document
        .query_selector_all(selector)
        .map_err(|e| anyhow!("bad chip selector '{}': {:?}", selector, e))?;
    let mut chips = Vec::new();
    let mut listeners = Vec::new();
    for i in 0..nodes.length() {
        let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<web::HtmlElement>().ok()) else {
            continue;
        };
        let Some(label) = chip_label(&element) else {
            continue;
        };
        dom::set_styles(&element, &[("transition", CHIP_OPACITY_TRANSITION)]);

        let enter = {
            let weak = weak.clone();
            let label = label.clone();
            EventListener::new(&element, "mouseenter", move |_| {
                if let Some(Err(e)) = with_host(&weak, |h| h.highlight(handle, Some(label.clone()))) {
                    log::warn!("[chips] {:#}", e);
                }
            })?
        };
        let leave = {
            let weak = weak.clone();
            EventListener::new(&element, "mouseleave", move |_| {
                if let Some(Err(e)) = with_host(&weak, |h| h.highlight(handle, None)) {
                    log::warn!("[chips] {:#}", e);
                }
            })?
        };
        listeners.push(enter);
        listeners.push(leave);
        chips.push(Chip { element, label });
    }
    log::info!("[chips] {} chips bound to handle {}", chips.len(), handle);
    Ok((chips, listeners))
}

pub fn tilt(weak: &WeakHost, handle: Handle, element: &web::HtmlElement) -> Result<Vec<EventListener>> {
    let bind = |kind: &'static str, pointer: fn(&web::Event) -> Option<TiltPointer>| {
        let weak = weak.clone();
        EventListener::new(element, kind, move |ev| {
            if let Some(p) = pointer(&ev) {
                with_host(&weak, |h| h.tilt_pointer(handle, p));
            }
        })
    };
    Ok(vec![
        bind("mouseenter", |_| Some(TiltPointer::Enter))?,
        bind("mousemove", |ev| {
            pointer_event(ev).map(|m| TiltPointer::Move(m.client_x() as f64, m.client_y() as f64))
        })?,
        bind("mouseleave", |_| Some(TiltPointer::Leave))?,
    ])
}

pub fn parallax(weak: &WeakHost, handle: Handle, window: &web::Window) -> Result<Vec<EventListener>> {
    let mut listeners = Vec::with_capacity(2);
    for kind in ["scroll", "resize"] {
        let weak = weak.clone();
        listeners.push(EventListener::new(window, kind, move |_| {
            with_host(&weak, |h| h.parallax_scroll(handle));
        })?);
    }
    Ok(listeners)
}
