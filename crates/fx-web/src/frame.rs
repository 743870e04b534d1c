use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type TickSlot = RefCell<Option<Closure<dyn FnMut()>>>;

/// A `requestAnimationFrame` loop that runs only while there is work.
///
/// The callback returns whether another frame is wanted. Once it says no,
/// the loop goes idle until [`FrameLoop::wake`] is called.
pub struct FrameLoop {
    tick: Rc<TickSlot>,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    pub fn new(mut on_frame: impl FnMut() -> bool + 'static) -> Self {
        let tick: Rc<TickSlot> = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));

        let tick_weak = Rc::downgrade(&tick);
        let pending_tick = pending.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            pending_tick.set(None);
            if on_frame() {
                if let Some(tick) = tick_weak.upgrade() {
                    request(&tick, &pending_tick);
                }
            }
        }) as Box<dyn FnMut()>));

        Self { tick, pending }
    }

    /// Schedule a frame unless one is already pending.
    pub fn wake(&self) {
        request(&self.tick, &self.pending);
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.get().is_some()
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            if let Some(w) = web::window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
        self.tick.borrow_mut().take();
    }
}

fn request(tick: &TickSlot, pending: &Cell<Option<i32>>) {
    if pending.get().is_some() {
        return;
    }
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => pending.set(Some(id)),
            Err(e) => log::warn!("[frame] requestAnimationFrame failed: {:?}", e),
        }
    }
}

pub fn weak_wake(frames: &Weak<FrameLoop>) {
    if let Some(f) = frames.upgrade() {
        f.wake();
    }
}
