//! Shared page state behind the exported runtime.
//!
//! A single [`Host`] lives in an `Rc<RefCell<_>>`. Browser callbacks hold a
//! `Weak` to it and borrow only for the duration of one event, so any
//! JavaScript they call out to runs with the borrow released.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::Result;
use fnv::FnvHashMap;
use fx_core::fallback::fallback_marker_count;
use fx_core::parallax::{offset, scroll_progress, Parallax};
use fx_core::{
    select_mode, CapabilityDetector, CapabilityProvider, CapabilitySignal, Effect, EffectId,
    EffectKind, EffectSpec, EnvironmentChange, FrameReport, FxConfig, HighlightState, HoverEvent,
    HoverListener, RenderMode, Stage, TiltEngine,
};
use instant::Instant;
use wasm_bindgen::JsValue;
use web_sys as web;

use crate::capability::WebCapabilityProvider;
use crate::constants::*;
use crate::dom::{self, EventListener};
use crate::fallback;
use crate::frame::{weak_wake, FrameLoop};
use crate::render::{self, Surface};
use crate::tooltip::Tooltip;
use crate::visibility::VisibilityObserver;

pub type SharedHost = Rc<RefCell<Host>>;
pub type Handle = u32;
/// Page callbacks and the hover events they are owed.
pub type HoverDelivery = (Vec<js_sys::Function>, Vec<HoverEvent>);

/// Borrow the host for one callback. Skips silently when the runtime has
/// been dropped or is already borrowed further up the stack.
pub fn with_host<R>(weak: &Weak<RefCell<Host>>, f: impl FnOnce(&mut Host) -> R) -> Option<R> {
    let host = weak.upgrade()?;
    let mut guard = match host.try_borrow_mut() {
        Ok(guard) => guard,
        Err(_) => {
            log::debug!("[runtime] host busy; event dropped");
            return None;
        }
    };
    Some(f(&mut guard))
}

/// A skill chip in the flat list mirrored by a constellation.
pub struct Chip {
    pub element: web::HtmlElement,
    pub label: String,
}

/// A canvas-backed effect and whichever surface currently represents it.
pub struct CanvasMount {
    pub effect: EffectId,
    pub container: web::HtmlElement,
    seed: u64,
    surface: Option<Surface>,
    fallback: Option<web::HtmlElement>,
    pub chips: Vec<Chip>,
    pub highlight: HighlightState,
    pub hover_callbacks: Vec<js_sys::Function>,
    tooltip: Option<Tooltip>,
    pub listeners: Vec<EventListener>,
    pub observer: Option<VisibilityObserver>,
}

impl CanvasMount {
    fn clear_surface(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.remove();
        }
    }

    fn clear_fallback(&mut self) {
        if let Some(layer) = self.fallback.take() {
            layer.remove();
        }
    }

    fn paint_chips(&self) {
        for chip in &self.chips {
            let opacity = format!("{}", self.highlight.chip_opacity(&chip.label));
            dom::set_styles(&chip.element, &[("opacity", &opacity)]);
        }
    }

    fn detach(&mut self) {
        self.clear_surface();
        self.clear_fallback();
        if let Some(tooltip) = self.tooltip.take() {
            tooltip.remove();
        }
        self.highlight.set(None);
        self.paint_chips();
        self.observer = None;
    }
}

/// Pointer-driven 3D tilt on a card.
pub struct TiltMount {
    pub element: web::HtmlElement,
    pub engine: TiltEngine,
    glare: web::HtmlElement,
    pub listeners: Vec<EventListener>,
}

impl TiltMount {
    fn paint(&self) {
        let state = self.engine.state();
        let transform = self.engine.css_transform().unwrap_or_else(|| "none".to_string());
        let transition = if state.hovered {
            TILT_SHADOW_TRANSITION.to_string()
        } else {
            format!("{}, {}", TILT_RETURN_TRANSITION, TILT_SHADOW_TRANSITION)
        };
        let shadow = self.engine.box_shadow();
        dom::set_styles(
            &self.element,
            &[
                ("transform", &transform),
                ("transition", &transition),
                ("box-shadow", &shadow),
            ],
        );
        match self.engine.glare_gradient() {
            Some(gradient) => dom::set_styles(&self.glare, &[("background", &gradient), ("opacity", "1")]),
            None => dom::set_styles(&self.glare, &[("opacity", "0")]),
        }
    }

    fn detach(&mut self) {
        self.engine.pointer_leave();
        self.glare.remove();
        dom::set_styles(
            &self.element,
            &[("transform", "none"), ("box-shadow", ""), ("transition", "")],
        );
    }
}

/// Scroll-linked vertical drift of a section.
pub struct ParallaxMount {
    pub element: web::HtmlElement,
    parallax: Parallax,
    applied: f32,
    pub listeners: Vec<EventListener>,
}

impl ParallaxMount {
    fn update(&mut self, viewport_height: f64, reduced_motion: bool) {
        let rect = dom::client_rect(&self.element);
        // the rect already includes the offset applied last time
        let top = rect.top - self.applied as f64;
        let progress = scroll_progress(top, rect.height, viewport_height);
        let y = offset(progress, self.parallax.strength(), reduced_motion);
        if (y - self.applied).abs() < 0.01 {
            return;
        }
        self.applied = y;
        let transform = if y == 0.0 {
            "none".to_string()
        } else {
            format!("translateY({:.2}px)", y)
        };
        dom::set_styles(&self.element, &[("transform", &transform)]);
    }

    fn detach(&mut self) {
        self.applied = 0.0;
        dom::set_styles(&self.element, &[("transform", "")]);
    }
}

pub enum Mount {
    Canvas(CanvasMount),
    Tilt(TiltMount),
    Parallax(ParallaxMount),
}

impl Mount {
    fn detach(&mut self) {
        match self {
            Mount::Canvas(m) => m.detach(),
            Mount::Tilt(m) => m.detach(),
            Mount::Parallax(m) => m.detach(),
        }
    }
}

/// Pointer phases forwarded to a tilt mount.
#[derive(Clone, Copy, Debug)]
pub enum TiltPointer {
    Enter,
    Move(f64, f64),
    Leave,
}

pub struct Host {
    pub window: web::Window,
    pub document: web::Document,
    pub config: FxConfig,
    pub stage: Stage,
    pub detector: CapabilityDetector,
    live: WebCapabilityProvider,
    clock: Instant,
    seed: u64,
    mounts: FnvHashMap<Handle, Mount>,
    // unmounted while one of their own listeners may still be running
    retired: Vec<Mount>,
    next_handle: Handle,
    pub frames: Weak<FrameLoop>,
    environment: Vec<EventListener>,
    // hover endings found during a frame, delivered once the host is released
    pending_hover: Vec<HoverDelivery>,
}

impl Host {
    pub fn new(window: web::Window, document: web::Document, config: FxConfig) -> Self {
        let detector = CapabilityDetector::new(Box::new(WebCapabilityProvider::new(window.clone())));
        let seed = config.seed.unwrap_or_else(random_seed);
        Self {
            live: WebCapabilityProvider::new(window.clone()),
            stage: Stage::new(config.observer_options()),
            window,
            document,
            config,
            detector,
            clock: Instant::now(),
            seed,
            mounts: FnvHashMap::default(),
            retired: Vec::new(),
            next_handle: 1,
            frames: Weak::new(),
            environment: Vec::new(),
            pending_hover: Vec::new(),
        }
    }

    /// Queue resize and reduced-motion changes for the next frame.
    pub fn listen_environment(&mut self, weak: &Weak<RefCell<Host>>) -> Result<()> {
        let on_resize = {
            let weak = weak.clone();
            EventListener::new(&self.window, "resize", move |_| {
                with_host(&weak, |host| host.environment_changed(EnvironmentChange::Resize));
            })?
        };
        self.environment.push(on_resize);

        if let Some(query) = self.live.reduced_motion_query() {
            let weak = weak.clone();
            let on_change = EventListener::new(&query, "change", move |_| {
                with_host(&weak, |host| {
                    host.environment_changed(EnvironmentChange::MotionPreference)
                });
            })?;
            self.environment.push(on_change);
        }
        Ok(())
    }

    fn environment_changed(&mut self, change: EnvironmentChange) {
        self.detector.notify(change);
        weak_wake(&self.frames);
    }

    pub fn now(&self) -> f64 {
        self.clock.elapsed().as_secs_f64()
    }

    pub fn signal(&self) -> CapabilitySignal {
        self.detector.signal()
    }

    pub fn next_seed(&mut self) -> u64 {
        // splitmix64 step; distinct streams per mount from one page seed
        self.seed = self.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.seed;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_handle(&mut self) -> Handle {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        handle
    }

    /// Whether tilt must stay neutral right now. The motion preference is
    /// read live so a change applies from the very next pointer event.
    pub fn tilt_inert(&self) -> bool {
        self.live.prefers_reduced_motion()
            || select_mode(EffectKind::Tilt, &self.signal()) != RenderMode::Full
    }

    fn parallax_reduced(&self) -> bool {
        self.live.prefers_reduced_motion()
            || select_mode(EffectKind::Parallax, &self.signal()) != RenderMode::Full
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    /// Mount a canvas effect into `container`. Listeners for pointer input
    /// and chips are attached by the caller through [`Host::canvas_mut`].
    pub fn mount_canvas(
        &mut self,
        weak: &Weak<RefCell<Host>>,
        container: web::HtmlElement,
        spec: EffectSpec,
    ) -> Result<Handle> {
        ensure_positioned(&container);
        let kind = spec.kind();
        let now = self.now();
        let signal = self.signal();
        let seed = self.next_seed();
        let effect = self.stage.mount(spec, now, &signal);

        let built = self.build_canvas_mount(weak, container, kind, effect, seed, &signal);
        let mount = match built {
            Ok(mount) => mount,
            Err(e) => {
                let _ = self.stage.unmount(effect);
                return Err(e);
            }
        };
        let handle = self.next_handle();
        self.mounts.insert(handle, Mount::Canvas(mount));
        log::info!("[runtime] handle {} -> effect #{} ({:?})", handle, effect, kind);
        weak_wake(&self.frames);
        Ok(handle)
    }

    fn build_canvas_mount(
        &mut self,
        weak: &Weak<RefCell<Host>>,
        container: web::HtmlElement,
        kind: EffectKind,
        effect: EffectId,
        seed: u64,
        signal: &CapabilitySignal,
    ) -> Result<CanvasMount> {
        let observer = {
            let weak = weak.clone();
            let frames = self.frames.clone();
            VisibilityObserver::observe(&container, self.config.observer_options(), move |visible| {
                let recorded = with_host(&weak, |host| host.stage.record_visibility(effect, visible));
                if let Some(Err(e)) = recorded {
                    log::debug!("[runtime] visibility for retired effect: {}", e);
                }
                if visible {
                    weak_wake(&frames);
                }
            })?
        };
        let tooltip = match kind {
            EffectKind::Timeline => Some(Tooltip::create(&self.document, &container)?),
            _ => None,
        };
        let mut mount = CanvasMount {
            effect,
            container,
            seed,
            surface: None,
            fallback: None,
            chips: Vec::new(),
            highlight: HighlightState::default(),
            hover_callbacks: Vec::new(),
            tooltip,
            listeners: Vec::new(),
            observer: Some(observer),
        };
        present(&self.stage, &self.document, signal, &mut mount)?;
        Ok(mount)
    }

    pub fn mount_tilt(&mut self, element: web::HtmlElement, intensity: Option<f32>) -> Result<Handle> {
        ensure_positioned(&element);
        let glare = dom::create_html(&self.document, "div")?;
        glare.set_class_name(TILT_GLARE_CLASS);
        dom::set_styles(
            &glare,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("border-radius", "inherit"),
                ("pointer-events", "none"),
                ("opacity", "0"),
                ("transition", "opacity 0.3s ease"),
            ],
        );
        element
            .append_child(&glare)
            .map_err(|e| anyhow::anyhow!("append glare: {:?}", e))?;
        dom::set_styles(&element, &[("transform-style", "preserve-3d"), ("will-change", "transform")]);

        let engine = TiltEngine::new(
            intensity.unwrap_or(self.config.tilt_intensity_deg),
            self.config.tilt_shadow_px,
        );
        let mount = TiltMount {
            element,
            engine,
            glare,
            listeners: Vec::new(),
        };
        mount.paint();
        let handle = self.next_handle();
        self.mounts.insert(handle, Mount::Tilt(mount));
        Ok(handle)
    }

    pub fn mount_parallax(&mut self, element: web::HtmlElement, strength: Option<f32>) -> Result<Handle> {
        let mut mount = ParallaxMount {
            element,
            parallax: Parallax::new(strength.unwrap_or(self.config.parallax_strength)),
            applied: 0.0,
            listeners: Vec::new(),
        };
        mount.update(self.viewport_height(), self.parallax_reduced());
        let handle = self.next_handle();
        self.mounts.insert(handle, Mount::Parallax(mount));
        Ok(handle)
    }

    pub fn mount_mut(&mut self, handle: Handle) -> Option<&mut Mount> {
        self.mounts.get_mut(&handle)
    }

    pub fn canvas_mut(&mut self, handle: Handle) -> Option<&mut CanvasMount> {
        match self.mounts.get_mut(&handle) {
            Some(Mount::Canvas(m)) => Some(m),
            _ => None,
        }
    }

    pub fn unmount(&mut self, handle: Handle) -> Result<()> {
        let mut mount = self
            .mounts
            .remove(&handle)
            .ok_or_else(|| anyhow::anyhow!("unknown handle {}", handle))?;
        if let Mount::Canvas(m) = &mount {
            if let Err(e) = self.stage.unmount(m.effect) {
                log::warn!("[runtime] handle {}: {}", handle, e);
            }
        }
        mount.detach();
        self.retired.push(mount);
        weak_wake(&self.frames);
        log::info!("[runtime] unmounted handle {}", handle);
        Ok(())
    }

    pub fn dispose(&mut self) {
        for (_, mut mount) in self.mounts.drain() {
            mount.detach();
            self.retired.push(mount);
        }
        self.stage.clear();
        self.environment.clear();
        if let Some(frames) = self.frames.upgrade() {
            frames.cancel();
        }
        log::info!("[runtime] disposed");
    }

    /// Set (or clear) the highlighted skill of a constellation and its chips.
    pub fn highlight(&mut self, handle: Handle, label: Option<String>) -> Result<()> {
        let Some(Mount::Canvas(m)) = self.mounts.get_mut(&handle) else {
            anyhow::bail!("handle {} is not a constellation", handle);
        };
        self.stage.set_highlighted(m.effect, label.as_deref())?;
        m.highlight.set(label);
        m.paint_chips();
        weak_wake(&self.frames);
        Ok(())
    }

    /// Hit-test the constellation under the pointer (`None` on leave) and
    /// return the hover events together with the page callbacks to notify.
    pub fn orbit_pointer(
        &mut self,
        handle: Handle,
        ev: Option<&web::MouseEvent>,
    ) -> Option<HoverDelivery> {
        let Some(Mount::Canvas(m)) = self.mounts.get_mut(&handle) else {
            return None;
        };
        let target = match (ev, m.surface.as_ref(), self.stage.effect(m.effect)) {
            (Some(ev), Some(surface), Some(Effect::Orbit(orbit))) => {
                render::pick_orbit(surface, orbit, surface.pointer_px(ev))
            }
            _ => None,
        };
        let mut events: Vec<HoverEvent> = Vec::new();
        let mut sink = |e: HoverEvent| events.push(e);
        if let Err(e) = self.stage.hover_orbit(m.effect, target, &mut sink) {
            log::debug!("[runtime] orbit hover: {}", e);
            return None;
        }
        if events.is_empty() {
            return None;
        }
        for event in &events {
            m.highlight.hover_changed(event.clone());
        }
        if let Err(e) = self.stage.set_highlighted(m.effect, m.highlight.current()) {
            log::debug!("[runtime] orbit highlight: {}", e);
        }
        m.paint_chips();
        let cursor = if target.is_some() { "pointer" } else { "" };
        dom::set_styles(&m.container, &[("cursor", cursor)]);
        weak_wake(&self.frames);
        Some((m.hover_callbacks.clone(), events))
    }

    /// Hit-test the timeline under the pointer and move its tooltip.
    pub fn timeline_pointer(&mut self, handle: Handle, ev: Option<&web::MouseEvent>) {
        let Some(Mount::Canvas(m)) = self.mounts.get_mut(&handle) else {
            return;
        };
        let (Some(surface), Some(tooltip)) = (m.surface.as_ref(), m.tooltip.as_ref()) else {
            return;
        };
        let Some(Effect::Timeline(tl)) = self.stage.effect_mut(m.effect) else {
            return;
        };
        let target = ev.and_then(|ev| render::pick_timeline(surface, tl, surface.pointer_px(ev)));
        if !tl.hover(target) {
            return;
        }
        let anchor = target.and_then(|i| render::timeline_anchor(surface, tl, i));
        match (tl.hovered_item(), anchor) {
            (Some(item), Some(px)) => {
                if let Err(e) = tooltip.show(&self.document, item, surface.to_css_px(px)) {
                    log::warn!("[timeline] tooltip: {:#}", e);
                }
            }
            _ => tooltip.hide(),
        }
        weak_wake(&self.frames);
    }

    pub fn tilt_pointer(&mut self, handle: Handle, pointer: TiltPointer) {
        let inert = self.tilt_inert();
        let Some(Mount::Tilt(t)) = self.mounts.get_mut(&handle) else {
            return;
        };
        match pointer {
            TiltPointer::Enter => {
                t.engine.pointer_enter(inert);
            }
            TiltPointer::Move(x, y) => {
                let rect = dom::client_rect(&t.element);
                t.engine.pointer_move(rect, x, y, inert);
            }
            TiltPointer::Leave => {
                t.engine.pointer_leave();
            }
        }
        t.paint();
    }

    pub fn parallax_scroll(&mut self, handle: Handle) {
        let reduced = self.parallax_reduced();
        let viewport_height = self.viewport_height();
        if let Some(Mount::Parallax(p)) = self.mounts.get_mut(&handle) {
            p.update(viewport_height, reduced);
        }
    }

    /// One animation frame. Returns whether another is wanted.
    pub fn frame(&mut self) -> bool {
        self.retired.clear();
        let now = self.now();
        let report = self.stage.tick(now, &mut self.detector);
        self.reconcile(&report);
        self.draw();
        self.stage.has_active() || self.detector.has_pending()
    }

    /// Hover events owed to page callbacks after the last frame.
    pub fn take_pending_hover(&mut self) -> Vec<HoverDelivery> {
        std::mem::take(&mut self.pending_hover)
    }

    fn reconcile(&mut self, report: &FrameReport) {
        let Some(signal) = report.signal else {
            return;
        };
        for change in &report.mode_changes {
            log::info!("[runtime] effect #{} now {:?}", change.id, change.to);
        }
        let tilt_inert = self.tilt_inert();
        let parallax_reduced = self.parallax_reduced();
        let viewport_height = self.viewport_height();
        for mount in self.mounts.values_mut() {
            match mount {
                Mount::Canvas(m) => {
                    if report.hover_ended.contains(&m.effect) {
                        m.highlight.hover_changed(HoverEvent::Unhover);
                        m.paint_chips();
                        dom::set_styles(&m.container, &[("cursor", "")]);
                        self.pending_hover
                            .push((m.hover_callbacks.clone(), vec![HoverEvent::Unhover]));
                    }
                    // static layers depend on the marker count and motion preference
                    if self.stage.mode(m.effect) == Some(RenderMode::Static) {
                        m.clear_fallback();
                    }
                    if let Err(e) = present(&self.stage, &self.document, &signal, m) {
                        log::warn!("[runtime] effect #{} present failed: {:#}", m.effect, e);
                    }
                }
                Mount::Tilt(t) => {
                    if tilt_inert {
                        t.engine.pointer_leave();
                        t.paint();
                    }
                }
                Mount::Parallax(p) => p.update(viewport_height, parallax_reduced),
            }
        }
    }

    fn draw(&self) {
        for mount in self.mounts.values() {
            let Mount::Canvas(m) = mount else {
                continue;
            };
            let Some(surface) = m.surface.as_ref() else {
                continue;
            };
            if !self.stage.gate(m.effect).is_some_and(|g| g.is_visible()) {
                continue;
            }
            match self.stage.effect(m.effect) {
                Some(Effect::Particles(field)) => render::draw_particles(surface, field),
                Some(Effect::Orbit(orbit)) => render::draw_orbit(surface, orbit),
                Some(Effect::Timeline(tl)) => render::draw_timeline(surface, tl),
                None => {}
            }
        }
    }
}

/// Bring a canvas mount's DOM in line with its effect's render mode.
fn present(
    stage: &Stage,
    document: &web::Document,
    signal: &CapabilitySignal,
    m: &mut CanvasMount,
) -> Result<()> {
    match stage.mode(m.effect).unwrap_or(RenderMode::Omitted) {
        RenderMode::Full => {
            m.clear_fallback();
            if m.surface.is_none() {
                let interactive = stage.kind(m.effect) != Some(EffectKind::ParticleField);
                let surface = Surface::create(document, &m.container, interactive)?;
                if let Some(EffectSpec::Timeline { items, .. }) = stage.spec(m.effect) {
                    let width = format!("{}px", TIMELINE_CANVAS_WIDTH_PX);
                    let height = format!("{}px", fx_core::timeline::canvas_height_px(items.len()));
                    dom::set_styles(
                        &surface.canvas,
                        &[("right", "auto"), ("bottom", "auto"), ("width", &width), ("height", &height)],
                    );
                }
                m.surface = Some(surface);
            }
        }
        RenderMode::Static => {
            m.clear_surface();
            if m.fallback.is_none() {
                m.fallback = match stage.spec(m.effect) {
                    Some(EffectSpec::Particles { theme, .. }) => Some(fallback::particle_layer(
                        document,
                        &m.container,
                        fallback_marker_count(signal),
                        m.seed,
                        *theme,
                        !signal.reduced_motion,
                    )?),
                    Some(EffectSpec::Orbit { labels, theme, .. }) => {
                        Some(fallback::orbit_layer(document, &m.container, labels, *theme)?)
                    }
                    Some(EffectSpec::Timeline { items, theme }) => {
                        Some(fallback::timeline_layer(document, &m.container, items, *theme)?)
                    }
                    None => None,
                };
            }
        }
        RenderMode::Omitted => {
            m.clear_surface();
            m.clear_fallback();
        }
    }
    Ok(())
}

fn ensure_positioned(el: &web::HtmlElement) {
    let style = el.style();
    if style.get_property_value("position").unwrap_or_default().is_empty() {
        let _ = style.set_property("position", "relative");
    }
}

fn random_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            log::warn!("[runtime] getrandom failed ({}); using clock seed", e);
            js_sys::Date::now() as u64
        }
    }
}

/// Deliver orbit hover events to page callbacks: the label, or `null`.
pub fn notify_hover(callbacks: &[js_sys::Function], events: &[HoverEvent]) {
    for event in events {
        let arg = match event {
            HoverEvent::Hover(label) => JsValue::from_str(label),
            HoverEvent::Unhover => JsValue::NULL,
        };
        for cb in callbacks {
            if let Err(e) = cb.call1(&JsValue::NULL, &arg) {
                log::warn!("[runtime] hover callback threw: {:?}", e);
            }
        }
    }
}
