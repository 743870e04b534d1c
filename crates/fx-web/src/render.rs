//! Canvas 2D drawing of the running simulators.
//!
//! Each effect projects its scene-space state through the matching
//! [`Camera`] preset and paints simple discs, lines and labels.

use std::f64::consts::TAU;

use anyhow::{anyhow, Result};
use fx_core::camera::{pick_nearest, Camera, ScreenPoint};
use fx_core::constants::{HUB_SPOKES, HUB_SPOKE_LENGTH, ORBIT_NODE_RADIUS};
use fx_core::{OrbitEngine, ParticleField, TimelineNodes};
use glam::{Mat3, Vec2, Vec3};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::*;
use crate::dom;

/// A canvas layered over its container, with a 2D context.
pub struct Surface {
    pub canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
}

impl Surface {
    pub fn create(document: &web::Document, parent: &web::HtmlElement, interactive: bool) -> Result<Self> {
        let canvas = document
            .create_element("canvas")
            .map_err(|e| anyhow!("create canvas: {:?}", e))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|e| anyhow!("canvas cast: {:?}", e))?;
        dom::set_styles(
            &canvas,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("width", "100%"),
                ("height", "100%"),
                ("background", "transparent"),
                ("pointer-events", if interactive { "auto" } else { "none" }),
            ],
        );
        parent
            .append_child(&canvas)
            .map_err(|e| anyhow!("append canvas: {:?}", e))?;
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow!("2d context: {:?}", e))?
            .ok_or_else(|| anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow!("2d context cast: {:?}", e))?;
        dom::sync_canvas_backing_size(&canvas);
        Ok(Self { canvas, ctx })
    }

    pub fn remove(&self) {
        self.canvas.remove();
    }

    pub fn size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn aspect(&self) -> f32 {
        let (w, h) = self.size();
        w / h.max(1.0)
    }

    /// Canvas pixel position under a pointer event.
    pub fn pointer_px(&self, ev: &web::MouseEvent) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        let x_css = ev.client_x() as f32 - rect.left() as f32;
        let y_css = ev.client_y() as f32 - rect.top() as f32;
        let sx = (x_css / rect.width().max(1.0) as f32) * self.canvas.width() as f32;
        let sy = (y_css / rect.height().max(1.0) as f32) * self.canvas.height() as f32;
        Vec2::new(sx, sy)
    }

    /// Convert a canvas pixel back to CSS pixels relative to the canvas.
    pub fn to_css_px(&self, p: Vec2) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        let (w, h) = self.size();
        Vec2::new(
            p.x / w.max(1.0) * rect.width() as f32,
            p.y / h.max(1.0) * rect.height() as f32,
        )
    }

    fn begin(&self) -> (f32, f32) {
        dom::sync_canvas_backing_size(&self.canvas);
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        (w, h)
    }

    fn disc(&self, at: Vec2, radius: f32, color: &str, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(at.x as f64, at.y as f64, radius.max(0.5) as f64, 0.0, TAU);
        self.ctx.fill();
    }
}

pub fn draw_particles(surface: &Surface, field: &ParticleField) {
    let (w, h) = surface.begin();
    let camera = Camera::particles(surface.aspect());
    let (rx, ry) = field.rotation();
    let rotation = Mat3::from_rotation_x(rx) * Mat3::from_rotation_y(ry);
    let color = field.color();

    let _ = surface.ctx.set_global_composite_operation("lighter");
    for p in field.positions() {
        if let Some(sp) = camera.project(rotation * *p, w, h) {
            let r = PARTICLE_POINT_SIZE * 0.5 * sp.px_per_unit;
            surface.disc(sp.px, r, color, PARTICLE_ALPHA);
        }
    }
    let _ = surface.ctx.set_global_composite_operation("source-over");
    surface.ctx.set_global_alpha(1.0);
}

fn orbit_projection(surface: &Surface, orbit: &OrbitEngine) -> Vec<(usize, ScreenPoint)> {
    let (w, h) = surface.size();
    let camera = Camera::orbit(surface.aspect());
    let mut projected: Vec<(usize, ScreenPoint)> = (0..orbit.nodes().len())
        .filter_map(|i| {
            let world = orbit.world_position(i)?;
            camera.project(world, w, h).map(|sp| (i, sp))
        })
        .collect();
    // far to near
    projected.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));
    projected
}

pub fn draw_orbit(surface: &Surface, orbit: &OrbitEngine) {
    let (w, h) = surface.begin();
    let camera = Camera::orbit(surface.aspect());
    let Some(center) = camera.project(Vec3::ZERO, w, h) else {
        return;
    };
    let badges = orbit_projection(surface, orbit);
    let (behind, front): (Vec<_>, Vec<_>) =
        badges.into_iter().partition(|(_, sp)| sp.depth > center.depth);

    for (i, sp) in &behind {
        draw_badge(surface, orbit, *i, sp);
    }
    draw_hub(surface, orbit, &camera, &center, w, h);
    for (i, sp) in &front {
        draw_badge(surface, orbit, *i, sp);
    }
    surface.ctx.set_global_alpha(1.0);
}

fn draw_hub(surface: &Surface, orbit: &OrbitEngine, camera: &Camera, center: &ScreenPoint, w: f32, h: f32) {
    let theme = orbit.theme();
    let hub = orbit.hub();
    let rotation = Mat3::from_rotation_y(orbit.scene_spin() + hub.spin);
    let ctx = &surface.ctx;

    ctx.set_global_alpha(HUB_SPOKE_ALPHA);
    ctx.set_stroke_style_str(theme.hub_color());
    ctx.set_line_width(1.0);
    ctx.begin_path();
    for i in 0..HUB_SPOKES {
        let a = i as f32 / HUB_SPOKES as f32 * std::f32::consts::TAU;
        let end = rotation * Vec3::new(a.cos(), 0.0, a.sin()) * HUB_SPOKE_LENGTH * hub.scale;
        if let Some(sp) = camera.project(end, w, h) {
            ctx.move_to(center.px.x as f64, center.px.y as f64);
            ctx.line_to(sp.px.x as f64, sp.px.y as f64);
        }
    }
    ctx.stroke();

    let unit = center.px_per_unit * hub.scale;
    surface.disc(center.px, HUB_OUTER_RADIUS * unit, theme.hub_color(), HUB_OUTER_ALPHA);
    surface.disc(center.px, HUB_CORE_RADIUS * unit, theme.hub_color(), HUB_CORE_ALPHA);
}

fn draw_badge(surface: &Surface, orbit: &OrbitEngine, index: usize, sp: &ScreenPoint) {
    let Some(node) = orbit.nodes().get(index) else {
        return;
    };
    let theme = orbit.theme();
    let color = theme.badge_color(node.highlighted);
    let unit = sp.px_per_unit * node.scale;
    let glow_alpha = if node.highlighted {
        BADGE_GLOW_ALPHA_ACTIVE
    } else {
        BADGE_GLOW_ALPHA_IDLE
    };
    surface.disc(sp.px, BADGE_GLOW_RADIUS * unit, color, glow_alpha);
    surface.disc(sp.px, ORBIT_NODE_RADIUS * unit, color, BADGE_ALPHA);

    let ctx = &surface.ctx;
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(theme.label_color());
    ctx.set_font(&format!("500 {:.0}px Inter, sans-serif", BADGE_LABEL_SIZE * unit));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text_with_max_width(
        &node.label,
        sp.px.x as f64,
        sp.px.y as f64,
        (2.0 * ORBIT_NODE_RADIUS * unit) as f64,
    );
}

/// Orbit node under canvas pixel `at`, nearest first.
pub fn pick_orbit(surface: &Surface, orbit: &OrbitEngine, at: Vec2) -> Option<usize> {
    let (w, h) = surface.size();
    let camera = Camera::orbit(surface.aspect());
    let (ro, rd) = camera.screen_ray(at.x, at.y, w, h);
    // one entry per node so the picked index matches the node index
    let spheres = orbit.nodes().iter().map(|node| {
        let center = orbit.world_position(node.index).unwrap_or_default();
        (center, ORBIT_NODE_RADIUS * node.scale)
    });
    pick_nearest(ro, rd, spheres)
}

fn timeline_world(tl: &TimelineNodes, index: usize) -> Option<Vec3> {
    let node = tl.nodes().get(index)?;
    Some(Mat3::from_rotation_z(tl.sway()) * Vec3::new(0.0, node.height, 0.0))
}

pub fn draw_timeline(surface: &Surface, tl: &TimelineNodes) {
    let (w, h) = surface.begin();
    let camera = Camera::timeline(surface.aspect());
    let theme = tl.theme();
    let ctx = &surface.ctx;

    for node in tl.nodes() {
        let Some(world) = timeline_world(tl, node.index) else {
            continue;
        };
        let Some(sp) = camera.project(world, w, h) else {
            continue;
        };
        let halo_alpha = if node.hovered {
            TIMELINE_HALO_ALPHA_ACTIVE
        } else {
            TIMELINE_HALO_ALPHA_IDLE
        };
        surface.disc(
            sp.px,
            TIMELINE_HALO_RADIUS * sp.px_per_unit,
            theme.timeline_ring(),
            halo_alpha,
        );

        ctx.set_shadow_color(theme.timeline_glow());
        ctx.set_shadow_blur((node.glow * 16.0) as f64);
        surface.disc(
            sp.px,
            TIMELINE_NODE_RADIUS * sp.px_per_unit * node.scale,
            theme.timeline_color(),
            TIMELINE_NODE_ALPHA,
        );
        ctx.set_shadow_blur(0.0);
    }
    ctx.set_global_alpha(1.0);
}

pub fn pick_timeline(surface: &Surface, tl: &TimelineNodes, at: Vec2) -> Option<usize> {
    let (w, h) = surface.size();
    let camera = Camera::timeline(surface.aspect());
    let (ro, rd) = camera.screen_ray(at.x, at.y, w, h);
    let spheres = (0..tl.len()).map(|i| {
        (timeline_world(tl, i).unwrap_or_default(), TIMELINE_HALO_RADIUS)
    });
    pick_nearest(ro, rd, spheres)
}

/// Canvas pixel position of a timeline node, for anchoring its tooltip.
pub fn timeline_anchor(surface: &Surface, tl: &TimelineNodes, index: usize) -> Option<Vec2> {
    let (w, h) = surface.size();
    let camera = Camera::timeline(surface.aspect());
    let world = timeline_world(tl, index)?;
    camera.project(world, w, h).map(|sp| sp.px)
}
