//! Static DOM substitutes shown when an effect runs in `Static` mode.

use anyhow::{anyhow, Result};
use fx_core::fallback::{seeded_particle_markers, timeline_marker_offsets, FallbackMarker};
use fx_core::orbit::ring_layout;
use fx_core::{Theme, TimelineItem};
use web_sys as web;

use crate::constants::*;
use crate::dom;

fn layer(document: &web::Document, parent: &web::HtmlElement) -> Result<web::HtmlElement> {
    let layer = dom::create_html(document, "div")?;
    layer.set_class_name(FALLBACK_LAYER_CLASS);
    let _ = layer.set_attribute("aria-hidden", "true");
    dom::set_styles(
        &layer,
        &[
            ("position", "absolute"),
            ("inset", "0"),
            ("overflow", "hidden"),
            ("pointer-events", "none"),
        ],
    );
    parent
        .append_child(&layer)
        .map_err(|e| anyhow!("append fallback layer: {:?}", e))?;
    Ok(layer)
}

fn append(parent: &web::HtmlElement, child: &web::HtmlElement) -> Result<()> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|e| anyhow!("append: {:?}", e))
}

/// Scattered dots that float via the page's `float` keyframes.
pub fn particle_layer(
    document: &web::Document,
    parent: &web::HtmlElement,
    count: usize,
    seed: u64,
    theme: Theme,
    animate: bool,
) -> Result<web::HtmlElement> {
    let layer = layer(document, parent)?;
    for marker in seeded_particle_markers(count, seed) {
        append(&layer, &particle_marker(document, &marker, theme, animate)?)?;
    }
    Ok(layer)
}

fn particle_marker(
    document: &web::Document,
    m: &FallbackMarker,
    theme: Theme,
    animate: bool,
) -> Result<web::HtmlElement> {
    let el = dom::create_html(document, "div")?;
    el.set_class_name(FALLBACK_MARKER_CLASS);
    let left = format!("{:.2}%", m.x_pct);
    let top = format!("{:.2}%", m.y_pct);
    let size = format!("{:.1}px", m.radius_px * 2.0);
    let opacity = format!("{:.2}", m.opacity);
    let animation = if animate {
        format!(
            "float {:.2}s ease-in-out {:.2}s infinite",
            m.duration_sec, m.delay_sec
        )
    } else {
        "none".to_string()
    };
    dom::set_styles(
        &el,
        &[
            ("position", "absolute"),
            ("left", &left),
            ("top", &top),
            ("width", &size),
            ("height", &size),
            ("border-radius", "50%"),
            ("background", theme.particle_color()),
            ("opacity", &opacity),
            ("animation", &animation),
        ],
    );
    Ok(el)
}

/// Gradient markers down the left edge, one per item, with a native tooltip.
pub fn timeline_layer(
    document: &web::Document,
    parent: &web::HtmlElement,
    items: &[TimelineItem],
    theme: Theme,
) -> Result<web::HtmlElement> {
    let layer = layer(document, parent)?;
    let (from, to) = theme.timeline_fallback_gradient();
    let background = format!("linear-gradient(135deg, {} 0%, {} 100%)", from, to);
    let size = format!("{}px", TIMELINE_FALLBACK_SIZE_PX);
    let offsets = timeline_marker_offsets(items.len());
    for (item, offset) in items.iter().zip(offsets) {
        let el = dom::create_html(document, "div")?;
        el.set_class_name(TIMELINE_FALLBACK_CLASS);
        el.set_title(&item.summary());
        let top = format!("{}px", offset);
        dom::set_styles(
            &el,
            &[
                ("position", "absolute"),
                ("left", "0"),
                ("top", &top),
                ("width", &size),
                ("height", &size),
                ("border-radius", "50%"),
                ("background", &background),
                ("pointer-events", "auto"),
            ],
        );
        append(&layer, &el)?;
    }
    Ok(layer)
}

/// The constellation frozen on its ring: a hub dot and one pill per label.
pub fn orbit_layer(
    document: &web::Document,
    parent: &web::HtmlElement,
    labels: &[String],
    theme: Theme,
) -> Result<web::HtmlElement> {
    let layer = layer(document, parent)?;
    let _ = layer.class_list().add_1(ORBIT_FALLBACK_CLASS);

    let hub = dom::create_html(document, "div")?;
    dom::set_styles(
        &hub,
        &[
            ("position", "absolute"),
            ("left", "50%"),
            ("top", "50%"),
            ("width", "16px"),
            ("height", "16px"),
            ("border-radius", "50%"),
            ("transform", "translate(-50%, -50%)"),
            ("background", theme.hub_color()),
            ("opacity", "0.8"),
        ],
    );
    append(&layer, &hub)?;

    for (label, at) in labels.iter().zip(ring_layout(labels.len())) {
        let pill = dom::create_html(document, "span")?;
        pill.set_text_content(Some(label));
        let left = format!("{:.2}%", 50.0 + at.x * ORBIT_FALLBACK_RING_PCT);
        let top = format!("{:.2}%", 50.0 + at.y * ORBIT_FALLBACK_RING_PCT);
        dom::set_styles(
            &pill,
            &[
                ("position", "absolute"),
                ("left", &left),
                ("top", &top),
                ("transform", "translate(-50%, -50%)"),
                ("padding", "0.25rem 0.75rem"),
                ("border-radius", "999px"),
                ("font-size", "0.8rem"),
                ("white-space", "nowrap"),
                ("background", theme.badge_color(false)),
                ("color", theme.label_color()),
            ],
        );
        append(&layer, &pill)?;
    }
    Ok(layer)
}
