use anyhow::{anyhow, Result};
use fx_core::TimelineItem;
use glam::Vec2;
use web_sys as web;

use crate::dom;

const HIGHLIGHTS_SHOWN: usize = 2;

/// Floating card describing the hovered timeline entry.
pub struct Tooltip {
    root: web::HtmlElement,
}

impl Tooltip {
    pub fn create(document: &web::Document, parent: &web::HtmlElement) -> Result<Self> {
        let root = dom::create_html(document, "div")?;
        root.set_class_name("fx-timeline-tooltip");
        let _ = root.set_attribute("role", "tooltip");
        dom::set_styles(
            &root,
            &[
                ("position", "absolute"),
                ("display", "none"),
                ("max-width", "18rem"),
                ("padding", "0.75rem 1rem"),
                ("border-radius", "0.5rem"),
                ("background", "rgba(0, 0, 0, 0.85)"),
                ("color", "#ffffff"),
                ("font-size", "0.85rem"),
                ("pointer-events", "none"),
                ("z-index", "10"),
            ],
        );
        parent
            .append_child(&root)
            .map_err(|e| anyhow!("append tooltip: {:?}", e))?;
        Ok(Self { root })
    }

    /// Fill and show the card with its top-left corner near `at` (CSS px).
    pub fn show(&self, document: &web::Document, item: &TimelineItem, at: Vec2) -> Result<()> {
        self.root.set_text_content(None);
        self.line(document, "strong", &item.title)?;
        self.line(document, "div", item.subtitle())?;
        self.line(document, "div", &item.period)?;
        if !item.highlights.is_empty() {
            let list = dom::create_html(document, "ul")?;
            dom::set_styles(&list, &[("margin", "0.5rem 0 0"), ("padding-left", "1rem")]);
            for h in item.highlights.iter().take(HIGHLIGHTS_SHOWN) {
                let li = dom::create_html(document, "li")?;
                li.set_text_content(Some(h));
                list.append_child(&li)
                    .map_err(|e| anyhow!("append highlight: {:?}", e))?;
            }
            self.root
                .append_child(&list)
                .map_err(|e| anyhow!("append highlights: {:?}", e))?;
        }
        let left = format!("{:.0}px", at.x + 20.0);
        let top = format!("{:.0}px", at.y - 20.0);
        dom::set_styles(&self.root, &[("left", &left), ("top", &top), ("display", "block")]);
        Ok(())
    }

    pub fn hide(&self) {
        dom::set_styles(&self.root, &[("display", "none")]);
    }

    pub fn remove(&self) {
        self.root.remove();
    }

    fn line(&self, document: &web::Document, tag: &str, text: &str) -> Result<()> {
        let el = dom::create_html(document, tag)?;
        el.set_text_content(Some(text));
        if tag == "div" {
            dom::set_styles(&el, &[("opacity", "0.8")]);
        }
        self.root
            .append_child(&el)
            .map_err(|e| anyhow!("append tooltip line: {:?}", e))?;
        Ok(())
    }
}
