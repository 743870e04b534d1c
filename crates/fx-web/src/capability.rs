use anyhow::anyhow;
use fx_core::{CapabilityProvider, FxError, FxResult};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::REDUCED_MOTION_QUERY;

/// Answers capability queries from the live browser environment.
pub struct WebCapabilityProvider {
    window: web::Window,
}

impl WebCapabilityProvider {
    pub fn new(window: web::Window) -> Self {
        Self { window }
    }

    pub fn reduced_motion_query(&self) -> Option<web::MediaQueryList> {
        self.window.match_media(REDUCED_MOTION_QUERY).ok().flatten()
    }

    fn webgl_renderer(&self) -> anyhow::Result<Option<String>> {
        let document = self
            .window
            .document()
            .ok_or_else(|| anyhow!("no document"))?;
        let canvas = document
            .create_element("canvas")
            .map_err(|e| anyhow!("create canvas: {:?}", e))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|e| anyhow!("canvas cast: {:?}", e))?;
        let context = match canvas.get_context("webgl") {
            Ok(Some(ctx)) => Some(ctx),
            Ok(None) => canvas
                .get_context("experimental-webgl")
                .map_err(|e| anyhow!("experimental-webgl: {:?}", e))?,
            Err(e) => return Err(anyhow!("webgl: {:?}", e)),
        };
        let Some(context) = context else {
            return Ok(None);
        };
        let gl = context
            .dyn_into::<web::WebGlRenderingContext>()
            .map_err(|e| anyhow!("webgl cast: {:?}", e))?;
        let renderer = match gl.get_extension("WEBGL_debug_renderer_info") {
            Ok(Some(_)) => gl
                .get_parameter(web::WebglDebugRendererInfo::UNMASKED_RENDERER_WEBGL)
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            _ => String::new(),
        };
        Ok(Some(renderer))
    }
}

impl CapabilityProvider for WebCapabilityProvider {
    fn probe_renderer(&self) -> FxResult<Option<String>> {
        self.webgl_renderer()
            .map_err(|e| FxError::ContextUnavailable(e.to_string()))
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion_query()
            .map(|q| q.matches())
            .unwrap_or(false)
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn logical_processors(&self) -> Option<u32> {
        let n = self.window.navigator().hardware_concurrency();
        (n.is_finite() && n > 0.0).then_some(n as u32)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }
}
