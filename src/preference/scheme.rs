use bevy::prelude::*;

/// OS / browser reported colour-scheme preference, sampled once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemeSignal {
    prefers_dark: Option<bool>,
}

impl SchemeSignal {
    /// Sample the platform setting now.
    pub fn detect() -> Self {
        let prefers_dark = detect_prefers_dark();
        debug!(?prefers_dark, "colour scheme signal sampled");
        Self { prefers_dark }
    }

    pub fn fixed(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: Some(prefers_dark),
        }
    }

    pub fn unavailable() -> Self {
        Self { prefers_dark: None }
    }

    /// `None` when the platform gives no answer.
    pub fn prefers_dark(&self) -> Option<bool> {
        self.prefers_dark
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn detect_prefers_dark() -> Option<bool> {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => Some(true),
        Ok(dark_light::Mode::Light) => Some(false),
        Ok(_) => None,
        Err(e) => {
            debug!("colour scheme detection failed: {e}");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn detect_prefers_dark() -> Option<bool> {
    super::web::prefers_dark()
}
