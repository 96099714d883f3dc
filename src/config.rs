//! Configuration types for a site export run.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across runs, log them, and diff two runs to understand
//! why their archives differ.
//!
//! The defaults reproduce the reference capture setup exactly: a 1400×800
//! viewport, a 100 px / 100 ms scroll sweep with a 1 s dwell at the bottom,
//! and a best-effort click on the Cookiebot "allow all" control.

use crate::error::ExportError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Cookiebot's "allow all" button, the consent control the reference
/// pipeline dismisses before capturing.
pub const DEFAULT_CONSENT_SELECTOR: &str =
    "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll";

/// What to do when a non-essential stage fails.
///
/// The reference behaviour swallows exactly one failure (the consent
/// lookup) and aborts on everything else. Making that an explicit policy
/// on the config keeps the choice visible instead of being an accident of
/// which call happens to be wrapped in a catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Log the failure and keep going. (default for the consent stage)
    #[default]
    Continue,
    /// Propagate the failure and abort the run.
    Abort,
}

/// Configuration for an export run.
///
/// Built via [`ExportConfig::builder()`] or [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use site2zip::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .viewport(1400, 800)
///     .scroll_step(100)
///     .consent_wait_ms(3000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Browser window and page viewport width in logical pixels. Default: 1400.
    pub viewport_width: u32,

    /// Browser window and page viewport height in logical pixels. Default: 800.
    pub viewport_height: u32,

    /// Scroll advance per sweep step, in CSS pixels. Default: 100.
    ///
    /// Small steps fire every lazy-load trigger on the way down; a large
    /// step can jump past an IntersectionObserver threshold and leave a
    /// placeholder in the capture.
    pub scroll_step: u32,

    /// Delay between sweep steps in milliseconds. Default: 100.
    pub scroll_delay_ms: u64,

    /// Dwell at the bottom of the page before ascending, in milliseconds.
    /// Default: 1000.
    ///
    /// Gives in-flight lazy content (images, infinite-scroll sections) time
    /// to finish loading while the full page height is in view.
    pub bottom_dwell_ms: u64,

    /// CSS selector of the cookie-consent control to click before capture.
    /// Default: [`DEFAULT_CONSENT_SELECTOR`].
    pub consent_selector: String,

    /// How long to poll for the consent control, in milliseconds. Default: 3000.
    ///
    /// Bounded on purpose — most pages never show the dialog and the run
    /// should not stall on every one of them.
    pub consent_wait_ms: u64,

    /// Failure policy for the consent stage. Default: [`ErrorPolicy::Continue`].
    ///
    /// Every other stage always aborts the run on failure.
    pub consent_policy: ErrorPolicy,

    /// Listing endpoint page size. Default: 100.
    ///
    /// Only the first page is ever requested; items beyond this count are
    /// dropped, matching the reference resolver.
    pub listing_page_size: usize,

    /// Explicit Chrome/Chromium executable. If `None`, chromiumoxide probes
    /// the usual install locations.
    pub chrome_executable: Option<PathBuf>,

    /// Per-destination progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1400,
            viewport_height: 800,
            scroll_step: 100,
            scroll_delay_ms: 100,
            bottom_dwell_ms: 1000,
            consent_selector: DEFAULT_CONSENT_SELECTOR.to_string(),
            consent_wait_ms: 3000,
            consent_policy: ErrorPolicy::Continue,
            listing_page_size: 100,
            chrome_executable: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("viewport_width", &self.viewport_width)
            .field("viewport_height", &self.viewport_height)
            .field("scroll_step", &self.scroll_step)
            .field("scroll_delay_ms", &self.scroll_delay_ms)
            .field("bottom_dwell_ms", &self.bottom_dwell_ms)
            .field("consent_selector", &self.consent_selector)
            .field("consent_wait_ms", &self.consent_wait_ms)
            .field("consent_policy", &self.consent_policy)
            .field("listing_page_size", &self.listing_page_size)
            .field("chrome_executable", &self.chrome_executable)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    /// Viewport size in logical pixels. Validated by [`Self::build`]:
    /// both dimensions must be non-zero.
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn scroll_step(mut self, px: u32) -> Self {
        self.config.scroll_step = px.max(1);
        self
    }

    pub fn scroll_delay_ms(mut self, ms: u64) -> Self {
        self.config.scroll_delay_ms = ms;
        self
    }

    pub fn bottom_dwell_ms(mut self, ms: u64) -> Self {
        self.config.bottom_dwell_ms = ms;
        self
    }

    pub fn consent_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.consent_selector = selector.into();
        self
    }

    pub fn consent_wait_ms(mut self, ms: u64) -> Self {
        self.config.consent_wait_ms = ms;
        self
    }

    pub fn consent_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.consent_policy = policy;
        self
    }

    pub fn listing_page_size(mut self, n: usize) -> Self {
        self.config.listing_page_size = n.max(1);
        self
    }

    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_executable = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        let c = &self.config;
        if c.viewport_width == 0 || c.viewport_height == 0 {
            return Err(ExportError::InvalidConfig(format!(
                "Viewport must be non-zero, got {}x{}",
                c.viewport_width, c.viewport_height
            )));
        }
        if c.consent_selector.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "Consent selector must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
