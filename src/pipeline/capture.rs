//! Page capture: one browser session per destination, screenshot to a
//! temp-file raster.
//!
//! ## Session lifecycle
//!
//! Every destination gets a fresh headless Chrome session — launch, capture,
//! teardown. Sessions are deliberately not reused: a crashed or wedged
//! renderer then only costs the one destination that hit it. The fallible
//! steps run in an inner function so [`BrowserSession::close`] executes on
//! every exit path before the result is unwound with `?`.
//!
//! ## Raster ownership
//!
//! The screenshot lands in a [`RasterHandle`] wrapping a `NamedTempFile`.
//! The handle is created before capture and explicitly closed by the
//! orchestrator after conversion; a close failure is fatal. Owning the file
//! per destination removes any cross-iteration path sharing and leaves the
//! door open for parallel capture later.

use crate::config::{ErrorPolicy, ExportConfig};
use crate::error::ExportError;
use crate::pipeline::scroll;
use crate::pipeline::source::Destination;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Poll interval while waiting for the consent control to appear.
const CONSENT_POLL_MS: u64 = 200;

/// An owned raster screenshot on disk, scoped to one destination.
///
/// Dropping the handle removes the file; [`RasterHandle::close`] removes it
/// explicitly so a deletion failure is observable instead of silent.
pub struct RasterHandle {
    file: NamedTempFile,
}

impl RasterHandle {
    fn create() -> Result<Self, ExportError> {
        let file = tempfile::Builder::new()
            .prefix("site2zip-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ExportError::Internal(format!("tempfile: {e}")))?;
        Ok(Self { file })
    }

    /// Path of the raster file while the handle is alive.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the raster file, surfacing any deletion failure.
    pub fn close(self) -> Result<(), ExportError> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|source| ExportError::Cleanup { path, source })
    }
}

/// A scoped headless-browser session: launch once, capture, always close.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a headless browser with the configured window and viewport.
    pub async fn launch(config: &ExportConfig) -> Result<Self, ExportError> {
        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Default::default()
            });
        if let Some(ref path) = config.chrome_executable {
            builder = builder.chrome_executable(path.as_path());
        }
        let browser_config = builder
            .build()
            .map_err(|detail| ExportError::BrowserLaunch { detail })?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ExportError::BrowserLaunch {
                detail: e.to_string(),
            })?;

        // Drive the CDP event loop until the browser goes away.
        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Tear the session down, releasing the browser process.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Browser did not exit cleanly: {e}");
        }
        self.handler_task.abort();
    }
}

/// Capture one destination as a full-page PNG raster.
///
/// Launches an isolated session, navigates with no timeout ceiling,
/// best-effort dismisses the cookie-consent control, runs the scroll sweep,
/// then screenshots the entire scrollable area. The session is torn down on
/// every exit path.
pub async fn capture_page(
    dest: &Destination,
    config: &ExportConfig,
) -> Result<RasterHandle, ExportError> {
    let session = BrowserSession::launch(config).await?;
    let result = capture_in_session(&session, dest, config).await;
    session.close().await;
    result
}

async fn capture_in_session(
    session: &BrowserSession,
    dest: &Destination,
    config: &ExportConfig,
) -> Result<RasterHandle, ExportError> {
    let page = session
        .browser
        .new_page("about:blank")
        .await
        .map_err(|e| ExportError::BrowserLaunch {
            detail: format!("new page: {e}"),
        })?;

    page.goto(dest.as_str())
        .await
        .map_err(|e| ExportError::Navigation {
            url: dest.to_string(),
            detail: e.to_string(),
        })?;
    // No ceiling here: a slow destination is allowed to take as long as it
    // needs to finish loading.
    page.wait_for_navigation()
        .await
        .map_err(|e| ExportError::Navigation {
            url: dest.to_string(),
            detail: e.to_string(),
        })?;

    match dismiss_consent(&page, config).await {
        Ok(true) => info!("Clicked cookie consent control on {dest}"),
        Ok(false) => debug!("Cookie consent control not found on {dest}"),
        Err(e) => match config.consent_policy {
            ErrorPolicy::Continue => {
                info!("Cookie consent control not dismissed on {dest}: {e}")
            }
            ErrorPolicy::Abort => return Err(e),
        },
    }

    scroll::settle(&page, dest, config).await?;

    let raster = RasterHandle::create()?;
    let png = page
        .screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(true)
                .build(),
        )
        .await
        .map_err(|e| ExportError::Capture {
            url: dest.to_string(),
            detail: e.to_string(),
        })?;

    tokio::fs::write(raster.path(), &png)
        .await
        .map_err(|e| ExportError::Capture {
            url: dest.to_string(),
            detail: format!("writing raster: {e}"),
        })?;

    debug!("Captured {dest} → {} ({} bytes)", raster.path().display(), png.len());
    Ok(raster)
}

/// Poll for the consent control and click it.
///
/// Returns `Ok(true)` if clicked, `Ok(false)` if it never appeared within
/// the bounded wait. A click failure is an `Err` so the configured
/// [`ErrorPolicy`] can decide its fate.
async fn dismiss_consent(page: &Page, config: &ExportConfig) -> Result<bool, ExportError> {
    let deadline = Instant::now() + Duration::from_millis(config.consent_wait_ms);
    loop {
        match page.find_element(config.consent_selector.as_str()).await {
            Ok(element) => {
                element.click().await.map_err(|e| ExportError::Script {
                    url: config.consent_selector.clone(),
                    detail: format!("consent click: {e}"),
                })?;
                return Ok(true);
            }
            Err(_) if Instant::now() < deadline => {
                sleep(Duration::from_millis(CONSENT_POLL_MS)).await;
            }
            Err(_) => return Ok(false),
        }
    }
}
