//! Scroll synchronization: a full descend-dwell-ascend sweep inside the page.
//!
//! Lazy-loaded content (images, infinite-scroll sections) only renders once
//! its trigger point enters the viewport. A full-page screenshot taken
//! straight after navigation would capture placeholders. The sweep scrolls
//! to the bottom in small steps so every trigger fires, dwells there while
//! in-flight loads finish, then returns to the top so the capture starts at
//! offset 0.
//!
//! The whole routine runs as one async function in the page's execution
//! context; [`settle`] resolves only after the page is back at the top.
//! There is no return value, only side effects. If the page's layout APIs
//! are unavailable the evaluation fails and the error propagates to the
//! capture unit.

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::pipeline::source::Destination;
use chromiumoxide::Page;
use tracing::debug;

/// Build the in-page sweep script with the given step, inter-step delay,
/// and bottom dwell baked in.
pub fn sweep_script(step: u32, delay_ms: u64, dwell_ms: u64) -> String {
    format!(
        r#"async () => {{
    const step = {step};
    const wait = (ms) => new Promise((resolve) => setTimeout(resolve, ms));

    while (window.scrollY + window.innerHeight < document.documentElement.scrollHeight) {{
        window.scrollBy(0, step);
        await wait({delay_ms});
    }}

    await wait({dwell_ms});

    while (window.scrollY > 0) {{
        window.scrollBy(0, -step);
        await wait({delay_ms});
    }}
}}"#
    )
}

/// Run the sweep in `page` and wait for it to finish.
pub async fn settle(
    page: &Page,
    dest: &Destination,
    config: &ExportConfig,
) -> Result<(), ExportError> {
    debug!("Scroll sweep on {dest}");
    let script = sweep_script(
        config.scroll_step,
        config.scroll_delay_ms,
        config.bottom_dwell_ms,
    );
    page.evaluate_function(script)
        .await
        .map_err(|e| ExportError::Script {
            url: dest.to_string(),
            detail: e.to_string(),
        })?;
    Ok(())
}
