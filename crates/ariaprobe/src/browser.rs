//! Browser control for headless checks.
//!
//! When compiled with the `browser` feature this drives Chromium over the
//! Chrome `DevTools` Protocol via chromiumoxide. Without the feature,
//! launching reports [`AriaError::BrowserUnavailable`].

use std::time::Duration;

use crate::result::{AriaError, AriaResult};

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Limit for a single CDP request
    pub request_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the CDP request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{AriaError, AriaResult, BrowserConfig};
    use crate::page::PageDriver;
    use crate::selector::Selector;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::element::Element;
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
    use futures::StreamExt;

    fn page_error(e: impl std::fmt::Display) -> AriaError {
        AriaError::Page {
            message: e.to_string(),
        }
    }

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: CdpBrowser,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance with real CDP
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> AriaResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .viewport(Viewport {
                    width: config.viewport_width,
                    height: config.viewport_height,
                    ..Viewport::default()
                })
                .request_timeout(config.request_timeout);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(|e| AriaError::BrowserLaunch {
                message: e.to_string(),
            })?;

            let (inner, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                AriaError::BrowserLaunch {
                    message: e.to_string(),
                }
            })?;

            // Drive the CDP event loop until the connection closes
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "browser launched");
            Ok(Self {
                config,
                inner,
                handle,
            })
        }

        /// Create a new page
        ///
        /// # Errors
        ///
        /// Returns error if page cannot be created
        pub async fn new_page(&self) -> AriaResult<Page> {
            let inner = self.inner.new_page("about:blank").await.map_err(page_error)?;
            Ok(Page {
                url: String::from("about:blank"),
                inner,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser and reap the process
        pub async fn close(mut self) -> AriaResult<()> {
            self.inner.close().await.map_err(|e| AriaError::BrowserLaunch {
                message: e.to_string(),
            })?;
            if let Err(e) = self.inner.wait().await {
                tracing::warn!(error = %e, "waiting for browser exit failed");
            }
            let _ = self.handle.await;
            tracing::info!("browser closed");
            Ok(())
        }
    }

    /// A browser page with real CDP connection
    #[derive(Debug)]
    pub struct Page {
        /// Current URL
        pub url: String,
        inner: CdpPage,
    }

    impl Page {
        async fn first(&self, selector: &Selector) -> AriaResult<Element> {
            self.inner
                .find_elements(selector.as_str())
                .await
                .map_err(page_error)?
                .into_iter()
                .next()
                .ok_or_else(|| AriaError::not_found(selector.as_str()))
        }
    }

    #[async_trait]
    impl PageDriver for Page {
        async fn goto(&mut self, url: &str) -> AriaResult<()> {
            self.inner
                .goto(url)
                .await
                .map_err(|e| AriaError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            self.url = url.to_string();
            Ok(())
        }

        async fn reload(&mut self) -> AriaResult<()> {
            self.inner
                .reload()
                .await
                .map_err(|e| AriaError::Navigation {
                    url: self.url.clone(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn count(&self, selector: &Selector) -> AriaResult<usize> {
            let found = self
                .inner
                .find_elements(selector.as_str())
                .await
                .map_err(page_error)?;
            Ok(found.len())
        }

        async fn attribute(&self, selector: &Selector, name: &str) -> AriaResult<Option<String>> {
            let element = self.first(selector).await?;
            element.attribute(name).await.map_err(page_error)
        }

        async fn click(&mut self, selector: &Selector) -> AriaResult<()> {
            let element = self.first(selector).await?;
            element.click().await.map_err(|e| AriaError::Input {
                message: e.to_string(),
            })?;
            Ok(())
        }

        async fn screenshot(&self) -> AriaResult<Vec<u8>> {
            let params = ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(true)
                .build();
            self.inner
                .screenshot(params)
                .await
                .map_err(|e| AriaError::screenshot(e.to_string()))
        }

        fn current_url(&self) -> &str {
            &self.url
        }
    }
}

// ============================================================================
// Stand-in (when `browser` feature is NOT enabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
mod unavailable {
    use super::{AriaError, AriaResult, BrowserConfig};
    use crate::page::PageDriver;
    use crate::selector::Selector;
    use async_trait::async_trait;

    /// Browser handle; cannot be launched without the `browser` feature
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
    }

    impl Browser {
        /// Always fails: no CDP support compiled in
        pub async fn launch(config: BrowserConfig) -> AriaResult<Self> {
            tracing::warn!(?config, "browser feature not enabled");
            Err(AriaError::BrowserUnavailable)
        }

        /// Always fails: no CDP support compiled in
        pub async fn new_page(&self) -> AriaResult<Page> {
            Err(AriaError::BrowserUnavailable)
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Nothing to release
        pub async fn close(self) -> AriaResult<()> {
            Ok(())
        }
    }

    /// Page handle; every operation reports the missing feature
    #[derive(Debug)]
    pub struct Page {
        /// Current URL
        pub url: String,
    }

    #[async_trait]
    impl PageDriver for Page {
        async fn goto(&mut self, _url: &str) -> AriaResult<()> {
            Err(AriaError::BrowserUnavailable)
        }

        async fn reload(&mut self) -> AriaResult<()> {
            Err(AriaError::BrowserUnavailable)
        }

        async fn count(&self, _selector: &Selector) -> AriaResult<usize> {
            Err(AriaError::BrowserUnavailable)
        }

        async fn attribute(&self, _selector: &Selector, _name: &str) -> AriaResult<Option<String>> {
            Err(AriaError::BrowserUnavailable)
        }

        async fn click(&mut self, _selector: &Selector) -> AriaResult<()> {
            Err(AriaError::BrowserUnavailable)
        }

        async fn screenshot(&self) -> AriaResult<Vec<u8>> {
            Err(AriaError::BrowserUnavailable)
        }

        fn current_url(&self) -> &str {
            &self.url
        }
    }
}

// Re-export based on feature
#[cfg(feature = "browser")]
pub use cdp::{Browser, Page};

#[cfg(not(feature = "browser"))]
pub use unavailable::{Browser, Page};
