//! The page seam the checker drives.
//!
//! Implemented by the CDP-backed [`crate::Page`] and by the in-memory
//! [`crate::FixturePage`].

use async_trait::async_trait;

use crate::result::AriaResult;
use crate::selector::Selector;

/// Operations the checker needs from a loaded document.
///
/// Element-level calls act on the first element matching the selector and
/// return [`crate::AriaError::ElementNotFound`] when nothing matches.
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate and wait for the load to finish
    async fn goto(&mut self, url: &str) -> AriaResult<()>;

    /// Reload the current document and wait for the load to finish
    async fn reload(&mut self) -> AriaResult<()>;

    /// Number of elements matching the selector
    async fn count(&self, selector: &Selector) -> AriaResult<usize>;

    /// Read an attribute from the first match; `Ok(None)` when absent
    async fn attribute(&self, selector: &Selector, name: &str) -> AriaResult<Option<String>>;

    /// Dispatch a real click on the first match
    async fn click(&mut self, selector: &Selector) -> AriaResult<()>;

    /// Capture the full page as PNG bytes
    async fn screenshot(&self) -> AriaResult<Vec<u8>>;

    /// URL of the loaded document
    fn current_url(&self) -> &str;
}
