//! In-memory document for exercising checks without a browser.
//!
//! A [`FixturePage`] holds a flat list of elements. Clicking an element that
//! declares a toggle attribute flips it between `"true"` and `"false"`, the
//! way the project page's category buttons behave. Navigation and reload
//! restore the declared attributes unless state persistence is switched on.

use async_trait::async_trait;
use image::{ImageEncoder, Rgb, RgbImage};
use std::collections::BTreeMap;

use crate::page::PageDriver;
use crate::result::{AriaError, AriaResult};
use crate::selector::{Selector, SimpleSelector};

/// One element of a fixture document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureElement {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    toggles: Option<String>,
}

impl FixtureElement {
    /// Create an element with the given tag name
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            toggles: None,
        }
    }

    /// Set the id
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Flip this attribute between `"true"` and `"false"` on click
    #[must_use]
    pub fn toggles(mut self, name: impl Into<String>) -> Self {
        self.toggles = Some(name.into());
        self
    }

    fn matches(&self, selector: &SimpleSelector) -> bool {
        match selector {
            SimpleSelector::Id(id) => self.id.as_deref() == Some(id.as_str()),
            SimpleSelector::Class(class) => self.classes.iter().any(|c| c == class),
            SimpleSelector::Tag(tag) => self.tag.eq_ignore_ascii_case(tag),
        }
    }

    fn click(&mut self) {
        if let Some(name) = &self.toggles {
            let next = match self.attributes.get(name).map(String::as_str) {
                Some("true") => "false",
                _ => "true",
            };
            self.attributes.insert(name.clone(), next.to_string());
        }
    }
}

/// In-memory page implementing [`PageDriver`]
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    url: String,
    declared: Vec<FixtureElement>,
    live: Vec<FixtureElement>,
    persist_state: bool,
    unreachable: bool,
    blank_screenshot: bool,
    loads: usize,
    clicks: usize,
}

impl FixturePage {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: String::from("about:blank"),
            ..Self::default()
        }
    }

    /// The project page the default plan targets: labelled search, shake
    /// and clear controls plus three category toggles
    #[must_use]
    pub fn project_page() -> Self {
        Self::new()
            .with(
                FixtureElement::new("input")
                    .id("searchInput")
                    .attr("aria-label", "Search projects"),
            )
            .with(
                FixtureElement::new("button")
                    .id("shakeButton")
                    .attr("aria-label", "Explode cards"),
            )
            .with(
                FixtureElement::new("button")
                    .id("clearSearch")
                    .attr("aria-label", "Clear search"),
            )
            .with(category("All", "true"))
            .with(category("Games", "false"))
            .with(category("Tools", "false"))
    }

    /// Add an element
    #[must_use]
    pub fn with(mut self, element: FixtureElement) -> Self {
        self.declared.push(element.clone());
        self.live.push(element);
        self
    }

    /// Drop every element matching the selector
    #[must_use]
    pub fn without(mut self, selector: &str) -> Self {
        if let Ok(simple) = SimpleSelector::parse(selector) {
            self.declared.retain(|e| !e.matches(&simple));
            self.live.retain(|e| !e.matches(&simple));
        }
        self
    }

    /// Overwrite an attribute on every element matching the selector
    #[must_use]
    pub fn set_attr(mut self, selector: &str, name: &str, value: &str) -> Self {
        if let Ok(simple) = SimpleSelector::parse(selector) {
            for element in self.declared.iter_mut().chain(self.live.iter_mut()) {
                if element.matches(&simple) {
                    element.attributes.insert(name.to_string(), value.to_string());
                }
            }
        }
        self
    }

    /// Remove an attribute from every element matching the selector
    #[must_use]
    pub fn remove_attr(mut self, selector: &str, name: &str) -> Self {
        if let Ok(simple) = SimpleSelector::parse(selector) {
            for element in self.declared.iter_mut().chain(self.live.iter_mut()) {
                if element.matches(&simple) {
                    element.attributes.remove(name);
                }
            }
        }
        self
    }

    /// Make clicks inert on every element matching the selector
    #[must_use]
    pub fn freeze(mut self, selector: &str) -> Self {
        if let Ok(simple) = SimpleSelector::parse(selector) {
            for element in self.declared.iter_mut().chain(self.live.iter_mut()) {
                if element.matches(&simple) {
                    element.toggles = None;
                }
            }
        }
        self
    }

    /// Keep live state across reloads, as a page backed by storage would
    #[must_use]
    pub const fn persist_state(mut self) -> Self {
        self.persist_state = true;
        self
    }

    /// Fail every navigation
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Return no bytes from `screenshot`
    #[must_use]
    pub const fn blank_screenshot(mut self) -> Self {
        self.blank_screenshot = true;
        self
    }

    /// Number of completed navigations and reloads
    #[must_use]
    pub const fn loads(&self) -> usize {
        self.loads
    }

    /// Number of dispatched clicks
    #[must_use]
    pub const fn clicks(&self) -> usize {
        self.clicks
    }

    fn load(&mut self) {
        if !self.persist_state {
            self.live = self.declared.clone();
        }
        self.loads += 1;
    }

    fn render(&self) -> AriaResult<Vec<u8>> {
        let width = 64;
        let height = 8 * (self.live.len() as u32).max(1);
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for (row, element) in self.live.iter().enumerate() {
            let shade = if element.toggles.is_some()
                && element.attributes.get("aria-pressed").map(String::as_str) == Some("true")
            {
                Rgb([40, 120, 220])
            } else {
                Rgb([200, 200, 200])
            };
            for y in (row as u32 * 8 + 1)..(row as u32 * 8 + 7) {
                for x in 2..(width - 2) {
                    img.put_pixel(x, y, shade);
                }
            }
        }

        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| AriaError::screenshot(e.to_string()))?;
        Ok(buffer)
    }
}

fn category(name: &str, pressed: &str) -> FixtureElement {
    FixtureElement::new("button")
        .class("category-btn")
        .attr("data-category", name)
        .attr("aria-pressed", pressed)
        .toggles("aria-pressed")
}

#[async_trait]
impl PageDriver for FixturePage {
    async fn goto(&mut self, url: &str) -> AriaResult<()> {
        if self.unreachable {
            return Err(AriaError::Navigation {
                url: url.to_string(),
                message: "net::ERR_FILE_NOT_FOUND".to_string(),
            });
        }
        self.url = url.to_string();
        self.load();
        Ok(())
    }

    async fn reload(&mut self) -> AriaResult<()> {
        if self.unreachable {
            return Err(AriaError::Navigation {
                url: self.url.clone(),
                message: "net::ERR_FILE_NOT_FOUND".to_string(),
            });
        }
        self.load();
        Ok(())
    }

    async fn count(&self, selector: &Selector) -> AriaResult<usize> {
        let simple = selector.simple()?;
        Ok(self.live.iter().filter(|e| e.matches(&simple)).count())
    }

    async fn attribute(&self, selector: &Selector, name: &str) -> AriaResult<Option<String>> {
        let simple = selector.simple()?;
        let element = self
            .live
            .iter()
            .find(|e| e.matches(&simple))
            .ok_or_else(|| AriaError::not_found(selector.as_str()))?;
        Ok(element.attributes.get(name).cloned())
    }

    async fn click(&mut self, selector: &Selector) -> AriaResult<()> {
        let simple = selector.simple()?;
        let element = self
            .live
            .iter_mut()
            .find(|e| e.matches(&simple))
            .ok_or_else(|| AriaError::not_found(selector.as_str()))?;
        element.click();
        self.clicks += 1;
        Ok(())
    }

    async fn screenshot(&self) -> AriaResult<Vec<u8>> {
        if self.blank_screenshot {
            return Ok(Vec::new());
        }
        self.render()
    }

    fn current_url(&self) -> &str {
        &self.url
    }
}
