//! The host page as the animation sees it: which elements exist, the
//! viewport, and the text elements the sequencer writes into.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    config::{LetterPopConfig, SelectorConfig},
    tween::{Animated, Lerp, Tween},
    Easing, Result, TypewriterError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Snapshot of the host page at startup.
#[derive(Debug, Clone)]
pub struct Page {
    elements: BTreeSet<String>,
    viewport: Viewport,
    graphics: bool,
}

impl Page {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            elements: BTreeSet::new(),
            viewport,
            graphics: true,
        }
    }

    /// A page carrying every element named by `selectors`.
    pub fn hero(viewport: Viewport, selectors: &SelectorConfig) -> Self {
        Self::new(viewport)
            .with_element(&selectors.hero_section)
            .with_element(&selectors.title)
            .with_element(&selectors.subtitle)
    }

    pub fn with_element(mut self, selector: impl Into<String>) -> Self {
        self.elements.insert(selector.into());
        self
    }

    /// Simulates a page without a usable 3D context.
    pub fn without_graphics(mut self) -> Self {
        self.graphics = false;
        self
    }

    pub fn has(&self, selector: &str) -> bool {
        self.elements.contains(selector)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn supports_graphics(&self) -> bool {
        self.graphics
    }

    fn require(&self, selector: &str) -> Result<()> {
        if self.has(selector) {
            Ok(())
        } else {
            Err(TypewriterError::missing_element(selector))
        }
    }
}

/// The three elements the sequencer needs, resolved up front so a missing
/// one aborts before anything starts.
#[derive(Debug, Clone)]
pub struct HeroElements {
    pub container: String,
    pub title: TextElement,
    pub subtitle: TextElement,
}

impl HeroElements {
    pub fn resolve(page: &Page, selectors: &SelectorConfig) -> Result<Self> {
        page.require(&selectors.hero_section)?;
        page.require(&selectors.title)?;
        page.require(&selectors.subtitle)?;
        Ok(Self {
            container: selectors.hero_section.clone(),
            title: TextElement::new(&selectors.title),
            subtitle: TextElement::new(&selectors.subtitle),
        })
    }
}

/// Visual transform of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElementStyle {
    pub opacity: f32,
    pub offset_y: f32,
    pub scale: f32,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Lerp for ElementStyle {
    fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            opacity: self.opacity.lerp(to.opacity, t),
            offset_y: self.offset_y.lerp(to.offset_y, t),
            scale: self.scale.lerp(to.scale, t),
        }
    }
}

/// Transform of the popped-in letter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LetterStyle {
    pub offset_y: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LetterPop {
    offset: Tween<f32>,
    opacity: Tween<f32>,
}

/// A text element. The visible text and the cursor glyph are kept apart so
/// the pop-in wrapper can be composited in front of the cursor.
#[derive(Debug, Clone)]
pub struct TextElement {
    selector: String,
    text: String,
    cursor: Option<char>,
    pop: Option<LetterPop>,
    style: Animated<ElementStyle>,
}

impl TextElement {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: String::new(),
            cursor: None,
            pop: None,
            style: Animated::new(ElementStyle::default()),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Replaces the content. Any letter wrapper is dropped.
    pub fn set_text(&mut self, text: &str, cursor: Option<char>) {
        self.text.clear();
        self.text.push_str(text);
        self.cursor = cursor;
        self.pop = None;
    }

    pub fn clear(&mut self) {
        self.set_text("", None);
    }

    /// Visible text without the cursor glyph.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text as a reader would see it, cursor included.
    pub fn text_content(&self) -> String {
        let mut content = self.text.clone();
        if let Some(cursor) = self.cursor {
            content.push(cursor);
        }
        content
    }

    /// Content with the popped letter wrapped in its own inline element.
    /// Text and cursor are HTML-escaped; only the wrapper is markup.
    pub fn markup(&self) -> String {
        let mut markup = String::with_capacity(self.text.len() + 16);
        match (self.pop.is_some(), self.text.char_indices().last()) {
            (true, Some((index, last))) => {
                self.text[..index]
                    .chars()
                    .for_each(|c| push_escaped(&mut markup, c));
                markup.push_str("<span>");
                push_escaped(&mut markup, last);
                markup.push_str("</span>");
            }
            _ => self.text.chars().for_each(|c| push_escaped(&mut markup, c)),
        }
        if let Some(cursor) = self.cursor {
            push_escaped(&mut markup, cursor);
        }
        markup
    }

    /// Wraps the last visible character and starts its pop-in. Returns false
    /// when there is nothing to wrap.
    pub fn pop_last_letter(&mut self, now_ms: u64, config: &LetterPopConfig) -> bool {
        if self.text.is_empty() {
            return false;
        }
        self.pop = Some(LetterPop {
            offset: Tween::new(config.offset_y, 0.0, now_ms, config.duration_ms, config.easing),
            opacity: Tween::new(0.0, 1.0, now_ms, config.duration_ms, config.easing),
        });
        true
    }

    pub fn letter_style_at(&self, now_ms: u64) -> Option<LetterStyle> {
        self.pop.as_ref().map(|pop| LetterStyle {
            offset_y: pop.offset.sample(now_ms),
            opacity: pop.opacity.sample(now_ms),
        })
    }

    /// Plays an explicit `from → to` transition.
    pub fn animate(&mut self, tween: Tween<ElementStyle>) {
        self.style.play(tween);
    }

    /// Animates from the current look towards `to`.
    pub fn animate_to(&mut self, to: ElementStyle, now_ms: u64, duration_ms: u64, easing: Easing) {
        self.style.retarget(to, now_ms, duration_ms, easing);
    }

    pub fn style_at(&self, now_ms: u64) -> ElementStyle {
        self.style.sample(now_ms)
    }

    pub fn is_transitioning(&self, now_ms: u64) -> bool {
        self.style.is_animating(now_ms)
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}
