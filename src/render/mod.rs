//! Render configuration: one optional callback per markup construct.
//!
//! Leaving an inline callback unset disables recognition of that span kind
//! entirely. Leaving a block callback unset passes the block through as-is.

pub mod html;

pub use html::escape_html;

use crate::macros::Macro;
use bitflags::bitflags;
use std::fmt;

/// Callback for constructs carrying a single piece of text.
pub type TextFn = Box<dyn Fn(&str) -> String + Send + Sync>;
/// Header callback: `(text, level)`.
pub type HeaderFn = Box<dyn Fn(&str, u8) -> String + Send + Sync>;
/// Horizontal rule callback.
pub type RuleFn = Box<dyn Fn() -> String + Send + Sync>;
/// Link callback: `(url, text)`.
pub type LinkFn = Box<dyn Fn(&str, &str) -> String + Send + Sync>;
/// Inline image callback: `(url, alt)`.
pub type InlineImageFn = Box<dyn Fn(&str, &str) -> String + Send + Sync>;
/// Block image callback: `(url, alt, caption)`.
pub type ImageFn = Box<dyn Fn(&str, &str, &str) -> String + Send + Sync>;

/// Render configuration passed to [`crate::process`].
#[derive(Default)]
pub struct Render {
    pub header: Option<HeaderFn>,
    pub paragraph: Option<TextFn>,
    pub bold: Option<TextFn>,
    pub italic: Option<TextFn>,
    pub underline: Option<TextFn>,
    pub strikethrough: Option<TextFn>,
    pub superscript: Option<TextFn>,
    pub subscript: Option<TextFn>,
    pub code: Option<TextFn>,
    pub hr: Option<RuleFn>,
    pub link: Option<LinkFn>,
    pub inline_image: Option<InlineImageFn>,
    pub image: Option<ImageFn>,
    /// Called with the name of a macro that has no definition
    pub unsupported_macro: Option<TextFn>,
    /// Allow raw HTML in ordinary blocks
    pub allow_html: bool,
    /// Registered macros
    pub macros: Vec<Macro>,
}

bitflags! {
    /// Constructs enabled by a render configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Constructs: u16 {
        const CODE = 1 << 0;
        const HR = 1 << 1;
        const BOLD = 1 << 2;
        const ITALIC = 1 << 3;
        const UNDERLINE = 1 << 4;
        const STRIKETHROUGH = 1 << 5;
        const SUPERSCRIPT = 1 << 6;
        const SUBSCRIPT = 1 << 7;
        const INLINE_IMAGE = 1 << 8;
        const LINK = 1 << 9;
        const MACROS = 1 << 10;
    }
}

impl Constructs {
    /// Derive the enabled span constructs from the configured callbacks.
    pub fn from_render(render: &Render) -> Self {
        let slots = [
            (render.code.is_some(), Self::CODE),
            (render.hr.is_some(), Self::HR),
            (render.bold.is_some(), Self::BOLD),
            (render.italic.is_some(), Self::ITALIC),
            (render.underline.is_some(), Self::UNDERLINE),
            (render.strikethrough.is_some(), Self::STRIKETHROUGH),
            (render.superscript.is_some(), Self::SUPERSCRIPT),
            (render.subscript.is_some(), Self::SUBSCRIPT),
            (render.inline_image.is_some(), Self::INLINE_IMAGE),
            (render.link.is_some(), Self::LINK),
            (!render.macros.is_empty(), Self::MACROS),
        ];

        slots
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .fold(Self::empty(), |acc, (_, flag)| acc | flag)
    }
}

macro_rules! text_slot {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<F>(mut self, f: F) -> Self
            where
                F: Fn(&str) -> String + Send + Sync + 'static,
            {
                self.$name = Some(Box::new(f));
                self
            }
        )*
    };
}

impl Render {
    /// Create an empty configuration: nothing is rendered, everything passes through.
    pub fn new() -> Self {
        Self::default()
    }

    text_slot! {
        paragraph,
        bold,
        italic,
        underline,
        strikethrough,
        superscript,
        subscript,
        code,
        /// Set the callback for macros with no definition.
        unsupported_macro,
    }

    pub fn header<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, u8) -> String + Send + Sync + 'static,
    {
        self.header = Some(Box::new(f));
        self
    }

    pub fn hr<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.hr = Some(Box::new(f));
        self
    }

    pub fn link<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.link = Some(Box::new(f));
        self
    }

    pub fn inline_image<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.inline_image = Some(Box::new(f));
        self
    }

    pub fn image<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, &str) -> String + Send + Sync + 'static,
    {
        self.image = Some(Box::new(f));
        self
    }

    pub fn allow_html(mut self, allow: bool) -> Self {
        self.allow_html = allow;
        self
    }

    /// Register a macro.
    pub fn with_macro(mut self, def: Macro) -> Self {
        self.macros.push(def);
        self
    }
}

impl fmt::Debug for Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = [
            ("header", self.header.is_some()),
            ("paragraph", self.paragraph.is_some()),
            ("image", self.image.is_some()),
            ("unsupported_macro", self.unsupported_macro.is_some()),
        ];
        let configured: Vec<&str> = slots
            .iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| *name)
            .collect();

        f.debug_struct("Render")
            .field("blocks", &configured)
            .field("spans", &Constructs::from_render(self))
            .field("allow_html", &self.allow_html)
            .field(
                "macros",
                &self.macros.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
