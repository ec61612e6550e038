//! User-registered macros.
//!
//! A macro is written as `{name}` or `{name:anonymous|key=value|flag}`. Simple
//! macros are expanded where they appear; multiline macros capture every line
//! up to the next macro-looking line and receive them as their body.

mod registry;

pub use registry::{parse_properties, MacroCall, MacroRegistry};

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Direct macro handler: `(body, properties) -> rendered`.
pub type HandlerFn = dyn Fn(&str, &Properties) -> String + Send + Sync;

/// Opaque configuration shared with a proxy handler.
pub type Store = Arc<dyn Any + Send + Sync>;

/// Proxy handler: `(store, body, properties) -> rendered`.
///
/// One proxy function can serve many macros that differ only in their store.
pub type ProxyFn = fn(&(dyn Any + Send + Sync), &str, &Properties) -> String;

/// The two ways a macro can produce its output.
#[derive(Clone)]
pub enum MacroHandler {
    Direct(Arc<HandlerFn>),
    Proxy { store: Store, handler: ProxyFn },
}

impl MacroHandler {
    /// Run the handler with the given body and properties.
    pub fn call(&self, body: &str, props: &Properties) -> String {
        match self {
            MacroHandler::Direct(handler) => handler(body, props),
            MacroHandler::Proxy { store, handler } => handler(store.as_ref(), body, props),
        }
    }
}

impl fmt::Debug for MacroHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroHandler::Direct(_) => f.write_str("Direct(..)"),
            MacroHandler::Proxy { .. } => f.write_str("Proxy { .. }"),
        }
    }
}

/// A macro definition.
#[derive(Debug, Clone)]
pub struct Macro {
    /// Unique macro name (2+ characters of `a-z`, `0-9` or `-`)
    pub name: String,
    /// Whether the macro captures the following lines as its body
    pub multiline: bool,
    /// Whether HTML is allowed inside a multiline body
    pub allow_html: bool,
    /// Supported property keys; empty means any key is accepted
    pub properties: Vec<String>,
    /// Handler producing the rendered output
    pub handler: Option<MacroHandler>,
}

impl Macro {
    /// Create a simple macro with a direct handler.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str, &Properties) -> String + Send + Sync + 'static,
    {
        Self {
            handler: Some(MacroHandler::Direct(Arc::new(handler))),
            ..Self::without_handler(name)
        }
    }

    /// Create a simple macro backed by a proxy handler and its store.
    pub fn proxied<S>(name: impl Into<String>, store: S, handler: ProxyFn) -> Self
    where
        S: Any + Send + Sync,
    {
        Self {
            handler: Some(MacroHandler::Proxy {
                store: Arc::new(store),
                handler,
            }),
            ..Self::without_handler(name)
        }
    }

    /// Create a macro definition with no handler attached.
    pub fn without_handler(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiline: false,
            allow_html: false,
            properties: Vec::new(),
            handler: None,
        }
    }

    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn allow_html(mut self, allow: bool) -> Self {
        self.allow_html = allow;
        self
    }

    /// Restrict the macro to the given property keys.
    pub fn properties<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `key` may be used with this macro. The anonymous key always is.
    pub fn supports(&self, key: &str) -> bool {
        key.is_empty() || self.properties.is_empty() || self.properties.iter().any(|p| p == key)
    }
}

/// Macro properties parsed from `{name:props}`.
///
/// The anonymous property (the first bare token) is stored under the empty key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(HashMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The anonymous property, if any.
    pub fn anonymous(&self) -> Option<&str> {
        self.get("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Boolean property. Missing, empty and `false` values are false.
    pub fn flag(&self, key: &str) -> bool {
        !matches!(self.get(key), None | Some("") | Some("false"))
    }

    /// Integer property, or `default` if it is missing or not a number.
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Size property in `WIDTHxHEIGHT` form, or `default` if it can't be parsed.
    pub fn size_or(&self, key: &str, default: (u32, u32)) -> (u32, u32) {
        let Some((w, h)) = self.get(key).and_then(|v| v.split_once('x')) else {
            return default;
        };

        match (w.parse(), h.parse()) {
            (Ok(w), Ok(h)) => (w, h),
            _ => default,
        }
    }

    /// Color property with any leading `#` removed.
    pub fn color(&self, key: &str) -> Option<&str> {
        self.get(key).map(|v| v.trim_start_matches('#'))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
