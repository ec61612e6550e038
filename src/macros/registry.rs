//! Macro resolution, property parsing and invocation.

use super::{Macro, Properties};
use crate::error::{MacroError, Result};
use std::collections::HashMap;

/// Registry of macro definitions keyed by name.
#[derive(Debug, Default)]
pub struct MacroRegistry<'a> {
    macros: HashMap<&'a str, &'a Macro>,
}

/// A resolved macro tag.
#[derive(Debug, Clone)]
pub struct MacroCall<'a> {
    /// Name as written in the tag
    pub name: &'a str,
    /// Matching definition, if any
    pub definition: Option<&'a Macro>,
    /// Parsed properties
    pub properties: Properties,
}

impl<'a> MacroRegistry<'a> {
    /// Build a registry. When two definitions share a name the first one wins.
    pub fn new(macros: &'a [Macro]) -> Self {
        let mut registry = HashMap::with_capacity(macros.len());

        for def in macros {
            if registry.contains_key(def.name.as_str()) {
                tracing::debug!(name = %def.name, "Ignoring duplicate macro definition");
                continue;
            }
            registry.insert(def.name.as_str(), def);
        }

        Self { macros: registry }
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&'a Macro> {
        self.macros.get(name).copied()
    }

    /// Resolve a macro tag and validate its properties against the
    /// definition's whitelist.
    pub fn resolve<'t>(&self, name: &'t str, props: Option<&str>) -> Result<MacroCall<'t>>
    where
        'a: 't,
    {
        let definition = self.get(name);
        let properties = props.map(parse_properties).unwrap_or_default();

        if let Some(def) = definition {
            if let Some((key, _)) = properties.iter().find(|(key, _)| !def.supports(key)) {
                return Err(MacroError::UnsupportedProperty {
                    name: name.to_string(),
                    key: key.to_string(),
                }
                .into());
            }
        }

        Ok(MacroCall {
            name,
            definition,
            properties,
        })
    }
}

impl MacroCall<'_> {
    /// Run the macro handler with the given body.
    ///
    /// Must only be called on resolved calls; an unknown macro renders as
    /// an empty string.
    pub fn invoke(&self, body: &str) -> Result<String> {
        let Some(def) = self.definition else {
            return Ok(String::new());
        };

        let handler = def
            .handler
            .as_ref()
            .ok_or_else(|| MacroError::HandlerMissing(def.name.clone()))?;

        Ok(handler.call(body, &self.properties))
    }
}

/// Parse a macro property string (`anonymous|key=value|flag`).
///
/// The first bare token becomes the anonymous property (empty key), later
/// bare tokens are flags with the value `true`.
pub fn parse_properties(input: &str) -> Properties {
    let mut props = Properties::new();
    let mut has_anonymous = false;

    for token in input.split('|').filter(|t| !t.is_empty()) {
        match token.split_once('=') {
            Some((key, value)) => props.insert(key, value),
            None if !has_anonymous => {
                props.insert("", token);
                has_anonymous = true;
            }
            None => props.insert(token, "true"),
        }
    }

    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn echo() -> Macro {
        Macro::new("echo", |body, props| {
            format!("{}|{}", body, props.anonymous().unwrap_or("-"))
        })
    }

    #[test]
    fn test_parse_properties() {
        let props = parse_properties("a|x=1|y");
        let expected: Properties = [("", "a"), ("x", "1"), ("y", "true")]
            .into_iter()
            .collect();
        assert_eq!(props, expected);
    }

    #[test]
    fn test_parse_properties_edge_cases() {
        assert!(parse_properties("").is_empty());

        let props = parse_properties("size=560x315|id|loop|url=a=b");
        assert_eq!(props.anonymous(), Some("id"));
        assert_eq!(props.get("loop"), Some("true"));
        assert_eq!(props.get("url"), Some("a=b"));
        assert_eq!(props.get("size"), Some("560x315"));
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let macros = vec![echo()];
        let registry = MacroRegistry::new(&macros);

        let call = registry.resolve("echo", Some("hi")).unwrap();
        assert!(call.definition.is_some());
        assert_eq!(call.invoke("body").unwrap(), "body|hi");

        let call = registry.resolve("missing", None).unwrap();
        assert!(call.definition.is_none());
        assert_eq!(call.invoke("").unwrap(), "");
    }

    #[test]
    fn test_resolve_rejects_unlisted_property() {
        let macros = vec![echo().properties(["size"])];
        let registry = MacroRegistry::new(&macros);

        assert!(registry.resolve("echo", Some("id|size=1x1")).is_ok());

        let err = registry.resolve("echo", Some("id|color=red")).unwrap_err();
        assert!(matches!(
            err,
            Error::Macro(MacroError::UnsupportedProperty { ref key, .. }) if key == "color"
        ));
    }

    #[test]
    fn test_missing_handler() {
        let macros = vec![Macro::without_handler("broken")];
        let registry = MacroRegistry::new(&macros);

        let call = registry.resolve("broken", None).unwrap();
        let err = call.invoke("").unwrap_err();
        assert!(matches!(err, Error::Macro(MacroError::HandlerMissing(ref n)) if n == "broken"));
    }

    #[test]
    fn test_first_definition_wins() {
        let macros = vec![
            Macro::new("dup", |_, _| "first".to_string()),
            Macro::new("dup", |_, _| "second".to_string()),
        ];
        let registry = MacroRegistry::new(&macros);

        let call = registry.resolve("dup", None).unwrap();
        assert_eq!(call.invoke("").unwrap(), "first");
    }
}
