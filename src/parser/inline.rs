//! Span-level substitution.
//!
//! Each span kind is a regex pass over the current text. Passes run in a
//! fixed order and every pass sees the output of the previous ones, so the
//! order of [`SPAN_RULES`] is part of the format.
//!
//! The HTML gate checks the text with code spans removed, so neither code
//! contents nor the output of the code callback are ever gated.

use crate::error::{Error, Result};
use crate::parser::Context;
use crate::render::{Constructs, Render, TextFn};
use regex::{Captures, Regex};
use std::sync::LazyLock;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern is valid")
}

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`\s][^`]*)`"));
static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"<[/!]?[A-Za-z][^<>]*>"));
static HR_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*-{4,}\s*$"));
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\*([^\s*][^*]*)\*"));
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"_([^\s_][^_]*)_"));
static UNDERLINE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\+([^\s+][^+]*)\+"));
static STRIKETHROUGH_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"-([^\s-][^-]*)-"));
static SUPERSCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\^([^\s^][^^]*)\^"));
static SUBSCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"~([^\s~][^~]*)~"));
static INLINE_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"!([^\s!|]+\.(?i:jpe?g|gif|png|svg|webp))(?:\|([^!]*))?!")
});
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\[(?:([^\[\]|]*)\|)?((?:https?|ftp)://[^\s\]]+|mailto:[^\s\]]+)\]")
});
static INLINE_MACRO_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\{([a-z0-9-]{2,})(?::([^{}]*))?\}"));

/// One span pass: the construct that enables it, its pattern, and how a
/// match is turned into output.
struct SpanRule {
    construct: Constructs,
    pattern: &'static LazyLock<Regex>,
    apply: fn(&Render, &Captures) -> String,
}

fn group<'c>(caps: &'c Captures, i: usize) -> &'c str {
    caps.get(i).map_or("", |m| m.as_str())
}

/// Span passes that run after the HTML gate, in order.
static SPAN_RULES: [SpanRule; 9] = [
    SpanRule {
        construct: Constructs::HR,
        pattern: &HR_RE,
        apply: |r, _| r.hr.as_ref().map_or_else(String::new, |f| f()),
    },
    SpanRule {
        construct: Constructs::BOLD,
        pattern: &BOLD_RE,
        apply: |r, c| apply_text(&r.bold, c),
    },
    SpanRule {
        construct: Constructs::ITALIC,
        pattern: &ITALIC_RE,
        apply: |r, c| apply_text(&r.italic, c),
    },
    SpanRule {
        construct: Constructs::UNDERLINE,
        pattern: &UNDERLINE_RE,
        apply: |r, c| apply_text(&r.underline, c),
    },
    SpanRule {
        construct: Constructs::STRIKETHROUGH,
        pattern: &STRIKETHROUGH_RE,
        apply: |r, c| apply_text(&r.strikethrough, c),
    },
    SpanRule {
        construct: Constructs::SUPERSCRIPT,
        pattern: &SUPERSCRIPT_RE,
        apply: |r, c| apply_text(&r.superscript, c),
    },
    SpanRule {
        construct: Constructs::SUBSCRIPT,
        pattern: &SUBSCRIPT_RE,
        apply: |r, c| apply_text(&r.subscript, c),
    },
    SpanRule {
        construct: Constructs::INLINE_IMAGE,
        pattern: &INLINE_IMAGE_RE,
        apply: |r, c| {
            r.inline_image
                .as_ref()
                .map_or_else(String::new, |f| f(group(c, 1), group(c, 2)))
        },
    },
    SpanRule {
        construct: Constructs::LINK,
        pattern: &LINK_RE,
        apply: |r, c| {
            r.link
                .as_ref()
                .map_or_else(String::new, |f| f(group(c, 2), group(c, 1)))
        },
    },
];

fn apply_text(slot: &Option<TextFn>, caps: &Captures) -> String {
    slot.as_ref().map_or_else(String::new, |f| f(group(caps, 1)))
}

/// Check text for raw HTML tags.
pub fn contains_html(text: &str) -> bool {
    HTML_TAG_RE.is_match(text)
}

/// Fail with [`Error::HtmlNotAllowed`] if HTML is disallowed and present.
pub fn check_html(text: &str, allow_html: bool) -> Result<()> {
    if !allow_html && contains_html(text) {
        return Err(Error::HtmlNotAllowed);
    }
    Ok(())
}

/// Render the span markup of one line of text.
pub fn render_inline(text: &str, ctx: &Context<'_>) -> Result<String> {
    let render = ctx.render;
    let mut text = text.to_string();

    if ctx.constructs.contains(Constructs::CODE) {
        // Code spans are exempt from the HTML gate.
        check_html(&CODE_RE.replace_all(&text, ""), render.allow_html)?;
        text = replace(&CODE_RE, &text, |caps| apply_text(&render.code, caps));
    } else {
        check_html(&text, render.allow_html)?;
    }

    for rule in &SPAN_RULES {
        if ctx.constructs.contains(rule.construct) {
            text = replace(rule.pattern, &text, |caps| (rule.apply)(render, caps));
        }
    }

    if ctx.constructs.contains(Constructs::MACROS) {
        text = render_inline_macros(&text, ctx)?;
    }

    Ok(text)
}

fn replace(re: &Regex, text: &str, f: impl Fn(&Captures) -> String) -> String {
    re.replace_all(text, |caps: &Captures| f(caps)).into_owned()
}

/// Expand simple macros embedded in text. Multiline macros are left as-is.
fn render_inline_macros(text: &str, ctx: &Context<'_>) -> Result<String> {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for caps in INLINE_MACRO_RE.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always matches");
        let name = group(&caps, 1);

        // Multiline tags are skipped before their properties are validated.
        if ctx.macros.get(name).is_some_and(|def| def.multiline) {
            continue;
        }

        let call = ctx.macros.resolve(name, caps.get(2).map(|m| m.as_str()))?;
        let fragment = match call.definition {
            Some(_) => call.invoke("")?,
            None => ctx.unsupported_macro(call.name),
        };

        output.push_str(&text[last..whole.start()]);
        output.push_str(&fragment);
        last = whole.end();
    }

    output.push_str(&text[last..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::{Macro, MacroRegistry};
    use pretty_assertions::assert_eq;

    fn debug_render() -> Render {
        Render::new()
            .bold(|t| format!("(Bold: {})", t))
            .italic(|t| format!("(Italic: {})", t))
            .underline(|t| format!("(Underline: {})", t))
            .strikethrough(|t| format!("(Del: {})", t))
            .superscript(|t| format!("(Sup: {})", t))
            .subscript(|t| format!("(Sub: {})", t))
            .code(|t| format!("(Code: {})", t))
            .hr(|| "(HR)".to_string())
            .link(|url, text| format!("(URL: {} Text: \"{}\")", url, text))
            .inline_image(|url, alt| format!("(IMG: {} Alt: \"{}\")", url, alt))
            .unsupported_macro(|name| format!("(Unsupported: {})", name))
            .with_macro(Macro::new("echo", |_, props| {
                format!("(Echo: {})", props.anonymous().unwrap_or(""))
            }))
            .with_macro(Macro::new("block", |_, _| "(Block)".to_string()).multiline(true))
    }

    fn render_with(render: &Render, text: &str) -> Result<String> {
        let macros = MacroRegistry::new(&render.macros);
        let ctx = Context::new(render, &macros);
        render_inline(text, &ctx)
    }

    #[test]
    fn test_basic_spans() {
        let render = debug_render();
        assert_eq!(
            render_with(&render, "*a* _b_ +c+ ^d^ ~e~").unwrap(),
            "(Bold: a) (Italic: b) (Underline: c) (Sup: d) (Sub: e)"
        );
        assert_eq!(render_with(&render, "a -gone- b").unwrap(), "a (Del: gone) b");
    }

    #[test]
    fn test_code_runs_first() {
        let render = debug_render();
        assert_eq!(
            render_with(&render, "`*not bold*` *bold*").unwrap(),
            "(Code: (Bold: not bold)) (Bold: bold)"
        );
    }

    #[test]
    fn test_hr() {
        let render = debug_render();
        assert_eq!(render_with(&render, "------").unwrap(), "(HR)");
    }

    #[test]
    fn test_links() {
        let render = debug_render();
        assert_eq!(
            render_with(&render, "See [docs|https://example.com/docs] or [mailto:me@example.com].")
                .unwrap(),
            "See (URL: https://example.com/docs Text: \"docs\") or (URL: mailto:me@example.com Text: \"\")."
        );
        assert_eq!(render_with(&render, "[text|file://x]").unwrap(), "[text|file://x]");
    }

    #[test]
    fn test_inline_image() {
        let render = debug_render();
        assert_eq!(
            render_with(&render, "Look !cat.png|A cat! here").unwrap(),
            "Look (IMG: cat.png Alt: \"A cat\") here"
        );
    }

    #[test]
    fn test_inline_macros() {
        let render = debug_render();
        assert_eq!(
            render_with(&render, "a {echo:hi} b {nope} c {block} d").unwrap(),
            "a (Echo: hi) b (Unsupported: nope) c {block} d"
        );
    }

    #[test]
    fn test_disabled_spans_are_left_alone() {
        let render = Render::new().italic(|t| format!("<i>{}</i>", t));
        assert_eq!(
            render_with(&render, "This is _italic_ and *not bold*.").unwrap(),
            "This is <i>italic</i> and *not bold*."
        );
    }

    #[test]
    fn test_html_gate() {
        let render = debug_render();
        assert!(matches!(
            render_with(&render, "Hello <script>alert(1)</script>"),
            Err(Error::HtmlNotAllowed)
        ));
        assert_eq!(
            render_with(&render, "Compare `<b>` tags").unwrap(),
            "Compare (Code: <b>) tags"
        );
        assert!(render_with(&render, "1 < 2 and 3 > 2").is_ok());

        let render = debug_render().allow_html(true);
        assert_eq!(
            render_with(&render, "Hello <b>world</b>").unwrap(),
            "Hello <b>world</b>"
        );
    }

    #[test]
    fn test_inline_macro_property_errors_propagate() {
        let render = Render::new().with_macro(
            Macro::new("video", |_, _| String::new()).properties(["size"]),
        );
        assert!(render_with(&render, "x {video:id|color=red} y").is_err());
    }

    #[test]
    fn test_inline_multiline_macro_skips_property_check() {
        let render = Render::new().with_macro(
            Macro::new("block", |_, _| "(Block)".to_string())
                .multiline(true)
                .properties(["kind"]),
        );
        assert_eq!(
            render_with(&render, "x {block:bad=1} y").unwrap(),
            "x {block:bad=1} y"
        );
    }
}
