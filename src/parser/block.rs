//! Line-oriented block scanner.

use crate::error::Result;
use crate::macros::MacroCall;
use crate::parser::inline::{check_html, render_inline};
use crate::parser::lexer::{header, macro_tag, MacroTag};
use crate::parser::Context;
use regex::Regex;
use std::sync::LazyLock;

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!([^\s!|]+\.(?i:jpe?g|gif|png|svg|webp))(?:\|([^!]*))?!(.*)$")
        .expect("static pattern is valid")
});

/// Scanner state between lines.
enum State<'a> {
    Normal,
    /// Inside a multiline macro, collecting its body.
    Capture { call: MacroCall<'a>, body: String },
}

/// Render all content lines following the metadata block.
///
/// Each rendered block is followed by a newline.
pub fn render_blocks<'a, I>(lines: I, ctx: &Context<'_>) -> Result<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut scanner = Scanner {
        ctx,
        state: State::Normal,
        output: String::new(),
    };

    for line in lines {
        scanner.line(line)?;
    }

    scanner.finish()
}

struct Scanner<'a> {
    ctx: &'a Context<'a>,
    state: State<'a>,
    output: String,
}

impl<'a> Scanner<'a> {
    fn line(&mut self, line: &'a str) -> Result<()> {
        match &mut self.state {
            State::Capture { call, body } => {
                // Any macro-looking line closes the capture, whatever its name.
                if macro_tag(line).is_ok() {
                    return self.close_capture();
                }

                let allow_html = call.definition.is_some_and(|def| def.allow_html);
                check_html(line, allow_html)?;
                body.push_str(line);
                body.push('\n');
                Ok(())
            }
            State::Normal => self.normal_line(line),
        }
    }

    fn normal_line(&mut self, line: &'a str) -> Result<()> {
        if !self.ctx.macros.is_empty() {
            if let Ok((_, tag)) = macro_tag(line) {
                return self.macro_line(tag);
            }
        }

        if line.trim().is_empty() {
            return Ok(());
        }

        if let Ok((_, (level, text))) = header(line) {
            return self.header(line, text, level);
        }

        if let Some(caps) = IMAGE_RE.captures(line) {
            let url = caps.get(1).map_or("", |m| m.as_str());
            let alt = caps.get(2).map_or("", |m| m.as_str());
            let caption = caps.get(3).map_or("", |m| m.as_str()).trim_start();
            return self.image(line, url, alt, caption);
        }

        self.paragraph(line)
    }

    fn macro_line(&mut self, tag: MacroTag<'a>) -> Result<()> {
        let call = self.ctx.macros.resolve(tag.name, tag.props)?;
        let definition = call.definition;

        match definition {
            None => {
                tracing::debug!(name = tag.name, "Unsupported macro");
                if self.ctx.render.unsupported_macro.is_some() {
                    let fragment = self.ctx.unsupported_macro(tag.name);
                    self.push(&fragment);
                }
            }
            Some(def) if def.multiline => {
                tracing::debug!(name = tag.name, "Opening multiline macro");
                self.state = State::Capture {
                    call,
                    body: String::new(),
                };
            }
            Some(_) => {
                let fragment = call.invoke("")?;
                self.push(&fragment);
            }
        }

        Ok(())
    }

    fn close_capture(&mut self) -> Result<()> {
        let State::Capture { call, body } = std::mem::replace(&mut self.state, State::Normal)
        else {
            return Ok(());
        };

        let body = body.strip_suffix('\n').unwrap_or(&body);
        tracing::debug!(name = call.name, lines = body.lines().count(), "Closing multiline macro");

        let fragment = call.invoke(body)?;
        self.push(&fragment);
        Ok(())
    }

    fn header(&mut self, line: &str, text: &str, level: u8) -> Result<()> {
        let render = self.ctx.render;
        check_html(line, render.allow_html)?;

        let fragment = match &render.header {
            Some(f) => f(text, level),
            None => line.to_string(),
        };
        self.push(&fragment);
        Ok(())
    }

    fn image(&mut self, line: &str, url: &str, alt: &str, caption: &str) -> Result<()> {
        let render = self.ctx.render;
        check_html(line, render.allow_html)?;

        let caption = if caption.is_empty() {
            String::new()
        } else {
            render_inline(caption, self.ctx)?
        };

        let fragment = match &render.image {
            Some(f) => f(url, alt, &caption),
            None => line.to_string(),
        };
        self.push(&fragment);
        Ok(())
    }

    fn paragraph(&mut self, line: &str) -> Result<()> {
        let text = render_inline(line, self.ctx)?;

        let fragment = match &self.ctx.render.paragraph {
            Some(f) => f(&text),
            None => text,
        };
        self.push(&fragment);
        Ok(())
    }

    fn push(&mut self, fragment: &str) {
        self.output.push_str(fragment);
        self.output.push('\n');
    }

    /// Flush a capture left open at end of input and return the content.
    fn finish(mut self) -> Result<String> {
        if matches!(self.state, State::Capture { .. }) {
            tracing::debug!("Multiline macro not closed before end of document");
            self.close_capture()?;
        }
        Ok(self.output)
    }
}
