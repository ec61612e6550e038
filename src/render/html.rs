//! Bundled HTML render configuration.

use super::Render;

impl Render {
    /// A render configuration producing plain HTML.
    ///
    /// Span callbacks wrap their text without escaping it, since it may
    /// already hold output from earlier spans. URLs, alt texts, header text
    /// and code are escaped.
    pub fn html() -> Self {
        Render::new()
            .header(|text, level| format!("<h{0}>{1}</h{0}>", level, escape_html(text)))
            .paragraph(|text| format!("<p>{}</p>", text))
            .bold(|text| format!("<strong>{}</strong>", text))
            .italic(|text| format!("<em>{}</em>", text))
            .underline(|text| format!("<u>{}</u>", text))
            .strikethrough(|text| format!("<del>{}</del>", text))
            .superscript(|text| format!("<sup>{}</sup>", text))
            .subscript(|text| format!("<sub>{}</sub>", text))
            .code(|text| format!("<code>{}</code>", escape_html(text)))
            .hr(|| "<hr>".to_string())
            .link(|url, text| {
                let text = if text.is_empty() { url } else { text };
                format!("<a href=\"{}\">{}</a>", escape_html(url), text)
            })
            .inline_image(|url, alt| img_tag(url, alt))
            .image(|url, alt, caption| {
                if caption.is_empty() {
                    format!("<figure>{}</figure>", img_tag(url, alt))
                } else {
                    format!(
                        "<figure>{}<figcaption>{}</figcaption></figure>",
                        img_tag(url, alt),
                        caption
                    )
                }
            })
    }
}

fn img_tag(url: &str, alt: &str) -> String {
    format!(
        "<img src=\"{}\" alt=\"{}\">",
        escape_html(url),
        escape_html(alt)
    )
}

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_html_render() {
        let input = "++++\nTitle: T\nAuthor: A\n++++\nh2. Intro\n\
                     Some *bold* text with `a < b` and [a site|https://example.com].\n\
                     ----\n\
                     !cat.png|A cat! The _best_ cat\n";

        let post = process(input, Some(&Render::html())).unwrap();

        assert_eq!(
            post.content,
            "<h2>Intro</h2>\n\
             <p>Some <strong>bold</strong> text with <code>a &lt; b</code> and <a href=\"https://example.com\">a site</a>.</p>\n\
             <p><hr></p>\n\
             <figure><img src=\"cat.png\" alt=\"A cat\"><figcaption>The <em>best</em> cat</figcaption></figure>\n"
        );
    }
}
