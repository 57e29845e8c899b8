//! Markdown to HTML for the note preview.

use pulldown_cmark::{html as md_html, Event, LinkType, Options, Parser, Tag, TagEnd};

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Converts note markdown into preview HTML.
///
/// Tables, strikethrough and task lists are enabled. Fenced code blocks keep
/// their info string as a `language-*` class for the highlighter, and links
/// open in a new browsing context. Inline HTML in the source is passed
/// through untouched; sanitising is up to whoever displays the result.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::Start(Tag::Link { link_type, dest_url, title, .. }) => {
            let href = if link_type == LinkType::Email {
                format!("mailto:{dest_url}")
            } else {
                dest_url.to_string()
            };
            let mut open = format!("<a href=\"{}\"", html_escape(&href));
            if !title.is_empty() {
                open.push_str(&format!(" title=\"{}\"", html_escape(&title)));
            }
            open.push_str(" target=\"_blank\" rel=\"noopener noreferrer\">");
            Event::InlineHtml(open.into())
        }
        Event::End(TagEnd::Link) => Event::InlineHtml("</a>".into()),
        other => other,
    });

    let mut html_output = String::with_capacity(text.len() * 3 / 2);
    md_html::push_html(&mut html_output, events);
    html_output
}
