//! HTML rendering of a [`Presentation`] into a reveal.js page.

use html_escape::{encode_double_quoted_attribute, encode_text};
use unprepared_common::{Presentation, Slide};

pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/presentation.html");

/// Fills `{{name}}` placeholders in `template`. Unknown names are left as-is.
pub fn render_html(presentation: &Presentation, template: &str) -> String {
    let slides: String = presentation.slides.iter().map(render_slide).collect();
    let attribute = |value: &str| encode_double_quoted_attribute(value).into_owned();
    substitute(template, |name| match name {
        "title" => Some(encode_text(&presentation.title).into_owned()),
        "fontFamily" => Some(attribute(&presentation.font_family)),
        "fontHref" => Some(attribute(&font_href(&presentation.font_family))),
        "textColor" => Some(attribute(&presentation.text_color)),
        "background" => Some(attribute(&background_css(presentation))),
        "slides" => Some(slides.clone()),
        _ => None,
    })
}

/// Single pass, so substituted text is never rescanned.
fn substitute(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let name = after[..close].trim();
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn background_css(presentation: &Presentation) -> String {
    match presentation.gradient_color.as_deref().filter(|g| !g.is_empty()) {
        Some(gradient) => format!(
            "linear-gradient(135deg, {}, {gradient})",
            presentation.background_color
        ),
        None => presentation.background_color.clone(),
    }
}

/// Google Fonts stylesheet URL. Words are percent-encoded and joined with `+`.
fn font_href(font_family: &str) -> String {
    let family = font_family
        .split_whitespace()
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("+");
    format!("https://fonts.googleapis.com/css2?family={family}&display=swap")
}

fn render_slide(slide: &Slide) -> String {
    let mut markdown = format!("## {}\n\n{}", slide.title, slide.content);
    if let Some(url) = &slide.image_url {
        let alt = slide.image_description.as_deref().unwrap_or_default();
        markdown.push_str(&format!(
            "\n\n<img class=\"slide-image\" src=\"{}\" alt=\"{}\">",
            encode_double_quoted_attribute(url),
            encode_double_quoted_attribute(alt)
        ));
    }
    let class = if slide.is_last_slide { "slide last-slide" } else { "slide" };
    format!(
        concat!(
            "      <section data-markdown class=\"{class}\">\n",
            "        <textarea data-template>\n{markdown}\n        </textarea>\n",
            "      </section>\n",
        ),
        class = class,
        markdown = encode_text(&markdown),
    )
}
