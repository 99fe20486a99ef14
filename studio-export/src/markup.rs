//! HTML synthesis for exported creatives.

use std::fmt::Write;

use studio_core::element::{ArrowStyle, Carousel, Element, ElementKind};
use studio_core::style::StyleProperty;
use studio_core::CanvasConfig;

use crate::assets::AssetRef;

/// Inline styles applied to every element container after its own style.
const CONTAINER_TAIL: &str = "display:flex;justify-content:center;align-items:center;\
overflow:hidden;transition:opacity 0.3s ease, transform 0.3s ease;";

const FILL: &str = "width:100%;height:100%;";

const ARROW_BUTTON: &str = "position:absolute;top:50%;transform:translateY(-50%);\
cursor:pointer;z-index:10;padding:5px;background:transparent;border:none;display:flex;\
align-items:center;justify-content:center;outline:none;";

/// Indicator dot colors, inactive and active.
pub const DOT_INACTIVE: &str = "rgba(255,255,255,0.5)";
/// Active indicator dot color.
pub const DOT_ACTIVE: &str = "#ffffff";

/// Escape special HTML characters for text and attribute values.
#[must_use]
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// DOM id of an element's container.
#[must_use]
pub fn dom_id(element: &Element) -> String {
    format!("el-{}", element.id)
}

/// Inline style of an element container at stacking position `index`.
///
/// The element's own `z-index` is dropped: stacking follows scene order.
#[must_use]
pub fn container_style(element: &Element, index: usize) -> String {
    let frame = &element.frame;
    let mut css = format!(
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;z-index:{index};",
        frame.x, frame.y, frame.width, frame.height
    );

    for declaration in element.style.declarations() {
        if declaration.property == StyleProperty::ZIndex {
            continue;
        }
        let _ = write!(
            css,
            "{}:{};",
            declaration.property.css_name(),
            declaration.value.to_css(declaration.property)
        );
    }

    css.push_str(CONTAINER_TAIL);

    if let Some(animation) = &element.animation {
        if let Some(duration) = animation.duration_secs {
            let _ = write!(css, "--anim-duration:{duration}s;");
        }
        if let Some(scale) = animation.scale {
            let _ = write!(css, "--anim-scale:{scale};");
        }
    }
    css
}

/// Class list of an element container.
#[must_use]
pub fn container_class(element: &Element) -> String {
    let mut class = String::from("rm-element");
    if let Some(animation) = &element.animation {
        class.push(' ');
        class.push_str(animation.kind.class_name());
        if animation.looping {
            class.push_str(" infinite");
        }
    }
    class
}

/// Full markup of one element at stacking position `index`.
#[must_use]
pub fn element_markup(element: &Element, index: usize, asset_dir: &str) -> String {
    format!(
        "<div id=\"{}\" class=\"{}\" style=\"{}\">{}</div>",
        dom_id(element),
        container_class(element),
        escape_html(&container_style(element, index)),
        inner_markup(element, asset_dir)
    )
}

/// Markup of every element in scene order.
#[must_use]
pub fn elements_markup<'a>(elements: impl IntoIterator<Item = &'a Element>, asset_dir: &str) -> String {
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| element_markup(element, index, asset_dir))
        .collect()
}

fn inner_markup(element: &Element, asset_dir: &str) -> String {
    let content = &element.content;
    let fit = element.style.object_fit.unwrap_or_default().keyword();

    match &element.kind {
        ElementKind::Text => format!(
            "<div style=\"{FILL}word-wrap:break-word;\">{}</div>",
            escape_html(content)
        ),
        ElementKind::Image => format!(
            "<img src=\"{}\" style=\"{FILL}object-fit:{fit};\" alt=\"{}\">",
            escape_html(content),
            escape_html(&element.name)
        ),
        ElementKind::Box => {
            if matches!(AssetRef::classify(content, asset_dir), AssetRef::Empty) {
                format!("<div style=\"{FILL}\"></div>")
            } else {
                format!(
                    "<img src=\"{}\" style=\"{FILL}object-fit:{fit};\" alt=\"bg\">",
                    escape_html(content)
                )
            }
        }
        ElementKind::Button { .. } => {
            let target = format!(
                "<div class=\"click-target\" style=\"cursor:pointer;{FILL}display:flex;\
align-items:center;justify-content:center;\">{}</div>",
                escape_html(content)
            );
            match element.link_url() {
                Some(link) => format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener\" \
style=\"display:block;{FILL}color:inherit;text-decoration:none;\">{target}</a>",
                    escape_html(link.trim())
                ),
                None => target,
            }
        }
        ElementKind::Video => format!(
            "<video src=\"{}\" autoplay muted loop playsinline style=\"{FILL}object-fit:cover;\"></video>",
            escape_html(content)
        ),
        ElementKind::Carousel(carousel) => carousel_markup(carousel),
    }
}

/// Carousel slides, arrows and indicator dots. Slide 0 starts visible and
/// slide animations always loop.
#[must_use]
pub fn carousel_markup(carousel: &Carousel) -> String {
    let mut html = format!("<div class=\"rm-carousel\" style=\"{FILL}position:relative;background:transparent;\">");

    for (i, image) in carousel.images.iter().enumerate() {
        let shown = i == 0;
        let background = image
            .background_color
            .as_ref()
            .map_or("transparent", |c| c.as_str());
        let class = match image.animation {
            Some(kind) => format!("rm-carousel-img {} infinite", kind.class_name()),
            None => "rm-carousel-img".to_string(),
        };
        let _ = write!(
            html,
            "<img class=\"{class}\" src=\"{}\" style=\"position:absolute;top:0;left:0;{FILL}\
object-fit:{};background:{background};opacity:{};transition:opacity 0.5s;z-index:{};\
transform:scale({});\" alt=\"\">",
            escape_html(&image.url),
            image.object_fit.keyword(),
            u8::from(shown),
            u8::from(shown),
            image.scale
        );
    }

    let (left, right) = arrow_shapes(carousel.arrow_type);
    for (class, side, shape) in [("rm-prev", "left", left), ("rm-next", "right", right)] {
        let _ = write!(
            html,
            "<button class=\"{class}\" style=\"{side}:0;{ARROW_BUTTON}\">{}</button>",
            arrow_svg(carousel, shape)
        );
    }

    if carousel.show_dots && !carousel.images.is_empty() {
        html.push_str(
            "<div class=\"rm-dots\" style=\"position:absolute;bottom:5px;left:50%;\
transform:translateX(-50%);display:flex;gap:4px;z-index:10;\">",
        );
        for i in 0..carousel.images.len() {
            let color = if i == 0 { DOT_ACTIVE } else { DOT_INACTIVE };
            let _ = write!(
                html,
                "<div class=\"rm-dot\" style=\"width:6px;height:6px;border-radius:50%;\
background:{color};cursor:pointer;\"></div>"
            );
        }
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}

/// SVG bodies of the previous and next arrows.
fn arrow_shapes(style: ArrowStyle) -> (&'static str, &'static str) {
    match style {
        ArrowStyle::Simple => (
            "<polyline points=\"15 18 9 12 15 6\"></polyline>",
            "<polyline points=\"9 18 15 12 9 6\"></polyline>",
        ),
        ArrowStyle::Circle => (
            "<circle cx=\"12\" cy=\"12\" r=\"10\"></circle><path d=\"M16 12H8\"></path><path d=\"m12 8-4 4 4 4\"></path>",
            "<circle cx=\"12\" cy=\"12\" r=\"10\"></circle><path d=\"M8 12h8\"></path><path d=\"m12 16 4-4-4-4\"></path>",
        ),
        ArrowStyle::Triangle => (
            "<polygon points=\"18 3 4 12 18 21 18 3\"></polygon>",
            "<polygon points=\"6 3 20 12 6 21 6 3\"></polygon>",
        ),
        ArrowStyle::Long => (
            "<path d=\"m12 19-7-7 7-7\"></path><path d=\"M19 12H5\"></path>",
            "<path d=\"M5 12h14\"></path><path d=\"m12 5 7 7-7 7\"></path>",
        ),
    }
}

fn arrow_svg(carousel: &Carousel, shape: &str) -> String {
    let size = carousel.arrow_size;
    let color = carousel.arrow_color.as_str();
    let fill = if carousel.arrow_type == ArrowStyle::Triangle {
        color
    } else {
        "none"
    };
    format!(
        "<svg width=\"{size}\" height=\"{size}\" viewBox=\"0 0 24 24\" fill=\"{fill}\" \
stroke=\"{color}\" stroke-width=\"2\" stroke-linecap=\"round\" stroke-linejoin=\"round\" \
style=\"display:block;\">{shape}</svg>"
    )
}

/// A stylesheet or script either referenced by path or embedded in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource<'a> {
    /// Referenced by relative path.
    Linked(&'a str),
    /// Embedded in the page.
    Inline(&'a str),
}

/// Everything that goes into the root page.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// Canvas size and background.
    pub canvas: &'a CanvasConfig,
    /// Shared click destination.
    pub click_tag: &'a str,
    /// Font stylesheet `<link>` tag.
    pub font_link: &'a str,
    /// Element markup, in stacking order.
    pub elements: &'a str,
    /// Stylesheet.
    pub stylesheet: Resource<'a>,
    /// Script.
    pub script: Resource<'a>,
}

/// JSON-encode `value` for embedding inside a `<script>` element.
#[must_use]
pub fn script_string(value: &str) -> String {
    let encoded = serde_json::Value::String(value.to_string()).to_string();
    encoded.replace("</", "<\\/")
}

/// Render the root page.
#[must_use]
pub fn page_html(page: &Page<'_>) -> String {
    let stylesheet = match page.stylesheet {
        Resource::Linked(path) => format!("<link rel=\"stylesheet\" href=\"{}\">", escape_html(path)),
        Resource::Inline(css) => format!("<style>\n{}\n</style>", css.replace("</style", "<\\/style")),
    };
    let script = match page.script {
        Resource::Linked(path) => format!("<script src=\"{}\"></script>", escape_html(path)),
        Resource::Inline(js) => format!(
            "<script type=\"text/javascript\">\n{}\n</script>",
            js.replace("</script", "<\\/script")
        ),
    };

    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"UTF-8\">
<meta name=\"ad.size\" content=\"width={width},height={height}\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
<script type=\"text/javascript\">
  var clickTag = {click_tag};
</script>
<link rel=\"preconnect\" href=\"https://fonts.googleapis.com\">
<link rel=\"preconnect\" href=\"https://fonts.gstatic.com\" crossorigin>
{font_link}
{stylesheet}
</head>
<body>
  <div id=\"ad-container\">
    {elements}
  </div>
  {script}
</body>
</html>
",
        width = page.canvas.width,
        height = page.canvas.height,
        click_tag = script_string(page.click_tag),
        font_link = page.font_link,
        elements = page.elements,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::element::{Animation, AnimationKind, ElementId, ElementType};
    use studio_core::style::{Length, Style};

    fn element(element_type: ElementType) -> Element {
        Element::with_defaults(ElementId::new(7), element_type, 10.0, 20.0, 320.0)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_container_style_positions_and_units() {
        let mut text = element(ElementType::Text);
        text.frame.width = 150.0;
        text.frame.height = 40.0;
        text.style = Style {
            font_size: Some(Length::Px(18.0)),
            opacity: Some(0.5),
            z_index: Some(99),
            ..Style::default()
        };

        let css = container_style(&text, 3);
        assert!(css.starts_with("position:absolute;left:10px;top:20px;width:150px;height:40px;z-index:3;"));
        assert!(css.contains("font-size:18px;"));
        assert!(css.contains("opacity:0.5;"));
        assert!(!css.contains("z-index:99"));
        assert!(css.ends_with("transition:opacity 0.3s ease, transform 0.3s ease;"));
    }

    #[test]
    fn test_animation_properties_and_classes() {
        let mut text = element(ElementType::Text);
        text.animation = Some(Animation {
            duration_secs: Some(1.5),
            scale: Some(1.2),
            ..Animation::new(AnimationKind::Pulse)
        });

        assert_eq!(container_class(&text), "rm-element custom-pulse infinite");
        let css = container_style(&text, 0);
        assert!(css.ends_with("--anim-duration:1.5s;--anim-scale:1.2;"));

        text.animation = Some(Animation {
            looping: false,
            ..Animation::new(AnimationKind::FadeIn)
        });
        assert_eq!(container_class(&text), "rm-element custom-fade-in");
    }

    #[test]
    fn test_text_content_is_escaped() {
        let mut text = element(ElementType::Text);
        text.content = "<script>alert(1)</script>".to_string();
        let html = element_markup(&text, 0, "assets");
        assert!(html.starts_with("<div id=\"el-7\" class=\"rm-element\""));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_button_wraps_anchor_only_with_link() {
        let mut button = element(ElementType::Button);
        button.content = "Shop".to_string();
        let html = element_markup(&button, 0, "assets");
        assert!(html.contains("class=\"click-target\""));
        assert!(!html.contains("<a "));

        button.kind = ElementKind::Button {
            link_url: Some("https://example.com/?a=1&b=2".to_string()),
        };
        let html = element_markup(&button, 0, "assets");
        assert!(html.contains("<a href=\"https://example.com/?a=1&amp;b=2\" target=\"_blank\""));
    }

    #[test]
    fn test_box_background_image() {
        let mut shape = element(ElementType::Box);
        shape.content = String::new();
        assert!(element_markup(&shape, 0, "assets").contains("<div style=\"width:100%;height:100%;\"></div>"));

        shape.content = "assets/el_7.png".to_string();
        assert!(element_markup(&shape, 0, "assets").contains("<img src=\"assets/el_7.png\""));
    }

    #[test]
    fn test_carousel_markup() {
        let carousel = element(ElementType::Carousel);
        let data = carousel.carousel().expect("carousel");
        let html = carousel_markup(data);

        assert_eq!(html.matches("class=\"rm-carousel-img\"").count(), data.images.len());
        assert_eq!(html.matches("class=\"rm-dot\"").count(), data.images.len());
        assert_eq!(html.matches(DOT_ACTIVE).count(), 1);
        assert!(html.contains("class=\"rm-prev\""));
        assert!(html.contains("class=\"rm-next\""));
        assert!(html.contains("<polyline points=\"15 18 9 12 15 6\">"));
    }

    #[test]
    fn test_slide_animations_loop() {
        let mut carousel = element(ElementType::Carousel);
        let data = carousel.carousel_mut().expect("carousel");
        data.images[0].animation = Some(AnimationKind::Pulse);
        let html = carousel_markup(data);

        let class = format!("class=\"rm-carousel-img {} infinite\"", AnimationKind::Pulse.class_name());
        assert!(html.contains(&class), "{html}");
        assert_eq!(html.matches("class=\"rm-carousel-img\"").count(), data.images.len() - 1);
    }

    #[test]
    fn test_triangle_arrows_are_filled() {
        let mut carousel = element(ElementType::Carousel);
        let data = carousel.carousel_mut().expect("carousel");
        data.arrow_type = ArrowStyle::Triangle;
        data.show_dots = false;
        let html = carousel_markup(data);
        assert!(html.contains(&format!("fill=\"{}\"", data.arrow_color.as_str())));
        assert!(!html.contains("rm-dot"));
    }

    #[test]
    fn test_script_string_cannot_close_script() {
        assert_eq!(script_string("https://x.com/\"a\""), "\"https://x.com/\\\"a\\\"\"");
        assert_eq!(script_string("</script>"), "\"<\\/script>\"");
    }
}
