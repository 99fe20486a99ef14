//! Web font collection.
//!
//! Only the families a scene actually uses are requested, so the bundle does
//! not pull in unused font files.

use url::form_urlencoded;

use studio_core::Element;

use crate::markup::escape_html;

/// Google Fonts CSS API endpoint.
pub const GOOGLE_FONTS_CSS: &str = "https://fonts.googleapis.com/css2";

/// Distinct font families used by `elements`, in order of first use.
///
/// Falls back to `default_family` when no element sets one.
#[must_use]
pub fn collect_families<'a>(
    elements: impl IntoIterator<Item = &'a Element>,
    default_family: &str,
) -> Vec<String> {
    let mut families: Vec<String> = Vec::new();
    for element in elements {
        let Some(family) = element.style.font_family.as_deref() else {
            continue;
        };
        let family = family.split_whitespace().collect::<Vec<_>>().join(" ");
        if !family.is_empty() && !families.contains(&family) {
            families.push(family);
        }
    }
    if families.is_empty() {
        families.push(default_family.to_string());
    }
    families
}

/// Stylesheet URL requesting `weights` (e.g. `400;700`) of every family.
#[must_use]
pub fn font_url(families: &[String], weights: &str) -> String {
    let params: Vec<String> = families
        .iter()
        .map(|family| {
            let name: String = form_urlencoded::byte_serialize(family.as_bytes()).collect();
            format!("family={name}:wght@{weights}")
        })
        .collect();
    format!("{GOOGLE_FONTS_CSS}?{}&display=swap", params.join("&"))
}

/// `<link>` tag loading the font stylesheet.
#[must_use]
pub fn font_link(families: &[String], weights: &str) -> String {
    format!(
        "<link href=\"{}\" rel=\"stylesheet\">",
        escape_html(&font_url(families, weights))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::element::{ElementId, ElementType};

    fn with_font(id: u32, family: Option<&str>) -> Element {
        let mut element = Element::with_defaults(ElementId::new(id), ElementType::Text, 0.0, 0.0, 320.0);
        element.style.font_family = family.map(str::to_string);
        element
    }

    #[test]
    fn test_collect_distinct_families_in_order() {
        let elements = vec![
            with_font(1, Some("Open  Sans")),
            with_font(2, Some("Lato")),
            with_font(3, Some("Open Sans")),
            with_font(4, None),
        ];
        assert_eq!(
            collect_families(&elements, "Roboto"),
            vec!["Open Sans".to_string(), "Lato".to_string()]
        );
    }

    #[test]
    fn test_default_family() {
        let elements = vec![with_font(1, None), with_font(2, Some("   "))];
        assert_eq!(collect_families(&elements, "Roboto"), vec!["Roboto".to_string()]);
    }

    #[test]
    fn test_font_url() {
        let families = vec!["Open Sans".to_string(), "Roboto".to_string()];
        assert_eq!(
            font_url(&families, "400;700"),
            "https://fonts.googleapis.com/css2?family=Open+Sans:wght@400;700&family=Roboto:wght@400;700&display=swap"
        );
        assert!(font_link(&families, "400;700").contains("wght@400;700&amp;family=Roboto"));
    }
}
