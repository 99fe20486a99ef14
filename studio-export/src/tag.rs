//! Third-party ad tag and trafficking sheet.

use studio_core::CanvasConfig;

/// Header row of the trafficking sheet.
pub const CSV_HEADER: &str = "Creative Name,Width,Height,Third-party Tag,Integration Code\n";

/// Integration code written for every tag.
pub const INTEGRATION_CODE: &str = "Standard";

/// A single-file tag and the CSV sheet that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSheet {
    /// The full page with inline stylesheet and script.
    pub html: String,
    /// Header plus one row holding the minified tag.
    pub csv: String,
}

/// Drop whitespace between tags and trim the ends.
#[must_use]
pub fn minify(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pending = String::new();
    for c in html.trim().chars() {
        if c.is_whitespace() && out.ends_with('>') {
            pending.push(c);
            continue;
        }
        if !pending.is_empty() {
            if c != '<' {
                out.push_str(&pending);
            }
            pending.clear();
        }
        out.push(c);
    }
    out.push_str(&pending);
    out
}

/// Quote a CSV field when it contains a separator, quote or line break.
#[must_use]
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Build the sheet for `html`.
#[must_use]
pub fn tag_sheet(creative_name: &str, canvas: &CanvasConfig, html: &str) -> TagSheet {
    let tag = minify(html);
    let csv = format!(
        "{CSV_HEADER}{},{},{},\"{}\",{INTEGRATION_CODE}\n",
        csv_field(creative_name),
        canvas.width,
        canvas.height,
        tag.replace('"', "\"\"")
    );
    TagSheet {
        html: html.to_string(),
        csv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_only_touches_whitespace_between_tags() {
        assert_eq!(
            minify("  <div>\n  <p>a  b</p>\n</div>  "),
            "<div><p>a  b</p></div>"
        );
        assert_eq!(minify("<b>x</b> y"), "<b>x</b> y");
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(csv_field("Banner"), "Banner");
        assert_eq!(csv_field("Spring, 2026"), "\"Spring, 2026\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_tag_sheet_row() {
        let sheet = tag_sheet("Banner", &CanvasConfig::default(), "<a href=\"x\">\n</a>");
        assert_eq!(
            sheet.csv,
            format!("{CSV_HEADER}Banner,320,480,\"<a href=\"\"x\"\"></a>\",Standard\n")
        );
    }
}
