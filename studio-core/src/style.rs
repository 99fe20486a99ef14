//! Typed visual style properties.
//!
//! Styles are a closed set of known properties with explicit value types.
//! [`Style::declarations`] walks every field, so serialization to the flat
//! `name:value;` wire format is total: a new property cannot be added without
//! also being emitted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{StudioError, StudioResult};

/// A CSS length with an explicit unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "String")]
pub enum Length {
    /// Canvas pixels.
    Px(f32),
    /// Percentage of the containing block.
    Percent(f32),
    /// Relative to the element font size.
    Em(f32),
    /// Relative to the root font size.
    Rem(f32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<LengthRepr> for Length {
    type Error = StudioError;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(v) if v.is_finite() => Ok(Self::Px(v)),
            LengthRepr::Number(v) => Err(StudioError::InvalidStyle(format!("length {v}"))),
            LengthRepr::Text(text) => text.parse(),
        }
    }
}

impl FromStr for Length {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (number, ctor): (&str, fn(f32) -> Self) = if let Some(n) = s.strip_suffix("rem") {
            (n, Self::Rem)
        } else if let Some(n) = s.strip_suffix("em") {
            (n, Self::Em)
        } else if let Some(n) = s.strip_suffix("px") {
            (n, Self::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Self::Percent)
        } else {
            (s, Self::Px)
        };
        let value: f32 = number
            .trim()
            .parse()
            .map_err(|_| StudioError::InvalidStyle(format!("length {s:?}")))?;
        if !value.is_finite() {
            return Err(StudioError::InvalidStyle(format!("length {s:?}")));
        }
        Ok(ctor(value))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
            Self::Em(v) => write!(f, "{v}em"),
            Self::Rem(v) => write!(f, "{v}rem"),
        }
    }
}

impl From<Length> for String {
    fn from(length: Length) -> Self {
        length.to_string()
    }
}

/// A CSS color.
///
/// Accepts hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), functional notation
/// (`rgb()`, `rgba()`, `hsl()`, `hsla()`) and named keywords. Text that could
/// terminate a declaration or an attribute is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse a color.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidStyle`] if the text is not a supported color.
    pub fn parse(text: &str) -> StudioResult<Self> {
        let text = text.trim();
        let invalid = || StudioError::InvalidStyle(format!("color {text:?}"));

        if text.is_empty()
            || text
                .chars()
                .any(|c| matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\'' | '\\' | '\n'))
        {
            return Err(invalid());
        }

        if let Some(hex) = text.strip_prefix('#') {
            let valid_len = matches!(hex.len(), 3 | 4 | 6 | 8);
            if valid_len && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Ok(Self(text.to_ascii_lowercase()));
            }
            return Err(invalid());
        }

        let lower = text.to_ascii_lowercase();
        let functional = ["rgb(", "rgba(", "hsl(", "hsla("]
            .iter()
            .any(|prefix| lower.starts_with(prefix));
        if functional && lower.ends_with(')') {
            return Ok(Self(lower));
        }

        if lower.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(Self(lower));
        }

        Err(invalid())
    }

    /// A color known to be valid at compile time.
    pub(crate) fn from_static(text: &'static str) -> Self {
        Self(text.to_string())
    }

    /// The CSS text of this color.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Color {
    type Error = StudioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric font weight (100-900).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FontWeightRepr", into = "u16")]
pub struct FontWeight(u16);

#[derive(Deserialize)]
#[serde(untagged)]
enum FontWeightRepr {
    Number(u16),
    Text(String),
}

impl FontWeight {
    /// Regular weight.
    pub const NORMAL: Self = Self(400);
    /// Bold weight.
    pub const BOLD: Self = Self(700);

    /// Create a weight, rejecting values outside 1..=1000.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidStyle`] for out-of-range weights.
    pub fn new(weight: u16) -> StudioResult<Self> {
        if (1..=1000).contains(&weight) {
            Ok(Self(weight))
        } else {
            Err(StudioError::InvalidStyle(format!("font weight {weight}")))
        }
    }

    /// The numeric weight.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<FontWeightRepr> for FontWeight {
    type Error = StudioError;

    fn try_from(repr: FontWeightRepr) -> Result<Self, Self::Error> {
        match repr {
            FontWeightRepr::Number(n) => Self::new(n),
            FontWeightRepr::Text(text) => match text.trim() {
                "normal" => Ok(Self::NORMAL),
                "bold" => Ok(Self::BOLD),
                other => other
                    .parse::<u16>()
                    .map_err(|_| StudioError::InvalidStyle(format!("font weight {other:?}")))
                    .and_then(Self::new),
            },
        }
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

/// How media fills its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    /// Stretch to fill.
    Fill,
    /// Crop to cover.
    #[default]
    Cover,
    /// Letterbox to fit.
    Contain,
    /// Natural size.
    None,
}

impl ObjectFit {
    /// CSS keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::None => "none",
        }
    }
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    Normal,
    /// Italic.
    Italic,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justify,
}

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    /// No border.
    None,
    /// Solid line.
    Solid,
    /// Dashed line.
    Dashed,
    /// Dotted line.
    Dotted,
}

/// Every style property the editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum StyleProperty {
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    TextAlign,
    Color,
    BackgroundColor,
    BorderRadius,
    BorderWidth,
    BorderColor,
    BorderStyle,
    Padding,
    LetterSpacing,
    LineHeight,
    Opacity,
    ObjectFit,
    Scale,
    ZIndex,
}

impl StyleProperty {
    /// All properties, in emission order.
    pub const ALL: [Self; 18] = [
        Self::FontFamily,
        Self::FontSize,
        Self::FontWeight,
        Self::FontStyle,
        Self::TextAlign,
        Self::Color,
        Self::BackgroundColor,
        Self::BorderRadius,
        Self::BorderWidth,
        Self::BorderColor,
        Self::BorderStyle,
        Self::Padding,
        Self::LetterSpacing,
        Self::LineHeight,
        Self::Opacity,
        Self::ObjectFit,
        Self::Scale,
        Self::ZIndex,
    ];

    /// Structured (camelCase) property name, as stored in documents.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::FontWeight => "fontWeight",
            Self::FontStyle => "fontStyle",
            Self::TextAlign => "textAlign",
            Self::Color => "color",
            Self::BackgroundColor => "backgroundColor",
            Self::BorderRadius => "borderRadius",
            Self::BorderWidth => "borderWidth",
            Self::BorderColor => "borderColor",
            Self::BorderStyle => "borderStyle",
            Self::Padding => "padding",
            Self::LetterSpacing => "letterSpacing",
            Self::LineHeight => "lineHeight",
            Self::Opacity => "opacity",
            Self::ObjectFit => "objectFit",
            Self::Scale => "scale",
            Self::ZIndex => "zIndex",
        }
    }

    /// Flat wire-format (kebab-case) property name.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::FontFamily => "font-family",
            Self::FontSize => "font-size",
            Self::FontWeight => "font-weight",
            Self::FontStyle => "font-style",
            Self::TextAlign => "text-align",
            Self::Color => "color",
            Self::BackgroundColor => "background-color",
            Self::BorderRadius => "border-radius",
            Self::BorderWidth => "border-width",
            Self::BorderColor => "border-color",
            Self::BorderStyle => "border-style",
            Self::Padding => "padding",
            Self::LetterSpacing => "letter-spacing",
            Self::LineHeight => "line-height",
            Self::Opacity => "opacity",
            Self::ObjectFit => "object-fit",
            Self::Scale => "scale",
            Self::ZIndex => "z-index",
        }
    }

    /// Whether a bare number is emitted without a `px` suffix.
    #[must_use]
    pub const fn is_unitless(self) -> bool {
        matches!(
            self,
            Self::Opacity | Self::ZIndex | Self::FontWeight | Self::Scale | Self::LineHeight
        )
    }
}

/// A typed style value ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// A bare number; pixel lengths are carried this way.
    Number(f32),
    /// A length with a non-pixel unit.
    Length(Length),
    /// A color.
    Color(Color),
    /// A fixed keyword.
    Keyword(&'static str),
    /// A font family name.
    FontFamily(String),
}

impl From<Length> for StyleValue {
    fn from(length: Length) -> Self {
        match length {
            Length::Px(v) => Self::Number(v),
            other => Self::Length(other),
        }
    }
}

impl StyleValue {
    /// Whether the value can be written as CSS. NaN and infinities cannot.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Number(n) => n.is_finite(),
            Self::Length(Length::Px(v) | Length::Percent(v) | Length::Em(v) | Length::Rem(v)) => {
                v.is_finite()
            }
            Self::Color(_) | Self::Keyword(_) | Self::FontFamily(_) => true,
        }
    }

    /// Serialize the value for the given property.
    #[must_use]
    pub fn to_css(&self, property: StyleProperty) -> String {
        match self {
            Self::Number(n) if property.is_unitless() => format!("{n}"),
            Self::Number(n) => format!("{n}px"),
            Self::Length(length) => length.to_string(),
            Self::Color(color) => color.as_str().to_string(),
            Self::Keyword(keyword) => (*keyword).to_string(),
            Self::FontFamily(family) => quote_font_family(family),
        }
    }
}

/// Quote a family name for use inside a `style="..."` attribute.
fn quote_font_family(family: &str) -> String {
    let cleaned: String = family
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | ';' | '{' | '}' | '<' | '>' | '\\'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.contains(char::is_whitespace) {
        format!("'{cleaned}'")
    } else {
        cleaned.to_string()
    }
}

/// One `property:value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The property.
    pub property: StyleProperty,
    /// Its value.
    pub value: StyleValue,
}

/// Reject numbers that overflowed `f32` on the way in.
fn finite_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    match Option::<f32>::deserialize(deserializer)? {
        Some(v) if !v.is_finite() => Err(serde::de::Error::custom(format!("non-finite value {v}"))),
        other => Ok(other),
    }
}

/// Visual style of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_style: Option<BorderStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "finite_number")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "finite_number")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "finite_number")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl Style {
    /// All set properties as declarations, in [`StyleProperty::ALL`] order.
    ///
    /// Non-finite numbers are skipped.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn declarations(&self) -> Vec<Declaration> {
        let Self {
            font_family,
            font_size,
            font_weight,
            font_style,
            text_align,
            color,
            background_color,
            border_radius,
            border_width,
            border_color,
            border_style,
            padding,
            letter_spacing,
            line_height,
            opacity,
            object_fit,
            scale,
            z_index,
        } = self;

        let entries = [
            (
                StyleProperty::FontFamily,
                font_family.clone().map(StyleValue::FontFamily),
            ),
            (StyleProperty::FontSize, font_size.map(StyleValue::from)),
            (
                StyleProperty::FontWeight,
                font_weight.map(|w| StyleValue::Number(f32::from(w.value()))),
            ),
            (
                StyleProperty::FontStyle,
                font_style.map(|s| {
                    StyleValue::Keyword(match s {
                        FontStyle::Normal => "normal",
                        FontStyle::Italic => "italic",
                    })
                }),
            ),
            (
                StyleProperty::TextAlign,
                text_align.map(|a| {
                    StyleValue::Keyword(match a {
                        TextAlign::Left => "left",
                        TextAlign::Center => "center",
                        TextAlign::Right => "right",
                        TextAlign::Justify => "justify",
                    })
                }),
            ),
            (StyleProperty::Color, color.clone().map(StyleValue::Color)),
            (
                StyleProperty::BackgroundColor,
                background_color.clone().map(StyleValue::Color),
            ),
            (StyleProperty::BorderRadius, border_radius.map(StyleValue::from)),
            (StyleProperty::BorderWidth, border_width.map(StyleValue::from)),
            (
                StyleProperty::BorderColor,
                border_color.clone().map(StyleValue::Color),
            ),
            (
                StyleProperty::BorderStyle,
                border_style.map(|s| {
                    StyleValue::Keyword(match s {
                        BorderStyle::None => "none",
                        BorderStyle::Solid => "solid",
                        BorderStyle::Dashed => "dashed",
                        BorderStyle::Dotted => "dotted",
                    })
                }),
            ),
            (StyleProperty::Padding, padding.map(StyleValue::from)),
            (StyleProperty::LetterSpacing, letter_spacing.map(StyleValue::from)),
            (StyleProperty::LineHeight, line_height.map(StyleValue::Number)),
            (StyleProperty::Opacity, opacity.map(StyleValue::Number)),
            (
                StyleProperty::ObjectFit,
                object_fit.map(|f| StyleValue::Keyword(f.keyword())),
            ),
            (StyleProperty::Scale, scale.map(StyleValue::Number)),
            (StyleProperty::ZIndex, z_index.map(|z| StyleValue::Number(z as f32))),
        ];

        entries
            .into_iter()
            .filter_map(|(property, value)| value.map(|value| Declaration { property, value }))
            .filter(|declaration| {
                let finite = declaration.value.is_finite();
                if !finite {
                    tracing::debug!("Skipping non-finite {}", declaration.property.css_name());
                }
                finite
            })
            .collect()
    }

    /// Serialize to flat `name:value;` pairs.
    #[must_use]
    pub fn to_css(&self) -> String {
        self.declarations()
            .iter()
            .map(|d| format!("{}:{};", d.property.css_name(), d.value.to_css(d.property)))
            .collect()
    }

    /// Overlay every property set in `patch` onto this style.
    pub fn merge(&mut self, patch: &Style) {
        fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        let Style {
            font_family,
            font_size,
            font_weight,
            font_style,
            text_align,
            color,
            background_color,
            border_radius,
            border_width,
            border_color,
            border_style,
            padding,
            letter_spacing,
            line_height,
            opacity,
            object_fit,
            scale,
            z_index,
        } = patch;

        overlay(&mut self.font_family, font_family);
        overlay(&mut self.font_size, font_size);
        overlay(&mut self.font_weight, font_weight);
        overlay(&mut self.font_style, font_style);
        overlay(&mut self.text_align, text_align);
        overlay(&mut self.color, color);
        overlay(&mut self.background_color, background_color);
        overlay(&mut self.border_radius, border_radius);
        overlay(&mut self.border_width, border_width);
        overlay(&mut self.border_color, border_color);
        overlay(&mut self.border_style, border_style);
        overlay(&mut self.padding, padding);
        overlay(&mut self.letter_spacing, letter_spacing);
        overlay(&mut self.line_height, line_height);
        overlay(&mut self.opacity, opacity);
        overlay(&mut self.object_fit, object_fit);
        overlay(&mut self.scale, scale);
        overlay(&mut self.z_index, z_index);
    }
}
