//! Named cell styles.
//!
//! Styles are declared by name in the template and referenced by name from
//! cells. A style can be layered over another one (weekend fill over a time
//! cell, for example); the layered result is registered under a combined name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An RGB colour written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub u32);

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('#').unwrap_or(&value);
        if digits.len() != 6 {
            return Err(format!("invalid colour '{}': expected #RRGGBB", value));
        }
        u32::from_str_radix(digits, 16)
            .map(HexColor)
            .map_err(|_| format!("invalid colour '{}': expected #RRGGBB", value))
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

/// Visual attributes of a cell.
///
/// Every attribute is optional so that an overlay only changes what it sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellStyle {
    /// Bold font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    /// Italic font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Font colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<HexColor>,
    /// Solid background fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<HexColor>,
    /// Thin border on all four sides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<bool>,
    /// Horizontal alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<HorizontalAlign>,
    /// Vertically centered text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_center: Option<bool>,
    /// Wrap long text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    /// Number format such as `h:mm` or `[h]:mm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_format: Option<String>,
}

impl CellStyle {
    /// Returns this style with every attribute set in `overlay` replaced.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_report::report::{CellStyle, HexColor};
    ///
    /// let base = CellStyle { bold: Some(true), fill: Some(HexColor(0xFFFFFF)), ..Default::default() };
    /// let weekend = CellStyle { fill: Some(HexColor(0xFCE4D6)), ..Default::default() };
    ///
    /// let layered = base.layered(&weekend);
    /// assert_eq!(layered.bold, Some(true));
    /// assert_eq!(layered.fill, Some(HexColor(0xFCE4D6)));
    /// ```
    pub fn layered(&self, overlay: &CellStyle) -> CellStyle {
        CellStyle {
            bold: overlay.bold.or(self.bold),
            italic: overlay.italic.or(self.italic),
            font_size: overlay.font_size.or(self.font_size),
            font_color: overlay.font_color.or(self.font_color),
            fill: overlay.fill.or(self.fill),
            border: overlay.border.or(self.border),
            align: overlay.align.or(self.align),
            vertical_center: overlay.vertical_center.or(self.vertical_center),
            wrap: overlay.wrap.or(self.wrap),
            num_format: overlay.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }
}

/// Name under which `base` layered with `overlay` is registered.
pub fn layered_style_name(base: Option<&str>, overlay: &str) -> String {
    match base {
        Some(base) => format!("{}+{}", base, overlay),
        None => overlay.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parsing() {
        assert_eq!(HexColor::try_from("#4472C4".to_string()), Ok(HexColor(0x4472C4)));
        assert_eq!(HexColor::try_from("ff0000".to_string()), Ok(HexColor(0xFF0000)));
        assert!(HexColor::try_from("#12345".to_string()).is_err());
        assert!(HexColor::try_from("#GGGGGG".to_string()).is_err());
        assert_eq!(HexColor(0x00FF00).to_string(), "#00FF00");
    }

    #[test]
    fn test_style_deserializes_from_yaml() {
        let style: CellStyle = serde_yaml::from_str(
            "{ bold: true, fill: '#D9E1F2', align: center, num_format: '[h]:mm' }",
        )
        .unwrap();
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.fill, Some(HexColor(0xD9E1F2)));
        assert_eq!(style.align, Some(HorizontalAlign::Center));
        assert_eq!(style.num_format.as_deref(), Some("[h]:mm"));
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let result: Result<CellStyle, _> = serde_yaml::from_str("{ blink: true }");
        assert!(result.is_err());
    }

    #[test]
    fn test_layering_keeps_unset_attributes() {
        let base = CellStyle {
            num_format: Some("h:mm".to_string()),
            border: Some(true),
            ..Default::default()
        };
        let overlay = CellStyle {
            italic: Some(true),
            ..Default::default()
        };
        let layered = base.layered(&overlay);
        assert_eq!(layered.num_format.as_deref(), Some("h:mm"));
        assert_eq!(layered.border, Some(true));
        assert_eq!(layered.italic, Some(true));
    }

    #[test]
    fn test_layered_names() {
        assert_eq!(layered_style_name(Some("time"), "weekend"), "time+weekend");
        assert_eq!(layered_style_name(None, "weekend"), "weekend");
    }
}
