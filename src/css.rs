//! CSS length normalization.
//!
//! Themes author the dropdown's max height in whatever unit suits them; the
//! placement math needs plain pixels.

use crate::error::UiError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthUnit {
    Px,
    Rem,
    Em,
    Vh,
    Vw,
    Vmin,
    Vmax,
    /// Percent of the viewport height.
    Percent,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
}

impl LengthUnit {
    fn from_suffix(suffix: &str) -> Result<Self, UiError> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "" | "px" => LengthUnit::Px,
            "rem" => LengthUnit::Rem,
            "em" => LengthUnit::Em,
            "vh" => LengthUnit::Vh,
            "vw" => LengthUnit::Vw,
            "vmin" => LengthUnit::Vmin,
            "vmax" => LengthUnit::Vmax,
            "%" => LengthUnit::Percent,
            "pt" => LengthUnit::Pt,
            "pc" => LengthUnit::Pc,
            "in" => LengthUnit::In,
            "cm" => LengthUnit::Cm,
            "mm" => LengthUnit::Mm,
            other => return Err(UiError::UnknownUnit(other.to_string())),
        };
        Ok(unit)
    }
}

/// What relative units resolve against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    pub root_font_size: f64,
    pub font_size: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for LengthContext {
    fn default() -> Self {
        Self {
            root_font_size: 16.0,
            font_size: 16.0,
            viewport_width: 1280.0,
            viewport_height: 720.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssLength {
    pub value: f64,
    pub unit: LengthUnit,
}

impl CssLength {
    pub fn parse(raw: &str) -> Result<Self, UiError> {
        let trimmed = raw.trim();
        let split = numeric_prefix_len(trimmed);
        let (number, suffix) = trimmed.split_at(split);
        let value: f64 = number
            .parse()
            .map_err(|_| UiError::InvalidLength(raw.to_string()))?;
        if !value.is_finite() {
            return Err(UiError::InvalidLength(raw.to_string()));
        }
        Ok(Self {
            value,
            unit: LengthUnit::from_suffix(suffix.trim())?,
        })
    }

    pub fn to_px(&self, ctx: &LengthContext) -> f64 {
        let v = self.value;
        match self.unit {
            LengthUnit::Px => v,
            LengthUnit::Rem => v * ctx.root_font_size,
            LengthUnit::Em => v * ctx.font_size,
            LengthUnit::Vh | LengthUnit::Percent => v * ctx.viewport_height / 100.0,
            LengthUnit::Vw => v * ctx.viewport_width / 100.0,
            LengthUnit::Vmin => v * ctx.viewport_width.min(ctx.viewport_height) / 100.0,
            LengthUnit::Vmax => v * ctx.viewport_width.max(ctx.viewport_height) / 100.0,
            LengthUnit::Pt => v * 96.0 / 72.0,
            LengthUnit::Pc => v * 16.0,
            LengthUnit::In => v * 96.0,
            LengthUnit::Cm => v * 96.0 / 2.54,
            LengthUnit::Mm => v * 96.0 / 25.4,
        }
    }
}

/// Length of the leading number, including an exponent only when one is
/// really there (`1e2px` vs `2em`).
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i = 1;
    }
    i = digits_from(i);
    if bytes.get(i) == Some(&b'.') {
        i = digits_from(i + 1);
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if bytes.get(j).is_some_and(u8::is_ascii_digit) {
            i = digits_from(j);
        }
    }
    i
}

/// Resolve an authored length to pixels, or `fallback` when it is empty,
/// `none`, or unparseable.
pub fn length_to_px(raw: &str, ctx: &LengthContext, fallback: f64) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return fallback;
    }
    match CssLength::parse(trimmed) {
        Ok(len) => len.to_px(ctx),
        Err(err) => {
            log::warn!("{err}; using {fallback}px");
            fallback
        }
    }
}
