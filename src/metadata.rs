//! Exposure metadata parsing and display.
//!
//! The content collaborator merges EXIF and frontmatter before this crate sees
//! a photo, but it does not agree with itself on how exposure values are
//! written. The same shutter speed shows up as `0.004`, `"1/250"` or
//! `"1/250s"`; apertures as `2.8`, `"f/2.8"` or `"F2.8"`. This module turns
//! every accepted spelling into a plain number so range filters can compare
//! them, and formats numbers back into the conventional photographic
//! notation for the viewer.
//!
//! ## Resolution priority
//!
//! Text fields (camera, location) resolve from multiple sources with
//! [`resolve`]: the first non-empty value wins.
//!
//! ## Unparseable values
//!
//! A value that cannot be parsed is treated as absent. Range filters then
//! exclude the photo on that dimension, which is the documented behavior for
//! missing data.

use serde::Deserialize;

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value, trimmed.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// An exposure value as it appears in a catalog record: either a JSON number
/// or free text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn as_number(&self, parse: fn(&str) -> Option<f64>) -> Option<f64> {
        match self {
            RawValue::Number(n) => positive(*n),
            RawValue::Text(s) => parse(s),
        }
    }

    pub fn aperture(&self) -> Option<f64> {
        self.as_number(parse_aperture)
    }

    pub fn shutter_seconds(&self) -> Option<f64> {
        self.as_number(parse_shutter)
    }

    pub fn iso(&self) -> Option<f64> {
        self.as_number(parse_iso)
    }

    pub fn focal_length(&self) -> Option<f64> {
        self.as_number(parse_focal_length)
    }
}

fn positive(n: f64) -> Option<f64> {
    (n.is_finite() && n > 0.0).then_some(n)
}

fn parse_plain(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().and_then(positive)
}

/// Parse an f-number: `"f/2.8"`, `"F2.8"`, `"2.8"`.
pub fn parse_aperture(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s
        .strip_prefix("f/")
        .or_else(|| s.strip_prefix("F/"))
        .or_else(|| s.strip_prefix('f'))
        .or_else(|| s.strip_prefix('F'))
        .unwrap_or(s);
    parse_plain(s)
}

/// Parse a shutter speed into seconds: `"1/250"`, `"1/250s"`, `"2s"`,
/// `"2\""`, `"0.5"`.
pub fn parse_shutter(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s
        .strip_suffix("sec")
        .or_else(|| s.strip_suffix('s'))
        .or_else(|| s.strip_suffix('"'))
        .unwrap_or(s)
        .trim();
    match s.split_once('/') {
        Some((num, den)) => {
            let num = parse_plain(num)?;
            let den = parse_plain(den)?;
            positive(num / den)
        }
        None => parse_plain(s),
    }
}

/// Parse an ISO value: `"ISO 400"`, `"iso400"`, `"400"`.
pub fn parse_iso(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = match s.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("iso") => &s[3..],
        _ => s,
    };
    parse_plain(s)
}

/// Parse a focal length in millimetres: `"35mm"`, `"35 mm"`, `"35"`.
pub fn parse_focal_length(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s
        .strip_suffix("mm")
        .or_else(|| s.strip_suffix("MM"))
        .unwrap_or(s);
    parse_plain(s)
}

fn trim_number(n: f64) -> String {
    let s = format!("{:.1}", n);
    s.strip_suffix(".0").map(String::from).unwrap_or(s)
}

/// `2.8` → `"f/2.8"`, `8.0` → `"f/8"`.
pub fn format_aperture(f_number: f64) -> String {
    format!("f/{}", trim_number(f_number))
}

/// Sub-second speeds as fractions, longer ones in seconds:
/// `0.004` → `"1/250s"`, `2.0` → `"2s"`.
pub fn format_shutter(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("1/{}s", (1.0 / seconds).round() as u64)
    } else {
        format!("{}s", trim_number(seconds))
    }
}

pub fn format_iso(iso: u32) -> String {
    format!("ISO {}", iso)
}

pub fn format_focal_length(mm: f64) -> String {
    format!("{}mm", trim_number(mm))
}
