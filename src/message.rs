//! The `filter-changed` message.
//!
//! One message type crosses the channel. It is a tagged variant rather than
//! a loose object: the album page's simple surface publishes
//! [`FilterChanged::Tags`], the all-photos explorer publishes
//! [`FilterChanged::Advanced`]. Consumers match on the variant and never
//! have to guess which fields exist.
//!
//! ## Wire Form
//!
//! Hosts that bridge to untyped code exchange the JSON form:
//!
//! ```text
//! { "activeTags": ["street", "night"], "tagLogic": "and" }
//! { "activeTags": [], "tagLogic": "or",
//!   "filters": { "albumIds": ["street"], "iso": { "min": 100, "max": 800 } } }
//! ```
//!
//! [`FilterChanged::from_json`] is the validation boundary for that form.
//! Unknown keys are rejected to catch typos early.
//!
//! ## Normalization
//!
//! Tags are lowercased and trimmed by the publisher. [`FilterChanged::normalized`]
//! does this and is applied by [`FilterChannel::publish`](crate::channel::FilterChannel::publish),
//! so listeners can rely on it.

use crate::filter::{DateRange, FilterState, RangeFilter, TagLogic};
use crate::naming;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Message validation error: {0}")]
    Validation(String),
}

/// Non-tag predicates carried by the advanced surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AdvancedFilters {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub album_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub camera_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture: Option<RangeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutter_speed: Option<RangeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<RangeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<RangeFilter>,
}

impl AdvancedFilters {
    fn validate(&self) -> Result<(), MessageError> {
        let ranges = [
            ("aperture", &self.aperture),
            ("shutterSpeed", &self.shutter_speed),
            ("iso", &self.iso),
            ("focalLength", &self.focal_length),
        ];
        for (name, range) in ranges {
            let Some(range) = range else { continue };
            if range.min.is_none() && range.max.is_none() {
                return Err(MessageError::Validation(format!(
                    "{name} range must have at least one bound"
                )));
            }
            if range.min.is_some_and(|v| v < 0.0) || range.max.is_some_and(|v| v < 0.0) {
                return Err(MessageError::Validation(format!(
                    "{name} range bounds must not be negative"
                )));
            }
        }
        Ok(())
    }
}

/// Payload of the `filter-changed` message.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChanged {
    /// Simple tag toggle (album pages).
    Tags {
        active_tags: Vec<String>,
        tag_logic: TagLogic,
    },
    /// Multi-dimensional explorer (all-photos page).
    Advanced {
        active_tags: Vec<String>,
        tag_logic: TagLogic,
        filters: AdvancedFilters,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WirePayload {
    #[serde(default)]
    active_tags: Vec<String>,
    #[serde(default)]
    tag_logic: TagLogic,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filters: Option<AdvancedFilters>,
}

fn normalize_list(values: &[String], lowercase: bool) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| if lowercase { v.to_lowercase() } else { v.to_string() })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl FilterChanged {
    /// Build the message describing a filter state. `advanced` selects the
    /// variant.
    pub fn from_state(state: &FilterState, advanced: bool) -> Self {
        let active_tags: Vec<String> = state.active_tags.iter().cloned().collect();
        if !advanced {
            return FilterChanged::Tags {
                active_tags,
                tag_logic: state.tag_logic,
            };
        }
        FilterChanged::Advanced {
            active_tags,
            tag_logic: state.tag_logic,
            filters: AdvancedFilters {
                album_ids: state.album_ids.iter().cloned().collect(),
                camera_names: state.camera_names.iter().cloned().collect(),
                date_range: state.date_range,
                aperture: state.aperture,
                shutter_speed: state.shutter_speed,
                iso: state.iso,
                focal_length: state.focal_length,
            },
        }
    }

    pub fn active_tags(&self) -> &[String] {
        match self {
            FilterChanged::Tags { active_tags, .. } | FilterChanged::Advanced { active_tags, .. } => {
                active_tags
            }
        }
    }

    pub fn tag_logic(&self) -> TagLogic {
        match self {
            FilterChanged::Tags { tag_logic, .. } | FilterChanged::Advanced { tag_logic, .. } => {
                *tag_logic
            }
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, FilterChanged::Advanced { .. })
    }

    /// Tags lowercased, trimmed, deduplicated and sorted; camera names
    /// lowercased; album ids trimmed.
    pub fn normalized(self) -> Self {
        let tags =
            |tags: Vec<String>| -> Vec<String> { naming::normalize_tags(tags).into_iter().collect() };
        match self {
            FilterChanged::Tags {
                active_tags,
                tag_logic,
            } => FilterChanged::Tags {
                active_tags: tags(active_tags),
                tag_logic,
            },
            FilterChanged::Advanced {
                active_tags,
                tag_logic,
                mut filters,
            } => {
                filters.album_ids = normalize_list(&filters.album_ids, false);
                filters.camera_names = normalize_list(&filters.camera_names, true);
                FilterChanged::Advanced {
                    active_tags: tags(active_tags),
                    tag_logic,
                    filters,
                }
            }
        }
    }

    /// Rebuild the filter state this message describes.
    pub fn to_state(&self) -> FilterState {
        let mut state = FilterState {
            active_tags: naming::normalize_tags(self.active_tags()),
            tag_logic: self.tag_logic(),
            ..FilterState::default()
        };
        if let FilterChanged::Advanced { filters, .. } = self {
            state.album_ids = normalize_list(&filters.album_ids, false).into_iter().collect();
            state.camera_names = normalize_list(&filters.camera_names, true)
                .into_iter()
                .collect();
            state.date_range = filters.date_range;
            state.aperture = filters.aperture;
            state.shutter_speed = filters.shutter_speed;
            state.iso = filters.iso;
            state.focal_length = filters.focal_length;
        }
        state
    }

    /// Parse and validate the JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, MessageError> {
        let wire: WirePayload = serde_json::from_str(json)?;
        let message = match wire.filters {
            Some(filters) => {
                filters.validate()?;
                FilterChanged::Advanced {
                    active_tags: wire.active_tags,
                    tag_logic: wire.tag_logic,
                    filters,
                }
            }
            None => FilterChanged::Tags {
                active_tags: wire.active_tags,
                tag_logic: wire.tag_logic,
            },
        };
        Ok(message.normalized())
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> Result<String, MessageError> {
        let wire = WirePayload {
            active_tags: self.active_tags().to_vec(),
            tag_logic: self.tag_logic(),
            filters: match self {
                FilterChanged::Advanced { filters, .. } => Some(filters.clone()),
                FilterChanged::Tags { .. } => None,
            },
        };
        Ok(serde_json::to_string(&wire)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_payload_parses_and_normalizes() {
        let msg =
            FilterChanged::from_json(r#"{ "activeTags": [" Street", "NIGHT", "street"], "tagLogic": "or" }"#)
                .unwrap();
        assert_eq!(
            msg,
            FilterChanged::Tags {
                active_tags: vec!["night".to_string(), "street".to_string()],
                tag_logic: TagLogic::Any,
            }
        );
    }

    #[test]
    fn advanced_payload_carries_filters() {
        let msg = FilterChanged::from_json(
            r#"{
                "activeTags": [],
                "tagLogic": "and",
                "filters": {
                    "albumIds": ["street"],
                    "cameraNames": ["Leica M6"],
                    "iso": { "min": 100, "max": 800 }
                }
            }"#,
        )
        .unwrap();
        assert!(msg.is_advanced());
        let state = msg.to_state();
        assert!(state.album_ids.contains("street"));
        assert!(state.camera_names.contains("leica m6"));
        assert_eq!(state.iso, Some(RangeFilter::new(100.0, 800.0)));
    }

    #[test]
    fn date_range_accepts_min_max_keys() {
        let parse = |range: &str| {
            let json = format!(
                r#"{{ "activeTags": [], "tagLogic": "and", "filters": {{ "dateRange": {range} }} }}"#
            );
            FilterChanged::from_json(&json).unwrap().to_state().date_range
        };
        let from_to = parse(r#"{ "from": "2023-01-01T00:00:00Z", "to": "2023-12-31T23:59:59Z" }"#);
        let min_max = parse(r#"{ "min": "2023-01-01T00:00:00Z", "max": "2023-12-31T23:59:59Z" }"#);
        assert!(from_to.is_some_and(|r| r.from.is_some() && r.to.is_some()));
        assert_eq!(from_to, min_max);
    }

    #[test]
    fn unknown_tag_logic_is_rejected() {
        let result = FilterChanged::from_json(r#"{ "activeTags": [], "tagLogic": "xor" }"#);
        assert!(matches!(result, Err(MessageError::Json(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = FilterChanged::from_json(r#"{ "activeTag": ["street"] }"#);
        assert!(matches!(result, Err(MessageError::Json(_))));
    }

    #[test]
    fn boundless_range_is_rejected() {
        let result = FilterChanged::from_json(
            r#"{ "activeTags": [], "tagLogic": "and", "filters": { "aperture": {} } }"#,
        );
        assert!(matches!(result, Err(MessageError::Validation(_))));
    }

    #[test]
    fn negative_range_is_rejected() {
        let result = FilterChanged::from_json(
            r#"{ "activeTags": [], "tagLogic": "and", "filters": { "iso": { "min": -1 } } }"#,
        );
        assert!(matches!(result, Err(MessageError::Validation(_))));
    }

    #[test]
    fn state_round_trips_through_message() {
        let mut state = FilterState::seeded("night");
        state.tag_logic = TagLogic::Any;
        state.toggle_album("night");
        state.iso = Some(RangeFilter::at_least(800.0));

        let msg = FilterChanged::from_state(&state, true);
        assert_eq!(msg.to_state(), state);
    }

    #[test]
    fn simple_message_drops_other_dimensions() {
        let mut state = FilterState::seeded("night");
        state.toggle_album("night");
        let msg = FilterChanged::from_state(&state, false);
        assert!(!msg.is_advanced());
        assert!(msg.to_state().album_ids.is_empty());
    }

    #[test]
    fn json_form_uses_camel_case() {
        let msg = FilterChanged::from_state(&FilterState::seeded("street"), false);
        let json = msg.to_json().unwrap();
        assert_eq!(json, r#"{"activeTags":["street"],"tagLogic":"and"}"#);
    }
}
