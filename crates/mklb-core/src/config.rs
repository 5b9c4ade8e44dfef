#![forbid(unsafe_code)]

//! Lightbox configuration: page selectors, CSS class names, and timing.
//!
//! The defaults are the contract with the stylesheet that ships next to the
//! widget. Every name here is applied verbatim to the DOM; changing one means
//! changing the stylesheet too.
//!
//! With the `serde` feature the whole tree can be loaded from JSON. Missing
//! fields fall back to their defaults, so `{}` is a valid configuration.

use std::time::Duration;

use crate::error::ConfigError;
use crate::marker::Marker;

/// Default length of one transition phase.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

/// Whole milliseconds, rounded up and saturating.
fn millis_ceil(delay: Duration) -> u64 {
    u64::try_from(delay.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

fn is_class_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(char::is_whitespace)
}

/// Class names for the visual-state markers on slides and the wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MarkerNames {
    pub shown: String,
    pub from_left: String,
    pub to_left: String,
    pub from_right: String,
    pub to_right: String,
}

impl Default for MarkerNames {
    fn default() -> Self {
        Self {
            shown: "shown".into(),
            from_left: "from-left".into(),
            to_left: "to-left".into(),
            from_right: "from-right".into(),
            to_right: "to-right".into(),
        }
    }
}

impl MarkerNames {
    /// Class name for a marker.
    #[must_use]
    pub fn name(&self, marker: Marker) -> &str {
        match marker {
            Marker::Shown => &self.shown,
            Marker::FromLeft => &self.from_left,
            Marker::ToLeft => &self.to_left,
            Marker::FromRight => &self.from_right,
            Marker::ToRight => &self.to_right,
        }
    }
}

/// Class names for the overlay structure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct OverlayClasses {
    pub wrapper: String,
    pub close: String,
    pub arrow: String,
    pub previous: String,
    pub next: String,
}

impl Default for OverlayClasses {
    fn default() -> Self {
        Self {
            wrapper: "lightbox-wrapper".into(),
            close: "lightbox-close".into(),
            arrow: "lightbox-arrow".into(),
            previous: "lightbox-arrow--previous".into(),
            next: "lightbox-arrow--next".into(),
        }
    }
}

/// Top-level lightbox configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LightboxConfig {
    /// Selector for trigger images.
    pub item_selector: String,
    /// Attribute holding the optional group identifier.
    pub group_attribute: String,
    /// Length of one transition phase, in milliseconds.
    pub transition_ms: u64,
    pub markers: MarkerNames,
    pub classes: OverlayClasses,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            item_selector: "img.mklbItem".into(),
            group_attribute: "data-gallery".into(),
            transition_ms: millis_ceil(DEFAULT_TRANSITION),
            markers: MarkerNames::default(),
            classes: OverlayClasses::default(),
        }
    }
}

impl LightboxConfig {
    /// Set the trigger selector.
    pub fn item_selector(mut self, selector: impl Into<String>) -> Self {
        self.item_selector = selector.into();
        self
    }

    /// Set the group attribute.
    pub fn group_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.group_attribute = attribute.into();
        self
    }

    /// Set the transition length. Sub-millisecond parts round up.
    pub fn transition(mut self, delay: Duration) -> Self {
        self.transition_ms = millis_ceil(delay);
        self
    }

    /// Set the marker class names.
    pub fn markers(mut self, markers: MarkerNames) -> Self {
        self.markers = markers;
        self
    }

    /// Set the overlay class names.
    pub fn classes(mut self, classes: OverlayClasses) -> Self {
        self.classes = classes;
        self
    }

    /// Length of one transition phase.
    #[inline]
    #[must_use]
    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Reject values the widget cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transition_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "transition_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if self.item_selector.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "item_selector",
                reason: "must not be empty".into(),
            });
        }
        if self.group_attribute.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "group_attribute",
                reason: "must not be empty".into(),
            });
        }
        let m = &self.markers;
        let names = [&m.shown, &m.from_left, &m.to_left, &m.from_right, &m.to_right];
        for (i, name) in names.iter().enumerate() {
            if !is_class_name(name) {
                return Err(ConfigError::Invalid {
                    field: "markers",
                    reason: format!("`{name}` is not a single class name"),
                });
            }
            if names[..i].contains(name) {
                return Err(ConfigError::Invalid {
                    field: "markers",
                    reason: format!("`{name}` is used for two markers"),
                });
            }
        }
        // Structural classes never collide with markers: closing strips
        // markers, and `is_open` reads the shown marker off the wrapper.
        let c = &self.classes;
        for class in [&c.wrapper, &c.close, &c.arrow, &c.previous, &c.next] {
            if !is_class_name(class) {
                return Err(ConfigError::Invalid {
                    field: "classes",
                    reason: format!("`{class}` is not a single class name"),
                });
            }
            if names.contains(&class) {
                return Err(ConfigError::Invalid {
                    field: "classes",
                    reason: format!("`{class}` is also a marker name"),
                });
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stylesheet_contract() {
        let config = LightboxConfig::default();
        assert_eq!(config.item_selector, "img.mklbItem");
        assert_eq!(config.group_attribute, "data-gallery");
        assert_eq!(config.transition_delay(), Duration::from_millis(300));
        assert_eq!(config.markers.name(Marker::Shown), "shown");
        assert_eq!(config.markers.name(Marker::FromLeft), "from-left");
        assert_eq!(config.markers.name(Marker::ToLeft), "to-left");
        assert_eq!(config.markers.name(Marker::FromRight), "from-right");
        assert_eq!(config.markers.name(Marker::ToRight), "to-right");
        assert_eq!(config.classes.wrapper, "lightbox-wrapper");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = LightboxConfig::default()
            .item_selector("img.zoom")
            .group_attribute("data-set")
            .transition(Duration::from_millis(120));
        assert_eq!(config.item_selector, "img.zoom");
        assert_eq!(config.group_attribute, "data-set");
        assert_eq!(config.transition_ms, 120);
    }

    #[test]
    fn transition_rounds_up_to_whole_millis() {
        let config = LightboxConfig::default().transition(Duration::from_micros(500));
        assert_eq!(config.transition_ms, 1);
        assert!(config.validate().is_ok());

        let config = LightboxConfig::default().transition(Duration::from_micros(120_001));
        assert_eq!(config.transition_ms, 121);

        let config = LightboxConfig::default().transition(Duration::MAX);
        assert_eq!(config.transition_ms, u64::MAX);
    }

    #[test]
    fn zero_transition_rejected() {
        let config = LightboxConfig::default().transition(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "transition_ms",
                ..
            })
        ));
    }

    #[test]
    fn duplicate_marker_rejected() {
        let markers = MarkerNames {
            to_left: "shown".into(),
            ..MarkerNames::default()
        };
        let config = LightboxConfig::default().markers(markers);
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlay_class_clashing_with_marker_rejected() {
        let classes = OverlayClasses {
            wrapper: "shown".into(),
            ..OverlayClasses::default()
        };
        assert!(matches!(
            LightboxConfig::default().classes(classes).validate(),
            Err(ConfigError::Invalid {
                field: "classes",
                ..
            })
        ));

        // Clash with a renamed marker.
        let config = LightboxConfig::default()
            .markers(MarkerNames {
                to_left: "lightbox-close".into(),
                ..MarkerNames::default()
            });
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_overlay_class_rejected() {
        let classes = OverlayClasses {
            arrow: String::new(),
            ..OverlayClasses::default()
        };
        assert!(LightboxConfig::default().classes(classes).validate().is_err());
    }

    #[test]
    fn marker_with_space_rejected() {
        let markers = MarkerNames {
            shown: "is shown".into(),
            ..MarkerNames::default()
        };
        assert!(LightboxConfig::default().markers(markers).validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_partial_config_keeps_defaults() {
        let config =
            LightboxConfig::from_json(r#"{"transition_ms": 450, "markers": {"shown": "on"}}"#)
                .unwrap();
        assert_eq!(config.transition_ms, 450);
        assert_eq!(config.markers.shown, "on");
        assert_eq!(config.markers.from_left, "from-left");
        assert_eq!(config.item_selector, "img.mklbItem");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_errors_are_reported() {
        assert!(matches!(
            LightboxConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            LightboxConfig::from_json(r#"{"transition_ms": 0}"#),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            LightboxConfig::from_json(r#"{"classes": {"wrapper": "shown"}}"#),
            Err(ConfigError::Invalid {
                field: "classes",
                ..
            })
        ));
    }
}
