//! Maps a sentiment label to how the page looks.
//!
//! [`Palette::for_label`] is total: `POSITIVE` and `NEGATIVE` get their own
//! colors, anything else (and the initial page) gets the neutral palette.

use serde::Serialize;

use crate::sentiment::Label;

/// Style of the status box that announces the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Green box.
    Success,
    /// Red box.
    Error,
    /// Blue box.
    Info,
}

/// Colors, icon and headline for one sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    /// Page background color.
    pub background: &'static str,
    /// Foreground color for text and the input border.
    pub text: &'static str,
    /// Emoji shown next to the verdict.
    pub icon: &'static str,
    /// Verdict headline.
    pub heading: &'static str,
    /// Status box style.
    pub tone: Tone,
}

impl Palette {
    /// Light green.
    pub const POSITIVE: Palette = Palette {
        background: "#d4edda",
        text: "#155724",
        icon: "😊",
        heading: "Sentiment: Positive 😊",
        tone: Tone::Success,
    };

    /// Light red.
    pub const NEGATIVE: Palette = Palette {
        background: "#f8d7da",
        text: "#721c24",
        icon: "😠",
        heading: "Sentiment: Negative 😠",
        tone: Tone::Error,
    };

    /// Light gray, also the page's initial state.
    pub const NEUTRAL: Palette = Palette {
        background: "#f8f9fa",
        text: "#212529",
        icon: "😐",
        heading: "Sentiment: Neutral 😐",
        tone: Tone::Info,
    };

    /// Palette for `label`. Unrecognized labels fall back to [`Palette::NEUTRAL`].
    pub fn for_label(label: &Label) -> Palette {
        match label {
            Label::Positive => Palette::POSITIVE,
            Label::Negative => Palette::NEGATIVE,
            Label::Other(_) => Palette::NEUTRAL,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::NEUTRAL
    }
}

/// Formats a probability as a percentage with two decimals, e.g. `0.9987` → `99.87%`.
pub fn format_confidence(score: f32) -> String {
    format!("{:.2}%", f64::from(score.clamp(0.0, 1.0)) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_is_light_green() {
        let palette = Palette::for_label(&Label::Positive);
        assert_eq!(palette.background, "#d4edda");
        assert_eq!(palette.text, "#155724");
        assert_eq!(palette.tone, Tone::Success);
    }

    #[test]
    fn negative_is_light_red() {
        let palette = Palette::for_label(&Label::Negative);
        assert_eq!(palette.background, "#f8d7da");
        assert_eq!(palette.text, "#721c24");
        assert_eq!(palette.tone, Tone::Error);
    }

    #[test]
    fn anything_else_is_neutral() {
        for raw in ["NEUTRAL", "LABEL_2", ""] {
            assert_eq!(Palette::for_label(&Label::Other(raw.into())), Palette::NEUTRAL);
        }
        assert_eq!(Palette::default(), Palette::NEUTRAL);
    }

    #[test]
    fn mapping_is_deterministic() {
        for label in [Label::Positive, Label::Negative, Label::Other("x".into())] {
            assert_eq!(Palette::for_label(&label), Palette::for_label(&label.clone()));
        }
    }

    #[test]
    fn confidence_is_a_two_decimal_percentage() {
        assert_eq!(format_confidence(0.99874), "99.87%");
        assert_eq!(format_confidence(0.5), "50.00%");
        assert_eq!(format_confidence(1.0), "100.00%");
        assert_eq!(format_confidence(1.5), "100.00%");
    }

    #[test]
    fn tone_serializes_as_css_class() {
        assert_eq!(serde_json::to_string(&Tone::Success).unwrap(), "\"success\"");
    }
}
