use minijinja::Environment;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::presentation::{format_confidence, Palette};
use crate::sentiment::{Label, Prediction};

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

pub(crate) const PLACEHOLDER: &str =
    "e.g., I love this new feature! It's absolutely amazing. Or: This is terrible, I hate it.";

/// What the single page currently shows.
#[derive(Debug, Clone, Default)]
pub enum PageState {
    /// Fresh page, neutral colors.
    #[default]
    Idle,
    /// Submitted blank text; colors stay neutral.
    EmptyInput,
    /// A classification to display.
    Classified(Prediction),
    /// The classifier failed on this request.
    Failed(String),
}

#[derive(Serialize)]
struct ResultView {
    label: String,
    confidence: String,
    balloons: bool,
}

#[derive(Serialize)]
struct PageView<'a> {
    palette: Palette,
    placeholder: &'a str,
    text: &'a str,
    warning: Option<String>,
    failure: Option<&'a str>,
    result: Option<ResultView>,
}

/// Compiled page template.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Compiles the embedded page template.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE).map_err(|e| {
            PipelineError::Unexpected(format!("Failed to parse page template: {e}"))
        })?;
        Ok(Self { env })
    }

    /// Renders the page for `state`, echoing the submitted `text` back into the input.
    pub fn render(&self, text: &str, state: &PageState) -> Result<String> {
        let palette = match state {
            PageState::Classified(prediction) => Palette::for_label(&prediction.label),
            _ => Palette::NEUTRAL,
        };

        let view = PageView {
            palette,
            placeholder: PLACEHOLDER,
            text,
            warning: matches!(state, PageState::EmptyInput)
                .then(|| PipelineError::EmptyInput.to_string()),
            failure: match state {
                PageState::Failed(reason) => Some(reason.as_str()),
                _ => None,
            },
            result: match state {
                PageState::Classified(prediction) => Some(ResultView {
                    label: prediction.label.to_string(),
                    confidence: format_confidence(prediction.score),
                    balloons: prediction.label == Label::Positive,
                }),
                _ => None,
            },
        };

        self.env
            .get_template("index.html")
            .map_err(|e| PipelineError::Unexpected(format!("Failed to get page template: {e}")))?
            .render(view)
            .map_err(|e| PipelineError::Unexpected(format!("Failed to render page: {e}")))
    }
}
