//! Integration tests for the sentiment analysis pipeline
//! Run with: cargo test --features integration

#![cfg(feature = "integration")]

use sentiment_analyzer::classifier::shared_classifier;
use sentiment_analyzer::config::ModelConfig;
use sentiment_analyzer::error::{PipelineError, Result};
use sentiment_analyzer::presentation::Palette;
use sentiment_analyzer::sentiment::{Label, SentimentAnalysisPipelineBuilder};

#[test]
fn sentiment_positive() -> Result<()> {
    let pipeline = SentimentAnalysisPipelineBuilder::distilbert().build()?;

    let output = pipeline.run("I love this!")?;
    assert_eq!(output.prediction.label, Label::Positive);
    assert!(output.prediction.score > 0.5 && output.prediction.score <= 1.0);
    assert_eq!(Palette::for_label(&output.prediction.label).background, "#d4edda");
    Ok(())
}

#[test]
fn sentiment_negative() -> Result<()> {
    let pipeline = SentimentAnalysisPipelineBuilder::distilbert().build()?;

    let output = pipeline.run("I hate this.")?;
    assert_eq!(output.prediction.label, Label::Negative);
    assert!(output.prediction.score > 0.5 && output.prediction.score <= 1.0);
    assert_eq!(Palette::for_label(&output.prediction.label).background, "#f8d7da");
    Ok(())
}

#[test]
fn sentiment_rejects_empty_input() -> Result<()> {
    let pipeline = SentimentAnalysisPipelineBuilder::distilbert().build()?;
    assert!(matches!(pipeline.run(""), Err(PipelineError::EmptyInput)));
    Ok(())
}

#[test]
fn sentiment_batch_matches_single() -> Result<()> {
    let pipeline = SentimentAnalysisPipelineBuilder::distilbert().build()?;

    let texts: &[&str] = &[
        "I absolutely love this product!",
        "This is terrible, worst experience ever.",
        "Great service, highly recommend!",
        "The staff was rude and unhelpful.",
    ];

    let batched = pipeline.run(texts)?;
    assert_eq!(batched.results.len(), texts.len());

    for (text, batch) in texts.iter().zip(batched.results) {
        let single = pipeline.run(*text)?.prediction;
        let batch = batch.prediction?;
        assert_eq!(single.label, batch.label, "labels differ for {text:?}");
        assert!((single.score - batch.score).abs() < 1e-3);
        assert!(matches!(batch.label, Label::Positive | Label::Negative));
    }
    Ok(())
}

#[test]
fn shared_classifier_loads_once() -> Result<()> {
    let config = ModelConfig::default();
    let first = shared_classifier(&config)?;
    let second = shared_classifier(&config)?;
    assert!(std::ptr::eq(first, second));

    let rebuilt = SentimentAnalysisPipelineBuilder::distilbert().build()?;
    assert_eq!(rebuilt.model_id(), first.model_id());
    Ok(())
}
