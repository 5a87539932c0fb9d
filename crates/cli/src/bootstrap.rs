//! Wiring shared by every command that talks to the completion service.

use std::sync::Arc;

use anyhow::Context;
use wf_advisor::TurnProcessor;
use wf_contextpack::{mime_from_path, DocumentContext, DocumentExtractor, PlainTextExtractor};
use wf_domain::config::Config;
use wf_providers::{LlmProvider, OpenAiCompatProvider};

/// Build the turn processor for the configured endpoint.
pub fn build_processor(config: &Config, model: Option<String>) -> anyhow::Result<TurnProcessor> {
    let provider = OpenAiCompatProvider::from_config(&config.llm)
        .with_context(|| format!("initializing provider '{}'", config.llm.id))?;
    let provider: Arc<dyn LlmProvider> = Arc::new(provider);

    tracing::debug!(
        provider = provider.provider_id(),
        base_url = %config.llm.base_url,
        "provider ready"
    );

    Ok(TurnProcessor::new(provider, config).with_model(model))
}

/// Read and extract a document from disk.
///
/// `Ok(None)` means the file was read but yielded no usable text (an
/// unsupported type, or blank content).
pub fn load_document(
    path: &str,
    extractor: &dyn DocumentExtractor,
) -> anyhow::Result<Option<DocumentContext>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {path}"))?;
    let text = extractor
        .extract(&bytes, mime_from_path(path))
        .with_context(|| format!("extracting text from {path}"))?;
    Ok(DocumentContext::from_extracted(path, text))
}

/// [`load_document`] with the built-in plain-text extractor.
pub fn load_plain_document(path: &str) -> anyhow::Result<Option<DocumentContext>> {
    load_document(path, &PlainTextExtractor)
}
