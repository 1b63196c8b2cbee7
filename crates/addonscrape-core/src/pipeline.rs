//! Pipeline orchestrator: slug -> page -> envelope -> project data -> metadata -> artifact URL.
//!
//! Strictly sequential. Each run owns its session and intermediate values; a
//! `Pipeline` holds only configuration, so one instance can serve concurrent
//! runs from several threads.

use crate::config::ScraperConfig;
use crate::control::CancelToken;
use crate::error::{PipelineError, Stage, StageError};
use crate::extract::ContentExtractor;
use crate::project::{AddonMetadata, MetadataProjector};
use crate::redirect::RedirectResolver;
use crate::slug::AddonSlug;
use crate::upstream::UpstreamClient;
use crate::validate::{EnvelopeValidator, NotFoundReason, ValidationError};

/// Whether to stop after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Full,
    /// Return the extracted JSON text; skip projection and redirect resolution.
    Pure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Metadata(AddonMetadata),
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    upstream: UpstreamClient,
    validator: EnvelopeValidator,
    extractor: ContentExtractor,
    projector: MetadataProjector,
    resolver: RedirectResolver,
}

impl Pipeline {
    pub fn new(cfg: &ScraperConfig) -> Self {
        Self {
            upstream: UpstreamClient::new(cfg.upstream.clone()),
            validator: EnvelopeValidator::new(cfg.extract.not_found_marker.clone()),
            extractor: ContentExtractor::new(&cfg.extract),
            projector: MetadataProjector::new(&cfg.metadata),
            resolver: RedirectResolver::new(cfg.redirect.clone()),
        }
    }

    /// Runs every stage for `input` and stops at the first failure.
    ///
    /// Blocks the current thread. Setting `cancel` aborts the in-flight network
    /// call and keeps later stages from starting.
    pub fn run(
        &self,
        input: &str,
        mode: RunMode,
        cancel: &CancelToken,
    ) -> Result<Outcome, PipelineError> {
        let span = tracing::info_span!("scrape", slug = %input.trim());
        let _enter = span.enter();

        let result = self.run_stages(input, mode, cancel);
        match &result {
            Ok(_) => tracing::info!(?mode, "scrape finished"),
            Err(e) => tracing::warn!(stage = %e.stage, kind = %e.kind(), error = %e, "scrape failed"),
        }
        result
    }

    fn run_stages(
        &self,
        input: &str,
        mode: RunMode,
        cancel: &CancelToken,
    ) -> Result<Outcome, PipelineError> {
        let slug = at(Stage::Input, AddonSlug::parse(input))?;

        checkpoint(Stage::Scrape, cancel)?;
        tracing::debug!(stage = %Stage::Scrape, "stage started");
        let response = at(Stage::Scrape, self.upstream.fetch_page(&slug, cancel))?;

        tracing::debug!(stage = %Stage::Validate, http_status = response.http_status, "stage started");
        let page = at(Stage::Validate, self.validator.validate(response.envelope))?;

        checkpoint(Stage::Extract, cancel)?;
        tracing::debug!(stage = %Stage::Extract, "stage started");
        let extracted = at(Stage::Extract, self.extractor.extract(&page.content))?;
        if mode == RunMode::Pure {
            return Ok(Outcome::Raw(extracted.raw_json));
        }

        tracing::debug!(stage = %Stage::Project, "stage started");
        let metadata = self.projector.project(extracted.record);

        checkpoint(Stage::Redirect, cancel)?;
        tracing::debug!(stage = %Stage::Redirect, url = %metadata.download_url, "stage started");
        let final_url = at(
            Stage::Redirect,
            self.resolver
                .resolve(&metadata.download_url, &page.session, cancel),
        )?;

        Ok(Outcome::Metadata(metadata.with_final_url(final_url)))
    }

    /// Offline variant for a saved page: soft-404 sniff, extraction and
    /// projection. No network; `download_url_final` stays empty.
    pub fn extract_page(&self, content: &str) -> Result<AddonMetadata, PipelineError> {
        if self.validator.is_not_found_page(content) {
            return Err(PipelineError::new(
                Stage::Validate,
                ValidationError::NotFound(NotFoundReason::FallbackPage),
            ));
        }
        let extracted = at(Stage::Extract, self.extractor.extract(content))?;
        Ok(self.projector.project(extracted.record))
    }
}

fn at<T, E: Into<StageError>>(stage: Stage, result: Result<T, E>) -> Result<T, PipelineError> {
    result.map_err(|e| PipelineError::new(stage, e))
}

fn checkpoint(next: Stage, cancel: &CancelToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        return Err(PipelineError::cancelled(next));
    }
    Ok(())
}
