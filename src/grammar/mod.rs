/*!
 * Grammar correction with timing preserved.
 *
 * Each transcript segment's text is sent independently to a correction engine
 * and the corrected text is put back on the segment's original time bounds.
 * A failing, slow, or blank-answering engine never breaks the pipeline: the
 * affected segment keeps its original text and is tagged `correction_failed`.
 *
 * - `languagetool`: HTTP client for a LanguageTool server
 * - `mock`: Scriptable corrector for tests
 */

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::CorrectionError;
use crate::segment::{CorrectedSegment, TranscriptSegment, normalize_whitespace};

pub mod languagetool;
pub mod mock;

/// A grammar-correction engine
///
/// Implementations map one string to its corrected form or fail. Calls for
/// different segments are independent and may run concurrently.
#[async_trait]
pub trait Corrector: Send + Sync + Debug {
    /// Correct a single piece of text
    async fn correct(&self, text: &str) -> Result<String, CorrectionError>;
}

/// Adapts a plain function or closure into a `Corrector`
pub struct FnCorrector<F> {
    func: F,
}

impl<F> FnCorrector<F>
where
    F: Fn(&str) -> Result<String, CorrectionError> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Debug for FnCorrector<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnCorrector")
    }
}

#[async_trait]
impl<F> Corrector for FnCorrector<F>
where
    F: Fn(&str) -> Result<String, CorrectionError> + Send + Sync,
{
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        (self.func)(text)
    }
}

/// Corrects one segment, falling back to its original text on any failure
///
/// A result that is blank after whitespace normalization is treated as a
/// failure: an engine returning nothing cannot be told apart from an outage.
pub async fn realign_segment(
    segment: &TranscriptSegment,
    corrector: &dyn Corrector,
    call_timeout: Duration,
) -> CorrectedSegment {
    let original = segment.text.trim();

    let outcome = match tokio::time::timeout(call_timeout, corrector.correct(original)).await {
        Ok(result) => result,
        Err(_) => Err(CorrectionError::Timeout(call_timeout.as_millis() as u64)),
    };

    match outcome {
        Ok(corrected) => {
            let normalized = normalize_whitespace(&corrected);
            if normalized.is_empty() && !original.is_empty() {
                warn!(
                    "Correction returned blank text for segment at {:.3}s, keeping original",
                    segment.start
                );
                CorrectedSegment::fallback(segment)
            } else {
                CorrectedSegment::with_correction(segment, normalized)
            }
        }
        Err(e) => {
            warn!(
                "Correction failed for segment at {:.3}s, keeping original: {}",
                segment.start, e
            );
            CorrectedSegment::fallback(segment)
        }
    }
}

/// Counts of what correction did to a transcript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionSummary {
    /// Number of segments processed
    pub total: usize,
    /// Segments whose text changed
    pub changed: usize,
    /// Segments that kept their original text because correction failed
    pub failed: usize,
}

impl CorrectionSummary {
    pub fn from_segments(segments: &[CorrectedSegment]) -> Self {
        Self {
            total: segments.len(),
            changed: segments.iter().filter(|s| s.is_changed()).count(),
            failed: segments.iter().filter(|s| s.correction_failed).count(),
        }
    }
}

impl std::fmt::Display for CorrectionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} corrections applied ({} segments, {} kept original after failure)",
            self.changed, self.total, self.failed
        )
    }
}

/// Concurrent grammar correction over a whole transcript
#[derive(Debug, Clone)]
pub struct GrammarRealigner {
    /// The correction engine
    corrector: Arc<dyn Corrector>,

    /// Maximum number of correction calls in flight
    max_concurrent: usize,

    /// Per-call timeout
    call_timeout: Duration,
}

impl GrammarRealigner {
    /// Create a realigner with default concurrency (4) and timeout (30s)
    pub fn new(corrector: Arc<dyn Corrector>) -> Self {
        Self {
            corrector,
            max_concurrent: 4,
            call_timeout: Duration::from_secs(30),
        }
    }

    /// Set the number of concurrent correction calls (at least one)
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Set the per-call timeout
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Correct every segment, returning results in original segment order
    pub async fn realign_all(&self, segments: &[TranscriptSegment]) -> Vec<CorrectedSegment> {
        self.realign_all_with_progress(segments, |_, _| {}).await
    }

    /// Correct every segment and report progress after each completed call
    ///
    /// Calls complete in any order; each result lands in the slot of its
    /// source segment and the full vector is only returned once every call
    /// has finished.
    pub async fn realign_all_with_progress(
        &self,
        segments: &[TranscriptSegment],
        progress_callback: impl Fn(usize, usize) + Clone + Send,
    ) -> Vec<CorrectedSegment> {
        let total = segments.len();
        let completed = Arc::new(AtomicUsize::new(0));

        let results = stream::iter(segments.iter().enumerate())
            .map(|(index, segment)| {
                let corrector = Arc::clone(&self.corrector);
                let completed = Arc::clone(&completed);
                let progress_callback = progress_callback.clone();
                let call_timeout = self.call_timeout;

                async move {
                    let corrected = realign_segment(segment, corrector.as_ref(), call_timeout).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(done, total);
                    (index, corrected)
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        let mut slots: Vec<Option<CorrectedSegment>> = vec![None; total];
        for (index, corrected) in results {
            slots[index] = Some(corrected);
        }

        let ordered: Vec<CorrectedSegment> = slots
            .into_iter()
            .zip(segments)
            .map(|(slot, segment)| slot.unwrap_or_else(|| CorrectedSegment::fallback(segment)))
            .collect();

        debug!("{}", CorrectionSummary::from_segments(&ordered));
        ordered
    }
}
