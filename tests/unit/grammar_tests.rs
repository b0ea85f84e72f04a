/*!
 * Tests for grammar realignment
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use autocaption::errors::CorrectionError;
use autocaption::grammar::mock::MockCorrector;
use autocaption::grammar::{CorrectionSummary, Corrector, FnCorrector, GrammarRealigner};
use autocaption::segment::TranscriptSegment;

fn three_segments() -> Vec<TranscriptSegment> {
    vec![
        TranscriptSegment::new(0.0, 1.5, " i has a apple"),
        TranscriptSegment::new(1.5, 3.0, " he go home"),
        TranscriptSegment::new(3.0, 4.5, " they was late"),
    ]
}

/// Answers later for earlier segments so completions arrive out of order
#[derive(Debug, Default)]
struct ReversedLatencyCorrector {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Corrector for ReversedLatencyCorrector {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let position: u64 = text.trim_start_matches("segment ").parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(60u64.saturating_sub(position * 5))).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("{} corrected", text))
    }
}

#[tokio::test]
async fn test_realign_all_withFailureOnSecondSegment_shouldKeepItsOriginalText() {
    let corrector = FnCorrector::new(|text: &str| {
        if text == "he go home" {
            Err(CorrectionError::RequestFailed("connection reset".to_string()))
        } else {
            Ok(text.replace("i has a apple", "I have an apple").replace("they was", "they were"))
        }
    });
    let realigner = GrammarRealigner::new(Arc::new(corrector));
    let segments = three_segments();

    let corrected = realigner.realign_all(&segments).await;

    assert_eq!(corrected.len(), 3);
    assert_eq!(corrected[0].text(), "I have an apple");
    assert!(!corrected[0].correction_failed);

    assert!(corrected[1].correction_failed);
    assert_eq!(corrected[1].text(), " he go home");
    assert_eq!(corrected[1].corrected_text, corrected[1].original_text);

    assert_eq!(corrected[2].text(), "they were late");

    for (source, result) in segments.iter().zip(&corrected) {
        assert_eq!(source.start, result.start);
        assert_eq!(source.end, result.end);
    }

    let summary = CorrectionSummary::from_segments(&corrected);
    assert_eq!(summary, CorrectionSummary { total: 3, changed: 2, failed: 1 });
}

#[tokio::test]
async fn test_realign_all_withOutOfOrderCompletion_shouldPreserveSegmentOrder() {
    let segments: Vec<TranscriptSegment> = (0..10)
        .map(|i| TranscriptSegment::new(i as f64, i as f64 + 1.0, format!("segment {}", i)))
        .collect();
    let corrector = Arc::new(ReversedLatencyCorrector::default());
    let realigner = GrammarRealigner::new(corrector.clone()).with_max_concurrent(4);

    let corrected = realigner.realign_all(&segments).await;

    for (i, segment) in corrected.iter().enumerate() {
        assert_eq!(segment.text(), format!("segment {} corrected", i));
        assert_eq!(segment.start, i as f64);
    }
    let peak = corrector.peak.load(Ordering::SeqCst);
    assert!((2..=4).contains(&peak), "peak concurrency was {}", peak);
}

#[tokio::test]
async fn test_realign_all_withBlankAnswers_shouldFallBack() {
    let realigner = GrammarRealigner::new(Arc::new(MockCorrector::empty()));

    let corrected = realigner.realign_all(&three_segments()).await;

    assert!(corrected.iter().all(|s| s.correction_failed));
    assert_eq!(corrected[2].text(), " they was late");
}

#[tokio::test]
async fn test_realign_all_withSlowCorrector_shouldTimeOutEachCall() {
    let mock = MockCorrector::slow(500);
    let realigner = GrammarRealigner::new(Arc::new(mock.clone())).with_call_timeout(Duration::from_millis(20));

    let corrected = realigner.realign_all(&three_segments()).await;

    assert_eq!(mock.request_count(), 3);
    assert!(corrected.iter().all(|s| s.correction_failed));
    assert_eq!(corrected[0].text(), " i has a apple");
}

#[tokio::test]
async fn test_realign_all_withIntermittentCorrector_shouldFailOnlyAffectedSegments() {
    let segments: Vec<TranscriptSegment> = (0..6)
        .map(|i| TranscriptSegment::new(i as f64, i as f64 + 1.0, format!("word {}", i)))
        .collect();
    let realigner = GrammarRealigner::new(Arc::new(MockCorrector::intermittent(3))).with_max_concurrent(1);

    let corrected = realigner.realign_all(&segments).await;

    let failed: Vec<bool> = corrected.iter().map(|s| s.correction_failed).collect();
    assert_eq!(failed, vec![false, false, true, false, false, true]);
    assert_eq!(corrected[0].text(), "WORD 0");
    assert_eq!(corrected[2].text(), "word 2");
}

#[tokio::test]
async fn test_realign_all_with_progress_shouldReportEveryCompletion() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let realigner = GrammarRealigner::new(Arc::new(MockCorrector::working())).with_max_concurrent(2);

    realigner
        .realign_all_with_progress(&three_segments(), move |done, total| {
            recorder.lock().unwrap().push((done, total));
        })
        .await;

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn test_realign_all_withNoSegments_shouldReturnEmpty() {
    let mock = MockCorrector::working();
    let realigner = GrammarRealigner::new(Arc::new(mock.clone()));

    assert!(realigner.realign_all(&[]).await.is_empty());
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_with_max_concurrent_withZero_shouldClampToOne() {
    let realigner = GrammarRealigner::new(Arc::new(MockCorrector::working())).with_max_concurrent(0);
    assert_eq!(realigner.max_concurrent(), 1);
}
