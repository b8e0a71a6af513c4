use std::time::Instant;

use autocomplete_core::filter::Filter;
use autocomplete_core::model::{normalize, Candidate, NormalizedItem};

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

fn corpus() -> Vec<NormalizedItem> {
    let candidates: Vec<Candidate> = (0..10_000)
        .map(|i| Candidate::from(format!("Document_{i:05}.txt")))
        .collect();
    normalize(candidates)
}

#[test]
fn starts_with_p95_under_budget() {
    let items = corpus();
    let filter = Filter::StartsWith;

    for _ in 0..10 {
        let _ = filter.apply(items.clone(), "document_09");
    }

    let mut samples = Vec::with_capacity(40);
    for _ in 0..40 {
        let batch = items.clone();
        let start = Instant::now();
        let results = filter.apply(batch, "document_09");
        samples.push(start.elapsed().as_secs_f64() * 1000.0);
        assert_eq!(results.len(), 1_000);
    }

    let p95 = p95_ms(&mut samples);
    assert!(p95 <= 150.0, "startsWith p95 too high: {p95:.3}ms (budget 150.0ms)");
}
