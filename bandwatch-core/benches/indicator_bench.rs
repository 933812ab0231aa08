//! Criterion benchmarks for the indicator engine and evaluator.
//!
//! Benchmarks:
//! 1. RSI over an intraday-sized and a max-history-sized series
//! 2. Bollinger envelope over the same series
//! 3. Full frame compute + evaluation

use chrono::{Duration, FixedOffset, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bandwatch_core::domain::{Bar, BarSeries, Granularity};
use bandwatch_core::indicators::{Bollinger, Indicator, IndicatorFrame, IndicatorParams, Rsi};
use bandwatch_core::signals::{SignalEvaluator, ThresholdConfig};
use bandwatch_core::sizing::RiskConfig;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let ist = FixedOffset::east_opt(19_800).unwrap();
    let start = ist.with_ymd_and_hms(2020, 1, 2, 9, 15, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar {
                timestamp: start + Duration::minutes(5 * i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: Some(1_000_000 + (i as u64 % 500_000)),
            }
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    // 75 ≈ one trading day of 5m buckets; 5000 ≈ a long monthly/daily history.
    for n in [75usize, 5_000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::new("rsi_23", n), &bars, |b, bars| {
            let rsi = Rsi::new(23);
            b.iter(|| rsi.compute(black_box(bars)))
        });
        group.bench_with_input(BenchmarkId::new("bollinger_20", n), &bars, |b, bars| {
            let bb = Bollinger::lower(20, 2.0);
            b.iter(|| bb.compute_bands(black_box(bars)))
        });
    }
    group.finish();
}

fn bench_frame_and_signals(c: &mut Criterion) {
    let series = BarSeries::new("BENCH", Granularity::Intraday5m, make_bars(5_000)).unwrap();
    let evaluator = SignalEvaluator::new(ThresholdConfig::sell_side());
    let risk = RiskConfig::default();

    c.bench_function("frame_plus_evaluate_5000", |b| {
        b.iter(|| {
            let frame = IndicatorFrame::compute(black_box(&series), &IndicatorParams::default());
            evaluator.evaluate_frame(&frame, &risk)
        })
    });
}

criterion_group!(benches, bench_indicators, bench_frame_and_signals);
criterion_main!(benches);
