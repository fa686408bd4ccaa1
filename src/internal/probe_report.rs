#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]

use std::{collections::HashSet, error::Error};

use log::{debug, info};
use plotters::prelude::*;
use probing_table::{ProbingTable, TableError, logger::initialize_logger};
use rand::Rng;

// Every table starts small so the runs go through several doublings
const INITIAL_CAPACITY: usize = 64;
const NUM_KEYS: usize = 10_000;
const NUM_MISSES: usize = 2_000;
const THRESHOLDS: [f64; 8] = [0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95];

const CHURN_ROUNDS: usize = 40;
const CHURN_BATCH: usize = 500;
const CHURN_THRESHOLD: f64 = 0.9;

const FONT_FAMILY: &str = "sans-serif";

struct ThresholdStats {
    threshold: f64,
    avg_hit: f64,
    avg_miss: f64,
    worst_hit: usize,
    capacity: usize,
}

struct ChurnSample {
    round: usize,
    live: usize,
    tombstones: usize,
    capacity: usize,
}

fn mean(lengths: &[usize]) -> f64 {
    if lengths.is_empty() {
        return 0.0;
    }
    lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
}

// Inserts every hit key under one threshold, then measures lookups of hits and misses
fn measure_threshold(
    threshold: f64,
    hits: &[u64],
    misses: &[u64],
) -> Result<ThresholdStats, TableError> {
    let mut table = ProbingTable::with_threshold(INITIAL_CAPACITY, threshold)?;
    for &key in hits {
        table.set(key, key)?;
    }

    let hit_lengths: Vec<usize> = hits.iter().map(|key| table.probe_length(key)).collect();
    let miss_lengths: Vec<usize> = misses.iter().map(|key| table.probe_length(key)).collect();
    debug!("threshold {threshold}: load factor {:.3}", table.load_factor());

    Ok(ThresholdStats {
        threshold,
        avg_hit: mean(&hit_lengths),
        avg_miss: mean(&miss_lengths),
        worst_hit: hit_lengths.iter().copied().max().unwrap_or(0),
        capacity: table.capacity(),
    })
}

// Inserts a batch and deletes half as many random live keys per round
fn measure_churn(rng: &mut impl Rng) -> Result<Vec<ChurnSample>, TableError> {
    let mut table = ProbingTable::with_threshold(INITIAL_CAPACITY, CHURN_THRESHOLD)?;
    let mut live: Vec<u64> = Vec::new();
    let mut samples = Vec::with_capacity(CHURN_ROUNDS);

    for round in 0..CHURN_ROUNDS {
        for _ in 0..CHURN_BATCH {
            let key: u64 = rng.random();
            if table.set(key, round)?.is_none() {
                live.push(key);
            }
        }
        for _ in 0..CHURN_BATCH / 2 {
            let key = live.swap_remove(rng.random_range(0..live.len()));
            table.delete(&key)?;
        }

        samples.push(ChurnSample {
            round,
            live: table.len(),
            tombstones: table.tombstone_count(),
            capacity: table.capacity(),
        });
    }

    Ok(samples)
}

fn plot_probe_lengths(stats: &[ThresholdStats]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("probe_lengths.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = stats.iter().map(|s| s.avg_hit.max(s.avg_miss)).fold(0.0, f64::max) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Probe Length by Load Factor Threshold", (FONT_FAMILY, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.25..1.0, 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_desc("Load Factor Threshold")
        .y_desc("Slots Visited per Lookup")
        .axis_desc_style((FONT_FAMILY, 16))
        .draw()?;

    let series: [(&str, RGBColor, fn(&ThresholdStats) -> f64); 2] = [
        ("Successful lookup", RGBColor(50, 90, 220), |s| s.avg_hit),
        ("Failed lookup", RGBColor(220, 50, 50), |s| s.avg_miss),
    ];

    for (label, color, metric) in series {
        let line_style = ShapeStyle::from(&color).stroke_width(2);
        chart
            .draw_series(LineSeries::new(stats.iter().map(|s| (s.threshold, metric(s))), line_style))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(
            stats.iter().map(|s| Circle::new((s.threshold, metric(s)), 4, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn plot_churn(samples: &[ChurnSample]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("tombstone_churn.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = samples.iter().map(|s| s.capacity).max().unwrap_or(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Tombstones Under Insert/Delete Churn", (FONT_FAMILY, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..CHURN_ROUNDS as f64, 0.0..max_y)?;

    chart.configure_mesh().x_desc("Round").y_desc("Slots").axis_desc_style((FONT_FAMILY, 16)).draw()?;

    let series: [(&str, RGBColor, fn(&ChurnSample) -> usize); 3] = [
        ("Live entries", RGBColor(50, 180, 50), |s| s.live),
        ("Tombstones", RGBColor(180, 50, 180), |s| s.tombstones),
        ("Capacity", RGBColor(50, 90, 220), |s| s.capacity),
    ];

    for (label, color, metric) in series {
        let line_style = ShapeStyle::from(&color).stroke_width(2);
        chart
            .draw_series(LineSeries::new(
                samples.iter().map(|s| (s.round as f64, metric(s) as f64)),
                line_style,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    initialize_logger();
    let mut rng = rand::rng();

    // Distinct keys, so every miss is really absent from the table
    let mut seen = HashSet::with_capacity(NUM_KEYS + NUM_MISSES);
    let mut keys = Vec::with_capacity(NUM_KEYS + NUM_MISSES);
    while keys.len() < NUM_KEYS + NUM_MISSES {
        let key: u64 = rng.random();
        if seen.insert(key) {
            keys.push(key);
        }
    }
    let (hits, misses) = keys.split_at(NUM_KEYS);

    info!("measuring {} thresholds with {NUM_KEYS} keys", THRESHOLDS.len());
    let mut stats = Vec::with_capacity(THRESHOLDS.len());
    for threshold in THRESHOLDS {
        let result = measure_threshold(threshold, hits, misses)?;
        println!(
            "  threshold {:.2}: avg hit = {:.2}, avg miss = {:.2}, worst hit = {}, capacity = {}",
            result.threshold, result.avg_hit, result.avg_miss, result.worst_hit, result.capacity
        );
        stats.push(result);
    }

    info!("running {CHURN_ROUNDS} churn rounds at threshold {CHURN_THRESHOLD}");
    let samples = measure_churn(&mut rng)?;
    for sample in &samples {
        println!(
            "  round {:>2}: live = {}, tombstones = {}, capacity = {}",
            sample.round, sample.live, sample.tombstones, sample.capacity
        );
    }

    plot_probe_lengths(&stats)?;
    plot_churn(&samples)?;

    println!("Generated plot images: probe_lengths.png, tombstone_churn.png");
    Ok(())
}
