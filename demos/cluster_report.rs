use assay::{CellValue, Pipeline, Row};
use std::collections::HashMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Minimal end-to-end: synthetic sensor rows -> correlation + clustering.
    //
    // Two operating regimes plus one bad reading, so every stage of the
    // pipeline has something to do.

    let mut rows: Vec<Row> = Vec::new();
    for i in 0..12 {
        rows.push(reading(60.0 + (i % 4) as f64, 1.0 + (i % 3) as f64 * 0.1));
    }
    for i in 0..12 {
        rows.push(reading(95.0 + (i % 4) as f64, 4.0 + (i % 3) as f64 * 0.1));
    }
    // A sensor glitch, far from both regimes.
    rows.push(reading(-400.0, 80.0));

    let columns = vec!["temp_c".to_string(), "flow_lps".to_string()];
    let pipeline = Pipeline::new().with_seed(42);

    let correlation = pipeline.compute_correlation(&rows, &columns, "demo rig")?;
    println!(
        "corr(temp_c, flow_lps) = {:.3}",
        correlation.matrix.get("temp_c", "flow_lps").unwrap()
    );

    let result = pipeline.compute_clustering(&rows, &columns, true)?;
    println!(
        "k={} mean_silhouette={:.3} outliers={:?}",
        result.k, result.mean_silhouette, result.outliers
    );
    for (cluster, means) in &result.raw_stats {
        println!("  cluster {cluster}: {means:?}");
    }
    println!("--- run log ---\n{}", result.log_text());

    Ok(())
}

fn reading(temp_c: f64, flow_lps: f64) -> Row {
    HashMap::from([
        ("temp_c".to_string(), CellValue::Number(temp_c)),
        ("flow_lps".to_string(), CellValue::Number(flow_lps)),
    ])
}
