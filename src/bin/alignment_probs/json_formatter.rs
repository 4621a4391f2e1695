use serde::Serialize;
use subsample_align::alignment::oracles::expected_kept_count;
use subsample_align::{AlignmentBatch, EmissionBatch};

#[derive(Debug, Serialize)]
struct Entry<'a> {
    emissions: &'a [f64],
    alignment: Vec<Vec<f64>>,
    row_mass: Vec<f64>,
    total_mass: f64,
    expected_kept: f64,
}

pub fn render(batch: &EmissionBatch, alignment: &AlignmentBatch) -> Result<String, String> {
    let entries = batch
        .rows()
        .zip(alignment.iter())
        .map(|(emissions, matrix)| Entry {
            emissions,
            alignment: matrix.to_rows(),
            row_mass: (0..matrix.size).map(|m| matrix.row_mass(m)).collect(),
            total_mass: matrix.total_mass(),
            expected_kept: expected_kept_count(emissions),
        })
        .collect::<Vec<_>>();

    let mut out = serde_json::to_string_pretty(&entries)
        .map_err(|err| format!("Failed to serialize alignment JSON: {err}"))?;
    out.push('\n');
    Ok(out)
}
