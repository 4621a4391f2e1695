use std::fmt::Write;

use subsample_align::{AlignmentBatch, EmissionBatch};

const CELL_WIDTH: usize = 8;

pub fn render(batch: &EmissionBatch, alignment: &AlignmentBatch) -> String {
    let mut out = String::new();
    for (b, (emissions, matrix)) in batch.rows().zip(alignment.iter()).enumerate() {
        let _ = writeln!(out, "# batch {b} (T = {})", matrix.size);

        let _ = write!(out, "{:>6}", "e");
        for p in emissions {
            let _ = write!(out, "{p:>CELL_WIDTH$.4}");
        }
        out.push('\n');

        for m in 0..matrix.size {
            let _ = write!(out, "{:>6}", format!("m={m}"));
            for &v in matrix.row(m) {
                if v == 0.0 {
                    let _ = write!(out, "{:>CELL_WIDTH$}", ".");
                } else {
                    let _ = write!(out, "{v:>CELL_WIDTH$.4}");
                }
            }
            let _ = writeln!(out, "  | {:.4}", matrix.row_mass(m));
        }
        out.push('\n');
    }
    out
}
