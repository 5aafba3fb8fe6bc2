use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Batting and bowling strength of a synthetic player.
struct Profile {
    name: &'static str,
    batting: f64,
    bowling: f64,
}

const PROFILES: [Profile; 6] = [
    Profile {
        name: "R Sharma",
        batting: 0.9,
        bowling: 0.1,
    },
    Profile {
        name: "V Kohli",
        batting: 1.0,
        bowling: 0.05,
    },
    Profile {
        name: "J Bumrah",
        batting: 0.1,
        bowling: 1.0,
    },
    Profile {
        name: "R Jadeja",
        batting: 0.55,
        bowling: 0.7,
    },
    Profile {
        name: "H Pandya",
        batting: 0.6,
        bowling: 0.5,
    },
    Profile {
        name: "M Shami",
        batting: 0.08,
        bowling: 0.85,
    },
];

const HEADERS: [&str; 11] = [
    "Player_Name",
    "Year",
    "Matches_Played",
    "Runs_Scored",
    "Batting_Average",
    "Batting_Strike_Rate",
    "Centuries",
    "Half_Centuries",
    "Wickets_Taken",
    "Bowling_Average",
    "Economy_Rate",
];

/// One generated season; `None` marks a blank cell.
struct Season {
    player: String,
    year: i64,
    metrics: [Option<f64>; 9],
}

fn generate(rng: &mut SimpleRng) -> Vec<Season> {
    let mut rows = Vec::new();
    for year in 2015..=2023 {
        for p in &PROFILES {
            let matches = (rng.gauss(14.0, 3.0).round()).clamp(4.0, 25.0);
            let innings = matches * 0.9;
            let avg = (rng.gauss(12.0 + 40.0 * p.batting, 6.0)).max(2.0);
            let runs = (avg * innings * 0.85).round();
            let strike_rate = rng.gauss(80.0 + 60.0 * p.batting, 8.0).max(40.0);
            let hundreds = (runs / 450.0 * p.batting).floor();
            let fifties = (runs / 180.0).floor();
            let wickets = (matches * 1.8 * p.bowling + rng.gauss(0.0, 2.0))
                .round()
                .max(0.0);
            let (bowl_avg, economy) = if wickets > 0.0 {
                (
                    Some(rng.gauss(38.0 - 14.0 * p.bowling, 3.0).max(12.0)),
                    Some(rng.gauss(8.5 - 1.8 * p.bowling, 0.4).max(4.0)),
                )
            } else {
                (None, None)
            };
            rows.push(Season {
                player: p.name.to_string(),
                year,
                metrics: [
                    Some(matches),
                    Some(runs),
                    Some((avg * 100.0).round() / 100.0),
                    Some((strike_rate * 100.0).round() / 100.0),
                    Some(hundreds),
                    Some(fifties),
                    Some(wickets),
                    bowl_avg.map(|v| (v * 100.0).round() / 100.0),
                    economy.map(|v| (v * 100.0).round() / 100.0),
                ],
            });
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Season]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(HEADERS)?;
    for (i, row) in rows.iter().enumerate() {
        let mut record = vec![row.player.clone(), row.year.to_string()];
        record.extend(
            row.metrics
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        // A few deliberately unreadable cells to exercise coercion.
        if i % 17 == 5 {
            record[4] = "n/a".to_string();
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Season]) -> Result<()> {
    let mut fields = vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Int64, false),
    ];
    fields.extend(
        HEADERS[2..]
            .iter()
            .map(|h| Field::new(*h, DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.player.as_str()),
        )),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
    ];
    for m in 0..9 {
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.metrics[m]).collect::<Vec<_>>(),
        )));
    }

    let batch =
        RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating Parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let dir = Path::new("sample_data");
    std::fs::create_dir_all(dir).context("creating sample_data/")?;
    let csv_path = dir.join("cricket_stats.csv");
    let parquet_path = dir.join("cricket_stats.parquet");
    write_csv(&csv_path, &rows)?;
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} player seasons to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
