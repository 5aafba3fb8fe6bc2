use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{CellTypeError, LoadError, SchemaError};
use super::model::{
    normalize_header, Dataset, Record, Schema, Value, PLAYER_COLUMN, YEAR_COLUMN,
};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a player statistics table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row + data rows (the primary format)
/// * `.json`    – `[{ "Player_Name": "...", "Year": 2020, ... }, ...]`
/// * `.parquet` – flat columns written by Pandas or Polars
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    match extension_of(path.to_str().unwrap_or("")).as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(std::fs::File::open(path)?),
        "csv" | "txt" | "" => load_csv(std::fs::File::open(path)?),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Load uploaded bytes. `name` picks JSON over CSV by extension; anything
/// else is read as CSV.
pub fn load_bytes(bytes: &[u8], name: &str) -> Result<Dataset, LoadError> {
    match extension_of(name).as_str() {
        "json" => load_json(bytes),
        "parquet" | "pq" => Err(LoadError::UnsupportedFormat(
            "parquet (open it from disk instead)".into(),
        )),
        _ => load_csv(bytes),
    }
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Row coercion shared by every format
// ---------------------------------------------------------------------------

/// Type a text cell. Player names are identifiers and stay verbatim.
fn text_cell(column: &str, raw: &str) -> Value {
    if column != PLAYER_COLUMN {
        return Value::guess(raw);
    }
    match raw.trim() {
        "" => Value::Missing,
        name => Value::Text(name.to_string()),
    }
}

/// Accumulates rows against a validated schema, coercing cells as it goes.
struct TableBuilder {
    schema: Schema,
    records: Vec<Record>,
    type_errors: Vec<CellTypeError>,
}

impl TableBuilder {
    fn new<S: AsRef<str>>(headers: &[S]) -> Result<Self, SchemaError> {
        Ok(TableBuilder {
            schema: Schema::from_headers(headers)?,
            records: Vec::new(),
            type_errors: Vec::new(),
        })
    }

    fn push_row(&mut self, row: usize, cells: impl IntoIterator<Item = (String, Value)>) {
        let mut cells: BTreeMap<String, Value> = cells
            .into_iter()
            .filter(|(col, _)| self.schema.has_column(col))
            .collect();

        let player = match cells.remove(PLAYER_COLUMN).unwrap_or(Value::Missing) {
            Value::Missing => {
                self.reject(row, PLAYER_COLUMN, String::new(), true);
                return;
            }
            Value::Text(s) => s,
            Value::Float(f) => f.to_string(),
            other => other.to_string(),
        };

        let year_cell = cells.remove(YEAR_COLUMN).unwrap_or(Value::Missing);
        let year = match &year_cell {
            Value::Integer(i) => i32::try_from(*i).ok(),
            Value::Float(f) if f.fract() == 0.0 => i32::try_from(*f as i64).ok(),
            _ => None,
        };
        let Some(year) = year else {
            let text = match year_cell {
                Value::Missing => String::new(),
                other => other.to_string(),
            };
            self.reject(row, YEAR_COLUMN, text, true);
            return;
        };

        for metric in self.schema.metrics().to_vec() {
            let col = metric.column();
            let Some(v) = cells.get_mut(col) else {
                continue;
            };
            if v.is_missing() || v.is_numeric() {
                continue;
            }
            let text = std::mem::replace(v, Value::Missing).to_string();
            self.reject(row, col, text, false);
        }

        self.records.push(Record { player, year, cells });
    }

    fn reject(&mut self, row: usize, column: &str, text: String, row_dropped: bool) {
        log::debug!("row {row}: rejected '{text}' in column {column}");
        self.type_errors.push(CellTypeError {
            row,
            column: column.to_string(),
            text,
            row_dropped,
        });
    }

    fn finish(self) -> Dataset {
        let dataset = Dataset::new(self.schema, self.records, self.type_errors);
        let dropped = dataset.type_errors().iter().filter(|e| e.row_dropped).count();
        if !dataset.type_errors().is_empty() {
            log::warn!(
                "{} cells could not be read ({} rows dropped)",
                dataset.type_errors().len(),
                dropped
            );
        }
        log::info!(
            "Loaded {} rows, {} players, years {:?}, metrics {:?}",
            dataset.len(),
            dataset.players().len(),
            dataset.year_range(),
            dataset.schema().metrics().iter().map(|m| m.column()).collect::<Vec<_>>()
        );
        dataset
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, at least `Player_Name` and
/// `Year`.  Short rows are padded with missing cells and invalid UTF-8 is
/// replaced rather than rejected, so a single bad row never fails the load.
pub fn load_csv<R: Read>(input: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| normalize_header(&String::from_utf8_lossy(h)).to_string())
        .collect();
    let mut builder = TableBuilder::new(&headers)?;

    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let cells = headers.iter().enumerate().map(|(i, h)| {
            let raw = record.get(i).unwrap_or_default();
            (h.clone(), text_cell(h, &String::from_utf8_lossy(raw)))
        });
        builder.push_row(row_no, cells);
    }

    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Player_Name": "A Sharma", "Year": 2021, "Runs_Scored": 512 },
///   ...
/// ]
/// ```
pub fn load_json<R: Read>(input: R) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_reader(input)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    for obj in rows.iter().filter_map(JsonValue::as_object) {
        for key in obj.keys().map(|k| normalize_header(k)) {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.to_string());
            }
        }
    }
    if headers.is_empty() {
        return Err(SchemaError::NoHeader.into());
    }
    let mut builder = TableBuilder::new(&headers)?;

    for (i, rec) in rows.iter().enumerate() {
        let Some(obj) = rec.as_object() else {
            log::warn!("JSON row {i} is not an object, skipped");
            continue;
        };
        let cells = obj.iter().map(|(k, v)| {
            let column = normalize_header(k);
            (column.to_string(), json_to_value(column, v))
        });
        builder.push_row(i, cells);
    }

    Ok(builder.finish())
}

fn json_to_value(column: &str, val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => text_cell(column, s),
        JsonValue::Number(n) if column == PLAYER_COLUMN => Value::Text(n.to_string()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Missing,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per CSV header.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): narrow and unsigned integers,
/// categoricals (dictionary columns) and string views are cast to the
/// types [`extract_value`] reads.
pub fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;
    let mut table = TableBuilder::new(&headers)?;

    let mut row_offset = 0;
    for batch_result in reader {
        let batch = batch_result?;
        let columns: Vec<(&String, ArrayRef)> = headers
            .iter()
            .zip(batch.columns())
            .map(|(name, col)| (name, readable_column(name, col)))
            .collect();

        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|(name, col)| ((*name).clone(), extract_value(name, col, row)));
            table.push_row(row_offset + row, cells);
        }
        row_offset += batch.num_rows();
    }

    Ok(table.finish())
}

/// Cast a column to one of the types [`extract_value`] reads: integers to
/// `Int64`, other numbers to `Float64`, everything else to `Utf8`. A column
/// that cannot be cast reads as all-missing.
fn readable_column(name: &str, col: &ArrayRef) -> ArrayRef {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => return Arc::clone(col),
        dt if dt.is_integer() => DataType::Int64,
        dt if dt.is_numeric() => DataType::Float64,
        _ => DataType::Utf8,
    };
    match cast(col, &target) {
        Ok(array) => array,
        Err(e) => {
            log::warn!("column {name} ({}) is unreadable: {e}", col.data_type());
            new_null_array(&target, col.len())
        }
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(column: &str, col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Missing;
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| text_cell(column, a.value(row))),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| text_cell(column, a.value(row))),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| Value::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| Value::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| float_value(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| float_value(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| Value::Bool(a.value(row))),
        _ => None,
    };
    value.unwrap_or(Value::Missing)
}

fn float_value(v: f64) -> Value {
    if v.is_finite() {
        Value::Float(v)
    } else {
        Value::Missing
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{
        Date32Array, DictionaryArray, Float64Array, Int16Array, Int64Array, StringArray,
        UInt32Array,
    };
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const CSV: &str = "\
Player_Name,Year,Runs_Scored,Batting_Average,Team
A,2020,500,45.5,North
B,2020,600,abc,South
A,2021,700,,North
";

    #[test]
    fn loads_csv_and_coerces_bad_cells() {
        let ds = load_csv(CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.year_range(), Some((2020, 2021)));
        assert_eq!(ds.players().len(), 2);

        // 'abc' becomes missing, the row survives
        let b = &ds.records()[1];
        assert_eq!(b.player, "B");
        assert_eq!(b.numeric("Batting_Average"), None);
        assert_eq!(b.numeric("Runs_Scored"), Some(600.0));
        assert_eq!(
            ds.type_errors(),
            &[CellTypeError {
                row: 1,
                column: "Batting_Average".into(),
                text: "abc".into(),
                row_dropped: false,
            }]
        );

        // extra column preserved, not a metric
        assert_eq!(b.value("Team"), Value::Text("South".into()));
        assert_eq!(ds.analysis_columns(), vec!["Runs_Scored", "Batting_Average"]);
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let err = load_csv("Player_Name,Runs_Scored\nA,10\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::MissingRequiredColumn(ref c)) if c == "Year"
        ));
    }

    #[test]
    fn empty_input_is_a_schema_error() {
        let err = load_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Schema(SchemaError::NoHeader)));
    }

    #[test]
    fn rows_without_a_usable_year_or_player_are_dropped() {
        let csv = "Player_Name,Year,Runs_Scored\nA,2020.0,1\nB,soon,2\n,2021,3\nC,2022,4\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            ds.records().iter().map(|r| r.player.as_str()).collect::<Vec<_>>(),
            vec!["A", "C"]
        );
        assert_eq!(ds.records()[0].year, 2020);
        assert_eq!(ds.type_errors().len(), 2);
        assert!(ds.type_errors().iter().all(|e| e.row_dropped));
    }

    #[test]
    fn ragged_rows_are_padded_with_missing() {
        let csv = "Player_Name,Year,Runs_Scored,Centuries\nA,2020,10\nB,2020,20,1,extra\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].value("Centuries"), Value::Missing);
        assert_eq!(ds.records()[1].numeric("Centuries"), Some(1.0));
    }

    #[test]
    fn loads_json_records() {
        let json = r#"[
            {"Player_Name": "A", "Year": 2020, "Runs_Scored": 10},
            {"Player_Name": "B", "Year": 2021, "Runs_Scored": null, "Wickets_Taken": "x"},
            42
        ]"#;
        let ds = load_json(json.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.schema().has_column("Wickets_Taken"));
        assert_eq!(ds.records()[1].numeric("Runs_Scored"), None);
        assert_eq!(ds.type_errors().len(), 1);
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(tmp, "{CSV}").unwrap();
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 3);

        let err = load_file(Path::new("stats.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref e) if e == "xlsx"));
    }

    #[test]
    fn load_bytes_reads_csv_by_default() {
        let ds = load_bytes(CSV.as_bytes(), "upload").unwrap();
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn load_bytes_picks_json_by_name() {
        let json = r#"[{"Player_Name": "A", "Year": 2020, "Runs_Scored": 10}]"#;
        let ds = load_bytes(json.as_bytes(), "Upload.JSON").unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].numeric("Runs_Scored"), Some(10.0));

        let err = load_bytes(b"", "stats.parquet").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
    }

    #[test]
    fn player_names_are_kept_verbatim() {
        let csv = "Player_Name,Year\n1.5,2020\n007,2020\n null ,2021\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        let names: Vec<&str> = ds.records().iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, vec!["1.5", "007", "null"]);

        let json = r#"[
            {"Player_Name": "007", "Year": 2020},
            {"Player_Name": 1.5, "Year": 2020}
        ]"#;
        let ds = load_json(json.as_bytes()).unwrap();
        let names: Vec<&str> = ds.records().iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, vec!["007", "1.5"]);
    }

    #[test]
    fn json_keys_are_normalised_like_csv_headers() {
        let json = "[{\"Player_Name\": \"A\", \" Year\": 2020, \"\u{feff}Runs_Scored \": 7}]";
        let ds = load_json(json.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].year, 2020);
        assert_eq!(ds.records()[0].numeric("Runs_Scored"), Some(7.0));
        assert!(ds.type_errors().is_empty());
    }

    fn parquet_file(batch: &RecordBatch) -> tempfile::NamedTempFile {
        let tmp = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(tmp.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        tmp
    }

    #[test]
    fn parquet_columns_of_pandas_types_are_read() {
        let players: DictionaryArray<Int32Type> = vec!["A", "B", "A"].into_iter().collect();
        let batch = RecordBatch::try_from_iter(vec![
            ("Player_Name", Arc::new(players) as ArrayRef),
            ("Year", Arc::new(Int16Array::from(vec![2020, 2020, 2021])) as ArrayRef),
            (
                "Runs_Scored",
                Arc::new(Float64Array::from(vec![Some(500.0), None, Some(700.0)])) as ArrayRef,
            ),
            (
                "Wickets_Taken",
                Arc::new(UInt32Array::from(vec![Some(3), Some(1), None])) as ArrayRef,
            ),
            ("Debut", Arc::new(Date32Array::from(vec![18262, 18262, 18262])) as ArrayRef),
        ])
        .unwrap();
        let tmp = parquet_file(&batch);

        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert!(ds.type_errors().is_empty());
        assert_eq!(ds.players().iter().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(ds.year_range(), Some((2020, 2021)));

        let b = &ds.records()[1];
        assert_eq!(b.player, "B");
        assert_eq!(b.value("Runs_Scored"), Value::Missing);
        assert_eq!(b.numeric("Wickets_Taken"), Some(1.0));
        assert_eq!(ds.records()[2].value("Wickets_Taken"), Value::Missing);
        assert_eq!(b.value("Debut"), Value::Text("2020-01-01".into()));
    }

    #[test]
    fn parquet_float_years_must_be_whole() {
        let batch = RecordBatch::try_from_iter(vec![
            ("Player_Name", Arc::new(StringArray::from(vec!["A", "B"])) as ArrayRef),
            ("Year", Arc::new(Float64Array::from(vec![2020.0, 2021.5])) as ArrayRef),
            ("Runs_Scored", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
        ])
        .unwrap();
        let tmp = parquet_file(&batch);

        let ds = load_parquet(tmp.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].year, 2020);
        assert_eq!(ds.records()[0].numeric("Runs_Scored"), Some(1.0));
        let err = &ds.type_errors()[0];
        assert_eq!((err.row, err.column.as_str(), err.row_dropped), (1, "Year", true));
    }
}
