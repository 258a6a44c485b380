use super::prelude::*;
use std::path::{Path, PathBuf};

const OUTPUT_SUFFIX: &str = "-geolocation";

pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";

/// `dir/list.csv` becomes `dir/list-geolocation.csv`.
pub fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    input.with_file_name(file_name)
}

/// Number of input columns in the output: the widest of the header and all rows.
pub fn input_width(header: Option<&[String]>, rows: &[AddressRow]) -> usize {
    rows.iter()
        .map(AddressRow::len)
        .chain(header.map(<[String]>::len))
        .max()
        .unwrap_or_default()
}

/// Pad the header with unnamed columns up to `width` and
/// append the coordinate columns.
pub fn geolocated_header(header: &[String], width: usize) -> Vec<String> {
    let mut record = header.to_vec();
    if record.len() < width {
        record.resize(width, String::new());
    }
    record.extend([LATITUDE_COLUMN.to_string(), LONGITUDE_COLUMN.to_string()]);
    record
}

/// Pad each row with empty cells up to `width` and append the coordinates,
/// keeping the row order.
///
/// Unresolved coordinates become empty cells.
pub fn geolocated_records(
    rows: &[AddressRow],
    results: &[GeocodeResult],
    width: usize,
) -> Result<Vec<Vec<String>>> {
    if rows.len() != results.len() {
        return Err(Error::ResultCountMismatch {
            expected: rows.len(),
            actual: results.len(),
        });
    }
    let records = rows
        .iter()
        .zip(results)
        .map(|(row, result)| {
            let mut record = row.columns.clone();
            if record.len() < width {
                record.resize(width, String::new());
            }
            let lat = result.latitude.map(|x| x.to_string()).unwrap_or_default();
            let lng = result.longitude.map(|x| x.to_string()).unwrap_or_default();
            record.extend([lat, lng]);
            record
        })
        .collect();
    Ok(records)
}
