use geoloc_core::{
    entities::{AddressRow, AddressTable, GeocodeResult},
    usecases::{self, geolocated_header, geolocated_records, input_width},
};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvFileError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Usecase(#[from] usecases::Error),
}

/// Read all rows of a delimited text file.
///
/// Rows may have different lengths.
pub fn read_address_csv<P: AsRef<Path>>(
    path: P,
    has_headers: bool,
) -> Result<AddressTable, CsvFileError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_path(path.as_ref())?;
    let header = if has_headers {
        Some(reader.headers()?.iter().map(ToString::to_string).collect())
    } else {
        None
    };
    let rows = reader
        .records()
        .map(|record| record.map(|r| AddressRow::new(r.iter())))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!(
        "Read {} rows from {}",
        rows.len(),
        path.as_ref().display()
    );
    Ok(AddressTable { header, rows })
}

/// Write the input table with two additional columns
/// `Latitude` and `Longitude`.
///
/// All records are padded to the widest input row, so the coordinates
/// always end up below their column names.
///
/// An existing file is replaced. Nothing is left behind if writing fails.
pub fn write_geolocated_csv<P: AsRef<Path>>(
    path: P,
    table: &AddressTable,
    results: &[GeocodeResult],
) -> Result<(), CsvFileError> {
    let path = path.as_ref();
    let width = input_width(table.header.as_deref(), &table.rows);
    let header = table
        .header
        .as_deref()
        .map(|header| geolocated_header(header, width));
    let records = geolocated_records(&table.rows, results, width)?;
    let tmp_path = tmp_path(path);
    if let Err(err) = write_records(&tmp_path, header.as_deref(), &records) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    log::debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

fn write_records(
    path: &Path,
    header: Option<&[String]>,
    records: &[Vec<String>],
) -> Result<(), CsvFileError> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    if let Some(header) = header {
        writer.write_record(header)?;
    }
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(OsString::new);
    file_name.push(".part");
    path.with_file_name(file_name)
}
