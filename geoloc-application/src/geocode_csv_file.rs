use super::*;
use geoloc_gateways::csv_file::{read_address_csv, write_geolocated_csv};
use std::path::PathBuf;
use usecases::{
    output_path, BatchControl, BatchEvent, BatchEventSink, BatchJob, BatchOutcome, BatchSettings,
    CancelFlag,
};

#[derive(Debug, Clone)]
pub struct GeocodeFileParams {
    pub input: PathBuf,
    pub has_headers: bool,
    pub batch: BatchSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Completed {
        output: PathBuf,
        rows: usize,
        resolved: usize,
    },
    Cancelled,
}

/// Geocode all rows of a CSV file and write the result next to it.
///
/// The output file is only written if the run completes.
pub fn geocode_csv_file<G, R, C, S>(
    params: &GeocodeFileParams,
    geocoder: &G,
    quota_repo: &R,
    cancel: &CancelFlag,
    control: &C,
    events: &S,
) -> Result<FileOutcome>
where
    G: GeoCodingGateway,
    R: QuotaRepo,
    C: BatchControl,
    S: BatchEventSink,
{
    let AddressTable { header, rows } = read_address_csv(&params.input, params.has_headers)
        .map_err(|err| {
            warn!("Failed to read {}: {}", params.input.display(), err);
            err
        })?;
    info!(
        "File loaded successfully: {} addresses found in {}",
        rows.len(),
        params.input.display()
    );
    if cancel.is_cancelled() {
        events.emit(BatchEvent::Cancelled);
        return Ok(FileOutcome::Cancelled);
    }

    let mut job = BatchJob::with_cancel_flag(rows, cancel.clone());
    let results = match job.run(geocoder, quota_repo, &params.batch, control, events)? {
        BatchOutcome::Completed(results) => results,
        BatchOutcome::Cancelled => return Ok(FileOutcome::Cancelled),
    };

    let table = AddressTable {
        header,
        rows: job.into_rows(),
    };
    let output = output_path(&params.input);
    write_geolocated_csv(&output, &table, &results).map_err(|err| {
        warn!("Failed to write {}: {}", output.display(), err);
        err
    })?;
    let resolved = results.iter().filter(|r| !r.is_unresolved()).count();
    info!("Geocoding completed, file saved as {}", output.display());
    Ok(FileOutcome::Completed {
        output,
        rows: table.rows.len(),
        resolved,
    })
}
