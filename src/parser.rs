//! CSV parser for trip-data exports.

use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

use crate::errors::Result;
use crate::model::RawTrip;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decodes raw trip rows from CSV bytes, decompressing gzip input first.
///
/// Columns are matched by header name, so extra columns in the export are
/// ignored and missing ones read as empty values.
///
/// # Errors
///
/// Returns an error if the gzip stream is corrupt or a row cannot be read as
/// CSV.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<RawTrip>> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut decoded)?;
        debug!(compressed = bytes.len(), decoded = decoded.len(), "Decompressed gzip source");
        return parse_csv(&decoded);
    }

    parse_csv(bytes)
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<RawTrip>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: RawTrip = result?;
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const SAMPLE: &str = "\
ride_id,rideable_type,started_at,ended_at,start_lat,start_station_name,end_station_name,member_casual
A1,classic_bike,2023-01-21 20:05:42,2023-01-21 20:16:33,41.9,Station_1,Station_2,member
A2,electric_bike,2023-01-10 15:37:36,2023-01-10 15:46:05,41.8,,Station_9,casual
";

    #[test]
    fn test_parse_empty_bytes_returns_no_rows() {
        let rows = parse_trips(&[]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_divvy_layout_ignores_extra_columns() {
        let rows = parse_trips(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ride_id.as_deref(), Some("A1"));
        assert_eq!(rows[0].member_casual.as_deref(), Some("member"));
    }

    #[test]
    fn test_parse_empty_cell_is_none() {
        let rows = parse_trips(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows[1].start_station_name, None);
        assert_eq!(rows[1].end_station_name.as_deref(), Some("Station_9"));
    }

    #[test]
    fn test_parse_gzip_input() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let rows = parse_trips(&compressed).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_parse_corrupt_gzip_fails() {
        let bytes = [0x1f, 0x8b, 0x00, 0x01, 0x02];
        assert!(parse_trips(&bytes).is_err());
    }
}
