//! Reads the schedule and stations sheets from CSV exports.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{Coordinate, Direction, ScheduleRow, StopLocation};
use crate::proximity::ProximityResolver;
use crate::timetable::TimetableIndex;

use super::error::SourceError;

/// Accepted headers for the stop name column.
const NAME_HEADERS: &[&str] = &["정류장명", "name", "stop_name"];
/// Accepted headers for the latitude column.
const LATITUDE_HEADERS: &[&str] = &["위도", "lat", "latitude"];
/// Accepted headers for the longitude column.
const LONGITUDE_HEADERS: &[&str] = &["경도", "lon", "lng", "longitude"];

/// Where the two sheets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Schedule sheet: a header row, then ten positional columns.
    pub schedule_path: PathBuf,
    /// Stations sheet: name, latitude and longitude columns, by header.
    pub stations_path: PathBuf,
}

impl SourceConfig {
    /// Use `schedule.csv` and `stations.csv` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            schedule_path: dir.join("schedule.csv"),
            stations_path: dir.join("stations.csv"),
        }
    }

    /// Set a custom schedule file.
    pub fn with_schedule_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schedule_path = path.into();
        self
    }

    /// Set a custom stations file.
    pub fn with_stations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stations_path = path.into();
        self
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

/// Both loaded tables. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    pub index: TimetableIndex,
    pub stops: ProximityResolver,
}

impl Timetable {
    pub fn new(rows: Vec<ScheduleRow>, stops: Vec<StopLocation>) -> Self {
        Self {
            index: TimetableIndex::new(rows),
            stops: ProximityResolver::new(stops),
        }
    }
}

/// Load both sheets.
///
/// Fails only if a file is missing, unreadable, or lacks a required
/// column. Incomplete schedule halves and stations with bad coordinates
/// are dropped silently.
pub fn load(config: &SourceConfig) -> Result<Timetable, SourceError> {
    let rows = read_schedule(&config.schedule_path)?;
    let stops = read_stations(&config.stations_path)?;
    let timetable = Timetable::new(rows, stops);

    info!(
        rows = timetable.index.len(),
        up_legs = timetable.index.leg_count(Direction::Up),
        down_legs = timetable.index.leg_count(Direction::Down),
        stops = timetable.stops.len(),
        "loaded timetable"
    );

    Ok(timetable)
}

/// Read the schedule sheet. Columns are positional; the header is skipped.
pub fn read_schedule(path: &Path) -> Result<Vec<ScheduleRow>, SourceError> {
    let mut reader = open_csv(path)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(
                    path = %path.display(),
                    line = line + 2,
                    error = %e,
                    "skipping unreadable schedule row"
                );
                skipped += 1;
                continue;
            }
        };

        let row = ScheduleRow::from_cells(record.iter());
        if row.is_empty() {
            skipped += 1;
            continue;
        }
        rows.push(row);
    }

    debug!(path = %path.display(), kept = rows.len(), skipped, "read schedule sheet");
    Ok(rows)
}

/// Read the stations sheet, locating columns by (trimmed) header name.
pub fn read_stations(path: &Path) -> Result<Vec<StopLocation>, SourceError> {
    let mut reader = open_csv(path)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| SourceError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(normalize_header)
        .collect();

    let name_col = find_column(&headers, NAME_HEADERS, path)?;
    let lat_col = find_column(&headers, LATITUDE_HEADERS, path)?;
    let lon_col = find_column(&headers, LONGITUDE_HEADERS, path)?;

    let mut stops = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let Ok(record) = result else {
            skipped += 1;
            continue;
        };

        let name = record.get(name_col).unwrap_or("").trim();
        let lat = record.get(lat_col).unwrap_or("");
        let lon = record.get(lon_col).unwrap_or("");

        if name.is_empty() {
            skipped += 1;
            continue;
        }

        match Coordinate::parse(lat, lon) {
            Ok(position) => stops.push(StopLocation::new(name, position)),
            Err(e) => {
                debug!(stop = name, error = %e, "skipping station");
                skipped += 1;
            }
        }
    }

    debug!(path = %path.display(), kept = stops.len(), skipped, "read stations sheet");
    Ok(stops)
}

fn open_csv(path: &Path) -> Result<csv::Reader<File>, SourceError> {
    if !path.exists() {
        return Err(SourceError::Missing {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

/// Trim surrounding whitespace and a leading byte-order mark.
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

fn find_column(
    headers: &[String],
    accepted: &'static [&'static str],
    path: &Path,
) -> Result<usize, SourceError> {
    headers
        .iter()
        .position(|h| accepted.iter().any(|a| h.eq_ignore_ascii_case(a)))
        .ok_or_else(|| SourceError::MissingColumn {
            path: path.to_path_buf(),
            column: accepted[0],
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SCHEDULE: &str = "\
상행정류장,강진출발,도착,노선,코스,하행정류장,강진출발,도착,노선,코스
강진터미널,09:00,09:10,101,A,,,,,
마량,10:00,10:40,102,B,성전,11:00,11:20,201,C
,,,,,도암,0.5,12:30,301,D
";

    const STATIONS: &str = "\
 정류장명 ,위도 , 경도
강진터미널,34.642,126.767
마량,34.45,126.82
좌표없음,,
성전,n/a,126.6
";

    fn write_sheets(dir: &Path, schedule: &str, stations: &str) -> SourceConfig {
        let config = SourceConfig::in_dir(dir);
        fs::write(&config.schedule_path, schedule).unwrap();
        fs::write(&config.stations_path, stations).unwrap();
        config
    }

    #[test]
    fn loads_both_sheets() {
        let dir = tempdir().unwrap();
        let config = write_sheets(dir.path(), SCHEDULE, STATIONS);

        let timetable = load(&config).unwrap();
        assert_eq!(timetable.index.len(), 3);
        assert_eq!(timetable.index.leg_count(Direction::Up), 2);
        assert_eq!(timetable.index.leg_count(Direction::Down), 2);
        assert_eq!(timetable.stops.len(), 2);
    }

    #[test]
    fn up_only_row_only_searchable_up() {
        let dir = tempdir().unwrap();
        let config = write_sheets(dir.path(), SCHEDULE, STATIONS);
        let timetable = load(&config).unwrap();

        assert_eq!(timetable.index.search(Direction::Up, "강진").len(), 1);
        assert!(timetable.index.search(Direction::Down, "강진").is_empty());
    }

    #[test]
    fn day_fraction_cell_is_clock_time() {
        let dir = tempdir().unwrap();
        let config = write_sheets(dir.path(), SCHEDULE, STATIONS);
        let timetable = load(&config).unwrap();

        let found = timetable.index.search(Direction::Down, "도암");
        let leg = found[0].down.as_ref().unwrap();
        assert_eq!(leg.departure.to_string(), "12:00");
    }

    #[test]
    fn station_headers_are_trimmed() {
        let dir = tempdir().unwrap();
        let config = write_sheets(dir.path(), SCHEDULE, STATIONS);
        let stops = read_stations(&config.stations_path).unwrap();
        assert_eq!(stops[0].name, "강진터미널");
        assert_eq!(stops[0].position.latitude(), 34.642);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let dir = tempdir().unwrap();
        let stations = format!("\u{feff}{STATIONS}");
        let config = write_sheets(dir.path(), SCHEDULE, &stations);
        assert_eq!(read_stations(&config.stations_path).unwrap().len(), 2);
    }

    #[test]
    fn english_headers_accepted() {
        let dir = tempdir().unwrap();
        let config = write_sheets(dir.path(), SCHEDULE, "name,lat,lon\nA,34.6,126.7\n");
        let stops = read_stations(&config.stations_path).unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].name, "A");
    }

    #[test]
    fn missing_file_is_error() {
        let dir = tempdir().unwrap();
        let config = SourceConfig::in_dir(dir.path());
        assert!(matches!(load(&config), Err(SourceError::Missing { .. })));
    }

    #[test]
    fn missing_column_is_error() {
        let dir = tempdir().unwrap();
        let config = write_sheets(dir.path(), SCHEDULE, "정류장명,위도\nA,34.6\n");
        match load(&config) {
            Err(SourceError::MissingColumn { column, .. }) => assert_eq!(column, "경도"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn short_rows_are_padded() {
        let dir = tempdir().unwrap();
        let schedule = "h\n강진터미널,09:00,09:10,101,A\n";
        let config = write_sheets(dir.path(), schedule, STATIONS);
        let rows = read_schedule(&config.schedule_path).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].up.is_some());
        assert!(rows[0].down.is_none());
    }

    #[test]
    fn config_builders() {
        let config = SourceConfig::default()
            .with_schedule_path("/tmp/s.csv")
            .with_stations_path("/tmp/t.csv");
        assert_eq!(config.schedule_path, PathBuf::from("/tmp/s.csv"));
        assert_eq!(config.stations_path, PathBuf::from("/tmp/t.csv"));
        assert_eq!(
            SourceConfig::default().schedule_path,
            PathBuf::from("data/schedule.csv")
        );
    }
}
