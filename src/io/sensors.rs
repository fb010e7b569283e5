//! Sensor position loading from tabular (CSV) files.
//!
//! The table must carry named `x`, `y`, `z` columns (extra columns are
//! ignored); one row per sensor, and the row order defines the sensor id
//! order used throughout the visibility field.

use std::io::Read;
use std::path::Path;

use log::info;

use crate::core::Point3;
use crate::error::{Error, Result};

/// Required column names, in component order.
const COLUMNS: [&str; 3] = ["x", "y", "z"];

/// Load sensor positions from a CSV file.
pub fn load_sensor_positions(path: &Path) -> Result<Vec<Point3>> {
    info!("loading sensor positions from {}", path.display());
    let file = std::fs::File::open(path)?;
    let positions = read_sensor_positions(file)?;
    info!("{} sensor positions loaded", positions.len());
    Ok(positions)
}

/// Read sensor positions from CSV data.
pub fn read_sensor_positions<R: Read>(reader: R) -> Result<Vec<Point3>> {
    let mut csv = csv::Reader::from_reader(reader);

    let headers = csv.headers()?.clone();
    let mut cols = [0usize; 3];
    for (slot, name) in cols.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(Error::MissingColumn(name))?;
    }

    let mut positions = Vec::new();
    for record in csv.records() {
        let record = record?;
        let mut xyz = [0f32; 3];
        for (value, &col) in xyz.iter_mut().zip(&cols) {
            let raw = record.get(col).ok_or_else(|| {
                Error::Parse(format!("row {} is missing column {}", positions.len(), col))
            })?;
            *value = raw.trim().parse().map_err(|_| {
                Error::Parse(format!("not a number: {:?} (row {})", raw, positions.len()))
            })?;
        }
        positions.push(Point3::from(xyz));
    }

    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_positions() {
        let data = "x,y,z\n1.0,2.0,3.0\n-4.5,0.0,2.25\n";
        let positions = read_sensor_positions(data.as_bytes()).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0], Point3::new(1.0, 2.0, 3.0));
        assert_eq!(positions[1], Point3::new(-4.5, 0.0, 2.25));
    }

    #[test]
    fn test_extra_columns_ignored_and_order_free() {
        let data = "id,z,x,y\n0,3.0,1.0,2.0\n";
        let positions = read_sensor_positions(data.as_bytes()).unwrap();
        assert_eq!(positions[0], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_missing_column() {
        let data = "x,y\n1.0,2.0\n";
        let result = read_sensor_positions(data.as_bytes());
        assert!(matches!(result, Err(Error::MissingColumn("z"))));
    }

    #[test]
    fn test_bad_number() {
        let data = "x,y,z\n1.0,oops,3.0\n";
        let result = read_sensor_positions(data.as_bytes());
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
