//! H3 cell geometry

use h3o::{CellIndex, LatLng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ApiError;

/// A cell with its center and boundary, both as `(lat, lng)` in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hexagon {
    pub cell_id: String,
    pub center: (f64, f64),
    pub boundary: Vec<(f64, f64)>,
}

impl Hexagon {
    pub fn latitude(&self) -> f64 {
        self.center.0
    }

    pub fn longitude(&self) -> f64 {
        self.center.1
    }
}

pub fn hexagon(cell_id: &str) -> Result<Hexagon, ApiError> {
    let cell =
        CellIndex::from_str(cell_id).map_err(|_| ApiError::InvalidCell(cell_id.to_string()))?;
    let center = LatLng::from(cell);

    Ok(Hexagon {
        cell_id: cell_id.to_string(),
        center: (center.lat(), center.lng()),
        boundary: cell
            .boundary()
            .iter()
            .map(|vertex| (vertex.lat(), vertex.lng()))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexagon_geometry() {
        let hex = hexagon("85283473fffffff").unwrap();

        assert_eq!(hex.cell_id, "85283473fffffff");
        assert_eq!(hex.boundary.len(), 6);
        assert!((hex.latitude() - 37.35).abs() < 0.1);
        assert!((hex.longitude() + 121.98).abs() < 0.1);
    }

    #[test]
    fn test_invalid_cell() {
        assert!(matches!(
            hexagon("not-a-cell"),
            Err(ApiError::InvalidCell(id)) if id == "not-a-cell"
        ));
    }

    #[test]
    fn test_hexagon_json_keys() {
        let value = serde_json::to_value(hexagon("85283473fffffff").unwrap()).unwrap();
        assert!(value.get("cellId").is_some());
        assert_eq!(value["center"].as_array().map(Vec::len), Some(2));
    }
}
