use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{RoomCatalog, RoomTypeId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed reading room catalog from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed parsing room catalog {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("room catalog is empty")]
    Empty,
    #[error("room {0} must host at least one guest")]
    ZeroCapacity(RoomTypeId),
}

/// Checks the invariants every catalog must hold before pricing with it.
pub fn validate_catalog(catalog: &RoomCatalog) -> Result<(), CatalogError> {
    if catalog.is_empty() {
        return Err(CatalogError::Empty);
    }
    match catalog.iter().find(|(_, room)| room.capacity == 0) {
        Some((id, _)) => Err(CatalogError::ZeroCapacity(id)),
        None => Ok(()),
    }
}

/// Reads a JSON catalog keyed by room id and validates it.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<RoomCatalog, CatalogError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = RoomCatalog::from_json(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_catalog(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "hotel-catalog-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_a_valid_catalog() {
        let path = write_catalog(
            "valid",
            r#"{"doble": {"name": "Doble", "capacity": 2, "low_season_rate": 1,
                "high_season_rate": 2, "description": "d"}}"#,
        );
        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(RoomTypeId::Doble).is_some());
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_zero_capacity_rooms() {
        let path = write_catalog(
            "zero",
            r#"{"matrimonial": {"name": "M", "capacity": 0, "low_season_rate": 1,
                "high_season_rate": 2, "description": "d"}}"#,
        );
        assert!(matches!(
            load_catalog(&path),
            Err(CatalogError::ZeroCapacity(RoomTypeId::Matrimonial))
        ));
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_empty_and_missing_catalogs() {
        let path = write_catalog("empty", "{}");
        assert!(matches!(load_catalog(&path), Err(CatalogError::Empty)));
        fs::remove_file(path).ok();

        assert!(matches!(
            load_catalog("/definitely/not/here.json"),
            Err(CatalogError::Read { .. })
        ));
    }

    #[test]
    fn built_in_catalog_is_valid() {
        assert!(validate_catalog(&RoomCatalog::default()).is_ok());
    }
}
