//! Chip catalog: datasheets looked up by name.

use std::collections::BTreeMap;
use std::path::Path;

use breadboard_core::ic::Datasheet;

use crate::loader::{DataLoadError, Format, deserialize_file, deserialize_str, list_data_files};
use crate::schema::DatasheetData;

/// Datasheets shipped with the crate, as `(file name, RON source)`.
const BUNDLED: [(&str, &str); 7] = [
    ("7400.ron", include_str!("../data/ic/7400.ron")),
    ("7402.ron", include_str!("../data/ic/7402.ron")),
    ("7404.ron", include_str!("../data/ic/7404.ron")),
    ("7408.ron", include_str!("../data/ic/7408.ron")),
    ("7432.ron", include_str!("../data/ic/7432.ron")),
    ("7475.ron", include_str!("../data/ic/7475.ron")),
    ("7486.ron", include_str!("../data/ic/7486.ron")),
];

/// Validated datasheets keyed by chip name.
#[derive(Debug, Clone, Default)]
pub struct IcCatalog {
    sheets: BTreeMap<String, Datasheet>,
}

impl IcCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in 74xx chips.
    pub fn bundled() -> Result<Self, DataLoadError> {
        let mut catalog = Self::new();
        for (file, source) in BUNDLED {
            let path = Path::new(file);
            let data: DatasheetData = deserialize_str(source, Format::Ron, path)?;
            catalog.insert(data.resolve(path)?, path)?;
        }
        Ok(catalog)
    }

    /// Load every datasheet file in `dir`, in file name order.
    pub fn load_dir(dir: &Path) -> Result<Self, DataLoadError> {
        let mut catalog = Self::new();
        for path in list_data_files(dir)? {
            let data: DatasheetData = deserialize_file(&path)?;
            catalog.insert(data.resolve(&path)?, &path)?;
        }
        Ok(catalog)
    }

    /// Add a datasheet. `file` names its source for the duplicate error.
    pub fn insert(&mut self, datasheet: Datasheet, file: &Path) -> Result<(), DataLoadError> {
        if self.sheets.contains_key(&datasheet.name) {
            return Err(DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: datasheet.name,
            });
        }
        log::trace!("catalog: {} from {}", datasheet.name, file.display());
        self.sheets.insert(datasheet.name.clone(), datasheet);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Datasheet> {
        self.sheets.get(name)
    }

    /// A copy of the named datasheet, ready for `Circuit::add_ic`.
    pub fn require(&self, name: &str) -> Result<Datasheet, DataLoadError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| DataLoadError::UnknownChip(name.to_string()))
    }

    /// Chip names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
