//! Serde data file structs for IC datasheets.
//!
//! These structs define the on-disk format of a chip description. They are
//! deserialized from RON, JSON, or TOML and then resolved into
//! [`breadboard_core::ic::Datasheet`], which is validated on the way out.

use std::path::Path;

use breadboard_core::ic::{
    Cell, Column, ConditionTable, Datasheet, MemoryRef, PinDirection, StorageShape,
};
use serde::Deserialize;

use crate::loader::DataLoadError;

// ===========================================================================
// Datasheet
// ===========================================================================

/// A chip definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasheetData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub label: String,
    /// Declared package size. Defaults to the length of `pins`; when given,
    /// it must agree with it.
    #[serde(default)]
    pub pin_count: Option<usize>,
    /// One `I` or `O` per pin, pin 1 first.
    pub pins: String,
    #[serde(default)]
    pub storage: Option<StorageData>,
    #[serde(default)]
    pub tables: Vec<TableData>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum StorageData {
    Array { words: usize, word_bits: u8 },
    Matrix { rows: usize, cols: usize, word_bits: u8 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableData {
    pub columns: Vec<ColumnData>,
    #[serde(default)]
    pub rows: Vec<Vec<CellData>>,
}

/// Table column header. Pins are numbered from 1; memory indices from 0.
#[derive(Debug, Clone, Copy, Deserialize)]
pub enum ColumnData {
    Pin(u8),
    ReadArray(usize, u8),
    WriteArray(usize, u8),
    ReadMatrix(usize, usize, u8),
    WriteMatrix(usize, usize, u8),
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum CellData {
    High,
    Low,
    DontCare,
    Pin(u8),
    Array(usize, u8),
    Matrix(usize, usize, u8),
}

// ===========================================================================
// Resolution
// ===========================================================================

impl From<StorageData> for StorageShape {
    fn from(data: StorageData) -> Self {
        match data {
            StorageData::Array { words, word_bits } => StorageShape::Array { words, word_bits },
            StorageData::Matrix {
                rows,
                cols,
                word_bits,
            } => StorageShape::Matrix {
                rows,
                cols,
                word_bits,
            },
        }
    }
}

impl From<ColumnData> for Column {
    fn from(data: ColumnData) -> Self {
        match data {
            ColumnData::Pin(pin) => Column::Pin(pin),
            ColumnData::ReadArray(word, bit) => Column::Read(MemoryRef::Array { word, bit }),
            ColumnData::WriteArray(word, bit) => Column::Write(MemoryRef::Array { word, bit }),
            ColumnData::ReadMatrix(row, col, bit) => {
                Column::Read(MemoryRef::Matrix { row, col, bit })
            }
            ColumnData::WriteMatrix(row, col, bit) => {
                Column::Write(MemoryRef::Matrix { row, col, bit })
            }
        }
    }
}

impl From<CellData> for Cell {
    fn from(data: CellData) -> Self {
        match data {
            CellData::High => Cell::High,
            CellData::Low => Cell::Low,
            CellData::DontCare => Cell::DontCare,
            CellData::Pin(pin) => Cell::Pin(pin),
            CellData::Array(word, bit) => Cell::Memory(MemoryRef::Array { word, bit }),
            CellData::Matrix(row, col, bit) => Cell::Memory(MemoryRef::Matrix { row, col, bit }),
        }
    }
}

fn parse_pins(pins: &str, file: &Path) -> Result<Vec<PinDirection>, DataLoadError> {
    pins.chars()
        .enumerate()
        .map(|(i, c)| match c.to_ascii_uppercase() {
            'I' => Ok(PinDirection::Input),
            'O' => Ok(PinDirection::Output),
            other => Err(DataLoadError::Parse {
                file: file.to_path_buf(),
                detail: format!("pin {}: expected 'I' or 'O', found '{other}'", i + 1),
            }),
        })
        .collect()
}

impl DatasheetData {
    /// Convert into an engine datasheet and validate it. `file` is only used
    /// for errors.
    pub fn resolve(&self, file: &Path) -> Result<Datasheet, DataLoadError> {
        let pins = parse_pins(&self.pins, file)?;
        let datasheet = Datasheet {
            name: self.name.clone(),
            description: self.description.clone(),
            label: if self.label.is_empty() {
                self.name.clone()
            } else {
                self.label.clone()
            },
            pin_count: self.pin_count.unwrap_or(pins.len()),
            pins,
            storage: self.storage.map(StorageShape::from),
            tables: self
                .tables
                .iter()
                .map(|t| ConditionTable {
                    columns: t.columns.iter().copied().map(Column::from).collect(),
                    rows: t
                        .rows
                        .iter()
                        .map(|row| row.iter().copied().map(Cell::from).collect())
                        .collect(),
                })
                .collect(),
        };
        datasheet
            .validate()
            .map_err(|source| DataLoadError::InvalidDatasheet {
                file: file.to_path_buf(),
                source,
            })?;
        Ok(datasheet)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
