//! IC behavior: truth tables over pins and optional bit-addressable memory.
//!
//! A [`Datasheet`] describes a chip. It lists the direction of every pin, an
//! optional [`StorageShape`] (an array or a 2-D matrix of words up to 32 bits
//! wide), and any number of [`ConditionTable`]s. A table has a fixed list of
//! [`Column`]s. Every row holds one [`Cell`] per column.
//!
//! Input-side columns (input pins and memory reads) hold match conditions.
//! Output-side columns (output pins and memory writes) hold the values a
//! matching row assigns. Every table runs on every evaluation, and every
//! matching row applies in declaration order, so a later row or table
//! overwrites an earlier write to the same pin.
//!
//! Datasheets are validated once when an [`IcChip`] is built. Evaluation
//! itself cannot fail.

use serde::{Deserialize, Serialize};

use crate::state::HoleState;

/// Widest supported memory word.
pub const MAX_WORD_BITS: u8 = 32;

/// Most words a chip's memory may hold.
pub const MAX_WORDS: usize = 1 << 16;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A malformed datasheet. Reported when the chip is constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasheetError {
    #[error("pin count must be a positive even number, got {0}")]
    InvalidPinCount(usize),
    #[error("pin count is {declared} but {listed} pin directions are listed")]
    PinCountMismatch { declared: usize, listed: usize },
    #[error("word size must be 1..=32 bits, got {0}")]
    UnsupportedWordSize(u8),
    #[error("malformed storage: {0}")]
    MalformedStorage(String),
    #[error("table {table}: pin {pin} does not exist")]
    PinOutOfRange { table: usize, pin: u8 },
    #[error("table {table}: memory reference {reference:?} is invalid for this chip")]
    InvalidMemoryRef { table: usize, reference: MemoryRef },
    #[error("table {table}, row {row}: expected {expected} cells, found {found}")]
    RowWidthMismatch {
        table: usize,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("table {table}, row {row}, column {column}: {cell:?} is not a valid condition")]
    InvalidCondition {
        table: usize,
        row: usize,
        column: usize,
        cell: Cell,
    },
}

// ---------------------------------------------------------------------------
// Datasheet model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipKind {
    Combinational,
    Sequential,
}

/// Layout of a chip's internal memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageShape {
    Array { words: usize, word_bits: u8 },
    Matrix { rows: usize, cols: usize, word_bits: u8 },
}

impl StorageShape {
    pub fn word_bits(&self) -> u8 {
        match *self {
            StorageShape::Array { word_bits, .. } | StorageShape::Matrix { word_bits, .. } => {
                word_bits
            }
        }
    }

    pub fn word_count(&self) -> usize {
        match *self {
            StorageShape::Array { words, .. } => words,
            StorageShape::Matrix { rows, cols, .. } => rows.saturating_mul(cols),
        }
    }

    fn validate(&self) -> Result<(), DatasheetError> {
        let bits = self.word_bits();
        if bits == 0 || bits > MAX_WORD_BITS {
            return Err(DatasheetError::UnsupportedWordSize(bits));
        }
        let words = match *self {
            StorageShape::Array { words, .. } => Some(words),
            StorageShape::Matrix { rows, cols, .. } => rows.checked_mul(cols),
        };
        match (*self, words) {
            (StorageShape::Array { words: 0, .. }, _) => Err(DatasheetError::MalformedStorage(
                "array must hold at least one word".into(),
            )),
            (StorageShape::Matrix { rows, cols, .. }, _) if rows == 0 || cols == 0 => Err(
                DatasheetError::MalformedStorage(format!("matrix dimensions {rows}x{cols}")),
            ),
            (_, Some(n)) if n <= MAX_WORDS => Ok(()),
            _ => Err(DatasheetError::MalformedStorage(format!(
                "more than {MAX_WORDS} words"
            ))),
        }
    }

    /// Flat word index for `reference`, or `None` if it does not fit.
    fn locate(&self, reference: &MemoryRef) -> Option<usize> {
        let bits = self.word_bits();
        match (*self, *reference) {
            (StorageShape::Array { words, .. }, MemoryRef::Array { word, bit })
                if word < words && bit < bits =>
            {
                Some(word)
            }
            (StorageShape::Matrix { rows, cols, .. }, MemoryRef::Matrix { row, col, bit })
                if row < rows && col < cols && bit < bits =>
            {
                Some(row * cols + col)
            }
            _ => None,
        }
    }
}

/// One bit of chip memory. Indices are zero-based; bit 0 is the LSB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryRef {
    Array { word: usize, bit: u8 },
    Matrix { row: usize, col: usize, bit: u8 },
}

impl MemoryRef {
    fn bit(&self) -> u8 {
        match *self {
            MemoryRef::Array { bit, .. } | MemoryRef::Matrix { bit, .. } => bit,
        }
    }
}

/// What a table column refers to. Pins are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Pin(u8),
    Read(MemoryRef),
    Write(MemoryRef),
}

/// One table cell.
///
/// As a condition: `High`/`Low` require that level, `DontCare` always
/// matches, and `Memory` requires the level to equal the stored bit.
/// As an action: `High`/`Low` drive that level, `Pin` copies an input pin,
/// `Memory` copies a stored bit, and `DontCare` leaves the column alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    High,
    Low,
    DontCare,
    Pin(u8),
    Memory(MemoryRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

/// Structured description of a chip, as produced by a datasheet loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datasheet {
    /// Catalog name, e.g. `7408`.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Text printed on the package.
    #[serde(default)]
    pub label: String,
    pub pin_count: usize,
    /// Direction of pins 1..=pin_count, in order.
    pub pins: Vec<PinDirection>,
    #[serde(default)]
    pub storage: Option<StorageShape>,
    #[serde(default)]
    pub tables: Vec<ConditionTable>,
}

impl Datasheet {
    pub fn kind(&self) -> ChipKind {
        if self.storage.is_some() {
            ChipKind::Sequential
        } else {
            ChipKind::Combinational
        }
    }

    /// Direction of a 1-based pin.
    pub fn direction(&self, pin: u8) -> Option<PinDirection> {
        (pin as usize).checked_sub(1).and_then(|i| self.pins.get(i).copied())
    }

    pub fn is_input(&self, pin: u8) -> bool {
        self.direction(pin) == Some(PinDirection::Input)
    }

    /// 1-based numbers of the output pins.
    pub fn output_pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.pins
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == PinDirection::Output)
            .map(|(i, _)| i as u8 + 1)
    }

    /// 1-based numbers of the input pins.
    pub fn input_pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.pins
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == PinDirection::Input)
            .map(|(i, _)| i as u8 + 1)
    }

    /// Check every structural rule. Called by [`IcChip::new`].
    pub fn validate(&self) -> Result<(), DatasheetError> {
        if self.pin_count == 0 || self.pin_count % 2 != 0 || self.pin_count > u8::MAX as usize {
            return Err(DatasheetError::InvalidPinCount(self.pin_count));
        }
        if self.pins.len() != self.pin_count {
            return Err(DatasheetError::PinCountMismatch {
                declared: self.pin_count,
                listed: self.pins.len(),
            });
        }
        if let Some(storage) = &self.storage {
            storage.validate()?;
        }

        for (t, table) in self.tables.iter().enumerate() {
            for column in &table.columns {
                match column {
                    Column::Pin(pin) => self.check_pin(t, *pin)?,
                    Column::Read(r) | Column::Write(r) => self.check_memory(t, r)?,
                }
            }
            for (r, row) in table.rows.iter().enumerate() {
                if row.len() != table.columns.len() {
                    return Err(DatasheetError::RowWidthMismatch {
                        table: t,
                        row: r,
                        expected: table.columns.len(),
                        found: row.len(),
                    });
                }
                for (c, (column, cell)) in table.columns.iter().zip(row).enumerate() {
                    match cell {
                        Cell::Pin(pin) => self.check_pin(t, *pin)?,
                        Cell::Memory(m) => self.check_memory(t, m)?,
                        _ => {}
                    }
                    if self.is_condition_column(column) && matches!(cell, Cell::Pin(_)) {
                        return Err(DatasheetError::InvalidCondition {
                            table: t,
                            row: r,
                            column: c,
                            cell: *cell,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_pin(&self, table: usize, pin: u8) -> Result<(), DatasheetError> {
        if pin == 0 || pin as usize > self.pin_count {
            return Err(DatasheetError::PinOutOfRange { table, pin });
        }
        Ok(())
    }

    fn check_memory(&self, table: usize, reference: &MemoryRef) -> Result<(), DatasheetError> {
        match &self.storage {
            Some(storage) if storage.locate(reference).is_some() => Ok(()),
            _ => Err(DatasheetError::InvalidMemoryRef {
                table,
                reference: *reference,
            }),
        }
    }

    fn is_condition_column(&self, column: &Column) -> bool {
        match column {
            Column::Pin(pin) => self.is_input(*pin),
            Column::Read(_) => true,
            Column::Write(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Word storage of a sequential chip. All words start at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    shape: StorageShape,
    words: Vec<u32>,
}

impl Memory {
    pub fn new(shape: StorageShape) -> Self {
        Self {
            shape,
            words: vec![0; shape.word_count()],
        }
    }

    pub fn shape(&self) -> StorageShape {
        self.shape
    }

    fn mask(&self) -> u32 {
        match self.shape.word_bits() {
            MAX_WORD_BITS => u32::MAX,
            bits => (1u32 << bits) - 1,
        }
    }

    /// Word at a flat index, truncated to the word size.
    pub fn word(&self, index: usize) -> Option<u32> {
        self.words.get(index).map(|w| w & self.mask())
    }

    /// Read one bit. References outside the storage read as 0.
    pub fn bit(&self, reference: &MemoryRef) -> bool {
        match self.shape.locate(reference) {
            Some(i) => ((self.words[i] & self.mask()) >> reference.bit()) & 1 == 1,
            None => false,
        }
    }

    /// Set or clear one bit. References outside the storage are ignored.
    pub fn write_bit(&mut self, reference: &MemoryRef, value: bool) {
        if let Some(i) = self.shape.locate(reference) {
            let flag = 1u32 << reference.bit();
            if value {
                self.words[i] |= flag;
            } else {
                self.words[i] &= !flag;
            }
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}

// ---------------------------------------------------------------------------
// IcChip
// ---------------------------------------------------------------------------

/// A validated datasheet plus the chip's live memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcChip {
    datasheet: Datasheet,
    memory: Option<Memory>,
}

impl IcChip {
    pub fn new(datasheet: Datasheet) -> Result<Self, DatasheetError> {
        datasheet.validate()?;
        let memory = datasheet.storage.map(Memory::new);
        Ok(Self { datasheet, memory })
    }

    pub fn datasheet(&self) -> &Datasheet {
        &self.datasheet
    }

    pub fn name(&self) -> &str {
        &self.datasheet.name
    }

    pub fn pin_count(&self) -> usize {
        self.datasheet.pin_count
    }

    pub fn memory(&self) -> Option<&Memory> {
        self.memory.as_ref()
    }

    /// Zero all memory words.
    pub fn reset(&mut self) {
        if let Some(memory) = &mut self.memory {
            memory.clear();
        }
    }

    /// Compute the pin states this chip drives for the given pin states.
    ///
    /// `inputs` holds the current state of every pin (output pins included,
    /// since action cells may copy any pin). Input pins pass through. Output
    /// pins not written by any matching row stay `NoConnection`.
    ///
    /// Panics if `inputs.len()` differs from the pin count.
    pub fn evaluate(&mut self, inputs: &[HoleState]) -> Vec<HoleState> {
        assert_eq!(
            inputs.len(),
            self.datasheet.pin_count,
            "{} expects {} pin states",
            self.datasheet.name,
            self.datasheet.pin_count
        );

        let mut out: Vec<HoleState> = self
            .datasheet
            .pins
            .iter()
            .zip(inputs)
            .map(|(dir, &state)| match dir {
                PinDirection::Input => state,
                PinDirection::Output => HoleState::NoConnection,
            })
            .collect();

        let Self { datasheet, memory } = self;
        for table in &datasheet.tables {
            for row in &table.rows {
                if row_matches(datasheet, table, row, inputs, memory.as_ref()) {
                    apply_row(datasheet, table, row, inputs, memory.as_mut(), &mut out);
                }
            }
        }
        out
    }
}

fn stored_level(memory: Option<&Memory>, reference: &MemoryRef) -> HoleState {
    match memory {
        Some(m) => HoleState::from_bit(m.bit(reference)),
        None => HoleState::NoConnection,
    }
}

fn cell_matches(cell: &Cell, state: HoleState, memory: Option<&Memory>) -> bool {
    match cell {
        Cell::High => state.is_high(),
        Cell::Low => state.is_low(),
        Cell::DontCare => true,
        Cell::Memory(r) => state == stored_level(memory, r),
        Cell::Pin(_) => false,
    }
}

fn row_matches(
    datasheet: &Datasheet,
    table: &ConditionTable,
    row: &[Cell],
    inputs: &[HoleState],
    memory: Option<&Memory>,
) -> bool {
    table.columns.iter().zip(row).all(|(column, cell)| match column {
        Column::Pin(pin) if datasheet.is_input(*pin) => {
            cell_matches(cell, inputs[*pin as usize - 1], memory)
        }
        Column::Read(r) => cell_matches(cell, stored_level(memory, r), memory),
        _ => true,
    })
}

fn apply_row(
    datasheet: &Datasheet,
    table: &ConditionTable,
    row: &[Cell],
    inputs: &[HoleState],
    mut memory: Option<&mut Memory>,
    out: &mut [HoleState],
) {
    for (column, cell) in table.columns.iter().zip(row) {
        let value = match cell {
            Cell::High => HoleState::High,
            Cell::Low => HoleState::Low,
            Cell::Pin(pin) => inputs[*pin as usize - 1],
            Cell::Memory(r) => stored_level(memory.as_deref(), r),
            Cell::DontCare => continue,
        };
        match column {
            Column::Pin(pin) if !datasheet.is_input(*pin) => out[*pin as usize - 1] = value,
            Column::Write(r) => {
                if let Some(m) = memory.as_deref_mut() {
                    m.write_bit(r, value.is_high());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::HoleState::{High as H, Low as L, NoConnection as N};

    /// Two-input AND on pins 1, 2 -> 3, plus a 4th unused input pin.
    fn and_gate() -> Datasheet {
        Datasheet {
            name: "AND".into(),
            description: String::new(),
            label: String::new(),
            pin_count: 4,
            pins: vec![
                PinDirection::Input,
                PinDirection::Input,
                PinDirection::Output,
                PinDirection::Input,
            ],
            storage: None,
            tables: vec![ConditionTable {
                columns: vec![Column::Pin(1), Column::Pin(2), Column::Pin(3)],
                rows: vec![
                    vec![Cell::High, Cell::High, Cell::High],
                    vec![Cell::Low, Cell::DontCare, Cell::Low],
                    vec![Cell::DontCare, Cell::Low, Cell::Low],
                ],
            }],
        }
    }

    /// D latch: pin 1 = D, pin 2 = enable, pin 3 = Q, pin 4 = /Q.
    fn latch() -> Datasheet {
        let bit = MemoryRef::Array { word: 0, bit: 0 };
        Datasheet {
            name: "LATCH".into(),
            description: String::new(),
            label: String::new(),
            pin_count: 4,
            pins: vec![
                PinDirection::Input,
                PinDirection::Input,
                PinDirection::Output,
                PinDirection::Output,
            ],
            storage: Some(StorageShape::Array {
                words: 1,
                word_bits: 1,
            }),
            tables: vec![
                ConditionTable {
                    columns: vec![Column::Pin(2), Column::Write(bit)],
                    rows: vec![vec![Cell::High, Cell::Pin(1)]],
                },
                ConditionTable {
                    columns: vec![Column::Read(bit), Column::Pin(3), Column::Pin(4)],
                    rows: vec![
                        vec![Cell::High, Cell::High, Cell::Low],
                        vec![Cell::Low, Cell::Low, Cell::High],
                    ],
                },
            ],
        }
    }

    // -----------------------------------------------------------------------
    // Combinational behavior
    // -----------------------------------------------------------------------

    #[test]
    fn and_truth_table() {
        let mut chip = IcChip::new(and_gate()).unwrap();
        assert_eq!(chip.evaluate(&[H, H, N, N])[2], H);
        assert_eq!(chip.evaluate(&[H, L, N, N])[2], L);
        assert_eq!(chip.evaluate(&[L, H, N, N])[2], L);
        assert_eq!(chip.evaluate(&[L, L, N, N])[2], L);
    }

    #[test]
    fn unmatched_output_stays_unconnected() {
        let mut chip = IcChip::new(and_gate()).unwrap();
        assert_eq!(chip.evaluate(&[H, N, N, N])[2], N);
    }

    #[test]
    fn inputs_pass_through() {
        let mut chip = IcChip::new(and_gate()).unwrap();
        let out = chip.evaluate(&[H, L, H, L]);
        assert_eq!(out, vec![H, L, L, L]);
    }

    #[test]
    fn later_table_overrides_same_pin() {
        let mut sheet = and_gate();
        sheet.tables.push(ConditionTable {
            columns: vec![Column::Pin(4), Column::Pin(3)],
            rows: vec![vec![Cell::High, Cell::Pin(4)]],
        });
        let mut chip = IcChip::new(sheet).unwrap();
        // First table drives LOW, second copies pin 4 (HIGH).
        assert_eq!(chip.evaluate(&[L, L, N, H])[2], H);
        // Second table does not match: first table's LOW stands.
        assert_eq!(chip.evaluate(&[L, L, N, L])[2], L);
    }

    #[test]
    fn every_matching_row_applies_in_order() {
        let mut sheet = and_gate();
        sheet.tables[0]
            .rows
            .push(vec![Cell::DontCare, Cell::DontCare, Cell::High]);
        let mut chip = IcChip::new(sheet).unwrap();
        assert_eq!(chip.evaluate(&[L, L, N, N])[2], H);
    }

    #[test]
    #[should_panic(expected = "expects 4 pin states")]
    fn wrong_input_width_panics() {
        let mut chip = IcChip::new(and_gate()).unwrap();
        chip.evaluate(&[H, H]);
    }

    // -----------------------------------------------------------------------
    // Sequential behavior
    // -----------------------------------------------------------------------

    #[test]
    fn latch_stores_and_holds() {
        let mut chip = IcChip::new(latch()).unwrap();
        assert_eq!(chip.datasheet().kind(), ChipKind::Sequential);

        let out = chip.evaluate(&[H, H, N, N]);
        assert_eq!((out[2], out[3]), (H, L));

        // Enable low: D is ignored, the stored bit is held.
        let out = chip.evaluate(&[L, L, N, N]);
        assert_eq!((out[2], out[3]), (H, L));

        // Enable high with D low clears the bit.
        let out = chip.evaluate(&[L, H, N, N]);
        assert_eq!((out[2], out[3]), (L, H));
        assert_eq!(chip.memory().unwrap().word(0), Some(0));
    }

    #[test]
    fn reset_clears_memory() {
        let mut chip = IcChip::new(latch()).unwrap();
        chip.evaluate(&[H, H, N, N]);
        assert_eq!(chip.memory().unwrap().word(0), Some(1));
        chip.reset();
        assert_eq!(chip.memory().unwrap().word(0), Some(0));
    }

    #[test]
    fn memory_condition_compares_against_stored_bit() {
        let bit = MemoryRef::Array { word: 0, bit: 0 };
        let mut sheet = latch();
        // Output pin 3 copies pin 1 only when pin 1 equals the stored bit.
        sheet.tables = vec![ConditionTable {
            columns: vec![Column::Pin(1), Column::Pin(3)],
            rows: vec![vec![Cell::Memory(bit), Cell::High]],
        }];
        let mut chip = IcChip::new(sheet).unwrap();
        assert_eq!(chip.evaluate(&[L, N, N, N])[2], H);
        assert_eq!(chip.evaluate(&[H, N, N, N])[2], N);
    }

    #[test]
    fn full_width_words_address_bit_31() {
        let shape = StorageShape::Matrix {
            rows: 2,
            cols: 2,
            word_bits: 32,
        };
        let mut memory = Memory::new(shape);
        let top = MemoryRef::Matrix {
            row: 1,
            col: 1,
            bit: 31,
        };
        memory.write_bit(&top, true);
        assert!(memory.bit(&top));
        assert_eq!(memory.word(3), Some(1 << 31));
        memory.write_bit(&top, false);
        assert_eq!(memory.word(3), Some(0));
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn word_size_above_32_is_rejected() {
        let mut sheet = latch();
        sheet.storage = Some(StorageShape::Array {
            words: 1,
            word_bits: 33,
        });
        assert_eq!(
            IcChip::new(sheet).unwrap_err(),
            DatasheetError::UnsupportedWordSize(33)
        );
    }

    #[test]
    fn pin_count_mismatch_is_rejected() {
        let mut sheet = and_gate();
        sheet.pins.pop();
        assert_eq!(
            sheet.validate(),
            Err(DatasheetError::PinCountMismatch {
                declared: 4,
                listed: 3
            })
        );
    }

    #[test]
    fn odd_pin_count_is_rejected() {
        let mut sheet = and_gate();
        sheet.pin_count = 3;
        sheet.pins.pop();
        assert_eq!(sheet.validate(), Err(DatasheetError::InvalidPinCount(3)));
    }

    #[test]
    fn empty_matrix_is_malformed() {
        let mut sheet = latch();
        sheet.storage = Some(StorageShape::Matrix {
            rows: 0,
            cols: 4,
            word_bits: 8,
        });
        assert!(matches!(
            sheet.validate(),
            Err(DatasheetError::MalformedStorage(_))
        ));
    }

    #[test]
    fn oversized_storage_is_malformed() {
        for shape in [
            StorageShape::Matrix {
                rows: usize::MAX / 2,
                cols: 4,
                word_bits: 8,
            },
            StorageShape::Matrix {
                rows: 1 << 9,
                cols: 1 << 9,
                word_bits: 8,
            },
            StorageShape::Array {
                words: usize::MAX,
                word_bits: 8,
            },
        ] {
            let mut sheet = and_gate();
            sheet.storage = Some(shape);
            assert!(
                matches!(
                    IcChip::new(sheet),
                    Err(DatasheetError::MalformedStorage(_))
                ),
                "{shape:?}"
            );
        }

        let mut sheet = and_gate();
        sheet.storage = Some(StorageShape::Array {
            words: MAX_WORDS,
            word_bits: 1,
        });
        assert!(IcChip::new(sheet).is_ok());
    }

    #[test]
    fn memory_reference_without_storage_is_rejected() {
        let mut sheet = latch();
        sheet.storage = None;
        assert!(matches!(
            sheet.validate(),
            Err(DatasheetError::InvalidMemoryRef { table: 0, .. })
        ));
    }

    #[test]
    fn memory_bit_beyond_word_is_rejected() {
        let mut sheet = latch();
        sheet.tables[0].columns[1] = Column::Write(MemoryRef::Array { word: 0, bit: 1 });
        assert!(matches!(
            sheet.validate(),
            Err(DatasheetError::InvalidMemoryRef { .. })
        ));
    }

    #[test]
    fn short_row_is_rejected() {
        let mut sheet = and_gate();
        sheet.tables[0].rows[1].pop();
        assert_eq!(
            sheet.validate(),
            Err(DatasheetError::RowWidthMismatch {
                table: 0,
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn pin_copy_is_not_a_condition() {
        let mut sheet = and_gate();
        sheet.tables[0].rows[0][0] = Cell::Pin(2);
        assert!(matches!(
            sheet.validate(),
            Err(DatasheetError::InvalidCondition { column: 0, .. })
        ));
    }

    #[test]
    fn column_pin_out_of_range_is_rejected() {
        let mut sheet = and_gate();
        sheet.tables[0].columns[2] = Column::Pin(5);
        assert_eq!(
            sheet.validate(),
            Err(DatasheetError::PinOutOfRange { table: 0, pin: 5 })
        );
    }

    #[test]
    fn pin_helpers() {
        let sheet = and_gate();
        assert_eq!(sheet.kind(), ChipKind::Combinational);
        assert_eq!(sheet.output_pins().collect::<Vec<_>>(), vec![3]);
        assert_eq!(sheet.input_pins().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(sheet.direction(0), None);
        assert_eq!(sheet.direction(5), None);
    }
}
