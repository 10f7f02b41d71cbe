use fixedbitset::FixedBitSet;

/// Dense `rows x cols` boolean matrix, one bitset per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    rows: Vec<FixedBitSet>,
    cols: usize,
}

impl BitMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| FixedBitSet::with_capacity(cols)).collect(),
            cols,
        }
    }

    /// Square matrix with the diagonal set.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m.set(i, i);
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.rows[row].contains(col)
    }

    pub fn set(&mut self, row: usize, col: usize) {
        self.rows[row].insert(col);
    }

    /// Set both `(a, b)` and `(b, a)`.
    pub fn set_symmetric(&mut self, a: usize, b: usize) {
        self.set(a, b);
        self.set(b, a);
    }

    /// Column indices set in `row`, ascending.
    pub fn row_ones(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[row].ones()
    }

    /// Row indices set in `col`, ascending.
    pub fn col_ones(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, bits)| bits.contains(col))
            .map(|(i, _)| i)
    }

    pub fn count_ones(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones(..)).sum()
    }

    pub fn is_symmetric(&self) -> bool {
        self.rows() == self.cols
            && (0..self.cols).all(|i| self.row_ones(i).all(|j| self.get(j, i)))
    }
}
