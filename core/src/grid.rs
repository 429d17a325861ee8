use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{NlmError, Result};

// Raster of `cols × rows` cells in one flat row-major buffer.
// Cell (col, row) lives at `row * cols + col`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid<T>")]
pub struct Grid<T> {
    cols: usize,
    rows: usize,
    data: Vec<T>,
}

// Unchecked wire shape; `Grid` only accepts it when the buffer fits.
#[derive(Deserialize)]
struct RawGrid<T> {
    cols: usize,
    rows: usize,
    data: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = NlmError;

    fn try_from(raw: RawGrid<T>) -> Result<Self> {
        Grid::from_vec(raw.cols, raw.rows, raw.data)
    }
}

impl<T: Clone + Default> Grid<T> {
    // Every cell starts at `T::default()` (0.0 for f64, 0 for labels)
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::filled(cols, rows, T::default())
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(cols: usize, rows: usize, value: T) -> Self {
        Self {
            cols,
            rows,
            data: vec![value; cols * rows],
        }
    }
}

impl<T> Grid<T> {
    // Wrap an existing row-major buffer
    pub fn from_vec(cols: usize, rows: usize, data: Vec<T>) -> Result<Self> {
        let Some(cells) = cols.checked_mul(rows) else {
            return Err(NlmError::InvalidDimension {
                rows,
                cols,
                reason: "cols * rows overflows",
            });
        };
        if data.len() != cells {
            return Err(NlmError::InvalidDimension {
                rows,
                cols,
                reason: "buffer length does not equal cols * rows",
            });
        }
        Ok(Self { cols, rows, data })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.cols == self.rows
    }

    // Flat index of (col, row), or None when outside the grid
    #[inline]
    pub fn index_of(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    // Mutable cells in row-major order
    pub fn cells_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    // Iterate rows top to bottom, each as a slice of `cols` cells
    pub fn row_slices(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks(self.cols.max(1))
    }

    fn out_of_range(&self, col: usize, row: usize) -> NlmError {
        NlmError::OutOfRange {
            col,
            row,
            cols: self.cols,
            rows: self.rows,
        }
    }
}

impl<T: Copy> Grid<T> {
    pub fn get(&self, col: usize, row: usize) -> Result<T> {
        self.index_of(col, row)
            .map(|i| self.data[i])
            .ok_or_else(|| self.out_of_range(col, row))
    }

    pub fn set(&mut self, col: usize, row: usize, value: T) -> Result<()> {
        let i = self
            .index_of(col, row)
            .ok_or_else(|| self.out_of_range(col, row))?;
        self.data[i] = value;
        Ok(())
    }
}

// Panicking access for inner loops whose indices are already in range
impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (col, row): (usize, usize)) -> &T {
        assert!(
            col < self.cols && row < self.rows,
            "cell ({col}, {row}) outside {}x{} grid",
            self.cols,
            self.rows
        );
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (col, row): (usize, usize)) -> &mut T {
        assert!(
            col < self.cols && row < self.rows,
            "cell ({col}, {row}) outside {}x{} grid",
            self.cols,
            self.rows
        );
        &mut self.data[row * self.cols + col]
    }
}
