use crate::{Order, ScalarType};
use num_traits::Zero;
use std::ops::{Index, IndexMut};
use thiserror::Error;

/// An error constructing a [`Matrix`] from a buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// The buffer length is not `rows * cols`.
    #[error("buffer has {actual} elements, shape needs {expected}")]
    LengthMismatch {
        /// `rows * cols`.
        expected: usize,
        /// Buffer length.
        actual: usize,
    },
    /// `rows * cols` overflows `usize`.
    #[error("overflow computing number of elements")]
    Overflow,
}

/// A dense 2-D matrix owning its elements.
///
/// The storage order is part of the value rather than the type, so a matrix
/// read from a file is indexed the same way whichever layout the file used.
/// Two matrices compare equal only if they also share the same order; use
/// [`Matrix::to_order`] to compare logical contents across layouts.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<A> {
    rows: usize,
    cols: usize,
    order: Order,
    data: Vec<A>,
}

impl<A> Matrix<A> {
    /// Creates a matrix from a buffer laid out in `order`.
    ///
    /// ```
    /// use matbin::{Matrix, Order};
    ///
    /// let m = Matrix::from_shape_vec(2, 3, Order::ColumnMajor, vec![1, 4, 2, 5, 3, 6]).unwrap();
    /// assert_eq!(m[(0, 2)], 3);
    /// assert_eq!(m[(1, 0)], 4);
    /// ```
    pub fn from_shape_vec(
        rows: usize,
        cols: usize,
        order: Order,
        data: Vec<A>,
    ) -> Result<Self, ShapeError> {
        let expected = rows.checked_mul(cols).ok_or(ShapeError::Overflow)?;
        if data.len() != expected {
            return Err(ShapeError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            order,
            data,
        })
    }

    /// Caller guarantees `data.len() == rows * cols`.
    pub(crate) fn from_raw_parts(rows: usize, cols: usize, order: Order, data: Vec<A>) -> Self {
        debug_assert_eq!(Some(data.len()), rows.checked_mul(cols));
        Self {
            rows,
            cols,
            order,
            data,
        }
    }

    /// Creates a matrix by calling `f(row, col)` for every element.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn from_fn<F>(rows: usize, cols: usize, order: Order, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> A,
    {
        let len = rows.checked_mul(cols).expect("overflow computing number of elements");
        let mut data = Vec::with_capacity(len);
        match order {
            Order::RowMajor => {
                for r in 0..rows {
                    data.extend((0..cols).map(|c| f(r, c)));
                }
            }
            Order::ColumnMajor => {
                for c in 0..cols {
                    data.extend((0..rows).map(|r| f(r, c)));
                }
            }
        }
        Self {
            rows,
            cols,
            order,
            data,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Storage order of the element buffer.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The element buffer in memory order.
    pub fn as_slice(&self) -> &[A] {
        &self.data
    }

    /// The element buffer in memory order.
    pub fn as_mut_slice(&mut self) -> &mut [A] {
        &mut self.data
    }

    /// Consumes the matrix, returning the element buffer in memory order.
    pub fn into_raw_vec(self) -> Vec<A> {
        self.data
    }

    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(match self.order {
            Order::RowMajor => row * self.cols + col,
            Order::ColumnMajor => col * self.rows + row,
        })
    }

    /// Returns the element at `(row, col)`, or `None` if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&A> {
        self.offset(row, col).map(|i| &self.data[i])
    }

    /// Returns the element at `(row, col)`, or `None` if out of bounds.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut A> {
        self.offset(row, col).map(|i| &mut self.data[i])
    }
}

impl<A: Clone> Matrix<A> {
    /// Returns a copy laid out in `order`.
    ///
    /// ```
    /// use matbin::{Matrix, Order};
    ///
    /// let m = Matrix::from_shape_vec(2, 3, Order::RowMajor, vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// let c = m.to_order(Order::ColumnMajor);
    /// assert_eq!(c.as_slice(), &[1, 4, 2, 5, 3, 6]);
    /// assert_eq!(c.to_order(Order::RowMajor), m);
    /// ```
    pub fn to_order(&self, order: Order) -> Self {
        if order == self.order {
            return self.clone();
        }
        Self::from_fn(self.rows, self.cols, order, |r, c| self[(r, c)].clone())
    }
}

impl<A: Zero + Clone> Matrix<A> {
    /// Creates a matrix filled with zeros.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn zeros(rows: usize, cols: usize, order: Order) -> Self {
        let len = rows.checked_mul(cols).expect("overflow computing number of elements");
        Self {
            rows,
            cols,
            order,
            data: vec![A::zero(); len],
        }
    }
}

impl<A> Index<(usize, usize)> for Matrix<A> {
    type Output = A;

    fn index(&self, (row, col): (usize, usize)) -> &A {
        let (rows, cols) = self.shape();
        self.get(row, col).unwrap_or_else(|| {
            panic!("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")
        })
    }
}

impl<A> IndexMut<(usize, usize)> for Matrix<A> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut A {
        let (rows, cols) = self.shape();
        self.get_mut(row, col).unwrap_or_else(|| {
            panic!("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")
        })
    }
}

/// A matrix whose element type is decided by the file it was read from.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyMatrix {
    /// `f64` elements.
    F64(Matrix<f64>),
    /// `i32` elements.
    I32(Matrix<i32>),
    /// `f32` elements.
    F32(Matrix<f32>),
}

impl AnyMatrix {
    /// Element type of the contained matrix.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::F64(_) => ScalarType::F64,
            Self::I32(_) => ScalarType::I32,
            Self::F32(_) => ScalarType::F32,
        }
    }

    /// `(rows, cols)` of the contained matrix.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::F64(m) => m.shape(),
            Self::I32(m) => m.shape(),
            Self::F32(m) => m.shape(),
        }
    }

    /// Storage order of the contained matrix.
    pub fn order(&self) -> Order {
        match self {
            Self::F64(m) => m.order(),
            Self::I32(m) => m.order(),
            Self::F32(m) => m.order(),
        }
    }
}

macro_rules! impl_from_matrix {
    ($elem:ty, $variant:ident) => {
        impl From<Matrix<$elem>> for AnyMatrix {
            fn from(m: Matrix<$elem>) -> Self {
                Self::$variant(m)
            }
        }
    };
}

impl_from_matrix!(f64, F64);
impl_from_matrix!(i32, I32);
impl_from_matrix!(f32, F32);
