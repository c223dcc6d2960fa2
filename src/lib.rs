#![doc = include_str!("../README.md")]
//! ## Operate Matrix Files
//!
//! - Reading
//!   - [`ReadMatExt`] extension trait
//!   - [`read_mat`] and [`read_mat_into`] convenience functions, with the
//!     element type fixed by the caller
//!   - [`read_any_mat`] when the element type is only known from the file
//!   - [`read_header`] to inspect a file without loading the payload
//! - Writing
//!   - [`WriteMatExt`] extension trait
//!   - [`write_mat`] convenience function
//!   - [`sparse_zeroed_mat`] to write a file (sparse if possible) of zeroed
//!     data
//!
//! ## Validation
//!
//! Reading rejects a file instead of guessing when
//!
//! - the stored scalar type differs from the requested one
//!   ([`ReadMatError::WrongScalarType`]),
//! - a header tag is out of range ([`ReadMatError::ParseHeader`]),
//! - the payload length is not exactly `rows * cols * size_of::<A>()` bytes
//!   ([`ReadMatError::SizeMismatch`]).
//!
//! ## Limitations
//!
//! - The element traits ([`WritableElement`] and [`ReadableElement`]) are
//!   implemented only for `f64`, `i32` and `f32`.
//! - Header fields and elements are stored in the host byte order.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs)]

mod mat;
mod matrix;

#[cfg(feature = "nalgebra")]
mod impl_nalgebra;
#[cfg(feature = "ndarray")]
mod impl_ndarray;

pub use crate::{
    mat::{
        read_any_mat, read_header, read_mat, read_mat_into, sparse_zeroed_mat, write_mat, Header,
        Order, ParseHeaderError, ReadMatError, ReadMatExt, ReadableElement, ScalarType,
        WritableElement, WriteMatError, WriteMatExt, HEADER_LEN,
    },
    matrix::{AnyMatrix, Matrix, ShapeError},
};
