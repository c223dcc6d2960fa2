use crate::{
    mat::{read_header_for, read_payload, write_header},
    Matrix, Order, ReadMatError, ReadMatExt, ReadableElement, WritableElement, WriteMatError,
    WriteMatExt,
};
use nalgebra::{storage::RawStorage, DMatrix, Dim, Scalar};
use std::io;

// nalgebra storage is column-major, fixed-size matrices included.
impl<T, R, C, S> WriteMatExt for nalgebra::Matrix<T, R, C, S>
where
    T: WritableElement + Scalar,
    R: Dim,
    C: Dim,
    S: RawStorage<T, R, C>,
{
    fn write_mat<W: io::Write>(&self, mut writer: W) -> Result<(), WriteMatError> {
        write_header::<T, _>(&mut writer, self.nrows(), self.ncols(), Order::ColumnMajor)?;
        for elem in self.iter() {
            elem.write(&mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<T> ReadMatExt for DMatrix<T>
where
    T: ReadableElement + Scalar,
{
    fn read_mat<R: io::Read>(mut reader: R) -> Result<Self, ReadMatError> {
        let header = read_header_for::<T, _>(&mut reader)?;
        Ok(read_payload::<T, _>(reader, header)?.into())
    }
}

impl<T: Scalar> From<Matrix<T>> for DMatrix<T> {
    fn from(m: Matrix<T>) -> Self {
        let (rows, cols) = m.shape();
        match m.order() {
            Order::ColumnMajor => DMatrix::from_vec(rows, cols, m.into_raw_vec()),
            Order::RowMajor => DMatrix::from_row_slice(rows, cols, m.as_slice()),
        }
    }
}

impl<T: Scalar> From<&DMatrix<T>> for Matrix<T> {
    fn from(m: &DMatrix<T>) -> Self {
        Matrix::from_raw_parts(m.nrows(), m.ncols(), Order::ColumnMajor, m.as_slice().to_vec())
    }
}
