use crate::{
    mat::{read_header_for, read_payload, write_header},
    Matrix, Order, ReadMatError, ReadMatExt, ReadableElement, WritableElement, WriteMatError,
    WriteMatExt,
};
use ndarray::{prelude::*, Data, DataOwned, ShapeBuilder as _};
use std::io;

impl<A, S> WriteMatExt for ArrayBase<S, Ix2>
where
    A: WritableElement,
    S: Data<Elem = A>,
{
    fn write_mat<W: io::Write>(&self, mut writer: W) -> Result<(), WriteMatError> {
        let (rows, cols) = self.dim();
        let write_contiguous = |mut writer: W, order| {
            write_header::<A, _>(&mut writer, rows, cols, order)?;
            A::write_slice(self.as_slice_memory_order().unwrap(), &mut writer)?;
            writer.flush()?;
            Ok(())
        };
        if self.is_standard_layout() {
            write_contiguous(writer, Order::RowMajor)
        } else if self.view().reversed_axes().is_standard_layout() {
            write_contiguous(writer, Order::ColumnMajor)
        } else {
            write_header::<A, _>(&mut writer, rows, cols, Order::RowMajor)?;
            for elem in self.iter() {
                elem.write(&mut writer)?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}

impl<A, S> ReadMatExt for ArrayBase<S, Ix2>
where
    A: ReadableElement,
    S: DataOwned<Elem = A>,
{
    fn read_mat<R: io::Read>(mut reader: R) -> Result<Self, ReadMatError> {
        let header = read_header_for::<A, _>(&mut reader)?;
        Ok(read_payload::<A, _>(reader, header)?.into())
    }
}

impl<A, S> From<Matrix<A>> for ArrayBase<S, Ix2>
where
    S: DataOwned<Elem = A>,
{
    fn from(m: Matrix<A>) -> Self {
        let (rows, cols) = m.shape();
        let shape = (rows, cols).set_f(m.order() == Order::ColumnMajor);
        // The buffer length always matches the shape
        ArrayBase::from_shape_vec(shape, m.into_raw_vec()).unwrap()
    }
}

impl<A, S> From<&ArrayBase<S, Ix2>> for Matrix<A>
where
    A: Clone,
    S: Data<Elem = A>,
{
    fn from(arr: &ArrayBase<S, Ix2>) -> Self {
        let (rows, cols) = arr.dim();
        if arr.is_standard_layout() {
            let data = arr.as_slice_memory_order().unwrap().to_vec();
            Matrix::from_raw_parts(rows, cols, Order::RowMajor, data)
        } else if arr.view().reversed_axes().is_standard_layout() {
            let data = arr.as_slice_memory_order().unwrap().to_vec();
            Matrix::from_raw_parts(rows, cols, Order::ColumnMajor, data)
        } else {
            Matrix::from_fn(rows, cols, Order::RowMajor, |r, c| arr[[r, c]].clone())
        }
    }
}
