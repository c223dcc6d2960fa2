mod elements;
pub mod header;

pub use self::header::{Header, Order, ParseHeaderError, ScalarType, HEADER_LEN};
use self::header::ReadHeaderError;
use crate::{AnyMatrix, Matrix};
use std::{fs, io, mem, path::Path};
use thiserror::Error;

/// Maximum number of elements the payload buffer grows by before the bytes
/// backing them have been read.
const READ_CHUNK_LEN: usize = 1 << 16;

/// Read a matrix file located at the specified path.
///
/// This is a convenience function for using `File::open` followed by
/// [`ReadMatExt::read_mat`]. The element type is fixed by the caller and
/// checked against the tag stored in the file.
///
/// # Example
///
/// ```no_run
/// use matbin::{read_mat, Matrix};
/// # use matbin::ReadMatError;
///
/// let m: Matrix<f64> = read_mat("matrix.bin")?;
/// println!("{}x{}", m.rows(), m.cols());
/// # Ok::<_, ReadMatError>(())
/// ```
pub fn read_mat<P, T>(path: P) -> Result<T, ReadMatError>
where
    P: AsRef<Path>,
    T: ReadMatExt,
{
    let path = path.as_ref();
    let reader = io::BufReader::new(fs::File::open(path)?);
    T::read_mat(reader).inspect_err(|err| log::warn!("rejected {}: {err}", path.display()))
}

/// Reads a matrix file into `out`.
///
/// `out` is only replaced when the whole file was read successfully; on error
/// it keeps its previous value.
pub fn read_mat_into<P, T>(path: P, out: &mut T) -> Result<(), ReadMatError>
where
    P: AsRef<Path>,
    T: ReadMatExt,
{
    *out = read_mat(path)?;
    Ok(())
}

/// Reads a matrix file whose element type is only known at runtime.
///
/// The returned [`AnyMatrix`] variant is chosen from the scalar type tag in
/// the header.
///
/// # Example
///
/// ```no_run
/// use matbin::{read_any_mat, AnyMatrix};
/// # use matbin::ReadMatError;
///
/// match read_any_mat("matrix.bin")? {
///     AnyMatrix::F64(m) => println!("f64 matrix with {} rows", m.rows()),
///     AnyMatrix::I32(m) => println!("i32 matrix with {} rows", m.rows()),
///     AnyMatrix::F32(m) => println!("f32 matrix with {} rows", m.rows()),
/// }
/// # Ok::<_, ReadMatError>(())
/// ```
pub fn read_any_mat<P: AsRef<Path>>(path: P) -> Result<AnyMatrix, ReadMatError> {
    read_mat(path)
}

/// Reads only the header of a matrix file.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<Header, ReadMatError> {
    read_header_from(fs::File::open(path)?)
}

/// Writes a matrix to a file at the specified path.
///
/// This function will create the file if it does not exist, or overwrite it if
/// it does.
///
/// This is a convenience function for `BufWriter::new(File::create(path)?)`
/// followed by [`WriteMatExt::write_mat`].
///
/// # Example
///
/// ```no_run
/// use matbin::{write_mat, Matrix, Order};
/// # use matbin::WriteMatError;
///
/// let m = Matrix::from_shape_vec(2, 3, Order::RowMajor, vec![1, 2, 3, 4, 5, 6]).unwrap();
/// write_mat("matrix.bin", &m)?;
/// # Ok::<_, WriteMatError>(())
/// ```
pub fn write_mat<P, T>(path: P, matrix: &T) -> Result<(), WriteMatError>
where
    P: AsRef<Path>,
    T: WriteMatExt + ?Sized,
{
    let path = path.as_ref();
    if path.exists() {
        log::debug!("{} exists, replacing", path.display());
    }
    matrix.write_mat(io::BufWriter::new(fs::File::create(path)?))
}

/// Writes a matrix file (sparse if possible) with bitwise-zero-filled data.
///
/// The header describes a `rows` x `cols` matrix of `A` in the given order.
/// The file is written starting at the current cursor location and truncated
/// such that there are no additional bytes after the payload.
///
/// On filesystems which support sparse files, the payload takes no disk space
/// until it is written, so this can set up files larger than the available
/// memory to be filled in later.
pub fn sparse_zeroed_mat<A>(
    mut file: &fs::File,
    rows: usize,
    cols: usize,
    order: Order,
) -> Result<(), WriteMatError>
where
    A: WritableElement,
{
    use io::Seek as _;
    let header = Header {
        scalar_type: A::scalar_type(),
        rows,
        cols,
        order,
    };
    let data_len = header
        .data_len_checked()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or(WriteMatError::LengthOverflow)?;
    header.write(file)?;
    let current_offset = file.stream_position()?;
    // First, truncate the file to the current offset
    file.set_len(current_offset)?;
    // Then, zero-extend the length to represent the data (sparse if possible)
    let new_len = current_offset
        .checked_add(data_len)
        .ok_or(WriteMatError::LengthOverflow)?;
    file.set_len(new_len)?;
    Ok(())
}

/// A matrix element type that can be written to a matrix file.
pub trait WritableElement: Copy {
    /// The scalar type recorded in the header.
    fn scalar_type() -> ScalarType;

    /// Writes a single instance of `Self` to the writer.
    fn write<W: io::Write>(&self, writer: W) -> io::Result<()>;

    /// Writes a slice of `Self` to the writer.
    fn write_slice<W: io::Write>(slice: &[Self], writer: W) -> io::Result<()>;
}

/// A matrix element type that can be read from a matrix file.
pub trait ReadableElement: Copy + Default {
    /// The scalar type this element expects in the header.
    fn scalar_type() -> ScalarType;

    /// Fills `out` with elements read from `reader`.
    ///
    /// Returns an error of kind [`io::ErrorKind::UnexpectedEof`] if the reader
    /// runs out first.
    fn read_into<R: io::Read>(reader: R, out: &mut [Self]) -> io::Result<()>;
}

/// Extension trait for writing a matrix in the binary matrix format.
///
/// If writes are expensive (e.g. for a file or network socket), it is
/// strongly recommended to wrap the writer in a [`std::io::BufWriter`]. For the
/// sake of convenience, this method calls [`io::Write::flush()`] on the writer
/// before returning.
///
/// # Example
///
/// ```no_run
/// use matbin::{Matrix, Order, WriteMatExt};
/// use std::{fs::File, io::BufWriter};
/// # use matbin::WriteMatError;
///
/// let m = Matrix::<f32>::zeros(4, 4, Order::ColumnMajor);
/// let writer = BufWriter::new(File::create("zeros.bin")?);
/// m.write_mat(writer)?;
/// # Ok::<_, WriteMatError>(())
/// ```
pub trait WriteMatExt {
    /// Writes the header and payload to `writer`.
    fn write_mat<W: io::Write>(&self, writer: W) -> Result<(), WriteMatError>;
}

/// An error writing a matrix file.
#[derive(Debug, Error)]
pub enum WriteMatError {
    /// An error caused by I/O.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The payload length in bytes overflows.
    #[error("overflow computing length from shape")]
    LengthOverflow,
}

/// Extension trait for reading a matrix from the binary matrix format.
///
/// # Example
///
/// ```no_run
/// use matbin::{Matrix, ReadMatExt};
/// use std::{fs::File, io::BufReader};
/// # use matbin::ReadMatError;
///
/// let reader = BufReader::new(File::open("matrix.bin")?);
/// let m = Matrix::<i32>::read_mat(reader)?;
/// # println!("m = {:?}", m);
/// # Ok::<_, ReadMatError>(())
/// ```
pub trait ReadMatExt: Sized {
    /// Reads the header and payload from `reader`, which must be positioned
    /// at the start of the header and end right after the payload.
    fn read_mat<R: io::Read>(reader: R) -> Result<Self, ReadMatError>;
}

/// An error reading a matrix file.
#[derive(Debug, Error)]
pub enum ReadMatError {
    /// An error caused by I/O.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The file ends before the header is complete.
    #[error("file is shorter than the 32-byte header")]
    TruncatedHeader,
    /// An error parsing the file header.
    #[error("error parsing header: {0}")]
    ParseHeader(#[from] ParseHeaderError),
    /// The stored scalar type is not the requested one.
    #[error("scalar type mismatch: expected {expected}, found {found}")]
    WrongScalarType {
        /// Element type requested by the caller.
        expected: ScalarType,
        /// Element type stored in the file.
        found: ScalarType,
    },
    /// Overflow while computing the length of the payload from the
    /// dimensions in the header.
    #[error("overflow computing length from shape")]
    LengthOverflow,
    /// The payload length differs from what the header describes.
    #[error("size mismatch: header describes {expected} bytes of data, found {actual}")]
    SizeMismatch {
        /// Payload length in bytes derived from the header.
        expected: u64,
        /// Payload length in bytes actually present.
        actual: u64,
    },
}

impl From<ReadHeaderError> for ReadMatError {
    fn from(err: ReadHeaderError) -> Self {
        match err {
            ReadHeaderError::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Self::TruncatedHeader
            }
            ReadHeaderError::Io(err) => Self::Io(err),
            ReadHeaderError::Parse(err) => Self::ParseHeader(err),
        }
    }
}

fn read_header_from<R: io::Read>(reader: R) -> Result<Header, ReadMatError> {
    Ok(Header::from_reader(reader)?)
}

/// Reads the header and checks it against the element type `A`.
pub(crate) fn read_header_for<A, R>(reader: R) -> Result<Header, ReadMatError>
where
    A: ReadableElement,
    R: io::Read,
{
    let header = read_header_from(reader)?;
    let expected = A::scalar_type();
    if header.scalar_type != expected {
        return Err(ReadMatError::WrongScalarType {
            expected,
            found: header.scalar_type,
        });
    }
    Ok(header)
}

/// Reads a payload of `A` described by `header` into a matrix.
///
/// The reader must end exactly where the payload ends. The buffer grows at most
/// one chunk ahead of the data read, so a header declaring more data than the
/// reader holds fails with [`ReadMatError::SizeMismatch`] instead of
/// allocating for it.
pub(crate) fn read_payload<A, R>(mut reader: R, header: Header) -> Result<Matrix<A>, ReadMatError>
where
    A: ReadableElement,
    R: io::Read,
{
    debug_assert_eq!(header.scalar_type.size(), mem::size_of::<A>());
    let len = header.len_checked().ok_or(ReadMatError::LengthOverflow)?;
    let expected = header.data_len_checked().ok_or(ReadMatError::LengthOverflow)? as u64;
    let mut limited = io::Read::take(&mut reader, expected);
    let mut data = Vec::with_capacity(len.min(READ_CHUNK_LEN));
    while data.len() < len {
        let start = data.len();
        data.resize(start + (len - start).min(READ_CHUNK_LEN), A::default());
        match A::read_into(&mut limited, &mut data[start..]) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                let actual = expected - limited.limit();
                return Err(ReadMatError::SizeMismatch { expected, actual });
            }
            Err(err) => return Err(err.into()),
        }
    }
    let extra = io::copy(&mut reader, &mut io::sink())?;
    if extra != 0 {
        return Err(ReadMatError::SizeMismatch {
            expected,
            actual: expected + extra,
        });
    }
    log::debug!("read {header}");
    Ok(Matrix::from_raw_parts(header.rows, header.cols, header.order, data))
}

/// Writes the header for a `rows` x `cols` matrix of `A`.
pub(crate) fn write_header<A, W>(
    writer: W,
    rows: usize,
    cols: usize,
    order: Order,
) -> Result<(), WriteMatError>
where
    A: WritableElement,
    W: io::Write,
{
    let header = Header {
        scalar_type: A::scalar_type(),
        rows,
        cols,
        order,
    };
    header.data_len_checked().ok_or(WriteMatError::LengthOverflow)?;
    header.write(writer)?;
    log::debug!("writing {header}");
    Ok(())
}

impl<A: WritableElement> WriteMatExt for Matrix<A> {
    fn write_mat<W: io::Write>(&self, mut writer: W) -> Result<(), WriteMatError> {
        write_header::<A, _>(&mut writer, self.rows(), self.cols(), self.order())?;
        A::write_slice(self.as_slice(), &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl<A: ReadableElement> ReadMatExt for Matrix<A> {
    fn read_mat<R: io::Read>(mut reader: R) -> Result<Self, ReadMatError> {
        let header = read_header_for::<A, _>(&mut reader)?;
        read_payload(reader, header)
    }
}

impl WriteMatExt for AnyMatrix {
    fn write_mat<W: io::Write>(&self, writer: W) -> Result<(), WriteMatError> {
        match self {
            Self::F64(m) => m.write_mat(writer),
            Self::I32(m) => m.write_mat(writer),
            Self::F32(m) => m.write_mat(writer),
        }
    }
}

impl ReadMatExt for AnyMatrix {
    fn read_mat<R: io::Read>(mut reader: R) -> Result<Self, ReadMatError> {
        let header = read_header_from(&mut reader)?;
        Ok(match header.scalar_type {
            ScalarType::F64 => Self::F64(read_payload(reader, header)?),
            ScalarType::I32 => Self::I32(read_payload(reader, header)?),
            ScalarType::F32 => Self::F32(read_payload(reader, header)?),
        })
    }
}
