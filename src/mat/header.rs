use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::{error::Error, fmt, io};

/// Number of fields in the header.
const FIELD_COUNT: usize = 4;

/// Total header length in bytes. The payload starts right after it.
pub const HEADER_LEN: usize = FIELD_COUNT * std::mem::size_of::<u64>();

/// The element type stored in a matrix file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `f64`, tag 0.
    F64,
    /// `i32`, tag 1.
    I32,
    /// `f32`, tag 2.
    F32,
}

impl ScalarType {
    /// Tag written to the file header.
    pub const fn tag(self) -> u64 {
        match self {
            Self::F64 => 0,
            Self::I32 => 1,
            Self::F32 => 2,
        }
    }

    /// Returns `None` for unknown tags.
    pub const fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            0 => Some(Self::F64),
            1 => Some(Self::I32),
            2 => Some(Self::F32),
            _ => None,
        }
    }

    /// Size of a single element in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::F64 => 8,
            Self::I32 | Self::F32 => 4,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::F64 => "f64",
            Self::I32 => "i32",
            Self::F32 => "f32",
        };
        f.write_str(name)
    }
}

/// Storage order of the element buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Order {
    /// Consecutive elements belong to the same column (tag 0).
    ColumnMajor,
    /// Consecutive elements belong to the same row (tag 1).
    #[default]
    RowMajor,
}

impl Order {
    /// Tag written to the file header.
    pub const fn tag(self) -> u64 {
        match self {
            Self::ColumnMajor => 0,
            Self::RowMajor => 1,
        }
    }

    /// Returns `None` for unknown tags.
    pub const fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            0 => Some(Self::ColumnMajor),
            1 => Some(Self::RowMajor),
            _ => None,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ColumnMajor => f.write_str("column-major"),
            Self::RowMajor => f.write_str("row-major"),
        }
    }
}

/// An error parsing the header of a matrix file.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseHeaderError {
    /// The scalar type tag is not one of the supported element types.
    UnknownScalarTag(u64),
    /// The storage order tag is neither column-major nor row-major.
    UnknownOrderTag(u64),
    /// A dimension doesn't fit in `usize`.
    DimensionOverflow(u64),
}

impl Error for ParseHeaderError {}

impl fmt::Display for ParseHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownScalarTag(tag) => write!(f, "unknown scalar type tag: {tag}"),
            Self::UnknownOrderTag(tag) => write!(f, "major tag out of range: {tag}"),
            Self::DimensionOverflow(dim) => write!(f, "dimension {dim} does not fit in `usize`"),
        }
    }
}

#[derive(Debug)]
pub(crate) enum ReadHeaderError {
    Io(io::Error),
    Parse(ParseHeaderError),
}

impl Error for ReadHeaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl fmt::Display for ReadHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Parse(err) => write!(f, "error parsing header: {err}"),
        }
    }
}

impl From<io::Error> for ReadHeaderError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ParseHeaderError> for ReadHeaderError {
    fn from(err: ParseHeaderError) -> Self {
        Self::Parse(err)
    }
}

/// The fixed header at the start of every matrix file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Element type of the payload.
    pub scalar_type: ScalarType,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Order of the elements in the payload.
    pub order: Order,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self {
            scalar_type,
            rows,
            cols,
            order,
        } = self;
        write!(f, "{rows}x{cols} {scalar_type} ({order})")
    }
}

impl Header {
    /// Number of elements described by the header.
    ///
    /// Returns `None` on overflow.
    pub fn len_checked(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Expected payload length in bytes.
    ///
    /// Returns `None` if it overflows `isize`.
    pub fn data_len_checked(&self) -> Option<usize> {
        const MAX: usize = isize::MAX as usize;
        let n = self.len_checked()?.checked_mul(self.scalar_type.size())?;
        (n <= MAX).then_some(n)
    }

    fn from_fields(fields: [u64; FIELD_COUNT]) -> Result<Self, ParseHeaderError> {
        let [scalar_tag, rows, cols, major_tag] = fields;
        let scalar_type =
            ScalarType::from_tag(scalar_tag).ok_or(ParseHeaderError::UnknownScalarTag(scalar_tag))?;
        let dim = |d: u64| usize::try_from(d).map_err(|_| ParseHeaderError::DimensionOverflow(d));
        let rows = dim(rows)?;
        let cols = dim(cols)?;
        let order = Order::from_tag(major_tag).ok_or(ParseHeaderError::UnknownOrderTag(major_tag))?;
        Ok(Self {
            scalar_type,
            rows,
            cols,
            order,
        })
    }

    fn to_fields(self) -> [u64; FIELD_COUNT] {
        // `usize` is at most 64 bits on every supported target
        [self.scalar_type.tag(), self.rows as u64, self.cols as u64, self.order.tag()]
    }

    pub(crate) fn from_reader<R: io::Read>(mut reader: R) -> Result<Self, ReadHeaderError> {
        let mut fields = [0; FIELD_COUNT];
        reader.read_u64_into::<NativeEndian>(&mut fields)?;
        Ok(Self::from_fields(fields)?)
    }

    pub(crate) fn write<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        for field in self.to_fields() {
            writer.write_u64::<NativeEndian>(field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(fields: [u64; FIELD_COUNT]) -> Vec<u8> {
        fields.iter().flat_map(|f| f.to_ne_bytes()).collect()
    }

    #[test]
    fn header_is_32_bytes() {
        let header = Header {
            scalar_type: ScalarType::F32,
            rows: 7,
            cols: 2,
            order: Order::ColumnMajor,
        };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_LEN);
        assert_eq!(buf, header_bytes([2, 7, 2, 0]));
        assert_eq!(Header::from_reader(&buf[..]).unwrap(), header);
    }

    #[test]
    fn tags_match_file_format() {
        assert_eq!(ScalarType::F64.tag(), 0);
        assert_eq!(ScalarType::I32.tag(), 1);
        assert_eq!(ScalarType::F32.tag(), 2);
        assert_eq!(Order::ColumnMajor.tag(), 0);
        assert_eq!(Order::RowMajor.tag(), 1);
        for tag in 0..3 {
            assert_eq!(ScalarType::from_tag(tag).unwrap().tag(), tag);
        }
        assert_eq!(ScalarType::from_tag(3), None);
        assert_eq!(Order::from_tag(2), None);
    }

    #[test]
    fn unknown_scalar_tag() {
        let buf = header_bytes([9, 1, 1, 0]);
        match Header::from_reader(&buf[..]) {
            Err(ReadHeaderError::Parse(ParseHeaderError::UnknownScalarTag(9))) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_order_tag() {
        let buf = header_bytes([0, 1, 1, 2]);
        let err = match Header::from_reader(&buf[..]) {
            Err(ReadHeaderError::Parse(err)) => err,
            other => panic!("unexpected result: {other:?}"),
        };
        assert_eq!(err, ParseHeaderError::UnknownOrderTag(2));
        assert_eq!(err.to_string(), "major tag out of range: 2");
    }

    #[test]
    fn short_header() {
        let buf = header_bytes([0, 1, 1, 0]);
        match Header::from_reader(&buf[..HEADER_LEN - 1]) {
            Err(ReadHeaderError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn data_len_overflow() {
        let header = Header {
            scalar_type: ScalarType::F64,
            rows: usize::MAX,
            cols: 2,
            order: Order::RowMajor,
        };
        assert_eq!(header.data_len_checked(), None);
        let header = Header {
            rows: 3,
            cols: 4,
            ..header
        };
        assert_eq!(header.data_len_checked(), Some(96));
    }
}
