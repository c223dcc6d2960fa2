use super::{header::ScalarType, ReadableElement, WritableElement};
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io;

macro_rules! impl_primitive {
    ($elem:ty, $scalar:expr, $read_into:ident, $write_one:ident) => {
        impl WritableElement for $elem {
            fn scalar_type() -> ScalarType {
                $scalar
            }

            fn write<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
                writer.$write_one::<NativeEndian>(*self)
            }

            fn write_slice<W: io::Write>(slice: &[Self], mut writer: W) -> io::Result<()> {
                for &elem in slice {
                    writer.$write_one::<NativeEndian>(elem)?;
                }
                Ok(())
            }
        }

        impl ReadableElement for $elem {
            fn scalar_type() -> ScalarType {
                $scalar
            }

            fn read_into<R: io::Read>(mut reader: R, out: &mut [Self]) -> io::Result<()> {
                reader.$read_into::<NativeEndian>(out)
            }
        }
    };
}

impl_primitive!(f64, ScalarType::F64, read_f64_into, write_f64);
impl_primitive!(i32, ScalarType::I32, read_i32_into, write_i32);
impl_primitive!(f32, ScalarType::F32, read_f32_into, write_f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_byte_order() {
        let mut buf = Vec::new();
        <f32 as WritableElement>::write_slice(&[1.5, -2.], &mut buf).unwrap();
        let mut expected = 1.5f32.to_ne_bytes().to_vec();
        expected.extend((-2f32).to_ne_bytes());
        assert_eq!(buf, expected);
        let mut back = [0.; 2];
        <f32 as ReadableElement>::read_into(&buf[..], &mut back).unwrap();
        assert_eq!(back, [1.5, -2.]);
    }

    #[test]
    fn short_read() {
        let buf = 7i32.to_ne_bytes();
        let err = <i32 as ReadableElement>::read_into(&buf[..3], &mut [0]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
