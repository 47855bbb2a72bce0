//! Simple building-block data that can be read in one go.
//! Fixed-size primitives are read big-endian from a byte source, while variable-length
//! quantities are decoded from a track buffer through a cursor.

use crate::prelude::*;

/// The longest variable-length quantity accepted, in bytes (28 bits of payload).
pub const MAX_VARLEN_BYTES: usize = 4;

/// Read exactly `N` bytes, reporting a short read as truncation of `what`.
pub(crate) fn read_array<R: Read, const N: usize>(
    src: &mut R,
    what: &'static str,
) -> Result<[u8; N]> {
    let mut bytes = [0; N];
    src.read_exact(&mut bytes).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => err_truncated!(what),
        _ => Error::Io(err),
    })?;
    Ok(bytes)
}

/// Implemented on integer types for reading as big-endian.
pub(crate) trait IntRead: Sized {
    /// Reads a big-endian integer, advancing the source.
    fn read<R: Read>(src: &mut R) -> Result<Self>;
}

/// Implement simple big endian integer reads.
macro_rules! impl_read_int {
    {$( $int:ty ),*} => {
        $(
            impl IntRead for $int {
                #[inline]
                fn read<R: Read>(src: &mut R) -> Result<$int> {
                    let bytes = read_array(src, "failed to read the expected integer")?;
                    Ok(<$int>::from_be_bytes(bytes))
                }
            }
        )*
    }
}
impl_read_int! {u8,u16,u32}

/// Decode one variable-length quantity from `raw`, starting at `*pos`.
///
/// Each byte carries 7 bits of payload, most significant group first, with the top bit set on
/// every byte except the last. On success `*pos` is left on the first byte after the quantity.
///
/// At most [`MAX_VARLEN_BYTES`] bytes are consumed: a quantity still continuing after that is
/// rejected as `InvalidFormat`, and running off the end of `raw` is `Truncated`.
pub fn read_varlen(raw: &[u8], pos: &mut usize) -> Result<u32> {
    let mut int: u32 = 0;
    for _ in 0..MAX_VARLEN_BYTES {
        let byte = *raw
            .get(*pos)
            .ok_or(err_truncated!("unexpected eof while reading varlen int"))?;
        *pos += 1;
        int = (int << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok(int);
        }
    }
    Err(err_invalid!("varlen integer larger than 4 bytes"))
}

/// Encode `int` as a minimal variable-length quantity.
///
/// Fails with `InvalidInput` if `int` does not fit in 28 bits.
pub fn write_varlen<W: io::Write>(int: u32, out: &mut W) -> io::Result<()> {
    if int >> (7 * MAX_VARLEN_BYTES) != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "varlen integer exceeds 28 bits",
        ));
    }
    let mut skipping = true;
    for i in (0..MAX_VARLEN_BYTES).rev() {
        let byte = ((int >> (i * 7)) & 0x7F) as u8;
        if skipping && byte == 0 && i != 0 {
            //Skip these leading zeros
        } else {
            skipping = false;
            let byte = if i == 0 { byte } else { byte | 0x80 };
            out.write_all(&[byte])?;
        }
    }
    Ok(())
}
