//! Writing drawn bytes to a sink.

use crate::config::OutputFormat;
use crate::generator::OutputBuffer;
use std::io::{self, Write};

/// Writes `buffer` in `format` and flushes.
///
/// Raw output is the bytes alone; hex output is lowercase digits with a
/// single trailing newline.
pub fn write_output<W: Write + ?Sized>(
    out: &mut W,
    buffer: &OutputBuffer,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Raw => out.write_all(buffer.as_bytes())?,
        OutputFormat::Hex => {
            out.write_all(buffer.to_hex().as_bytes())?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()
}
