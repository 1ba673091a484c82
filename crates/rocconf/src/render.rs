//! `page,register,value` rows for the configuration loader.

use std::{fmt, io};

use crate::register_file::RegisterFile;

/// How register values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    /// `0x4f`
    #[default]
    Hex,
    /// `79`
    Decimal,
    /// `0b01001111`
    Binary,
}

impl ValueFormat {
    fn write_value(self, f: &mut fmt::Formatter<'_>, value: u8) -> fmt::Result {
        match self {
            ValueFormat::Hex => write!(f, "0x{value:02x}"),
            ValueFormat::Decimal => write!(f, "{value}"),
            ValueFormat::Binary => write!(f, "0b{value:08b}"),
        }
    }
}

/// Display adapter printing one row per written register, no header.
pub struct Render<'a> {
    registers: &'a RegisterFile,
    format: ValueFormat,
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (page, register, value) in self.registers.iter() {
            write!(f, "{page},{register},")?;
            self.format.write_value(f, value)?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl RegisterFile {
    pub fn render(&self, format: ValueFormat) -> Render<'_> {
        Render {
            registers: self,
            format,
        }
    }
}

/// Writes every row of `registers` to `writer`.
pub fn write_csv<W: io::Write>(
    registers: &RegisterFile,
    format: ValueFormat,
    mut writer: W,
) -> io::Result<()> {
    write!(writer, "{}", registers.render(format))?;
    writer.flush()
}
