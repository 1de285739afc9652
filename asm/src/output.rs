use arch::op::Words;

use crate::context::AssemblerContext;
use crate::error::Error;
use crate::resolve;

// ----------------------------------------------------------------------------
// Intel HEX serialization

/// Data bytes per record.
const RECORD_BYTES: usize = 16;

const EOF_RECORD: &str = ":00000001FF";

/// Builds an Intel HEX image record by record.
#[derive(Debug, Default)]
pub struct HexFile {
    out: String,
}

impl HexFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `data` as records of at most 16 bytes starting at the given
    /// byte address.
    pub fn push_data(&mut self, addr: u16, data: &[u8]) {
        for (i, chunk) in data.chunks(RECORD_BYTES).enumerate() {
            self.push_record(addr + (i * RECORD_BYTES) as u16, chunk);
        }
    }

    /// One `:LLAAAATT<data>CC` record, type 00.
    fn push_record(&mut self, addr: u16, data: &[u8]) {
        let mut sum = data.len() as u8;
        sum = sum.wrapping_add((addr >> 8) as u8).wrapping_add(addr as u8);

        self.out.push_str(&format!(":{:02X}{:04X}00", data.len(), addr));
        for byte in data {
            self.out.push_str(&format!("{byte:02X}"));
            sum = sum.wrapping_add(*byte);
        }
        // Two's complement of the byte sum: every record sums to 0 mod 256.
        self.out.push_str(&format!("{:02X}\n", sum.wrapping_neg()));
    }

    pub fn finish(mut self) -> String {
        self.out.push_str(EOF_RECORD);
        self.out
    }
}

// ----------------------------------------------------------------------------
// Encode pass

/// Resolves and encodes every section and blob in the context into the
/// Intel HEX image. Requires a completed label table.
pub fn emit(ctx: &AssemblerContext) -> Result<String, Error> {
    let mut hex = HexFile::new();

    for section in &ctx.sections {
        let mut bytes = Vec::new();
        for inst in &section.insts {
            let def = arch::inst::get(&inst.mnemonic).ok_or_else(|| Error::UnknownMnemonic {
                pos: inst.pos.clone(),
                mnemonic: inst.mnemonic.clone(),
            })?;
            let fields = resolve::resolve(def, inst, &ctx.labels)?;
            match def.encode(fields) {
                Words::One(word) => bytes.extend_from_slice(&word.to_le_bytes()),
                Words::Two(first, second) => {
                    bytes.extend_from_slice(&first.to_le_bytes());
                    bytes.extend_from_slice(&second.to_le_bytes());
                }
            }
        }
        if !bytes.is_empty() {
            hex.push_data(section.origin * 2, &bytes);
        }
    }

    for blob in &ctx.blobs {
        hex.push_data(blob.address, &blob.data);
    }

    Ok(hex.finish())
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_record() {
        let mut hex = HexFile::new();
        hex.push_data(0, &[0x00, 0x00]);
        assert_eq!(hex.finish(), ":020000000000FE\n:00000001FF");
    }

    #[test]
    fn empty_image_is_only_eof() {
        assert_eq!(HexFile::new().finish(), ":00000001FF");
    }

    #[test]
    fn records_chunk_at_16_bytes() {
        let mut hex = HexFile::new();
        hex.push_data(0x0100, &[0xAA; 20]);
        let image = hex.finish();
        let lines: Vec<&str> = image.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(":10010000"));
        assert!(lines[1].starts_with(":04011000"));
        assert_eq!(lines[2], EOF_RECORD);
    }

    #[test]
    fn record_bytes_sum_to_zero() {
        let mut hex = HexFile::new();
        hex.push_data(0x1234, &[0xDE, 0xAD, 0xBE, 0xEF]);
        for line in hex.finish().lines() {
            let bytes: Vec<u8> = (1..line.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&line[i..i + 2], 16).unwrap())
                .collect();
            let sum = bytes
                .iter()
                .fold(0u8, |acc, byte| acc.wrapping_add(*byte));
            assert_eq!(sum, 0, "record `{line}` does not sum to zero");
        }
    }
}
