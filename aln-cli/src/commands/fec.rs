use aln_core::{
    constants::{ControlFlags, HeaderField, FLAG_MASK},
    fec::{ControlWordCodec, DecodeStatus, HammingCodec},
    layout::header_length,
};
use anyhow::{bail, Context, Result};
use colored::*;

/// Parse a word given as `0x`-prefixed hex or as decimal
pub fn parse_word(value: &str) -> Result<u16> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex_digits) => u16::from_str_radix(hex_digits, 16),
        None => value.parse::<u16>(),
    };
    parsed.with_context(|| format!("Invalid control word: {}", value))
}

/// Names of the flags set in `flags`, in header order
pub fn flag_names(flags: ControlFlags) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = HeaderField::ALL
        .iter()
        .filter(|field| flags.has_field(**field))
        .map(|field| field.name())
        .collect();
    if flags.has_crc() {
        names.push("CRC");
    }
    names
}

pub fn execute(word: &str, encode: bool) -> Result<()> {
    let value = parse_word(word)?;
    let codec = HammingCodec;

    if encode {
        if value & !FLAG_MASK != 0 {
            bail!("Flags {:#06x} use bits outside {:#06x}", value, FLAG_MASK);
        }
        let flags = ControlFlags::new(value);
        println!("Flags:        {:#06x} [{}]", value, flag_names(flags).join(" | "));
        println!("Control word: {:#06x}", codec.encode(flags));
        println!("Header size:  {} bytes", header_length(flags));
        return Ok(());
    }

    let decoded = codec.decode(value);
    let status = match decoded.status {
        DecodeStatus::Clean => "clean".green(),
        DecodeStatus::Corrected => "corrected".yellow(),
        DecodeStatus::Uncorrectable => "uncorrectable".red(),
    };

    println!("Control word: {:#06x}", value);
    println!("Status:       {}", status);
    println!(
        "Flags:        {:#06x} [{}]",
        decoded.flags.bits(),
        flag_names(decoded.flags).join(" | ")
    );
    println!("Header size:  {} bytes", header_length(decoded.flags));

    Ok(())
}
