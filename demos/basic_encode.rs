//! Basic encoding example

use aln_core::encoder::PacketBuilder;
use bytes::Bytes;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ALN Basic Encoding Example\n");

    let mut output = Vec::new();

    for seq in 0..5u16 {
        let data = format!("Telemetry sample {} from node 0x0102", seq);

        let encoded = PacketBuilder::new()
            .src_addr(0x0102)
            .dest_addr(0x0001)
            .seq_num(seq)
            .data(Bytes::from(data))
            .with_crc()
            .encode()?;

        println!("Packet {}: {} bytes on the wire", seq, encoded.len());
        output.extend_from_slice(&encoded);
    }

    std::fs::write("example_output.aln", &output)?;

    println!("\nWrote {} bytes to example_output.aln", output.len());
    println!("Use 'aln scan --input example_output.aln' to read it back");

    Ok(())
}
