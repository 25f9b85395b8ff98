#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn file_header(offset: u32, total: u32) -> Vec<u8> {
    let mut out = b"BM".to_vec();
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&offset.to_le_bytes());
    out
}

/// 40-byte info header, or a larger one zero-extended to `size`.
fn info_header(size: u32, width: i32, height: i32, bpp: u16, compression: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&bpp.to_le_bytes());
    out.extend_from_slice(&compression.to_le_bytes());
    out.resize(size as usize, 0);
    out
}

fn bmp(info: Vec<u8>, extra: &[u8], pixels: &[u8]) -> Vec<u8> {
    let offset = 14 + info.len() + extra.len();
    let mut out = file_header(offset as u32, (offset + pixels.len()) as u32);
    out.extend_from_slice(&info);
    out.extend_from_slice(extra);
    out.extend_from_slice(pixels);
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // 1x1 24-bit
    let seed = bmp(info_header(40, 1, 1, 24, 0), &[], &[0xff, 0, 0, 0]);
    fs::write(format!("{dir}/rgb24_1x1.bmp"), seed).unwrap();

    // 2x2 8-bit RLE with a two-entry palette
    let palette = [0, 0, 0, 0, 0xff, 0xff, 0xff, 0];
    let mut info = info_header(40, 2, 2, 8, 1);
    info[32..36].copy_from_slice(&2u32.to_le_bytes()); // colors used
    let seed = bmp(info, &palette, &[2, 1, 0, 0, 0, 2, 1, 1, 1, 0, 0, 1]);
    fs::write(format!("{dir}/rle8_2x2.bmp"), seed).unwrap();

    // 16-bit RGB565 bitfields
    let masks: Vec<u8> = [0xf800u32, 0x07e0, 0x001f].iter().flat_map(|m| m.to_le_bytes()).collect();
    let seed = bmp(info_header(40, 2, 1, 16, 3), &masks, &[0x00, 0xf8, 0x1f, 0x00]);
    fs::write(format!("{dir}/rgb565_2x1.bmp"), seed).unwrap();

    // OS/2 2.x 1-bit Huffman, 8x1: 3 white, 5 black
    let seed = bmp(info_header(64, 8, 1, 1, 3), &palette, &[0x83, 0x00]);
    fs::write(format!("{dir}/os2_huffman_8x1.bmp"), seed).unwrap();

    // V5 32-bit
    let seed = bmp(info_header(124, 1, -1, 32, 0), &[], &[1, 2, 3, 4]);
    fs::write(format!("{dir}/v5_topdown_1x1.bmp"), seed).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    fs::write(format!("{dir}/ba_only.bin"), b"BA\x28\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00").unwrap();

    println!("Generated seed corpus in {dir}/");
}
