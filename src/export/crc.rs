//! CRC-16 used by the FIT file header and footer.

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Accumulate a slice of bytes into a running CRC value.
pub fn compute_crc(init: u16, data: &[u8]) -> u16 {
    data.iter().fold(init, |crc, byte| crc_byte(crc, *byte))
}

/// Calculate the CRC of a complete byte slice.
pub fn calculate_crc(data: &[u8]) -> u16 {
    compute_crc(0, data)
}

fn crc_byte(mut crc: u16, byte: u8) -> u16 {
    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    crc = (crc >> 4) & 0x0FFF;
    crc = crc ^ tmp ^ CRC_TABLE[(byte & 0xF) as usize];

    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    crc = (crc >> 4) & 0x0FFF;
    crc ^ tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize]
}
