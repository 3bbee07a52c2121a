/// Initial register value of the OPC-N3 CRC-16.
const CRC16_INIT: u16 = 0xFFFF;

/// Reflected polynomial of the OPC-N3 CRC-16.
const CRC16_POLYNOMIAL: u16 = 0xA001;

/// Calculates the 16-bit CRC the OPC-N3 appends to every measurement frame.
pub struct Crc16 {
    current: u16,
}

impl Crc16 {
    /// Creates a new `Crc16` instance, initialized to 0xFFFF.
    #[inline]
    pub fn new() -> Crc16 {
        Crc16 {
            current: CRC16_INIT,
        }
    }

    /// Includes a slice of bytes in the checksum calculation.
    ///
    /// # Arguments
    ///
    /// * `data` - The byte slice to shift into the current register.
    #[inline]
    pub fn push_slice(&mut self, data: &[u8]) {
        for &d in data {
            self.current ^= d as u16;
            for _ in 0..8 {
                if self.current & 1 == 1 {
                    self.current = (self.current >> 1) ^ CRC16_POLYNOMIAL;
                } else {
                    self.current >>= 1;
                }
            }
        }
    }

    /// Returns the calculated checksum value.
    #[inline]
    pub fn checksum(&self) -> u16 {
        self.current
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Crc16::new()
    }
}

/// Computes the CRC-16 of `data` in one go.
pub fn checksum(data: &[u8]) -> u16 {
    let mut crc = Crc16::new();
    crc.push_slice(data);
    crc.checksum()
}

/// Returns `true` when `claimed` is the CRC-16 of `data`.
pub fn verify(claimed: u16, data: &[u8]) -> bool {
    checksum(data) == claimed
}
