//! Waveform lookup tables for the 2.66" panel.

/// Number of bytes the controller consumes from a waveform upload (register 0x32)
pub const LUT_UPLOAD_LEN: usize = 153;

/// Partial refresh waveform shipped with the panel
///
/// The table is 159 bytes long but only the first [`LUT_UPLOAD_LEN`] are
/// uploaded. The six trailing bytes (gate/source voltage and VCOM values in
/// the vendor's longer table layout) are kept as published.
pub const WF_PARTIAL_2IN66: [u8; 159] = [
    0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x80, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x40, 0x40, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22,
    0x00, 0x00, 0x00, 0x22, 0x17, 0x41, 0xB0, 0x32, 0x36,
];

/// A waveform table handed to the driver at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformLut {
    table: Vec<u8>,
}

/// Errors building a waveform table
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("waveform table has {0} bytes, at least {LUT_UPLOAD_LEN} required")]
pub struct LutTooShort(pub usize);

impl WaveformLut {
    /// Wrap a table; it must hold at least [`LUT_UPLOAD_LEN`] bytes
    pub fn new(table: impl Into<Vec<u8>>) -> Result<Self, LutTooShort> {
        let table = table.into();
        if table.len() < LUT_UPLOAD_LEN {
            return Err(LutTooShort(table.len()));
        }
        if table.len() > LUT_UPLOAD_LEN {
            tracing::debug!(
                "Waveform table has {} bytes, only the first {} are uploaded",
                table.len(),
                LUT_UPLOAD_LEN
            );
        }
        Ok(Self { table })
    }

    /// The stock partial refresh waveform
    pub fn partial_2in66() -> Self {
        Self {
            table: WF_PARTIAL_2IN66.to_vec(),
        }
    }

    /// Bytes sent to the controller
    pub fn upload_bytes(&self) -> &[u8] {
        &self.table[..LUT_UPLOAD_LEN]
    }

    /// Declared table length, including bytes that are never uploaded
    pub fn table_len(&self) -> usize {
        self.table.len()
    }
}

impl Default for WaveformLut {
    fn default() -> Self {
        Self::partial_2in66()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_table_is_longer_than_upload() {
        let lut = WaveformLut::partial_2in66();
        assert_eq!(lut.table_len(), 159);
        assert_eq!(lut.upload_bytes().len(), LUT_UPLOAD_LEN);
        assert_eq!(lut.upload_bytes()[149], 0x22);
        assert_eq!(lut.upload_bytes()[152], 0x00);
        assert_eq!(WF_PARTIAL_2IN66[153], 0x22);
    }

    #[test]
    fn short_table_rejected() {
        assert_eq!(WaveformLut::new(vec![0u8; 152]), Err(LutTooShort(152)));
        assert!(WaveformLut::new(vec![0u8; 153]).is_ok());
    }
}
