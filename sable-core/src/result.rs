/// A simple enum that can hold either
/// u8's or u16's used for decoding pixels
#[derive(Debug, Eq, PartialEq)]
pub enum DecodingResult {
    U8(Vec<u8>),
    U16(Vec<u16>)
}

impl DecodingResult {
    /// Return the contents if the enum stores `Vec<u8>` or otherwise
    /// return `None`.
    ///
    /// Useful for de-sugaring the result of a decoding operation
    /// into raw bytes
    pub fn u8(self) -> Option<Vec<u8>> {
        match self {
            DecodingResult::U8(data) => Some(data),
            DecodingResult::U16(_) => None
        }
    }

    /// Return the contents if the enum stores `Vec<u16>` or otherwise
    /// return `None`.
    pub fn u16(self) -> Option<Vec<u16>> {
        match self {
            DecodingResult::U16(data) => Some(data),
            DecodingResult::U8(_) => None
        }
    }
}
