static ERROR_MSG: &str = "No more bytes";

/// An encapsulation of a byte stream.
///
/// The lifetime parameter comes from the buffer we are
/// reading from, the reader itself owns nothing.
pub struct ByteReader<'a> {
    /// Data stream
    stream:   &'a [u8],
    position: usize
}

impl<'a> ByteReader<'a> {
    pub const fn new(buf: &'a [u8]) -> ByteReader<'a> {
        ByteReader {
            stream:   buf,
            position: 0
        }
    }

    /// Skip `num` bytes ahead of the stream.
    pub fn skip(&mut self, num: usize) {
        self.position = self.position.wrapping_add(num);
    }

    /// Undo a read of `num` bytes, moving the cursor back.
    pub fn rewind(&mut self, num: usize) {
        self.position = self.position.saturating_sub(num);
    }

    /// Return true if the stream has at least `num` bytes
    /// left to read
    pub fn has(&self, num: usize) -> bool {
        self.position.saturating_add(num) <= self.stream.len()
    }

    pub const fn get_position(&self) -> usize {
        self.position
    }

    /// Return the number of unread bytes in the stream
    pub const fn remaining(&self) -> usize {
        self.stream.len().saturating_sub(self.position)
    }

    /// Look at `num_bytes` bytes starting at `position` bytes
    /// past the cursor without advancing it
    pub fn peek_at(&self, position: usize, num_bytes: usize) -> Result<&'a [u8], &'static str> {
        let start = self.position.wrapping_add(position);
        let end = start.wrapping_add(num_bytes);

        self.stream.get(start..end).ok_or(ERROR_MSG)
    }

    /// Read `num_bytes` bytes, advancing the cursor past them
    pub fn get(&mut self, num_bytes: usize) -> Result<&'a [u8], &'static str> {
        let end = self.position.wrapping_add(num_bytes);

        match self.stream.get(self.position..end) {
            Some(bytes) => {
                self.position = end;
                Ok(bytes)
            }
            None => Err(ERROR_MSG)
        }
    }

    /// Read a single byte, returning zero on an exhausted stream
    pub fn get_u8(&mut self) -> u8 {
        match self.stream.get(self.position) {
            Some(byte) => {
                self.position += 1;
                *byte
            }
            None => 0
        }
    }

    pub fn get_u8_err(&mut self) -> Result<u8, &'static str> {
        match self.stream.get(self.position) {
            Some(byte) => {
                self.position += 1;
                Ok(*byte)
            }
            None => Err(ERROR_MSG)
        }
    }
}

macro_rules! get_single_type {
    ($name:tt,$name_err:tt,$int_type:tt) => {
        impl<'a> ByteReader<'a> {
            /// Read a big endian integer, returning zero on an
            /// exhausted stream
            #[inline(always)]
            pub fn $name(&mut self) -> $int_type {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let mut space = [0; SIZE_OF_VAL];

                match self
                    .stream
                    .get(self.position..self.position + SIZE_OF_VAL)
                {
                    Some(position) => {
                        space.copy_from_slice(position);
                        self.position += SIZE_OF_VAL;

                        $int_type::from_be_bytes(space)
                    }
                    None => 0
                }
            }

            /// Read a big endian integer, erroring on an
            /// exhausted stream
            #[inline(always)]
            pub fn $name_err(&mut self) -> Result<$int_type, &'static str> {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let mut space = [0; SIZE_OF_VAL];

                match self
                    .stream
                    .get(self.position..self.position + SIZE_OF_VAL)
                {
                    Some(position) => {
                        space.copy_from_slice(position);
                        self.position += SIZE_OF_VAL;

                        Ok($int_type::from_be_bytes(space))
                    }
                    None => Err(ERROR_MSG)
                }
            }
        }
    };
}

get_single_type!(get_u16_be, get_u16_be_err, u16);
get_single_type!(get_u32_be, get_u32_be_err, u32);
get_single_type!(get_u64_be, get_u64_be_err, u64);
