use bitflags::bitflags;

fn default_options() -> DecoderFlags {
    let mut flags = DecoderFlags::empty();

    flags.set(DecoderFlags::INFLATE_CONFIRM_ADLER, true);
    flags.set(DecoderFlags::CONFIRM_CRC, true);
    flags.set(DecoderFlags::ERROR_ON_NON_CONFORMANCE, false);

    flags
}

fn strict_options() -> DecoderFlags {
    let mut flags = DecoderFlags::empty();

    flags.set(DecoderFlags::INFLATE_CONFIRM_ADLER, true);
    flags.set(DecoderFlags::CONFIRM_CRC, true);
    flags.set(DecoderFlags::ERROR_ON_NON_CONFORMANCE, true);

    flags
}

/// Fast decoder options
///
/// Disables checksum verification and conformance errors,
/// useful for command line tools that would rather show a
/// slightly damaged image than nothing.
fn fast_options() -> DecoderFlags {
    let mut flags = DecoderFlags::empty();

    flags.set(DecoderFlags::INFLATE_CONFIRM_ADLER, false);
    flags.set(DecoderFlags::CONFIRM_CRC, false);
    flags.set(DecoderFlags::ERROR_ON_NON_CONFORMANCE, false);

    flags
}

bitflags! {
    /// Decoder options that are flags
    ///
    /// NOTE: When you extend this, add true or false to
    /// all options above that return a `DecoderFlags`
    pub struct DecoderFlags: u32 {
        /// Whether the inflate decoder should confirm and report adler mismatch
        const INFLATE_CONFIRM_ADLER    = 0b0000_0001;
        /// Whether the decoder should confirm chunk checksums
        const CONFIRM_CRC              = 0b0000_0010;
        /// Whether the decoder should error out on stream non-conformance
        /// it could otherwise shrug off
        const ERROR_ON_NON_CONFORMANCE = 0b0000_0100;
    }
}

/// Decoder options
///
/// Creation is through `default`, `new_safe` or `new_fast`,
/// individual options are changed with the consuming `set_*`
/// builder methods.
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 2<sup>17</sup>
    max_width:  usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 2<sup>17</sup>
    max_height: usize,

    flags: DecoderFlags
}

impl DecoderOptions {
    /// Create the decoder with options setting most configurable
    /// options to be their safe counterparts
    ///
    /// This is the same as `default` as default initializes
    /// options to the safe variant.
    pub fn new_safe() -> DecoderOptions {
        DecoderOptions::default()
    }

    /// Create the decoder rejecting any stream non-conformance the
    /// permissive default would shrug off with a warning
    pub fn new_strict() -> DecoderOptions {
        let flag = strict_options();

        DecoderOptions::default().set_decoder_flags(flag)
    }

    /// Create the decoder with options setting the configurable options
    /// to the fast counterparts
    ///
    /// Checksums will not be verified and some non-conformance
    /// is shrugged off with a warning.
    pub fn new_fast() -> DecoderOptions {
        let flag = fast_options();

        DecoderOptions::default().set_decoder_flags(flag)
    }
}

impl DecoderOptions {
    /// Get maximum width configured for the decoder
    pub const fn get_max_width(&self) -> usize {
        self.max_width
    }

    /// Get maximum height configured for the decoder
    pub const fn get_max_height(&self) -> usize {
        self.max_height
    }

    /// Return true whether the decoder should be in strict mode
    /// and reject most errors
    pub fn get_strict_mode(&self) -> bool {
        self.flags.contains(DecoderFlags::ERROR_ON_NON_CONFORMANCE)
    }

    /// Whether the decoder should confirm chunk crc 32 checksums
    pub const fn get_confirm_crc(&self) -> bool {
        self.flags.contains(DecoderFlags::CONFIRM_CRC)
    }

    /// Whether the inflate decoder should confirm
    /// adler checksums
    pub const fn inflate_get_confirm_adler(&self) -> bool {
        self.flags.contains(DecoderFlags::INFLATE_CONFIRM_ADLER)
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Set whether the decoder should be in strict mode
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.flags.set(DecoderFlags::ERROR_ON_NON_CONFORMANCE, yes);
        self
    }

    /// Set whether the decoder should confirm
    /// chunk crc 32 checksums
    pub fn set_confirm_crc(mut self, yes: bool) -> Self {
        self.flags.set(DecoderFlags::CONFIRM_CRC, yes);
        self
    }

    /// Set whether the inflate decoder should confirm
    /// adler checksums
    pub fn inflate_set_confirm_adler(mut self, yes: bool) -> Self {
        self.flags.set(DecoderFlags::INFLATE_CONFIRM_ADLER, yes);
        self
    }

    fn set_decoder_flags(mut self, flags: DecoderFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width:  1 << 17,
            max_height: 1 << 17,
            flags:      default_options()
        }
    }
}
