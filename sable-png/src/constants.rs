/// The 8 magic bytes `89 50 4E 47 0D 0A 1A 0A` every PNG
/// stream starts with, read as one big endian integer
pub const PNG_SIGNATURE: u64 = 0x8950_4E47_0D0A_1A0A;

/// The gAMA chunk stores gamma multiplied by this scale as
/// a 32 bit integer
pub const GAMMA_SCALE: f64 = 100_000.0;

/// Multipliers taking a sample at depth 1, 2, 4 or 8 to the
/// full 8 bit range, indexed by depth
pub(crate) const DEPTH_SCALE_TABLE: [u8; 9] = [0, 0xff, 0x55, 0, 0x11, 0, 0, 0, 0x01];
