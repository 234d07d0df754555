/// Leading tag word separating keys produced by different subsystems.
///
/// Without a domain tag a gradient key and a caller-supplied texture key that
/// happen to share words would alias the same cache slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum KeyDomain {
    Texture = 0x4c54_0001,
    Buffer = 0x4c54_0002,
    Gradient = 0x4c54_0003,
    Shape = 0x4c54_0004,
    Flatten = 0x4c54_0005,
    Unique = 0x4c54_0006,
}

impl KeyDomain {
    #[inline]
    pub const fn tag(self) -> u32 {
        self as u32
    }
}
