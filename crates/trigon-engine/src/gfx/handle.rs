use std::num::NonZeroU32;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            #[inline]
            pub fn raw(self) -> NonZeroU32 {
                self.0
            }
        }

        impl From<NonZeroU32> for $name {
            #[inline]
            fn from(raw: NonZeroU32) -> Self {
                Self(raw)
            }
        }
    };
}

define_handle!(
    /// Compiled (or failed) shader stage.
    StageHandle
);
define_handle!(
    /// Linked shader program.
    ProgramHandle
);
define_handle!(
    /// Vertex or index buffer.
    BufferHandle
);
define_handle!(
    /// 2D texture with its sampler.
    TextureHandle
);

/// Hands out non-zero handle values; zero stays reserved as "no object".
#[derive(Debug, Default)]
pub struct HandleAllocator {
    last: u32,
}

impl HandleAllocator {
    /// Returns the next handle, or `None` once the 32-bit space is exhausted.
    pub fn next<H: From<NonZeroU32>>(&mut self) -> Option<H> {
        self.last = self.last.checked_add(1)?;
        NonZeroU32::new(self.last).map(H::from)
    }
}
