//! Element capabilities required by containers and storage.
//!
//! Storage only needs an element to be default-constructible (the zero
//! value), clonable, and comparable against zero. Two optional capabilities
//! sit on top:
//!
//! ```text
//! Element            - zero, is_zero, allocate
//! ├── Components     - per-component access (complex: re, im)
//! └── Persist        - fixed-width little-endian records (file backend)
//! ```

use std::fmt::Debug;

pub use faer::c64;

/// Trait for element types stored in containers.
pub trait Element: Clone + Debug + PartialEq + Default + Send + Sync + 'static {
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Check whether this value equals zero.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Create a fresh zero instance of the same kind as `self`.
    ///
    /// Used when filling storage from an example element: every slot gets
    /// its own instance rather than a clone of a shared one.
    fn allocate(&self) -> Self {
        Self::zero()
    }
}

/// Elements made of one or more scalar components.
///
/// Real numbers have a single component; complex numbers have two.
/// Reading a component at or beyond `COUNT` yields zero and writing one is
/// ignored; containers reject such slots before they get here.
pub trait Components: Element {
    /// The component type.
    type Component: Element;

    /// Number of components per element.
    const COUNT: usize;

    /// Read component `i`.
    fn component(&self, i: usize) -> Self::Component;

    /// Write component `i`.
    fn set_component(&mut self, i: usize, value: Self::Component);
}

/// Elements with a fixed-width byte encoding.
pub trait Persist: Element {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Encode into `out[..WIDTH]`.
    fn encode(&self, out: &mut [u8]);

    /// Decode from `bytes[..WIDTH]`.
    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_real_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {}

            impl Components for $t {
                type Component = $t;
                const COUNT: usize = 1;

                #[inline]
                fn component(&self, i: usize) -> $t {
                    if i == 0 { *self } else { <$t>::default() }
                }

                #[inline]
                fn set_component(&mut self, i: usize, value: $t) {
                    if i == 0 {
                        *self = value;
                    }
                }
            }

            impl Persist for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();

                #[inline]
                fn encode(&self, out: &mut [u8]) {
                    out[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn decode(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$t>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_real_element!(
    i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64
);

// 1-bit unsigned
impl Element for bool {}

impl Components for bool {
    type Component = bool;
    const COUNT: usize = 1;

    fn component(&self, i: usize) -> bool {
        i == 0 && *self
    }

    fn set_component(&mut self, i: usize, value: bool) {
        if i == 0 {
            *self = value;
        }
    }
}

impl Persist for bool {
    const WIDTH: usize = 1;

    fn encode(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl Element for c64 {}

impl Components for c64 {
    type Component = f64;
    const COUNT: usize = 2;

    fn component(&self, i: usize) -> f64 {
        match i {
            0 => self.re,
            1 => self.im,
            _ => 0.0,
        }
    }

    fn set_component(&mut self, i: usize, value: f64) {
        match i {
            0 => self.re = value,
            1 => self.im = value,
            _ => {}
        }
    }
}

impl Persist for c64 {
    const WIDTH: usize = 16;

    fn encode(&self, out: &mut [u8]) {
        self.re.encode(&mut out[..8]);
        self.im.encode(&mut out[8..16]);
    }

    fn decode(bytes: &[u8]) -> Self {
        c64::new(f64::decode(&bytes[..8]), f64::decode(&bytes[8..16]))
    }
}
