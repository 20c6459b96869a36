//! `SaturatingCounter`: Admission-control credits that never wrap.

use std::fmt;

/// Unsigned integer types a [`SaturatingCounter`] can hold.
pub trait Unsigned: Copy + Ord + fmt::Debug + Default {
    /// The largest representable value.
    const MAX: Self;
    /// Zero.
    const ZERO: Self;
    /// One.
    const ONE: Self;

    /// Addition clamped at `MAX`.
    fn saturating_add(self, rhs: Self) -> Self;

    /// Subtraction clamped at zero.
    fn saturating_sub(self, rhs: Self) -> Self;
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl Unsigned for $t {
                const MAX: Self = <$t>::MAX;
                const ZERO: Self = 0;
                const ONE: Self = 1;

                #[inline]
                fn saturating_add(self, rhs: Self) -> Self {
                    <$t>::saturating_add(self, rhs)
                }

                #[inline]
                fn saturating_sub(self, rhs: Self) -> Self {
                    <$t>::saturating_sub(self, rhs)
                }
            }
        )*
    };
}

impl_unsigned!(u8, u16, u32, u64, usize);

/// An unsigned value clamped to `[0, T::MAX]`.
///
/// Used for present/skip credits and deferred clear requests. Adding past the
/// maximum sticks at the maximum; subtracting past zero sticks at zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SaturatingCounter<T: Unsigned> {
    value: T,
}

impl<T: Unsigned> SaturatingCounter<T> {
    /// A counter holding zero.
    pub const fn zero() -> Self {
        Self { value: T::ZERO }
    }

    /// A counter holding `value`.
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Current value.
    #[inline]
    pub const fn value(&self) -> T {
        self.value
    }

    /// Overwrite the value.
    #[inline]
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Add `amount`, stopping at `T::MAX`.
    #[inline]
    pub fn add(&mut self, amount: T) -> &mut Self {
        self.value = self.value.saturating_add(amount);
        self
    }

    /// Subtract `amount`, stopping at zero.
    #[inline]
    pub fn subtract(&mut self, amount: T) -> &mut Self {
        self.value = self.value.saturating_sub(amount);
        self
    }

    /// Add one, stopping at `T::MAX`.
    #[inline]
    pub fn increment(&mut self) -> &mut Self {
        self.add(T::ONE)
    }

    /// Subtract one, stopping at zero.
    #[inline]
    pub fn decrement(&mut self) -> &mut Self {
        self.subtract(T::ONE)
    }

    /// Check if any credit is held.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.value > T::ZERO
    }

    /// Spend one credit if any is held.
    ///
    /// Returns `true` if a credit was consumed.
    #[inline]
    pub fn try_consume(&mut self) -> bool {
        if self.is_positive() {
            self.decrement();
            true
        } else {
            false
        }
    }
}

impl<T: Unsigned> fmt::Debug for SaturatingCounter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SaturatingCounter({:?})", self.value)
    }
}

impl<T: Unsigned> From<T> for SaturatingCounter<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
