//! Extension trait and free functions for wide integer arithmetic.
//!
//! Products of two pool reserves already need 224 bits, and scaling them by a
//! fee denominator and a price component can exceed 256 bits. These helpers
//! do that arithmetic in [`U512`] and only narrow back to [`U256`] once the
//! value is known to fit.

use alloy_primitives::{U256, U512};

/// Extension trait for U256 to add utility methods.
pub trait U256Ext: Sized {
    /// Lossless conversion into a 512-bit integer.
    fn widen(&self) -> U512;

    /// Converts a 512-bit integer back, `None` if it does not fit.
    fn checked_narrow(value: &U512) -> Option<Self>;
}

impl U256Ext for U256 {
    fn widen(&self) -> U512 {
        U512::from_limbs_slice(self.as_limbs())
    }

    fn checked_narrow(value: &U512) -> Option<Self> {
        U256::checked_from_limbs_slice(value.as_limbs())
    }
}

/// Computes `floor(a * b / denominator)` with a full width intermediate
/// product. Returns `None` on overflow or division by zero.
pub fn full_mul_div(a: U512, b: U512, denominator: U512) -> Option<U512> {
    if denominator.is_zero() {
        return None;
    }
    a.checked_mul(b)?.checked_div(denominator)
}

/// Integer square root using the Babylonian method.
///
/// Returns `floor(sqrt(y))`. Iteration stops as soon as the next estimate is
/// not strictly smaller than the current one.
pub fn isqrt(y: U512) -> U512 {
    if y > U512::from(3u64) {
        let mut z = y;
        // `y / 2 + 1` cannot overflow for y > 3.
        let mut x = (y >> 1) + U512::from(1u64);
        while x < z {
            z = x;
            x = (y / x + x) >> 1;
        }
        z
    } else if y.is_zero() {
        U512::ZERO
    } else {
        U512::from(1u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_and_narrow() {
        let value = U256::MAX;
        let wide = value.widen();
        assert_eq!(U256::checked_narrow(&wide), Some(value));
        assert_eq!(
            U256::checked_narrow(&(wide + U512::from(1u64))),
            None,
            "2^256 does not fit"
        );
    }

    #[test]
    fn isqrt_small_values() {
        for (y, root) in [
            (0u64, 0u64),
            (1, 1),
            (2, 1),
            (3, 1),
            (4, 2),
            (8, 2),
            (9, 3),
            (15, 3),
            (16, 4),
            (1_000_000, 1_000),
            (999_999, 999),
        ] {
            assert_eq!(isqrt(U512::from(y)), U512::from(root), "isqrt({y})");
        }
    }

    #[test]
    fn isqrt_is_floor_for_wide_values() {
        // Values around (2^224)^2, the widest square a pair of reserves scaled
        // by a price component produces.
        for shift in [100usize, 224, 255, 300, 448, 510] {
            let y = (U512::from(1u64) << shift) + U512::from(12345u64);
            let root = isqrt(y);
            assert!(root * root <= y);
            let next = root + U512::from(1u64);
            assert!(next * next > y);
        }

        let max = isqrt(U512::MAX);
        assert_eq!(max, (U512::from(1u64) << 256) - U512::from(1u64));
    }

    #[test]
    fn full_mul_div_beyond_256_bits() {
        let a = U256::MAX.widen();
        let b = U512::from(1000u64);
        let result = full_mul_div(a, b, U512::from(1000u64)).unwrap();
        assert_eq!(result, a);

        assert_eq!(full_mul_div(a, b, U512::ZERO), None);
        assert_eq!(full_mul_div(U512::MAX, U512::from(2u64), U512::from(2u64)), None);
    }
}
