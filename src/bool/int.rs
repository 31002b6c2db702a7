//! Integer circuits for cardinalities and bounded arithmetic.
//!
//! An [`Int`] is a vector of circuit values interpreted under one of two
//! encodings. Two's complement stores bits LSB first and supports the full
//! operation set within the factory's bit width. The unary encoding stores
//! a sorted vector where bit `i` means "the value exceeds i"; it is compact
//! for the small cardinalities that dominate counting constraints, but it
//! cannot represent negatives and has no subtraction.

use super::{BoolValue, BooleanFactory, FALSE, TRUE};

/// Encoding of integer circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntEncoding {
    /// Little-endian two's complement over the configured bit width.
    TwosComplement,
    /// Sorted unary: bit `i` is true iff the value is at least `i + 1`.
    Unary,
}

/// A symbolic integer: a bit vector under an [`IntEncoding`].
#[derive(Debug, Clone)]
pub struct Int {
    bits: Vec<BoolValue>,
    encoding: IntEncoding,
}

impl Int {
    /// The constant `value` in the factory's configured encoding.
    ///
    /// # Panics
    /// Panics if a negative constant is requested in the unary encoding.
    pub fn constant(factory: &BooleanFactory, value: i32) -> Int {
        match factory.int_encoding() {
            IntEncoding::TwosComplement => {
                let width = factory.bitwidth().max(2);
                let mut bits = Vec::with_capacity(width);
                for i in 0..width {
                    let set = if i < 31 {
                        value & (1 << i) != 0
                    } else {
                        value < 0
                    };
                    bits.push(if set { TRUE } else { FALSE });
                }
                Int {
                    bits,
                    encoding: IntEncoding::TwosComplement,
                }
            }
            IntEncoding::Unary => {
                assert!(value >= 0, "unary encoding cannot represent {value}");
                Int {
                    bits: vec![TRUE; value as usize],
                    encoding: IntEncoding::Unary,
                }
            }
        }
    }

    /// An integer that is 1 when `bit` is true and 0 otherwise.
    pub fn from_bit(factory: &BooleanFactory, bit: BoolValue) -> Int {
        match factory.int_encoding() {
            IntEncoding::TwosComplement => Int {
                bits: vec![bit, FALSE],
                encoding: IntEncoding::TwosComplement,
            },
            IntEncoding::Unary => Int {
                bits: vec![bit],
                encoding: IntEncoding::Unary,
            },
        }
    }

    /// The encoding of this integer.
    pub fn encoding(&self) -> IntEncoding {
        self.encoding
    }

    /// Number of stored bits.
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// The bit at position `i`. Two's complement sign-extends past the
    /// stored width; unary pads with FALSE.
    pub fn bit(&self, i: usize) -> BoolValue {
        if i < self.bits.len() {
            self.bits[i]
        } else {
            match self.encoding {
                IntEncoding::TwosComplement => self.bits.last().copied().unwrap_or(FALSE),
                IntEncoding::Unary => FALSE,
            }
        }
    }

    /// In the unary encoding, the circuit for "value >= k".
    fn at_least(&self, k: usize) -> BoolValue {
        debug_assert_eq!(self.encoding, IntEncoding::Unary);
        if k == 0 {
            TRUE
        } else {
            self.bit(k - 1)
        }
    }

    /// True if every bit is a constant.
    pub fn is_constant(&self) -> bool {
        self.bits.iter().all(|b| b.is_constant())
    }

    /// The concrete value, if every bit is a constant.
    pub fn constant_value(&self) -> Option<i32> {
        if !self.is_constant() {
            return None;
        }
        match self.encoding {
            IntEncoding::TwosComplement => {
                let mut value = 0i32;
                let sign = self.bits.len() - 1;
                for (i, bit) in self.bits.iter().enumerate() {
                    if bit.is_true() {
                        if i == sign {
                            value |= -1i32 << sign.min(31);
                        } else if i < 31 {
                            value |= 1 << i;
                        }
                    }
                }
                Some(value)
            }
            IntEncoding::Unary => {
                Some(self.bits.iter().take_while(|b| b.is_true()).count() as i32)
            }
        }
    }

    fn assert_same_encoding(&self, other: &Int) {
        assert_eq!(
            self.encoding, other.encoding,
            "cannot mix integer encodings"
        );
    }

    /// Addition `self + other`.
    pub fn plus(&self, other: &Int, factory: &BooleanFactory) -> Int {
        self.assert_same_encoding(other);
        match self.encoding {
            IntEncoding::TwosComplement => {
                let width = (self.width().max(other.width()) + 1).min(factory.bitwidth().max(2));
                let mut bits = Vec::with_capacity(width);
                let mut carry = FALSE;
                for i in 0..width {
                    let a = self.bit(i);
                    let b = other.bit(i);
                    bits.push(factory.sum(a, b, carry));
                    carry = factory.carry(a, b, carry);
                }
                Int {
                    bits,
                    encoding: IntEncoding::TwosComplement,
                }
            }
            IntEncoding::Unary => {
                let width = self.width() + other.width();
                let mut bits = Vec::with_capacity(width);
                for k in 1..=width {
                    // value >= k iff self >= i and other >= k - i for some split
                    let mut any = FALSE;
                    for i in 0..=k.min(self.width()) {
                        let j = k - i;
                        if j > other.width() {
                            continue;
                        }
                        let split = factory.and(self.at_least(i), other.at_least(j));
                        any = factory.or(any, split);
                    }
                    bits.push(any);
                }
                Int {
                    bits,
                    encoding: IntEncoding::Unary,
                }
            }
        }
    }

    /// Subtraction `self - other`.
    ///
    /// # Panics
    /// Panics in the unary encoding, which has no negative values.
    pub fn minus(&self, other: &Int, factory: &BooleanFactory) -> Int {
        self.assert_same_encoding(other);
        assert_eq!(
            self.encoding,
            IntEncoding::TwosComplement,
            "subtraction requires the two's-complement encoding"
        );
        let width = (self.width().max(other.width()) + 1).min(factory.bitwidth().max(2));
        let mut bits = Vec::with_capacity(width);
        // a - b = a + !b + 1
        let mut carry = TRUE;
        for i in 0..width {
            let a = self.bit(i);
            let b = other.bit(i).negate();
            bits.push(factory.sum(a, b, carry));
            carry = factory.carry(a, b, carry);
        }
        Int {
            bits,
            encoding: IntEncoding::TwosComplement,
        }
    }

    /// The equality circuit `self = other`.
    pub fn eq(&self, other: &Int, factory: &BooleanFactory) -> BoolValue {
        self.assert_same_encoding(other);
        let width = self.width().max(other.width());
        let mut all = TRUE;
        for i in 0..width {
            let same = factory.iff(self.bit(i), other.bit(i));
            all = factory.and(all, same);
            if all.is_false() {
                break;
            }
        }
        all
    }

    /// The comparison circuit `self <= other`.
    pub fn lte(&self, other: &Int, factory: &BooleanFactory) -> BoolValue {
        self.assert_same_encoding(other);
        match self.encoding {
            IntEncoding::TwosComplement => {
                let width = self.width().max(other.width()).max(1);
                let last = width - 1;
                // a negative other forces a negative self
                let mut all = factory.implies(other.bit(last), self.bit(last));
                let mut prev_equal = factory.iff(self.bit(last), other.bit(last));
                for i in (0..last).rev() {
                    let a = self.bit(i);
                    let b = other.bit(i);
                    let le_here = factory.implies(a, b);
                    let guarded = factory.implies(prev_equal, le_here);
                    all = factory.and(all, guarded);
                    let same = factory.iff(a, b);
                    prev_equal = factory.and(prev_equal, same);
                }
                all
            }
            IntEncoding::Unary => {
                // both bit vectors are sorted, so pointwise implication works
                let width = self.width().max(other.width());
                let mut all = TRUE;
                for k in 1..=width {
                    let le_here = factory.implies(self.at_least(k), other.at_least(k));
                    all = factory.and(all, le_here);
                }
                all
            }
        }
    }

    /// The comparison circuit `self < other`.
    pub fn lt(&self, other: &Int, factory: &BooleanFactory) -> BoolValue {
        let lte = self.lte(other, factory);
        let eq = self.eq(other, factory);
        factory.and(lte, eq.negate())
    }

    /// The comparison circuit `self > other`.
    pub fn gt(&self, other: &Int, factory: &BooleanFactory) -> BoolValue {
        self.lte(other, factory).negate()
    }

    /// The comparison circuit `self >= other`.
    pub fn gte(&self, other: &Int, factory: &BooleanFactory) -> BoolValue {
        self.lt(other, factory).negate()
    }

    /// Bit-wise choice `condition ? self : other`.
    pub fn choice(&self, condition: BoolValue, other: &Int, factory: &BooleanFactory) -> Int {
        self.assert_same_encoding(other);
        let width = self.width().max(other.width());
        let bits = (0..width)
            .map(|i| factory.ite(condition, self.bit(i), other.bit(i)))
            .collect();
        Int {
            bits,
            encoding: self.encoding,
        }
    }
}
