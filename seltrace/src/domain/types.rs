//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep instruction pointers, data addresses and raw
//! control-call arguments apart in function signatures.

use std::fmt;

/// Address in the target program's (unsigned, 64-bit) address space
///
/// Rendered as lowercase hex with a `0x` prefix, the pointer format used
/// by data records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub u64);

impl Address {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Address {
    fn from(addr: u64) -> Self {
        Address(addr)
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Closed interval `[start, end]` of addresses
///
/// Both bounds are inclusive: `[10, 20]` contains 10 and 20. Construction
/// normalises inverted bounds, so `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    start: Address,
    end: Address,
}

impl AddressRange {
    /// Create a range from two bounds, swapping them if given in reverse
    #[must_use]
    pub fn new(start: impl Into<Address>, end: impl Into<Address>) -> Self {
        let (start, end) = (start.into(), end.into());
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Degenerate range `[addr, addr]`, used for point queries
    #[must_use]
    pub fn point(addr: impl Into<Address>) -> Self {
        let addr = addr.into();
        Self { start: addr, end: addr }
    }

    #[must_use]
    pub fn start(&self) -> Address {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Address {
        self.end
    }

    /// Check if an address falls within this range (bounds inclusive)
    #[must_use]
    pub fn contains(&self, addr: Address) -> bool {
        addr >= self.start && addr <= self.end
    }

    /// Whether the two ranges share at least one address
    ///
    /// This is the equivalence used by the range registry: two ranges that
    /// overlap are the same element as far as storage is concerned.
    #[must_use]
    pub fn overlaps(&self, other: &AddressRange) -> bool {
        !(self.end < other.start || other.end < self.start)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        assert_eq!(Address(0x41a).to_string(), "0x41a");
        assert_eq!(Address(0).to_string(), "0x0");
        assert_eq!(format!("{:x}", Address(255)), "ff");
    }

    #[test]
    fn test_range_normalises_inverted_bounds() {
        let range = AddressRange::new(20u64, 10u64);
        assert_eq!(range.start(), Address(10));
        assert_eq!(range.end(), Address(20));
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = AddressRange::new(0x1000u64, 0x1fffu64);

        assert!(range.contains(Address(0x1000)));
        assert!(range.contains(Address(0x1500)));
        assert!(range.contains(Address(0x1fff)));
        assert!(!range.contains(Address(0x0fff)));
        assert!(!range.contains(Address(0x2000)));
    }

    #[test]
    fn test_overlaps() {
        let a = AddressRange::new(10u64, 20u64);
        assert!(a.overlaps(&AddressRange::new(15u64, 25u64)));
        assert!(a.overlaps(&AddressRange::new(20u64, 30u64)));
        assert!(a.overlaps(&AddressRange::point(10u64)));
        assert!(!a.overlaps(&AddressRange::new(21u64, 30u64)));
        assert!(!a.overlaps(&AddressRange::new(0u64, 9u64)));
    }
}
