//! Deterministic hashes for type tags and callable signatures.
//!
//! A [`TypeHash`] is computed from names and parameter shapes, never from
//! registration order, so the same member shape always hashes the same way.
//! Overload resolution can use the hash as a cheap key next to the readable
//! signature string.
//!
//! # Examples
//!
//! ```
//! use hostcall_core::TypeHash;
//!
//! let int = TypeHash::from_name("int");
//! let float = TypeHash::from_name("float");
//!
//! let a = TypeHash::from_function("print", &[int]);
//! let b = TypeHash::from_function("print", &[float]);
//! assert_ne!(a, b);
//! ```

use std::fmt;

use xxhash_rust::xxh64::xxh64;

/// Domain constants keeping type, function and method hashes apart.
mod domain {
    pub const SEP: u64 = 0x4bc94d6bd06053ad;
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Per-position markers so parameter order changes the hash.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit hash of a type name or callable signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(domain::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a free or static function: name plus parameter types.
    #[inline]
    pub fn from_function(name: &str, params: &[TypeHash]) -> Self {
        let seed = domain::FUNCTION ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(seed, params))
    }

    /// Hash of an instance method: owner type, name and parameter types.
    ///
    /// Differs from [`from_function`](Self::from_function) for the same name
    /// and parameters.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        let seed = domain::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(seed, params))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix_params(mut hash: u64, params: &[TypeHash]) -> u64 {
    for (i, param) in params.iter().enumerate() {
        let marker = domain::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| domain::PARAM_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps the fold order-sensitive, unlike a plain XOR
        hash = hash
            .wrapping_mul(domain::SEP)
            .wrapping_add(marker ^ param.0);
    }
    hash
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hash_is_deterministic() {
        assert_eq!(TypeHash::from_name("int"), TypeHash::from_name("int"));
        assert_ne!(TypeHash::from_name("int"), TypeHash::from_name("float"));
    }

    #[test]
    fn parameter_order_matters() {
        let int = TypeHash::from_name("int");
        let string = TypeHash::from_name("string");
        assert_ne!(
            TypeHash::from_function("f", &[int, string]),
            TypeHash::from_function("f", &[string, int])
        );
    }

    #[test]
    fn function_and_method_domains_differ() {
        let owner = TypeHash::from_name("Calculator");
        let int = TypeHash::from_name("int");
        assert_ne!(
            TypeHash::from_function("add", &[int, int]),
            TypeHash::from_method(owner, "add", &[int, int])
        );
    }

    #[test]
    fn long_parameter_lists_stay_distinct() {
        let int = TypeHash::from_name("int");
        let float = TypeHash::from_name("float");
        let mut a = vec![int; 10];
        let b = a.clone();
        a[9] = float;
        assert_ne!(
            TypeHash::from_function("many", &a),
            TypeHash::from_function("many", &b)
        );
    }

    #[test]
    fn display_and_empty() {
        assert!(TypeHash::EMPTY.is_empty());
        assert_eq!(format!("{}", TypeHash(0x1)), "0x0000000000000001");
        assert_eq!(format!("{:?}", TypeHash(0x1)), "TypeHash(0x0000000000000001)");
    }
}
