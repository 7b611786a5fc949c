//! Runtime value type exchanged between scripts and host code.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A host object that can be referenced from script values.
///
/// Implemented for every `'static` type that is `Send + Sync + Debug`, so
/// registering a type never requires a manual impl. The `Debug` output is
/// the string form used when a failing call is reported.
pub trait HostObject: Any + Send + Sync + fmt::Debug {
    /// Upcast for downcasting back to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync + fmt::Debug> HostObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared reference to a host object.
///
/// Cloning is a reference count bump. Two `HostRef`s are equal only when
/// they point at the same allocation.
#[derive(Clone)]
pub struct HostRef {
    inner: Arc<dyn HostObject>,
    type_name: &'static str,
}

impl HostRef {
    /// Wrap a host value.
    pub fn new<T: HostObject>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an existing `Arc`, keeping its identity.
    pub fn from_arc<T: HostObject>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: short_type_name(std::any::type_name::<T>()),
        }
    }

    /// Concrete type name of the referenced value, without its module path.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the referenced value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).as_any().downcast_ref::<T>()
    }

    /// Check whether the referenced value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).as_any().is::<T>()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &HostRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }

    /// Number of live references to the underlying object.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Address of the referenced allocation, for hashing by identity.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for HostRef {}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    // Keep generic arguments intact: only strip the path before the first '<'.
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// A value crossing the script/host boundary.
///
/// Arguments handed to a call adapter, the receiver, and every produced
/// result are `Dynamic`s. Objects are reference counted, so cloning a
/// `Dynamic` never copies host state.
#[derive(Clone, Default)]
pub enum Dynamic {
    /// Absent value (script `nil`/`null`).
    #[default]
    Null,
    /// No value produced (result of a void call).
    Void,
    /// Boolean value
    Bool(bool),
    /// Integer value (every integer width is stored as i64)
    Int(i64),
    /// Floating point value (f32 and f64 are stored as f64)
    Float(f64),
    /// String value (owned)
    String(String),
    /// Reference to a host object
    Object(HostRef),
}

impl Dynamic {
    /// Wrap a host value as an object reference.
    pub fn object<T: HostObject>(value: T) -> Self {
        Dynamic::Object(HostRef::new(value))
    }

    /// Get a human-readable name for this value's runtime type.
    ///
    /// For objects this is the concrete host type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Void => "void",
            Dynamic::Bool(_) => "bool",
            Dynamic::Int(_) => "int",
            Dynamic::Float(_) => "float",
            Dynamic::String(_) => "string",
            Dynamic::Object(obj) => obj.type_name(),
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    /// Check if this value is void.
    pub fn is_void(&self) -> bool {
        matches!(self, Dynamic::Void)
    }

    /// Borrow the object reference, if this is one.
    pub fn as_object(&self) -> Option<&HostRef> {
        match self {
            Dynamic::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Reference identity: objects compare by pointer, everything else by value.
    pub fn same_ref(&self, other: &Dynamic) -> bool {
        match (self, other) {
            (Dynamic::Object(a), Dynamic::Object(b)) => a.ptr_eq(b),
            (Dynamic::Float(a), Dynamic::Float(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => write!(f, "Null"),
            Dynamic::Void => write!(f, "Void"),
            Dynamic::Bool(v) => write!(f, "Bool({})", v),
            Dynamic::Int(v) => write!(f, "Int({})", v),
            Dynamic::Float(v) => write!(f, "Float({})", v),
            Dynamic::String(s) => write!(f, "String({:?})", s),
            Dynamic::Object(obj) => write!(f, "Object({}: {:?})", obj.type_name(), obj),
        }
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => write!(f, "null"),
            Dynamic::Void => write!(f, "void"),
            Dynamic::Bool(v) => write!(f, "{}", v),
            Dynamic::Int(v) => write!(f, "{}", v),
            Dynamic::Float(v) => write!(f, "{}", v),
            Dynamic::String(s) => f.write_str(s),
            Dynamic::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dynamic::Null, Dynamic::Null) => true,
            (Dynamic::Void, Dynamic::Void) => true,
            (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
            (Dynamic::Int(a), Dynamic::Int(b)) => a == b,
            (Dynamic::Float(a), Dynamic::Float(b)) => a == b,
            (Dynamic::String(a), Dynamic::String(b)) => a == b,
            (Dynamic::Object(a), Dynamic::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
