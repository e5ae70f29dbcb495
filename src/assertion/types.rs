use std::backtrace::Backtrace;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::panic::Location;

use crate::runner::traceback::parse_backtrace;

/// Placeholder rendered for sequence and map values
const SEQUENCE_PLACEHOLDER: &str = "Array";

/// A rendered call argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// String value, rendered quoted
    Str(String),
    /// Composite value, rendered as a fixed placeholder
    Sequence,
    /// Opaque value, rendered as its type name
    Object(String),
    /// Any other scalar, rendered as its literal text
    Scalar(String),
}

impl ArgValue {
    pub fn object_of<T: ?Sized>() -> Self {
        ArgValue::Object(short_type_name::<T>())
    }

    /// Unquoted text, used inside assertion messages
    pub fn plain(&self) -> &str {
        match self {
            ArgValue::Str(s) => s,
            ArgValue::Sequence => SEQUENCE_PLACEHOLDER,
            ArgValue::Object(name) => name,
            ArgValue::Scalar(text) => text,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other.plain()),
        }
    }
}

/// Values that can appear as arguments of a reported call
pub trait Arg {
    fn to_arg(&self) -> ArgValue;
}

/// Make a type render as its bare type name in reports.
///
/// ```
/// struct Account;
/// marktest::arg_object!(Account);
/// ```
#[macro_export]
macro_rules! arg_object {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::assertion::Arg for $ty {
                fn to_arg(&self) -> $crate::assertion::ArgValue {
                    $crate::assertion::ArgValue::object_of::<$ty>()
                }
            }
        )+
    };
}

macro_rules! scalar_arg {
    ($($ty:ty),+) => {
        $(
            impl Arg for $ty {
                fn to_arg(&self) -> ArgValue {
                    ArgValue::Scalar(self.to_string())
                }
            }
        )+
    };
}

scalar_arg!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
);

impl Arg for () {
    fn to_arg(&self) -> ArgValue {
        ArgValue::Scalar("null".to_string())
    }
}

impl Arg for str {
    fn to_arg(&self) -> ArgValue {
        ArgValue::Str(self.to_string())
    }
}

impl Arg for String {
    fn to_arg(&self) -> ArgValue {
        ArgValue::Str(self.clone())
    }
}

impl<T: Arg + ?Sized> Arg for &T {
    fn to_arg(&self) -> ArgValue {
        (**self).to_arg()
    }
}

impl<T: Arg + ?Sized> Arg for Box<T> {
    fn to_arg(&self) -> ArgValue {
        (**self).to_arg()
    }
}

impl<T: Arg> Arg for Option<T> {
    fn to_arg(&self) -> ArgValue {
        match self {
            Some(value) => value.to_arg(),
            None => ArgValue::Scalar("null".to_string()),
        }
    }
}

macro_rules! sequence_arg {
    ($([$($gen:tt)*] $ty:ty),+ $(,)?) => {
        $(
            impl<$($gen)*> Arg for $ty {
                fn to_arg(&self) -> ArgValue {
                    ArgValue::Sequence
                }
            }
        )+
    };
}

sequence_arg!(
    [T] [T],
    [T, const N: usize] [T; N],
    [T] Vec<T>,
    [T] VecDeque<T>,
    [T, S] HashSet<T, S>,
    [T] BTreeSet<T>,
    [K, V, S] HashMap<K, V, S>,
    [K, V] BTreeMap<K, V>,
);

/// Last path segment of a type name, generics kept
fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => full[pos + 2..].to_string(),
        None => full.to_string(),
    }
}

/// A file and line in source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One call in a traceback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub location: SourceLocation,
    pub function: String,
    pub arguments: Vec<ArgValue>,
}

impl StackFrame {
    pub fn new(location: SourceLocation, function: impl Into<String>, arguments: Vec<ArgValue>) -> Self {
        Self {
            location,
            function: function.into(),
            arguments,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .arguments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} | {}({})", self.location, self.function, args)
    }
}

/// Raised by a failing assertion predicate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Test failed: {message}")]
pub struct AssertionFailure {
    pub message: String,
    /// Where the failing predicate was called
    pub site: StackFrame,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>, site: StackFrame) -> Self {
        Self {
            message: message.into(),
            site,
        }
    }
}

/// Raised by `Test::fatal`
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FatalError {
    pub message: String,
    pub location: SourceLocation,
    /// Call stack at the point of failure, innermost first, unfiltered
    pub frames: Vec<StackFrame>,
}

impl FatalError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
            frames: parse_backtrace(&Backtrace::force_capture()),
        }
    }
}
