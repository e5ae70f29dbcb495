use std::any::Any;
use std::cell::Cell;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::panic::{self, AssertUnwindSafe, Location};
use std::time::{Duration, Instant};

use super::types::{Arg, ArgValue, AssertionFailure, FatalError, SourceLocation, StackFrame};
use crate::capture::panics;

/// Result of a single assertion predicate
pub type AssertResult = Result<(), AssertionFailure>;

/// Result of a test body
pub type TestResult = anyhow::Result<()>;

/// The handle passed to every test body.
///
/// Each predicate returns `Err(AssertionFailure)` when it does not hold;
/// propagate it with `?` to fail the test. The failure records the line
/// the predicate was called from.
#[derive(Debug, Default)]
pub struct Test {
    checked: Cell<usize>,
}

impl Test {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of predicates evaluated so far
    pub fn assertions(&self) -> usize {
        self.checked.get()
    }

    #[track_caller]
    fn check(
        &self,
        holds: bool,
        function: &'static str,
        args: impl FnOnce() -> Vec<ArgValue>,
        message: impl FnOnce(&[ArgValue]) -> String,
    ) -> AssertResult {
        self.checked.set(self.checked.get() + 1);
        if holds {
            return Ok(());
        }

        let args = args();
        let message = message(&args);
        let site = StackFrame::new(SourceLocation::from(Location::caller()), function, args);
        Err(AssertionFailure::new(message, site))
    }

    /// Fail the test with an unhandled error
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) -> TestResult {
        Err(FatalError::new(message, SourceLocation::from(Location::caller())).into())
    }

    // Equality

    #[track_caller]
    pub fn assert_equal<A, B>(&self, a: A, b: B) -> AssertResult
    where
        A: PartialEq<B> + Arg,
        B: Arg,
    {
        self.check(
            a == b,
            "assert_equal",
            || vec![a.to_arg(), b.to_arg()],
            |args| format!("{} != {}", args[0].plain(), args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_not_equal<A, B>(&self, a: A, b: B) -> AssertResult
    where
        A: PartialEq<B> + Arg,
        B: Arg,
    {
        self.check(
            a != b,
            "assert_not_equal",
            || vec![a.to_arg(), b.to_arg()],
            |args| format!("{} == {}", args[0].plain(), args[1].plain()),
        )
    }

    /// Both references point at the same value
    #[track_caller]
    pub fn assert_same<T: Arg + ?Sized>(&self, a: &T, b: &T) -> AssertResult {
        self.check(
            std::ptr::eq(a, b),
            "assert_same",
            || vec![a.to_arg(), b.to_arg()],
            |args| format!("{} !== {}", args[0].plain(), args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_not_same<T: Arg + ?Sized>(&self, a: &T, b: &T) -> AssertResult {
        self.check(
            !std::ptr::eq(a, b),
            "assert_not_same",
            || vec![a.to_arg(), b.to_arg()],
            |args| format!("{} === {}", args[0].plain(), args[1].plain()),
        )
    }

    // Nullity

    #[track_caller]
    pub fn assert_null<T: Arg>(&self, value: &Option<T>) -> AssertResult {
        self.check(
            value.is_none(),
            "assert_null",
            || vec![value.to_arg()],
            |args| format!("{} !== null", args[0].plain()),
        )
    }

    #[track_caller]
    pub fn assert_not_null<T: Arg>(&self, value: &Option<T>) -> AssertResult {
        self.check(
            value.is_some(),
            "assert_not_null",
            || vec![value.to_arg()],
            |_| "Value is null".to_string(),
        )
    }

    // Booleans

    #[track_caller]
    pub fn assert_true(&self, value: bool) -> AssertResult {
        self.check(
            value,
            "assert_true",
            || vec![value.to_arg()],
            |_| "Not true".to_string(),
        )
    }

    #[track_caller]
    pub fn assert_false(&self, value: bool) -> AssertResult {
        self.check(
            !value,
            "assert_false",
            || vec![value.to_arg()],
            |_| "Not false".to_string(),
        )
    }

    // Ordering

    #[track_caller]
    pub fn assert_greater_than<A, B>(&self, a: A, b: B) -> AssertResult
    where
        A: PartialOrd<B> + Arg,
        B: Arg,
    {
        self.check(
            a > b,
            "assert_greater_than",
            || vec![a.to_arg(), b.to_arg()],
            |args| format!("{} <= {}", args[0].plain(), args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_greater_than_or_equal<A, B>(&self, a: A, b: B) -> AssertResult
    where
        A: PartialOrd<B> + Arg,
        B: Arg,
    {
        self.check(
            a >= b,
            "assert_greater_than_or_equal",
            || vec![a.to_arg(), b.to_arg()],
            |args| format!("{} < {}", args[0].plain(), args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_less_than<A, B>(&self, a: A, b: B) -> AssertResult
    where
        A: PartialOrd<B> + Arg,
        B: Arg,
    {
        self.check(
            a < b,
            "assert_less_than",
            || vec![a.to_arg(), b.to_arg()],
            |args| format!("{} >= {}", args[0].plain(), args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_less_than_or_equal<A, B>(&self, a: A, b: B) -> AssertResult
    where
        A: PartialOrd<B> + Arg,
        B: Arg,
    {
        self.check(
            a <= b,
            "assert_less_than_or_equal",
            || vec![a.to_arg(), b.to_arg()],
            |args| format!("{} > {}", args[0].plain(), args[1].plain()),
        )
    }

    // Strings

    #[track_caller]
    pub fn assert_contains(&self, haystack: &str, needle: &str) -> AssertResult {
        self.check(
            haystack.contains(needle),
            "assert_contains",
            || vec![haystack.to_arg(), needle.to_arg()],
            |_| format!("{} does not contain {}", haystack, needle),
        )
    }

    #[track_caller]
    pub fn assert_not_contains(&self, haystack: &str, needle: &str) -> AssertResult {
        self.check(
            !haystack.contains(needle),
            "assert_not_contains",
            || vec![haystack.to_arg(), needle.to_arg()],
            |_| format!("{} contains {}", haystack, needle),
        )
    }

    #[track_caller]
    pub fn assert_starts_with(&self, text: &str, prefix: &str) -> AssertResult {
        self.check(
            text.starts_with(prefix),
            "assert_starts_with",
            || vec![text.to_arg(), prefix.to_arg()],
            |_| format!("{} does not start with {}", text, prefix),
        )
    }

    #[track_caller]
    pub fn assert_not_starts_with(&self, text: &str, prefix: &str) -> AssertResult {
        self.check(
            !text.starts_with(prefix),
            "assert_not_starts_with",
            || vec![text.to_arg(), prefix.to_arg()],
            |_| format!("{} starts with {}", text, prefix),
        )
    }

    #[track_caller]
    pub fn assert_ends_with(&self, text: &str, suffix: &str) -> AssertResult {
        self.check(
            text.ends_with(suffix),
            "assert_ends_with",
            || vec![text.to_arg(), suffix.to_arg()],
            |_| format!("{} does not end with {}", text, suffix),
        )
    }

    #[track_caller]
    pub fn assert_not_ends_with(&self, text: &str, suffix: &str) -> AssertResult {
        self.check(
            !text.ends_with(suffix),
            "assert_not_ends_with",
            || vec![text.to_arg(), suffix.to_arg()],
            |_| format!("{} ends with {}", text, suffix),
        )
    }

    // Sequences and maps

    #[track_caller]
    pub fn assert_array_equal<T: PartialEq>(&self, a: &[T], b: &[T]) -> AssertResult {
        self.check(
            a == b,
            "assert_array_equal",
            || vec![ArgValue::Sequence, ArgValue::Sequence],
            |_| "Arrays are not equal".to_string(),
        )
    }

    #[track_caller]
    pub fn assert_array_not_equal<T: PartialEq>(&self, a: &[T], b: &[T]) -> AssertResult {
        self.check(
            a != b,
            "assert_array_not_equal",
            || vec![ArgValue::Sequence, ArgValue::Sequence],
            |_| "Arrays are equal".to_string(),
        )
    }

    #[track_caller]
    pub fn assert_array_contains<T: PartialEq + Arg>(&self, items: &[T], value: &T) -> AssertResult {
        self.check(
            items.contains(value),
            "assert_array_contains",
            || vec![ArgValue::Sequence, value.to_arg()],
            |args| format!("Array does not contain {}", args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_array_not_contains<T: PartialEq + Arg>(
        &self,
        items: &[T],
        value: &T,
    ) -> AssertResult {
        self.check(
            !items.contains(value),
            "assert_array_not_contains",
            || vec![ArgValue::Sequence, value.to_arg()],
            |args| format!("Array contains {}", args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_has_key<K, V, S>(&self, map: &HashMap<K, V, S>, key: &K) -> AssertResult
    where
        K: Eq + Hash + Arg,
        S: BuildHasher,
    {
        self.check(
            map.contains_key(key),
            "assert_has_key",
            || vec![ArgValue::Sequence, key.to_arg()],
            |args| format!("Array does not contain key {}", args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_not_has_key<K, V, S>(&self, map: &HashMap<K, V, S>, key: &K) -> AssertResult
    where
        K: Eq + Hash + Arg,
        S: BuildHasher,
    {
        self.check(
            !map.contains_key(key),
            "assert_not_has_key",
            || vec![ArgValue::Sequence, key.to_arg()],
            |args| format!("Array contains key {}", args[1].plain()),
        )
    }

    #[track_caller]
    pub fn assert_array_empty<T>(&self, items: &[T]) -> AssertResult {
        self.check(
            items.is_empty(),
            "assert_array_empty",
            || vec![ArgValue::Sequence],
            |_| "Array is not empty".to_string(),
        )
    }

    #[track_caller]
    pub fn assert_array_not_empty<T>(&self, items: &[T]) -> AssertResult {
        self.check(
            !items.is_empty(),
            "assert_array_not_empty",
            || vec![ArgValue::Sequence],
            |_| "Array is empty".to_string(),
        )
    }

    // Errors

    /// `callback` returns an error or panics
    #[track_caller]
    pub fn assert_error<F, R>(&self, callback: F) -> AssertResult
    where
        F: FnOnce() -> anyhow::Result<R>,
    {
        let raised = raises(callback);
        self.check(
            raised,
            "assert_error",
            || vec![closure_arg()],
            |_| "Error not raised".to_string(),
        )
    }

    /// `callback` neither returns an error nor panics
    #[track_caller]
    pub fn assert_no_error<F, R>(&self, callback: F) -> AssertResult
    where
        F: FnOnce() -> anyhow::Result<R>,
    {
        let raised = raises(callback);
        self.check(
            !raised,
            "assert_no_error",
            || vec![closure_arg()],
            |_| "Error raised".to_string(),
        )
    }

    /// `callback` returned within `limit`.
    ///
    /// The check happens after the call returns; a call that never returns
    /// is not interrupted.
    #[track_caller]
    pub fn assert_timeout<F, R>(&self, limit: Duration, callback: F) -> AssertResult
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        callback();
        let elapsed = start.elapsed();

        self.check(
            elapsed <= limit,
            "assert_timeout",
            || vec![limit.as_secs_f64().to_arg(), closure_arg()],
            |_| format!("Timeout after {:.3} seconds", elapsed.as_secs_f64()),
        )
    }

    // Types

    /// The static type of `value` is named `type_name`
    #[track_caller]
    pub fn assert_type<V: ?Sized>(&self, _value: &V, type_name: &str) -> AssertResult {
        let actual = std::any::type_name::<V>();
        self.check(
            actual == type_name,
            "assert_type",
            || vec![ArgValue::object_of::<V>(), type_name.to_arg()],
            |_| format!("{} is not of type {}", actual, type_name),
        )
    }

    #[track_caller]
    pub fn assert_not_type<V: ?Sized>(&self, _value: &V, type_name: &str) -> AssertResult {
        let actual = std::any::type_name::<V>();
        self.check(
            actual != type_name,
            "assert_not_type",
            || vec![ArgValue::object_of::<V>(), type_name.to_arg()],
            |_| format!("{} is of type {}", actual, type_name),
        )
    }

    /// `value` holds a `T`
    #[track_caller]
    pub fn assert_instance_of<T: Any>(&self, value: &dyn Any) -> AssertResult {
        self.check(
            value.is::<T>(),
            "assert_instance_of",
            || vec![ArgValue::Object("dyn Any".to_string())],
            |_| format!("Value is not an instance of {}", std::any::type_name::<T>()),
        )
    }

    #[track_caller]
    pub fn assert_not_instance_of<T: Any>(&self, value: &dyn Any) -> AssertResult {
        self.check(
            !value.is::<T>(),
            "assert_not_instance_of",
            || vec![ArgValue::Object("dyn Any".to_string())],
            |_| format!("Value is an instance of {}", std::any::type_name::<T>()),
        )
    }
}

fn closure_arg() -> ArgValue {
    ArgValue::Object("Closure".to_string())
}

/// Whether `callback` fails, by error or by panic
fn raises<F, R>(callback: F) -> bool
where
    F: FnOnce() -> anyhow::Result<R>,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(result) => result.is_err(),
        Err(_) => {
            // Expected panic; keep it out of the test's own report
            panics::take_recorded();
            true
        }
    }
}
