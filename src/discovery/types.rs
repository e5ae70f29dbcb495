use crate::assertion::{ArgValue, AssertionFailure, SourceLocation, StackFrame, Test, TestResult};

/// Calls one test method on an instance
pub type Invoker<T> = fn(&T, &Test) -> TestResult;

/// Declared visibility of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Public,
    /// `pub(crate)`, `pub(super)`, `pub(in path)`
    Restricted(String),
    Private,
}

impl Visibility {
    /// From the source text of a visibility qualifier
    pub fn from_token(token: &str) -> Self {
        let compact: String = token.split_whitespace().collect();
        match compact.as_str() {
            "pub" => Visibility::Public,
            "" => Visibility::Private,
            _ => Visibility::Restricted(compact),
        }
    }
}

/// One declared parameter, `self` excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub type_hint: Option<&'static str>,
}

impl Param {
    pub fn typed(name: &'static str, type_hint: &'static str) -> Self {
        Self {
            name,
            type_hint: Some(type_hint),
        }
    }

    pub fn untyped(name: &'static str) -> Self {
        Self {
            name,
            type_hint: None,
        }
    }
}

/// Declaration of one method of a [`TestClass`]
#[derive(Debug, Clone)]
pub struct MethodDecl<T> {
    pub name: &'static str,
    pub doc: &'static str,
    pub visibility: Visibility,
    pub params: Vec<Param>,
    pub invoker: Option<Invoker<T>>,
}

impl<T> MethodDecl<T> {
    pub fn new(
        name: &'static str,
        doc: &'static str,
        visibility: Visibility,
        params: Vec<Param>,
    ) -> Self {
        Self {
            name,
            doc,
            visibility,
            params,
            invoker: None,
        }
    }

    pub fn with_invoker(mut self, invoker: Invoker<T>) -> Self {
        self.invoker = Some(invoker);
        self
    }
}

/// A type whose methods can be discovered as tests.
///
/// Usually implemented through [`test_class!`](crate::test_class).
pub trait TestClass: Sized + 'static {
    /// Suite name used when none is given
    fn class_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Every method of the type, in declaration order
    fn declare() -> Vec<MethodDecl<Self>>;
}

/// A discovered test method
#[derive(Debug, Clone)]
pub struct TestDescriptor<T> {
    pub display_name: String,
    pub method_name: &'static str,
    pub invoker: Option<Invoker<T>>,
}

impl<T: TestClass> TestDescriptor<T> {
    /// Call the method on `object`.
    ///
    /// A method that cannot be reached fails the test instead of raising.
    pub fn invoke(&self, object: &T, test: &Test) -> TestResult {
        match self.invoker {
            Some(invoker) => invoker(object, test),
            None => {
                let site = StackFrame::new(
                    SourceLocation::new(T::class_name(), 0),
                    self.method_name,
                    vec![ArgValue::object_of::<Test>()],
                );
                Err(AssertionFailure::new(
                    format!("Method {} does not exist", self.method_name),
                    site,
                )
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_token() {
        assert_eq!(Visibility::from_token("pub"), Visibility::Public);
        assert_eq!(Visibility::from_token(""), Visibility::Private);
        assert_eq!(
            Visibility::from_token("pub (crate)"),
            Visibility::Restricted("pub(crate)".to_string())
        );
    }
}
