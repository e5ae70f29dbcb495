/// Define inherent methods and the matching [`TestClass`] table in one go.
///
/// The `impl` block is emitted unchanged. Each method is also recorded with
/// its doc text, visibility and parameters, so a marked method with a bad
/// signature is reported at discovery time rather than at compile time.
///
/// ```
/// use marktest::{Test, TestResult, test_class};
///
/// pub struct Calculator;
///
/// test_class! {
///     impl Calculator {
///         /// @test should add
///         pub fn check_add(&self, t: &Test) -> TestResult {
///             t.assert_equal(1 + 1, 2)?;
///             Ok(())
///         }
///     }
/// }
/// ```
///
/// Only doc attributes are recognized on methods. The handle may be taken as
/// `&Test` or `&'_ Test`; any other parameter shape is recorded without an
/// invoker and rejected at discovery.
///
/// [`TestClass`]: crate::discovery::TestClass
#[macro_export]
macro_rules! test_class {
    (impl $ty:ident { $($body:tt)* }) => {
        impl $ty {
            $($body)*
        }

        impl $crate::discovery::TestClass for $ty {
            fn class_name() -> &'static str {
                stringify!($ty)
            }

            fn declare() -> ::std::vec::Vec<$crate::discovery::MethodDecl<Self>> {
                #[allow(unused_mut)]
                let mut methods = ::std::vec::Vec::new();
                $crate::__test_class_methods!(methods; $ty; $($body)*);
                methods
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __test_class_methods {
    ($methods:ident; $ty:ident;) => {};

    // Takes the test handle: callable
    (
        $methods:ident; $ty:ident;
        $(#[doc = $doc:literal])*
        $vis:vis fn $name:ident(&self, $param:ident : & $($lt:lifetime)? Test) $(-> $ret:ty)? $body:block
        $($rest:tt)*
    ) => {
        $methods.push(
            $crate::discovery::MethodDecl::new(
                stringify!($name),
                concat!($($doc, "\n"),*),
                $crate::discovery::Visibility::from_token(stringify!($vis)),
                ::std::vec![$crate::discovery::Param::typed(
                    stringify!($param),
                    concat!("&", $(stringify!($lt), " ",)? "Test"),
                )],
            )
            .with_invoker(<$ty>::$name),
        );
        $crate::__test_class_methods!($methods; $ty; $($rest)*);
    };

    // Any other method
    (
        $methods:ident; $ty:ident;
        $(#[doc = $doc:literal])*
        $vis:vis fn $name:ident(&self $(, $param:ident : $pty:ty)*) $(-> $ret:ty)? $body:block
        $($rest:tt)*
    ) => {
        $methods.push($crate::discovery::MethodDecl::new(
            stringify!($name),
            concat!($($doc, "\n"),*),
            $crate::discovery::Visibility::from_token(stringify!($vis)),
            ::std::vec![$($crate::discovery::Param::typed(stringify!($param), stringify!($pty))),*],
        ));
        $crate::__test_class_methods!($methods; $ty; $($rest)*);
    };

    // Associated function without a receiver
    (
        $methods:ident; $ty:ident;
        $(#[doc = $doc:literal])*
        $vis:vis fn $name:ident($($param:ident : $pty:ty),*) $(-> $ret:ty)? $body:block
        $($rest:tt)*
    ) => {
        $methods.push($crate::discovery::MethodDecl::new(
            stringify!($name),
            concat!($($doc, "\n"),*),
            $crate::discovery::Visibility::from_token(stringify!($vis)),
            ::std::vec![$($crate::discovery::Param::typed(stringify!($param), stringify!($pty))),*],
        ));
        $crate::__test_class_methods!($methods; $ty; $($rest)*);
    };
}
