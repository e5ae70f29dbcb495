use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use thiserror::Error;

use super::marker::{Marker, parse_marker};
use super::types::{MethodDecl, TestClass, TestDescriptor, Visibility};

/// Type every test method takes as its only parameter
const TEST_HANDLE_TYPE: &str = "Test";

/// Why a marked method cannot be run as a test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilteringErrorKind {
    NotPublic,
    IncorrectParameters,
    NoTypeHint,
    IncorrectTypeHint,
}

/// A method marked `@test` whose signature cannot take a test handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MethodFilteringError {
    #[error("Method {method} is marked as a test but it's not public.")]
    NotPublic { method: String },

    #[error("Method {method} is marked as a test but it has an incorrect number of parameters.")]
    IncorrectParameters { method: String },

    #[error("Method {method} is marked as a test but has no type hint.")]
    NoTypeHint { method: String },

    #[error("Method {method} is marked as a test but has incorrect type hint {type_hint}.")]
    IncorrectTypeHint { method: String, type_hint: String },
}

impl MethodFilteringError {
    pub fn kind(&self) -> FilteringErrorKind {
        match self {
            Self::NotPublic { .. } => FilteringErrorKind::NotPublic,
            Self::IncorrectParameters { .. } => FilteringErrorKind::IncorrectParameters,
            Self::NoTypeHint { .. } => FilteringErrorKind::NoTypeHint,
            Self::IncorrectTypeHint { .. } => FilteringErrorKind::IncorrectTypeHint,
        }
    }

    pub fn method(&self) -> &str {
        match self {
            Self::NotPublic { method }
            | Self::IncorrectParameters { method }
            | Self::NoTypeHint { method }
            | Self::IncorrectTypeHint { method, .. } => method,
        }
    }
}

struct TableEntry<T> {
    decl: MethodDecl<T>,
    marker: Option<Marker>,
}

/// Declarations of one type with their markers parsed
struct MethodTable<T> {
    entries: Vec<TableEntry<T>>,
}

type TableRegistry = Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static TABLES: Lazy<TableRegistry> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Parsed declarations of `T`, built on first use
fn method_table<T: TestClass>() -> Arc<MethodTable<T>> {
    let key = TypeId::of::<T>();

    let cached = TABLES
        .lock()
        .ok()
        .and_then(|tables| tables.get(&key).cloned())
        .and_then(|table| table.downcast::<MethodTable<T>>().ok());
    if let Some(table) = cached {
        return table;
    }

    let entries = T::declare()
        .into_iter()
        .map(|decl| TableEntry {
            marker: parse_marker(decl.doc),
            decl,
        })
        .collect();
    let table = Arc::new(MethodTable { entries });
    tracing::debug!(class = T::class_name(), "Method table built");

    if let Ok(mut tables) = TABLES.lock() {
        tables.insert(key, table.clone());
    }
    table
}

/// Marked test methods of `T` in declaration order.
///
/// Stops at the first marked method with an unusable signature.
pub fn discover<T: TestClass>() -> Result<Vec<TestDescriptor<T>>, MethodFilteringError> {
    let table = method_table::<T>();
    let mut descriptors = Vec::new();

    for entry in &table.entries {
        let Some(marker) = &entry.marker else {
            continue;
        };
        validate(&entry.decl)?;

        descriptors.push(TestDescriptor {
            display_name: marker
                .display_name
                .clone()
                .unwrap_or_else(|| entry.decl.name.to_string()),
            method_name: entry.decl.name,
            invoker: entry.decl.invoker,
        });
    }

    tracing::debug!(
        class = T::class_name(),
        count = descriptors.len(),
        "Test methods discovered"
    );
    Ok(descriptors)
}

fn validate<T>(decl: &MethodDecl<T>) -> Result<(), MethodFilteringError> {
    let method = decl.name.to_string();

    if decl.visibility != Visibility::Public {
        return Err(MethodFilteringError::NotPublic { method });
    }

    let [param] = decl.params.as_slice() else {
        return Err(MethodFilteringError::IncorrectParameters { method });
    };

    let Some(type_hint) = param.type_hint else {
        return Err(MethodFilteringError::NoTypeHint { method });
    };

    if strip_reference(type_hint) != TEST_HANDLE_TYPE {
        return Err(MethodFilteringError::IncorrectTypeHint {
            method,
            type_hint: type_hint.to_string(),
        });
    }

    Ok(())
}

/// `&'a Test` -> `Test`. Mutable references are left as they are.
fn strip_reference(type_hint: &str) -> &str {
    let hint = type_hint.trim();
    let Some(rest) = hint.strip_prefix('&') else {
        return hint;
    };

    let rest = rest.trim_start();
    if rest.starts_with('\'') {
        return rest
            .split_once(char::is_whitespace)
            .map(|(_, tail)| tail.trim())
            .unwrap_or("");
    }
    rest.trim_end()
}
