use super::registry::ExtensionRegistry;

/// Extension metadata and version information
#[derive(Debug, Clone)]
pub struct ExtensionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub dependencies: &'static [&'static str],
}

/// Lifecycle hook results
#[derive(Debug)]
pub enum ExtensionResult {
    Success,
    Failure(String),
}

/// Extension trait - mirrors the declaration half of PHP's zend_module_entry
///
/// An extension describes its API surface during MINIT by registering
/// functions, classes and constants. Everything registered while
/// `module_init` runs is attributed to that extension, which is what
/// `ReflectionExtension::getFunctions()`/`getClasses()`/`getConstants()`
/// report later.
///
/// # Example Extension
///
/// ```rust,ignore
/// use php_stubgen::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
/// use php_stubgen::runtime::registry::{ExtensionRegistry, NativeFunctionDef, TypeHint};
///
/// pub struct MyExtension;
///
/// impl Extension for MyExtension {
///     fn info(&self) -> ExtensionInfo {
///         ExtensionInfo {
///             name: "myext",
///             version: "1.0.0",
///             dependencies: &["Core"],
///         }
///     }
///
///     fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
///         registry.register_function(
///             NativeFunctionDef::new(b"my_function").returns(TypeHint::String),
///         );
///         ExtensionResult::Success
///     }
/// }
/// ```
pub trait Extension {
    /// Extension metadata
    fn info(&self) -> ExtensionInfo;

    /// Module initialization (MINIT) - called once when the extension is loaded
    fn module_init(&self, _registry: &mut ExtensionRegistry) -> ExtensionResult {
        ExtensionResult::Success
    }
}
