use super::extension::{Extension, ExtensionInfo, ExtensionResult};
use crate::core::value::{Val, Visibility};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Declared type of a parameter, property or return value
#[derive(Debug, Clone, PartialEq)]
pub enum TypeHint {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
    Callable,
    Iterable,
    Mixed,
    Void,
    Never,
    Null,
    False,
    True,
    Static,
    SelfType,
    Class(Vec<u8>),
}

impl TypeHint {
    pub fn class(name: &[u8]) -> Self {
        TypeHint::Class(name.to_vec())
    }

    /// Keyword for builtin types, `None` for class references
    pub fn builtin_name(&self) -> Option<&'static str> {
        Some(match self {
            TypeHint::Int => "int",
            TypeHint::Float => "float",
            TypeHint::String => "string",
            TypeHint::Bool => "bool",
            TypeHint::Array => "array",
            TypeHint::Object => "object",
            TypeHint::Callable => "callable",
            TypeHint::Iterable => "iterable",
            TypeHint::Mixed => "mixed",
            TypeHint::Void => "void",
            TypeHint::Never => "never",
            TypeHint::Null => "null",
            TypeHint::False => "false",
            TypeHint::True => "true",
            TypeHint::Static => "static",
            TypeHint::SelfType => "self",
            TypeHint::Class(_) => return None,
        })
    }

    pub fn nullable(self) -> NativeType {
        NativeType {
            hint: self,
            nullable: true,
        }
    }
}

/// A type hint plus its nullability (`?Foo`)
#[derive(Debug, Clone, PartialEq)]
pub struct NativeType {
    pub hint: TypeHint,
    pub nullable: bool,
}

impl From<TypeHint> for NativeType {
    fn from(hint: TypeHint) -> Self {
        NativeType {
            hint,
            nullable: false,
        }
    }
}

/// Default value of a parameter as recorded in arginfo
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDefault {
    Required,
    Value(Val),
    /// Optional, but the default cannot be expressed as a literal
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct NativeParamInfo {
    pub name: Vec<u8>,
    pub type_hint: Option<NativeType>,
    pub is_reference: bool,
    pub is_variadic: bool,
    pub default: ParamDefault,
}

impl NativeParamInfo {
    pub fn new(name: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            type_hint: None,
            is_reference: false,
            is_variadic: false,
            default: ParamDefault::Required,
        }
    }

    pub fn typed(name: &[u8], ty: impl Into<NativeType>) -> Self {
        Self {
            type_hint: Some(ty.into()),
            ..Self::new(name)
        }
    }

    pub fn by_ref(mut self) -> Self {
        self.is_reference = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn default(mut self, value: impl Into<Val>) -> Self {
        self.default = ParamDefault::Value(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.default = ParamDefault::Unavailable;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.is_variadic || !matches!(self.default, ParamDefault::Required)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NativeSignature {
    pub parameters: Vec<NativeParamInfo>,
    pub return_type: Option<NativeType>,
    pub returns_reference: bool,
}

/// Native function definition for extension-provided functions
#[derive(Debug, Clone)]
pub struct NativeFunctionDef {
    pub name: Vec<u8>,
    pub signature: NativeSignature,
    pub doc_comment: Option<Vec<u8>>,
}

impl NativeFunctionDef {
    pub fn new(name: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            signature: NativeSignature::default(),
            doc_comment: None,
        }
    }

    pub fn param(mut self, param: NativeParamInfo) -> Self {
        self.signature.parameters.push(param);
        self
    }

    pub fn returns(mut self, ty: impl Into<NativeType>) -> Self {
        self.signature.return_type = Some(ty.into());
        self
    }

    pub fn returns_reference(mut self) -> Self {
        self.signature.returns_reference = true;
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.doc_comment = Some(text.as_bytes().to_vec());
        self
    }
}

/// Native method entry for extension-provided class methods
#[derive(Debug, Clone)]
pub struct NativeMethodEntry {
    pub signature: NativeSignature,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub doc_comment: Option<Vec<u8>>,
}

impl NativeMethodEntry {
    pub fn with_visibility(visibility: Visibility) -> Self {
        Self {
            signature: NativeSignature::default(),
            visibility,
            is_static: false,
            is_abstract: false,
            is_final: false,
            doc_comment: None,
        }
    }

    pub fn public() -> Self {
        Self::with_visibility(Visibility::Public)
    }

    pub fn protected() -> Self {
        Self::with_visibility(Visibility::Protected)
    }

    pub fn private() -> Self {
        Self::with_visibility(Visibility::Private)
    }

    pub fn param(mut self, param: NativeParamInfo) -> Self {
        self.signature.parameters.push(param);
        self
    }

    pub fn returns(mut self, ty: impl Into<NativeType>) -> Self {
        self.signature.return_type = Some(ty.into());
        self
    }

    pub fn returns_reference(mut self) -> Self {
        self.signature.returns_reference = true;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn final_method(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.doc_comment = Some(text.as_bytes().to_vec());
        self
    }
}

#[derive(Debug, Clone)]
pub struct NativePropertyEntry {
    pub visibility: Visibility,
    pub is_static: bool,
    pub type_hint: Option<NativeType>,
    pub doc_comment: Option<Vec<u8>>,
}

impl NativePropertyEntry {
    pub fn with_visibility(visibility: Visibility) -> Self {
        Self {
            visibility,
            is_static: false,
            type_hint: None,
            doc_comment: None,
        }
    }

    pub fn public() -> Self {
        Self::with_visibility(Visibility::Public)
    }

    pub fn protected() -> Self {
        Self::with_visibility(Visibility::Protected)
    }

    pub fn private() -> Self {
        Self::with_visibility(Visibility::Private)
    }

    pub fn typed(mut self, ty: impl Into<NativeType>) -> Self {
        self.type_hint = Some(ty.into());
        self
    }

    pub fn static_property(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.doc_comment = Some(text.as_bytes().to_vec());
        self
    }
}

/// Native class definition for extension-provided classes, interfaces and traits
///
/// Only directly declared members live here; inheritance is resolved by the
/// reflection layer.
#[derive(Debug, Clone)]
pub struct NativeClassDef {
    pub name: Vec<u8>,
    pub parent: Option<Vec<u8>>,
    pub is_interface: bool,
    pub is_trait: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Implemented interfaces, or extended interfaces for an interface
    pub interfaces: Vec<Vec<u8>>,
    pub traits: Vec<Vec<u8>>,
    pub constants: IndexMap<Vec<u8>, (Val, Visibility)>,
    pub properties: IndexMap<Vec<u8>, NativePropertyEntry>,
    pub methods: IndexMap<Vec<u8>, NativeMethodEntry>,
    pub doc_comment: Option<Vec<u8>>,
}

impl NativeClassDef {
    pub fn new_class(name: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            parent: None,
            is_interface: false,
            is_trait: false,
            is_abstract: false,
            is_final: false,
            interfaces: Vec::new(),
            traits: Vec::new(),
            constants: IndexMap::new(),
            properties: IndexMap::new(),
            methods: IndexMap::new(),
            doc_comment: None,
        }
    }

    pub fn new_interface(name: &[u8]) -> Self {
        Self {
            is_interface: true,
            ..Self::new_class(name)
        }
    }

    pub fn new_trait(name: &[u8]) -> Self {
        Self {
            is_trait: true,
            ..Self::new_class(name)
        }
    }

    pub fn extends(mut self, parent: &[u8]) -> Self {
        self.parent = Some(parent.to_vec());
        self
    }

    pub fn implements(mut self, interfaces: &[&[u8]]) -> Self {
        self.interfaces
            .extend(interfaces.iter().map(|name| name.to_vec()));
        self
    }

    pub fn uses(mut self, traits: &[&[u8]]) -> Self {
        self.traits.extend(traits.iter().map(|name| name.to_vec()));
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn final_class(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn constant(mut self, name: &[u8], value: impl Into<Val>, visibility: Visibility) -> Self {
        self.constants
            .insert(name.to_vec(), (value.into(), visibility));
        self
    }

    pub fn property(mut self, name: &[u8], entry: NativePropertyEntry) -> Self {
        self.properties.insert(name.to_vec(), entry);
        self
    }

    pub fn method(mut self, name: &[u8], entry: NativeMethodEntry) -> Self {
        self.methods.insert(name.to_vec(), entry);
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.doc_comment = Some(text.as_bytes().to_vec());
        self
    }
}

/// Everything one extension registered during its MINIT
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    pub info: ExtensionInfo,
    /// Lookup keys into the registry tables, in registration order
    pub functions: Vec<Vec<u8>>,
    pub classes: Vec<Vec<u8>>,
    pub constants: Vec<Vec<u8>>,
}

impl ModuleEntry {
    fn new(info: ExtensionInfo) -> Self {
        Self {
            info,
            functions: Vec::new(),
            classes: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }
}

/// Definitions the loading module replaced, restored if its MINIT fails
#[derive(Default)]
struct Shadowed {
    functions: Vec<(Vec<u8>, NativeFunctionDef)>,
    classes: Vec<(Vec<u8>, NativeClassDef)>,
    constants: Vec<(Vec<u8>, Val)>,
}

/// Function and class names are case-insensitive and may be written with a
/// leading namespace separator.
pub fn lookup_key(name: &[u8]) -> Vec<u8> {
    let name = name.strip_prefix(b"\\").unwrap_or(name);
    name.to_ascii_lowercase()
}

/// Extension registry - owns all loaded extensions and what they registered
pub struct ExtensionRegistry {
    /// Function definitions (lowercase name -> def)
    functions: IndexMap<Vec<u8>, NativeFunctionDef>,
    /// Class definitions (lowercase name -> def)
    classes: IndexMap<Vec<u8>, NativeClassDef>,
    /// Engine-level constants (name -> value), case-sensitive
    constants: IndexMap<Vec<u8>, Val>,
    /// Loaded extensions in load order
    modules: Vec<ModuleEntry>,
    /// Lowercase extension name -> index into `modules`
    extension_map: HashMap<String, usize>,
    /// Module currently running MINIT
    loading: Option<ModuleEntry>,
    shadowed: Shadowed,
}

impl ExtensionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            functions: IndexMap::new(),
            classes: IndexMap::new(),
            constants: IndexMap::new(),
            modules: Vec::new(),
            extension_map: HashMap::new(),
            loading: None,
            shadowed: Shadowed::default(),
        }
    }

    /// Register a native function definition
    pub fn register_function(&mut self, def: NativeFunctionDef) {
        let key = lookup_key(&def.name);
        let previous = self.functions.insert(key.clone(), def);
        if previous.is_some() {
            warn!(function = %String::from_utf8_lossy(&key), "function redeclared");
        }
        if let Some(module) = self.loading.as_mut() {
            if !module.functions.contains(&key) {
                if let Some(previous) = previous {
                    self.shadowed.functions.push((key.clone(), previous));
                }
                module.functions.push(key);
            }
        }
    }

    /// Register a native class, interface or trait definition
    pub fn register_class(&mut self, class: NativeClassDef) {
        let key = lookup_key(&class.name);
        let previous = self.classes.insert(key.clone(), class);
        if previous.is_some() {
            warn!(class = %String::from_utf8_lossy(&key), "class redeclared");
        }
        if let Some(module) = self.loading.as_mut() {
            if !module.classes.contains(&key) {
                if let Some(previous) = previous {
                    self.shadowed.classes.push((key.clone(), previous));
                }
                module.classes.push(key);
            }
        }
    }

    /// Register an engine-level constant
    pub fn register_constant(&mut self, name: &[u8], value: impl Into<Val>) {
        let name = name.strip_prefix(b"\\").unwrap_or(name).to_vec();
        let previous = self.constants.insert(name.clone(), value.into());
        if previous.is_some() {
            warn!(constant = %String::from_utf8_lossy(&name), "constant redefined");
        }
        if let Some(module) = self.loading.as_mut() {
            if !module.constants.contains(&name) {
                if let Some(previous) = previous {
                    self.shadowed.constants.push((name.clone(), previous));
                }
                module.constants.push(name);
            }
        }
    }

    /// Get a function definition by name (case-insensitive lookup)
    pub fn get_function(&self, name: &[u8]) -> Option<&NativeFunctionDef> {
        self.functions.get(&lookup_key(name))
    }

    /// Get a class definition by name (case-insensitive lookup)
    pub fn get_class(&self, name: &[u8]) -> Option<&NativeClassDef> {
        self.classes.get(&lookup_key(name))
    }

    /// Get an engine-level constant by name (case-sensitive)
    pub fn get_constant(&self, name: &[u8]) -> Option<&Val> {
        let name = name.strip_prefix(b"\\").unwrap_or(name);
        self.constants.get(name)
    }

    /// Check if an extension is loaded (case-insensitive, like `extension_loaded()`)
    pub fn extension_loaded(&self, name: &str) -> bool {
        self.extension_map.contains_key(&name.to_ascii_lowercase())
    }

    /// Get list of all loaded extension names in load order
    pub fn get_extensions(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Get the module entry of a loaded extension (case-insensitive)
    pub fn get_module(&self, name: &str) -> Option<&ModuleEntry> {
        self.extension_map
            .get(&name.to_ascii_lowercase())
            .map(|&index| &self.modules[index])
    }

    /// Functions registered by a module, in registration order
    pub fn module_functions<'a>(
        &'a self,
        module: &'a ModuleEntry,
    ) -> impl Iterator<Item = &'a NativeFunctionDef> + 'a {
        module.functions.iter().filter_map(|key| self.functions.get(key))
    }

    /// Constants registered by a module, in registration order
    pub fn module_constants<'a>(
        &'a self,
        module: &'a ModuleEntry,
    ) -> impl Iterator<Item = (&'a [u8], &'a Val)> + 'a {
        module
            .constants
            .iter()
            .filter_map(|name| self.constants.get(name).map(|v| (name.as_slice(), v)))
    }

    /// Register an extension and call its MINIT hook
    ///
    /// Returns an error if:
    /// - Extension with same name already registered
    /// - Dependencies are not satisfied
    /// - MINIT hook fails (anything it registered is rolled back)
    pub fn register_extension(&mut self, extension: Box<dyn Extension>) -> Result<(), String> {
        let info = extension.info();

        if self.extension_loaded(info.name) {
            return Err(format!("Extension '{}' is already registered", info.name));
        }

        for &dep in info.dependencies {
            if !self.extension_loaded(dep) {
                return Err(format!(
                    "Extension '{}' depends on '{}' which is not loaded",
                    info.name, dep
                ));
            }
        }

        self.loading = Some(ModuleEntry::new(info.clone()));
        let result = extension.module_init(self);
        let shadowed = std::mem::take(&mut self.shadowed);
        let Some(module) = self.loading.take() else {
            return Err(format!("Extension '{}' MINIT lost its module entry", info.name));
        };

        match result {
            ExtensionResult::Success => {
                debug!(
                    extension = info.name,
                    version = info.version,
                    functions = module.functions.len(),
                    classes = module.classes.len(),
                    constants = module.constants.len(),
                    "extension loaded"
                );
                let index = self.modules.len();
                self.extension_map.insert(info.name.to_ascii_lowercase(), index);
                self.modules.push(module);
                Ok(())
            }
            ExtensionResult::Failure(msg) => {
                for key in &module.functions {
                    self.functions.shift_remove(key);
                }
                for key in &module.classes {
                    self.classes.shift_remove(key);
                }
                for key in &module.constants {
                    self.constants.shift_remove(key);
                }
                for (key, def) in shadowed.functions {
                    self.functions.insert(key, def);
                }
                for (key, def) in shadowed.classes {
                    self.classes.insert(key, def);
                }
                for (name, value) in shadowed.constants {
                    self.constants.insert(name, value);
                }
                Err(format!("Extension '{}' MINIT failed: {}", info.name, msg))
            }
        }
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shapes;

    impl Extension for Shapes {
        fn info(&self) -> ExtensionInfo {
            ExtensionInfo {
                name: "Shapes",
                version: "0.1.0",
                dependencies: &[],
            }
        }

        fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
            registry.register_function(
                NativeFunctionDef::new(b"shape_count").returns(TypeHint::Int),
            );
            registry.register_class(NativeClassDef::new_interface(b"Shapes\\Shape"));
            registry.register_constant(b"SHAPES_MAX", Val::Int(8));
            ExtensionResult::Success
        }
    }

    struct Broken;

    impl Extension for Broken {
        fn info(&self) -> ExtensionInfo {
            ExtensionInfo {
                name: "broken",
                version: "0.0.1",
                dependencies: &[],
            }
        }

        fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
            registry.register_function(NativeFunctionDef::new(b"broken_fn"));
            ExtensionResult::Failure("no backing library".into())
        }
    }

    struct NeedsShapes;

    impl Extension for NeedsShapes {
        fn info(&self) -> ExtensionInfo {
            ExtensionInfo {
                name: "circles",
                version: "0.1.0",
                dependencies: &["shapes"],
            }
        }
    }

    #[test]
    fn test_registrations_are_attributed_to_the_loading_module() {
        let mut registry = ExtensionRegistry::new();
        registry.register_extension(Box::new(Shapes)).unwrap();

        let module = registry.get_module("shapes").expect("module lookup is case-insensitive");
        assert_eq!(module.name(), "Shapes");
        assert_eq!(module.functions, vec![b"shape_count".to_vec()]);
        assert_eq!(module.classes, vec![b"shapes\\shape".to_vec()]);
        assert_eq!(module.constants, vec![b"SHAPES_MAX".to_vec()]);

        assert!(registry.get_class(b"\\SHAPES\\Shape").is_some());
        assert!(registry.get_function(b"Shape_Count").is_some());
        assert_eq!(registry.get_constant(b"SHAPES_MAX"), Some(&Val::Int(8)));
        assert!(registry.get_constant(b"shapes_max").is_none());
    }

    #[test]
    fn test_duplicate_extension_rejected() {
        let mut registry = ExtensionRegistry::new();
        registry.register_extension(Box::new(Shapes)).unwrap();
        let err = registry.register_extension(Box::new(Shapes)).unwrap_err();
        assert!(err.contains("already registered"));
    }

    #[test]
    fn test_missing_dependency_rejected() {
        let mut registry = ExtensionRegistry::new();
        let err = registry.register_extension(Box::new(NeedsShapes)).unwrap_err();
        assert!(err.contains("depends on 'shapes'"));

        registry.register_extension(Box::new(Shapes)).unwrap();
        registry.register_extension(Box::new(NeedsShapes)).unwrap();
        assert_eq!(registry.get_extensions(), vec!["Shapes", "circles"]);
    }

    #[test]
    fn test_failed_minit_rolls_back_registrations() {
        let mut registry = ExtensionRegistry::new();
        let err = registry.register_extension(Box::new(Broken)).unwrap_err();
        assert!(err.contains("MINIT failed: no backing library"));
        assert!(registry.get_function(b"broken_fn").is_none());
        assert!(!registry.extension_loaded("broken"));
    }

    struct Clobbers;

    impl Extension for Clobbers {
        fn info(&self) -> ExtensionInfo {
            ExtensionInfo {
                name: "clobbers",
                version: "0.0.1",
                dependencies: &["Shapes"],
            }
        }

        fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
            registry.register_class(NativeClassDef::new_class(b"Shapes\\Shape"));
            registry.register_function(NativeFunctionDef::new(b"SHAPE_COUNT"));
            registry.register_constant(b"SHAPES_MAX", Val::Int(0));
            registry.register_class(NativeClassDef::new_class(b"Clobbers\\Own"));
            ExtensionResult::Failure("late failure".into())
        }
    }

    #[test]
    fn test_failed_minit_restores_definitions_it_replaced() {
        let mut registry = ExtensionRegistry::new();
        registry.register_extension(Box::new(Shapes)).unwrap();
        assert!(registry.register_extension(Box::new(Clobbers)).is_err());

        let shape = registry.get_class(b"Shapes\\Shape").expect("earlier class survives");
        assert!(shape.is_interface);
        let count = registry.get_function(b"shape_count").expect("earlier function survives");
        assert_eq!(count.name, b"shape_count".to_vec());
        assert_eq!(registry.get_constant(b"SHAPES_MAX"), Some(&Val::Int(8)));
        assert!(registry.get_class(b"Clobbers\\Own").is_none());

        let module = registry.get_module("Shapes").unwrap();
        assert_eq!(registry.module_functions(module).count(), 1);
        assert_eq!(registry.module_constants(module).count(), 1);
        assert!(module.classes.iter().all(|key| registry.get_class(key).is_some()));

        // replacements are tracked per load, not carried into the next one
        registry.register_extension(Box::new(Broken)).unwrap_err();
        assert!(registry.get_class(b"Shapes\\Shape").unwrap().is_interface);
    }

    #[test]
    fn test_param_optionality() {
        assert!(!NativeParamInfo::new(b"a").is_optional());
        assert!(NativeParamInfo::new(b"a").default(0i64).is_optional());
        assert!(NativeParamInfo::new(b"a").optional().is_optional());
        assert!(NativeParamInfo::new(b"a").variadic().is_optional());
    }
}
