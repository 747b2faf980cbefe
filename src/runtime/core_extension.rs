use crate::core::value::{Val, Visibility};
use crate::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
use crate::runtime::registry::{
    ExtensionRegistry, NativeClassDef, NativeFunctionDef, NativeMethodEntry, NativeParamInfo,
    NativePropertyEntry, TypeHint,
};

/// Core extension: the engine's base interfaces, exception hierarchy and
/// a handful of engine-level functions and constants
pub struct CoreExtension;

impl Extension for CoreExtension {
    fn info(&self) -> ExtensionInfo {
        ExtensionInfo {
            name: "Core",
            version: "8.3.0",
            dependencies: &[],
        }
    }

    fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
        register_functions(registry);
        register_interfaces(registry);
        register_throwables(registry);
        register_engine_classes(registry);
        register_constants(registry);
        ExtensionResult::Success
    }
}

fn register_functions(registry: &mut ExtensionRegistry) {
    registry.register_function(NativeFunctionDef::new(b"zend_version").returns(TypeHint::String));
    registry.register_function(NativeFunctionDef::new(b"func_num_args").returns(TypeHint::Int));
    registry.register_function(
        NativeFunctionDef::new(b"func_get_arg")
            .param(NativeParamInfo::typed(b"position", TypeHint::Int))
            .returns(TypeHint::Mixed),
    );
    registry.register_function(NativeFunctionDef::new(b"func_get_args").returns(TypeHint::Array));
    registry.register_function(
        NativeFunctionDef::new(b"strlen")
            .param(NativeParamInfo::typed(b"string", TypeHint::String))
            .returns(TypeHint::Int),
    );
    registry.register_function(
        NativeFunctionDef::new(b"strcmp")
            .param(NativeParamInfo::typed(b"string1", TypeHint::String))
            .param(NativeParamInfo::typed(b"string2", TypeHint::String))
            .returns(TypeHint::Int),
    );
    registry.register_function(
        NativeFunctionDef::new(b"error_reporting")
            .param(
                NativeParamInfo::typed(b"error_level", TypeHint::Int.nullable())
                    .default(Val::Null),
            )
            .returns(TypeHint::Int),
    );
    registry.register_function(
        NativeFunctionDef::new(b"define")
            .param(NativeParamInfo::typed(b"constant_name", TypeHint::String))
            .param(NativeParamInfo::typed(b"value", TypeHint::Mixed))
            .param(NativeParamInfo::typed(b"case_insensitive", TypeHint::Bool).default(false))
            .returns(TypeHint::Bool),
    );
    registry.register_function(
        NativeFunctionDef::new(b"defined")
            .param(NativeParamInfo::typed(b"constant_name", TypeHint::String))
            .returns(TypeHint::Bool),
    );
    registry.register_function(
        NativeFunctionDef::new(b"get_class")
            .param(NativeParamInfo::typed(b"object", TypeHint::Object).optional())
            .returns(TypeHint::String),
    );
    registry.register_function(
        NativeFunctionDef::new(b"class_exists")
            .param(NativeParamInfo::typed(b"class", TypeHint::String))
            .param(NativeParamInfo::typed(b"autoload", TypeHint::Bool).default(true))
            .returns(TypeHint::Bool),
    );
    registry.register_function(
        NativeFunctionDef::new(b"function_exists")
            .param(NativeParamInfo::typed(b"function", TypeHint::String))
            .returns(TypeHint::Bool),
    );
    registry.register_function(
        NativeFunctionDef::new(b"trigger_error")
            .param(NativeParamInfo::typed(b"message", TypeHint::String))
            .param(NativeParamInfo::typed(b"error_level", TypeHint::Int).default(1024i64))
            .returns(TypeHint::True),
    );
    registry.register_function(
        NativeFunctionDef::new(b"set_error_handler")
            .param(NativeParamInfo::typed(b"callback", TypeHint::Callable.nullable()))
            .param(NativeParamInfo::typed(b"error_levels", TypeHint::Int).default(32767i64)),
    );
    registry.register_function(
        NativeFunctionDef::new(b"extension_loaded")
            .param(NativeParamInfo::typed(b"extension", TypeHint::String))
            .returns(TypeHint::Bool),
    );
    registry.register_function(
        NativeFunctionDef::new(b"get_extension_funcs")
            .param(NativeParamInfo::typed(b"extension", TypeHint::String)),
    );
}

fn register_interfaces(registry: &mut ExtensionRegistry) {
    registry.register_class(
        NativeClassDef::new_interface(b"Stringable").method(
            b"__toString",
            NativeMethodEntry::public().returns(TypeHint::String),
        ),
    );

    registry.register_class(NativeClassDef::new_interface(b"Traversable"));

    registry.register_class(
        NativeClassDef::new_interface(b"IteratorAggregate")
            .implements(&[b"Traversable"])
            .method(
                b"getIterator",
                NativeMethodEntry::public().returns(TypeHint::class(b"Traversable")),
            ),
    );

    registry.register_class(
        NativeClassDef::new_interface(b"Iterator")
            .implements(&[b"Traversable"])
            .method(b"current", NativeMethodEntry::public().returns(TypeHint::Mixed))
            .method(b"next", NativeMethodEntry::public().returns(TypeHint::Void))
            .method(b"key", NativeMethodEntry::public().returns(TypeHint::Mixed))
            .method(b"valid", NativeMethodEntry::public().returns(TypeHint::Bool))
            .method(b"rewind", NativeMethodEntry::public().returns(TypeHint::Void)),
    );

    registry.register_class(
        NativeClassDef::new_interface(b"ArrayAccess")
            .method(
                b"offsetExists",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                    .returns(TypeHint::Bool),
            )
            .method(
                b"offsetGet",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                    .returns(TypeHint::Mixed),
            )
            .method(
                b"offsetSet",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                    .param(NativeParamInfo::typed(b"value", TypeHint::Mixed))
                    .returns(TypeHint::Void),
            )
            .method(
                b"offsetUnset",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                    .returns(TypeHint::Void),
            ),
    );

    registry.register_class(
        NativeClassDef::new_interface(b"Countable")
            .method(b"count", NativeMethodEntry::public().returns(TypeHint::Int)),
    );

    // Serializable (deprecated since PHP 8.1)
    registry.register_class(
        NativeClassDef::new_interface(b"Serializable")
            .method(b"serialize", NativeMethodEntry::public())
            .method(
                b"unserialize",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"data", TypeHint::String)),
            ),
    );

    registry.register_class(
        NativeClassDef::new_interface(b"UnitEnum").method(
            b"cases",
            NativeMethodEntry::public()
                .static_method()
                .returns(TypeHint::Array),
        ),
    );

    registry.register_class(
        NativeClassDef::new_interface(b"BackedEnum")
            .implements(&[b"UnitEnum"])
            .method(
                b"from",
                NativeMethodEntry::public()
                    .static_method()
                    .param(NativeParamInfo::new(b"value"))
                    .returns(TypeHint::Static),
            )
            .method(
                b"tryFrom",
                NativeMethodEntry::public()
                    .static_method()
                    .param(NativeParamInfo::new(b"value"))
                    .returns(TypeHint::Static.nullable()),
            ),
    );

    registry.register_class(
        NativeClassDef::new_interface(b"Throwable")
            .implements(&[b"Stringable"])
            .method(b"getMessage", NativeMethodEntry::public().returns(TypeHint::String))
            .method(b"getCode", NativeMethodEntry::public())
            .method(b"getFile", NativeMethodEntry::public().returns(TypeHint::String))
            .method(b"getLine", NativeMethodEntry::public().returns(TypeHint::Int))
            .method(b"getTrace", NativeMethodEntry::public().returns(TypeHint::Array))
            .method(
                b"getPrevious",
                NativeMethodEntry::public().returns(TypeHint::class(b"Throwable").nullable()),
            )
            .method(
                b"getTraceAsString",
                NativeMethodEntry::public().returns(TypeHint::String),
            ),
    );
}

/// Exception and Error share the same shape; only the root name differs
fn throwable_root(name: &[u8]) -> NativeClassDef {
    NativeClassDef::new_class(name)
        .implements(&[b"Throwable"])
        .property(b"message", NativePropertyEntry::protected())
        .property(
            b"string",
            NativePropertyEntry::private().typed(TypeHint::String),
        )
        .property(b"code", NativePropertyEntry::protected())
        .property(b"file", NativePropertyEntry::protected().typed(TypeHint::String))
        .property(b"line", NativePropertyEntry::protected().typed(TypeHint::Int))
        .property(b"trace", NativePropertyEntry::private().typed(TypeHint::Array))
        .property(
            b"previous",
            NativePropertyEntry::private().typed(TypeHint::class(b"Throwable").nullable()),
        )
        .method(b"__clone", NativeMethodEntry::private().returns(TypeHint::Void))
        .method(
            b"__construct",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"message", TypeHint::String).default(""))
                .param(NativeParamInfo::typed(b"code", TypeHint::Int).default(0i64))
                .param(
                    NativeParamInfo::typed(b"previous", TypeHint::class(b"Throwable").nullable())
                        .default(Val::Null),
                ),
        )
        .method(b"__wakeup", NativeMethodEntry::public())
        .method(
            b"getMessage",
            NativeMethodEntry::public()
                .final_method()
                .returns(TypeHint::String),
        )
        .method(b"getCode", NativeMethodEntry::public().final_method())
        .method(
            b"getFile",
            NativeMethodEntry::public()
                .final_method()
                .returns(TypeHint::String),
        )
        .method(
            b"getLine",
            NativeMethodEntry::public().final_method().returns(TypeHint::Int),
        )
        .method(
            b"getTrace",
            NativeMethodEntry::public()
                .final_method()
                .returns(TypeHint::Array),
        )
        .method(
            b"getPrevious",
            NativeMethodEntry::public()
                .final_method()
                .returns(TypeHint::class(b"Throwable").nullable()),
        )
        .method(
            b"getTraceAsString",
            NativeMethodEntry::public()
                .final_method()
                .returns(TypeHint::String),
        )
        .method(b"__toString", NativeMethodEntry::public().returns(TypeHint::String))
}

fn register_throwables(registry: &mut ExtensionRegistry) {
    registry.register_class(throwable_root(b"Exception"));
    registry.register_class(throwable_root(b"Error"));

    registry.register_class(
        NativeClassDef::new_class(b"ErrorException")
            .extends(b"Exception")
            .property(b"severity", NativePropertyEntry::protected().typed(TypeHint::Int))
            .method(
                b"__construct",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"message", TypeHint::String).default(""))
                    .param(NativeParamInfo::typed(b"code", TypeHint::Int).default(0i64))
                    .param(NativeParamInfo::typed(b"severity", TypeHint::Int).default(1i64))
                    .param(
                        NativeParamInfo::typed(b"filename", TypeHint::String.nullable())
                            .default(Val::Null),
                    )
                    .param(
                        NativeParamInfo::typed(b"line", TypeHint::Int.nullable())
                            .default(Val::Null),
                    )
                    .param(
                        NativeParamInfo::typed(
                            b"previous",
                            TypeHint::class(b"Throwable").nullable(),
                        )
                        .default(Val::Null),
                    ),
            )
            .method(
                b"getSeverity",
                NativeMethodEntry::public().final_method().returns(TypeHint::Int),
            ),
    );

    let errors: [(&[u8], &[u8]); 8] = [
        (b"CompileError", b"Error"),
        (b"ParseError", b"CompileError"),
        (b"TypeError", b"Error"),
        (b"ArgumentCountError", b"TypeError"),
        (b"ValueError", b"Error"),
        (b"ArithmeticError", b"Error"),
        (b"DivisionByZeroError", b"ArithmeticError"),
        (b"UnhandledMatchError", b"Error"),
    ];
    for (name, parent) in errors {
        registry.register_class(NativeClassDef::new_class(name).extends(parent));
    }
}

fn register_engine_classes(registry: &mut ExtensionRegistry) {
    registry.register_class(
        NativeClassDef::new_class(b"Closure")
            .final_class()
            .method(b"__construct", NativeMethodEntry::private())
            .method(
                b"bind",
                NativeMethodEntry::public()
                    .static_method()
                    .param(NativeParamInfo::typed(b"closure", TypeHint::class(b"Closure")))
                    .param(NativeParamInfo::typed(b"newThis", TypeHint::Object.nullable()))
                    .param(NativeParamInfo::new(b"newScope").default("static"))
                    .returns(TypeHint::class(b"Closure").nullable()),
            )
            .method(
                b"bindTo",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"newThis", TypeHint::Object.nullable()))
                    .param(NativeParamInfo::new(b"newScope").default("static"))
                    .returns(TypeHint::class(b"Closure").nullable()),
            )
            .method(
                b"call",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"newThis", TypeHint::Object))
                    .param(NativeParamInfo::typed(b"args", TypeHint::Mixed).variadic())
                    .returns(TypeHint::Mixed),
            )
            .method(
                b"fromCallable",
                NativeMethodEntry::public()
                    .static_method()
                    .param(NativeParamInfo::typed(b"callback", TypeHint::Callable))
                    .returns(TypeHint::class(b"Closure")),
            ),
    );

    registry.register_class(
        NativeClassDef::new_class(b"Generator")
            .final_class()
            .implements(&[b"Iterator"])
            .method(b"current", NativeMethodEntry::public().returns(TypeHint::Mixed))
            .method(b"key", NativeMethodEntry::public().returns(TypeHint::Mixed))
            .method(b"next", NativeMethodEntry::public().returns(TypeHint::Void))
            .method(b"rewind", NativeMethodEntry::public().returns(TypeHint::Void))
            .method(
                b"send",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"value", TypeHint::Mixed))
                    .returns(TypeHint::Mixed),
            )
            .method(
                b"throw",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"exception", TypeHint::class(b"Throwable")))
                    .returns(TypeHint::Mixed),
            )
            .method(b"valid", NativeMethodEntry::public().returns(TypeHint::Bool))
            .method(b"getReturn", NativeMethodEntry::public().returns(TypeHint::Mixed)),
    );

    registry.register_class(
        NativeClassDef::new_class(b"WeakMap")
            .final_class()
            .implements(&[b"ArrayAccess", b"Countable", b"IteratorAggregate"])
            .method(
                b"offsetGet",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::new(b"object"))
                    .returns(TypeHint::Mixed),
            )
            .method(
                b"offsetSet",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::new(b"object"))
                    .param(NativeParamInfo::typed(b"value", TypeHint::Mixed))
                    .returns(TypeHint::Void),
            )
            .method(
                b"offsetExists",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::new(b"object"))
                    .returns(TypeHint::Bool),
            )
            .method(
                b"offsetUnset",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::new(b"object"))
                    .returns(TypeHint::Void),
            )
            .method(b"count", NativeMethodEntry::public().returns(TypeHint::Int))
            .method(
                b"getIterator",
                NativeMethodEntry::public().returns(TypeHint::class(b"Iterator")),
            ),
    );

    registry.register_class(
        NativeClassDef::new_class(b"stdClass").doc("/** @since 5.0 */"),
    );

    registry.register_class(
        NativeClassDef::new_class(b"ArrayIterator")
            .implements(&[b"Iterator", b"ArrayAccess", b"Countable", b"Serializable"])
            .constant(b"STD_PROP_LIST", 1i64, Visibility::Public)
            .constant(b"ARRAY_AS_PROPS", 2i64, Visibility::Public)
            .method(
                b"__construct",
                NativeMethodEntry::public()
                    .param(
                        NativeParamInfo::typed(b"array", TypeHint::Array)
                            .default(Val::array(Default::default())),
                    )
                    .param(NativeParamInfo::typed(b"flags", TypeHint::Int).default(0i64)),
            )
            .method(b"count", NativeMethodEntry::public().returns(TypeHint::Int))
            .method(b"current", NativeMethodEntry::public().returns(TypeHint::Mixed))
            .method(b"key", NativeMethodEntry::public())
            .method(b"next", NativeMethodEntry::public().returns(TypeHint::Void))
            .method(b"rewind", NativeMethodEntry::public().returns(TypeHint::Void))
            .method(b"valid", NativeMethodEntry::public().returns(TypeHint::Bool))
            .method(
                b"offsetExists",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"key", TypeHint::Mixed))
                    .returns(TypeHint::Bool),
            )
            .method(
                b"offsetGet",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"key", TypeHint::Mixed))
                    .returns(TypeHint::Mixed),
            )
            .method(
                b"offsetSet",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"key", TypeHint::Mixed))
                    .param(NativeParamInfo::typed(b"value", TypeHint::Mixed))
                    .returns(TypeHint::Void),
            )
            .method(
                b"offsetUnset",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"key", TypeHint::Mixed))
                    .returns(TypeHint::Void),
            )
            .method(b"serialize", NativeMethodEntry::public())
            .method(
                b"unserialize",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"data", TypeHint::String)),
            )
            .method(
                b"uasort",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"callback", TypeHint::Callable))
                    .returns(TypeHint::True),
            ),
    );
}

fn register_constants(registry: &mut ExtensionRegistry) {
    registry.register_constant(b"E_ERROR", 1i64);
    registry.register_constant(b"E_WARNING", 2i64);
    registry.register_constant(b"E_PARSE", 4i64);
    registry.register_constant(b"E_NOTICE", 8i64);
    registry.register_constant(b"E_CORE_ERROR", 16i64);
    registry.register_constant(b"E_CORE_WARNING", 32i64);
    registry.register_constant(b"E_COMPILE_ERROR", 64i64);
    registry.register_constant(b"E_COMPILE_WARNING", 128i64);
    registry.register_constant(b"E_USER_ERROR", 256i64);
    registry.register_constant(b"E_USER_WARNING", 512i64);
    registry.register_constant(b"E_USER_NOTICE", 1024i64);
    registry.register_constant(b"E_STRICT", 2048i64);
    registry.register_constant(b"E_RECOVERABLE_ERROR", 4096i64);
    registry.register_constant(b"E_DEPRECATED", 8192i64);
    registry.register_constant(b"E_USER_DEPRECATED", 16384i64);
    registry.register_constant(b"E_ALL", 32767i64);

    registry.register_constant(b"TRUE", true);
    registry.register_constant(b"FALSE", false);
    registry.register_constant(b"NULL", Val::Null);
    registry.register_constant(b"ZEND_THREAD_SAFE", false);
    registry.register_constant(b"ZEND_DEBUG_BUILD", false);

    registry.register_constant(b"PHP_VERSION", "8.3.0");
    registry.register_constant(b"PHP_MAJOR_VERSION", 8i64);
    registry.register_constant(b"PHP_MINOR_VERSION", 3i64);
    registry.register_constant(b"PHP_EOL", "\n");
    registry.register_constant(b"PHP_INT_MAX", i64::MAX);
    registry.register_constant(b"PHP_INT_MIN", i64::MIN);
    registry.register_constant(b"PHP_INT_SIZE", 8i64);
    registry.register_constant(b"PHP_FLOAT_EPSILON", f64::EPSILON);
    registry.register_constant(b"PHP_FLOAT_MAX", f64::MAX);
    registry.register_constant(b"PHP_FLOAT_DIG", 15i64);
    registry.register_constant(b"PHP_OS_FAMILY", std::env::consts::OS);
    registry.register_constant(b"DEFAULT_INCLUDE_PATH", ".:/usr/share/php");
}
