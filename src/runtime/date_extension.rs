/// Date/Time extension - the declared surface of PHP's ext/date
///
/// # Interfaces
/// - `DateTimeInterface` - common contract and the format constants
///
/// # Classes
/// - `DateTime`, `DateTimeImmutable` - date/time representations
/// - `DateTimeZone` - timezone representation
/// - `DateInterval` - time interval specification
/// - `DatePeriod` - iterator for recurring dates
///
/// # Exceptions
/// - `DateError` with `DateObjectError`, `DateRangeError`
/// - `DateException` with `DateInvalidTimeZoneException`,
///   `DateMalformedStringException`, `DateMalformedIntervalStringException`
use crate::core::value::{Val, Visibility};
use crate::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
use crate::runtime::registry::{
    ExtensionRegistry, NativeClassDef, NativeFunctionDef, NativeMethodEntry, NativeParamInfo,
    NativePropertyEntry, NativeType, TypeHint,
};

/// Format strings shared by the `DATE_*` constants and `DateTimeInterface`
const FORMATS: &[(&str, &str)] = &[
    ("ATOM", "Y-m-d\\TH:i:sP"),
    ("COOKIE", "l, d-M-Y H:i:s T"),
    ("ISO8601", "Y-m-d\\TH:i:sO"),
    ("ISO8601_EXPANDED", "X-m-d\\TH:i:sP"),
    ("RFC822", "D, d M y H:i:s O"),
    ("RFC850", "l, d-M-y H:i:s T"),
    ("RFC1036", "D, d M y H:i:s O"),
    ("RFC1123", "D, d M Y H:i:s O"),
    ("RFC7231", "D, d M Y H:i:s \\G\\M\\T"),
    ("RFC2822", "D, d M Y H:i:s O"),
    ("RFC3339", "Y-m-d\\TH:i:sP"),
    ("RFC3339_EXTENDED", "Y-m-d\\TH:i:s.vP"),
    ("RSS", "D, d M Y H:i:s O"),
    ("W3C", "Y-m-d\\TH:i:sP"),
];

const TIMEZONE_GROUPS: &[(&str, i64)] = &[
    ("AFRICA", 1),
    ("AMERICA", 2),
    ("ANTARCTICA", 4),
    ("ARCTIC", 8),
    ("ASIA", 16),
    ("ATLANTIC", 32),
    ("AUSTRALIA", 64),
    ("EUROPE", 128),
    ("INDIAN", 256),
    ("PACIFIC", 512),
    ("UTC", 1024),
    ("ALL", 2047),
    ("ALL_WITH_BC", 4095),
    ("PER_COUNTRY", 4096),
];

pub struct DateExtension;

impl Extension for DateExtension {
    fn info(&self) -> ExtensionInfo {
        ExtensionInfo {
            name: "date",
            version: "8.3.0",
            dependencies: &["Core"],
        }
    }

    fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
        for (name, format) in FORMATS {
            registry.register_constant(format!("DATE_{name}").as_bytes(), *format);
        }
        registry.register_constant(b"SUNFUNCS_RET_TIMESTAMP", 0i64);
        registry.register_constant(b"SUNFUNCS_RET_STRING", 1i64);
        registry.register_constant(b"SUNFUNCS_RET_DOUBLE", 2i64);

        register_functions(registry);
        register_classes(registry);
        register_exceptions(registry);

        ExtensionResult::Success
    }
}

fn timezone() -> NativeType {
    TypeHint::class(b"DateTimeZone").nullable()
}

fn register_functions(registry: &mut ExtensionRegistry) {
    registry.register_function(
        NativeFunctionDef::new(b"strtotime")
            .param(NativeParamInfo::typed(b"datetime", TypeHint::String))
            .param(
                NativeParamInfo::typed(b"baseTimestamp", TypeHint::Int.nullable())
                    .default(Val::Null),
            ),
    );
    registry.register_function(
        NativeFunctionDef::new(b"date")
            .param(NativeParamInfo::typed(b"format", TypeHint::String))
            .param(
                NativeParamInfo::typed(b"timestamp", TypeHint::Int.nullable()).default(Val::Null),
            )
            .returns(TypeHint::String),
    );
    registry.register_function(
        NativeFunctionDef::new(b"gmdate")
            .param(NativeParamInfo::typed(b"format", TypeHint::String))
            .param(
                NativeParamInfo::typed(b"timestamp", TypeHint::Int.nullable()).default(Val::Null),
            )
            .returns(TypeHint::String),
    );
    registry.register_function(
        NativeFunctionDef::new(b"mktime")
            .param(NativeParamInfo::typed(b"hour", TypeHint::Int))
            .param(NativeParamInfo::typed(b"minute", TypeHint::Int.nullable()).default(Val::Null))
            .param(NativeParamInfo::typed(b"second", TypeHint::Int.nullable()).default(Val::Null))
            .param(NativeParamInfo::typed(b"month", TypeHint::Int.nullable()).default(Val::Null))
            .param(NativeParamInfo::typed(b"day", TypeHint::Int.nullable()).default(Val::Null))
            .param(NativeParamInfo::typed(b"year", TypeHint::Int.nullable()).default(Val::Null)),
    );
    registry.register_function(
        NativeFunctionDef::new(b"checkdate")
            .param(NativeParamInfo::typed(b"month", TypeHint::Int))
            .param(NativeParamInfo::typed(b"day", TypeHint::Int))
            .param(NativeParamInfo::typed(b"year", TypeHint::Int))
            .returns(TypeHint::Bool),
    );
    registry.register_function(NativeFunctionDef::new(b"time").returns(TypeHint::Int));
    registry.register_function(
        NativeFunctionDef::new(b"localtime")
            .param(
                NativeParamInfo::typed(b"timestamp", TypeHint::Int.nullable()).default(Val::Null),
            )
            .param(NativeParamInfo::typed(b"associative", TypeHint::Bool).default(false))
            .returns(TypeHint::Array),
    );
    registry.register_function(
        NativeFunctionDef::new(b"date_create")
            .param(NativeParamInfo::typed(b"datetime", TypeHint::String).default("now"))
            .param(NativeParamInfo::typed(b"timezone", timezone()).default(Val::Null)),
    );
    registry.register_function(
        NativeFunctionDef::new(b"date_default_timezone_set")
            .param(NativeParamInfo::typed(b"timezoneId", TypeHint::String))
            .returns(TypeHint::Bool),
    );
    registry.register_function(
        NativeFunctionDef::new(b"date_default_timezone_get").returns(TypeHint::String),
    );
    registry.register_function(
        NativeFunctionDef::new(b"date_sunrise")
            .param(NativeParamInfo::typed(b"timestamp", TypeHint::Int))
            .param(NativeParamInfo::typed(b"returnFormat", TypeHint::Int).default(1i64))
            .param(
                NativeParamInfo::typed(b"latitude", TypeHint::Float.nullable()).default(Val::Null),
            )
            .param(
                NativeParamInfo::typed(b"longitude", TypeHint::Float.nullable()).default(Val::Null),
            )
            .param(NativeParamInfo::typed(b"zenith", TypeHint::Float.nullable()).default(Val::Null))
            .param(
                NativeParamInfo::typed(b"utcOffset", TypeHint::Float.nullable()).default(Val::Null),
            ),
    );
}

/// Methods `DateTime` and `DateTimeImmutable` both declare
fn date_time_class(name: &[u8]) -> NativeClassDef {
    NativeClassDef::new_class(name)
        .implements(&[b"DateTimeInterface"])
        .method(
            b"__construct",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"datetime", TypeHint::String).default("now"))
                .param(NativeParamInfo::typed(b"timezone", timezone()).default(Val::Null)),
        )
        .method(b"__wakeup", NativeMethodEntry::public().returns(TypeHint::Void))
        .method(
            b"__set_state",
            NativeMethodEntry::public()
                .static_method()
                .param(NativeParamInfo::typed(b"array", TypeHint::Array))
                .returns(TypeHint::class(name)),
        )
        .method(
            b"createFromFormat",
            NativeMethodEntry::public()
                .static_method()
                .param(NativeParamInfo::typed(b"format", TypeHint::String))
                .param(NativeParamInfo::typed(b"datetime", TypeHint::String))
                .param(NativeParamInfo::typed(b"timezone", timezone()).default(Val::Null)),
        )
        .method(
            b"format",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"format", TypeHint::String))
                .returns(TypeHint::String),
        )
        .method(
            b"modify",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"modifier", TypeHint::String)),
        )
        .method(
            b"add",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"interval", TypeHint::class(b"DateInterval")))
                .returns(TypeHint::Static),
        )
        .method(
            b"sub",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"interval", TypeHint::class(b"DateInterval")))
                .returns(TypeHint::Static),
        )
        .method(b"getTimezone", NativeMethodEntry::public())
        .method(
            b"setTimezone",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"timezone", TypeHint::class(b"DateTimeZone")))
                .returns(TypeHint::Static),
        )
        .method(b"getOffset", NativeMethodEntry::public().returns(TypeHint::Int))
        .method(b"getTimestamp", NativeMethodEntry::public().returns(TypeHint::Int))
        .method(
            b"setTimestamp",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"timestamp", TypeHint::Int))
                .returns(TypeHint::Static),
        )
        .method(
            b"diff",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(
                    b"targetObject",
                    TypeHint::class(b"DateTimeInterface"),
                ))
                .param(NativeParamInfo::typed(b"absolute", TypeHint::Bool).default(false))
                .returns(TypeHint::class(b"DateInterval")),
        )
}

fn register_classes(registry: &mut ExtensionRegistry) {
    let mut interface = NativeClassDef::new_interface(b"DateTimeInterface");
    for (name, format) in FORMATS {
        interface = interface.constant(name.as_bytes(), *format, Visibility::Public);
    }
    registry.register_class(
        interface
            .method(
                b"format",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"format", TypeHint::String))
                    .returns(TypeHint::String),
            )
            .method(b"getTimezone", NativeMethodEntry::public())
            .method(b"getOffset", NativeMethodEntry::public().returns(TypeHint::Int))
            .method(b"getTimestamp", NativeMethodEntry::public().returns(TypeHint::Int))
            .method(
                b"diff",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(
                        b"targetObject",
                        TypeHint::class(b"DateTimeInterface"),
                    ))
                    .param(NativeParamInfo::typed(b"absolute", TypeHint::Bool).default(false))
                    .returns(TypeHint::class(b"DateInterval")),
            )
            .method(b"__wakeup", NativeMethodEntry::public().returns(TypeHint::Void)),
    );

    registry.register_class(date_time_class(b"DateTime").method(
        b"createFromImmutable",
        NativeMethodEntry::public()
            .static_method()
            .param(NativeParamInfo::typed(
                b"object",
                TypeHint::class(b"DateTimeImmutable"),
            ))
            .returns(TypeHint::Static),
    ));

    registry.register_class(date_time_class(b"DateTimeImmutable").method(
        b"createFromMutable",
        NativeMethodEntry::public()
            .static_method()
            .param(NativeParamInfo::typed(b"object", TypeHint::class(b"DateTime")))
            .returns(TypeHint::Static),
    ));

    let mut zone = NativeClassDef::new_class(b"DateTimeZone");
    for (name, value) in TIMEZONE_GROUPS {
        zone = zone.constant(name.as_bytes(), *value, Visibility::Public);
    }
    registry.register_class(
        zone.method(
            b"__construct",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(b"timezone", TypeHint::String)),
        )
        .method(b"getName", NativeMethodEntry::public().returns(TypeHint::String))
        .method(
            b"getOffset",
            NativeMethodEntry::public()
                .param(NativeParamInfo::typed(
                    b"datetime",
                    TypeHint::class(b"DateTimeInterface"),
                ))
                .returns(TypeHint::Int),
        )
        .method(
            b"listIdentifiers",
            NativeMethodEntry::public()
                .static_method()
                .param(NativeParamInfo::typed(b"timezoneGroup", TypeHint::Int).default(2047i64))
                .param(
                    NativeParamInfo::typed(b"countryCode", TypeHint::String.nullable())
                        .default(Val::Null),
                )
                .returns(TypeHint::Array),
        ),
    );

    let mut interval = NativeClassDef::new_class(b"DateInterval");
    for field in [&b"y"[..], b"m", b"d", b"h", b"i", b"s"] {
        interval = interval.property(field, NativePropertyEntry::public().typed(TypeHint::Int));
    }
    registry.register_class(
        interval
            .property(b"f", NativePropertyEntry::public().typed(TypeHint::Float))
            .property(b"invert", NativePropertyEntry::public().typed(TypeHint::Int))
            .property(b"days", NativePropertyEntry::public())
            .property(b"from_string", NativePropertyEntry::public().typed(TypeHint::Bool))
            .method(
                b"__construct",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"duration", TypeHint::String)),
            )
            .method(
                b"createFromDateString",
                NativeMethodEntry::public()
                    .static_method()
                    .param(NativeParamInfo::typed(b"datetime", TypeHint::String)),
            )
            .method(
                b"format",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::typed(b"format", TypeHint::String))
                    .returns(TypeHint::String),
            ),
    );

    registry.register_class(
        NativeClassDef::new_class(b"DatePeriod")
            .implements(&[b"IteratorAggregate"])
            .constant(b"EXCLUDE_START_DATE", 1i64, Visibility::Public)
            .constant(b"INCLUDE_END_DATE", 2i64, Visibility::Public)
            .property(
                b"start",
                NativePropertyEntry::public()
                    .typed(TypeHint::class(b"DateTimeInterface").nullable()),
            )
            .property(
                b"current",
                NativePropertyEntry::public()
                    .typed(TypeHint::class(b"DateTimeInterface").nullable()),
            )
            .property(
                b"end",
                NativePropertyEntry::public()
                    .typed(TypeHint::class(b"DateTimeInterface").nullable()),
            )
            .property(
                b"interval",
                NativePropertyEntry::public().typed(TypeHint::class(b"DateInterval").nullable()),
            )
            .property(b"recurrences", NativePropertyEntry::public().typed(TypeHint::Int))
            .property(b"include_start_date", NativePropertyEntry::public().typed(TypeHint::Bool))
            .property(b"include_end_date", NativePropertyEntry::public().typed(TypeHint::Bool))
            .method(
                b"__construct",
                NativeMethodEntry::public()
                    .param(NativeParamInfo::new(b"start"))
                    .param(NativeParamInfo::new(b"interval").optional())
                    .param(NativeParamInfo::new(b"end").optional())
                    .param(NativeParamInfo::new(b"options").optional()),
            )
            .method(
                b"getStartDate",
                NativeMethodEntry::public().returns(TypeHint::class(b"DateTimeInterface")),
            )
            .method(
                b"getEndDate",
                NativeMethodEntry::public()
                    .returns(TypeHint::class(b"DateTimeInterface").nullable()),
            )
            .method(
                b"getDateInterval",
                NativeMethodEntry::public().returns(TypeHint::class(b"DateInterval")),
            )
            .method(
                b"getRecurrences",
                NativeMethodEntry::public().returns(TypeHint::Int.nullable()),
            )
            .method(
                b"getIterator",
                NativeMethodEntry::public().returns(TypeHint::class(b"Iterator")),
            ),
    );
}

fn register_exceptions(registry: &mut ExtensionRegistry) {
    let hierarchy: [(&[u8], &[u8]); 8] = [
        (b"DateError", b"Error"),
        (b"DateObjectError", b"DateError"),
        (b"DateRangeError", b"DateError"),
        (b"DateException", b"Exception"),
        (b"DateInvalidTimeZoneException", b"DateException"),
        (b"DateInvalidOperationException", b"DateException"),
        (b"DateMalformedStringException", b"DateException"),
        (b"DateMalformedIntervalStringException", b"DateException"),
    ];
    for (name, parent) in hierarchy {
        registry.register_class(NativeClassDef::new_class(name).extends(parent));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::EngineBuilder;

    #[test]
    fn test_date_extension_registration() {
        let engine = EngineBuilder::new()
            .with_core_extensions()
            .with_extension(DateExtension)
            .build()
            .expect("Failed to build engine with date extension");

        let module = engine.registry.get_module("date").unwrap();
        assert!(module.classes.contains(&b"datetimeinterface".to_vec()));
        assert!(!module.classes.contains(&b"exception".to_vec()));

        assert_eq!(
            engine.registry.get_constant(b"DATE_ATOM"),
            Some(&Val::string("Y-m-d\\TH:i:sP"))
        );

        let interface = engine.registry.get_class(b"DateTimeInterface").unwrap();
        assert_eq!(interface.constants.len(), FORMATS.len());
    }
}
