use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Ordered PHP array with its auto-increment cursor
/// Reference: $PHP_SRC_PATH/Zend/zend_hash.h - HashTable::nNextFreeElement
#[derive(Debug, Clone, Default)]
pub struct ArrayData {
    pub map: IndexMap<ArrayKey, Val>,
    pub next_free: i64,
}

impl ArrayData {
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
            next_free: 0,
        }
    }

    /// Insert a key-value pair and update next_free if needed
    /// Reference: $PHP_SRC_PATH/Zend/zend_hash.c - _zend_hash_index_add_or_update_i
    pub fn insert(&mut self, key: ArrayKey, value: Val) -> Option<Val> {
        if let ArrayKey::Int(i) = &key {
            if *i >= self.next_free {
                self.next_free = i + 1;
            }
        }
        self.map.insert(key, value)
    }

    /// Append a value with auto-incremented key
    pub fn push(&mut self, value: Val) {
        let key = ArrayKey::Int(self.next_free);
        self.next_free += 1;
        self.map.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// True when keys are exactly 0..n in order (a PHP "list")
    pub fn is_list(&self) -> bool {
        self.map
            .keys()
            .enumerate()
            .all(|(i, key)| matches!(key, ArrayKey::Int(k) if *k == i as i64))
    }
}

impl FromIterator<Val> for ArrayData {
    fn from_iter<I: IntoIterator<Item = Val>>(iter: I) -> Self {
        let mut array = ArrayData::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

impl FromIterator<(ArrayKey, Val)> for ArrayData {
    fn from_iter<I: IntoIterator<Item = (ArrayKey, Val)>>(iter: I) -> Self {
        let mut array = ArrayData::new();
        for (key, value) in iter {
            array.insert(key, value);
        }
        array
    }
}

impl PartialEq for ArrayData {
    fn eq(&self, other: &Self) -> bool {
        // next_free is cached metadata
        self.map == other.map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum ArrayKey {
    Int(i64),
    Str(Rc<Vec<u8>>),
}

impl ArrayKey {
    /// Build a key the way PHP normalises string offsets: canonical decimal
    /// integers become integer keys.
    /// Reference: $PHP_SRC_PATH/Zend/zend_hash.h - ZEND_HANDLE_NUMERIC_STR
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if let Some(i) = canonical_int(bytes) {
            ArrayKey::Int(i)
        } else {
            ArrayKey::Str(Rc::new(bytes.to_vec()))
        }
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        ArrayKey::from_bytes(s.as_bytes())
    }
}

impl From<i64> for ArrayKey {
    fn from(i: i64) -> Self {
        ArrayKey::Int(i)
    }
}

fn canonical_int(bytes: &[u8]) -> Option<i64> {
    let s = std::str::from_utf8(bytes).ok()?;
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if s == "-0" {
        return None;
    }
    s.parse::<i64>().ok()
}

/// A PHP value as reported by reflection (constants, defaults)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Val {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Rc<Vec<u8>>), // PHP strings are byte arrays
    Array(Rc<ArrayData>),
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Null, Val::Null) => true,
            (Val::Bool(a), Val::Bool(b)) => a == b,
            (Val::Int(a), Val::Int(b)) => a == b,
            (Val::Float(a), Val::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Val::String(a), Val::String(b)) => a == b,
            (Val::Array(a), Val::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Val {
    pub fn string(s: impl AsRef<[u8]>) -> Self {
        Val::String(Rc::new(s.as_ref().to_vec()))
    }

    pub fn array(data: ArrayData) -> Self {
        Val::Array(Rc::new(data))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Null => "null",
            Val::Bool(_) => "bool",
            Val::Int(_) => "int",
            Val::Float(_) => "float",
            Val::String(_) => "string",
            Val::Array(_) => "array",
        }
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<i64> for Val {
    fn from(i: i64) -> Self {
        Val::Int(i)
    }
}

impl From<f64> for Val {
    fn from(f: f64) -> Self {
        Val::Float(f)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::string(s)
    }
}

impl From<serde_json::Value> for Val {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Val::Null,
            Value::Bool(b) => Val::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Val::Int(i),
                None => Val::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Val::string(s),
            Value::Array(items) => Val::array(items.into_iter().map(Val::from).collect()),
            Value::Object(entries) => Val::array(
                entries
                    .into_iter()
                    .map(|(k, v)| (ArrayKey::from(k.as_str()), Val::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Val> for serde_json::Value {
    fn from(value: Val) -> Self {
        use serde_json::Value;
        match value {
            Val::Null => Value::Null,
            Val::Bool(b) => Value::Bool(b),
            Val::Int(i) => Value::from(i),
            // Non-finite floats have no JSON form and serialise as null
            Val::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Val::String(s) => Value::String(String::from_utf8_lossy(&s).into_owned()),
            Val::Array(arr) => {
                if arr.is_list() {
                    Value::Array(arr.map.values().cloned().map(Value::from).collect())
                } else {
                    Value::Object(
                        arr.map
                            .iter()
                            .map(|(k, v)| {
                                let key = match k {
                                    ArrayKey::Int(i) => i.to_string(),
                                    ArrayKey::Str(s) => String::from_utf8_lossy(s).into_owned(),
                                };
                                (key, Value::from(v.clone()))
                            })
                            .collect(),
                    )
                }
            }
        }
    }
}
