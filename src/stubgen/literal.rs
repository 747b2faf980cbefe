//! PHP source literals in `var_export()` form
//! Reference: $PHP_SRC_PATH/ext/standard/var.c - php_var_export_ex

use crate::core::value::{ArrayKey, Val};

/// Render a value exactly as `var_export($value, true)` would
pub fn export(value: &Val) -> String {
    let mut output = String::new();
    export_value(value, 1, &mut output);
    output
}

fn push_spaces(output: &mut String, count: usize) {
    output.extend(std::iter::repeat_n(' ', count));
}

fn export_value(value: &Val, level: usize, output: &mut String) {
    match value {
        Val::Null => output.push_str("NULL"),
        Val::Bool(b) => output.push_str(if *b { "true" } else { "false" }),
        Val::Int(i) => export_int(*i, output),
        Val::Float(f) => export_float(*f, output),
        Val::String(s) => export_string(s, output),
        Val::Array(arr) => {
            if level > 1 {
                output.push('\n');
                push_spaces(output, level - 1);
            }
            output.push_str("array (\n");
            for (key, item) in arr.map.iter() {
                push_spaces(output, level + 1);
                match key {
                    ArrayKey::Int(i) => export_int(*i, output),
                    ArrayKey::Str(s) => export_string(s, output),
                }
                output.push_str(" => ");
                export_value(item, level + 2, output);
                output.push_str(",\n");
            }
            if level > 1 {
                push_spaces(output, level - 1);
            }
            output.push(')');
        }
    }
}

fn export_int(i: i64, output: &mut String) {
    // PHP_INT_MIN has no positive counterpart to negate
    if i == i64::MIN {
        output.push_str("-9223372036854775807-1");
    } else {
        output.push_str(&i.to_string());
    }
}

/// Single-quoted string; NUL and bytes outside UTF-8 are spliced in as
/// double-quoted escapes
fn export_string(bytes: &[u8], output: &mut String) {
    output.push('\'');
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '\\' => output.push_str("\\\\"),
                '\'' => output.push_str("\\'"),
                '\0' => output.push_str("' . \"\\0\" . '"),
                c => output.push(c),
            }
        }
        if !chunk.invalid().is_empty() {
            output.push_str("' . \"");
            for byte in chunk.invalid() {
                output.push_str(&format!("\\x{byte:02X}"));
            }
            output.push_str("\" . '");
        }
    }
    output.push('\'');
}

/// Shortest round-trip digits laid out like zend_gcvt with 17 significant digits
/// Reference: $PHP_SRC_PATH/main/snprintf.c - php_gcvt
fn export_float(f: f64, output: &mut String) {
    if f.is_nan() {
        output.push_str("NAN");
        return;
    }
    if f.is_infinite() {
        output.push_str(if f > 0.0 { "INF" } else { "-INF" });
        return;
    }

    let scientific = format!("{:e}", f);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: Vec<char> = mantissa.chars().filter(|c| *c != '.').collect();
    let decpt = exponent + 1;

    if negative {
        output.push('-');
    }

    if decpt < -3 || decpt > 17 {
        output.push(digits[0]);
        output.push('.');
        if digits.len() > 1 {
            output.extend(&digits[1..]);
        } else {
            output.push('0');
        }
        output.push('E');
        output.push(if exponent < 0 { '-' } else { '+' });
        output.push_str(&exponent.unsigned_abs().to_string());
    } else if decpt <= 0 {
        output.push_str("0.");
        push_zeros(output, decpt.unsigned_abs() as usize);
        output.extend(&digits);
    } else {
        let int_len = decpt as usize;
        for i in 0..int_len {
            output.push(digits.get(i).copied().unwrap_or('0'));
        }
        output.push('.');
        if digits.len() > int_len {
            output.extend(&digits[int_len..]);
        } else {
            output.push('0');
        }
    }
}

fn push_zeros(output: &mut String, count: usize) {
    output.extend(std::iter::repeat_n('0', count));
}

#[cfg(test)]
pub(crate) mod reader {
    //! Just enough of a PHP literal parser to read back what `export` writes

    use crate::core::value::{ArrayData, ArrayKey, Val};

    pub fn parse(text: &str) -> Result<Val, String> {
        let mut reader = Reader { src: text.as_bytes(), pos: 0 };
        let value = reader.value()?;
        reader.skip_ws();
        if reader.pos != reader.src.len() {
            return Err(format!("trailing input at {}", reader.pos));
        }
        Ok(value)
    }

    struct Reader<'a> {
        src: &'a [u8],
        pos: usize,
    }

    impl Reader<'_> {
        fn skip_ws(&mut self) {
            while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
        }

        fn eat(&mut self, token: &str) -> bool {
            self.skip_ws();
            if self.src[self.pos..].starts_with(token.as_bytes()) {
                self.pos += token.len();
                true
            } else {
                false
            }
        }

        fn expect(&mut self, token: &str) -> Result<(), String> {
            if self.eat(token) {
                Ok(())
            } else {
                Err(format!("expected `{token}` at {}", self.pos))
            }
        }

        fn value(&mut self) -> Result<Val, String> {
            self.skip_ws();
            if self.eat("NULL") {
                Ok(Val::Null)
            } else if self.eat("true") {
                Ok(Val::Bool(true))
            } else if self.eat("false") {
                Ok(Val::Bool(false))
            } else if self.eat("INF") {
                Ok(Val::Float(f64::INFINITY))
            } else if self.eat("-INF") {
                Ok(Val::Float(f64::NEG_INFINITY))
            } else if self.eat("NAN") {
                Ok(Val::Float(f64::NAN))
            } else if self.eat("array (") {
                self.array()
            } else if self.src.get(self.pos) == Some(&b'\'') {
                Ok(Val::String(self.string()?.into()))
            } else {
                self.number()
            }
        }

        fn array(&mut self) -> Result<Val, String> {
            let mut data = ArrayData::new();
            while !self.eat(")") {
                self.skip_ws();
                let key = match self.value()? {
                    Val::Int(i) => ArrayKey::Int(i),
                    Val::String(s) => ArrayKey::Str(s),
                    other => return Err(format!("invalid key {other:?}")),
                };
                self.expect("=>")?;
                let value = self.value()?;
                self.expect(",")?;
                data.insert(key, value);
            }
            Ok(Val::array(data))
        }

        /// A quoted string, possibly spliced with `. "\0" .` or `. "\xNN" .` segments
        fn string(&mut self) -> Result<Vec<u8>, String> {
            let mut bytes = Vec::new();
            loop {
                self.expect("'")?;
                loop {
                    match self.src.get(self.pos) {
                        None => return Err("unterminated string".into()),
                        Some(b'\'') => break,
                        Some(b'\\')
                            if matches!(self.src.get(self.pos + 1), Some(b'\\' | b'\'')) =>
                        {
                            bytes.push(self.src[self.pos + 1]);
                            self.pos += 2;
                        }
                        Some(&b) => {
                            bytes.push(b);
                            self.pos += 1;
                        }
                    }
                }
                self.pos += 1;
                if !self.eat(". \"") {
                    return Ok(bytes);
                }
                self.splice(&mut bytes)?;
                self.expect(".")?;
            }
        }

        /// Escapes of a double-quoted splice up to its closing quote
        fn splice(&mut self, bytes: &mut Vec<u8>) -> Result<(), String> {
            loop {
                match (self.src.get(self.pos), self.src.get(self.pos + 1)) {
                    (Some(b'"'), _) => {
                        self.pos += 1;
                        return Ok(());
                    }
                    (Some(b'\\'), Some(b'0')) => {
                        bytes.push(0);
                        self.pos += 2;
                    }
                    (Some(b'\\'), Some(b'x')) => {
                        let hex = self
                            .src
                            .get(self.pos + 2..self.pos + 4)
                            .ok_or("truncated escape")?;
                        let hex = std::str::from_utf8(hex).map_err(|e| e.to_string())?;
                        bytes.push(u8::from_str_radix(hex, 16).map_err(|e| e.to_string())?);
                        self.pos += 4;
                    }
                    _ => return Err(format!("bad splice at {}", self.pos)),
                }
            }
        }

        fn number(&mut self) -> Result<Val, String> {
            let start = self.pos;
            while self.pos < self.src.len()
                && matches!(self.src[self.pos], b'0'..=b'9' | b'-' | b'+' | b'.' | b'E')
            {
                self.pos += 1;
            }
            let text = std::str::from_utf8(&self.src[start..self.pos]).map_err(|e| e.to_string())?;
            if text == "-9223372036854775807-1" {
                return Ok(Val::Int(i64::MIN));
            }
            if text.contains(['.', 'E']) {
                text.parse::<f64>().map(Val::Float).map_err(|e| format!("{text}: {e}"))
            } else {
                text.parse::<i64>().map(Val::Int).map_err(|e| format!("{text}: {e}"))
            }
        }
    }
}
