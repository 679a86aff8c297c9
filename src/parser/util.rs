use crate::parser::ast::NumberLiteralType;

/// Cooks the escape sequences of a string or template chunk.
pub fn unescape(raw: &str) -> Result<String, String> {
    let mut s = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            s.push(c);
            continue;
        }
        let esc = match chars.next() {
            Some(e) => e,
            None => return Err("Invalid escape at end of string".to_string()),
        };
        match esc {
            'n' => s.push('\n'),
            't' => s.push('\t'),
            'r' => s.push('\r'),
            'b' => s.push('\u{8}'),
            'f' => s.push('\u{c}'),
            'v' => s.push('\u{b}'),
            '0' => s.push('\0'),
            // Line continuation.
            '\n' => {}
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                s.push(code_point(&hex)?);
            }
            'u' => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    let hex: String = chars.by_ref().take_while(|c| *c != '}').collect();
                    hex
                } else {
                    chars.by_ref().take(4).collect()
                };
                s.push(code_point(&hex)?);
            }
            other => s.push(other),
        }
    }
    Ok(s)
}

fn code_point(hex: &str) -> Result<char, String> {
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(std::char::from_u32)
        .ok_or_else(|| format!("Invalid escape sequence '{}'", hex))
}

/// Property key text for a numeric literal key, as `String(n)` would print it.
pub fn format_number_key(n: &NumberLiteralType) -> String {
    match n {
        NumberLiteralType::IntegerLiteral(i) => i.to_string(),
        NumberLiteralType::FloatLiteral(f) => {
            if f.fract() == 0.0 && f.abs() < 1e21 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
    }
}
