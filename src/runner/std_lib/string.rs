//! String built-in.
//!
//! Provides the callable `String` global and the methods reachable from
//! string values. Indices and lengths count UTF-16 code units, matching what
//! the browser reports for the same expression. Pattern arguments are plain
//! strings; regular expressions are not part of the expression language.

use std::cmp::Ordering;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{to_integer, to_js_string, to_number, to_uint32};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::function::is_callable;
use crate::runner::eval::types::{Abrupt, ValueResult};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::{arg, arg_number, check_string_length, relative_index};

/// Register the String built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let string = BuiltInObject::new("String")
        .with_call(string_call)
        .add_method("fromCharCode", string_from_char_code)
        .add_prototype_method("toUpperCase", string_to_upper_case)
        .add_prototype_method("toLowerCase", string_to_lower_case)
        .add_prototype_method("trim", string_trim)
        .add_prototype_method("trimStart", string_trim_start)
        .add_prototype_method("trimEnd", string_trim_end)
        .add_prototype_method("includes", string_includes)
        .add_prototype_method("startsWith", string_starts_with)
        .add_prototype_method("endsWith", string_ends_with)
        .add_prototype_method("indexOf", string_index_of)
        .add_prototype_method("lastIndexOf", string_last_index_of)
        .add_prototype_method("slice", string_slice)
        .add_prototype_method("substring", string_substring)
        .add_prototype_method("split", string_split)
        .add_prototype_method("replace", string_replace)
        .add_prototype_method("replaceAll", string_replace_all)
        .add_prototype_method("padStart", string_pad_start)
        .add_prototype_method("padEnd", string_pad_end)
        .add_prototype_method("repeat", string_repeat)
        .add_prototype_method("charAt", string_char_at)
        .add_prototype_method("charCodeAt", string_char_code_at)
        .add_prototype_method("at", string_at)
        .add_prototype_method("concat", string_concat)
        .add_prototype_method("localeCompare", string_locale_compare)
        .add_prototype_method("toString", string_to_string);

    registry.register_object(string);
}

// ============================================================================
// UTF-16 helpers
// ============================================================================

fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

fn this_string(this: &JsValue) -> String {
    to_js_string(this)
}

/// Position of `needle` in `hay` at or after `from`.
fn find_units(hay: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if from > hay.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    hay[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn rfind_units(hay: &[u16], needle: &[u16]) -> Option<usize> {
    if needle.is_empty() {
        return Some(hay.len());
    }
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .rev()
        .find(|&i| &hay[i..i + needle.len()] == needle)
}

/// Argument `i` as a position clamped to `0..=len`, or `default`.
fn position_arg(args: &[JsValue], i: usize, len: usize, default: usize) -> usize {
    match args.get(i) {
        None | Some(JsValue::Undefined) => default,
        Some(v) => to_integer(v).clamp(0.0, len as f64) as usize,
    }
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

// ============================================================================
// Global
// ============================================================================

/// String(value)
fn string_call(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::String(match args.first() {
        Some(v) => to_js_string(v),
        None => String::new(),
    }))
}

/// String.fromCharCode(...codes)
fn string_from_char_code(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let codes: Vec<u16> = (0..args.len())
        .map(|i| to_uint32(arg_number(&args, i)) as u16)
        .collect();
    Ok(JsValue::String(from_units(&codes)))
}

// ============================================================================
// Case and whitespace
// ============================================================================

fn string_to_upper_case(_ctx: &mut EvalContext<'_>, this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::String(this_string(&this).to_uppercase()))
}

fn string_to_lower_case(_ctx: &mut EvalContext<'_>, this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::String(this_string(&this).to_lowercase()))
}

fn string_trim(_ctx: &mut EvalContext<'_>, this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::from(this_string(&this).trim_matches(is_js_whitespace)))
}

fn string_trim_start(_ctx: &mut EvalContext<'_>, this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::from(this_string(&this).trim_start_matches(is_js_whitespace)))
}

fn string_trim_end(_ctx: &mut EvalContext<'_>, this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::from(this_string(&this).trim_end_matches(is_js_whitespace)))
}

// ============================================================================
// Searching
// ============================================================================

/// String.prototype.includes(search, position)
fn string_includes(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let needle = units(&to_js_string(&arg(&args, 0)));
    let from = position_arg(&args, 1, s.len(), 0);
    Ok(JsValue::Boolean(find_units(&s, &needle, from).is_some()))
}

/// String.prototype.startsWith(search, position)
fn string_starts_with(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let needle = units(&to_js_string(&arg(&args, 0)));
    let from = position_arg(&args, 1, s.len(), 0);
    Ok(JsValue::Boolean(s[from..].starts_with(&needle)))
}

/// String.prototype.endsWith(search, endPosition)
fn string_ends_with(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let needle = units(&to_js_string(&arg(&args, 0)));
    let end = position_arg(&args, 1, s.len(), s.len());
    Ok(JsValue::Boolean(s[..end].ends_with(&needle)))
}

/// String.prototype.indexOf(search, fromIndex)
fn string_index_of(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let needle = units(&to_js_string(&arg(&args, 0)));
    let from = position_arg(&args, 1, s.len(), 0);
    Ok(JsValue::from(
        find_units(&s, &needle, from).map_or(-1, |i| i as i64),
    ))
}

/// String.prototype.lastIndexOf(search)
fn string_last_index_of(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let needle = units(&to_js_string(&arg(&args, 0)));
    Ok(JsValue::from(rfind_units(&s, &needle).map_or(-1, |i| i as i64)))
}

// ============================================================================
// Extraction
// ============================================================================

/// String.prototype.slice(start, end)
fn string_slice(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let start = relative_index(&args, 0, s.len(), 0);
    let end = relative_index(&args, 1, s.len(), s.len());
    if start >= end {
        return Ok(JsValue::from(""));
    }
    Ok(JsValue::String(from_units(&s[start..end])))
}

/// String.prototype.substring(start, end). Negative positions count as 0
/// and the bounds are swapped when reversed.
fn string_substring(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let a = position_arg(&args, 0, s.len(), 0);
    let b = position_arg(&args, 1, s.len(), s.len());
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    Ok(JsValue::String(from_units(&s[start..end])))
}

/// String.prototype.split(separator, limit)
fn string_split(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = this_string(&this);
    let limit = match arg(&args, 1) {
        JsValue::Undefined => u32::MAX as usize,
        l => to_uint32(to_number(&l)) as usize,
    };
    let parts: Vec<JsValue> = match arg(&args, 0) {
        JsValue::Undefined => vec![JsValue::String(s)],
        sep => {
            let sep = to_js_string(&sep);
            if sep.is_empty() {
                units(&s)
                    .iter()
                    .map(|u| JsValue::String(from_units(&[*u])))
                    .collect()
            } else {
                s.split(sep.as_str()).map(JsValue::from).collect()
            }
        }
    };
    Ok(JsValue::array(parts.into_iter().take(limit).collect()))
}

/// String.prototype.charAt(index)
fn string_char_at(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let idx = to_integer(&arg(&args, 0));
    if idx < 0.0 || idx >= s.len() as f64 {
        return Ok(JsValue::from(""));
    }
    Ok(JsValue::String(from_units(&s[idx as usize..idx as usize + 1])))
}

/// String.prototype.charCodeAt(index)
fn string_char_code_at(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let idx = to_integer(&arg(&args, 0));
    if idx < 0.0 || idx >= s.len() as f64 {
        return Ok(JsValue::from(f64::NAN));
    }
    Ok(JsValue::from(s[idx as usize] as i64))
}

/// String.prototype.at(index)
fn string_at(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let rel = to_integer(&arg(&args, 0));
    let idx = if rel < 0.0 { s.len() as f64 + rel } else { rel };
    if idx < 0.0 || idx >= s.len() as f64 {
        return Ok(JsValue::Undefined);
    }
    Ok(JsValue::String(from_units(&s[idx as usize..idx as usize + 1])))
}

// ============================================================================
// Building new strings
// ============================================================================

/// Expands `$$` and `$&` in a replacement template.
fn expand_replacement(template: &str, matched: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' {
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    out.push('$');
                    continue;
                }
                Some('&') => {
                    chars.next();
                    out.push_str(matched);
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

fn replace_matches(ctx: &mut EvalContext<'_>, this: &JsValue, args: &[JsValue], all: bool) -> ValueResult {
    let s = this_string(this);
    let pattern = to_js_string(&arg(args, 0));
    let replacement = arg(args, 1);

    let hay = units(&s);
    let needle = units(&pattern);
    let mut out: Vec<u16> = Vec::with_capacity(hay.len());
    let mut cursor = 0;
    let mut search_from = 0;
    while let Some(pos) = find_units(&hay, &needle, search_from) {
        out.extend_from_slice(&hay[cursor..pos]);
        let piece = if is_callable(&replacement) {
            let r = ctx.call(
                &replacement,
                JsValue::Undefined,
                vec![JsValue::from(pattern.as_str()), JsValue::from(pos as i64), JsValue::from(s.as_str())],
            )?;
            to_js_string(&r)
        } else {
            expand_replacement(&to_js_string(&replacement), &pattern)
        };
        out.extend(piece.encode_utf16());
        cursor = pos + needle.len();
        if !all {
            break;
        }
        search_from = if needle.is_empty() { pos + 1 } else { cursor };
        if needle.is_empty() && pos < hay.len() {
            out.push(hay[pos]);
            cursor = pos + 1;
        }
    }
    if cursor <= hay.len() {
        out.extend_from_slice(&hay[cursor..]);
    }
    Ok(JsValue::String(from_units(&out)))
}

/// String.prototype.replace(pattern, replacement)
fn string_replace(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    replace_matches(ctx, &this, &args, false)
}

/// String.prototype.replaceAll(pattern, replacement)
fn string_replace_all(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    replace_matches(ctx, &this, &args, true)
}

/// Filler built by repeating `pad` until the string reaches the target
/// length argument.
fn padding(ctx: &EvalContext<'_>, args: &[JsValue], s_len: usize) -> Result<Vec<u16>, Abrupt> {
    let target = to_integer(&arg(args, 0));
    let pad = match arg(args, 1) {
        JsValue::Undefined => vec![b' ' as u16],
        p => units(&to_js_string(&p)),
    };
    if target <= s_len as f64 || pad.is_empty() {
        return Ok(Vec::new());
    }
    let fill_len = check_string_length(ctx, target)? - s_len;
    Ok(pad.iter().copied().cycle().take(fill_len).collect())
}

/// String.prototype.padStart(targetLength, padString)
fn string_pad_start(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let s = units(&this_string(&this));
    let mut out = padding(ctx, &args, s.len())?;
    out.extend_from_slice(&s);
    Ok(JsValue::String(from_units(&out)))
}

/// String.prototype.padEnd(targetLength, padString)
fn string_pad_end(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let mut s = units(&this_string(&this));
    let fill = padding(ctx, &args, s.len())?;
    s.extend(fill);
    Ok(JsValue::String(from_units(&s)))
}

/// String.prototype.repeat(count)
fn string_repeat(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let count = to_integer(&arg(&args, 0));
    if count < 0.0 || count.is_infinite() {
        return Err(JErrorType::RangeError(format!(
            "Invalid count value: {}",
            to_js_string(&JsValue::from(count))
        ))
        .into());
    }
    let s = this_string(&this);
    let unit_len = s.encode_utf16().count();
    if unit_len == 0 || count == 0.0 {
        return Ok(JsValue::String(String::new()));
    }
    check_string_length(ctx, unit_len as f64 * count)?;
    Ok(JsValue::String(s.repeat(count as usize)))
}

/// String.prototype.concat(...values)
fn string_concat(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let mut s = this_string(&this);
    for value in &args {
        s.push_str(&to_js_string(value));
    }
    Ok(JsValue::String(s))
}

/// String.prototype.localeCompare(other), by code unit order.
fn string_locale_compare(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let a = this_string(&this);
    let b = to_js_string(&arg(&args, 0));
    Ok(JsValue::from(match a.encode_utf16().cmp(b.encode_utf16()) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }))
}

fn string_to_string(_ctx: &mut EvalContext<'_>, this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::String(this_string(&this)))
}
