//! Array built-in.
//!
//! Provides the `Array` global and the methods reachable from array values.
//! Arrays are shared and immutable, so only the non-mutating half of the
//! Array API exists: `sort` and `reverse` behave like `toSorted` and
//! `toReversed` and hand back a new array.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::object::{get_property, iterate_values};
use crate::runner::ds::operations::test_and_comparison::{same_value_zero, strict_equality_comparison};
use crate::runner::ds::operations::type_conversion::{to_boolean, to_integer, to_js_string, to_number};
use crate::runner::ds::value::{JsArrayType, JsValue};
use crate::runner::eval::function::is_callable;
use crate::runner::eval::types::{Abrupt, ValueResult};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::{arg, check_array_length, relative_index};

/// Register the Array built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let array = BuiltInObject::new("Array")
        .add_method("isArray", array_is_array)
        .add_method("of", array_of)
        .add_method("from", array_from)
        .add_prototype_method("map", array_map)
        .add_prototype_method("filter", array_filter)
        .add_prototype_method("reduce", array_reduce)
        .add_prototype_method("reduceRight", array_reduce_right)
        .add_prototype_method("find", array_find)
        .add_prototype_method("findIndex", array_find_index)
        .add_prototype_method("findLast", array_find_last)
        .add_prototype_method("findLastIndex", array_find_last_index)
        .add_prototype_method("some", array_some)
        .add_prototype_method("every", array_every)
        .add_prototype_method("forEach", array_for_each)
        .add_prototype_method("includes", array_includes)
        .add_prototype_method("indexOf", array_index_of)
        .add_prototype_method("lastIndexOf", array_last_index_of)
        .add_prototype_method("join", array_join)
        .add_prototype_method("toString", array_to_string)
        .add_prototype_method("slice", array_slice)
        .add_prototype_method("concat", array_concat)
        .add_prototype_method("flat", array_flat)
        .add_prototype_method("flatMap", array_flat_map)
        .add_prototype_method("at", array_at)
        .add_prototype_method("sort", array_to_sorted)
        .add_prototype_method("toSorted", array_to_sorted)
        .add_prototype_method("reverse", array_to_reversed)
        .add_prototype_method("toReversed", array_to_reversed);

    registry.register_object(array);
}

// ============================================================================
// Helpers
// ============================================================================

fn this_array(this: &JsValue, method: &str) -> Result<JsArrayType, JErrorType> {
    match this {
        JsValue::Array(items) => Ok(Rc::clone(items)),
        _ => Err(JErrorType::TypeError(format!(
            "Array.prototype.{} called on non-array",
            method
        ))),
    }
}

fn callback(args: &[JsValue]) -> Result<JsValue, JErrorType> {
    let f = arg(args, 0);
    if is_callable(&f) {
        Ok(f)
    } else {
        Err(JErrorType::TypeError(format!("{} is not a function", f)))
    }
}

/// Invokes `f(item, index, array)`.
fn call_with_item(
    ctx: &mut EvalContext<'_>,
    f: &JsValue,
    item: &JsValue,
    index: usize,
    array: &JsValue,
) -> ValueResult {
    ctx.call(
        f,
        JsValue::Undefined,
        vec![item.clone(), JsValue::from(index as i64), array.clone()],
    )
}

fn flatten_into(out: &mut Vec<JsValue>, items: &[JsValue], depth: f64) {
    for item in items {
        match item {
            JsValue::Array(inner) if depth >= 1.0 => flatten_into(out, inner, depth - 1.0),
            other => out.push(other.clone()),
        }
    }
}

/// Stable merge sort with a comparator that may fail. A comparator that is
/// inconsistent still yields some permutation instead of a panic.
fn merge_sort<F>(items: Vec<JsValue>, cmp: &mut F) -> Result<Vec<JsValue>, Abrupt>
where
    F: FnMut(&JsValue, &JsValue) -> Result<Ordering, Abrupt>,
{
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort(left, cmp)?;
    let right = merge_sort(right, cmp)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if cmp(&right[j], &left[i])? == Ordering::Less {
            merged.push(right[j].clone());
            j += 1;
        } else {
            merged.push(left[i].clone());
            i += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    Ok(merged)
}

/// Default sort order: by string value, compared in UTF-16 code units.
fn compare_as_strings(a: &JsValue, b: &JsValue) -> Ordering {
    let a = to_js_string(a);
    let b = to_js_string(b);
    a.encode_utf16().cmp(b.encode_utf16())
}

// ============================================================================
// Statics
// ============================================================================

/// Array.isArray(value)
fn array_is_array(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::Boolean(matches!(arg(&args, 0), JsValue::Array(_))))
}

/// Array.of(...items)
fn array_of(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::array(args))
}

/// Array.from(source, mapFn)
fn array_from(ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let source = arg(&args, 0);
    let items = match &source {
        JsValue::Undefined | JsValue::Null => {
            return Err(JErrorType::TypeError(format!(
                "{} is not iterable",
                to_js_string(&source)
            ))
            .into())
        }
        JsValue::Object(o) => {
            let len = o.get("length").map_or(0.0, |l| to_integer(l).max(0.0));
            let len = check_array_length(ctx, len)?;
            let mut items = Vec::with_capacity(len);
            for i in 0..len {
                items.push(get_property(&source, &i.to_string(), ctx.sandbox)?);
            }
            items
        }
        JsValue::Number(_) | JsValue::Boolean(_) => Vec::new(),
        _ => iterate_values(&source)?,
    };
    match args.get(1) {
        None | Some(JsValue::Undefined) => Ok(JsValue::array(items)),
        Some(_) => {
            let f = callback(&args[1..])?;
            let mut mapped = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                mapped.push(ctx.call(&f, JsValue::Undefined, vec![item.clone(), JsValue::from(i as i64)])?);
            }
            Ok(JsValue::array(mapped))
        }
    }
}

// ============================================================================
// Iteration with callbacks
// ============================================================================

/// Array.prototype.map(fn)
fn array_map(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "map")?;
    let f = callback(&args)?;
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        out.push(call_with_item(ctx, &f, item, i, &this)?);
    }
    Ok(JsValue::array(out))
}

/// Array.prototype.filter(fn)
fn array_filter(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "filter")?;
    let f = callback(&args)?;
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if to_boolean(&call_with_item(ctx, &f, item, i, &this)?) {
            out.push(item.clone());
        }
    }
    Ok(JsValue::array(out))
}

fn reduce_indices(
    ctx: &mut EvalContext<'_>,
    this: &JsValue,
    items: &[JsValue],
    args: &[JsValue],
    indices: Vec<usize>,
) -> ValueResult {
    let f = callback(args)?;
    let mut indices = indices.into_iter();
    let mut acc = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match indices.next() {
            Some(i) => items[i].clone(),
            None => {
                return Err(JErrorType::TypeError(
                    "Reduce of empty array with no initial value".to_string(),
                )
                .into())
            }
        },
    };
    for i in indices {
        acc = ctx.call(
            &f,
            JsValue::Undefined,
            vec![acc, items[i].clone(), JsValue::from(i as i64), this.clone()],
        )?;
    }
    Ok(acc)
}

/// Array.prototype.reduce(fn, initial)
fn array_reduce(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "reduce")?;
    reduce_indices(ctx, &this, &items, &args, (0..items.len()).collect())
}

/// Array.prototype.reduceRight(fn, initial)
fn array_reduce_right(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "reduceRight")?;
    reduce_indices(ctx, &this, &items, &args, (0..items.len()).rev().collect())
}

/// First `(index, item)` the predicate accepts, scanning in `order`.
fn find_matching(
    ctx: &mut EvalContext<'_>,
    this: &JsValue,
    items: &[JsValue],
    args: &[JsValue],
    reverse: bool,
) -> Result<Option<(usize, JsValue)>, Abrupt> {
    let f = callback(args)?;
    let order: Box<dyn Iterator<Item = usize>> = if reverse {
        Box::new((0..items.len()).rev())
    } else {
        Box::new(0..items.len())
    };
    for i in order {
        if to_boolean(&call_with_item(ctx, &f, &items[i], i, this)?) {
            return Ok(Some((i, items[i].clone())));
        }
    }
    Ok(None)
}

/// Array.prototype.find(fn)
fn array_find(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "find")?;
    let found = find_matching(ctx, &this, &items, &args, false)?;
    Ok(found.map_or(JsValue::Undefined, |(_, v)| v))
}

/// Array.prototype.findIndex(fn)
fn array_find_index(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "findIndex")?;
    let found = find_matching(ctx, &this, &items, &args, false)?;
    Ok(JsValue::from(found.map_or(-1, |(i, _)| i as i64)))
}

/// Array.prototype.findLast(fn)
fn array_find_last(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "findLast")?;
    let found = find_matching(ctx, &this, &items, &args, true)?;
    Ok(found.map_or(JsValue::Undefined, |(_, v)| v))
}

/// Array.prototype.findLastIndex(fn)
fn array_find_last_index(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "findLastIndex")?;
    let found = find_matching(ctx, &this, &items, &args, true)?;
    Ok(JsValue::from(found.map_or(-1, |(i, _)| i as i64)))
}

/// Array.prototype.some(fn)
fn array_some(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "some")?;
    let found = find_matching(ctx, &this, &items, &args, false)?;
    Ok(JsValue::Boolean(found.is_some()))
}

/// Array.prototype.every(fn)
fn array_every(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "every")?;
    let f = callback(&args)?;
    for (i, item) in items.iter().enumerate() {
        if !to_boolean(&call_with_item(ctx, &f, item, i, &this)?) {
            return Ok(JsValue::Boolean(false));
        }
    }
    Ok(JsValue::Boolean(true))
}

/// Array.prototype.forEach(fn)
fn array_for_each(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "forEach")?;
    let f = callback(&args)?;
    for (i, item) in items.iter().enumerate() {
        call_with_item(ctx, &f, item, i, &this)?;
    }
    Ok(JsValue::Undefined)
}

// ============================================================================
// Searching
// ============================================================================

/// Array.prototype.includes(value, fromIndex)
fn array_includes(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "includes")?;
    let needle = arg(&args, 0);
    let from = relative_index(&args, 1, items.len(), 0);
    Ok(JsValue::Boolean(
        items[from..].iter().any(|v| same_value_zero(v, &needle)),
    ))
}

/// Array.prototype.indexOf(value, fromIndex)
fn array_index_of(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "indexOf")?;
    let needle = arg(&args, 0);
    let from = relative_index(&args, 1, items.len(), 0);
    let idx = items[from..]
        .iter()
        .position(|v| strict_equality_comparison(v, &needle))
        .map_or(-1, |i| (i + from) as i64);
    Ok(JsValue::from(idx))
}

/// Array.prototype.lastIndexOf(value)
fn array_last_index_of(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "lastIndexOf")?;
    let needle = arg(&args, 0);
    let idx = items
        .iter()
        .rposition(|v| strict_equality_comparison(v, &needle))
        .map_or(-1, |i| i as i64);
    Ok(JsValue::from(idx))
}

/// Array.prototype.at(index)
fn array_at(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "at")?;
    let rel = to_integer(&arg(&args, 0));
    let idx = if rel < 0.0 { items.len() as f64 + rel } else { rel };
    if idx < 0.0 || idx >= items.len() as f64 {
        return Ok(JsValue::Undefined);
    }
    Ok(items[idx as usize].clone())
}

// ============================================================================
// Producing new arrays
// ============================================================================

/// Array.prototype.join(separator)
fn array_join(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "join")?;
    let separator = match arg(&args, 0) {
        JsValue::Undefined => ",".to_string(),
        sep => to_js_string(&sep),
    };
    let parts: Vec<String> = items
        .iter()
        .map(|v| if v.is_nullish() { String::new() } else { to_js_string(v) })
        .collect();
    Ok(JsValue::String(parts.join(&separator)))
}

/// Array.prototype.toString()
fn array_to_string(_ctx: &mut EvalContext<'_>, this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::String(to_js_string(&this)))
}

/// Array.prototype.slice(start, end)
fn array_slice(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "slice")?;
    let start = relative_index(&args, 0, items.len(), 0);
    let end = relative_index(&args, 1, items.len(), items.len());
    if start >= end {
        return Ok(JsValue::array(Vec::new()));
    }
    Ok(JsValue::array(items[start..end].to_vec()))
}

/// Array.prototype.concat(...values)
fn array_concat(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "concat")?;
    let mut out = items.to_vec();
    for value in args {
        match value {
            JsValue::Array(more) => out.extend(more.iter().cloned()),
            other => out.push(other),
        }
    }
    Ok(JsValue::array(out))
}

/// Array.prototype.flat(depth)
fn array_flat(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "flat")?;
    let depth = match arg(&args, 0) {
        JsValue::Undefined => 1.0,
        d => to_integer(&d),
    };
    let mut out = Vec::new();
    flatten_into(&mut out, &items, depth);
    Ok(JsValue::array(out))
}

/// Array.prototype.flatMap(fn)
fn array_flat_map(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "flatMap")?;
    let f = callback(&args)?;
    let mut mapped = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        mapped.push(call_with_item(ctx, &f, item, i, &this)?);
    }
    let mut out = Vec::new();
    flatten_into(&mut out, &mapped, 1.0);
    Ok(JsValue::array(out))
}

/// Array.prototype.toSorted(compareFn), also reachable as `sort`.
/// `undefined` entries always sort last.
fn array_to_sorted(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "sort")?;
    let (defined, undefined): (Vec<JsValue>, Vec<JsValue>) =
        items.iter().cloned().partition(|v| !v.is_undefined());

    let mut sorted = match arg(&args, 0) {
        JsValue::Undefined => merge_sort(defined, &mut |a, b| Ok(compare_as_strings(a, b)))?,
        f if is_callable(&f) => merge_sort(defined, &mut |a, b| {
            let r = to_number(&ctx.call(&f, JsValue::Undefined, vec![a.clone(), b.clone()])?);
            Ok(if r < 0.0 {
                Ordering::Less
            } else if r > 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            })
        })?,
        other => {
            return Err(JErrorType::TypeError(format!(
                "The comparison function must be either a function or undefined, got {}",
                other
            ))
            .into())
        }
    };
    sorted.extend(undefined);
    Ok(JsValue::array(sorted))
}

/// Array.prototype.toReversed(), also reachable as `reverse`.
fn array_to_reversed(_ctx: &mut EvalContext<'_>, this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    let items = this_array(&this, "reverse")?;
    Ok(JsValue::array(items.iter().rev().cloned().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(values: &[i64]) -> Vec<JsValue> {
        values.iter().map(|v| JsValue::from(*v)).collect()
    }

    #[test]
    fn test_merge_sort_is_stable() {
        let pairs: Vec<JsValue> = [(1, "a"), (0, "b"), (1, "c"), (0, "d")]
            .iter()
            .map(|(k, v)| JsValue::array(vec![JsValue::from(*k as i64), JsValue::from(*v)]))
            .collect();
        let sorted = merge_sort(pairs, &mut |a, b| {
            let ka = a.as_array().unwrap()[0].as_f64().unwrap();
            let kb = b.as_array().unwrap()[0].as_f64().unwrap();
            Ok(ka.partial_cmp(&kb).unwrap())
        })
        .unwrap();
        let order: Vec<String> = sorted
            .iter()
            .map(|p| p.as_array().unwrap()[1].as_str().unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_merge_sort_stops_on_comparator_error() {
        let result = merge_sort(nums(&[3, 1, 2]), &mut |_, _| {
            Err(JErrorType::Error("boom".to_string()).into())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_default_order_compares_strings() {
        let sorted = merge_sort(nums(&[10, 9, 1]), &mut |a, b| Ok(compare_as_strings(a, b))).unwrap();
        assert_eq!(sorted, nums(&[1, 10, 9]));
    }

    #[test]
    fn test_flatten_respects_depth() {
        let nested = vec![
            JsValue::from(1),
            JsValue::array(vec![JsValue::from(2), JsValue::array(nums(&[3]))]),
        ];
        let mut out = Vec::new();
        flatten_into(&mut out, &nested, 1.0);
        assert_eq!(out.len(), 3);
        assert!(matches!(out[2], JsValue::Array(_)));
    }
}
