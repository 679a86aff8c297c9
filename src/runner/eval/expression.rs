//! Expression evaluation.
//!
//! This module walks the expression AST. Member chains are evaluated by
//! [`evaluate_chain`], which keeps the scope path of every value read from the
//! binding scope so the [`ScopeResolver`](super::scope::ScopeResolver) can
//! intercept nested reads. Values leave a chain through `materialize`, which
//! lets the resolver fill in lazily computed descendants first.

use std::cmp::Ordering;

use crate::parser::ast::{
    BinaryOperator, ExpressionOrSpreadElement, ExpressionType, LiteralData, LiteralType,
    LogicalOperator, MemberPropertyType, NumberLiteralType, PropertyData, PropertyKeyType,
    TemplateLiteralData, UnaryOperator,
};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function::{FunctionKind, JsFunction};
use crate::runner::ds::object::JsObject;
use crate::runner::ds::operations::object::{get_property, has_property, iterate_values};
use crate::runner::ds::operations::test_and_comparison::{
    abstract_equality_comparison, abstract_relational_comparison, strict_equality_comparison,
};
use crate::runner::ds::operations::type_conversion::{
    get_type, to_boolean, to_int32, to_js_string, to_number, to_primitive, to_property_key,
    to_uint32, TYPE_STR_UNDEFINED,
};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

use super::function::call_function;
use super::types::{Abrupt, ValueResult};

/// A value read during a member chain, with the scope path it came from
/// when it was reached through the binding scope.
struct ChainValue {
    value: JsValue,
    scope_path: Option<String>,
}

impl ChainValue {
    fn plain(value: JsValue) -> Self {
        ChainValue {
            value,
            scope_path: None,
        }
    }

    fn scoped(value: JsValue, path: String) -> Self {
        ChainValue {
            value,
            scope_path: Some(path),
        }
    }
}

/// `None` means an optional link short-circuited.
type ChainResult = Result<Option<ChainValue>, Abrupt>;

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &mut EvalContext<'_>) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit)),

        ExpressionType::Identifier(_)
        | ExpressionType::MemberExpression { .. }
        | ExpressionType::CallExpression { .. } => match evaluate_chain(expr, ctx)? {
            Some(v) => materialize(v, ctx),
            None => Ok(JsValue::Undefined),
        },

        ExpressionType::ChainExpression { expression, .. } => match evaluate_chain(expression, ctx)? {
            Some(v) => materialize(v, ctx),
            None => Ok(JsValue::Undefined),
        },

        ExpressionType::ThisExpression { .. } => Ok(JsValue::Undefined),

        ExpressionType::TemplateLiteral(data) => evaluate_template_literal(data, ctx),

        ExpressionType::ArrayExpression { elements, .. } => {
            Ok(JsValue::array(evaluate_elements(elements, ctx)?))
        }

        ExpressionType::ObjectExpression { properties, .. } => {
            evaluate_object_literal(properties, ctx)
        }

        ExpressionType::ArrowFunctionExpression(data) => Ok(JsValue::function(JsFunction::arrow(
            data.clone(),
            ctx.captured_locals(),
        ))),

        ExpressionType::UnaryExpression {
            operator, argument, ..
        } => evaluate_unary_expression(*operator, argument, ctx),

        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
            ..
        } => evaluate_binary_expression(*operator, left, right, ctx),

        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
            ..
        } => evaluate_logical_expression(*operator, left, right, ctx),

        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
            ..
        } => {
            if to_boolean(&evaluate_expression(test, ctx)?) {
                evaluate_expression(consequent, ctx)
            } else {
                evaluate_expression(alternate, ctx)
            }
        }

        ExpressionType::AssignmentExpression { left, .. } => Err(JErrorType::TypeError(format!(
            "Cannot assign to {}: bindings are read-only",
            describe_expression(left)
        ))
        .into()),

        ExpressionType::SequenceExpression { expressions, .. } => {
            let mut result = JsValue::Undefined;
            for e in expressions {
                result = evaluate_expression(e, ctx)?;
            }
            Ok(result)
        }
    }
}

/// Evaluate a literal and return its value.
fn evaluate_literal(lit: &LiteralData) -> JsValue {
    match &lit.value {
        LiteralType::NullLiteral => JsValue::Null,
        LiteralType::BooleanLiteral(b) => JsValue::Boolean(*b),
        LiteralType::StringLiteral(s) => JsValue::String(s.clone()),
        LiteralType::NumberLiteral(NumberLiteralType::IntegerLiteral(i)) => JsValue::from(*i),
        LiteralType::NumberLiteral(NumberLiteralType::FloatLiteral(f)) => JsValue::from(*f),
    }
}

// ============================================================================
// Member chains
// ============================================================================

fn evaluate_chain(expr: &ExpressionType, ctx: &mut EvalContext<'_>) -> ChainResult {
    match expr {
        ExpressionType::Identifier(id) => resolve_identifier(&id.name, ctx).map(Some),
        ExpressionType::MemberExpression {
            object,
            property,
            optional,
            ..
        } => Ok(evaluate_member(object, property, *optional, ctx)?.map(|(_, member)| member)),
        ExpressionType::CallExpression {
            callee,
            arguments,
            optional,
            ..
        } => evaluate_call(callee, arguments, *optional, ctx),
        other => evaluate_expression(other, ctx).map(|v| Some(ChainValue::plain(v))),
    }
}

/// Lookup order: arrow locals, binding scope, then sandbox globals.
fn resolve_identifier(name: &str, ctx: &mut EvalContext<'_>) -> Result<ChainValue, Abrupt> {
    if let Some(v) = ctx.get_local(name) {
        return Ok(ChainValue::plain(v.clone()));
    }
    let sandbox = ctx.sandbox;
    if ctx.scope.has(name) {
        let value = ctx.scope.get(name, sandbox)?;
        return Ok(ChainValue::scoped(value, name.to_string()));
    }
    Ok(ChainValue::plain(sandbox.resolve_global(name)?))
}

fn is_resolvable(name: &str, ctx: &EvalContext<'_>) -> bool {
    ctx.get_local(name).is_some() || ctx.scope.has(name) || ctx.sandbox.has_global(name)
}

/// Returns the target together with the member read from it.
fn evaluate_member(
    object: &ExpressionType,
    property: &MemberPropertyType,
    optional: bool,
    ctx: &mut EvalContext<'_>,
) -> Result<Option<(ChainValue, ChainValue)>, Abrupt> {
    let target = match evaluate_chain(object, ctx)? {
        Some(t) => t,
        None => return Ok(None),
    };
    if optional && target.value.is_nullish() {
        return Ok(None);
    }
    let key = match property {
        MemberPropertyType::Static(id) => id.name.clone(),
        MemberPropertyType::Computed(expr) => to_property_key(&evaluate_expression(expr, ctx)?),
    };
    let member = read_member(&target, &key, ctx)?;
    Ok(Some((target, member)))
}

fn read_member(target: &ChainValue, key: &str, ctx: &mut EvalContext<'_>) -> Result<ChainValue, Abrupt> {
    let sandbox = ctx.sandbox;
    match &target.scope_path {
        Some(path) if matches!(target.value, JsValue::Object(_) | JsValue::Array(_)) => {
            let child = format!("{}.{}", path, key);
            let value = ctx.scope.get_member(&child, &target.value, key, sandbox)?;
            Ok(ChainValue::scoped(value, child))
        }
        _ => Ok(ChainValue::plain(get_property(&target.value, key, sandbox)?)),
    }
}

fn evaluate_call(
    callee: &ExpressionType,
    arguments: &[ExpressionOrSpreadElement],
    optional: bool,
    ctx: &mut EvalContext<'_>,
) -> ChainResult {
    let (receiver, func) = match callee {
        ExpressionType::MemberExpression {
            object,
            property,
            optional: member_optional,
            ..
        } => match evaluate_member(object, property, *member_optional, ctx)? {
            Some((target, member)) => (Some(target), member.value),
            None => return Ok(None),
        },
        other => match evaluate_chain(other, ctx)? {
            Some(f) => (None, f.value),
            None => return Ok(None),
        },
    };
    if optional && func.is_nullish() {
        return Ok(None);
    }
    let func = match func {
        JsValue::Function(f) => f,
        _ => {
            return Err(JErrorType::TypeError(format!(
                "{} is not a function",
                describe_expression(callee)
            ))
            .into())
        }
    };
    // Arrow functions ignore `this`; built-ins get a fully resolved receiver.
    let this = match (receiver, &func.kind) {
        (Some(target), FunctionKind::Native(_)) | (Some(target), FunctionKind::Plugin(_)) => {
            materialize(target, ctx)?
        }
        _ => JsValue::Undefined,
    };
    let args = evaluate_elements(arguments, ctx)?;
    Ok(Some(ChainValue::plain(call_function(&func, this, args, ctx)?)))
}

/// Hands a chain value over as a plain value, letting the scope resolve any
/// lazily computed descendants first.
fn materialize(chain: ChainValue, ctx: &mut EvalContext<'_>) -> ValueResult {
    match chain.scope_path {
        Some(path) if matches!(chain.value, JsValue::Object(_) | JsValue::Array(_)) => {
            let sandbox = ctx.sandbox;
            ctx.scope.materialize(&path, chain.value, sandbox)
        }
        _ => Ok(chain.value),
    }
}

/// Short source-like rendering of an expression for error messages.
fn describe_expression(expr: &ExpressionType) -> String {
    match expr {
        ExpressionType::Identifier(id) => id.name.clone(),
        ExpressionType::MemberExpression {
            object, property, ..
        } => match property {
            MemberPropertyType::Static(id) => format!("{}.{}", describe_expression(object), id.name),
            MemberPropertyType::Computed(_) => format!("{}[...]", describe_expression(object)),
        },
        ExpressionType::CallExpression { callee, .. } => format!("{}(...)", describe_expression(callee)),
        ExpressionType::ChainExpression { expression, .. } => describe_expression(expression),
        ExpressionType::ThisExpression { .. } => "this".to_string(),
        _ => "expression".to_string(),
    }
}

// ============================================================================
// Literals with parts
// ============================================================================

fn evaluate_elements(
    elements: &[ExpressionOrSpreadElement],
    ctx: &mut EvalContext<'_>,
) -> Result<Vec<JsValue>, Abrupt> {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            ExpressionOrSpreadElement::Expression(e) => values.push(evaluate_expression(e, ctx)?),
            ExpressionOrSpreadElement::SpreadElement(e) => {
                let spread = evaluate_expression(e, ctx)?;
                values.extend(iterate_values(&spread)?);
            }
        }
    }
    Ok(values)
}

fn evaluate_object_literal(properties: &[PropertyData], ctx: &mut EvalContext<'_>) -> ValueResult {
    let mut object = JsObject::new();
    for property in properties {
        match property {
            PropertyData::KeyValue { key, value } => {
                let key = match key {
                    PropertyKeyType::Static(k) => k.clone(),
                    PropertyKeyType::Computed(e) => to_property_key(&evaluate_expression(e, ctx)?),
                };
                let value = evaluate_expression(value, ctx)?;
                object.insert(key, value);
            }
            PropertyData::Shorthand(id) => {
                let value = resolve_identifier(&id.name, ctx)?;
                let value = materialize(value, ctx)?;
                object.insert(id.name.as_str(), value);
            }
            PropertyData::Spread(e) => match evaluate_expression(e, ctx)? {
                JsValue::Object(source) => {
                    for (k, v) in source.entries() {
                        object.insert(k.as_str(), v.clone());
                    }
                }
                spread @ JsValue::Array(_) | spread @ JsValue::String(_) => {
                    for (i, v) in iterate_values(&spread)?.into_iter().enumerate() {
                        object.insert(i.to_string(), v);
                    }
                }
                // Spreading primitives copies nothing.
                _ => {}
            },
        }
    }
    Ok(JsValue::object(object))
}

fn evaluate_template_literal(data: &TemplateLiteralData, ctx: &mut EvalContext<'_>) -> ValueResult {
    let mut s = String::new();
    for (i, quasi) in data.quasis.iter().enumerate() {
        s.push_str(quasi);
        if let Some(e) = data.expressions.get(i) {
            let value = evaluate_expression(e, ctx)?;
            s.push_str(&to_js_string(&value));
        }
    }
    Ok(JsValue::String(s))
}

// ============================================================================
// Operators
// ============================================================================

/// Evaluate a unary expression.
fn evaluate_unary_expression(
    operator: UnaryOperator,
    argument: &ExpressionType,
    ctx: &mut EvalContext<'_>,
) -> ValueResult {
    if let (UnaryOperator::TypeOf, ExpressionType::Identifier(id)) = (operator, argument) {
        if !is_resolvable(&id.name, ctx) {
            return Ok(JsValue::from(TYPE_STR_UNDEFINED));
        }
    }
    let value = evaluate_expression(argument, ctx)?;
    Ok(match operator {
        UnaryOperator::TypeOf => JsValue::from(get_type(&value)),
        UnaryOperator::Void => JsValue::Undefined,
        UnaryOperator::LogicalNot => JsValue::Boolean(!to_boolean(&value)),
        UnaryOperator::Minus => JsValue::from(-to_number(&value)),
        UnaryOperator::Plus => JsValue::from(to_number(&value)),
        UnaryOperator::BitwiseNot => JsValue::from(!to_int32(to_number(&value)) as i64),
    })
}

/// Evaluate a binary expression.
fn evaluate_binary_expression(
    operator: BinaryOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext<'_>,
) -> ValueResult {
    let l = evaluate_expression(left, ctx)?;
    let r = evaluate_expression(right, ctx)?;

    Ok(match operator {
        // Arithmetic
        BinaryOperator::Add => add_values(&l, &r),
        BinaryOperator::Subtract => JsValue::from(to_number(&l) - to_number(&r)),
        BinaryOperator::Multiply => JsValue::from(to_number(&l) * to_number(&r)),
        BinaryOperator::Divide => JsValue::from(to_number(&l) / to_number(&r)),
        BinaryOperator::Modulo => JsValue::from(to_number(&l) % to_number(&r)),
        BinaryOperator::Exponent => JsValue::from(exponent(to_number(&l), to_number(&r))),

        // Comparison
        BinaryOperator::LessThan => {
            JsValue::Boolean(abstract_relational_comparison(&l, &r) == Some(Ordering::Less))
        }
        BinaryOperator::LessThanEqual => JsValue::Boolean(matches!(
            abstract_relational_comparison(&l, &r),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )),
        BinaryOperator::GreaterThan => {
            JsValue::Boolean(abstract_relational_comparison(&l, &r) == Some(Ordering::Greater))
        }
        BinaryOperator::GreaterThanEqual => JsValue::Boolean(matches!(
            abstract_relational_comparison(&l, &r),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        )),

        // Equality
        BinaryOperator::StrictlyEqual => JsValue::Boolean(strict_equality_comparison(&l, &r)),
        BinaryOperator::StrictlyUnequal => JsValue::Boolean(!strict_equality_comparison(&l, &r)),
        BinaryOperator::LooselyEqual => JsValue::Boolean(abstract_equality_comparison(&l, &r)),
        BinaryOperator::LooselyUnequal => JsValue::Boolean(!abstract_equality_comparison(&l, &r)),

        // Bitwise
        BinaryOperator::BitwiseAnd => JsValue::from((int32(&l) & int32(&r)) as i64),
        BinaryOperator::BitwiseOr => JsValue::from((int32(&l) | int32(&r)) as i64),
        BinaryOperator::BitwiseXor => JsValue::from((int32(&l) ^ int32(&r)) as i64),
        BinaryOperator::BitwiseLeftShift => {
            JsValue::from(int32(&l).wrapping_shl(shift_count(&r)) as i64)
        }
        BinaryOperator::BitwiseRightShift => {
            JsValue::from(int32(&l).wrapping_shr(shift_count(&r)) as i64)
        }
        BinaryOperator::BitwiseUnsignedRightShift => {
            JsValue::from(to_uint32(to_number(&l)).wrapping_shr(shift_count(&r)) as i64)
        }

        // Other
        BinaryOperator::In => JsValue::Boolean(has_property(&r, &to_property_key(&l))?),
    })
}

/// Evaluate a logical expression with short-circuit evaluation.
fn evaluate_logical_expression(
    operator: LogicalOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext<'_>,
) -> ValueResult {
    let left_val = evaluate_expression(left, ctx)?;

    let short_circuit = match operator {
        LogicalOperator::And => !to_boolean(&left_val),
        LogicalOperator::Or => to_boolean(&left_val),
        LogicalOperator::NullishCoalescing => !left_val.is_nullish(),
    };
    if short_circuit {
        Ok(left_val)
    } else {
        evaluate_expression(right, ctx)
    }
}

fn add_values(left: &JsValue, right: &JsValue) -> JsValue {
    let left = to_primitive(left);
    let right = to_primitive(right);
    if matches!(left, JsValue::String(_)) || matches!(right, JsValue::String(_)) {
        return JsValue::String(format!("{}{}", to_js_string(&left), to_js_string(&right)));
    }
    JsValue::from(to_number(&left) + to_number(&right))
}

/// `**` differs from `powf` for a unit base with a NaN or infinite exponent.
fn exponent(base: f64, exp: f64) -> f64 {
    if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
        f64::NAN
    } else {
        base.powf(exp)
    }
}

fn int32(v: &JsValue) -> i32 {
    to_int32(to_number(v))
}

fn shift_count(v: &JsValue) -> u32 {
    to_uint32(to_number(v)) & 31
}
