use std::rc::Rc;

use pest::error::{Error, ErrorVariant, InputLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::ast::*;
use super::util::{format_number_key, unescape};

#[derive(Parser)]
#[grammar = "parser/expr_grammar.pest"] // relative to src
pub struct ExprParser;

const TAB_WIDTH: usize = 2;

impl ExprParser {
    /// Parse a binding expression into its AST.
    pub fn parse_to_ast_from_str(script: &str) -> Result<ExpressionType, JsRuleError> {
        let mut pairs = ExprParser::parse(Rule::program, script)
            .map_err(|e| rule_error_from_pest(e, script))?;
        let program = match pairs.next() {
            Some(p) => p,
            None => return Err(empty_input_error(script)),
        };
        for pair in program.into_inner() {
            if pair.as_rule() == Rule::sequence_expression {
                return build_expression(pair);
            }
        }
        Err(empty_input_error(script))
    }
}

/// Debug rendering of the raw pest token tree, one rule per line.
pub fn parse_to_token_tree(script: &str) -> Result<String, JsRuleError> {
    let pairs =
        ExprParser::parse(Rule::program, script).map_err(|e| rule_error_from_pest(e, script))?;
    let mut tree = vec![];
    for pair in pairs {
        tree.push(pair_to_string(pair, 0).join("\n"));
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    tree.push(format!("{}{}", " ".repeat(level * TAB_WIDTH), rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

fn empty_input_error(script: &str) -> JsRuleError {
    JsRuleError {
        message: "Unexpected end of input".to_string(),
        start_index: script.len(),
        end_index: script.len(),
    }
}

fn rule_error_from_pest(e: Error<Rule>, script: &str) -> JsRuleError {
    let (start_index, end_index) = match e.location {
        InputLocation::Pos(p) => (p, p),
        InputLocation::Span(s) => s,
    };
    let message = match e.variant {
        ErrorVariant::CustomError { message } => message,
        ErrorVariant::ParsingError { .. } => {
            if start_index >= script.trim_end().len() {
                "Unexpected end of input".to_string()
            } else {
                let token: String = script[start_index..].chars().take(1).collect();
                format!("Unexpected token '{}'", token)
            }
        }
    };
    JsRuleError {
        message,
        start_index,
        end_index,
    }
}

fn get_meta(pair: &Pair<Rule>) -> Meta {
    let span = pair.as_span();
    Meta {
        start_index: span.start(),
        end_index: span.end(),
    }
}

fn get_unexpected_error(src: &'static str, pair: &Pair<Rule>) -> JsRuleError {
    let meta = get_meta(pair);
    JsRuleError {
        message: format!("Unexpected {:?} in {}", pair.as_rule(), src),
        start_index: meta.start_index,
        end_index: meta.end_index,
    }
}

fn first_child<'i>(pair: Pair<'i, Rule>, src: &'static str) -> Result<Pair<'i, Rule>, JsRuleError> {
    let err = get_unexpected_error(src, &pair);
    pair.into_inner().next().ok_or(err)
}

fn build_expression(pair: Pair<Rule>) -> Result<ExpressionType, JsRuleError> {
    let meta = get_meta(&pair);
    match pair.as_rule() {
        Rule::sequence_expression => {
            let mut expressions = vec![];
            for inner in pair.into_inner() {
                expressions.push(build_expression(inner)?);
            }
            if expressions.len() == 1 {
                Ok(expressions.remove(0))
            } else {
                Ok(ExpressionType::SequenceExpression { meta, expressions })
            }
        }
        Rule::arrow_function => build_arrow_function(pair),
        Rule::assignment => {
            let mut inner = pair.into_inner();
            let (left, op, right) = match (inner.next(), inner.next(), inner.next()) {
                (Some(l), Some(o), Some(r)) => (l, o, r),
                _ => {
                    return Err(JsRuleError {
                        message: "Malformed assignment".to_string(),
                        start_index: meta.start_index,
                        end_index: meta.end_index,
                    })
                }
            };
            let operator = AssignmentOperator::from_str(op.as_str())
                .ok_or_else(|| get_unexpected_error("assignment", &op))?;
            Ok(ExpressionType::AssignmentExpression {
                meta,
                operator,
                left: Box::new(build_expression(left)?),
                right: Box::new(build_expression(right)?),
            })
        }
        Rule::conditional_expression => {
            let mut inner = pair.into_inner();
            let test = match inner.next() {
                Some(t) => build_expression(t)?,
                None => return Err(empty_input_error("")),
            };
            match (inner.next(), inner.next()) {
                (Some(c), Some(a)) => Ok(ExpressionType::ConditionalExpression {
                    meta,
                    test: Box::new(test),
                    consequent: Box::new(build_expression(c)?),
                    alternate: Box::new(build_expression(a)?),
                }),
                _ => Ok(test),
            }
        }
        Rule::coalesce_expression | Rule::logical_or_expression | Rule::logical_and_expression => {
            build_operator_chain(pair, true)
        }
        Rule::bitwise_or_expression
        | Rule::bitwise_xor_expression
        | Rule::bitwise_and_expression
        | Rule::equality_expression
        | Rule::relational_expression
        | Rule::shift_expression
        | Rule::additive_expression
        | Rule::multiplicative_expression => build_operator_chain(pair, false),
        Rule::exponentiation_expression => {
            let mut inner = pair.into_inner();
            let base = match inner.next() {
                Some(b) => build_expression(b)?,
                None => return Err(empty_input_error("")),
            };
            match (inner.next(), inner.next()) {
                (Some(_), Some(exponent)) => Ok(ExpressionType::BinaryExpression {
                    meta,
                    operator: BinaryOperator::Exponent,
                    left: Box::new(base),
                    right: Box::new(build_expression(exponent)?),
                }),
                _ => Ok(base),
            }
        }
        Rule::unary_expression => {
            let mut inner = pair.into_inner();
            let first = match inner.next() {
                Some(f) => f,
                None => return Err(empty_input_error("")),
            };
            if first.as_rule() == Rule::unary_operator {
                let operator = UnaryOperator::from_str(first.as_str())
                    .ok_or_else(|| get_unexpected_error("unary_expression", &first))?;
                let argument = match inner.next() {
                    Some(a) => build_expression(a)?,
                    None => return Err(get_unexpected_error("unary_expression", &first)),
                };
                Ok(ExpressionType::UnaryExpression {
                    meta,
                    operator,
                    argument: Box::new(argument),
                })
            } else {
                build_expression(first)
            }
        }
        Rule::left_hand_side => build_left_hand_side(pair),
        Rule::parenthesized_expression => build_expression(first_child(pair, "parentheses")?),
        Rule::this_expression => Ok(ExpressionType::ThisExpression { meta }),
        Rule::identifier => Ok(ExpressionType::Identifier(IdentifierData {
            name: pair.as_str().to_string(),
            meta,
        })),
        Rule::null_literal => Ok(ExpressionType::Literal(LiteralData {
            meta,
            value: LiteralType::NullLiteral,
        })),
        Rule::boolean_literal => Ok(ExpressionType::Literal(LiteralData {
            meta,
            value: LiteralType::BooleanLiteral(pair.as_str() == "true"),
        })),
        Rule::numeric_literal => Ok(ExpressionType::Literal(LiteralData {
            value: LiteralType::NumberLiteral(build_number(&pair)?),
            meta,
        })),
        Rule::string_literal => Ok(ExpressionType::Literal(LiteralData {
            value: LiteralType::StringLiteral(build_string(pair)?),
            meta,
        })),
        Rule::template_literal => build_template_literal(pair),
        Rule::array_literal => Ok(ExpressionType::ArrayExpression {
            meta,
            elements: build_element_list(pair)?,
        }),
        Rule::object_literal => build_object_literal(pair),
        _ => Err(get_unexpected_error("expression", &pair)),
    }
}

/// Left-folds `operand (operator operand)*` into binary or logical nodes.
fn build_operator_chain(pair: Pair<Rule>, logical: bool) -> Result<ExpressionType, JsRuleError> {
    let start_index = pair.as_span().start();
    let mut inner = pair.into_inner();
    let mut left = match inner.next() {
        Some(p) => build_expression(p)?,
        None => return Err(empty_input_error("")),
    };
    while let Some(op_pair) = inner.next() {
        let right_pair = match inner.next() {
            Some(p) => p,
            None => return Err(get_unexpected_error("operator chain", &op_pair)),
        };
        let meta = Meta {
            start_index,
            end_index: right_pair.as_span().end(),
        };
        let right = Box::new(build_expression(right_pair)?);
        left = if logical {
            let operator = LogicalOperator::from_str(op_pair.as_str())
                .ok_or_else(|| get_unexpected_error("logical operator", &op_pair))?;
            ExpressionType::LogicalExpression {
                meta,
                operator,
                left: Box::new(left),
                right,
            }
        } else {
            let operator = BinaryOperator::from_str(op_pair.as_str())
                .ok_or_else(|| get_unexpected_error("binary operator", &op_pair))?;
            ExpressionType::BinaryExpression {
                meta,
                operator,
                left: Box::new(left),
                right,
            }
        };
    }
    Ok(left)
}

fn build_left_hand_side(pair: Pair<Rule>) -> Result<ExpressionType, JsRuleError> {
    let start_index = pair.as_span().start();
    let whole_meta = get_meta(&pair);
    let mut inner = pair.into_inner();
    let mut object = match inner.next() {
        Some(p) => build_expression(p)?,
        None => return Err(empty_input_error("")),
    };
    let mut has_optional = false;
    for link in inner {
        let meta = Meta {
            start_index,
            end_index: link.as_span().end(),
        };
        object = match link.as_rule() {
            Rule::static_member | Rule::optional_member => {
                let optional = link.as_rule() == Rule::optional_member;
                has_optional |= optional;
                let name_pair = first_child(link, "member")?;
                ExpressionType::MemberExpression {
                    meta,
                    object: Box::new(object),
                    property: MemberPropertyType::Static(IdentifierData {
                        name: name_pair.as_str().to_string(),
                        meta: get_meta(&name_pair),
                    }),
                    optional,
                }
            }
            Rule::computed_member | Rule::optional_computed_member => {
                let optional = link.as_rule() == Rule::optional_computed_member;
                has_optional |= optional;
                let property = build_expression(first_child(link, "computed member")?)?;
                ExpressionType::MemberExpression {
                    meta,
                    object: Box::new(object),
                    property: MemberPropertyType::Computed(Box::new(property)),
                    optional,
                }
            }
            Rule::arguments => ExpressionType::CallExpression {
                meta,
                callee: Box::new(object),
                arguments: build_element_list(link)?,
                optional: false,
            },
            Rule::optional_call => {
                has_optional = true;
                ExpressionType::CallExpression {
                    meta,
                    callee: Box::new(object),
                    arguments: build_element_list(first_child(link, "optional call")?)?,
                    optional: true,
                }
            }
            _ => return Err(get_unexpected_error("left_hand_side", &link)),
        };
    }
    if has_optional {
        Ok(ExpressionType::ChainExpression {
            meta: whole_meta,
            expression: Box::new(object),
        })
    } else {
        Ok(object)
    }
}

fn build_element_list(pair: Pair<Rule>) -> Result<Vec<ExpressionOrSpreadElement>, JsRuleError> {
    let mut elements = vec![];
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::spread_element {
            let argument = build_expression(first_child(inner, "spread")?)?;
            elements.push(ExpressionOrSpreadElement::SpreadElement(argument));
        } else {
            elements.push(ExpressionOrSpreadElement::Expression(build_expression(
                inner,
            )?));
        }
    }
    Ok(elements)
}

fn build_arrow_function(pair: Pair<Rule>) -> Result<ExpressionType, JsRuleError> {
    let meta = get_meta(&pair);
    let mut inner = pair.into_inner();
    let (params_pair, body_pair) = match (inner.next(), inner.next()) {
        (Some(p), Some(b)) => (p, b),
        _ => {
            return Err(JsRuleError {
                message: "Malformed arrow function".to_string(),
                start_index: meta.start_index,
                end_index: meta.end_index,
            })
        }
    };
    let mut params = vec![];
    for param in params_pair.into_inner() {
        params.push(IdentifierData {
            name: param.as_str().to_string(),
            meta: get_meta(&param),
        });
    }
    Ok(ExpressionType::ArrowFunctionExpression(Rc::new(
        ArrowFunctionData {
            meta,
            params,
            body: Box::new(build_expression(body_pair)?),
        },
    )))
}

fn build_object_literal(pair: Pair<Rule>) -> Result<ExpressionType, JsRuleError> {
    let meta = get_meta(&pair);
    let mut properties = vec![];
    for member in pair.into_inner() {
        match member.as_rule() {
            Rule::spread_element => {
                properties.push(PropertyData::Spread(build_expression(first_child(
                    member, "spread",
                )?)?));
            }
            Rule::shorthand_property => {
                let id = first_child(member, "shorthand property")?;
                properties.push(PropertyData::Shorthand(IdentifierData {
                    name: id.as_str().to_string(),
                    meta: get_meta(&id),
                }));
            }
            Rule::property_assignment => {
                let mut inner = member.into_inner();
                let (key_pair, value_pair) = match (inner.next(), inner.next()) {
                    (Some(k), Some(v)) => (k, v),
                    _ => return Err(empty_input_error("")),
                };
                let key = match key_pair.as_rule() {
                    Rule::computed_property_name => PropertyKeyType::Computed(build_expression(
                        first_child(key_pair, "computed key")?,
                    )?),
                    Rule::string_literal => PropertyKeyType::Static(build_string(key_pair)?),
                    Rule::numeric_literal => {
                        PropertyKeyType::Static(format_number_key(&build_number(&key_pair)?))
                    }
                    Rule::identifier_name => PropertyKeyType::Static(key_pair.as_str().to_string()),
                    _ => return Err(get_unexpected_error("property name", &key_pair)),
                };
                properties.push(PropertyData::KeyValue {
                    key,
                    value: build_expression(value_pair)?,
                });
            }
            _ => return Err(get_unexpected_error("object literal", &member)),
        }
    }
    Ok(ExpressionType::ObjectExpression { meta, properties })
}

fn build_template_literal(pair: Pair<Rule>) -> Result<ExpressionType, JsRuleError> {
    let meta = get_meta(&pair);
    let mut quasis = vec![];
    let mut expressions = vec![];
    let mut current = String::new();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::template_characters => {
                current.push_str(&unescape(part.as_str()).map_err(|message| JsRuleError {
                    message,
                    start_index: part.as_span().start(),
                    end_index: part.as_span().end(),
                })?);
            }
            Rule::template_substitution => {
                quasis.push(std::mem::take(&mut current));
                expressions.push(build_expression(first_child(part, "template")?)?);
            }
            _ => return Err(get_unexpected_error("template literal", &part)),
        }
    }
    quasis.push(current);
    Ok(ExpressionType::TemplateLiteral(TemplateLiteralData {
        meta,
        quasis,
        expressions,
    }))
}

fn build_string(pair: Pair<Rule>) -> Result<String, JsRuleError> {
    let meta = get_meta(&pair);
    let raw = match pair.into_inner().next() {
        Some(chars) => chars.as_str().to_string(),
        None => String::new(),
    };
    unescape(&raw).map_err(|message| JsRuleError {
        message,
        start_index: meta.start_index,
        end_index: meta.end_index,
    })
}

fn build_number(pair: &Pair<Rule>) -> Result<NumberLiteralType, JsRuleError> {
    let text = pair.as_str();
    let invalid = || get_unexpected_error("numeric literal", pair);
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return match i64::from_str_radix(hex, 16) {
            Ok(i) => Ok(NumberLiteralType::IntegerLiteral(i)),
            Err(_) => u128::from_str_radix(hex, 16)
                .map(|u| NumberLiteralType::FloatLiteral(u as f64))
                .map_err(|_| invalid()),
        };
    }
    if text.contains(|c| c == '.' || c == 'e' || c == 'E') {
        text.parse::<f64>()
            .map(NumberLiteralType::FloatLiteral)
            .map_err(|_| invalid())
    } else {
        match text.parse::<i64>() {
            Ok(i) => Ok(NumberLiteralType::IntegerLiteral(i)),
            Err(_) => text
                .parse::<f64>()
                .map(NumberLiteralType::FloatLiteral)
                .map_err(|_| invalid()),
        }
    }
}
