use super::api::{ExprParser, Rule};
use super::ast::*;

use pest::{consumes_to, parses_to};
use pest::Parser;

fn parse(code: &str) -> ExpressionType {
    ExprParser::parse_to_ast_from_str(code).unwrap()
}

#[test]
fn test_decimal_number() {
    parses_to! {
        parser: ExprParser,
        input: "10.5",
        rule: Rule::numeric_literal,
        tokens: [
            numeric_literal(0, 4)
        ]
    };
}

#[test]
fn test_hex_number() {
    parses_to! {
        parser: ExprParser,
        input: "0xFF",
        rule: Rule::numeric_literal,
        tokens: [
            numeric_literal(0, 4)
        ]
    };
}

#[test]
fn test_single_quoted_string() {
    parses_to! {
        parser: ExprParser,
        input: "'ab'",
        rule: Rule::string_literal,
        tokens: [
            string_literal(0, 4, [
                single_string_characters(1, 3)
            ])
        ]
    };
}

#[test]
fn test_identifier_with_dollar() {
    parses_to! {
        parser: ExprParser,
        input: "$row_1",
        rule: Rule::identifier,
        tokens: [
            identifier(0, 6)
        ]
    };
}

#[test]
fn test_reserved_words_are_not_identifiers() {
    assert!(ExprParser::parse(Rule::identifier, "typeof").is_err());
    assert!(ExprParser::parse(Rule::identifier, "instanceof").is_err());
    assert!(ExprParser::parse(Rule::identifier, "in").is_err());
}

#[test]
fn test_identifiers_starting_with_reserved_words() {
    assert!(ExprParser::parse(Rule::identifier, "index").is_ok());
    assert!(ExprParser::parse(Rule::identifier, "double").is_ok());
    assert!(ExprParser::parse(Rule::identifier, "nullable").is_ok());
}

#[test]
fn test_additive_is_left_associative() {
    match parse("1 - 2 - 3") {
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::Subtract,
            left,
            right,
            ..
        } => {
            assert!(matches!(
                *left,
                ExpressionType::BinaryExpression {
                    operator: BinaryOperator::Subtract,
                    ..
                }
            ));
            assert!(matches!(*right, ExpressionType::Literal(_)));
        }
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    match parse("1 + 2 * 3") {
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::Add,
            right,
            ..
        } => assert!(matches!(
            *right,
            ExpressionType::BinaryExpression {
                operator: BinaryOperator::Multiply,
                ..
            }
        )),
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_exponent_is_right_associative() {
    match parse("2 ** 3 ** 2") {
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::Exponent,
            left,
            right,
            ..
        } => {
            assert!(matches!(*left, ExpressionType::Literal(_)));
            assert!(matches!(
                *right,
                ExpressionType::BinaryExpression {
                    operator: BinaryOperator::Exponent,
                    ..
                }
            ));
        }
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_member_chain() {
    match parse("user.profile.name") {
        ExpressionType::MemberExpression {
            object,
            property: MemberPropertyType::Static(name),
            optional: false,
            ..
        } => {
            assert_eq!(name.name, "name");
            assert!(matches!(*object, ExpressionType::MemberExpression { .. }));
        }
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_optional_chain_is_wrapped() {
    match parse("a?.b.c") {
        ExpressionType::ChainExpression { expression, .. } => match *expression {
            ExpressionType::MemberExpression {
                object,
                optional: false,
                ..
            } => assert!(matches!(
                *object,
                ExpressionType::MemberExpression { optional: true, .. }
            )),
            other => panic!("unexpected ast {:?}", other),
        },
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_keyword_property_names() {
    assert!(matches!(
        parse("item.default"),
        ExpressionType::MemberExpression { .. }
    ));
}

#[test]
fn test_call_with_spread() {
    match parse("Math.max(...values, 3)") {
        ExpressionType::CallExpression { arguments, .. } => {
            assert_eq!(arguments.len(), 2);
            assert!(matches!(
                arguments[0],
                ExpressionOrSpreadElement::SpreadElement(_)
            ));
        }
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_arrow_functions() {
    for code in &["x => x * 2", "(a, b) => a + b", "() => 1"] {
        assert!(
            matches!(parse(code), ExpressionType::ArrowFunctionExpression(_)),
            "{}",
            code
        );
    }
    match parse("(a, b) => a + b") {
        ExpressionType::ArrowFunctionExpression(f) => {
            let names: Vec<&str> = f.params.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
        }
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_parenthesized_expression_is_not_arrow() {
    assert!(matches!(
        parse("(a + b) * 2"),
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::Multiply,
            ..
        }
    ));
}

#[test]
fn test_template_literal_parts() {
    match parse("`Hello ${name}, you have ${count} items`") {
        ExpressionType::TemplateLiteral(data) => {
            assert_eq!(data.quasis, vec!["Hello ", ", you have ", " items"]);
            assert_eq!(data.expressions.len(), 2);
        }
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_template_literal_starting_with_substitution() {
    match parse("`${a}${b}`") {
        ExpressionType::TemplateLiteral(data) => {
            assert_eq!(data.quasis, vec!["", "", ""]);
            assert_eq!(data.expressions.len(), 2);
        }
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_string_escapes() {
    match parse(r#""a\nA\x42""#) {
        ExpressionType::Literal(LiteralData {
            value: LiteralType::StringLiteral(s),
            ..
        }) => assert_eq!(s, "a\nAB"),
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_object_literal_members() {
    match parse("{ a: 1, 'b c': 2, [k]: 3, d, ...rest, 4: 5 }") {
        ExpressionType::ObjectExpression { properties, .. } => {
            assert_eq!(properties.len(), 6);
            assert!(matches!(properties[3], PropertyData::Shorthand(_)));
            assert!(matches!(properties[4], PropertyData::Spread(_)));
            match &properties[5] {
                PropertyData::KeyValue {
                    key: PropertyKeyType::Static(k),
                    ..
                } => assert_eq!(k, "4"),
                other => panic!("unexpected property {:?}", other),
            }
        }
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_conditional_and_coalesce() {
    match parse("a ?? b ? c : d") {
        ExpressionType::ConditionalExpression { test, .. } => assert!(matches!(
            *test,
            ExpressionType::LogicalExpression {
                operator: LogicalOperator::NullishCoalescing,
                ..
            }
        )),
        other => panic!("unexpected ast {:?}", other),
    }
}

#[test]
fn test_assignment_parses() {
    assert!(matches!(
        parse("window.location = 'x'"),
        ExpressionType::AssignmentExpression {
            operator: AssignmentOperator::Equals,
            ..
        }
    ));
}

#[test]
fn test_comments_are_skipped() {
    assert!(matches!(
        parse("/* total */ a + // trailing\n b"),
        ExpressionType::BinaryExpression { .. }
    ));
}

#[test]
fn test_syntax_errors() {
    for code in &["", "1 +", "a b", "function () {}", "a ? b", "[1, 2"] {
        assert!(ExprParser::parse_to_ast_from_str(code).is_err(), "{}", code);
    }
}

#[test]
fn test_syntax_error_position() {
    let err = ExprParser::parse_to_ast_from_str("a + * b").unwrap_err();
    assert_eq!(err.start_index, 4);
    assert_eq!(err.message, "Unexpected token '*'");
}
