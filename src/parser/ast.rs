use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Error raised when a binding expression does not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct JsRuleError {
    pub message: String,
    pub start_index: usize,
    pub end_index: usize,
}

impl Display for JsRuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.start_index)
    }
}

impl std::error::Error for JsRuleError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
}

pub trait HasMeta {
    fn get_meta(&self) -> &Meta;
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierData {
    pub name: String,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumberLiteralType {
    IntegerLiteral(i64),
    FloatLiteral(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    NullLiteral,
    BooleanLiteral(bool),
    StringLiteral(String),
    NumberLiteral(NumberLiteralType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralData {
    pub meta: Meta,
    pub value: LiteralType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteralData {
    pub meta: Meta,
    /// Cooked text chunks; always one more than `expressions`.
    pub quasis: Vec<String>,
    pub expressions: Vec<ExpressionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunctionData {
    pub meta: Meta,
    pub params: Vec<IdentifierData>,
    pub body: Box<ExpressionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionOrSpreadElement {
    Expression(ExpressionType),
    SpreadElement(ExpressionType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKeyType {
    Static(String),
    Computed(ExpressionType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyData {
    KeyValue {
        key: PropertyKeyType,
        value: ExpressionType,
    },
    Shorthand(IdentifierData),
    Spread(ExpressionType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberPropertyType {
    Static(IdentifierData),
    Computed(Box<ExpressionType>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionType {
    Literal(LiteralData),
    Identifier(IdentifierData),
    ThisExpression {
        meta: Meta,
    },
    TemplateLiteral(TemplateLiteralData),
    ArrayExpression {
        meta: Meta,
        elements: Vec<ExpressionOrSpreadElement>,
    },
    ObjectExpression {
        meta: Meta,
        properties: Vec<PropertyData>,
    },
    ArrowFunctionExpression(Rc<ArrowFunctionData>),
    UnaryExpression {
        meta: Meta,
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    BinaryExpression {
        meta: Meta,
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    LogicalExpression {
        meta: Meta,
        operator: LogicalOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    ConditionalExpression {
        meta: Meta,
        test: Box<ExpressionType>,
        consequent: Box<ExpressionType>,
        alternate: Box<ExpressionType>,
    },
    AssignmentExpression {
        meta: Meta,
        operator: AssignmentOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    MemberExpression {
        meta: Meta,
        object: Box<ExpressionType>,
        property: MemberPropertyType,
        optional: bool,
    },
    CallExpression {
        meta: Meta,
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionOrSpreadElement>,
        optional: bool,
    },
    /// Boundary of a member/call chain containing `?.`; a short-circuit
    /// anywhere inside yields `undefined` here.
    ChainExpression {
        meta: Meta,
        expression: Box<ExpressionType>,
    },
    SequenceExpression {
        meta: Meta,
        expressions: Vec<ExpressionType>,
    },
}

impl HasMeta for ExpressionType {
    fn get_meta(&self) -> &Meta {
        match self {
            ExpressionType::Literal(data) => &data.meta,
            ExpressionType::Identifier(data) => &data.meta,
            ExpressionType::ThisExpression { meta } => meta,
            ExpressionType::TemplateLiteral(data) => &data.meta,
            ExpressionType::ArrayExpression { meta, .. } => meta,
            ExpressionType::ObjectExpression { meta, .. } => meta,
            ExpressionType::ArrowFunctionExpression(data) => &data.meta,
            ExpressionType::UnaryExpression { meta, .. } => meta,
            ExpressionType::BinaryExpression { meta, .. } => meta,
            ExpressionType::LogicalExpression { meta, .. } => meta,
            ExpressionType::ConditionalExpression { meta, .. } => meta,
            ExpressionType::AssignmentExpression { meta, .. } => meta,
            ExpressionType::MemberExpression { meta, .. } => meta,
            ExpressionType::CallExpression { meta, .. } => meta,
            ExpressionType::ChainExpression { meta, .. } => meta,
            ExpressionType::SequenceExpression { meta, .. } => meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    LogicalNot,
    BitwiseNot,
    TypeOf,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    LooselyEqual,
    LooselyUnequal,
    StrictlyEqual,
    StrictlyUnequal,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    BitwiseLeftShift,
    BitwiseRightShift,
    BitwiseUnsignedRightShift,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOperator {
    Or,
    And,
    NullishCoalescing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignmentOperator {
    Equals,
    AddEquals,
    SubtractEquals,
    MultiplyEquals,
    ExponentEquals,
    DivideEquals,
    ModuloEquals,
    AndEquals,
    OrEquals,
    NullishEquals,
}

impl UnaryOperator {
    pub fn from_str(op: &str) -> Option<Self> {
        Some(match op {
            "-" => UnaryOperator::Minus,
            "+" => UnaryOperator::Plus,
            "!" => UnaryOperator::LogicalNot,
            "~" => UnaryOperator::BitwiseNot,
            "typeof" => UnaryOperator::TypeOf,
            "void" => UnaryOperator::Void,
            _ => return None,
        })
    }
}

impl BinaryOperator {
    pub fn from_str(op: &str) -> Option<Self> {
        Some(match op {
            "==" => BinaryOperator::LooselyEqual,
            "!=" => BinaryOperator::LooselyUnequal,
            "===" => BinaryOperator::StrictlyEqual,
            "!==" => BinaryOperator::StrictlyUnequal,
            "<" => BinaryOperator::LessThan,
            "<=" => BinaryOperator::LessThanEqual,
            ">" => BinaryOperator::GreaterThan,
            ">=" => BinaryOperator::GreaterThanEqual,
            "<<" => BinaryOperator::BitwiseLeftShift,
            ">>" => BinaryOperator::BitwiseRightShift,
            ">>>" => BinaryOperator::BitwiseUnsignedRightShift,
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Modulo,
            "**" => BinaryOperator::Exponent,
            "|" => BinaryOperator::BitwiseOr,
            "^" => BinaryOperator::BitwiseXor,
            "&" => BinaryOperator::BitwiseAnd,
            "in" => BinaryOperator::In,
            _ => return None,
        })
    }
}

impl LogicalOperator {
    pub fn from_str(op: &str) -> Option<Self> {
        Some(match op {
            "||" => LogicalOperator::Or,
            "&&" => LogicalOperator::And,
            "??" => LogicalOperator::NullishCoalescing,
            _ => return None,
        })
    }
}

impl AssignmentOperator {
    pub fn from_str(op: &str) -> Option<Self> {
        Some(match op {
            "=" => AssignmentOperator::Equals,
            "+=" => AssignmentOperator::AddEquals,
            "-=" => AssignmentOperator::SubtractEquals,
            "*=" => AssignmentOperator::MultiplyEquals,
            "**=" => AssignmentOperator::ExponentEquals,
            "/=" => AssignmentOperator::DivideEquals,
            "%=" => AssignmentOperator::ModuloEquals,
            "&&=" => AssignmentOperator::AndEquals,
            "||=" => AssignmentOperator::OrEquals,
            "??=" => AssignmentOperator::NullishEquals,
            _ => return None,
        })
    }
}
