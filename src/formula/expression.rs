//! Parsing and evaluation of simulation formulas
//!
//! This module provides the restricted algebraic grammar that user- and
//! AI-authored formulas are written in: numbers, parameter identifiers,
//! the constant pi, the operators `+ - * / ^`, and a closed set of named
//! functions. Formulas are parsed into a typed AST and evaluated by
//! walking the tree against an [`EvalContext`]; the string is never
//! handed to a general-purpose evaluator.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, multispace0},
    combinator::recognize,
    error::{Error as NomError, ErrorKind},
    multi::many0,
    number::complete::double,
    sequence::pair,
    IResult, Parser,
};
use std::collections::HashMap;
use std::f64::consts::PI;
use thiserror::Error;

/// Maximum accepted formula length, in bytes.
///
/// Authored formulas are one-liners; anything longer is rejected before
/// parsing so pathological input cannot stall a render tick.
pub const MAX_FORMULA_LEN: usize = 1024;

/// Maximum grammar recursion depth (parentheses, chained `^`, chained `-`).
pub const MAX_NESTING_DEPTH: usize = 64;

/// Error that can occur while parsing or evaluating a formula
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Failed to parse formula: {message}")]
    ParseError { message: String },

    #[error("Formula exceeds {max} bytes")]
    TooLong { max: usize },

    #[error("Formula nesting exceeds depth {max}")]
    TooDeep { max: usize },

    #[error("Undefined parameter: {name}")]
    UndefinedVariable { name: String },

    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },

    #[error("{name}() requires {expected} argument(s), got {got}")]
    InvalidArity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NonFinite,
}

/// Result type for formula parsing and evaluation
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Formula AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal (also produced for the `π` symbol)
    Number(f64),

    /// Parameter reference; `pi` resolves to the constant when no
    /// parameter of that name is supplied
    Variable(String),

    /// Unary operation
    Unary(UnaryOp, Box<Expr>),

    /// Binary operation
    Binary(BinaryOp, Box<Expr>, Box<Expr>),

    /// Call to one of the named functions
    Call(String, Vec<Expr>),
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    /// Addition (+)
    Add,

    /// Subtraction (-)
    Sub,

    /// Multiplication (*)
    Mul,

    /// Division (/)
    Div,

    /// Exponentiation (^), right-associative
    Pow,
}

/// Source of parameter values during evaluation.
///
/// Implemented for plain `HashMap<String, f64>` and for
/// [`ParameterSet`](crate::parameters::ParameterSet); the evaluator only
/// ever reads through this trait, so a context is never mutated by an
/// evaluation.
pub trait EvalContext {
    /// Look up the value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<f64>;
}

impl EvalContext for HashMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl<C: EvalContext> EvalContext for &C {
    fn lookup(&self, name: &str) -> Option<f64> {
        (*self).lookup(name)
    }
}

impl Expr {
    /// Parse a formula into an AST.
    ///
    /// The entire input must be consumed; trailing characters are a parse
    /// error. Inputs longer than [`MAX_FORMULA_LEN`] or nested deeper than
    /// [`MAX_NESTING_DEPTH`] are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use stemlab::formula::Expr;
    ///
    /// let expr = Expr::parse("v0 * cos(theta)").unwrap();
    /// assert_eq!(expr.variables(), vec!["theta".to_string(), "v0".to_string()]);
    /// ```
    pub fn parse(input: &str) -> FormulaResult<Self> {
        if input.len() > MAX_FORMULA_LEN {
            return Err(FormulaError::TooLong {
                max: MAX_FORMULA_LEN,
            });
        }

        match expr(input, 0) {
            Ok((remainder, parsed)) => {
                if remainder.trim().is_empty() {
                    Ok(parsed)
                } else {
                    Err(FormulaError::ParseError {
                        message: format!("unexpected trailing input: '{}'", remainder.trim()),
                    })
                }
            }
            Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => {
                Err(FormulaError::TooDeep {
                    max: MAX_NESTING_DEPTH,
                })
            }
            Err(e) => Err(FormulaError::ParseError {
                message: format!("{e:?}"),
            }),
        }
    }

    /// Evaluate the expression against the given context.
    ///
    /// Arithmetic is plain IEEE-754 double precision. Division by a zero
    /// divisor, unknown identifiers, unknown functions, and wrong arities
    /// are reported as errors; finiteness of the final result is checked
    /// by the caller (see [`evaluate_with_diagnostics`]).
    ///
    /// [`evaluate_with_diagnostics`]: crate::formula::evaluate_with_diagnostics
    pub fn evaluate<C: EvalContext>(&self, context: &C) -> FormulaResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),

            Self::Variable(name) => match context.lookup(name) {
                Some(value) => Ok(value),
                // The constant can be shadowed by a parameter named "pi".
                None if name.eq_ignore_ascii_case("pi") => Ok(PI),
                None => Err(FormulaError::UndefinedVariable { name: name.clone() }),
            },

            Self::Unary(op, inner) => {
                let value = inner.evaluate(context)?;
                match op {
                    UnaryOp::Neg => Ok(-value),
                }
            }

            Self::Binary(op, left, right) => {
                let lhs = left.evaluate(context)?;
                let rhs = right.evaluate(context)?;

                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div => {
                        if rhs == 0.0 {
                            Err(FormulaError::DivisionByZero)
                        } else {
                            Ok(lhs / rhs)
                        }
                    }
                    BinaryOp::Pow => Ok(lhs.powf(rhs)),
                }
            }

            Self::Call(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.evaluate(context)?);
                }
                apply_function(name, &values)
            }
        }
    }

    /// All identifiers referenced by the expression, sorted and deduplicated.
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Self::Number(_) => {}

            Self::Variable(name) => vars.push(name.clone()),

            Self::Unary(_, inner) => inner.collect_variables(vars),

            Self::Binary(_, left, right) => {
                left.collect_variables(vars);
                right.collect_variables(vars);
            }

            Self::Call(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }

    /// Whether any identifier in the subtree satisfies the predicate.
    pub(crate) fn mentions_variable<F: Fn(&str) -> bool>(&self, pred: &F) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Variable(name) => pred(name),
            Self::Unary(_, inner) => inner.mentions_variable(pred),
            Self::Binary(_, left, right) => {
                left.mentions_variable(pred) || right.mentions_variable(pred)
            }
            Self::Call(_, args) => args.iter().any(|arg| arg.mentions_variable(pred)),
        }
    }
}

/// Evaluate a call to the closed function set.
fn apply_function(name: &str, args: &[f64]) -> FormulaResult<f64> {
    let unary = |f: fn(f64) -> f64| {
        if args.len() != 1 {
            Err(FormulaError::InvalidArity {
                name: name.to_string(),
                expected: 1,
                got: args.len(),
            })
        } else {
            Ok(f(args[0]))
        }
    };

    match name {
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        "sqrt" => unary(f64::sqrt),
        "abs" => unary(f64::abs),
        "pow" => {
            if args.len() != 2 {
                Err(FormulaError::InvalidArity {
                    name: name.to_string(),
                    expected: 2,
                    got: args.len(),
                })
            } else {
                Ok(args[0].powf(args[1]))
            }
        }
        _ => Err(FormulaError::UndefinedFunction {
            name: name.to_string(),
        }),
    }
}

// Parser. Leaf tokens use nom; the recursive structure is hand-threaded so
// every recursion site carries an explicit depth counter.

fn too_deep(input: &str) -> nom::Err<NomError<&str>> {
    nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge))
}

fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

/// Parse an identifier (parameter or function name)
fn identifier(input: &str) -> IResult<&str, String> {
    let mut parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));

    let (input, matched) = parser.parse(input)?;
    Ok((input, matched.to_string()))
}

/// Additive level: `term (('+' | '-') term)*`, left-associative
fn expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    if depth > MAX_NESTING_DEPTH {
        return Err(too_deep(input));
    }

    let (mut input, mut lhs) = term(input, depth)?;

    loop {
        let (rest, _) = ws(input)?;
        let op = match rest.chars().next() {
            Some('+') => BinaryOp::Add,
            Some('-') => BinaryOp::Sub,
            _ => break,
        };
        let (rest, rhs) = term(&rest[1..], depth)?;
        lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        input = rest;
    }

    Ok((input, lhs))
}

/// Multiplicative level: `unary (('*' | '/') unary)*`, left-associative
fn term(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (mut input, mut lhs) = unary(input, depth)?;

    loop {
        let (rest, _) = ws(input)?;
        let op = match rest.chars().next() {
            Some('*') => BinaryOp::Mul,
            Some('/') => BinaryOp::Div,
            _ => break,
        };
        let (rest, rhs) = unary(&rest[1..], depth)?;
        lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        input = rest;
    }

    Ok((input, lhs))
}

/// Unary minus. Binds looser than `^`, so `-2^2` is `-(2^2)`.
fn unary(input: &str, depth: usize) -> IResult<&str, Expr> {
    if depth > MAX_NESTING_DEPTH {
        return Err(too_deep(input));
    }

    let (input, _) = ws(input)?;
    if let Some(rest) = input.strip_prefix('-') {
        let (rest, inner) = unary(rest, depth + 1)?;
        return Ok((rest, Expr::Unary(UnaryOp::Neg, Box::new(inner))));
    }

    power(input, depth)
}

/// Exponentiation: `primary ('^' unary)?`, right-associative with a
/// possibly signed exponent (`2^-3`).
fn power(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, lhs) = primary(input, depth)?;

    let (rest, _) = ws(input)?;
    if let Some(rest) = rest.strip_prefix('^') {
        let (rest, rhs) = unary(rest, depth + 1)?;
        return Ok((
            rest,
            Expr::Binary(BinaryOp::Pow, Box::new(lhs), Box::new(rhs)),
        ));
    }

    Ok((input, lhs))
}

/// Primary: number, `π`, function call, parameter, or parenthesized expression
fn primary(input: &str, depth: usize) -> IResult<&str, Expr> {
    if depth > MAX_NESTING_DEPTH {
        return Err(too_deep(input));
    }

    let (input, _) = ws(input)?;

    // `double` also lexes "inf"/"infinity"/"nan"; gate it on a leading
    // digit or dot so identifiers like `infrared` stay identifiers.
    if input.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        if let Ok((rest, value)) = double::<_, NomError<&str>>(input) {
            return Ok((rest, Expr::Number(value)));
        }
    }

    if let Ok((rest, _)) = tag::<_, _, NomError<&str>>("π").parse(input) {
        return Ok((rest, Expr::Number(PI)));
    }

    match function_call(input, depth) {
        Ok(result) => return Ok(result),
        // Depth overruns inside arguments must not be retried as a variable.
        Err(failure @ nom::Err::Failure(_)) => return Err(failure),
        Err(_) => {}
    }

    if let Ok((rest, name)) = identifier(input) {
        return Ok((rest, Expr::Variable(name)));
    }

    parens(input, depth)
}

/// Function call: `name '(' expr (',' expr)* ')'`
fn function_call(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, name) = identifier(input)?;
    let (input, _) = ws(input)?;

    let Some(input) = input.strip_prefix('(') else {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)));
    };
    let (input, _) = ws(input)?;

    if let Some(rest) = input.strip_prefix(')') {
        return Ok((rest, Expr::Call(name, vec![])));
    }

    let (mut input, first) = expr(input, depth + 1)?;
    let mut args = vec![first];

    loop {
        let (rest, _) = ws(input)?;
        match rest.strip_prefix(',') {
            Some(rest) => {
                let (rest, arg) = expr(rest, depth + 1)?;
                args.push(arg);
                input = rest;
            }
            None => {
                input = rest;
                break;
            }
        }
    }

    let Some(input) = input.strip_prefix(')') else {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)));
    };

    Ok((input, Expr::Call(name, args)))
}

/// Parenthesized expression
fn parens(input: &str, depth: usize) -> IResult<&str, Expr> {
    let Some(input) = input.strip_prefix('(') else {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)));
    };

    let (input, inner) = expr(input, depth + 1)?;
    let (input, _) = ws(input)?;

    let Some(input) = input.strip_prefix(')') else {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)));
    };

    Ok((input, inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ctx(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(Expr::parse("42").unwrap(), Expr::Number(42.0));
        assert_eq!(Expr::parse("3.14").unwrap(), Expr::Number(3.14));
        assert_eq!(Expr::parse("1e3").unwrap(), Expr::Number(1000.0));

        assert_eq!(
            Expr::parse("-2.5").unwrap(),
            Expr::Unary(UnaryOp::Neg, Box::new(Expr::Number(2.5)))
        );
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(
            Expr::parse("v0").unwrap(),
            Expr::Variable("v0".to_string())
        );
        assert_eq!(
            Expr::parse("_resistance").unwrap(),
            Expr::Variable("_resistance".to_string())
        );
    }

    #[test]
    fn test_identifiers_starting_like_float_literals() {
        // "inf" and "nan" prefixes must lex as identifiers, not numbers.
        assert_eq!(
            Expr::parse("infrared").unwrap(),
            Expr::Variable("infrared".to_string())
        );
        assert_eq!(
            Expr::parse("nanometers").unwrap(),
            Expr::Variable("nanometers".to_string())
        );

        let params = ctx(&[("infrared", 5.0), ("nanometers", 450.0)]);
        assert_eq!(
            Expr::parse("infrared * 2")
                .unwrap()
                .evaluate(&params)
                .unwrap(),
            10.0
        );
        assert_eq!(
            Expr::parse("infrared + nanometers")
                .unwrap()
                .evaluate(&params)
                .unwrap(),
            455.0
        );
    }

    #[test]
    fn test_parse_function_call() {
        assert_eq!(
            Expr::parse("sin(x)").unwrap(),
            Expr::Call("sin".to_string(), vec![Expr::Variable("x".to_string())])
        );

        assert_eq!(
            Expr::parse("pow(a, 2)").unwrap(),
            Expr::Call(
                "pow".to_string(),
                vec![Expr::Variable("a".to_string()), Expr::Number(2.0)]
            )
        );
    }

    #[test]
    fn test_pi_spellings() {
        let empty = HashMap::new();
        for formula in ["pi", "PI", "Pi", "π"] {
            let value = Expr::parse(formula).unwrap().evaluate(&empty).unwrap();
            assert_relative_eq!(value, PI);
        }
    }

    #[test]
    fn test_pi_shadowed_by_parameter() {
        let params = ctx(&[("pi", 3.0)]);
        let value = Expr::parse("pi").unwrap().evaluate(&params).unwrap();
        assert_eq!(value, 3.0);
    }

    #[test]
    fn test_left_associativity() {
        let empty = HashMap::new();
        assert_eq!(
            Expr::parse("10 - 3 - 2").unwrap().evaluate(&empty).unwrap(),
            5.0
        );
        assert_eq!(
            Expr::parse("24 / 4 / 2").unwrap().evaluate(&empty).unwrap(),
            3.0
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let empty = HashMap::new();
        assert_eq!(
            Expr::parse("2 ^ 3 ^ 2").unwrap().evaluate(&empty).unwrap(),
            512.0
        );
    }

    #[test]
    fn test_power_binds_tighter_than_unary_minus() {
        let empty = HashMap::new();
        assert_eq!(Expr::parse("-2^2").unwrap().evaluate(&empty).unwrap(), -4.0);
        assert_eq!(Expr::parse("2^-2").unwrap().evaluate(&empty).unwrap(), 0.25);
    }

    #[test]
    fn test_precedence() {
        let empty = HashMap::new();
        assert_eq!(
            Expr::parse("1 + 2 * 3 ^ 2").unwrap().evaluate(&empty).unwrap(),
            19.0
        );
        assert_eq!(
            Expr::parse("(1 + 2) * 3").unwrap().evaluate(&empty).unwrap(),
            9.0
        );
    }

    #[test]
    fn test_evaluate_with_parameters() {
        let params = ctx(&[("a", 2.0), ("b", 3.0)]);

        assert_eq!(
            Expr::parse("a + b").unwrap().evaluate(&params).unwrap(),
            5.0
        );
        assert_eq!(
            Expr::parse("a ^ b").unwrap().evaluate(&params).unwrap(),
            8.0
        );
        assert_eq!(
            Expr::parse("2 * (a + 1) / (4 - b)")
                .unwrap()
                .evaluate(&params)
                .unwrap(),
            6.0
        );
    }

    #[test]
    fn test_functions() {
        let params = ctx(&[("x", 2.0)]);

        assert_relative_eq!(
            Expr::parse("sin(x)").unwrap().evaluate(&params).unwrap(),
            2.0_f64.sin()
        );
        assert_relative_eq!(
            Expr::parse("sqrt(x)").unwrap().evaluate(&params).unwrap(),
            2.0_f64.sqrt()
        );
        assert_eq!(
            Expr::parse("abs(-x)").unwrap().evaluate(&params).unwrap(),
            2.0
        );
        assert_eq!(
            Expr::parse("pow(x, 10)").unwrap().evaluate(&params).unwrap(),
            1024.0
        );
    }

    #[test]
    fn test_evaluation_errors() {
        let empty = HashMap::new();

        match Expr::parse("x").unwrap().evaluate(&empty) {
            Err(FormulaError::UndefinedVariable { name }) => assert_eq!(name, "x"),
            other => panic!("expected UndefinedVariable, got {other:?}"),
        }

        match Expr::parse("1 / 0").unwrap().evaluate(&empty) {
            Err(FormulaError::DivisionByZero) => {}
            other => panic!("expected DivisionByZero, got {other:?}"),
        }

        match Expr::parse("foo(1)").unwrap().evaluate(&empty) {
            Err(FormulaError::UndefinedFunction { name }) => assert_eq!(name, "foo"),
            other => panic!("expected UndefinedFunction, got {other:?}"),
        }

        match Expr::parse("sin(1, 2)").unwrap().evaluate(&empty) {
            Err(FormulaError::InvalidArity { expected: 1, got: 2, .. }) => {}
            other => panic!("expected InvalidArity, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Expr::parse("("),
            Err(FormulaError::ParseError { .. })
        ));
        assert!(matches!(
            Expr::parse("1 +"),
            Err(FormulaError::ParseError { .. })
        ));
        assert!(matches!(
            Expr::parse("2x"),
            Err(FormulaError::ParseError { .. })
        ));
        assert!(matches!(
            Expr::parse("sin(45°)"),
            Err(FormulaError::ParseError { .. })
        ));
        assert!(matches!(
            Expr::parse(""),
            Err(FormulaError::ParseError { .. })
        ));
    }

    #[test]
    fn test_length_guard() {
        let long = "1+".repeat(MAX_FORMULA_LEN);
        assert_eq!(
            Expr::parse(&long),
            Err(FormulaError::TooLong {
                max: MAX_FORMULA_LEN
            })
        );
    }

    #[test]
    fn test_depth_guard() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(
            Expr::parse(&deep),
            Err(FormulaError::TooDeep {
                max: MAX_NESTING_DEPTH
            })
        );

        // Long chains of unary minus recurse too.
        let minuses = format!("{}1", "-".repeat(200));
        assert_eq!(
            Expr::parse(&minuses),
            Err(FormulaError::TooDeep {
                max: MAX_NESTING_DEPTH
            })
        );
    }

    #[test]
    fn test_variables() {
        assert_eq!(
            Expr::parse("(v0^2 * sin(2*theta)) / g").unwrap().variables(),
            vec!["g".to_string(), "theta".to_string(), "v0".to_string()]
        );

        // Function names are not variables.
        assert_eq!(
            Expr::parse("sqrt(length / gravity)").unwrap().variables(),
            vec!["gravity".to_string(), "length".to_string()]
        );
    }

    #[test]
    fn test_mentions_variable() {
        let expr = Expr::parse("2 * theta + x").unwrap();
        assert!(expr.mentions_variable(&|name: &str| name.contains("theta")));
        assert!(!expr.mentions_variable(&|name: &str| name.contains("angle")));
    }
}
