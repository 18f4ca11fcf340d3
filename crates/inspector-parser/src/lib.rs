//! Inspector Parser - Recursive descent parser
//!
//! Parses synthesized unit source text into a [`UnitFile`].
//! Key parsing challenges:
//! - The query is embedded verbatim, so any malformed query text must
//!   surface as a precise parse error inside the generated unit
//! - Lambdas (`x => ...`, `(a, b) => ...`) need bounded lookahead to tell
//!   them apart from parenthesized expressions

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use inspector_ast::{Expr, UnitFile};
use inspector_lexer::tokenize;

/// Parse unit source text
pub fn parse(source: &str) -> Result<UnitFile, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_unit_file()
}

/// Parse a standalone expression
pub fn parse_expr(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_standalone_expr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_ast::{BinaryOp, ExprKind, Literal, TypeRef, UnaryOp};

    const RICH_UNIT: &str = r#"
use core;
use trading.interfaces;
namespace inspector {
unit Inspector1 {
fn evaluate(algorithm: Algorithm) -> any {
return algorithm.Portfolio.Cash;
}
}
}
"#;

    // === Unit Files ===

    #[test]
    fn test_parse_rich_unit() {
        let result = parse(RICH_UNIT);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
        let unit = result.unwrap();

        assert_eq!(unit.imports.len(), 2);
        assert_eq!(unit.imports[1].path.dotted(), "trading.interfaces");
        assert_eq!(unit.namespace.name.dotted(), "inspector");

        let decl = &unit.namespace.units[0];
        assert_eq!(decl.name, "Inspector1");
        let method = &decl.methods[0];
        assert_eq!(method.name, "evaluate");
        assert_eq!(method.params.len(), 1);
        assert_eq!(method.params[0].name, "algorithm");
        assert_eq!(method.ret, TypeRef::Any);
        assert!(matches!(method.body.kind, ExprKind::Member { ref name, .. } if name == "Cash"));
    }

    #[test]
    fn test_parse_parameterless_unit() {
        let source = "use core; namespace inspector { unit Inspector2 { fn evaluate() -> any { return 1 + 1; } } }";
        let result = parse(source);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
        let unit = result.unwrap();
        assert!(unit.namespace.units[0].methods[0].params.is_empty());
    }

    #[test]
    fn test_injected_braces_are_rejected() {
        let source = "namespace inspector { unit A { fn evaluate() -> any { return 1; } } } }; } } }";
        assert!(parse(source).is_err());
    }

    #[test]
    fn test_missing_semicolon_after_return() {
        let source = "namespace inspector { unit A { fn evaluate() -> any { return 1 } } }";
        let err = parse(source).unwrap_err();
        assert!(err.to_string().contains("`;`"), "unexpected message: {}", err);
    }

    // === Expressions ===

    #[test]
    fn test_precedence() {
        let expr = parse_expr("1 + 2 * 3").unwrap();
        match expr.kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associative_subtraction() {
        let expr = parse_expr("10 - 4 - 3").unwrap();
        match expr.kind {
            ExprKind::Binary { op, left, .. } => {
                assert_eq!(op, BinaryOp::Sub);
                assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional_and_coalesce() {
        let expr = parse_expr("a ?? b ? 1 : 2").unwrap();
        match expr.kind {
            ExprKind::Conditional { cond, .. } => {
                assert!(matches!(cond.kind, ExprKind::Binary { op: BinaryOp::Coalesce, .. }));
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_unary() {
        let expr = parse_expr("-x").unwrap();
        assert!(matches!(expr.kind, ExprKind::Unary { op: UnaryOp::Neg, .. }));
        let expr = parse_expr("!!flag").unwrap();
        assert!(matches!(expr.kind, ExprKind::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn test_method_chain() {
        let expr = parse_expr("algorithm.Securities.values().where(s => s.Price > 10).count()").unwrap();
        match expr.kind {
            ExprKind::MethodCall { name, receiver, args, .. } => {
                assert_eq!(name, "count");
                assert!(args.is_empty());
                assert!(matches!(receiver.kind, ExprKind::MethodCall { ref name, .. } if name == "where"));
            }
            other => panic!("Expected method call, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_as_method_name() {
        let expr = parse_expr("xs.any(x => x > 1)").unwrap();
        assert!(matches!(expr.kind, ExprKind::MethodCall { ref name, .. } if name == "any"));
        assert!(parse_expr("any(xs)").is_err());
    }

    #[test]
    fn test_lambda_forms() {
        let expr = parse_expr("x => x * 2").unwrap();
        assert!(matches!(expr.kind, ExprKind::Lambda { ref params, .. } if params == &["x"]));

        let expr = parse_expr("(a, b) => a + b").unwrap();
        assert!(matches!(expr.kind, ExprKind::Lambda { ref params, .. } if params.len() == 2));

        let expr = parse_expr("() => 1").unwrap();
        assert!(matches!(expr.kind, ExprKind::Lambda { ref params, .. } if params.is_empty()));

        // A parenthesized identifier without an arrow is just grouping
        let expr = parse_expr("(a)").unwrap();
        assert!(matches!(expr.kind, ExprKind::Ident(ref name) if name == "a"));
    }

    #[test]
    fn test_index_and_list() {
        let expr = parse_expr("[1, 2, 3][0]").unwrap();
        match expr.kind {
            ExprKind::Index { target, .. } => {
                assert!(matches!(target.kind, ExprKind::List(ref items) if items.len() == 3));
            }
            other => panic!("Expected index, got {:?}", other),
        }
    }

    #[test]
    fn test_string_escapes() {
        let expr = parse_expr(r#""a\"b\n""#).unwrap();
        assert_eq!(expr.kind, ExprKind::Literal(Literal::String("a\"b\n".into())));
        assert!(matches!(
            parse_expr(r#""\q""#),
            Err(ParseError::InvalidEscape { ch: 'q', .. })
        ));
    }

    #[test]
    fn test_spans_cover_source() {
        let source = "foo.bar(1)";
        let expr = parse_expr(source).unwrap();
        assert_eq!(expr.span.start, 0);
        assert_eq!(expr.span.end, source.len());
    }

    // === Error Cases ===

    #[test]
    fn test_unbalanced_parenthesis() {
        let err = parse_expr("(1 + 1").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
        assert!(err.to_string().contains("end of input"), "unexpected message: {}", err);
    }

    #[test]
    fn test_invalid_token() {
        let err = parse_expr("1 # 2").unwrap_err();
        assert!(matches!(err, ParseError::InvalidToken { ref text, .. } if text == "#"));
    }

    #[test]
    fn test_integer_overflow() {
        let err = parse_expr("99999999999999999999").unwrap_err();
        assert!(matches!(err, ParseError::IntegerOverflow { .. }));
    }

    #[test]
    fn test_negative_literal_spans_full_range() {
        let expr = parse_expr("-9223372036854775808").unwrap();
        assert_eq!(expr.kind, ExprKind::Literal(Literal::Int(i64::MIN)));
        assert_eq!((expr.span.start, expr.span.end), (0, 20));

        let expr = parse_expr("3 - 9223372036854775807").unwrap();
        assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));

        let err = parse_expr("-9223372036854775809").unwrap_err();
        assert!(matches!(err, ParseError::IntegerOverflow { ref text, .. } if text == "-9223372036854775809"));
    }

    #[test]
    fn test_negation_binds_looser_than_postfix() {
        let expr = parse_expr("-5.abs()").unwrap();
        assert!(matches!(expr.kind, ExprKind::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn test_long_operator_chain_is_rejected() {
        let sum = format!("1{}", "+1".repeat(100_000));
        assert!(matches!(parse_expr(&sum), Err(ParseError::TooDeep { .. })));

        let coalesce = format!("null{}", " ?? null".repeat(100_000));
        assert!(matches!(parse_expr(&coalesce), Err(ParseError::TooDeep { .. })));

        let members = format!("a{}", ".b".repeat(10_000));
        assert!(matches!(parse_expr(&members), Err(ParseError::TooDeep { .. })));
    }

    #[test]
    fn test_operator_chain_within_height_limit() {
        let sum = format!("1{}", "+1".repeat(MAX_HEIGHT - 2));
        let expr = parse_expr(&sum).unwrap();
        assert!(expr.height() <= MAX_HEIGHT);

        let coalesce = format!("a{}", " ?? b".repeat(50));
        let expr = parse_expr(&coalesce).unwrap();
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::Coalesce, left, .. } => {
                assert_eq!(left.kind, ExprKind::Ident("a".into()));
            }
            other => panic!("Expected coalesce, got {:?}", other),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 5), ")".repeat(MAX_DEPTH + 5));
        assert!(matches!(parse_expr(&deep), Err(ParseError::TooDeep { .. })));

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parse_expr(&shallow).is_ok());
    }

    #[test]
    fn test_empty_expression() {
        assert!(parse_expr("").is_err());
    }
}
