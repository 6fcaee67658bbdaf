//! Tuple notation parser for type expressions.
//!
//! Skip types given on the command line cannot use JSON arrays comfortably, so
//! they are written in a compact tuple notation that mirrors how descriptions
//! print their types.
//!
//! ## Grammar
//!
//! ```text
//! <expr>   := <tuple> | <atom>
//! <tuple>  := "(" [<expr> ("," <expr>)* [","]] ")"
//! <atom>   := '"' chars '"' | "'" chars "'" | <bare>
//! <bare>   := one or more chars other than whitespace, "(", ")", ",", quotes
//! ```
//!
//! Bare atoms that read as numbers become opaque atoms (array extents);
//! everything else is a leaf identifier.
//!
//! ## Examples
//!
//! ```text
//! float64                          # leaf
//! ((int32, const), &)              # const reference to int32
//! ((vector, float64, const), &)    # const reference to vector of float64
//! (float64, 3)                     # fixed-size array, extent is opaque
//! (vector, ?)                      # vector of anything (wildcard)
//! "unsigned int"                   # quoted leaf with whitespace
//! ```

use serde_json::Value;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, opt};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};
use winnow::ModalResult;

use crate::error::PatternError;
use crate::types::TypeExpr;

/// Parse a type expression from tuple notation.
///
/// # Examples
///
/// ```
/// use typefilter_core::pattern::parse_type_expr;
/// use typefilter_core::TypeExpr;
///
/// let t = parse_type_expr("((int32, const), &)").unwrap();
/// assert_eq!(
///     t,
///     TypeExpr::composite([
///         TypeExpr::composite([TypeExpr::leaf("int32"), TypeExpr::leaf("const")]),
///         "&".into(),
///     ])
/// );
/// ```
pub fn parse_type_expr(input: &str) -> Result<TypeExpr, PatternError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PatternError::Invalid {
            input: input.to_string(),
            message: "empty pattern".to_string(),
        });
    }

    parse_expr.parse(input).map_err(|e| PatternError::Invalid {
        input: input.to_string(),
        message: format!("{:?}", e),
    })
}

/// Parse a skip-type pattern.
///
/// Same notation as [`parse_type_expr`], but an empty tuple anywhere in the
/// pattern is rejected since it is a prefix of every composite.
pub fn parse_pattern(input: &str) -> Result<TypeExpr, PatternError> {
    let expr = parse_type_expr(input)?;
    if expr.has_empty_composite() {
        return Err(PatternError::EmptyComposite {
            input: input.trim().to_string(),
        });
    }
    Ok(expr)
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

fn parse_expr(input: &mut &str) -> ModalResult<TypeExpr> {
    let _ = multispace0.parse_next(input)?;
    let expr = alt((parse_tuple, parse_atom)).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    Ok(expr)
}

/// Parse a parenthesized, comma-separated tuple (trailing comma allowed).
fn parse_tuple(input: &mut &str) -> ModalResult<TypeExpr> {
    '('.parse_next(input)?;
    let mut items = Vec::new();
    loop {
        let _ = multispace0.parse_next(input)?;
        if opt(')').parse_next(input)?.is_some() {
            break;
        }
        items.push(parse_expr(input)?);
        if opt(',').parse_next(input)?.is_none() {
            ')'.parse_next(input)?;
            break;
        }
    }
    Ok(TypeExpr::Composite(items))
}

fn parse_atom(input: &mut &str) -> ModalResult<TypeExpr> {
    alt((
        parse_double_quoted.map(TypeExpr::Leaf),
        parse_single_quoted.map(TypeExpr::Leaf),
        parse_bare,
    ))
    .parse_next(input)
}

fn parse_double_quoted(input: &mut &str) -> ModalResult<String> {
    delimited('"', take_till(0.., |c| c == '"'), '"')
        .map(|s: &str| s.to_string())
        .parse_next(input)
}

fn parse_single_quoted(input: &mut &str) -> ModalResult<String> {
    delimited('\'', take_till(0.., |c| c == '\''), '\'')
        .map(|s: &str| s.to_string())
        .parse_next(input)
}

/// Parse an unquoted atom; numeric tokens become opaque atoms.
fn parse_bare(input: &mut &str) -> ModalResult<TypeExpr> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '(' | ')' | ',' | '"' | '\'')
    })
    .map(|s: &str| match serde_json::from_str::<Value>(s) {
        Ok(value @ Value::Number(_)) => TypeExpr::Opaque(value.to_string()),
        _ => TypeExpr::Leaf(s.to_string()),
    })
    .parse_next(input)
}
