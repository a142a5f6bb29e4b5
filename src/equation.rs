//! Parsing of textual reaction equations.
//!
//! An equation such as `"2 A + B <=> C"` is turned into a [`Reaction`] whose educts and
//! products reference species of a document. Supported operators are `<=>`, `<->` and
//! `=` for reversible and `->` for irreversible reactions. Terms are separated by `+`
//! and may carry a leading stoichiometric coefficient (default `1`).
//!
//! Each term is first looked up as a whole, so species whose names start with a digit
//! (`2-oxoglutarate`) resolve without a coefficient. Names that contain operator
//! characters must be double quoted: `"A+B complex" -> C`.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::store::StoreError;
use crate::versions::v2::{EnzymeMLDocument, Reaction, ReactionElement};

lazy_static! {
    static ref COEFFICIENT_PATTERN: Regex =
        Regex::new(r"^([0-9.]+)\s*(.*)$").expect("Invalid coefficient pattern");
}

/// Errors that can occur when parsing a reaction equation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EquationError {
    #[error("The {0} side of the equation is empty")]
    EmptyReactionSide(Side),

    #[error("Species '{0}' is not defined in the document")]
    UnknownSpecies(String),

    #[error("The name '{0}' matches more than one species; use the id instead")]
    AmbiguousName(String),

    #[error("No reaction operator found in '{0}'. Use '->', '<=>', '<->' or '='")]
    MissingOperator(String),

    #[error("More than one reaction operator found in '{0}'")]
    MultipleOperators(String),

    #[error("Empty term on the {0} side of the equation")]
    EmptyTerm(Side),

    #[error("Invalid stoichiometric coefficient '{0}'")]
    InvalidCoefficient(String),

    #[error("Unterminated quote in '{0}'")]
    UnterminatedQuote(String),
}

/// Side of a reaction equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Plus,
    Arrow { reversible: bool },
    Term(RawTerm),
}

/// A term as written, before species resolution.
#[derive(Debug, Clone, PartialEq, Default)]
struct RawTerm {
    /// Unquoted text, or the text preceding a quoted name.
    text: String,
    /// Content of a quoted name, if any.
    quoted: Option<String>,
    /// Non-whitespace text following a quoted name.
    trailing: String,
}

impl RawTerm {
    fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.quoted.is_none()
    }
}

/// Parses an equation into a reaction skeleton named `name`.
///
/// The returned reaction has an empty id and no kinetic model. Species are resolved
/// against the document by id or unique name; repeated species on the same side
/// accumulate their coefficients.
///
/// # Errors
///
/// Returns an [`EquationError`] describing the first problem encountered.
pub fn parse_reaction(
    equation: &str,
    name: &str,
    enzmldoc: &EnzymeMLDocument,
) -> Result<Reaction, EquationError> {
    let tokens = tokenize(equation)?;

    let arrows = tokens
        .iter()
        .filter_map(|token| match token {
            Token::Arrow { reversible } => Some(*reversible),
            _ => None,
        })
        .collect::<Vec<_>>();

    let reversible = match arrows.as_slice() {
        [] => return Err(EquationError::MissingOperator(equation.to_string())),
        [reversible] => *reversible,
        _ => return Err(EquationError::MultipleOperators(equation.to_string())),
    };

    let split = tokens
        .iter()
        .position(|token| matches!(token, Token::Arrow { .. }))
        .ok_or_else(|| EquationError::MissingOperator(equation.to_string()))?;

    let educts = parse_side(&tokens[..split], Side::Left, enzmldoc)?;
    let products = parse_side(&tokens[split + 1..], Side::Right, enzmldoc)?;

    Ok(Reaction {
        id: String::new(),
        name: name.to_string(),
        reversible,
        educts,
        products,
        modifiers: vec![],
        model: None,
    })
}

fn tokenize(equation: &str) -> Result<Vec<Token>, EquationError> {
    let chars = equation.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut current = RawTerm::default();
    let mut i = 0;

    let flush = |current: &mut RawTerm, tokens: &mut Vec<Token>| {
        let term = std::mem::take(current);
        if !term.is_empty() || !term.trailing.is_empty() {
            tokens.push(Token::Term(term));
        }
    };

    while i < chars.len() {
        let rest = &chars[i..];
        match rest {
            ['"', ..] => {
                let close = rest[1..]
                    .iter()
                    .position(|c| *c == '"')
                    .ok_or_else(|| EquationError::UnterminatedQuote(equation.to_string()))?;

                if current.quoted.is_some() {
                    // Two quoted names within one term
                    return Err(EquationError::UnknownSpecies(equation.to_string()));
                }

                current.quoted = Some(rest[1..close + 1].iter().collect());
                i += close + 2;
                continue;
            }
            ['<', '=', '>', ..] | ['<', '-', '>', ..] => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Arrow { reversible: true });
                i += 3;
                continue;
            }
            ['-', '>', ..] => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Arrow { reversible: false });
                i += 2;
                continue;
            }
            ['=', ..] => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Arrow { reversible: true });
            }
            ['+', ..] => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Plus);
            }
            [c, ..] => {
                if current.quoted.is_some() {
                    current.trailing.push(*c);
                } else {
                    current.text.push(*c);
                }
            }
            [] => break,
        }
        i += 1;
    }

    flush(&mut current, &mut tokens);
    Ok(tokens)
}

fn parse_side(
    tokens: &[Token],
    side: Side,
    enzmldoc: &EnzymeMLDocument,
) -> Result<Vec<ReactionElement>, EquationError> {
    if tokens.is_empty() {
        return Err(EquationError::EmptyReactionSide(side));
    }

    let mut elements: Vec<ReactionElement> = Vec::new();
    let mut expect_term = true;

    for token in tokens {
        match (token, expect_term) {
            (Token::Term(term), true) => {
                let (species_id, stoichiometry) = resolve_term(term, enzmldoc)?;

                match elements.iter_mut().find(|e| e.species_id == species_id) {
                    Some(existing) => existing.stoichiometry += stoichiometry,
                    None => elements.push(ReactionElement {
                        species_id,
                        stoichiometry,
                    }),
                }

                expect_term = false;
            }
            (Token::Plus, false) => expect_term = true,
            _ => return Err(EquationError::EmptyTerm(side)),
        }
    }

    if expect_term {
        return Err(EquationError::EmptyTerm(side));
    }

    Ok(elements)
}

/// Resolves a term to a species id and its coefficient.
fn resolve_term(term: &RawTerm, enzmldoc: &EnzymeMLDocument) -> Result<(String, f64), EquationError> {
    if !term.trailing.trim().is_empty() {
        return Err(EquationError::UnknownSpecies(format!(
            "{}\"{}\"{}",
            term.text,
            term.quoted.as_deref().unwrap_or_default(),
            term.trailing
        )));
    }

    let text = term.text.trim();

    if let Some(quoted) = &term.quoted {
        let coefficient = if text.is_empty() {
            1.0
        } else {
            parse_coefficient(text)?
        };
        return Ok((lookup(quoted, enzmldoc)?, coefficient));
    }

    // Whole term first
    match enzmldoc.store.species(text) {
        Ok(species) => return Ok((species.id.clone(), 1.0)),
        Err(StoreError::AmbiguousName { .. }) => {
            return Err(EquationError::AmbiguousName(text.to_string()))
        }
        Err(_) => {}
    }

    let captures = COEFFICIENT_PATTERN
        .captures(text)
        .filter(|captures| !captures[2].trim().is_empty())
        .ok_or_else(|| EquationError::UnknownSpecies(text.to_string()))?;

    let coefficient = parse_coefficient(&captures[1])?;
    Ok((lookup(captures[2].trim(), enzmldoc)?, coefficient))
}

fn parse_coefficient(text: &str) -> Result<f64, EquationError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(EquationError::InvalidCoefficient(text.to_string())),
    }
}

fn lookup(key: &str, enzmldoc: &EnzymeMLDocument) -> Result<String, EquationError> {
    match enzmldoc.store.species(key) {
        Ok(species) => Ok(species.id.clone()),
        Err(StoreError::AmbiguousName { .. }) => Err(EquationError::AmbiguousName(key.to_string())),
        Err(_) => Err(EquationError::UnknownSpecies(key.to_string())),
    }
}
