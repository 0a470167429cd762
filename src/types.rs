// ABOUTME: Runtime type tags and the primitive type checker

use crate::token::TokenKind;
use std::fmt;

/// The closed set of runtime type tags, distinct from AST type keywords.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Str,
    Char,
    Num,
    Bool,
    Arr,
    Hashmap,
    Fun,
    Any,
    Null,
    Enum,
    Void,
    Unknown,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeTag::Str => "str",
            TypeTag::Char => "char",
            TypeTag::Num => "num",
            TypeTag::Bool => "bool",
            TypeTag::Arr => "arr",
            TypeTag::Hashmap => "hashmap",
            TypeTag::Fun => "fun",
            TypeTag::Any => "any",
            TypeTag::Null => "null",
            TypeTag::Enum => "enum",
            TypeTag::Void => "void",
            TypeTag::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl TypeTag {
    /// Maps a primitive-type keyword token to its runtime tag. `None` for
    /// identifier tokens, which are resolved to enum types at statement time.
    pub fn from_token(kind: TokenKind) -> Option<TypeTag> {
        Some(match kind {
            TokenKind::Str => TypeTag::Str,
            TokenKind::Char_ => TypeTag::Char,
            TokenKind::Num => TypeTag::Num,
            TokenKind::Bool => TypeTag::Bool,
            TokenKind::Arr => TypeTag::Arr,
            TokenKind::Hashmap => TypeTag::Hashmap,
            TokenKind::Any => TypeTag::Any,
            TokenKind::Void => TypeTag::Void,
            _ => return None,
        })
    }
}

/// Checks whether `value`'s runtime tag satisfies `expected`, honoring the
/// nullable flag and the `any` escape hatch (spec section 4.5).
pub fn type_check(expected: TypeTag, actual: TypeTag, nullable: bool) -> bool {
    if expected == TypeTag::Any {
        return true;
    }
    if actual == TypeTag::Null {
        return expected == TypeTag::Null || nullable;
    }
    expected == actual
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_accepts_everything() {
        assert!(type_check(TypeTag::Any, TypeTag::Num, false));
        assert!(type_check(TypeTag::Any, TypeTag::Null, false));
    }

    #[test]
    fn test_null_requires_nullable_or_null_type() {
        assert!(type_check(TypeTag::Num, TypeTag::Null, true));
        assert!(!type_check(TypeTag::Num, TypeTag::Null, false));
        assert!(type_check(TypeTag::Null, TypeTag::Null, false));
    }

    #[test]
    fn test_exact_match_required() {
        assert!(type_check(TypeTag::Num, TypeTag::Num, false));
        assert!(!type_check(TypeTag::Num, TypeTag::Str, false));
    }

    #[test]
    fn test_token_to_tag() {
        assert_eq!(TypeTag::from_token(TokenKind::Num), Some(TypeTag::Num));
        assert_eq!(TypeTag::from_token(TokenKind::If), None);
    }
}
