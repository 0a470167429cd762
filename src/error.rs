// ABOUTME: Error taxonomy for the Umbra interpreter — SY/TY/RT/GN codes with
// ABOUTME: a single message catalog, per spec section 7

use crate::location::Location;
use thiserror::Error;

/// Printf-style (`%s`) message catalog. One entry per declared error code,
/// kept exhaustive over every code referenced by the lexer/parser/evaluator.
pub mod catalog {
    pub const SY001_UNEXPECTED_CHAR: &str = "unexpected character: %s";
    pub const SY002_UNTERMINATED_STRING: &str = "unterminated string literal";
    pub const SY003_UNTERMINATED_CHAR: &str = "unterminated char literal";
    pub const SY004_INVALID_ESCAPE: &str = "invalid escape sequence: %s";
    pub const SY005_MALFORMED_NUMBER: &str = "malformed number literal: %s";
    pub const SY006_EXPECTED_TOKEN: &str = "expected %s, found %s";
    pub const SY007_INVALID_LVALUE: &str = "invalid assignment target";

    pub const TY001_DECLARED_TYPE_MISMATCH: &str = "cannot assign %s to variable of type %s";
    pub const TY002_ENUM_MEMBER_ARITY: &str = "enum member %s expects %s argument(s), got %s";
    pub const TY003_ENUM_MEMBER_TYPE: &str = "enum member %s argument %s: expected %s, got %s";
    pub const TY004_UNRESOLVED_ENUM_TYPE: &str = "type %s does not resolve to an enum";

    pub const RT002_UNDEFINED_VARIABLE: &str = "undefined variable: %s";
    pub const RT003_DUPLICATE_DECLARATION: &str = "name already declared in this scope: %s";
    pub const RT004_INDEX_OUT_OF_RANGE: &str = "index out of range: %s";
    pub const RT007_BAD_ADD_OPERAND: &str = "operator '+' is not defined for %s and %s";
    pub const RT008_DIVISION_BY_ZERO: &str = "division by zero";
    pub const RT009_BAD_MOD_OPERAND: &str = "operator '%%' requires numeric operands, got %s";
    pub const RT012_BAD_RANGE_OPERAND: &str = "operator 'range' is not defined for %s";
    pub const RT014_INVALID_CALL_TARGET: &str = "value of type %s is not callable";
    pub const RT016_INVALID_MEMBER_ACCESS: &str = "cannot access member %s of %s";
    pub const RT025_PUBLIC_UNKNOWN_NAME: &str = "cannot make unknown name public: %s";
    pub const RT026_BAD_COMPARISON_OPERAND: &str = "operator %s is not defined for %s and %s";
    pub const RT027_BAD_SUB_OPERAND: &str = "operator '-' is not defined for %s and %s";
    pub const RT028_BAD_TYPE_CONVERSION: &str = "cannot convert %s to %s";
    pub const RT029_NAMESPACE_NOT_FOUND: &str = "no namespace named %s in scope";
    pub const RT030_NAMESPACE_MEMBER_NOT_FOUND: &str = "namespace %s has no public member %s";
    pub const RT032_NATIVE_IO_FAILED: &str = "native %s on %s failed: %s";
    pub const RT033_NATIVE_ARGUMENT_TYPE: &str = "native function %s expects %s at argument %s";
    pub const RT034_ENUM_MEMBER_NOT_FOUND: &str = "enum has no member named %s";
    pub const RT035_DESTRUCTURE_NON_ARRAY: &str = "cannot destructure %s as an array";
    pub const RT036_LOOP_VARIABLE_NOT_NUMERIC: &str = "for-loop variable must be numeric, got %s";
    pub const RT037_UNMATCHED_BREAK: &str = "'break' used outside a loop";
    pub const RT038_UNMATCHED_CONTINUE: &str = "'continue' used outside a loop";
    pub const RT039_ARITY_MISMATCH: &str = "function expects %s argument(s), got %s";
    pub const RT040_IMMUTABLE_ASSIGNMENT: &str = "cannot assign to immutable binding: %s";
    pub const RT041_NON_BOOLEAN_CONDITION: &str = "condition must be boolean, got %s";
    pub const RT042_BAD_UNARY_OPERAND: &str = "operator %s is not defined for %s";

    pub const GN001_MODULE_NOT_FOUND: &str = "module not found: %s";
    pub const GN002_FILE_READ_FAILED: &str = "could not read file %s: %s";
}

/// Substitute `%s` placeholders in `template`, in order, with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' && chars.peek() == Some(&'s') {
            chars.next();
            if let Some(arg) = args.next() {
                out.push_str(arg);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Renders the trailing source-reference suffix for an optional location,
/// e.g. `" at 3:5-8"`, or the empty string when no location is available.
fn location_suffix(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" at {}", loc),
        None => String::new(),
    }
}

#[allow(dead_code)]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UmbraError {
    #[error("SyntaxError[{code}]: {message} at {location}")]
    Syntax {
        code: &'static str,
        message: String,
        location: Location,
    },

    #[error("TypeError[{code}]: {message}{}", location_suffix(location))]
    Type {
        code: &'static str,
        message: String,
        location: Option<Location>,
    },

    #[error("RuntimeError[{code}]: {message}{}", location_suffix(location))]
    Runtime {
        code: &'static str,
        message: String,
        location: Option<Location>,
    },

    #[error("GenericError[{code}]: {message}")]
    Generic { code: &'static str, message: String },
}

impl UmbraError {
    pub fn syntax(code: &'static str, template: &str, args: &[&str], location: Location) -> Self {
        UmbraError::Syntax {
            code,
            message: format_message(template, args),
            location,
        }
    }

    pub fn ty(code: &'static str, template: &str, args: &[&str], location: Option<Location>) -> Self {
        UmbraError::Type {
            code,
            message: format_message(template, args),
            location,
        }
    }

    pub fn runtime(
        code: &'static str,
        template: &str,
        args: &[&str],
        location: Option<Location>,
    ) -> Self {
        UmbraError::Runtime {
            code,
            message: format_message(template, args),
            location,
        }
    }

    pub fn generic(code: &'static str, template: &str, args: &[&str]) -> Self {
        UmbraError::Generic {
            code,
            message: format_message(template, args),
        }
    }

    /// Exit code contract from spec.md section 6: syntax errors are
    /// non-zero and distinct from the generic runtime-error exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            UmbraError::Syntax { .. } => 65,
            _ => 1,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            UmbraError::Syntax { code, .. }
            | UmbraError::Type { code, .. }
            | UmbraError::Runtime { code, .. }
            | UmbraError::Generic { code, .. } => code,
        }
    }
}

/// Non-error unwind signals, kept as a channel distinct from `UmbraError`
/// so the evaluator's result type never conflates control flow with
/// failure (spec.md section 9, "Control-flow as errors").
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Return(crate::value::Value),
    Break,
    Continue,
}

/// The evaluator's outcome for a single AST node: a plain value, a
/// control-flow unwind, or an error.
pub type EvalResult<T> = Result<T, EvalOutcome>;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutcome {
    Error(UmbraError),
    Control(ControlFlow),
}

impl From<UmbraError> for EvalOutcome {
    fn from(e: UmbraError) -> Self {
        EvalOutcome::Error(e)
    }
}

impl From<ControlFlow> for EvalOutcome {
    fn from(c: ControlFlow) -> Self {
        EvalOutcome::Control(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_substitutes_in_order() {
        let msg = format_message(catalog::RT002_UNDEFINED_VARIABLE, &["x"]);
        assert_eq!(msg, "undefined variable: x");
    }

    #[test]
    fn test_format_message_multiple_args() {
        let msg = format_message(catalog::RT039_ARITY_MISMATCH, &["2", "3"]);
        assert_eq!(msg, "function expects 2 argument(s), got 3");
    }

    #[test]
    fn test_display_includes_code_and_kind() {
        let err = UmbraError::runtime("RT002", catalog::RT002_UNDEFINED_VARIABLE, &["y"], None);
        let rendered = format!("{}", err);
        assert!(rendered.contains("RuntimeError[RT002]"));
        assert!(rendered.contains("undefined variable: y"));
    }

    #[test]
    fn test_display_includes_source_location_when_present() {
        let loc = Location::new(4, 2, 6);
        let err = UmbraError::runtime(
            "RT002",
            catalog::RT002_UNDEFINED_VARIABLE,
            &["y"],
            Some(loc),
        );
        let rendered = format!("{}", err);
        assert!(rendered.contains(&loc.to_string()));

        let no_loc = UmbraError::runtime("RT002", catalog::RT002_UNDEFINED_VARIABLE, &["y"], None);
        assert!(!format!("{}", no_loc).contains(" at "));
    }

    #[test]
    fn test_exit_codes() {
        let syn = UmbraError::syntax(
            "SY001",
            catalog::SY001_UNEXPECTED_CHAR,
            &["@"],
            Location::new(1, 1, 1),
        );
        assert_eq!(syn.exit_code(), 65);
        let rt = UmbraError::runtime("RT002", catalog::RT002_UNDEFINED_VARIABLE, &["x"], None);
        assert_eq!(rt.exit_code(), 1);
    }
}
