//! Pure string rules used by the patcher.
//!
//! Every function takes the literal text of a default value and either
//! returns a replacement or `None` when the rule does not apply.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used, reason = "literal patterns are known to compile")]
fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

static VALID_INTEGRAL: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^[+-]?(0[xX][0-9a-fA-F]+|[0-9]+)$"));
static CHAR_LITERAL: LazyLock<Regex> = LazyLock::new(|| regex(r"^'(\\.|[^'\\])+'$"));
static SUFFIXED_INTEGRAL: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^([+-]?(?:0[xX][0-9a-fA-F]+|[0-9]+))[uUlL]+$"));
static BARE_HEX: LazyLock<Regex> = LazyLock::new(|| regex(r"^[0-9a-fA-F]*[a-fA-F][0-9a-fA-F]*$"));
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| regex(r"^[A-Za-z_][A-Za-z0-9_]*$"));

// ── Call invocations ────────────────────────────────────────────

/// Split `name(a, b)` into its name and top-level arguments.
///
/// The parenthesis opened after the name must close at the very end of
/// the text, so `f(a)(b)` and `(int)x` are not calls.
pub fn split_call(text: &str) -> Option<(&str, Vec<&str>)> {
    let text = text.trim();
    if !text.ends_with(')') {
        return None;
    }
    let open = text.find('(')?;
    let name = text[..open].trim();
    if name.is_empty() {
        return None;
    }

    let inner = &text[open + 1..text.len() - 1];
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in inner.char_indices() {
        match ch {
            '(' | '<' | '[' | '{' => depth += 1,
            ')' | '>' | ']' | '}' => {
                if depth == 0 && ch == ')' {
                    // The call closed before the end of the text.
                    return None;
                }
                depth = depth.saturating_sub(1);
            }
            ',' if depth == 0 => {
                args.push(inner[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last);
    }
    Some((name, args))
}

pub fn is_call_invocation(text: &str) -> bool {
    split_call(text).is_some()
}

/// `Ctor(Ctor(a, b))` → `Ctor(a, b)`, repeated until the value no longer
/// wraps a call to itself.
pub fn collapse_double_call(value: &str) -> Option<String> {
    let mut current = value.trim();
    let mut changed = false;
    while let Some((name, args)) = split_call(current) {
        let [inner] = args.as_slice() else {
            break;
        };
        match split_call(inner) {
            Some((inner_name, _)) if inner_name == name => {
                current = inner;
                changed = true;
            }
            _ => break,
        }
    }
    changed.then(|| current.to_owned())
}

// ── Integral literals ───────────────────────────────────────────

/// A literal any C++ compiler accepts for an integral parameter.
pub fn is_valid_integral(value: &str) -> bool {
    let value = value.trim();
    value == "true"
        || value == "false"
        || VALID_INTEGRAL.is_match(value)
        || CHAR_LITERAL.is_match(value)
}

/// `10UL` → `10`.
pub fn strip_integral_suffix(value: &str) -> Option<String> {
    SUFFIXED_INTEGRAL
        .captures(value.trim())
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str().to_owned())
}

/// `ff00` → `0xff00`. The value must contain at least one hex letter.
pub fn prefix_bare_hex(value: &str) -> Option<String> {
    let value = value.trim();
    BARE_HEX.is_match(value).then(|| format!("0x{value}"))
}

/// The last `::` segment when it is a plain identifier.
pub fn unqualified_name(value: &str) -> Option<&str> {
    let last = value.trim().rsplit("::").next()?;
    IDENTIFIER.is_match(last).then_some(last)
}

pub fn is_identifier(value: &str) -> bool {
    IDENTIFIER.is_match(value)
}

// ── Spelling ────────────────────────────────────────────────────

/// Qualify `name` with a scope spelled as a full name (`::` for global).
pub fn join_scope(scope: &str, name: &str) -> String {
    if scope == "::" || scope.is_empty() {
        format!("::{name}")
    } else {
        format!("{scope}::{name}")
    }
}

/// Functional cast of `value` to `ty`. Multi-word fundamental spellings
/// need the C-style form: `(unsigned int)(x)`.
pub fn cast_to(ty: &str, multi_word: bool, value: &str) -> String {
    if multi_word {
        format!("({ty})({value})")
    } else {
        format!("{ty}({value})")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_call() {
        assert_eq!(split_call("Point(1, 2)"), Some(("Point", vec!["1", "2"])));
        assert_eq!(split_call("Point()"), Some(("Point", Vec::<&str>::new())));
        assert_eq!(
            split_call("std::pair<int, int>(1, f(2, 3))"),
            Some(("std::pair<int, int>", vec!["1", "f(2, 3)"]))
        );
        assert_eq!(split_call("(int)x"), None);
        assert_eq!(split_call("f(a)(b)"), None);
        assert_eq!(split_call("42"), None);
    }

    #[test]
    fn test_collapse_double_call() {
        assert_eq!(
            collapse_double_call("Ctor(Ctor(a, b))"),
            Some("Ctor(a, b)".to_owned())
        );
        assert_eq!(
            collapse_double_call("V(V(V()))"),
            Some("V()".to_owned())
        );
        assert_eq!(collapse_double_call("Ctor(a, b)"), None);
        assert_eq!(collapse_double_call("Wrap(Other(1))"), None);
    }

    #[test]
    fn test_valid_integral() {
        for value in ["0", "-12", "0x1F", "true", "'a'", "'\\n'"] {
            assert!(is_valid_integral(value), "{value} should be valid");
        }
        for value in ["10UL", "ff", "red", "1.5"] {
            assert!(!is_valid_integral(value), "{value} should be invalid");
        }
    }

    #[test]
    fn test_integral_repairs() {
        assert_eq!(strip_integral_suffix("10UL"), Some("10".to_owned()));
        assert_eq!(strip_integral_suffix("0x10u"), Some("0x10".to_owned()));
        assert_eq!(strip_integral_suffix("red"), None);
        assert_eq!(prefix_bare_hex("ff00"), Some("0xff00".to_owned()));
        assert_eq!(prefix_bare_hex("1234"), None);
        assert_eq!(prefix_bare_hex("red"), None);
    }

    #[test]
    fn test_spelling_helpers() {
        assert_eq!(join_scope("::", "red"), "::red");
        assert_eq!(join_scope("::ui::Color", "red"), "::ui::Color::red");
        assert_eq!(cast_to("int", false, "::E::a"), "int(::E::a)");
        assert_eq!(
            cast_to("unsigned int", true, "::E::a"),
            "(unsigned int)(::E::a)"
        );
        assert_eq!(unqualified_name("ns::value"), Some("value"));
        assert_eq!(unqualified_name("int(::E::a)"), None);
    }
}
