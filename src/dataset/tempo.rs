//! Tempo extraction from pattern script source
//!
//! Tempo calls frequently carry a small expression such as `setcpm(98/4*2)`.
//! The argument is evaluated by a restricted arithmetic parser that accepts
//! only numbers, whitespace, `+ - * /` and parentheses, nested at most
//! [`MAX_NESTING`] levels deep.

use regex::Regex;
use std::sync::OnceLock;

/// Deepest nesting of parentheses and unary signs the evaluator accepts
pub const MAX_NESTING: usize = 64;

fn tempo_calls() -> &'static [Regex; 3] {
    static CALLS: OnceLock<[Regex; 3]> = OnceLock::new();
    CALLS.get_or_init(|| {
        [
            Regex::new(r"(?i)setcpm\s*\(").expect("valid tempo regex"),
            Regex::new(r"(?i)\.cpm\s*\(").expect("valid tempo regex"),
            Regex::new(r"(?i)setcps\s*\(").expect("valid tempo regex"),
        ]
    })
}

/// Extracts the tempo declared by the first tempo-setting call in `code`
///
/// `setcpm(...)` is preferred over `.cpm(...)`, which is preferred over
/// `setcps(...)`. The call's argument is evaluated as arithmetic; when it is
/// not a plain arithmetic expression the leading numeric literal is used.
///
/// # Examples
///
/// ```
/// use audial::dataset::extract_tempo;
///
/// assert_eq!(extract_tempo("setcpm(98/4*2)\n$: s(\"bd\")"), Some(49));
/// assert_eq!(extract_tempo("setcpm(120)"), Some(120));
/// assert_eq!(extract_tempo("$: s(\"bd\")"), None);
/// ```
pub fn extract_tempo(code: &str) -> Option<u32> {
    for call in tempo_calls() {
        let Some(found) = call.find(code) else {
            continue;
        };
        let argument = call_argument(&code[found.end()..]);
        let tempo = evaluate(argument)
            .filter(|value| value.is_finite() && *value >= 0.0)
            .or_else(|| leading_number(argument));
        if let Some(tempo) = tempo {
            return Some(round_tempo(tempo));
        }
    }
    None
}

/// Evaluates a restricted arithmetic expression
///
/// Returns `None` for any character outside the arithmetic grammar, for
/// malformed expressions, for nesting deeper than [`MAX_NESTING`] and for
/// division by zero.
pub fn evaluate(expression: &str) -> Option<f64> {
    let mut parser = Parser {
        bytes: expression.as_bytes(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    parser.skip_whitespace();
    if parser.pos == parser.bytes.len() {
        Some(value)
    } else {
        None
    }
}

fn round_tempo(value: f64) -> u32 {
    value.round().min(u32::MAX as f64) as u32
}

// Text up to the parenthesis closing the call, or the rest of the input
fn call_argument(rest: &str) -> &str {
    let mut depth = 0usize;
    for (i, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => return &rest[..i],
            ')' => depth -= 1,
            _ => {}
        }
    }
    rest
}

fn leading_number(argument: &str) -> Option<f64> {
    let trimmed = argument.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let literal = &trimmed[..end];
    if !literal.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let mut parts = literal.splitn(3, '.');
    let whole = parts.next().unwrap_or_default();
    match parts.next().filter(|frac| !frac.is_empty()) {
        Some(frac) => format!("{}.{}", whole, frac).parse().ok(),
        None => whole.parse().ok(),
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes.get(self.pos).copied()
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == b'+' { value + rhs } else { value - rhs };
        }
        Some(value)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        while let Some(op @ (b'*' | b'/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == b'*' {
                value * rhs
            } else if rhs == 0.0 {
                return None;
            } else {
                value / rhs
            };
        }
        Some(value)
    }

    // Runs `inner` one nesting level deeper, failing past MAX_NESTING
    fn nested(&mut self, inner: impl FnOnce(&mut Self) -> Option<f64>) -> Option<f64> {
        if self.depth >= MAX_NESTING {
            return None;
        }
        self.depth += 1;
        let value = inner(self);
        self.depth -= 1;
        value
    }

    // factor := ('+' | '-') factor | '(' expression ')' | number
    fn factor(&mut self) -> Option<f64> {
        self.nested(Self::factor_inner)
    }

    fn factor_inner(&mut self) -> Option<f64> {
        match self.peek()? {
            b'-' => {
                self.pos += 1;
                self.factor().map(|v| -v)
            }
            b'+' => {
                self.pos += 1;
                self.factor()
            }
            b'(' => {
                self.pos += 1;
                let value = self.expression()?;
                if self.peek()? != b')' {
                    return None;
                }
                self.pos += 1;
                Some(value)
            }
            _ => self.number(),
        }
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let literal = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        if literal.is_empty() || literal == "." {
            return None;
        }
        literal.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_precedence_and_parens() {
        assert_eq!(evaluate("1 + 2 * 3"), Some(7.0));
        assert_eq!(evaluate("(1 + 2) * 3"), Some(9.0));
        assert_eq!(evaluate("98/4*2"), Some(49.0));
        assert_eq!(evaluate("-(2 - 5)"), Some(3.0));
        assert_eq!(evaluate(" 0.5 * 240 "), Some(120.0));
    }

    #[test]
    fn test_evaluate_rejects_non_arithmetic() {
        assert_eq!(evaluate("Math.PI"), None);
        assert_eq!(evaluate("1 + "), None);
        assert_eq!(evaluate("(1 + 2"), None);
        assert_eq!(evaluate("2 3"), None);
        assert_eq!(evaluate(""), None);
        assert_eq!(evaluate("alert(1)"), None);
    }

    #[test]
    fn test_evaluate_nesting_limit() {
        let shallow = format!("{}120{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&shallow), Some(120.0));
        assert_eq!(evaluate(&format!("{}5", "-".repeat(10))), Some(5.0));

        let deep = format!("{}120{}", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(evaluate(&deep), None);
        assert_eq!(evaluate(&format!("{}5", "-".repeat(200_000))), None);
    }

    #[test]
    fn test_extract_deeply_nested_argument_does_not_overflow() {
        let code = format!("setcpm({}120{})", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(extract_tempo(&code), None);
        let unary = format!("setcpm({}90)", "+".repeat(200_000));
        assert_eq!(extract_tempo(&unary), None);
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        assert_eq!(evaluate("120/0"), None);
        assert_eq!(evaluate("120/(2-2)"), None);
    }

    #[test]
    fn test_extract_plain_and_expression() {
        assert_eq!(extract_tempo("setcpm(128)"), Some(128));
        assert_eq!(extract_tempo("setcpm( 140 / 2 )"), Some(70));
        assert_eq!(extract_tempo("setcpm(90.6)"), Some(91));
        assert_eq!(extract_tempo("setcpm((120 + 8) / 4)"), Some(32));
    }

    #[test]
    fn test_extract_falls_back_to_leading_literal() {
        assert_eq!(extract_tempo("setcpm(120 * speed)"), Some(120));
        assert_eq!(extract_tempo("setcpm(120/0)"), Some(120));
    }

    #[test]
    fn test_extract_call_preference() {
        let code = "setcps(0.5)\n$: s(\"bd\").cpm(90)\nsetcpm(100)";
        assert_eq!(extract_tempo(code), Some(100));
        assert_eq!(extract_tempo("$: s(\"bd\").cpm(90)\nsetcps(1)"), Some(90));
        assert_eq!(extract_tempo("setcps(1)"), Some(1));
    }

    #[test]
    fn test_extract_requires_numeric_argument() {
        assert_eq!(extract_tempo("setcpm(tempo)"), None);
        assert_eq!(extract_tempo("setcpm(-20)"), None);
        assert_eq!(extract_tempo("setcpm(tempo)\n.cpm(80)"), Some(80));
        assert_eq!(extract_tempo("no tempo here"), None);
    }
}
