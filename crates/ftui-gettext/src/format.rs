//! printf-style formatting for translated templates.
//!
//! Translation files carry C/gettext style placeholders (`%s`, `%d`,
//! `%.2f`, ...), so resolved strings are rendered with a small printf
//! subset rather than `format!`.
//!
//! # Invariants
//!
//! 1. **Zero arguments means verbatim**: `sprintf(t, &[])` returns `t`
//!    unchanged, including literal `%` sequences. Both the catalog hit path
//!    and the registry fallback path rely on this.
//!
//! 2. **Total**: malformed directives never panic. Unknown verbs and
//!    directives without a matching argument are emitted as written.
//!
//! 3. **Single pass**: substituted argument text is never re-scanned for
//!    directives.
//!
//! # Directive syntax
//!
//! `%[flags][width][.precision][[index]]verb`
//!
//! | Part | Accepted |
//! |------|----------|
//! | flags | `-` left align, `0` zero pad, `+` force sign, ` ` space sign |
//! | index | 1-based argument index, e.g. `%[2]s`; following verbs continue from `index + 1` |
//! | verbs | `s v d f F e x X o b c q t`, plus `%%` |

use std::fmt;

const MAX_WIDTH: usize = 1024;

/// A positional argument substituted into a template.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    /// Text.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Single character.
    Char(char),
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for FormatArg {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for FormatArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for FormatArg {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FormatArg {
            fn from(value: $ty) -> Self {
                Self::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FormatArg {
            fn from(value: $ty) -> Self {
                Self::Uint(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for FormatArg {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for FormatArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Spec {
    minus: bool,
    plus: bool,
    space: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Directive {
    spec: Spec,
    index: Option<usize>,
    verb: char,
    /// Byte length of the directive including the leading `%`.
    len: usize,
}

/// Substitute `args` into a printf-style `template`.
///
/// Returns `template` unchanged when `args` is empty.
///
/// ```
/// use ftui_gettext::format::{sprintf, FormatArg};
///
/// assert_eq!(sprintf("%d files", &[FormatArg::from(3_i64)]), "3 files");
/// assert_eq!(sprintf("%[2]s, %[1]s", &["world".into(), "hello".into()]), "hello, world");
/// assert_eq!(sprintf("100%", &[]), "100%");
/// ```
#[must_use]
pub fn sprintf(template: &str, args: &[FormatArg]) -> String {
    if args.is_empty() {
        return template.to_owned();
    }

    let mut out = String::with_capacity(template.len() + 16);
    let mut next_arg = 0usize;
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.as_bytes().get(1) == Some(&b'%') {
            out.push('%');
            rest = &tail[2..];
            continue;
        }

        let Some(directive) = parse_directive(tail) else {
            out.push('%');
            rest = &tail[1..];
            continue;
        };
        let raw = &tail[..directive.len];
        rest = &tail[directive.len..];

        if !is_known_verb(directive.verb) {
            out.push_str(raw);
            continue;
        }

        let position = match directive.index {
            Some(0) => {
                out.push_str(raw);
                continue;
            }
            Some(n) => n - 1,
            None => next_arg,
        };
        next_arg = position + 1;

        match args.get(position) {
            Some(arg) => out.push_str(&render(arg, directive.verb, directive.spec)),
            None => out.push_str(raw),
        }
    }

    out.push_str(rest);
    out
}

fn is_known_verb(verb: char) -> bool {
    matches!(
        verb,
        's' | 'v' | 'd' | 'f' | 'F' | 'e' | 'x' | 'X' | 'o' | 'b' | 'c' | 'q' | 't'
    )
}

fn is_numeric_verb(verb: char) -> bool {
    matches!(verb, 'd' | 'f' | 'F' | 'e' | 'x' | 'X' | 'o' | 'b')
}

fn parse_directive(directive: &str) -> Option<Directive> {
    let bytes = directive.as_bytes();
    let mut i = 1;
    let mut spec = Spec::default();

    while let Some(&b) = bytes.get(i) {
        match b {
            b'-' => spec.minus = true,
            b'+' => spec.plus = true,
            b' ' => spec.space = true,
            b'0' => spec.zero = true,
            _ => break,
        }
        i += 1;
    }

    let (width, used) = parse_number(&bytes[i..]);
    spec.width = width;
    i += used;

    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let (precision, used) = parse_number(&bytes[i..]);
        spec.precision = Some(precision.unwrap_or(0));
        i += used;
    }

    let mut index = None;
    if bytes.get(i) == Some(&b'[') {
        let (n, used) = parse_number(&bytes[i + 1..]);
        if used == 0 || bytes.get(i + 1 + used) != Some(&b']') {
            return None;
        }
        index = n;
        i += used + 2;
    }

    let verb = directive.get(i..)?.chars().next()?;
    Some(Directive {
        spec,
        index,
        verb,
        len: i + verb.len_utf8(),
    })
}

/// Parse leading ASCII digits. Returns the value (clamped) and bytes consumed.
fn parse_number(bytes: &[u8]) -> (Option<usize>, usize) {
    let mut value: Option<usize> = None;
    let mut used = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            break;
        }
        let digit = usize::from(b - b'0');
        let next = value.unwrap_or(0).saturating_mul(10).saturating_add(digit);
        value = Some(next.min(MAX_WIDTH));
        used += 1;
    }
    (value, used)
}

fn render(arg: &FormatArg, verb: char, spec: Spec) -> String {
    let mut body = match verb {
        's' | 'v' => render_text(arg, spec.precision),
        'd' => arg.to_string(),
        'f' | 'F' => match as_float(arg) {
            Some(v) => format!("{:.*}", spec.precision.unwrap_or(6), v),
            None => arg.to_string(),
        },
        'e' => match as_float(arg) {
            Some(v) => scientific(v, spec.precision.unwrap_or(6)),
            None => arg.to_string(),
        },
        'x' | 'X' | 'o' | 'b' => render_radix(arg, verb),
        'c' => match arg {
            FormatArg::Char(c) => c.to_string(),
            FormatArg::Int(v) => code_point(u64::try_from(*v).ok()).to_string(),
            FormatArg::Uint(v) => code_point(Some(*v)).to_string(),
            other => other.to_string(),
        },
        'q' => match arg {
            FormatArg::Str(s) => format!("{s:?}"),
            FormatArg::Char(c) => format!("{c:?}"),
            other => other.to_string(),
        },
        _ => arg.to_string(),
    };

    if is_numeric_verb(verb) && !body.starts_with('-') {
        if spec.plus {
            body.insert(0, '+');
        } else if spec.space {
            body.insert(0, ' ');
        }
    }

    pad(body, spec, is_numeric_verb(verb))
}

fn render_text(arg: &FormatArg, precision: Option<usize>) -> String {
    match (arg, precision) {
        (FormatArg::Str(s), Some(limit)) => s.chars().take(limit).collect(),
        _ => arg.to_string(),
    }
}

fn as_float(arg: &FormatArg) -> Option<f64> {
    match arg {
        FormatArg::Float(v) => Some(*v),
        FormatArg::Int(v) => Some(*v as f64),
        FormatArg::Uint(v) => Some(*v as f64),
        _ => None,
    }
}

/// C-style exponent: at least two digits with an explicit sign.
fn scientific(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return raw;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

fn render_radix(arg: &FormatArg, verb: char) -> String {
    let (negative, magnitude) = match arg {
        FormatArg::Int(v) => (*v < 0, u128::from(v.unsigned_abs())),
        FormatArg::Uint(v) => (false, u128::from(*v)),
        FormatArg::Char(c) => (false, u128::from(u32::from(*c))),
        FormatArg::Str(s) if matches!(verb, 'x' | 'X') => {
            return s
                .bytes()
                .map(|b| {
                    if verb == 'x' {
                        format!("{b:02x}")
                    } else {
                        format!("{b:02X}")
                    }
                })
                .collect();
        }
        other => return other.to_string(),
    };

    let digits = match verb {
        'x' => format!("{magnitude:x}"),
        'X' => format!("{magnitude:X}"),
        'o' => format!("{magnitude:o}"),
        _ => format!("{magnitude:b}"),
    };
    if negative { format!("-{digits}") } else { digits }
}

fn code_point(value: Option<u64>) -> char {
    value
        .and_then(|v| u32::try_from(v).ok())
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn pad(body: String, spec: Spec, numeric: bool) -> String {
    let Some(width) = spec.width else {
        return body;
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let fill = width - len;

    if spec.minus {
        let mut out = body;
        out.extend(std::iter::repeat_n(' ', fill));
        return out;
    }

    if spec.zero && numeric {
        let sign_len = if body.starts_with(['-', '+', ' ']) { 1 } else { 0 };
        let (sign, digits) = body.split_at(sign_len);
        let mut out = String::with_capacity(width);
        out.push_str(sign);
        out.extend(std::iter::repeat_n('0', fill));
        out.push_str(digits);
        return out;
    }

    let mut out: String = std::iter::repeat_n(' ', fill).collect();
    out.push_str(&body);
    out
}
