//! Restricted printf-style formatting for window text.
//!
//! Only three conversions exist: `%d` (integer), `%f` (float, six decimals)
//! and `%s` (string). Any other conversion, a conversion whose argument has
//! the wrong type, and a conversion with no argument left all render as `?`.
//! Every other character is copied literally.

use std::fmt::Write;

/// One argument to [`format_print`].
#[derive(Debug, Clone, PartialEq)]
pub enum PrintArg {
    /// Consumed by `%d`.
    Int(i64),
    /// Consumed by `%f`.
    Float(f64),
    /// Consumed by `%s`.
    Str(String),
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PrintArg {
                fn from(value: $t) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for PrintArg {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u64> for PrintArg {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f32> for PrintArg {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for PrintArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PrintArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PrintArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Expand `template` with `args`.
pub fn format_print(template: &str, args: &[PrintArg]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(conversion @ ('d' | 'f' | 's')) => match (conversion, args.next()) {
                ('d', Some(PrintArg::Int(v))) => {
                    let _ = write!(out, "{v}");
                }
                ('f', Some(PrintArg::Float(v))) => {
                    let _ = write!(out, "{v:.6}");
                }
                ('s', Some(PrintArg::Str(v))) => out.push_str(v),
                _ => out.push('?'),
            },
            Some(_) => out.push('?'),
            None => {
                out.push('?');
                break;
            }
        }
    }
    out
}
