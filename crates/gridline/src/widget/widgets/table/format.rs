//! Row format mini-language and printf-style display patterns.
//!
//! A row format is a `:`-separated list of column specs. Each spec is
//! literal text with at most one conversion:
//!
//! ```text
//! %[flags][width][.precision][*][l|ll]conv      conv in s d i u f g p
//! %[s8] %[u8] %[s16] %[u16] %[s32] %[u32]       referenced fixed-width ints
//! %[Ft] %[Fs]                                   text / surface functions
//! ```
//!
//! `*` turns the conversion into a reference to an externally owned value.
//! `%%` is a literal percent sign.

use std::fmt::Write as _;

use gridline_core::logging::targets;

// ============================================================================
// Cell kinds
// ============================================================================

/// What kind of externally owned value a reference cell points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Str,
    Int,
    UInt,
    Long,
    ULong,
    Int64,
    UInt64,
    Float,
    Double,
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
}

impl RefKind {
    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            RefKind::Str => "string ref",
            RefKind::Int => "int ref",
            RefKind::UInt => "uint ref",
            RefKind::Long => "long ref",
            RefKind::ULong => "ulong ref",
            RefKind::Int64 => "int64 ref",
            RefKind::UInt64 => "uint64 ref",
            RefKind::Float => "float ref",
            RefKind::Double => "double ref",
            RefKind::S8 => "s8 ref",
            RefKind::U8 => "u8 ref",
            RefKind::S16 => "s16 ref",
            RefKind::U16 => "u16 ref",
            RefKind::S32 => "s32 ref",
            RefKind::U32 => "u32 ref",
        }
    }
}

/// The value kind a column spec asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Text,
    Int,
    UInt,
    Long,
    ULong,
    Int64,
    UInt64,
    Float,
    Double,
    Pointer,
    FnText,
    FnSurface,
    Ref(RefKind),
}

impl CellKind {
    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            CellKind::Text => "string",
            CellKind::Int => "int",
            CellKind::UInt => "uint",
            CellKind::Long => "long",
            CellKind::ULong => "ulong",
            CellKind::Int64 => "int64",
            CellKind::UInt64 => "uint64",
            CellKind::Float => "float",
            CellKind::Double => "double",
            CellKind::Pointer => "pointer",
            CellKind::FnText => "text function",
            CellKind::FnSurface => "surface function",
            CellKind::Ref(kind) => kind.name(),
        }
    }
}

// ============================================================================
// Pattern
// ============================================================================

/// A parsed conversion: flags, width, precision and the printf letter used
/// for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Conversion {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    width: Option<usize>,
    precision: Option<usize>,
    letter: char,
}

/// A printf-style display pattern with at most one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    prefix: String,
    conversion: Option<Conversion>,
    suffix: String,
}

impl Pattern {
    /// A pattern that prints `text` and has no conversion.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            prefix: text.into(),
            conversion: None,
            suffix: String::new(),
        }
    }

    /// Whether the pattern has a conversion.
    pub fn has_conversion(&self) -> bool {
        self.conversion.is_some()
    }

    fn wrap(&self, body: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + body.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(body);
        out.push_str(&self.suffix);
        out
    }

    /// Format a signed integer.
    pub fn format_signed(&self, value: i64) -> String {
        match self.conversion {
            Some(conv) => self.wrap(&conv.integer(value < 0, value.unsigned_abs(), true)),
            None => self.wrap(""),
        }
    }

    /// Format an unsigned integer.
    pub fn format_unsigned(&self, value: u64) -> String {
        match self.conversion {
            Some(conv) => self.wrap(&conv.integer(false, value, false)),
            None => self.wrap(""),
        }
    }

    /// Format a floating point number.
    pub fn format_float(&self, value: f64) -> String {
        match self.conversion {
            Some(conv) => self.wrap(&conv.float(value)),
            None => self.wrap(""),
        }
    }

    /// Format a string.
    pub fn format_str(&self, value: &str) -> String {
        match self.conversion {
            Some(conv) => {
                let truncated: String = match conv.precision {
                    Some(p) => value.chars().take(p).collect(),
                    None => value.to_owned(),
                };
                self.wrap(&conv.pad(String::new(), truncated, false))
            }
            None => self.wrap(""),
        }
    }

    /// Format an address.
    pub fn format_pointer(&self, address: usize) -> String {
        match self.conversion {
            Some(conv) => self.wrap(&conv.pad(String::new(), format!("0x{address:x}"), false)),
            None => self.wrap(""),
        }
    }
}

impl Conversion {
    /// Pad `sign + digits` to the field width.
    fn pad(&self, sign: String, digits: String, zero_ok: bool) -> String {
        let len = sign.chars().count() + digits.chars().count();
        let width = self.width.unwrap_or(0);
        if len >= width {
            return sign + &digits;
        }
        let fill = width - len;
        if self.left {
            sign + &digits + &" ".repeat(fill)
        } else if self.zero && zero_ok {
            sign + &"0".repeat(fill) + &digits
        } else {
            " ".repeat(fill) + &sign + &digits
        }
    }

    fn sign(&self, negative: bool, signed: bool) -> String {
        if negative {
            "-".into()
        } else if signed && self.plus {
            "+".into()
        } else if signed && self.space {
            " ".into()
        } else {
            String::new()
        }
    }

    fn integer(&self, negative: bool, magnitude: u64, signed: bool) -> String {
        let mut digits = magnitude.to_string();
        if let Some(p) = self.precision {
            if p == 0 && magnitude == 0 {
                digits.clear();
            } else if digits.len() < p {
                digits = "0".repeat(p - digits.len()) + &digits;
            }
        }
        // An explicit precision disables zero padding.
        let zero_ok = self.precision.is_none();
        self.pad(self.sign(negative, signed), digits, zero_ok)
    }

    fn float(&self, value: f64) -> String {
        let negative = value.is_sign_negative() && !value.is_nan();
        let sign = self.sign(negative, true);
        let magnitude = value.abs();
        if !magnitude.is_finite() {
            let text = if magnitude.is_nan() { "nan" } else { "inf" };
            return self.pad(sign, text.into(), false);
        }
        let digits = match self.letter {
            'g' => format_general(magnitude, self.precision.unwrap_or(6)),
            _ => format!("{:.*}", self.precision.unwrap_or(6), magnitude),
        };
        self.pad(sign, digits, true)
    }
}

/// `%g`: the shorter of fixed and exponent notation with `precision`
/// significant digits and trailing zeros removed.
fn format_general(magnitude: f64, precision: usize) -> String {
    let precision = precision.max(1);
    if magnitude == 0.0 {
        return "0".into();
    }
    // Exponent after rounding to the requested significant digits.
    let sci = format!("{:.*e}", precision - 1, magnitude);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m.to_owned(), e.parse::<i32>().unwrap_or(0)),
        None => (sci.clone(), 0),
    };
    if exponent < -4 || exponent >= precision as i32 {
        let mut out = strip_fraction_zeros(&mantissa);
        let _ = write!(
            out,
            "e{}{:02}",
            if exponent < 0 { '-' } else { '+' },
            exponent.unsigned_abs()
        );
        out
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_fraction_zeros(&format!("{magnitude:.decimals$}"))
    }
}

fn strip_fraction_zeros(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text.to_owned()
    }
}

// ============================================================================
// Column specs
// ============================================================================

/// One parsed column spec of a row format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// No conversion: a null cell showing `text` verbatim (nothing if empty).
    Literal { text: String },
    /// A conversion that could not be parsed. The column gets a null cell
    /// showing the raw spec and takes no positional value.
    Malformed { text: String },
    /// A conversion consuming one value of `kind`.
    Value {
        text: String,
        kind: CellKind,
        pattern: Pattern,
    },
}

impl ColumnSpec {
    /// The raw spec text.
    pub fn text(&self) -> &str {
        match self {
            ColumnSpec::Literal { text }
            | ColumnSpec::Malformed { text }
            | ColumnSpec::Value { text, .. } => text,
        }
    }

    /// Whether this spec consumes a positional value.
    pub fn consumes_value(&self) -> bool {
        matches!(self, ColumnSpec::Value { .. })
    }

    /// Parse a single column spec.
    pub fn parse(spec: &str) -> Self {
        match parse_spec(spec) {
            Ok(None) => ColumnSpec::Literal { text: spec.into() },
            Ok(Some((kind, pattern))) => ColumnSpec::Value {
                text: spec.into(),
                kind,
                pattern,
            },
            Err(reason) => {
                tracing::warn!(target: targets::TABLE, spec, reason, "malformed column format");
                ColumnSpec::Malformed { text: spec.into() }
            }
        }
    }
}

/// A parsed row format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowFormat {
    specs: Vec<ColumnSpec>,
}

impl RowFormat {
    /// Parse a `:`-separated row format.
    pub fn parse(format: &str) -> Self {
        Self {
            specs: format.split(':').map(ColumnSpec::parse).collect(),
        }
    }

    /// All parsed specs, including any beyond the table's column count.
    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    /// The spec for `column`, if the format names one.
    pub fn spec(&self, column: usize) -> Option<&ColumnSpec> {
        self.specs.get(column)
    }

    /// Number of values a row of `columns` cells consumes.
    pub fn expected_values(&self, columns: usize) -> usize {
        self.specs
            .iter()
            .take(columns)
            .filter(|s| s.consumes_value())
            .count()
    }
}

type Parsed = Option<(CellKind, Pattern)>;

/// Largest accepted field width or precision.
const MAX_FIELD: usize = 1024;

fn parse_spec(spec: &str) -> Result<Parsed, &'static str> {
    let chars: Vec<char> = spec.chars().collect();
    let mut prefix = String::new();
    let mut suffix = String::new();
    let mut found: Option<(CellKind, Conversion)> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '%' {
            if found.is_some() {
                suffix.push(c);
            } else {
                prefix.push(c);
            }
            i += 1;
            continue;
        }
        if chars.get(i + 1) == Some(&'%') {
            if found.is_some() {
                suffix.push('%');
            } else {
                prefix.push('%');
            }
            i += 2;
            continue;
        }
        if found.is_some() {
            return Err("more than one conversion");
        }
        let (kind, conv, next) = parse_conversion(&chars, i + 1)?;
        found = Some((kind, conv));
        i = next;
    }

    Ok(found.map(|(kind, conversion)| {
        (
            kind,
            Pattern {
                prefix,
                conversion: Some(conversion),
                suffix,
            },
        )
    }))
}

/// Parse the conversion starting right after `%`. Returns the cell kind,
/// the display conversion and the index after the conversion.
fn parse_conversion(
    chars: &[char],
    mut i: usize,
) -> Result<(CellKind, Conversion, usize), &'static str> {
    let mut conv = Conversion::default();

    while let Some(&c) = chars.get(i) {
        match c {
            '-' => conv.left = true,
            '0' => conv.zero = true,
            '+' => conv.plus = true,
            ' ' => conv.space = true,
            _ => break,
        }
        i += 1;
    }

    let (width, next) = parse_number(chars, i);
    if width.is_some_and(|w| w > MAX_FIELD) {
        return Err("field width too large");
    }
    conv.width = width;
    i = next;

    if chars.get(i) == Some(&'.') {
        let (precision, next) = parse_number(chars, i + 1);
        let precision = precision.unwrap_or(0);
        if precision > MAX_FIELD {
            return Err("precision too large");
        }
        conv.precision = Some(precision);
        i = next;
    }

    let by_ref = chars.get(i) == Some(&'*');
    if by_ref {
        i += 1;
    }

    let mut longs = 0;
    while chars.get(i) == Some(&'l') {
        longs += 1;
        i += 1;
    }
    if longs > 2 {
        return Err("too many length modifiers");
    }

    let Some(&letter) = chars.get(i) else {
        return Err("missing conversion letter");
    };
    i += 1;

    if letter == '[' {
        if longs > 0 {
            return Err("length modifier on a bracket conversion");
        }
        let close = chars[i..]
            .iter()
            .position(|&c| c == ']')
            .ok_or("unterminated bracket conversion")?;
        let code: String = chars[i..i + close].iter().collect();
        i += close + 1;
        let (kind, letter) = match code.as_str() {
            "s8" => (CellKind::Ref(RefKind::S8), 'd'),
            "u8" => (CellKind::Ref(RefKind::U8), 'u'),
            "s16" => (CellKind::Ref(RefKind::S16), 'd'),
            "u16" => (CellKind::Ref(RefKind::U16), 'u'),
            "s32" => (CellKind::Ref(RefKind::S32), 'd'),
            "u32" => (CellKind::Ref(RefKind::U32), 'u'),
            "Ft" if !by_ref => (CellKind::FnText, 's'),
            "Fs" if !by_ref => (CellKind::FnSurface, 's'),
            "Ft" | "Fs" => return Err("function conversions cannot be references"),
            _ => return Err("unknown bracket conversion"),
        };
        conv.letter = letter;
        return Ok((kind, conv, i));
    }

    conv.letter = letter;
    let kind = match (letter, longs) {
        ('s', 0) => plain_or_ref(by_ref, CellKind::Text, RefKind::Str),
        ('d' | 'i', 0) => plain_or_ref(by_ref, CellKind::Int, RefKind::Int),
        ('d' | 'i', 1) => plain_or_ref(by_ref, CellKind::Long, RefKind::Long),
        ('d' | 'i', 2) => plain_or_ref(by_ref, CellKind::Int64, RefKind::Int64),
        ('u', 0) => plain_or_ref(by_ref, CellKind::UInt, RefKind::UInt),
        ('u', 1) => plain_or_ref(by_ref, CellKind::ULong, RefKind::ULong),
        ('u', 2) => plain_or_ref(by_ref, CellKind::UInt64, RefKind::UInt64),
        ('f' | 'g', 0) => plain_or_ref(by_ref, CellKind::Double, RefKind::Double),
        ('f' | 'g', 1) => plain_or_ref(by_ref, CellKind::Float, RefKind::Float),
        ('p', 0) if !by_ref => CellKind::Pointer,
        ('p', 0) => return Err("pointers cannot be references"),
        ('s' | 'p' | 'f' | 'g', _) => return Err("invalid length modifier"),
        _ => return Err("unknown conversion letter"),
    };
    if letter == 'i' {
        conv.letter = 'd';
    }
    Ok((kind, conv, i))
}

fn plain_or_ref(by_ref: bool, plain: CellKind, reference: RefKind) -> CellKind {
    if by_ref {
        CellKind::Ref(reference)
    } else {
        plain
    }
}

fn parse_number(chars: &[char], mut i: usize) -> (Option<usize>, usize) {
    let start = i;
    let mut value: usize = 0;
    while let Some(d) = chars.get(i).and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(d as usize);
        i += 1;
    }
    if i == start { (None, i) } else { (Some(value), i) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(spec: &str) -> Pattern {
        match ColumnSpec::parse(spec) {
            ColumnSpec::Value { pattern, .. } => pattern,
            other => panic!("expected a conversion, got {other:?}"),
        }
    }

    fn kind(spec: &str) -> CellKind {
        match ColumnSpec::parse(spec) {
            ColumnSpec::Value { kind, .. } => kind,
            other => panic!("expected a conversion, got {other:?}"),
        }
    }

    #[test]
    fn test_conversion_table() {
        assert_eq!(kind("%s"), CellKind::Text);
        assert_eq!(kind("%d"), CellKind::Int);
        assert_eq!(kind("%i"), CellKind::Int);
        assert_eq!(kind("%ld"), CellKind::Long);
        assert_eq!(kind("%lld"), CellKind::Int64);
        assert_eq!(kind("%u"), CellKind::UInt);
        assert_eq!(kind("%lu"), CellKind::ULong);
        assert_eq!(kind("%llu"), CellKind::UInt64);
        assert_eq!(kind("%.2f"), CellKind::Double);
        assert_eq!(kind("%g"), CellKind::Double);
        assert_eq!(kind("%lf"), CellKind::Float);
        assert_eq!(kind("%p"), CellKind::Pointer);
        assert_eq!(kind("%[Ft]"), CellKind::FnText);
        assert_eq!(kind("%[Fs]"), CellKind::FnSurface);
    }

    #[test]
    fn test_reference_conversions() {
        assert_eq!(kind("%*s"), CellKind::Ref(RefKind::Str));
        assert_eq!(kind("%*lld"), CellKind::Ref(RefKind::Int64));
        assert_eq!(kind("%.1*f"), CellKind::Ref(RefKind::Double));
        assert_eq!(kind("%[u16]"), CellKind::Ref(RefKind::U16));
        assert_eq!(kind("%*[s8]"), CellKind::Ref(RefKind::S8));
    }

    #[test]
    fn test_malformed_specs() {
        for spec in ["%q", "%*p", "%[x9]", "%[s8", "%lls", "%lllld", "%d and %d", "%*[Ft]", "%"] {
            assert!(
                matches!(ColumnSpec::parse(spec), ColumnSpec::Malformed { .. }),
                "{spec} should be malformed"
            );
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            ColumnSpec::parse("Total"),
            ColumnSpec::Literal {
                text: "Total".into()
            }
        );
        assert!(!ColumnSpec::parse("").consumes_value());
        assert!(!ColumnSpec::parse("100%%").consumes_value());
        assert!(!ColumnSpec::parse("%q").consumes_value());
    }

    #[test]
    fn test_field_limits() {
        assert_eq!(pattern("%1024d").format_signed(1).len(), MAX_FIELD);
        assert_eq!(pattern("%.1024f").format_float(0.5).len(), MAX_FIELD + 2);
        for spec in ["%1025d", "%99999999999999999999d", "%.1025f", "%.99999999999999999999s"] {
            assert!(
                matches!(ColumnSpec::parse(spec), ColumnSpec::Malformed { .. }),
                "{spec} should be malformed"
            );
        }
    }

    #[test]
    fn test_row_format_counts_used_columns_only() {
        let format = RowFormat::parse("%s:label:%d:%d");
        assert_eq!(format.specs().len(), 4);
        assert_eq!(format.expected_values(4), 3);
        assert_eq!(format.expected_values(2), 1);
        assert!(format.spec(5).is_none());
    }

    #[test]
    fn test_integer_formatting() {
        assert_eq!(pattern("%d").format_signed(-42), "-42");
        assert_eq!(pattern("%5d").format_signed(42), "   42");
        assert_eq!(pattern("%-5d|").format_signed(42), "42   |");
        assert_eq!(pattern("%05d").format_signed(-42), "-0042");
        assert_eq!(pattern("%+d").format_signed(7), "+7");
        assert_eq!(pattern("% d").format_signed(7), " 7");
        assert_eq!(pattern("%.3d").format_signed(7), "007");
        assert_eq!(pattern("%u items").format_unsigned(3), "3 items");
        assert_eq!(pattern("%+u").format_unsigned(3), "3");
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(pattern("%f").format_float(1.5), "1.500000");
        assert_eq!(pattern("%.2f kg").format_float(72.456), "72.46 kg");
        assert_eq!(pattern("%08.3f").format_float(-3.14159), "-003.142");
        assert_eq!(pattern("%g").format_float(0.5), "0.5");
        assert_eq!(pattern("%g").format_float(100000.0), "100000");
        assert_eq!(pattern("%g").format_float(1000000.0), "1e+06");
        assert_eq!(pattern("%g").format_float(0.0001), "0.0001");
        assert_eq!(pattern("%g").format_float(0.00001234), "1.234e-05");
        assert_eq!(pattern("%.3g").format_float(3.14159), "3.14");
    }

    #[test]
    fn test_string_and_pointer_formatting() {
        assert_eq!(pattern("%s").format_str("Alice"), "Alice");
        assert_eq!(pattern("[%6s]").format_str("Bob"), "[   Bob]");
        assert_eq!(pattern("%-6s|").format_str("Bob"), "Bob   |");
        assert_eq!(pattern("%.2s").format_str("Alice"), "Al");
        assert_eq!(pattern("%p").format_pointer(0xbeef), "0xbeef");
        assert_eq!(pattern("100%% %d").format_signed(1), "100% 1");
    }
}
