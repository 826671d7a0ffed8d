//! Table cells and the values they display.
//!
//! A [`Cell`] pairs a [`CellValue`] with the display pattern it was added
//! with. Values are either owned (numbers, strings), borrowed from the
//! application through a [`ValueRef`], or produced on demand by a text or
//! surface function.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::render::{Point, SurfaceId, TextRenderer};

use super::format::{CellKind, Pattern, RefKind};

/// Text shown for a reference whose owner has been dropped.
pub const EXPIRED_TEXT: &str = "<expired>";

/// A function producing a cell's text each time it is displayed.
pub type TextFn = Arc<dyn Fn() -> String + Send + Sync>;

/// A function rendering a cell's surface. It receives the renderer and the
/// cell's top-left corner.
pub type SurfaceFn = Arc<dyn Fn(&mut dyn TextRenderer, Point) -> SurfaceId + Send + Sync>;

/// An opaque application pointer, compared by identity.
pub type OpaquePtr = Arc<dyn Any + Send + Sync>;

// ============================================================================
// ValueRef
// ============================================================================

/// A non-owning view of a value the application keeps updating.
///
/// The table never keeps the value alive; once the owner drops its `Arc`
/// the cell shows [`EXPIRED_TEXT`].
#[derive(Debug, Clone)]
pub enum ValueRef {
    Str(Weak<RwLock<String>>),
    Int(Weak<RwLock<i32>>),
    UInt(Weak<RwLock<u32>>),
    Long(Weak<RwLock<i64>>),
    ULong(Weak<RwLock<u64>>),
    Int64(Weak<RwLock<i64>>),
    UInt64(Weak<RwLock<u64>>),
    Float(Weak<RwLock<f32>>),
    Double(Weak<RwLock<f64>>),
    S8(Weak<RwLock<i8>>),
    U8(Weak<RwLock<u8>>),
    S16(Weak<RwLock<i16>>),
    U16(Weak<RwLock<u16>>),
    S32(Weak<RwLock<i32>>),
    U32(Weak<RwLock<u32>>),
}

/// A snapshot of the value behind a [`ValueRef`].
#[derive(Debug, Clone, PartialEq)]
enum RefValue {
    Str(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl ValueRef {
    /// The kind of value referenced.
    pub fn kind(&self) -> RefKind {
        match self {
            ValueRef::Str(_) => RefKind::Str,
            ValueRef::Int(_) => RefKind::Int,
            ValueRef::UInt(_) => RefKind::UInt,
            ValueRef::Long(_) => RefKind::Long,
            ValueRef::ULong(_) => RefKind::ULong,
            ValueRef::Int64(_) => RefKind::Int64,
            ValueRef::UInt64(_) => RefKind::UInt64,
            ValueRef::Float(_) => RefKind::Float,
            ValueRef::Double(_) => RefKind::Double,
            ValueRef::S8(_) => RefKind::S8,
            ValueRef::U8(_) => RefKind::U8,
            ValueRef::S16(_) => RefKind::S16,
            ValueRef::U16(_) => RefKind::U16,
            ValueRef::S32(_) => RefKind::S32,
            ValueRef::U32(_) => RefKind::U32,
        }
    }

    /// Whether the referenced value has been dropped.
    pub fn is_expired(&self) -> bool {
        self.read().is_none()
    }

    fn read(&self) -> Option<RefValue> {
        fn get<T: Copy>(weak: &Weak<RwLock<T>>) -> Option<T> {
            weak.upgrade().map(|v| *v.read())
        }
        Some(match self {
            ValueRef::Str(w) => RefValue::Str(w.upgrade()?.read().clone()),
            ValueRef::Int(w) | ValueRef::S32(w) => RefValue::Signed(get(w)?.into()),
            ValueRef::UInt(w) | ValueRef::U32(w) => RefValue::Unsigned(get(w)?.into()),
            ValueRef::Long(w) | ValueRef::Int64(w) => RefValue::Signed(get(w)?),
            ValueRef::ULong(w) | ValueRef::UInt64(w) => RefValue::Unsigned(get(w)?),
            ValueRef::Float(w) => RefValue::Float(get(w)?.into()),
            ValueRef::Double(w) => RefValue::Float(get(w)?),
            ValueRef::S8(w) => RefValue::Signed(get(w)?.into()),
            ValueRef::U8(w) => RefValue::Unsigned(get(w)?.into()),
            ValueRef::S16(w) => RefValue::Signed(get(w)?.into()),
            ValueRef::U16(w) => RefValue::Unsigned(get(w)?.into()),
        })
    }

    /// Convert to the reference kind a format asks for, if compatible.
    ///
    /// `%*d` and `%[s32]` both accept an `i32` reference, as do `%*u` and
    /// `%[u32]` for `u32`.
    pub(crate) fn coerce(self, kind: RefKind) -> Result<Self, Self> {
        match (self, kind) {
            (ValueRef::Int(w) | ValueRef::S32(w), RefKind::Int) => Ok(ValueRef::Int(w)),
            (ValueRef::Int(w) | ValueRef::S32(w), RefKind::S32) => Ok(ValueRef::S32(w)),
            (ValueRef::UInt(w) | ValueRef::U32(w), RefKind::UInt) => Ok(ValueRef::UInt(w)),
            (ValueRef::UInt(w) | ValueRef::U32(w), RefKind::U32) => Ok(ValueRef::U32(w)),
            (ValueRef::Long(w) | ValueRef::Int64(w), RefKind::Long) => Ok(ValueRef::Long(w)),
            (ValueRef::Long(w) | ValueRef::Int64(w), RefKind::Int64) => Ok(ValueRef::Int64(w)),
            (ValueRef::ULong(w) | ValueRef::UInt64(w), RefKind::ULong) => Ok(ValueRef::ULong(w)),
            (ValueRef::ULong(w) | ValueRef::UInt64(w), RefKind::UInt64) => {
                Ok(ValueRef::UInt64(w))
            }
            (value, kind) if value.kind() == kind => Ok(value),
            (value, _) => Err(value),
        }
    }
}

macro_rules! value_ref_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<&Arc<RwLock<$ty>>> for ValueRef {
                fn from(value: &Arc<RwLock<$ty>>) -> Self {
                    ValueRef::$variant(Arc::downgrade(value))
                }
            }
        )*
    };
}

value_ref_from! {
    String => Str,
    i32 => Int,
    u32 => UInt,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    i8 => S8,
    u8 => U8,
    i16 => S16,
    u16 => U16,
}

// ============================================================================
// CellArg
// ============================================================================

/// One positional value passed to `Table::add_row`.
#[derive(Clone)]
pub enum CellArg {
    Str(String),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Ref(ValueRef),
    Pointer(OpaquePtr),
    TextFn(TextFn),
    SurfaceFn(SurfaceFn),
}

impl CellArg {
    /// Wrap a text function.
    pub fn text_fn(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        CellArg::TextFn(Arc::new(f))
    }

    /// Wrap a surface function.
    pub fn surface_fn(
        f: impl Fn(&mut dyn TextRenderer, Point) -> SurfaceId + Send + Sync + 'static,
    ) -> Self {
        CellArg::SurfaceFn(Arc::new(f))
    }

    /// Wrap an opaque pointer.
    pub fn pointer(ptr: OpaquePtr) -> Self {
        CellArg::Pointer(ptr)
    }

    /// Short name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CellArg::Str(_) => "string",
            CellArg::I32(_) => "i32",
            CellArg::U32(_) => "u32",
            CellArg::I64(_) => "i64",
            CellArg::U64(_) => "u64",
            CellArg::F32(_) => "f32",
            CellArg::F64(_) => "f64",
            CellArg::Ref(r) => r.kind().name(),
            CellArg::Pointer(_) => "pointer",
            CellArg::TextFn(_) => "text function",
            CellArg::SurfaceFn(_) => "surface function",
        }
    }

    /// Convert into the value a column kind asks for. Lossless widening is
    /// accepted; anything else hands the argument back.
    pub(crate) fn into_value(self, kind: CellKind) -> Result<CellValue, CellArg> {
        Ok(match (kind, self) {
            (CellKind::Text, CellArg::Str(s)) => CellValue::Text(s),
            (CellKind::Int, CellArg::I32(v)) => CellValue::Int(v),
            (CellKind::UInt, CellArg::U32(v)) => CellValue::UInt(v),
            (CellKind::Long, CellArg::I64(v)) => CellValue::Long(v),
            (CellKind::Long, CellArg::I32(v)) => CellValue::Long(v.into()),
            (CellKind::ULong, CellArg::U64(v)) => CellValue::ULong(v),
            (CellKind::ULong, CellArg::U32(v)) => CellValue::ULong(v.into()),
            (CellKind::Int64, CellArg::I64(v)) => CellValue::Int64(v),
            (CellKind::Int64, CellArg::I32(v)) => CellValue::Int64(v.into()),
            (CellKind::UInt64, CellArg::U64(v)) => CellValue::UInt64(v),
            (CellKind::UInt64, CellArg::U32(v)) => CellValue::UInt64(v.into()),
            (CellKind::Float, CellArg::F32(v)) => CellValue::Float(v),
            (CellKind::Float, CellArg::F64(v)) => CellValue::Float(v as f32),
            (CellKind::Double, CellArg::F64(v)) => CellValue::Double(v),
            (CellKind::Double, CellArg::F32(v)) => CellValue::Double(v.into()),
            (CellKind::Pointer, CellArg::Pointer(p)) => CellValue::Pointer(p),
            (CellKind::FnText, CellArg::TextFn(f)) => CellValue::FnText(f),
            (CellKind::FnSurface, CellArg::SurfaceFn(f)) => CellValue::FnSurface(f),
            (CellKind::Ref(kind), CellArg::Ref(r)) => match r.coerce(kind) {
                Ok(r) => CellValue::Ref(r),
                Err(r) => return Err(CellArg::Ref(r)),
            },
            (_, arg) => return Err(arg),
        })
    }
}

impl fmt::Debug for CellArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellArg::Str(s) => f.debug_tuple("Str").field(s).finish(),
            CellArg::I32(v) => f.debug_tuple("I32").field(v).finish(),
            CellArg::U32(v) => f.debug_tuple("U32").field(v).finish(),
            CellArg::I64(v) => f.debug_tuple("I64").field(v).finish(),
            CellArg::U64(v) => f.debug_tuple("U64").field(v).finish(),
            CellArg::F32(v) => f.debug_tuple("F32").field(v).finish(),
            CellArg::F64(v) => f.debug_tuple("F64").field(v).finish(),
            CellArg::Ref(r) => f.debug_tuple("Ref").field(r).finish(),
            other => f.write_str(other.kind_name()),
        }
    }
}

macro_rules! cell_arg_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for CellArg {
                fn from(value: $ty) -> Self {
                    CellArg::$variant(value)
                }
            }
        )*
    };
}

cell_arg_from! {
    String => Str,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    ValueRef => Ref,
}

impl From<&str> for CellArg {
    fn from(value: &str) -> Self {
        CellArg::Str(value.to_owned())
    }
}

impl<T> From<&Arc<RwLock<T>>> for CellArg
where
    for<'a> ValueRef: From<&'a Arc<RwLock<T>>>,
{
    fn from(value: &Arc<RwLock<T>>) -> Self {
        CellArg::Ref(ValueRef::from(value))
    }
}

// ============================================================================
// CellValue
// ============================================================================

/// The value held by a cell.
#[derive(Clone, Default)]
pub enum CellValue {
    /// No value; the cell shows its literal format text, if any.
    #[default]
    Null,
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Text(String),
    Ref(ValueRef),
    Pointer(OpaquePtr),
    FnText(TextFn),
    FnSurface(SurfaceFn),
}

impl CellValue {
    fn variant_index(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Int(_) => 1,
            CellValue::UInt(_) => 2,
            CellValue::Long(_) => 3,
            CellValue::ULong(_) => 4,
            CellValue::Int64(_) => 5,
            CellValue::UInt64(_) => 6,
            CellValue::Float(_) => 7,
            CellValue::Double(_) => 8,
            CellValue::Text(_) => 9,
            CellValue::Ref(_) => 10,
            CellValue::Pointer(_) => 11,
            CellValue::FnText(_) => 12,
            CellValue::FnSurface(_) => 13,
        }
    }
}

impl fmt::Debug for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("Null"),
            CellValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            CellValue::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            CellValue::Long(v) => f.debug_tuple("Long").field(v).finish(),
            CellValue::ULong(v) => f.debug_tuple("ULong").field(v).finish(),
            CellValue::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            CellValue::UInt64(v) => f.debug_tuple("UInt64").field(v).finish(),
            CellValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            CellValue::Double(v) => f.debug_tuple("Double").field(v).finish(),
            CellValue::Text(v) => f.debug_tuple("Text").field(v).finish(),
            CellValue::Ref(v) => f.debug_tuple("Ref").field(v).finish(),
            CellValue::Pointer(p) => write!(f, "Pointer({:p})", Arc::as_ptr(p)),
            CellValue::FnText(_) => f.write_str("FnText"),
            CellValue::FnSurface(_) => f.write_str("FnSurface"),
        }
    }
}

// ============================================================================
// Cell
// ============================================================================

/// A surface rendered for a cell, with the text it was rendered from.
///
/// `text` is `None` for surfaces produced by a surface function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CachedSurface {
    pub id: SurfaceId,
    pub text: Option<String>,
}

/// One cell of the grid.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub(crate) value: CellValue,
    format: String,
    pattern: Pattern,
    pub(crate) selected: bool,
    pub(crate) surface: Option<CachedSurface>,
}

impl Cell {
    /// A null cell showing `text` verbatim.
    pub(crate) fn null(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            pattern: Pattern::literal(text.clone()),
            format: text,
            ..Default::default()
        }
    }

    pub(crate) fn with_value(value: CellValue, format: String, pattern: Pattern) -> Self {
        Self {
            value,
            format,
            pattern,
            selected: false,
            surface: None,
        }
    }

    /// The cell's value.
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// The raw format text the cell was added with.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Whether the cell is selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// The text displayed for this cell.
    ///
    /// Returns `None` for empty null cells and for surface-function cells,
    /// which draw a rendered surface instead of text.
    pub fn text(&self) -> Option<String> {
        let p = &self.pattern;
        Some(match &self.value {
            CellValue::Null if self.format.is_empty() => return None,
            CellValue::Null => self.format.clone(),
            CellValue::Int(v) => p.format_signed((*v).into()),
            CellValue::UInt(v) => p.format_unsigned((*v).into()),
            CellValue::Long(v) | CellValue::Int64(v) => p.format_signed(*v),
            CellValue::ULong(v) | CellValue::UInt64(v) => p.format_unsigned(*v),
            CellValue::Float(v) => p.format_float((*v).into()),
            CellValue::Double(v) => p.format_float(*v),
            CellValue::Text(s) => p.format_str(s),
            CellValue::Ref(r) => match r.read() {
                None => EXPIRED_TEXT.to_owned(),
                Some(RefValue::Str(s)) => p.format_str(&s),
                Some(RefValue::Signed(v)) => p.format_signed(v),
                Some(RefValue::Unsigned(v)) => p.format_unsigned(v),
                Some(RefValue::Float(v)) => p.format_float(v),
            },
            CellValue::Pointer(ptr) => p.format_pointer(Arc::as_ptr(ptr) as *const () as usize),
            CellValue::FnText(f) => p.format_str(&f()),
            CellValue::FnSurface(_) => return None,
        })
    }

    /// The text written for this cell by a text export.
    pub fn export_text(&self) -> String {
        match &self.value {
            CellValue::FnSurface(_) => "<image>".to_owned(),
            _ => self.text().unwrap_or_else(|| "<null>".to_owned()),
        }
    }

    /// Whether two cells would display the same thing, so a cached surface
    /// rendered for one can be reused for the other.
    pub fn same_content(&self, other: &Cell) -> bool {
        if self.value.variant_index() != other.value.variant_index() || self.format != other.format
        {
            return false;
        }
        match (&self.value, &other.value) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::UInt(a), CellValue::UInt(b)) => a == b,
            (CellValue::Long(a), CellValue::Long(b)) => a == b,
            (CellValue::ULong(a), CellValue::ULong(b)) => a == b,
            (CellValue::Int64(a), CellValue::Int64(b)) => a == b,
            (CellValue::UInt64(a), CellValue::UInt64(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a == b,
            (CellValue::Double(a), CellValue::Double(b)) => a == b,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Ref(a), CellValue::Ref(b)) => a.kind() == b.kind() && a.read() == b.read(),
            (CellValue::Pointer(a), CellValue::Pointer(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (CellValue::FnText(a), CellValue::FnText(b)) => a() == b(),
            (CellValue::FnSurface(a), CellValue::FnSurface(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }

    /// Natural ordering used for sorting: nulls first, then numbers by
    /// value, then everything else by displayed text.
    pub fn natural_cmp(&self, other: &Cell) -> Ordering {
        match (self.sort_key(), other.sort_key()) {
            (SortKey::Null, SortKey::Null) => Ordering::Equal,
            (SortKey::Null, _) => Ordering::Less,
            (_, SortKey::Null) => Ordering::Greater,
            (SortKey::Signed(a), SortKey::Signed(b)) => a.cmp(&b),
            (SortKey::Unsigned(a), SortKey::Unsigned(b)) => a.cmp(&b),
            (SortKey::Signed(a), SortKey::Unsigned(b)) => i128::from(a).cmp(&i128::from(b)),
            (SortKey::Unsigned(a), SortKey::Signed(b)) => i128::from(a).cmp(&i128::from(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => self.export_text().cmp(&other.export_text()),
            },
        }
    }

    fn sort_key(&self) -> SortKey {
        match &self.value {
            CellValue::Null => SortKey::Null,
            CellValue::Int(v) => SortKey::Signed((*v).into()),
            CellValue::Long(v) | CellValue::Int64(v) => SortKey::Signed(*v),
            CellValue::UInt(v) => SortKey::Unsigned((*v).into()),
            CellValue::ULong(v) | CellValue::UInt64(v) => SortKey::Unsigned(*v),
            CellValue::Float(v) => SortKey::Float((*v).into()),
            CellValue::Double(v) => SortKey::Float(*v),
            CellValue::Ref(r) => match r.read() {
                Some(RefValue::Signed(v)) => SortKey::Signed(v),
                Some(RefValue::Unsigned(v)) => SortKey::Unsigned(v),
                Some(RefValue::Float(v)) => SortKey::Float(v),
                Some(RefValue::Str(_)) | None => SortKey::Text,
            },
            _ => SortKey::Text,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SortKey {
    Null,
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Text,
}

impl SortKey {
    fn as_f64(self) -> Option<f64> {
        match self {
            SortKey::Signed(v) => Some(v as f64),
            SortKey::Unsigned(v) => Some(v as f64),
            SortKey::Float(v) => Some(v),
            SortKey::Null | SortKey::Text => None,
        }
    }
}
