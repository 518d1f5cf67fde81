//! C-style static array text.
//!
//! Runtimes that aren't written in Rust embed compiled tables as static array initializers. This
//! module renders them, along with `typedef enum` blocks for the token constants the tables refer
//! to. Everything here implements [`Display`](fmt::Display), and the output is a pure function of
//! the input: rendering the same table twice gives byte-identical text.
//!
//! ```rust
//! # fn main() -> Result<(), lextab::Error> {
//! use lextab::render::{self, Expr};
//!
//! let set = lextab::KeyValueSet::from_entries([
//!     ("a", Expr::new("TAG_A")),
//!     ("b", Expr::new("TAG_B")),
//! ])?;
//! let config = lextab::Config::default().with_search_window(2..5);
//! let compilation = lextab::HashTable::compile(&set, &config)?;
//!
//! let text = render::hash_table(&compilation.table, "shs_entry_t", "tag_shs", &config).to_string();
//! assert!(text.starts_with("static const shs_entry_t tag_shs[] = \n{\n    {NULL, NULL, 2, 0}"));
//! assert!(text.contains(r#"{"a", TAG_A, 1, 0}"#));
//! # Ok(())
//! # }
//! ```

use super::{Config, HashTable, Trie};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display, Write};

/// A value that can be written as C initializer fields.
///
/// Integers are written in decimal. Strings become hex-escaped C string literals followed by their
/// length in bytes, i.e. they take two fields. [`Expr`] is written verbatim.
pub trait RenderValue {
    /// Write the fields of a present value.
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Write the fields of an absent value. Must produce as many fields as [`render`](Self::render).
    #[inline]
    fn render_absent(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NULL")
    }
}

/// Implement [`RenderValue`] for integers.
macro_rules! decimal {
    ($($ty:ty),*) => {
        $(
            impl RenderValue for $ty {
                #[inline]
                fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{self}")
                }

                #[inline]
                fn render_absent(f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("0")
                }
            }
        )*
    };
}

decimal!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl RenderValue for [u8] {
    #[inline]
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", HexString(self), self.len())
    }

    #[inline]
    fn render_absent(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NULL, 0")
    }
}

impl RenderValue for str {
    #[inline]
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_bytes().render(f)
    }

    #[inline]
    fn render_absent(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <[u8]>::render_absent(f)
    }
}

impl RenderValue for String {
    #[inline]
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_bytes().render(f)
    }

    #[inline]
    fn render_absent(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <[u8]>::render_absent(f)
    }
}

impl<T: ?Sized + RenderValue> RenderValue for &T {
    #[inline]
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).render(f)
    }

    #[inline]
    fn render_absent(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        T::render_absent(f)
    }
}

/// A C expression, such as an enum constant or a macro, written verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr(String);

impl Expr {
    /// Wrap an expression.
    #[inline]
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// The expression text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RenderValue for Expr {
    #[inline]
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Adapter from [`RenderValue`] to [`Display`].
struct Fields<'v, V: ?Sized>(Option<&'v V>);

impl<V: RenderValue> Display for Fields<'_, V> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.render(f),
            None => V::render_absent(f),
        }
    }
}

/// A C string literal with every byte written as `\xNN`.
struct HexString<'b>(&'b [u8]);

impl Display for HexString<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for byte in self.0 {
            write!(f, "\\x{byte:02x}")?;
        }
        f.write_char('"')
    }
}

/// A C string literal for a key, kept readable when possible.
///
/// Printable ASCII without quotes and backslashes is written as is, anything else falls back to
/// [`HexString`].
struct KeyString<'k>(&'k str);

impl Display for KeyString<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self
            .0
            .bytes()
            .all(|byte| byte == b' ' || (byte.is_ascii_graphic() && byte != b'"' && byte != b'\\'));
        if plain {
            write!(f, "\"{}\"", self.0)
        } else {
            HexString(self.0.as_bytes()).fmt(f)
        }
    }
}

/// A static array initializer.
///
/// ```text
/// static const TYPE NAME[SIZE] =
/// {
///     item, item,
///     item
/// };
/// ```
///
/// Items are separated by `, ` and a line break follows every `rate`-th item. With an include
/// guard, the array is wrapped in `#ifdef NAME` / `#ifndef NAME_ENABLED`, so that a header can be
/// included in several places and the array is only defined where it's asked for.
#[derive(Clone, Debug)]
pub struct StaticArray {
    ty: String,
    name: String,
    size: Option<String>,
    guard: bool,
    rate: usize,
    items: Vec<String>,
}

impl StaticArray {
    /// Create an empty array of type `ty` named `name`.
    #[inline]
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            size: None,
            guard: false,
            rate: 2,
            items: Vec::new(),
        }
    }

    /// Write an explicit size expression between the brackets.
    #[inline]
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Wrap the array in an include guard named after the array.
    #[inline]
    #[must_use]
    pub fn with_guard(mut self, guard: bool) -> Self {
        self.guard = guard;
        self
    }

    /// Set the number of items per line. 0 is treated as 1.
    #[inline]
    #[must_use]
    pub fn with_rate(mut self, rate: usize) -> Self {
        self.rate = rate.max(1);
        self
    }

    /// Append an item.
    #[inline]
    pub fn push(&mut self, item: impl Display) {
        self.items.push(item.to_string());
    }

    /// The items appended so far.
    #[inline]
    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl Display for StaticArray {
    #[inline]
    #[allow(clippy::arithmetic_side_effects, reason = "rate is nonzero")]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.name.to_ascii_uppercase();
        if self.guard {
            writeln!(f, "#ifdef {guard}")?;
            writeln!(f, "#ifndef {guard}_ENABLED")?;
            writeln!(f, "#define {guard}_ENABLED")?;
        }

        write!(
            f,
            "static const {} {}[{}] = \n{{\n    ",
            self.ty,
            self.name,
            self.size.as_deref().unwrap_or("")
        )?;

        if let Some((last, init)) = self.items.split_last() {
            for (index, item) in init.iter().enumerate() {
                f.write_str(item)?;
                f.write_char(',')?;
                if index % self.rate == self.rate - 1 {
                    f.write_str("\n    ")?;
                } else {
                    f.write_char(' ')?;
                }
            }
            writeln!(f, "{last}")?;
        }

        f.write_str("};")?;

        if self.guard {
            write!(f, "\n#endif /* {guard}_ENABLED */\n#endif /* {guard} */")?;
        }
        Ok(())
    }
}

/// A `typedef enum` block of named constants.
///
/// ```text
/// typedef enum {
///     PREFIX_A     = 0x0001,
///     PREFIX_LONG  = 0x0002
/// }
/// type_t;
/// ```
///
/// The `=` signs are aligned on the longest name.
#[derive(Clone, Debug)]
pub struct ConstantBlock {
    ty: String,
    prefix: String,
    lines: Vec<Line>,
}

/// One line of a [`ConstantBlock`].
#[derive(Clone, Debug)]
enum Line {
    Constant { name: String, value: String },
    Raw(String),
}

impl ConstantBlock {
    /// Create an empty block declaring type `ty`, with constant names prefixed by `prefix`.
    #[inline]
    pub fn new(ty: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            prefix: prefix.into(),
            lines: Vec::new(),
        }
    }

    /// Create an empty block using [`Config::name_prefix`].
    #[inline]
    pub fn with_config(ty: impl Into<String>, config: &Config) -> Self {
        Self::new(ty, config.name_prefix())
    }

    /// Append a constant.
    #[inline]
    pub fn push(&mut self, name: impl Into<String>, value: impl Display) {
        self.lines.push(Line::Constant {
            name: name.into(),
            value: value.to_string(),
        });
    }

    /// Append a line verbatim, e.g. a comment or a preprocessor directive.
    #[inline]
    pub fn push_raw(&mut self, line: impl Into<String>) {
        self.lines.push(Line::Raw(line.into()));
    }

    /// Check if the block has no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Display for ConstantBlock {
    /// An empty block renders as nothing.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(last_constant) = self
            .lines
            .iter()
            .rposition(|line| matches!(line, Line::Constant { .. }))
        else {
            for line in &self.lines {
                if let Line::Raw(text) = line {
                    writeln!(f, "{text}")?;
                }
            }
            return Ok(());
        };

        let width = self
            .lines
            .iter()
            .filter_map(|line| match line {
                Line::Constant { name, .. } => Some(name.len()),
                Line::Raw(_) => None,
            })
            .max()
            .unwrap_or(0);

        writeln!(f, "typedef enum {{")?;
        for (index, line) in self.lines.iter().enumerate() {
            match line {
                Line::Constant { name, value } => {
                    let comma = if index == last_constant { "" } else { "," };
                    writeln!(f, "    {}{name:width$} = {value}{comma}", self.prefix)?;
                }
                Line::Raw(text) => writeln!(f, "{text}")?,
            }
        }
        writeln!(f, "}}")?;
        write!(f, "{};", self.ty)
    }
}

/// Turn a name into a C identifier fragment.
///
/// Everything except ASCII letters, digits and `_` becomes `_`, and letters are upper-cased.
#[inline]
#[must_use]
pub fn constant_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Render the cells of a hash table.
///
/// Every cell becomes `{key, value, key_len, next}`. Empty cells, the sentinel included, have
/// `NULL` for the key and the absent form of the value. Cells are written in index order, so the
/// `next` links stay valid.
#[inline]
pub fn hash_table<V: RenderValue, H>(
    table: &HashTable<'_, V, H>,
    ty: &str,
    name: &str,
    config: &Config,
) -> StaticArray {
    let mut array = StaticArray::new(ty, name).with_rate(config.line_rate());
    for cell in table.cells() {
        let key = cell.key();
        array.push(format_args!(
            "{{{}, {}, {}, {}}}",
            Nullable(key.map(KeyString)),
            Fields(cell.value()),
            cell.key_len(),
            cell.next()
        ));
    }
    array
}

/// Render the nodes of a trie.
///
/// Every node becomes `{0xBB, value, left, right, next}`, where `value` is the value of the name
/// ending at the node or its absent form.
#[inline]
pub fn trie<V: RenderValue>(trie: &Trie<'_, V>, ty: &str, name: &str, config: &Config) -> StaticArray {
    let mut array = StaticArray::new(ty, name).with_rate(config.line_rate());
    for node in trie.nodes() {
        array.push(format_args!(
            "{{0x{:02x}, {}, {}, {}, {}}}",
            node.byte(),
            Fields(node.value()),
            node.left(),
            node.right(),
            node.next()
        ));
    }
    array
}

/// A value or `NULL`.
struct Nullable<T>(Option<T>);

impl<T: Display> Display for Nullable<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("NULL"),
        }
    }
}
