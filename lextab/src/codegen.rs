#![cfg(feature = "codegen")]

//! Rust code generation.
//!
//! This module turns compiled tables into Rust expressions, typically from `build.rs`. The output
//! only calls `const fn` constructors and borrows its arrays, so it can initialize a `static`:
//!
//! ```rust
//! # fn main() -> Result<(), lextab::Error> {
//! let set = lextab::KeyValueSet::from_entries([("div", 1u16), ("span", 2)])?;
//! let compilation = lextab::HashTable::compile(&set, &lextab::Config::default())?;
//!
//! // Convert to code
//! let code = lextab::codegen::CodeGenerator::new().generate(&compilation.table);
//! assert!(code.to_string().contains("from_raw_parts"));
//!
//! // `code` can now be saved to an `.rs` file and then loaded with `include!`
//! # Ok(())
//! # }
//! ```
//!
//! ```ignore
//! static TAGS: lextab::HashTable<'static, u16> = include!(concat!(env!("OUT_DIR"), "/tags.rs"));
//! ```
//!
//! Values stored in tables need to implement [`Codegen`] too. Integers, `bool`, `char`, string and
//! byte slices, options, arrays, and small tuples are covered.

use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use proc_macro2::{Ident, Literal, TokenStream, TokenTree};
use quote::{format_ident, quote};
use std::collections::{HashMap, HashSet};

/// Code generator.
pub struct CodeGenerator {
    /// Mapping from crate names to paths, as provided with [`set_crate`](Self::set_crate).
    crate_paths: HashMap<String, TokenStream>,

    /// Mapping from paths (as passed to [`path`](Self::path)) to identifiers (as aliased with
    /// `use {path} as {ident};`).
    path_to_alias: HashMap<String, Ident>,

    /// Identifiers already used for aliases.
    aliases: HashSet<String>,

    /// Whether [`path`](Self::path) has ever been called on an item from the [`alloc`] crate.
    alloc_wanted: bool,
}

impl CodeGenerator {
    /// Create a code generator with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            crate_paths: HashMap::from([("lextab".into(), quote!(::lextab))]),
            path_to_alias: HashMap::new(),
            aliases: HashSet::new(),
            alloc_wanted: false,
        }
    }

    /// Configure name-to-path mapping for crates.
    ///
    /// By default, `lextab` is mapped to `::lextab`. Reconfiguring this is necessary if the
    /// generated code is compiled in a crate that renames the dependency, or by `lextab` itself.
    #[inline]
    pub fn set_crate(&mut self, name: &str, path: TokenStream) {
        self.crate_paths.insert(name.into(), path);
    }

    /// Turn a value into code.
    ///
    /// The result is a block expression of the form:
    ///
    /// ```ignore
    /// {
    ///     use ::lextab::HashTable as __HashTable;
    ///     use ::core::option::Option::Some as __Some;
    ///     // other imports...
    ///     __HashTable::from_raw_parts(/* ... */)
    /// }
    /// ```
    ///
    /// Imports are sorted, so equal values always produce equal code.
    #[inline]
    pub fn generate<T: Codegen>(mut self, value: &T) -> TokenStream {
        let value = self.piece(value);

        let mut crate_paths = core::mem::take(&mut self.crate_paths);
        let extern_crate_alloc = (self.alloc_wanted
            && crate_paths
                .insert("alloc".to_owned(), quote!(_Alloc))
                .is_none())
        .then_some(quote!(
            extern crate alloc as _Alloc;
        ));

        let mut imports: Vec<(String, Ident)> = core::mem::take(&mut self.path_to_alias)
            .into_iter()
            .collect();
        imports.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut uses = Vec::new();
        for (path, alias) in imports {
            let (crate_name, rest) = path.split_once("::").unwrap_or((path.as_str(), ""));
            let crate_path = if let Some(crate_path) = crate_paths.get(crate_name) {
                crate_path.clone()
            } else {
                let ident = format_ident!("{crate_name}");
                quote!(:: #ident)
            };
            let components = rest
                .split("::")
                .filter(|component| !component.is_empty())
                .map(|component| format_ident!("{component}"));
            uses.push(quote!(use #crate_path #(:: #components)* as #alias;));
        }

        quote!(
            {
                #extern_crate_alloc
                #(#uses)*
                #value
            }
        )
    }

    /// Turn a value into a recursively useable piece of code.
    #[inline]
    pub fn piece<T: Codegen>(&mut self, piece: &T) -> TokenStream {
        piece.generate_piece(self)
    }

    /// Produce code for an array from an iterator.
    #[inline]
    pub fn array<'a, T: 'a + Codegen>(
        &mut self,
        elements: impl IntoIterator<Item = &'a T>,
    ) -> TokenStream {
        let elements = elements.into_iter().map(|element| self.piece(element));
        quote!([#(#elements),*])
    }

    /// Resolve a path.
    ///
    /// The input string must look like `crate::path::inside::it`, or just `crate`. Semantically,
    /// this path must be `use`able. This is different from using the path directly for two reasons:
    ///
    /// - This method resolves crates according to the paths configured by
    ///   [`CodeGenerator::set_crate`].
    /// - This method replaces long paths with short aliases imported just once with `use`, reducing
    ///   code size.
    #[inline]
    pub fn path(&mut self, path: &str) -> TokenStream {
        if let Some(alias) = self.path_to_alias.get(path) {
            return quote!(#alias);
        }

        if path.split_once("::").unwrap_or((path, "")).0 == "alloc" {
            self.alloc_wanted = true;
        }

        let base = format!("__{}", path.rsplit_once("::").unwrap_or(("", path)).1);
        let mut alias = base.clone();
        let mut n = 2usize;
        while self.aliases.contains(&alias) {
            alias = format!("{base}{n}");
            n = n.saturating_add(1);
        }
        self.aliases.insert(alias.clone());

        let alias = format_ident!("{alias}");
        self.path_to_alias.insert(path.to_owned(), alias.clone());
        quote!(#alias)
    }
}

impl Default for CodeGenerator {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Values that can be turned into code.
///
/// This trait is a subtrait of `Sized`, as Rust expressions can only evaluate to sized objects.
///
/// Types whose fields are private expose a `#[doc(hidden)]` `const fn from_raw_parts` constructor
/// for the generated code to call.
pub trait Codegen: Sized {
    /// Emit a piece of code corresponding to this value.
    ///
    /// This method is only supposed to be called recursively from [`Codegen`] implementations. Call
    /// [`CodeGenerator::generate`] to produce the complete code output for a single value.
    fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream;
}

/// Implement [`Codegen`] for types by calling methods on [`Literal`].
macro_rules! literal {
    ($($ty:ty => $method:ident,)*) => {
        $(
            impl Codegen for $ty {
                #[inline]
                fn generate_piece(&self, _gen: &mut CodeGenerator) -> TokenStream {
                    TokenTree::Literal(Literal::$method(*self)).into()
                }
            }
        )*
    };
}

literal! {
    u8 => u8_unsuffixed,
    u16 => u16_unsuffixed,
    u32 => u32_unsuffixed,
    u64 => u64_unsuffixed,
    u128 => u128_unsuffixed,
    usize => usize_unsuffixed,
    i8 => i8_unsuffixed,
    i16 => i16_unsuffixed,
    i32 => i32_unsuffixed,
    i64 => i64_unsuffixed,
    i128 => i128_unsuffixed,
    isize => isize_unsuffixed,
    char => character,
    // `str` is `!Sized`, so the reference gets the implementation.
    &'_ str => string,
}

impl Codegen for bool {
    #[inline]
    fn generate_piece(&self, _gen: &mut CodeGenerator) -> TokenStream {
        TokenTree::Ident(format_ident!("{self}")).into()
    }
}

impl<T: Codegen, const N: usize> Codegen for [T; N] {
    #[inline]
    fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream {
        gen.array(self)
    }
}

impl<T: Codegen> Codegen for &T {
    #[inline]
    fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream {
        let target = gen.piece(*self);
        quote!(&#target)
    }
}

impl<T: Codegen> Codegen for &[T] {
    #[inline]
    fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream {
        if let Some(bytes) = as_byte_slice(*self) {
            // Unsize explicitly: the element type may still be an inference variable at the use
            // site, e.g. inside `Some(..)`.
            let bytes = Literal::byte_string(bytes);
            quote!(#bytes as &[u8])
        } else {
            let array = gen.array(*self);
            quote!(&#array)
        }
    }
}

/// If `T` is `[u8]`, returns `Some(value)`. Otherwise, returns `None`.
///
/// This is a form of specialization for codegening byte arrays with `b".."` instead of `[..]`.
fn as_byte_slice<T: ?Sized>(value: &T) -> Option<&[u8]> {
    if typeid::of::<T>() == typeid::of::<[u8]>() {
        // SAFETY: `T` and `[u8]` have the same type ID. `[u8]` doesn't contain lifetimes, so `T`
        // must be the same type, thus `transmute_copy` is a no-op.
        Some(unsafe { core::mem::transmute_copy::<&T, &[u8]>(&value) })
    } else {
        None
    }
}

impl<T: Codegen> Codegen for Option<T> {
    #[inline]
    fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream {
        match self {
            None => gen.path("core::option::Option::None"),
            Some(value) => {
                let some = gen.path("core::option::Option::Some");
                let value = gen.piece(value);
                quote!(#some(#value))
            }
        }
    }
}

impl Codegen for () {
    #[inline]
    fn generate_piece(&self, _gen: &mut CodeGenerator) -> TokenStream {
        quote!(())
    }
}

/// Implement [`Codegen`] for tuples of the given arities.
macro_rules! tuple {
    ($(($($name:ident: $index:tt),*))*) => {
        $(
            impl<$($name: Codegen),*> Codegen for ($($name,)*) {
                #[inline]
                #[allow(non_snake_case, reason = "reusing type parameter names")]
                fn generate_piece(&self, gen: &mut CodeGenerator) -> TokenStream {
                    $(let $name = gen.piece(&self.$index);)*
                    quote!(($(#$name,)*))
                }
            }
        )*
    };
}

tuple! {
    (A: 0)
    (A: 0, B: 1)
    (A: 0, B: 1, C: 2)
    (A: 0, B: 1, C: 2, D: 3)
}
