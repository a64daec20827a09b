//! Describing Rust types as schema nodes
//!
//! [`Describe`] is the bridge between Rust types and the [`Schema`]. The
//! implementations here cover the standard library; user records get theirs
//! from `#[derive(Describe)]`.
//!
//! Smart pointers and references are transparent: `Box<T>`, `Arc<T>`, `Rc<T>`
//! and `&T` describe exactly like `T`. How a function *takes* a parameter is
//! recorded separately as [`Passing`](crate::Passing).
//!
//! # Examples
//!
//! ```rust
//! use wirebind_core::{Schema, TypeNode, Primitive};
//!
//! let mut schema = Schema::new();
//! let node = schema.describe::<Option<Vec<u32>>>();
//! assert_eq!(
//!     node,
//!     TypeNode::nullable(TypeNode::list(TypeNode::primitive(Primitive::U32)))
//! );
//! ```

use crate::schema::{Primitive, Schema, TypeNode};
use crate::types::Request;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// A type that can describe itself to a [`Schema`]
///
/// Implementations for named records must register their declaration through
/// [`Schema::begin_type`] and [`Schema::define_type`] and return a
/// [`TypeNode::Named`] reference, so recursive types terminate.
pub trait Describe {
    fn describe(schema: &mut Schema) -> TypeNode;
}

macro_rules! describe_primitive {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe(_schema: &mut Schema) -> TypeNode {
                    TypeNode::primitive(Primitive::$primitive)
                }
            }
        )*
    };
}

describe_primitive! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    str => String,
    char => Char,
    bool => Bool,
    () => Unit,
}

impl<T: Describe> Describe for Option<T> {
    fn describe(schema: &mut Schema) -> TypeNode {
        TypeNode::nullable(T::describe(schema))
    }
}

macro_rules! describe_list {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<T: Describe> Describe for $ty {
                fn describe(schema: &mut Schema) -> TypeNode {
                    TypeNode::list(T::describe(schema))
                }
            }
        )*
    };
}

describe_list!(Vec<T>, [T], VecDeque<T>, BTreeSet<T>, HashSet<T>);

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe(schema: &mut Schema) -> TypeNode {
        TypeNode::list(T::describe(schema))
    }
}

macro_rules! describe_transparent {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ty {
                fn describe(schema: &mut Schema) -> TypeNode {
                    T::describe(schema)
                }
            }
        )*
    };
}

describe_transparent!(Box<T>, Arc<T>, Rc<T>);

impl<T: Describe + ?Sized> Describe for &T {
    fn describe(schema: &mut Schema) -> TypeNode {
        T::describe(schema)
    }
}

// Maps have no structured wire description and fall back to `any`.
impl<K, V> Describe for HashMap<K, V> {
    fn describe(_schema: &mut Schema) -> TypeNode {
        TypeNode::Unknown
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn describe(_schema: &mut Schema) -> TypeNode {
        TypeNode::Unknown
    }
}

impl Describe for serde_json::Value {
    fn describe(_schema: &mut Schema) -> TypeNode {
        TypeNode::Unknown
    }
}

impl Describe for Request {
    fn describe(_schema: &mut Schema) -> TypeNode {
        TypeNode::Request
    }
}
