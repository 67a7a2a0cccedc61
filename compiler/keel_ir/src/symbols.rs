//! Resolved symbols for method-group conversion sites.
//!
//! The front end owns full symbol resolution; this table carries only what
//! cache synthesis needs: which types and methods exist, how they nest, which
//! type parameters they declare, and which type aliases are in scope.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

macro_rules! symbol_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an ID from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

symbol_id!(
    /// A type definition (class, struct, interface, delegate).
    TypeDefId
);
symbol_id!(
    /// A method, including local functions.
    MethodId
);
symbol_id!(
    /// A type parameter declared by a type or a method.
    TypeParamId
);

/// Who declares a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeParamOwner {
    Type(TypeDefId),
    Method(MethodId),
}

#[derive(Clone, Debug)]
pub struct TypeParamDef {
    pub name: String,
    pub owner: TypeParamOwner,
    pub ordinal: u32,
}

#[derive(Clone, Debug)]
pub struct TypeDef {
    pub name: String,
    /// Enclosing type for nested types.
    pub containing: Option<TypeDefId>,
    pub type_params: Vec<TypeParamId>,
    pub is_delegate: bool,
}

#[derive(Clone, Debug)]
pub struct MethodDef {
    pub name: String,
    pub owner: TypeDefId,
    /// Enclosing method for local functions and lambdas.
    pub containing_method: Option<MethodId>,
    pub type_params: Vec<TypeParamId>,
    pub is_static: bool,
    pub is_extension: bool,
}

/// Built-in types that never mention type parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveType {
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    String,
    IntPtr,
}

impl PrimitiveType {
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::Int8 => "sbyte",
            PrimitiveType::Int16 => "short",
            PrimitiveType::Int32 => "int",
            PrimitiveType::Int64 => "long",
            PrimitiveType::UInt8 => "byte",
            PrimitiveType::UInt16 => "ushort",
            PrimitiveType::UInt32 => "uint",
            PrimitiveType::UInt64 => "ulong",
            PrimitiveType::Float32 => "float",
            PrimitiveType::Float64 => "double",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::String => "string",
            PrimitiveType::IntPtr => "nint",
        }
    }
}

/// A type as spelled at a conversion site.
///
/// Several spellings denote one runtime type: an alias and its target,
/// `dynamic` and `object`, tuples with and without element names. Cache
/// synthesis normalizes these before building a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Object,
    Dynamic,
    Named {
        def: TypeDefId,
        args: Vec<TypeRef>,
    },
    Param(TypeParamId),
    Array(Box<TypeRef>),
    Pointer(Box<TypeRef>),
    Tuple {
        elements: Vec<TypeRef>,
        /// Element names; empty when the tuple is unnamed.
        names: Vec<Option<String>>,
    },
    /// A `using` alias, resolved through [`SymbolTable::resolve_alias`].
    Alias(String),
}

impl TypeRef {
    pub fn named(def: TypeDefId, args: Vec<TypeRef>) -> Self {
        TypeRef::Named { def, args }
    }

    /// A non-generic named type.
    pub fn simple(def: TypeDefId) -> Self {
        TypeRef::Named {
            def,
            args: Vec::new(),
        }
    }

    pub fn tuple(elements: Vec<TypeRef>) -> Self {
        TypeRef::Tuple {
            elements,
            names: Vec::new(),
        }
    }

    /// Append every type parameter this type mentions, in first-seen order.
    pub fn collect_params(&self, out: &mut Vec<TypeParamId>) {
        match self {
            TypeRef::Param(id) => {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
            TypeRef::Named { args, .. } => {
                for arg in args {
                    arg.collect_params(out);
                }
            }
            TypeRef::Tuple { elements, .. } => {
                for elem in elements {
                    elem.collect_params(out);
                }
            }
            TypeRef::Array(elem) | TypeRef::Pointer(elem) => elem.collect_params(out),
            TypeRef::Primitive(_) | TypeRef::Object | TypeRef::Dynamic | TypeRef::Alias(_) => {}
        }
    }

    /// Replace type parameters using `lookup`; unmapped parameters stay.
    pub fn substitute(&self, lookup: &impl Fn(TypeParamId) -> Option<TypeRef>) -> TypeRef {
        match self {
            TypeRef::Param(id) => lookup(*id).unwrap_or_else(|| self.clone()),
            TypeRef::Named { def, args } => TypeRef::Named {
                def: *def,
                args: args.iter().map(|a| a.substitute(lookup)).collect(),
            },
            TypeRef::Tuple { elements, names } => TypeRef::Tuple {
                elements: elements.iter().map(|e| e.substitute(lookup)).collect(),
                names: names.clone(),
            },
            TypeRef::Array(elem) => TypeRef::Array(Box::new(elem.substitute(lookup))),
            TypeRef::Pointer(elem) => TypeRef::Pointer(Box::new(elem.substitute(lookup))),
            TypeRef::Primitive(_) | TypeRef::Object | TypeRef::Dynamic | TypeRef::Alias(_) => {
                self.clone()
            }
        }
    }
}

/// A reference to a (possibly generic) method through an instantiated owner.
///
/// `D<T>.Target3<V>` is `owner = D<T>`, `method = Target3`, `type_args = [V]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodRef {
    pub owner: TypeRef,
    pub method: MethodId,
    pub type_args: Vec<TypeRef>,
}

impl MethodRef {
    pub fn new(owner: TypeRef, method: MethodId, type_args: Vec<TypeRef>) -> Self {
        Self {
            owner,
            method,
            type_args,
        }
    }

    pub fn collect_params(&self, out: &mut Vec<TypeParamId>) {
        self.owner.collect_params(out);
        for arg in &self.type_args {
            arg.collect_params(out);
        }
    }

    pub fn substitute(&self, lookup: &impl Fn(TypeParamId) -> Option<TypeRef>) -> MethodRef {
        MethodRef {
            owner: self.owner.substitute(lookup),
            method: self.method,
            type_args: self.type_args.iter().map(|a| a.substitute(lookup)).collect(),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "symbol counts are far below u32::MAX"
)]
fn next_raw(len: usize) -> u32 {
    len as u32
}

/// Types, methods, type parameters and aliases of one compilation.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    types: Vec<TypeDef>,
    methods: Vec<MethodDef>,
    params: Vec<TypeParamDef>,
    aliases: FxHashMap<String, TypeRef>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_params(&mut self, owner: TypeParamOwner, names: &[&str]) -> Vec<TypeParamId> {
        names
            .iter()
            .enumerate()
            .map(|(ordinal, name)| {
                let id = TypeParamId::new(next_raw(self.params.len()));
                self.params.push(TypeParamDef {
                    name: (*name).to_owned(),
                    owner,
                    ordinal: next_raw(ordinal),
                });
                id
            })
            .collect()
    }

    fn push_type(
        &mut self,
        name: &str,
        containing: Option<TypeDefId>,
        params: &[&str],
        is_delegate: bool,
    ) -> TypeDefId {
        let id = TypeDefId::new(next_raw(self.types.len()));
        self.types.push(TypeDef {
            name: name.to_owned(),
            containing,
            type_params: Vec::new(),
            is_delegate,
        });
        let type_params = self.add_params(TypeParamOwner::Type(id), params);
        self.types[id.index()].type_params = type_params;
        id
    }

    /// Declare a class or struct, optionally nested and generic.
    pub fn add_type(
        &mut self,
        name: &str,
        containing: Option<TypeDefId>,
        params: &[&str],
    ) -> TypeDefId {
        self.push_type(name, containing, params, false)
    }

    /// Declare a delegate type.
    pub fn add_delegate(
        &mut self,
        name: &str,
        containing: Option<TypeDefId>,
        params: &[&str],
    ) -> TypeDefId {
        self.push_type(name, containing, params, true)
    }

    fn push_method(&mut self, def: MethodDef, params: &[&str]) -> MethodId {
        let id = MethodId::new(next_raw(self.methods.len()));
        self.methods.push(def);
        let type_params = self.add_params(TypeParamOwner::Method(id), params);
        self.methods[id.index()].type_params = type_params;
        id
    }

    /// Declare a member method.
    pub fn add_method(
        &mut self,
        owner: TypeDefId,
        name: &str,
        params: &[&str],
        is_static: bool,
    ) -> MethodId {
        self.push_method(
            MethodDef {
                name: name.to_owned(),
                owner,
                containing_method: None,
                type_params: Vec::new(),
                is_static,
                is_extension: false,
            },
            params,
        )
    }

    /// Declare a static extension method.
    pub fn add_extension_method(
        &mut self,
        owner: TypeDefId,
        name: &str,
        params: &[&str],
    ) -> MethodId {
        self.push_method(
            MethodDef {
                name: name.to_owned(),
                owner,
                containing_method: None,
                type_params: Vec::new(),
                is_static: true,
                is_extension: true,
            },
            params,
        )
    }

    /// Declare a local function (or lambda body) nested in `containing`.
    pub fn add_local_function(
        &mut self,
        containing: MethodId,
        name: &str,
        params: &[&str],
        is_static: bool,
    ) -> MethodId {
        let owner = self.methods[containing.index()].owner;
        self.push_method(
            MethodDef {
                name: name.to_owned(),
                owner,
                containing_method: Some(containing),
                type_params: Vec::new(),
                is_static,
                is_extension: false,
            },
            params,
        )
    }

    /// Declare a `using` alias.
    pub fn add_alias(&mut self, name: &str, target: TypeRef) {
        self.aliases.insert(name.to_owned(), target);
    }

    pub fn resolve_alias(&self, name: &str) -> Option<&TypeRef> {
        self.aliases.get(name)
    }

    pub fn type_def(&self, id: TypeDefId) -> &TypeDef {
        &self.types[id.index()]
    }

    pub fn method(&self, id: MethodId) -> &MethodDef {
        &self.methods[id.index()]
    }

    pub fn param(&self, id: TypeParamId) -> &TypeParamDef {
        &self.params[id.index()]
    }

    /// The `ordinal`-th type parameter of a type.
    pub fn type_param(&self, def: TypeDefId, ordinal: usize) -> TypeParamId {
        self.types[def.index()].type_params[ordinal]
    }

    /// The `ordinal`-th type parameter of a method.
    pub fn method_type_param(&self, method: MethodId, ordinal: usize) -> TypeParamId {
        self.methods[method.index()].type_params[ordinal]
    }

    /// `def` followed by its enclosing types, innermost first.
    pub fn type_chain(&self, def: TypeDefId) -> Vec<TypeDefId> {
        let mut chain = vec![def];
        let mut current = self.types[def.index()].containing;
        while let Some(outer) = current {
            chain.push(outer);
            current = self.types[outer.index()].containing;
        }
        chain
    }

    /// `method` followed by its enclosing methods, innermost first.
    pub fn method_chain(&self, method: MethodId) -> Vec<MethodId> {
        let mut chain = vec![method];
        let mut current = self.methods[method.index()].containing_method;
        while let Some(outer) = current {
            chain.push(outer);
            current = self.methods[outer.index()].containing_method;
        }
        chain
    }

    /// The top-level member a local function is nested in.
    pub fn outermost_method(&self, method: MethodId) -> MethodId {
        let chain = self.method_chain(method);
        chain[chain.len() - 1]
    }

    /// Returns `true` if `def` or any enclosing type declares type parameters.
    pub fn is_generic_type_chain(&self, def: TypeDefId) -> bool {
        self.type_chain(def)
            .iter()
            .any(|t| !self.types[t.index()].type_params.is_empty())
    }

    /// Returns `true` if `method` or any enclosing method declares type parameters.
    pub fn is_generic_method_chain(&self, method: MethodId) -> bool {
        self.method_chain(method)
            .iter()
            .any(|m| !self.methods[m.index()].type_params.is_empty())
    }

    /// Render a type for logs and test failure messages.
    pub fn display_type(&self, ty: &TypeRef) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: &TypeRef) {
        match ty {
            TypeRef::Primitive(p) => out.push_str(p.name()),
            TypeRef::Object => out.push_str("object"),
            TypeRef::Dynamic => out.push_str("dynamic"),
            TypeRef::Param(id) => out.push_str(&self.params[id.index()].name),
            TypeRef::Alias(name) => out.push_str(name),
            TypeRef::Array(elem) => {
                self.write_type(out, elem);
                out.push_str("[]");
            }
            TypeRef::Pointer(elem) => {
                self.write_type(out, elem);
                out.push('*');
            }
            TypeRef::Named { def, args } => {
                out.push_str(&self.types[def.index()].name);
                self.write_args(out, args);
            }
            TypeRef::Tuple { elements, names } => {
                out.push('(');
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, elem);
                    if let Some(Some(name)) = names.get(i) {
                        let _ = write!(out, " {name}");
                    }
                }
                out.push(')');
            }
        }
    }

    fn write_args(&self, out: &mut String, args: &[TypeRef]) {
        if args.is_empty() {
            return;
        }
        out.push('<');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, arg);
        }
        out.push('>');
    }

    /// Render a method reference as `Owner<..>.Name<..>`.
    pub fn display_method(&self, method: &MethodRef) -> String {
        let mut out = self.display_type(&method.owner);
        out.push('.');
        out.push_str(&self.methods[method.method.index()].name);
        self.write_args(&mut out, &method.type_args);
        out
    }
}
