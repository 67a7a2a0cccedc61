//! Cache key normalization.
//!
//! Spellings that denote one runtime delegate must produce one key, or the
//! same conversion would get two slots. Normalization rewrites, recursively
//! through every type argument:
//!
//! - `using` aliases to their targets
//! - `dynamic` to `object`
//! - named tuple elements to unnamed ones
//! - the owner of a statically referenced extension method to the type
//!   that declares it, so `E.Ext` and `x.Ext`-style spellings agree
//!
//! Nothing else is rewritten: distinct delegate types stay distinct even
//! when their signatures match.

use keel_ir::{CacheKey, ConversionSite, MethodRef, SymbolTable, TypeRef};

/// Alias chains longer than this are treated as unresolvable.
const MAX_ALIAS_DEPTH: usize = 32;

/// The normalized cache key of a conversion site.
pub fn cache_key(symbols: &SymbolTable, site: &ConversionSite) -> CacheKey {
    CacheKey {
        delegate_type: normalize_type(symbols, &site.delegate_type),
        target: normalize_method(symbols, &site.target),
        receiver: site.receiver,
    }
}

pub fn normalize_type(symbols: &SymbolTable, ty: &TypeRef) -> TypeRef {
    normalize_at_depth(symbols, ty, 0)
}

fn normalize_at_depth(symbols: &SymbolTable, ty: &TypeRef, depth: usize) -> TypeRef {
    match ty {
        TypeRef::Alias(name) => match symbols.resolve_alias(name) {
            Some(target) if depth < MAX_ALIAS_DEPTH => {
                normalize_at_depth(symbols, target, depth + 1)
            }
            Some(_) => {
                tracing::warn!(alias = %name, "alias chain too deep, keeping the alias");
                ty.clone()
            }
            None => {
                tracing::trace!(alias = %name, "unresolved alias");
                ty.clone()
            }
        },
        TypeRef::Dynamic => TypeRef::Object,
        TypeRef::Named { def, args } => TypeRef::Named {
            def: *def,
            args: args
                .iter()
                .map(|arg| normalize_at_depth(symbols, arg, depth))
                .collect(),
        },
        TypeRef::Tuple { elements, .. } => TypeRef::Tuple {
            elements: elements
                .iter()
                .map(|elem| normalize_at_depth(symbols, elem, depth))
                .collect(),
            names: Vec::new(),
        },
        TypeRef::Array(elem) => TypeRef::Array(Box::new(normalize_at_depth(symbols, elem, depth))),
        TypeRef::Pointer(elem) => {
            TypeRef::Pointer(Box::new(normalize_at_depth(symbols, elem, depth)))
        }
        TypeRef::Primitive(_) | TypeRef::Object | TypeRef::Param(_) => ty.clone(),
    }
}

pub fn normalize_method(symbols: &SymbolTable, method: &MethodRef) -> MethodRef {
    let def = symbols.method(method.method);
    let owner = if def.is_extension {
        // Extension methods live in non-generic static types.
        TypeRef::simple(def.owner)
    } else {
        normalize_type(symbols, &method.owner)
    };
    MethodRef {
        owner,
        method: method.method,
        type_args: method
            .type_args
            .iter()
            .map(|arg| normalize_type(symbols, arg))
            .collect(),
    }
}

#[cfg(test)]
mod tests;
