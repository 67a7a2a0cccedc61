//! Enclosing scope computation.
//!
//! A cache container is instantiated over the type parameters its slots
//! mention. The scope decides which generic context owns the container and
//! which parameters it takes; slots share a container exactly when their
//! scopes are equal.
//!
//! # Policies
//!
//! - [`ScopePolicy::Positional`]: the site's position decides the owner.
//!   Inside a generic method chain the container belongs to the outermost
//!   method of the chain; otherwise inside a generic type chain it belongs
//!   to the containing type; otherwise it is module-wide.
//! - [`ScopePolicy::Minimal`]: the key decides the owner. A key mentioning
//!   method type parameters belongs to the innermost method declaring one of
//!   them; a key mentioning only type parameters belongs to the containing
//!   type; a key mentioning none is module-wide, wherever it appears.
//!
//! Under both policies the parameters are exactly those the key mentions,
//! ordered outermost declaration first.

use keel_ir::{
    CacheKey, ConversionSite, EnclosingScope, MethodId, SymbolTable, TypeParamId, TypeParamOwner,
};

/// How the owner of a cache container is chosen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScopePolicy {
    #[default]
    Positional,
    Minimal,
}

impl ScopePolicy {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "positional" => Some(ScopePolicy::Positional),
            "minimal" => Some(ScopePolicy::Minimal),
            _ => None,
        }
    }
}

/// Compute the scope of a slot holding `key`, converted at `site`.
pub fn enclosing_scope(
    symbols: &SymbolTable,
    site: &ConversionSite,
    key: &CacheKey,
    policy: ScopePolicy,
) -> EnclosingScope {
    let mut referenced = Vec::new();
    key.delegate_type.collect_params(&mut referenced);
    key.target.collect_params(&mut referenced);
    let params = in_declaration_order(symbols, site, &referenced);

    match policy {
        ScopePolicy::Positional => {
            if let Some(method) = site.containing_method {
                if symbols.is_generic_method_chain(method) {
                    return EnclosingScope::Method {
                        owner: symbols.outermost_method(method),
                        params,
                    };
                }
            }
            if symbols.is_generic_type_chain(site.containing_type) {
                return EnclosingScope::Type {
                    owner: site.containing_type,
                    params,
                };
            }
            debug_assert!(params.is_empty(), "non-generic site mentions {params:?}");
            EnclosingScope::Module
        }
        ScopePolicy::Minimal => {
            if let Some(owner) = innermost_declaring_method(symbols, site, &params) {
                return EnclosingScope::Method { owner, params };
            }
            if params.is_empty() {
                EnclosingScope::Module
            } else {
                EnclosingScope::Type {
                    owner: site.containing_type,
                    params,
                }
            }
        }
    }
}

/// `referenced`, reordered as declared: enclosing types outermost first,
/// then enclosing methods outermost first, each by ordinal.
fn in_declaration_order(
    symbols: &SymbolTable,
    site: &ConversionSite,
    referenced: &[TypeParamId],
) -> Vec<TypeParamId> {
    let mut in_scope: Vec<TypeParamId> = symbols
        .type_chain(site.containing_type)
        .iter()
        .rev()
        .flat_map(|&def| symbols.type_def(def).type_params.iter().copied())
        .collect();
    if let Some(method) = site.containing_method {
        in_scope.extend(
            symbols
                .method_chain(method)
                .iter()
                .rev()
                .flat_map(|&m| symbols.method(m).type_params.iter().copied()),
        );
    }

    let mut ordered: Vec<TypeParamId> = in_scope
        .into_iter()
        .filter(|param| referenced.contains(param))
        .collect();
    for &param in referenced {
        if !ordered.contains(&param) {
            // Not declared around the site; keep it rather than drop it.
            tracing::debug!(param = %symbols.param(param).name, "type parameter out of scope");
            ordered.push(param);
        }
    }
    ordered
}

fn innermost_declaring_method(
    symbols: &SymbolTable,
    site: &ConversionSite,
    params: &[TypeParamId],
) -> Option<MethodId> {
    let method = site.containing_method?;
    symbols.method_chain(method).into_iter().find(|&m| {
        params
            .iter()
            .any(|&p| symbols.param(p).owner == TypeParamOwner::Method(m))
    })
}

#[cfg(test)]
mod tests;
