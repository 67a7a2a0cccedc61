use pretty_assertions::assert_eq;

use keel_ir::{MethodRef, TypeDefId, TypeRef};

use crate::normalize::cache_key;

use super::*;

fn both(symbols: &SymbolTable, site: &ConversionSite) -> (EnclosingScope, EnclosingScope) {
    let key = cache_key(symbols, site);
    (
        enclosing_scope(symbols, site, &key, ScopePolicy::Positional),
        enclosing_scope(symbols, site, &key, ScopePolicy::Minimal),
    )
}

fn with_action() -> (SymbolTable, TypeDefId, TypeDefId) {
    let mut symbols = SymbolTable::new();
    let action = symbols.add_delegate("Action", None, &[]);
    let action1 = symbols.add_delegate("Action", None, &["T"]);
    (symbols, action, action1)
}

#[test]
fn non_generic_site_is_module_wide() {
    let (mut symbols, action, _) = with_action();
    let c = symbols.add_type("C", None, &[]);
    let main = symbols.add_method(c, "Main", &[], true);
    let target = symbols.add_method(c, "Target", &[], true);
    let site = ConversionSite::new(
        TypeRef::simple(action),
        MethodRef::new(TypeRef::simple(c), target, Vec::new()),
        c,
        Some(main),
    );
    assert_eq!(both(&symbols, &site), (EnclosingScope::Module, EnclosingScope::Module));
}

#[test]
fn generic_type_owns_target_through_its_parameter() {
    // class D<T> { void Test() { var t = (Action)Target; } static void Target() {} }
    let (mut symbols, action, _) = with_action();
    let d = symbols.add_type("D", None, &["T"]);
    let t = symbols.type_param(d, 0);
    let test = symbols.add_method(d, "Test", &[], false);
    let target = symbols.add_method(d, "Target", &[], true);
    let site = ConversionSite::new(
        TypeRef::simple(action),
        MethodRef::new(TypeRef::named(d, vec![TypeRef::Param(t)]), target, Vec::new()),
        d,
        Some(test),
    );
    let expected = EnclosingScope::Type {
        owner: d,
        params: vec![t],
    };
    assert_eq!(both(&symbols, &site), (expected.clone(), expected));
}

#[test]
fn generic_type_with_unrelated_target() {
    // class D<T> { Action Test() => (Action)C.Target; }
    let (mut symbols, action, _) = with_action();
    let c = symbols.add_type("C", None, &[]);
    let target = symbols.add_method(c, "Target", &[], true);
    let d = symbols.add_type("D", None, &["T"]);
    let test = symbols.add_method(d, "Test", &[], false);
    let site = ConversionSite::new(
        TypeRef::simple(action),
        MethodRef::new(TypeRef::simple(c), target, Vec::new()),
        d,
        Some(test),
    );
    assert_eq!(
        both(&symbols, &site),
        (
            EnclosingScope::Type {
                owner: d,
                params: Vec::new()
            },
            EnclosingScope::Module
        )
    );
}

#[test]
fn generic_method_scope() {
    // class D { static void Test<T>() { var t = (Action)C.Target<T>; } }
    let (mut symbols, action, _) = with_action();
    let c = symbols.add_type("C", None, &[]);
    let target = symbols.add_method(c, "Target", &["K"], true);
    let d = symbols.add_type("D", None, &[]);
    let test = symbols.add_method(d, "Test", &["T"], true);
    let t = symbols.method_type_param(test, 0);
    let site = ConversionSite::new(
        TypeRef::simple(action),
        MethodRef::new(TypeRef::simple(c), target, vec![TypeRef::Param(t)]),
        d,
        Some(test),
    );
    let expected = EnclosingScope::Method {
        owner: test,
        params: vec![t],
    };
    assert_eq!(both(&symbols, &site), (expected.clone(), expected));
}

#[test]
fn local_functions_skip_unused_parameters() {
    // static void Test<T>() { void LF2<G>() { void LF3() { Action<T> d = C.Target<T>; } } }
    let (mut symbols, _, action1) = with_action();
    let c = symbols.add_type("C", None, &[]);
    let target = symbols.add_method(c, "Target", &["T"], true);
    let e = symbols.add_type("E", None, &[]);
    let test = symbols.add_method(e, "Test", &["T"], true);
    let lf2 = symbols.add_local_function(test, "LF2", &["G"], false);
    let lf3 = symbols.add_local_function(lf2, "LF3", &[], false);
    let t = symbols.method_type_param(test, 0);
    let site = ConversionSite::new(
        TypeRef::named(action1, vec![TypeRef::Param(t)]),
        MethodRef::new(TypeRef::simple(c), target, vec![TypeRef::Param(t)]),
        e,
        Some(lf3),
    );
    let expected = EnclosingScope::Method {
        owner: test,
        params: vec![t],
    };
    assert_eq!(both(&symbols, &site), (expected.clone(), expected));
}

#[test]
fn local_function_targets_pick_innermost_declaring_method() {
    // static void Test<T>() { void Owner<G>() { void LF1() { Action d = LF2; } } }
    // LF2 is implicitly generic over T and G.
    let (mut symbols, action, _) = with_action();
    let e = symbols.add_type("E", None, &[]);
    let test = symbols.add_method(e, "Test", &["T"], true);
    let owner = symbols.add_local_function(test, "Owner", &["G"], false);
    let lf1 = symbols.add_local_function(owner, "LF1", &[], false);
    let lf2 = symbols.add_local_function(lf1, "LF2", &[], true);
    let t = symbols.method_type_param(test, 0);
    let g = symbols.method_type_param(owner, 0);
    let site = ConversionSite::new(
        TypeRef::simple(action),
        // Mentioned G first; scopes still list T first.
        MethodRef::new(
            TypeRef::simple(e),
            lf2,
            vec![TypeRef::Param(g), TypeRef::Param(t)],
        ),
        e,
        Some(lf1),
    );
    let (positional, minimal) = both(&symbols, &site);
    assert_eq!(
        positional,
        EnclosingScope::Method {
            owner: test,
            params: vec![t, g]
        }
    );
    assert_eq!(
        minimal,
        EnclosingScope::Method {
            owner,
            params: vec![t, g]
        }
    );
}

#[test]
fn type_params_inside_generic_method() {
    // class D<T> { void Test<M>() { Func<T> f = Target; } static T Target() }
    let mut symbols = SymbolTable::new();
    let func = symbols.add_delegate("Func", None, &["TResult"]);
    let d = symbols.add_type("D", None, &["T"]);
    let t = symbols.type_param(d, 0);
    let test = symbols.add_method(d, "Test", &["M"], false);
    let target = symbols.add_method(d, "Target", &[], true);
    let site = ConversionSite::new(
        TypeRef::named(func, vec![TypeRef::Param(t)]),
        MethodRef::new(TypeRef::named(d, vec![TypeRef::Param(t)]), target, Vec::new()),
        d,
        Some(test),
    );
    let (positional, minimal) = both(&symbols, &site);
    assert_eq!(
        positional,
        EnclosingScope::Method {
            owner: test,
            params: vec![t]
        }
    );
    assert_eq!(
        minimal,
        EnclosingScope::Type {
            owner: d,
            params: vec![t]
        }
    );
}

#[test]
fn parse_policy_names() {
    assert_eq!(ScopePolicy::parse(" Minimal "), Some(ScopePolicy::Minimal));
    assert_eq!(ScopePolicy::parse("positional"), Some(ScopePolicy::Positional));
    assert_eq!(ScopePolicy::parse("module"), None);
}
