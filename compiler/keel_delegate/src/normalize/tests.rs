use pretty_assertions::assert_eq;

use keel_ir::{PrimitiveType, ReceiverShape, TypeDefId};

use super::*;

fn int() -> TypeRef {
    TypeRef::Primitive(PrimitiveType::Int32)
}

fn table() -> (SymbolTable, TypeDefId, TypeDefId) {
    let mut symbols = SymbolTable::new();
    let action = symbols.add_delegate("Action", None, &["T"]);
    let func = symbols.add_delegate("Func", None, &["TResult"]);
    (symbols, action, func)
}

#[test]
fn aliases_resolve_transitively() {
    let (mut symbols, action, _) = table();
    symbols.add_alias("MyAction", TypeRef::named(action, vec![TypeRef::Alias("Num".into())]));
    symbols.add_alias("Num", int());
    assert_eq!(
        normalize_type(&symbols, &TypeRef::Alias("MyAction".into())),
        TypeRef::named(action, vec![int()])
    );
}

#[test]
fn unresolved_and_cyclic_aliases_stay_put() {
    let (mut symbols, _, _) = table();
    symbols.add_alias("A", TypeRef::Alias("B".into()));
    symbols.add_alias("B", TypeRef::Alias("A".into()));
    assert_eq!(
        normalize_type(&symbols, &TypeRef::Alias("Missing".into())),
        TypeRef::Alias("Missing".into())
    );
    // Terminates; which of the two names survives is unimportant.
    assert!(matches!(
        normalize_type(&symbols, &TypeRef::Alias("A".into())),
        TypeRef::Alias(_)
    ));
}

#[test]
fn dynamic_is_object_at_any_depth() {
    let (symbols, _, func) = table();
    let spelled = TypeRef::named(func, vec![TypeRef::Array(Box::new(TypeRef::Dynamic))]);
    assert_eq!(
        normalize_type(&symbols, &spelled),
        TypeRef::named(func, vec![TypeRef::Array(Box::new(TypeRef::Object))])
    );
}

#[test]
fn tuple_names_are_erased() {
    let (symbols, action, _) = table();
    let named = TypeRef::named(
        action,
        vec![TypeRef::Tuple {
            elements: vec![int(), TypeRef::Dynamic],
            names: vec![Some("a".into()), None],
        }],
    );
    let plain = TypeRef::named(action, vec![TypeRef::tuple(vec![int(), TypeRef::Object])]);
    assert_eq!(normalize_type(&symbols, &named), plain);
    assert_eq!(normalize_type(&symbols, &plain), plain);
}

#[test]
fn extension_owner_is_declaring_type() {
    let (mut symbols, action, _) = table();
    let ext_class = symbols.add_type("E", None, &[]);
    let user = symbols.add_type("C", None, &[]);
    let ext = symbols.add_extension_method(ext_class, "Ext", &[]);
    let main = symbols.add_method(user, "Main", &[], true);

    let via_receiver_type = ConversionSite::new(
        TypeRef::named(action, vec![int()]),
        MethodRef::new(TypeRef::simple(user), ext, Vec::new()),
        user,
        Some(main),
    );
    let qualified = ConversionSite::new(
        TypeRef::named(action, vec![int()]),
        MethodRef::new(TypeRef::simple(ext_class), ext, Vec::new()),
        user,
        Some(main),
    );
    assert_eq!(cache_key(&symbols, &via_receiver_type), cache_key(&symbols, &qualified));
}

#[test]
fn distinct_delegate_types_stay_distinct() {
    let (mut symbols, action, _) = table();
    let my_action = symbols.add_delegate("MyAction", None, &["T"]);
    let c = symbols.add_type("C", None, &[]);
    let target = symbols.add_method(c, "Target", &[], true);
    let site = |delegate| {
        ConversionSite::new(
            TypeRef::named(delegate, vec![int()]),
            MethodRef::new(TypeRef::simple(c), target, Vec::new()),
            c,
            None,
        )
    };
    assert_ne!(cache_key(&symbols, &site(action)), cache_key(&symbols, &site(my_action)));
}

#[test]
fn key_keeps_receiver_shape() {
    let (mut symbols, action, _) = table();
    let c = symbols.add_type("C", None, &[]);
    let target = symbols.add_method(c, "Target", &[], false);
    let site = ConversionSite::new(
        TypeRef::named(action, vec![int()]),
        MethodRef::new(TypeRef::simple(c), target, vec![TypeRef::Dynamic]),
        c,
        None,
    )
    .with_receiver(ReceiverShape::Instance);
    let key = cache_key(&symbols, &site);
    assert_eq!(key.receiver, ReceiverShape::Instance);
    assert_eq!(key.target.type_args, vec![TypeRef::Object]);
}
