use crate::symbols::{SymbolTable, TypeRef};

use super::*;

fn site() -> ConversionSite {
    let mut table = SymbolTable::new();
    let action = table.add_delegate("Action", None, &[]);
    let c = table.add_type("C", None, &[]);
    let target = table.add_method(c, "Target", &[], true);
    let main = table.add_method(c, "Main", &[], true);
    ConversionSite::new(
        TypeRef::simple(action),
        MethodRef::new(TypeRef::simple(c), target, Vec::new()),
        c,
        Some(main),
    )
}

#[test]
fn implicit_and_cast_static_sites_are_cacheable() {
    assert_eq!(site().cacheability(), Ok(()));
    assert!(site().with_form(ConversionForm::Cast).is_cacheable());
}

#[test]
fn explicit_creation_is_never_cached() {
    assert_eq!(
        site().with_form(ConversionForm::DelegateCreation).cacheability(),
        Err(NotCacheable::ExplicitCreation)
    );
    assert_eq!(
        site().with_form(ConversionForm::TargetTypedNew).cacheability(),
        Err(NotCacheable::ExplicitCreation)
    );
}

#[test]
fn positions_that_run_once_or_are_quoted() {
    assert_eq!(
        site().with_position(SitePosition::ExpressionTree).cacheability(),
        Err(NotCacheable::ExpressionTree)
    );
    assert_eq!(
        site().with_position(SitePosition::StaticInitializer).cacheability(),
        Err(NotCacheable::StaticInitializer)
    );
}

#[test]
fn captured_receivers() {
    for shape in [ReceiverShape::Instance, ReceiverShape::BoundExtension] {
        assert_eq!(
            site().with_receiver(shape).cacheability(),
            Err(NotCacheable::CapturedReceiver(shape))
        );
    }
}

#[test]
fn scope_params() {
    assert!(EnclosingScope::Module.params().is_empty());
    let scope = EnclosingScope::Method {
        owner: MethodId::new(3),
        params: vec![TypeParamId::new(1)],
    };
    assert_eq!(scope.params(), &[TypeParamId::new(1)]);
}

#[test]
fn reasons_display() {
    assert_eq!(
        NotCacheable::CapturedReceiver(ReceiverShape::Instance).to_string(),
        "captures a receiver (Instance)"
    );
}
