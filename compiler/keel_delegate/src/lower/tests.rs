use pretty_assertions::assert_eq;

use keel_ir::{CacheKey, EnclosingScope, MethodId, TypeDefId};

use super::*;

fn action() -> TypeRef {
    TypeRef::simple(TypeDefId::new(0))
}

fn target() -> MethodRef {
    MethodRef::new(TypeRef::simple(TypeDefId::new(1)), MethodId::new(0), Vec::new())
}

fn cached() -> LoweredConversion {
    LoweredConversion::Cached {
        slot: CacheSlot {
            container: ContainerId::new(2),
            index: SlotIndex::new(1),
            key: CacheKey {
                delegate_type: action(),
                target: target(),
                receiver: ReceiverShape::Static,
            },
            scope: EnclosingScope::Module,
        },
        delegate_type: action(),
        target: target(),
    }
}

#[test]
fn cached_sequence_checks_then_constructs_then_stores() {
    let ops = cached().ops(LabelId::new(4));
    let rendered: Vec<String> = ops.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["load   c2[1]", "brset  L4", "new    (Static)", "store  c2[1]", "L4:"]
    );
    assert!(cached().is_cached());
}

#[test]
fn uncached_sequence_only_constructs() {
    let lowered = LoweredConversion::Uncached {
        reason: NotCacheable::ExplicitCreation,
        delegate_type: action(),
        target: target(),
        receiver: ReceiverShape::Static,
    };
    assert_eq!(
        lowered.ops(LabelId::new(0)),
        vec![CacheOp::Construct {
            delegate_type: action(),
            target: target(),
            receiver: ReceiverShape::Static,
        }]
    );
    assert_eq!(lowered.slot(), None);
}
