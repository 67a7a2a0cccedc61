use pretty_assertions::assert_eq;

use keel_delegate::SynthesizerConfig;
use keel_ir::{ConstValue, IntKind, MethodRef, TypeRef};

use super::*;

fn t(n: u32) -> CaseTarget {
    CaseTarget::new(n)
}

fn int_switch(values: &[i128]) -> SwitchInput {
    SwitchInput::new(
        ScrutineeType::integral(IntKind::I32),
        (1..)
            .zip(values)
            .map(|(n, &v)| CaseLabel::exact(ConstValue::Int(v), t(n)))
            .collect(),
        t(0),
    )
}

fn unit_with_switches(count: usize) -> CompilationUnit {
    let switches = (0..count)
        .map(|i| {
            let base = i128::try_from(i).unwrap() * 10;
            int_switch(&[base, base + 1, base + 2, base + 40, base + 400])
        })
        .collect();
    CompilationUnit {
        switches,
        ..CompilationUnit::default()
    }
}

#[test]
fn parallel_and_sequential_planning_agree() {
    let unit = unit_with_switches(40);
    let parallel = LoweringSession::new(LoweringConfig::default()).lower(&unit);
    let sequential = LoweringSession::new(LoweringConfig::default().sequential()).lower(&unit);
    assert_eq!(parallel.plans, sequential.plans);
    assert_eq!(parallel.plans.len(), 40);
}

#[test]
fn plans_keep_input_order() {
    let unit = unit_with_switches(12);
    let lowered = LoweringSession::default().lower(&unit);
    for (input, plan) in unit.switches.iter().zip(&lowered.plans) {
        let expected = LoweringSession::default()
            .planner()
            .plan(&input.scrutinee, &input.labels, input.default);
        assert_eq!(plan, &expected);
    }
}

#[test]
fn checked_lowering_names_the_bad_switch() {
    let mut unit = unit_with_switches(3);
    unit.switches.push(int_switch(&[7, 7]));
    let err = LoweringSession::default().lower_checked(&unit).unwrap_err();
    assert_eq!(
        err,
        LoweringError::InvalidLabels {
            index: 3,
            problem: LabelProblem::DuplicateValue {
                value: ConstValue::Int(7)
            },
        }
    );
    assert!(err.to_string().starts_with("switch #3: "));
}

#[test]
fn checked_lowering_accepts_valid_units() {
    let unit = unit_with_switches(3);
    let lowered = LoweringSession::default().lower_checked(&unit).unwrap();
    assert_eq!(lowered.plans.len(), 3);
}

#[test]
fn disabled_synthesis_lowers_every_conversion_uncached() {
    let mut symbols = SymbolTable::new();
    let action = symbols.add_delegate("Action", None, &[]);
    let c = symbols.add_type("C", None, &[]);
    let main = symbols.add_method(c, "Main", &[], true);
    let target = symbols.add_method(c, "Target", &[], true);
    let site = ConversionSite::new(
        TypeRef::simple(action),
        MethodRef::new(TypeRef::simple(c), target, Vec::new()),
        c,
        Some(main),
    );
    let unit = CompilationUnit {
        symbols,
        switches: Vec::new(),
        conversions: vec![site.clone(), site],
    };
    let config = LoweringConfig {
        synthesizer: SynthesizerConfig::disabled(),
        ..LoweringConfig::default()
    };
    let lowered = LoweringSession::new(config).lower(&unit);
    assert_eq!(lowered.cached_count(), 0);
    assert!(lowered.registry.is_empty());
    assert_eq!(lowered.conversions.len(), 2);
}
