//! Lowering of one compilation unit.
//!
//! Switches are planned independently, on the rayon pool unless the
//! configuration asks for sequential planning; plans come back in input
//! order either way. Conversion sites go through one synthesizer in input
//! order, since container and slot numbering follow that order.

use rayon::prelude::*;
use thiserror::Error;

use keel_delegate::{CacheSynthesizer, ContainerRegistry, LoweredConversion};
use keel_ir::{CaseLabel, CaseTarget, ConversionSite, DispatchPlan, ScrutineeType, SymbolTable};
use keel_switch::{LabelProblem, SwitchPlanner};

use crate::config::LoweringConfig;

/// One `switch` as the front end hands it over.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchInput {
    pub scrutinee: ScrutineeType,
    pub labels: Vec<CaseLabel>,
    /// Target when no label matches.
    pub default: CaseTarget,
}

impl SwitchInput {
    pub fn new(scrutinee: ScrutineeType, labels: Vec<CaseLabel>, default: CaseTarget) -> Self {
        Self {
            scrutinee,
            labels,
            default,
        }
    }
}

/// Everything lowering needs from one compilation.
#[derive(Clone, Debug, Default)]
pub struct CompilationUnit {
    pub symbols: SymbolTable,
    pub switches: Vec<SwitchInput>,
    pub conversions: Vec<ConversionSite>,
}

/// Output of [`LoweringSession::lower`], parallel to the unit's inputs.
#[derive(Debug)]
pub struct LoweredUnit {
    pub plans: Vec<DispatchPlan>,
    pub conversions: Vec<LoweredConversion>,
    /// Containers and slots allocated for the cached conversions.
    pub registry: ContainerRegistry,
}

impl LoweredUnit {
    pub fn cached_count(&self) -> usize {
        self.conversions.iter().filter(|c| c.is_cached()).count()
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum LoweringError {
    #[error("switch #{index}: {problem}")]
    InvalidLabels {
        index: usize,
        #[source]
        problem: LabelProblem,
    },
}

/// Lowers compilation units under one configuration.
#[derive(Clone, Debug, Default)]
pub struct LoweringSession {
    config: LoweringConfig,
    planner: SwitchPlanner,
}

impl LoweringSession {
    pub fn new(config: LoweringConfig) -> Self {
        let planner = SwitchPlanner::new(config.planner.clone());
        Self { config, planner }
    }

    pub fn from_env() -> Self {
        Self::new(LoweringConfig::from_env())
    }

    pub fn config(&self) -> &LoweringConfig {
        &self.config
    }

    pub fn planner(&self) -> &SwitchPlanner {
        &self.planner
    }

    /// Lower every switch and conversion in `unit`.
    ///
    /// Labels are trusted; see [`lower_checked`](Self::lower_checked).
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(switches = unit.switches.len(), conversions = unit.conversions.len())
    )]
    pub fn lower(&self, unit: &CompilationUnit) -> LoweredUnit {
        let plan = |input: &SwitchInput| {
            self.planner
                .plan(&input.scrutinee, &input.labels, input.default)
        };
        let plans = if self.config.parallel {
            unit.switches.par_iter().map(plan).collect()
        } else {
            unit.switches.iter().map(plan).collect()
        };
        self.finish(unit, plans)
    }

    /// Like [`lower`](Self::lower), but reports the first switch with
    /// invalid labels instead of asserting.
    pub fn lower_checked(&self, unit: &CompilationUnit) -> Result<LoweredUnit, LoweringError> {
        let plan = |(index, input): (usize, &SwitchInput)| {
            self.planner
                .plan_checked(&input.scrutinee, &input.labels, input.default)
                .map_err(|problem| LoweringError::InvalidLabels { index, problem })
        };
        let plans = if self.config.parallel {
            unit.switches
                .par_iter()
                .enumerate()
                .map(plan)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            unit.switches
                .iter()
                .enumerate()
                .map(plan)
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(self.finish(unit, plans))
    }

    fn finish(&self, unit: &CompilationUnit, plans: Vec<DispatchPlan>) -> LoweredUnit {
        let synth = CacheSynthesizer::new(&unit.symbols, self.config.synthesizer.clone());
        let mut registry = ContainerRegistry::new();
        let conversions: Vec<LoweredConversion> = unit
            .conversions
            .iter()
            .map(|site| synth.lower(site, &mut registry))
            .collect();

        let lowered = LoweredUnit {
            plans,
            conversions,
            registry,
        };
        tracing::debug!(
            plans = lowered.plans.len(),
            cached = lowered.cached_count(),
            containers = lowered.registry.len(),
            slots = lowered.registry.slot_count(),
            "unit lowered"
        );
        lowered
    }
}

#[cfg(test)]
mod tests;
