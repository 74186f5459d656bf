//! Driver for the threshold-point agent, backed by the rotation engine.

use rotation_core::{
    CatalogueBuilder, Clock, RotationConfig, RotationEngine, RotationError, SimDuration, SimTime,
    StepOutcome, WaitTarget,
};

use super::{TrialSeed, finish_report};
use crate::error::Result;
use crate::report::{AbortDiagnostic, TrialReport};
use crate::scenario::{AgentProfile, Scenario};
use crate::sim::SimAgent;

pub struct RogueDriver {
    engine: RotationEngine,
    agent: SimAgent,
    end: SimTime,
    decision_tick: SimDuration,
    global_cooldown: SimDuration,
    id: TrialSeed,
}

impl RogueDriver {
    pub fn new(scenario: &Scenario, config: &RotationConfig, id: TrialSeed) -> Result<Self> {
        let AgentProfile::Rogue { talents, costs, .. } = &scenario.agent else {
            return Err(crate::error::RuntimeError::InvalidScenario(format!(
                "{}: rogue driver needs a rogue profile",
                scenario.name
            )));
        };

        let builder = CatalogueBuilder::new(config, costs)
            .talents(*talents)
            .targets(scenario.targets);
        let catalogue = builder.build()?;
        let model = builder.build_model();

        let watched = catalogue
            .iter()
            .filter_map(|(_, objective)| objective.linked_effect)
            .collect();
        let agent = SimAgent::new(scenario.agent_setup(config, watched), id.seed);

        Ok(Self {
            engine: RotationEngine::new(catalogue, model, config),
            agent,
            end: SimTime::ZERO + scenario.duration(),
            decision_tick: config.timing.decision_tick(),
            global_cooldown: config.timing.global_cooldown(),
            id,
        })
    }

    pub fn engine(&self) -> &RotationEngine {
        &self.engine
    }

    pub fn agent(&self) -> &SimAgent {
        &self.agent
    }

    /// Runs the trial to completion or to the first fatal planning error.
    pub fn run(mut self) -> Result<TrialReport> {
        let mut aborted = None;
        while self.agent.now() < self.end {
            let now = self.agent.now();
            let next_decision_at = now + self.global_cooldown;
            match self.engine.step(&mut self.agent, now, next_decision_at) {
                Ok(StepOutcome::Acted { .. }) => {
                    let ready = self.agent.gcd_ready_at();
                    if ready > now {
                        self.agent.advance_to(ready.min(self.end));
                    }
                }
                Ok(StepOutcome::Waiting(target)) => self.wait(target, now),
                Err(err) => {
                    tracing::error!(
                        trial = self.id.trial,
                        now_ms = now.as_millis(),
                        decision = self.engine.decisions(),
                        code = err.error_code(),
                        "trial aborted: {err}"
                    );
                    aborted = Some(AbortDiagnostic::from_error(&err));
                    break;
                }
            }
        }
        Ok(finish_report(
            &self.agent,
            self.id,
            self.engine.decisions(),
            aborted,
        ))
    }

    fn wait(&mut self, target: WaitTarget, now: SimTime) {
        let fallback = (now + self.decision_tick).min(self.end);
        match target {
            WaitTarget::ResourceAtLeast { pool, level } => {
                let reached = self
                    .agent
                    .advance_until_resource_at_least(pool, level, self.end);
                if reached <= now {
                    self.agent.advance_to(fallback);
                }
            }
            WaitTarget::Until(at) if at > now => self.agent.advance_to(at.min(self.end)),
            WaitTarget::Until(_) | WaitTarget::NextDecision => self.agent.advance_to(fallback),
        }
    }
}
