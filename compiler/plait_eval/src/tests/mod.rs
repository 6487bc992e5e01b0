//! Scenarios that cross several modules: definitions feeding pipelines,
//! frames and the production compiler together.

mod pipeline_scenarios;
