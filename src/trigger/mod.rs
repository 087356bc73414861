mod definition;
mod engine;

pub use definition::{
    PromotionFilter, TriggerDefinition, TriggerResult, TriggerSet, ANY_PROMOTION,
};
pub use engine::{ScheduledBuild, TriggerEngine};
