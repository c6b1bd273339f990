//! Rate limiting core: rules, counters, stores and the processing
//! strategy.

mod counter;
mod counter_store;
mod key_builder;
mod policy_store;
mod rules;
mod strategy;

pub use counter::RateLimitCounter;
pub use counter_store::CounterStore;
pub use key_builder::{ClientCounterKeyBuilder, CounterKeyBuilder};
pub use policy_store::PolicyStore;
pub use rules::{ClientRateLimitPolicy, ClientRequestIdentity, Period, RateLimitRule};
pub use strategy::ProcessingStrategy;
