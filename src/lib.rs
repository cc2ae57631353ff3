pub mod analyzers;
pub mod candidate;
pub mod fetch;
pub mod filter;
pub mod merge;
pub mod normalize;
pub mod output;
pub mod publish;
pub mod query;
