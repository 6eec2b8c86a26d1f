pub mod analyzers;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod record;
