pub mod analyzers;
pub mod domain;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod services;
pub mod stations;
pub mod time;
