//! CLI command implementations

pub mod run;
pub mod tree;

pub use run::RunArgs;
pub use tree::TreeArgs;
