pub mod deployment;
pub mod environment_variable;
pub mod project;
