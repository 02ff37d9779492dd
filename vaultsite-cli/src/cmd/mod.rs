pub mod build;
pub mod rewrite;
