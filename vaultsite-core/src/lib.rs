pub mod builder;
pub mod callout;
pub mod config;
pub mod markdown;
pub mod renderer;
pub mod rewriter;
pub mod scanner;
pub mod site;
pub mod template;

// Re-export main types
pub use builder::{BuildError, BuildReport, Site, SiteBuilder, build_site};
pub use callout::{Callout, translate_callouts};
pub use config::{Config, ConfigError};
pub use renderer::MarkdownRenderer;
pub use rewriter::{LinkRewriter, RewriteError, RewriteReport};
pub use scanner::{ScanError, SiteScanner};
pub use site::{FileKind, Page, SourceFile};
pub use template::{PageTemplate, TemplateError};
