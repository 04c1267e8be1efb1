//! Render Pipeline: component composition, boundary tagging, streaming.
//!
//! # Data Flow
//! ```text
//! manifest.render(path)
//!     → pipeline.rs (load modules, compose or diff)
//!         → node.rs   (Node tree from components)
//!         → html.rs   (serialize shell, park deferred content)
//!         → script.rs (router script tag before `</body>`)
//!         → stream.rs (shell chunk, then resolved chunks until deadline)
//! ```
//!
//! # Design Decisions
//! - The root template is never a boundary
//! - Response status is decided when the shell is ready
//! - Failures after the shell are logged, never surfaced

pub mod component;
pub mod error;
pub mod html;
pub mod link;
pub mod node;
pub mod pipeline;
pub mod script;
pub mod stream;

pub use component::{wrap, Component, ComponentError, FnComponent};
pub use error::{ModuleRole, RenderError};
pub use link::{link, LinkOptions};
pub use node::{Node, Props};
pub use pipeline::{RenderOptions, RenderPipeline, RenderedOutput};
pub use stream::HtmlDocument;
