//! Bundled [`crate::PageRenderer`] adapters.
//!
//! The pipeline itself never performs inference. These adapters connect it
//! to the two kinds of backend the CLI can drive:
//!
//! * [`vlm::VlmRenderer`]: a vision LLM reached through `edgequake-llm`,
//!   writing one Markdown file per page image
//! * [`command::CommandRenderer`]: any external program, run once per page
//!   image

pub mod command;
pub mod vlm;

pub use command::CommandRenderer;
pub use vlm::VlmRenderer;
