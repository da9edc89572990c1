//! Pipeline stages for PDF-to-images conversion.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own (dispatch and discovery need no pdfium at all).
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterize ──▶ discover ──▶ dispatch
//! (path)    (pdfium)      (glob+sort)  (PageRenderer)
//! ```
//!
//! 1. [`input`]    : validate the PDF path and create output directories
//! 2. [`rasterize`]: write `{stem}_{page}.png`; runs in `spawn_blocking`
//!    because pdfium is not async-safe ([`engine`] binds the library)
//! 3. [`discover`] : glob the images back and order them by page index
//! 4. [`dispatch`] : hand each image to the renderer, strictly in order

pub mod discover;
pub mod dispatch;
pub mod engine;
pub mod input;
pub mod rasterize;
