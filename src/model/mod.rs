//! Document model types for report content.
//!
//! This module defines the intermediate representation that sits between
//! Markdown parsing and HWPX serialization. Blocks carry semantics only;
//! schema identifiers are resolved later by [`crate::style`].

mod asset;
mod block;
mod document;

pub use asset::{ImageAsset, MediaType};
pub use block::{Block, CaptionKind, ListKind, TableBlock};
pub use document::{
    CaptionCatalog, DiagramSource, Document, Outline, OutlineItem, Section, SectionKind,
};
