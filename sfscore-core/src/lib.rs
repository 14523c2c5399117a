//! # sfscore-core
//!
//! Core types for the situation frame scorer: the record model shared by
//! every crate in the workspace.
//!
//! This crate provides:
//! - **Reference records**: [`ReferenceFrame`], [`SentimentAnnotation`]
//! - **System records**: [`SystemFrame`], [`SecBlock`]
//! - **Derived facts**: [`FrameFacts`], [`FrameKind`], [`Emotions`]
//! - **Errors**: [`Error`], [`Result`]

pub mod error;
pub mod frame;

pub use error::{Error, Result};
pub use frame::{
    is_known_situation_type, Emotions, FrameFacts, FrameKind, Modality, ReferenceFrame, SecBlock,
    SentimentAnnotation, SystemFrame, ISSUE_TYPES, NEED_TYPES,
};
