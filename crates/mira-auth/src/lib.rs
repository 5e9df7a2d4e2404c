#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod catalog;
pub mod credential;
pub mod directory;
pub mod guard;
pub mod scope;
pub mod token;

pub use crate::error::{AuthError, BoxedError, Result};
