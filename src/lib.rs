#![deny(missing_docs)]

//! Rust bindings for the MeCab part-of-speech and morphological analyzer.
//!
//! The MeCab shared library is loaded at runtime, so no MeCab headers or
//! link-time configuration are needed; a working MeCab installation with
//! a dictionary (UTF-8 recommended) is enough.
//!
//! ## Quick Start
//! ```no_run
//! use mecab_rs::Mecab;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mecab = Mecab::from_str_options("")?;
//!     print!("{}", mecab.parse("俺の名前は星野豊だ!!どこにでもいる普通の高校生だ!")?);
//!     for node in mecab.parse_to_nodes("世界の果てまで")? {
//!         if node.is_normal() {
//!             println!("{}\t{}", node.surface, node.feature);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Options
//! Analyzers accept the familiar MeCab command-line options, either as an
//! option string via [`Mecab::from_str_options`] (`"-O wakati"`,
//! `"--nbest=3"`) or as a typed [`MecabOptions`] value built with `with_*`
//! setters. The choice between single-best and N-best output is fixed at
//! construction from the `nbest` option.
//!
//! ## Parse Constraints
//! [`Mecab::parse_with`] and [`Mecab::parse_to_nodes_with`] accept a
//! [`Constraint`]: either boundary constraints keeping every match of a
//! pattern as a single morpheme, or feature constraints overriding the
//! feature of exact-match morphemes.
//!
//! ## Environment Variables
//! - `MECAB_PATH`: explicit path to the MeCab shared library, checked
//!   before any platform discovery.

mod constants;
mod discovery;
mod error;
mod model;
mod native;
mod options;
mod runtime;
mod segment;

pub use constants::*;
pub use error::{MecabError, Result};
pub use model::{DictionaryInfo, DictionaryKind, MecabNode, NodeStat};
pub use options::MecabOptions;
pub use runtime::{Constraint, Mecab, MecabLibrary, ParseMode};
pub use segment::{tokenize_by_features, tokenize_by_pattern, Pattern, SegmentedToken};

#[cfg(test)]
mod test_support;
