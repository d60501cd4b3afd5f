//! # tidyjson
//!
//! A JSON formatter that aims for output a person would lay out by hand:
//! compact where the data is simple, broken across lines where it isn't,
//! and aligned into columns where sibling elements share a shape.
//!
//! Every array and object is classified into one of four layouts:
//!
//! - written on a single line when it's short and shallow enough;
//! - long arrays of small items are wrapped with several items per line;
//! - runs of similar children become a table, with their names, values,
//!   and comments lined up vertically and numbers aligned on the decimal
//!   point;
//! - everything else expands to one child per line.
//!
//! Comments (`//` and `/* */`) and blank lines are non-standard JSON but
//! can be preserved, attached to the element they belong with.
//!
//! ## Quick start
//!
//! ```rust
//! use tidyjson::Formatter;
//!
//! let input = r#"{"name":"Alice","scores":[95,87,92],"active":true}"#;
//!
//! let mut formatter = Formatter::new();
//! let output = formatter.reformat(input, 0).unwrap();
//! println!("{}", output);
//! ```
//!
//! ## Serializing Rust types
//!
//! Anything implementing [`serde::Serialize`] can be formatted directly:
//!
//! ```rust
//! use serde::Serialize;
//! use tidyjson::Formatter;
//!
//! #[derive(Serialize)]
//! struct Player {
//!     name: String,
//!     scores: Vec<i32>,
//! }
//!
//! let player = Player { name: "Alice".into(), scores: vec![95, 87, 92] };
//! let output = Formatter::new().serialize(&player, 0, 100).unwrap();
//! ```
//!
//! ## Configuration
//!
//! Behavior is controlled through [`FormatOptions`]:
//!
//! ```rust
//! use tidyjson::{EolStyle, Formatter, NumberAlignment};
//!
//! let mut formatter = Formatter::new();
//! formatter.options.max_total_line_length = 100;
//! formatter.options.indent_spaces = 2;
//! formatter.options.json_eol_style = EolStyle::Lf;
//! formatter.options.number_list_alignment = NumberAlignment::Decimal;
//! ```
//!
//! ## Comments
//!
//! ```rust
//! use tidyjson::{CommentPolicy, Formatter};
//!
//! let input = "{\n    // favorite number\n    \"n\": 7\n}";
//! let mut formatter = Formatter::new();
//! formatter.options.comment_policy = CommentPolicy::Preserve;
//! let output = formatter.reformat(input, 0).unwrap();
//! assert!(output.contains("// favorite number"));
//! ```
//!
//! ## Example output
//!
//! ```json
//! {
//!     "units": [
//!         { "type": "turret",    "hp": 400, "loc": {"x": 47, "y":  -4} },
//!         { "type": "assassin",  "hp":  80, "loc": {"x": 12, "y":   6} },
//!         { "type": "berserker", "hp": 150, "loc": {"x":  0, "y":   0} }
//!     ]
//! }
//! ```
//!
//! The crate also ships a CLI, `tjson`, covering formatting, minifying,
//! and JSON Lines input.

mod columns;
mod convert;
mod error;
mod layout;
mod lexer;
mod options;
mod output;
mod parser;
mod tree;
pub mod width;

pub use crate::error::TidyError;
pub use crate::layout::Formatter;
pub use crate::options::{
    CommaPlacement, CommentPolicy, EolStyle, FormatOptions, NumberAlignment,
};
pub use crate::tree::{NodeKind, Position};
