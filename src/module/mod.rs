//! Module scripts: header mini-language parsing and library access

pub mod header;
pub mod library;
pub mod query;
pub mod schema;

pub use header::{read_body, read_header, FormatError, INTERPRETER_LINE};
pub use library::{Module, ModuleLibrary, ModuleParseError};
pub use query::{find, tokenize};
pub use schema::{ArgSpec, ModuleHeader, SchemaError};
