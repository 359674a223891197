//! Native source templates.
//!
//! - `bridge` - glue exposing a compiled query's run / row count / fetch
//!   operations through a C-ABI module table
//! - `header` - query header skeleton used by the storage engine
//!
//! Templates are pure text functions. Names are substituted as-is; a name
//! that is not a valid C identifier yields code that fails at build time.

mod bridge;
mod header;

pub use bridge::{bridge_source, ElementType, FetchMode, QueryShape, BRIDGE_ABI_VERSION};
pub use header::query_header;

/// Prefix of the exported module init function; the module name follows it.
pub const INIT_SYMBOL_PREFIX: &str = "querygen_init_";

/// Name of the init symbol exported by the bridge for `name`.
pub fn init_symbol(name: &str) -> String {
    format!("{}{}", INIT_SYMBOL_PREFIX, name)
}
