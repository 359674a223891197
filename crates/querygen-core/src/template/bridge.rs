//! Bridge code between a compiled native query and the host.
//!
//! The generated translation unit exports a single C symbol,
//! `querygen_init_<name>`, returning a table of four operations:
//!
//! ```text
//! run()              -> handle     construct Query<...> and run it
//! num_rows(handle)   -> long       row count of the result
//! fetch_data(handle) -> long       see FetchMode
//! release(handle)                  destroy the query
//! ```
//!
//! The table layout must stay in sync with `execute::dylib::ModuleTable`.

use std::fmt;
use std::str::FromStr;

use super::init_symbol;

/// Version stamped into every generated module table.
pub const BRIDGE_ABI_VERSION: u32 = 1;

/// Native element type of a query attribute or annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int,
    Long,
    UInt32,
    UInt64,
    Float,
    Double,
}

impl ElementType {
    /// The C++ spelling of the type.
    pub fn cpp_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::UInt32 => "uint32_t",
            Self::UInt64 => "uint64_t",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cpp_name())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "int" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "uint32_t" | "u32" => Ok(Self::UInt32),
            "uint64_t" | "u64" => Ok(Self::UInt64),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            other => Err(format!(
                "unknown element type '{}' (expected int, long, uint32_t, uint64_t, float or double)",
                other
            )),
        }
    }
}

/// What `fetch_data` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// A constant; the engine does not expose result data yet.
    Placeholder(i64),

    /// Read a numeric member of the query object.
    Member(String),
}

impl Default for FetchMode {
    fn default() -> Self {
        Self::Placeholder(2)
    }
}

/// Describes the native query type a bridge is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryShape {
    /// Class template name in the engine headers.
    pub query_type: String,

    /// Attribute types, in template-argument order.
    pub keys: Vec<ElementType>,

    /// Annotation type; always the last template argument.
    pub annotation: ElementType,

    pub fetch: FetchMode,
}

impl Default for QueryShape {
    fn default() -> Self {
        Self {
            query_type: "Query".to_string(),
            keys: vec![ElementType::Long, ElementType::Long],
            annotation: ElementType::Long,
            fetch: FetchMode::default(),
        }
    }
}

impl QueryShape {
    /// Full C++ type, e.g. `Query<long, long, long>`.
    pub fn cpp_type(&self) -> String {
        let args: Vec<&str> = self
            .keys
            .iter()
            .chain(std::iter::once(&self.annotation))
            .map(|t| t.cpp_name())
            .collect();
        format!("{}<{}>", self.query_type, args.join(", "))
    }

    /// Render the bridge for module `name`.
    pub fn render(&self, name: &str) -> String {
        let query = self.cpp_type();
        let mut code = String::new();

        code.push_str("// Generated by querygen. Do not edit.\n");
        code.push_str(&format!("// Bridge for module {}: {}\n\n", name, query));
        code.push_str("#include <stdint.h>\n");
        code.push_str("#include \"querywrapper.hpp\"\n\n");

        // Module table, mirrored on the host side.
        code.push_str("#ifndef QUERYGEN_MODULE_DEFINED\n");
        code.push_str("#define QUERYGEN_MODULE_DEFINED\n");
        code.push_str("extern \"C\" {\n");
        code.push_str("typedef struct querygen_module {\n");
        code.push_str("  uint32_t abi_version;\n");
        code.push_str("  void *(*run)(void);\n");
        code.push_str("  long (*num_rows)(void *);\n");
        code.push_str("  long (*fetch_data)(void *);\n");
        code.push_str("  void (*release)(void *);\n");
        code.push_str("} querygen_module;\n");
        code.push_str("}\n");
        code.push_str("#endif\n\n");

        code.push_str("namespace {\n\n");
        code.push_str(&format!("typedef {} query_t;\n\n", query));

        // run: exceptions must not cross the C boundary
        code.push_str("void *run(void) {\n");
        code.push_str("  try {\n");
        code.push_str("    query_t *q = new query_t();\n");
        code.push_str("    q->run();\n");
        code.push_str("    return q;\n");
        code.push_str("  } catch (...) {\n");
        code.push_str("    return nullptr;\n");
        code.push_str("  }\n");
        code.push_str("}\n\n");

        code.push_str("long num_rows(void *handle) {\n");
        code.push_str("  query_t *q = static_cast<query_t *>(handle);\n");
        code.push_str("  return static_cast<long>(q->num_rows);\n");
        code.push_str("}\n\n");

        code.push_str("long fetch_data(void *handle) {\n");
        match &self.fetch {
            FetchMode::Placeholder(value) => {
                code.push_str("  (void)handle;\n");
                code.push_str(&format!("  return {}L;\n", value));
            }
            FetchMode::Member(member) => {
                code.push_str("  query_t *q = static_cast<query_t *>(handle);\n");
                code.push_str(&format!("  return static_cast<long>(q->{});\n", member));
            }
        }
        code.push_str("}\n\n");

        code.push_str("void release(void *handle) { delete static_cast<query_t *>(handle); }\n\n");

        code.push_str(&format!(
            "const querygen_module module_table = {{{}, run, num_rows, fetch_data, release}};\n\n",
            BRIDGE_ABI_VERSION
        ));
        code.push_str("} // namespace\n\n");

        // Module init, the only exported symbol.
        code.push_str(&format!(
            "extern \"C\" const querygen_module *{}(void) {{ return &module_table; }}\n",
            init_symbol(name)
        ));

        code
    }
}

/// Bridge for `name` over the default `Query<long, long, long>` shape.
pub fn bridge_source(name: &str) -> String {
    QueryShape::default().render(name)
}
