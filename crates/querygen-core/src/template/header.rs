//! Query header skeleton for the storage engine.

const QUERY_HEADER: &str = r#"#ifndef _QUERY_HASHSTRING_H_
#define _QUERY_HASHSTRING_H_

#include <vector>
#include <stdint.h>
#include <tuple>
#include "Trie.hpp"
#include "Encoding.hpp"

#ifdef EXECUTABLE
#include "main.hpp"
#else
struct application{};
#endif

struct ParMMapBuffer;
struct ParMemoryBuffer;

// template types are the attribute types, followed by the annotation type
struct Query_HASHSTRING : public application {
  void* result_HASHSTRING;

  Query_HASHSTRING(){}
  void run_HASHSTRING();
};

#ifdef EXECUTABLE
application* init_app(){
  return new Query_HASHSTRING();
}
#endif

#endif
"#;

/// Render the query header for a query identified by `hash`.
///
/// `hash` becomes part of the include guard, the struct name and its
/// members, so it must be identifier-safe.
pub fn query_header(hash: &str) -> String {
    QUERY_HEADER.replace("HASHSTRING", hash)
}
