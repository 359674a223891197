//! Template command: print bridge code or a query header to stdout.

use querygen_core::{query_header, ElementType, FetchMode, QueryShape};

/// Options shaping the rendered bridge.
pub struct TemplateOptions {
    pub query_type: String,
    pub keys: Vec<ElementType>,
    pub annotation: ElementType,
    pub fetch_member: Option<String>,
    pub header: bool,
}

pub fn execute(name: &str, options: TemplateOptions) -> anyhow::Result<()> {
    if options.header {
        print!("{}", query_header(name));
        return Ok(());
    }

    let shape = QueryShape {
        query_type: options.query_type,
        keys: options.keys,
        annotation: options.annotation,
        fetch: match options.fetch_member {
            Some(member) => FetchMode::Member(member),
            None => FetchMode::default(),
        },
    };

    print!("{}", shape.render(name));
    Ok(())
}
