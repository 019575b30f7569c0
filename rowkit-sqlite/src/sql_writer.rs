use rowkit_core::SqlWriter;

/// Double quotes every identifier. Named parameters keep the `@field` form, SQLite binds them natively.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter;

impl SqliteSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push('"');
        for c in value.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_identifiers() {
        let writer = SqliteSqlWriter::new();
        let mut out = String::new();
        writer.write_identifier(&mut out, "order");
        out.push(' ');
        writer.write_identifier(&mut out, "say \"hi\"");
        assert_eq!(out, r#""order" "say ""hi""""#);
    }
}
