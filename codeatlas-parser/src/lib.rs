//! Parser orchestration (spec §4.1): concurrent, per-file AST extraction
//! with graceful degradation on syntax errors.
//!
//! The pool never inspects language-specific AST detail beyond the
//! `ParsedFile` shape (spec §6) — each `LanguageParser` is the opaque
//! collaborator that produces it.

pub mod errors;
pub mod language;
pub mod languages;
pub mod parsed;
pub mod parser_trait;
pub mod pool;

pub use errors::ParserError;
pub use language::{LanguageKind, detect};
pub use parsed::{
    DetailedParseError, ParseErrorKind, ParsedFile, RawEdge, RawSymbol, RawTarget, ScannedFile,
};
pub use parser_trait::LanguageParser;
pub use pool::ParserPool;

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tmp(contents: &str, ext: &str) -> (tempfile_like::TempFile, ScannedFile) {
        let dir = std::env::temp_dir();
        let name = format!(
            "codeatlas_parser_test_{}_{}.{ext}",
            std::process::id(),
            contents.len()
        );
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        let rel = path.file_name().unwrap().to_string_lossy().to_string();
        let scanned = ScannedFile {
            abs_path: path.to_string_lossy().to_string(),
            rel_path: rel,
            language: detect(&path.to_string_lossy()),
            size: contents.len() as u64,
        };
        (tempfile_like::TempFile(path), scanned)
    }

    mod tempfile_like {
        pub struct TempFile(pub std::path::PathBuf);
        impl Drop for TempFile {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
    }

    #[tokio::test]
    async fn parses_rust_function_and_call() {
        let (_guard, file) = write_tmp(
            "/// adds two numbers\nfn add(a: i32, b: i32) -> i32 { helper(a, b) }\n",
            "rs",
        );
        let pool = ParserPool::new(2);
        let (parsed, errors) = pool.run(vec![file]).await;
        assert!(errors.is_empty());
        assert_eq!(parsed.len(), 1);
        let pf = &parsed[0];
        assert_eq!(pf.symbols.len(), 1);
        assert_eq!(pf.symbols[0].name, "add");
        assert!(pf.raw_edges.iter().any(|e| e.edge_type == "call"));
    }

    #[tokio::test]
    async fn syntax_error_does_not_abort_other_files() {
        let (_g1, bad) = write_tmp("fn broken( {{{", "rs");
        let (_g2, good) = write_tmp("fn ok() {}\n", "rs");
        let pool = ParserPool::new(2);
        let (parsed, _errors) = pool.run(vec![bad, good]).await;
        assert_eq!(parsed.len(), 2, "both files must be accounted for");
        assert!(parsed.iter().any(|p| p.symbols.iter().any(|s| s.name == "ok")));
    }

    #[tokio::test]
    async fn c_header_emits_declaration_and_impl_emits_definition() {
        let (_g1, header) = write_tmp("int add(int a, int b);\n", "h");
        let (_g2, impl_) = write_tmp("#include \"math.h\"\nint add(int a, int b) { return a + b; }\n", "c");
        let pool = ParserPool::new(2);
        let (parsed, errors) = pool.run(vec![header, impl_]).await;
        assert!(errors.is_empty());
        let decl = parsed.iter().find(|p| p.path.ends_with(".h")).unwrap();
        assert_eq!(decl.symbols[0].raw_kind, "function_declaration");
        let def = parsed.iter().find(|p| p.path.ends_with(".c")).unwrap();
        assert_eq!(def.symbols[0].raw_kind, "function");
        assert!(def.raw_edges.iter().any(|e| e.edge_type == "includes"));
    }

    #[tokio::test]
    async fn generic_fallback_for_unknown_extension() {
        let (_g, file) = write_tmp("hello world", "xyz");
        let pool = ParserPool::new(1);
        let (parsed, errors) = pool.run(vec![file]).await;
        assert!(errors.is_empty());
        assert_eq!(parsed[0].symbols.len(), 1);
    }
}
