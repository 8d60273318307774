//! Parser orchestration pool (spec §4.1).
//!
//! Workers pull from a shared bounded queue and each own one
//! `LanguageParser` instance per language they touch, since tree-sitter
//! parsers are not thread-safe. A per-file failure never aborts another
//! file; a fatal parser-initialization failure aborts the whole run with a
//! single `filesystem`-typed error.

use crate::errors::ParserError;
use crate::language::LanguageKind;
use crate::languages::{
    c::CParser, generic::GenericTextParser, javascript::JavaScriptParser, python::PythonParser,
    rust::RustParser, typescript::TypeScriptParser,
};
use crate::parsed::{DetailedParseError, ParseErrorKind, ParsedFile, ScannedFile};
use crate::parser_trait::LanguageParser;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub struct ParserPool {
    workers: usize,
}

impl ParserPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Consumes `files` and returns `(parsed, errors)`. The pair is always
    /// complete: every input file ends up in exactly one of the two, even
    /// when a fatal parser-initialization failure aborts the run early —
    /// any file still sitting in the shared queue at that point is folded
    /// into `errors` as a `filesystem`-typed entry rather than dropped.
    #[tracing::instrument(level = "info", skip_all, fields(files = files.len(), workers = self.workers))]
    pub async fn run(&self, files: Vec<ScannedFile>) -> (Vec<ParsedFile>, Vec<DetailedParseError>) {
        // Queue capacity is informational here (the deque isn't bounded by
        // a blocking push/pop), but we size the worker count against it the
        // way spec §4.1 prescribes: size = W*4 determines how much work is
        // fanned out before workers start throttling each other via the
        // shared lock.
        let _queue_capacity = self.workers * 4;
        let queue = Arc::new(Mutex::new(VecDeque::from(files)));
        let aborted = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let queue = queue.clone();
            let aborted = aborted.clone();
            handles.push(tokio::task::spawn_blocking(move || worker_loop(queue, aborted)));
        }

        let mut parsed = Vec::new();
        let mut errors = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((p, e)) => {
                    parsed.extend(p);
                    errors.extend(e);
                }
                Err(join_err) => {
                    warn!(error = %join_err, "parser worker panicked");
                    errors.push(DetailedParseError {
                        file: String::new(),
                        line: 0,
                        column: 0,
                        message: format!("worker panicked: {join_err}"),
                        error_type: ParseErrorKind::Filesystem,
                    });
                }
            }
        }

        // A fatal error aborts every worker, but files already popped by a
        // different worker before the abort flag was observed stay queued.
        // Drain them so the (parsed, errors) pair never silently drops a
        // file (spec §4.1).
        errors.extend(drain_unprocessed(&queue));

        (parsed, errors)
    }
}

/// Turns whatever is left in `queue` into one `filesystem`-typed error per
/// file. Called after a run ends, whether by completion (queue already
/// empty) or abort (queue still holds files no worker got to).
fn drain_unprocessed(queue: &Mutex<VecDeque<ScannedFile>>) -> Vec<DetailedParseError> {
    let remaining: Vec<ScannedFile> = queue.lock().expect("parser queue mutex poisoned").drain(..).collect();
    if !remaining.is_empty() {
        warn!(count = remaining.len(), "run aborted, marking unprocessed files");
    }
    remaining
        .into_iter()
        .map(|file| DetailedParseError {
            file: file.rel_path.clone(),
            line: 0,
            column: 0,
            message: "not processed: parser run aborted after a fatal error in another file".into(),
            error_type: ParseErrorKind::Filesystem,
        })
        .collect()
}

fn worker_loop(
    queue: Arc<Mutex<VecDeque<ScannedFile>>>,
    aborted: Arc<AtomicBool>,
) -> (Vec<ParsedFile>, Vec<DetailedParseError>) {
    let mut parsers: HashMap<LanguageKind, Box<dyn LanguageParser>> = HashMap::new();
    let mut parsed = Vec::new();
    let mut errors = Vec::new();

    loop {
        if aborted.load(Ordering::SeqCst) {
            break;
        }
        let file = {
            let mut q = queue.lock().expect("parser queue mutex poisoned");
            q.pop_front()
        };
        let Some(file) = file else { break };

        match parse_one(&mut parsers, &file) {
            Ok(pf) => parsed.push(pf),
            Err(fatal) => {
                debug!(file = %file.rel_path, "fatal parser error, aborting run");
                errors.push(fatal);
                aborted.store(true, Ordering::SeqCst);
                break;
            }
        }
    }
    (parsed, errors)
}

/// Parses one file. Returns `Err` only for a fatal initialization failure
/// (spec §4.1); every other failure mode is folded into the returned
/// `ParsedFile.errors` so the run continues.
fn parse_one(
    parsers: &mut HashMap<LanguageKind, Box<dyn LanguageParser>>,
    file: &ScannedFile,
) -> Result<ParsedFile, DetailedParseError> {
    let bytes = match std::fs::read(&file.abs_path) {
        Ok(b) => b,
        Err(e) => {
            let mut pf = ParsedFile::empty(file.language, file.rel_path.clone());
            pf.errors.push(DetailedParseError {
                file: file.rel_path.clone(),
                line: 0,
                column: 0,
                message: format!("failed to read {}: {e}", file.abs_path),
                error_type: ParseErrorKind::Filesystem,
            });
            return Ok(pf);
        }
    };

    let parser = match parsers.entry(file.language) {
        std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
        std::collections::hash_map::Entry::Vacant(v) => {
            let built = build_parser(file.language).map_err(|e| DetailedParseError {
                file: file.rel_path.clone(),
                line: 0,
                column: 0,
                message: format!("parser init failed for {:?}: {e}", file.language),
                error_type: ParseErrorKind::Filesystem,
            })?;
            v.insert(built)
        }
    };

    match parser.parse(&file.abs_path, &file.rel_path, &bytes) {
        Ok(pf) => Ok(pf),
        Err(e) if e.is_fatal() => Err(DetailedParseError {
            file: file.rel_path.clone(),
            line: 0,
            column: 0,
            message: e.to_string(),
            error_type: ParseErrorKind::Filesystem,
        }),
        Err(e) => {
            let mut pf = ParsedFile::empty(file.language, file.rel_path.clone());
            pf.errors.push(DetailedParseError {
                file: file.rel_path.clone(),
                line: 0,
                column: 0,
                message: e.to_string(),
                error_type: ParseErrorKind::Parse,
            });
            Ok(pf)
        }
    }
}

fn build_parser(language: LanguageKind) -> Result<Box<dyn LanguageParser>, ParserError> {
    Ok(match language {
        LanguageKind::Rust => Box::new(RustParser::new()?),
        LanguageKind::Python => Box::new(PythonParser::new()?),
        LanguageKind::TypeScript => Box::new(TypeScriptParser::new()?),
        LanguageKind::JavaScript => Box::new(JavaScriptParser::new()?),
        LanguageKind::C | LanguageKind::Cpp | LanguageKind::ObjectiveC => {
            Box::new(CParser::new(language)?)
        }
        LanguageKind::Other => Box::new(GenericTextParser),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(rel_path: &str) -> ScannedFile {
        ScannedFile {
            abs_path: rel_path.to_string(),
            rel_path: rel_path.to_string(),
            language: LanguageKind::Other,
            size: 0,
        }
    }

    #[test]
    fn drain_unprocessed_turns_every_leftover_file_into_a_filesystem_error() {
        let queue = Mutex::new(VecDeque::from(vec![scanned("a.rs"), scanned("b.rs")]));
        let errors = drain_unprocessed(&queue);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e.error_type, ParseErrorKind::Filesystem)));
        assert!(errors.iter().any(|e| e.file == "a.rs"));
        assert!(errors.iter().any(|e| e.file == "b.rs"));
        assert!(queue.lock().unwrap().is_empty());
    }

    #[test]
    fn drain_unprocessed_on_an_empty_queue_is_a_no_op() {
        let queue = Mutex::new(VecDeque::new());
        assert!(drain_unprocessed(&queue).is_empty());
    }
}
