//! Two-level finite-state machine that recovers route endpoints from a flat
//! token stream.
//!
//! The machine consumes each file's tokens exactly once, left to right, with
//! no lookahead or backtracking. A top-level [`Phase`] alternates between
//! scanning for route annotations and scanning a recognized handler method's
//! body; each phase runs its own sub-state machine. Transitions live in two
//! pure step functions that take the current state plus an owned
//! [`Accumulator`] and return the next state, the accumulator, and any
//! effect, so every transition can be exercised in isolation.
//!
//! Malformed input never fails the machine: a shape it does not model simply
//! fails to advance a sub-state and is skipped.

use std::collections::BTreeSet;
use std::path::Path;

use crate::lexer::{Lexer, Token, TokenKind};

use super::endpoint::{normalize_verb, Endpoint, DEFAULT_VERB};

/// The route-declaring annotation recognized at class and method scope.
const ROUTE_ANNOTATION: &str = "RequestMapping";
/// Parameter-binding annotations recognized in a method declaration header.
const PARAM_ANNOTATIONS: &[&str] = &["RequestParam", "PathVariable"];
/// Keyword marking the start of the class declaration.
const CLASS_KEYWORD: &str = "class";
/// Named arguments of the route annotation.
const VALUE_KEYWORD: &str = "value";
const METHOD_KEYWORD: &str = "method";

/// Top-level scanning phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Looking for a route-declaring annotation.
    Annotation,
    /// Inside a recognized handler method's declaration and body.
    Method,
}

/// Sub-states while scanning for route annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnnotationState {
    Start,
    Arroba,
    RouteAnnotation,
    Value,
    Method,
    MethodList,
    End,
}

/// Sub-states while scanning a handler method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodState {
    Start,
    Arroba,
    ParamAnnotation,
    Body,
}

/// In-progress endpoint state, owned by the machine and threaded through the
/// step functions by value.
///
/// Class-level fields persist for the whole file; the rest is reset after
/// each method-body close.
#[derive(Debug, Default)]
struct Accumulator {
    file: String,
    class_path: Option<String>,
    class_methods: Vec<String>,
    method_path: Option<String>,
    method_methods: Vec<String>,
    parameters: Vec<String>,
    /// Last bare identifier seen inside a parameter annotation, pending a
    /// `,` or `)` to confirm it as the parameter name.
    pending_param: Option<String>,
    start_line: usize,
    /// `{`/`}` nesting inside the method body. Signed: unbalanced input may
    /// drive it negative, which is tolerated rather than reconciled.
    brace_depth: i32,
    /// `(`/`)` nesting across the method declaration header, distinguishing
    /// an annotation's closing paren from the parameter list's.
    paren_depth: i32,
    /// Set once the `class` keyword is seen; route annotations completed
    /// before that point are class-level, after it method-level.
    in_class: bool,
}

impl Accumulator {
    fn new(file: String) -> Self {
        Self {
            file,
            ..Self::default()
        }
    }

    /// Record one declared HTTP verb at the scope selected by `in_class`.
    fn push_verb(&mut self, raw: &str) {
        let verb = normalize_verb(raw);
        if self.in_class {
            self.method_methods.push(verb);
        } else {
            self.class_methods.push(verb);
        }
    }

    /// Confirm the pending identifier as a parameter name, if any.
    fn flush_pending_param(&mut self) {
        if let Some(name) = self.pending_param.take() {
            self.parameters.push(name);
        }
    }

    /// Build the descriptor for the method that just closed.
    ///
    /// Path is class prefix ++ method suffix with no separator inserted;
    /// verbs fall back from method level to class level to the default.
    fn assemble(&self, end_line: usize) -> Endpoint {
        let mut path = self.class_path.clone().unwrap_or_default();
        path.push_str(self.method_path.as_deref().unwrap_or(""));

        let methods = if !self.method_methods.is_empty() {
            self.method_methods.clone()
        } else if !self.class_methods.is_empty() {
            self.class_methods.clone()
        } else {
            vec![DEFAULT_VERB.to_string()]
        };

        Endpoint {
            file: self.file.clone(),
            path,
            methods,
            parameters: self.parameters.clone(),
            start_line: self.start_line,
            end_line,
        }
    }

    /// Clear per-method state. Class-level capture persists for the file.
    fn reset_method(&mut self) {
        self.method_path = None;
        self.method_methods.clear();
        self.parameters.clear();
        self.pending_param = None;
        self.start_line = 0;
        self.brace_depth = 0;
        self.paren_depth = 0;
    }
}

/// Annotation-phase transition: state x token -> next state, with captures
/// recorded into the accumulator. The returned flag commits the top-level
/// phase to `Method`.
fn annotation_step(
    state: AnnotationState,
    token: &Token,
    mut acc: Accumulator,
) -> (AnnotationState, Accumulator, bool) {
    use AnnotationState::*;

    let mut enter_method = false;

    let next = match state {
        Start => match &token.kind {
            TokenKind::At => Arroba,
            TokenKind::Word(w) if w == CLASS_KEYWORD => {
                acc.in_class = true;
                Start
            }
            _ => Start,
        },
        Arroba => match token.kind.text() {
            Some(name) if name == ROUTE_ANNOTATION => RouteAnnotation,
            _ => Start,
        },
        RouteAnnotation => match &token.kind {
            TokenKind::Word(w) if w == VALUE_KEYWORD => Value,
            TokenKind::Word(w) if w == METHOD_KEYWORD => Method,
            // A quoted literal with no keyword is taken as the path directly.
            TokenKind::Str(path) => {
                if acc.in_class {
                    acc.method_path = Some(path.clone());
                    acc.start_line = token.line;
                    End
                } else {
                    acc.class_path = Some(path.clone());
                    Start
                }
            }
            // Nothing usable in this annotation.
            TokenKind::CloseParen => End,
            _ => RouteAnnotation,
        },
        Value => match token.kind.text() {
            Some(path) => {
                if acc.in_class {
                    acc.method_path = Some(path.to_string());
                    acc.start_line = token.line;
                } else {
                    acc.class_path = Some(path.to_string());
                }
                RouteAnnotation
            }
            None => Value,
        },
        Method => match &token.kind {
            TokenKind::OpenBrace => MethodList,
            kind => match kind.text() {
                Some(verb) => {
                    acc.push_verb(verb);
                    RouteAnnotation
                }
                None => Method,
            },
        },
        MethodList => match &token.kind {
            TokenKind::CloseBrace => RouteAnnotation,
            kind => match kind.text() {
                Some(verb) => {
                    acc.push_verb(verb);
                    MethodList
                }
                None => MethodList,
            },
        },
        // Consumes one trailing token. A method-level annotation commits the
        // phase switch; the class-level one leaves the phase alone.
        End => {
            if acc.in_class {
                enter_method = true;
            }
            Start
        }
    };

    (next, acc, enter_method)
}

/// Method-phase transition: brace/paren depth tracking runs on every token,
/// concurrently with the parameter sub-states. Emits the finished endpoint
/// when the body's own closing brace is seen.
fn method_step(
    state: MethodState,
    token: &Token,
    mut acc: Accumulator,
) -> (MethodState, Accumulator, Option<Endpoint>) {
    use MethodState::*;

    match token.kind {
        TokenKind::OpenBrace => acc.brace_depth += 1,
        TokenKind::CloseBrace => {
            if acc.brace_depth == 1 {
                let endpoint = acc.assemble(token.line);
                acc.reset_method();
                return (Start, acc, Some(endpoint));
            }
            acc.brace_depth -= 1;
        }
        TokenKind::OpenParen => acc.paren_depth += 1,
        TokenKind::CloseParen => acc.paren_depth = (acc.paren_depth - 1).max(0),
        _ => {}
    }

    let next = match state {
        Start => match &token.kind {
            TokenKind::At => Arroba,
            // The paren that closes the parameter list itself; annotation
            // parens never return the depth to zero.
            TokenKind::CloseParen if acc.paren_depth == 0 => Body,
            _ => Start,
        },
        Arroba => match token.kind.text() {
            Some(name) if PARAM_ANNOTATIONS.contains(&name) => ParamAnnotation,
            _ => Start,
        },
        ParamAnnotation => match &token.kind {
            // Quoted form: the literal is the parameter name, done.
            TokenKind::Str(name) => {
                acc.parameters.push(name.clone());
                acc.pending_param = None;
                Start
            }
            TokenKind::Word(word) => {
                acc.pending_param = Some(word.clone());
                ParamAnnotation
            }
            TokenKind::Comma => {
                acc.flush_pending_param();
                Start
            }
            TokenKind::CloseParen => {
                acc.flush_pending_param();
                if acc.paren_depth == 0 {
                    Body
                } else {
                    Start
                }
            }
            // Any other punctuation invalidates the pending identifier.
            _ => {
                acc.pending_param = None;
                ParamAnnotation
            }
        },
        // Body statements are not analyzed for parameter usage.
        Body => Body,
    };

    (next, acc, None)
}

/// Drives one file's token stream through the two phases and collects the
/// completed descriptors.
///
/// The result set is built once at end of stream; an unterminated method
/// body at that point emits nothing.
pub struct EndpointExtractor {
    phase: Phase,
    annotation: AnnotationState,
    method: MethodState,
    acc: Accumulator,
    completed: Vec<Endpoint>,
}

impl EndpointExtractor {
    /// Create an extractor for one source file. `file` becomes the identity
    /// component of every descriptor it emits.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            phase: Phase::Annotation,
            annotation: AnnotationState::Start,
            method: MethodState::Start,
            acc: Accumulator::new(file.into()),
            completed: Vec::new(),
        }
    }

    /// Feed one token.
    pub fn step(&mut self, token: &Token) {
        let acc = std::mem::take(&mut self.acc);
        match self.phase {
            Phase::Annotation => {
                let (next, acc, enter_method) = annotation_step(self.annotation, token, acc);
                self.annotation = next;
                self.acc = acc;
                if enter_method {
                    self.phase = Phase::Method;
                }
            }
            Phase::Method => {
                let (next, acc, emitted) = method_step(self.method, token, acc);
                self.method = next;
                self.acc = acc;
                if let Some(endpoint) = emitted {
                    self.completed.push(endpoint);
                    self.phase = Phase::Annotation;
                }
            }
        }
    }

    /// Consume the rest of a token stream.
    pub fn run<I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = Token>,
    {
        for token in tokens {
            self.step(&token);
        }
    }

    /// End of stream: build the deduplicated, ordered result set.
    pub fn finish(self) -> BTreeSet<Endpoint> {
        self.completed.into_iter().collect()
    }
}

/// Parse a token stream into the set of endpoints it declares.
pub fn parse_tokens<I>(file: &str, tokens: I) -> BTreeSet<Endpoint>
where
    I: IntoIterator<Item = Token>,
{
    let mut extractor = EndpointExtractor::new(file);
    extractor.run(tokens);
    extractor.finish()
}

/// Parse in-memory source text.
pub fn parse_source(file: &str, source: &str) -> BTreeSet<Endpoint> {
    parse_tokens(file, Lexer::new(source))
}

/// Read and parse one file. I/O failures propagate to the caller; the
/// extraction itself cannot fail.
pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<BTreeSet<Endpoint>> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
    Ok(parse_source(&path.to_string_lossy(), &source))
}
