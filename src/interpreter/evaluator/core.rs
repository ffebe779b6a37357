use std::{
    collections::HashMap,
    io::{self, BufRead, Write},
    rc::Rc,
};

use tracing::debug;

use crate::{
    ast::{Block, Program, Statement, StatementKind},
    error::RuntimeError,
    interpreter::{
        evaluator::control::ChainState,
        symbols::{ARGUMENTS_LIST, Symbols},
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// How a statement sequence finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Ran to the end; carry on with the next statement.
    Continue,
    /// `leave` was executed; unwind to the nearest loop or function body.
    Leave,
    /// `exit` was executed; unwind the whole program.
    Exit,
}

/// Stores the runtime state of one program run.
///
/// This struct holds every scalar, list and matrix, the declared functions
/// and the console streams used by `input`, `print` and friends.
///
/// ## Usage
///
/// A `Context` is created once, handed to the parser so declarations land in
/// its symbol tables, and then used to execute the parsed program.
pub struct Context {
    /// Scalars, lists and matrices.
    pub symbols:   Symbols,
    /// Function bodies by name, filled as `funct` statements execute.
    pub functions: HashMap<String, Rc<Block>>,
    pub(in crate::interpreter::evaluator) input:  Box<dyn BufRead>,
    pub(in crate::interpreter::evaluator) output: Box<dyn Write>,
}

#[allow(clippy::new_without_default)]
impl Context {
    /// Creates a context that reads from standard input and writes to
    /// standard output.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(io::stdin().lock(), io::stdout())
    }

    /// Creates a context with custom console streams.
    ///
    /// # Example
    /// ```
    /// use std::io::Cursor;
    ///
    /// use sqbra::interpreter::evaluator::core::Context;
    ///
    /// let context = Context::with_io(Cursor::new("42\n"), Vec::new());
    /// assert!(context.functions.is_empty());
    /// ```
    #[must_use]
    pub fn with_io(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self { symbols:   Symbols::new(),
               functions: HashMap::new(),
               input:     Box::new(input),
               output:    Box::new(output), }
    }

    /// Fills the reserved `args` list with command-line numbers.
    ///
    /// # Example
    /// ```
    /// use sqbra::interpreter::evaluator::core::Context;
    ///
    /// let context = Context::new().with_arguments(vec![1.0, 2.5]);
    /// assert_eq!(context.symbols.list_values("args"), Some(&[1.0, 2.5][..]));
    /// ```
    #[must_use]
    pub fn with_arguments(mut self, values: Vec<f64>) -> Self {
        let list = self.symbols
                       .declare_list(ARGUMENTS_LIST, 0)
                       .or_else(|_| self.symbols.resolve_list(ARGUMENTS_LIST, 0));
        if let Ok(list) = list {
            *self.symbols.list_mut(list) = values;
        }
        self
    }

    /// Runs a parsed program to completion.
    ///
    /// Both `exit` and a top-level `leave` end the program normally. Output
    /// is flushed before returning.
    ///
    /// # Errors
    /// Returns the first runtime error raised by any statement.
    pub fn execute_program(&mut self, program: &Program) -> EvalResult<()> {
        let signal = self.execute_block(program);
        let flushed = self.output.flush();
        let signal = signal?;
        debug!(?signal, "program finished");
        flushed.map_err(|e| RuntimeError::OutputFlush { details: e.to_string() })
    }

    /// Executes a statement sequence in order.
    ///
    /// Every sequence tracks its own `if`/`elif`/`else` chain, so nested
    /// blocks never disturb the chain of the block around them.
    ///
    /// # Returns
    /// [`Signal::Continue`] when every statement ran, otherwise the signal
    /// that stopped the sequence early.
    pub fn execute_block(&mut self, block: &Block) -> EvalResult<Signal> {
        let mut chain = ChainState::Inactive;
        for statement in &block.statements {
            let signal = self.execute(statement, &mut chain)?;
            if signal != Signal::Continue {
                return Ok(signal);
            }
        }
        Ok(Signal::Continue)
    }

    fn execute(&mut self, statement: &Statement, chain: &mut ChainState) -> EvalResult<Signal> {
        let line = statement.line;
        match &statement.kind {
            StatementKind::If { condition, body } => self.execute_if(condition, body, chain, line),
            StatementKind::Elif { condition, body } => {
                self.execute_elif(condition, body, chain, line)
            },
            StatementKind::Else { body } => self.execute_else(body, chain),
            kind => {
                *chain = ChainState::Inactive;
                self.execute_statement(kind, line)
            },
        }
    }

    fn execute_statement(&mut self, kind: &StatementKind, line: usize) -> EvalResult<Signal> {
        match kind {
            StatementKind::Loop { counter, body } => self.execute_loop(counter, body, line),
            StatementKind::SilentLoop { count, body } => {
                self.execute_silent_loop(count, body, line)
            },
            StatementKind::InitLoop { counter,
                                      initial,
                                      body, } => {
                let value = self.symbols.evaluate(initial, line)?;
                self.symbols.assign(counter, value, line)?;
                self.execute_loop(counter, body, line)
            },
            StatementKind::While { condition, body } => self.execute_while(condition, body, line),
            StatementKind::DeclareFunction { name, body } => {
                self.declare_function(name, body, line)?;
                Ok(Signal::Continue)
            },
            StatementKind::Call { name } => self.call_function(name, line),
            StatementKind::Exit => Ok(Signal::Exit),
            StatementKind::Leave => Ok(Signal::Leave),
            command => {
                self.execute_command(command, line)?;
                Ok(Signal::Continue)
            },
        }
    }
}
