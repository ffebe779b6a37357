use std::rc::Rc;

use tracing::{debug, trace};

use crate::{
    ast::{Block, Expr, Reference, is_truthy},
    error::RuntimeError,
    interpreter::evaluator::core::{Context, EvalResult, Signal},
};

/// Where a statement sequence stands within an `if`/`elif`/`else` chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// A branch of the current chain already ran.
    Taken,
    /// Every condition of the current chain so far was false.
    NotTaken,
    /// The previous statement was not part of a chain.
    Inactive,
}

impl Context {
    pub(in crate::interpreter::evaluator) fn execute_if(&mut self,
                                                        condition: &Expr,
                                                        body: &Block,
                                                        chain: &mut ChainState,
                                                        line: usize)
                                                        -> EvalResult<Signal> {
        if is_truthy(self.symbols.evaluate(condition, line)?) {
            *chain = ChainState::Taken;
            self.execute_block(body)
        } else {
            *chain = ChainState::NotTaken;
            Ok(Signal::Continue)
        }
    }

    pub(in crate::interpreter::evaluator) fn execute_elif(&mut self,
                                                          condition: &Expr,
                                                          body: &Block,
                                                          chain: &mut ChainState,
                                                          line: usize)
                                                          -> EvalResult<Signal> {
        match *chain {
            ChainState::NotTaken => self.execute_if(condition, body, chain, line),
            ChainState::Taken | ChainState::Inactive => Ok(Signal::Continue),
        }
    }

    pub(in crate::interpreter::evaluator) fn execute_else(&mut self,
                                                          body: &Block,
                                                          chain: &mut ChainState)
                                                          -> EvalResult<Signal> {
        let run = *chain == ChainState::NotTaken;
        *chain = ChainState::Inactive;
        if run {
            self.execute_block(body)
        } else {
            Ok(Signal::Continue)
        }
    }

    /// Runs `body` while the live counter is positive, decrementing it after
    /// every iteration.
    ///
    /// The counter reference is resolved again on every check, so a counter
    /// like `xs[i]` follows changes to `i` made by the body.
    pub(in crate::interpreter::evaluator) fn execute_loop(&mut self,
                                                          counter: &Reference,
                                                          body: &Block,
                                                          line: usize)
                                                          -> EvalResult<Signal> {
        trace!(line, "entering counted loop");
        loop {
            let location = self.symbols.locate(counter, line)?;
            if !is_truthy(self.symbols.load(location, line)?) {
                break;
            }
            match self.execute_block(body)? {
                Signal::Continue => {},
                Signal::Leave => break,
                Signal::Exit => return Ok(Signal::Exit),
            }
            let location = self.symbols.locate(counter, line)?;
            let value = self.symbols.load(location, line)?;
            self.symbols.store(location, value - 1.0, line)?;
        }
        Ok(Signal::Continue)
    }

    /// Runs `body` as many times as `count` evaluates to when the loop
    /// starts.
    pub(in crate::interpreter::evaluator) fn execute_silent_loop(&mut self,
                                                                 count: &Expr,
                                                                 body: &Block,
                                                                 line: usize)
                                                                 -> EvalResult<Signal> {
        let mut remaining = self.symbols.evaluate(count, line)?;
        trace!(line, remaining, "entering silent loop");
        while is_truthy(remaining) {
            match self.execute_block(body)? {
                Signal::Continue => {},
                Signal::Leave => break,
                Signal::Exit => return Ok(Signal::Exit),
            }
            remaining -= 1.0;
        }
        Ok(Signal::Continue)
    }

    pub(in crate::interpreter::evaluator) fn execute_while(&mut self,
                                                           condition: &Expr,
                                                           body: &Block,
                                                           line: usize)
                                                           -> EvalResult<Signal> {
        trace!(line, "entering while loop");
        while is_truthy(self.symbols.evaluate(condition, line)?) {
            match self.execute_block(body)? {
                Signal::Continue => {},
                Signal::Leave => break,
                Signal::Exit => return Ok(Signal::Exit),
            }
        }
        Ok(Signal::Continue)
    }

    /// Makes a function callable.
    ///
    /// Executing the same declaration again is harmless. A different body
    /// under an existing name is rejected.
    pub(in crate::interpreter::evaluator) fn declare_function(&mut self,
                                                              name: &str,
                                                              body: &Rc<Block>,
                                                              line: usize)
                                                              -> EvalResult<()> {
        if let Some(existing) = self.functions.get(name) {
            if Rc::ptr_eq(existing, body) {
                return Ok(());
            }
            return Err(RuntimeError::FunctionAlreadyDefined { name: name.to_string(),
                                                              line });
        }
        debug!(name, line, "declared function");
        self.functions.insert(name.to_string(), Rc::clone(body));
        Ok(())
    }

    /// Runs a declared function body. `leave` inside the body returns to the
    /// caller.
    pub(in crate::interpreter::evaluator) fn call_function(&mut self,
                                                           name: &str,
                                                           line: usize)
                                                           -> EvalResult<Signal> {
        let body = self.functions
                       .get(name)
                       .cloned()
                       .ok_or_else(|| RuntimeError::UnknownFunction { name: name.to_string(),
                                                                      line })?;
        trace!(name, line, "calling function");
        match self.execute_block(&body)? {
            Signal::Exit => Ok(Signal::Exit),
            Signal::Continue | Signal::Leave => Ok(Signal::Continue),
        }
    }
}
