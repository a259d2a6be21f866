//! A suspendable driver for [`HTMLParser`].
//!
//! [§ 13.2.6.4.8](https://html.spec.whatwg.org/multipage/parsing.html#scriptEndTag):
//! a `</script>` end tag is a point where a browser may run the script,
//! which can write more markup into the input stream or block the parser
//! until some outside event. [`ParserController`] models both without threads:
//! suspending just means the loop stops calling [`HTMLParser::step`].

use std::mem;

use thiserror::Error;

use crate::parser::{HTMLParser, ParserStep};
use crate::tree_sink::TreeSink;

/// Misuse of the controller's suspend/resume protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// `suspend()` was called while already suspended.
    #[error("parser is already suspended")]
    AlreadySuspended,
    /// `resume()` was called while not suspended.
    #[error("parser is not suspended")]
    NotSuspended,
}

/// Called with each script element as its end tag is processed.
pub type ScriptHandler<S> = Box<dyn FnMut(&mut ParserController<S>, <S as TreeSink>::Handle)>;

/// Called once the end-of-file token has been processed.
pub type DoneCallback<S> = Box<dyn FnOnce(&S, &<S as TreeSink>::Handle)>;

/// Drives an [`HTMLParser`] and lets script handlers suspend it, resume it
/// and write markup at the insertion point.
pub struct ParserController<S: TreeSink> {
    parser: HTMLParser<S>,
    suspended: bool,
    /// Whether the parse loop is on the call stack.
    running: bool,
    /// Whether a script handler is on the call stack.
    in_script: bool,
    script_handler: Option<ScriptHandler<S>>,
    done_callbacks: Vec<DoneCallback<S>>,
}

impl<S: TreeSink> ParserController<S> {
    /// Wrap `parser`. Nothing is parsed until input arrives.
    #[must_use]
    pub fn new(parser: HTMLParser<S>) -> Self {
        Self {
            parser,
            suspended: false,
            running: false,
            in_script: false,
            script_handler: None,
            done_callbacks: Vec::new(),
        }
    }

    /// Register the handler run at each script suspension point. Without one,
    /// scripts are skipped.
    pub fn on_script(&mut self, handler: impl FnMut(&mut Self, S::Handle) + 'static) {
        self.script_handler = Some(Box::new(handler));
    }

    /// Feed markup. From inside a script handler the markup is inserted at
    /// the tokenizer's cursor (`document.write`); otherwise it is appended.
    pub fn write(&mut self, html: &str) {
        if self.in_script {
            self.parser.insert_at_cursor(html);
        } else {
            self.parser.write(html);
        }
        self.pump();
    }

    /// Mark the end of the input and parse whatever remains.
    pub fn end(&mut self) {
        self.parser.end();
        self.pump();
    }

    /// Stop the parse loop after the current token.
    ///
    /// # Errors
    ///
    /// [`ControllerError::AlreadySuspended`] if the parser is already suspended.
    pub fn suspend(&mut self) -> Result<(), ControllerError> {
        if self.suspended {
            return Err(ControllerError::AlreadySuspended);
        }
        log::debug!(target: "weft_html::controller", "suspended");
        self.suspended = true;
        Ok(())
    }

    /// Continue a suspended parse. If the loop is already running (a handler
    /// suspended and resumed synchronously) this only clears the flag and the
    /// running loop carries on.
    ///
    /// # Errors
    ///
    /// [`ControllerError::NotSuspended`] if the parser is not suspended.
    pub fn resume(&mut self) -> Result<(), ControllerError> {
        if !self.suspended {
            return Err(ControllerError::NotSuspended);
        }
        log::debug!(target: "weft_html::controller", "resumed");
        self.suspended = false;
        self.pump();
        Ok(())
    }

    /// Run `callback` once parsing has finished; immediately if it already has.
    pub fn done(&mut self, callback: impl FnOnce(&S, &S::Handle) + 'static) {
        if self.is_finished() {
            callback(self.parser.sink(), self.parser.document());
        } else {
            self.done_callbacks.push(Box::new(callback));
        }
    }

    /// Whether the parser is suspended.
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Whether the end-of-file token has been processed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.parser.is_stopped()
    }

    /// The wrapped parser.
    #[must_use]
    pub const fn parser(&self) -> &HTMLParser<S> {
        &self.parser
    }

    /// Give back the sink and the parse result (see [`HTMLParser::finish`]).
    #[must_use]
    pub fn finish(self) -> (S, S::Handle) {
        self.parser.finish()
    }

    /// The parse loop. At most one instance runs per controller.
    fn pump(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        while !self.suspended {
            match self.parser.step() {
                ParserStep::Continue => {}
                ParserStep::NeedMoreInput => break,
                ParserStep::Script(script) => self.run_script(script),
                ParserStep::Finished => {
                    for callback in mem::take(&mut self.done_callbacks) {
                        callback(self.parser.sink(), self.parser.document());
                    }
                    break;
                }
            }
        }
        self.running = false;
    }

    fn run_script(&mut self, script: S::Handle) {
        let Some(mut handler) = self.script_handler.take() else {
            return;
        };
        log::trace!(target: "weft_html::controller", "running script {script:?}");
        let was_in_script = mem::replace(&mut self.in_script, true);
        handler(self, script);
        self.in_script = was_in_script;
        // A handler may have registered a replacement for itself.
        if self.script_handler.is_none() {
            self.script_handler = Some(handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use weft_dom::DomTree;

    use super::*;
    use crate::dump::dump_tree;
    use crate::options::ParserOptions;

    fn controller() -> ParserController<DomTree> {
        ParserController::new(HTMLParser::new(DomTree::new(), ParserOptions::default()))
    }

    #[test]
    fn test_suspend_twice_is_an_error() {
        let mut controller = controller();
        assert_eq!(controller.suspend(), Ok(()));
        assert_eq!(controller.suspend(), Err(ControllerError::AlreadySuspended));
    }

    #[test]
    fn test_resume_without_suspend_is_an_error() {
        let mut controller = controller();
        assert_eq!(controller.resume(), Err(ControllerError::NotSuspended));
    }

    #[test]
    fn test_suspended_parser_waits_for_resume() {
        let mut controller = controller();
        controller.on_script(|controller, _| {
            controller.suspend().unwrap();
        });
        controller.write("<script>x</script><p>after</p>");
        controller.end();
        assert!(controller.is_suspended());
        assert!(!controller.is_finished());

        controller.resume().unwrap();
        assert!(controller.is_finished());
        let (tree, document) = controller.finish();
        assert!(dump_tree(&tree, &document).contains("\"after\""));
    }

    #[test]
    fn test_document_write_inserts_at_cursor() {
        let mut controller = controller();
        controller.on_script(|controller, _| controller.write("<b>written</b>"));
        controller.write("<script>document.write()</script><i>later</i>");
        controller.end();
        let (tree, document) = controller.finish();
        let dump = dump_tree(&tree, &document);
        let written = dump.find("<b>").unwrap();
        let later = dump.find("<i>").unwrap();
        assert!(written < later, "{dump}");
    }

    #[test]
    fn test_nested_resume_does_not_reenter() {
        let scripts = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&scripts);
        let mut controller = controller();
        controller.on_script(move |controller, _| {
            *seen.borrow_mut() += 1;
            controller.suspend().unwrap();
            controller.resume().unwrap();
        });
        controller.write("<script>1</script><script>2</script>");
        controller.end();
        assert!(controller.is_finished());
        assert_eq!(*scripts.borrow(), 2);
    }

    #[test]
    fn test_done_callbacks_run_once_finished() {
        let called = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&called);
        let mut controller = controller();
        controller.done(move |tree, document| {
            *flag.borrow_mut() = !tree.children(*document).is_empty();
        });
        controller.write("<p>hi");
        assert!(!*called.borrow());
        controller.end();
        assert!(*called.borrow());
    }

    #[test]
    fn test_done_after_finish_runs_immediately() {
        let calls = Rc::new(RefCell::new(0));
        let mut controller = controller();
        controller.write("<p>hi");
        controller.end();
        assert!(controller.is_finished());
        assert!(controller.parser().is_stopped());

        let counter = Rc::clone(&calls);
        controller.done(move |_, _| *counter.borrow_mut() += 1);
        assert_eq!(*calls.borrow(), 1);

        controller.end();
        assert!(controller.is_finished());
        assert_eq!(*calls.borrow(), 1);
    }
}
