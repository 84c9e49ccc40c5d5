//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Command descriptor table and handler invocation context

use std::fmt;

/// Signature of a command handler
///
/// `S` is the per-session state the handler operates on, `E` the handler's
/// error type. A handler that succeeds is responsible for producing its own
/// reply.
pub type CommandHandler<S, E> = fn(&mut S, &mut Invocation<'_>) -> Result<(), E>;

/// A named command and its handler
pub struct CommandDescriptor<S, E> {
    name: &'static str,
    handler: CommandHandler<S, E>,
}

impl<S, E> CommandDescriptor<S, E> {
    /// Create a new descriptor
    pub const fn new(name: &'static str, handler: CommandHandler<S, E>) -> Self {
        Self { name, handler }
    }

    /// The command name as registered
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The command handler
    pub fn handler(&self) -> CommandHandler<S, E> {
        self.handler
    }
}

impl<S, E> Clone for CommandDescriptor<S, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            handler: self.handler,
        }
    }
}

impl<S, E> fmt::Debug for CommandDescriptor<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered, immutable list of commands
///
/// Built once and shared read-only between interpreters, typically behind an
/// `Arc`. Lookup returns the first descriptor whose name matches.
///
/// # Example
///
/// ```
/// use uvscp_cmdinterp::{CommandTable, Invocation};
///
/// fn noop(_state: &mut (), _inv: &mut Invocation<'_>) -> Result<(), String> {
///     Ok(())
/// }
///
/// let table = CommandTable::new().with("noop", noop);
/// assert!(table.lookup("NOOP", true).is_some());
/// assert!(table.lookup("NOOP", false).is_none());
/// ```
pub struct CommandTable<S, E> {
    commands: Vec<CommandDescriptor<S, E>>,
}

impl<S, E> CommandTable<S, E> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Append a command
    pub fn with(mut self, name: &'static str, handler: CommandHandler<S, E>) -> Self {
        self.commands.push(CommandDescriptor::new(name, handler));
        self
    }

    /// Find the descriptor for a command token
    pub fn lookup(&self, token: &str, fold_case: bool) -> Option<&CommandDescriptor<S, E>> {
        self.commands.iter().find(|descriptor| {
            if fold_case {
                descriptor.name.eq_ignore_ascii_case(token)
            } else {
                descriptor.name == token
            }
        })
    }

    /// Registered command names in table order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|descriptor| descriptor.name)
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the table has no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<S, E> Default for CommandTable<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> fmt::Debug for CommandTable<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Arguments and options of one handler call
#[derive(Debug)]
pub struct Invocation<'a> {
    command: &'static str,
    args: &'a [&'a str],
    record_history: bool,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(command: &'static str, args: &'a [&'a str]) -> Self {
        Self {
            command,
            args,
            record_history: true,
        }
    }

    /// Name of the matched command, as registered in the table
    pub fn command(&self) -> &'static str {
        self.command
    }

    /// Arguments following the command token
    pub fn args(&self) -> &'a [&'a str] {
        self.args
    }

    /// Argument at `index`, if present
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }

    /// Number of arguments
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// Keep this line out of the repeat history
    pub fn skip_history(&mut self) {
        self.record_history = false;
    }

    /// Whether the line will be recorded for repeat
    pub fn records_history(&self) -> bool {
        self.record_history
    }
}
