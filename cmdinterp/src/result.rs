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

//! Error types for the command interpreter

use thiserror::Error;

/// Result type for interpreter operations
pub type InterpreterResult<T, E> = Result<T, InterpreterError<E>>;

/// Outcome of a line that did not complete successfully
///
/// `E` is the error type returned by command handlers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpreterError<E> {
    /// The line held more printable characters than allowed
    #[error("Line too long")]
    LineTooLong,

    /// The line contained no tokens
    #[error("No input")]
    EmptyInput,

    /// The first token matched no command
    #[error("Unknown command '{0}'")]
    InvalidCommand(String),

    /// A repeat was requested before any line was recorded
    #[error("No command to repeat")]
    NoHistory,

    /// The handler rejected the command
    #[error("{0}")]
    Command(E),
}

impl<E> InterpreterError<E> {
    /// Check if the error was raised by the interpreter itself rather than a handler
    pub fn is_syntax_error(&self) -> bool {
        !matches!(self, InterpreterError::Command(_))
    }

    /// The handler error, if any
    pub fn into_command_error(self) -> Option<E> {
        match self {
            InterpreterError::Command(error) => Some(error),
            _ => None,
        }
    }
}
