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

//! # Line Command Interpreter
//!
//! A resumable tokenizer and dispatcher for line oriented text protocols.
//!
//! Each connection owns a [`CommandInterpreter`]; all of them share one
//! immutable [`CommandTable`]. Bytes are handed to
//! [`CommandInterpreter::feed`] through any [`bytes::Buf`] cursor as they
//! arrive from the socket. Once a line feed completes a line, the first
//! token selects a handler and the remaining tokens become its arguments.
//!
//! The interpreter keeps a single history slot holding the last line that
//! completed successfully. The repeat token (`+` by default) replays it.
//! Handlers may call [`Invocation::skip_history`] to keep their line out of
//! that slot.
//!
//! Failures that the interpreter detects itself (overlong lines, empty
//! input, unknown commands, repeat without history) and failures returned
//! by handlers are both reported through [`InterpreterError`].

mod config;
mod interpreter;
mod result;
mod table;

pub use self::config::InterpreterConfig;
pub use self::interpreter::CommandInterpreter;
pub use self::result::{InterpreterError, InterpreterResult};
pub use self::table::{CommandDescriptor, CommandHandler, CommandTable, Invocation};
