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

//! Interpreter configuration

/// Interpreter configuration
///
/// # Example
///
/// ```
/// use uvscp_cmdinterp::InterpreterConfig;
///
/// let config = InterpreterConfig::default()
///     .with_max_line_length(256)
///     .with_fold_case(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Longest accepted line in printable characters, excluding the terminator
    pub max_line_length: usize,

    /// Number of arguments passed to a handler; further tokens are ignored
    pub max_arguments: usize,

    /// Match command names without regard to ASCII case
    pub fold_case: bool,

    /// Characters separating the command and its arguments
    pub delimiters: String,

    /// Token that replays the last recorded line, if any
    pub repeat_token: Option<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_line_length: 128,
            max_arguments: 10,
            fold_case: true,
            delimiters: " ".to_string(),
            repeat_token: Some("+".to_string()),
        }
    }
}

impl InterpreterConfig {
    /// Set the maximum line length
    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// Set the maximum argument count
    pub fn with_max_arguments(mut self, count: usize) -> Self {
        self.max_arguments = count;
        self
    }

    /// Enable or disable case insensitive command matching
    pub fn with_fold_case(mut self, fold: bool) -> Self {
        self.fold_case = fold;
        self
    }

    /// Set the token delimiters
    pub fn with_delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.delimiters = delimiters.into();
        self
    }

    /// Set or clear the repeat token
    pub fn with_repeat_token(mut self, token: Option<&str>) -> Self {
        self.repeat_token = token.map(str::to_string);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_line_length == 0 {
            return Err("max_line_length must be greater than 0".to_string());
        }
        if self.delimiters.is_empty() {
            return Err("delimiters must not be empty".to_string());
        }
        if self
            .repeat_token
            .as_deref()
            .is_some_and(|token| {
                token.is_empty() || token.contains(|c: char| self.delimiters.contains(c))
            })
        {
            return Err("repeat_token must be a single non-empty token".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InterpreterConfig::default();
        assert_eq!(config.max_line_length, 128);
        assert_eq!(config.max_arguments, 10);
        assert!(config.fold_case);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(
            InterpreterConfig::default()
                .with_max_line_length(0)
                .validate()
                .is_err()
        );
        assert!(
            InterpreterConfig::default()
                .with_delimiters("")
                .validate()
                .is_err()
        );
        assert!(
            InterpreterConfig::default()
                .with_repeat_token(Some("a b"))
                .validate()
                .is_err()
        );
        assert!(
            InterpreterConfig::default()
                .with_repeat_token(None)
                .validate()
                .is_ok()
        );
    }
}
