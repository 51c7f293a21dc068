// src/process/command_line.rs

//! Tokenizing `startCommand` strings.

/// Split a command line on spaces, keeping double-quoted substrings together
/// as single tokens (with the quotes stripped).
///
/// This is intentionally simplified and documented as such: there is no
/// escaped-quote or nested-quote handling, and an unterminated quote simply
/// runs to the end of the string. Operators rely on exactly this behaviour,
/// so full shell parsing is out of scope.
///
/// Runs of spaces produce no empty tokens; an empty or all-space input
/// yields an empty vector.
pub fn split_command(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_token = false;

    for ch in command.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            ' ' if !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    tokens
}
