// sqldiff-generate/src/split.rs
// ============================================================================
// Module: SQL Script Splitting
// Description: Splits SQL text into individual statements.
// Purpose: Feed scripts to endpoints one statement at a time.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Statements are separated by `;` outside of quoted strings, quoted
//! identifiers, line comments, and block comments. Pieces that contain only
//! whitespace or comments are dropped; kept pieces are trimmed. Bodies that
//! themselves contain `;` (such as `CREATE TRIGGER ... BEGIN ... END`) are not
//! recognized and split at each inner semicolon.

// ============================================================================
// SECTION: Splitting
// ============================================================================

/// Splits `sql` into trimmed, non-empty statements without the trailing `;`.
#[must_use]
pub fn split_statements(sql: &str) -> Vec<String> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut meaningful = false;
    let mut index = 0;

    while index < bytes.len() {
        match bytes[index] {
            quote @ (b'\'' | b'"' | b'`') => {
                meaningful = true;
                index = skip_quoted(bytes, index, quote);
            }
            b'-' if bytes.get(index + 1) == Some(&b'-') => {
                index += 2;
                while index < bytes.len() && bytes[index] != b'\n' {
                    index += 1;
                }
            }
            b'/' if bytes.get(index + 1) == Some(&b'*') => {
                index += 2;
                while index < bytes.len()
                    && !(bytes[index] == b'*' && bytes.get(index + 1) == Some(&b'/'))
                {
                    index += 1;
                }
                index = (index + 2).min(bytes.len());
            }
            b';' => {
                if meaningful {
                    statements.push(sql[start..index].trim().to_string());
                }
                index += 1;
                start = index;
                meaningful = false;
            }
            byte => {
                if !byte.is_ascii_whitespace() {
                    meaningful = true;
                }
                index += 1;
            }
        }
    }

    if meaningful {
        statements.push(sql[start..].trim().to_string());
    }
    statements
}

/// Returns the index just past the quoted run opened at `open`. A doubled
/// quote character is an escape; an unterminated quote runs to the end.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut index = open + 1;
    while index < bytes.len() {
        if bytes[index] == quote {
            if bytes.get(index + 1) == Some(&quote) {
                index += 2;
                continue;
            }
            return index + 1;
        }
        index += 1;
    }
    bytes.len()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
