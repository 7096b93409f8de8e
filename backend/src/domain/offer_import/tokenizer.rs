//! Delimited line tokenizer with double-quote escaping.
//!
//! Quoted tokens may contain the delimiter; a doubled quote inside a quoted
//! token yields one literal quote. Token count is strict.

use super::RecordError;

const QUOTE: char = '"';

/// Splits one physical line into exactly `expected` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedLineTokenizer {
    delimiter: char,
    expected: usize,
}

impl DelimitedLineTokenizer {
    /// Build a tokenizer for `expected` columns separated by `delimiter`.
    ///
    /// Returns `None` when the delimiter is the quote character or a line
    /// break.
    pub fn new(delimiter: char, expected: usize) -> Option<Self> {
        if matches!(delimiter, QUOTE | '\n' | '\r') {
            return None;
        }
        Some(Self {
            delimiter,
            expected,
        })
    }

    pub(crate) const fn comma_separated(expected: usize) -> Self {
        Self {
            delimiter: ',',
            expected,
        }
    }

    /// Column separator.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Split `line` into tokens.
    ///
    /// # Examples
    /// ```
    /// use restaurant_backend::domain::offer_import::DelimitedLineTokenizer;
    ///
    /// let tokenizer = DelimitedLineTokenizer::new(',', 3).unwrap();
    /// let tokens = tokenizer.tokenize(r#"a,"b, ""c""",d"#).unwrap();
    /// assert_eq!(tokens, vec!["a", r#"b, "c""#, "d"]);
    /// ```
    pub fn tokenize(&self, line: &str) -> Result<Vec<String>, RecordError> {
        let tokens = self.split(line)?;
        if tokens.len() != self.expected {
            return Err(RecordError::IncorrectTokenCount {
                expected: self.expected,
                actual: tokens.len(),
            });
        }
        Ok(tokens)
    }

    fn split(&self, line: &str) -> Result<Vec<String>, RecordError> {
        if line.is_empty() {
            return Ok(Vec::new());
        }

        let mut tokens = Vec::with_capacity(self.expected);
        let mut current = String::new();
        let mut chars = line.chars().peekable();
        let mut at_token_start = true;

        while let Some(ch) = chars.next() {
            if at_token_start && ch == QUOTE {
                at_token_start = false;
                loop {
                    match chars.next() {
                        Some(QUOTE) if chars.peek() == Some(&QUOTE) => {
                            chars.next();
                            current.push(QUOTE);
                        }
                        Some(QUOTE) => break,
                        Some(other) => current.push(other),
                        None => {
                            return Err(RecordError::malformed_line("unterminated quoted token"));
                        }
                    }
                }
                match chars.peek() {
                    None => {}
                    Some(&next) if next == self.delimiter => {}
                    Some(_) => {
                        return Err(RecordError::malformed_line(
                            "unexpected character after closing quote",
                        ));
                    }
                }
            } else if ch == self.delimiter {
                tokens.push(std::mem::take(&mut current));
                at_token_start = true;
            } else {
                at_token_start = false;
                current.push(ch);
            }
        }
        tokens.push(current);
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    //! Tokenizer edge cases.
    use super::*;
    use rstest::rstest;

    fn offer_tokenizer() -> DelimitedLineTokenizer {
        DelimitedLineTokenizer::new(',', 7).expect("comma is a valid delimiter")
    }

    #[rstest]
    fn splits_plain_line() {
        let tokens = offer_tokenizer()
            .tokenize("a,b,OK,1,2,3,9.5")
            .expect("seven tokens");
        assert_eq!(tokens, vec!["a", "b", "OK", "1", "2", "3", "9.5"]);
    }

    #[rstest]
    fn keeps_empty_tokens() {
        let tokens = offer_tokenizer()
            .tokenize("a,,OK,1,,,9.5")
            .expect("seven tokens");
        assert_eq!(tokens[1], "");
        assert_eq!(tokens[4], "");
    }

    #[rstest]
    #[case("bad-line-too-few-tokens", 1)]
    #[case("", 0)]
    #[case("a,b,c,d,e,f,g,h", 8)]
    fn reports_wrong_token_count(#[case] line: &str, #[case] actual: usize) {
        let err = offer_tokenizer().tokenize(line).expect_err("wrong count");
        assert_eq!(
            err,
            RecordError::IncorrectTokenCount {
                expected: 7,
                actual
            }
        );
    }

    #[rstest]
    #[case(r#""unterminated,b,OK,1,2,3,9.5"#)]
    #[case(r#""closed"x,b,OK,1,2,3,9.5"#)]
    fn reports_broken_quoting(#[case] line: &str) {
        let err = offer_tokenizer().tokenize(line).expect_err("malformed");
        assert!(matches!(err, RecordError::MalformedLine { .. }));
    }

    #[rstest]
    fn honours_custom_delimiter() {
        let tokenizer = DelimitedLineTokenizer::new(';', 2).expect("semicolon");
        let tokens = tokenizer.tokenize("a,b;c").expect("two tokens");
        assert_eq!(tokens, vec!["a,b", "c"]);
    }

    #[rstest]
    #[case('"')]
    #[case('\n')]
    fn rejects_reserved_delimiters(#[case] delimiter: char) {
        assert!(DelimitedLineTokenizer::new(delimiter, 7).is_none());
    }
}
