use crate::error::TidyError;
use crate::tree::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    String,
    Number,
    Null,
    True,
    False,
    BlockComment,
    LineComment,
    BlankLine,
    Comma,
    Colon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

/// Cursor over the input characters.
///
/// `Position.index` counts characters, not bytes; `byte_offsets` maps a
/// character index back to its byte offset so token text can be sliced out
/// of the original string.
struct Scanner {
    text: String,
    chars: Vec<char>,
    byte_offsets: Vec<usize>,
    at: Position,
    token_start: Position,
    content_on_line: bool,
}

impl Scanner {
    fn new(input: &str) -> Self {
        let mut chars = Vec::new();
        let mut byte_offsets = Vec::new();
        for (offset, ch) in input.char_indices() {
            byte_offsets.push(offset);
            chars.push(ch);
        }
        byte_offsets.push(input.len());

        Self {
            text: input.to_string(),
            chars,
            byte_offsets,
            at: Position::default(),
            token_start: Position::default(),
            content_on_line: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.at.index).copied()
    }

    fn at_end(&self) -> bool {
        self.at.index >= self.chars.len()
    }

    fn advance(&mut self, is_whitespace: bool) {
        self.at.index += 1;
        self.at.column += 1;
        if !is_whitespace {
            self.content_on_line = true;
        }
    }

    fn next_line(&mut self) {
        self.at.index += 1;
        self.at.row += 1;
        self.at.column = 0;
        self.content_on_line = false;
    }

    fn mark_token_start(&mut self) {
        self.token_start = self.at;
    }

    /// Token whose text is the input slice from the marked start to the
    /// cursor.
    fn token_from_slice(&self, kind: TokenKind, trim_end: bool) -> Token {
        let start = self.byte_offsets[self.token_start.index];
        let end = self.byte_offsets[self.at.index];
        let mut text = &self.text[start..end];
        if trim_end {
            text = text.trim_end();
        }
        Token {
            kind,
            text: text.to_string(),
            position: self.token_start,
        }
    }

    fn token(&self, kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.to_string(),
            position: self.token_start,
        }
    }

    fn error(&self, message: &str) -> TidyError {
        TidyError::at(message, self.at)
    }
}

/// Iterator producing tokens from JSON-with-comments text.
///
/// Comments and blank lines come out as tokens like everything else; the
/// parser decides what to do with them based on the options.
pub struct Lexer {
    scanner: Scanner,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            scanner: Scanner::new(input),
        }
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, TidyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ch = self.scanner.peek()?;
            match ch {
                ' ' | '\t' | '\r' => self.scanner.advance(true),
                '\n' => {
                    let was_blank = !self.scanner.content_on_line;
                    self.scanner.mark_token_start();
                    self.scanner.next_line();
                    if was_blank {
                        return Some(Ok(self.scanner.token(TokenKind::BlankLine, "\n")));
                    }
                }
                '{' => return Some(Ok(punct(&mut self.scanner, TokenKind::BeginObject, "{"))),
                '}' => return Some(Ok(punct(&mut self.scanner, TokenKind::EndObject, "}"))),
                '[' => return Some(Ok(punct(&mut self.scanner, TokenKind::BeginArray, "["))),
                ']' => return Some(Ok(punct(&mut self.scanner, TokenKind::EndArray, "]"))),
                ':' => return Some(Ok(punct(&mut self.scanner, TokenKind::Colon, ":"))),
                ',' => return Some(Ok(punct(&mut self.scanner, TokenKind::Comma, ","))),
                't' => return Some(keyword(&mut self.scanner, TokenKind::True, "true")),
                'f' => return Some(keyword(&mut self.scanner, TokenKind::False, "false")),
                'n' => return Some(keyword(&mut self.scanner, TokenKind::Null, "null")),
                '/' => return Some(scan_comment(&mut self.scanner)),
                '"' => return Some(scan_string(&mut self.scanner)),
                '-' | '0'..='9' => return Some(scan_number(&mut self.scanner)),
                _ => return Some(Err(self.scanner.error("Unexpected character"))),
            }
        }
    }
}

fn punct(scanner: &mut Scanner, kind: TokenKind, symbol: &str) -> Token {
    scanner.mark_token_start();
    let token = scanner.token(kind, symbol);
    scanner.advance(false);
    token
}

fn keyword(scanner: &mut Scanner, kind: TokenKind, word: &str) -> Result<Token, TidyError> {
    scanner.mark_token_start();
    for expected in word.chars() {
        match scanner.peek() {
            Some(ch) if ch == expected => scanner.advance(false),
            Some(_) => return Err(scanner.error("Unexpected keyword")),
            None => return Err(scanner.error("Unexpected end of input while processing keyword")),
        }
    }
    Ok(scanner.token(kind, word))
}

fn scan_comment(scanner: &mut Scanner) -> Result<Token, TidyError> {
    scanner.mark_token_start();
    scanner.advance(false);

    let is_block = match scanner.peek() {
        Some('*') => true,
        Some('/') => false,
        _ => return Err(scanner.error("Bad character for start of comment")),
    };
    scanner.advance(false);

    let mut prev_was_asterisk = false;
    loop {
        let Some(ch) = scanner.peek() else {
            if is_block {
                return Err(scanner.error("Unexpected end of input while processing comment"));
            }
            return Ok(scanner.token_from_slice(TokenKind::LineComment, true));
        };

        if ch == '\n' {
            if !is_block {
                return Ok(scanner.token_from_slice(TokenKind::LineComment, true));
            }
            scanner.next_line();
            continue;
        }

        scanner.advance(false);
        if is_block && ch == '/' && prev_was_asterisk {
            return Ok(scanner.token_from_slice(TokenKind::BlockComment, false));
        }
        prev_was_asterisk = ch == '*';
    }
}

fn scan_string(scanner: &mut Scanner) -> Result<Token, TidyError> {
    scanner.mark_token_start();
    scanner.advance(false);

    let mut in_escape = false;
    let mut hex_digits_due = 0usize;
    loop {
        let Some(ch) = scanner.peek() else {
            return Err(scanner.error("Unexpected end of input while processing string"));
        };

        if hex_digits_due > 0 {
            if !ch.is_ascii_hexdigit() {
                return Err(scanner.error("Bad unicode escape in string"));
            }
            hex_digits_due -= 1;
            scanner.advance(false);
            continue;
        }

        if in_escape {
            if !matches!(ch, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u') {
                return Err(scanner.error("Bad escaped character in string"));
            }
            if ch == 'u' {
                hex_digits_due = 4;
            }
            in_escape = false;
            scanner.advance(false);
            continue;
        }

        if is_control(ch) {
            return Err(scanner.error("Control characters are not allowed in strings"));
        }

        scanner.advance(false);
        match ch {
            '"' => return Ok(scanner.token_from_slice(TokenKind::String, false)),
            '\\' => in_escape = true,
            _ => {}
        }
    }
}

/// States of the number recognizer, tracking how much of the grammar
/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?` has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
    Start,
    AfterSign,
    WholeDigits,
    WholeZero,
    AfterDot,
    FractionDigits,
    AfterE,
    AfterExpSign,
    ExponentDigits,
}

fn scan_number(scanner: &mut Scanner) -> Result<Token, TidyError> {
    scanner.mark_token_start();
    let mut state = NumberState::Start;

    loop {
        let ch = match scanner.peek() {
            Some(ch) => ch,
            None => {
                // End of input: accept only if the state is terminal.
                return match state {
                    NumberState::WholeDigits
                    | NumberState::WholeZero
                    | NumberState::FractionDigits
                    | NumberState::ExponentDigits => {
                        Ok(scanner.token_from_slice(TokenKind::Number, false))
                    }
                    _ => Err(scanner.error("Unexpected end of input while processing number")),
                };
            }
        };

        let next = match (state, ch) {
            (NumberState::Start, '-') => Some(NumberState::AfterSign),
            (NumberState::Start | NumberState::AfterSign, '0') => Some(NumberState::WholeZero),
            (NumberState::Start | NumberState::AfterSign, '1'..='9') => {
                Some(NumberState::WholeDigits)
            }
            (NumberState::WholeDigits, '0'..='9') => Some(NumberState::WholeDigits),
            (NumberState::WholeDigits | NumberState::WholeZero, '.') => Some(NumberState::AfterDot),
            (NumberState::WholeDigits | NumberState::WholeZero, 'e' | 'E') => {
                Some(NumberState::AfterE)
            }
            (NumberState::AfterDot | NumberState::FractionDigits, '0'..='9') => {
                Some(NumberState::FractionDigits)
            }
            (NumberState::FractionDigits, 'e' | 'E') => Some(NumberState::AfterE),
            (NumberState::AfterE, '+' | '-') => Some(NumberState::AfterExpSign),
            (
                NumberState::AfterE | NumberState::AfterExpSign | NumberState::ExponentDigits,
                '0'..='9',
            ) => Some(NumberState::ExponentDigits),
            _ => None,
        };

        match next {
            Some(s) => {
                state = s;
                scanner.advance(false);
            }
            None => {
                // A non-number character ends the token if the state is
                // terminal; otherwise the number was malformed.
                return match state {
                    NumberState::WholeDigits
                    | NumberState::WholeZero
                    | NumberState::FractionDigits
                    | NumberState::ExponentDigits => {
                        Ok(scanner.token_from_slice(TokenKind::Number, false))
                    }
                    _ => Err(scanner.error("Bad character while processing number")),
                };
            }
        }
    }
}

fn is_control(ch: char) -> bool {
    let code = u32::from(ch);
    code <= 0x1F || code == 0x7F || (0x80..=0x9F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tokens(input: &str) -> Vec<Token> {
        Lexer::new(input).collect::<Result<Vec<_>, _>>().unwrap()
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        all_tokens(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn simple_array() {
        assert_eq!(
            kinds("[1, true, null]"),
            vec![
                TokenKind::BeginArray,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::True,
                TokenKind::Comma,
                TokenKind::Null,
                TokenKind::EndArray,
            ]
        );
    }

    #[test]
    fn number_forms() {
        for text in ["0", "-0", "12", "-3.5", "1e5", "1.25E-7", "0.0e75"] {
            let tokens = all_tokens(text);
            assert_eq!(tokens.len(), 1, "for {text}");
            assert_eq!(tokens[0].kind, TokenKind::Number);
            assert_eq!(tokens[0].text, text);
        }
    }

    #[test]
    fn malformed_numbers_rejected() {
        for text in ["-", "1.", "1e", "1e+"] {
            let result: Result<Vec<_>, _> = Lexer::new(text).collect();
            assert!(result.is_err(), "expected error for {text}");
        }
    }

    #[test]
    fn leading_zero_splits_into_two_tokens() {
        let tokens = all_tokens("01");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "0");
        assert_eq!(tokens[1].text, "1");
    }

    #[test]
    fn string_with_escapes() {
        let tokens = all_tokens(r#""a\"bAc""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, r#""a\"bAc""#);
    }

    #[test]
    fn unterminated_string_is_error() {
        let result: Result<Vec<_>, _> = Lexer::new("\"abc").collect();
        assert!(result.is_err());
    }

    #[test]
    fn control_char_in_string_is_error() {
        let result: Result<Vec<_>, _> = Lexer::new("\"a\u{0001}b\"").collect();
        assert!(result.is_err());
    }

    #[test]
    fn comments_and_blank_lines() {
        let input = "// top\n\n[1, /* mid */ 2]";
        let kinds = kinds(input);
        assert_eq!(kinds[0], TokenKind::LineComment);
        assert_eq!(kinds[1], TokenKind::BlankLine);
        assert!(kinds.contains(&TokenKind::BlockComment));
    }

    #[test]
    fn line_comment_text_is_trimmed() {
        let tokens = all_tokens("// trailing   \n1");
        assert_eq!(tokens[0].text, "// trailing");
    }

    #[test]
    fn multiline_block_comment_spans_rows() {
        let tokens = all_tokens("/* a\n   b */");
        assert_eq!(tokens[0].kind, TokenKind::BlockComment);
        assert!(tokens[0].text.contains('\n'));
    }

    #[test]
    fn unterminated_block_comment_is_error() {
        let result: Result<Vec<_>, _> = Lexer::new("/* nope").collect();
        assert!(result.is_err());
    }

    #[test]
    fn positions_track_rows_and_columns() {
        let tokens = all_tokens("[\n  42]");
        assert_eq!(tokens[0].position, Position { index: 0, row: 0, column: 0 });
        let num = &tokens[1];
        assert_eq!(num.kind, TokenKind::Number);
        assert_eq!(num.position.row, 1);
        assert_eq!(num.position.column, 2);
    }

    #[test]
    fn consecutive_blank_lines_each_tokenize() {
        let kinds = kinds("1\n\n\n");
        assert_eq!(
            kinds,
            vec![TokenKind::Number, TokenKind::BlankLine, TokenKind::BlankLine]
        );
    }
}
