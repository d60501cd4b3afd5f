use crate::error::TidyError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::options::{CommentPolicy, FormatOptions};
use crate::tree::{Node, NodeKind, Position};

/// One-token lookahead over a fallible token stream.
pub struct TokenCursor<I>
where
    I: Iterator<Item = Result<Token, TidyError>>,
{
    source: I,
    current: Option<Token>,
}

impl<I> TokenCursor<I>
where
    I: Iterator<Item = Result<Token, TidyError>>,
{
    pub fn new(source: I) -> Self {
        Self {
            source,
            current: None,
        }
    }

    pub fn current(&self) -> Result<&Token, TidyError> {
        self.current
            .as_ref()
            .ok_or_else(|| TidyError::new("Illegal token cursor usage"))
    }

    pub fn move_next(&mut self) -> Result<bool, TidyError> {
        match self.source.next() {
            None => {
                self.current = None;
                Ok(false)
            }
            Some(Ok(token)) => {
                self.current = Some(token);
                Ok(true)
            }
            Some(Err(err)) => Err(err),
        }
    }
}

/// Builds a [`Node`] tree from token input, attaching comments to their
/// nearest element and folding blank lines in when the options ask for
/// them.
pub struct Parser {
    pub options: FormatOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeparatorState {
    Empty,
    AfterElement,
    AfterComma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    BeforeName,
    AfterName,
    AfterColon,
    AfterValue,
    AfterComma,
}

impl Parser {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Parses a whole document. With `single_element`, a second data
    /// element at the top level is an error; standalone comments and
    /// blank lines around it are always allowed.
    pub fn parse_top_level(
        &self,
        input: &str,
        single_element: bool,
    ) -> Result<Vec<Node>, TidyError> {
        let mut cursor = TokenCursor::new(Lexer::new(input));
        let mut items: Vec<Node> = Vec::new();
        let mut element_seen = false;

        loop {
            if !cursor.move_next()? {
                return Ok(items);
            }

            let item = self.parse_element(&mut cursor)?;
            match item.kind {
                NodeKind::BlankLine => {
                    if self.options.preserve_blank_lines {
                        items.push(item);
                    }
                }
                NodeKind::LineComment | NodeKind::BlockComment => {
                    match self.options.comment_policy {
                        CommentPolicy::TreatAsError => {
                            return Err(TidyError::at(
                                "Comments not allowed with current options",
                                item.position,
                            ));
                        }
                        CommentPolicy::Preserve => items.push(item),
                        CommentPolicy::Remove => {}
                    }
                }
                _ => {
                    if single_element && element_seen {
                        return Err(TidyError::at(
                            "Unexpected start of second top level element",
                            item.position,
                        ));
                    }
                    items.push(item);
                    element_seen = true;
                }
            }
        }
    }

    fn parse_element<I>(&self, cursor: &mut TokenCursor<I>) -> Result<Node, TidyError>
    where
        I: Iterator<Item = Result<Token, TidyError>>,
    {
        let current = cursor.current()?.clone();
        match current.kind {
            TokenKind::BeginArray => self.parse_array(cursor),
            TokenKind::BeginObject => self.parse_object(cursor),
            _ => Ok(leaf(&current)),
        }
    }

    fn parse_array<I>(&self, cursor: &mut TokenCursor<I>) -> Result<Node, TidyError>
    where
        I: Iterator<Item = Result<Token, TidyError>>,
    {
        debug_assert_eq!(cursor.current()?.kind, TokenKind::BeginArray);
        let start = cursor.current()?.position;

        let mut children: Vec<Node> = Vec::new();
        // Index of the most recent element still eligible to receive a
        // postfix comment, and the row on which that element ended.
        let mut postfix_target: Option<usize> = None;
        let mut postfix_target_row: isize = -1;
        // A block comment whose owner isn't known yet; it becomes a prefix
        // if an element follows on the same line, otherwise it lands as a
        // standalone child.
        let mut drifting_comment: Option<Node> = None;

        let mut separator = SeparatorState::Empty;
        let mut complexity = 0usize;

        loop {
            let token = next_or_eof(cursor, start)?;

            let drifting_must_settle = drifting_comment.as_ref().is_some_and(|c| {
                c.position.row != token.position.row || token.kind == TokenKind::EndArray
            });
            if drifting_must_settle {
                let comment = drifting_comment.take().unwrap();
                match postfix_target {
                    Some(idx) => {
                        let elem = &mut children[idx];
                        elem.is_post_comment_line_style = comment.kind == NodeKind::LineComment;
                        elem.postfix_comment = comment.value;
                    }
                    None => children.push(comment),
                }
            }

            if postfix_target.is_some() && postfix_target_row != token.position.row as isize {
                postfix_target = None;
            }

            match token.kind {
                TokenKind::EndArray => {
                    if separator == SeparatorState::AfterComma && !self.options.allow_trailing_commas
                    {
                        return Err(TidyError::at(
                            "Array may not end with a comma with current options",
                            token.position,
                        ));
                    }
                    break;
                }
                TokenKind::Comma => {
                    if separator != SeparatorState::AfterElement {
                        return Err(TidyError::at("Unexpected comma in array", token.position));
                    }
                    separator = SeparatorState::AfterComma;
                }
                TokenKind::BlankLine => {
                    if self.options.preserve_blank_lines {
                        children.push(leaf(&token));
                    }
                }
                TokenKind::BlockComment => {
                    match self.options.comment_policy {
                        CommentPolicy::Remove => continue,
                        CommentPolicy::TreatAsError => {
                            return Err(TidyError::at(
                                "Comments not allowed with current options",
                                token.position,
                            ));
                        }
                        CommentPolicy::Preserve => {}
                    }

                    // Two ambiguous comments in a row: the earlier one
                    // becomes standalone.
                    if let Some(settled) = drifting_comment.take() {
                        children.push(settled);
                    }

                    let comment = leaf(&token);
                    if comment.value.contains('\n') {
                        children.push(comment);
                        continue;
                    }

                    if let Some(idx) = postfix_target {
                        if separator == SeparatorState::AfterElement {
                            children[idx].postfix_comment = comment.value;
                            children[idx].is_post_comment_line_style = false;
                            postfix_target = None;
                            continue;
                        }
                    }

                    drifting_comment = Some(comment);
                }
                TokenKind::LineComment => {
                    match self.options.comment_policy {
                        CommentPolicy::Remove => continue,
                        CommentPolicy::TreatAsError => {
                            return Err(TidyError::at(
                                "Comments not allowed with current options",
                                token.position,
                            ));
                        }
                        CommentPolicy::Preserve => {}
                    }

                    if let Some(settled) = drifting_comment.take() {
                        children.push(settled);
                        children.push(leaf(&token));
                        continue;
                    }

                    if let Some(idx) = postfix_target {
                        children[idx].postfix_comment = token.text.clone();
                        children[idx].is_post_comment_line_style = true;
                        postfix_target = None;
                        continue;
                    }

                    children.push(leaf(&token));
                }
                TokenKind::False
                | TokenKind::True
                | TokenKind::Null
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::BeginArray
                | TokenKind::BeginObject => {
                    if separator == SeparatorState::AfterElement {
                        return Err(TidyError::at(
                            "Comma missing while processing array",
                            token.position,
                        ));
                    }

                    let mut element = self.parse_element(cursor)?;
                    separator = SeparatorState::AfterElement;
                    complexity = complexity.max(element.complexity + 1);

                    if let Some(prefix) = drifting_comment.take() {
                        element.prefix_comment = prefix.value;
                    }

                    children.push(element);
                    postfix_target = Some(children.len() - 1);
                    postfix_target_row = cursor.current()?.position.row as isize;
                }
                _ => {
                    return Err(TidyError::at("Unexpected token in array", token.position));
                }
            }
        }

        Ok(Node {
            kind: NodeKind::Array,
            position: start,
            complexity,
            children,
            ..Node::default()
        })
    }

    fn parse_object<I>(&self, cursor: &mut TokenCursor<I>) -> Result<Node, TidyError>
    where
        I: Iterator<Item = Result<Token, TidyError>>,
    {
        debug_assert_eq!(cursor.current()?.kind, TokenKind::BeginObject);
        let start = cursor.current()?.position;

        let mut children: Vec<Node> = Vec::new();
        let mut prop_name: Option<Token> = None;
        let mut prop_value: Option<Node> = None;
        let mut value_end_row: isize = -1;
        let mut before_comments: Vec<Node> = Vec::new();
        let mut mid_comments: Vec<Token> = Vec::new();
        let mut after_comment: Option<Node> = None;
        let mut after_comment_followed_comma = false;

        let mut state = ObjectState::BeforeName;
        let mut complexity = 0usize;

        loop {
            let token = next_or_eof(cursor, start)?;

            let on_new_row = value_end_row != token.position.row as isize;
            let closing = token.kind == TokenKind::EndObject;
            let next_prop_starting =
                token.kind == TokenKind::String && state == ObjectState::AfterComma;
            let second_post_comment = after_comment.is_some()
                && matches!(token.kind, TokenKind::BlockComment | TokenKind::LineComment);

            // A completed name/value pair is committed once something
            // shows the property is over: a new row, the closing brace,
            // the next property name, or a second trailing comment.
            if prop_name.is_some()
                && prop_value.is_some()
                && (on_new_row || closing || next_prop_starting || second_post_comment)
            {
                let mut held_for_next: Option<Node> = None;
                if next_prop_starting && after_comment_followed_comma && !on_new_row {
                    held_for_next = after_comment.take();
                }

                let element = prop_value.take().unwrap();
                complexity = complexity.max(element.complexity + 1);
                commit_property(
                    &mut children,
                    prop_name.as_ref().unwrap(),
                    element,
                    value_end_row,
                    &mut before_comments,
                    &mut mid_comments,
                    after_comment.take(),
                );
                prop_name = None;
                before_comments.clear();
                mid_comments.clear();

                if let Some(held) = held_for_next {
                    before_comments.push(held);
                }
            }

            match token.kind {
                TokenKind::BlankLine => {
                    if !self.options.preserve_blank_lines {
                        continue;
                    }
                    if matches!(state, ObjectState::AfterName | ObjectState::AfterColon) {
                        continue;
                    }
                    children.append(&mut before_comments);
                    children.push(leaf(&token));
                }
                TokenKind::BlockComment | TokenKind::LineComment => {
                    match self.options.comment_policy {
                        CommentPolicy::Remove => continue,
                        CommentPolicy::TreatAsError => {
                            return Err(TidyError::at(
                                "Comments not allowed with current options",
                                token.position,
                            ));
                        }
                        CommentPolicy::Preserve => {}
                    }
                    if state == ObjectState::BeforeName || prop_name.is_none() {
                        before_comments.push(leaf(&token));
                    } else if matches!(state, ObjectState::AfterName | ObjectState::AfterColon) {
                        mid_comments.push(token);
                    } else {
                        after_comment = Some(leaf(&token));
                        after_comment_followed_comma = state == ObjectState::AfterComma;
                    }
                }
                TokenKind::EndObject => {
                    if matches!(state, ObjectState::AfterName | ObjectState::AfterColon) {
                        return Err(TidyError::at("Unexpected end of object", token.position));
                    }
                    if state == ObjectState::AfterComma && !self.options.allow_trailing_commas {
                        return Err(TidyError::at(
                            "Object may not end with comma with current options",
                            token.position,
                        ));
                    }
                    break;
                }
                TokenKind::String => match state {
                    ObjectState::BeforeName | ObjectState::AfterComma => {
                        prop_name = Some(token);
                        state = ObjectState::AfterName;
                    }
                    ObjectState::AfterColon => {
                        prop_value = Some(self.parse_element(cursor)?);
                        value_end_row = cursor.current()?.position.row as isize;
                        state = ObjectState::AfterValue;
                    }
                    _ => {
                        return Err(TidyError::at(
                            "Unexpected string found while processing object",
                            token.position,
                        ));
                    }
                },
                TokenKind::False
                | TokenKind::True
                | TokenKind::Null
                | TokenKind::Number
                | TokenKind::BeginArray
                | TokenKind::BeginObject => {
                    if state != ObjectState::AfterColon {
                        return Err(TidyError::at(
                            "Unexpected element while processing object",
                            token.position,
                        ));
                    }
                    prop_value = Some(self.parse_element(cursor)?);
                    value_end_row = cursor.current()?.position.row as isize;
                    state = ObjectState::AfterValue;
                }
                TokenKind::Colon => {
                    if state != ObjectState::AfterName {
                        return Err(TidyError::at(
                            "Unexpected colon while processing object",
                            token.position,
                        ));
                    }
                    state = ObjectState::AfterColon;
                }
                TokenKind::Comma => {
                    if state != ObjectState::AfterValue {
                        return Err(TidyError::at(
                            "Unexpected comma while processing object",
                            token.position,
                        ));
                    }
                    state = ObjectState::AfterComma;
                }
                _ => {
                    return Err(TidyError::at(
                        "Unexpected token while processing object",
                        token.position,
                    ));
                }
            }
        }

        // Leftover standalone comments before the closing brace.
        children.append(&mut before_comments);

        Ok(Node {
            kind: NodeKind::Object,
            position: start,
            complexity,
            children,
            ..Node::default()
        })
    }
}

fn leaf(token: &Token) -> Node {
    Node {
        kind: node_kind(token),
        value: token.text.clone(),
        position: token.position,
        ..Node::default()
    }
}

fn node_kind(token: &Token) -> NodeKind {
    match token.kind {
        TokenKind::False => NodeKind::False,
        TokenKind::True => NodeKind::True,
        TokenKind::Null => NodeKind::Null,
        TokenKind::Number => NodeKind::Number,
        TokenKind::String => NodeKind::String,
        TokenKind::BlankLine => NodeKind::BlankLine,
        TokenKind::BlockComment => NodeKind::BlockComment,
        TokenKind::LineComment => NodeKind::LineComment,
        _ => panic!("Token kind {:?} is not an element", token.kind),
    }
}

fn next_or_eof<I>(cursor: &mut TokenCursor<I>, container_start: Position) -> Result<Token, TidyError>
where
    I: Iterator<Item = Result<Token, TidyError>>,
{
    if !cursor.move_next()? {
        return Err(TidyError::at(
            "Unexpected end of input while processing array or object",
            container_start,
        ));
    }
    Ok(cursor.current()?.clone())
}

/// Attaches a finished property to the child list along with the comments
/// gathered around it: earlier standalone comments first, then the element
/// with its prefix/middle comments, then a same-line trailing comment as
/// its postfix.
fn commit_property(
    children: &mut Vec<Node>,
    name: &Token,
    mut element: Node,
    value_end_row: isize,
    before_comments: &mut Vec<Node>,
    mid_comments: &mut Vec<Token>,
    after_comment: Option<Node>,
) {
    element.name = name.text.clone();

    if !mid_comments.is_empty() {
        let mut combined = String::new();
        for (i, comment) in mid_comments.iter().enumerate() {
            combined.push_str(&comment.text);
            if i < mid_comments.len() - 1 || comment.kind == TokenKind::LineComment {
                combined.push('\n');
            }
        }
        element.middle_comment_has_newline = combined.contains('\n');
        element.middle_comment = combined;
    }

    if let Some(last) = before_comments.pop() {
        // A block comment that ends on the element's own row becomes its
        // prefix; anything else stays standalone.
        if last.kind == NodeKind::BlockComment && last.position.row == element.position.row {
            element.prefix_comment = last.value;
            children.append(before_comments);
        } else {
            children.append(before_comments);
            children.push(last);
        }
    }

    if let Some(after) = after_comment {
        let same_line =
            !after.value.contains('\n') && after.position.row as isize == value_end_row;
        if same_line {
            element.is_post_comment_line_style = after.kind == NodeKind::LineComment;
            element.postfix_comment = after.value;
            children.push(element);
        } else {
            children.push(element);
            children.push(after);
        }
    } else {
        children.push(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preserve_all() -> FormatOptions {
        let mut opts = FormatOptions::default();
        opts.comment_policy = CommentPolicy::Preserve;
        opts.preserve_blank_lines = true;
        opts
    }

    fn parse_one(input: &str, opts: FormatOptions) -> Node {
        let items = Parser::new(opts).parse_top_level(input, true).unwrap();
        items
            .into_iter()
            .find(|item| !item.is_standalone())
            .expect("no data element parsed")
    }

    #[test]
    fn array_of_primitives() {
        let root = parse_one("[1, 2.1, 3, -99]", FormatOptions::default());
        assert_eq!(root.kind, NodeKind::Array);
        assert_eq!(root.complexity, 1);
        assert_eq!(root.children.len(), 4);
        assert_eq!(root.children[1].value, "2.1");
    }

    #[test]
    fn object_names_stay_quoted() {
        let root = parse_one(r#"{"a": 1, "b": [true, false]}"#, FormatOptions::default());
        assert_eq!(root.kind, NodeKind::Object);
        assert_eq!(root.children[0].name, "\"a\"");
        assert_eq!(root.children[1].children.len(), 2);
        assert_eq!(root.complexity, 2);
    }

    #[test]
    fn array_comment_attachment() {
        // /*a*/ prefixes 1, /*b*/ postfixes 1, /*c*/ postfixes 2.
        let root = parse_one("[ /*a*/ 1 /*b*/, 2 /*c*/ ]", preserve_all());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].prefix_comment, "/*a*/");
        assert_eq!(root.children[0].postfix_comment, "/*b*/");
        assert!(!root.children[0].is_post_comment_line_style);
        assert_eq!(root.children[1].postfix_comment, "/*c*/");
    }

    #[test]
    fn line_comment_becomes_postfix() {
        let root = parse_one("[\n  1, // one\n  2\n]", preserve_all());
        assert_eq!(root.children[0].postfix_comment, "// one");
        assert!(root.children[0].is_post_comment_line_style);
    }

    #[test]
    fn two_block_comments_in_one_slot() {
        // The earlier one becomes standalone; the later attaches.
        let root = parse_one("[ /*x*/ /*y*/ 7 ]", preserve_all());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].kind, NodeKind::BlockComment);
        assert_eq!(root.children[0].value, "/*x*/");
        assert_eq!(root.children[1].prefix_comment, "/*y*/");
    }

    #[test]
    fn object_middle_comment() {
        let root = parse_one(r#"{"a": /*mid*/ 5}"#, preserve_all());
        assert_eq!(root.children[0].middle_comment, "/*mid*/");
        assert!(!root.children[0].middle_comment_has_newline);
    }

    #[test]
    fn middle_line_comment_then_block_concatenates() {
        let root = parse_one("{\"a\": // first\n /*second*/ 5}", preserve_all());
        let child = &root.children[0];
        assert_eq!(child.middle_comment, "// first\n/*second*/");
        assert!(child.middle_comment_has_newline);
    }

    #[test]
    fn object_postfix_line_comment() {
        let root = parse_one("{\n  \"a\": 1, // note\n  \"b\": 2\n}", preserve_all());
        assert_eq!(root.children[0].postfix_comment, "// note");
        assert!(root.children[0].is_post_comment_line_style);
        assert!(root.children[1].postfix_comment.is_empty());
    }

    #[test]
    fn duplicate_keys_parse_fine() {
        let root = parse_one(r#"{"z": 1, "z": 2}"#, FormatOptions::default());
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn blank_lines_preserved_only_on_request() {
        let with = parse_one("[\n1,\n\n2\n]", preserve_all());
        assert_eq!(with.children.len(), 3);
        assert_eq!(with.children[1].kind, NodeKind::BlankLine);

        let without = parse_one("[\n1,\n\n2\n]", FormatOptions::default());
        assert_eq!(without.children.len(), 2);
    }

    #[test]
    fn comments_rejected_by_default() {
        let result = Parser::new(FormatOptions::default()).parse_top_level("[1 /*c*/]", true);
        let err = result.unwrap_err();
        assert!(err.message.contains("Comments not allowed"));
        assert!(err.position.is_some());
    }

    #[test]
    fn trailing_commas_respect_option() {
        let strict = Parser::new(FormatOptions::default()).parse_top_level("[1, 2,]", true);
        assert!(strict.is_err());

        let mut opts = FormatOptions::default();
        opts.allow_trailing_commas = true;
        let root = parse_one("[1, 2,]", opts.clone());
        assert_eq!(root.children.len(), 2);

        let obj = parse_one(r#"{"a": 1,}"#, opts);
        assert_eq!(obj.children.len(), 1);
    }

    #[test]
    fn second_top_level_element_is_error() {
        let result = Parser::new(FormatOptions::default()).parse_top_level("[1] [2]", true);
        assert!(result.unwrap_err().message.contains("second top level"));
    }

    #[test]
    fn missing_colon_is_error() {
        let result = Parser::new(FormatOptions::default()).parse_top_level(r#"{"a" 1}"#, true);
        assert!(result.is_err());
    }

    #[test]
    fn missing_comma_in_array_is_error() {
        let result = Parser::new(FormatOptions::default()).parse_top_level("[1 2]", true);
        assert!(result.is_err());
    }

    #[test]
    fn unclosed_container_reports_start() {
        let result = Parser::new(FormatOptions::default()).parse_top_level("[1, 2", true);
        let err = result.unwrap_err();
        assert_eq!(err.position.unwrap().index, 0);
    }
}
