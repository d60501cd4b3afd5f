use crate::options::{EolStyle, FormatOptions};
use crate::tree::{NodeKind, PadKind};
use crate::width::StringWidthFn;

/// Line-oriented output accumulator.
///
/// Text is gathered one line at a time so trailing whitespace can be
/// stripped before the line terminator goes in. Alignment padding often
/// runs past the last visible character; none of it survives to the
/// output.
#[derive(Debug, Default)]
pub struct LineBuffer {
    line: String,
    doc: String,
}

impl LineBuffer {
    pub fn add(&mut self, text: &str) -> &mut Self {
        self.line.push_str(text);
        self
    }

    pub fn spaces(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.line.push(' ');
        }
        self
    }

    /// Ends the current line: strips trailing whitespace, appends the
    /// terminator, and starts a fresh line.
    pub fn end_line(&mut self, eol: &str) -> &mut Self {
        self.commit(eol);
        self
    }

    /// Commits any pending text without a terminator. Call once at the end
    /// of a document.
    pub fn flush(&mut self) -> &mut Self {
        self.commit("");
        self
    }

    pub fn as_string(&self) -> String {
        self.doc.clone()
    }

    fn commit(&mut self, eol: &str) {
        if self.line.is_empty() && eol.is_empty() {
            return;
        }
        while self.line.ends_with([' ', '\t']) {
            self.line.pop();
        }
        self.doc.push_str(&self.line);
        self.doc.push_str(eol);
        self.line.clear();
    }
}

/// Every fixed text fragment the layout engine emits, with its measured
/// width, computed once per format call from the options.
///
/// Bracket strings are indexed by [`PadKind`]; `dummy_comma` is blank
/// space the width of a padded comma, used in the last table row to keep
/// later columns aligned.
#[derive(Clone, Debug)]
pub struct PadTokens {
    comma: String,
    colon: String,
    comment: String,
    eol: String,
    dummy_comma: String,
    comma_width: usize,
    colon_width: usize,
    comment_width: usize,
    null_width: usize,
    prefix_width: usize,
    one_indent_width: usize,
    arr_start: [String; 3],
    arr_end: [String; 3],
    obj_start: [String; 3],
    obj_end: [String; 3],
    arr_start_width: [usize; 3],
    arr_end_width: [usize; 3],
    obj_start_width: [usize; 3],
    obj_end_width: [usize; 3],
    indent_cache: Vec<String>,
}

impl PadTokens {
    pub fn new(opts: &FormatOptions, width_of: StringWidthFn) -> Self {
        let simple = opts.simple_bracket_padding;
        let complex = opts.nested_bracket_padding;

        let bracket = |bare: &str, padded: &str, pad: bool| -> String {
            if pad { padded } else { bare }.to_string()
        };

        let arr_start = [
            "[".to_string(),
            bracket("[", "[ ", simple),
            bracket("[", "[ ", complex),
        ];
        let arr_end = [
            "]".to_string(),
            bracket("]", " ]", simple),
            bracket("]", " ]", complex),
        ];
        let obj_start = [
            "{".to_string(),
            bracket("{", "{ ", simple),
            bracket("{", "{ ", complex),
        ];
        let obj_end = [
            "}".to_string(),
            bracket("}", " }", simple),
            bracket("}", " }", complex),
        ];

        let comma = if opts.comma_padding { ", " } else { "," }.to_string();
        let colon = if opts.colon_padding { ": " } else { ":" }.to_string();
        let comment = if opts.comment_padding { " " } else { "" }.to_string();
        let eol = match opts.json_eol_style {
            EolStyle::Crlf => "\r\n",
            EolStyle::Lf => "\n",
        }
        .to_string();

        let measure = |arr: &[String; 3]| -> [usize; 3] {
            [width_of(&arr[0]), width_of(&arr[1]), width_of(&arr[2])]
        };
        let arr_start_width = measure(&arr_start);
        let arr_end_width = measure(&arr_end);
        let obj_start_width = measure(&obj_start);
        let obj_end_width = measure(&obj_end);

        let one_indent = if opts.use_tab_to_indent {
            "\t".to_string()
        } else {
            " ".repeat(opts.indent_spaces)
        };
        let one_indent_width = width_of(&one_indent);
        let indent_cache = vec![String::new(), one_indent];

        let comma_width = width_of(&comma);

        Self {
            dummy_comma: " ".repeat(comma_width),
            comma_width,
            colon_width: width_of(&colon),
            comment_width: width_of(&comment),
            null_width: width_of("null"),
            prefix_width: width_of(&opts.prefix_string),
            comma,
            colon,
            comment,
            eol,
            one_indent_width,
            arr_start,
            arr_end,
            obj_start,
            obj_end,
            arr_start_width,
            arr_end_width,
            obj_start_width,
            obj_end_width,
            indent_cache,
        }
    }

    pub fn comma(&self) -> &str {
        &self.comma
    }
    pub fn colon(&self) -> &str {
        &self.colon
    }
    pub fn comment(&self) -> &str {
        &self.comment
    }
    pub fn eol(&self) -> &str {
        &self.eol
    }
    pub fn dummy_comma(&self) -> &str {
        &self.dummy_comma
    }
    pub fn comma_width(&self) -> usize {
        self.comma_width
    }
    pub fn colon_width(&self) -> usize {
        self.colon_width
    }
    pub fn comment_width(&self) -> usize {
        self.comment_width
    }
    pub fn null_width(&self) -> usize {
        self.null_width
    }
    pub fn prefix_width(&self) -> usize {
        self.prefix_width
    }

    pub fn start(&self, kind: NodeKind, pad: PadKind) -> &str {
        match kind {
            NodeKind::Array => &self.arr_start[pad as usize],
            _ => &self.obj_start[pad as usize],
        }
    }

    pub fn end(&self, kind: NodeKind, pad: PadKind) -> &str {
        match kind {
            NodeKind::Array => &self.arr_end[pad as usize],
            _ => &self.obj_end[pad as usize],
        }
    }

    pub fn start_width(&self, kind: NodeKind, pad: PadKind) -> usize {
        match kind {
            NodeKind::Array => self.arr_start_width[pad as usize],
            _ => self.obj_start_width[pad as usize],
        }
    }

    pub fn end_width(&self, kind: NodeKind, pad: PadKind) -> usize {
        match kind {
            NodeKind::Array => self.arr_end_width[pad as usize],
            _ => self.obj_end_width[pad as usize],
        }
    }

    pub fn arr_start(&self, pad: PadKind) -> &str {
        &self.arr_start[pad as usize]
    }
    pub fn arr_end(&self, pad: PadKind) -> &str {
        &self.arr_end[pad as usize]
    }
    pub fn arr_start_width(&self, pad: PadKind) -> usize {
        self.arr_start_width[pad as usize]
    }
    pub fn arr_end_width(&self, pad: PadKind) -> usize {
        self.arr_end_width[pad as usize]
    }

    /// Indentation string for a nesting level, grown and cached on demand.
    pub fn indent(&mut self, level: usize) -> String {
        while self.indent_cache.len() <= level {
            let next = format!(
                "{}{}",
                self.indent_cache[self.indent_cache.len() - 1],
                self.indent_cache[1]
            );
            self.indent_cache.push(next);
        }
        self.indent_cache[level].clone()
    }

    /// Width of the indentation at a nesting level.
    pub fn indent_width(&self, level: usize) -> usize {
        self.one_indent_width * level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::width;

    #[test]
    fn line_buffer_strips_trailing_whitespace() {
        let mut buf = LineBuffer::default();
        buf.add("[1, 2]").spaces(5).end_line("\n");
        buf.add("next").add("\t").end_line("\n");
        assert_eq!(buf.as_string(), "[1, 2]\nnext\n");
    }

    #[test]
    fn flush_commits_partial_line() {
        let mut buf = LineBuffer::default();
        buf.add("tail");
        buf.flush();
        assert_eq!(buf.as_string(), "tail");
    }

    #[test]
    fn brackets_follow_padding_options() {
        let mut opts = FormatOptions::default();
        opts.nested_bracket_padding = true;
        opts.simple_bracket_padding = false;
        let pads = PadTokens::new(&opts, width::char_count);

        assert_eq!(pads.arr_start(PadKind::Empty), "[");
        assert_eq!(pads.arr_start(PadKind::Simple), "[");
        assert_eq!(pads.arr_start(PadKind::Complex), "[ ");
        assert_eq!(pads.end(NodeKind::Object, PadKind::Complex), " }");
        assert_eq!(pads.start_width(NodeKind::Object, PadKind::Complex), 2);
    }

    #[test]
    fn indent_cache_grows_on_demand() {
        let opts = FormatOptions::default();
        let mut pads = PadTokens::new(&opts, width::char_count);
        assert_eq!(pads.indent(3), " ".repeat(12));
        assert_eq!(pads.indent(1), "    ");
        assert_eq!(pads.indent_width(3), 12);
    }

    #[test]
    fn dummy_comma_matches_comma_width() {
        let opts = FormatOptions::default();
        let pads = PadTokens::new(&opts, width::char_count);
        assert_eq!(pads.dummy_comma().len(), pads.comma().len());
    }
}
