/// The kind of an element in the document tree.
///
/// Standard JSON kinds plus the extended kinds used when comments and blank
/// lines are preserved from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// JSON `null`.
    Null,
    /// JSON `true`.
    True,
    /// JSON `false`.
    False,
    /// A string value.
    String,
    /// A number value, kept in its source text form.
    Number,
    /// An array (`[]`).
    Array,
    /// An object (`{}`).
    Object,
    /// A blank line from the input (when `preserve_blank_lines` is on).
    BlankLine,
    /// A standalone `// ...` comment.
    LineComment,
    /// A standalone `/* ... */` comment.
    BlockComment,
}

impl NodeKind {
    /// True for Array and Object.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Array | NodeKind::Object)
    }

    /// True for standalone comments and blank lines, which are layout
    /// passengers rather than data.
    pub fn is_standalone(self) -> bool {
        matches!(
            self,
            NodeKind::BlankLine | NodeKind::LineComment | NodeKind::BlockComment
        )
    }
}

/// How much padding a bracket pair gets, decided per container at render
/// time: `Empty` for childless containers, `Complex` when any child is a
/// non-empty array/object, `Simple` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    Empty = 0,
    Simple = 1,
    Complex = 2,
}

/// Classification of a table column while rows are being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Nothing but nulls seen so far.
    Unknown,
    /// Strings, booleans, or a demoted object column.
    Simple,
    Number,
    Array,
    Object,
    /// Incompatible kinds; the column cannot be aligned.
    Mixed,
}

/// A position within the input text. All values are zero-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Character offset from the start of the input.
    pub index: usize,
    /// Line number.
    pub row: usize,
    /// Column within the line.
    pub column: usize,
}

/// One element, comment, or blank line in the document tree.
///
/// Built by the parser or the serde converter, measured once by the length
/// pre-pass, then traversed read-only by the layout engine. The measured
/// `*_width` fields and `min_total_width` are in output columns as defined
/// by the formatter's string-width function, not bytes.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Where this element began in the source. The column is also used to
    /// re-indent the interior lines of multi-line block comments.
    pub position: Position,
    /// 0 for primitives and empty containers, otherwise 1 + max over
    /// children. Standalone comments and blank lines don't count.
    pub complexity: usize,
    /// Quoted property name, empty unless this is an object member.
    pub name: String,
    /// Raw text for primitives and comments; empty for containers.
    pub value: String,
    pub prefix_comment: String,
    pub middle_comment: String,
    pub middle_comment_has_newline: bool,
    pub postfix_comment: String,
    /// True when `postfix_comment` is a line comment, which forces any
    /// trailing comma in front of it.
    pub is_post_comment_line_style: bool,
    pub name_width: usize,
    pub value_width: usize,
    pub prefix_comment_width: usize,
    pub middle_comment_width: usize,
    pub postfix_comment_width: usize,
    /// Width this node needs if forced onto a single line, including its
    /// name, attached comments, and all descendants.
    pub min_total_width: usize,
    /// True when the node can never be written on one line.
    pub requires_multiple_lines: bool,
    pub children: Vec<Node>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            kind: NodeKind::Null,
            position: Position::default(),
            complexity: 0,
            name: String::new(),
            value: String::new(),
            prefix_comment: String::new(),
            middle_comment: String::new(),
            middle_comment_has_newline: false,
            postfix_comment: String::new(),
            is_post_comment_line_style: false,
            name_width: 0,
            value_width: 0,
            prefix_comment_width: 0,
            middle_comment_width: 0,
            postfix_comment_width: 0,
            min_total_width: 0,
            requires_multiple_lines: false,
            children: Vec::new(),
        }
    }
}

impl Node {
    pub fn is_standalone(&self) -> bool {
        self.kind.is_standalone()
    }

    /// Data children only, skipping standalone comments and blank lines.
    pub fn data_children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|ch| !ch.is_standalone())
    }
}
