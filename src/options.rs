/// Line ending style for the formatted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EolStyle {
    /// Windows-style line endings (`\r\n`).
    Crlf,
    /// Unix-style line endings (`\n`).
    Lf,
}

/// Policy for handling comments in the input.
///
/// Standard JSON has no comments, but JSONC-style input (VS Code configs
/// and similar) does. This controls what happens when one is encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPolicy {
    /// Reject input containing comments. The default, for strict JSON.
    TreatAsError,
    /// Silently drop comments from the output.
    Remove,
    /// Keep comments in the output, attached to their nearest element.
    Preserve,
}

/// Alignment of numbers within a table or compact-array column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberAlignment {
    /// Keep the source text, left-justified.
    Left,
    /// Keep the source text, right-justified to the widest value.
    Right,
    /// Keep the source text, lined up on the decimal point (or exponent
    /// marker). Usually the most readable for mixed integer/decimal data.
    Decimal,
    /// Rewrite every number with the column's common count of fractional
    /// digits. Falls back to `Left` for any column where rewriting could
    /// change a value.
    Normalize,
}

/// Where commas sit relative to the alignment padding in table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommaPlacement {
    /// Comma right after the value; padding fills out the column.
    /// Example: `"ab",   "cdef"`
    BeforePadding,
    /// Value padded to the column width, then the comma, so commas form
    /// their own aligned column. Example: `"ab"  , "cdef"`
    AfterPadding,
    /// `BeforePadding` for most columns but `AfterPadding` for number
    /// columns, which keeps digits and their commas packed together.
    BeforePaddingExceptNumbers,
}

/// Stand-in for "no limit" on the inline length cap. Large enough that the
/// total-line-length limit always wins, small enough to add without
/// overflow.
pub(crate) const NO_LENGTH_LIMIT: usize = 1_000_000_000;

/// Settings controlling the formatted output.
///
/// Start from [`Default::default()`] or [`FormatOptions::recommended()`]
/// and adjust fields as needed.
///
/// ```rust
/// use tidyjson::{FormatOptions, CommentPolicy};
///
/// let mut options = FormatOptions::default();
/// options.max_total_line_length = 100;
/// options.indent_spaces = 2;
/// options.comment_policy = CommentPolicy::Preserve;
/// ```
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Line ending style. Default: [`EolStyle::Lf`].
    pub json_eol_style: EolStyle,

    /// Maximum length of any output line, counting the prefix string and
    /// indentation. Default: 120.
    pub max_total_line_length: usize,

    /// Maximum width of an element's content for it to be written inline
    /// or as a table row, not counting indentation or the prefix string.
    /// Default: unlimited, so `max_total_line_length` governs.
    pub max_inline_length: usize,

    /// Maximum nesting depth for a container to be written on one line.
    /// 0 inlines only empty containers, 1 allows containers of primitives,
    /// and so on. -1 disables inlining entirely. Default: 2.
    pub max_inline_complexity: isize,

    /// Maximum nesting depth for arrays written compactly with several
    /// items per line. -1 disables. Default: 2.
    pub max_compact_array_complexity: isize,

    /// Maximum nesting depth of each row for a container to be formatted
    /// as a table with aligned columns. -1 disables. Default: 2.
    pub max_table_row_complexity: isize,

    /// Minimum percentage of object-table cells that must be occupied for
    /// an object container to qualify as a table. Values above 100 disable
    /// object tables. Default: 75.0.
    pub table_object_minimum_similarity: f64,

    /// Like `table_object_minimum_similarity`, for array rows matched
    /// positionally. Default: 75.0.
    pub table_array_minimum_similarity: f64,

    /// Cap on the padding inserted to line up property names (or colons)
    /// in expanded objects. Alignment is skipped for a container where the
    /// longest and shortest names differ by more than this. Default: 16.
    pub max_prop_name_padding: usize,

    /// If true, the colon hugs the property name and padding follows it:
    /// `"a":   1`. If false the padding comes first: `"a"  : 1`.
    /// Default: false.
    pub colon_before_prop_name_padding: bool,

    /// Comma placement in table rows.
    /// Default: [`CommaPlacement::BeforePaddingExceptNumbers`].
    pub table_comma_placement: CommaPlacement,

    /// Reject compact multi-line arrays whose average item width would fit
    /// fewer than this many items per row. Default: 3.
    pub min_compact_array_row_items: usize,

    /// Depth at or below which containers are always expanded. -1
    /// disables. Default: -1.
    pub always_expand_depth: isize,

    /// Spaces inside brackets of containers holding other containers:
    /// `[ [1, 2] ]` vs `[[1, 2]]`. Default: true.
    pub nested_bracket_padding: bool,

    /// Spaces inside brackets of containers holding only primitives:
    /// `[ 1, 2 ]` vs `[1, 2]`. Default: false.
    pub simple_bracket_padding: bool,

    /// Space after colons: `"key": 1` vs `"key":1`. Default: true.
    pub colon_padding: bool,

    /// Space after commas: `[1, 2]` vs `[1,2]`. Default: true.
    pub comma_padding: bool,

    /// Space between values and attached comments. Default: true.
    pub comment_padding: bool,

    /// Number alignment in table and compact-array columns.
    /// Default: [`NumberAlignment::Decimal`].
    pub number_list_alignment: NumberAlignment,

    /// Spaces per indentation level, unless `use_tab_to_indent`.
    /// Default: 4.
    pub indent_spaces: usize,

    /// Indent with one tab per level instead of spaces. Default: false.
    pub use_tab_to_indent: bool,

    /// Prepended to every output line. Useful when embedding formatted
    /// JSON inside other text. Default: empty.
    pub prefix_string: String,

    /// What to do with comments in the input.
    /// Default: [`CommentPolicy::TreatAsError`].
    pub comment_policy: CommentPolicy,

    /// Carry blank lines from the input into the output. Default: false.
    pub preserve_blank_lines: bool,

    /// Accept trailing commas in the input (non-standard). Default: false.
    pub allow_trailing_commas: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            json_eol_style: EolStyle::Lf,
            max_total_line_length: 120,
            max_inline_length: NO_LENGTH_LIMIT,
            max_inline_complexity: 2,
            max_compact_array_complexity: 2,
            max_table_row_complexity: 2,
            table_object_minimum_similarity: 75.0,
            table_array_minimum_similarity: 75.0,
            max_prop_name_padding: 16,
            colon_before_prop_name_padding: false,
            table_comma_placement: CommaPlacement::BeforePaddingExceptNumbers,
            min_compact_array_row_items: 3,
            always_expand_depth: -1,
            nested_bracket_padding: true,
            simple_bracket_padding: false,
            colon_padding: true,
            comma_padding: true,
            comment_padding: true,
            number_list_alignment: NumberAlignment::Decimal,
            indent_spaces: 4,
            use_tab_to_indent: false,
            prefix_string: String::new(),
            comment_policy: CommentPolicy::TreatAsError,
            preserve_blank_lines: false,
            allow_trailing_commas: false,
        }
    }
}

impl FormatOptions {
    /// The recommended settings. Currently identical to `Default`; may
    /// pick up improved defaults in later versions.
    pub fn recommended() -> Self {
        Self::default()
    }
}
