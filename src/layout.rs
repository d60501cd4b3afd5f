use tracing::trace;

use crate::columns::ColumnPlan;
use crate::convert::tree_from_value;
use crate::error::TidyError;
use crate::options::FormatOptions;
use crate::output::{LineBuffer, PadTokens};
use crate::parser::Parser;
use crate::tree::{Node, NodeKind, PadKind};
use crate::width::{self, StringWidthFn};

/// How a table cell's trailing comma slot is filled: a real comma, blank
/// space of the same width to keep later columns aligned, or nothing at
/// all when the cell is flush against a closing bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellComma {
    Real,
    Dummy,
    None,
}

/// The JSON formatter.
///
/// Reformats JSON (optionally with comments) into a layout that is easy
/// to read but still compact. Each array and object is classified into
/// one of four presentations, tightest first:
///
/// - inline, on a single line;
/// - a compact multi-line run of array items, several per line;
/// - a table, one row per child with columns aligned across rows;
/// - expanded, one child per line, recursively.
///
/// ```rust
/// use tidyjson::Formatter;
///
/// let mut fmt = Formatter::new();
/// let output = fmt.reformat(r#"{"a":[1,2,3],"b":true}"#, 0).unwrap();
/// assert_eq!(output, "{ \"a\": [1, 2, 3], \"b\": true }\n");
/// ```
pub struct Formatter {
    /// Formatting settings, applied at the start of each call.
    pub options: FormatOptions,
    /// Measures output width of a string. All padding and alignment goes
    /// through this; swap in [`width::wide_chars`] for East-Asian text.
    pub string_width: StringWidthFn,
    pads: PadTokens,
    buffer: LineBuffer,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        let options = FormatOptions::default();
        let pads = PadTokens::new(&options, width::char_count);
        Self {
            options,
            string_width: width::char_count,
            pads,
            buffer: LineBuffer::default(),
        }
    }

    /// Parses `input` and writes it back out in the best layout.
    ///
    /// `starting_depth` is the indentation level of the document root,
    /// for embedding output inside other indented text.
    pub fn reformat(&mut self, input: &str, starting_depth: usize) -> Result<String, TidyError> {
        self.begin_call();
        let parser = Parser::new(self.options.clone());
        let mut items = parser.parse_top_level(input, true)?;
        for item in &mut items {
            compute_widths(item, &self.pads, self.string_width);
        }
        for item in &items {
            self.format_item(item, starting_depth, false, 0);
        }
        self.buffer.flush();
        Ok(self.buffer.as_string())
    }

    /// Formats any serializable value through the same layout pipeline.
    ///
    /// `recursion_limit` bounds tree depth; conversion fails rather than
    /// overflowing the stack on cyclic structures.
    pub fn serialize<T: serde::Serialize>(
        &mut self,
        value: &T,
        starting_depth: usize,
        recursion_limit: usize,
    ) -> Result<String, TidyError> {
        let json = serde_json::to_value(value)
            .map_err(|e| TidyError::new(format!("Serialization failed: {e}")))?;
        let mut root = tree_from_value(&json, None, recursion_limit)?;
        self.begin_call();
        compute_widths(&mut root, &self.pads, self.string_width);
        self.format_item(&root, starting_depth, false, 0);
        self.buffer.flush();
        Ok(self.buffer.as_string())
    }

    /// Writes the document with no whitespace beyond what comments and
    /// blank lines need to survive a re-tokenize.
    pub fn minify(&mut self, input: &str) -> Result<String, TidyError> {
        self.begin_call();
        let parser = Parser::new(self.options.clone());
        let items = parser.parse_top_level(input, true)?;
        let mut out = String::new();
        for item in &items {
            minify_item(&mut out, item, false);
        }
        Ok(out)
    }

    fn begin_call(&mut self) {
        self.pads = PadTokens::new(&self.options, self.string_width);
        self.buffer = LineBuffer::default();
    }

    /// Content width available at a nesting depth, after the prefix
    /// string and indentation, capped by both length limits.
    fn available_space(&self, depth: usize) -> usize {
        let taken = self.pads.prefix_width() + self.pads.indent_width(depth);
        self.options
            .max_inline_length
            .min(self.options.max_total_line_length.saturating_sub(taken))
    }

    fn format_item(&mut self, item: &Node, depth: usize, include_comma: bool, name_pad: usize) {
        match item.kind {
            NodeKind::Array | NodeKind::Object => {
                self.format_container(item, depth, include_comma, name_pad)
            }
            NodeKind::BlankLine => self.format_blank_line(),
            NodeKind::LineComment | NodeKind::BlockComment => {
                self.format_standalone_comment(item, depth)
            }
            _ => self.format_simple(item, depth, include_comma, name_pad),
        }
    }

    fn format_container(&mut self, item: &Node, depth: usize, include_comma: bool, name_pad: usize) {
        if self.try_inline(item, depth, include_comma, name_pad) {
            trace!(depth, "container formatted inline");
            return;
        }
        if item.kind == NodeKind::Array && self.try_compact_array(item, depth, include_comma, name_pad)
        {
            trace!(depth, "container formatted as compact array");
            return;
        }
        if self.try_table(item, depth, include_comma, name_pad) {
            trace!(depth, "container formatted as table");
            return;
        }
        trace!(depth, "container expanded");
        self.format_expanded(item, depth, include_comma, name_pad);
    }

    fn try_inline(&mut self, item: &Node, depth: usize, include_comma: bool, name_pad: usize) -> bool {
        if (depth as isize) <= self.options.always_expand_depth {
            return false;
        }
        if item.complexity as isize > self.options.max_inline_complexity {
            return false;
        }
        if item.requires_multiple_lines {
            return false;
        }

        let comma_width = if include_comma {
            self.pads.comma_width()
        } else {
            0
        };
        let name_pad_extra = name_pad.saturating_sub(item.name_width);
        if item.min_total_width + comma_width + name_pad_extra > self.available_space(depth) {
            return false;
        }

        self.write_line_start(depth);
        self.write_element_inline(item, include_comma, name_pad);
        let eol = self.pads.eol().to_string();
        self.buffer.end_line(&eol);
        true
    }

    fn try_compact_array(
        &mut self,
        item: &Node,
        depth: usize,
        include_comma: bool,
        name_pad: usize,
    ) -> bool {
        if (depth as isize) <= self.options.always_expand_depth {
            return false;
        }
        if item.complexity as isize > self.options.max_compact_array_complexity {
            return false;
        }
        if item.requires_multiple_lines || item.children.is_empty() {
            return false;
        }
        // With fewer items than would fill a single row, a table or
        // expanded layout reads better than a compact run.
        if item.children.len() < self.options.min_compact_array_row_items {
            return false;
        }

        let avail = self.available_space(depth + 1);
        let width_sum: usize = item.children.iter().map(|ch| ch.min_total_width).sum();
        let avg_item_width = self.pads.comma_width() + width_sum / item.children.len();
        if avg_item_width * self.options.min_compact_array_row_items > avail {
            return false;
        }

        // A shared measurement over the items lines the rows up into
        // columns when their shapes agree; otherwise wrap greedily.
        let mut plan = ColumnPlan::new(self.pads.clone(), &self.options);
        plan.measure_root(item, true);
        let aligned = plan.try_to_fit(avail.saturating_sub(self.pads.comma_width()))
            && plan.has_alignment();

        self.write_container_head(item, depth, name_pad);

        let last = item.children.len() - 1;
        if aligned {
            let cell_total = plan.total_width + self.pads.comma_width();
            let per_line = (avail / cell_total).max(1);
            for (i, child) in item.children.iter().enumerate() {
                if i % per_line == 0 {
                    if i > 0 {
                        let eol = self.pads.eol().to_string();
                        self.buffer.end_line(&eol);
                    }
                    self.write_line_start(depth + 1);
                }
                let comma = if i == last { CellComma::None } else { CellComma::Real };
                self.write_row_segment(&plan, child, comma);
            }
        } else {
            let mut used = 0usize;
            self.write_line_start(depth + 1);
            for (i, child) in item.children.iter().enumerate() {
                let item_width = child.min_total_width + self.pads.comma_width();
                if used > 0 && used + item_width > avail {
                    let eol = self.pads.eol().to_string();
                    self.buffer.end_line(&eol);
                    self.write_line_start(depth + 1);
                    used = 0;
                }
                self.write_element_inline(child, i != last, 0);
                used += item_width;
            }
        }
        let eol = self.pads.eol().to_string();
        self.buffer.end_line(&eol);

        self.write_container_tail(item, depth, include_comma);
        true
    }

    fn try_table(&mut self, item: &Node, depth: usize, include_comma: bool, name_pad: usize) -> bool {
        if (depth as isize) < self.options.always_expand_depth {
            return false;
        }
        if item.complexity as isize > self.options.max_table_row_complexity + 1 {
            return false;
        }

        let avail = self.available_space(depth + 1);
        let row_budget = avail.saturating_sub(self.pads.comma_width());
        if item.data_children().any(|ch| ch.min_total_width > row_budget) {
            return false;
        }

        let mut plan = ColumnPlan::new(self.pads.clone(), &self.options);
        plan.measure_root(item, true);
        if !plan.try_to_fit(row_budget) {
            return false;
        }
        if !plan.has_alignment() {
            return false;
        }

        self.write_container_head(item, depth, name_pad);

        let last_data = item
            .children
            .iter()
            .rposition(|ch| !ch.is_standalone());
        for (i, child) in item.children.iter().enumerate() {
            match child.kind {
                NodeKind::BlankLine => self.format_blank_line(),
                NodeKind::LineComment | NodeKind::BlockComment => {
                    self.format_standalone_comment(child, depth + 1)
                }
                _ => {
                    let comma = if Some(i) == last_data {
                        CellComma::Dummy
                    } else {
                        CellComma::Real
                    };
                    self.write_line_start(depth + 1);
                    self.write_row_segment(&plan, child, comma);
                    let eol = self.pads.eol().to_string();
                    self.buffer.end_line(&eol);
                }
            }
        }

        self.write_container_tail(item, depth, include_comma);
        true
    }

    fn format_expanded(&mut self, item: &Node, depth: usize, include_comma: bool, name_pad: usize) {
        self.write_container_head(item, depth, name_pad);

        let child_name_pad = if item.kind == NodeKind::Object {
            self.expanded_name_pad(item, depth)
        } else {
            0
        };

        let last_data = item
            .children
            .iter()
            .rposition(|ch| !ch.is_standalone());
        for (i, child) in item.children.iter().enumerate() {
            let comma = !child.is_standalone() && Some(i) != last_data;
            self.format_item(child, depth + 1, comma, child_name_pad);
        }

        self.write_container_tail(item, depth, include_comma);
    }

    /// Target width for property names of an expanded object, or 0 when
    /// the names shouldn't be aligned.
    fn expanded_name_pad(&self, item: &Node, depth: usize) -> usize {
        // A multi-line middle comment throws the colon-to-value offsets
        // off, so alignment is skipped for the whole object.
        if item
            .data_children()
            .any(|ch| ch.middle_comment_has_newline)
        {
            return 0;
        }

        let mut longest = 0usize;
        let mut shortest = usize::MAX;
        for child in item.data_children() {
            longest = longest.max(child.name_width);
            shortest = shortest.min(child.name_width);
        }
        if longest == 0 || shortest == usize::MAX || longest == shortest {
            return 0;
        }

        let target = longest.min(shortest + self.options.max_prop_name_padding);

        // Padding must not push an otherwise-fitting child past the line.
        let avail = self.available_space(depth + 1);
        for child in item.data_children() {
            if child.requires_multiple_lines || child.min_total_width > avail {
                continue;
            }
            let padded = child.min_total_width + target.saturating_sub(child.name_width);
            if padded > avail {
                return 0;
            }
        }
        target
    }

    fn format_simple(&mut self, item: &Node, depth: usize, include_comma: bool, name_pad: usize) {
        self.write_line_start(depth);
        self.write_element_head(item, depth, name_pad);
        self.buffer.add(&item.value);
        self.write_postfix_and_comma(item, depth, include_comma);
        let eol = self.pads.eol().to_string();
        self.buffer.end_line(&eol);
    }

    fn format_blank_line(&mut self) {
        let eol = self.pads.eol().to_string();
        self.buffer.add(&self.options.prefix_string).end_line(&eol);
    }

    /// A comment on its own line, or several lines for a multi-line block
    /// comment. Interior lines keep their indentation relative to where
    /// the comment started in the source.
    fn format_standalone_comment(&mut self, item: &Node, depth: usize) {
        let normalized: Vec<String> = normalize_comment_lines(&item.value, item.position.column);
        for line in &normalized {
            self.write_line_start(depth);
            self.buffer.add(line);
            let eol = self.pads.eol().to_string();
            self.buffer.end_line(&eol);
        }
    }

    /// Start of every output line: the prefix string and indentation.
    fn write_line_start(&mut self, depth: usize) {
        self.buffer.add(&self.options.prefix_string);
        let indent = self.pads.indent(depth);
        self.buffer.add(&indent);
    }

    /// Prefix comment, name, colon, and middle comment of an element.
    /// With a nonzero `name_pad`, the name portion is padded so colons or
    /// values line up across siblings.
    fn write_element_head(&mut self, item: &Node, depth: usize, name_pad: usize) {
        if !item.prefix_comment.is_empty() {
            self.write_attached_comment(&item.prefix_comment, depth);
            self.buffer.add(self.pads.comment());
        }
        if !item.name.is_empty() {
            let pad = name_pad.saturating_sub(item.name_width);
            if self.options.colon_before_prop_name_padding {
                self.buffer.add(&item.name).add(self.pads.colon()).spaces(pad);
            } else {
                self.buffer.add(&item.name).spaces(pad).add(self.pads.colon());
            }
        }
        if !item.middle_comment.is_empty() {
            self.write_attached_comment(&item.middle_comment, depth);
            self.buffer.add(self.pads.comment());
        }
    }

    /// An attached comment, continuing onto fresh lines at one deeper
    /// indent if it spans several.
    fn write_attached_comment(&mut self, text: &str, depth: usize) {
        let mut first = true;
        for line in text.split('\n') {
            if !first {
                let eol = self.pads.eol().to_string();
                self.buffer.end_line(&eol);
                self.write_line_start(depth + 1);
            }
            self.buffer.add(line);
            first = false;
        }
    }

    /// Postfix comment and trailing comma in their proper order: a
    /// line-style comment must come last on the line, so the comma moves
    /// in front of it.
    fn write_postfix_and_comma(&mut self, item: &Node, depth: usize, include_comma: bool) {
        if item.postfix_comment.is_empty() {
            if include_comma {
                self.buffer.add(self.pads.comma());
            }
            return;
        }

        if item.is_post_comment_line_style {
            if include_comma {
                self.buffer.add(self.pads.comma());
            }
            self.buffer.add(self.pads.comment());
            self.buffer.add(&item.postfix_comment);
        } else {
            self.buffer.add(self.pads.comment());
            self.write_attached_comment(&item.postfix_comment, depth);
            if include_comma {
                self.buffer.add(self.pads.comma());
            }
        }
    }

    /// Whole element on the current line: head, value (recursing into
    /// containers), postfix, comma.
    fn write_element_inline(&mut self, item: &Node, include_comma: bool, name_pad: usize) {
        self.write_element_head(item, 0, name_pad);
        self.write_value_inline(item);
        if item.postfix_comment.is_empty() {
            if include_comma {
                self.buffer.add(self.pads.comma());
            }
        } else if item.is_post_comment_line_style {
            if include_comma {
                self.buffer.add(self.pads.comma());
            }
            self.buffer.add(self.pads.comment());
            self.buffer.add(&item.postfix_comment);
        } else {
            self.buffer.add(self.pads.comment());
            self.buffer.add(&item.postfix_comment);
            if include_comma {
                self.buffer.add(self.pads.comma());
            }
        }
    }

    fn write_value_inline(&mut self, item: &Node) {
        if !item.kind.is_container() {
            self.buffer.add(&item.value);
            return;
        }
        let pad = pad_kind_of(item);
        self.buffer.add(self.pads.start(item.kind, pad));
        let last = item.children.len().saturating_sub(1);
        for (i, child) in item.children.iter().enumerate() {
            self.write_element_inline(child, i < last, 0);
        }
        self.buffer.add(self.pads.end(item.kind, pad));
    }

    /// Element head plus the opening bracket, ending the line. Used by
    /// every multi-line container format.
    fn write_container_head(&mut self, item: &Node, depth: usize, name_pad: usize) {
        self.write_line_start(depth);
        self.write_element_head(item, depth, name_pad);
        self.buffer.add(self.pads.start(item.kind, PadKind::Empty));
        let eol = self.pads.eol().to_string();
        self.buffer.end_line(&eol);
    }

    fn write_container_tail(&mut self, item: &Node, depth: usize, include_comma: bool) {
        self.write_line_start(depth);
        self.buffer.add(self.pads.end(item.kind, PadKind::Empty));
        self.write_postfix_and_comma(item, depth, include_comma);
        let eol = self.pads.eol().to_string();
        self.buffer.end_line(&eol);
    }

    /// One table cell (or whole row) laid out to the plan's widths.
    fn write_row_segment(&mut self, plan: &ColumnPlan, item: &Node, comma: CellComma) {
        if plan.prefix_comment_width > 0 {
            if item.prefix_comment.is_empty() {
                self.buffer
                    .spaces(plan.prefix_comment_width + self.pads.comment_width());
            } else {
                self.buffer
                    .add(&item.prefix_comment)
                    .spaces(plan.prefix_comment_width - item.prefix_comment_width)
                    .add(self.pads.comment());
            }
        }

        if plan.name_width > 0 {
            let pad = plan.name_width - item.name_width;
            if self.options.colon_before_prop_name_padding {
                self.buffer.add(&item.name).add(self.pads.colon()).spaces(pad);
            } else {
                self.buffer.add(&item.name).spaces(pad).add(self.pads.colon());
            }
        }

        if plan.middle_comment_width > 0 {
            if item.middle_comment.is_empty() {
                self.buffer
                    .spaces(plan.middle_comment_width + self.pads.comment_width());
            } else {
                self.buffer
                    .add(&item.middle_comment)
                    .spaces(plan.middle_comment_width - item.middle_comment_width)
                    .add(self.pads.comment());
            }
        }

        self.write_cell_value(plan, item, comma);

        if plan.postfix_comment_width > 0 {
            if item.postfix_comment.is_empty() {
                self.buffer
                    .spaces(self.pads.comment_width() + plan.postfix_comment_width);
            } else {
                self.buffer.add(self.pads.comment());
                self.buffer.add(&item.postfix_comment);
                self.buffer
                    .spaces(plan.postfix_comment_width - item.postfix_comment_width);
            }
        }
    }

    /// The value portion of a cell, occupying exactly the plan's
    /// composite width plus the comma slot.
    fn write_cell_value(&mut self, plan: &ColumnPlan, item: &Node, comma: CellComma) {
        let comma_str = match comma {
            CellComma::Real => self.pads.comma().to_string(),
            CellComma::Dummy => self.pads.dummy_comma().to_string(),
            CellComma::None => String::new(),
        };

        if !plan.children.is_empty() && item.kind.is_container() {
            self.write_aligned_container_cell(plan, item);
            self.buffer.add(&comma_str);
            return;
        }

        if !plan.children.is_empty() {
            // A null standing in for a whole composite cell.
            self.buffer
                .add(&item.value)
                .spaces(plan.composite_value_width - item.value_width);
            self.buffer.add(&comma_str);
            return;
        }

        if plan.column_kind == crate::tree::ColumnKind::Number
            && matches!(item.kind, NodeKind::Number | NodeKind::Null)
        {
            if self.number_comma_after_padding() {
                plan.format_number(&mut self.buffer, item, "");
                self.buffer.add(&comma_str);
            } else {
                plan.format_number(&mut self.buffer, item, &comma_str);
            }
            return;
        }

        // Plain cell: the value as-is, padded out to the column width.
        let fill = plan.composite_value_width - item.value_width;
        match self.options.table_comma_placement {
            crate::options::CommaPlacement::AfterPadding => {
                self.write_value_inline(item);
                self.buffer.spaces(fill).add(&comma_str);
            }
            _ => {
                self.write_value_inline(item);
                self.buffer.add(&comma_str).spaces(fill);
            }
        }
    }

    fn number_comma_after_padding(&self) -> bool {
        matches!(
            self.options.table_comma_placement,
            crate::options::CommaPlacement::AfterPadding
                | crate::options::CommaPlacement::BeforePaddingExceptNumbers
        )
    }

    /// A container rendered as aligned sub-cells inside its brackets.
    fn write_aligned_container_cell(&mut self, plan: &ColumnPlan, item: &Node) {
        self.buffer.add(self.pads.start(item.kind, plan.pad_kind));

        let columns = plan.children.len();
        if item.kind == NodeKind::Array {
            let present = item.children.len();
            for (i, sub) in plan.children.iter().enumerate() {
                let last_column = i + 1 == columns;
                if i < present {
                    let comma = if i + 1 < present {
                        CellComma::Real
                    } else if last_column {
                        CellComma::None
                    } else {
                        CellComma::Dummy
                    };
                    self.write_row_segment(sub, &item.children[i], comma);
                } else {
                    self.buffer.spaces(sub.total_width);
                    if !last_column {
                        self.buffer.spaces(self.pads.comma_width());
                    }
                }
            }
        } else {
            let matches: Vec<Option<&Node>> = plan
                .children
                .iter()
                .map(|sub| {
                    item.children
                        .iter()
                        .find(|ch| Some(ch.name.as_str()) == sub.location_in_parent.as_deref())
                })
                .collect();
            let last_present = matches.iter().rposition(Option::is_some);

            for (i, sub) in plan.children.iter().enumerate() {
                let last_column = i + 1 == columns;
                match matches[i] {
                    Some(child) => {
                        let comma = if Some(i) != last_present {
                            CellComma::Real
                        } else if last_column {
                            CellComma::None
                        } else {
                            CellComma::Dummy
                        };
                        self.write_row_segment(sub, child, comma);
                    }
                    None => {
                        self.buffer.spaces(sub.total_width);
                        if !last_column {
                            self.buffer.spaces(self.pads.comma_width());
                        }
                    }
                }
            }
        }

        self.buffer.add(self.pads.end(item.kind, plan.pad_kind));
    }
}

/// The length pre-pass: bottom-up, measures every string of every node
/// and the width the node would need on a single line, and decides which
/// nodes can never be inlined.
fn compute_widths(node: &mut Node, pads: &PadTokens, width_of: StringWidthFn) {
    for child in &mut node.children {
        compute_widths(child, pads, width_of);
    }

    node.name_width = width_of(&node.name);
    node.prefix_comment_width = width_of(&node.prefix_comment);
    node.middle_comment_width = width_of(&node.middle_comment);
    node.postfix_comment_width = width_of(&node.postfix_comment);

    node.value_width = if node.kind.is_container() {
        let pad = pad_kind_of(node);
        let children_sum: usize = node.children.iter().map(|ch| ch.min_total_width).sum();
        let commas = pads.comma_width() * node.children.len().saturating_sub(1);
        pads.start_width(node.kind, pad) + pads.end_width(node.kind, pad) + children_sum + commas
    } else {
        width_of(&node.value)
    };

    node.requires_multiple_lines = node.kind.is_standalone()
        || node.prefix_comment.contains('\n')
        || node.middle_comment.contains('\n')
        || node.postfix_comment.contains('\n')
        || node.value.contains('\n')
        || node
            .children
            .iter()
            .any(|ch| ch.requires_multiple_lines || ch.is_post_comment_line_style);

    let with_pad = |w: usize, pad: usize| if w > 0 { w + pad } else { 0 };
    node.min_total_width = with_pad(node.prefix_comment_width, pads.comment_width())
        + with_pad(node.name_width, pads.colon_width())
        + with_pad(node.middle_comment_width, pads.comment_width())
        + node.value_width
        + with_pad(node.postfix_comment_width, pads.comment_width());
}

/// Bracket padding for a container: `Complex` exactly when some child is
/// a non-empty array or object, which is the same as complexity 2+.
fn pad_kind_of(node: &Node) -> PadKind {
    if node.children.is_empty() {
        PadKind::Empty
    } else if node.complexity >= 2 {
        PadKind::Complex
    } else {
        PadKind::Simple
    }
}

/// Strips the comment's original indentation from the interior lines of a
/// multi-line comment, so it can be re-indented at the output position.
/// Only whitespace is removed, and at most `original_column` characters.
fn normalize_comment_lines(text: &str, original_column: usize) -> Vec<String> {
    let mut lines = text.split('\n');
    let mut result = vec![lines.next().unwrap_or("").to_string()];
    for line in lines {
        let mut stripped = 0usize;
        let mut rest = line;
        while stripped < original_column {
            match rest.chars().next() {
                Some(ch) if ch == ' ' || ch == '\t' => {
                    rest = &rest[ch.len_utf8()..];
                    stripped += 1;
                }
                _ => break,
            }
        }
        result.push(rest.to_string());
    }
    result
}

fn minify_item(out: &mut String, item: &Node, include_comma: bool) {
    match item.kind {
        NodeKind::BlankLine => {
            // Only a line with nothing else on it re-tokenizes as blank.
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        NodeKind::LineComment => {
            out.push_str(&item.value);
            out.push('\n');
        }
        NodeKind::BlockComment => out.push_str(&item.value),
        _ => {
            if !item.prefix_comment.is_empty() {
                out.push_str(&item.prefix_comment);
            }
            if !item.name.is_empty() {
                out.push_str(&item.name);
                out.push(':');
            }
            if !item.middle_comment.is_empty() {
                out.push_str(&item.middle_comment);
                // A middle comment ending in line style already carries
                // its newline from the parser.
            }

            if item.kind.is_container() {
                out.push(if item.kind == NodeKind::Array { '[' } else { '{' });
                let last_data = item.children.iter().rposition(|ch| !ch.is_standalone());
                for (i, child) in item.children.iter().enumerate() {
                    let comma = !child.is_standalone() && Some(i) != last_data;
                    minify_item(out, child, comma);
                }
                out.push(if item.kind == NodeKind::Array { ']' } else { '}' });
            } else {
                out.push_str(&item.value);
            }

            if item.postfix_comment.is_empty() {
                if include_comma {
                    out.push(',');
                }
            } else if item.is_post_comment_line_style {
                if include_comma {
                    out.push(',');
                }
                out.push_str(&item.postfix_comment);
                out.push('\n');
            } else {
                out.push_str(&item.postfix_comment);
                if include_comma {
                    out.push(',');
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn measure_for_tests(root: &mut Node, opts: &FormatOptions, width_of: StringWidthFn) {
    let pads = PadTokens::new(opts, width_of);
    compute_widths(root, &pads, width_of);
}
