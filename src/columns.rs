use std::collections::HashSet;

use crate::options::{FormatOptions, NumberAlignment};
use crate::output::{LineBuffer, PadTokens};
use crate::tree::{ColumnKind, Node, NodeKind, PadKind};

/// Measurement schema for one table column, built by scanning the rows of
/// a candidate container.
///
/// For array rows the sub-columns are matched positionally; for object
/// rows they are matched by property name. A plan is created for a single
/// rendering attempt and discarded afterwards.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    /// Property name this column corresponds to, for object tables.
    pub location_in_parent: Option<String>,
    pub column_kind: ColumnKind,
    /// How many rows contributed a value to this column.
    pub row_count: usize,
    pub name_width: usize,
    pub max_value_width: usize,
    pub prefix_comment_width: usize,
    pub middle_comment_width: usize,
    pub postfix_comment_width: usize,
    pub pad_kind: PadKind,
    pub requires_multiple_lines: bool,
    /// Width of the value portion of the column: the numeric field for
    /// number columns, bracket-and-children width for aligned containers,
    /// or the widest atomic value.
    pub composite_value_width: usize,
    /// Full column width: prefix, name, colon, middle, value, postfix.
    pub total_width: usize,
    pub contains_null: bool,
    pub children: Vec<ColumnPlan>,
    pads: PadTokens,
    alignment: NumberAlignment,
    object_similarity: f64,
    array_similarity: f64,
    /// Sum over rows of this column's position in its row, for ordering
    /// object columns by their dominant input position.
    index_sum: usize,
    max_digits_before_dec: usize,
    max_digits_after_dec: usize,
}

impl ColumnPlan {
    pub fn new(pads: PadTokens, opts: &FormatOptions) -> Self {
        Self::fresh(
            pads,
            opts.number_list_alignment,
            opts.table_object_minimum_similarity,
            opts.table_array_minimum_similarity,
        )
    }

    fn fresh(
        pads: PadTokens,
        alignment: NumberAlignment,
        object_similarity: f64,
        array_similarity: f64,
    ) -> Self {
        Self {
            location_in_parent: None,
            column_kind: ColumnKind::Unknown,
            row_count: 0,
            name_width: 0,
            max_value_width: 0,
            prefix_comment_width: 0,
            middle_comment_width: 0,
            postfix_comment_width: 0,
            pad_kind: PadKind::Simple,
            requires_multiple_lines: false,
            composite_value_width: 0,
            total_width: 0,
            contains_null: false,
            children: Vec::new(),
            pads,
            alignment,
            object_similarity,
            array_similarity,
            index_sum: 0,
            max_digits_before_dec: 0,
            max_digits_after_dec: 0,
        }
    }

    fn sub_plan(&self) -> Self {
        Self::fresh(
            self.pads.clone(),
            self.alignment,
            self.object_similarity,
            self.array_similarity,
        )
    }

    /// Measures every child of `root` as a row of the prospective table,
    /// then settles column order and computes widths.
    pub fn measure_root(&mut self, root: &Node, recursive: bool) {
        for row in &root.children {
            self.measure_row(row, recursive);
        }
        self.order_object_columns();
        self.prune_and_recompute(usize::MAX);
    }

    /// Whether rendering rows with this plan aligns anything: sub-columns
    /// or a justified number field.
    pub fn has_alignment(&self) -> bool {
        !self.children.is_empty() || self.column_kind == ColumnKind::Number
    }

    /// Repeatedly prunes the deepest layer of sub-columns until the row
    /// width fits the budget or nothing is left to prune.
    pub fn try_to_fit(&mut self, budget: usize) -> bool {
        let mut depth = self.plan_depth();
        loop {
            if self.total_width <= budget {
                return true;
            }
            if depth == 0 {
                return false;
            }
            depth -= 1;
            self.prune_and_recompute(depth);
        }
    }

    /// Writes one number cell occupying exactly `composite_value_width`
    /// columns. `inline_comma` is the comma to place directly after the
    /// value when the placement policy wants it inside the padding.
    pub fn format_number(&self, buffer: &mut LineBuffer, node: &Node, inline_comma: &str) {
        match self.alignment {
            NumberAlignment::Left => {
                buffer
                    .add(&node.value)
                    .add(inline_comma)
                    .spaces(self.max_value_width - node.value_width);
                return;
            }
            NumberAlignment::Right => {
                buffer
                    .spaces(self.max_value_width - node.value_width)
                    .add(&node.value)
                    .add(inline_comma);
                return;
            }
            NumberAlignment::Decimal | NumberAlignment::Normalize => {}
        }

        if node.kind == NodeKind::Null {
            buffer
                .spaces(self.max_digits_before_dec.saturating_sub(node.value_width))
                .add(&node.value)
                .add(inline_comma)
                .spaces(self.composite_value_width - self.max_digits_before_dec);
            return;
        }

        if self.alignment == NumberAlignment::Normalize {
            let parsed: f64 = node.value.parse().unwrap_or(f64::NAN);
            let rewritten = format!("{:.*}", self.max_digits_after_dec, parsed);
            buffer
                .spaces(self.composite_value_width.saturating_sub(rewritten.len()))
                .add(&rewritten)
                .add(inline_comma);
            return;
        }

        let (left_pad, right_pad) = match dot_or_exp_index(&node.value) {
            Some(dot) => {
                let left = self.max_digits_before_dec.saturating_sub(dot);
                let right = self
                    .composite_value_width
                    .saturating_sub(left + node.value_width);
                (left, right)
            }
            None => {
                let left = self.max_digits_before_dec.saturating_sub(node.value_width);
                let right = self
                    .composite_value_width
                    .saturating_sub(self.max_digits_before_dec);
                (left, right)
            }
        };

        buffer
            .spaces(left_pad)
            .add(&node.value)
            .add(inline_comma)
            .spaces(right_pad);
    }

    fn measure_row(&mut self, row: &Node, recursive: bool) {
        if row.is_standalone() {
            return;
        }

        let row_kind = match row.kind {
            NodeKind::Null => ColumnKind::Unknown,
            NodeKind::Number => ColumnKind::Number,
            NodeKind::Array => ColumnKind::Array,
            NodeKind::Object => ColumnKind::Object,
            _ => ColumnKind::Simple,
        };

        if self.column_kind == ColumnKind::Unknown {
            self.column_kind = row_kind;
        } else if row_kind != ColumnKind::Unknown && self.column_kind != row_kind {
            self.column_kind = ColumnKind::Mixed;
        }

        if row.kind == NodeKind::Null {
            // A null in a number column sits left of the decimal point.
            self.max_digits_before_dec = self.max_digits_before_dec.max(self.pads.null_width());
            self.contains_null = true;
        }

        if row.requires_multiple_lines {
            self.requires_multiple_lines = true;
            self.column_kind = ColumnKind::Mixed;
        }

        self.row_count += 1;
        self.name_width = self.name_width.max(row.name_width);
        self.max_value_width = self.max_value_width.max(row.value_width);
        self.prefix_comment_width = self.prefix_comment_width.max(row.prefix_comment_width);
        self.middle_comment_width = self.middle_comment_width.max(row.middle_comment_width);
        self.postfix_comment_width = self.postfix_comment_width.max(row.postfix_comment_width);

        if row.complexity >= 2 {
            self.pad_kind = PadKind::Complex;
        }

        if self.requires_multiple_lines || row.kind == NodeKind::Null {
            return;
        }

        if self.column_kind == ColumnKind::Array && recursive {
            for (i, cell) in row.children.iter().enumerate() {
                if self.children.len() <= i {
                    self.children.push(self.sub_plan());
                }
                self.children[i].measure_row(cell, true);
            }
        } else if self.column_kind == ColumnKind::Object && recursive {
            if has_duplicate_names(&row.children) {
                self.column_kind = ColumnKind::Simple;
                return;
            }

            for (i, cell) in row.children.iter().enumerate() {
                let found = self
                    .children
                    .iter()
                    .position(|col| col.location_in_parent.as_deref() == Some(cell.name.as_str()));
                match found {
                    Some(idx) => {
                        self.children[idx].index_sum += i;
                        self.children[idx].measure_row(cell, true);
                    }
                    None => {
                        let mut col = self.sub_plan();
                        col.location_in_parent = Some(cell.name.clone());
                        col.index_sum = i;
                        col.measure_row(cell, true);
                        self.children.push(col);
                    }
                }
            }
        }

        if self.column_kind != ColumnKind::Number
            || matches!(self.alignment, NumberAlignment::Left | NumberAlignment::Right)
        {
            return;
        }

        let mut digit_text = row.value.clone();
        if self.alignment == NumberAlignment::Normalize {
            let parsed: f64 = digit_text.parse().unwrap_or(f64::NAN);
            digit_text = parsed.to_string();

            let safe_to_rewrite = parsed.is_finite()
                && digit_text.len() <= 16
                && !digit_text.contains('e')
                && (parsed != 0.0 || is_genuinely_zero(&row.value));
            if !safe_to_rewrite {
                self.alignment = NumberAlignment::Left;
                return;
            }
        }

        let (before, after) = match dot_or_exp_index(&digit_text) {
            Some(idx) => (idx, digit_text.len().saturating_sub(idx + 1)),
            None => (digit_text.len(), 0),
        };
        self.max_digits_before_dec = self.max_digits_before_dec.max(before);
        self.max_digits_after_dec = self.max_digits_after_dec.max(after);
    }

    /// Object columns render in the order properties dominantly appeared
    /// across rows: ascending mean position, stable for ties.
    fn order_object_columns(&mut self) {
        for child in &mut self.children {
            child.order_object_columns();
        }
        if self.column_kind != ColumnKind::Object || self.children.len() < 2 {
            return;
        }
        self.children.sort_by(|a, b| {
            let mean_a = a.index_sum as f64 / a.row_count as f64;
            let mean_b = b.index_sum as f64 / b.row_count as f64;
            mean_a.total_cmp(&mean_b)
        });
    }

    /// True when enough row/column cells are occupied for alignment to be
    /// worth it. Thresholds above 100 can never pass, disabling the
    /// corresponding table kind.
    fn occupancy_ok(&self) -> bool {
        if self.children.is_empty() {
            return true;
        }
        let minimum = match self.column_kind {
            ColumnKind::Object => self.object_similarity,
            ColumnKind::Array => self.array_similarity,
            _ => return true,
        };
        let present: usize = self.children.iter().map(|col| col.row_count).sum();
        let cells = self.row_count * self.children.len();
        let occupancy = 100.0 * present as f64 / cells as f64;
        occupancy >= minimum
    }

    fn prune_and_recompute(&mut self, max_depth: usize) {
        let drop_children = max_depth == 0
            || !matches!(self.column_kind, ColumnKind::Array | ColumnKind::Object)
            || self.row_count < 2
            || !self.occupancy_ok();
        if drop_children {
            self.children.clear();
        }

        for child in &mut self.children {
            child.prune_and_recompute(max_depth.saturating_sub(1));
        }

        if self.column_kind == ColumnKind::Number {
            self.composite_value_width = self.number_field_width();
        } else if !self.children.is_empty() {
            let child_total: usize = self.children.iter().map(|col| col.total_width).sum();
            self.composite_value_width = child_total
                + self.pads.comma_width() * (self.children.len() - 1)
                + self.pads.arr_start_width(self.pad_kind)
                + self.pads.arr_end_width(self.pad_kind);
            if self.contains_null {
                self.composite_value_width =
                    self.composite_value_width.max(self.pads.null_width());
            }
        } else {
            self.composite_value_width = self.max_value_width;
        }

        let with_pad = |w: usize, pad: usize| if w > 0 { w + pad } else { 0 };
        self.total_width = with_pad(self.prefix_comment_width, self.pads.comment_width())
            + with_pad(self.name_width, self.pads.colon_width())
            + with_pad(self.middle_comment_width, self.pads.comment_width())
            + self.composite_value_width
            + with_pad(self.postfix_comment_width, self.pads.comment_width());
    }

    fn plan_depth(&self) -> usize {
        match self.children.iter().map(ColumnPlan::plan_depth).max() {
            Some(deepest) => deepest + 1,
            None => 0,
        }
    }

    fn number_field_width(&self) -> usize {
        match self.alignment {
            NumberAlignment::Decimal | NumberAlignment::Normalize => {
                let dot = usize::from(self.max_digits_after_dec > 0);
                self.max_digits_before_dec + dot + self.max_digits_after_dec
            }
            NumberAlignment::Left | NumberAlignment::Right => self.max_value_width,
        }
    }
}

fn dot_or_exp_index(value: &str) -> Option<usize> {
    value.find(['.', 'e', 'E'])
}

/// Distinguishes source tokens that are exactly zero (`0`, `0.00`,
/// `0.0e75`) from nonzero values that would merely round to zero.
fn is_genuinely_zero(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let mut saw_digit = false;
    for ch in digits.chars() {
        match ch {
            'e' | 'E' => return saw_digit,
            '0' | '.' => saw_digit = true,
            _ => return false,
        }
    }
    saw_digit
}

fn has_duplicate_names(rows: &[Node]) -> bool {
    let mut seen = HashSet::new();
    rows.iter().any(|row| !seen.insert(row.name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::width;

    fn measured_root(input: &str, opts: &FormatOptions) -> Node {
        let mut items = Parser::new(opts.clone()).parse_top_level(input, true).unwrap();
        let mut root = items.remove(0);
        crate::layout::measure_for_tests(&mut root, opts, width::char_count);
        root
    }

    fn plan_for(input: &str, opts: &FormatOptions) -> ColumnPlan {
        let root = measured_root(input, opts);
        let pads = PadTokens::new(opts, width::char_count);
        let mut plan = ColumnPlan::new(pads, opts);
        plan.measure_root(&root, true);
        plan
    }

    #[test]
    fn uniform_object_rows_make_columns() {
        let opts = FormatOptions::default();
        let plan = plan_for(
            r#"[{"x": 1, "y": 2}, {"x": 10, "y": 20}]"#,
            &opts,
        );
        assert_eq!(plan.column_kind, ColumnKind::Object);
        assert_eq!(plan.children.len(), 2);
        assert_eq!(plan.children[0].location_in_parent.as_deref(), Some("\"x\""));
        assert_eq!(plan.children[0].column_kind, ColumnKind::Number);
        assert_eq!(plan.children[0].row_count, 2);
    }

    #[test]
    fn mixed_kinds_demote_column() {
        let opts = FormatOptions::default();
        let plan = plan_for(r#"[[1, "a"], [2, "b"]]"#, &opts);
        assert_eq!(plan.children[0].column_kind, ColumnKind::Number);
        assert_eq!(plan.children[1].column_kind, ColumnKind::Simple);

        let mixed = plan_for(r#"[[1], ["a"]]"#, &opts);
        assert_eq!(mixed.children[0].column_kind, ColumnKind::Mixed);
    }

    #[test]
    fn null_does_not_change_column_kind() {
        let opts = FormatOptions::default();
        let plan = plan_for("[[1], [null], [3]]", &opts);
        assert_eq!(plan.children[0].column_kind, ColumnKind::Number);
        assert!(plan.children[0].contains_null);
        // null reserves room left of the decimal point
        assert!(plan.children[0].max_digits_before_dec >= 4);
    }

    #[test]
    fn duplicate_keys_demote_to_simple() {
        let opts = FormatOptions::default();
        let plan = plan_for(
            r#"[{"y": 4, "z": 5}, {"y": 44, "z": 55, "z": 66}]"#,
            &opts,
        );
        assert_eq!(plan.column_kind, ColumnKind::Simple);
    }

    #[test]
    fn decimal_stats_cover_both_sides() {
        let opts = FormatOptions::default();
        let plan = plan_for("[[1], [2.25], [-99]]", &opts);
        let col = &plan.children[0];
        assert_eq!(col.max_digits_before_dec, 3);
        assert_eq!(col.max_digits_after_dec, 2);
        // 3 before + dot + 2 after
        assert_eq!(col.composite_value_width, 6);
    }

    #[test]
    fn normalize_falls_back_on_exponents() {
        let mut opts = FormatOptions::default();
        opts.number_list_alignment = NumberAlignment::Normalize;
        let plan = plan_for("[[1e300], [2]]", &opts);
        // f64 Display of 1e300 is far over 16 chars, so rewriting is unsafe
        assert_eq!(plan.children[0].alignment, NumberAlignment::Left);
    }

    #[test]
    fn similarity_below_threshold_rejects_columns() {
        let mut opts = FormatOptions::default();
        opts.table_object_minimum_similarity = 75.0;
        // Second row shares only one of four distinct keys: 5 present
        // cells out of 8 is 62.5%.
        let plan = plan_for(
            r#"[{"a":1,"b":2,"c":3,"d":4}, {"a":9}]"#,
            &opts,
        );
        assert!(plan.children.is_empty());
        assert!(!plan.has_alignment());
    }

    #[test]
    fn similarity_sentinel_disables_tables() {
        let mut opts = FormatOptions::default();
        opts.table_object_minimum_similarity = 101.0;
        let plan = plan_for(r#"[{"x": 1}, {"x": 2}]"#, &opts);
        assert!(plan.children.is_empty());
    }

    #[test]
    fn object_columns_follow_mean_input_position() {
        let opts = FormatOptions::default();
        // "b" leads in two rows out of three; it should come out first.
        let plan = plan_for(
            r#"[{"b":1,"a":2}, {"b":3,"a":4}, {"a":5,"b":6}]"#,
            &opts,
        );
        let order: Vec<&str> = plan
            .children
            .iter()
            .map(|c| c.location_in_parent.as_deref().unwrap())
            .collect();
        assert_eq!(order, vec!["\"b\"", "\"a\""]);
    }

    #[test]
    fn try_to_fit_prunes_depth_first() {
        let opts = FormatOptions::default();
        let mut plan = plan_for(
            r#"[[[1, 2], [3, 4]], [[5, 6], [7, 8]]]"#,
            &opts,
        );
        let wide = plan.total_width;
        assert!(plan.try_to_fit(wide));
        // An impossible budget prunes everything and fails.
        let mut plan2 = plan_for(r#"[[[1, 2]], [[3, 4]]]"#, &opts);
        assert!(!plan2.try_to_fit(1));
        assert!(plan2.children.is_empty());
    }

    #[test]
    fn genuinely_zero_tokens() {
        for zero in ["0", "0.00", "0.0e75", "-0.0"] {
            assert!(is_genuinely_zero(zero), "{zero}");
        }
        for nonzero in ["0.001", "1", "-5e-3"] {
            assert!(!is_genuinely_zero(nonzero), "{nonzero}");
        }
    }
}
