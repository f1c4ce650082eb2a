//! Printer for decorated Go syntax trees.
//!
//! Output follows gofmt's layout: tab indentation, one statement per line,
//! operator spacing chosen from expression nesting depth, and column
//! alignment of key-value lists, struct fields, grouped specs and trailing
//! comments. Layout recorded in [`Decorations`] and [`Enclosure`] (blank
//! lines, line breaks inside lists, comments) is reproduced.
//!
//! # Example
//!
//! ```
//! use attrsplit_syntax::{parse_file, pretty::print_file};
//!
//! let source = "package fastly\n\nfunc f() {\n\tx := map[string]int{\"a\": 1}\n\t_ = x\n}\n";
//! let file = parse_file(source).unwrap();
//! assert_eq!(print_file(&file), source);
//! ```

use crate::ast::{
    BinaryOp, Block, CallExpr, CaseClause, ChanDir, CommClause, Comment, CompositeLit, Decl,
    DeclKind, Decorations, Else, Enclosure, Expr, Field, FieldList, File, FuncDecl, FuncType,
    GenDecl, IfStmt, Spec, SpecKind, Stmt, StmtKind, UnaryOp,
};

/// Keys at most this wide always share an alignment section with their neighbours.
const SMALL_KEY_WIDTH: usize = 40;

/// Size ratio against the running mean of key widths that starts a new section.
const KEY_SIZE_RATIO: f64 = 2.5;

/// Configuration for printing.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Align cells of consecutive rows (keys, field types, trailing comments).
    pub align_columns: bool,
    /// Maximum width of a function kept on one line when written that way.
    pub one_line_limit: usize,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            align_columns: true,
            one_line_limit: 100,
        }
    }
}

/// Print a file with the default configuration.
#[must_use]
pub fn print_file(file: &File) -> String {
    print_file_with_config(file, &PrettyConfig::default())
}

/// Print a file with custom configuration.
#[must_use]
pub fn print_file_with_config(file: &File, config: &PrettyConfig) -> String {
    PrettyPrinter::new(config).file(file)
}

/// Print a single expression as it would appear at the start of a line.
#[must_use]
pub fn print_expr(expr: &Expr) -> String {
    PrettyPrinter::new(&PrettyConfig::default()).expr(expr, 0)
}

// =============================================================================
// Column layout
// =============================================================================

/// A line of output: cells separated by alignment stops, or a layout marker.
#[derive(Debug)]
enum Line {
    /// Cells of one line; every cell but the last is padded to its column.
    Row { indent: usize, cells: Vec<String> },
    /// An empty line. Ends the current alignment section.
    Blank,
    /// Ends the current alignment section without output.
    Section,
}

/// Lines collected for one indented list, aligned the way an elastic
/// tabstop writer aligns them: a column spans consecutive rows that all
/// have a cell in it.
#[derive(Debug)]
struct Layout {
    lines: Vec<Line>,
    align: bool,
}

impl Layout {
    const fn new(align: bool) -> Self {
        Self {
            lines: Vec::new(),
            align,
        }
    }

    fn row(&mut self, indent: usize, cells: Vec<String>) {
        // Only the last cell may span lines; whatever follows joins it.
        let mut merged: Vec<String> = Vec::with_capacity(cells.len());
        for cell in cells {
            let joins = merged.last().is_some_and(|last| last.contains('\n'));
            if !joins {
                merged.push(cell);
            } else if let Some(last) = merged.last_mut() {
                if !cell.is_empty() {
                    last.push(' ');
                    last.push_str(&cell);
                }
            }
        }
        self.lines.push(Line::Row {
            indent,
            cells: merged,
        });
    }

    fn text(&mut self, indent: usize, text: impl Into<String>) {
        self.row(indent, vec![text.into()]);
    }

    /// Adds own-line comments, honouring the blank line before each one.
    fn comments(&mut self, indent: usize, comments: &[Comment], first: bool) {
        for (i, comment) in comments.iter().enumerate() {
            if comment.blank_before && !(first && i == 0) {
                self.blank();
            }
            self.text(indent, comment.text.clone());
        }
    }

    fn blank(&mut self) {
        if !matches!(self.lines.last(), None | Some(Line::Blank)) {
            self.lines.push(Line::Blank);
        }
    }

    fn section(&mut self) {
        self.lines.push(Line::Section);
    }

    fn is_empty(&self) -> bool {
        !self.lines.iter().any(|line| matches!(line, Line::Row { .. }))
    }

    /// Renders every row with its indentation and a closing newline.
    fn render(&self) -> String {
        let mut out = String::new();
        let mut segment: Vec<(usize, &[String])> = Vec::new();
        let mut pending_blank = false;
        for line in &self.lines {
            match line {
                Line::Row { indent, cells } => {
                    if segment.last().is_some_and(|(prev, _)| prev != indent) {
                        self.flush(&mut out, &segment);
                        segment.clear();
                    }
                    if pending_blank {
                        out.push('\n');
                        pending_blank = false;
                    }
                    segment.push((*indent, cells.as_slice()));
                    if cells.last().is_some_and(|cell| cell.contains('\n')) {
                        self.flush(&mut out, &segment);
                        segment.clear();
                    }
                }
                Line::Blank => {
                    self.flush(&mut out, &segment);
                    segment.clear();
                    pending_blank = true;
                }
                Line::Section => {
                    self.flush(&mut out, &segment);
                    segment.clear();
                }
            }
        }
        self.flush(&mut out, &segment);
        out
    }

    fn flush(&self, out: &mut String, rows: &[(usize, &[String])]) {
        let mut widths: Vec<Vec<usize>> = rows
            .iter()
            .map(|(_, cells)| vec![0; cells.len().saturating_sub(1)])
            .collect();
        if self.align {
            assign_widths(rows, &mut widths, 0, 0, rows.len());
        }
        for ((indent, cells), widths) in rows.iter().zip(&widths) {
            let mut line = "\t".repeat(*indent);
            for (i, cell) in cells.iter().enumerate() {
                line.push_str(cell);
                let Some(width) = widths.get(i) else {
                    continue;
                };
                if self.align {
                    line.push_str(&" ".repeat(width.saturating_sub(text_width(cell))));
                } else if !cell.is_empty() {
                    line.push(' ');
                }
            }
            let line = line.trim_end_matches(' ');
            if !line.trim().is_empty() {
                out.push_str(line);
            }
            out.push('\n');
        }
    }
}

/// Computes column widths for `rows[start..end]` from `column` on.
fn assign_widths(
    rows: &[(usize, &[String])],
    widths: &mut [Vec<usize>],
    column: usize,
    start: usize,
    end: usize,
) {
    let mut this = start;
    while this < end {
        if column >= widths[this].len() {
            this += 1;
            continue;
        }
        let block = this;
        let mut width = 0;
        let mut empty = true;
        while this < end && column < widths[this].len() {
            let cell = &rows[this].1[column];
            width = width.max(text_width(cell) + 1);
            empty &= cell.is_empty();
            this += 1;
        }
        // Columns with no text at all take no space.
        if empty {
            width = 0;
        }
        for row in &mut widths[block..this] {
            row[column] = width;
        }
        assign_widths(rows, widths, column + 1, block, this);
    }
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

fn first_line_width(text: &str) -> usize {
    if text.contains('\n') {
        usize::MAX / 2
    } else {
        text_width(text)
    }
}

fn is_line_comment(comment: &Comment) -> bool {
    comment.text.starts_with("//")
}

fn with_comment(text: String, comment: Option<&Comment>) -> Vec<String> {
    let mut cells = vec![text];
    if let Some(comment) = comment {
        cells.push(comment.text.clone());
    }
    cells
}

/// Returns true if a key of `size` should start a new alignment section
/// after a neighbour of `prev_size`, given the log sum of earlier sizes.
#[allow(clippy::cast_precision_loss)]
fn starts_section(prev_size: usize, size: usize, log_sum: f64, count: usize) -> bool {
    if prev_size == 0 || size == 0 {
        return true;
    }
    if count == 0 || (prev_size <= SMALL_KEY_WIDTH && size <= SMALL_KEY_WIDTH) {
        return false;
    }
    let mean = (log_sum / count as f64).exp();
    let ratio = size as f64 / mean;
    KEY_SIZE_RATIO * ratio <= 1.0 || KEY_SIZE_RATIO <= ratio
}

// =============================================================================
// Operator spacing
// =============================================================================

/// Collects whether precedence 4 and 5 operators occur and the worst
/// token-gluing hazard in an unparenthesized binary chain.
fn walk_binary(x: &Expr, op: BinaryOp, y: &Expr) -> (bool, bool, u8) {
    let prec = op.precedence();
    let mut has4 = prec == 4;
    let mut has5 = prec == 5;
    let mut problem = 0;

    if let Expr::Binary {
        x: lx, op: lop, y: ly, ..
    } = x
    {
        if lop.precedence() >= prec {
            let (h4, h5, p) = walk_binary(lx, *lop, ly);
            has4 |= h4;
            has5 |= h5;
            problem = problem.max(p);
        }
    }

    match y {
        Expr::Binary {
            x: rx, op: rop, y: ry, ..
        } if rop.precedence() > prec => {
            let (h4, h5, p) = walk_binary(rx, *rop, ry);
            has4 |= h4;
            has5 |= h5;
            problem = problem.max(p);
        }
        Expr::Star(_) if op == BinaryOp::Quo => problem = 5,
        Expr::Unary(unary, _) => match (op, unary) {
            (BinaryOp::And, UnaryOp::Addr | UnaryOp::Xor) => problem = 5,
            (BinaryOp::Add, UnaryOp::Pos) | (BinaryOp::Sub, UnaryOp::Neg) => {
                problem = problem.max(4);
            }
            _ => {}
        },
        _ => {}
    }
    (has4, has5, problem)
}

/// Operators binding weaker than the cutoff are surrounded by blanks.
fn cutoff(x: &Expr, op: BinaryOp, y: &Expr, depth: usize) -> u8 {
    let (has4, has5, problem) = walk_binary(x, op, y);
    if problem > 0 {
        return problem + 1;
    }
    match (has4 && has5, depth == 1) {
        (true, true) => 5,
        (false, true) => 6,
        (_, false) => 4,
    }
}

const fn reduce_depth(depth: usize) -> usize {
    if depth > 1 { depth - 1 } else { 1 }
}

/// Returns true if writing `right` directly after `left` would lex as a
/// different token.
fn tokens_combine(left: &str, right: &str) -> bool {
    matches!(
        (left.chars().last(), right.chars().next()),
        (Some('+'), Some('+'))
            | (Some('-'), Some('-'))
            | (Some('/'), Some('*' | '/'))
            | (Some('<'), Some('-' | '<'))
            | (Some('&'), Some('&' | '^'))
    )
}

fn join_operator(op: &str, operand: &str) -> String {
    if tokens_combine(op, operand) {
        format!("{op} {operand}")
    } else {
        format!("{op}{operand}")
    }
}

/// Removes redundant parentheses around a control clause expression.
fn strip_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(inner) if !has_bare_composite(inner) => strip_parens(inner),
        _ => expr,
    }
}

/// Returns true if a composite literal with a named type appears outside
/// any parentheses; such a literal would open the statement's block.
fn has_bare_composite(expr: &Expr) -> bool {
    match expr {
        Expr::Composite(lit) => lit
            .ty
            .as_deref()
            .is_some_and(|ty| matches!(ty, Expr::Ident(_) | Expr::Selector(..))),
        Expr::Binary { x, y, .. } | Expr::Index(x, y) | Expr::KeyValue(x, y) => {
            has_bare_composite(x) || has_bare_composite(y)
        }
        Expr::Unary(_, x) | Expr::Star(x) | Expr::Selector(x, _) | Expr::TypeAssert(x, _) => {
            has_bare_composite(x)
        }
        Expr::Call(call) => {
            has_bare_composite(&call.fun) || call.args.iter().any(|arg| has_bare_composite(&arg.expr))
        }
        Expr::Slice { x, low, high, max } => {
            has_bare_composite(x)
                || [low, high, max]
                    .into_iter()
                    .any(|bound| bound.as_deref().is_some_and(has_bare_composite))
        }
        _ => false,
    }
}

/// Keeps the type column of grouped value specs when a run of specs with
/// values contains an explicit type.
fn keep_type_column(specs: &[Spec]) -> Vec<bool> {
    let mut keep = vec![false; specs.len()];
    let mut run_start: Option<usize> = None;
    let mut typed = false;
    for (i, spec) in specs.iter().enumerate() {
        let (has_values, has_type) = match &spec.kind {
            SpecKind::Value { ty, values, .. } => (!values.is_empty(), ty.is_some()),
            _ => (false, false),
        };
        if has_values {
            if run_start.is_none() {
                run_start = Some(i);
                typed = false;
            }
        } else if let Some(start) = run_start.take() {
            if typed {
                keep[start..i].fill(true);
            }
        }
        typed |= has_type;
    }
    if let Some(start) = run_start {
        if typed {
            keep[start..].fill(true);
        }
    }
    keep
}

// =============================================================================
// Printer
// =============================================================================

/// One element of a bracketed list, rendered for a given line indent.
struct ListItem {
    text: String,
    /// Key and value of a `key: value` element.
    pair: Option<(String, String)>,
}

impl ListItem {
    const fn plain(text: String) -> Self {
        Self { text, pair: None }
    }
}

/// Elements sharing one output line of a multi-line list.
struct ListLine {
    texts: Vec<String>,
    pair: Option<(String, String)>,
    comment: Option<String>,
}

impl ListLine {
    fn append_inline(&mut self, comment: &str) {
        if let Some(last) = self.texts.last_mut() {
            last.push(' ');
            last.push_str(comment);
        }
        if let Some((_, value)) = &mut self.pair {
            value.push(' ');
            value.push_str(comment);
        }
    }

    fn push_to(self, layout: &mut Layout, indent: usize) {
        let mut cells = match self.pair {
            Some((key, value)) if self.texts.len() == 1 => vec![key, value],
            _ => vec![self.texts.join(" ")],
        };
        cells.extend(self.comment);
        layout.row(indent, cells);
    }
}

/// Printer state.
struct PrettyPrinter<'a> {
    config: &'a PrettyConfig,
}

impl<'a> PrettyPrinter<'a> {
    const fn new(config: &'a PrettyConfig) -> Self {
        Self { config }
    }

    const fn layout(&self) -> Layout {
        Layout::new(self.config.align_columns)
    }

    // -------------------------------------------------------------------------
    // Files and declarations
    // -------------------------------------------------------------------------

    fn file(&self, file: &File) -> String {
        let mut layout = self.layout();
        let package = &file.package_decs;
        layout.comments(0, &package.leading, true);
        if !package.leading.is_empty() && package.blank_before {
            layout.blank();
        }
        layout.row(
            0,
            with_comment(format!("package {}", file.package), package.trailing.as_ref()),
        );

        let mut prev: Option<&str> = None;
        for decl in &file.decls {
            let keyword = match &decl.kind {
                DeclKind::Func(_) => "func",
                DeclKind::Gen(gen_decl) => gen_decl.keyword.as_str(),
            };
            let decs = &decl.decs;
            let doc = !decs.leading.is_empty() && !decs.blank_before;
            let comment_gap = decs.leading.first().is_some_and(|c| c.blank_before);
            if prev != Some(keyword) || doc || decs.blank_before || comment_gap {
                layout.blank();
            }
            layout.comments(0, &decs.leading, true);
            if !decs.leading.is_empty() && decs.blank_before {
                layout.blank();
            }
            layout.row(0, with_comment(self.decl(decl), decs.trailing.as_ref()));
            prev = Some(keyword);
        }

        for comment in &file.trailing_comments {
            if comment.blank_before {
                layout.blank();
            }
            layout.text(0, comment.text.clone());
        }
        layout.render()
    }

    fn decl(&self, decl: &Decl) -> String {
        match &decl.kind {
            DeclKind::Func(func) => self.func_decl(func, 0),
            DeclKind::Gen(gen_decl) => self.gen_decl(gen_decl, 0),
        }
    }

    fn func_decl(&self, func: &FuncDecl, indent: usize) -> String {
        let mut head = String::from("func ");
        if let Some(recv) = &func.recv {
            head.push_str(&self.params(recv, indent));
            head.push(' ');
        }
        head.push_str(&func.name);
        head.push_str(&self.signature(&func.ty, indent));
        match &func.body {
            Some(body) => {
                let body = self.func_body(body, indent, first_line_width(&head));
                format!("{head} {body}")
            }
            None => head,
        }
    }

    fn gen_decl(&self, decl: &GenDecl, indent: usize) -> String {
        let keyword = decl.keyword.as_str();
        let Some(group) = &decl.group else {
            return match decl.specs.first() {
                Some(spec) => format!("{keyword} {}", self.spec(spec, indent)),
                None => format!("{keyword} ()"),
            };
        };
        if decl.specs.is_empty() && !group.has_comments() {
            return format!("{keyword} ()");
        }

        let inner = indent + 1;
        let keep = keep_type_column(&decl.specs);
        let mut layout = self.layout();
        for (i, spec) in decl.specs.iter().enumerate() {
            self.leading_rows(&mut layout, &spec.decs, inner, i == 0);
            let cells = self.spec_cells(spec, decl.specs.len(), keep[i], inner);
            layout.row(inner, cells);
        }
        layout.comments(inner, &group.close_comments, decl.specs.is_empty());
        format!("{keyword} {}", self.braced("(", ")", group, &layout, indent))
    }

    fn spec(&self, spec: &Spec, indent: usize) -> String {
        match &spec.kind {
            SpecKind::Import { name, path } => match name {
                Some(name) => format!("{name} {path}"),
                None => path.clone(),
            },
            SpecKind::Value { names, ty, values } => {
                let mut out = names.join(", ");
                if let Some(ty) = ty {
                    out.push(' ');
                    out.push_str(&self.expr(ty, indent));
                }
                if !values.is_empty() {
                    out.push_str(" = ");
                    out.push_str(&self.expr_list(values, 1, indent));
                }
                out
            }
            SpecKind::Type { name, alias, ty } => {
                let assign = if *alias { "= " } else { "" };
                format!("{name} {assign}{}", self.expr(ty, indent))
            }
        }
    }

    /// Cells of a spec inside a parenthesized group of `count` specs.
    fn spec_cells(&self, spec: &Spec, count: usize, keep_type: bool, indent: usize) -> Vec<String> {
        let comment = spec.decs.trailing.as_ref().map(|c| c.text.clone());
        let mut cells = match &spec.kind {
            SpecKind::Value { names, ty, values } if count > 1 => {
                let mut cells = vec![names.join(", ")];
                // The comment sits in the fourth column whatever is missing.
                let mut stops = 3;
                if ty.is_some() || keep_type {
                    cells.push(ty.as_ref().map(|ty| self.expr(ty, indent)).unwrap_or_default());
                    stops -= 1;
                }
                if !values.is_empty() {
                    cells.push(format!("= {}", self.expr_list(values, 1, indent)));
                    stops -= 1;
                }
                if comment.is_some() {
                    for _ in 1..stops {
                        cells.push(String::new());
                    }
                }
                cells
            }
            SpecKind::Type { name, alias, ty } if count > 1 => {
                let assign = if *alias { "= " } else { "" };
                vec![name.clone(), format!("{assign}{}", self.expr(ty, indent))]
            }
            _ => vec![self.spec(spec, indent)],
        };
        cells.extend(comment);
        cells
    }

    // -------------------------------------------------------------------------
    // Signatures and field lists
    // -------------------------------------------------------------------------

    fn signature(&self, ty: &FuncType, indent: usize) -> String {
        let mut out = self.params(&ty.params, indent);
        if let Some(results) = &ty.results {
            out.push(' ');
            match results.fields.as_slice() {
                [field]
                    if field.names.is_empty()
                        && !field.decs.has_comments()
                        && !results.enclosure.has_comments() =>
                {
                    out.push_str(&self.expr(&field.ty, indent));
                }
                _ => out.push_str(&self.params(results, indent)),
            }
        }
        out
    }

    fn params(&self, list: &FieldList, indent: usize) -> String {
        let decs: Vec<&Decorations> = list.fields.iter().map(|field| &field.decs).collect();
        self.list("(", ")", &decs, &list.enclosure, indent, false, |i, line| {
            ListItem::plain(self.field(&list.fields[i], line))
        })
    }

    fn field(&self, field: &Field, indent: usize) -> String {
        let ty = self.expr(&field.ty, indent);
        let mut out = if field.names.is_empty() {
            ty
        } else {
            format!("{} {ty}", field.names.join(", "))
        };
        if let Some(tag) = &field.tag {
            out.push(' ');
            out.push_str(tag);
        }
        out
    }

    /// A struct field or interface element written on one line.
    fn member(&self, field: &Field, indent: usize, is_struct: bool) -> String {
        if !is_struct {
            if let (Expr::FuncType(ty), [name]) = (&field.ty, field.names.as_slice()) {
                return format!("{name}{}", self.signature(ty, indent));
            }
        }
        self.field(field, indent)
    }

    fn struct_field_cells(&self, field: &Field, indent: usize) -> Vec<String> {
        let ty = self.expr(&field.ty, indent);
        let (mut cells, mut stops) = if field.names.is_empty() {
            (vec![ty], 2)
        } else {
            (vec![field.names.join(", "), ty], 1)
        };
        if let Some(tag) = &field.tag {
            if field.names.is_empty() {
                cells.push(String::new());
            }
            cells.push(tag.clone());
            stops = 0;
        }
        if let Some(comment) = &field.decs.trailing {
            for _ in 1..stops {
                cells.push(String::new());
            }
            cells.push(comment.text.clone());
        }
        cells
    }

    fn field_block(&self, keyword: &str, list: &FieldList, indent: usize, is_struct: bool) -> String {
        let one_line = !list.enclosure.close_newline
            && !list.enclosure.has_comments()
            && list
                .fields
                .iter()
                .all(|field| !field.decs.breaks_line() && !field.decs.has_comments());
        if one_line {
            match list.fields.as_slice() {
                [] => return format!("{keyword}{{}}"),
                [field] => {
                    return format!("{keyword}{{ {} }}", self.member(field, indent, is_struct));
                }
                _ => {}
            }
        }

        let inner = indent + 1;
        let mut layout = self.layout();
        for (i, field) in list.fields.iter().enumerate() {
            self.leading_rows(&mut layout, &field.decs, inner, i == 0);
            let cells = if is_struct {
                self.struct_field_cells(field, inner)
            } else {
                with_comment(self.member(field, inner, false), field.decs.trailing.as_ref())
            };
            layout.row(inner, cells);
        }
        layout.comments(inner, &list.enclosure.close_comments, list.fields.is_empty());
        format!("{keyword} {}", self.braced("{", "}", &list.enclosure, &layout, indent))
    }

    // -------------------------------------------------------------------------
    // Blocks and statements
    // -------------------------------------------------------------------------

    /// Writes `open`, the rendered rows, and `close` at `indent`.
    fn braced(
        &self,
        open: &str,
        close: &str,
        enclosure: &Enclosure,
        layout: &Layout,
        indent: usize,
    ) -> String {
        let mut out = String::from(open);
        if let Some(comment) = &enclosure.open_comment {
            out.push(' ');
            out.push_str(&comment.text);
        }
        out.push('\n');
        out.push_str(&layout.render());
        out.push_str(&"\t".repeat(indent));
        out.push_str(close);
        out
    }

    /// A function body, kept on one line when the source wrote it so and it fits.
    fn func_body(&self, body: &Block, indent: usize, header: usize) -> String {
        let plain = !body.enclosure.has_comments()
            && body.stmts.iter().all(|stmt| !stmt.decs.has_comments());
        if body.one_line && plain && body.stmts.len() <= 5 {
            let stmts: Vec<String> = body
                .stmts
                .iter()
                .map(|stmt| self.stmt(stmt, indent + 1))
                .collect();
            let size = stmts
                .iter()
                .map(|stmt| text_width(stmt))
                .sum::<usize>()
                .saturating_add(header)
                .saturating_add(2 * stmts.len().saturating_sub(1));
            if size <= self.config.one_line_limit && stmts.iter().all(|stmt| !stmt.contains('\n')) {
                return if stmts.is_empty() {
                    "{}".into()
                } else {
                    format!("{{ {} }}", stmts.join("; "))
                };
            }
        }
        self.block(body, indent)
    }

    fn block(&self, block: &Block, indent: usize) -> String {
        let mut layout = self.layout();
        self.stmt_rows(&mut layout, &block.stmts, indent + 1);
        layout.comments(indent + 1, &block.enclosure.close_comments, layout.is_empty());
        self.braced("{", "}", &block.enclosure, &layout, indent)
    }

    fn leading_rows(&self, layout: &mut Layout, decs: &Decorations, indent: usize, first: bool) {
        layout.comments(indent, &decs.leading, first);
        if decs.blank_before && !(first && decs.leading.is_empty()) {
            layout.blank();
        }
    }

    fn stmt_rows(&self, layout: &mut Layout, stmts: &[Stmt], indent: usize) {
        let mut first = true;
        for stmt in stmts {
            if matches!(stmt.kind, StmtKind::Empty) && !stmt.decs.has_comments() {
                continue;
            }
            self.leading_rows(layout, &stmt.decs, indent, first);
            self.stmt_row(layout, stmt, stmt.decs.trailing.as_ref(), indent);
            first = false;
        }
    }

    fn stmt_row(&self, layout: &mut Layout, stmt: &Stmt, trailing: Option<&Comment>, indent: usize) {
        if let StmtKind::Labeled { label, stmt: inner } = &stmt.kind {
            let label_indent = indent.saturating_sub(1);
            if matches!(inner.kind, StmtKind::Empty) {
                layout.row(label_indent, with_comment(format!("{label}:"), trailing));
            } else {
                layout.text(label_indent, format!("{label}:"));
                layout.comments(indent, &inner.decs.leading, true);
                self.stmt_row(layout, inner, trailing.or(inner.decs.trailing.as_ref()), indent);
            }
            return;
        }
        layout.row(indent, with_comment(self.stmt(stmt, indent), trailing));
    }

    fn stmt(&self, stmt: &Stmt, indent: usize) -> String {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr, indent),
            StmtKind::Assign { lhs, op, rhs } => {
                let depth = if lhs.len() > 1 && rhs.len() > 1 { 2 } else { 1 };
                format!(
                    "{} {} {}",
                    self.expr_list(lhs, depth, indent),
                    op.as_str(),
                    self.expr_list(rhs, depth, indent)
                )
            }
            StmtKind::IncDec { expr, inc } => {
                let op = if *inc { "++" } else { "--" };
                format!("{}{op}", self.expr_depth(expr, 2, indent))
            }
            StmtKind::Send { chan, value } => {
                format!("{} <- {}", self.expr(chan, indent), self.expr(value, indent))
            }
            StmtKind::Decl(decl) => self.gen_decl(decl, indent),
            StmtKind::Return(results) if results.is_empty() => "return".into(),
            StmtKind::Return(results) => format!("return {}", self.expr_list(results, 1, indent)),
            StmtKind::Branch { kind, label } => match label {
                Some(label) => format!("{} {label}", kind.as_str()),
                None => kind.as_str().into(),
            },
            StmtKind::Block(block) => self.block(block, indent),
            StmtKind::If(if_stmt) => self.if_stmt(if_stmt, indent),
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => format!(
                "for{}{}",
                self.control_clause(true, init.as_deref(), cond.as_ref(), post.as_deref(), indent),
                self.block(body, indent)
            ),
            StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            } => {
                let mut out = String::from("for ");
                if let Some(key) = key {
                    out.push_str(&self.expr(key, indent));
                    if let Some(value) = value {
                        out.push_str(", ");
                        out.push_str(&self.expr(value, indent));
                    }
                    out.push_str(if *define { " := " } else { " = " });
                }
                out.push_str("range ");
                out.push_str(&self.expr(strip_parens(expr), indent));
                out.push(' ');
                out.push_str(&self.block(body, indent));
                out
            }
            StmtKind::Switch {
                init,
                tag,
                clauses,
                enclosure,
            } => format!(
                "switch{}{}",
                self.control_clause(false, init.as_deref(), tag.as_ref(), None, indent),
                self.case_body(clauses, enclosure, indent)
            ),
            StmtKind::TypeSwitch {
                init,
                guard,
                clauses,
                enclosure,
            } => {
                let mut out = String::from("switch ");
                if let Some(init) = init {
                    out.push_str(&self.stmt(init, indent));
                    out.push_str("; ");
                }
                out.push_str(&self.stmt(guard, indent));
                out.push(' ');
                out.push_str(&self.case_body(clauses, enclosure, indent));
                out
            }
            StmtKind::Select { clauses, enclosure } => {
                format!("select {}", self.comm_body(clauses, enclosure, indent))
            }
            StmtKind::Go(call) => format!("go {}", self.expr(call, indent)),
            StmtKind::Defer(call) => format!("defer {}", self.expr(call, indent)),
            StmtKind::Labeled { label, stmt } => {
                if matches!(stmt.kind, StmtKind::Empty) {
                    format!("{label}:")
                } else {
                    format!("{label}:\n{}{}", "\t".repeat(indent), self.stmt(stmt, indent))
                }
            }
            StmtKind::Empty => String::new(),
        }
    }

    fn if_stmt(&self, if_stmt: &IfStmt, indent: usize) -> String {
        let mut out = format!(
            "if{}{}",
            self.control_clause(false, if_stmt.init.as_deref(), Some(&if_stmt.cond), None, indent),
            self.block(&if_stmt.then, indent)
        );
        match if_stmt.els.as_deref() {
            Some(Else::If(nested)) => {
                out.push_str(" else ");
                out.push_str(&self.if_stmt(nested, indent));
            }
            Some(Else::Block(block)) => {
                out.push_str(" else ");
                out.push_str(&self.block(block, indent));
            }
            None => {}
        }
        out
    }

    /// The header between a control keyword and its opening brace, with
    /// the surrounding blanks.
    fn control_clause(
        &self,
        is_for: bool,
        init: Option<&Stmt>,
        expr: Option<&Expr>,
        post: Option<&Stmt>,
        indent: usize,
    ) -> String {
        let mut out = String::from(" ");
        let mut needs_blank = false;
        if init.is_none() && post.is_none() {
            if let Some(expr) = expr {
                out.push_str(&self.expr(strip_parens(expr), indent));
                needs_blank = true;
            }
        } else {
            if let Some(init) = init {
                out.push_str(&self.stmt(init, indent));
            }
            out.push_str("; ");
            if let Some(expr) = expr {
                out.push_str(&self.expr(strip_parens(expr), indent));
                needs_blank = true;
            }
            if is_for {
                out.push_str("; ");
                needs_blank = false;
                if let Some(post) = post {
                    out.push_str(&self.stmt(post, indent));
                    needs_blank = true;
                }
            }
        }
        if needs_blank {
            out.push(' ');
        }
        out
    }

    fn case_body(&self, clauses: &[CaseClause], enclosure: &Enclosure, indent: usize) -> String {
        let mut layout = self.layout();
        for (i, clause) in clauses.iter().enumerate() {
            self.leading_rows(&mut layout, &clause.decs, indent, i == 0);
            let head = match &clause.list {
                Some(list) => format!("case {}:", self.expr_list(list, 1, indent)),
                None => "default:".into(),
            };
            layout.row(indent, with_comment(head, clause.decs.trailing.as_ref()));
            self.stmt_rows(&mut layout, &clause.body, indent + 1);
        }
        layout.comments(indent + 1, &enclosure.close_comments, clauses.is_empty());
        self.braced("{", "}", enclosure, &layout, indent)
    }

    fn comm_body(&self, clauses: &[CommClause], enclosure: &Enclosure, indent: usize) -> String {
        let mut layout = self.layout();
        for (i, clause) in clauses.iter().enumerate() {
            self.leading_rows(&mut layout, &clause.decs, indent, i == 0);
            let head = match &clause.comm {
                Some(comm) => format!("case {}:", self.stmt(comm, indent)),
                None => "default:".into(),
            };
            layout.row(indent, with_comment(head, clause.decs.trailing.as_ref()));
            self.stmt_rows(&mut layout, &clause.body, indent + 1);
        }
        layout.comments(indent + 1, &enclosure.close_comments, clauses.is_empty());
        self.braced("{", "}", enclosure, &layout, indent)
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn expr(&self, expr: &Expr, indent: usize) -> String {
        self.expr_depth(expr, 1, indent)
    }

    fn expr_list(&self, list: &[Expr], depth: usize, indent: usize) -> String {
        list.iter()
            .map(|expr| self.expr_depth(expr, depth, indent))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Prints `expr` starting on a line indented `indent` levels. `depth`
    /// grows with nesting and tightens operator spacing.
    fn expr_depth(&self, expr: &Expr, depth: usize, indent: usize) -> String {
        match expr {
            Expr::Ident(name) => name.clone(),
            Expr::BasicLit(_, text) => text.clone(),
            Expr::Composite(lit) => self.composite(lit, depth, indent),
            Expr::FuncLit { ty, body } => {
                let head = format!("func{}", self.signature(ty, indent));
                let body = self.func_body(body, indent, first_line_width(&head));
                format!("{head} {body}")
            }
            Expr::Paren(inner) => match inner.as_ref() {
                Expr::Paren(_) => self.expr_depth(inner, depth, indent),
                _ => format!("({})", self.expr_depth(inner, reduce_depth(depth), indent)),
            },
            Expr::Selector(x, sel) => format!("{}.{sel}", self.expr_depth(x, depth, indent)),
            Expr::Index(x, index) => format!(
                "{}[{}]",
                self.expr_depth(x, 1, indent),
                self.expr_depth(index, depth + 1, indent)
            ),
            Expr::Slice { x, low, high, max } => {
                let mut bounds = vec![low.as_deref(), high.as_deref()];
                if let Some(max) = max.as_deref() {
                    bounds.push(Some(max));
                }
                self.slice(x, &bounds, depth, indent)
            }
            Expr::TypeAssert(x, ty) => {
                let ty = ty
                    .as_ref()
                    .map_or_else(|| "type".to_string(), |ty| self.expr(ty, indent));
                format!("{}.({ty})", self.expr_depth(x, depth, indent))
            }
            Expr::Call(call) => self.call(call, depth, indent),
            Expr::Star(x) => format!("*{}", self.expr(x, indent)),
            Expr::Unary(op, x) => join_operator(op.as_str(), &self.expr_depth(x, depth, indent)),
            Expr::Binary {
                x,
                op,
                y,
                line_break,
            } => self.binary(x, *op, y, *line_break, depth, indent),
            Expr::KeyValue(key, value) => {
                format!("{}: {}", self.expr(key, indent), self.expr(value, indent))
            }
            Expr::ArrayType { len, elem } => {
                let len = len
                    .as_ref()
                    .map(|len| self.expr(len, indent))
                    .unwrap_or_default();
                format!("[{len}]{}", self.expr(elem, indent))
            }
            Expr::MapType(key, value) => {
                format!("map[{}]{}", self.expr(key, indent), self.expr(value, indent))
            }
            Expr::ChanType(dir, elem) => {
                let keyword = match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                };
                format!("{keyword}{}", self.expr(elem, indent))
            }
            Expr::FuncType(ty) => format!("func{}", self.signature(ty, indent)),
            Expr::StructType(fields) => self.field_block("struct", fields, indent, true),
            Expr::InterfaceType(fields) => self.field_block("interface", fields, indent, false),
            Expr::Ellipsis(elem) => {
                let elem = elem
                    .as_ref()
                    .map(|elem| self.expr(elem, indent))
                    .unwrap_or_default();
                format!("...{elem}")
            }
        }
    }

    fn binary(
        &self,
        x: &Expr,
        op: BinaryOp,
        y: &Expr,
        line_break: bool,
        depth: usize,
        indent: usize,
    ) -> String {
        let prec = op.precedence();
        let blank = prec < cutoff(x, op, y, depth);
        let x_depth = match x {
            Expr::Binary { op: x_op, .. } if x_op.precedence() == prec => depth,
            _ => depth + 1,
        };
        let mut out = self.expr_depth(x, x_depth, indent);
        if blank {
            out.push(' ');
        }
        out.push_str(op.as_str());
        if line_break {
            out.push('\n');
            out.push_str(&"\t".repeat(indent + 1));
            out.push_str(&self.expr_depth(y, depth + 1, indent + 1));
        } else {
            let right = self.expr_depth(y, depth + 1, indent);
            if blank || tokens_combine(op.as_str(), &right) {
                out.push(' ');
            }
            out.push_str(&right);
        }
        out
    }

    fn slice(&self, x: &Expr, bounds: &[Option<&Expr>], depth: usize, indent: usize) -> String {
        let present = bounds.iter().flatten().count();
        let needs_blanks = depth <= 1
            && present > 1
            && bounds
                .iter()
                .flatten()
                .any(|bound| matches!(bound, Expr::Binary { .. }));
        let mut out = format!("{}[", self.expr_depth(x, 1, indent));
        for (i, bound) in bounds.iter().enumerate() {
            if i > 0 {
                if bounds[i - 1].is_some() && needs_blanks {
                    out.push(' ');
                }
                out.push(':');
                if bound.is_some() && needs_blanks {
                    out.push(' ');
                }
            }
            if let Some(bound) = bound {
                out.push_str(&self.expr_depth(bound, depth + 1, indent));
            }
        }
        out.push(']');
        out
    }

    fn call(&self, call: &CallExpr, depth: usize, indent: usize) -> String {
        let depth = if call.args.len() > 1 { depth + 1 } else { depth };
        let fun = self.expr_depth(&call.fun, depth, indent);
        let fun = if matches!(call.fun.as_ref(), Expr::FuncType(_)) {
            format!("({fun})")
        } else {
            fun
        };
        let decs: Vec<&Decorations> = call.args.iter().map(|arg| &arg.decs).collect();
        let args = self.list("(", ")", &decs, &call.enclosure, indent, call.ellipsis, |i, line| {
            ListItem::plain(self.expr_depth(&call.args[i].expr, depth, line))
        });
        fun + &args
    }

    fn composite(&self, lit: &CompositeLit, depth: usize, indent: usize) -> String {
        let ty = lit
            .ty
            .as_ref()
            .map(|ty| self.expr_depth(ty, depth, indent))
            .unwrap_or_default();
        let decs: Vec<&Decorations> = lit.elts.iter().map(|elt| &elt.decs).collect();
        let elts = self.list("{", "}", &decs, &lit.enclosure, indent, false, |i, line| {
            self.element(&lit.elts[i].expr, line)
        });
        ty + &elts
    }

    fn element(&self, expr: &Expr, indent: usize) -> ListItem {
        match expr {
            Expr::KeyValue(key, value) => {
                let key = self.expr(key, indent);
                let value = self.expr(value, indent);
                ListItem {
                    text: format!("{key}: {value}"),
                    pair: Some((key, value)),
                }
            }
            _ => ListItem::plain(self.expr(expr, indent)),
        }
    }

    /// Prints a bracketed, comma-separated list. Elements that started a
    /// source line start an output line one level deeper; runs of
    /// single-line `key: value` elements align their values.
    #[allow(clippy::too_many_arguments)]
    fn list<F>(
        &self,
        open: &str,
        close: &str,
        decs: &[&Decorations],
        enclosure: &Enclosure,
        indent: usize,
        ellipsis: bool,
        render: F,
    ) -> String
    where
        F: Fn(usize, usize) -> ListItem,
    {
        let count = decs.len();
        let mut breaks = Vec::with_capacity(count);
        let mut forced = enclosure.open_comment.as_ref().is_some_and(is_line_comment);
        for element in decs {
            breaks.push(forced || element.breaks_line());
            forced = element.trailing.as_ref().is_some_and(is_line_comment);
        }
        let close_newline = enclosure.close_newline
            || forced
            || enclosure.close_comments.iter().any(is_line_comment);
        let multi_line = close_newline
            || enclosure.has_comments()
            || breaks.contains(&true)
            || decs.iter().any(|element| element.has_comments());
        let suffix = |i: usize| if ellipsis && i + 1 == count { "..." } else { "" };

        if !multi_line {
            let items: Vec<String> = (0..count)
                .map(|i| format!("{}{}", render(i, indent).text, suffix(i)))
                .collect();
            return format!("{open}{}{close}", items.join(", "));
        }

        let inner = indent + 1;
        let mut out = String::from(open);
        if let Some(comment) = &enclosure.open_comment {
            out.push(' ');
            out.push_str(&comment.text);
        }
        let mut head = String::new();
        let mut layout = self.layout();
        let mut line: Option<ListLine> = None;
        let mut broke = false;
        let mut prev_break: Option<usize> = None;
        let mut prev_size = 0;
        let mut log_sum = 0.0;
        let mut sized = 0;

        for (i, element) in decs.iter().enumerate() {
            broke |= breaks[i];
            let item = render(i, if broke { inner } else { indent });
            let comma = if i + 1 < count || close_newline { "," } else { "" };
            let single = !item.text.contains('\n');
            let size = match (&item.pair, single) {
                (_, false) => 0,
                (Some((key, _)), true) => text_width(key),
                (None, true) => text_width(&item.text),
            };
            let text = format!("{}{}{comma}", item.text, suffix(i));

            if breaks[i] {
                if let Some(done) = line.take() {
                    done.push_to(&mut layout, inner);
                }
                if element.blank_before || element.leading.iter().any(|c| c.blank_before) {
                    log_sum = 0.0;
                    sized = 0;
                }
                self.leading_rows(&mut layout, element, inner, false);
                let after_shared_line = prev_break.map_or(i > 0, |prev| prev + 1 < i);
                if after_shared_line || starts_section(prev_size, size, log_sum, sized) {
                    layout.section();
                }
                prev_break = Some(i);
                let pair = match item.pair {
                    Some((key, value)) if count > 1 && single => {
                        Some((format!("{key}:"), format!("{value}{}{comma}", suffix(i))))
                    }
                    _ => None,
                };
                line = Some(ListLine {
                    texts: vec![text],
                    pair,
                    comment: None,
                });
            } else if let Some(current) = line.as_mut() {
                current.texts.push(text);
            } else {
                if i > 0 {
                    head.push(' ');
                }
                head.push_str(&text);
            }

            if let Some(comment) = &element.trailing {
                match line.as_mut() {
                    Some(current) if is_line_comment(comment) => {
                        current.comment = Some(comment.text.clone());
                    }
                    Some(current) => current.append_inline(&comment.text),
                    None => {
                        head.push(' ');
                        head.push_str(&comment.text);
                    }
                }
            }
            if size > 0 {
                #[allow(clippy::cast_precision_loss)]
                let ln = (size as f64).ln();
                log_sum += ln;
                sized += 1;
            }
            prev_size = size;
        }
        if let Some(done) = line.take() {
            done.push_to(&mut layout, inner);
        }

        out.push_str(&head);
        if close_newline {
            let first = layout.is_empty();
            layout.comments(inner, &enclosure.close_comments, first);
            out.push('\n');
            out.push_str(&layout.render());
            out.push_str(&"\t".repeat(indent));
        } else {
            let body = layout.render();
            if !body.is_empty() {
                out.push('\n');
                out.push_str(body.trim_end_matches('\n'));
            }
            for comment in &enclosure.close_comments {
                out.push(' ');
                out.push_str(&comment.text);
            }
        }
        out.push_str(close);
        out
    }
}
