//! Rewriting `Read` to the handler signature.
//!
//! `Read` used to receive the whole service description `s` and pick the
//! active version out of it. The rewritten method receives the version
//! directly, so every `s.ActiveVersion.<field>` becomes `serviceVersion`.

use tracing::info;

use attrsplit_foundation::{Error, Result};
use attrsplit_syntax::visitor::{VisitMut, Walk, walk_block_mut};
use attrsplit_syntax::{Expr, FuncDecl, print_expr};

use crate::conventions::{Conventions, MapParam};

/// Replaces `s.ActiveVersion.<field>` with the version parameter.
///
/// Stops at the first `s.<other>.<field>`; the walk then skips everything
/// else so the first offending selector is the one reported.
struct ReadSelectorRewriter<'a> {
    conventions: &'a Conventions,
    rewritten: usize,
    error: Option<Error>,
}

impl ReadSelectorRewriter<'_> {
    /// Returns the middle selector if `expr` is `s.<middle>.<field>`.
    fn middle<'e>(&self, expr: &'e Expr) -> Option<&'e str> {
        let (inner, _field) = expr.as_selector()?;
        let (base, middle) = inner.as_selector()?;
        base.is_ident(&self.conventions.service_var).then_some(middle)
    }
}

impl VisitMut for ReadSelectorRewriter<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) -> Walk {
        if self.error.is_some() {
            return Walk::Skip;
        }
        let Some(middle) = self.middle(expr) else {
            return Walk::Children;
        };
        if middle != self.conventions.active_version {
            self.error = Some(Error::unexpected_selector(print_expr(expr)));
            return Walk::Skip;
        }
        *expr = Expr::ident(&self.conventions.version_param);
        self.rewritten += 1;
        Walk::Skip
    }
}

/// Rewrites `Read` in place and returns the number of selectors replaced.
///
/// The parameter list becomes the CRUD parameter list with the resource
/// map named `_`; results and receiver are kept.
///
/// # Errors
/// Returns `UnexpectedSelectorInRead` naming the first `s.<other>.<field>`
/// selector, or a configuration error for a malformed parameter type.
pub fn rewrite_read(read: &mut FuncDecl, conventions: &Conventions) -> Result<usize> {
    let mut rewriter = ReadSelectorRewriter {
        conventions,
        rewritten: 0,
        error: None,
    };
    if let Some(body) = &mut read.body {
        walk_block_mut(&mut rewriter, body);
    }
    if let Some(err) = rewriter.error {
        return Err(err);
    }

    read.ty.params = conventions.handler_params(MapParam::Blank)?;
    info!(
        decl = %read.name,
        selectors = rewriter.rewritten,
        "Read rebound to the service version parameter"
    );
    Ok(rewriter.rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrsplit_foundation::ErrorKind;
    use attrsplit_syntax::{parse_file, print_file};

    const READ: &str = "package fastly

// Read refreshes the attribute state against the Fastly API.
func (h *H) Read(_ context.Context, d *schema.ResourceData, s *gofastly.ServiceDetail, conn *gofastly.Client) error {
	// Refresh ACLs
	list, err := conn.ListACLs(&gofastly.ListACLsInput{
		ServiceID:      d.Id(),
		ServiceVersion: s.ActiveVersion.Number,
	})
	if err != nil {
		return fmt.Errorf(\"version (%v): %s\", s.ActiveVersion.Number, err)
	}
	return d.Set(h.GetKey(), list)
}
";

    #[test]
    fn rebinds_active_version() {
        let mut file = parse_file(READ).unwrap();
        let read = file.func_mut(0).unwrap();
        assert_eq!(rewrite_read(read, &Conventions::default()).unwrap(), 2);

        let text = print_file(&file);
        assert!(text.contains(
            "func (h *H) Read(_ context.Context, d *schema.ResourceData, _ map[string]interface{}, serviceVersion int, conn *gofastly.Client) error {\n"
        ));
        assert!(text.contains("\t\tServiceVersion: serviceVersion,\n"));
        assert!(text.contains("fmt.Errorf(\"version (%v): %s\", serviceVersion, err)"));
        assert!(!text.contains("ActiveVersion"));
        assert!(text.starts_with("package fastly\n\n// Read refreshes"));
        assert!(text.contains("\t// Refresh ACLs\n"));
    }

    #[test]
    fn other_middle_selector_aborts() {
        let source = READ.replace("ServiceID:      d.Id()", "ServiceID:      s.Foo.Bar");
        let mut file = parse_file(&source).unwrap();
        let read = file.func_mut(0).unwrap();
        let err = rewrite_read(read, &Conventions::default()).unwrap_err();
        match err.kind {
            ErrorKind::UnexpectedSelectorInRead { selector } => {
                assert_eq!(selector, "s.Foo.Bar");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn two_level_selectors_are_left_alone() {
        let source = "package fastly\n\nfunc (h *H) Read(s *gofastly.ServiceDetail) error {\n\treturn use(s.ID, t.ActiveVersion.Number)\n}\n";
        let mut file = parse_file(source).unwrap();
        let read = file.func_mut(0).unwrap();
        assert_eq!(rewrite_read(read, &Conventions::default()).unwrap(), 0);
        assert!(print_file(&file).contains("return use(s.ID, t.ActiveVersion.Number)"));
    }

    #[test]
    fn deeper_chains_keep_their_tail() {
        let source = "package fastly\n\nfunc (h *H) Read() error {\n\treturn use(s.ActiveVersion.Number.String())\n}\n";
        let mut file = parse_file(source).unwrap();
        let read = file.func_mut(0).unwrap();
        assert_eq!(rewrite_read(read, &Conventions::default()).unwrap(), 1);
        assert!(print_file(&file).contains("return use(serviceVersion.String())"));
    }
}
