//! The per-file rewrite pipeline.
//!
//! A [`Refactorer`] resolves the anchors of one file, derives the new
//! methods from `Process` and `Register`, rewrites `Read` and the
//! constructor in place, and appends
//! `Create`, `Update`, `Delete`, `Key`, `GetSchema` to the file.

use tracing::info;

use attrsplit_foundation::{Error, Result};
use attrsplit_syntax::{File, FuncDecl};

use crate::anchors::{Anchor, AnchorPolicy, DeclIndex};
use crate::conventions::Conventions;
use crate::crud::{BodyEdits, Operation, synthesize_crud};
use crate::ctor::wrap_ctor_returns;
use crate::key::emit_key;
use crate::read::rewrite_read;
use crate::schema::synthesize_get_schema;

// =============================================================================
// Report
// =============================================================================

/// What a rewrite changed in one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// The attribute handler type `H`.
    pub handler: String,
    /// Edits per CRUD method; `None` where the bucket was absent.
    pub crud: Vec<(Operation, Option<BodyEdits>)>,
    /// `s.ActiveVersion.<field>` selectors rebound in `Read`.
    pub read_selectors: usize,
    /// Constructor returns wrapped.
    pub ctor_returns: usize,
    /// Names of the appended declarations, in order.
    pub emitted: Vec<String>,
}

impl Report {
    /// Returns the operations whose bucket was present in `Process`.
    #[must_use]
    pub fn matched_buckets(&self) -> Vec<Operation> {
        self.crud
            .iter()
            .filter(|(_, edits)| edits.is_some())
            .map(|(op, _)| *op)
            .collect()
    }
}

// =============================================================================
// Refactorer
// =============================================================================

/// Rewrites service attribute handler files.
#[derive(Clone, Debug, Default)]
pub struct Refactorer {
    conventions: Conventions,
    policy: AnchorPolicy,
}

impl Refactorer {
    /// Creates a refactorer with the default conventions and anchor policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source conventions.
    #[must_use]
    pub fn with_conventions(mut self, conventions: Conventions) -> Self {
        self.conventions = conventions;
        self
    }

    /// Sets the anchor policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AnchorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the source conventions.
    #[must_use]
    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// Returns the anchor policy.
    #[must_use]
    pub fn policy(&self) -> AnchorPolicy {
        self.policy
    }

    /// Resolves the anchor declarations of `file`.
    ///
    /// # Errors
    /// Returns `NotFound` or `InvalidReceiver` as described on
    /// [`DeclIndex::build`].
    pub fn index(&self, file: &File) -> Result<DeclIndex> {
        DeclIndex::build(file, self.policy)
    }

    /// Applies every rewrite to `file` using a previously built index.
    ///
    /// The new declarations are derived before anything is modified, so a
    /// failure in `GetSchema` leaves the tree untouched. A failure while
    /// rewriting `Read` may leave it partially rewritten; the caller is
    /// expected to discard the tree on error.
    ///
    /// # Errors
    /// Returns `SchemaAssignmentNotFound`, `UnexpectedSelectorInRead`, or a
    /// configuration error for malformed conventions.
    pub fn transform(&self, file: &mut File, index: &DeclIndex) -> Result<Report> {
        let handler = index.handler();
        let conventions = &self.conventions;

        let process = anchor(file, index, Anchor::Process)?;
        let crud = synthesize_crud(process, handler, conventions)?;
        let register = anchor(file, index, Anchor::Register)?;
        let get_schema = synthesize_get_schema(register, handler, conventions)?;
        let key = emit_key(handler, conventions);

        let read = anchor_mut(file, index, Anchor::Read)?;
        let read_selectors = rewrite_read(read, conventions)?;
        let ctor = anchor_mut(file, index, Anchor::Ctor)?;
        let ctor_returns = wrap_ctor_returns(ctor, &conventions.ctor_wrapper);

        let mut report = Report {
            handler: handler.to_string(),
            crud: crud.iter().map(|m| (m.operation, m.edits)).collect(),
            read_selectors,
            ctor_returns,
            emitted: Vec::new(),
        };

        let appended = crud
            .into_iter()
            .map(|method| method.decl)
            .chain([key, get_schema]);
        for decl in appended {
            if let Some(func) = decl.as_func() {
                info!(handler, decl = %func.name, "declaration emitted");
                report.emitted.push(func.name.clone());
            }
            file.decls.push(decl);
        }

        Ok(report)
    }

    /// Resolves the anchors of `file` and applies every rewrite.
    ///
    /// # Errors
    /// Returns the first error of [`Refactorer::index`] or
    /// [`Refactorer::transform`].
    pub fn refactor(&self, file: &mut File) -> Result<Report> {
        let index = self.index(file)?;
        self.transform(file, &index)
    }
}

fn anchor<'f>(file: &'f File, index: &DeclIndex, anchor: Anchor) -> Result<&'f FuncDecl> {
    file.func(index.position(anchor))
        .ok_or_else(|| Error::not_found(anchor.pattern()))
}

fn anchor_mut<'f>(
    file: &'f mut File,
    index: &DeclIndex,
    anchor: Anchor,
) -> Result<&'f mut FuncDecl> {
    file.func_mut(index.position(anchor))
        .ok_or_else(|| Error::not_found(anchor.pattern()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrsplit_foundation::ErrorKind;
    use attrsplit_syntax::{parse_file, print_file};

    const HANDLER: &str = "package fastly

func NewServiceGzip(sa ServiceMetadata) ServiceAttributeDefinition {
	return &GzipServiceAttributeHandler{}
}

func (h *GzipServiceAttributeHandler) Process(d *schema.ResourceData, latestVersion int) error {
	for _, r := range diffResult.Added {
		resource := r.(map[string]interface{})
		create(resource, latestVersion)
	}
	return nil
}

func (h *GzipServiceAttributeHandler) Read(d *schema.ResourceData, s *gofastly.ServiceDetail) error {
	return list(s.ActiveVersion.Number)
}

func (h *GzipServiceAttributeHandler) Register(s *schema.Resource) error {
	s.Schema[h.GetKey()] = gzipSchema
	return nil
}
";

    #[test]
    fn appends_five_declarations_in_order() {
        let mut file = parse_file(HANDLER).unwrap();
        let before = file.decls.len();
        let report = Refactorer::new().refactor(&mut file).unwrap();

        assert_eq!(file.decls.len(), before + 5);
        assert_eq!(
            report.emitted,
            vec!["Create", "Update", "Delete", "Key", "GetSchema"]
        );
        let tail: Vec<_> = file.decls[before..]
            .iter()
            .map(|d| d.as_func().unwrap().name.as_str())
            .collect();
        assert_eq!(tail, report.emitted);
        assert_eq!(report.handler, "GzipServiceAttributeHandler");
        assert_eq!(report.matched_buckets(), vec![Operation::Create]);
        assert_eq!(report.read_selectors, 1);
        assert_eq!(report.ctor_returns, 1);
    }

    #[test]
    fn rewritten_file_prints() {
        let mut file = parse_file(HANDLER).unwrap();
        Refactorer::new().refactor(&mut file).unwrap();
        let text = print_file(&file);

        assert!(text.contains(
            "\treturn BlockSetToServiceAttributeDefinition(&GzipServiceAttributeHandler{})\n"
        ));
        assert!(text.contains("\treturn list(serviceVersion)\n"));
        assert!(text.contains("\tcreate(resource, serviceVersion)\n\treturn nil\n"));
        assert!(text.contains(
            "func (h *GzipServiceAttributeHandler) Key() string {\n\treturn h.key\n}\n"
        ));
        assert!(text.ends_with(
            "func (h *GzipServiceAttributeHandler) GetSchema() *schema.Schema {\n\treturn gzipSchema\n}\n"
        ));
        assert_eq!(parse_file(&text).unwrap().decls.len(), 9);
    }

    #[test]
    fn schema_failure_leaves_tree_untouched() {
        let source =
            HANDLER.replace("s.Schema[h.GetKey()] = gzipSchema", "register(gzipSchema)");
        let mut file = parse_file(&source).unwrap();
        let pristine = file.clone();
        let err = Refactorer::new().refactor(&mut file).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SchemaAssignmentNotFound { .. }));
        assert_eq!(file, pristine);
    }

    #[test]
    fn exact_policy_ignores_helpers() {
        let source = format!("{HANDLER}\nfunc refreshReadHelper() {{\n\tuse(s.Foo.Bar)\n}}\n");

        let mut loose = parse_file(&source).unwrap();
        let err = Refactorer::new().refactor(&mut loose).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::UnexpectedSelectorInRead { .. }
        ));

        let mut strict = parse_file(&source).unwrap();
        let report = Refactorer::new()
            .with_policy(AnchorPolicy::Exact)
            .refactor(&mut strict)
            .unwrap();
        assert_eq!(report.read_selectors, 1);
    }
}
