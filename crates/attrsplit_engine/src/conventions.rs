//! Names and types the rewrites read from and write into handler sources.
//!
//! Every identifier the engine recognizes (`diffResult`, `modified`,
//! `latestVersion`, `s.ActiveVersion`, ...) and every type it emits lives
//! here, so a provider with different SDK aliases only needs a different
//! [`Conventions`] value.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use attrsplit_foundation::{Error, Result};
use attrsplit_syntax::ast::{Field, FieldList};
use attrsplit_syntax::{Expr, parse_type};

/// Source conventions of the service attribute handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Conventions {
    /// Type of the unused first parameter.
    pub context_type: String,
    /// Type of the resource data parameter.
    pub resource_data_type: String,
    /// Type of the resource and modified map parameters.
    pub resource_map_type: String,
    /// Type of the service version parameter.
    pub version_type: String,
    /// Type of the API client parameter.
    pub client_type: String,
    /// Result type of `GetSchema`.
    pub schema_type: String,
    /// Result type of the CRUD methods.
    pub error_type: String,
    /// Function wrapped around every constructor return value.
    pub ctor_wrapper: String,
    /// Receiver name of every emitted method.
    pub receiver_name: String,
    /// Resource data parameter name.
    pub data_param: String,
    /// Resource map parameter name.
    pub resource_param: String,
    /// Name of the map of changed fields, a parameter of `Update`.
    pub modified_param: String,
    /// Service version parameter name; also the rename target.
    pub version_param: String,
    /// API client parameter name.
    pub client_param: String,
    /// Version identifier used by `Process`, renamed in the CRUD bodies.
    pub legacy_version: String,
    /// Variable holding the set difference in `Process`.
    pub diff_result: String,
    /// Base identifier of the `Read` selectors and the `Register` schema map.
    pub service_var: String,
    /// The only middle selector `Read` may dereference.
    pub active_version: String,
    /// Field of the service resource holding the schema map.
    pub schema_field: String,
    /// Handler field returned by `Key`.
    pub key_field: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            context_type: "context.Context".into(),
            resource_data_type: "*schema.ResourceData".into(),
            resource_map_type: "map[string]interface{}".into(),
            version_type: "int".into(),
            client_type: "*gofastly.Client".into(),
            schema_type: "*schema.Schema".into(),
            error_type: "error".into(),
            ctor_wrapper: "BlockSetToServiceAttributeDefinition".into(),
            receiver_name: "h".into(),
            data_param: "d".into(),
            resource_param: "resource".into(),
            modified_param: "modified".into(),
            version_param: "serviceVersion".into(),
            client_param: "conn".into(),
            legacy_version: "latestVersion".into(),
            diff_result: "diffResult".into(),
            service_var: "s".into(),
            active_version: "ActiveVersion".into(),
            schema_field: "Schema".into(),
            key_field: "key".into(),
        }
    }
}

/// How the resource map parameter is named in a handler signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapParam {
    /// `resource map[...]`
    Resource,
    /// `resource, modified map[...]`, sharing one type.
    ResourceAndModified,
    /// `_ map[...]`
    Blank,
}

impl Conventions {
    /// Checks that every configured type parses.
    ///
    /// # Errors
    /// Returns a configuration error naming the first malformed type.
    pub fn validate(&self) -> Result<()> {
        for text in [
            &self.context_type,
            &self.resource_data_type,
            &self.resource_map_type,
            &self.version_type,
            &self.client_type,
            &self.schema_type,
            &self.error_type,
        ] {
            self.type_expr(text)?;
        }
        Ok(())
    }

    /// Parses a configured type.
    ///
    /// # Errors
    /// Returns a configuration error if `text` is not a type.
    pub fn type_expr(&self, text: &str) -> Result<Expr> {
        parse_type(text)
            .map_err(|err| Error::config(format!("invalid type `{text}` in conventions: {err}")))
    }

    /// Builds the handler parameter list shared by the CRUD methods and `Read`.
    ///
    /// # Errors
    /// Returns a configuration error if a configured type does not parse.
    pub fn handler_params(&self, map: MapParam) -> Result<FieldList> {
        let map_names: &[&str] = match map {
            MapParam::Resource => &[self.resource_param.as_str()],
            MapParam::ResourceAndModified => {
                &[self.resource_param.as_str(), self.modified_param.as_str()]
            }
            MapParam::Blank => &["_"],
        };
        Ok(FieldList::new(vec![
            Field::new(&["_"], self.type_expr(&self.context_type)?),
            Field::new(&[self.data_param.as_str()], self.type_expr(&self.resource_data_type)?),
            Field::new(map_names, self.type_expr(&self.resource_map_type)?),
            Field::new(&[self.version_param.as_str()], self.type_expr(&self.version_type)?),
            Field::new(&[self.client_param.as_str()], self.type_expr(&self.client_type)?),
        ]))
    }

    /// Builds a single unnamed result of the given type.
    ///
    /// # Errors
    /// Returns a configuration error if `text` is not a type.
    pub fn result(&self, text: &str) -> Result<FieldList> {
        Ok(FieldList::new(vec![Field::new(&[], self.type_expr(text)?)]))
    }

    /// Builds the `(h *H)` receiver.
    #[must_use]
    pub fn receiver(&self, handler: &str) -> FieldList {
        FieldList::new(vec![Field::new(
            &[self.receiver_name.as_str()],
            Expr::star(Expr::ident(handler)),
        )])
    }
}
