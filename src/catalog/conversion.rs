use super::definition::KnowledgeCatalog;
use crate::error::CatalogConversionError;

/// A trait for custom catalog formats that can be converted into a `KnowledgeCatalog`.
///
/// Format tolerance lives here, outside the matching engine. A loader that accepts
/// operation lists either as arrays or as keyed objects normalizes them in its own
/// `into_catalog` and hands the engine an already-normalized model.
///
/// # Example
///
/// ```rust
/// use flowmatch::prelude::*;
/// use flowmatch::error::CatalogConversionError;
///
/// struct MyFlow { id: String, ops: Vec<String> }
/// struct MyCatalog { flows: Vec<MyFlow> }
///
/// impl IntoCatalog for MyCatalog {
///     fn into_catalog(self) -> std::result::Result<KnowledgeCatalog, CatalogConversionError> {
///         let flows = self
///             .flows
///             .into_iter()
///             .map(|f| FlowDefinition {
///                 used_by_operations: f.ops,
///                 ..FlowDefinition::new(f.id)
///             })
///             .collect();
///         Ok(KnowledgeCatalog { flows, ..KnowledgeCatalog::default() })
///     }
/// }
///
/// let catalog = MyCatalog { flows: vec![MyFlow { id: "export_vendor".into(), ops: vec![] }] }
///     .into_catalog()
///     .unwrap();
/// assert_eq!(catalog.flows.len(), 1);
/// ```
pub trait IntoCatalog {
    /// Consumes the object and converts it into the engine's catalog model.
    fn into_catalog(self) -> Result<KnowledgeCatalog, CatalogConversionError>;
}

impl IntoCatalog for KnowledgeCatalog {
    fn into_catalog(self) -> Result<KnowledgeCatalog, CatalogConversionError> {
        Ok(self)
    }
}
