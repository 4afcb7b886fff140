use crate::core::{codec, model::Model, registry};
use crate::domain::collection::PropertyCollection;
use crate::domain::property::PropertyInfo;
use crate::domain::value::RawMap;
use crate::utils::error::Result;
use std::sync::Arc;

/// Declared-property contract implemented by concrete model types.
///
/// A type supplies its name and descriptor table; the registry turns the table
/// into a cached [`PropertyCollection`] on first use. The remaining provided
/// methods build typed instances on top of [`Model`].
pub trait Schema: Sized + 'static {
    /// Unique model type name, also written into serialized blobs.
    const NAME: &'static str;

    /// Ordered property descriptors for this type.
    fn declare() -> Vec<PropertyInfo>;

    fn from_model(model: Model) -> Self;

    fn as_model(&self) -> &Model;

    fn as_model_mut(&mut self) -> &mut Model;

    fn properties() -> Result<Arc<PropertyCollection>> {
        registry::resolve::<Self>()
    }

    fn from_raw(raw: RawMap) -> Result<Self> {
        Model::from_raw(Self::properties()?, raw).map(Self::from_model)
    }

    fn from_json(json: serde_json::Value) -> Result<Self> {
        Model::from_json(Self::properties()?, json).map(Self::from_model)
    }

    fn deserialize(blob: &[u8]) -> Result<Self> {
        codec::decode_as(&Self::properties()?, blob).map(Self::from_model)
    }
}
