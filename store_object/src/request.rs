//! Request and response shapes of the access facade

use crate::errors::StoreError;
use crate::query_builder::{CollectionParams, Constraint, Filter, PageMeta};
use serde::Serialize;
use type_mapping::{record_to_json, Record};

/// What to fetch
#[derive(Debug, Clone, PartialEq)]
pub enum GetRequest {
    /// First page of every resource, default page size
    All,
    /// Zero or more resources
    Collection {
        filter: Option<Filter>,
        params: Option<CollectionParams>,
    },
    /// At most one resource. With `throw`, a miss is NotFound instead of `None`.
    One { constraint: Constraint, throw: bool },
}

/// The pieces of a [`GetRequest`] after resolving its shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRequest {
    pub throw: bool,
    pub collection_params: Option<CollectionParams>,
    pub constraint: Option<Constraint>,
    pub filter: Option<Filter>,
}

impl GetRequest {
    pub fn all() -> Self {
        GetRequest::All
    }

    pub fn page(params: CollectionParams) -> Self {
        GetRequest::Collection {
            filter: None,
            params: Some(params),
        }
    }

    pub fn filter(filter: Filter) -> Self {
        GetRequest::Collection {
            filter: Some(filter),
            params: None,
        }
    }

    pub fn filtered_page(filter: Filter, params: CollectionParams) -> Self {
        GetRequest::Collection {
            filter: Some(filter),
            params: Some(params),
        }
    }

    /// Lookup that resolves to `None` on a miss
    pub fn one(constraint: Constraint) -> Self {
        GetRequest::One {
            constraint,
            throw: false,
        }
    }

    /// Lookup that fails with NotFound on a miss
    pub fn required(constraint: Constraint) -> Self {
        GetRequest::One {
            constraint,
            throw: true,
        }
    }

    pub fn resolve(self) -> ResolvedRequest {
        match self {
            GetRequest::All => ResolvedRequest::default(),
            GetRequest::Collection { filter, params } => ResolvedRequest {
                filter,
                collection_params: params,
                ..ResolvedRequest::default()
            },
            GetRequest::One { constraint, throw } => ResolvedRequest {
                throw,
                constraint: Some(constraint),
                ..ResolvedRequest::default()
            },
        }
    }
}

/// Collection metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionMeta {
    pub pg: PageMeta,
}

/// One page of resources
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub data: Vec<Record>,
    pub meta: CollectionMeta,
}

impl Collection {
    /// `{t: "collection", data: [...], meta: {pg: {...}}}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "t": "collection",
            "data": self.data.iter().map(record_to_json).collect::<Vec<_>>(),
            "meta": self.meta,
        })
    }
}

/// Result of a [`GetRequest`]
#[derive(Debug, Clone, PartialEq)]
pub enum GetResponse {
    Collection(Collection),
    One(Option<Record>),
}

impl GetResponse {
    pub fn into_collection(self) -> Result<Collection, StoreError> {
        match self {
            GetResponse::Collection(collection) => Ok(collection),
            GetResponse::One(_) => Err(StoreError::InternalServerError(
                "expected a collection response, got a single resource".into(),
            )),
        }
    }

    pub fn into_one(self) -> Result<Option<Record>, StoreError> {
        match self {
            GetResponse::One(record) => Ok(record),
            GetResponse::Collection(_) => Err(StoreError::InternalServerError(
                "expected a single resource, got a collection".into(),
            )),
        }
    }
}

/// What to delete
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Filter(Filter),
    Constraint(Constraint),
}

impl From<Filter> for DeleteTarget {
    fn from(filter: Filter) -> Self {
        DeleteTarget::Filter(filter)
    }
}

impl From<Constraint> for DeleteTarget {
    fn from(constraint: Constraint) -> Self {
        DeleteTarget::Constraint(constraint)
    }
}
