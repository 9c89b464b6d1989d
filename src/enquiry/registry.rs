//! Dispatch from an enquiry's dimension to the function that answers it.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
    Error,
    enquiry::{
        account::resolve_account,
        member::resolve_member,
        params::{Dimension, EnquiryParams},
        quarter::resolve_quarter,
        rows::EnquiryResult,
        ward::resolve_ward,
    },
};

pub type Resolver = fn(&EnquiryParams, &Connection) -> Result<EnquiryResult, Error>;

#[derive(Debug, Clone, Copy)]
pub struct ResolverEntry {
    pub dimension: Dimension,
    pub resolve: Resolver,
    /// Whether the dimension can produce a detail listing at all.
    pub has_detail: bool,
}

impl ResolverEntry {
    pub const fn new(dimension: Dimension, resolve: Resolver, has_detail: bool) -> Self {
        Self {
            dimension,
            resolve,
            has_detail,
        }
    }
}

/// The resolvers for every [Dimension], built once at start-up and shared read-only.
#[derive(Debug, Clone)]
pub struct EnquiryRegistry {
    resolvers: HashMap<Dimension, ResolverEntry>,
}

impl Default for EnquiryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EnquiryRegistry {
    pub fn new() -> Self {
        let entries = [
            ResolverEntry::new(Dimension::Member, resolve_member, true),
            ResolverEntry::new(Dimension::Ward, resolve_ward, true),
            ResolverEntry::new(Dimension::Quarter, resolve_quarter, true),
            ResolverEntry::new(Dimension::Account, resolve_account, false),
        ];

        Self {
            resolvers: entries
                .into_iter()
                .map(|entry| (entry.dimension, entry))
                .collect(),
        }
    }

    pub fn get(&self, dimension: Dimension) -> Option<&ResolverEntry> {
        self.resolvers.get(&dimension)
    }

    /// Answer the enquiry with the resolver registered for its dimension.
    ///
    /// The detail is always empty for summaries and for dimensions without detail.
    ///
    /// # Errors
    /// Returns any error from the resolver. A dimension without a resolver gives an empty result.
    pub fn resolve(
        &self,
        params: &EnquiryParams,
        connection: &Connection,
    ) -> Result<EnquiryResult, Error> {
        let Some(entry) = self.get(params.dimension) else {
            return Ok(EnquiryResult::default());
        };

        let mut result = (entry.resolve)(params, connection)?;
        if !params.wants_detail() || !entry.has_detail {
            result.detail.clear();
        }

        Ok(result)
    }
}
