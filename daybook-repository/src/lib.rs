//! Generic entity repositories for Daybook.
//!
//! Every domain stores its records through the two contracts in this crate:
//! - [`Repository`] — primary CRUD, listing, pagination over one hash per
//!   entity plus a global sorted-set list
//! - [`OwnerRepository`] — the owner-scoped extension (per-owner list,
//!   ownership-checked reads, owner-wide deletes, date ranges)
//!
//! [`EntityRepository`] and [`OwnerEntityRepository`] are the store-backed
//! implementations; [`InMemoryRepository`] serves consumer tests. A domain
//! plugs in with an [`EntityCodec`] (typed record ↔ hash record) and an
//! index strategy ([`IndexHooks`] / [`OwnerIndexHooks`]) whose mutations
//! join the primary write's pipeline.
//!
//! Related writes share one pipeline for one round trip, not for
//! atomicity: the store never rolls back a partially failed batch, and the
//! repositories log rather than compensate (see DESIGN.md).

mod codec;
mod error;
mod hooks;
mod memory;
mod pagination;
mod repository;
mod scoped;

pub use codec::{fields, generate_id, DecodeError, EntityCodec, OwnedEntityCodec};
pub use error::{RepoResult, RepositoryError};
pub use hooks::{IndexHooks, NoIndexes, OwnerIndexHooks};
pub use memory::InMemoryRepository;
pub use pagination::{Page, PageRequest};
pub use repository::{EntityRepository, Repository};
pub use scoped::{OwnerEntityRepository, OwnerRepository};
