//! Identity reconciliation
//!
//! The contacts table acts as a persistent disjoint-set structure. "Find"
//! is the seed lookup plus one expansion query: because every secondary
//! links directly to its primary, seeding the expansion with the matched
//! ids and their link targets reaches every member of every touched
//! cluster in a single pass. "Union" is the demote-and-relink step that
//! collapses competing primaries into the earliest one.
//!
//! Each resolve call runs as one transaction and is retried as a unit on
//! transient lock conflicts, so concurrent submissions of the same unseen
//! channel pair cannot both win the create-primary path.

use idr_common::api::types::ContactView;
use idr_common::db::models::{Contact, LinkPrecedence};
use idr_common::{Error, Result};
use tracing::{debug, info};

use crate::db_retry::retry_on_lock;
use crate::store::{ContactStore, ContactTx};

/// Reconciliation engine; one instance shared by all request handlers.
#[derive(Clone)]
pub struct IdentityResolver {
    store: ContactStore,
    max_lock_wait_ms: u64,
}

impl IdentityResolver {
    pub fn new(store: ContactStore, max_lock_wait_ms: u64) -> Self {
        Self {
            store,
            max_lock_wait_ms,
        }
    }

    /// Resolve one submitted (email, phone) fact into its canonical
    /// cluster, merging and extending clusters as needed.
    ///
    /// At least one channel must be non-null; a request with both null is
    /// rejected before any store access.
    pub async fn resolve(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<ContactView> {
        if email.is_none() && phone.is_none() {
            return Err(Error::InvalidInput(
                "at least one of email and phoneNumber is required".to_string(),
            ));
        }

        let store = &self.store;
        retry_on_lock("identify", self.max_lock_wait_ms, move || async move {
            let mut tx = store.begin().await?;
            let view = reconcile(&mut tx, email, phone).await?;
            tx.commit().await?;
            Ok(view)
        })
        .await
    }
}

/// One reconciliation pass inside an open transaction.
async fn reconcile(
    tx: &mut ContactTx,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<ContactView> {
    let matched = tx.find_by_channels(email, phone).await?;

    if matched.is_empty() {
        let contact = tx
            .create(email, phone, None, LinkPrecedence::Primary)
            .await?;
        debug!(id = contact.id, "created primary for unseen channel pair");
        let cluster = vec![contact.clone()];
        return Ok(assemble_view(&contact, &cluster));
    }

    // Find: expand the seed matches to the full transitive closure. A
    // matched secondary's own id does not pull in its siblings, so its
    // link target goes into the queried id set explicitly.
    let mut ids: Vec<i64> = Vec::new();
    for contact in &matched {
        push_unique(&mut ids, contact.id);
        if let Some(linked) = contact.linked_id {
            push_unique(&mut ids, linked);
        }
    }
    let related = tx.find_by_ids_or_linked_to(&ids).await?;

    let primary = select_primary(tx, &related).await?;

    // Union: demote every competing primary into the canonical one and
    // re-point its secondaries so all links stay at depth 1.
    let mut demoted: Vec<i64> = Vec::new();
    for other in related
        .iter()
        .filter(|c| c.id != primary.id && c.is_primary())
    {
        info!(
            demoted = other.id,
            primary = primary.id,
            "merging clusters: demoting primary"
        );
        tx.update_link(other.id, Some(primary.id), LinkPrecedence::Secondary)
            .await?;
        let relinked = tx.relink_children(other.id, primary.id).await?;
        if relinked > 0 {
            debug!(
                from = other.id,
                to = primary.id,
                count = relinked,
                "re-pointed secondaries of demoted primary"
            );
        }
        demoted.push(other.id);
    }

    // Any remaining member not pointing at the canonical primary is a
    // depth-2 or cross-linked record; repair the link instead of
    // propagating the broken chain. Children of just-demoted primaries
    // were already re-pointed in bulk above.
    for other in related
        .iter()
        .filter(|c| c.id != primary.id && !c.is_primary())
    {
        match other.linked_id {
            Some(target) if target == primary.id || demoted.contains(&target) => {}
            _ => {
                info!(
                    id = other.id,
                    primary = primary.id,
                    "repairing non-flat contact link"
                );
                tx.update_link(other.id, Some(primary.id), LinkPrecedence::Secondary)
                    .await?;
            }
        }
    }

    // Novelty: a new secondary is appended only when the submission
    // contributes a channel value the cluster does not already hold. An
    // exact duplicate of an existing member contributes nothing.
    let cluster = tx.find_by_ids_or_linked_to(&[primary.id]).await?;
    let new_email = match email {
        Some(value) => !cluster.iter().any(|c| c.email.as_deref() == Some(value)),
        None => false,
    };
    let new_phone = match phone {
        Some(value) => !cluster
            .iter()
            .any(|c| c.phone_number.as_deref() == Some(value)),
        None => false,
    };
    if new_email || new_phone {
        let created = tx
            .create(email, phone, Some(primary.id), LinkPrecedence::Secondary)
            .await?;
        debug!(
            id = created.id,
            primary = primary.id,
            "created secondary carrying new channel value"
        );
    }

    let cluster = tx.find_by_ids_or_linked_to(&[primary.id]).await?;
    Ok(assemble_view(&primary, &cluster))
}

/// Pick the canonical primary of the expanded record set: the earliest
/// created contact with primary precedence (the input is already sorted by
/// creation time, then id).
///
/// A set with no primary at all means a past violation of the link
/// invariants; the earliest record is promoted and persisted so the store
/// converges back to one primary per cluster.
async fn select_primary(tx: &mut ContactTx, related: &[Contact]) -> Result<Contact> {
    if let Some(primary) = related.iter().find(|c| c.is_primary()) {
        return Ok(primary.clone());
    }

    let earliest = related
        .first()
        .cloned()
        .ok_or_else(|| Error::Internal("cluster expansion returned no rows".to_string()))?;
    info!(id = earliest.id, "no primary in cluster, promoting earliest record");
    tx.update_link(earliest.id, None, LinkPrecedence::Primary)
        .await?;
    Ok(Contact {
        linked_id: None,
        link_precedence: LinkPrecedence::Primary,
        ..earliest
    })
}

/// Canonical response assembly: the primary's channel values first, then
/// secondaries' values oldest to newest, duplicates dropped keeping the
/// first occurrence. `cluster` must be sorted ascending by creation time.
fn assemble_view(primary: &Contact, cluster: &[Contact]) -> ContactView {
    let mut emails = Vec::new();
    let mut phone_numbers = Vec::new();
    let mut secondary_contact_ids = Vec::new();

    if let Some(email) = &primary.email {
        emails.push(email.clone());
    }
    if let Some(phone) = &primary.phone_number {
        phone_numbers.push(phone.clone());
    }

    for member in cluster {
        if member.id == primary.id {
            continue;
        }
        if let Some(email) = &member.email {
            push_unique(&mut emails, email.clone());
        }
        if let Some(phone) = &member.phone_number {
            push_unique(&mut phone_numbers, phone.clone());
        }
        secondary_contact_ids.push(member.id);
    }

    ContactView {
        primary_contact_id: primary.id,
        emails,
        phone_numbers,
        secondary_contact_ids,
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, value: T) {
    if !items.contains(&value) {
        items.push(value);
    }
}
