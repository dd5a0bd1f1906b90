//! Inbox library management and mute filtering
//!
//! [`InboxManager`] owns the fixed Inbox library, the mute-rule policy
//! surface, publication membership moves (add/dismiss/keep), and the
//! unread-count bookkeeping.

use crate::error::{CoreError, Result};
use crate::normalize;
use crate::store::Store;
use imfeed_domain::{CandidateResult, Library, MuteRule, MuteRuleKind};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Check one mute rule against a candidate.
///
/// Matching is case-insensitive throughout; doi and bibcode compare the
/// normalized forms so a rule suppresses the same records the identifier
/// cache would have grouped.
fn rule_matches(rule: &MuteRule, candidate: &CandidateResult) -> bool {
    match rule.kind {
        MuteRuleKind::Author => {
            let needle = rule.value.to_lowercase();
            candidate
                .authors
                .iter()
                .any(|author| author.to_lowercase().contains(&needle))
        }
        MuteRuleKind::Venue => {
            let needle = rule.value.to_lowercase();
            candidate
                .venue
                .as_deref()
                .is_some_and(|venue| venue.to_lowercase().contains(&needle))
        }
        MuteRuleKind::Doi => candidate
            .identifiers
            .doi
            .as_deref()
            .is_some_and(|doi| normalize::normalize_doi(doi) == normalize::normalize_doi(&rule.value)),
        MuteRuleKind::Bibcode => candidate.identifiers.bibcode.as_deref().is_some_and(|bibcode| {
            normalize::normalize_bibcode(bibcode) == normalize::normalize_bibcode(&rule.value)
        }),
        MuteRuleKind::ArxivCategory => {
            let needle = rule.value.trim().to_lowercase();
            candidate
                .identifiers
                .arxiv_id
                .as_deref()
                .and_then(normalize::arxiv_category)
                .is_some_and(|category| category.starts_with(&needle))
        }
    }
}

/// Owner of the Inbox library, mute rules, and unread bookkeeping.
pub struct InboxManager {
    store: Arc<dyn Store>,
    inbox_id: Mutex<Option<Uuid>>,
    unread: Mutex<u64>,
}

impl InboxManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            inbox_id: Mutex::new(None),
            unread: Mutex::new(0),
        }
    }

    fn unread_guard(&self) -> MutexGuard<'_, u64> {
        self.unread.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The Inbox library, lazily created exactly once.
    pub fn get_or_create_inbox(&self) -> Result<Library> {
        let mut cached = self
            .inbox_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(id) = *cached {
            if let Some(library) = self.store.library(id)? {
                return Ok(library);
            }
            // Cached id points at nothing (external deletion); fall through.
            *cached = None;
        }

        if let Some(existing) = self.store.libraries()?.into_iter().find(|l| l.is_inbox) {
            *cached = Some(existing.id);
            return Ok(existing);
        }

        let inbox = Library::inbox();
        self.store.insert_library(inbox.clone())?;
        *cached = Some(inbox.id);
        info!(library = %inbox.id, "created inbox library");
        Ok(inbox)
    }

    /// Id of the Inbox library.
    pub fn inbox_id(&self) -> Result<Uuid> {
        Ok(self.get_or_create_inbox()?.id)
    }

    // ===== Mute rules =====

    /// Add a mute rule, or return the existing rule for the same
    /// `(kind, value)` pair.
    pub fn mute(&self, kind: MuteRuleKind, value: &str) -> Result<MuteRule> {
        if let Some(existing) = self
            .store
            .mute_rules()?
            .into_iter()
            .find(|rule| rule.kind == kind && rule.value.eq_ignore_ascii_case(value))
        {
            debug!(kind = kind.as_str(), value, "mute rule already exists");
            return Ok(existing);
        }

        let rule = MuteRule::new(kind, value);
        self.store.insert_mute_rule(rule.clone())?;
        info!(kind = kind.as_str(), value, "mute rule added");
        Ok(rule)
    }

    /// Remove a mute rule.
    pub fn unmute(&self, rule_id: Uuid) -> Result<()> {
        self.store.delete_mute_rule(rule_id)?;
        Ok(())
    }

    /// Remove every mute rule.
    pub fn clear_all_mutes(&self) -> Result<()> {
        self.store.clear_mute_rules()?;
        Ok(())
    }

    /// All mute rules.
    pub fn rules(&self) -> Result<Vec<MuteRule>> {
        Ok(self.store.mute_rules()?)
    }

    /// Mute rules of one kind.
    pub fn rules_of(&self, kind: MuteRuleKind) -> Result<Vec<MuteRule>> {
        Ok(self
            .store
            .mute_rules()?
            .into_iter()
            .filter(|rule| rule.kind == kind)
            .collect())
    }

    /// Whether any active mute rule suppresses this candidate.
    ///
    /// Every rule is a candidate match; the first hit wins and no priority
    /// order is defined between kinds. No rules, or no hit, means keep.
    pub fn should_filter(&self, candidate: &CandidateResult) -> Result<bool> {
        for rule in self.store.mute_rules()? {
            if rule_matches(&rule, candidate) {
                debug!(
                    kind = rule.kind.as_str(),
                    value = %rule.value,
                    title = %candidate.title,
                    "candidate suppressed by mute rule"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ===== Membership =====

    /// File a publication into the Inbox and mark it unread.
    ///
    /// Idempotent on membership; always resets `is_read`.
    pub fn add_to_inbox(&self, publication_id: Uuid) -> Result<()> {
        let inbox_id = self.inbox_id()?;
        let mut publication = self
            .store
            .publication(publication_id)?
            .ok_or(CoreError::PublicationNotFound(publication_id))?;

        let was_unread_member = publication.is_in_library(inbox_id) && !publication.is_read;
        publication.add_to_library(inbox_id);
        publication.is_read = false;
        self.store.update_publication(publication)?;

        if !was_unread_member {
            *self.unread_guard() += 1;
        }
        Ok(())
    }

    /// Remove a publication from the Inbox.
    ///
    /// A publication left with zero library memberships is deleted outright.
    pub fn dismiss_from_inbox(&self, publication_id: Uuid) -> Result<()> {
        let inbox_id = self.inbox_id()?;
        let mut publication = self
            .store
            .publication(publication_id)?
            .ok_or(CoreError::PublicationNotFound(publication_id))?;

        let was_unread_member = publication.is_in_library(inbox_id) && !publication.is_read;
        if !publication.remove_from_library(inbox_id) {
            return Ok(());
        }

        if publication.library_ids.is_empty() {
            self.store.delete_publication(publication_id)?;
            debug!(publication = %publication_id, "dismissed publication had no other homes, deleted");
        } else {
            self.store.update_publication(publication)?;
        }

        if was_unread_member {
            let mut unread = self.unread_guard();
            *unread = unread.saturating_sub(1);
        }
        Ok(())
    }

    /// Add a publication to a user library.
    ///
    /// Does not touch Inbox membership; dismissing is a separate,
    /// explicit call.
    pub fn keep_to_library(&self, publication_id: Uuid, library_id: Uuid) -> Result<()> {
        if self.store.library(library_id)?.is_none() {
            return Err(CoreError::LibraryNotFound(library_id));
        }
        let mut publication = self
            .store
            .publication(publication_id)?
            .ok_or(CoreError::PublicationNotFound(publication_id))?;
        publication.add_to_library(library_id);
        self.store.update_publication(publication)?;
        Ok(())
    }

    // ===== Read state =====

    pub fn mark_as_read(&self, publication_id: Uuid) -> Result<()> {
        let inbox_id = self.inbox_id()?;
        let mut publication = self
            .store
            .publication(publication_id)?
            .ok_or(CoreError::PublicationNotFound(publication_id))?;

        if publication.is_read {
            return Ok(());
        }
        let counts = publication.is_in_library(inbox_id);
        publication.is_read = true;
        self.store.update_publication(publication)?;

        if counts {
            let mut unread = self.unread_guard();
            *unread = unread.saturating_sub(1);
        }
        Ok(())
    }

    pub fn mark_as_unread(&self, publication_id: Uuid) -> Result<()> {
        let inbox_id = self.inbox_id()?;
        let mut publication = self
            .store
            .publication(publication_id)?
            .ok_or(CoreError::PublicationNotFound(publication_id))?;

        if !publication.is_read {
            return Ok(());
        }
        let counts = publication.is_in_library(inbox_id);
        publication.is_read = false;
        self.store.update_publication(publication)?;

        if counts {
            *self.unread_guard() += 1;
        }
        Ok(())
    }

    /// Incrementally maintained unread count for the Inbox.
    pub fn unread_count(&self) -> u64 {
        *self.unread_guard()
    }

    /// Recount unread Inbox publications from the store and resync the
    /// incremental counter. The two must agree at any quiescent point.
    pub fn recompute_unread_count(&self) -> Result<u64> {
        let inbox_id = self.inbox_id()?;
        let count = self.store.count_unread_in_library(inbox_id)?;
        *self.unread_guard() = count;
        Ok(count)
    }
}
