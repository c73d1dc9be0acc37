use itertools::Itertools;

use super::prelude::*;
use crate::usecases::{authorize, ContentType};

/// Action filter of the history view. World actions are canonical; narrative
/// and image actions are mapped onto them (CREATE -> ADD, UPDATE -> EDIT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
    Restore,
}

#[derive(Debug, Default, Clone)]
pub struct HistoryFilters {
    pub author: Option<UserName>,
    pub content_type: Option<ContentType>,
    pub action: Option<HistoryAction>,
}

#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub kind: ContentType,
    pub proposal_id: ProposalId,
    pub target_name: String,
    pub action: String,
    pub author: UserName,
    pub status: ProposalStatus,
    pub created_at: TimestampMs,
}

fn is_history_status(status: ProposalStatus) -> bool {
    matches!(status, ProposalStatus::History | ProposalStatus::Archived)
}

fn world_action_matches(intent: &ChangeIntent, filter: HistoryAction) -> bool {
    match filter {
        HistoryAction::Create => matches!(intent, ChangeIntent::Create),
        HistoryAction::Delete => matches!(intent, ChangeIntent::Delete),
        HistoryAction::Restore => matches!(intent, ChangeIntent::Restore),
        // Plain updates, including metadata and cover edits.
        HistoryAction::Update => matches!(
            intent,
            ChangeIntent::Update { .. }
                | ChangeIntent::MetadataUpdate { .. }
                | ChangeIntent::SetCover { .. }
                | ChangeIntent::ToggleVisibility { .. }
        ),
    }
}

fn narrative_action_matches(action: NarrativeAction, filter: HistoryAction) -> bool {
    matches!(
        (filter, action),
        (HistoryAction::Create, NarrativeAction::Add)
            | (HistoryAction::Update, NarrativeAction::Edit)
            | (HistoryAction::Delete, NarrativeAction::Delete)
            | (HistoryAction::Restore, NarrativeAction::Restore)
    )
}

fn image_action_matches(action: ImageAction, filter: HistoryAction) -> bool {
    matches!(
        (filter, action),
        (HistoryAction::Create, ImageAction::Add) | (HistoryAction::Delete, ImageAction::Delete)
    )
}

/// Unified history of supplanted versions and archived proposals, grouped
/// by (content type, author). LIVE versions are excluded to avoid showing
/// the current state twice.
pub fn version_history<R: Db>(
    repo: &R,
    viewer: &User,
    filters: &HistoryFilters,
) -> Result<Vec<((ContentType, UserName), Vec<HistoryItem>)>> {
    let visible_authors = authorize::visible_author_set(repo, viewer)?;
    let is_global = viewer.is_global_admin();
    let author_visible = |author: &UserName| is_global || visible_authors.contains(author);
    let author_ok = |author: &UserName| match &filters.author {
        Some(filter) => author == filter,
        None => true,
    };
    let type_ok = |kind: ContentType| match filters.content_type {
        Some(filter) => filter == kind,
        None => true,
    };

    let mut items: Vec<HistoryItem> = Vec::new();

    for p in repo.query_world_proposals(&ProposalQuery::default())? {
        if !is_history_status(p.status) || !author_visible(&p.author) || !author_ok(&p.author) {
            continue;
        }
        let kind = if p.change_type == ChangeType::Metadata {
            ContentType::Metadata
        } else {
            ContentType::World
        };
        if !type_ok(kind) {
            continue;
        }
        if let Some(action) = filters.action {
            if !world_action_matches(&p.cambios, action) {
                continue;
            }
        }
        items.push(HistoryItem {
            kind,
            proposal_id: p.id,
            target_name: p.proposed_name.clone(),
            action: p.cambios.action_tag().to_owned(),
            author: p.author.clone(),
            status: p.status,
            created_at: p.created_at,
        });
    }

    for p in repo.all_narrative_proposals()? {
        if !is_history_status(p.status)
            || !author_visible(&p.author)
            || !author_ok(&p.author)
            || !type_ok(ContentType::Narrative)
        {
            continue;
        }
        if let Some(action) = filters.action {
            if !narrative_action_matches(p.action, action) {
                continue;
            }
        }
        items.push(HistoryItem {
            kind: ContentType::Narrative,
            proposal_id: p.id,
            target_name: p.proposed_title.clone(),
            action: p.action.to_string(),
            author: p.author.clone(),
            status: p.status,
            created_at: p.created_at,
        });
    }

    for p in repo.all_image_proposals()? {
        if !is_history_status(p.status)
            || !author_visible(&p.author)
            || !author_ok(&p.author)
            || !type_ok(ContentType::Image)
        {
            continue;
        }
        if let Some(action) = filters.action {
            if !image_action_matches(p.action, action) {
                continue;
            }
        }
        items.push(HistoryItem {
            kind: ContentType::Image,
            proposal_id: p.id,
            target_name: p.title.clone(),
            action: p.action.to_string(),
            author: p.author.clone(),
            status: p.status,
            created_at: p.created_at,
        });
    }

    for p in repo.all_period_proposals()? {
        if !is_history_status(p.status)
            || !author_visible(&p.author)
            || !author_ok(&p.author)
            || !type_ok(ContentType::Period)
        {
            continue;
        }
        items.push(HistoryItem {
            kind: ContentType::Period,
            proposal_id: p.id,
            target_name: p.proposed_title.clone(),
            action: p.action.to_string(),
            author: p.author.clone(),
            status: p.status,
            created_at: p.created_at,
        });
    }

    let mut groups: Vec<((ContentType, UserName), Vec<HistoryItem>)> = items
        .into_iter()
        .map(|item| ((item.kind, item.author.clone()), item))
        .into_group_map()
        .into_iter()
        .collect();
    for (_, group) in groups.iter_mut() {
        group.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    groups.sort_by(|a, b| (a.0 .0.as_str(), &a.0 .1).cmp(&(b.0 .0.as_str(), &b.0 .1)));
    Ok(groups)
}
