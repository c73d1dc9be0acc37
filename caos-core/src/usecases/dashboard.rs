use itertools::Itertools;

use super::prelude::*;
use crate::usecases::authorize;

const REJECTED_CAP: usize = 20;

/// Content type of a dashboard item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    World,
    Narrative,
    Image,
    Period,
    Metadata,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::World => "WORLD",
            Self::Narrative => "NARRATIVE",
            Self::Image => "IMAGE",
            Self::Period => "PERIOD",
            Self::Metadata => "METADATA",
        }
    }
}

/// Classification of what a world proposal actually touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEditKind {
    PureMetadata,
    PureCover,
    DescriptionEdit,
}

/// One decorated review item, ready for the inbox.
#[derive(Debug, Clone)]
pub struct DashboardItem {
    pub kind: ContentType,
    pub proposal_id: ProposalId,
    pub type_label: String,
    pub target_name: String,
    pub target_link: String,
    pub author: UserName,
    pub status: ProposalStatus,
    pub feedback: Option<String>,
    pub has_authority: bool,
    pub world_edit_kind: Option<WorldEditKind>,
    pub created_at: TimestampMs,
}

/// The five buckets of one content type.
#[derive(Debug, Default, Clone)]
pub struct DashboardBuckets {
    pub pending: Vec<DashboardItem>,
    pub approved: Vec<DashboardItem>,
    pub rejected: Vec<DashboardItem>,
    pub timeline_pending: Vec<DashboardItem>,
    pub timeline_approved: Vec<DashboardItem>,
}

#[derive(Debug, Default, Clone)]
pub struct Dashboard {
    pub worlds: DashboardBuckets,
    pub narratives: DashboardBuckets,
    pub images: DashboardBuckets,
    pub periods: DashboardBuckets,
    pub metadata: DashboardBuckets,
    /// Authors selectable in the filter dropdown (the viewer's jurisdiction).
    pub allowed_authors: Vec<UserName>,
}

#[derive(Debug, Default, Clone)]
pub struct DashboardFilters {
    pub author: Option<UserName>,
    pub content_type: Option<ContentType>,
    pub query: Option<String>,
}

fn classify_world_edit(proposal: &WorldProposal, world: &World) -> WorldEditKind {
    match &proposal.cambios {
        ChangeIntent::SetCover { .. } => WorldEditKind::PureCover,
        ChangeIntent::MetadataUpdate { .. } => WorldEditKind::PureMetadata,
        ChangeIntent::Update { metadata: Some(_) }
            if proposal.proposed_name == world.name
                && proposal.proposed_description == world.description =>
        {
            WorldEditKind::PureMetadata
        }
        _ => WorldEditKind::DescriptionEdit,
    }
}

fn world_context_label(proposal: &WorldProposal) -> String {
    match proposal.timeline_year {
        Some(year) => format!(" (Año {year})"),
        None => " (Actual)".to_owned(),
    }
}

fn matches_query(query: &Option<String>, haystacks: &[&str]) -> bool {
    match query {
        None => true,
        Some(q) => {
            let q = q.to_lowercase();
            haystacks.iter().any(|h| h.to_lowercase().contains(&q))
        }
    }
}

/// Builds the review dashboard for a user: per content type, the pending /
/// approved / rejected and timeline buckets, filtered by jurisdiction
/// (territorial silo), author, type and text query.
pub fn dashboard<R: Db>(repo: &R, viewer: &User, filters: &DashboardFilters) -> Result<Dashboard> {
    let is_global = viewer.is_global_admin();
    let visible_authors = authorize::visible_author_set(repo, viewer)?;

    let allowed_authors = if is_global {
        repo.all_users()?
            .into_iter()
            .filter(|u| u.is_active)
            .map(|u| u.name)
            .sorted()
            .collect()
    } else {
        visible_authors.iter().cloned().sorted().collect()
    };

    let author_ok = |author: &UserName| match &filters.author {
        Some(filter) => author == filter,
        None => true,
    };

    let mut board = Dashboard {
        allowed_authors,
        ..Default::default()
    };

    // --- World proposals (LIVE, TIMELINE and METADATA tracks) -------------
    for proposal in repo.query_world_proposals(&ProposalQuery::default())? {
        let Some(world) = repo.try_get_world(&proposal.world)? else {
            continue;
        };
        if !authorize::passes_territorial_silo(
            viewer,
            &visible_authors,
            &proposal.author,
            world.author.as_ref(),
        ) {
            continue;
        }
        if !author_ok(&proposal.author) {
            continue;
        }
        if !matches_query(
            &filters.query,
            &[proposal.proposed_name.as_str(), proposal.change_log.as_str()],
        ) {
            continue;
        }

        let edit_kind = classify_world_edit(&proposal, &world);
        let is_cover = edit_kind == WorldEditKind::PureCover;
        let is_metadata = proposal.change_type == ChangeType::Metadata;
        // SET_COVER rides with the image bucket; METADATA has its own.
        let kind = if is_cover {
            ContentType::Image
        } else if is_metadata {
            ContentType::Metadata
        } else {
            ContentType::World
        };
        match filters.content_type {
            Some(wanted) if wanted != kind => continue,
            _ => {}
        }

        let has_authority = authorize::has_authority_over(
            repo,
            viewer,
            &world,
            &proposal.author,
            proposal.status,
        )?;
        let item = DashboardItem {
            kind,
            proposal_id: proposal.id,
            type_label: format!("🌍 MUNDO{}", world_context_label(&proposal)),
            target_name: proposal.proposed_name.clone(),
            target_link: format!("/mundo/{}/", world.public_id),
            author: proposal.author.clone(),
            status: proposal.status,
            feedback: proposal.admin_feedback.clone(),
            has_authority,
            world_edit_kind: Some(edit_kind),
            created_at: proposal.created_at,
        };
        let buckets = match kind {
            ContentType::Image => &mut board.images,
            ContentType::Metadata => &mut board.metadata,
            _ => &mut board.worlds,
        };
        let is_timeline = proposal.change_type == ChangeType::Timeline;
        match (proposal.status, is_timeline) {
            (ProposalStatus::Pending, false) => buckets.pending.push(item),
            (ProposalStatus::Approved, false) => buckets.approved.push(item),
            (ProposalStatus::Rejected, false) => buckets.rejected.push(item),
            (ProposalStatus::Pending, true) => buckets.timeline_pending.push(item),
            (ProposalStatus::Approved, true) => buckets.timeline_approved.push(item),
            _ => {}
        }
    }

    // --- Narrative proposals ----------------------------------------------
    if matches!(
        filters.content_type,
        None | Some(ContentType::Narrative)
    ) {
        for proposal in repo.all_narrative_proposals()? {
            let Ok(narrative) = repo.get_narrative(&proposal.narrative) else {
                continue;
            };
            let Some(world) = repo.try_get_world(&narrative.world)? else {
                continue;
            };
            if !authorize::passes_territorial_silo(
                viewer,
                &visible_authors,
                &proposal.author,
                world.author.as_ref(),
            ) {
                continue;
            }
            if !author_ok(&proposal.author)
                || !matches_query(
                    &filters.query,
                    &[
                        proposal.proposed_title.as_str(),
                        proposal.proposed_content.as_str(),
                    ],
                )
            {
                continue;
            }
            let has_authority = authorize::has_authority_over(
                repo,
                viewer,
                &world,
                &proposal.author,
                proposal.status,
            )?;
            let item = DashboardItem {
                kind: ContentType::Narrative,
                proposal_id: proposal.id,
                type_label: "📖 NARRATIVA".into(),
                target_name: proposal.proposed_title.clone(),
                target_link: format!("/narrativa/{}/", narrative.public_id),
                author: proposal.author.clone(),
                status: proposal.status,
                feedback: proposal.admin_feedback.clone(),
                has_authority,
                world_edit_kind: None,
                created_at: proposal.created_at,
            };
            match proposal.status {
                ProposalStatus::Pending => board.narratives.pending.push(item),
                ProposalStatus::Approved => board.narratives.approved.push(item),
                ProposalStatus::Rejected => board.narratives.rejected.push(item),
                _ => {}
            }
        }
    }

    // --- Image proposals ---------------------------------------------------
    if matches!(filters.content_type, None | Some(ContentType::Image)) {
        for proposal in repo.all_image_proposals()? {
            let Some(world) = repo.try_get_world(&proposal.world)? else {
                continue;
            };
            if !authorize::passes_territorial_silo(
                viewer,
                &visible_authors,
                &proposal.author,
                world.author.as_ref(),
            ) {
                continue;
            }
            if !author_ok(&proposal.author)
                || !matches_query(&filters.query, &[proposal.title.as_str()])
            {
                continue;
            }
            let has_authority = authorize::has_authority_over(
                repo,
                viewer,
                &world,
                &proposal.author,
                proposal.status,
            )?;
            let item = DashboardItem {
                kind: ContentType::Image,
                proposal_id: proposal.id,
                type_label: "🖼️ IMAGEN".into(),
                target_name: proposal.title.clone(),
                target_link: format!("/mundo/{}/", world.public_id),
                author: proposal.author.clone(),
                status: proposal.status,
                feedback: proposal.admin_feedback.clone(),
                has_authority,
                world_edit_kind: None,
                created_at: proposal.created_at,
            };
            match proposal.status {
                ProposalStatus::Pending => board.images.pending.push(item),
                ProposalStatus::Approved => board.images.approved.push(item),
                ProposalStatus::Rejected => board.images.rejected.push(item),
                _ => {}
            }
        }
    }

    // --- Period proposals --------------------------------------------------
    if matches!(filters.content_type, None | Some(ContentType::Period)) {
        for proposal in repo.all_period_proposals()? {
            let Some(world) = repo.try_get_world(&proposal.world)? else {
                continue;
            };
            if !authorize::passes_territorial_silo(
                viewer,
                &visible_authors,
                &proposal.author,
                world.author.as_ref(),
            ) {
                continue;
            }
            if !author_ok(&proposal.author)
                || !matches_query(
                    &filters.query,
                    &[
                        proposal.proposed_title.as_str(),
                        proposal.proposed_description.as_str(),
                    ],
                )
            {
                continue;
            }
            let has_authority = authorize::has_authority_over(
                repo,
                viewer,
                &world,
                &proposal.author,
                proposal.status,
            )?;
            let item = DashboardItem {
                kind: ContentType::Period,
                proposal_id: proposal.id,
                type_label: "📅 PERIODO".into(),
                target_name: proposal.proposed_title.clone(),
                target_link: format!("/mundo/{}/", world.public_id),
                author: proposal.author.clone(),
                status: proposal.status,
                feedback: proposal.admin_feedback.clone(),
                has_authority,
                world_edit_kind: None,
                created_at: proposal.created_at,
            };
            match proposal.status {
                ProposalStatus::Pending => board.periods.pending.push(item),
                ProposalStatus::Approved => board.periods.approved.push(item),
                ProposalStatus::Rejected => board.periods.rejected.push(item),
                _ => {}
            }
        }
    }

    for buckets in [
        &mut board.worlds,
        &mut board.narratives,
        &mut board.images,
        &mut board.periods,
        &mut board.metadata,
    ] {
        for bucket in [
            &mut buckets.pending,
            &mut buckets.approved,
            &mut buckets.rejected,
            &mut buckets.timeline_pending,
            &mut buckets.timeline_approved,
        ] {
            bucket.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        buckets.rejected.truncate(REJECTED_CAP);
    }

    Ok(board)
}

/// Inbox view: items grouped by author, newest first inside each group.
pub fn group_items_by_author(items: Vec<DashboardItem>) -> Vec<(UserName, Vec<DashboardItem>)> {
    let mut groups: Vec<(UserName, Vec<DashboardItem>)> = items
        .into_iter()
        .map(|item| (item.author.clone(), item))
        .into_group_map()
        .into_iter()
        .collect();
    for (_, group) in groups.iter_mut() {
        group.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups
}
