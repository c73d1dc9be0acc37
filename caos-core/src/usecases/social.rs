use super::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InteractionCounts {
    pub likes: usize,
    pub comments: usize,
    pub engagement: usize,
}

/// Total likes and top-level comments attached to an entity key.
pub fn get_interactions_count<R>(repo: &R, key: &EntityKey) -> Result<InteractionCounts>
where
    R: LikeRepo + CommentRepo,
{
    let likes = repo.count_likes(key)?;
    let comments = repo.count_comments(key, true)?;
    Ok(InteractionCounts {
        likes,
        comments,
        engagement: likes + comments,
    })
}

pub fn get_comments<R: CommentRepo>(
    repo: &R,
    key: &EntityKey,
    parent_only: bool,
) -> Result<Vec<Comment>> {
    let mut comments = repo.comments_for(key, parent_only)?;
    comments.sort_by_key(|c| c.created_at);
    Ok(comments)
}

pub fn add_comment<R: CommentRepo>(
    repo: &R,
    user: &User,
    key: EntityKey,
    text: String,
    parent: Option<u64>,
) -> Result<Comment> {
    if text.trim().is_empty() {
        return Err(Error::Validation("Comentario vacío".into()));
    }
    Ok(repo.create_comment(Comment {
        id: 0,
        entity_key: key,
        user: user.name.clone(),
        text,
        parent,
        created_at: TimestampMs::now(),
        archived_at: None,
    })?)
}

/// Toggles a like; returns whether the key is now liked by the user.
pub fn toggle_like<R: LikeRepo>(repo: &R, user: &User, key: &EntityKey) -> Result<bool> {
    if repo.find_like(&user.name, key)?.is_some() {
        repo.delete_like(&user.name, key)?;
        return Ok(false);
    }
    repo.create_like(Like {
        id: 0,
        entity_key: key.clone(),
        user: user.name.clone(),
        created_at: TimestampMs::now(),
    })?;
    Ok(true)
}

/// Records a 1..=5 rating for an entity key.
pub fn rate<R: RatingRepo>(
    repo: &R,
    user: &User,
    key: EntityKey,
    score: RatingScore,
) -> Result<Rating> {
    if !score.is_valid() {
        return Err(Error::Validation("Valoración fuera de rango".into()));
    }
    Ok(repo.create_rating(Rating {
        id: 0,
        entity_key: key,
        user: user.name.clone(),
        score,
        created_at: TimestampMs::now(),
    })?)
}

/// A discovered image attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredImage {
    pub filename: String,
    pub title: String,
    pub world: JId,
    pub kind: DiscoveredImageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveredImageKind {
    Cover,
    Gallery,
}

/// Everything attributable to a user across the platform.
#[derive(Debug, Default, Clone)]
pub struct UserContent {
    pub worlds: Vec<World>,
    pub narratives: Vec<Narrative>,
    pub images: Vec<DiscoveredImage>,
    pub proposals: Vec<WorldProposal>,
}

/// Exhaustive scan of content attributed to a user: authored worlds,
/// narratives, uploaded or authored images (cover and gallery, with a
/// world-author fallback when the journal lacks an uploader) and proposals.
pub fn discover_user_content<R: Db>(
    repo: &R,
    target: &UserName,
    include_proposals: bool,
) -> Result<UserContent> {
    let mut content = UserContent::default();
    let target_lower = target.as_str().to_lowercase();

    for world in repo.all_active_worlds()? {
        let author_matches = world.author.as_ref() == Some(target)
            || world
                .current_author_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase() == target_lower);

        if author_matches {
            if let Some(cover) = world.metadata.cover_image() {
                content.images.push(DiscoveredImage {
                    filename: cover.to_owned(),
                    title: format!("Portada: {}", world.name),
                    world: world.id.clone(),
                    kind: DiscoveredImageKind::Cover,
                });
            }
        }
        for (filename, entry) in world.metadata.gallery_log() {
            let uploaded_by_target = entry.uploader.to_lowercase() == target_lower;
            let fallback_to_author = entry.uploader.is_empty() && author_matches;
            if uploaded_by_target || fallback_to_author {
                content.images.push(DiscoveredImage {
                    filename: filename.clone(),
                    title: if entry.title.is_empty() {
                        filename
                    } else {
                        entry.title.clone()
                    },
                    world: world.id.clone(),
                    kind: DiscoveredImageKind::Gallery,
                });
            }
        }
        if author_matches {
            content.worlds.push(world);
        }
    }

    for narrative in repo.all_active_narratives()? {
        if narrative.created_by.as_ref() == Some(target) {
            content.narratives.push(narrative);
        }
    }

    if include_proposals {
        content.proposals = repo.query_world_proposals(&ProposalQuery {
            authors: vec![target.clone()],
            ..Default::default()
        })?;
    }

    Ok(content)
}

/// Resolved target of an entity key, for rendering interaction feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContent {
    pub kind: &'static str,
    pub title: String,
    pub world: Option<JId>,
    pub filename: Option<String>,
    pub link: String,
}

pub fn resolve_content_by_key<R: Db>(repo: &R, key: &EntityKey) -> Result<ResolvedContent> {
    match key {
        EntityKey::World(public_id) => {
            let world = repo.get_world_by_public_id(public_id)?;
            Ok(ResolvedContent {
                kind: "WORLD",
                title: world.name.clone(),
                world: Some(world.id.clone()),
                filename: None,
                link: format!("/mundo/{public_id}/"),
            })
        }
        EntityKey::Narrative(public_id) => {
            let narrative = repo.get_narrative_by_public_id(public_id)?;
            Ok(ResolvedContent {
                kind: "NARRATIVE",
                title: narrative.titulo.clone(),
                world: Some(narrative.world.clone()),
                filename: None,
                link: format!("/narrativa/{public_id}/"),
            })
        }
        EntityKey::Image(filename) => {
            // Locate the world whose gallery journal knows the file.
            let owner = repo
                .all_active_worlds()?
                .into_iter()
                .find(|w| w.metadata.gallery_log().iter().any(|(f, _)| f == filename));
            let link = owner
                .as_ref()
                .map(|w| format!("/mundo/{}/", w.public_id))
                .unwrap_or_else(|| "/galeria/".into());
            Ok(ResolvedContent {
                kind: "IMAGE",
                title: filename.clone(),
                world: owner.map(|w| w.id),
                filename: Some(filename.clone()),
                link,
            })
        }
        EntityKey::Version(id) => {
            let proposal = repo.get_world_proposal(*id)?;
            Ok(ResolvedContent {
                kind: "VERSION",
                title: proposal.proposed_name.clone(),
                world: Some(proposal.world.clone()),
                filename: None,
                link: "/dashboard/".into(),
            })
        }
    }
}
