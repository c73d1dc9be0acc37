use super::prelude::*;
use crate::{gateways::images::ImageStorage, usecases::authorize};

/// Parameters of an image proposal.
#[derive(Debug, Clone)]
pub struct NewImageProposal {
    pub world: JId,
    pub action: ImageAction,
    /// Pending upload for ADD; ignored for DELETE.
    pub image_blob_ref: Option<String>,
    pub target_filename: String,
    pub title: String,
    pub reason: String,
    pub timeline_period: Option<String>,
}

pub fn propose_image_change<R>(
    repo: &R,
    author: &User,
    new: NewImageProposal,
) -> Result<ImageProposal>
where
    R: WorldRepo + ImageProposalRepo + UserRepo + EventLogRepo,
{
    let NewImageProposal {
        world: world_id,
        action,
        image_blob_ref,
        target_filename,
        title,
        reason,
        timeline_period,
    } = new;

    let world = repo
        .try_get_world(&world_id)?
        .filter(|w| w.is_active)
        .ok_or(Error::NotFound)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }
    if action == ImageAction::Add && image_blob_ref.is_none() {
        return Err(Error::Validation(
            "La propuesta de subida requiere el archivo".into(),
        ));
    }
    if target_filename.trim().is_empty() {
        return Err(Error::Validation("Falta el nombre de archivo".into()));
    }

    let proposal = repo.create_image_proposal(ImageProposal {
        id: ProposalId::default(),
        world: world_id.clone(),
        action,
        image_blob_ref,
        target_filename,
        title,
        reason,
        timeline_period,
        admin_feedback: None,
        status: ProposalStatus::Pending,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;
    repo.log_event(EventLogEntry::new(
        Some(author.name.clone()),
        "PROPOSE_IMAGE_CHANGE",
        Some(world_id.to_string()),
        action.to_string(),
    ))?;
    Ok(proposal)
}

pub fn approve_image_proposal<R>(
    repo: &R,
    reviewer: &User,
    proposal_id: ProposalId,
) -> Result<ImageProposal>
where
    R: WorldRepo + ImageProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_image_proposal(proposal_id)?;
    let world = repo.get_world(&proposal.world)?;
    authorize::require_authority_over(repo, reviewer, &world, &proposal.author, proposal.status)?;
    if !proposal.status.can_transition(ProposalStatus::Approved) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Approved,
        });
    }
    proposal.status = ProposalStatus::Approved;
    proposal.reviewer = Some(reviewer.name.clone());
    repo.update_image_proposal(&proposal)?;
    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "🖼️ Imagen Aprobada",
        format!(
            "Tu propuesta de imagen para '{}' ha sido aprobada.",
            world.name
        ),
        "/dashboard/?type=IMAGE",
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(reviewer.name.clone()),
        "APPROVE_IMAGE_PROPOSAL",
        Some(proposal.id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

pub fn reject_image_proposal<R>(
    repo: &R,
    reviewer: &User,
    proposal_id: ProposalId,
    feedback: Option<String>,
) -> Result<ImageProposal>
where
    R: WorldRepo + ImageProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_image_proposal(proposal_id)?;
    let world = repo.get_world(&proposal.world)?;
    authorize::require_authority_over(repo, reviewer, &world, &proposal.author, proposal.status)?;
    if !proposal.status.can_transition(ProposalStatus::Rejected) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Rejected,
        });
    }
    let feedback = feedback.filter(|f| !f.trim().is_empty());
    if reviewer.name != proposal.author && feedback.is_none() {
        return Err(Error::Validation(
            "El rechazo administrativo requiere un motivo".into(),
        ));
    }
    proposal.status = ProposalStatus::Rejected;
    proposal.reviewer = Some(reviewer.name.clone());
    proposal.admin_feedback = feedback.clone();
    repo.update_image_proposal(&proposal)?;
    let feedback_msg = feedback
        .as_deref()
        .map(|f| format!(" Motivo: {f}"))
        .unwrap_or_default();
    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "❌ Imagen Rechazada",
        format!(
            "Tu propuesta de imagen para '{}' ha sido rechazada.{feedback_msg}",
            world.name
        ),
        "/dashboard/?type=IMAGE",
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(reviewer.name.clone()),
        "REJECT_IMAGE",
        Some(proposal.id.to_string()),
        feedback_msg,
    ))?;
    Ok(proposal)
}

/// Publishes an approved image proposal. ADD registers the file in the
/// world's gallery journal and stores the blob; DELETE moves the live file
/// to the per-world `.trash` folder, reversible through restore.
pub fn publish_image_proposal<R>(
    repo: &R,
    storage: &dyn ImageStorage,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<ImageProposal>
where
    R: WorldRepo + ImageProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_image_proposal(proposal_id)?;
    let mut world = repo.get_world(&proposal.world)?;
    authorize::require_authority_over(repo, actor, &world, &proposal.author, proposal.status)?;
    if !proposal.status.can_transition(ProposalStatus::Live) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Live,
        });
    }

    match proposal.action {
        ImageAction::Add => {
            let blob_ref = proposal
                .image_blob_ref
                .as_deref()
                .ok_or_else(|| Error::Validation("Propuesta sin archivo".into()))?;
            storage
                .store(&world.id, &proposal.target_filename, blob_ref)
                .map_err(|e| Error::External(e.to_string()))?;
            world.metadata.log_gallery_upload(
                proposal.target_filename.clone(),
                &GalleryEntry {
                    title: proposal.title.clone(),
                    uploader: proposal.author.to_string(),
                    date: String::new(),
                },
            );
            repo.update_world(&world)?;
        }
        ImageAction::Delete => {
            storage
                .move_to_trash(&world.id, &proposal.target_filename)
                .map_err(|e| Error::External(e.to_string()))?;
            world.metadata.remove_gallery_entry(&proposal.target_filename);
            if world.metadata.cover_image() == Some(proposal.target_filename.as_str()) {
                world.metadata.remove("cover_image");
            }
            repo.update_world(&world)?;
            repo.log_event(EventLogEntry::new(
                Some(actor.name.clone()),
                "SOFT_DELETE_IMAGE",
                Some(world.id.to_string()),
                format!("Archivo movido a .trash: {}", proposal.target_filename),
            ))?;
        }
    }

    proposal.status = ProposalStatus::Live;
    proposal.reviewer = Some(actor.name.clone());
    repo.update_image_proposal(&proposal)?;
    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "🚀 ¡Imagen Publicada!",
        format!(
            "Tu propuesta de imagen para '{}' ya está en vivo.",
            world.name
        ),
        format!("/mundo/{}/", world.public_id),
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "PUBLISH_IMAGE",
        Some(proposal.id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

/// Restores a published DELETE proposal: the file moves back out of the
/// trash folder and rejoins the gallery journal.
pub fn restore_image_proposal<R>(
    repo: &R,
    storage: &dyn ImageStorage,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<ImageProposal>
where
    R: WorldRepo + ImageProposalRepo + UserRepo + EventLogRepo,
{
    let mut proposal = repo.get_image_proposal(proposal_id)?;
    let mut world = repo.get_world(&proposal.world)?;
    let has_authority =
        authorize::has_authority_over(repo, actor, &world, &proposal.author, proposal.status)?;
    if actor.name != proposal.author && !has_authority {
        return Err(Error::Forbidden);
    }
    if proposal.action != ImageAction::Delete {
        return Err(Error::Validation(
            "Solo las propuestas de borrado son reversibles".into(),
        ));
    }
    storage
        .restore_from_trash(&world.id, &proposal.target_filename)
        .map_err(|e| Error::External(e.to_string()))?;
    world.metadata.log_gallery_upload(
        proposal.target_filename.clone(),
        &GalleryEntry {
            title: proposal.title.clone(),
            uploader: proposal.author.to_string(),
            date: String::new(),
        },
    );
    repo.update_world(&world)?;

    proposal.status = ProposalStatus::Archived;
    repo.update_image_proposal(&proposal)?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "RESTORE_IMAGE",
        Some(proposal.id.to_string()),
        format!("Archivo restaurado: {}", proposal.target_filename),
    ))?;
    Ok(proposal)
}
