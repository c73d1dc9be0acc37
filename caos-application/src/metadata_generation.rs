use caos_core::gateways::llm::LoreGenerator;

use crate::{entities::proposal::*, entities::user::*, mem, usecases, Result};

/// Runs the Auto-Noos extractor and wraps the result into a metadata
/// proposal. The blocking LLM call runs against a shared (read) connection
/// so it never holds the write lock; if the collaborator fails or times
/// out, no proposal is created.
pub fn generate_metadata_proposal(
    connections: &mem::Connections,
    ai: &dyn LoreGenerator,
    author: &User,
    request: usecases::AutoNoosRequest,
) -> Result<Option<WorldProposal>> {
    let world_id = request.world.clone();
    let generated = {
        let conn = connections.shared()?;
        usecases::generate_contextual_metadata(&*conn, ai, request)?
    };
    let Some(metadata) = generated else {
        return Ok(None);
    };

    let mut conn = connections.exclusive()?;
    let proposal = conn.transaction(|db| {
        usecases::propose_metadata_update(
            db,
            author,
            &world_id,
            metadata,
            "Análisis Auto-Noos".into(),
        )
    })?;
    Ok(Some(proposal))
}

/// Extraction without persistence: the caller reviews the result manually.
pub fn preview_contextual_metadata(
    connections: &mem::Connections,
    ai: &dyn LoreGenerator,
    request: usecases::AutoNoosRequest,
) -> Result<Option<crate::entities::metadata::Metadata>> {
    let conn = connections.shared()?;
    Ok(usecases::generate_contextual_metadata(&*conn, ai, request)?)
}
