use serde_json::{json, Map, Value};

use super::prelude::*;
use crate::{
    gateways::llm::LoreGenerator,
    schema::{self, EntityType, FieldSchema},
};

/// Sentinel value for schema keys the corpus could not fill.
pub const PENDING_VALUE: &str = "Pendiente";

/// Below this many non-space characters the corpus counts as empty and the
/// extractor switches to Cold Start mode.
const MIN_CORPUS_CHARS: usize = 10;

#[derive(Debug, Default, Clone)]
pub struct AutoNoosRequest {
    pub world: JId,
    pub force_type: Option<String>,
    pub external_context: Option<String>,
}

/// Contextual metadata extraction (Auto-Noos).
///
/// Resolves the field schema by hierarchy, falling back to an explicit
/// type, the stored `tipo_entidad`, and finally an LLM classification; then
/// fills the schema from the lore corpus, or emits a "Pendiente" skeleton
/// when there is no lore yet (Cold Start). The result is never persisted
/// here: the caller wraps it in a regular metadata proposal.
pub fn generate_contextual_metadata<R>(
    repo: &R,
    ai: &dyn LoreGenerator,
    request: AutoNoosRequest,
) -> Result<Option<Metadata>>
where
    R: WorldRepo,
{
    let AutoNoosRequest {
        world: world_id,
        force_type,
        external_context,
    } = request;

    let world = repo.try_get_world(&world_id)?.ok_or(Error::NotFound)?;
    let mut trace: Vec<String> = vec![format!(
        "🔭 Analizando metadatos contextuales para: {} (ID: {world_id})",
        world.name
    )];

    let mut entity_type: Option<String> = None;

    // Strategy 1: hierarchy and branch.
    let mut field_schema = schema::schema_for_hierarchy(&world_id);
    if let Some(schema) = field_schema {
        trace.push(format!(
            "📏 Detectado Nivel {} (Rama Determinada). Aplicando esquema jerárquico.",
            world_id.level()
        ));
        entity_type = Some(schema.entity_type.to_string());
    }

    // Strategy 2: explicit type, then the stored one, then the classifier.
    if field_schema.is_none() {
        entity_type = force_type.or_else(|| {
            world.metadata.tipo_entidad().map(str::to_owned)
        });
        if entity_type.is_none() {
            entity_type = infer_entity_type(ai, &world)?;
            if let Some(inferred) = &entity_type {
                trace.push(format!("🤖 IA clasificó la entidad como: {inferred}"));
            }
        }
        field_schema = entity_type.as_deref().and_then(schema::schema_for_type);
    }

    let mut corpus = external_context.unwrap_or_default();
    if !corpus.is_empty() && !world.description.is_empty() {
        corpus.push('\n');
    }
    corpus.push_str(&world.description);
    let is_lore_empty = corpus.chars().filter(|c| !c.is_whitespace()).count() < MIN_CORPUS_CHARS;

    let mut result = match (field_schema, is_lore_empty) {
        (Some(schema), true) => {
            // Cold Start: deterministic skeleton, nothing to analyze.
            trace.push("❄️ Cold Start: Inicializando metadatos vacíos...".into());
            let mut nucleo = Map::new();
            for key in schema.fixed_keys() {
                nucleo.insert(key.to_owned(), Value::String(PENDING_VALUE.into()));
            }
            let mut meta = Metadata::new();
            meta.insert("datos_nucleo", Value::Object(nucleo));
            meta.insert("datos_extendidos", json!({}));
            Some(meta)
        }
        (Some(schema), false) => {
            trace.push("📚 Analizando lore contra esquema jerárquico...".into());
            Some(extract_with_schema(ai, &corpus, schema)?)
        }
        (None, false) => {
            // No schema: generic key/value envelope.
            trace.push("🧪 Extracción genérica sin esquema.".into());
            let envelope = ai
                .extract_metadata(&corpus)
                .map_err(|e| Error::External(e.to_string()))?;
            let mut meta = Metadata::new();
            meta.insert(
                "properties",
                envelope.get("properties").cloned().unwrap_or(json!([])),
            );
            Some(meta)
        }
        (None, true) => None,
    };

    if let Some(meta) = &mut result {
        if let Some(tipo) = entity_type {
            if meta.tipo_entidad().is_none() {
                meta.set_tipo_entidad(tipo);
            }
        }
        meta.insert(
            "analysis_trace",
            Value::Array(trace.into_iter().map(Value::String).collect()),
        );
        log::info!("📤 Propuesta de metadatos generada (sin guardar)");
    }
    Ok(result)
}

/// Last-resort classification: asks the model to pick one of the known
/// types, deterministically.
fn infer_entity_type(ai: &dyn LoreGenerator, world: &World) -> Result<Option<String>> {
    use strum::IntoEnumIterator;
    let possible_types = EntityType::iter().map(|t| t.to_string()).collect::<Vec<_>>();
    let prompt = format!(
        "Analiza este texto: '{}'. Basado en el contenido, clasifica esta \
         entidad en uno de estos tipos: [{}]. Devuelve solo el TIPO.",
        world.description,
        possible_types.join(", ")
    );
    let response = match ai.edit_text(
        "Eres un clasificador taxonómico estricto.",
        &prompt,
        0.1,
        10,
    ) {
        Ok(response) => response,
        Err(err) => {
            log::warn!("Error infiriendo tipo: {err}");
            return Ok(None);
        }
    };
    let clean: String = response
        .trim()
        .to_uppercase()
        .replace(['"', '\'', '.'], "");
    let clean = clean.split_whitespace().next().unwrap_or("").to_owned();
    if possible_types.contains(&clean) {
        return Ok(Some(clean));
    }
    // Partial match rescue for verbose models.
    Ok(possible_types.into_iter().find(|t| clean.contains(t)))
}

/// Schema-bound extraction: the model must emit exactly the fixed keys;
/// whatever it omits is backfilled with the sentinel.
fn extract_with_schema(
    ai: &dyn LoreGenerator,
    corpus: &str,
    schema: &FieldSchema,
) -> Result<Metadata> {
    let campos_fijos: Map<String, Value> = schema
        .campos_fijos
        .iter()
        .map(|(k, hint)| (k.to_string(), Value::String(hint.to_string())))
        .collect();
    let system_prompt = "Eres un Analista de Datos de Worldbuilding. Tu tarea es \
                         extraer información técnica del Lore.";
    let user_prompt = format!(
        "Texto del Lore: '{corpus}'\n\n\
         Esquema OBLIGATORIO (Campos Fijos):\n{}\n\n\
         Campos Opcionales Sugeridos (Solo si aplica):\n{}\n\n\
         INSTRUCCIONES ESTRICTAS DE FORMATO:\n\
         - FORMATO DE CLAVES: Usa 'snake_case' técnico. NO uses espacios ni mayúsculas en las claves.\n\
         - VALORES: Concisos (Máximo 3-5 palabras).\n\
         - NO inventes datos si no están en el texto. Usa \"{PENDING_VALUE}\".\n\
         - DATOS EXTENDIDOS: Si encuentras datos relevantes que NO están en los Campos Fijos, \
           agrégalos a 'datos_extendidos' usando claves snake_case.\n\
         - Devuelve SOLO el JSON con las claves de nivel superior: \"tipo_entidad\", \
           \"datos_nucleo\" (Fijos), \"datos_extendidos\" (Extra).",
        serde_json::to_string_pretty(&campos_fijos).unwrap_or_default(),
        serde_json::to_string_pretty(&schema.campos_ia_extra).unwrap_or_default(),
    );

    let raw = ai
        .generate_structure(system_prompt, &user_prompt)
        .map_err(|e| Error::External(e.to_string()))?;
    let mut meta = Metadata::from_value(raw)
        .ok_or_else(|| Error::External("La IA no devolvió un objeto JSON".into()))?;

    // Enforce the schema contract locally: every fixed key present.
    let mut nucleo = meta
        .get("datos_nucleo")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for key in schema.fixed_keys() {
        nucleo
            .entry(key.to_owned())
            .or_insert_with(|| Value::String(PENDING_VALUE.into()));
    }
    meta.insert("datos_nucleo", Value::Object(nucleo));
    if meta.get("datos_extendidos").is_none() {
        meta.insert("datos_extendidos", json!({}));
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{MockDb, MockLore};
    use super::*;
    use caos_entities::builders::*;

    /// A level-6 physical world with an empty description cold-starts
    /// into a full PLANETA skeleton of "Pendiente" values.
    #[test]
    fn cold_start_returns_pending_skeleton() {
        let db = MockDb::default();
        db.worlds
            .borrow_mut()
            .push(World::build().id("010101000001").name("Mundo").finish());
        let ai = MockLore::default();

        let meta = generate_contextual_metadata(
            &db,
            &ai,
            AutoNoosRequest {
                world: "010101000001".parse().unwrap(),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        let nucleo = meta.get("datos_nucleo").unwrap().as_object().unwrap();
        let mut keys: Vec<&str> = nucleo.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["agua", "atmosfera", "clima_global", "gravedad", "lunas"]);
        assert!(nucleo.values().all(|v| *v == PENDING_VALUE));

        let trace = meta.get("analysis_trace").unwrap().as_array().unwrap();
        assert!(trace
            .iter()
            .any(|entry| entry.as_str().unwrap_or_default().contains("Cold Start")));
        assert_eq!(meta.tipo_entidad(), Some("PLANETA"));
        // Nothing was asked of the model.
        assert_eq!(ai.structure_calls(), 0);
    }

    #[test]
    fn lore_backed_extraction_backfills_missing_keys() {
        let db = MockDb::default();
        db.worlds.borrow_mut().push(
            World::build()
                .id("010101000001")
                .name("Mundo")
                .description("Un planeta glacial con dos lunas y mares de metano.")
                .finish(),
        );
        let ai = MockLore::with_structure(json!({
            "tipo_entidad": "PLANETA",
            "datos_nucleo": {"clima_global": "Glacial", "lunas": "2"},
        }));

        let meta = generate_contextual_metadata(
            &db,
            &ai,
            AutoNoosRequest {
                world: "010101000001".parse().unwrap(),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        let nucleo = meta.get("datos_nucleo").unwrap().as_object().unwrap();
        assert_eq!(nucleo["clima_global"], "Glacial");
        assert_eq!(nucleo["gravedad"], PENDING_VALUE);
        assert_eq!(ai.structure_calls(), 1);
    }

    #[test]
    fn no_schema_and_no_lore_yields_nothing() {
        let db = MockDb::default();
        // Level 12 has no schema.
        db.worlds
            .borrow_mut()
            .push(World::build().id(&"01".repeat(12)).name("x").finish());
        let ai = MockLore::default();
        let result = generate_contextual_metadata(
            &db,
            &ai,
            AutoNoosRequest {
                world: "01".repeat(12).parse().unwrap(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(result.is_none());
    }
}
