//! Metadata schema registry: maps a position in the hierarchy (level and
//! branch) or an explicit entity type to the typed field schema the editor
//! and the Auto-Noos extractor fill in.

use std::str::FromStr;

use strum::{EnumIter, EnumString};

use crate::entities::{
    jid::{Branch, IndividualKind, JId},
    metadata::Metadata,
};

/// Coherence band of a hierarchy level. Determines which kind of metadata a
/// level demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MetadataGroup {
    Foundations,
    Cosmology,
    Planetary,
    SocioPolitical,
    Localization,
    Biological,
    Individual,
}

impl MetadataGroup {
    pub fn for_level(level: u8) -> Option<Self> {
        match level {
            1..=2 => Some(Self::Foundations),
            3..=5 => Some(Self::Cosmology),
            6..=7 => Some(Self::Planetary),
            8..=10 => Some(Self::SocioPolitical),
            11..=12 => Some(Self::Localization),
            13..=15 => Some(Self::Biological),
            16 => Some(Self::Individual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum EntityType {
    Caos,
    Abismo,
    Universo,
    Galaxia,
    Sistema,
    Planeta,
    Dimension,
    Geografia,
    Sociedad,
    Criatura,
    Objeto,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Caos => "CAOS",
            Self::Abismo => "ABISMO",
            Self::Universo => "UNIVERSO",
            Self::Galaxia => "GALAXIA",
            Self::Sistema => "SISTEMA",
            Self::Planeta => "PLANETA",
            Self::Dimension => "DIMENSION",
            Self::Geografia => "GEOGRAFIA",
            Self::Sociedad => "SOCIEDAD",
            Self::Criatura => "CRIATURA",
            Self::Objeto => "OBJETO",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.write_str(self.as_str())
    }
}

/// Field schema of an entity type: mandatory keys with their fill-in hints,
/// plus optional keys the extractor may add when the lore supports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub entity_type: EntityType,
    pub campos_fijos: &'static [(&'static str, &'static str)],
    pub campos_ia_extra: &'static [&'static str],
}

impl FieldSchema {
    pub fn fixed_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.campos_fijos.iter().map(|(key, _)| *key)
    }
}

pub const CAOS_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Caos,
    campos_fijos: &[
        ("nivel_entropia", "0-100%"),
        ("color_primordial", "Manifestación visual"),
        ("tipo_energia", "Nombre energía"),
        ("consciencia", "Nula/Latente"),
    ],
    campos_ia_extra: &[],
};

pub const ABISMO_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Abismo,
    campos_fijos: &[
        ("estado_gestacion", "Activo/Latente"),
        ("elementos_presentes", "Fuego/Vacio"),
        ("profundidad", "1-10"),
    ],
    campos_ia_extra: &[],
};

pub const UNIVERSO_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Universo,
    campos_fijos: &[
        ("leyes_fisicas", "TRUE"),
        ("magia_ambiental", "Alta/Baja"),
        ("expansion", "Estado"),
    ],
    campos_ia_extra: &[],
};

pub const GALAXIA_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Galaxia,
    campos_fijos: &[
        ("morfologia", "Espiral/Eliptica"),
        ("nucleo", "Agujero Negro"),
        ("civilizacion", "Kardashev"),
    ],
    campos_ia_extra: &[],
};

pub const SISTEMA_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Sistema,
    campos_fijos: &[
        ("soles", "Cantidad"),
        ("planetas", "Cantidad"),
        ("zona_habitable", "Si/No"),
    ],
    campos_ia_extra: &[],
};

// The physical parent: source of the critical inheritance chain.
pub const PLANETA_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Planeta,
    campos_fijos: &[
        ("gravedad", "Valor g (ej: 1.0g)"),
        ("atmosfera", "Respirable/Toxica"),
        ("clima_global", "Base (ej: Glacial)"),
        ("lunas", "Cantidad"),
        ("agua", "%"),
    ],
    campos_ia_extra: &[],
};

pub const DIMENSION_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Dimension,
    campos_fijos: &[
        ("densidad_espiritual", "Alta/Media"),
        ("corrupcion", "0-100%"),
        ("gobernante_capa", "Nombre entidad"),
        ("ley_dominante", "Regla del plano"),
    ],
    campos_ia_extra: &[],
};

pub const GEOGRAFIA_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Geografia,
    campos_fijos: &[
        ("bioma_dominante", "Bosque/Desierto/Tundra"),
        ("temperatura_media", "Grados C"),
        ("recursos_naturales", "Hierro/Mana/Agua"),
        ("peligrosidad_ambiental", "Baja/Extrema"),
    ],
    campos_ia_extra: &[],
};

pub const SOCIEDAD_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Sociedad,
    campos_fijos: &[
        ("poblacion", "Estimada"),
        ("gobierno", "Tipo político"),
        ("nivel_tecnologico", "Medieval/Futurista"),
        ("defensas", "Nivel 1-10"),
        ("recurso_principal", "Economía base"),
        ("idioma_oficial", "Nombre idioma"),
    ],
    campos_ia_extra: &[],
};

pub const CRIATURA_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Criatura,
    campos_fijos: &[
        ("nombre_raza", "Humano/Elfo/Bestia"),
        ("edad_media", "Esperanza de vida"),
        ("rol_biologico", "Depredador/Presa/Civilizado"),
        ("dieta", "Omnívoro/Carnívoro/Energía"),
        ("habitat_ideal", "Bioma preferido (ej: Bosques)"),
        ("nivel_amenaza", "Rango F-S"),
        ("alineamiento", "Moral (ej: Neutral)"),
    ],
    campos_ia_extra: &["Habilidades_Raciales", "Debilidades", "Comportamiento_Social"],
};

pub const OBJETO_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Objeto,
    campos_fijos: &[
        ("tipo_objeto", "Arma/Reliquia/Libro"),
        ("material_base", "Acero/Mitril/Madera"),
        ("calidad", "Común/Raro/Legendario"),
        ("estado_conservacion", "Intacto/Oxidado/Roto"),
        ("creador_origen", "Cultura o Nombre"),
        ("historial_portadores", "Timeline Cronológico"),
    ],
    campos_ia_extra: &["Efectos_Magicos", "Requisitos_Uso", "Valor_Estimado"],
};

pub const ALL_SCHEMAS: [&FieldSchema; 11] = [
    &CAOS_SCHEMA,
    &ABISMO_SCHEMA,
    &UNIVERSO_SCHEMA,
    &GALAXIA_SCHEMA,
    &SISTEMA_SCHEMA,
    &PLANETA_SCHEMA,
    &DIMENSION_SCHEMA,
    &GEOGRAFIA_SCHEMA,
    &SOCIEDAD_SCHEMA,
    &CRIATURA_SCHEMA,
    &OBJETO_SCHEMA,
];

/// Explicit type lookup, used when an author forces a type from the manual.
/// Tolerates the legacy `_SCHEMA` suffix.
pub fn schema_for_type(type_name: &str) -> Option<&'static FieldSchema> {
    let normalized = type_name.trim().to_uppercase();
    let normalized = normalized.strip_suffix("_SCHEMA").unwrap_or(&normalized);
    let entity_type = EntityType::from_str(normalized).ok()?;
    ALL_SCHEMAS
        .iter()
        .copied()
        .find(|schema| schema.entity_type == entity_type)
}

/// The "level logic": derives the schema from the position in the hierarchy.
pub fn schema_for_hierarchy(jid: &JId) -> Option<&'static FieldSchema> {
    let level = jid.level();

    // Level 16: the big switch between living beings and artifacts,
    // decided by the level-13 segment.
    if level == 16 {
        return Some(match jid.individual_kind() {
            IndividualKind::Object => &OBJETO_SCHEMA,
            IndividualKind::Creature => &CRIATURA_SCHEMA,
        });
    }

    // Geography and society: level 7 carries the biome, the rest are
    // continental/social layers.
    if (7..=11).contains(&level) {
        return Some(if level == 7 {
            &GEOGRAFIA_SCHEMA
        } else {
            &SOCIEDAD_SCHEMA
        });
    }

    if level == 6 {
        // Planets hang off the physical branch; everything else at this
        // depth is a dimensional layer.
        return Some(match jid.branch() {
            Branch::Physical => &PLANETA_SCHEMA,
            Branch::Dimensional => &DIMENSION_SCHEMA,
        });
    }

    match level {
        1 => Some(&CAOS_SCHEMA),
        2 => Some(&ABISMO_SCHEMA),
        3 => Some(&UNIVERSO_SCHEMA),
        4 => Some(&GALAXIA_SCHEMA),
        5 => Some(&SISTEMA_SCHEMA),
        _ => None,
    }
}

/// Keys that cascade down from an ancestor that defines them. Locally
/// defined values always win.
pub const INHERITABLE_KEYS: [(&str, EntityType); 6] = [
    ("gravedad", EntityType::Planeta),
    ("atmosfera", EntityType::Planeta),
    ("ciclo_dia", EntityType::Planeta),
    ("bioma_dominante", EntityType::Geografia),
    ("idioma_oficial", EntityType::Sociedad),
    ("nivel_tecnologico", EntityType::Sociedad),
];

/// Resolves one inheritable key for an entity: the local value if present,
/// otherwise the value of the closest ancestor that defines it. The ancestor
/// chain arrives ordered from the direct parent up.
pub fn resolve_inherited<'a>(
    key: &str,
    local: &'a Metadata,
    ancestor_chain: impl IntoIterator<Item = &'a Metadata>,
) -> Option<&'a serde_json::Value> {
    if !INHERITABLE_KEYS.iter().any(|(k, _)| *k == key) {
        return local.get(key);
    }
    if let Some(value) = local.get(key) {
        return Some(value);
    }
    for ancestor in ancestor_chain {
        if let Some(value) = ancestor.get(key) {
            return Some(value);
        }
        if let Some(value) = ancestor
            .get("datos_nucleo")
            .and_then(serde_json::Value::as_object)
            .and_then(|nucleo| nucleo.get(key))
        {
            return Some(value);
        }
    }
    None
}

/// Checks a proposed metadata document against the schema of its position:
/// every fixed key of the schema must be present under `datos_nucleo`.
pub fn validate_against_schema(jid: &JId, metadata: &Metadata) -> Result<(), Vec<&'static str>> {
    let Some(schema) = schema_for_hierarchy(jid) else {
        return Ok(());
    };
    let nucleo = metadata
        .get("datos_nucleo")
        .and_then(serde_json::Value::as_object);
    let missing: Vec<&'static str> = schema
        .fixed_keys()
        .filter(|key| nucleo.map_or(true, |n| !n.contains_key(*key)))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jid(s: &str) -> JId {
        JId::parse(s).unwrap()
    }

    #[test]
    fn level_bands() {
        assert_eq!(MetadataGroup::for_level(1), Some(MetadataGroup::Foundations));
        assert_eq!(MetadataGroup::for_level(4), Some(MetadataGroup::Cosmology));
        assert_eq!(MetadataGroup::for_level(6), Some(MetadataGroup::Planetary));
        assert_eq!(
            MetadataGroup::for_level(9),
            Some(MetadataGroup::SocioPolitical)
        );
        assert_eq!(
            MetadataGroup::for_level(11),
            Some(MetadataGroup::Localization)
        );
        assert_eq!(MetadataGroup::for_level(14), Some(MetadataGroup::Biological));
        assert_eq!(MetadataGroup::for_level(16), Some(MetadataGroup::Individual));
        assert_eq!(MetadataGroup::for_level(17), None);
    }

    #[test]
    fn hierarchy_routing() {
        // Level 6 physical branch -> planet; dimensional -> layer.
        assert_eq!(
            schema_for_hierarchy(&jid("010101000001")).unwrap().entity_type,
            EntityType::Planeta
        );
        assert_eq!(
            schema_for_hierarchy(&jid("010201000001")).unwrap().entity_type,
            EntityType::Dimension
        );
        // Level 7 geography, 8-11 society.
        assert_eq!(
            schema_for_hierarchy(&jid(&"01".repeat(7))).unwrap().entity_type,
            EntityType::Geografia
        );
        assert_eq!(
            schema_for_hierarchy(&jid(&"01".repeat(9))).unwrap().entity_type,
            EntityType::Sociedad
        );
        // Level 12 has no schema of its own.
        assert!(schema_for_hierarchy(&jid(&"01".repeat(12))).is_none());
    }

    #[test]
    fn level_16_switch() {
        let creature = jid(&format!("{}{}{}", "01".repeat(12), "45", "01".repeat(3)));
        let object = jid(&format!("{}{}{}", "01".repeat(12), "93", "01".repeat(3)));
        assert_eq!(
            schema_for_hierarchy(&creature).unwrap().entity_type,
            EntityType::Criatura
        );
        assert_eq!(
            schema_for_hierarchy(&object).unwrap().entity_type,
            EntityType::Objeto
        );
    }

    #[test]
    fn explicit_type_lookup() {
        assert_eq!(
            schema_for_type("PLANETA").unwrap().entity_type,
            EntityType::Planeta
        );
        assert_eq!(
            schema_for_type("criatura_schema").unwrap().entity_type,
            EntityType::Criatura
        );
        assert!(schema_for_type("NAVE").is_none());
    }

    #[test]
    fn inheritance_prefers_local_then_closest() {
        let mut local = Metadata::new();
        let mut parent = Metadata::new();
        let mut grandparent = Metadata::new();
        parent.insert("gravedad", json!("0.8g"));
        grandparent.insert("gravedad", json!("1.2g"));

        let chain = [&parent, &grandparent];
        assert_eq!(
            resolve_inherited("gravedad", &local, chain.iter().copied()),
            Some(&json!("0.8g"))
        );
        local.insert("gravedad", json!("2.0g"));
        assert_eq!(
            resolve_inherited("gravedad", &local, chain.iter().copied()),
            Some(&json!("2.0g"))
        );
    }

    #[test]
    fn schema_validation_reports_missing_keys() {
        let planet = jid("010101000001");
        let mut metadata = Metadata::new();
        metadata.insert(
            "datos_nucleo",
            json!({"gravedad": "1.0g", "atmosfera": "Respirable"}),
        );
        let missing = validate_against_schema(&planet, &metadata).unwrap_err();
        assert_eq!(missing, vec!["clima_global", "lunas", "agua"]);
    }
}
