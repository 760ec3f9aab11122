//! Field schemas for every entity the reconciler handles.
//!
//! Field names match the backend payload keys.

use super::{Coerce, CollectionSchema, EntitySchema, FieldSpec};

pub static PERSONA: EntitySchema = EntitySchema {
  name:   "persona",
  fields: &[
    FieldSpec::required("nombre", Coerce::Text),
    FieldSpec::required("apellido", Coerce::Text),
    FieldSpec::optional("nombre_autopercibido", Coerce::Text),
    FieldSpec::optional("fecha_nacimiento", Coerce::Date),
    FieldSpec::optional("edad_aproximada", Coerce::Integer),
    FieldSpec::optional("nacionalidad", Coerce::Text),
    FieldSpec::optional("dni", Coerce::Integer),
    FieldSpec::optional("situacion_dni", Coerce::Text),
    FieldSpec::optional("genero", Coerce::Text),
    FieldSpec::optional("telefono", Coerce::Text),
    FieldSpec::optional("observaciones", Coerce::Text),
    FieldSpec::always_bool("adulto"),
    FieldSpec::always_bool("nnya"),
  ],
};

pub static COORDENADAS: EntitySchema = EntitySchema {
  name:   "geolocalizacion",
  fields: &[
    FieldSpec::optional("lat", Coerce::Decimal),
    FieldSpec::optional("lng", Coerce::Decimal),
  ],
};

pub static LOCALIZACION: EntitySchema = EntitySchema {
  name:   "localizacion",
  fields: &[
    FieldSpec::optional("calle", Coerce::Text),
    FieldSpec::optional("tipo_calle", Coerce::Text),
    // The backend rejects an address without this key, even if blank.
    FieldSpec::required("casa_nro", Coerce::Text),
    FieldSpec::optional("piso_depto", Coerce::Text),
    FieldSpec::optional("lote", Coerce::Integer),
    FieldSpec::optional("mza", Coerce::Integer),
    FieldSpec::optional("referencia_geo", Coerce::Text),
    FieldSpec::optional("geolocalizacion", Coerce::Object(&COORDENADAS)),
    FieldSpec::optional("barrio", Coerce::Ref),
    FieldSpec::optional("localidad", Coerce::Ref),
    FieldSpec::optional("cpc", Coerce::Ref),
  ],
};

pub static EDUCACION: EntitySchema = EntitySchema {
  name:   "educacion",
  fields: &[
    FieldSpec::always_bool("esta_escolarizado"),
    FieldSpec::optional("nivel_alcanzado", Coerce::Text),
    FieldSpec::optional("ultimo_cursado", Coerce::Text),
    FieldSpec::optional("tipo_escuela", Coerce::Text),
    FieldSpec::optional("institucion_educativa", Coerce::Ref),
    FieldSpec::optional("comentarios_educativos", Coerce::Text),
  ],
};

pub static MEDICO_CABECERA: EntitySchema = EntitySchema {
  name:   "medico_cabecera",
  fields: &[
    FieldSpec::optional("nombre", Coerce::Text),
    FieldSpec::optional("mail", Coerce::Text),
    FieldSpec::optional("telefono", Coerce::Text),
  ],
};

pub static COBERTURA_MEDICA: EntitySchema = EntitySchema {
  name:   "cobertura_medica",
  fields: &[
    FieldSpec::always_bool("auh"),
    FieldSpec::optional("obra_social", Coerce::Text),
    FieldSpec::optional("intervencion", Coerce::Text),
    FieldSpec::optional("institucion_sanitaria", Coerce::Ref),
    FieldSpec::optional("observaciones", Coerce::Text),
    FieldSpec::optional("medico_cabecera", Coerce::Object(&MEDICO_CABECERA)),
  ],
};

pub static ENFERMEDAD: EntitySchema = EntitySchema {
  name:   "enfermedad",
  fields: &[
    FieldSpec::optional("situacion_salud", Coerce::Ref),
    FieldSpec::optional("enfermedad", Coerce::Text),
    FieldSpec::optional("certificacion", Coerce::Text),
    FieldSpec::optional("beneficios_gestionados", Coerce::Text),
    FieldSpec::always_bool("recibe_tratamiento"),
    FieldSpec::optional("informacion_tratamiento", Coerce::Text),
  ],
};

pub static ENFERMEDADES: CollectionSchema = CollectionSchema {
  entity: &ENFERMEDAD,
  keys:   &["situacion_salud", "enfermedad"],
};

pub static VULNERABILIDAD: EntitySchema = EntitySchema {
  name:   "condicion_vulnerabilidad",
  fields: &[
    FieldSpec::optional("condicion_vulnerabilidad", Coerce::Ref),
    FieldSpec::always_bool("si_no"),
  ],
};

pub static VULNERABILIDADES: CollectionSchema = CollectionSchema {
  entity: &VULNERABILIDAD,
  keys:   &["condicion_vulnerabilidad"],
};
