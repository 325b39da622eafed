// Esquema Diesel de las dos relaciones append-only consultadas.
// El aprovisionamiento del esquema queda fuera de este crate.
diesel::table! {
    website_event (event_id) {
        event_id -> Uuid,
        url_path -> Text,
        event_name -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}
diesel::table! {
    llm_enriched_config (session_id, created_at) {
        session_id -> Text,
        event_name -> Text,
        created_at -> Timestamptz,
        enriched_config -> Jsonb,
    }
}
