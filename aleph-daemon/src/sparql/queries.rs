//! SPARQL text used by the loader.
//!
//! Sessions are resources typed `*Session*` with a `schema:startTime`;
//! interactions point at their session with `schema:agent` and at produced
//! entities with `schema:result`.

/// Sessions with their interactions, one row per pair.
pub const SESSIONS_QUERY: &str = r#"
PREFIX schema: <http://schema.org/>

SELECT ?session ?sessionStart ?interaction ?interactionStart
WHERE {
  ?session a ?sessionType ;
           schema:startTime ?sessionStart .
  FILTER(CONTAINS(STR(?sessionType), "Session"))

  OPTIONAL {
    ?interaction schema:agent ?session ;
                 schema:startTime ?interactionStart ;
                 a ?interactionType .
    FILTER(CONTAINS(STR(?interactionType), "Interaction"))
  }
}
ORDER BY ?sessionStart ?interactionStart
"#;

/// Which interaction (and session) produced which entity.
pub const INTERACTION_RESULTS_QUERY: &str = r#"
PREFIX schema: <http://schema.org/>

SELECT ?interaction ?session ?result
WHERE {
  ?interaction schema:result ?result .
  OPTIONAL { ?interaction schema:agent ?session . }
}
"#;

/// Every triple except the provenance links themselves.
pub const TRIPLES_QUERY: &str = r#"
PREFIX schema: <http://schema.org/>

SELECT ?s ?p ?o
WHERE {
  ?s ?p ?o .
  FILTER(?p != schema:result)
}
"#;

/// Remove every triple from the default graph.
pub const DELETE_ALL_UPDATE: &str = "DELETE WHERE { ?s ?p ?o }";

/// Two demo sessions of two interactions each, with a handful of concepts.
pub const SAMPLE_DATA_UPDATE: &str = r#"
PREFIX session: <http://aleph-wiki.local/session/>
PREFIX interaction: <http://aleph-wiki.local/interaction/>
PREFIX concept: <http://aleph-wiki.local/concept/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
PREFIX schema: <http://schema.org/>

INSERT DATA {
  session:demo-session-1 a schema:Session ;
    schema:startTime "2026-01-10T12:00:00Z"^^xsd:dateTime .

  interaction:demo-1-1 a schema:InteractionAction ;
    schema:agent session:demo-session-1 ;
    schema:startTime "2026-01-10T12:00:00Z"^^xsd:dateTime .

  interaction:demo-1-2 a schema:InteractionAction ;
    schema:agent session:demo-session-1 ;
    schema:startTime "2026-01-10T12:01:00Z"^^xsd:dateTime .

  session:demo-session-2 a schema:Session ;
    schema:startTime "2026-01-10T13:00:00Z"^^xsd:dateTime .

  interaction:demo-2-1 a schema:InteractionAction ;
    schema:agent session:demo-session-2 ;
    schema:startTime "2026-01-10T13:00:00Z"^^xsd:dateTime .

  interaction:demo-2-2 a schema:InteractionAction ;
    schema:agent session:demo-session-2 ;
    schema:startTime "2026-01-10T13:05:00Z"^^xsd:dateTime .

  concept:GraphDB a concept:Technology ;
    rdfs:label "Graph Database" ;
    rdfs:comment "A database that uses graph structures for queries" .
  interaction:demo-1-1 schema:result concept:GraphDB .

  concept:SPARQL a concept:Language ;
    rdfs:label "SPARQL" ;
    rdfs:comment "RDF query language" ;
    schema:relatedTo concept:GraphDB .
  concept:RDF a concept:Standard ;
    rdfs:label "RDF" ;
    rdfs:comment "Resource Description Framework" ;
    schema:relatedTo concept:SPARQL .
  interaction:demo-1-2 schema:result concept:SPARQL .
  interaction:demo-1-2 schema:result concept:RDF .

  concept:Python a concept:Language ;
    rdfs:label "Python" ;
    rdfs:comment "High-level programming language" .
  interaction:demo-2-1 schema:result concept:Python .

  concept:JavaScript a concept:Language ;
    rdfs:label "JavaScript" ;
    rdfs:comment "Scripting language for web development" .
  concept:React a concept:Framework ;
    rdfs:label "React" ;
    rdfs:comment "JavaScript library for building user interfaces" ;
    schema:relatedTo concept:JavaScript .
  interaction:demo-2-2 schema:result concept:JavaScript .
  interaction:demo-2-2 schema:result concept:React .
}
"#;

/// Properties of one resource. `None` when `uri` cannot be embedded in an
/// IRI reference.
pub fn node_details_query(uri: &str) -> Option<String> {
    let valid = !uri.is_empty()
        && !uri
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'));
    if !valid {
        return None;
    }
    Some(format!("SELECT ?p ?o WHERE {{ <{}> ?p ?o }}", uri))
}
