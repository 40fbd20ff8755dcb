//! Airtable `filterByFormula` construction for the name search.

/// Escape single quotes so user input can never terminate the quoted
/// string inside a formula.
pub fn escape_quotes(s: &str) -> String {
    s.replace('\'', "\\'")
}

/// Build the disjunctive name filter for a free-text query.
///
/// Matches the query as a case-insensitive substring of the first name,
/// the last name, or the "first last" concatenation. Returns `None` for
/// empty or whitespace-only queries, which callers short-circuit to an
/// empty result without contacting Airtable.
pub fn name_filter(query: &str) -> Option<String> {
    let q = query.trim();
    if q.is_empty() {
        return None;
    }

    let safe = escape_quotes(&q.to_lowercase());
    Some(format!(
        "OR(\
         FIND('{safe}', LOWER({{Vorname}}))>0,\
         FIND('{safe}', LOWER({{Nachname}}))>0,\
         FIND('{safe}', LOWER({{Vorname}}&' '&{{Nachname}}))>0)"
    ))
}
